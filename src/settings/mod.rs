use std::{fs, io, path::PathBuf};

use crossterm::style::{Color, ContentStyle};
use ron::{self, extensions::Extensions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{base_path, DEFAULT_FPS, DEFAULT_MAZE_SIZE, MAX_FPS, MIN_FPS};

const DEFAULT_SETTINGS: &str = include_str!("./default_settings.ron");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Blends towards `other`, `amount` of 0 keeps `self` and 1 gives `other`.
    pub fn mix(self, other: Rgb, amount: f32) -> Rgb {
        let amount = amount.clamp(0.0, 1.0);
        let channel = |from: u8, to: u8| {
            (from as f32 + (to as f32 - from as f32) * amount).round() as u8
        };
        Rgb(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }
}

impl From<Rgb> for Color {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        Color::Rgb { r, g, b }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub background: Rgb,
    pub wall: Rgb,
    pub open: Rgb,
    pub start: Rgb,
    pub goal: Rgb,
    pub explored: Rgb,
    pub path: Rgb,
    pub mouse: Rgb,
    pub text: Rgb,
    pub dim_text: Rgb,
    pub numbers: Rgb,
}

impl ColorScheme {
    fn on(&self, bg: Rgb, fg: Rgb) -> ContentStyle {
        ContentStyle {
            foreground_color: Some(fg.into()),
            background_color: Some(bg.into()),
            ..Default::default()
        }
    }

    pub fn backgrounds(&self) -> ContentStyle {
        self.on(self.background, self.text)
    }

    pub fn walls(&self) -> ContentStyle {
        self.on(self.wall, self.wall)
    }

    pub fn opens(&self) -> ContentStyle {
        self.on(self.open, self.numbers)
    }

    pub fn starts(&self) -> ContentStyle {
        self.on(self.start, self.text)
    }

    pub fn goals(&self) -> ContentStyle {
        self.on(self.goal, self.text)
    }

    pub fn exploreds(&self) -> ContentStyle {
        self.on(self.explored, self.numbers)
    }

    pub fn paths(&self) -> ContentStyle {
        self.on(self.path, self.numbers)
    }

    /// Trail mark over `bg`, `fade` of 1 makes it disappear into the background.
    pub fn trails(&self, bg: Rgb, fade: f32) -> ContentStyle {
        self.on(bg, self.text.mix(bg, fade))
    }

    pub fn mouses(&self, bg: Rgb) -> ContentStyle {
        self.on(bg, self.mouse)
    }

    pub fn texts(&self) -> ContentStyle {
        self.on(self.background, self.text)
    }

    pub fn dim_texts(&self) -> ContentStyle {
        self.on(self.background, self.dim_text)
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme {
            background: Rgb(18, 18, 18),
            wall: Rgb(200, 200, 200),
            open: Rgb(18, 18, 18),
            start: Rgb(67, 160, 71),
            goal: Rgb(121, 40, 40),
            explored: Rgb(80, 41, 35),
            path: Rgb(60, 60, 65),
            mouse: Rgb(245, 245, 245),
            text: Rgb(245, 245, 245),
            dim_text: Rgb(120, 120, 120),
            numbers: Rgb(180, 180, 180),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot access settings file {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("cannot parse settings file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub maze_width: Option<usize>,
    #[serde(default)]
    pub maze_height: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub fps: Option<u32>,
    #[serde(default)]
    pub show_explored: Option<bool>,
    #[serde(default)]
    pub show_numbers: Option<bool>,
    #[serde(default)]
    pub show_decisions: Option<bool>,
    #[serde(default)]
    pub color_scheme: Option<ColorScheme>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn populate(mut self) -> Self {
        self.maze_width = Some(self.get_maze_width());
        self.maze_height = Some(self.get_maze_height());
        self.fps = Some(self.get_fps());
        self.show_explored = Some(self.get_show_explored());
        self.show_numbers = Some(self.get_show_numbers());
        self.show_decisions = Some(self.get_show_decisions());
        self.color_scheme = Some(self.get_color_scheme());

        self
    }

    pub fn set_maze_width(mut self, value: usize) -> Self {
        self.maze_width = Some(value);
        self
    }

    pub fn get_maze_width(&self) -> usize {
        self.maze_width.unwrap_or(DEFAULT_MAZE_SIZE)
    }

    pub fn set_maze_height(mut self, value: usize) -> Self {
        self.maze_height = Some(value);
        self
    }

    pub fn get_maze_height(&self) -> usize {
        self.maze_height.unwrap_or(DEFAULT_MAZE_SIZE)
    }

    pub fn set_seed(mut self, value: Option<u64>) -> Self {
        self.seed = value;
        self
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn set_fps(mut self, value: u32) -> Self {
        self.fps = Some(value);
        self
    }

    /// Frames per second, clamped to the supported range.
    pub fn get_fps(&self) -> u32 {
        self.fps.unwrap_or(DEFAULT_FPS).clamp(MIN_FPS, MAX_FPS)
    }

    pub fn get_show_explored(&self) -> bool {
        self.show_explored.unwrap_or(true)
    }

    pub fn get_show_numbers(&self) -> bool {
        self.show_numbers.unwrap_or_default()
    }

    pub fn get_show_decisions(&self) -> bool {
        self.show_decisions.unwrap_or_default()
    }

    pub fn get_color_scheme(&self) -> ColorScheme {
        self.color_scheme.clone().unwrap_or_default()
    }

    pub fn default_path() -> PathBuf {
        base_path().join("settings.ron")
    }

    fn parse(src: &str) -> Result<Self, ron::error::SpannedError> {
        let options = ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME);
        options.from_str(src)
    }

    /// Loads settings from `path`, writing the bundled defaults there first if it's missing.
    pub fn load(path: PathBuf) -> Result<Self, SettingsError> {
        let src = match fs::read_to_string(&path) {
            Ok(src) => src,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("Creating default settings at {path:?}");
                Self::reset_config(path.clone())?;
                DEFAULT_SETTINGS.to_string()
            }
            Err(source) => return Err(SettingsError::Io { path, source }),
        };

        Self::parse(&src).map_err(|source| SettingsError::Parse { path, source })
    }

    pub fn reset_config(path: PathBuf) -> Result<(), SettingsError> {
        let write = || -> io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, DEFAULT_SETTINGS)
        };

        write().map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })
    }
}
