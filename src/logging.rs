use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError, RwLock},
    time::{Duration, Instant},
};

use cmouse::Dims;
use crossterm::style::{Color, ContentStyle};
use log::{Log, Metadata, Record};

use crate::renderer::{drawable::Drawable, GBuffer};

static LOGGER: OnceLock<AppLogger> = OnceLock::new();

// default configuration
const DEFAULT_DECAY: Duration = Duration::from_secs(30);
const DEFAULT_CAPACITY: usize = 200;

pub fn get_logger() -> &'static AppLogger {
    LOGGER.get_or_init(|| AppLogger::new(log::Level::Info, DEFAULT_DECAY, DEFAULT_CAPACITY))
}

pub fn init() -> Result<(), log::SetLoggerError> {
    log::set_logger(get_logger())?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Message {
    pub level: log::Level,
    pub pushed: Instant,
    pub message: String,
    pub source: String,
}

/// Logger keeping recent messages in memory, so they can be drawn next to the maze.
pub struct AppLogger {
    min_level: RwLock<log::Level>,
    decay: Duration,
    capacity: usize,
    // newest first
    logs: Mutex<VecDeque<Message>>,
}

impl AppLogger {
    pub fn new(min_level: log::Level, decay: Duration, capacity: usize) -> Self {
        Self {
            min_level: RwLock::new(min_level),
            decay,
            capacity,
            logs: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn min_level(&self) -> log::Level {
        *self.min_level.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn logs(&self) -> MutexGuard<'_, VecDeque<Message>> {
        // a panicking writer can't leave the queue half updated, keep using it
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Messages younger than the decay time, newest first.
    pub fn get_logs(&self) -> Vec<Message> {
        let mut logs = self.logs();
        let now = Instant::now();
        logs.retain(|msg| now.duration_since(msg.pushed) < self.decay);
        logs.iter().cloned().collect()
    }

    pub fn switch_debug(&self) -> log::Level {
        let mut level = self
            .min_level
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *level = if *level == log::Level::Debug {
            log::Level::Info
        } else {
            log::Level::Debug
        };
        *level
    }
}

impl Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.min_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut logs = self.logs();
        if logs.len() >= self.capacity {
            logs.pop_back();
        }
        logs.push_front(Message {
            level: record.level(),
            pushed: Instant::now(),
            message: record.args().to_string(),
            source: record
                .module_path()
                .and_then(|path| path.rsplit("::").next())
                .unwrap_or("unknown")
                .to_string(),
        });
    }

    fn flush(&self) {}
}

/// Log panel, `height` lines starting at the position, newest message on top.
pub struct LogPanel<'a> {
    pub logger: &'a AppLogger,
    pub height: i32,
}

impl Drawable<ContentStyle> for LogPanel<'_> {
    fn draw(&self, pos: Dims, frame: &mut GBuffer, style: ContentStyle) {
        const INDICATOR_CHAR: char = '|';

        for (i, log) in self
            .logger
            .get_logs()
            .into_iter()
            .take(self.height.max(0) as usize)
            .enumerate()
        {
            let color = match log.level {
                log::Level::Error => Color::Red,
                log::Level::Warn => Color::Yellow,
                log::Level::Info => Color::White,
                log::Level::Debug => Color::Blue,
                log::Level::Trace => Color::Grey,
            };

            let indicator_style = ContentStyle {
                foreground_color: Some(color),
                ..style
            };

            let y = pos.1 + i as i32;
            INDICATOR_CHAR.draw(Dims(pos.0, y), frame, indicator_style);
            format!("{} -> {}", log.source, log.message).draw(Dims(pos.0 + 2, y), frame, style);
        }
    }
}
