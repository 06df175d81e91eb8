use std::{io, ops::ControlFlow, time::Instant};

use cmouse::{GenerationError, SearchError};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use thiserror::Error;

use crate::{
    logging::{get_logger, AppLogger},
    renderer::Renderer,
    settings::{ColorScheme, Settings, SettingsError},
    simulation::Simulation,
    view,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleRun,
    StepForward,
    StepBackward,
    Reset,
    ToggleNumbers,
    ToggleExplored,
    ToggleDecisions,
    Faster,
    Slower,
    ToggleDebug,
    Quit,
}

impl Command {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        let command = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
            KeyCode::Char(' ') => Command::ToggleRun,
            KeyCode::Right | KeyCode::Char('l' | '.') => Command::StepForward,
            KeyCode::Left | KeyCode::Char('h' | ',') => Command::StepBackward,
            KeyCode::Char('r') => Command::Reset,
            KeyCode::Char('n') => Command::ToggleNumbers,
            KeyCode::Char('e') => Command::ToggleExplored,
            KeyCode::Char('d') => Command::ToggleDecisions,
            KeyCode::Char('+' | '=') => Command::Faster,
            KeyCode::Char('-') => Command::Slower,
            KeyCode::F(1) => Command::ToggleDebug,
            KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// Runs `command` against the simulation, [`ControlFlow::Break`] means quit.
pub fn apply(
    sim: &mut Simulation,
    command: Command,
    logger: &AppLogger,
) -> Result<ControlFlow<()>, AppError> {
    match command {
        Command::ToggleRun => sim.toggle_running(),
        Command::StepForward => sim.step_forward()?,
        Command::StepBackward => sim.step_backward(),
        Command::Reset => sim.reset()?,
        Command::ToggleNumbers => sim.state.toggle_numbers(),
        Command::ToggleExplored => sim.state.toggle_explored(),
        Command::ToggleDecisions => {
            sim.state.toggle_decisions();
            log::info!(
                "Decision log {}",
                if sim.state.show_decisions { "on" } else { "off" }
            );
        }
        Command::Faster => sim.state.faster(),
        Command::Slower => sim.state.slower(),
        Command::ToggleDebug => {
            let level = logger.switch_debug();
            log::info!("Log level set to {level}");
        }
        Command::Quit => return Ok(ControlFlow::Break(())),
    }
    Ok(ControlFlow::Continue(()))
}

pub struct App {
    renderer: Renderer,
    sim: Simulation,
    colors: ColorScheme,
}

impl App {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let sim = Simulation::new(settings)?;
        let renderer = Renderer::new()?;

        Ok(Self {
            renderer,
            sim,
            colors: settings.get_color_scheme(),
        })
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        let logger = get_logger();

        loop {
            let frame_start = Instant::now();
            let frame_duration = self.sim.state.frame_duration();

            // read everything that arrives during the frame
            let mut timeout = frame_duration;
            while event::poll(timeout)? {
                let event = event::read()?;
                self.renderer.on_event(&event)?;

                if let Event::Key(key) = event {
                    if let Some(command) = Command::from_key(key) {
                        if apply(&mut self.sim, command, logger)?.is_break() {
                            return Ok(());
                        }
                    }
                }

                timeout = frame_duration.saturating_sub(frame_start.elapsed());
            }

            self.sim.update()?;

            view::draw(self.renderer.frame(), &self.sim, &self.colors, logger);
            self.renderer.show()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn press(code: KeyCode) -> Option<Command> {
        Command::from_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn simulation() -> Simulation {
        let settings = Settings::new()
            .set_maze_width(7)
            .set_maze_height(7)
            .set_seed(Some(11));
        Simulation::new(&settings).unwrap()
    }

    #[test]
    fn key_bindings() {
        assert_eq!(press(KeyCode::Char(' ')), Some(Command::ToggleRun));
        assert_eq!(press(KeyCode::Right), Some(Command::StepForward));
        assert_eq!(press(KeyCode::Char('l')), Some(Command::StepForward));
        assert_eq!(press(KeyCode::Char(',')), Some(Command::StepBackward));
        assert_eq!(press(KeyCode::Char('r')), Some(Command::Reset));
        assert_eq!(press(KeyCode::Char('+')), Some(Command::Faster));
        assert_eq!(press(KeyCode::F(1)), Some(Command::ToggleDebug));
        assert_eq!(press(KeyCode::Esc), Some(Command::Quit));
        assert_eq!(press(KeyCode::Char('x')), None);
        assert_eq!(
            Command::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn key_release_is_ignored() {
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(Command::from_key(key), None);
    }

    #[test]
    fn commands_drive_the_simulation() {
        let logger = AppLogger::new(log::Level::Info, Duration::from_secs(60), 10);
        let mut sim = simulation();

        let flow = apply(&mut sim, Command::ToggleRun, &logger).unwrap();
        assert!(flow.is_continue());
        assert!(sim.state.running);

        apply(&mut sim, Command::StepForward, &logger).unwrap();
        assert!(!sim.state.running);
        assert!(sim.mouse.is_planned());

        apply(&mut sim, Command::Slower, &logger).unwrap();
        assert_eq!(sim.state.fps, 25);

        apply(&mut sim, Command::ToggleExplored, &logger).unwrap();
        assert!(!sim.state.show_explored);

        apply(&mut sim, Command::ToggleDebug, &logger).unwrap();
        assert_eq!(logger.min_level(), log::Level::Debug);

        apply(&mut sim, Command::Reset, &logger).unwrap();
        assert!(!sim.mouse.is_planned());

        assert!(apply(&mut sim, Command::Quit, &logger).unwrap().is_break());
    }
}
