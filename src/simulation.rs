use std::time::Duration;

use cmouse::{
    generate_maze, Dims, GenerationError, Goals, Grid, Maze, Mouse, SearchError, SearchResult,
    Step,
};
use hashbrown::{HashMap, HashSet};
use log::{debug, info, warn};

use crate::{
    constants::{MAX_FPS, MIN_FPS},
    settings::Settings,
};

const FPS_STEP: u32 = 5;
/// Explored cells shown per frame while the search is being replayed.
const REVEAL_PER_FRAME: usize = 6;

/// Everything the controls can change, kept apart from the maze and the mouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationState {
    pub running: bool,
    pub step_requested: bool,
    pub show_numbers: bool,
    pub show_explored: bool,
    pub show_decisions: bool,
    pub fps: u32,
    pub explored: HashSet<Dims>,
    pub cost_so_far: HashMap<Dims, u32>,
    /// Number of cells from the expansion order that are already shown.
    pub reveal: usize,
}

impl SimulationState {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            running: false,
            step_requested: false,
            show_numbers: settings.get_show_numbers(),
            show_explored: settings.get_show_explored(),
            show_decisions: settings.get_show_decisions(),
            fps: settings.get_fps(),
            explored: HashSet::new(),
            cost_so_far: HashMap::new(),
            reveal: 0,
        }
    }

    pub fn toggle_numbers(&mut self) {
        self.show_numbers = !self.show_numbers;
    }

    pub fn toggle_explored(&mut self) {
        self.show_explored = !self.show_explored;
    }

    pub fn toggle_decisions(&mut self) {
        self.show_decisions = !self.show_decisions;
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.step_requested = false;
    }

    pub fn request_step(&mut self) {
        self.step_requested = true;
    }

    pub fn step_complete(&mut self) {
        self.step_requested = false;
    }

    /// Clears the run, keeps the display toggles and the speed.
    pub fn reset(&mut self) {
        self.stop();
        self.explored.clear();
        self.cost_so_far.clear();
        self.reveal = 0;
    }

    pub fn faster(&mut self) {
        self.fps = (self.fps + FPS_STEP).min(MAX_FPS);
    }

    pub fn slower(&mut self) {
        self.fps = self.fps.saturating_sub(FPS_STEP).max(MIN_FPS);
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps.clamp(MIN_FPS, MAX_FPS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Exploring,
    Paused,
    Running,
    Finished,
    NoPath,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Ready => "ready",
            Phase::Exploring => "exploring",
            Phase::Paused => "paused",
            Phase::Running => "running",
            Phase::Finished => "finished",
            Phase::NoPath => "no path",
        }
    }
}

pub struct Simulation {
    pub maze: Maze,
    pub mouse: Mouse,
    pub state: SimulationState,
    width: usize,
    height: usize,
    seed: Option<u64>,
}

impl Simulation {
    pub fn new(settings: &Settings) -> Result<Self, GenerationError> {
        let (width, height, seed) = (
            settings.get_maze_width(),
            settings.get_maze_height(),
            settings.get_seed(),
        );
        let maze = generate_maze(width, height, seed)?;

        Ok(Self {
            mouse: Mouse::new(maze.start),
            maze,
            state: SimulationState::from_settings(settings),
            width,
            height,
            seed,
        })
    }

    /// New maze with a new mouse, the same seed gives back the same maze.
    pub fn reset(&mut self) -> Result<(), GenerationError> {
        self.maze = generate_maze(self.width, self.height, self.seed)?;
        self.mouse = Mouse::new(self.maze.start);
        self.state.reset();
        info!("New {}x{} maze", self.width, self.height);
        Ok(())
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn phase(&self) -> Phase {
        match self.mouse.search() {
            None => Phase::Ready,
            Some(search) if !search.found() => Phase::NoPath,
            Some(_) if self.revealing() => Phase::Exploring,
            Some(_) if self.mouse.is_finished() => Phase::Finished,
            Some(_) if self.state.running => Phase::Running,
            Some(_) => Phase::Paused,
        }
    }

    pub fn start(&mut self) {
        self.state.start();
    }

    pub fn stop(&mut self) {
        self.state.stop();
    }

    pub fn toggle_running(&mut self) {
        if self.state.running {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Single step: plans if there is no path yet, otherwise queues one move for the next
    /// [`Simulation::update`]. A replay of the search in progress is finished instead.
    pub fn step_forward(&mut self) -> Result<(), SearchError> {
        self.state.stop();

        if !self.mouse.is_planned() {
            self.advance()?;
        } else if self.revealing() {
            self.state.reveal = self.explored_total();
        } else {
            self.state.request_step();
        }
        Ok(())
    }

    /// Plans if needed and shows the whole search at once, the mouse stays where it is.
    pub fn solve(&mut self) -> Result<(), SearchError> {
        self.state.stop();
        if !self.mouse.is_planned() {
            self.advance()?;
        }
        self.state.reveal = self.explored_total();
        Ok(())
    }

    pub fn step_backward(&mut self) {
        self.state.stop();
        if let Some(pos) = self.mouse.retreat() {
            debug!("Mouse back at {pos}");
        }
    }

    /// Called once per frame.
    pub fn update(&mut self) -> Result<(), SearchError> {
        if self.revealing() {
            self.state.reveal = (self.state.reveal + REVEAL_PER_FRAME).min(self.explored_total());
            return Ok(());
        }

        if self.state.running || self.state.step_requested {
            self.advance()?;
            self.state.step_complete();
        }
        Ok(())
    }

    /// Explored cells that should be drawn now, in the order they were expanded.
    pub fn visible_explored(&self) -> &[Dims] {
        match self.mouse.search() {
            Some(search) => {
                let order = &search.expansion_order;
                &order[..self.state.reveal.min(order.len())]
            }
            None => &[],
        }
    }

    fn explored_total(&self) -> usize {
        self.mouse
            .search()
            .map_or(0, |search| search.expansion_order.len())
    }

    fn revealing(&self) -> bool {
        self.state.show_explored && self.state.reveal < self.explored_total()
    }

    fn advance(&mut self) -> Result<Step, SearchError> {
        let step = self.mouse.advance(&self.maze.grid, &self.maze.goals)?;

        match step {
            Step::Planned { found } => self.on_planned(found),
            Step::Moved { to, .. } => {
                if self.state.show_decisions {
                    self.log_decisions(to);
                }
                if self.mouse.is_finished() {
                    info!("Reached the goal at {to} in {} moves", self.mouse.history().len() - 1);
                    self.state.stop();
                }
            }
            Step::Finished | Step::NoPath => self.state.stop(),
        }

        Ok(step)
    }

    fn on_planned(&mut self, found: bool) {
        let Some(search) = self.mouse.search() else {
            return;
        };

        self.state.explored = search.explored.clone();
        self.state.cost_so_far = search.cost_so_far.clone();
        self.state.reveal = if self.state.show_explored {
            0
        } else {
            search.expansion_order.len()
        };

        match search.path_len() {
            Some(moves) if found => {
                info!("Path found: {moves} moves, {} cells explored", search.explored.len())
            }
            _ => {
                warn!(
                    "No path found from {}, {} cells explored",
                    self.mouse.start(),
                    search.explored.len()
                );
                self.state.stop();
            }
        }
    }

    fn log_decisions(&self, at: Dims) {
        let Some(search) = self.mouse.search() else {
            return;
        };

        let next = self.mouse.remaining().first().copied();
        for line in decision_lines(&self.maze.grid, &self.maze.goals, search, at, next) {
            info!("{line}");
        }
    }
}

/// Cost and priority of every discovered neighbour of `at`, followed by the cell taken next.
pub fn decision_lines(
    grid: &Grid,
    goals: &Goals,
    search: &SearchResult,
    at: Dims,
    next: Option<Dims>,
) -> Vec<String> {
    let mut lines: Vec<_> = grid
        .neighbors(at)
        .into_iter()
        .filter_map(|neighbor| {
            let cost = *search.cost_so_far.get(&neighbor)?;
            let priority = cost.saturating_add(goals.heuristic(neighbor));
            Some(format!("{at} -> {neighbor}: cost {cost}, priority {priority}"))
        })
        .collect();

    lines.push(match next {
        Some(next) => format!("{at}: chose {next}"),
        None => format!("{at}: goal"),
    });
    lines
}
