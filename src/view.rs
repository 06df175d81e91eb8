use cmouse::{Dims, Tile};
use hashbrown::{HashMap, HashSet};

use crate::{
    constants::{MOUSE_CHAR, TRAIL_CHAR},
    logging::{AppLogger, LogPanel},
    renderer::{
        drawable::{Drawable, SizedDrawable},
        GBuffer,
    },
    settings::ColorScheme,
    simulation::Simulation,
};

const KEY_HELP: &str =
    "space run  <-/-> step  r reset  n numbers  e explored  d decisions  +/- speed  F1 debug  q quit";
const PATH_CHAR: char = '.';
const MAZE_POS: Dims = Dims(1, 2);
/// Moves after which a trail mark stops fading, old marks stay faintly visible.
const TRAIL_FADE_STEPS: usize = 12;
const MAX_TRAIL_FADE: f32 = 0.75;
/// Narrowest log panel worth drawing next to the maze.
const MIN_SIDE_PANEL: i32 = 30;

/// Terminal columns per maze cell.
pub const CELL_WIDTH: i32 = 2;

pub fn maze_size(sim: &Simulation) -> Dims {
    let size = sim.maze.size();
    Dims(size.0 * CELL_WIDTH, size.1)
}

/// Draws the whole screen: status line, maze, key help and the log panel.
pub fn draw(frame: &mut GBuffer, sim: &Simulation, colors: &ColorScheme, logger: &AppLogger) {
    frame.clear(colors.backgrounds());

    status_line(sim).draw(Dims(MAZE_POS.0, 0), frame, colors.texts());

    draw_maze(frame, MAZE_POS, sim, colors, true);

    let maze = maze_size(sim);
    let help_y = MAZE_POS.1 + maze.1 + 1;
    let help = KEY_HELP;
    let help_x = MAZE_POS.0.max((frame.size().0 - help.size().0) / 2);
    help.draw(Dims(help_x, help_y), frame, colors.dim_texts());

    let side_x = MAZE_POS.0 + maze.0 + 2;
    let (panel_pos, height) = if frame.size().0 - side_x >= MIN_SIDE_PANEL {
        (Dims(side_x, MAZE_POS.1), maze.1)
    } else {
        let y = help_y + 2;
        (Dims(MAZE_POS.0, y), frame.size().1 - y)
    };
    LogPanel { logger, height }.draw(panel_pos, frame, colors.texts());
}

fn status_line(sim: &Simulation) -> String {
    let state = &sim.state;
    let path_len = sim.mouse.path().map_or(0, <[_]>::len);
    let seed = match sim.seed() {
        Some(seed) => seed.to_string(),
        None => "random".to_string(),
    };
    let flag = |on: bool| if on { "on" } else { "off" };

    format!(
        "tmouse | {} | step {}/{} | {} fps | seed {} | numbers {} | explored {} | decisions {}",
        sim.phase().label(),
        sim.mouse.path_index(),
        path_len,
        state.fps,
        seed,
        flag(state.show_numbers),
        flag(state.show_explored),
        flag(state.show_decisions),
    )
}

/// Draws the maze with its overlays, two columns per cell with the top left corner at `pos`.
pub fn draw_maze(
    frame: &mut GBuffer,
    pos: Dims,
    sim: &Simulation,
    colors: &ColorScheme,
    with_mouse: bool,
) {
    let maze = &sim.maze;
    let state = &sim.state;

    let explored: HashSet<Dims> = if state.show_explored {
        sim.visible_explored().iter().copied().collect()
    } else {
        HashSet::new()
    };
    let path: HashSet<Dims> = sim.mouse.remaining().iter().copied().collect();
    // later visits overwrite earlier ones, so every cell keeps its youngest age
    let history = sim.mouse.history();
    let trail: HashMap<Dims, usize> = history
        .iter()
        .enumerate()
        .map(|(i, &cell)| (cell, history.len() - i))
        .collect();

    for cell in maze.grid.iter_pos() {
        let Some(tile) = maze.grid.get(cell) else {
            continue;
        };

        let (mut chars, mut bg, mut style) = match tile {
            Tile::Wall => (['#', '#'], colors.wall, colors.walls()),
            Tile::Start => (['S', ' '], colors.start, colors.starts()),
            Tile::Goal => (['E', ' '], colors.goal, colors.goals()),
            Tile::Open => ([' ', ' '], colors.open, colors.opens()),
        };

        if tile == Tile::Open {
            if explored.contains(&cell) {
                bg = colors.explored;
                style = colors.exploreds();
            }
            if path.contains(&cell) {
                bg = colors.path;
                style = colors.paths();
                chars[0] = PATH_CHAR;
            }
            if state.show_numbers {
                chars = number_chars(maze.goals.heuristic(cell));
            } else if let Some(&age) = trail.get(&cell) {
                chars[0] = TRAIL_CHAR;
                style = colors.trails(bg, trail_fade(age));
            }
        }

        if with_mouse && cell == sim.mouse.position() {
            chars = [MOUSE_CHAR, ' '];
            style = colors.mouses(bg);
        }

        let x = pos.0 + cell.0 * CELL_WIDTH;
        let y = pos.1 + cell.1;
        for (i, ch) in chars.into_iter().enumerate() {
            frame.put_char(Dims(x + i as i32, y), ch, style);
        }
    }
}

/// Fade of a trail mark left `age` moves ago, the newest mark (age 1) is not faded.
fn trail_fade(age: usize) -> f32 {
    let age = age.saturating_sub(1).min(TRAIL_FADE_STEPS);
    MAX_TRAIL_FADE * age as f32 / TRAIL_FADE_STEPS as f32
}

fn number_chars(value: u32) -> [char; 2] {
    let text = if value > 99 {
        "..".to_string()
    } else {
        format!("{value:<2}")
    };

    let mut chars = text.chars();
    [chars.next().unwrap_or(' '), chars.next().unwrap_or(' ')]
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cmouse::{Goals, Grid, Maze, Mouse};
    use crossterm::style::Color;

    use super::*;
    use crate::{settings::Settings, simulation::Phase};

    fn solved(sim: &mut Simulation) {
        let grid: Grid = "
            S..
            #.#
            ..E
        "
        .parse()
        .unwrap();
        sim.maze = Maze {
            grid,
            start: Dims(0, 0),
            goals: Goals::single(Dims(2, 2)),
        };
        sim.mouse = Mouse::new(Dims(0, 0));

        sim.solve().unwrap();
    }

    fn simulation() -> Simulation {
        let settings = Settings::new()
            .set_maze_width(5)
            .set_maze_height(5)
            .set_seed(Some(1));
        Simulation::new(&settings).unwrap()
    }

    fn render(sim: &Simulation, with_mouse: bool) -> Vec<String> {
        let mut frame = GBuffer::new(maze_size(sim));
        draw_maze(&mut frame, Dims::ZERO, sim, &ColorScheme::default(), with_mouse);
        (0..frame.size().1 as usize)
            .map(|y| frame.line_text(y))
            .collect()
    }

    #[test]
    fn solved_maze_shows_path() {
        let mut sim = simulation();
        solved(&mut sim);

        assert_eq!(render(&sim, false), vec!["S .", "##. ##", "  . E"]);
        assert_eq!(render(&sim, true)[0], "@ .");
    }

    #[test]
    fn heuristic_numbers() {
        let mut sim = simulation();
        solved(&mut sim);
        sim.state.toggle_numbers();

        assert_eq!(render(&sim, false), vec!["S 3 2", "##2 ##", "2 1 E"]);
    }

    #[test]
    fn trail_follows_the_mouse() {
        let mut sim = simulation();
        solved(&mut sim);
        for _ in 0..3 {
            sim.step_forward().unwrap();
            sim.update().unwrap();
        }

        // the mouse is on the middle cell, the cell above it was walked
        assert_eq!(render(&sim, true), vec!["S ·", "##@ ##", "  . E"]);
    }

    #[test]
    fn explored_overlay_colors_cells() {
        let mut sim = simulation();
        solved(&mut sim);

        let mut frame = GBuffer::new(maze_size(&sim));
        let colors = ColorScheme::default();
        draw_maze(&mut frame, Dims::ZERO, &sim, &colors, false);

        let bg = |pos| frame.get(pos).and_then(|cell| cell.style.background_color);
        // start is expanded first, but keeps its own color
        assert_eq!(bg(Dims(0, 0)), Some(Color::from(colors.start)));
        assert_eq!(bg(Dims(2, 1)), Some(Color::from(colors.path)));
        // dead end next to the path is expanded on the way, the lower left corner is not
        assert_eq!(bg(Dims(4, 0)), Some(Color::from(colors.explored)));
        assert_eq!(bg(Dims(0, 2)), Some(Color::from(colors.open)));
    }

    #[test]
    fn tiles_use_scheme_styles() {
        let mut sim = simulation();
        solved(&mut sim);

        let mut frame = GBuffer::new(maze_size(&sim));
        let colors = ColorScheme::default();
        draw_maze(&mut frame, Dims::ZERO, &sim, &colors, false);

        let style = |pos| frame.get(pos).map(|cell| cell.style);
        assert_eq!(style(Dims(0, 0)), Some(colors.starts()));
        assert_eq!(style(Dims(0, 1)), Some(colors.walls()));
        assert_eq!(style(Dims(4, 2)), Some(colors.goals()));
        assert_eq!(style(Dims(2, 1)), Some(colors.paths()));
        assert_eq!(style(Dims(4, 0)), Some(colors.exploreds()));
        assert_eq!(style(Dims(0, 2)), Some(colors.opens()));
    }

    #[test]
    fn older_trail_fades() {
        let mut sim = simulation();
        let grid: Grid = "S....E".parse().unwrap();
        sim.maze = Maze {
            grid,
            start: Dims(0, 0),
            goals: Goals::single(Dims(5, 0)),
        };
        sim.mouse = Mouse::new(Dims(0, 0));
        sim.state.toggle_explored();
        sim.solve().unwrap();
        sim.start();
        while sim.phase() != Phase::Finished {
            sim.update().unwrap();
        }

        let mut frame = GBuffer::new(maze_size(&sim));
        let colors = ColorScheme::default();
        draw_maze(&mut frame, Dims::ZERO, &sim, &colors, true);
        assert_eq!(frame.line_text(0), "S · · · · @");

        let fg = |col: i32| {
            frame
                .get(Dims(col * CELL_WIDTH, 0))
                .and_then(|cell| cell.style.foreground_color)
        };
        // the last cell walked before the goal is the newest mark
        assert_eq!(fg(4), Some(Color::from(colors.text)));
        assert_eq!(
            fg(1),
            Some(Color::from(colors.text.mix(colors.open, trail_fade(4))))
        );
        assert_ne!(fg(1), fg(4));
        assert_eq!(trail_fade(1), 0.0);
        assert_eq!(trail_fade(100), MAX_TRAIL_FADE);
    }

    #[test]
    fn whole_screen() {
        let logger = AppLogger::new(log::Level::Info, Duration::from_secs(60), 10);
        let sim = simulation();

        let mut frame = GBuffer::new(Dims(120, 20));
        draw(&mut frame, &sim, &ColorScheme::default(), &logger);

        let status = frame.line_text(0);
        assert!(status.starts_with(" tmouse | ready | step 0/0 | 30 fps | seed 1"));
        assert!(frame.line_text(8).contains("r reset"));
        assert_eq!(frame.line_text(2).chars().nth(1), Some(MOUSE_CHAR));
    }
}
