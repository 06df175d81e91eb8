use rand::{seq::SliceRandom as _, thread_rng, Rng as _, SeedableRng as _};
use thiserror::Error;

use crate::{
    dims::Dims,
    grid::{Grid, Tile},
    pathfinder::Goals,
};

/// Random number generator used for anything, where determinism is required.
pub type Random = rand_xoshiro::Xoshiro256StarStar;

/// Smallest accepted width and height.
pub const MIN_SIZE: usize = 4;

/// Carving starts east of the start cell, which leaves the start opening to the east.
const CARVE_FROM: Dims = Dims::from_row_col(0, 1);

/// Lattice steps of the carver, two cells at a time so corridors keep a wall between them.
const LATTICE_STEPS: [Dims; 4] = [Dims(2, 0), Dims(0, 2), Dims(-2, 0), Dims(0, -2)];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GenerationError {
    #[error("invalid maze size {0:?}, width and height must be at least 4")]
    InvalidSize(Dims),
}

#[derive(Debug, Clone)]
pub struct Maze {
    pub grid: Grid,
    pub start: Dims,
    pub goals: Goals,
}

impl Maze {
    /// Carves a maze and places the start in the corner and a 2x2 goal block in the center.
    pub fn generate(width: usize, height: usize, rng: &mut Random) -> Result<Maze, GenerationError> {
        let mut grid = carve(width, height, rng)?;
        let (start, goals) = place_start_and_goals(&mut grid);

        debug_assert!({
            let reachable = grid.flood_fill(start);
            goals.iter().all(|goal| reachable.contains(&goal))
        });

        Ok(Maze { grid, start, goals })
    }

    pub fn size(&self) -> Dims {
        self.grid.size()
    }
}

/// Generates a maze from `seed`, or from a random seed when there is none.
pub fn generate_maze(
    width: usize,
    height: usize,
    seed: Option<u64>,
) -> Result<Maze, GenerationError> {
    let seed = seed.unwrap_or_else(|| thread_rng().gen());
    log::debug!("Generating {width}x{height} maze with seed {seed}");

    let mut rng = Random::seed_from_u64(seed);
    Maze::generate(width, height, &mut rng)
}

struct CarveFrame {
    pos: Dims,
    steps: [Dims; 4],
    next: usize,
}

impl CarveFrame {
    fn enter(grid: &mut Grid, pos: Dims, rng: &mut Random) -> Self {
        grid.set(pos, Tile::Open);

        let mut steps = LATTICE_STEPS;
        steps.shuffle(rng);

        CarveFrame { pos, steps, next: 0 }
    }
}

/// Randomized recursive backtracker over the step-2 lattice.
///
/// The recursion is unrolled into an explicit stack of frames, each remembering its shuffled
/// directions, so cells are visited in the same order as the recursive version without being
/// limited by the call stack. Passages form a spanning tree of the carved cells.
pub fn carve(width: usize, height: usize, rng: &mut Random) -> Result<Grid, GenerationError> {
    if width < MIN_SIZE || height < MIN_SIZE {
        return Err(GenerationError::InvalidSize(Dims(width as i32, height as i32)));
    }

    let mut grid = Grid::new(width, height, Tile::Wall);

    grid.set(Dims::ZERO, Tile::Open);
    grid.set(CARVE_FROM, Tile::Open);
    // no diagonal shortcut around the start
    grid.set(Dims::from_row_col(1, 0), Tile::Wall);

    let mut stack = vec![CarveFrame::enter(&mut grid, CARVE_FROM, rng)];

    while let Some(frame) = stack.last_mut() {
        let Some(step) = frame.steps.get(frame.next).copied() else {
            stack.pop();
            continue;
        };
        frame.next += 1;

        let (from, target) = (frame.pos, frame.pos + step);
        if grid.get(target) == Some(Tile::Wall) {
            grid.set(from + step / 2, Tile::Open);
            stack.push(CarveFrame::enter(&mut grid, target, rng));
        }
    }

    Ok(grid)
}

/// Marks the start corner and the 2x2 goal block in the middle of the grid.
///
/// Goal cells that the carver left as walls are opened. The block spans two consecutive rows
/// and columns, so it always contains a carved lattice cell and stays connected to the start.
/// The placed grid is no longer a tree: it is the carved spanning tree plus the goal room,
/// whose opened cells add passages and small cycles inside the block.
pub fn place_start_and_goals(grid: &mut Grid) -> (Dims, Goals) {
    let start = Dims::ZERO;
    grid.set(start, Tile::Start);

    let corner = Dims::from_row_col(grid.height() as i32 / 2 - 1, grid.width() as i32 / 2 - 1);
    let goals: Goals = Dims::iter_fill(corner, corner + Dims(2, 2)).collect();
    for goal in goals.iter() {
        grid.set(goal, Tile::Goal);
    }

    grid.set(CARVE_FROM, Tile::Open);

    (start, goals)
}
