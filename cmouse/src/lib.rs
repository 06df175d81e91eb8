pub mod array;
pub mod dims;
pub mod generator;
pub mod grid;
pub mod mouse;
pub mod pathfinder;

pub use dims::Dims;
pub use generator::{generate_maze, GenerationError, Maze, Random};
pub use grid::{Grid, GridParseError, Tile};
pub use mouse::{Mouse, Step};
pub use pathfinder::{
    find_path, find_path_with, heuristic, Goals, SearchError, SearchEvent, SearchResult,
};
