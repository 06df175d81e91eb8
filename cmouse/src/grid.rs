use std::{fmt, str::FromStr};

use hashbrown::HashSet;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{array::Array2D, dims::Dims};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tile {
    #[default]
    Wall,
    Open,
    Start,
    Goal,
}

impl Tile {
    pub fn is_passable(self) -> bool {
        self != Tile::Wall
    }

    pub fn to_char(self) -> char {
        match self {
            Tile::Wall => '#',
            Tile::Open => '.',
            Tile::Start => 'S',
            Tile::Goal => 'E',
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '#' => Some(Tile::Wall),
            '.' => Some(Tile::Open),
            'S' => Some(Tile::Start),
            'E' => Some(Tile::Goal),
            _ => None,
        }
    }
}

/// Rectangular maze grid. Size is fixed for the lifetime of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    tiles: Array2D<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize, fill: Tile) -> Self {
        Self {
            tiles: Array2D::new(fill, width, height),
        }
    }

    pub fn size(&self) -> Dims {
        self.tiles.size()
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    pub fn is_in_bounds(&self, pos: Dims) -> bool {
        self.tiles.contains(pos)
    }

    pub fn get(&self, pos: Dims) -> Option<Tile> {
        self.tiles.get(pos).copied()
    }

    /// Sets the tile at `pos`, returns `false` if `pos` is out of bounds.
    pub fn set(&mut self, pos: Dims, tile: Tile) -> bool {
        match self.tiles.get_mut(pos) {
            Some(t) => {
                *t = tile;
                true
            }
            None => false,
        }
    }

    pub fn is_passable(&self, pos: Dims) -> bool {
        self.get(pos).is_some_and(Tile::is_passable)
    }

    /// Passable, in-bounds cells adjacent to `pos`, in the order up, down, left, right.
    pub fn neighbors(&self, pos: Dims) -> SmallVec<[Dims; 4]> {
        Dims::ORTHOGONAL
            .into_iter()
            .map(|off| pos + off)
            .filter(|&next| self.is_passable(next))
            .collect()
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    pub fn passable_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_passable()).count()
    }

    pub fn iter_pos(&self) -> impl Iterator<Item = Dims> + '_ {
        self.tiles.iter_pos()
    }

    /// All passable cells reachable from `from`, including `from` itself when it is passable.
    pub fn flood_fill(&self, from: Dims) -> HashSet<Dims> {
        let mut visited = HashSet::new();
        if !self.is_passable(from) {
            return visited;
        }

        let mut stack = vec![from];
        visited.insert(from);
        while let Some(current) = stack.pop() {
            for next in self.neighbors(current) {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }

        visited
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            // row always exists for y < height
            if let Some(row) = self.tiles.row(y) {
                for tile in row {
                    write!(f, "{}", tile.to_char())?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridParseError {
    #[error("grid has no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile {ch:?} at {pos}")]
    UnknownTile { pos: Dims, ch: char },
}

impl FromStr for Grid {
    type Err = GridParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let width = rows.first().ok_or(GridParseError::Empty)?.chars().count();
        let mut grid = Grid::new(width, rows.len(), Tile::Wall);

        for (y, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GridParseError::Ragged {
                    row: y,
                    expected: width,
                    found,
                });
            }

            for (x, ch) in line.chars().enumerate() {
                let pos = Dims(x as i32, y as i32);
                let tile = Tile::from_char(ch).ok_or(GridParseError::UnknownTile { pos, ch })?;
                grid.set(pos, tile);
            }
        }

        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "
        S.#
        #.#
        #.E
    ";

    #[test]
    fn parse_and_display() {
        let grid: Grid = SMALL.parse().unwrap();
        assert_eq!(grid.size(), Dims(3, 3));
        assert_eq!(grid.get(Dims(0, 0)), Some(Tile::Start));
        assert_eq!(grid.get(Dims(2, 2)), Some(Tile::Goal));
        assert_eq!(grid.get(Dims(2, 0)), Some(Tile::Wall));
        assert_eq!(grid.to_string(), "S.#\n#.#\n#.E\n");
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<Grid>(), Err(GridParseError::Empty));
        assert_eq!(
            "..\n...".parse::<Grid>(),
            Err(GridParseError::Ragged {
                row: 1,
                expected: 2,
                found: 3
            })
        );
        assert_eq!(
            "..\n.x".parse::<Grid>(),
            Err(GridParseError::UnknownTile {
                pos: Dims(1, 1),
                ch: 'x'
            })
        );
    }

    #[test]
    fn neighbors_skip_walls_and_bounds() {
        let grid: Grid = SMALL.parse().unwrap();
        assert_eq!(grid.neighbors(Dims(0, 0)).as_slice(), &[Dims(1, 0)]);
        assert_eq!(
            grid.neighbors(Dims(1, 1)).as_slice(),
            &[Dims(1, 0), Dims(1, 2)]
        );
        assert_eq!(grid.neighbors(Dims(2, 2)).as_slice(), &[Dims(1, 2)]);
    }

    #[test]
    fn counts() {
        let grid: Grid = SMALL.parse().unwrap();
        assert_eq!(grid.count(Tile::Wall), 4);
        assert_eq!(grid.passable_count(), 5);
        assert!(!grid.is_passable(Dims(3, 0)));
        assert!(!grid.is_in_bounds(Dims(0, -1)));
    }

    #[test]
    fn flood_fill_stops_at_walls() {
        let grid: Grid = "
            ..#.
            ..#.
        "
        .parse()
        .unwrap();
        let reached = grid.flood_fill(Dims(0, 0));
        assert_eq!(reached.len(), 4);
        assert!(!reached.contains(&Dims(3, 0)));
        assert!(grid.flood_fill(Dims(2, 0)).is_empty());
    }

    #[test]
    fn set_out_of_bounds() {
        let mut grid = Grid::new(2, 2, Tile::Open);
        assert!(grid.set(Dims(1, 1), Tile::Wall));
        assert!(!grid.set(Dims(2, 1), Tile::Wall));
    }
}
