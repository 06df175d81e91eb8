//! A* search over the 4-connected grid, towards the nearest of several goal cells.

use std::{cmp::Reverse, collections::BinaryHeap};

use hashbrown::{HashMap, HashSet};
use thiserror::Error;

use crate::{dims::Dims, grid::Grid};

/// Set of cells that all count as reaching the goal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Goals(HashSet<Dims>);

impl Goals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(pos: Dims) -> Self {
        Some(pos).into_iter().collect()
    }

    pub fn insert(&mut self, pos: Dims) -> bool {
        self.0.insert(pos)
    }

    pub fn contains(&self, pos: Dims) -> bool {
        self.0.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Dims> + '_ {
        self.0.iter().copied()
    }

    /// Goals in row-major order.
    pub fn sorted(&self) -> Vec<Dims> {
        let mut goals: Vec<_> = self.iter().collect();
        goals.sort();
        goals
    }

    /// Manhattan distance from `pos` to the nearest goal, [`u32::MAX`] without goals.
    pub fn heuristic(&self, pos: Dims) -> u32 {
        heuristic(pos, self)
    }
}

impl FromIterator<Dims> for Goals {
    fn from_iter<I: IntoIterator<Item = Dims>>(iter: I) -> Self {
        Goals(iter.into_iter().collect())
    }
}

/// Minimum Manhattan distance from `pos` to any of the `goals`.
///
/// Admissible and consistent for unit-cost orthogonal moves.
pub fn heuristic(pos: Dims, goals: &Goals) -> u32 {
    goals
        .iter()
        .map(|goal| pos.manhattan(goal))
        .min()
        .unwrap_or(u32::MAX)
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("no goal cells were given")]
    InvalidGoalSet,
    #[error("start {0} is out of bounds or inside a wall")]
    InvalidStart(Dims),
}

/// Progress of a running search, reported to the observer of [`find_path_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEvent {
    /// `cell` was popped from the open set and its neighbors are about to be relaxed.
    Expanded { cell: Dims, cost: u32 },
    /// `to` got a new, cheaper cost through `from` and was queued with `priority`.
    Discovered {
        from: Dims,
        to: Dims,
        cost: u32,
        priority: u32,
    },
    /// First goal popped from the open set, the search stops here.
    Reached { goal: Dims, cost: u32 },
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Cells from start to the reached goal, both inclusive. `None` if no goal is reachable.
    pub path: Option<Vec<Dims>>,
    /// Cells popped and expanded by the search.
    pub explored: HashSet<Dims>,
    /// Cheapest known step count from start for every discovered cell.
    pub cost_so_far: HashMap<Dims, u32>,
    /// `explored` in the order the cells were expanded.
    pub expansion_order: Vec<Dims>,
    pub reached: Option<Dims>,
}

impl SearchResult {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }

    /// Number of moves on the path.
    pub fn path_len(&self) -> Option<usize> {
        self.path.as_ref().map(|path| path.len() - 1)
    }
}

pub fn find_path(grid: &Grid, start: Dims, goals: &Goals) -> Result<SearchResult, SearchError> {
    find_path_with(grid, start, goals, |_| {})
}

/// Same as [`find_path`], but reports every step of the search to `observer`.
pub fn find_path_with<F>(
    grid: &Grid,
    start: Dims,
    goals: &Goals,
    mut observer: F,
) -> Result<SearchResult, SearchError>
where
    F: FnMut(SearchEvent),
{
    if goals.is_empty() {
        return Err(SearchError::InvalidGoalSet);
    }
    if !grid.is_passable(start) {
        return Err(SearchError::InvalidStart(start));
    }

    let mut result = SearchResult::default();
    let mut came_from: HashMap<Dims, Dims> = HashMap::new();

    // ties on priority fall back to the row-major order of cells
    let mut open_set = BinaryHeap::new();
    open_set.push(Reverse((0u32, start)));
    result.cost_so_far.insert(start, 0);

    while let Some(Reverse((_, current))) = open_set.pop() {
        if result.explored.contains(&current) {
            continue;
        }

        let cost = result.cost_so_far[&current];

        if goals.contains(current) {
            observer(SearchEvent::Reached {
                goal: current,
                cost,
            });
            result.reached = Some(current);
            break;
        }

        result.explored.insert(current);
        result.expansion_order.push(current);
        observer(SearchEvent::Expanded {
            cell: current,
            cost,
        });

        for next in grid.neighbors(current) {
            let new_cost = cost + 1;
            let improves = result
                .cost_so_far
                .get(&next)
                .map_or(true, |&known| new_cost < known);

            if improves {
                result.cost_so_far.insert(next, new_cost);
                came_from.insert(next, current);

                let priority = new_cost.saturating_add(goals.heuristic(next));
                open_set.push(Reverse((priority, next)));
                observer(SearchEvent::Discovered {
                    from: current,
                    to: next,
                    cost: new_cost,
                    priority,
                });
            }
        }
    }

    result.path = result
        .reached
        .map(|goal| reconstruct_path(&came_from, goal));

    match &result.path {
        Some(path) => log::debug!(
            "A* reached {} in {} moves, explored {} cells",
            path[path.len() - 1],
            path.len() - 1,
            result.explored.len()
        ),
        None => log::debug!(
            "A* found no path from {start}, explored {} cells",
            result.explored.len()
        ),
    }

    Ok(result)
}

fn reconstruct_path(came_from: &HashMap<Dims, Dims>, goal: Dims) -> Vec<Dims> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}
