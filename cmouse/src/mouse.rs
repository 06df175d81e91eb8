use crate::{
    dims::Dims,
    grid::Grid,
    pathfinder::{find_path, Goals, SearchError, SearchResult},
};

/// Outcome of a single [`Mouse::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The path was just computed, the mouse did not move yet.
    Planned { found: bool },
    Moved { from: Dims, to: Dims },
    /// Whole path was already walked.
    Finished,
    /// Planning found no path, there is nowhere to go.
    NoPath,
}

/// The agent walking through the maze.
///
/// Plain data: the position, the cached search with its path, a cursor into the path and the
/// history of previous positions for the trail and for stepping back.
#[derive(Debug, Clone)]
pub struct Mouse {
    start: Dims,
    position: Dims,
    search: Option<SearchResult>,
    path_index: usize,
    history: Vec<Dims>,
}

impl Mouse {
    pub fn new(start: Dims) -> Self {
        Self {
            start,
            position: start,
            search: None,
            path_index: 0,
            history: Vec::new(),
        }
    }

    pub fn position(&self) -> Dims {
        self.position
    }

    pub fn start(&self) -> Dims {
        self.start
    }

    pub fn path_index(&self) -> usize {
        self.path_index
    }

    pub fn history(&self) -> &[Dims] {
        &self.history
    }

    pub fn search(&self) -> Option<&SearchResult> {
        self.search.as_ref()
    }

    pub fn path(&self) -> Option<&[Dims]> {
        self.search.as_ref()?.path.as_deref()
    }

    pub fn is_planned(&self) -> bool {
        self.search.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.path().is_some_and(|path| self.path_index >= path.len())
    }

    /// Path cells not visited yet.
    pub fn remaining(&self) -> &[Dims] {
        self.path()
            .map(|path| &path[self.path_index.min(path.len())..])
            .unwrap_or_default()
    }

    /// Plans on the first call, then moves one cell along the path per call.
    pub fn advance(&mut self, grid: &Grid, goals: &Goals) -> Result<Step, SearchError> {
        let Some(search) = &self.search else {
            let search = find_path(grid, self.position, goals)?;
            let found = search.found();
            self.search = Some(search);
            return Ok(Step::Planned { found });
        };

        let Some(path) = &search.path else {
            return Ok(Step::NoPath);
        };

        match path.get(self.path_index) {
            Some(&next) => {
                let from = self.position;
                self.history.push(from);
                self.position = next;
                self.path_index += 1;
                Ok(Step::Moved { from, to: next })
            }
            None => Ok(Step::Finished),
        }
    }

    /// Steps back to the previous position, if there is one.
    pub fn retreat(&mut self) -> Option<Dims> {
        let prev = self.history.pop()?;
        self.position = prev;
        self.path_index = self.path_index.saturating_sub(1);
        Some(prev)
    }

    /// Forgets the path and the history, next [`Mouse::advance`] plans again.
    pub fn reset(&mut self) {
        self.position = self.start;
        self.search = None;
        self.path_index = 0;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> (Grid, Goals) {
        let grid: Grid = "
            S...E
        "
        .parse()
        .unwrap();
        (grid, Goals::single(Dims(4, 0)))
    }

    #[test]
    fn plans_then_walks() {
        let (grid, goals) = corridor();
        let mut mouse = Mouse::new(Dims(0, 0));

        assert_eq!(
            mouse.advance(&grid, &goals),
            Ok(Step::Planned { found: true })
        );
        assert_eq!(mouse.position(), Dims(0, 0));
        assert_eq!(mouse.path().map(<[_]>::len), Some(5));

        // first path cell is the start itself
        assert_eq!(
            mouse.advance(&grid, &goals),
            Ok(Step::Moved {
                from: Dims(0, 0),
                to: Dims(0, 0)
            })
        );
        while let Ok(Step::Moved { .. }) = mouse.advance(&grid, &goals) {}

        assert_eq!(mouse.position(), Dims(4, 0));
        assert!(mouse.is_finished());
        assert!(mouse.remaining().is_empty());
        assert_eq!(mouse.history().len(), 5);
    }

    #[test]
    fn advance_at_end_is_a_no_op() {
        let (grid, goals) = corridor();
        let mut mouse = Mouse::new(Dims(0, 0));
        for _ in 0..6 {
            mouse.advance(&grid, &goals).unwrap();
        }
        assert_eq!(mouse.path_index(), 5);

        let history = mouse.history().to_vec();
        assert_eq!(mouse.advance(&grid, &goals), Ok(Step::Finished));
        assert_eq!(mouse.position(), Dims(4, 0));
        assert_eq!(mouse.history(), history.as_slice());
        assert_eq!(mouse.path_index(), 5);
    }

    #[test]
    fn retreat_undoes_advance() {
        let (grid, goals) = corridor();
        let mut mouse = Mouse::new(Dims(0, 0));
        for _ in 0..3 {
            mouse.advance(&grid, &goals).unwrap();
        }

        let (pos, index) = (mouse.position(), mouse.path_index());
        mouse.advance(&grid, &goals).unwrap();
        assert_ne!(mouse.position(), pos);

        assert_eq!(mouse.retreat(), Some(pos));
        assert_eq!(mouse.position(), pos);
        assert_eq!(mouse.path_index(), index);
    }

    #[test]
    fn retreat_without_history() {
        let mut mouse = Mouse::new(Dims(2, 2));
        assert_eq!(mouse.retreat(), None);
        assert_eq!(mouse.position(), Dims(2, 2));
        assert_eq!(mouse.path_index(), 0);
    }

    #[test]
    fn reset_forces_replanning() {
        let (grid, goals) = corridor();
        let mut mouse = Mouse::new(Dims(0, 0));
        for _ in 0..4 {
            mouse.advance(&grid, &goals).unwrap();
        }

        mouse.reset();
        assert!(!mouse.is_planned());
        assert_eq!(mouse.position(), Dims(0, 0));
        assert!(mouse.history().is_empty());
        assert_eq!(mouse.path_index(), 0);
        assert_eq!(
            mouse.advance(&grid, &goals),
            Ok(Step::Planned { found: true })
        );
    }

    #[test]
    fn no_path_is_cached() {
        let grid: Grid = "S.#E".parse().unwrap();
        let goals = Goals::single(Dims(3, 0));
        let mut mouse = Mouse::new(Dims(0, 0));

        assert_eq!(
            mouse.advance(&grid, &goals),
            Ok(Step::Planned { found: false })
        );
        assert_eq!(mouse.advance(&grid, &goals), Ok(Step::NoPath));
        assert_eq!(mouse.position(), Dims(0, 0));
        assert!(mouse.history().is_empty());
        assert!(!mouse.is_finished());
    }

    #[test]
    fn invalid_goals_propagate() {
        let (grid, _) = corridor();
        let mut mouse = Mouse::new(Dims(0, 0));
        assert_eq!(
            mouse.advance(&grid, &Goals::new()),
            Err(SearchError::InvalidGoalSet)
        );
        assert!(!mouse.is_planned());
    }
}
