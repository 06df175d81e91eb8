use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, Div, Sub},
};

/// Position on the grid, `Dims(x, y)` where `x` is the column and `y` is the row.
///
/// Ordering is row-major, so sorting cells (or breaking priority ties) compares the row first
/// and the column second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dims(pub i32, pub i32);

impl Dims {
    pub const ZERO: Dims = Dims(0, 0);

    pub const UP: Dims = Dims(0, -1);
    pub const DOWN: Dims = Dims(0, 1);
    pub const LEFT: Dims = Dims(-1, 0);
    pub const RIGHT: Dims = Dims(1, 0);

    /// Axis-aligned unit offsets, in the order neighbors are enumerated.
    pub const ORTHOGONAL: [Dims; 4] = [Dims::UP, Dims::DOWN, Dims::LEFT, Dims::RIGHT];

    pub const fn from_row_col(row: i32, col: i32) -> Self {
        Dims(col, row)
    }

    pub const fn row(self) -> i32 {
        self.1
    }

    pub const fn col(self) -> i32 {
        self.0
    }

    pub fn abs_sum(self) -> i32 {
        self.0.abs() + self.1.abs()
    }

    pub fn manhattan(self, other: Dims) -> u32 {
        (self - other).abs_sum() as u32
    }

    pub fn all_non_negative(self) -> bool {
        self.0 >= 0 && self.1 >= 0
    }

    pub fn iter_fill(from: Dims, to: Dims) -> impl Iterator<Item = Dims> {
        (from.1..to.1).flat_map(move |y| (from.0..to.0).map(move |x| Dims(x, y)))
    }
}

impl Ord for Dims {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.1, self.0).cmp(&(other.1, other.0))
    }
}

impl PartialOrd for Dims {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row(), self.col())
    }
}

impl Add for Dims {
    type Output = Dims;

    fn add(self, other: Dims) -> Dims {
        Dims(self.0 + other.0, self.1 + other.1)
    }
}

impl Sub for Dims {
    type Output = Dims;

    fn sub(self, other: Dims) -> Dims {
        Dims(self.0 - other.0, self.1 - other.1)
    }
}

impl Div<i32> for Dims {
    type Output = Dims;

    fn div(self, other: i32) -> Dims {
        Dims(self.0 / other, self.1 / other)
    }
}

impl From<(u16, u16)> for Dims {
    fn from(tuple: (u16, u16)) -> Self {
        Dims(tuple.0 as i32, tuple.1 as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::Dims;

    #[test]
    fn row_major_order() {
        let mut cells = vec![Dims(2, 0), Dims(0, 1), Dims(1, 0), Dims(0, 0)];
        cells.sort();
        assert_eq!(cells, vec![Dims(0, 0), Dims(1, 0), Dims(2, 0), Dims(0, 1)]);

        assert!(Dims::from_row_col(0, 9) < Dims::from_row_col(1, 0));
    }

    #[test]
    fn manhattan() {
        assert_eq!(Dims(1, 1).manhattan(Dims(3, 3)), 4);
        assert_eq!(Dims(3, 0).manhattan(Dims(0, 4)), 7);
        assert_eq!(Dims(2, 2).manhattan(Dims(2, 2)), 0);
    }

    #[test]
    fn row_col_accessors() {
        let pos = Dims::from_row_col(3, 7);
        assert_eq!(pos, Dims(7, 3));
        assert_eq!((pos.row(), pos.col()), (3, 7));
        assert_eq!(pos.to_string(), "(3,7)");
    }
}
