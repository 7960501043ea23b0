use serde::{Deserialize, Serialize};

/// A pixel position on the grid. `x` is the column, `y` is the row.
///
/// Serialized as an `[x, y]` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    /// Marker stored at the head of every region. Not a grid position.
    pub const SENTINEL: Cell = Cell { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.x, cell.y)
    }
}

/// Extents of a `width × height` grid.
///
/// Rows are indexed by `y` in `0..height`, columns by `x` in `0..width`.
/// Non-positive extents describe an empty grid rather than an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

impl GridSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of columns, zero when the grid is empty.
    pub fn column_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize
        }
    }

    /// Number of rows, zero when the grid is empty.
    pub fn row_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.height as usize
        }
    }

    pub fn cell_count(&self) -> usize {
        self.column_count() * self.row_count()
    }

    /// Length of the grid diagonal. Upper bound on the distance between two in-grid points.
    pub fn diagonal(&self) -> f64 {
        f64::from(self.width).hypot(f64::from(self.height))
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    /// Row-major index of `cell`, `None` outside the grid.
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.y as usize * self.column_count() + cell.x as usize)
    }

    /// All cells of one row, in increasing column order.
    pub fn row(&self, y: i32) -> impl Iterator<Item = Cell> {
        (0..self.width.max(0)).map(move |x| Cell::new(x, y))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let rows = if self.is_empty() { 0 } else { self.height };
        (0..rows).flat_map(move |y| self.row(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_not_a_grid_cell() {
        assert!(Cell::SENTINEL.is_sentinel());
        assert!(!Cell::new(0, 0).is_sentinel());
        assert!(!GridSize::new(10, 10).contains(Cell::SENTINEL));
    }

    #[test]
    fn cell_tuple_conversions() {
        let cell: Cell = (3, -4).into();
        assert_eq!(cell, Cell::new(3, -4));
        assert_eq!(<(i32, i32)>::from(cell), (3, -4));
    }

    #[test]
    fn empty_when_any_extent_is_not_positive() {
        assert!(GridSize::new(0, 5).is_empty());
        assert!(GridSize::new(5, 0).is_empty());
        assert!(GridSize::new(-3, 5).is_empty());
        assert!(!GridSize::new(1, 1).is_empty());
        assert_eq!(GridSize::new(-3, 5).cell_count(), 0);
        assert_eq!(GridSize::new(5, -1).row_count(), 0);
        assert_eq!(GridSize::new(5, -1).column_count(), 0);
        assert_eq!(GridSize::new(-3, 5).cells().count(), 0);
    }

    #[test]
    fn diagonal_length() {
        assert_eq!(GridSize::new(3, 4).diagonal(), 5.0);
        assert_eq!(GridSize::new(0, 0).diagonal(), 0.0);
    }

    #[test]
    fn contains_and_index_of() {
        let size = GridSize::new(4, 3);
        assert!(size.contains(Cell::new(0, 0)));
        assert!(size.contains(Cell::new(3, 2)));
        assert!(!size.contains(Cell::new(4, 0)));
        assert!(!size.contains(Cell::new(0, 3)));
        assert_eq!(size.index_of(Cell::new(1, 2)), Some(9));
        assert_eq!(size.index_of(Cell::new(-1, 0)), None);
    }

    #[test]
    fn cells_are_row_major() {
        let cells: Vec<(i32, i32)> = GridSize::new(2, 2).cells().map(Into::into).collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(GridSize::new(7, 5).cells().count(), 35);
    }
}
