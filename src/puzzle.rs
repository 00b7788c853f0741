use std::num::NonZero;

use ndarray::Array2;

use crate::location::{Dimension, Location};

/// A color-class label. `0` marks an empty cell; any positive value is an endpoint of that
/// color class (and, in a solution, a path cell of that class).
pub type Label = usize;

/// Reasons row input cannot form a [`PuzzleState`].
#[derive(Debug, thiserror::Error)]
pub enum PuzzleShapeError {
    /// No rows, or rows with no cells.
    #[error("a puzzle needs at least one row and one column")]
    Empty,
    /// A row whose length disagrees with the first row's.
    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Cells present in that row.
        got: usize,
        /// Cells every row must have.
        expected: usize,
    },
}

/// The mutable endpoint grid under edit.
///
/// Cells hold [`Label`]s and are addressed by [`Location`]. The grid is always rectangular;
/// [`resize`](Self::resize) zero-pads growth and truncates shrinkage on both axes.
///
/// A `PuzzleState` has a single owner (the interactive session). Solving never borrows it
/// across a thread boundary; the encoder copies what it needs up front.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PuzzleState {
    cells: Array2<Label>,
}

impl PuzzleState {
    /// An all-empty board with the given `(width, height)`.
    pub fn new(dims: (Dimension, Dimension)) -> Self {
        Self {
            cells: Array2::from_elem((dims.1.get(), dims.0.get()), 0),
        }
    }

    /// Build a board from rows of labels, top row first.
    pub fn from_rows(rows: Vec<Vec<Label>>) -> Result<Self, PuzzleShapeError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(PuzzleShapeError::Empty);
        }

        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(PuzzleShapeError::RaggedRow {
                    row,
                    got: cells.len(),
                    expected: width,
                });
            }
        }

        Ok(Self {
            cells: Array2::from_shape_vec((height, width), rows.into_iter().flatten().collect())
                .map_err(|_| PuzzleShapeError::Empty)?,
        })
    }

    /// The board the interactive session opens with.
    pub fn starter() -> Self {
        Self::from_rows(vec![
            vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1],
            vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 0, 2, 3, 4, 5, 0, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 6, 7, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 4, 5, 0, 0, 8, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 6, 0, 0, 0, 9, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 0, 8, 10, 0, 0, 0, 0, 0, 0, 0, 7, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 0, 0, 11, 0, 11, 12, 0, 0],
            vec![0, 3, 0, 0, 0, 0, 0, 0, 0, 13, 0, 0, 0, 0],
            vec![0, 14, 0, 0, 0, 14, 0, 10, 0, 0, 13, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 9, 12, 0, 0, 0],
            vec![0, 0, 15, 0, 0, 0, 0, 15, 0, 0, 0, 0, 0, 0],
            vec![2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        ])
        .unwrap()
    }

    /// Board width in cells.
    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// Board height in cells.
    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// Board dimensions as `(width, height)`.
    pub fn dims(&self) -> (Dimension, Dimension) {
        // the array shape came from Dimensions or a nonempty row check
        (
            NonZero::new(self.width()).unwrap(),
            NonZero::new(self.height()).unwrap(),
        )
    }

    /// The label at `location`, or [`None`] out of bounds.
    pub fn get(&self, location: Location) -> Option<Label> {
        self.cells.get(location.as_index()).copied()
    }

    /// The label at `location`. Panics out of bounds.
    pub fn label_at(&self, location: Location) -> Label {
        self.cells[location.as_index()]
    }

    /// Whether `location` holds an endpoint (nonzero label). Panics out of bounds.
    pub fn is_endpoint(&self, location: Location) -> bool {
        self.label_at(location) != 0
    }

    /// The largest label anywhere on the board, `0` if the board is all-empty.
    pub fn max_label(&self) -> Label {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Resize to `(width, height)`, keeping the overlap with the old board. Grown rows and
    /// columns fill with empty cells; shrunk ones are truncated.
    pub fn resize(&mut self, dims: (Dimension, Dimension)) {
        let (width, height) = (dims.0.get(), dims.1.get());
        let mut next = Array2::from_elem((height, width), 0);
        for ((y, x), label) in self.cells.indexed_iter() {
            if y < height && x < width {
                next[(y, x)] = *label;
            }
        }
        self.cells = next;
    }

    /// Raise the label at `location` by one. Panics out of bounds.
    pub fn increment(&mut self, location: Location) {
        self.cells[location.as_index()] += 1;
    }

    /// Lower the label at `location` by one, stopping at `0`; lowering an empty cell is a
    /// no-op. Panics out of bounds.
    pub fn decrement(&mut self, location: Location) {
        let cell = &mut self.cells[location.as_index()];
        *cell = cell.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZero;

    use super::{PuzzleShapeError, PuzzleState};
    use crate::location::Location;

    fn dims(w: usize, h: usize) -> (NonZero<usize>, NonZero<usize>) {
        (NonZero::new(w).unwrap(), NonZero::new(h).unwrap())
    }

    #[test]
    fn from_rows_rejects_bad_shapes() {
        assert!(matches!(
            PuzzleState::from_rows(vec![]),
            Err(PuzzleShapeError::Empty)
        ));
        assert!(matches!(
            PuzzleState::from_rows(vec![vec![], vec![]]),
            Err(PuzzleShapeError::Empty)
        ));
        assert!(matches!(
            PuzzleState::from_rows(vec![vec![0, 1], vec![0]]),
            Err(PuzzleShapeError::RaggedRow { row: 1, got: 1, expected: 2 })
        ));
    }

    #[test]
    fn resize_grows_with_empty_cells() {
        let mut state = PuzzleState::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        state.resize(dims(3, 4));

        assert_eq!(state.width(), 3);
        assert_eq!(state.height(), 4);
        assert_eq!(state.label_at(Location(1, 1)), 4);
        assert_eq!(state.label_at(Location(2, 0)), 0);
        assert_eq!(state.label_at(Location(2, 3)), 0);
    }

    #[test]
    fn resize_truncates() {
        let mut state = PuzzleState::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]).unwrap();
        state.resize(dims(2, 1));

        assert_eq!(state.width(), 2);
        assert_eq!(state.height(), 1);
        assert_eq!(state.label_at(Location(0, 0)), 1);
        assert_eq!(state.label_at(Location(1, 0)), 2);
        assert_eq!(state.get(Location(2, 0)), None);
        assert_eq!(state.get(Location(0, 1)), None);
    }

    #[test]
    fn resize_round_trip_keeps_overlap() {
        let mut state = PuzzleState::from_rows(vec![vec![1, 0], vec![0, 2]]).unwrap();
        state.resize(dims(5, 5));
        state.resize(dims(2, 2));

        assert_eq!(state, PuzzleState::from_rows(vec![vec![1, 0], vec![0, 2]]).unwrap());
    }

    #[test]
    fn increment_is_unbounded_and_decrement_floors_at_zero() {
        let mut state = PuzzleState::new(dims(2, 1));
        let cell = Location(0, 0);

        state.decrement(cell);
        assert_eq!(state.label_at(cell), 0);

        for _ in 0..40 {
            state.increment(cell);
        }
        assert_eq!(state.label_at(cell), 40);
        assert_eq!(state.max_label(), 40);

        state.decrement(cell);
        assert_eq!(state.label_at(cell), 39);
    }

    #[test]
    fn starter_board_is_fourteen_square() {
        let state = PuzzleState::starter();
        assert_eq!(state.width(), 14);
        assert_eq!(state.height(), 14);
        assert_eq!(state.max_label(), 15);
        assert_eq!(state.label_at(Location(10, 0)), 1);
        assert_eq!(state.label_at(Location(0, 13)), 2);
    }
}
