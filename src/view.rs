use crate::location::{Dimension, Direction, Location};
use crate::orchestrator::SolutionState;
use crate::puzzle::{Label, PuzzleState};

/// Pixel-space placement of the board inside a window.
///
/// The longer board axis takes the full pixel `budget` and the other axis is scaled by the
/// aspect ratio, so cells stay square-ish; the grid is centered in the window. All arithmetic
/// is integer, matching a pixel canvas.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GridGeometry {
    origin: (i32, i32),
    cell: (i32, i32),
    size: (i32, i32),
    dims: (usize, usize),
}

impl GridGeometry {
    /// Place a `dims` board centered in a `window` of pixels, spending at most `budget` pixels
    /// on the longer axis.
    pub fn fit(window: (i32, i32), budget: i32, dims: (Dimension, Dimension)) -> Self {
        let (width, height) = (dims.0.get() as i32, dims.1.get() as i32);

        let size = if width < height {
            ((budget * width) / height, budget)
        } else if width > height {
            (budget, (budget * height) / width)
        } else {
            (budget, budget)
        };

        Self {
            origin: ((window.0 - size.0) / 2, (window.1 - size.1) / 2),
            cell: (size.0 / width, size.1 / height),
            size,
            dims: (width as usize, height as usize),
        }
    }

    /// Top-left pixel of the grid.
    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    /// Pixel size of one cell, `(width, height)`.
    pub fn cell_size(&self) -> (i32, i32) {
        self.cell
    }

    /// Total pixel size of the grid, `(width, height)`.
    pub fn size(&self) -> (i32, i32) {
        self.size
    }

    /// Top-left pixel of the cell at `location`.
    pub fn cell_origin(&self, location: Location) -> (i32, i32) {
        (
            self.origin.0 + self.cell.0 * location.0 as i32,
            self.origin.1 + self.cell.1 * location.1 as i32,
        )
    }

    /// Map a pixel position (e.g. a mouse press) to the cell under it, or [`None`] outside the
    /// grid.
    ///
    /// Integer division leaves a remainder strip of pixels past the last full cell; presses
    /// there clamp to the last row/column rather than indexing off the board.
    pub fn cell_at(&self, px: i32, py: i32) -> Option<Location> {
        if px < self.origin.0
            || py < self.origin.1
            || px >= self.origin.0 + self.size.0
            || py >= self.origin.1 + self.size.1
        {
            return None;
        }
        if self.cell.0 == 0 || self.cell.1 == 0 {
            // board has more cells than the budget has pixels
            return None;
        }

        let col = ((px - self.origin.0) / self.cell.0) as usize;
        let row = ((py - self.origin.1) / self.cell.1) as usize;
        Some(Location(col.min(self.dims.0 - 1), row.min(self.dims.1 - 1)))
    }
}

/// What the renderer needs to know about one cell this frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CellView {
    /// The endpoint label under edit, `0` for none. Raw and unbounded; a palette that runs out
    /// of distinct colors decides its own fallback.
    pub endpoint: Label,
    /// The solved label for this cell, or [`None`] while no solution is published.
    pub path: Option<Label>,
}

/// Read-only per-frame access to the board and its published solution.
///
/// Borrows the [`PuzzleState`] and the orchestrator's [`SolutionState`] for the duration of one
/// frame's drawing.
pub struct FrameView<'a> {
    puzzle: &'a PuzzleState,
    solution: &'a SolutionState,
}

impl<'a> FrameView<'a> {
    /// View `puzzle` together with `solution` (from [`SolveOrchestrator::solution`]).
    ///
    /// [`SolveOrchestrator::solution`]: crate::SolveOrchestrator::solution
    pub fn new(puzzle: &'a PuzzleState, solution: &'a SolutionState) -> Self {
        Self { puzzle, solution }
    }

    /// The frame data for one cell. Panics if `location` is off the board.
    pub fn cell(&self, location: Location) -> CellView {
        CellView {
            endpoint: self.puzzle.label_at(location),
            path: self
                .solution
                .grid()
                .and_then(|grid| grid.get(location.as_index()).copied()),
        }
    }

    /// Whether a path segment should be drawn from `location` toward `direction`: both cells
    /// are on the solved board and carry the same label.
    pub fn link(&self, location: Location, direction: Direction) -> bool {
        let Some(grid) = self.solution.grid() else {
            return false;
        };
        let (Some(here), Some(there)) = (
            grid.get(location.as_index()),
            grid.get(direction.attempt_from(location).as_index()),
        ) else {
            return false;
        };
        here == there
    }

    /// Whether the board should be tinted as having no solution.
    pub fn infeasible(&self) -> bool {
        self.solution.is_infeasible()
    }
}
