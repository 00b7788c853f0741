use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::Itertools;
use ndarray::Array2;
use varisat::{CnfFormula, Lit, Solver, Var};

use crate::location::{Dimension, Direction, Location};
use crate::logic::{exactly_k, exactly_one};
use crate::puzzle::{Label, PuzzleState};

/// A solved board: one [`Label`] per cell, same shape as the puzzle it was built from.
pub type SolutionGrid = Array2<Label>;

/// Outcome of checking one [`ConstraintSystem`].
///
/// Unsatisfiability is a verdict, not an error; a puzzle with no solution is still a valid
/// puzzle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// No assignment satisfies the board.
    Unsatisfiable,
    /// The board is solvable; here is one solution.
    Satisfiable(SolutionGrid),
}

/// Reasons a check can fail (as opposed to concluding [`Verdict::Unsatisfiable`]).
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    /// The SAT backend itself reported an error.
    #[error("SAT backend error: {0}")]
    Backend(String),
    /// A satisfiable model pinned no label for some cell. This should probably never happen.
    #[error("model assigns no label to cell ({0}, {1})")]
    MissingLabel(usize, usize),
    /// The check was abandoned because its attempt was superseded.
    #[error("check cancelled before the backend ran")]
    Cancelled,
    /// The background worker died mid-check.
    #[error("solve worker panicked")]
    WorkerPanicked,
}

/// Cooperative stop flag shared between whoever owns an attempt and the in-flight check.
///
/// Cancellation is best-effort: the flag is consulted before the backend runs, but the backend
/// has no mid-search interrupt hook, so a superseded check may still run to completion. Stale
/// results are discarded by generation afterwards; nothing relies on the flag stopping work
/// promptly.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the holder abandon its work.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// An immutable constraint system encoding one snapshot of a [`PuzzleState`].
///
/// Built with [`From`] over a `&PuzzleState`; holds no reference back to the puzzle, so it can move to
/// a worker thread while the puzzle keeps changing. Consumed by [`check`](Self::check).
///
/// # Logical setup
/// Conceptually each cell holds one integer unknown, lowered one-hot over the label domain
/// `0..=max_label`: variable `(cell, a)` states "this cell's value is `a`". Endpoint cells are
/// pinned to their label through solver assumptions; every other cell gets an exactly-one
/// constraint over its domain. Label `0` is an ordinary value here, which is what lets a region
/// with no endpoints (a closed loop) satisfy the degree rules below.
///
/// Each pair of grid-adjacent cells `u`, `v` gets one proposition variable `p` with the exact
/// biconditional `p <=> (u = v)`:
/// for every value `a`, `p` and `u = a` imply `v = a` (and symmetrically), and `u = a` and
/// `v = a` imply `p`.
///
/// Finally, per cell, a cardinality constraint over its incident propositions: exactly one
/// neighbor matches at an endpoint, exactly two elsewhere. An isolated cell has too few
/// neighbors to ever meet its target, which makes e.g. a 1x1 board unsatisfiable.
pub struct ConstraintSystem {
    dims: (Dimension, Dimension),
    num_labels: usize,
    formula: CnfFormula,
    assumptions: Vec<Lit>,
}

impl From<&PuzzleState> for ConstraintSystem {
    fn from(state: &PuzzleState) -> Self {
        let (width, height) = (state.width(), state.height());
        let cells = width * height;
        let num_labels = state.max_label() + 1;
        let cell_var = |location: Location, a: usize| {
            Var::from_index((location.1 * width + location.0) * num_labels + a)
        };

        let mut clauses: Vec<Vec<Lit>> = Vec::new();
        let mut assumptions: Vec<Lit> = Vec::new();
        // per cell, the proposition vars of edges touching it
        let mut incident: Vec<Vec<Var>> = vec![Vec::with_capacity(4); cells];
        let mut next_var = cells * num_labels;

        for y in 0..height {
            for x in 0..width {
                let here = Location(x, y);
                let label = state.label_at(here);

                if label != 0 {
                    // the value of this cell is the label already assigned, and no other;
                    // we tell the solver to assume this is so
                    assumptions.extend(
                        (0..num_labels).map(|a| cell_var(here, a).lit(a == label)),
                    );
                } else {
                    clauses.extend(exactly_one(
                        (0..num_labels).map(|a| cell_var(here, a)).collect_vec(),
                    ));
                }

                // one proposition per undirected edge; forward directions visit each once
                for direction in Direction::FORWARD {
                    let neighbor = direction.attempt_from(here);
                    if state.get(neighbor).is_none() {
                        continue;
                    }

                    let prop = Var::from_index(next_var);
                    next_var += 1;

                    for a in 0..num_labels {
                        let u = cell_var(here, a);
                        let v = cell_var(neighbor, a);
                        // p holding forces the values to agree...
                        clauses.push(vec![prop.negative(), u.negative(), v.positive()]);
                        clauses.push(vec![prop.negative(), v.negative(), u.positive()]);
                        // ...and agreeing values force p
                        clauses.push(vec![prop.positive(), u.negative(), v.negative()]);
                    }

                    incident[y * width + x].push(prop);
                    incident[neighbor.1 * width + neighbor.0].push(prop);
                }
            }
        }

        for (index, props) in incident.into_iter().enumerate() {
            let here = Location(index % width, index / width);
            let matches_wanted = if state.is_endpoint(here) { 1 } else { 2 };
            clauses.extend(exactly_k(props, matches_wanted));
        }

        Self {
            dims: state.dims(),
            num_labels,
            formula: CnfFormula::from(clauses),
            assumptions,
        }
    }
}

impl ConstraintSystem {
    /// Dimensions `(width, height)` of the puzzle snapshot this system was built from.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    /// Run the SAT backend over this system and interpret its verdict.
    ///
    /// Returns [`Verdict::Unsatisfiable`] or [`Verdict::Satisfiable`] with the decoded
    /// [`SolutionGrid`]; [`Err`] only for backend failures, an incomplete model, or
    /// cancellation observed before the backend ran.
    pub fn check(&self, cancel: &CancelToken) -> Result<Verdict, SolveError> {
        if cancel.is_cancelled() {
            return Err(SolveError::Cancelled);
        }

        let mut solver = Solver::new();
        solver.add_formula(&self.formula);
        solver.assume(&self.assumptions);

        match solver.solve() {
            Err(e) => Err(SolveError::Backend(e.to_string())),
            Ok(false) => Ok(Verdict::Unsatisfiable),
            Ok(true) => {
                let model = solver
                    .model()
                    .ok_or_else(|| SolveError::Backend("satisfiable check produced no model".to_owned()))?;
                self.read_model(&model).map(Verdict::Satisfiable)
            }
        }
    }

    /// Decode a model into a [`SolutionGrid`] by scanning each cell's domain for the one
    /// positive label variable. The backend's assignment is trusted as-is.
    fn read_model(&self, model: &[Lit]) -> Result<SolutionGrid, SolveError> {
        let (width, height) = (self.dims.0.get(), self.dims.1.get());
        let mut grid = SolutionGrid::from_elem((height, width), 0);

        for y in 0..height {
            for x in 0..width {
                let base = (y * width + x) * self.num_labels;
                let label = (0..self.num_labels)
                    .find(|a| model.get(base + a).map_or(false, |lit| lit.is_positive()));

                match label {
                    Some(a) => grid[(y, x)] = a,
                    None => return Err(SolveError::MissingLabel(x, y)),
                }
            }
        }

        Ok(grid)
    }
}
