#![warn(missing_docs)]

//! # `flowsolver`
//!
//! The editing and solving core of an interactive [Numberlink](https://en.wikipedia.org/wiki/Numberlink)
//! ("Flow Free") puzzle tool: a mutable endpoint grid ([`PuzzleState`]), a constraint encoder
//! ([`ConstraintSystem`]), and an asynchronous solve/cancel/replace loop ([`SolveOrchestrator`])
//! that keeps a published solution consistent with the most recently edited board.
//!
//! A front-end owns a [`PuzzleState`], mutates it in response to input, and calls
//! [`SolveOrchestrator::submit`] after each edit. Once per frame it calls
//! [`SolveOrchestrator::poll`] and renders from [`FrameView`], which exposes per-cell endpoint
//! labels, solved path labels, and which neighbor links carry a path segment.
//! Rendering and input themselves are out of scope; [`GridGeometry`] only supplies the cell
//! arithmetic a pixel surface needs.
//!
//! # Internals
//! Solving is driven by expressing the board as a Boolean satisfiability problem, handing it to
//! a SAT engine, and re-reading the board from the model.
//!
//! Conceptually every cell carries one integer unknown. A cell pre-labeled with a color class
//! is pinned to that value. For every cell we form the propositions "this cell equals that
//! grid-adjacent neighbor" and require that exactly one of them holds at an endpoint and exactly
//! two hold elsewhere, which forces each color class into a path between its two endpoints
//! (up to the known degree-only caveat: a class may also close into a loop away from any
//! endpoint, since nothing above speaks about connectivity).
//!
//! The integer unknowns are lowered to SAT one-hot over the label domain, and each
//! neighbor-equality proposition becomes one reified variable with an exact CNF biconditional.
//! The engine's verdict is either a full per-cell assignment or "unsatisfiable"; the latter is
//! a normal outcome, published as an explicit no-solution state.

pub use location::{Direction, Location};
pub use orchestrator::{SolveOrchestrator, SolveStatus, SolutionState};
pub use puzzle::{Label, PuzzleShapeError, PuzzleState};
pub use solver::{CancelToken, ConstraintSystem, SolutionGrid, SolveError, Verdict};
pub use view::{CellView, FrameView, GridGeometry};

pub(crate) mod location;
pub(crate) mod logic;
pub(crate) mod puzzle;
pub(crate) mod solver;
pub(crate) mod orchestrator;
pub(crate) mod view;
