use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;

use log::{debug, warn};

use crate::puzzle::PuzzleState;
use crate::solver::{CancelToken, ConstraintSystem, SolutionGrid, SolveError, Verdict};

type Generation = u64;

struct SolveJob {
    generation: Generation,
    system: ConstraintSystem,
    cancel: CancelToken,
}

enum SolveReport {
    Started(Generation),
    Finished(Generation, Result<Verdict, SolveError>),
}

/// Where the orchestrator currently stands relative to its newest submission.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SolveStatus {
    /// No attempt outstanding; [`SolveOrchestrator::solution`] is authoritative for the newest
    /// submitted board.
    Idle,
    /// The newest submission is queued or being checked.
    Solving,
    /// The worker is still occupied by a superseded attempt; the newest submission has not been
    /// picked up yet.
    Stale,
}

/// The published solution for the newest submitted board.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SolutionState {
    /// Nothing has completed for this board yet (still solving, never submitted, or the last
    /// attempt failed).
    Unsolved,
    /// The board is solvable; here is the assignment.
    Solved(SolutionGrid),
    /// The board has no solution. Distinct from [`Unsolved`](Self::Unsolved): this is a
    /// completed verdict, not an absence of one.
    Infeasible,
}

impl SolutionState {
    /// The solved grid, if this is [`Solved`](Self::Solved).
    pub fn grid(&self) -> Option<&SolutionGrid> {
        match self {
            Self::Solved(grid) => Some(grid),
            _ => None,
        }
    }

    /// Whether this is a completed no-solution verdict.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible)
    }
}

/// Runs checks off the interactive thread and keeps the published solution consistent with the
/// newest submitted board.
///
/// One persistent worker thread performs at most one backend check at a time. Every
/// [`submit`](Self::submit) supersedes the previous attempt: its cancel token is flagged, and
/// its result, should it still arrive, is discarded. Each attempt carries a generation number,
/// and only a result matching the newest generation is ever published — last submitted wins,
/// not last finished, however the backend's timing falls out.
///
/// The interactive thread never blocks here: [`submit`](Self::submit) queues and returns, and
/// [`poll`](Self::poll) only drains whatever reports have already arrived. Polling once per
/// frame is the intended cadence.
pub struct SolveOrchestrator {
    jobs: Sender<SolveJob>,
    reports: Receiver<SolveReport>,
    cancel: Option<CancelToken>,
    latest: Generation,
    completed: Generation,
    running: Option<Generation>,
    solution: SolutionState,
}

impl SolveOrchestrator {
    /// Start an orchestrator and its worker thread.
    pub fn new() -> Self {
        let (job_tx, job_rx) = channel();
        let (report_tx, report_rx) = channel();
        thread::spawn(move || worker_loop(job_rx, report_tx));

        Self {
            jobs: job_tx,
            reports: report_rx,
            cancel: None,
            latest: 0,
            completed: 0,
            running: None,
            solution: SolutionState::Unsolved,
        }
    }

    /// Submit the current board for solving, superseding any outstanding attempt.
    ///
    /// Encodes a snapshot of `state` up front, so the caller is free to keep mutating the
    /// puzzle immediately. The published solution resets to [`SolutionState::Unsolved`] until
    /// this generation (or a newer one) completes.
    pub fn submit(&mut self, state: &PuzzleState) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }

        self.latest += 1;
        let cancel = CancelToken::new();
        self.cancel = Some(cancel.clone());
        self.solution = SolutionState::Unsolved;

        let job = SolveJob {
            generation: self.latest,
            system: ConstraintSystem::from(state),
            cancel,
        };
        if self.jobs.send(job).is_err() {
            // only possible if the worker died, which it guards against
            warn!("solve worker is gone; generation {} will never complete", self.latest);
        }
    }

    /// Drain finished work without blocking. Call once per frame.
    ///
    /// A result from a superseded generation is dropped silently (expected consequence of the
    /// cancellation policy, not an error). A failed check for the current generation publishes
    /// nothing and logs a warning; the interactive loop only ever observes solved, infeasible,
    /// or still-unsolved.
    pub fn poll(&mut self) {
        loop {
            match self.reports.try_recv() {
                Ok(report) => self.apply(report),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn apply(&mut self, report: SolveReport) {
        match report {
            SolveReport::Started(generation) => self.running = Some(generation),
            SolveReport::Finished(generation, outcome) => {
                if self.running == Some(generation) {
                    self.running = None;
                }
                if generation != self.latest {
                    debug!("discarding result of superseded solve generation {}", generation);
                    return;
                }

                self.completed = generation;
                self.solution = match outcome {
                    Ok(Verdict::Satisfiable(grid)) => SolutionState::Solved(grid),
                    Ok(Verdict::Unsatisfiable) => SolutionState::Infeasible,
                    Err(SolveError::Cancelled) => {
                        debug!("current generation {} reported cancellation", generation);
                        SolutionState::Unsolved
                    }
                    Err(e) => {
                        warn!("solve generation {} failed: {}", generation, e);
                        SolutionState::Unsolved
                    }
                };
            }
        }
    }

    /// Current position relative to the newest submission. See [`SolveStatus`].
    pub fn status(&self) -> SolveStatus {
        if self.completed == self.latest {
            SolveStatus::Idle
        } else {
            match self.running {
                Some(generation) if generation < self.latest => SolveStatus::Stale,
                _ => SolveStatus::Solving,
            }
        }
    }

    /// The published solution for the newest submitted board.
    pub fn solution(&self) -> &SolutionState {
        &self.solution
    }

    /// Whether a check the worker reported starting is still outstanding.
    #[cfg(test)]
    pub(crate) fn worker_busy(&self) -> bool {
        self.running.is_some()
    }
}

impl Default for SolveOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SolveOrchestrator {
    fn drop(&mut self) {
        // fire-and-forget stop request; the worker exits once its channel drains, and nothing
        // waits on a check that is already in flight
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
    }
}

fn worker_loop(jobs: Receiver<SolveJob>, reports: Sender<SolveReport>) {
    while let Ok(received) = jobs.recv() {
        // the queue may hold newer submissions; only the newest can still publish, so skip
        // straight to it
        let mut job = received;
        while let Ok(newer) = jobs.try_recv() {
            job = newer;
        }

        if job.cancel.is_cancelled() {
            continue;
        }

        if reports.send(SolveReport::Started(job.generation)).is_err() {
            break;
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| job.system.check(&job.cancel)))
            .unwrap_or_else(|_| Err(SolveError::WorkerPanicked));

        if reports.send(SolveReport::Finished(job.generation, outcome)).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SolveOrchestrator, SolveReport, SolveStatus, SolutionState};
    use crate::solver::SolveError;

    // failure reports never reach the channel from a healthy worker, so these feed them to the
    // state machine directly

    #[test]
    fn failed_check_completes_without_publishing() {
        let mut orchestrator = SolveOrchestrator::new();
        orchestrator.latest = 1;
        orchestrator.apply(SolveReport::Started(1));
        assert_eq!(orchestrator.status(), SolveStatus::Solving);

        orchestrator.apply(SolveReport::Finished(
            1,
            Err(SolveError::Backend("injected failure".to_owned())),
        ));
        assert_eq!(orchestrator.status(), SolveStatus::Idle);
        assert_eq!(*orchestrator.solution(), SolutionState::Unsolved);
    }

    #[test]
    fn cancellation_of_the_current_check_completes_without_publishing() {
        let mut orchestrator = SolveOrchestrator::new();
        orchestrator.latest = 1;
        orchestrator.apply(SolveReport::Finished(1, Err(SolveError::Cancelled)));
        assert_eq!(orchestrator.status(), SolveStatus::Idle);
        assert_eq!(*orchestrator.solution(), SolutionState::Unsolved);
    }

    #[test]
    fn superseded_failure_is_discarded() {
        let mut orchestrator = SolveOrchestrator::new();
        orchestrator.latest = 2;
        orchestrator.apply(SolveReport::Started(1));
        orchestrator.apply(SolveReport::Finished(1, Err(SolveError::WorkerPanicked)));

        // generation 2 is still outstanding; the stale failure must not complete it
        assert_eq!(orchestrator.status(), SolveStatus::Solving);
        assert_eq!(*orchestrator.solution(), SolutionState::Unsolved);
    }
}
