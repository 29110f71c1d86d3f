/// Progress reporting for long-running reconciliations.
///
/// The engine calls the callback at throttled intervals with the number of
/// diagonal evaluations spent so far and the configured ceiling. Callers
/// should treat the numbers as advisory; a run can finish well before the
/// ceiling or be cut off at it.

pub trait ProgressCallback: Send {
    fn on_progress(&self, iterations: u64, max_iterations: u64);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_progress(&self, _iterations: u64, _max_iterations: u64) {}
}
