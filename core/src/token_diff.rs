//! Cancellable token-sequence diff.
//!
//! Greedy Myers O(ND) over token sequences with a per-round snapshot trace
//! for backtracking. The computation is driven one diagonal round per
//! [`TokenDiffEngine::step`] call, so the abort flag and the iteration
//! ceiling are honored at bounded intervals without preemption.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::edit_script::{EditOp, EditScript};
use crate::token::{tokens_match, Token};

/// Identifies one calculation owned by the engine.
///
/// Outcomes are published only against the engine's most recent run, so a
/// caller holding a stale id can never observe a superseding run's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(u64);

impl RunId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Cooperative cancellation handle.
///
/// Cheap to clone and safe to trigger from another thread; the engine
/// observes the request at its next step boundary.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_abort_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// More rounds remain; call `step` again.
    Running,
    /// The run finished; its outcome is available via `take_outcome`.
    Finished,
    /// An abort request was honored; the run left no result.
    Aborted,
}

/// Result of one finished calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffOutcome {
    pub script: EditScript,
    /// False when the iteration ceiling forced a best-effort, possibly
    /// non-minimal script.
    pub complete: bool,
    pub iterations: u64,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(
        "[RECOLLATE_ENGINE_001] calculation {run} is still in flight; request abort and drain it before starting another"
    )]
    Busy { run: u64 },
    #[error("[RECOLLATE_ENGINE_002] no calculation in flight")]
    NotRunning,
}

struct MyersTask {
    old: Vec<Token>,
    new: Vec<Token>,
    /// Furthest-x per diagonal, indexed by `k + (n + m)`.
    v: Vec<i64>,
    /// Snapshot of `v` taken at the start of each round, for backtracking.
    trace: Vec<Vec<i64>>,
    /// Next round to run.
    d: usize,
}

/// Owns at most one diff calculation at a time (see the concurrency
/// contract on [`Reconciler`](crate::Reconciler), which drives this engine).
pub struct TokenDiffEngine {
    max_iterations: Option<u64>,
    abort_flag: Arc<AtomicBool>,
    run_count: u64,
    iterations: u64,
    task: Option<MyersTask>,
    outcome: Option<(RunId, DiffOutcome)>,
}

impl TokenDiffEngine {
    pub fn new(max_iterations: Option<u64>) -> Self {
        TokenDiffEngine {
            max_iterations,
            abort_flag: Arc::new(AtomicBool::new(false)),
            run_count: 0,
            iterations: 0,
            task: None,
            outcome: None,
        }
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            flag: Arc::clone(&self.abort_flag),
        }
    }

    /// Requests abort of the current run; honored at the next step boundary.
    pub fn abort(&self) {
        self.abort_flag.store(true, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Number of runs started over the engine's lifetime.
    pub fn run_count(&self) -> u64 {
        self.run_count
    }

    /// Diagonals evaluated so far in the current or last run.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn max_iterations(&self) -> Option<u64> {
        self.max_iterations
    }

    /// Starts a new calculation. Degenerate inputs (either sequence empty)
    /// bypass the general algorithm and finish immediately; the outcome is
    /// then already available and `is_running` stays false.
    pub fn begin(&mut self, old: &[Token], new: &[Token]) -> Result<RunId, EngineError> {
        if self.task.is_some() {
            return Err(EngineError::Busy {
                run: self.run_count,
            });
        }
        self.abort_flag.store(false, Ordering::Relaxed);
        self.run_count += 1;
        self.iterations = 0;
        self.outcome = None;
        let run = RunId(self.run_count);
        debug!(
            "diff run {} started ({} old tokens, {} new tokens)",
            run.value(),
            old.len(),
            new.len()
        );

        if old.is_empty() || new.is_empty() {
            let script = degenerate_script(old.len(), new.len());
            self.outcome = Some((
                run,
                DiffOutcome {
                    script,
                    complete: true,
                    iterations: 0,
                    warnings: Vec::new(),
                },
            ));
            return Ok(run);
        }

        let width = 2 * (old.len() + new.len()) + 1;
        self.task = Some(MyersTask {
            old: old.to_vec(),
            new: new.to_vec(),
            v: vec![0; width],
            trace: Vec::new(),
            d: 0,
        });
        Ok(run)
    }

    /// Runs one diagonal round of the current calculation.
    pub fn step(&mut self) -> Result<StepStatus, EngineError> {
        let run = RunId(self.run_count);
        if self.task.is_none() {
            return Err(EngineError::NotRunning);
        }

        if self.abort_flag.load(Ordering::Relaxed) {
            let task = self.task.take();
            debug!(
                "diff run {} aborted at round {}",
                run.value(),
                task.map_or(0, |t| t.d)
            );
            self.outcome = None;
            return Ok(StepStatus::Aborted);
        }

        if let Some(max) = self.max_iterations {
            if self.iterations >= max {
                let task = self.task.take().ok_or(EngineError::NotRunning)?;
                let script = fallback_script(&task.old, &task.new);
                debug!(
                    "diff run {} hit the iteration ceiling at round {}",
                    run.value(),
                    task.d
                );
                self.outcome = Some((
                    run,
                    DiffOutcome {
                        script,
                        complete: false,
                        iterations: self.iterations,
                        warnings: vec![format!(
                            "iteration ceiling of {} reached after {} rounds; \
                             the edit script is best-effort and may not be minimal",
                            max, task.d
                        )],
                    },
                ));
                return Ok(StepStatus::Finished);
            }
        }

        let task = self.task.as_mut().ok_or(EngineError::NotRunning)?;
        let n = task.old.len() as i64;
        let m = task.new.len() as i64;
        let offset = n + m;
        let idx = |k: i64| (k + offset) as usize;
        let d = task.d as i64;

        task.trace.push(task.v.clone());

        let mut k = -d;
        let mut solved = false;
        while k <= d {
            self.iterations += 1;
            let mut x = if k == -d || (k != d && task.v[idx(k - 1)] < task.v[idx(k + 1)]) {
                task.v[idx(k + 1)]
            } else {
                task.v[idx(k - 1)] + 1
            };
            let mut y = x - k;
            while x < n && y < m && tokens_match(&task.old[x as usize], &task.new[y as usize]) {
                x += 1;
                y += 1;
            }
            task.v[idx(k)] = x;
            if x >= n && y >= m {
                solved = true;
                break;
            }
            k += 2;
        }

        if solved {
            let task = self.task.take().ok_or(EngineError::NotRunning)?;
            let script = backtrack(&task.trace, n, m, offset);
            debug!(
                "diff run {} finished after {} rounds, {} iterations",
                run.value(),
                task.d + 1,
                self.iterations
            );
            self.outcome = Some((
                run,
                DiffOutcome {
                    script,
                    complete: true,
                    iterations: self.iterations,
                    warnings: Vec::new(),
                },
            ));
            return Ok(StepStatus::Finished);
        }

        task.d += 1;
        Ok(StepStatus::Running)
    }

    /// Publishes the outcome of `run`, or `None` when the run was aborted,
    /// superseded, or already taken. A `None` here is the "no result"
    /// sentinel; it is never an empty-but-valid script.
    pub fn take_outcome(&mut self, run: RunId) -> Option<DiffOutcome> {
        match &self.outcome {
            Some((id, _)) if *id == run => self.outcome.take().map(|(_, outcome)| outcome),
            _ => None,
        }
    }
}

fn degenerate_script(old_len: usize, new_len: usize) -> EditScript {
    let mut ops = Vec::with_capacity(old_len + new_len);
    for old in 0..old_len {
        ops.push(EditOp::Delete { old: old as u32 });
    }
    for new in 0..new_len {
        ops.push(EditOp::Add { new: new as u32 });
    }
    EditScript::new(ops)
}

/// Best-effort script used when the ceiling fires: equal prefix and suffix
/// are kept, the middle is all-Delete then all-Add.
fn fallback_script(old: &[Token], new: &[Token]) -> EditScript {
    let n = old.len();
    let m = new.len();
    let mut prefix = 0;
    while prefix < n && prefix < m && tokens_match(&old[prefix], &new[prefix]) {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < n - prefix
        && suffix < m - prefix
        && tokens_match(&old[n - 1 - suffix], &new[m - 1 - suffix])
    {
        suffix += 1;
    }

    let mut ops = Vec::new();
    for i in 0..prefix {
        ops.push(EditOp::Keep {
            old: i as u32,
            new: i as u32,
        });
    }
    for old in prefix..n - suffix {
        ops.push(EditOp::Delete { old: old as u32 });
    }
    for new in prefix..m - suffix {
        ops.push(EditOp::Add { new: new as u32 });
    }
    for t in 0..suffix {
        ops.push(EditOp::Keep {
            old: (n - suffix + t) as u32,
            new: (m - suffix + t) as u32,
        });
    }
    EditScript::new(ops)
}

fn backtrack(trace: &[Vec<i64>], n: i64, m: i64, offset: i64) -> EditScript {
    let idx = |k: i64| (k + offset) as usize;
    let mut ops_rev: Vec<EditOp> = Vec::new();
    let mut x = n;
    let mut y = m;

    for (d, v) in trace.iter().enumerate().rev() {
        let d = d as i64;
        let k = x - y;
        let prev_k = if k == -d || (k != d && v[idx(k - 1)] < v[idx(k + 1)]) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = v[idx(prev_k)];
        let prev_y = prev_x - prev_k;

        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            ops_rev.push(EditOp::Keep {
                old: x as u32,
                new: y as u32,
            });
        }
        if d > 0 {
            if x == prev_x {
                ops_rev.push(EditOp::Add {
                    new: prev_y as u32,
                });
            } else {
                ops_rev.push(EditOp::Delete {
                    old: prev_x as u32,
                });
            }
        }
        x = prev_x;
        y = prev_y;
    }

    ops_rev.reverse();
    EditScript::new(ops_rev)
}
