//! Correctness-checked timing harness.
//!
//! Strategies run one at a time on a shared worker pool. A strategy that
//! returns an error, panics, or produces a different answer than the ground
//! truth gets an invalid slot; the run itself never fails.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::par::{self, Schedule, WorkerPool};
use crate::results::{Results, StrategyResult};
use crate::strategy::{Strategy, SumMethod};

/// Vectors per worker below which the minimum length is found sequentially.
pub const PARALLEL_MIN_THRESHOLD: usize = 1000;

static DEFAULT_EXECUTOR: Lazy<Executor> = Lazy::new(Executor::global);

/// What happened inside a single strategy invocation, before its output is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodOutcome {
    Completed,
    Failed(String),
}

/// Invokes `method`, turning both returned errors and panics into [`MethodOutcome::Failed`].
pub fn invoke_method<M>(method: &M, data: &[Vec<i8>], out: &mut [i64], min_vector_size: usize) -> MethodOutcome
where
    M: SumMethod + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| method.sum_into(data, out, min_vector_size))) {
        Ok(Ok(())) => MethodOutcome::Completed,
        Ok(Err(err)) => MethodOutcome::Failed(format!("{:#}", err)),
        Err(payload) => MethodOutcome::Failed(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {}", msg)
    } else {
        "panicked with a non-string payload".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Executor {
    pool: Arc<WorkerPool>,
}

impl Executor {
    /// Harness on rayon's global pool, sized to the available parallelism.
    pub fn global() -> Self {
        Self::with_pool(Arc::new(WorkerPool::global()))
    }

    pub fn with_threads(threads: usize) -> Result<Self> {
        Ok(Self::with_pool(Arc::new(WorkerPool::with_threads(threads)?)))
    }

    pub fn with_pool(pool: Arc<WorkerPool>) -> Self {
        Self { pool }
    }

    pub fn threads(&self) -> usize {
        self.pool.threads()
    }

    /// Length of the shortest vector, `usize::MAX` for an empty dataset.
    pub fn size_of_smallest_vector(&self, data: &[Vec<i8>]) -> usize {
        let threshold = self.threads().saturating_mul(PARALLEL_MIN_THRESHOLD);
        if data.len() > threshold {
            self.pool.install(|| {
                par::reduce(
                    data,
                    Schedule::Guided(PARALLEL_MIN_THRESHOLD),
                    || usize::MAX,
                    |acc, vector| acc.min(vector.len()),
                    usize::min,
                )
            })
        } else {
            data.iter().map(Vec::len).fold(usize::MAX, usize::min)
        }
    }

    /// Times one attempt of `method`. Returns the elapsed time only when the
    /// method completed and its output equals `correct_solution` exactly.
    pub fn execute_method<M>(
        &self,
        method: &M,
        correct_solution: &[i64],
        data: &[Vec<i8>],
        min_vector_size: usize,
    ) -> StrategyResult
    where
        M: SumMethod + ?Sized,
    {
        let mut result = vec![0i64; data.len()];

        let (outcome, elapsed) = self.pool.install(|| {
            let begin = Instant::now();
            let outcome = invoke_method(method, data, &mut result, min_vector_size);
            (outcome, begin.elapsed())
        });

        if let MethodOutcome::Failed(reason) = outcome {
            warn!(target: "vsum::executor", "summing method failed: {}", reason);
            return None;
        }
        if result.as_slice() != correct_solution {
            let mismatches = result
                .iter()
                .zip(correct_solution)
                .filter(|(got, expected)| got != expected)
                .count()
                + result.len().abs_diff(correct_solution.len());
            warn!(
                target: "vsum::executor",
                "summing method produced {} incorrect sums out of {}",
                mismatches,
                correct_solution.len()
            );
            return None;
        }
        Some(elapsed)
    }

    /// Runs every strategy once, in [`Strategy::ALL`] order.
    pub fn execute_methods(&self, solution: &[i64], data: &[Vec<i8>]) -> Results {
        let shortest_vector_length = self.size_of_smallest_vector(data);
        debug!(
            target: "vsum::executor",
            vectors = data.len(),
            shortest_vector_length,
            threads = self.threads(),
            "executing summing methods"
        );

        let mut times: [StrategyResult; 5] = [None; 5];
        for strategy in Strategy::ALL {
            let time = self.execute_method(&strategy, solution, data, shortest_vector_length);
            debug!(
                target: "vsum::executor",
                strategy = strategy.key(),
                elapsed_ns = time.map(|d| d.as_nanos() as u64),
                "strategy finished"
            );
            times[strategy.index()] = time;
        }

        let [sequential, per_vector, shuffle, dynamic, static_sched] = times;
        Results::new(sequential, per_vector, shuffle, dynamic, static_sched)
    }
}

impl Default for Executor {
    fn default() -> Self {
        DEFAULT_EXECUTOR.clone()
    }
}

/// [`Executor::size_of_smallest_vector`] on the default executor.
pub fn size_of_smallest_vector(data: &[Vec<i8>]) -> usize {
    DEFAULT_EXECUTOR.size_of_smallest_vector(data)
}

/// [`Executor::execute_method`] on the default executor.
pub fn execute_method<M>(method: &M, correct_solution: &[i64], data: &[Vec<i8>], min_vector_size: usize) -> Option<Duration>
where
    M: SumMethod + ?Sized,
{
    DEFAULT_EXECUTOR.execute_method(method, correct_solution, data, min_vector_size)
}

/// [`Executor::execute_methods`] on the default executor.
pub fn execute_methods(solution: &[i64], data: &[Vec<i8>]) -> Results {
    DEFAULT_EXECUTOR.execute_methods(solution, data)
}
