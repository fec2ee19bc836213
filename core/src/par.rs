//! Fork-join building blocks shared by the summation strategies.
//!
//! Every helper blocks until all workers have finished their share. Output
//! slots are handed out as disjoint `&mut` chunks, so no two workers ever
//! write the same slot.

use std::fmt;

use anyhow::{Context, Result};
use rayon::prelude::*;

/// How a loop over `len` items is cut into jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// One contiguous, equally sized block per worker, fixed before the loop starts.
    Static,
    /// Chunks of the given size dealt round-robin to the workers before the
    /// loop starts: worker `w` owns chunks `w`, `w + workers`, and so on.
    StaticChunked(usize),
    /// Blocks of the given size, each its own job, claimed by whichever worker is idle.
    Dynamic(usize),
    /// Adaptive splitting that hands out large blocks first and never goes
    /// below the given block size.
    Guided(usize),
}

impl Schedule {
    pub(crate) fn block_len(self, len: usize, workers: usize) -> usize {
        let block = match self {
            Schedule::Static => len.div_ceil(workers.max(1)),
            Schedule::StaticChunked(n) | Schedule::Dynamic(n) | Schedule::Guided(n) => n,
        };
        block.max(1)
    }
}

/// Writes `f(i)` into `out[i]` for every index.
pub fn fill_indexed<T, F>(out: &mut [T], schedule: Schedule, f: F)
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    if out.is_empty() {
        return;
    }

    match schedule {
        Schedule::Guided(min_len) => out
            .par_iter_mut()
            .enumerate()
            .with_min_len(min_len.max(1))
            .for_each(|(i, slot)| *slot = f(i)),
        Schedule::StaticChunked(_) => {
            let workers = rayon::current_num_threads().max(1);
            let chunk = schedule.block_len(out.len(), workers);
            let mut lanes: Vec<Vec<(usize, &mut [T])>> = (0..workers).map(|_| Vec::new()).collect();
            for (k, slab) in out.chunks_mut(chunk).enumerate() {
                lanes[k % workers].push((k * chunk, slab));
            }
            lanes.into_par_iter().with_max_len(1).for_each(|lane| {
                for (base, slab) in lane {
                    for (offset, slot) in slab.iter_mut().enumerate() {
                        *slot = f(base + offset);
                    }
                }
            });
        }
        Schedule::Static | Schedule::Dynamic(_) => {
            let block = schedule.block_len(out.len(), rayon::current_num_threads());
            out.par_chunks_mut(block)
                .with_max_len(1)
                .enumerate()
                .for_each(|(block_idx, chunk)| {
                    let base = block_idx * block;
                    for (offset, slot) in chunk.iter_mut().enumerate() {
                        *slot = f(base + offset);
                    }
                });
        }
    }
}

/// Folds `items` into one value. `combine_op` must be associative and
/// commutative: the order in which partial results meet is unspecified.
pub fn reduce<I, T, ID, F, C>(items: &[I], schedule: Schedule, identity: ID, fold_op: F, combine_op: C) -> T
where
    I: Sync,
    T: Send,
    ID: Fn() -> T + Sync + Send,
    F: Fn(T, &I) -> T + Sync + Send,
    C: Fn(T, T) -> T + Sync + Send,
{
    match schedule {
        Schedule::Guided(min_len) => items
            .par_iter()
            .with_min_len(min_len.max(1))
            .fold(&identity, |acc, item| fold_op(acc, item))
            .reduce(&identity, &combine_op),
        Schedule::StaticChunked(_) => {
            let workers = rayon::current_num_threads().max(1);
            let chunk = schedule.block_len(items.len(), workers);
            (0..workers)
                .into_par_iter()
                .with_max_len(1)
                .map(|lane| {
                    items
                        .chunks(chunk)
                        .skip(lane)
                        .step_by(workers)
                        .flatten()
                        .fold(identity(), &fold_op)
                })
                .reduce(&identity, &combine_op)
        }
        Schedule::Static | Schedule::Dynamic(_) => {
            let block = schedule.block_len(items.len(), rayon::current_num_threads());
            items
                .par_chunks(block)
                .with_max_len(1)
                .map(|chunk| chunk.iter().fold(identity(), &fold_op))
                .reduce(&identity, &combine_op)
        }
    }
}

/// Worker threads the strategies fan out onto.
pub struct WorkerPool {
    kind: PoolKind,
}

enum PoolKind {
    /// rayon's process-wide pool, sized to the available parallelism.
    Global,
    Dedicated(rayon::ThreadPool),
}

impl WorkerPool {
    pub fn global() -> Self {
        Self { kind: PoolKind::Global }
    }

    pub fn with_threads(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|idx| format!("vsum-worker-{}", idx))
            .build()
            .with_context(|| format!("build worker pool with {} threads", threads))?;
        Ok(Self {
            kind: PoolKind::Dedicated(pool),
        })
    }

    pub fn threads(&self) -> usize {
        match &self.kind {
            PoolKind::Global => rayon::current_num_threads(),
            PoolKind::Dedicated(pool) => pool.current_num_threads(),
        }
    }

    /// Runs `op` with this pool as the target of every parallel helper it calls.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.kind {
            PoolKind::Global => op(),
            PoolKind::Dedicated(pool) => pool.install(op),
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PoolKind::Global => "global",
            PoolKind::Dedicated(_) => "dedicated",
        };
        f.debug_struct("WorkerPool")
            .field("kind", &kind)
            .field("threads", &self.threads())
            .finish()
    }
}
