//! The five per-vector summation strategies under test.
//!
//! Each strategy writes one `i64` sum per input vector into the caller's
//! buffer and only ever reads the input. Parallel strategies fan out onto the
//! currently installed rayon pool.

use std::fmt;

use anyhow::{Result, anyhow};
use rand::seq::SliceRandom;

use crate::par::{self, Schedule};

/// Chunk size of the inner reduction in [`sum_per_vector`], dealt round-robin to workers.
pub const INNER_CHUNK: usize = 256;

/// Vectors claimed per job by [`sum_dynamic`].
pub const DYNAMIC_CHUNK: usize = 1;

/// Anything the harness can time: fill `out` with one sum per vector of `data`.
pub trait SumMethod: Sync {
    fn sum_into(&self, data: &[Vec<i8>], out: &mut [i64], min_vector_size: usize) -> Result<()>;
}

impl<F> SumMethod for F
where
    F: Fn(&[Vec<i8>], &mut [i64], usize) -> Result<()> + Sync,
{
    fn sum_into(&self, data: &[Vec<i8>], out: &mut [i64], min_vector_size: usize) -> Result<()> {
        self(data, out, min_vector_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Sequential,
    PerVector,
    Shuffle,
    Dynamic,
    Static,
}

impl Strategy {
    /// Declared order; reports list their columns in this order.
    pub const ALL: [Strategy; 5] = [
        Strategy::Sequential,
        Strategy::PerVector,
        Strategy::Shuffle,
        Strategy::Dynamic,
        Strategy::Static,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::PerVector => "per_vector",
            Strategy::Shuffle => "shuffle",
            Strategy::Dynamic => "dynamic",
            Strategy::Static => "static",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strategy::Sequential => "Sequential",
            Strategy::PerVector => "Vector-level Parallelism",
            Strategy::Shuffle => "Shuffling",
            Strategy::Dynamic => "Dynamic Scheduling",
            Strategy::Static => "Static Scheduling",
        }
    }

    /// Position in [`Strategy::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl SumMethod for Strategy {
    fn sum_into(&self, data: &[Vec<i8>], out: &mut [i64], min_vector_size: usize) -> Result<()> {
        match self {
            Strategy::Sequential => sum_sequential(data, out, min_vector_size),
            Strategy::PerVector => sum_per_vector(data, out, min_vector_size),
            Strategy::Shuffle => sum_shuffle(data, out, min_vector_size),
            Strategy::Dynamic => sum_dynamic(data, out, min_vector_size),
            Strategy::Static => sum_static(data, out, min_vector_size),
        }
    }
}

fn check_output(data: &[Vec<i8>], out: &[i64]) -> Result<()> {
    if data.len() != out.len() {
        return Err(anyhow!(
            "output holds {} slots but the dataset has {} vectors",
            out.len(),
            data.len()
        ));
    }
    Ok(())
}

#[inline]
fn sum_vector(vector: &[i8]) -> i64 {
    vector.iter().map(|&n| i64::from(n)).sum()
}

/// Single-threaded baseline.
pub fn sum_sequential(data: &[Vec<i8>], out: &mut [i64], _min_vector_size: usize) -> Result<()> {
    check_output(data, out)?;
    for (vector, slot) in data.iter().zip(out.iter_mut()) {
        *slot = sum_vector(vector);
    }
    Ok(())
}

/// Parallel over vectors, and additionally inside every vector of at least
/// `min_vector_size` elements. Pays off for a few very long vectors.
pub fn sum_per_vector(data: &[Vec<i8>], out: &mut [i64], min_vector_size: usize) -> Result<()> {
    check_output(data, out)?;
    par::fill_indexed(out, Schedule::Static, |i| {
        let vector = &data[i];
        if vector.len() >= min_vector_size {
            par::reduce(
                vector,
                Schedule::StaticChunked(INNER_CHUNK),
                || 0i64,
                |acc, &n| acc + i64::from(n),
                |a, b| a + b,
            )
        } else {
            sum_vector(vector)
        }
    });
    Ok(())
}

/// Static partition over a randomly permuted visiting order, which breaks any
/// correlation between vector length and position.
pub fn sum_shuffle(data: &[Vec<i8>], out: &mut [i64], _min_vector_size: usize) -> Result<()> {
    check_output(data, out)?;
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.shuffle(&mut rand::rng());

    let mut shuffled = vec![0i64; order.len()];
    par::fill_indexed(&mut shuffled, Schedule::Static, |k| sum_vector(&data[order[k]]));
    for (&i, sum) in order.iter().zip(shuffled) {
        out[i] = sum;
    }
    Ok(())
}

/// Original order, vectors claimed on demand by idle workers.
pub fn sum_dynamic(data: &[Vec<i8>], out: &mut [i64], _min_vector_size: usize) -> Result<()> {
    check_output(data, out)?;
    par::fill_indexed(out, Schedule::Dynamic(DYNAMIC_CHUNK), |i| sum_vector(&data[i]));
    Ok(())
}

/// Original order, one contiguous block of vectors per worker.
pub fn sum_static(data: &[Vec<i8>], out: &mut [i64], _min_vector_size: usize) -> Result<()> {
    check_output(data, out)?;
    par::fill_indexed(out, Schedule::Static, |i| sum_vector(&data[i]));
    Ok(())
}
