//! Deterministic synthetic workloads.
//!
//! Every entry point that does not take a generator builds a fresh `StdRng`
//! from a fixed seed, so two calls with the same shape always produce the
//! same bytes and the same ground truth. The `*_with` variants accept an
//! explicitly constructed generator for callers that need their own stream.

use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

/// Seed of the element generator used by [`generate_data`].
pub const DATA_SEED: u64 = 0;

/// Seed of the length generator used by [`generate_vector_sizes`]. Distinct
/// from [`DATA_SEED`] so lengths and element values are not drawn from the
/// same stream.
pub const SIZE_SEED: u64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum GenerateError {
    /// The ground-truth buffer does not have one slot per vector.
    LengthMismatch { vectors: usize, solution: usize },
    /// Normal distribution parameters were rejected.
    InvalidDistribution { mean: f32, sigma: f32 },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::LengthMismatch { vectors, solution } => write!(
                f,
                "Solution vector and number of data vectors must match ({} vectors, {} solution slots)",
                vectors, solution
            ),
            GenerateError::InvalidDistribution { mean, sigma } => {
                write!(f, "invalid normal distribution parameters (mean {}, sigma {})", mean, sigma)
            }
        }
    }
}

impl std::error::Error for GenerateError {}

/// Fill every element of `data` with uniform `i8` values and store each
/// vector's exact sum in `solution`.
pub fn generate_data(solution: &mut [i64], data: &mut [Vec<i8>]) -> Result<(), GenerateError> {
    let mut rng = StdRng::seed_from_u64(DATA_SEED);
    generate_data_with(&mut rng, solution, data)
}

pub fn generate_data_with<R: Rng>(rng: &mut R, solution: &mut [i64], data: &mut [Vec<i8>]) -> Result<(), GenerateError> {
    if data.len() != solution.len() {
        return Err(GenerateError::LengthMismatch {
            vectors: data.len(),
            solution: solution.len(),
        });
    }

    for (vector, slot) in data.iter_mut().zip(solution.iter_mut()) {
        let mut sum = 0i64;
        for value in vector.iter_mut() {
            let number: i8 = rng.random();
            *value = number;
            sum += i64::from(number);
        }
        *slot = sum;
    }
    Ok(())
}

/// Draw `count` vector lengths from `Normal(mean, sigma)`, rounded and
/// clamped to at least 1.
pub fn generate_vector_sizes(count: usize, mean: f32, sigma: f32) -> Result<Vec<usize>, GenerateError> {
    let mut sizes = vec![0usize; count];
    fill_vector_sizes(&mut sizes, mean, sigma)?;
    Ok(sizes)
}

/// In-place form of [`generate_vector_sizes`]. Each call restarts the seeded
/// stream, so filling two halves of a buffer separately draws both halves
/// from the same sequence of standard normals.
pub fn fill_vector_sizes(sizes: &mut [usize], mean: f32, sigma: f32) -> Result<(), GenerateError> {
    let mut rng = StdRng::seed_from_u64(SIZE_SEED);
    fill_vector_sizes_with(&mut rng, sizes, mean, sigma)
}

pub fn fill_vector_sizes_with<R: Rng>(rng: &mut R, sizes: &mut [usize], mean: f32, sigma: f32) -> Result<(), GenerateError> {
    let invalid = GenerateError::InvalidDistribution { mean, sigma };
    // Normal::new only rejects a non-finite sigma
    if !mean.is_finite() || !sigma.is_finite() || sigma < 0.0 {
        return Err(invalid);
    }
    let normal = Normal::new(mean, sigma).map_err(|_| invalid)?;

    for size in sizes.iter_mut() {
        let drawn: f32 = normal.sample(rng);
        // `as` saturates, so huge draws land on usize::MAX instead of wrapping
        *size = drawn.round().max(1.0) as usize;
    }
    Ok(())
}

/// Allocate zeroed vectors with the given lengths, ready for [`generate_data`].
pub fn allocate_vectors(lengths: &[usize]) -> Vec<Vec<i8>> {
    lengths.iter().map(|&len| vec![0i8; len]).collect()
}
