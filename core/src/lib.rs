pub mod executor;
pub mod generator;
pub mod par;
pub mod results;
pub mod strategy;

// Canonical datasets shared by the driver and the Criterion benches
pub mod perf;

#[cfg(test)]
mod executor_test;

/// One benchmark input: independent byte vectors of arbitrary length.
pub type InputVectors = Vec<Vec<i8>>;

/// Per-vector sums, one slot per input vector.
pub type OutputVector = Vec<i64>;

pub use executor::{Executor, execute_method, execute_methods, size_of_smallest_vector};
pub use generator::{GenerateError, generate_data, generate_vector_sizes};
pub use results::Results;
pub use strategy::{Strategy, SumMethod};
