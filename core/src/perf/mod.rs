//! Shared benchmarking workloads used by the driver and the Criterion benches.
//!
//! Centralizing the dataset shapes here keeps the printed report and the
//! benches in sync so we do not accidentally compare different datasets
//! across tools.

pub mod scenarios;
