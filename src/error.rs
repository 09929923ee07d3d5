//! Error types for metric sampling.

use thiserror::Error;

/// Failures reported by a [`MetricsProvider`](crate::sampler::MetricsProvider).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SampleError {
    /// No CPU figures could be read this tick.
    #[error("CPU statistics unavailable")]
    CpuUnavailable,

    /// Memory counters were missing or reported zero total memory.
    #[error("memory statistics unavailable")]
    MemoryUnavailable,

    /// The process table could not be read at all.
    #[error("process table unavailable")]
    ProcessesUnavailable,

    /// A single process went away between listing and inspection.
    #[error("process {0} exited before it could be sampled")]
    ProcessExited(u32),
}
