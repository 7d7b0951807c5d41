//! Error types for the crossing-latency benchmark
//!
//! All three categories are fatal for a single-shot benchmark run: none of
//! them are expected to be transient, so there is no retry policy anywhere.
//! Invalid per-iteration samples are not errors; they are carried in the
//! measurement set and surfaced by the report (see `sample`).

use core::fmt;

/// Result type for benchmark operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Top-level error for a benchmark run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BenchError {
    /// Thread affinity request rejected
    Scheduling(SchedulingError),

    /// Fault-region mapping failed
    Allocation(AllocationError),

    /// Invalid run parameters
    Configuration(ConfigurationError),
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::Scheduling(e) => write!(f, "scheduling error: {}", e),
            BenchError::Allocation(e) => write!(f, "allocation error: {}", e),
            BenchError::Configuration(e) => write!(f, "configuration error: {}", e),
        }
    }
}

impl std::error::Error for BenchError {}

/// Affinity controller errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    /// Requested CPU id is beyond the machine's online CPU count
    CpuOutOfRange { cpu: usize, online: usize },

    /// The OS rejected the affinity request (errno attached)
    AffinityRejected { cpu: usize, errno: i32 },

    /// getcpu placement query failed (errno attached)
    PlacementUnavailable { errno: i32 },
}

impl fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingError::CpuOutOfRange { cpu, online } => {
                write!(f, "cpu {} out of range ({} online)", cpu, online)
            }
            SchedulingError::AffinityRejected { cpu, errno } => {
                write!(f, "pin to cpu {} rejected (errno {})", cpu, errno)
            }
            SchedulingError::PlacementUnavailable { errno } => {
                write!(f, "getcpu failed (errno {})", errno)
            }
        }
    }
}

impl From<SchedulingError> for BenchError {
    fn from(e: SchedulingError) -> Self {
        BenchError::Scheduling(e)
    }
}

/// Fault-region allocation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// mmap of the anonymous region failed (errno attached)
    MapFailed { bytes: usize, errno: i32 },

    /// sysconf reported no usable page size
    PageSizeUnavailable,

    /// pages * page_size overflowed
    RegionTooLarge { pages: usize },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationError::MapFailed { bytes, errno } => {
                write!(f, "mmap of {} bytes failed (errno {})", bytes, errno)
            }
            AllocationError::PageSizeUnavailable => write!(f, "page size unavailable"),
            AllocationError::RegionTooLarge { pages } => {
                write!(f, "region of {} pages overflows address space", pages)
            }
        }
    }
}

impl From<AllocationError> for BenchError {
    fn from(e: AllocationError) -> Self {
        BenchError::Allocation(e)
    }
}

/// Run-parameter errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Iteration count of zero: nothing to measure, mean undefined
    ZeroIterations,

    /// Aggregation was handed an empty measurement set
    EmptyMeasurementSet,
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::ZeroIterations => write!(f, "iteration count must be >= 1"),
            ConfigurationError::EmptyMeasurementSet => {
                write!(f, "cannot aggregate an empty measurement set")
            }
        }
    }
}

impl From<ConfigurationError> for BenchError {
    fn from(e: ConfigurationError) -> Self {
        BenchError::Configuration(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = BenchError::Configuration(ConfigurationError::ZeroIterations);
        assert_eq!(format!("{}", e), "configuration error: iteration count must be >= 1");

        let e = BenchError::Scheduling(SchedulingError::CpuOutOfRange { cpu: 512, online: 8 });
        assert_eq!(format!("{}", e), "scheduling error: cpu 512 out of range (8 online)");
    }

    #[test]
    fn test_error_conversion() {
        let alloc = AllocationError::MapFailed { bytes: 4096, errno: 12 };
        let err: BenchError = alloc.into();
        assert!(matches!(
            err,
            BenchError::Allocation(AllocationError::MapFailed { bytes: 4096, errno: 12 })
        ));
    }
}
