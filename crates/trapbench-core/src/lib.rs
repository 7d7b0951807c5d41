//! # trapbench-core
//!
//! Platform-agnostic pieces of the trapbench crossing timer: the stack-slot
//! protocol layout, the sample/measurement model, aggregation, and the seam
//! traits that let tests substitute the hardware counter and the privileged
//! collaborator.
//!
//! All OS- and architecture-specific code (TSC reads, fences, mmap,
//! affinity) lives in `trapbench-runtime`.
//!
//! ## Modules
//!
//! - `protocol` - Wire format: the 4-word stack-slot layout and sentinel
//! - `sample` - Per-iteration measurement derivation and validity policy
//! - `report` - Aggregation into the final report
//! - `traits` - `CycleCounter` and `TrapSite` seams
//! - `error` - Error types
//! - `diag` - Leveled stderr diagnostic macros
//! - `env` - Environment variable utilities

pub mod diag;
pub mod env;
pub mod error;
pub mod protocol;
pub mod report;
pub mod sample;
pub mod traits;

// Re-exports for convenience
pub use env::{env_get, env_get_bool};
pub use error::{
    AllocationError, BenchError, BenchResult, ConfigurationError, SchedulingError,
};
pub use protocol::{StackSlotLayout, PROTOCOL_MAGIC};
pub use report::Report;
pub use sample::{InvalidSample, Measurement, SamplePolicy};
pub use traits::{CycleCounter, TrapSite};
