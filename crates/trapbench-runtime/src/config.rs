//! Benchmark configuration
//!
//! Compile-time defaults with runtime environment overrides, builder
//! methods on top. No configuration files and no persisted state: the
//! tool is single-shot.
//!
//! Environment variables (all optional):
//! - `TRAPBENCH_ITERATIONS` - iteration count (= pages faulted)
//! - `TRAPBENCH_CPU` - logical CPU to pin to
//! - `TRAPBENCH_MAX_SAMPLE_CYCLES` - plausibility bound per delta
//! - `TRAPBENCH_DUMP_SAMPLES` - dump per-iteration deltas after the run

use trapbench_core::env::{env_get, env_get_bool};
use trapbench_core::error::{BenchResult, ConfigurationError};
use trapbench_core::sample::DEFAULT_MAX_PLAUSIBLE_CYCLES;

/// Compile-time defaults.
pub mod defaults {
    /// One fault per iteration; matches the original harness size.
    pub const ITERATIONS: usize = 1000;

    /// Logical CPU the measuring thread is pinned to.
    pub const CPU: usize = 0;
}

/// Parameters of one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Logical CPU to pin the measuring thread to
    pub cpu: usize,
    /// Iterations, one page fault each
    pub iterations: usize,
    /// Upper bound on a believable per-crossing delta, in cycles
    pub max_plausible_cycles: u64,
    /// Dump per-iteration deltas after the loop (never inside it)
    pub dump_samples: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl BenchConfig {
    /// Compile-time defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self {
            cpu: env_get("TRAPBENCH_CPU", defaults::CPU),
            iterations: env_get("TRAPBENCH_ITERATIONS", defaults::ITERATIONS),
            max_plausible_cycles: env_get(
                "TRAPBENCH_MAX_SAMPLE_CYCLES",
                DEFAULT_MAX_PLAUSIBLE_CYCLES,
            ),
            dump_samples: env_get_bool("TRAPBENCH_DUMP_SAMPLES", false),
        }
    }

    pub fn cpu(mut self, cpu: usize) -> Self {
        self.cpu = cpu;
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn max_plausible_cycles(mut self, cycles: u64) -> Self {
        self.max_plausible_cycles = cycles;
        self
    }

    pub fn dump_samples(mut self, dump: bool) -> Self {
        self.dump_samples = dump;
        self
    }

    /// Reject parameters the measurement cannot run with.
    pub fn validate(&self) -> BenchResult<()> {
        if self.iterations == 0 {
            return Err(ConfigurationError::ZeroIterations.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trapbench_core::error::BenchError;

    // Defaults and env overrides share the same variable names, so they
    // are checked in one test to keep parallel test threads from racing
    // on the environment.
    #[test]
    fn test_defaults_and_env_overrides() {
        std::env::remove_var("TRAPBENCH_ITERATIONS");
        std::env::remove_var("TRAPBENCH_CPU");
        std::env::remove_var("TRAPBENCH_MAX_SAMPLE_CYCLES");
        std::env::remove_var("TRAPBENCH_DUMP_SAMPLES");

        let config = BenchConfig::from_env();
        assert_eq!(config.iterations, defaults::ITERATIONS);
        assert_eq!(config.cpu, defaults::CPU);
        assert_eq!(config.max_plausible_cycles, DEFAULT_MAX_PLAUSIBLE_CYCLES);
        assert!(!config.dump_samples);
        assert!(config.validate().is_ok());

        std::env::set_var("TRAPBENCH_ITERATIONS", "77");
        std::env::set_var("TRAPBENCH_CPU", "2");
        std::env::set_var("TRAPBENCH_MAX_SAMPLE_CYCLES", "12345");
        std::env::set_var("TRAPBENCH_DUMP_SAMPLES", "yes");

        let config = BenchConfig::from_env();
        assert_eq!(config.iterations, 77);
        assert_eq!(config.cpu, 2);
        assert_eq!(config.max_plausible_cycles, 12_345);
        assert!(config.dump_samples);

        std::env::remove_var("TRAPBENCH_ITERATIONS");
        std::env::remove_var("TRAPBENCH_CPU");
        std::env::remove_var("TRAPBENCH_MAX_SAMPLE_CYCLES");
        std::env::remove_var("TRAPBENCH_DUMP_SAMPLES");
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let config = BenchConfig::from_env().iterations(0);
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            BenchError::Configuration(ConfigurationError::ZeroIterations)
        );
    }

    #[test]
    fn test_builder_overrides() {
        let config = BenchConfig::from_env()
            .cpu(3)
            .iterations(42)
            .max_plausible_cycles(1_000)
            .dump_samples(true);
        assert_eq!(config.cpu, 3);
        assert_eq!(config.iterations, 42);
        assert_eq!(config.max_plausible_cycles, 1_000);
        assert!(config.dump_samples);
    }
}
