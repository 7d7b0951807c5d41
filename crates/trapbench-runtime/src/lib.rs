//! # trapbench-runtime
//!
//! Platform-specific runtime for the crossing-latency benchmark: the x86
//! cycle counter and fences, the affinity controller, the fault region,
//! and the crossing timer, wired together by [`run`].
//!
//! Run-time order is strict: pin the thread, map the fault region, then
//! drive the timed loop on the pinned thread with the slot window at its
//! stack pointer. Nothing here is re-entrant; the protocol uses the
//! calling thread's own stack.
//!
//! ## Modules
//!
//! - `arch` - TSC read, fences, stack-pointer capture (x86_64 only)
//! - `affinity` - CPU pinning and placement reporting
//! - `region` - Anonymous mapping with one unfaulted page per iteration
//! - `timer` - The per-iteration capture/trigger/readback machine
//! - `config` - Run parameters with env overrides

pub mod affinity;
pub mod arch;
pub mod config;
pub mod region;
pub mod timer;

use std::time::Instant;

use trapbench_core::protocol::HANDLER_WINDOW_SKEW_INSTRUCTIONS;
use trapbench_core::sample::{Measurement, SamplePolicy};
use trapbench_core::{diag, tdebug, tinfo, twarn};

// Re-exports for convenience
pub use arch::TscCounter;
pub use config::BenchConfig;
pub use region::FaultRegion;
pub use timer::{CrossingTimer, StackRun};
pub use trapbench_core::{
    BenchError, BenchResult, InvalidSample, Report, StackSlotLayout,
};

/// Run one complete measurement on the calling thread.
///
/// Pins the thread, maps the fault region, drives the timed loop, and
/// aggregates the report. All diagnostics go to stderr, outside the timed
/// region.
pub fn run(config: &BenchConfig) -> BenchResult<Report> {
    config.validate()?;
    diag::init();

    affinity::pin(config.cpu)?;
    let (cpu, node) = affinity::current_placement()?;
    tinfo!("pinned: cpu {}, node {}", cpu, node);

    let region = FaultRegion::map(config.iterations)?;
    let (lo, hi) = region.range();
    tinfo!(
        "fault region: [{:#x} - {:#x}], {} pages of {} bytes",
        lo,
        hi,
        region.pages(),
        region.page_size()
    );
    tdebug!(
        "measured windows include ~{} instructions of handler epilogue",
        HANDLER_WINDOW_SKEW_INSTRUCTIONS
    );

    let policy = SamplePolicy::new(config.max_plausible_cycles);
    let mut timer = CrossingTimer::new(
        TscCounter,
        region,
        policy,
        Vec::with_capacity(config.iterations),
    );

    let started = Instant::now();
    let outcome = timer.run_on_current_stack(config.iterations);
    let elapsed = started.elapsed();

    tinfo!("protocol window base (captured sp): {:#x}", outcome.base);
    if !outcome.sentinel_intact {
        twarn!("protocol sentinel clobbered during the run; samples are suspect");
    }

    let measurements = timer.into_measurements();
    let report = Report::compute(&measurements)?;

    tinfo!("loop wall time: {:?}", elapsed);
    if report.valid_samples == 0 {
        twarn!("no valid samples; is the kernel-side instrumentation present?");
    }
    if config.dump_samples {
        dump_samples(&measurements);
    }

    Ok(report)
}

fn dump_samples(measurements: &[Measurement]) {
    for (i, m) in measurements.iter().enumerate() {
        match *m {
            Measurement::Valid { u2k_cycles, k2u_cycles } => {
                tinfo!("sample {}: u2k={} k2u={}", i, u2k_cycles, k2u_cycles);
            }
            Measurement::Invalid(reason) => {
                tinfo!("sample {}: invalid ({:?})", i, reason);
            }
        }
    }
}
