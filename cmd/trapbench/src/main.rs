//! trapbench - user/kernel crossing latency benchmark
//!
//! Requires a cooperating kernel: the trap handler must write its TSC into
//! the protocol slots below the faulting thread's stack pointer on entry
//! and immediately before returning. Without it every sample is reported
//! as invalid.
//!
//! Usage: trapbench [iterations] [cpu]
//!
//! Environment overrides are documented in `trapbench_runtime::config`;
//! positional arguments win over the environment.

use std::process::ExitCode;

use trapbench_runtime::{run, BenchConfig};

fn main() -> ExitCode {
    let mut config = BenchConfig::from_env();

    let mut args = std::env::args().skip(1);
    if let Some(iterations) = args.next().and_then(|s| s.parse().ok()) {
        config = config.iterations(iterations);
    }
    if let Some(cpu) = args.next().and_then(|s| s.parse().ok()) {
        config = config.cpu(cpu);
    }

    match run(&config) {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("trapbench: {}", err);
            ExitCode::FAILURE
        }
    }
}
