//! Affinity controller
//!
//! Pins the measuring thread to one logical CPU so every TSC sample comes
//! from a single core; the protocol makes no cross-core ordering claims.
//! Placement reporting is diagnostic only and never affects correctness.

use nix::sched::{sched_setaffinity, CpuSet};
use nix::unistd::Pid;

use trapbench_core::error::{BenchResult, SchedulingError};

/// Number of CPUs currently online.
pub fn online_cpus() -> usize {
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if n < 1 {
        1
    } else {
        n as usize
    }
}

/// Restrict the calling thread to `cpu`.
///
/// Rejects ids beyond the online CPU count before touching the scheduler,
/// so a bad id fails the same way on every machine.
pub fn pin(cpu: usize) -> BenchResult<()> {
    let online = online_cpus();
    if cpu >= online {
        return Err(SchedulingError::CpuOutOfRange { cpu, online }.into());
    }

    let mut set = CpuSet::new();
    set.set(cpu)
        .map_err(|e| SchedulingError::AffinityRejected { cpu, errno: e as i32 })?;
    sched_setaffinity(Pid::from_raw(0), &set)
        .map_err(|e| SchedulingError::AffinityRejected { cpu, errno: e as i32 })?;
    Ok(())
}

/// The (cpu, node) pair the OS currently reports for this thread.
pub fn current_placement() -> BenchResult<(u32, u32)> {
    let mut cpu: libc::c_uint = 0;
    let mut node: libc::c_uint = 0;
    let ret = unsafe {
        libc::syscall(
            libc::SYS_getcpu,
            &mut cpu as *mut libc::c_uint,
            &mut node as *mut libc::c_uint,
            std::ptr::null_mut::<libc::c_void>(),
        )
    };
    if ret == -1 {
        let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        return Err(SchedulingError::PlacementUnavailable { errno }.into());
    }
    Ok((cpu, node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trapbench_core::error::BenchError;

    #[test]
    fn test_pin_beyond_machine_fails() {
        let online = online_cpus();
        let err = pin(online + 512).unwrap_err();
        assert!(matches!(
            err,
            BenchError::Scheduling(SchedulingError::CpuOutOfRange { .. })
        ));
    }

    #[test]
    fn test_pin_and_placement_agree() {
        // Pin to wherever we already are; always inside any cpuset.
        let (cpu, _node) = current_placement().unwrap();
        pin(cpu as usize).unwrap();
        let (after, _node) = current_placement().unwrap();
        assert_eq!(after, cpu);
    }

    #[test]
    fn test_online_cpus_nonzero() {
        assert!(online_cpus() >= 1);
    }
}
