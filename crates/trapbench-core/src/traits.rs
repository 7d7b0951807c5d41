//! Seam traits between the crossing timer and its two hardware-facing
//! collaborators
//!
//! The timer's state machine is fixed; what varies is where timestamps
//! come from and what actually causes the privilege crossing. Production
//! implementations live in `trapbench-runtime` (`TscCounter`,
//! `FaultRegion`); tests substitute scripted counters and countable stub
//! collaborators.

use crate::protocol::StackSlotLayout;

/// A monotonic-on-this-core hardware cycle counter, with the protocol's
/// fencing folded into each capture point.
///
/// Contract: values are 64-bit and monotonic on a single core only when
/// captured through these methods; no cross-core ordering is guaranteed.
pub trait CycleCounter {
    /// Pre-trap capture: full memory fence, then read. The fence is
    /// mandatory so the store of the returned value cannot be observed
    /// after the trapping write that follows.
    fn pre_trap_timestamp(&mut self) -> u64;

    /// Post-trap capture: compiler barrier, read, then full fence,
    /// bounding reordering in both directions around the trap return.
    fn post_trap_timestamp(&mut self) -> u64;
}

/// Source of exactly one synchronous privilege crossing per trigger.
pub trait TrapSite {
    /// Perform the access that enters the privileged collaborator. The
    /// collaborator writes the kernel-side slots of `slots` before control
    /// returns; the production implementation ignores `slots` because the
    /// real handler locates them from the trapping stack pointer.
    fn trigger(&mut self, slots: &StackSlotLayout);
}

impl<C: CycleCounter + ?Sized> CycleCounter for &mut C {
    #[inline(always)]
    fn pre_trap_timestamp(&mut self) -> u64 {
        (**self).pre_trap_timestamp()
    }

    #[inline(always)]
    fn post_trap_timestamp(&mut self) -> u64 {
        (**self).post_trap_timestamp()
    }
}

impl<S: TrapSite + ?Sized> TrapSite for &mut S {
    #[inline(always)]
    fn trigger(&mut self, slots: &StackSlotLayout) {
        (**self).trigger(slots)
    }
}
