//! x86_64 cycle counter, fences and stack-pointer capture
//!
//! `rdtsc` on its own carries no ordering constraint: the CPU can and will
//! execute it speculatively, so every capture in the protocol brackets the
//! read with the fences the crossing timer requires.

use std::arch::asm;

use trapbench_core::traits::CycleCounter;

/// Current value of RSP.
///
/// The protocol window is addressed from this value; the caller must keep
/// the frame from growing between the capture and the last trap.
#[inline(always)]
pub fn current_stack_pointer() -> usize {
    let sp: usize;
    unsafe {
        asm!("mov {}, rsp", out(reg) sp, options(nomem, nostack, preserves_flags));
    }
    sp
}

/// Raw RDTSC, no ordering beyond the asm block itself.
#[inline(always)]
pub fn read_cycle_counter() -> u64 {
    let lo: u64;
    let hi: u64;
    unsafe {
        asm!("rdtsc", out("rax") lo, out("rdx") hi, options(nomem, nostack));
    }
    (hi << 32) | lo
}

/// Full hardware fence (MFENCE): no memory operation crosses it in either
/// direction, and the asm block doubles as a compiler barrier.
#[inline(always)]
pub fn fence_full() {
    unsafe {
        asm!("mfence", options(nostack, preserves_flags));
    }
}

/// Compiler-only barrier: forbids reordering of memory accesses by the
/// compiler without emitting an instruction.
#[inline(always)]
pub fn compiler_barrier() {
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

/// Production cycle counter: RDTSC with the protocol's fencing at each
/// capture point.
#[derive(Debug, Default, Clone, Copy)]
pub struct TscCounter;

impl CycleCounter for TscCounter {
    #[inline(always)]
    fn pre_trap_timestamp(&mut self) -> u64 {
        fence_full();
        read_cycle_counter()
    }

    #[inline(always)]
    fn post_trap_timestamp(&mut self) -> u64 {
        compiler_barrier();
        let tsc = read_cycle_counter();
        fence_full();
        tsc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_pointer_is_word_aligned() {
        let sp = current_stack_pointer();
        assert_ne!(sp, 0);
        assert_eq!(sp % 8, 0);
    }

    #[test]
    fn test_fenced_reads_are_monotonic() {
        let mut counter = TscCounter;
        let t0 = counter.pre_trap_timestamp();
        let t1 = counter.post_trap_timestamp();
        assert!(t1 >= t0);
    }

    #[test]
    fn test_counter_advances() {
        let t0 = read_cycle_counter();
        // Enough work that even a coarse TSC must tick.
        let mut x = 0u64;
        for i in 0..10_000u64 {
            x = x.wrapping_add(std::hint::black_box(i));
        }
        std::hint::black_box(x);
        fence_full();
        let t1 = read_cycle_counter();
        assert!(t1 > t0);
    }
}
