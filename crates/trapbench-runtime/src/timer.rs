//! Crossing timer: the per-iteration capture/trigger/readback machine
//!
//! Each iteration walks a fixed sequence with no branching:
//!
//! 1. PreTrapCapture - full fence, read the counter, store `u2k_user`
//! 2. Trigger        - one write to the next untouched page
//! 3. PostTrapCapture - compiler barrier, read the counter into a local,
//!    full fence
//! 4. Readback       - volatile reads of the three slots, checked delta
//!    derivation, store into the measurement buffer
//!
//! Arming (sentinel write, layout address) happens once, before the loop;
//! the slot addresses are deliberately reused across iterations. Nothing
//! else persists between iterations except the buffer and the next-page
//! cursor inside the trap site.

use trapbench_core::protocol::{StackSlotLayout, CUSHION_WORDS, PROTOCOL_MAGIC};
use trapbench_core::sample::{Measurement, SamplePolicy};
use trapbench_core::traits::{CycleCounter, TrapSite};

use crate::arch;

/// Outcome of a stack-addressed run, reportable after the loop.
///
/// The layout itself must not escape the measuring frame (its window dies
/// with the frame), so the diagnostics are copied out instead.
#[derive(Debug, Clone, Copy)]
pub struct StackRun {
    /// Address the slot window was armed at: the captured stack pointer.
    pub base: usize,
    /// Whether the sentinel still read `PROTOCOL_MAGIC` after the last
    /// iteration.
    pub sentinel_intact: bool,
}

/// Drives the protocol over a counter and a trap site.
///
/// The measurement buffer is created by the caller, sized from the
/// validated iteration count, and handed over at construction; pushes
/// inside the loop never allocate.
pub struct CrossingTimer<C: CycleCounter, S: TrapSite> {
    counter: C,
    site: S,
    policy: SamplePolicy,
    measurements: Vec<Measurement>,
}

impl<C: CycleCounter, S: TrapSite> CrossingTimer<C, S> {
    pub fn new(
        counter: C,
        site: S,
        policy: SamplePolicy,
        measurements: Vec<Measurement>,
    ) -> Self {
        Self { counter, site, policy, measurements }
    }

    /// Run the full protocol against an explicit layout.
    ///
    /// Production goes through [`run_on_current_stack`]; tests hand in a
    /// heap-backed layout plus a stub collaborator.
    ///
    /// [`run_on_current_stack`]: CrossingTimer::run_on_current_stack
    #[inline(always)]
    pub fn run(&mut self, layout: StackSlotLayout, iterations: usize) {
        layout.arm();
        for _ in 0..iterations {
            let m = self.iteration(&layout);
            self.measurements.push(m);
        }
    }

    #[inline(always)]
    fn iteration(&mut self, layout: &StackSlotLayout) -> Measurement {
        // PreTrapCapture
        let t_user = self.counter.pre_trap_timestamp();
        layout.write_u2k_user(t_user);

        // Trigger: the collaborator writes the kernel slots before this
        // returns.
        self.site.trigger(layout);

        // PostTrapCapture: into a local, never through a slot.
        let k2u_user = self.counter.post_trap_timestamp();

        // Readback
        let u2k_user = layout.u2k_user();
        let u2k_kernel = layout.u2k_kernel();
        let k2u_kernel = layout.k2u_kernel();
        self.policy.derive(u2k_user, u2k_kernel, k2u_kernel, k2u_user)
    }

    /// Run the protocol with the slot window addressed from this frame's
    /// stack pointer, which is where the kernel collaborator expects it.
    ///
    /// Everything the loop touches is either in `self` (behind a pointer)
    /// or inlined into this frame; the cushion words are declared before
    /// the capture so the frame cannot grow afterwards. Returns the
    /// armed base and the sentinel status for post-loop diagnostics.
    #[inline(never)]
    pub fn run_on_current_stack(&mut self, iterations: usize) -> StackRun {
        let cushion = [0u64; CUSHION_WORDS];
        let sp = arch::current_stack_pointer();
        // Safety: the window sits at the captured stack pointer of a frame
        // that neither grows nor returns until the last trap has been
        // read back; the cushion reserves the adjacent words.
        let layout = unsafe { StackSlotLayout::from_base(sp) };
        self.run(layout, iterations);
        std::hint::black_box(&cushion);
        StackRun {
            base: layout.base(),
            sentinel_intact: layout.magic() == PROTOCOL_MAGIC,
        }
    }

    /// Hand the filled buffer back for aggregation.
    pub fn into_measurements(self) -> Vec<Measurement> {
        self.measurements
    }
}
