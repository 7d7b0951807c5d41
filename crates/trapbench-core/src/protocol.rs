//! The user/kernel timestamp exchange protocol
//!
//! Four machine words sit at fixed byte offsets from a base address that is
//! captured once from the stack pointer, before any trap is triggered:
//!
//! ```text
//!   | +24  magic       |  sentinel, written by user at arm time
//!   | +16  u2k_user    |  user TSC, written immediately before the trap
//!   | +8   u2k_kernel  |  kernel TSC, written on trap-handler entry
//!   | +0   k2u_kernel  |  kernel TSC, written just before return to user
//!   base (captured stack pointer)
//! ```
//!
//! The privileged collaborator locates these words from the trapping
//! context's stack pointer, so the base must not move between arming and
//! protocol completion. The fourth timestamp (`k2u_user`) is read after
//! control returns to user space and therefore goes into a local, never
//! through a slot.

/// Sentinel identifying protocol presence and version. The collaborator may
/// check it before writing, to avoid corrupting unrelated stack memory.
/// Kept at the value the existing kernel instrumentation expects.
pub const PROTOCOL_MAGIC: u64 = 0x1994_0619;

/// Slot word size in bytes (the protocol is 64-bit only).
pub const WORD_BYTES: usize = 8;

/// Number of protocol words.
pub const SLOT_WORDS: usize = 4;

/// Total size of the slot window in bytes.
pub const SLOT_BYTES: usize = SLOT_WORDS * WORD_BYTES;

/// Byte offset of the kernel pre-return timestamp.
pub const K2U_KERNEL_OFFSET: usize = 0;

/// Byte offset of the kernel post-entry timestamp.
pub const U2K_KERNEL_OFFSET: usize = 8;

/// Byte offset of the user pre-trap timestamp.
pub const U2K_USER_OFFSET: usize = 16;

/// Byte offset of the sentinel.
pub const MAGIC_OFFSET: usize = 24;

/// Reserved do-not-touch words adjacent to the slot window. The measuring
/// frame declares this many words of padding before capturing the stack
/// pointer so that an off-by-a-few-words handler never lands on live
/// locals.
pub const CUSHION_WORDS: usize = 10;

/// Instructions of handler prologue/epilogue included in each measured
/// window: the entry-side write happens a handful of instructions after the
/// hardware transfer and the return-side write roughly this many
/// instructions before IRET. Both deltas therefore carry a small fixed
/// skew on top of the true crossing cost. Documented rather than
/// subtracted, because the exact count depends on the collaborator build.
pub const HANDLER_WINDOW_SKEW_INSTRUCTIONS: usize = 6;

/// The 4-slot protocol window, addressed from a fixed base.
///
/// Offers named volatile accessors only; call sites never do offset
/// arithmetic. Holds a raw pointer, so the type is neither `Send` nor
/// `Sync`: the protocol is inherently single-threaded (it lives on the
/// measuring thread's own stack).
#[derive(Debug, Clone, Copy)]
pub struct StackSlotLayout {
    base: *mut u64,
}

impl StackSlotLayout {
    /// Build a layout over the 32-byte window starting at `base`.
    ///
    /// # Safety
    ///
    /// The caller guarantees that `base..base + SLOT_BYTES` is writable,
    /// word-aligned, not occupied by any live object, and that the address
    /// stays valid (for the real protocol: the stack pointer does not move)
    /// until the last accessor call.
    pub unsafe fn from_base(base: usize) -> Self {
        debug_assert_eq!(base % WORD_BYTES, 0);
        Self { base: base as *mut u64 }
    }

    /// Base address the layout was built from.
    #[inline]
    pub fn base(&self) -> usize {
        self.base as usize
    }

    #[inline(always)]
    fn word(&self, byte_offset: usize) -> *mut u64 {
        debug_assert!(byte_offset < SLOT_BYTES);
        debug_assert_eq!(byte_offset % WORD_BYTES, 0);
        unsafe { self.base.add(byte_offset / WORD_BYTES) }
    }

    /// Arm the protocol: write the sentinel and clear the kernel-side
    /// slots. Done once per run, before the first trap.
    #[inline(always)]
    pub fn arm(&self) {
        unsafe {
            self.word(MAGIC_OFFSET).write_volatile(PROTOCOL_MAGIC);
            self.word(U2K_KERNEL_OFFSET).write_volatile(0);
            self.word(K2U_KERNEL_OFFSET).write_volatile(0);
        }
    }

    /// Current sentinel value. Should still equal `PROTOCOL_MAGIC` after a
    /// run; anything else means the collaborator (or the frame) clobbered
    /// the window.
    #[inline(always)]
    pub fn magic(&self) -> u64 {
        unsafe { self.word(MAGIC_OFFSET).read_volatile() }
    }

    /// Store the user pre-trap timestamp.
    #[inline(always)]
    pub fn write_u2k_user(&self, tsc: u64) {
        unsafe { self.word(U2K_USER_OFFSET).write_volatile(tsc) }
    }

    /// User pre-trap timestamp, as read back through the window.
    #[inline(always)]
    pub fn u2k_user(&self) -> u64 {
        unsafe { self.word(U2K_USER_OFFSET).read_volatile() }
    }

    /// Kernel post-entry timestamp.
    #[inline(always)]
    pub fn u2k_kernel(&self) -> u64 {
        unsafe { self.word(U2K_KERNEL_OFFSET).read_volatile() }
    }

    /// Kernel pre-return timestamp.
    #[inline(always)]
    pub fn k2u_kernel(&self) -> u64 {
        unsafe { self.word(K2U_KERNEL_OFFSET).read_volatile() }
    }

    /// Collaborator-side write of the post-entry timestamp. Used by stub
    /// collaborators that emulate the trap handler in-process.
    #[inline(always)]
    pub fn write_u2k_kernel(&self, tsc: u64) {
        unsafe { self.word(U2K_KERNEL_OFFSET).write_volatile(tsc) }
    }

    /// Collaborator-side write of the pre-return timestamp.
    #[inline(always)]
    pub fn write_k2u_kernel(&self, tsc: u64) {
        unsafe { self.word(K2U_KERNEL_OFFSET).write_volatile(tsc) }
    }
}
