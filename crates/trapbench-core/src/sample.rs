//! Per-iteration measurement model
//!
//! Each iteration yields two cycle-count deltas, one per crossing
//! direction. A delta is only accepted if its checked subtraction succeeds
//! and the result stays below a plausibility bound; a missing kernel write
//! (collaborator absent, wrong offsets) otherwise shows up as a huge
//! wrapped value and would silently poison the mean.

/// Why a sample was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidSample {
    /// A delta subtraction would underflow: the "later" timestamp is older
    /// than the earlier one. Broken handshake or clock-domain crossing.
    Underflow,

    /// A delta exceeds the plausibility bound. Stale slot contents or a
    /// counter discontinuity.
    OutOfRange,
}

/// One iteration's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    /// Both crossing deltas derived cleanly.
    Valid {
        /// Cycles from the user pre-trap timestamp to the kernel
        /// post-entry timestamp.
        u2k_cycles: u64,
        /// Cycles from the kernel pre-return timestamp to the user
        /// post-return timestamp.
        k2u_cycles: u64,
    },

    /// The iteration is excluded from aggregation.
    Invalid(InvalidSample),
}

impl Measurement {
    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Measurement::Valid { .. })
    }
}

/// Validity policy applied to every derived delta.
#[derive(Debug, Clone, Copy)]
pub struct SamplePolicy {
    /// Upper bound on a believable single-crossing delta, in cycles.
    pub max_plausible_cycles: u64,
}

/// Generous default: tens of milliseconds at multi-GHz rates. Real
/// crossings are thousands of cycles; anything near this bound is a broken
/// handshake, not a slow trap.
pub const DEFAULT_MAX_PLAUSIBLE_CYCLES: u64 = 100_000_000;

impl Default for SamplePolicy {
    fn default() -> Self {
        Self { max_plausible_cycles: DEFAULT_MAX_PLAUSIBLE_CYCLES }
    }
}

impl SamplePolicy {
    pub fn new(max_plausible_cycles: u64) -> Self {
        Self { max_plausible_cycles }
    }

    /// Derive one measurement from the four raw timestamps of an
    /// iteration. Never wraps: any underflow or out-of-bounds delta turns
    /// the whole iteration invalid.
    #[inline]
    pub fn derive(
        &self,
        u2k_user: u64,
        u2k_kernel: u64,
        k2u_kernel: u64,
        k2u_user: u64,
    ) -> Measurement {
        let u2k = match u2k_kernel.checked_sub(u2k_user) {
            Some(d) => d,
            None => return Measurement::Invalid(InvalidSample::Underflow),
        };
        let k2u = match k2u_user.checked_sub(k2u_kernel) {
            Some(d) => d,
            None => return Measurement::Invalid(InvalidSample::Underflow),
        };
        if u2k > self.max_plausible_cycles || k2u > self.max_plausible_cycles {
            return Measurement::Invalid(InvalidSample::OutOfRange);
        }
        Measurement::Valid { u2k_cycles: u2k, k2u_cycles: k2u }
    }
}
