//! Architecture-specific timing primitives
//!
//! The protocol depends on a 64-bit monotonic-on-this-core cycle counter
//! and two fence strengths; only x86_64 is supported.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        mod x86_64;
        pub use x86_64::*;
    } else {
        compile_error!("trapbench requires an x86_64 target (TSC + mfence)");
    }
}
