//! Leveled diagnostic printing
//!
//! All diagnostics go to stderr so the report on stdout stays parseable.
//! Nothing in this module may be called from inside the timed region.
//!
//! # Environment Variables
//!
//! - `TRAPBENCH_LOG_LEVEL=<level>` - 0=off, 1=error, 2=warn, 3=info, 4=debug
//! - `TRAPBENCH_FLUSH_LOG=1` - flush stderr after each line
//!
//! # Usage
//!
//! ```ignore
//! use trapbench_core::{terror, twarn, tinfo, tdebug};
//!
//! tinfo!("pinned to cpu {}", cpu);
//! terror!("mmap failed: {}", err);
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::env::{env_get, env_get_bool};

/// Diagnostic levels, most severe first.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl DiagLevel {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => DiagLevel::Off,
            1 => DiagLevel::Error,
            2 => DiagLevel::Warn,
            3 => DiagLevel::Info,
            _ => DiagLevel::Debug,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            DiagLevel::Off => "",
            DiagLevel::Error => "[ERROR]",
            DiagLevel::Warn => "[WARN] ",
            DiagLevel::Info => "[INFO] ",
            DiagLevel::Debug => "[DEBUG]",
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(DiagLevel::Info as u8);
static FLUSH: AtomicBool = AtomicBool::new(false);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Read the level and flush mode from the environment. Runs once; later
/// calls are no-ops. Invoked lazily on first print, or explicitly for
/// deterministic startup.
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }
    LEVEL.store(
        env_get("TRAPBENCH_LOG_LEVEL", DiagLevel::Info as u8),
        Ordering::Relaxed,
    );
    FLUSH.store(env_get_bool("TRAPBENCH_FLUSH_LOG", false), Ordering::Relaxed);
}

/// Set the level programmatically (tests use this to silence output).
pub fn set_level(level: DiagLevel) {
    INITIALIZED.store(true, Ordering::SeqCst);
    LEVEL.store(level as u8, Ordering::Relaxed);
}

#[inline]
fn current_level() -> DiagLevel {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    DiagLevel::from_u8(LEVEL.load(Ordering::Relaxed))
}

/// Internal: leveled line to stderr, locked for atomic output.
#[doc(hidden)]
pub fn _diag_impl(level: DiagLevel, args: std::fmt::Arguments<'_>) {
    if level > current_level() {
        return;
    }
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = write!(handle, "{} ", level.prefix());
    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");
    if FLUSH.load(Ordering::Relaxed) {
        let _ = handle.flush();
    }
}

/// Error level diagnostic
#[macro_export]
macro_rules! terror {
    ($($arg:tt)*) => {{
        $crate::diag::_diag_impl($crate::diag::DiagLevel::Error, format_args!($($arg)*));
    }};
}

/// Warning level diagnostic
#[macro_export]
macro_rules! twarn {
    ($($arg:tt)*) => {{
        $crate::diag::_diag_impl($crate::diag::DiagLevel::Warn, format_args!($($arg)*));
    }};
}

/// Info level diagnostic
#[macro_export]
macro_rules! tinfo {
    ($($arg:tt)*) => {{
        $crate::diag::_diag_impl($crate::diag::DiagLevel::Info, format_args!($($arg)*));
    }};
}

/// Debug level diagnostic
#[macro_export]
macro_rules! tdebug {
    ($($arg:tt)*) => {{
        $crate::diag::_diag_impl($crate::diag::DiagLevel::Debug, format_args!($($arg)*));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(DiagLevel::Error < DiagLevel::Warn);
        assert!(DiagLevel::Warn < DiagLevel::Info);
        assert!(DiagLevel::Info < DiagLevel::Debug);
    }

    #[test]
    fn test_level_from_u8_saturates() {
        assert_eq!(DiagLevel::from_u8(0), DiagLevel::Off);
        assert_eq!(DiagLevel::from_u8(3), DiagLevel::Info);
        assert_eq!(DiagLevel::from_u8(99), DiagLevel::Debug);
    }

    #[test]
    fn test_macros_compile() {
        set_level(DiagLevel::Off);
        terror!("error {}", 1);
        twarn!("warn");
        tinfo!("info {}", "x");
        tdebug!("debug");
    }
}
