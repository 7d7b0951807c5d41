//! Environment variable utilities
//!
//! Generic `env_get<T>` for parsing overrides with defaults; used by
//! `BenchConfig::from_env` and the diagnostic level setup.

use std::str::FromStr;

/// Get environment variable parsed as type T, or return the default.
///
/// Unset or unparseable values fall back silently; a benchmark invocation
/// should never abort on a malformed tuning knob.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get environment variable as boolean.
///
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true. Everything
/// else, including unset, returns the default.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default() {
        let val: usize = env_get("__TRAPBENCH_TEST_UNSET__", 42);
        assert_eq!(val, 42);
    }

    #[test]
    fn test_env_get_set_and_invalid() {
        std::env::set_var("__TRAPBENCH_TEST_NUM__", "123");
        let val: usize = env_get("__TRAPBENCH_TEST_NUM__", 0);
        assert_eq!(val, 123);

        std::env::set_var("__TRAPBENCH_TEST_NUM__", "not_a_number");
        let val: usize = env_get("__TRAPBENCH_TEST_NUM__", 99);
        assert_eq!(val, 99);

        std::env::remove_var("__TRAPBENCH_TEST_NUM__");
    }

    #[test]
    fn test_env_get_bool_variants() {
        assert!(!env_get_bool("__TRAPBENCH_TEST_UNSET__", false));
        assert!(env_get_bool("__TRAPBENCH_TEST_UNSET__", true));

        std::env::set_var("__TRAPBENCH_TEST_BOOL__", "yes");
        assert!(env_get_bool("__TRAPBENCH_TEST_BOOL__", false));

        std::env::set_var("__TRAPBENCH_TEST_BOOL__", "0");
        assert!(!env_get_bool("__TRAPBENCH_TEST_BOOL__", true));

        std::env::remove_var("__TRAPBENCH_TEST_BOOL__");
    }
}
