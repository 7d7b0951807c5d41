//! Aggregation of a measurement set into the final report
//!
//! Created exactly once, from the full set; there are no partial reports.
//! Invalid samples are counted and excluded from the means rather than
//! averaged in.

use core::fmt;

use crate::error::{BenchResult, ConfigurationError};
use crate::sample::Measurement;

/// Summary of one benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Total iterations driven, valid or not.
    pub iterations: usize,

    /// Iterations whose deltas passed the validity policy.
    pub valid_samples: usize,

    /// Iterations rejected (underflow or out-of-range delta).
    pub invalid_samples: usize,

    /// Integer-truncated mean user-to-kernel crossing, cycles. Zero when
    /// no sample was valid.
    pub mean_u2k_cycles: u64,

    /// Integer-truncated mean kernel-to-user crossing, cycles. Zero when
    /// no sample was valid.
    pub mean_k2u_cycles: u64,
}

impl Report {
    /// Aggregate a full measurement set.
    ///
    /// Pure function of its input, so aggregating the same set twice gives
    /// the same report. Fails only on an empty set.
    pub fn compute(measurements: &[Measurement]) -> BenchResult<Report> {
        if measurements.is_empty() {
            return Err(ConfigurationError::EmptyMeasurementSet.into());
        }

        let mut valid: usize = 0;
        let mut invalid: usize = 0;
        // 128-bit accumulators: u64 cycle values times large iteration
        // counts can overflow 64 bits.
        let mut sum_u2k: u128 = 0;
        let mut sum_k2u: u128 = 0;

        for m in measurements {
            match *m {
                Measurement::Valid { u2k_cycles, k2u_cycles } => {
                    valid += 1;
                    sum_u2k += u128::from(u2k_cycles);
                    sum_k2u += u128::from(k2u_cycles);
                }
                Measurement::Invalid(_) => invalid += 1,
            }
        }

        let (mean_u2k, mean_k2u) = if valid > 0 {
            (
                (sum_u2k / valid as u128) as u64,
                (sum_k2u / valid as u128) as u64,
            )
        } else {
            (0, 0)
        };

        Ok(Report {
            iterations: measurements.len(),
            valid_samples: valid,
            invalid_samples: invalid,
            mean_u2k_cycles: mean_u2k,
            mean_k2u_cycles: mean_k2u,
        })
    }
}

impl fmt::Display for Report {
    /// `key: value` lines, one per field, parseable by a shell script.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "iterations: {}", self.iterations)?;
        writeln!(f, "valid_samples: {}", self.valid_samples)?;
        writeln!(f, "invalid_samples: {}", self.invalid_samples)?;
        writeln!(f, "mean_u2k_cycles: {}", self.mean_u2k_cycles)?;
        write!(f, "mean_k2u_cycles: {}", self.mean_k2u_cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::sample::InvalidSample;

    fn valid(u2k: u64, k2u: u64) -> Measurement {
        Measurement::Valid { u2k_cycles: u2k, k2u_cycles: k2u }
    }

    #[test]
    fn test_empty_set_is_configuration_error() {
        let err = Report::compute(&[]).unwrap_err();
        assert_eq!(
            err,
            BenchError::Configuration(ConfigurationError::EmptyMeasurementSet)
        );
    }

    #[test]
    fn test_means_are_truncated() {
        let set = [valid(10, 4), valid(11, 5), valid(11, 5)];
        let report = Report::compute(&set).unwrap();
        assert_eq!(report.iterations, 3);
        assert_eq!(report.valid_samples, 3);
        assert_eq!(report.invalid_samples, 0);
        // 32 / 3 and 14 / 3, integer-truncated
        assert_eq!(report.mean_u2k_cycles, 10);
        assert_eq!(report.mean_k2u_cycles, 4);
    }

    #[test]
    fn test_invalid_samples_excluded() {
        let set = [
            valid(100, 50),
            Measurement::Invalid(InvalidSample::Underflow),
            valid(300, 150),
        ];
        let report = Report::compute(&set).unwrap();
        assert_eq!(report.iterations, 3);
        assert_eq!(report.valid_samples, 2);
        assert_eq!(report.invalid_samples, 1);
        assert_eq!(report.mean_u2k_cycles, 200);
        assert_eq!(report.mean_k2u_cycles, 100);
    }

    #[test]
    fn test_all_invalid_yields_zero_means() {
        let set = [
            Measurement::Invalid(InvalidSample::Underflow),
            Measurement::Invalid(InvalidSample::OutOfRange),
        ];
        let report = Report::compute(&set).unwrap();
        assert_eq!(report.valid_samples, 0);
        assert_eq!(report.invalid_samples, 2);
        assert_eq!(report.mean_u2k_cycles, 0);
        assert_eq!(report.mean_k2u_cycles, 0);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let set = [valid(500, 300), valid(700, 100), valid(600, 200)];
        let first = Report::compute(&set).unwrap();
        let second = Report::compute(&set).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_large_sums_do_not_overflow() {
        let set = vec![valid(u64::MAX / 2, u64::MAX / 2); 1000];
        let report = Report::compute(&set).unwrap();
        assert_eq!(report.mean_u2k_cycles, u64::MAX / 2);
    }

    #[test]
    fn test_display_shape() {
        let report = Report {
            iterations: 10,
            valid_samples: 9,
            invalid_samples: 1,
            mean_u2k_cycles: 500,
            mean_k2u_cycles: 300,
        };
        let text = format!("{}", report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "iterations: 10",
                "valid_samples: 9",
                "invalid_samples: 1",
                "mean_u2k_cycles: 500",
                "mean_k2u_cycles: 300",
            ]
        );
    }
}
