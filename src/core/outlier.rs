//! Outlier exclusion
//!
//! Shared screening used by every formula that averages several specimens:
//! take the mean of the filled values, classify each value against the mean
//! with a deviation rule, and report the mean of the survivors when enough of
//! them remain.
//!
//! Unfilled specimens are passed as `None`. They take no part in the mean or
//! in the rule, and a batch with no filled specimen is reported as
//! [`Verdict::FieldsEmpty`] rather than as a failed test.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::outcome::{specimen_label, SpecimenResult, SpecimenStatus, Verdict};

/// Comparisons within this distance of a limit count as on the limit
///
/// Means of decimal readings rarely land exactly on the binary value of the
/// limit, so `|5.2 - 4.9| <= 0.3` would otherwise fail.
pub const LIMIT_TOLERANCE: f64 = 1e-9;

/// How far a specimen may stray from the batch mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum DeviationRule {
    /// `|value - mean| <= limit`, limit in the unit of the values
    Absolute { limit: f64 },
    /// `mean * (1 - p/100) <= value <= mean * (1 + p/100)`
    Percentage { limit_pct: f64 },
}

impl DeviationRule {
    /// Interval of accepted values around a mean
    pub fn bounds(&self, mean: f64) -> (f64, f64) {
        match *self {
            DeviationRule::Absolute { limit } => (mean - limit, mean + limit),
            DeviationRule::Percentage { limit_pct } => {
                let a = mean * (1.0 - limit_pct / 100.0);
                let b = mean * (1.0 + limit_pct / 100.0);
                // a negative mean (shrinkage) flips the interval
                (a.min(b), a.max(b))
            }
        }
    }

    /// Does the rule keep this value?
    ///
    /// A zero mean gives the percentage rule nothing to be relative to, so
    /// every value is kept.
    pub fn accepts(&self, value: f64, mean: f64) -> bool {
        match *self {
            DeviationRule::Absolute { limit } => (value - mean).abs() <= limit + LIMIT_TOLERANCE,
            DeviationRule::Percentage { .. } => {
                if mean == 0.0 {
                    return true;
                }
                let (low, high) = self.bounds(mean);
                value >= low - LIMIT_TOLERANCE && value <= high + LIMIT_TOLERANCE
            }
        }
    }

    /// Signed deviation of a value from the mean
    ///
    /// Absolute rule: `value - mean`. Percentage rule: the same difference as
    /// a percentage of `|mean|`, or `None` when the mean is zero.
    pub fn deviation(&self, value: f64, mean: f64) -> Option<f64> {
        match self {
            DeviationRule::Absolute { .. } => Some(value - mean),
            DeviationRule::Percentage { .. } => {
                if mean == 0.0 {
                    None
                } else {
                    Some((value - mean) / mean.abs() * 100.0)
                }
            }
        }
    }
}

/// Result of screening one batch of specimens
#[derive(Debug, Clone, PartialEq)]
pub struct Screening {
    pub specimens: Vec<SpecimenResult>,
    /// Mean of the filled values before exclusion
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub minimum: usize,
    /// Mean of the survivors, present only when the batch is accepted
    pub final_mean: Option<f64>,
    pub verdict: Verdict,
    pub reason: String,
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Screen a batch of specimens against a deviation rule
pub fn screen(values: &[Option<f64>], rule: DeviationRule, minimum: usize) -> Screening {
    let filled: Vec<f64> = values.iter().flatten().copied().collect();

    let Some(batch_mean) = mean(&filled) else {
        return Screening {
            specimens: values
                .iter()
                .enumerate()
                .map(|(i, _)| SpecimenResult::plain(i, None))
                .collect(),
            mean: None,
            valid_count: 0,
            minimum,
            final_mean: None,
            verdict: Verdict::FieldsEmpty,
            reason: "no specimen readings were filled in".to_string(),
        };
    };

    let mut survivors = Vec::with_capacity(filled.len());
    let specimens: Vec<SpecimenResult> = values
        .iter()
        .enumerate()
        .map(|(i, value)| match value {
            None => SpecimenResult::plain(i, None),
            Some(v) => {
                let keep = rule.accepts(*v, batch_mean);
                debug!(
                    specimen = i + 1,
                    value = v,
                    mean = batch_mean,
                    keep,
                    "outlier screening"
                );
                if keep {
                    survivors.push(*v);
                }
                SpecimenResult {
                    label: specimen_label(i),
                    value: Some(*v),
                    deviation: rule.deviation(*v, batch_mean),
                    status: if keep {
                        SpecimenStatus::Valid
                    } else {
                        SpecimenStatus::Excluded
                    },
                }
            }
        })
        .collect();

    let valid_count = survivors.len();
    let (final_mean, verdict, reason) = if valid_count >= minimum {
        let m = mean(&survivors);
        (
            m,
            Verdict::Accepted,
            format!("{} of {} specimens valid", valid_count, filled.len()),
        )
    } else {
        (
            None,
            Verdict::RepeatTest,
            format!(
                "only {} valid specimen(s), at least {} required: repeat the test",
                valid_count, minimum
            ),
        )
    };

    Screening {
        specimens,
        mean: Some(batch_mean),
        valid_count,
        minimum,
        final_mean,
        verdict,
        reason,
    }
}

/// Treat the zero sentinel of a raw form field as "unfilled"
pub fn filled(value: f64) -> Option<f64> {
    if value == 0.0 {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_rule_boundary_inclusive() {
        let rule = DeviationRule::Absolute { limit: 0.5 };
        assert!(rule.accepts(10.5, 10.0));
        assert!(rule.accepts(9.5, 10.0));
        assert!(!rule.accepts(10.51, 10.0));
        assert!(!rule.accepts(9.49, 10.0));
    }

    #[test]
    fn test_absolute_rule_matches_definition() {
        let rule = DeviationRule::Absolute { limit: 0.3 };
        let mean = 4.0;
        for step in 0..=80 {
            let value = 3.6 + step as f64 * 0.01;
            let expected = (value - mean).abs() <= 0.3 + LIMIT_TOLERANCE;
            assert_eq!(rule.accepts(value, mean), expected, "value {}", value);
        }
    }

    #[test]
    fn test_percentage_rule_boundary_inclusive() {
        let rule = DeviationRule::Percentage { limit_pct: 30.0 };
        assert!(rule.accepts(7.0, 10.0));
        assert!(rule.accepts(13.0, 10.0));
        assert!(!rule.accepts(6.9, 10.0));
        assert!(!rule.accepts(13.1, 10.0));
    }

    #[test]
    fn test_percentage_rule_matches_interval() {
        let rule = DeviationRule::Percentage { limit_pct: 20.0 };
        for mean in [0.5, 1.0, 2.5, 40.0] {
            for step in 0..=100 {
                let value = mean * (0.5 + step as f64 * 0.01);
                let low = mean * (1.0 - 0.2);
                let high = mean * (1.0 + 0.2);
                let inside = value >= low - LIMIT_TOLERANCE && value <= high + LIMIT_TOLERANCE;
                assert_eq!(rule.accepts(value, mean), inside, "mean {} value {}", mean, value);
            }
        }
    }

    #[test]
    fn test_percentage_rule_negative_mean() {
        let rule = DeviationRule::Percentage { limit_pct: 20.0 };
        assert_eq!(rule.bounds(-1.0), (-1.2, -0.8));
        assert!(rule.accepts(-1.1, -1.0));
        assert!(!rule.accepts(-0.5, -1.0));
    }

    #[test]
    fn test_percentage_rule_zero_mean_keeps_everything() {
        let rule = DeviationRule::Percentage { limit_pct: 20.0 };
        assert!(rule.accepts(0.4, 0.0));
        assert_eq!(rule.deviation(0.4, 0.0), None);
    }

    #[test]
    fn test_screen_excludes_outlier() {
        let s = screen(
            &[Some(5.0), Some(5.2), Some(4.5)],
            DeviationRule::Absolute { limit: 0.3 },
            2,
        );
        assert_eq!(s.verdict, Verdict::Accepted);
        assert_eq!(s.valid_count, 2);
        assert_eq!(s.specimens[2].status, SpecimenStatus::Excluded);
        assert!((s.final_mean.unwrap() - 5.1).abs() < 1e-9);
    }

    #[test]
    fn test_screen_minimum_boundary() {
        let values = [Some(10.0), Some(10.0), Some(10.0), Some(20.0)];
        let rule = DeviationRule::Absolute { limit: 3.0 };

        // mean 12.5: the three 10s are 2.5 away, the 20 is 7.5 away
        let at_minimum = screen(&values, rule, 3);
        assert_eq!(at_minimum.verdict, Verdict::Accepted);
        assert_eq!(at_minimum.final_mean, Some(10.0));

        let below_minimum = screen(&values, rule, 4);
        assert_eq!(below_minimum.verdict, Verdict::RepeatTest);
        assert_eq!(below_minimum.valid_count, 3);
        assert!(below_minimum.final_mean.is_none());
    }

    #[test]
    fn test_screen_unfilled_excluded_from_mean() {
        let s = screen(
            &[Some(2.0), None, Some(2.2), None],
            DeviationRule::Percentage { limit_pct: 6.0 },
            2,
        );
        assert!((s.mean.unwrap() - 2.1).abs() < 1e-12);
        assert_eq!(s.specimens[1].status, SpecimenStatus::Unfilled);
        assert_eq!(s.specimens[1].value, None);
        assert_eq!(s.valid_count, 2);
    }

    #[test]
    fn test_screen_all_unfilled_is_fields_empty() {
        let s = screen(&[None, None, None], DeviationRule::Absolute { limit: 0.3 }, 2);
        assert_eq!(s.verdict, Verdict::FieldsEmpty);
        assert_eq!(s.specimens.len(), 3);
        assert!(s.mean.is_none());
    }

    #[test]
    fn test_deviation_sign_convention() {
        let rule = DeviationRule::Absolute { limit: 1.0 };
        assert_eq!(rule.deviation(5.0, 4.0), Some(1.0));
        let pct = DeviationRule::Percentage { limit_pct: 10.0 };
        assert_eq!(pct.deviation(11.0, 10.0), Some(10.0));
    }

    #[test]
    fn test_filled_sentinel() {
        assert_eq!(filled(0.0), None);
        assert_eq!(filled(1.5), Some(1.5));
    }
}
