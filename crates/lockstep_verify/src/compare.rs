//! Positional trace comparison.
//!
//! Row `i` of the golden trace is checked against row `i` of the hardware
//! trace over the overlap of the two. Each row is evaluated against every
//! rule of the policy table in table order; a field missing from either row
//! is skipped. Above a size threshold rows are compared on the rayon pool,
//! with results collected back in row order.

use crate::error::VerifyResult;
use crate::policy::{FieldPolicy, PolicyTable};
use crate::trace::{Trace, TraceRow};
use crate::verdict::{ComparisonVerdict, FieldMismatch, MismatchKind, RowMismatch, Warning};
use lockstep_core::CoreError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance used when none is configured
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Relative slack applied on top of the tolerance, scaled by the compared magnitudes
const REPRESENTATION_SLACK: f64 = 1e-12;

/// Comparator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Largest accepted absolute difference for tolerance fields
    pub tolerance: f64,
    /// Overlap size at which rows are compared in parallel
    pub parallel_threshold: usize,
}

impl CompareConfig {
    /// Set tolerance
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set parallel threshold
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Check settings
    ///
    /// # Errors
    ///
    /// Returns a validation error for a negative or non-finite tolerance
    pub fn validate(&self) -> VerifyResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(CoreError::validation(
                "tolerance",
                format!("{} must be a non-negative number", self.tolerance),
            )
            .into());
        }
        Ok(())
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            parallel_threshold: 4096,
        }
    }
}

/// Compares golden and hardware traces under a policy table
#[derive(Debug, Clone)]
pub struct TraceComparator {
    config: CompareConfig,
    policy: PolicyTable,
}

impl TraceComparator {
    /// Create a comparator with the default policy table
    ///
    /// # Errors
    ///
    /// Returns error if the config does not validate
    pub fn new(config: CompareConfig) -> VerifyResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            policy: PolicyTable::default(),
        })
    }

    /// Replace the policy table
    #[must_use]
    pub fn with_policy(mut self, policy: PolicyTable) -> Self {
        self.policy = policy;
        self
    }

    /// Active settings
    #[must_use]
    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Active policy table
    #[must_use]
    pub fn policy(&self) -> &PolicyTable {
        &self.policy
    }

    /// Compare two loaded traces
    #[must_use]
    pub fn compare_traces(&self, golden: &Trace, hardware: &Trace) -> ComparisonVerdict {
        self.compare(&golden.rows, &hardware.rows)
    }

    /// Compare rows positionally over the shorter of the two inputs
    #[must_use]
    pub fn compare(&self, golden: &[TraceRow], hardware: &[TraceRow]) -> ComparisonVerdict {
        let mut warnings = Vec::new();
        if golden.len() != hardware.len() {
            tracing::warn!(
                golden = golden.len(),
                hardware = hardware.len(),
                "row count mismatch, comparing the overlap only"
            );
            warnings.push(Warning::RowCountMismatch {
                golden: golden.len(),
                hardware: hardware.len(),
            });
        }

        let total = golden.len().min(hardware.len());
        let pairs = golden.iter().zip(hardware).enumerate();
        let mismatches: Vec<RowMismatch> = if total >= self.config.parallel_threshold {
            pairs
                .collect::<Vec<_>>()
                .into_par_iter()
                .filter_map(|(index, (g, h))| self.compare_row(index, g, h))
                .collect()
        } else {
            pairs
                .filter_map(|(index, (g, h))| self.compare_row(index, g, h))
                .collect()
        };

        let failed = mismatches.len();
        tracing::debug!(total, failed, "comparison finished");
        ComparisonVerdict {
            total,
            passed: total - failed,
            failed,
            mismatches,
            warnings,
            tolerance: self.config.tolerance,
        }
    }

    /// Evaluate every rule for one row pair
    fn compare_row(&self, index: usize, golden: &TraceRow, hardware: &TraceRow) -> Option<RowMismatch> {
        let fields: Vec<FieldMismatch> = self
            .policy
            .rules()
            .iter()
            .filter_map(|rule| {
                let g = golden.get(&rule.field)?;
                let h = hardware.get(&rule.field)?;
                let kind = match &rule.policy {
                    FieldPolicy::Exact => compare_exact(g, h),
                    FieldPolicy::Tolerance => compare_tolerance(g, h, self.config.tolerance),
                    FieldPolicy::Categorical { labels } => compare_category(g, h, labels),
                }?;
                Some(FieldMismatch {
                    field: rule.field.clone(),
                    kind,
                })
            })
            .collect();

        if fields.is_empty() {
            None
        } else {
            Some(RowMismatch {
                index,
                label: golden.label().to_string(),
                fields,
            })
        }
    }
}

fn compare_exact(golden: &str, hardware: &str) -> Option<MismatchKind> {
    (golden != hardware).then(|| MismatchKind::Exact {
        golden: golden.to_string(),
        hardware: hardware.to_string(),
    })
}

fn compare_tolerance(golden: &str, hardware: &str, tolerance: f64) -> Option<MismatchKind> {
    let (Some(g), Some(h)) = (finite_value(golden), finite_value(hardware)) else {
        return Some(parse_error(golden, hardware));
    };
    let delta = (g - h).abs();
    // Decimal cells rarely subtract exactly in binary; a difference equal to the
    // tolerance must pass, so only excess beyond the representation error fails
    let slack = REPRESENTATION_SLACK * g.abs().max(h.abs()).max(1.0);
    (delta - tolerance > slack).then_some(MismatchKind::Tolerance {
        golden: g,
        hardware: h,
        delta,
        tolerance,
    })
}

/// Parse a float cell, rejecting NaN and infinities
fn finite_value(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn compare_category(golden: &str, hardware: &str, labels: &BTreeMap<i64, String>) -> Option<MismatchKind> {
    let (Some(g), Some(h)) = (category_code(golden), category_code(hardware)) else {
        return Some(parse_error(golden, hardware));
    };
    let name = |code: i64| labels.get(&code).cloned().unwrap_or_else(|| code.to_string());
    (g != h).then(|| MismatchKind::Categorical {
        golden: name(g),
        hardware: name(h),
    })
}

/// Parse a float cell and truncate it toward zero
fn category_code(value: &str) -> Option<i64> {
    let code = value.parse::<f64>().ok()?;
    (code.is_finite() && code.abs() < i64::MAX as f64).then(|| code.trunc() as i64)
}

fn parse_error(golden: &str, hardware: &str) -> MismatchKind {
    MismatchKind::ParseError {
        golden: golden.to_string(),
        hardware: hardware.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::GOLDEN_COLUMNS;
    use crate::verdict::Outcome;
    use proptest::prelude::*;

    fn row(values: [&str; 12]) -> TraceRow {
        GOLDEN_COLUMNS.iter().zip(values).collect()
    }

    fn golden_row(index: usize) -> TraceRow {
        let idx = index.to_string();
        let price = (1_500_000 + index * 100).to_string();
        row([
            idx.as_str(), "B", price.as_str(), "100", "AAPL", "1499900", "1500100", "1", "0.8421", "0", "0", "0",
        ])
    }

    fn comparator() -> TraceComparator {
        TraceComparator::new(CompareConfig::default()).unwrap()
    }

    fn mismatch_strings(verdict: &ComparisonVerdict) -> Vec<String> {
        verdict
            .mismatches
            .iter()
            .flat_map(|m| m.fields.iter().map(ToString::to_string))
            .collect()
    }

    #[test]
    fn test_price_mismatch() {
        let golden = vec![TraceRow::new().with("price", "100000").with("stock", "AAPL")];
        let hardware = vec![TraceRow::new().with("price", "100010").with("stock", "AAPL")];
        let verdict = comparator().compare(&golden, &hardware);

        assert_eq!(verdict.outcome(), Outcome::Fail);
        assert_eq!(verdict.failed, 1);
        assert_eq!(verdict.mismatches[0].index, 0);
        assert_eq!(verdict.mismatches[0].label, "AAPL");
        assert_eq!(mismatch_strings(&verdict), vec!["price: golden=100000 hw=100010"]);
    }

    #[test]
    fn test_confidence_within_tolerance() {
        let golden = vec![TraceRow::new().with("moe_confidence", "0.8421")];
        let hardware = vec![TraceRow::new().with("moe_confidence", "0.8490")];
        let verdict = comparator().compare(&golden, &hardware);
        assert_eq!(verdict.outcome(), Outcome::Pass);
    }

    #[test]
    fn test_action_mismatch_uses_labels() {
        let golden = vec![TraceRow::new().with("moe_action", "1")];
        let hardware = vec![TraceRow::new().with("moe_action", "2")];
        let verdict = comparator().compare(&golden, &hardware);
        assert_eq!(mismatch_strings(&verdict), vec!["moe_action: golden=BUY hw=SELL"]);
    }

    #[test]
    fn test_unknown_action_code_printed_raw() {
        let golden = vec![TraceRow::new().with("moe_action", "1.0")];
        let hardware = vec![TraceRow::new().with("moe_action", "7.9")];
        let verdict = comparator().compare(&golden, &hardware);
        assert_eq!(mismatch_strings(&verdict), vec!["moe_action: golden=BUY hw=7"]);
    }

    #[test]
    fn test_action_codes_truncated_before_comparison() {
        let golden = vec![TraceRow::new().with("moe_action", "2")];
        let hardware = vec![TraceRow::new().with("moe_action", "2.7")];
        assert!(comparator().compare(&golden, &hardware).is_pass());
    }

    #[test]
    fn test_row_count_mismatch_compares_overlap() {
        let golden: Vec<TraceRow> = (0..500).map(golden_row).collect();
        let hardware: Vec<TraceRow> = golden[..498].to_vec();
        let verdict = comparator().compare(&golden, &hardware);

        assert_eq!(verdict.total, 498);
        assert_eq!(verdict.outcome(), Outcome::Pass);
        assert_eq!(
            verdict.warnings,
            vec![Warning::RowCountMismatch {
                golden: 500,
                hardware: 498
            }]
        );
    }

    #[test]
    fn test_self_comparison_passes() {
        let golden: Vec<TraceRow> = (0..100).map(golden_row).collect();
        let verdict = comparator().compare(&golden, &golden);
        assert_eq!(verdict.total, 100);
        assert_eq!(verdict.failed, 0);
        assert!(verdict.warnings.is_empty());
    }

    #[test]
    fn test_tolerance_boundary() {
        let config = CompareConfig::default().with_tolerance(0.25);
        let comparator = TraceComparator::new(config).unwrap();

        let golden = vec![TraceRow::new().with("moe_confidence", "0.5")];
        let at_limit = vec![TraceRow::new().with("moe_confidence", "0.75")];
        assert!(comparator.compare(&golden, &at_limit).is_pass());

        let beyond = vec![TraceRow::new().with("moe_confidence", "0.750000001")];
        let verdict = comparator.compare(&golden, &beyond);
        assert_eq!(verdict.failed, 1);
        assert!(matches!(
            verdict.mismatches[0].fields[0].kind,
            MismatchKind::Tolerance { .. }
        ));
    }

    #[test]
    fn test_decimal_difference_equal_to_tolerance_passes() {
        let golden = vec![TraceRow::new().with("moe_confidence", "0.8421")];
        let at_limit = vec![TraceRow::new().with("moe_confidence", "0.8521")];
        assert!(comparator().compare(&golden, &at_limit).is_pass());

        let beyond = vec![TraceRow::new().with("moe_confidence", "0.852100001")];
        let verdict = comparator().compare(&golden, &beyond);
        assert_eq!(verdict.failed, 1);
        assert!(matches!(
            verdict.mismatches[0].fields[0].kind,
            MismatchKind::Tolerance { .. }
        ));
    }

    #[test]
    fn test_non_finite_confidence_is_parse_error() {
        let golden = vec![TraceRow::new().with("moe_confidence", "0.9")];
        for bad in ["NaN", "inf", "-inf"] {
            let hardware = vec![TraceRow::new().with("moe_confidence", bad)];
            let verdict = comparator().compare(&golden, &hardware);
            assert_eq!(verdict.failed, 1, "{} accepted", bad);
            assert_eq!(
                mismatch_strings(&verdict),
                vec![format!("moe_confidence: parse error (g='0.9' h='{}')", bad)]
            );
        }
        // both sides broken still fails
        let nan = vec![TraceRow::new().with("moe_confidence", "NaN")];
        assert!(!comparator().compare(&nan, &nan).is_pass());
    }

    #[test]
    fn test_parse_error_is_mismatch() {
        let golden = vec![TraceRow::new().with("moe_confidence", "0.9")];
        let hardware = vec![TraceRow::new().with("moe_confidence", "x")];
        let verdict = comparator().compare(&golden, &hardware);
        assert_eq!(
            mismatch_strings(&verdict),
            vec!["moe_confidence: parse error (g='0.9' h='x')"]
        );
    }

    #[test]
    fn test_absent_fields_skipped() {
        let golden = vec![TraceRow::new().with("price", "1").with("shares", "100")];
        let hardware = vec![TraceRow::new().with("price", "1")];
        assert!(comparator().compare(&golden, &hardware).is_pass());
    }

    #[test]
    fn test_unlisted_fields_ignored() {
        let golden = vec![TraceRow::new().with("best_bid", "1")];
        let hardware = vec![TraceRow::new().with("best_bid", "2")];
        assert!(comparator().compare(&golden, &hardware).is_pass());
    }

    #[test]
    fn test_zero_overlap_is_no_data() {
        let golden: Vec<TraceRow> = (0..3).map(golden_row).collect();
        let verdict = comparator().compare(&golden, &[]);
        assert_eq!(verdict.outcome(), Outcome::NoData);
        assert_eq!(verdict.warnings.len(), 1);

        assert_eq!(comparator().compare(&[], &[]).outcome(), Outcome::NoData);
    }

    #[test]
    fn test_mismatches_listed_in_policy_order() {
        let golden = vec![golden_row(0)];
        let hardware = vec![row([
            "0", "S", "1500000", "200", "AAPL", "1499900", "1500100", "1", "0.8421", "0", "0", "0",
        ])];
        let verdict = comparator().compare(&golden, &hardware);
        let fields: Vec<&str> = verdict.mismatches[0]
            .fields
            .iter()
            .map(|f| f.field.as_str())
            .collect();
        assert_eq!(fields, vec!["side", "shares"]);
    }

    #[test]
    fn test_custom_policy_from_json() {
        let json = PolicyTable::empty()
            .with_field("best_bid", FieldPolicy::Exact)
            .to_json()
            .unwrap();
        let comparator = comparator().with_policy(PolicyTable::from_json(&json).unwrap());

        let golden = vec![TraceRow::new().with("best_bid", "1").with("price", "5")];
        let hardware = vec![TraceRow::new().with("best_bid", "2").with("price", "6")];
        let verdict = comparator.compare(&golden, &hardware);
        assert_eq!(mismatch_strings(&verdict), vec!["best_bid: golden=1 hw=2"]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let golden: Vec<TraceRow> = (0..300).map(golden_row).collect();
        let mut hardware = golden.clone();
        for index in [3, 77, 150, 299] {
            hardware[index].insert("price", "0");
        }

        let sequential = comparator().compare(&golden, &hardware);
        let parallel = TraceComparator::new(CompareConfig::default().with_parallel_threshold(1))
            .unwrap()
            .compare(&golden, &hardware);

        assert_eq!(sequential, parallel);
        let indices: Vec<usize> = parallel.mismatches.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![3, 77, 150, 299]);
    }

    #[test]
    fn test_invalid_tolerance() {
        assert!(TraceComparator::new(CompareConfig::default().with_tolerance(-1.0)).is_err());
        assert!(TraceComparator::new(CompareConfig::default().with_tolerance(f64::NAN)).is_err());
    }

    proptest! {
        #[test]
        fn prop_counts_add_up(
            prices in proptest::collection::vec((0u32..5, 0u32..5), 0..64)
        ) {
            let golden: Vec<TraceRow> = prices
                .iter()
                .map(|(g, _)| TraceRow::new().with("price", &g.to_string()))
                .collect();
            let hardware: Vec<TraceRow> = prices
                .iter()
                .map(|(_, h)| TraceRow::new().with("price", &h.to_string()))
                .collect();
            let verdict = comparator().compare(&golden, &hardware);
            let expected = prices.iter().filter(|(g, h)| g != h).count();

            prop_assert_eq!(verdict.passed + verdict.failed, verdict.total);
            prop_assert_eq!(verdict.failed, expected);
        }

        #[test]
        fn prop_self_comparison_never_fails(confidence in 0.0f64..1.0, action in 0u8..3) {
            let rows = vec![TraceRow::new()
                .with("moe_confidence", &confidence.to_string())
                .with("moe_action", &action.to_string())];
            prop_assert!(comparator().compare(&rows, &rows).is_pass());
        }
    }
}
