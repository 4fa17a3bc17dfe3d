//! Console verification report.

use console::style;
use lockstep_verify::{ComparisonVerdict, Outcome};
use std::fmt::Write;
use std::path::Path;

const RULE_WIDTH: usize = 70;

/// Render the full report for a verdict into `out`
pub fn render(
    out: &mut impl Write,
    verdict: &ComparisonVerdict,
    golden: &Path,
    hardware: &Path,
) -> std::fmt::Result {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = format!("  {}", "-".repeat(RULE_WIDTH - 4));

    writeln!(out)?;
    writeln!(out, "{}", style(&heavy).bold())?;
    writeln!(out, "{}", style("  LOCKSTEP Bit-Accuracy Verification Report").bold())?;
    writeln!(out, "{}", style(&heavy).bold())?;
    writeln!(out)?;
    writeln!(out, "  Golden model trace:   {}", golden.display())?;
    writeln!(out, "  Hardware trace:       {}", hardware.display())?;
    writeln!(out, "  Orders compared:      {}", verdict.total)?;
    writeln!(out, "  Tolerance:            {}", verdict.tolerance)?;
    writeln!(out)?;

    for warning in &verdict.warnings {
        writeln!(out, "{}", style(format!("  WARNING: {}", warning)).yellow())?;
    }
    if !verdict.warnings.is_empty() {
        writeln!(out)?;
    }

    if !verdict.mismatches.is_empty() {
        writeln!(out, "{}", style("  MISMATCHES:").red())?;
        writeln!(out, "{}", style(&light).red())?;
        for row in &verdict.mismatches {
            writeln!(out, "{}", style(format!("  Order {} ({}):", row.index, row.label)).red())?;
            for field in &row.fields {
                writeln!(out, "{}", style(format!("    - {}", field)).red())?;
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "{}", light)?;
    writeln!(out, "  Passed: {}", style(verdict.passed).green())?;
    let failed = if verdict.failed > 0 {
        style(verdict.failed).red()
    } else {
        style(verdict.failed).green()
    };
    writeln!(out, "  Failed: {}", failed)?;
    writeln!(out)?;

    match verdict.outcome() {
        Outcome::Pass => {
            writeln!(out, "{}", style("  VERDICT: PASS — 100% bit-accurate match").green().bold())?;
            writeln!(
                out,
                "{}",
                style("  The hardware implementation matches the golden model exactly.").green()
            )?;
        }
        Outcome::NoData => {
            writeln!(out, "{}", style("  VERDICT: NO DATA — nothing to compare").yellow().bold())?;
        }
        Outcome::Fail => {
            let line = format!(
                "  VERDICT: FAIL — {}/{} orders ({:.1}%) have mismatches",
                verdict.failed,
                verdict.total,
                verdict.failure_rate()
            );
            writeln!(out, "{}", style(line).red().bold())?;
        }
    }
    writeln!(out, "{}", style(&heavy).bold())?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_verify::{CompareConfig, TraceComparator, TraceRow};

    fn rendered(golden: &[TraceRow], hardware: &[TraceRow]) -> String {
        console::set_colors_enabled(false);
        let verdict = TraceComparator::new(CompareConfig::default())
            .unwrap()
            .compare(golden, hardware);
        let mut text = String::new();
        render(&mut text, &verdict, Path::new("golden.csv"), Path::new("hw.csv")).unwrap();
        text
    }

    fn priced(stock: &str, price: &str) -> TraceRow {
        TraceRow::new().with("stock", stock).with("price", price)
    }

    #[test]
    fn test_pass_report() {
        let rows = vec![priced("AAPL", "1"), priced("MSFT", "2")];
        let text = rendered(&rows, &rows);
        assert!(text.contains("  Golden model trace:   golden.csv"));
        assert!(text.contains("  Orders compared:      2"));
        assert!(text.contains("  Passed: 2"));
        assert!(text.contains("  Failed: 0"));
        assert!(text.contains("VERDICT: PASS — 100% bit-accurate match"));
        assert!(!text.contains("MISMATCHES"));
    }

    #[test]
    fn test_fail_report() {
        let golden = vec![priced("AAPL", "100000"), priced("MSFT", "2"), priced("TSLA", "3")];
        let hardware = vec![priced("AAPL", "100010"), priced("MSFT", "2"), priced("TSLA", "3")];
        let text = rendered(&golden, &hardware);
        assert!(text.contains("  Order 0 (AAPL):\n    - price: golden=100000 hw=100010\n"));
        assert!(text.contains("VERDICT: FAIL — 1/3 orders (33.3%) have mismatches"));
    }

    #[test]
    fn test_no_data_report_with_warning() {
        let golden = vec![priced("AAPL", "1")];
        let text = rendered(&golden, &[]);
        assert!(text.contains("WARNING: Row count mismatch: golden has 1 rows, hardware has 0 rows"));
        assert!(text.contains("VERDICT: NO DATA — nothing to compare"));
    }
}
