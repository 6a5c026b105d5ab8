use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use takedown_game::numbers::ratio;

use super::CheckResult;

/// Pass/fail counts across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    #[must_use]
    pub fn of(results: &[CheckResult]) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
        }
    }

    #[must_use]
    pub fn success_rate(&self) -> f64 {
        ratio(self.passed, self.total) * 100.0
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    summary: Summary,
    results: &'a [CheckResult],
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[CheckResult],
    total_duration: Duration,
) -> Result<()> {
    let summary = Summary::of(results);
    writeln!(out)?;
    writeln!(out, "{}", "📊 Takedown Check Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==========================".cyan())?;
    writeln!(out, "Total checks: {}", summary.total)?;
    writeln!(out, "Passed: {}", summary.passed.to_string().green())?;
    writeln!(out, "Failed: {}", summary.failed.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", summary.success_rate())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{status} {} (seed: {})",
            result.name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   Trials: {}  Time: {:.1} ms",
            result.trials, result.elapsed_ms
        )?;
        for (metric, value) in &result.metrics {
            writeln!(out, "   {metric}: {value:.4}")?;
        }
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    if let Some(slowest) = results
        .iter()
        .max_by(|a, b| a.elapsed_ms.total_cmp(&b.elapsed_ms))
    {
        writeln!(out, "{}", "⚡ Performance".bright_yellow().bold())?;
        writeln!(out, "{}", "==============".yellow())?;
        writeln!(
            out,
            "Slowest: {} ({:.1} ms)",
            slowest.name.yellow(),
            slowest.elapsed_ms
        )?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[CheckResult],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let report = JsonReport {
        generated_at: generated_at.to_rfc3339(),
        summary: Summary::of(results),
        results,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    results: &[CheckResult],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let summary = Summary::of(results);
    writeln!(out, "# Takedown Check Results\n")?;
    writeln!(out, "_Generated {}_\n", generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total checks**: {}", summary.total)?;
    writeln!(out, "- **Passed**: {}", summary.passed)?;
    writeln!(out, "- **Failed**: {}", summary.failed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", summary.success_rate())?;

    writeln!(out, "## Detailed Results\n")?;
    writeln!(out, "| Status | Check | Seed | Trials | Metrics |")?;
    writeln!(out, "|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        let metrics = result
            .metrics
            .iter()
            .map(|(metric, value)| format!("{metric}={value:.4}"))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            out,
            "| {status} | {} | {} | {} | {metrics} |",
            result.name, result.seed, result.trials
        )?;
    }

    let failing: Vec<_> = results.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for result in failing {
            writeln!(out, "### {} (seed {})\n", result.name, result.seed)?;
            for failure in &result.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

/// One row per recorded metric, so bands and sweeps can be charted directly.
pub fn generate_csv_report<W: Write + ?Sized>(out: &mut W, results: &[CheckResult]) -> Result<()> {
    writeln!(out, "check,kind,seed,passed,trials,metric,value")?;
    for result in results {
        let prefix = format!(
            "{},{},{},{},{}",
            csv_field(&result.name),
            result.kind.label(),
            csv_field(&result.seed),
            result.passed,
            result.trials
        );
        if result.metrics.is_empty() {
            writeln!(out, "{prefix},,")?;
        }
        for (metric, value) in &result.metrics {
            writeln!(out, "{prefix},{metric},{value}")?;
        }
    }
    Ok(())
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
