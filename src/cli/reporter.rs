// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use super::runner::FoldSummary;
use crate::paper::{HingeStatus, PaperModel, PaperStats};
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a folding run
    pub fn report_fold(file: &str, summary: &FoldSummary) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Folded:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());
        println!("  {} {}", "Steps:".bright_black(), summary.steps.to_string().cyan());
        println!(
            "  {} {}",
            "Hinges:".bright_black(),
            summary.last_report.folded.len().to_string().cyan()
        );
        if !summary.last_report.skipped.is_empty() {
            println!(
                "  {} {}",
                "Skipped:".bright_black(),
                summary.last_report.skipped.len().to_string().yellow()
            );
        }
        Self::print_metric("Linear error", summary.discrepancy.linear);
        Self::print_metric("Angular error", summary.discrepancy.angular);
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(summary.duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report model statistics and hinge states
    pub fn report_model(file: &str, model: &PaperModel, stats: &PaperStats) {
        println!("\n{} {}", "Model:".bold(), file.cyan());
        stats.print();
        for (key, hinge) in model.hinges() {
            let status = match hinge.status {
                HingeStatus::Foldable => "foldable".green(),
                HingeStatus::Cyclic => "cyclic".yellow(),
                HingeStatus::Conflicting => "conflicting".red(),
            };
            println!(
                "  {} {:>3} - {:<3} {:<7} {:>3} edges  {}",
                "Hinge".bright_black(),
                key.low,
                key.high,
                hinge.kind.to_string(),
                hinge.edges.len(),
                status
            );
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    /// Print an error total, colored by magnitude
    fn print_metric(name: &str, value: f64) {
        let formatted = format!("{:.3e}", value);
        let formatted = if value < 1e-3 {
            formatted.green()
        } else if value < 1e-1 {
            formatted.yellow()
        } else {
            formatted.red()
        };
        println!("  {} {}", format!("{}:", name).bright_black(), formatted);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(Reporter::format_duration(Duration::from_micros(500)), "500µs");
        assert_eq!(Reporter::format_duration(Duration::from_millis(5)), "5.00ms");
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }
}
