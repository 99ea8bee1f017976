// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Headless folding driver

use crate::config::FoldConfig;
use crate::paper::{Discrepancy, FoldReport, PaperModel};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::time::{Duration, Instant};

/// Outcome of a folding run
#[derive(Debug, Clone)]
pub struct FoldSummary {
    pub steps: usize,
    /// Hinges folded and skipped by the last step
    pub last_report: FoldReport,
    pub discrepancy: Discrepancy,
    pub duration: Duration,
}

/// Runs fold-and-relax steps the way an animation loop would, one step
/// per frame
pub struct FoldRunner {
    config: FoldConfig,
    progress: bool,
}

impl FoldRunner {
    pub fn new(config: FoldConfig) -> Self {
        Self {
            config,
            progress: false,
        }
    }

    /// Show a progress bar while running
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &FoldConfig {
        &self.config
    }

    /// One frame: fold hinges by the configured fraction, then relax
    pub fn step(&self, model: &mut PaperModel) -> Result<FoldReport> {
        let report = model
            .fold_hinges(self.config.fold_fraction)
            .context("Failed to fold hinges")?;
        model
            .relax_one_step(self.config.relax)
            .context("Failed to relax constraints")?;
        Ok(report)
    }

    /// Build constraints, then run the configured number of steps
    pub fn run(&self, model: &mut PaperModel) -> Result<FoldSummary> {
        let start = Instant::now();
        model
            .compute_constraints()
            .context("Failed to compute constraints")?;

        let progress = if self.progress {
            let pb = ProgressBar::new(self.config.steps as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                    .context("Invalid progress template")?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut last_report = FoldReport::default();
        for step in 0..self.config.steps {
            last_report = self.step(model)?;
            debug!("step {} folded {} hinges", step, last_report.folded.len());
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(FoldSummary {
            steps: self.config.steps,
            last_report,
            discrepancy: model.discrepancy()?,
            duration: start.elapsed(),
        })
    }
}

impl Default for FoldRunner {
    fn default() -> Self {
        Self::new(FoldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Sheet;
    use crate::paper::EdgeType;

    #[test]
    fn test_run_folds_a_crease() -> Result<()> {
        let mut model = Sheet::grid(4, 4, 1.0).to_model()?;
        for j in 1..4 {
            model.set_edge_type_between((j - 1) * 4 + 1, j * 4 + 1, EdgeType::Ridge)?;
        }
        let config = FoldConfig {
            steps: 10,
            fold_fraction: 0.3,
            ..FoldConfig::default()
        };
        let summary = FoldRunner::new(config).run(&mut model)?;
        assert_eq!(summary.steps, 10);
        assert_eq!(summary.last_report.folded.len(), 1);
        let edge = model.edge_between(1, 5)?;
        assert!(model.dihedral_at(edge)? > 0.5);
        Ok(())
    }

    #[test]
    fn test_zero_steps_leaves_sheet_flat() -> Result<()> {
        let mut model = Sheet::grid(3, 3, 1.0).to_model()?;
        let config = FoldConfig {
            steps: 0,
            ..FoldConfig::default()
        };
        let summary = FoldRunner::new(config).run(&mut model)?;
        assert!(summary.last_report.folded.is_empty());
        assert_eq!(model.position(4).map(|p| p.z), Some(0.0));
        Ok(())
    }
}
