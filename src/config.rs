// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Folding session configuration

use crate::paper::{RelaxParams, DEFAULT_SMOOTH_PASSES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE: &str = "paperfold.toml";

/// Parameters of a folding session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldConfig {
    /// Number of fold-and-relax steps
    pub steps: usize,
    /// Share of the remaining hinge angle folded per step
    pub fold_fraction: f64,
    pub relax: RelaxParams,
    /// Edges at least this share of the longest Flat edge get subdivided
    pub subdivide_ratio: f64,
    pub smooth_passes: usize,
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            fold_fraction: 0.05,
            relax: RelaxParams::default(),
            subdivide_ratio: 0.75,
            smooth_passes: DEFAULT_SMOOTH_PASSES,
        }
    }
}

impl FoldConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: FoldConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `paperfold.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from `PAPERFOLD_*` variables looked up with `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(steps) = lookup("PAPERFOLD_STEPS") {
            self.steps = steps
                .parse()
                .with_context(|| format!("PAPERFOLD_STEPS is not a count: {}", steps))?;
        }
        if let Some(fraction) = lookup("PAPERFOLD_FOLD_FRACTION") {
            self.fold_fraction = fraction
                .parse()
                .with_context(|| format!("PAPERFOLD_FOLD_FRACTION is not a number: {}", fraction))?;
        }
        if let Some(repeat) = lookup("PAPERFOLD_RELAX_REPEAT") {
            self.relax.repeat = repeat
                .parse()
                .with_context(|| format!("PAPERFOLD_RELAX_REPEAT is not a count: {}", repeat))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
