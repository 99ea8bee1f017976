// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Paperfold
//!
//! Simulates folding a sheet of paper. The sheet is a triangulated
//! half-edge mesh whose edges are labelled Flat, Ridge, Valley, Cut or
//! Border. Cuts open the mesh, Flat edges glue faces into rigid panels,
//! and hinge rotation plus iterative constraint relaxation drive the sheet
//! towards its folded shape.

pub mod cli;
pub mod config;
pub mod geometry;
pub mod io;
pub mod paper;
pub mod utils;

#[cfg(feature = "wasm")]
pub mod ffi;

pub use config::FoldConfig;
pub use geometry::{HalfEdgeMesh, Sheet, TopologyError};
pub use io::{from_json, load_paper, save_paper, to_json};
pub use paper::{EdgeType, PaperError, PaperModel, RelaxParams};

use anyhow::Result;

/// Load a model, fold it for the configured number of steps and return it
pub fn fold_file(path: &str, config: &FoldConfig) -> Result<PaperModel> {
    let mut model = load_paper(path)?;
    cli::FoldRunner::new(config.clone()).run(&mut model)?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fold_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("sheet.json");
        save_paper(&Sheet::grid(3, 3, 1.0).to_model()?, &path)?;

        let config = FoldConfig {
            steps: 2,
            ..FoldConfig::default()
        };
        let model = fold_file(path.to_str().unwrap(), &config)?;
        assert_eq!(model.mesh().vertex_count(), 9);
        Ok(())
    }
}
