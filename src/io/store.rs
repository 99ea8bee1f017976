// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Model files on disk

use crate::paper::PaperModel;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

/// Read a JSON model file
pub fn load_paper<P: AsRef<Path>>(path: P) -> Result<PaperModel> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model file: {}", path.display()))?;
    let model = super::from_json(&source)
        .with_context(|| format!("Failed to load model file: {}", path.display()))?;
    info!(
        "loaded {}: {} vertices, {} faces",
        path.display(),
        model.mesh().vertex_count(),
        model.mesh().face_count()
    );
    Ok(model)
}

/// Write a model as pretty-printed JSON
pub fn save_paper<P: AsRef<Path>>(model: &PaperModel, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = super::to_json(model).context("Failed to serialize model")?;
    fs::write(path, json).with_context(|| format!("Failed to write model file: {}", path.display()))?;
    info!("saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Sheet;
    use crate::paper::EdgeType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_and_load() -> Result<()> {
        let mut model = Sheet::grid(3, 3, 1.0).to_model()?;
        model.set_edge_type_between(1, 4, EdgeType::Valley)?;
        let file = NamedTempFile::new()?;
        save_paper(&model, file.path())?;

        let loaded = load_paper(file.path())?;
        let edge = loaded.edge_between(1, 4)?;
        assert_eq!(loaded.edges()[edge].kind, EdgeType::Valley);
        Ok(())
    }

    #[test]
    fn test_load_reports_path() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{{ not json")?;
        let err = load_paper(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load model file"));
        Ok(())
    }
}
