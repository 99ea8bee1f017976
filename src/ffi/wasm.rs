// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! WASM bindings using wasm-bindgen

use crate::geometry::Sheet;
use crate::io;
use crate::paper::{EdgeType, PaperModel, RelaxParams};
use wasm_bindgen::prelude::*;

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

#[wasm_bindgen]
pub struct WasmPaper {
    inner: PaperModel,
    relax: RelaxParams,
}

#[wasm_bindgen]
impl WasmPaper {
    /// Flat grid sheet
    pub fn grid(columns: usize, rows: usize, cell_size: f64) -> Result<WasmPaper, JsValue> {
        let inner = Sheet::grid(columns, rows, cell_size)
            .to_model()
            .map_err(|e| js_error("Grid error", e))?;
        Ok(Self {
            inner,
            relax: RelaxParams::default(),
        })
    }

    pub fn from_json(source: &str) -> Result<WasmPaper, JsValue> {
        let inner = io::from_json(source).map_err(|e| js_error("Load error", e))?;
        Ok(Self {
            inner,
            relax: RelaxParams::default(),
        })
    }

    pub fn to_json(&self) -> Result<String, JsValue> {
        io::to_json(&self.inner).map_err(|e| js_error("JSON serialization error", e))
    }

    /// Current positions as x, y, z triples indexed by vertex id
    pub fn vertex_buffer(&self) -> Vec<f32> {
        self.inner.vertex_buffer().iter().flatten().copied().collect()
    }

    /// Per-edge endpoints as six floats each, in edge order
    pub fn edge_buffer(&self) -> Result<Vec<f32>, JsValue> {
        let views = self.inner.edge_views().map_err(|e| js_error("Edge error", e))?;
        Ok(views
            .iter()
            .flat_map(|view| view.endpoints.iter().flat_map(|p| [p.x as f32, p.y as f32, p.z as f32]))
            .collect())
    }

    /// Edge type names in edge order
    pub fn edge_types(&self) -> Vec<String> {
        self.inner.edges().iter().map(|e| e.kind.to_string()).collect()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edges().len()
    }

    pub fn set_edge_type(&mut self, edge: usize, kind: &str) -> Result<(), JsValue> {
        let kind: EdgeType = kind.parse().map_err(|e| js_error("Edge type error", e))?;
        self.inner
            .set_edge_type(edge, kind)
            .map_err(|e| js_error("Edge type error", e))
    }

    pub fn set_relax_params(&mut self, repeat: usize, dihedral: usize, flat: usize, linear: usize) {
        self.relax = RelaxParams {
            repeat,
            dihedral,
            flat,
            linear,
        };
    }

    pub fn compute_constraints(&mut self) -> Result<(), JsValue> {
        self.inner
            .compute_constraints()
            .map_err(|e| js_error("Constraint error", e))
    }

    pub fn relax(&mut self) -> Result<(), JsValue> {
        self.inner
            .relax_one_step(self.relax)
            .map_err(|e| js_error("Relax error", e))
    }

    /// Returns the number of hinges folded
    pub fn fold(&mut self, fraction: f64) -> Result<usize, JsValue> {
        let report = self
            .inner
            .fold_hinges(fraction)
            .map_err(|e| js_error("Fold error", e))?;
        Ok(report.folded.len())
    }

    pub fn subdivide(&mut self, ratio: f64) -> Result<usize, JsValue> {
        self.inner
            .subdivide_long_edges(ratio)
            .map_err(|e| js_error("Subdivide error", e))
    }

    pub fn flip(&mut self) -> Result<usize, JsValue> {
        self.inner.flip_edges().map_err(|e| js_error("Flip error", e))
    }

    pub fn smooth(&mut self) -> Result<usize, JsValue> {
        self.inner
            .laplacian_smooth()
            .map_err(|e| js_error("Smooth error", e))
    }

    pub fn flatten(&mut self) -> Result<(), JsValue> {
        self.inner
            .component_svd()
            .map_err(|e| js_error("Flatten error", e))
    }
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
