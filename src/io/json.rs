// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON model format
//!
//! ```json
//! {
//!   "vertices": [{"x": 0, "y": 0, "z": 0}, ...],
//!   "originalVertices": [{"x": 0, "y": 0, "z": 0}, ...],
//!   "faces": [[0, 1, 2], ...],
//!   "edges": [{"v0": 0, "v1": 1, "type": "Ridge"}, ...]
//! }
//! ```
//!
//! Vertex ids are dense on output. `originalVertices`, `edges` and `z` are
//! optional on input.

use crate::geometry::TopologyError;
use crate::paper::{EdgeType, PaperError, PaperModel};
use log::{debug, warn};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JsonPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl From<Point3<f64>> for JsonPoint {
    fn from(p: Point3<f64>) -> Self {
        Self { x: p.x, y: p.y, z: p.z }
    }
}

impl From<JsonPoint> for Point3<f64> {
    fn from(p: JsonPoint) -> Self {
        Point3::new(p.x, p.y, p.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub v0: usize,
    pub v1: usize,
    #[serde(rename = "type")]
    pub kind: EdgeType,
}

/// Serialized form of a [`PaperModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperDocument {
    pub vertices: Vec<JsonPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_vertices: Option<Vec<JsonPoint>>,
    pub faces: Vec<Vec<usize>>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl PaperDocument {
    /// Snapshot of a model with vertex ids renumbered densely
    pub fn from_model(model: &PaperModel) -> Result<Self, PaperError> {
        let mesh = model.mesh();
        let mut remap = vec![None; mesh.vertex_capacity()];
        let mut vertices = Vec::with_capacity(mesh.vertex_count());
        let mut originals = Vec::with_capacity(mesh.vertex_count());
        for (v, _) in mesh.vertices() {
            let (Some(p), Some(o)) = (mesh.position(v), mesh.original(v)) else { continue };
            remap[v] = Some(vertices.len());
            vertices.push(p.into());
            originals.push(o.into());
        }
        let index = |v: usize| remap.get(v).copied().flatten().ok_or(TopologyError::MissingVertex(v));

        let faces = mesh
            .face_lists()?
            .into_iter()
            .map(|face| face.into_iter().map(index).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut edges = Vec::with_capacity(model.edges().len());
        for (id, e) in model.edges().iter().enumerate() {
            let (head, tail) = model.edge_endpoints(id)?;
            edges.push(EdgeRecord {
                v0: index(tail)?,
                v1: index(head)?,
                kind: e.kind,
            });
        }

        Ok(Self {
            vertices,
            original_vertices: Some(originals),
            faces,
            edges,
        })
    }

    /// Rebuild a model. Border records on edges the face list glues back
    /// together are slits and get cut open again.
    pub fn to_model(&self) -> Result<PaperModel, PaperError> {
        let positions = self.vertices.iter().map(|&p| p.into()).collect();
        let originals = self
            .original_vertices
            .as_ref()
            .map(|o| o.iter().map(|&p| p.into()).collect());
        let mut model = PaperModel::new(&self.faces, positions, originals)?;

        let mut slits = 0;
        for record in self.edges.iter().filter(|r| r.kind == EdgeType::Border) {
            let edge = model.edge_between(record.v0, record.v1)?;
            if model.edges()[edge].kind != EdgeType::Border {
                model.set_edge_type(edge, EdgeType::Cut)?;
                slits += 1;
            }
        }
        if slits > 0 {
            debug!("reopening {} slits", slits);
            model.process_cuts()?;
        }

        for record in self.edges.iter().filter(|r| r.kind != EdgeType::Border) {
            let edge = model.edge_between(record.v0, record.v1)?;
            if model.edges()[edge].kind == EdgeType::Border {
                if record.kind != EdgeType::Flat {
                    warn!(
                        "ignoring {} on border edge {}-{}",
                        record.kind, record.v0, record.v1
                    );
                }
                continue;
            }
            model.set_edge_type(edge, record.kind)?;
        }

        // Pending Cut edges stay unprocessed until the next fold
        if model.edges().iter().all(|e| e.kind != EdgeType::Cut) {
            model.compute_components()?;
        }
        Ok(model)
    }
}

pub fn to_json(model: &PaperModel) -> Result<String, PaperError> {
    let document = PaperDocument::from_model(model)?;
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn from_json(source: &str) -> Result<PaperModel, PaperError> {
    let document: PaperDocument = serde_json::from_str(source)?;
    document.to_model()
}
