// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Model statistics

use super::model::{PaperModel, Stage};
use super::{Discrepancy, EdgeType, PaperError};
use serde::{Deserialize, Serialize};

/// Summary of a paper model's topology and fold state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperStats {
    pub vertex_count: usize,
    pub face_count: usize,
    pub edge_count: usize,
    /// Border loops, one per hole or outline
    pub border_loops: usize,
    pub ridge_edges: usize,
    pub valley_edges: usize,
    /// Cut edges not yet opened
    pub cut_edges: usize,
    pub components: usize,
    pub hinges: usize,
    pub foldable_hinges: usize,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Largest relative deviation of an edge from its rest length
    pub max_strain: f64,
    /// Summed discrepancy of up-to-date constraints, zero otherwise
    pub linear_discrepancy: f64,
    pub angular_discrepancy: f64,
    pub analyzed: bool,
}

impl PaperStats {
    pub fn print(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║              PAPER MODEL                                 ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║ Vertices:        {:>10}                              ║", self.vertex_count);
        println!("║ Faces:           {:>10}                              ║", self.face_count);
        println!("║ Edges:           {:>10}                              ║", self.edge_count);
        println!("║ Border loops:    {:>10}                              ║", self.border_loops);
        println!("║                                                          ║");
        println!("║ Ridge edges:     {:>10}                              ║", self.ridge_edges);
        println!("║ Valley edges:    {:>10}                              ║", self.valley_edges);
        println!("║ Cut edges:       {:>10}                              ║", self.cut_edges);
        println!("║ Components:      {:>10}                              ║", self.components);
        println!(
            "║ Hinges:          {:>10} ({} foldable)                 ║",
            self.hinges, self.foldable_hinges
        );
        println!("║                                                          ║");
        println!(
            "║   Min: ({:>7.2}, {:>7.2}, {:>7.2})                      ║",
            self.bbox[0], self.bbox[1], self.bbox[2]
        );
        println!(
            "║   Max: ({:>7.2}, {:>7.2}, {:>7.2})                      ║",
            self.bbox[3], self.bbox[4], self.bbox[5]
        );
        println!("║ Max strain:      {:>10.3e}                              ║", self.max_strain);
        println!(
            "║ Discrepancy:     {:>10.3e} linear {:>10.3e} angular  ║",
            self.linear_discrepancy, self.angular_discrepancy
        );
        println!(
            "║ Analyzed:        {:>10}                              ║",
            if self.analyzed { "Yes" } else { "No" }
        );
        println!("╚══════════════════════════════════════════════════════════╝");
    }
}

impl PaperModel {
    pub fn stats(&self) -> Result<PaperStats, PaperError> {
        let count = |kind: EdgeType| self.edges.iter().filter(|e| e.kind == kind).count();

        let mut bbox = [f64::MAX, f64::MAX, f64::MAX, f64::MIN, f64::MIN, f64::MIN];
        for (v, _) in self.mesh.vertices() {
            let Some(p) = self.mesh.position(v) else { continue };
            for axis in 0..3 {
                bbox[axis] = bbox[axis].min(p[axis]);
                bbox[axis + 3] = bbox[axis + 3].max(p[axis]);
            }
        }
        if self.mesh.vertex_count() == 0 {
            bbox = [0.0; 6];
        }

        let mut max_strain: f64 = 0.0;
        for view in self.edge_views()? {
            if view.rest_length > 0.0 {
                let length = (view.endpoints[1] - view.endpoints[0]).norm();
                max_strain = max_strain.max((length - view.rest_length).abs() / view.rest_length);
            }
        }

        let discrepancy = if self.stage == Stage::Constrained {
            self.discrepancy()?
        } else {
            Discrepancy::default()
        };
        let analyzed = self.stage >= Stage::Analyzed;
        Ok(PaperStats {
            vertex_count: self.mesh.vertex_count(),
            face_count: self.mesh.face_count(),
            edge_count: self.edges.len(),
            border_loops: self.mesh.border_count(),
            ridge_edges: count(EdgeType::Ridge),
            valley_edges: count(EdgeType::Valley),
            cut_edges: count(EdgeType::Cut),
            components: if analyzed { self.components.count() } else { 0 },
            hinges: if analyzed { self.hinges.len() } else { 0 },
            foldable_hinges: if analyzed {
                self.hinges.values().filter(|h| h.is_foldable()).count()
            } else {
                0
            },
            bbox,
            max_strain,
            linear_discrepancy: discrepancy.linear,
            angular_discrepancy: discrepancy.angular,
            analyzed,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::Sheet;
    use crate::paper::EdgeType;
    use approx::assert_relative_eq;

    #[test]
    fn test_stats_of_flat_grid() {
        let stats = Sheet::grid(3, 4, 2.0).to_model().unwrap().stats().unwrap();
        assert_eq!(stats.vertex_count, 12);
        assert_eq!(stats.face_count, 12);
        assert_eq!(stats.border_loops, 1);
        assert_eq!(stats.components, 1);
        assert!(stats.analyzed);
        assert_relative_eq!(stats.bbox[0], -2.0);
        assert_relative_eq!(stats.bbox[4], 3.0);
        assert_relative_eq!(stats.max_strain, 0.0);
    }

    #[test]
    fn test_stats_after_edit() {
        let mut model = Sheet::grid(3, 3, 1.0).to_model().unwrap();
        model.set_edge_type_between(1, 4, EdgeType::Cut).unwrap();
        let stats = model.stats().unwrap();
        assert_eq!(stats.cut_edges, 1);
        assert!(!stats.analyzed);
        assert_eq!(stats.components, 0);
    }
}
