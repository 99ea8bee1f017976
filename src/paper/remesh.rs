// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Remeshing and reshaping of the flat pattern: subdivision, Delaunay
//! flips, Laplacian smoothing and per-panel planar projection

use super::components::edge_kinds;
use super::model::{PaperModel, Stage};
use super::{EdgeType, PaperEdge, PaperError};
use crate::geometry::predicates::should_flip;
use crate::geometry::{flip_edge, subdivide_edge, TopologyError};
use crate::utils::centroid;
use ahash::AHashSet;
use log::info;
use nalgebra::{DMatrix, Point3, Vector3};

/// Vertices closer than this to their smoothed position stay put
const SMOOTH_EPS: f64 = 1e-5;

/// Passes run by [`PaperModel::laplacian_smooth`]
pub const DEFAULT_SMOOTH_PASSES: usize = 5;

impl PaperModel {
    /// Insert a midpoint vertex in every Flat edge accepted by `predicate`.
    /// An edge is skipped when one of its endpoints or opposite vertices
    /// was already touched in this pass. Returns the number of edges split.
    pub fn subdivide_edges<F>(&mut self, mut predicate: F) -> Result<usize, PaperError>
    where
        F: FnMut(&PaperEdge) -> bool,
    {
        let candidates: Vec<usize> = self
            .edges
            .iter()
            .filter(|e| e.kind == EdgeType::Flat && predicate(e))
            .map(|e| e.half_edge)
            .collect();

        let mut touched = AHashSet::new();
        let mut count = 0;
        for h in candidates {
            let he = *self.mesh.half_edge(h)?;
            let twin = *self.mesh.half_edge(he.twin)?;
            let quad = [
                he.vertex,
                twin.vertex,
                self.mesh.half_edge(he.next)?.vertex,
                self.mesh.half_edge(twin.next)?.vertex,
            ];
            if quad.iter().any(|v| touched.contains(v)) {
                continue;
            }
            touched.extend(quad);
            subdivide_edge(&mut self.mesh, h)?;
            count += 1;
        }

        info!("{} subdivided edges", count);
        self.topology_changed()?;
        Ok(count)
    }

    /// Subdivide Flat edges whose rest length is at least `ratio` times the
    /// longest Flat edge
    pub fn subdivide_long_edges(&mut self, ratio: f64) -> Result<usize, PaperError> {
        let longest = self
            .edges
            .iter()
            .filter(|e| e.kind == EdgeType::Flat)
            .map(|e| e.length)
            .fold(0.0, f64::max);
        if longest == 0.0 {
            return Ok(0);
        }
        let threshold = longest * ratio;
        self.subdivide_edges(|e| e.length >= threshold)
    }

    /// Flip every Flat edge that is not Delaunay in the flat pattern and
    /// whose quad is convex. Returns the number of flips.
    pub fn flip_edges(&mut self) -> Result<usize, PaperError> {
        let candidates: Vec<usize> = self
            .edges
            .iter()
            .filter(|e| e.kind == EdgeType::Flat)
            .map(|e| e.half_edge)
            .collect();

        let mut count = 0;
        for h in candidates {
            let he = *self.mesh.half_edge(h)?;
            let twin = *self.mesh.half_edge(he.twin)?;
            let ids = [
                he.vertex,
                twin.vertex,
                self.mesh.half_edge(he.next)?.vertex,
                self.mesh.half_edge(twin.next)?.vertex,
            ];
            let mut p = [Point3::origin(); 4];
            for (slot, &v) in p.iter_mut().zip(&ids) {
                *slot = self.mesh.original(v).ok_or(TopologyError::MissingVertex(v))?;
            }
            if should_flip(&p[0], &p[1], &p[2], &p[3]) {
                flip_edge(&mut self.mesh, h)?;
                count += 1;
            }
        }

        info!("{} flips", count);
        self.topology_changed()?;
        Ok(count)
    }

    /// [`Self::laplacian_smooth_passes`] with the default pass count
    pub fn laplacian_smooth(&mut self) -> Result<usize, PaperError> {
        self.laplacian_smooth_passes(DEFAULT_SMOOTH_PASSES)
    }

    /// Move every vertex whose incident edges are all Flat to the average
    /// of its neighbors, `passes` times, then adopt the result as the new
    /// flat shape. Returns the total number of moves.
    pub fn laplacian_smooth_passes(&mut self, passes: usize) -> Result<usize, PaperError> {
        let kinds = edge_kinds(&self.mesh, &self.edges)?;
        let vertices: Vec<(usize, usize)> = self.mesh.vertices().collect();

        let mut total = 0;
        for _ in 0..passes {
            let mut moved = 0;
            for &(v, h) in &vertices {
                let ring = self.mesh.vertex_ring(h)?;
                if ring.iter().any(|x| kinds.get(x) != Some(&EdgeType::Flat)) {
                    continue;
                }
                let mut sum = Vector3::zeros();
                for &x in &ring {
                    let neighbor = self.mesh.half_edge(self.mesh.half_edge(x)?.twin)?.vertex;
                    sum += self
                        .mesh
                        .position(neighbor)
                        .ok_or(TopologyError::MissingVertex(neighbor))?
                        .coords;
                }
                let target = Point3::from(sum / ring.len() as f64);
                let current = self.mesh.position(v).ok_or(TopologyError::MissingVertex(v))?;
                if (target - current).norm() > SMOOTH_EPS {
                    self.mesh.set_position(v, target)?;
                    moved += 1;
                }
            }
            info!("{} vertices moved", moved);
            total += moved;
        }

        for &(v, _) in &vertices {
            if let Some(p) = self.mesh.position(v) {
                self.mesh.set_original(v, p)?;
            }
        }
        self.compute_edges()?;
        self.invalidate(Stage::Edited);
        self.refresh_vertex_buffer();
        Ok(total)
    }

    /// Project each panel onto its best-fit plane. Vertices shared by
    /// several panels end up at the average of their projections.
    pub fn component_svd(&mut self) -> Result<(), PaperError> {
        self.ensure_analyzed()?;

        let capacity = self.mesh.vertex_capacity();
        let mut sums = vec![Vector3::zeros(); capacity];
        let mut counts = vec![0usize; capacity];
        for group in 0..self.components.count() {
            let mut ids = Vec::new();
            let mut seen = AHashSet::new();
            for f in self.components.faces_of(group) {
                let Some(h) = self.mesh.face_half_edge(f) else { continue };
                for v in self.mesh.face_vertices(h)? {
                    if seen.insert(v) {
                        ids.push(v);
                    }
                }
            }
            let points = ids
                .iter()
                .map(|&v| self.mesh.position(v).ok_or(TopologyError::MissingVertex(v)))
                .collect::<Result<Vec<_>, _>>()?;

            let projected = project_to_plane(&points);
            for (&v, p) in ids.iter().zip(projected) {
                sums[v] += p.coords;
                counts[v] += 1;
            }
        }

        for v in 0..capacity {
            if counts[v] > 0 {
                self.mesh.set_position(v, Point3::from(sums[v] / counts[v] as f64))?;
            }
        }
        self.refresh_vertex_buffer();
        Ok(())
    }

    /// Rebuild edge records after a topology edit
    fn topology_changed(&mut self) -> Result<(), PaperError> {
        self.compute_edges()?;
        self.invalidate(Stage::Edited);
        self.refresh_vertex_buffer();
        Ok(())
    }
}

/// Orthogonal projection of a point cloud onto its least-squares plane.
/// Fewer than three points are returned unchanged.
pub fn project_to_plane(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    let (Some(normal), Some(center)) = (fit_plane_normal(points), centroid(points)) else {
        return points.to_vec();
    };
    let center = center.coords;
    points
        .iter()
        .map(|p| {
            let offset = p.coords - center;
            Point3::from(center + offset - normal * offset.dot(&normal))
        })
        .collect()
}

/// Normal of the best-fit plane: the right singular vector of the centred
/// points with the smallest singular value
fn fit_plane_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if points.len() < 3 {
        return None;
    }
    let center = centroid(points)?.coords;
    let centred = DMatrix::from_fn(points.len(), 3, |r, c| points[r][c] - center[c]);
    let svd = centred.svd(false, true);
    let v_t = svd.v_t?;
    let (smallest, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))?;
    let normal = Vector3::new(v_t[(smallest, 0)], v_t[(smallest, 1)], v_t[(smallest, 2)]);
    normal.try_normalize(1e-12)
}
