// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Paper model: a half-edge mesh decorated with edge types, split into
//! rigid panels joined by hinges, and driven towards its folded shape by
//! hinge rotation and constraint relaxation.
//!
//! Derived data is cached per [`Stage`]. Editing edge types or topology
//! drops the model back to [`Stage::Edited`]; `compute_components` moves it
//! to [`Stage::Analyzed`] and `compute_constraints` to
//! [`Stage::Constrained`]. Folding and relaxation recompute what they need.

use super::components::{self, Components, Hinge, HingeKey};
use super::constraints::{sort_by_discrepancy, Constraint, ConstraintSet, Discrepancy, DihedralConstraint, LinearConstraint};
use super::{EdgeType, EdgeView, FaceView, PaperEdge, PaperError};
use crate::geometry::{cut_edge, snip_vertex, FaceId, HalfEdgeMesh, Sheet, TopologyError, Vertex};
use crate::utils::{dihedral_angle, rotate_around_axis};
use ahash::AHashMap;
use log::{debug, info, warn};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// How far derived data is up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Edge types or topology changed; panels and hinges are stale
    Edited,
    /// Panels and hinges match the current edges
    Analyzed,
    /// Constraints match the current topology
    Constrained,
}

/// Passes performed by one call to [`PaperModel::relax_one_step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaxParams {
    /// Rounds per step; the fold factor ramps from 1/repeat to 1
    pub repeat: usize,
    /// Passes over Ridge/Valley dihedral constraints per round
    pub dihedral: usize,
    /// Passes over Flat dihedral constraints per round
    pub flat: usize,
    /// Passes over linear constraints per round
    pub linear: usize,
}

impl Default for RelaxParams {
    fn default() -> Self {
        Self {
            repeat: 5,
            dihedral: 1,
            flat: 1,
            linear: 5,
        }
    }
}

/// Outcome of [`PaperModel::fold_hinges`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldReport {
    pub folded: Vec<HingeKey>,
    pub skipped: Vec<HingeKey>,
}

/// A sheet of paper that can be creased, cut and folded
#[derive(Debug, Clone)]
pub struct PaperModel {
    pub(crate) mesh: HalfEdgeMesh,
    /// Assigned edge types, keyed by both half-edges of a pair. Absent means Flat.
    pub(crate) edge_types: AHashMap<usize, EdgeType>,
    pub(crate) edges: Vec<PaperEdge>,
    /// Edge id of every live half-edge
    edge_index: AHashMap<usize, usize>,
    pub(crate) components: Components,
    pub(crate) hinges: BTreeMap<HingeKey, Hinge>,
    pub(crate) constraints: ConstraintSet,
    vertex_buffer: Vec<[f32; 3]>,
    pub(crate) stage: Stage,
}

impl PaperModel {
    /// Build from a face list and current positions. Without `originals`
    /// the current positions are taken as the flat shape.
    pub fn new(
        faces: &[Vec<usize>],
        positions: Vec<Point3<f64>>,
        originals: Option<Vec<Point3<f64>>>,
    ) -> Result<Self, PaperError> {
        let vertices = match originals {
            Some(originals) => {
                if originals.len() != positions.len() {
                    return Err(PaperError::OriginalCountMismatch {
                        vertices: positions.len(),
                        originals: originals.len(),
                    });
                }
                positions
                    .into_iter()
                    .zip(originals)
                    .map(|(p, o)| Vertex::new(p, o))
                    .collect()
            }
            None => positions.into_iter().map(Vertex::flat).collect(),
        };
        Self::from_mesh(HalfEdgeMesh::from_faces(faces, vertices)?)
    }

    pub fn from_mesh(mesh: HalfEdgeMesh) -> Result<Self, PaperError> {
        let mut model = Self {
            mesh,
            edge_types: AHashMap::new(),
            edges: Vec::new(),
            edge_index: AHashMap::new(),
            components: Components::default(),
            hinges: BTreeMap::new(),
            constraints: ConstraintSet::default(),
            vertex_buffer: Vec::new(),
            stage: Stage::Edited,
        };
        model.compute_edges()?;
        model.compute_components()?;
        model.refresh_vertex_buffer();
        Ok(model)
    }

    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    pub fn edges(&self) -> &[PaperEdge] {
        &self.edges
    }

    pub fn hinges(&self) -> &BTreeMap<HingeKey, Hinge> {
        &self.hinges
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn component_count(&self) -> usize {
        self.components.count()
    }

    /// Panel of interior face `f`. `None` while the panels are stale.
    pub fn face_group(&self, f: usize) -> Option<usize> {
        if self.stage < Stage::Analyzed {
            return None;
        }
        self.components.group_of(FaceId::Interior(f))
    }

    pub fn position(&self, v: usize) -> Option<Point3<f64>> {
        self.mesh.position(v)
    }

    pub fn original(&self, v: usize) -> Option<Point3<f64>> {
        self.mesh.original(v)
    }

    /// Current positions as `f32` triples, indexed by vertex id. Holes left
    /// by removed vertices read as the origin.
    pub fn vertex_buffer(&self) -> &[[f32; 3]] {
        &self.vertex_buffer
    }

    pub(crate) fn refresh_vertex_buffer(&mut self) {
        self.vertex_buffer.clear();
        self.vertex_buffer.resize(self.mesh.vertex_capacity(), [0.0; 3]);
        for (v, _) in self.mesh.vertices() {
            if let Some(p) = self.mesh.position(v) {
                self.vertex_buffer[v] = [p.x as f32, p.y as f32, p.z as f32];
            }
        }
    }

    /// Drop cached data past `stage`
    pub(crate) fn invalidate(&mut self, stage: Stage) {
        if self.stage > stage {
            self.stage = stage;
        }
    }

    /// Rebuild the edge records from the mesh and the type side table
    pub(crate) fn compute_edges(&mut self) -> Result<(), PaperError> {
        let mesh = &self.mesh;
        self.edge_types.retain(|&h, _| mesh.half_edge(h).is_ok());

        let mut edges = Vec::with_capacity(self.mesh.edge_count());
        let mut index = AHashMap::with_capacity(2 * self.mesh.edge_count());
        for h in self.mesh.edges() {
            let he = self.mesh.half_edge(h)?;
            let twin = self.mesh.half_edge(he.twin)?;
            let kind = if he.face.is_border() || twin.face.is_border() {
                EdgeType::Border
            } else {
                match self.edge_types.get(&h).or_else(|| self.edge_types.get(&he.twin)) {
                    Some(EdgeType::Border) | None => EdgeType::Flat,
                    Some(&kind) => kind,
                }
            };
            let length = self.rest_distance(he.vertex, twin.vertex)?;
            index.insert(h, edges.len());
            index.insert(he.twin, edges.len());
            edges.push(PaperEdge {
                half_edge: h,
                kind,
                length,
            });
        }
        self.edges = edges;
        self.edge_index = index;
        Ok(())
    }

    /// Distance between two vertices in the flat shape
    pub(crate) fn rest_distance(&self, a: usize, b: usize) -> Result<f64, PaperError> {
        let pa = self.mesh.original(a).ok_or(TopologyError::MissingVertex(a))?;
        let pb = self.mesh.original(b).ok_or(TopologyError::MissingVertex(b))?;
        Ok((pb - pa).norm())
    }

    /// Both vertices of edge `edge`, as (head, tail) of its half-edge
    pub fn edge_endpoints(&self, edge: usize) -> Result<(usize, usize), PaperError> {
        let e = self.edges.get(edge).ok_or(PaperError::UnknownEdge(edge))?;
        let he = self.mesh.half_edge(e.half_edge)?;
        Ok((he.vertex, self.mesh.half_edge(he.twin)?.vertex))
    }

    /// Id of the edge joining `v0` and `v1`
    pub fn edge_between(&self, v0: usize, v1: usize) -> Result<usize, PaperError> {
        let h = match self.mesh.find_half_edge(v0, v1)? {
            Some(h) => h,
            None => self
                .mesh
                .find_half_edge(v1, v0)?
                .ok_or(PaperError::NoSuchEdge { v0, v1 })?,
        };
        self.edge_index
            .get(&h)
            .copied()
            .ok_or(PaperError::NoSuchEdge { v0, v1 })
    }

    /// Assign a type to an edge. Border edges and the Border type are
    /// derived from the topology and cannot be assigned.
    pub fn set_edge_type(&mut self, edge: usize, kind: EdgeType) -> Result<(), PaperError> {
        let e = *self.edges.get(edge).ok_or(PaperError::UnknownEdge(edge))?;
        if e.kind == EdgeType::Border {
            return Err(PaperError::BorderEdge(edge));
        }
        if kind == EdgeType::Border {
            return Err(PaperError::BorderAssignment);
        }
        if e.kind == kind {
            return Ok(());
        }

        let twin = self.mesh.half_edge(e.half_edge)?.twin;
        if kind == EdgeType::Flat {
            self.edge_types.remove(&e.half_edge);
            self.edge_types.remove(&twin);
        } else {
            self.edge_types.insert(e.half_edge, kind);
            self.edge_types.insert(twin, kind);
        }
        self.edges[edge].kind = kind;
        self.invalidate(Stage::Edited);
        Ok(())
    }

    /// Assign a type to the edge joining `v0` and `v1`
    pub fn set_edge_type_between(&mut self, v0: usize, v1: usize, kind: EdgeType) -> Result<(), PaperError> {
        let edge = self.edge_between(v0, v1)?;
        self.set_edge_type(edge, kind)
    }

    /// Open every Cut edge, then separate vertices where two border loops
    /// meet. Returns the number of edges cut.
    pub fn process_cuts(&mut self) -> Result<usize, PaperError> {
        let cuts: Vec<usize> = self
            .edges
            .iter()
            .filter(|e| e.kind == EdgeType::Cut)
            .map(|e| e.half_edge)
            .collect();
        if cuts.is_empty() {
            return Ok(0);
        }

        // Edits go to a copy that replaces the mesh only once every cut
        // and snip has succeeded
        let mut mesh = self.mesh.clone();
        let mut opened = Vec::with_capacity(cuts.len());
        let mut to_snip: VecDeque<usize> = VecDeque::new();
        for &h in &cuts {
            let he = *mesh.half_edge(h)?;
            let tail = mesh.half_edge(he.twin)?.vertex;
            cut_edge(&mut mesh, h)?;
            opened.push((h, he.twin));
            for v in [he.vertex, tail] {
                if !to_snip.contains(&v) {
                    to_snip.push_back(v);
                }
            }
        }

        let limit = mesh.half_edge_capacity();
        let mut snips = 0;
        while let Some(v) = to_snip.pop_front() {
            while let Some(new_vertex) = snip_vertex(&mut mesh, v)? {
                snips += 1;
                if snips > limit {
                    return Err(PaperError::SnipLimit { vertex: v, limit });
                }
                if !to_snip.contains(&new_vertex) {
                    to_snip.push_back(new_vertex);
                }
            }
        }

        self.mesh = mesh;
        // A processed cut is an ordinary boundary
        for (h, twin) in opened {
            self.edge_types.remove(&h);
            self.edge_types.remove(&twin);
        }
        info!("{} cuts and {} snips", cuts.len(), snips);
        self.compute_edges()?;
        self.invalidate(Stage::Edited);
        self.refresh_vertex_buffer();
        Ok(cuts.len())
    }

    /// Flood-fill the rigid panels, then find hinges and the vertices
    /// carried by each side
    pub fn compute_components(&mut self) -> Result<(), PaperError> {
        self.components = components::compute_components(&self.mesh, &self.edges)?;
        info!("{} components", self.components.count());
        self.find_hinges()?;
        self.find_hinge_component_groups()?;
        self.stage = Stage::Analyzed;
        Ok(())
    }

    /// Group Ridge/Valley edges by the pair of panels they separate
    pub fn find_hinges(&mut self) -> Result<(), PaperError> {
        self.hinges = components::find_hinges(&self.mesh, &self.edges, &self.components)?;
        Ok(())
    }

    pub fn find_hinge_component_groups(&mut self) -> Result<(), PaperError> {
        components::find_hinge_component_groups(&self.mesh, &self.edges, &self.components, &mut self.hinges)?;
        Ok(())
    }

    /// Process cuts and recompute panels if edits made them stale
    pub(crate) fn ensure_analyzed(&mut self) -> Result<(), PaperError> {
        if self.stage == Stage::Edited {
            self.process_cuts()?;
            self.compute_components()?;
        }
        Ok(())
    }

    /// Rebuild all constraints from the current topology: a linear
    /// constraint per edge, a dihedral constraint per interior edge, and for
    /// flat edges a linear brace between the two opposite vertices.
    pub fn compute_constraints(&mut self) -> Result<(), PaperError> {
        self.process_cuts()?;
        self.compute_components()?;

        let mut set = ConstraintSet::default();
        for e in &self.edges {
            let he = self.mesh.half_edge(e.half_edge)?;
            let twin = self.mesh.half_edge(he.twin)?;
            let (v0, v1) = (he.vertex, twin.vertex);
            set.linear.push(LinearConstraint::new(v0, v1, e.length));

            if he.face.is_interior() && twin.face.is_interior() {
                let v2 = self.mesh.half_edge(he.next)?.vertex;
                let v3 = self.mesh.half_edge(twin.next)?.vertex;
                let dihedral = DihedralConstraint::new(v0, v1, v2, v3, e.kind.target_angle());
                if e.kind == EdgeType::Flat {
                    set.flat.push(dihedral);
                    set.linear.push(LinearConstraint::new(v2, v3, self.rest_distance(v2, v3)?));
                } else {
                    set.dihedral.push(dihedral);
                }
            }
        }

        let discrepancy = set.discrepancy(&self.mesh)?;
        info!(
            "linear discrepancy {:.6}, angular discrepancy {:.6}",
            discrepancy.linear, discrepancy.angular
        );
        self.constraints = set;
        self.stage = Stage::Constrained;
        Ok(())
    }

    /// Summed discrepancy of the current constraints
    pub fn discrepancy(&self) -> Result<Discrepancy, PaperError> {
        Ok(self.constraints.discrepancy(&self.mesh)?)
    }

    /// One bounded relaxation step. Each round sorts every bucket by
    /// decreasing discrepancy and relaxes it: fold constraints with a
    /// factor ramping up to 1 over the rounds, flat and linear constraints
    /// at half strength.
    pub fn relax_one_step(&mut self, params: RelaxParams) -> Result<(), PaperError> {
        if self.stage != Stage::Constrained {
            self.compute_constraints()?;
        }

        for k in 0..params.repeat {
            let factor = (k + 1) as f64 / params.repeat as f64;
            sort_by_discrepancy(&mut self.constraints.dihedral, &self.mesh)?;
            for _ in 0..params.dihedral {
                for c in &self.constraints.dihedral {
                    c.relax(&mut self.mesh, factor)?;
                }
            }
            sort_by_discrepancy(&mut self.constraints.flat, &self.mesh)?;
            for _ in 0..params.flat {
                for c in &self.constraints.flat {
                    c.relax(&mut self.mesh, 0.5)?;
                }
            }
            sort_by_discrepancy(&mut self.constraints.linear, &self.mesh)?;
            for _ in 0..params.linear {
                for c in &self.constraints.linear {
                    c.relax(&mut self.mesh, 0.5)?;
                }
            }
        }
        self.refresh_vertex_buffer();
        Ok(())
    }

    /// Current dihedral angle at an interior edge
    pub fn dihedral_at(&self, edge: usize) -> Result<f64, PaperError> {
        let e = self.edges.get(edge).ok_or(PaperError::UnknownEdge(edge))?;
        let he = self.mesh.half_edge(e.half_edge)?;
        let twin = self.mesh.half_edge(he.twin)?;
        if he.face.is_border() || twin.face.is_border() {
            return Err(PaperError::NotInterior(edge));
        }
        let ids = [
            he.vertex,
            twin.vertex,
            self.mesh.half_edge(he.next)?.vertex,
            self.mesh.half_edge(twin.next)?.vertex,
        ];
        let mut p = [Point3::origin(); 4];
        for (slot, &v) in p.iter_mut().zip(&ids) {
            *slot = self.mesh.position(v).ok_or(TopologyError::MissingVertex(v))?;
        }
        Ok(dihedral_angle(&p[0], &p[1], &p[2], &p[3]))
    }

    /// Rotate both sides of every foldable hinge towards its goal angle by
    /// `fraction` of the remaining difference. Sides turn by equal and
    /// opposite angles so the hinge axis stays put. Hinges that are not
    /// foldable are left alone and reported.
    pub fn fold_hinges(&mut self, fraction: f64) -> Result<FoldReport, PaperError> {
        self.ensure_analyzed()?;

        let mut report = FoldReport::default();
        for (key, hinge) in &self.hinges {
            if !hinge.is_foldable() {
                warn!(
                    "skipping {:?} hinge between components {} and {}",
                    hinge.status, key.low, key.high
                );
                report.skipped.push(*key);
                continue;
            }
            let Some(&first) = hinge.edges.first() else { continue };
            let e = self.edges.get(first).ok_or(PaperError::UnknownEdge(first))?;
            let he = self.mesh.half_edge(e.half_edge)?;
            let twin = self.mesh.half_edge(he.twin)?;
            let position = |v: usize| self.mesh.position(v).ok_or(TopologyError::MissingVertex(v));
            let p0 = position(he.vertex)?;
            let p1 = position(twin.vertex)?;
            let p2 = position(self.mesh.half_edge(he.next)?.vertex)?;
            let p3 = position(self.mesh.half_edge(twin.next)?.vertex)?;

            let current = dihedral_angle(&p0, &p1, &p2, &p3);
            let goal = hinge.kind.target_angle();
            let rotation = (goal - current) / 2.0 * fraction;
            debug!(
                "folding {} hinge {}-{} at {:.2}° by {:.2}°",
                hinge.kind,
                key.low,
                key.high,
                current.to_degrees(),
                rotation.to_degrees()
            );
            rotate_vertices(&mut self.mesh, &hinge.vgroup1, &p0, &p1, -rotation)?;
            rotate_vertices(&mut self.mesh, &hinge.vgroup2, &p0, &p1, rotation)?;
            report.folded.push(*key);
        }
        self.refresh_vertex_buffer();
        Ok(report)
    }

    /// Per-edge type, endpoints and rest length
    pub fn edge_views(&self) -> Result<Vec<EdgeView>, PaperError> {
        self.edges
            .iter()
            .map(|e| {
                let he = self.mesh.half_edge(e.half_edge)?;
                let tail = self.mesh.half_edge(he.twin)?.vertex;
                let head = self.mesh.position(he.vertex).ok_or(TopologyError::MissingVertex(he.vertex))?;
                let start = self.mesh.position(tail).ok_or(TopologyError::MissingVertex(tail))?;
                Ok(EdgeView {
                    kind: e.kind,
                    endpoints: [head, start],
                    rest_length: e.length,
                })
            })
            .collect()
    }

    /// Per-face positions and panel id. Stale panels are flood-filled
    /// again without touching the cached analysis.
    pub fn face_views(&self) -> Result<Vec<FaceView>, PaperError> {
        let fresh;
        let panels = if self.stage >= Stage::Analyzed {
            &self.components
        } else {
            fresh = components::compute_components(&self.mesh, &self.edges)?;
            &fresh
        };
        let mut views = Vec::with_capacity(self.mesh.face_count());
        for (f, h) in self.mesh.faces() {
            let positions = self
                .mesh
                .face_vertices(h)?
                .into_iter()
                .map(|v| self.mesh.position(v).ok_or(TopologyError::MissingVertex(v)))
                .collect::<Result<Vec<_>, _>>()?;
            views.push(FaceView {
                positions,
                component: panels
                    .group_of(FaceId::Interior(f))
                    .ok_or(PaperError::UnassignedFace(f))?,
            });
        }
        Ok(views)
    }
}

fn rotate_vertices(
    mesh: &mut HalfEdgeMesh,
    group: &[usize],
    a: &Point3<f64>,
    b: &Point3<f64>,
    angle: f64,
) -> Result<(), TopologyError> {
    for &v in group {
        let p = mesh.position(v).ok_or(TopologyError::MissingVertex(v))?;
        mesh.set_position(v, rotate_around_axis(a, b, &p, angle))?;
    }
    Ok(())
}

impl Sheet {
    /// Flat paper model of this sheet
    pub fn to_model(&self) -> Result<PaperModel, PaperError> {
        PaperModel::from_mesh(self.to_mesh()?)
    }
}
