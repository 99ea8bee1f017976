// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Half-edge mesh representation for editable paper surfaces
//!
//! Half-edges live in an index arena. Removed entries become `None`
//! tombstones and are never reused, so indices cached by callers stay valid
//! for the duration of a batch of edits. Every face is a cycle of
//! half-edges; open boundaries are closed by border pseudo-faces so that
//! vertex circulation never breaks.

use super::TopologyError;
use ahash::AHashMap;
use nalgebra::Point3;

/// Identifier of the face a half-edge belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaceId {
    /// Ordinary face
    Interior(usize),
    /// Border loop closing an open boundary
    Border(usize),
}

impl FaceId {
    pub fn is_border(self) -> bool {
        matches!(self, FaceId::Border(_))
    }

    pub fn is_interior(self) -> bool {
        matches!(self, FaceId::Interior(_))
    }

    /// Index into the interior or border face table
    pub fn index(self) -> usize {
        match self {
            FaceId::Interior(i) | FaceId::Border(i) => i,
        }
    }
}

/// Vertex with its current (folded) and original (flat) positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub original: Point3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, original: Point3<f64>) -> Self {
        Self { position, original }
    }

    /// A vertex that has not been moved away from its flat position
    pub fn flat(position: Point3<f64>) -> Self {
        Self::new(position, position)
    }

    /// Midpoint of two vertices, taken separately in both coordinate sets
    pub fn midpoint(&self, other: &Vertex) -> Self {
        Self {
            position: nalgebra::center(&self.position, &other.position),
            original: nalgebra::center(&self.original, &other.original),
        }
    }
}

/// Directed half of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Vertex this half-edge points to
    pub vertex: usize,
    /// Opposite half-edge, pointing the other way
    pub twin: usize,
    /// Next half-edge around the face
    pub next: usize,
    /// Previous half-edge around the face
    pub prev: usize,
    /// Face this half-edge belongs to
    pub face: FaceId,
}

/// Half-edge mesh with full topological connectivity
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    half_edges: Vec<Option<HalfEdge>>,
    vertices: Vec<Option<Vertex>>,
    /// One incoming half-edge per vertex
    vertex_half_edge: Vec<Option<usize>>,
    /// One half-edge per interior face
    face_half_edge: Vec<Option<usize>>,
    /// One half-edge per border loop
    border_half_edge: Vec<Option<usize>>,
}

impl HalfEdgeMesh {
    /// Build a mesh from faces given as cyclic lists of vertex indices.
    ///
    /// Edges used by a single face are closed with border loops, one
    /// border face per boundary component.
    pub fn from_faces(faces: &[Vec<usize>], vertices: Vec<Vertex>) -> Result<Self, TopologyError> {
        let mut half_edges: Vec<HalfEdge> = Vec::new();
        let mut twins: Vec<Option<usize>> = Vec::new();
        let mut vertex_half_edge = vec![None; vertices.len()];
        let mut face_half_edge = Vec::with_capacity(faces.len());
        let mut edge_map: AHashMap<(usize, usize), usize> = AHashMap::new();

        for (iface, face) in faces.iter().enumerate() {
            let n = face.len();
            if n < 3 || (0..n).any(|i| face[i] == face[(i + 1) % n]) {
                return Err(TopologyError::DegenerateFace(iface));
            }
            if let Some(&vertex) = face.iter().find(|&&v| v >= vertices.len()) {
                return Err(TopologyError::InvalidVertexIndex { face: iface, vertex });
            }

            let mut vprev = face[n - 1];
            for (iv, &v) in face.iter().enumerate() {
                let ihe = half_edges.len();
                if edge_map.contains_key(&(vprev, v)) {
                    return Err(TopologyError::DuplicateEdge { from: vprev, to: v });
                }
                let twin = edge_map.get(&(v, vprev)).copied();
                if let Some(opposite) = twin {
                    twins[opposite] = Some(ihe);
                }
                edge_map.insert((vprev, v), ihe);

                let prev = if iv == 0 { ihe + n - 1 } else { ihe - 1 };
                let next = if iv == n - 1 { ihe + 1 - n } else { ihe + 1 };
                half_edges.push(HalfEdge {
                    vertex: v,
                    twin: ihe,
                    next,
                    prev,
                    face: FaceId::Interior(iface),
                });
                twins.push(twin);
                vertex_half_edge[v] = Some(ihe);
                vprev = v;
            }
            face_half_edge.push(Some(half_edges.len() - 1));
        }

        let border_half_edge = stitch_borders(&mut half_edges, &mut twins)?;
        for (i, (he, twin)) in half_edges.iter_mut().zip(&twins).enumerate() {
            he.twin = twin.ok_or_else(|| TopologyError::Inconsistent {
                half_edge: i,
                detail: "left without a twin after border stitching".to_string(),
            })?;
        }

        Ok(Self {
            half_edges: half_edges.into_iter().map(Some).collect(),
            vertices: vertices.into_iter().map(Some).collect(),
            vertex_half_edge,
            face_half_edge,
            border_half_edge,
        })
    }

    /// Half-edge record at index `h`
    pub fn half_edge(&self, h: usize) -> Result<&HalfEdge, TopologyError> {
        self.half_edges
            .get(h)
            .and_then(Option::as_ref)
            .ok_or(TopologyError::MissingHalfEdge(h))
    }

    fn he(&self, h: usize) -> Result<HalfEdge, TopologyError> {
        self.half_edge(h).copied()
    }

    fn he_mut(&mut self, h: usize) -> Result<&mut HalfEdge, TopologyError> {
        self.half_edges
            .get_mut(h)
            .and_then(Option::as_mut)
            .ok_or(TopologyError::MissingHalfEdge(h))
    }

    pub fn vertex(&self, v: usize) -> Option<&Vertex> {
        self.vertices.get(v).and_then(Option::as_ref)
    }

    /// Current position of vertex `v`
    pub fn position(&self, v: usize) -> Option<Point3<f64>> {
        self.vertex(v).map(|vertex| vertex.position)
    }

    /// Flat (reference) position of vertex `v`
    pub fn original(&self, v: usize) -> Option<Point3<f64>> {
        self.vertex(v).map(|vertex| vertex.original)
    }

    pub fn set_position(&mut self, v: usize, position: Point3<f64>) -> Result<(), TopologyError> {
        let vertex = self
            .vertices
            .get_mut(v)
            .and_then(Option::as_mut)
            .ok_or(TopologyError::MissingVertex(v))?;
        vertex.position = position;
        Ok(())
    }

    pub fn set_original(&mut self, v: usize, original: Point3<f64>) -> Result<(), TopologyError> {
        let vertex = self
            .vertices
            .get_mut(v)
            .and_then(Option::as_mut)
            .ok_or(TopologyError::MissingVertex(v))?;
        vertex.original = original;
        Ok(())
    }

    /// An incoming half-edge of vertex `v`
    pub fn vertex_half_edge(&self, v: usize) -> Option<usize> {
        self.vertex_half_edge.get(v).copied().flatten()
    }

    /// The representative half-edge of interior face `f`
    pub fn face_half_edge(&self, f: usize) -> Option<usize> {
        self.face_half_edge.get(f).copied().flatten()
    }

    /// The representative half-edge of border loop `b`
    pub fn border_half_edge(&self, b: usize) -> Option<usize> {
        self.border_half_edge.get(b).copied().flatten()
    }

    /// Live vertices as `(vertex, incoming half-edge)` pairs
    pub fn vertices(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.vertex_half_edge
            .iter()
            .enumerate()
            .filter_map(|(v, h)| h.map(|h| (v, h)))
    }

    /// Interior faces as `(face index, half-edge)` pairs
    pub fn faces(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.face_half_edge
            .iter()
            .enumerate()
            .filter_map(|(f, h)| h.map(|h| (f, h)))
    }

    /// Border loops as `(border index, half-edge)` pairs
    pub fn border_faces(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.border_half_edge
            .iter()
            .enumerate()
            .filter_map(|(b, h)| h.map(|h| (b, h)))
    }

    /// One half-edge per edge: the one whose twin has the greater index
    pub fn edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.half_edges
            .iter()
            .enumerate()
            .filter_map(|(i, he)| match he {
                Some(he) if he.twin > i => Some(i),
                _ => None,
            })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().count()
    }

    pub fn face_count(&self) -> usize {
        self.faces().count()
    }

    pub fn border_count(&self) -> usize {
        self.border_faces().count()
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Size of the half-edge arena, tombstones included
    pub fn half_edge_capacity(&self) -> usize {
        self.half_edges.len()
    }

    /// Size of the vertex table, holes included
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }

    /// Size of the interior face table, holes included
    pub fn face_capacity(&self) -> usize {
        self.face_half_edge.len()
    }

    /// Half-edges of the face that `start` belongs to, beginning at `start`
    pub fn face_cycle(&self, start: usize) -> Result<Vec<usize>, TopologyError> {
        let limit = self.half_edges.len();
        let face = self.he(start)?.face;
        let mut cycle = Vec::new();
        let mut h = start;
        loop {
            let he = self.he(h)?;
            if he.face != face {
                return Err(TopologyError::Inconsistent {
                    half_edge: h,
                    detail: format!("belongs to {:?} inside the cycle of {:?}", he.face, face),
                });
            }
            cycle.push(h);
            h = he.next;
            if h == start {
                return Ok(cycle);
            }
            if cycle.len() > limit {
                return Err(TopologyError::CirculationLimit { start, limit });
            }
        }
    }

    /// Vertices of the face that `start` belongs to
    pub fn face_vertices(&self, start: usize) -> Result<Vec<usize>, TopologyError> {
        self.face_cycle(start)?
            .into_iter()
            .map(|h| self.he(h).map(|he| he.vertex))
            .collect()
    }

    /// Incoming half-edges of the vertex that `start` points to.
    ///
    /// Circulates by `next` then `twin`.
    pub fn vertex_ring(&self, start: usize) -> Result<Vec<usize>, TopologyError> {
        let limit = self.half_edges.len();
        let vertex = self.he(start)?.vertex;
        let mut ring = Vec::new();
        let mut h = start;
        loop {
            let he = self.he(h)?;
            if he.vertex != vertex {
                return Err(TopologyError::Inconsistent {
                    half_edge: h,
                    detail: format!("points to {} inside the ring of vertex {}", he.vertex, vertex),
                });
            }
            ring.push(h);
            h = self.he(he.next)?.twin;
            if h == start {
                return Ok(ring);
            }
            if ring.len() > limit {
                return Err(TopologyError::CirculationLimit { start, limit });
            }
        }
    }

    /// Half-edge running from vertex `from` to vertex `to`, if any
    pub fn find_half_edge(&self, from: usize, to: usize) -> Result<Option<usize>, TopologyError> {
        let start = self
            .vertex_half_edge(to)
            .ok_or(TopologyError::MissingVertex(to))?;
        for h in self.vertex_ring(start)? {
            let twin = self.he(h)?.twin;
            if self.he(twin)?.vertex == from {
                return Ok(Some(h));
            }
        }
        Ok(None)
    }

    /// Vertex lists of all interior faces, in face-table order
    pub fn face_lists(&self) -> Result<Vec<Vec<usize>>, TopologyError> {
        self.faces().map(|(_, h)| self.face_vertices(h)).collect()
    }

    /// Split the face shared by `h` and `g` with a new edge between the
    /// vertices they point to. Returns the new half-edge that points to
    /// `h`'s vertex and belongs to the newly created face.
    pub fn split_face(&mut self, h: usize, g: usize) -> Result<usize, TopologyError> {
        if h == g {
            return Err(TopologyError::SameHalfEdge(h));
        }
        let hh = self.he(h)?;
        let gg = self.he(g)?;
        if hh.face != gg.face {
            return Err(TopologyError::NotSameFace { h, g });
        }
        let FaceId::Interior(old_face) = hh.face else {
            return Err(TopologyError::BorderFaceSplit(hh.face));
        };

        // Half-edges after h up to and including g move to the new face
        let limit = self.half_edges.len();
        let mut moved = Vec::new();
        let mut iter = hh.next;
        while iter != g {
            if iter == h || moved.len() > limit {
                return Err(TopologyError::CirculationLimit { start: h, limit });
            }
            moved.push(iter);
            iter = self.he(iter)?.next;
        }
        moved.push(g);

        let new_face = FaceId::Interior(self.face_half_edge.len());
        let i = self.half_edges.len();
        let j = i + 1;
        self.half_edges.push(Some(HalfEdge {
            vertex: gg.vertex,
            twin: j,
            next: gg.next,
            prev: h,
            face: hh.face,
        }));
        self.half_edges.push(Some(HalfEdge {
            vertex: hh.vertex,
            twin: i,
            next: hh.next,
            prev: g,
            face: new_face,
        }));
        for x in moved {
            self.he_mut(x)?.face = new_face;
        }

        let g_next = self.he(g)?.next;
        self.he_mut(g_next)?.prev = i;
        self.he_mut(g)?.next = j;
        let h_next = self.he(h)?.next;
        self.he_mut(h_next)?.prev = j;
        self.he_mut(h)?.next = i;

        self.face_half_edge.push(Some(j));
        self.face_half_edge[old_face] = Some(i);
        self.vertex_half_edge[gg.vertex] = Some(i);
        self.vertex_half_edge[hh.vertex] = Some(j);
        Ok(j)
    }

    /// Remove the edge under `h`, merging its two faces into `h`'s face.
    /// Returns the half-edge that followed `h`.
    pub fn join_face(&mut self, h: usize) -> Result<usize, TopologyError> {
        let hh = self.he(h)?;
        let g = hh.twin;
        let gg = self.he(g)?;
        if hh.face.is_border() || gg.face.is_border() {
            return Err(TopologyError::BorderFaceJoin(h));
        }
        if hh.face == gg.face {
            return Err(TopologyError::SameFaceJoin(h));
        }

        for x in self.face_cycle(g)? {
            self.he_mut(x)?.face = hh.face;
        }
        self.he_mut(gg.prev)?.next = hh.next;
        self.he_mut(hh.prev)?.next = gg.next;
        self.he_mut(gg.next)?.prev = hh.prev;
        self.he_mut(hh.next)?.prev = gg.prev;
        self.half_edges[g] = None;
        self.half_edges[h] = None;

        self.clear_face_entry(gg.face);
        self.retarget_face_entry(hh.face, h, hh.prev);
        self.retarget_vertex_entry(hh.vertex, h, gg.prev);
        self.retarget_vertex_entry(gg.vertex, g, hh.prev);
        Ok(hh.next)
    }

    /// Split the vertex that `h` and `g` point to. Half-edges on the arc
    /// from `h` (inclusive) to `g` (exclusive), walking twin then prev, move
    /// to a new vertex; a new edge joins the old and new vertex. Returns the
    /// new half-edge that points to the new vertex.
    pub fn split_vertex(&mut self, h: usize, g: usize, vertex: Vertex) -> Result<usize, TopologyError> {
        if h == g {
            return Err(TopologyError::SameHalfEdge(h));
        }
        let hh = self.he(h)?;
        let gg = self.he(g)?;
        if hh.vertex != gg.vertex {
            return Err(TopologyError::NotSameVertex { h, g });
        }
        let old = hh.vertex;

        let limit = self.half_edges.len();
        let mut arc = Vec::new();
        let mut x = h;
        while x != g {
            if self.he(x)?.vertex != old {
                return Err(TopologyError::Inconsistent {
                    half_edge: x,
                    detail: format!("left the ring of vertex {} while splitting it", old),
                });
            }
            arc.push(x);
            let twin = self.he(x)?.twin;
            x = self.he(twin)?.prev;
            if arc.len() > limit {
                return Err(TopologyError::CirculationLimit { start: h, limit });
            }
        }

        let new_vertex = self.vertices.len();
        self.vertices.push(Some(vertex));
        self.vertex_half_edge.push(Some(h));
        self.vertex_half_edge[old] = Some(g);
        for x in arc {
            self.he_mut(x)?.vertex = new_vertex;
        }

        let i = self.half_edges.len();
        let j = i + 1;
        self.half_edges.push(Some(HalfEdge {
            vertex: old,
            twin: j,
            next: hh.next,
            prev: h,
            face: hh.face,
        }));
        self.half_edges.push(Some(HalfEdge {
            vertex: new_vertex,
            twin: i,
            next: gg.next,
            prev: g,
            face: gg.face,
        }));
        self.he_mut(hh.next)?.prev = i;
        self.he_mut(gg.next)?.prev = j;
        self.he_mut(h)?.next = i;
        self.he_mut(g)?.next = j;
        Ok(j)
    }

    /// Contract the edge under `h`: the vertex `h` points to is merged into
    /// the vertex its twin points to. Returns a half-edge pointing to the
    /// surviving vertex.
    pub fn join_vertex(&mut self, h: usize) -> Result<usize, TopologyError> {
        let hh = self.he(h)?;
        let g = hh.twin;
        let gg = self.he(g)?;
        let removed = hh.vertex;
        let kept = gg.vertex;
        if removed == kept {
            return Err(TopologyError::Inconsistent {
                half_edge: h,
                detail: format!("edge loops on vertex {}", kept),
            });
        }

        for x in self.vertex_ring(h)? {
            self.he_mut(x)?.vertex = kept;
        }
        self.he_mut(hh.prev)?.next = hh.next;
        self.he_mut(hh.next)?.prev = hh.prev;
        self.he_mut(gg.prev)?.next = gg.next;
        self.he_mut(gg.next)?.prev = gg.prev;

        self.vertex_half_edge[removed] = None;
        self.vertices[removed] = None;
        self.half_edges[h] = None;
        self.half_edges[g] = None;
        self.retarget_vertex_entry(kept, g, hh.prev);
        self.retarget_face_entry(hh.face, h, hh.prev);
        self.retarget_face_entry(gg.face, g, gg.prev);
        Ok(hh.prev)
    }

    /// Turn the face of `h` into a border loop (`Some(true)`), an interior
    /// face (`Some(false)`), or flip its status (`None`).
    pub fn toggle_border(&mut self, h: usize, set_border: Option<bool>) -> Result<(), TopologyError> {
        let face = self.he(h)?.face;
        let make_border = set_border.unwrap_or(!face.is_border());
        if make_border == face.is_border() {
            return Ok(());
        }

        let cycle = self.face_cycle(h)?;
        self.clear_face_entry(face);
        let new_face = match face {
            FaceId::Border(_) => FaceId::Interior(first_free(&mut self.face_half_edge)),
            FaceId::Interior(_) => FaceId::Border(first_free(&mut self.border_half_edge)),
        };
        self.set_face_entry(new_face, h);
        for x in cycle {
            self.he_mut(x)?.face = new_face;
        }
        Ok(())
    }

    /// Remove an edge whose two halves lie on the same face. The face cycle
    /// falls apart in two; the part holding the twin's predecessor gets a
    /// fresh face id of the same kind, which is returned.
    pub(crate) fn remove_bridge(&mut self, h: usize) -> Result<FaceId, TopologyError> {
        let hh = self.he(h)?;
        let g = hh.twin;
        let gg = self.he(g)?;
        if hh.face != gg.face {
            return Err(TopologyError::NotSameFace { h, g });
        }

        self.he_mut(hh.prev)?.next = gg.next;
        self.he_mut(gg.next)?.prev = hh.prev;
        self.he_mut(gg.prev)?.next = hh.next;
        self.he_mut(hh.next)?.prev = gg.prev;
        self.half_edges[h] = None;
        self.half_edges[g] = None;
        self.retarget_vertex_entry(hh.vertex, h, gg.prev);
        self.retarget_vertex_entry(gg.vertex, g, hh.prev);

        self.set_face_entry(hh.face, hh.prev);
        let detached = match hh.face {
            FaceId::Interior(_) => FaceId::Interior(first_free(&mut self.face_half_edge)),
            FaceId::Border(_) => FaceId::Border(first_free(&mut self.border_half_edge)),
        };
        self.set_face_entry(detached, gg.prev);
        for x in self.face_cycle(gg.prev)? {
            self.he_mut(x)?.face = detached;
        }
        Ok(detached)
    }

    /// Scan every half-edge and table entry for structural consistency
    pub fn check(&self) -> Result<(), TopologyError> {
        let inconsistent = |half_edge: usize, detail: String| TopologyError::Inconsistent { half_edge, detail };

        for (i, slot) in self.half_edges.iter().enumerate() {
            let Some(he) = slot else { continue };
            let next = self
                .half_edge(he.next)
                .map_err(|_| inconsistent(i, format!(".next = {} is missing", he.next)))?;
            let prev = self
                .half_edge(he.prev)
                .map_err(|_| inconsistent(i, format!(".prev = {} is missing", he.prev)))?;
            let twin = self
                .half_edge(he.twin)
                .map_err(|_| inconsistent(i, format!(".twin = {} is missing", he.twin)))?;
            if next.prev != i {
                return Err(inconsistent(i, format!("next ({}) .prev = {}", he.next, next.prev)));
            }
            if prev.next != i {
                return Err(inconsistent(i, format!("prev ({}) .next = {}", he.prev, prev.next)));
            }
            if twin.twin != i || he.twin == i {
                return Err(inconsistent(i, format!("twin ({}) .twin = {}", he.twin, twin.twin)));
            }
            if next.face != he.face {
                return Err(inconsistent(i, format!("face {:?} but next is on {:?}", he.face, next.face)));
            }
            if twin.vertex != prev.vertex {
                return Err(inconsistent(
                    i,
                    format!("twin points to {} but the edge starts at {}", twin.vertex, prev.vertex),
                ));
            }
        }

        for (v, h) in self.vertices() {
            let he = self.half_edge(h).map_err(|_| inconsistent(h, format!("listed for vertex {}", v)))?;
            if he.vertex != v || self.vertex(v).is_none() {
                return Err(inconsistent(h, format!("listed for vertex {} but points to {}", v, he.vertex)));
            }
            self.vertex_ring(h)?;
        }
        for (f, h) in self.faces() {
            let he = self.half_edge(h).map_err(|_| inconsistent(h, format!("listed for face {}", f)))?;
            if he.face != FaceId::Interior(f) {
                return Err(inconsistent(h, format!("listed for face {} but is on {:?}", f, he.face)));
            }
        }
        for (b, h) in self.border_faces() {
            let he = self.half_edge(h).map_err(|_| inconsistent(h, format!("listed for border {}", b)))?;
            if he.face != FaceId::Border(b) {
                return Err(inconsistent(h, format!("listed for border {} but is on {:?}", b, he.face)));
            }
        }
        Ok(())
    }

    /// Rebuild without tombstones. Returns the new mesh and, for every old
    /// vertex index, its new index. Slits whose two sides still share
    /// vertices are closed up by the rebuild.
    pub fn compact(&self) -> Result<(Self, Vec<Option<usize>>), TopologyError> {
        let mut remap = vec![None; self.vertices.len()];
        let mut vertices = Vec::new();
        for (v, _) in self.vertices() {
            let vertex = *self.vertex(v).ok_or(TopologyError::MissingVertex(v))?;
            remap[v] = Some(vertices.len());
            vertices.push(vertex);
        }
        let faces = self
            .face_lists()?
            .into_iter()
            .map(|face| {
                face.into_iter()
                    .map(|v| remap[v].ok_or(TopologyError::MissingVertex(v)))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((Self::from_faces(&faces, vertices)?, remap))
    }

    fn face_entry_mut(&mut self, face: FaceId) -> Option<&mut Option<usize>> {
        match face {
            FaceId::Interior(i) => self.face_half_edge.get_mut(i),
            FaceId::Border(i) => self.border_half_edge.get_mut(i),
        }
    }

    fn clear_face_entry(&mut self, face: FaceId) {
        if let Some(entry) = self.face_entry_mut(face) {
            *entry = None;
        }
    }

    fn set_face_entry(&mut self, face: FaceId, h: usize) {
        if let Some(entry) = self.face_entry_mut(face) {
            *entry = Some(h);
        }
    }

    fn retarget_face_entry(&mut self, face: FaceId, from: usize, to: usize) {
        if let Some(entry) = self.face_entry_mut(face) {
            if *entry == Some(from) {
                *entry = Some(to);
            }
        }
    }

    fn retarget_vertex_entry(&mut self, vertex: usize, from: usize, to: usize) {
        if let Some(entry) = self.vertex_half_edge.get_mut(vertex) {
            if *entry == Some(from) {
                *entry = Some(to);
            }
        }
    }
}

/// Index of the first free slot in a table, growing it when full
fn first_free(table: &mut Vec<Option<usize>>) -> usize {
    match table.iter().position(Option::is_none) {
        Some(i) => i,
        None => {
            table.push(None);
            table.len() - 1
        }
    }
}

/// Close every chain of unpaired half-edges with a border loop of twins.
/// Returns the border face table.
fn stitch_borders(
    half_edges: &mut Vec<HalfEdge>,
    twins: &mut Vec<Option<usize>>,
) -> Result<Vec<Option<usize>>, TopologyError> {
    let mut border_half_edge = Vec::new();
    let mut search_from = 0;

    while let Some(start) = (search_from..half_edges.len()).find(|&i| twins[i].is_none()) {
        search_from = start;
        let limit = half_edges.len();

        // Walk the boundary, skipping over paired half-edges around each vertex
        let mut chain = vec![start];
        let mut he = start;
        loop {
            let mut next = half_edges[he].next;
            let mut steps = 0;
            while let Some(twin) = twins[next] {
                next = half_edges[twin].next;
                steps += 1;
                if next == he || steps > limit {
                    return Err(TopologyError::CirculationLimit { start: he, limit });
                }
            }
            if chain.contains(&next) {
                break;
            }
            chain.push(next);
            he = next;
        }

        let n = half_edges.len();
        let k = chain.len();
        let face = FaceId::Border(border_half_edge.len());
        for (i, &he) in chain.iter().enumerate() {
            let tail = half_edges[half_edges[he].prev].vertex;
            twins[he] = Some(n + i);
            half_edges.push(HalfEdge {
                vertex: tail,
                twin: he,
                next: n + (i + k - 1) % k,
                prev: n + (i + 1) % k,
                face,
            });
            twins.push(Some(he));
        }
        border_half_edge.push(Some(n));
    }

    Ok(border_half_edge)
}
