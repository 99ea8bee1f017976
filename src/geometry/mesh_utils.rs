// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Compound topology edits built from the half-edge primitives

use super::{FaceId, HalfEdgeMesh, TopologyError};
use log::trace;

/// Open the edge under `h` into a boundary. The face of `h` is split
/// between the ends of `h`, and the resulting two-sided face becomes a
/// border loop. Returns the new half-edge of that border loop.
pub fn cut_edge(mesh: &mut HalfEdgeMesh, h: usize) -> Result<usize, TopologyError> {
    let prev = mesh.half_edge(h)?.prev;
    let result = mesh.split_face(prev, h)?;
    mesh.toggle_border(result, Some(true))?;
    Ok(result)
}

/// Insert a vertex at the midpoint of the edge under `h` and re-triangulate
/// the interior faces on both sides. Returns a half-edge pointing to the
/// new vertex.
pub fn subdivide_edge(mesh: &mut HalfEdgeMesh, h: usize) -> Result<usize, TopologyError> {
    let he = *mesh.half_edge(h)?;
    let twin = *mesh.half_edge(he.twin)?;
    for side in [h, he.twin] {
        require_triangle(mesh, side, h)?;
    }

    let a = *mesh.vertex(he.vertex).ok_or(TopologyError::MissingVertex(he.vertex))?;
    let b = *mesh.vertex(twin.vertex).ok_or(TopologyError::MissingVertex(twin.vertex))?;
    let new_he = mesh.split_vertex(h, twin.prev, a.midpoint(&b))?;

    if he.face.is_interior() {
        let opposite = mesh.half_edge(new_he)?.twin;
        let g = mesh.half_edge(opposite)?.prev;
        mesh.split_face(g, he.next)?;
    }
    if twin.face.is_interior() {
        let g = mesh.half_edge(twin.prev)?.prev;
        mesh.split_face(new_he, g)?;
    }
    trace!("subdivided edge {} into vertex {}", h, mesh.half_edge(new_he)?.vertex);
    Ok(new_he)
}

/// Replace the edge a-b shared by triangles a-b-c and a-b-d with c-d.
/// Returns a half-edge of the new edge.
pub fn flip_edge(mesh: &mut HalfEdgeMesh, h: usize) -> Result<usize, TopologyError> {
    let he = *mesh.half_edge(h)?;
    let twin = *mesh.half_edge(he.twin)?;
    if he.face.is_border() || twin.face.is_border() {
        return Err(TopologyError::NotTriangulated(h));
    }
    require_triangle(mesh, h, h)?;
    require_triangle(mesh, he.twin, h)?;

    mesh.join_face(h)?;
    mesh.split_face(he.next, twin.next)
}

/// Separate the sheet at vertex `v` if two border loops meet there.
///
/// The vertex is duplicated. When the two border half-edges belong to
/// different loops, the loops are merged into one; when they belong to the
/// same loop, the loop is split in two. Returns the new vertex, or `None`
/// if `v` touches fewer than two border half-edges.
pub fn snip_vertex(mesh: &mut HalfEdgeMesh, v: usize) -> Result<Option<usize>, TopologyError> {
    let start = mesh
        .vertex_half_edge(v)
        .ok_or(TopologyError::MissingVertex(v))?;
    let mut borders = Vec::with_capacity(2);
    for h in mesh.vertex_ring(start)? {
        if mesh.half_edge(h)?.face.is_border() {
            borders.push(h);
            if borders.len() == 2 {
                break;
            }
        }
    }
    let [b0, b1] = borders[..] else {
        return Ok(None);
    };

    let vertex = *mesh.vertex(v).ok_or(TopologyError::MissingVertex(v))?;
    let f0 = mesh.half_edge(b0)?.face;
    let f1 = mesh.half_edge(b1)?.face;

    let new_vertex = if f0 != f1 {
        // join_face only merges interior faces
        mesh.toggle_border(b0, Some(false))?;
        mesh.toggle_border(b1, Some(false))?;
        let new_he = mesh.split_vertex(b0, b1, vertex)?;
        let new_vertex = mesh.half_edge(new_he)?.vertex;
        let joined = mesh.join_face(new_he)?;
        mesh.toggle_border(joined, Some(true))?;
        new_vertex
    } else {
        let new_he = mesh.split_vertex(b0, b1, vertex)?;
        let new_vertex = mesh.half_edge(new_he)?.vertex;
        let detached: FaceId = mesh.remove_bridge(new_he)?;
        trace!("border loop {:?} split off at vertex {}", detached, v);
        new_vertex
    };
    Ok(Some(new_vertex))
}

/// Number of half-edges of an interior face; border sides pass unchecked
fn require_triangle(mesh: &HalfEdgeMesh, side: usize, edge: usize) -> Result<(), TopologyError> {
    if mesh.half_edge(side)?.face.is_border() {
        return Ok(());
    }
    if mesh.face_cycle(side)?.len() != 3 {
        return Err(TopologyError::NotTriangulated(edge));
    }
    Ok(())
}
