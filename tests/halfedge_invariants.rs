// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Half-edge mesh invariants under sequences of topology edits

use anyhow::Result;
use nalgebra::Point3;
use paperfold::geometry::{cut_edge, flip_edge, snip_vertex, subdivide_edge, HalfEdgeMesh, Sheet, TopologyError, Vertex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// V - E + F over interior faces; one per disk-like piece
fn euler(mesh: &HalfEdgeMesh) -> i64 {
    mesh.vertex_count() as i64 - mesh.edge_count() as i64 + mesh.face_count() as i64
}

fn interior_edges(mesh: &HalfEdgeMesh) -> Vec<usize> {
    mesh.edges()
        .filter(|&h| {
            let he = mesh.half_edge(h).unwrap();
            he.face.is_interior() && mesh.half_edge(he.twin).unwrap().face.is_interior()
        })
        .collect()
}

/// Flipping keeps the mesh simple: no degree-2 vertices, no doubled edges
fn can_flip(mesh: &HalfEdgeMesh, h: usize) -> bool {
    let Ok(he) = mesh.half_edge(h) else { return false };
    let twin = mesh.half_edge(he.twin).unwrap();
    let c = mesh.half_edge(he.next).unwrap().vertex;
    let d = mesh.half_edge(twin.next).unwrap().vertex;
    let degree = |x: usize| mesh.vertex_ring(x).unwrap().len();
    c != d && degree(h) > 3 && degree(he.twin) > 3 && mesh.find_half_edge(c, d).unwrap().is_none()
}

#[test]
fn test_quad_split_and_join() -> Result<()> {
    let vertices = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
        .into_iter()
        .map(|(x, y)| Vertex::flat(Point3::new(x, y, 0.0)))
        .collect();
    let mut mesh = HalfEdgeMesh::from_faces(&[vec![0, 1, 2, 3]], vertices)?;
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(euler(&mesh), 1);

    let to_zero = mesh.find_half_edge(3, 0)?.unwrap();
    let to_two = mesh.find_half_edge(1, 2)?.unwrap();
    let diagonal = mesh.split_face(to_zero, to_two)?;
    mesh.check()?;
    assert_eq!(mesh.face_count(), 2);
    assert_eq!(mesh.half_edge(diagonal)?.vertex, 0);
    assert_eq!(euler(&mesh), 1);

    mesh.join_face(diagonal)?;
    mesh.check()?;
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(mesh.face_lists()?[0].len(), 4);
    Ok(())
}

#[test]
fn test_non_manifold_input_is_rejected() {
    let vertices = (0..4)
        .map(|i| Vertex::flat(Point3::new(i as f64, (i % 2) as f64, 0.0)))
        .collect();
    // Both faces traverse 0 -> 1 in the same direction
    let result = HalfEdgeMesh::from_faces(&[vec![0, 1, 2], vec![0, 1, 3]], vertices);
    assert!(matches!(result, Err(TopologyError::DuplicateEdge { from: 0, to: 1 })));
}

#[test]
fn test_random_flips_keep_invariants() -> Result<()> {
    let mut mesh = Sheet::grid(6, 6, 1.0).to_mesh()?;
    let mut rng = StdRng::seed_from_u64(42);
    let faces = mesh.face_count();
    let edges = mesh.edge_count();

    for _ in 0..10 {
        let candidates = interior_edges(&mesh);
        for _ in 0..5 {
            let h = candidates[rng.gen_range(0..candidates.len())];
            // An edge picked twice in a batch is gone after its first flip
            if can_flip(&mesh, h) {
                flip_edge(&mut mesh, h)?;
            }
        }
        mesh.check()?;
        assert_eq!(mesh.face_count(), faces);
        assert_eq!(mesh.edge_count(), edges);
    }
    Ok(())
}

#[test]
fn test_random_subdivisions_keep_invariants() -> Result<()> {
    let mut mesh = Sheet::grid(5, 5, 1.0).to_mesh()?;
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..20 {
        let edges: Vec<usize> = mesh.edges().collect();
        let h = edges[rng.gen_range(0..edges.len())];
        let vertices = mesh.vertex_count();
        subdivide_edge(&mut mesh, h)?;
        mesh.check()?;
        assert_eq!(mesh.vertex_count(), vertices + 1);
        assert_eq!(euler(&mesh), 1);
    }
    assert!(mesh.faces().all(|(_, h)| mesh.face_vertices(h).unwrap().len() == 3));
    Ok(())
}

#[test]
fn test_cut_across_sheet_makes_two_pieces() -> Result<()> {
    let mut mesh = Sheet::grid(4, 4, 1.0).to_mesh()?;
    for (a, b) in [(4, 5), (5, 6), (6, 7)] {
        let h = mesh.find_half_edge(a, b)?.unwrap();
        cut_edge(&mut mesh, h)?;
    }
    mesh.check()?;
    // The slit is still pinned at its vertices
    assert_eq!(mesh.vertex_count(), 16);

    let mut snips = 0;
    for v in [4, 5, 6, 7] {
        while snip_vertex(&mut mesh, v)?.is_some() {
            snips += 1;
            mesh.check()?;
        }
    }
    assert_eq!(snips, 4);
    assert_eq!(mesh.vertex_count(), 20);
    assert_eq!(mesh.border_count(), 2);
    assert_eq!(euler(&mesh), 2);
    Ok(())
}

#[test]
fn test_compact_after_edits() -> Result<()> {
    let mut mesh = Sheet::grid(4, 4, 1.0).to_mesh()?;
    let h = mesh.find_half_edge(5, 10)?.unwrap();
    flip_edge(&mut mesh, h)?;
    let (compact, remap) = mesh.compact()?;
    compact.check()?;
    assert_eq!(compact.face_count(), mesh.face_count());
    assert_eq!(compact.edge_count(), mesh.edge_count());
    assert_eq!(compact.half_edge_capacity(), 2 * compact.edge_count());
    assert_eq!(remap.iter().flatten().count(), 16);
    Ok(())
}
