// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Flat sheet generators

use super::{HalfEdgeMesh, TopologyError, Vertex};
use nalgebra::Point3;

/// A flat sheet of paper to start folding from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sheet {
    /// `columns × rows` vertex lattice in the z=0 plane, centred at the origin
    Grid {
        columns: usize,
        rows: usize,
        cell_size: f64,
    },
}

impl Sheet {
    pub fn grid(columns: usize, rows: usize, cell_size: f64) -> Self {
        Self::Grid {
            columns,
            rows,
            cell_size,
        }
    }

    /// Face list and flat vertices of the sheet
    pub fn faces_and_vertices(&self) -> Result<(Vec<Vec<usize>>, Vec<Vertex>), TopologyError> {
        match *self {
            Self::Grid {
                columns,
                rows,
                cell_size,
            } => generate_grid(columns, rows, cell_size),
        }
    }

    pub fn to_mesh(&self) -> Result<HalfEdgeMesh, TopologyError> {
        let (faces, vertices) = self.faces_and_vertices()?;
        HalfEdgeMesh::from_faces(&faces, vertices)
    }
}

fn generate_grid(
    columns: usize,
    rows: usize,
    cell_size: f64,
) -> Result<(Vec<Vec<usize>>, Vec<Vertex>), TopologyError> {
    if columns < 2 || rows < 2 {
        return Err(TopologyError::InvalidSheet { columns, rows });
    }

    let x0 = (columns - 1) as f64 * cell_size / 2.0;
    let y0 = (rows - 1) as f64 * cell_size / 2.0;
    let mut vertices = Vec::with_capacity(columns * rows);
    for j in 0..rows {
        for i in 0..columns {
            let p = Point3::new(i as f64 * cell_size - x0, j as f64 * cell_size - y0, 0.0);
            vertices.push(Vertex::flat(p));
        }
    }

    // Each cell is split along its (i-1, j-1)-(i, j) diagonal
    let index = |i: usize, j: usize| j * columns + i;
    let mut faces = Vec::with_capacity(2 * (columns - 1) * (rows - 1));
    for j in 1..rows {
        for i in 1..columns {
            let a = index(i - 1, j - 1);
            let b = index(i, j - 1);
            let c = index(i, j);
            let d = index(i - 1, j);
            faces.push(vec![a, b, c]);
            faces.push(vec![a, c, d]);
        }
    }
    Ok((faces, vertices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_counts() {
        let mesh = Sheet::grid(5, 6, 1.0).to_mesh().unwrap();
        mesh.check().unwrap();
        assert_eq!(mesh.vertex_count(), 30);
        assert_eq!(mesh.face_count(), 2 * 4 * 5);
        assert_eq!(mesh.border_count(), 1);
        // Horizontal, vertical and diagonal edges
        assert_eq!(mesh.edge_count(), 4 * 6 + 5 * 5 + 4 * 5);
    }

    #[test]
    fn test_grid_is_centred() {
        let (_, vertices) = Sheet::grid(3, 3, 2.0).faces_and_vertices().unwrap();
        assert_eq!(vertices[0].position, Point3::new(-2.0, -2.0, 0.0));
        assert_eq!(vertices[4].position, Point3::origin());
        assert_eq!(vertices[8].original, Point3::new(2.0, 2.0, 0.0));
    }

    #[test]
    fn test_grid_too_small() {
        assert_eq!(
            Sheet::grid(1, 4, 1.0).to_mesh().unwrap_err(),
            TopologyError::InvalidSheet { columns: 1, rows: 4 }
        );
    }
}
