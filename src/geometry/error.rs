// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Errors raised by the half-edge mesh

use super::halfedge::FaceId;
use thiserror::Error;

/// Topology errors that can occur while building or editing a half-edge mesh
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Face {0} has fewer than three vertices")]
    DegenerateFace(usize),

    #[error("Face {face} references vertex {vertex}, which does not exist")]
    InvalidVertexIndex { face: usize, vertex: usize },

    #[error("Edge {from}->{to} defined twice (non-manifold edge)")]
    DuplicateEdge { from: usize, to: usize },

    #[error("Half-edge {0} does not exist")]
    MissingHalfEdge(usize),

    #[error("Vertex {0} does not exist")]
    MissingVertex(usize),

    #[error("Operation needs two distinct half-edges, got {0} twice")]
    SameHalfEdge(usize),

    #[error("Half-edges {h} and {g} are not on the same face")]
    NotSameFace { h: usize, g: usize },

    #[error("Half-edges {h} and {g} do not point to the same vertex")]
    NotSameVertex { h: usize, g: usize },

    #[error("Cannot split border face {0:?}")]
    BorderFaceSplit(FaceId),

    #[error("Cannot join faces across half-edge {0}: one side is a border face")]
    BorderFaceJoin(usize),

    #[error("Half-edge {0} has the same face on both sides")]
    SameFaceJoin(usize),

    #[error("Edge at half-edge {0} is not shared by two triangles")]
    NotTriangulated(usize),

    #[error("Corrupt structure: circulation from half-edge {start} exceeded {limit} steps")]
    CirculationLimit { start: usize, limit: usize },

    #[error("A grid sheet needs at least 2x2 vertices, got {columns}x{rows}")]
    InvalidSheet { columns: usize, rows: usize },

    #[error("Inconsistent half-edge {half_edge}: {detail}")]
    Inconsistent { half_edge: usize, detail: String },
}
