// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - half-edge mesh, topology edits and predicates

mod error;
mod halfedge;
pub mod mesh_utils;
pub mod predicates;
mod primitives;

pub use error::TopologyError;
pub use halfedge::{FaceId, HalfEdge, HalfEdgeMesh, Vertex};
pub use mesh_utils::{cut_edge, flip_edge, snip_vertex, subdivide_edge};
pub use primitives::Sheet;
