// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use crate::geometry::TopologyError;
use thiserror::Error;

/// Errors raised while relaxing constraints
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Constraint references vertex {0}, which does not exist")]
    MissingVertex(usize),
}

/// Errors raised by the paper model
#[derive(Debug, Error)]
pub enum PaperError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error("Model has {vertices} vertices but {originals} original positions")]
    OriginalCountMismatch { vertices: usize, originals: usize },

    #[error("Edge {0} does not exist")]
    UnknownEdge(usize),

    #[error("No edge between vertices {v0} and {v1}")]
    NoSuchEdge { v0: usize, v1: usize },

    #[error("Edge {0} lies on the border and cannot be retyped")]
    BorderEdge(usize),

    #[error("Border is derived from the topology and cannot be assigned")]
    BorderAssignment,

    #[error("Edge {0} has a border on one side")]
    NotInterior(usize),

    #[error("Unknown edge type '{0}'")]
    UnknownEdgeType(String),

    #[error("Invalid model document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Face {0} belongs to no panel")]
    UnassignedFace(usize),

    #[error("Snipping did not settle after {limit} splits (last vertex {vertex})")]
    SnipLimit { vertex: usize, limit: usize },
}
