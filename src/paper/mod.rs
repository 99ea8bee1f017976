// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Paper module - edge types, panels, constraints and the folding model

mod analytics;
pub mod components;
pub mod constraints;
mod edge;
mod error;
mod model;
mod remesh;

pub use analytics::PaperStats;
pub use components::{Components, Hinge, HingeKey, HingeStatus};
pub use constraints::{Constraint, ConstraintSet, DihedralConstraint, Discrepancy, LinearConstraint, PointSet};
pub use edge::{EdgeType, EdgeView, FaceView, PaperEdge};
pub use error::{ConstraintError, PaperError};
pub use model::{FoldReport, PaperModel, RelaxParams, Stage};
pub use remesh::{project_to_plane, DEFAULT_SMOOTH_PASSES};
