// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge labels and per-edge records

use super::PaperError;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

/// How an edge of the sheet behaves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeType {
    /// Stays flat; faces on both sides belong to one rigid panel
    #[default]
    Flat,
    /// Folds up to +90°
    Ridge,
    /// Folds down to -90°
    Valley,
    /// Opened into a boundary when cuts are processed
    Cut,
    /// Open boundary, derived from the topology
    Border,
}

impl EdgeType {
    /// Dihedral angle the edge is driven towards
    pub fn target_angle(self) -> f64 {
        match self {
            EdgeType::Ridge => FRAC_PI_2,
            EdgeType::Valley => -FRAC_PI_2,
            _ => 0.0,
        }
    }

    /// Ridge or Valley
    pub fn is_fold(self) -> bool {
        matches!(self, EdgeType::Ridge | EdgeType::Valley)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::Flat => "Flat",
            EdgeType::Ridge => "Ridge",
            EdgeType::Valley => "Valley",
            EdgeType::Cut => "Cut",
            EdgeType::Border => "Border",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeType {
    type Err = PaperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(EdgeType::Flat),
            "ridge" | "mountain" => Ok(EdgeType::Ridge),
            "valley" => Ok(EdgeType::Valley),
            "cut" => Ok(EdgeType::Cut),
            "border" => Ok(EdgeType::Border),
            _ => Err(PaperError::UnknownEdgeType(s.to_string())),
        }
    }
}

/// One record per topological edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperEdge {
    /// Representative half-edge of the pair
    pub half_edge: usize,
    pub kind: EdgeType,
    /// Rest length, measured between the original positions
    pub length: f64,
}

/// Render-facing view of an edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeView {
    pub kind: EdgeType,
    pub endpoints: [Point3<f64>; 2],
    pub rest_length: f64,
}

/// Render-facing view of a face
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceView {
    pub positions: Vec<Point3<f64>>,
    pub component: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_angles() {
        assert_eq!(EdgeType::Ridge.target_angle(), FRAC_PI_2);
        assert_eq!(EdgeType::Valley.target_angle(), -FRAC_PI_2);
        assert_eq!(EdgeType::Flat.target_angle(), 0.0);
        assert_eq!(EdgeType::Cut.target_angle(), 0.0);
    }

    #[test]
    fn test_parse_edge_type() {
        assert_eq!("valley".parse::<EdgeType>().unwrap(), EdgeType::Valley);
        assert_eq!("Ridge".parse::<EdgeType>().unwrap(), EdgeType::Ridge);
        assert_eq!("mountain".parse::<EdgeType>().unwrap(), EdgeType::Ridge);
        assert!(matches!(
            "fold".parse::<EdgeType>(),
            Err(PaperError::UnknownEdgeType(s)) if s == "fold"
        ));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&EdgeType::Cut).unwrap(), "\"Cut\"");
        let kind: EdgeType = serde_json::from_str("\"Border\"").unwrap();
        assert_eq!(kind, EdgeType::Border);
    }
}
