// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Rigid panels and the hinges between them

use super::{EdgeType, PaperEdge};
use crate::geometry::{FaceId, HalfEdgeMesh, TopologyError};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// Assignment of interior faces to rigid panels
#[derive(Debug, Clone, Default)]
pub struct Components {
    face_group: Vec<Option<usize>>,
    count: usize,
}

impl Components {
    /// Panel of a face; border faces belong to none
    pub fn group_of(&self, face: FaceId) -> Option<usize> {
        match face {
            FaceId::Interior(f) => self.face_group.get(f).copied().flatten(),
            FaceId::Border(_) => None,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Interior faces of panel `group`
    pub fn faces_of(&self, group: usize) -> impl Iterator<Item = usize> + '_ {
        self.face_group
            .iter()
            .enumerate()
            .filter_map(move |(f, g)| (*g == Some(group)).then_some(f))
    }
}

/// Unordered pair of panels joined by a hinge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HingeKey {
    pub low: usize,
    pub high: usize,
}

impl HingeKey {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HingeStatus {
    /// Sides are separate and can rotate about the hinge
    Foldable,
    /// The two sides are rigidly connected some other way
    Cyclic,
    /// Ridge and Valley edges separate the same pair of panels
    Conflicting,
}

/// Fold edges separating the same pair of panels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hinge {
    pub kind: EdgeType,
    /// Edge ids, first one is the representative
    pub edges: Vec<usize>,
    pub status: HingeStatus,
    /// Panels that move with each side
    pub cgroup1: Vec<usize>,
    pub cgroup2: Vec<usize>,
    /// Vertices that move with each side. `vgroup1` is the side left of the
    /// representative half-edge.
    pub vgroup1: Vec<usize>,
    pub vgroup2: Vec<usize>,
}

impl Hinge {
    fn new(kind: EdgeType, edge: usize) -> Self {
        Self {
            kind,
            edges: vec![edge],
            status: HingeStatus::Foldable,
            cgroup1: Vec::new(),
            cgroup2: Vec::new(),
            vgroup1: Vec::new(),
            vgroup2: Vec::new(),
        }
    }

    pub fn is_foldable(&self) -> bool {
        self.status == HingeStatus::Foldable
    }
}

/// Effective edge type of every live half-edge
pub fn edge_kinds(mesh: &HalfEdgeMesh, edges: &[PaperEdge]) -> Result<AHashMap<usize, EdgeType>, TopologyError> {
    let mut kinds = AHashMap::with_capacity(edges.len() * 2);
    for e in edges {
        let twin = mesh.half_edge(e.half_edge)?.twin;
        kinds.insert(e.half_edge, e.kind);
        kinds.insert(twin, e.kind);
    }
    Ok(kinds)
}

/// Flood-fill interior faces across Flat edges
pub fn compute_components(mesh: &HalfEdgeMesh, edges: &[PaperEdge]) -> Result<Components, TopologyError> {
    let kinds = edge_kinds(mesh, edges)?;
    let mut face_group = vec![None; mesh.face_capacity()];
    let mut count = 0;

    for (f, _) in mesh.faces() {
        if face_group[f].is_some() {
            continue;
        }
        let mut stack = vec![f];
        while let Some(j) = stack.pop() {
            if face_group[j].is_some() {
                continue;
            }
            face_group[j] = Some(count);
            let Some(start) = mesh.face_half_edge(j) else { continue };
            for h in mesh.face_cycle(start)? {
                if kinds.get(&h) != Some(&EdgeType::Flat) {
                    continue;
                }
                let twin = mesh.half_edge(h)?.twin;
                if let FaceId::Interior(neighbor) = mesh.half_edge(twin)?.face {
                    if face_group[neighbor].is_none() {
                        stack.push(neighbor);
                    }
                }
            }
        }
        count += 1;
    }

    Ok(Components { face_group, count })
}

/// Group Ridge and Valley edges by the pair of panels they separate
pub fn find_hinges(
    mesh: &HalfEdgeMesh,
    edges: &[PaperEdge],
    components: &Components,
) -> Result<BTreeMap<HingeKey, Hinge>, TopologyError> {
    let mut hinges: BTreeMap<HingeKey, Hinge> = BTreeMap::new();
    for (id, e) in edges.iter().enumerate() {
        if !e.kind.is_fold() {
            continue;
        }
        let he = mesh.half_edge(e.half_edge)?;
        let twin = mesh.half_edge(he.twin)?;
        let (Some(c1), Some(c2)) = (components.group_of(he.face), components.group_of(twin.face)) else {
            continue;
        };

        let key = HingeKey::new(c1, c2);
        let hinge = hinges
            .entry(key)
            .and_modify(|hinge| hinge.edges.push(id))
            .or_insert_with(|| Hinge::new(e.kind, id));
        if hinge.kind != e.kind {
            hinge.status = HingeStatus::Conflicting;
        } else if c1 == c2 && hinge.status == HingeStatus::Foldable {
            hinge.status = HingeStatus::Cyclic;
        }
    }
    Ok(hinges)
}

/// For every hinge, collect the panels and vertices carried along by each
/// side: everything reachable through other hinges without crossing this
/// one. Hinge vertices themselves stay on the axis and belong to neither
/// side.
pub fn find_hinge_component_groups(
    mesh: &HalfEdgeMesh,
    edges: &[PaperEdge],
    components: &Components,
    hinges: &mut BTreeMap<HingeKey, Hinge>,
) -> Result<(), TopologyError> {
    let mut incident: AHashMap<usize, Vec<HingeKey>> = AHashMap::new();
    for key in hinges.keys().filter(|key| key.low != key.high) {
        incident.entry(key.low).or_default().push(*key);
        incident.entry(key.high).or_default().push(*key);
    }

    let mut panel_vertices: Vec<Vec<usize>> = vec![Vec::new(); components.count()];
    for (f, h) in mesh.faces() {
        if let Some(g) = components.group_of(FaceId::Interior(f)) {
            panel_vertices[g].extend(mesh.face_vertices(h)?);
        }
    }

    for (key, hinge) in hinges.iter_mut() {
        let mut axis = AHashSet::new();
        for e in hinge.edges.iter().filter_map(|&id| edges.get(id)) {
            let he = mesh.half_edge(e.half_edge)?;
            axis.insert(he.vertex);
            axis.insert(mesh.half_edge(he.twin)?.vertex);
        }

        let mut cgroup1 = reachable_panels(key.low, *key, &incident);
        let mut cgroup2 = reachable_panels(key.high, *key, &incident);
        let mut vgroup1 = panel_group_vertices(&cgroup1, &panel_vertices, &axis);
        let mut vgroup2 = panel_group_vertices(&cgroup2, &panel_vertices, &axis);

        // Keep vgroup1 on the side of the representative half-edge's face
        if let Some(first) = hinge.edges.first().and_then(|&id| edges.get(id)) {
            let face = mesh.half_edge(first.half_edge)?.face;
            if components.group_of(face) != Some(key.low) {
                std::mem::swap(&mut cgroup1, &mut cgroup2);
                std::mem::swap(&mut vgroup1, &mut vgroup2);
            }
        }

        let sides_meet = key.low == key.high
            || cgroup1.iter().any(|c| cgroup2.contains(c))
            || vgroup1.iter().any(|v| vgroup2.binary_search(v).is_ok());
        if sides_meet && hinge.status == HingeStatus::Foldable {
            hinge.status = HingeStatus::Cyclic;
        }

        hinge.cgroup1 = cgroup1;
        hinge.cgroup2 = cgroup2;
        hinge.vgroup1 = vgroup1;
        hinge.vgroup2 = vgroup2;
    }
    Ok(())
}

/// Panels reachable from `start` through hinges other than `avoid`
fn reachable_panels(start: usize, avoid: HingeKey, incident: &AHashMap<usize, Vec<HingeKey>>) -> Vec<usize> {
    let mut visited = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some(panel) = queue.pop_front() {
        for key in incident.get(&panel).into_iter().flatten() {
            if *key == avoid {
                continue;
            }
            let other = if key.low == panel { key.high } else { key.low };
            if !visited.contains(&other) {
                visited.push(other);
                queue.push_back(other);
            }
        }
    }
    visited
}

/// Sorted vertices of a set of panels, minus the hinge axis
fn panel_group_vertices(panels: &[usize], panel_vertices: &[Vec<usize>], axis: &AHashSet<usize>) -> Vec<usize> {
    let mut vertices: Vec<usize> = panels
        .iter()
        .filter_map(|&p| panel_vertices.get(p))
        .flatten()
        .copied()
        .filter(|v| !axis.contains(v))
        .collect();
    vertices.sort_unstable();
    vertices.dedup();
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hinge_key_is_unordered() {
        assert_eq!(HingeKey::new(3, 1), HingeKey::new(1, 3));
        assert_eq!(HingeKey::new(3, 1).low, 1);
    }

    #[test]
    fn test_reachable_panels_skips_avoided_hinge() {
        // Panels 0-1-2 in a chain, plus 2-0 closing a cycle
        let keys = [HingeKey::new(0, 1), HingeKey::new(1, 2), HingeKey::new(0, 2)];
        let mut incident: AHashMap<usize, Vec<HingeKey>> = AHashMap::new();
        for key in keys {
            incident.entry(key.low).or_default().push(key);
            incident.entry(key.high).or_default().push(key);
        }
        let mut from_zero = reachable_panels(0, keys[0], &incident);
        from_zero.sort();
        assert_eq!(from_zero, vec![0, 1, 2]);

        incident.get_mut(&0).unwrap().retain(|k| *k != keys[2]);
        incident.get_mut(&2).unwrap().retain(|k| *k != keys[2]);
        assert_eq!(reachable_panels(0, keys[0], &incident), vec![0]);
        assert_eq!(reachable_panels(1, keys[0], &incident), vec![1, 2]);
    }
}
