// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Length and dihedral-angle constraints
//!
//! Constraints refer to vertices by index and read or write positions
//! through a [`PointSet`], so the same constraint can act on a mesh or on a
//! plain point list.

use super::ConstraintError;
use crate::geometry::HalfEdgeMesh;
use crate::utils::{dihedral_angle, rotate_around_axis};
use nalgebra::Point3;
use serde::Serialize;

/// Below this distance two points are treated as coincident
const COINCIDENT_EPS: f64 = 1e-12;

/// Indexed, mutable storage of positions
pub trait PointSet {
    fn point(&self, v: usize) -> Option<Point3<f64>>;
    /// Returns false if `v` does not exist
    fn set_point(&mut self, v: usize, p: Point3<f64>) -> bool;
}

impl PointSet for HalfEdgeMesh {
    fn point(&self, v: usize) -> Option<Point3<f64>> {
        self.position(v)
    }

    fn set_point(&mut self, v: usize, p: Point3<f64>) -> bool {
        self.set_position(v, p).is_ok()
    }
}

impl PointSet for Vec<Point3<f64>> {
    fn point(&self, v: usize) -> Option<Point3<f64>> {
        self.get(v).copied()
    }

    fn set_point(&mut self, v: usize, p: Point3<f64>) -> bool {
        match self.get_mut(v) {
            Some(slot) => {
                *slot = p;
                true
            }
            None => false,
        }
    }
}

fn get<P: PointSet + ?Sized>(points: &P, v: usize) -> Result<Point3<f64>, ConstraintError> {
    points.point(v).ok_or(ConstraintError::MissingVertex(v))
}

fn set<P: PointSet + ?Sized>(points: &mut P, v: usize, p: Point3<f64>) -> Result<(), ConstraintError> {
    if points.set_point(v, p) {
        Ok(())
    } else {
        Err(ConstraintError::MissingVertex(v))
    }
}

/// A relaxable geometric constraint
pub trait Constraint {
    /// Move the constrained points towards the target. `factor` in [0, 1]
    /// blends between the current value (0) and the target (1).
    fn relax<P: PointSet + ?Sized>(&self, points: &mut P, factor: f64) -> Result<(), ConstraintError>;

    /// Deviation from the target, zero when met
    fn discrepancy<P: PointSet + ?Sized>(&self, points: &P) -> Result<f64, ConstraintError>;
}

/// Keeps vertices `a` and `b` at distance `length`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearConstraint {
    pub a: usize,
    pub b: usize,
    pub length: f64,
}

impl LinearConstraint {
    pub fn new(a: usize, b: usize, length: f64) -> Self {
        Self { a, b, length }
    }
}

impl Constraint for LinearConstraint {
    /// Moves both points symmetrically along the line through them
    fn relax<P: PointSet + ?Sized>(&self, points: &mut P, factor: f64) -> Result<(), ConstraintError> {
        let pa = get(points, self.a)?;
        let pb = get(points, self.b)?;
        let delta = pb - pa;
        let current = delta.norm();
        if current < COINCIDENT_EPS {
            return Ok(());
        }
        let goal = current * (1.0 - factor) + self.length * factor;
        let shift = delta * ((current - goal) / current / 2.0);
        set(points, self.a, pa + shift)?;
        set(points, self.b, pb - shift)
    }

    /// `|current - target| / max(current, target)`
    fn discrepancy<P: PointSet + ?Sized>(&self, points: &P) -> Result<f64, ConstraintError> {
        let current = (get(points, self.b)? - get(points, self.a)?).norm();
        let scale = current.max(self.length);
        if scale == 0.0 {
            return Ok(0.0);
        }
        Ok((current - self.length).abs() / scale)
    }
}

/// Keeps the triangles a-b-c and a-b-d, which share edge a-b, at a signed
/// dihedral angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DihedralConstraint {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
    pub angle: f64,
}

impl DihedralConstraint {
    pub fn new(a: usize, b: usize, c: usize, d: usize, angle: f64) -> Self {
        Self { a, b, c, d, angle }
    }

    /// Current dihedral angle
    pub fn current_angle<P: PointSet + ?Sized>(&self, points: &P) -> Result<f64, ConstraintError> {
        Ok(dihedral_angle(
            &get(points, self.a)?,
            &get(points, self.b)?,
            &get(points, self.c)?,
            &get(points, self.d)?,
        ))
    }
}

impl Constraint for DihedralConstraint {
    /// Rotates c and d by opposite angles about a-b, then translates all
    /// four points so their barycenter stays put.
    fn relax<P: PointSet + ?Sized>(&self, points: &mut P, factor: f64) -> Result<(), ConstraintError> {
        let ids = [self.a, self.b, self.c, self.d];
        let mut p = [Point3::origin(); 4];
        for (slot, &v) in p.iter_mut().zip(&ids) {
            *slot = get(points, v)?;
        }
        let before = barycenter(&p);

        let current = dihedral_angle(&p[0], &p[1], &p[2], &p[3]);
        let goal = current * (1.0 - factor) + self.angle * factor;
        let half = (goal - current) / 2.0;
        p[2] = rotate_around_axis(&p[0], &p[1], &p[2], -half);
        p[3] = rotate_around_axis(&p[0], &p[1], &p[3], half);

        let shift = before - barycenter(&p);
        for (q, &v) in p.iter().zip(&ids) {
            set(points, v, q + shift)?;
        }
        Ok(())
    }

    /// Absolute angle deviation in radians
    fn discrepancy<P: PointSet + ?Sized>(&self, points: &P) -> Result<f64, ConstraintError> {
        Ok((self.current_angle(points)? - self.angle).abs())
    }
}

fn barycenter(p: &[Point3<f64>; 4]) -> Point3<f64> {
    Point3::from((p[0].coords + p[1].coords + p[2].coords + p[3].coords) / 4.0)
}

/// Summed discrepancies of a constraint set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Discrepancy {
    pub linear: f64,
    pub angular: f64,
}

/// Constraints assembled for one topology
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    pub linear: Vec<LinearConstraint>,
    /// Ridge and Valley edges, relaxed on the folding schedule
    pub dihedral: Vec<DihedralConstraint>,
    /// Flat edges, always relaxed at half strength
    pub flat: Vec<DihedralConstraint>,
}

impl ConstraintSet {
    pub fn len(&self) -> usize {
        self.linear.len() + self.dihedral.len() + self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn discrepancy<P: PointSet + ?Sized>(&self, points: &P) -> Result<Discrepancy, ConstraintError> {
        let mut total = Discrepancy::default();
        for c in &self.linear {
            total.linear += c.discrepancy(points)?;
        }
        for c in self.dihedral.iter().chain(&self.flat) {
            total.angular += c.discrepancy(points)?;
        }
        Ok(total)
    }
}

/// Reorder constraints by decreasing discrepancy. Ties keep their relative
/// order. Returns the total discrepancy.
pub fn sort_by_discrepancy<C, P>(constraints: &mut Vec<C>, points: &P) -> Result<f64, ConstraintError>
where
    C: Constraint + Copy,
    P: PointSet + ?Sized,
{
    let discrepancies = constraints
        .iter()
        .map(|c| c.discrepancy(points))
        .collect::<Result<Vec<_>, _>>()?;
    let mut order: Vec<usize> = (0..constraints.len()).collect();
    order.sort_by(|&i, &j| discrepancies[j].total_cmp(&discrepancies[i]));
    let sorted: Vec<C> = order.iter().map(|&i| constraints[i]).collect();
    *constraints = sorted;
    Ok(discrepancies.iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn hinge_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ]
    }

    #[test]
    fn test_linear_discrepancy_is_scale_invariant() {
        let mut points = vec![Point3::origin(), Point3::new(2.0, 0.0, 0.0)];
        let c = LinearConstraint::new(0, 1, 1.0);
        assert_relative_eq!(c.discrepancy(&points).unwrap(), 0.5);

        points[1] = Point3::new(20.0, 0.0, 0.0);
        let scaled = LinearConstraint::new(0, 1, 10.0);
        assert_relative_eq!(scaled.discrepancy(&points).unwrap(), 0.5);

        let met = LinearConstraint::new(0, 1, 20.0);
        assert_eq!(met.discrepancy(&points).unwrap(), 0.0);
    }

    #[test]
    fn test_linear_relax_full_and_partial() {
        let mut points = vec![Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let c = LinearConstraint::new(0, 1, 1.0);
        c.relax(&mut points, 0.5).unwrap();
        assert_relative_eq!((points[1] - points[0]).norm(), 1.5, epsilon = 1e-12);
        c.relax(&mut points, 1.0).unwrap();
        assert_relative_eq!((points[1] - points[0]).norm(), 1.0, epsilon = 1e-12);
        // Midpoint does not move
        assert_relative_eq!(points[0].x + points[1].x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_relax_coincident_is_noop() {
        let mut points = vec![Point3::new(1.0, 1.0, 1.0); 2];
        LinearConstraint::new(0, 1, 1.0).relax(&mut points, 1.0).unwrap();
        assert_eq!(points[0], points[1]);
        assert!(points[0].x.is_finite());
    }

    #[test]
    fn test_dihedral_relax_reaches_target() {
        let mut points = hinge_points();
        let c = DihedralConstraint::new(0, 1, 2, 3, FRAC_PI_2);
        assert_relative_eq!(c.discrepancy(&points).unwrap(), FRAC_PI_2, epsilon = 1e-12);

        let before = barycenter(&[points[0], points[1], points[2], points[3]]);
        c.relax(&mut points, 1.0).unwrap();
        let after = barycenter(&[points[0], points[1], points[2], points[3]]);

        assert_relative_eq!(c.current_angle(&points).unwrap(), FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(before, after, epsilon = 1e-12);
    }

    #[test]
    fn test_dihedral_partial_relax() {
        let mut points = hinge_points();
        let c = DihedralConstraint::new(0, 1, 2, 3, -FRAC_PI_2);
        c.relax(&mut points, 0.5).unwrap();
        assert_relative_eq!(c.current_angle(&points).unwrap(), -FRAC_PI_2 / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_vertex() {
        let mut points = hinge_points();
        let c = LinearConstraint::new(0, 9, 1.0);
        assert_eq!(c.relax(&mut points, 1.0), Err(ConstraintError::MissingVertex(9)));
        assert_eq!(c.discrepancy(&points), Err(ConstraintError::MissingVertex(9)));
    }

    #[test]
    fn test_sort_by_discrepancy_is_stable_and_descending() {
        let points = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        let mut constraints = vec![
            LinearConstraint::new(0, 1, 1.0),
            LinearConstraint::new(0, 1, 4.0),
            LinearConstraint::new(1, 0, 1.0),
            LinearConstraint::new(0, 1, 2.0),
        ];
        let total = sort_by_discrepancy(&mut constraints, &points).unwrap();
        assert_relative_eq!(total, 0.75 + 0.5);
        let lengths: Vec<f64> = constraints.iter().map(|c| c.length).collect();
        assert_eq!(lengths, vec![4.0, 2.0, 1.0, 1.0]);
        // Equal discrepancies keep their order
        assert_eq!((constraints[2].a, constraints[3].a), (0, 1));
    }

    #[test]
    fn test_constraint_set_discrepancy() {
        let points = hinge_points();
        let set = ConstraintSet {
            linear: vec![LinearConstraint::new(0, 1, 2.0)],
            dihedral: vec![DihedralConstraint::new(0, 1, 2, 3, FRAC_PI_2)],
            flat: vec![DihedralConstraint::new(0, 1, 2, 3, 0.0)],
        };
        assert_eq!(set.len(), 3);
        let d = set.discrepancy(&points).unwrap();
        assert_relative_eq!(d.linear, 0.5);
        assert_relative_eq!(d.angular, FRAC_PI_2, epsilon = 1e-12);
    }
}
