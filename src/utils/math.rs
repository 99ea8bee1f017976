// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Below this magnitude a normal is treated as zero
const NORMAL_EPS: f64 = 1e-20;

/// Rotate point `p` by `theta` radians around the line through `a` and `b`.
///
/// The rotation is right-handed around the direction `b - a`. A degenerate
/// axis (coincident `a` and `b`) leaves the point where it is.
pub fn rotate_around_axis(
    a: &Point3<f64>,
    b: &Point3<f64>,
    p: &Point3<f64>,
    theta: f64,
) -> Point3<f64> {
    match Unit::try_new(b - a, NORMAL_EPS) {
        Some(axis) => a + Rotation3::from_axis_angle(&axis, theta) * (p - a),
        None => *p,
    }
}

/// Signed angle between the normals of triangles a-b-c and a-b-d, which
/// share the edge a-b. The result lies in (-π, π]; zero means flat.
pub fn dihedral_angle(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> f64 {
    let ab = b - a;
    let nabc = unit_or_zero(ab.cross(&(c - b)));
    let nabd = unit_or_zero((a - b).cross(&(d - a)));
    let cross = nabc.cross(&nabd);
    let sine = if cross.dot(&ab) < 0.0 {
        -cross.norm()
    } else {
        cross.norm()
    };
    sine.atan2(nabc.dot(&nabd))
}

/// Normalize `v`, or return it unchanged when it is too short to normalize
pub fn unit_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(NORMAL_EPS).unwrap_or(v)
}

/// Barycenter of a set of points, `None` for an empty set
pub fn centroid<'a, I>(points: I) -> Option<Point3<f64>>
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p.coords;
        count += 1;
    }
    (count > 0).then(|| Point3::from(sum / count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_quarter_turn_about_z() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(0.0, 0.0, 1.0);
        let p = Point3::new(1.0, 0.0, 5.0);
        let q = rotate_around_axis(&a, &b, &p, FRAC_PI_2);
        assert_relative_eq!(q.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(q.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(q.z, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_degenerate_axis() {
        let a = Point3::new(1.0, 1.0, 1.0);
        let p = Point3::new(3.0, 2.0, 1.0);
        assert_eq!(rotate_around_axis(&a, &a, &p, 1.0), p);
    }

    #[test]
    fn test_dihedral_flat_is_zero() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.5, 1.0, 0.0);
        let d = Point3::new(0.5, -1.0, 0.0);
        assert!(dihedral_angle(&a, &b, &c, &d).abs() < 1e-12);
    }

    #[test]
    fn test_dihedral_sign_follows_rotation() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.5, 1.0, 0.0);
        let d = Point3::new(0.5, -1.0, 0.0);
        // Lifting d about a->b opens a positive angle, lifting c a negative one
        let d_up = rotate_around_axis(&a, &b, &d, 0.3);
        assert_relative_eq!(dihedral_angle(&a, &b, &c, &d_up), 0.3, epsilon = 1e-12);
        let c_up = rotate_around_axis(&a, &b, &c, 0.3);
        assert_relative_eq!(dihedral_angle(&a, &b, &c_up, &d), -0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_dihedral_degenerate_triangle() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(2.0, 0.0, 0.0);
        let d = Point3::new(0.5, -1.0, 0.0);
        assert_eq!(dihedral_angle(&a, &b, &c, &d), 0.0);
    }

    #[test]
    fn test_centroid() {
        let pts = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0)];
        assert_eq!(centroid(&pts), Some(Point3::new(1.0, 2.0, 3.0)));
        let empty: [Point3<f64>; 0] = [];
        assert_eq!(centroid(&empty), None);
    }
}
