// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Delaunay predicates for edge flipping
//!
//! All predicates work in the xy plane; the z coordinate of their
//! arguments is ignored. Callers pass flat (original) positions.

use nalgebra::{Matrix3, Point3};

/// Relative determinant threshold below which a triangle is degenerate
const DEGENERATE_EPS: f64 = 1e-12;

/// Relative margin on the in-circle test. Co-circular quads (square grid
/// cells) must not be flipped back and forth.
const INCIRCLE_MARGIN: f64 = 1e-9;

/// Determinant of a 3x3 matrix
pub fn det3(m: &Matrix3<f64>) -> f64 {
    m.determinant()
}

/// Orientation of the circulation p, q, r.
/// Positive for counter-clockwise, negative for clockwise, zero if collinear.
pub fn circulation(p: &Point3<f64>, q: &Point3<f64>, r: &Point3<f64>) -> f64 {
    det3(&Matrix3::new(
        1.0, 1.0, 1.0, //
        p.x, q.x, r.x, //
        p.y, q.y, r.y,
    ))
}

/// Center and radius of the circle through p, q and r.
///
/// Returns `None` when the points are (nearly) collinear relative to the
/// size of the triangle.
pub fn circum_circle(p: &Point3<f64>, q: &Point3<f64>, r: &Point3<f64>) -> Option<(Point3<f64>, f64)> {
    let a = det3(&Matrix3::new(
        p.x, p.y, 1.0, //
        q.x, q.y, 1.0, //
        r.x, r.y, 1.0,
    ));
    let scale = planar_distance_sq(p, q)
        .max(planar_distance_sq(q, r))
        .max(planar_distance_sq(r, p));
    if scale == 0.0 || a.abs() <= DEGENERATE_EPS * scale {
        return None;
    }

    let (sp, sq, sr) = (
        p.x * p.x + p.y * p.y,
        q.x * q.x + q.y * q.y,
        r.x * r.x + r.y * r.y,
    );
    let bx = -det3(&Matrix3::new(
        sp, p.y, 1.0, //
        sq, q.y, 1.0, //
        sr, r.y, 1.0,
    ));
    let by = det3(&Matrix3::new(
        sp, p.x, 1.0, //
        sq, q.x, 1.0, //
        sr, r.x, 1.0,
    ));
    let center = Point3::new(-bx / (2.0 * a), -by / (2.0 * a), 0.0);
    let radius = planar_distance_sq(&center, p).sqrt();
    Some((center, radius))
}

/// If a-b is the common edge of triangles a-b-c and a-b-d, reports whether
/// the edge is Delaunay: c lies outside the circumcircle of a-b-d and d lies
/// outside the circumcircle of a-b-c. Degenerate triangles count as Delaunay.
pub fn is_delaunay(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> bool {
    for (tri, apex) in [((a, b, c), d), ((a, b, d), c)] {
        let Some((center, radius)) = circum_circle(tri.0, tri.1, tri.2) else {
            return true;
        };
        if planar_distance_sq(&center, apex).sqrt() < radius * (1.0 - INCIRCLE_MARGIN) {
            return false;
        }
    }
    true
}

/// If a-b is the common edge of triangles a-b-c and a-b-d, reports whether
/// segment c-d crosses the line through a-b, i.e. whether the quad a-c-b-d
/// can be split along c-d instead.
pub fn is_flippable(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> bool {
    (circulation(c, d, a) < 0.0) != (circulation(c, d, b) < 0.0)
}

/// Whether replacing edge a-b by c-d improves the triangulation
pub fn should_flip(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> bool {
    !is_delaunay(a, b, c, d) && is_flippable(a, b, c, d)
}

fn planar_distance_sq(p: &Point3<f64>, q: &Point3<f64>) -> f64 {
    (p.x - q.x).powi(2) + (p.y - q.y).powi(2)
}
