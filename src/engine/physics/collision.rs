// Narrow-phase contact generation.
//
// Circle vs polygon uses the closest point on the polygon perimeter.
// Polygon vs polygon runs an AABB rejection first, then the Separating
// Axis Theorem over every edge normal of both polygons.

use log::trace;

use super::body::Body;
use super::geometry::Aabb;
use super::PhysicsError;
use crate::core::math::{clamp, Vector2};

/// Squared edge length under which a segment is treated as a point
const DEGENERATE_EDGE_LENGTH_SQ: f64 = 1e-12;

/// Normals shorter than this fall back to [`Vector2::UP`]
const DEGENERATE_NORMAL_LENGTH: f64 = 1e-8;

/// Result of a positive narrow-phase test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit contact normal.
    ///
    /// Circle vs polygon: from the closest perimeter point toward the circle
    /// center. Polygon vs polygon: from A's center toward B's center.
    pub normal: Vector2,

    /// Penetration depth along `normal`, always positive
    pub penetration: f64,

    /// Closest perimeter point for circle contacts, midpoint between the two
    /// centers for polygon contacts
    pub point: Vector2,
}

/// Closest point to `p` on the segment `a`-`b`
pub fn closest_point_on_segment(p: Vector2, a: Vector2, b: Vector2) -> Vector2 {
    let ab = b - a;
    let length_sq = ab.length_squared();
    if length_sq < DEGENERATE_EDGE_LENGTH_SQ {
        return a;
    }
    let t = clamp((p - a).dot(ab) / length_sq, 0.0, 1.0);
    a + ab * t
}

/// Contact between a polygon body and a circle body, if they overlap.
///
/// Fails only when the bodies have the wrong shapes. A polygon with no
/// vertices never collides.
pub fn circle_polygon_contact(
    polygon: &Body,
    circle: &Body,
) -> Result<Option<Contact>, PhysicsError> {
    expect_polygon(polygon)?;
    let radius = circle.radius().ok_or(PhysicsError::ShapeMismatch {
        expected: "circle",
        actual: circle.shape().name(),
    })?;

    let contact = circle_vs_vertices(
        &polygon.world_vertices(),
        circle.transform.position,
        radius,
    );
    trace!("circle-polygon contact: {:?}", contact);
    Ok(contact)
}

fn circle_vs_vertices(vertices: &[Vector2], center: Vector2, radius: f64) -> Option<Contact> {
    let n = vertices.len();
    let mut closest: Option<(Vector2, f64)> = None;

    for i in 0..n {
        let p1 = vertices[i];
        let p2 = vertices[(i + 1) % n];

        // The vertex itself and the segment's closest point are both candidates
        for candidate in [p1, closest_point_on_segment(center, p1, p2)] {
            let dist_sq = (center - candidate).length_squared();
            if closest.map_or(true, |(_, best)| dist_sq < best) {
                closest = Some((candidate, dist_sq));
            }
        }
    }

    let (point, dist_sq) = closest?;
    let dist = dist_sq.sqrt();
    if dist >= radius {
        return None;
    }

    let mut normal = (center - point).normalized();
    if normal.length() < DEGENERATE_NORMAL_LENGTH {
        // Center exactly on the perimeter: pick a fixed direction
        normal = Vector2::UP;
    }

    Some(Contact {
        normal,
        penetration: radius - dist,
        point,
    })
}

/// Contact between two polygon bodies, if they overlap.
///
/// Boxes that do not overlap are rejected before any separating axis is
/// examined. Zero-length edges are skipped as axes.
pub fn polygon_polygon_contact(a: &Body, b: &Body) -> Result<Option<Contact>, PhysicsError> {
    expect_polygon(a)?;
    expect_polygon(b)?;

    let vertices_a = a.world_vertices();
    let vertices_b = b.world_vertices();

    let (Some(aabb_a), Some(aabb_b)) = (
        Aabb::from_points(&vertices_a),
        Aabb::from_points(&vertices_b),
    ) else {
        return Ok(None);
    };
    if !aabb_a.overlaps(&aabb_b) {
        trace!("polygon-polygon rejected by AABB");
        return Ok(None);
    }

    let contact = separating_axis_test(
        &vertices_a,
        &vertices_b,
        a.transform.position,
        b.transform.position,
    );
    trace!("polygon-polygon contact: {:?}", contact);
    Ok(contact)
}

fn separating_axis_test(
    vertices_a: &[Vector2],
    vertices_b: &[Vector2],
    center_a: Vector2,
    center_b: Vector2,
) -> Option<Contact> {
    let mut best: Option<(Vector2, f64)> = None;

    for shape in [vertices_a, vertices_b] {
        let n = shape.len();
        for i in 0..n {
            let edge = shape[(i + 1) % n] - shape[i];
            if edge.length_squared() < DEGENERATE_EDGE_LENGTH_SQ {
                continue;
            }
            let axis = edge.perp().normalized();

            let (min_a, max_a) = project(vertices_a, axis);
            let (min_b, max_b) = project(vertices_b, axis);
            let overlap = max_a.min(max_b) - min_a.max(min_b);

            if overlap <= 0.0 {
                return None;
            }
            if best.map_or(true, |(_, smallest)| overlap < smallest) {
                best = Some((axis, overlap));
            }
        }
    }

    let (mut normal, penetration) = best?;
    if (center_b - center_a).dot(normal) < 0.0 {
        normal = -normal;
    }

    Some(Contact {
        normal,
        penetration,
        point: (center_a + center_b) * 0.5,
    })
}

/// Interval covered by `points` projected onto `axis`
fn project(points: &[Vector2], axis: Vector2) -> (f64, f64) {
    points
        .iter()
        .map(|p| p.dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), d| {
            (min.min(d), max.max(d))
        })
}

/// Whether two circle bodies touch or overlap. Detection only.
pub fn circles_overlap(a: &Body, b: &Body) -> Result<bool, PhysicsError> {
    let (Some(radius_a), Some(radius_b)) = (a.radius(), b.radius()) else {
        let offender = if a.is_circle() { b } else { a };
        let actual = offender.shape().name();
        return Err(PhysicsError::ShapeMismatch {
            expected: "circle",
            actual,
        });
    };

    let dist_sq = (b.transform.position - a.transform.position).length_squared();
    let reach = radius_a + radius_b;
    Ok(dist_sq <= reach * reach)
}

fn expect_polygon(body: &Body) -> Result<(), PhysicsError> {
    if body.is_polygon() {
        Ok(())
    } else {
        Err(PhysicsError::ShapeMismatch {
            expected: "polygon",
            actual: body.shape().name(),
        })
    }
}
