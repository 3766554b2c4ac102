// Impulse-based contact response
//
// Both resolvers mutate the two bodies in place and report whether a
// geometric overlap was found, whether or not an impulse was applied.
// Calling a resolver twice for the same contact compounds the corrections.

use log::{debug, warn};

use super::body::Body;
use super::collision::{circle_polygon_contact, polygon_polygon_contact};
use super::PhysicsError;

/// Tuning for contact response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionConfig {
    /// Bounce elasticity in [0, 1]: 0 = fully inelastic, 1 = fully elastic
    pub restitution: f64,

    /// Fraction of circle penetration removed per contact, in [0, 1]
    pub correction: f64,

    /// Fraction of polygon penetration removed per contact, in [0, 1]
    pub percent: f64,

    /// Spin applied to polygon pairs per unit of center offset
    pub angular_factor: f64,

    /// Scale of the spin a circle imparts on a polygon
    pub circle_angular_scale: f64,
}

pub const DEFAULT_COLLISION_CONFIG: CollisionConfig = CollisionConfig {
    restitution: 0.8,
    correction: 0.8,
    percent: 1.0,
    angular_factor: 0.05,
    circle_angular_scale: 0.01,
};

impl Default for CollisionConfig {
    fn default() -> Self {
        DEFAULT_COLLISION_CONFIG
    }
}

impl CollisionConfig {
    pub fn restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn correction(mut self, correction: f64) -> Self {
        self.correction = correction;
        self
    }

    pub fn percent(mut self, percent: f64) -> Self {
        self.percent = percent;
        self
    }

    pub fn angular_factor(mut self, angular_factor: f64) -> Self {
        self.angular_factor = angular_factor;
        self
    }

    pub fn circle_angular_scale(mut self, circle_angular_scale: f64) -> Self {
        self.circle_angular_scale = circle_angular_scale;
        self
    }

    /// Check every coefficient is in range
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let unit_range = [
            ("restitution", self.restitution),
            ("correction", self.correction),
            ("percent", self.percent),
        ];
        for (name, value) in unit_range {
            if !(0.0..=1.0).contains(&value) {
                return Err(PhysicsError::InvalidParameter { name, value });
            }
        }

        let finite = [
            ("angular_factor", self.angular_factor),
            ("circle_angular_scale", self.circle_angular_scale),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(PhysicsError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// What resolving a circle against a polygon found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleResponse {
    /// No overlap; neither body changed
    Apart,

    /// Overlap while the circle was already moving away from the polygon
    Receding,

    /// Overlap with the circle moving into (or resting against) the polygon
    Approaching,
}

impl CircleResponse {
    pub fn is_contact(self) -> bool {
        self != Self::Apart
    }
}

/// Detect and resolve a circle touching a polygon.
///
/// Returns `true` on any overlap. See [`respond_circle_polygon`] for the
/// direction of the contact.
pub fn resolve_circle_polygon(
    polygon: &mut Body,
    circle: &mut Body,
    config: &CollisionConfig,
) -> Result<bool, PhysicsError> {
    Ok(respond_circle_polygon(polygon, circle, config)?.is_contact())
}

/// Detect and resolve a circle touching a polygon, reporting whether the
/// circle was approaching.
///
/// Only the circle is pushed out of the polygon. The impulse uses the
/// circle's velocity alone and is skipped when the circle is already moving
/// away. The polygon also receives a small spin from the contact offset;
/// this is a feel heuristic, not a torque derived from inertia.
pub fn respond_circle_polygon(
    polygon: &mut Body,
    circle: &mut Body,
    config: &CollisionConfig,
) -> Result<CircleResponse, PhysicsError> {
    let Some(contact) = circle_polygon_contact(polygon, circle)? else {
        return Ok(CircleResponse::Apart);
    };
    let normal = contact.normal;

    circle.transform.position += normal * (contact.penetration * config.correction);

    let vel_along_normal = circle.physics.linear_velocity.dot(normal);
    if vel_along_normal > 0.0 {
        debug!("circle-polygon contact separating, no impulse");
        return Ok(CircleResponse::Receding);
    }

    let inv_mass_circle = circle.physics.inverse_mass();
    let inv_mass_polygon = polygon.physics.inverse_mass();
    let inv_mass_sum = inv_mass_circle + inv_mass_polygon;
    if inv_mass_sum == 0.0 {
        warn!("circle-polygon contact between two immovable bodies");
        return Ok(CircleResponse::Approaching);
    }

    let j = -(1.0 + config.restitution) * vel_along_normal / inv_mass_sum;
    let impulse = normal * j;
    circle.physics.linear_velocity += impulse * inv_mass_circle;
    polygon.physics.linear_velocity -= impulse * inv_mass_polygon;

    let offset = contact.point - polygon.transform.position;
    polygon.physics.angular_velocity += offset.cross(normal)
        * (vel_along_normal * config.restitution * inv_mass_polygon)
        * config.circle_angular_scale;

    debug!(
        "circle-polygon impulse {:.3} along ({:.3}, {:.3})",
        j,
        normal.x(),
        normal.y()
    );
    Ok(CircleResponse::Approaching)
}

/// Detect and resolve two touching polygons.
///
/// Penetration is removed along the contact normal, split by inverse mass
/// so the heavier body moves less. Approaching bodies exchange an impulse
/// and a spin proportional to each body's offset from the pair midpoint
/// (a feel heuristic, not a torque derived from inertia).
pub fn resolve_polygon_polygon(
    a: &mut Body,
    b: &mut Body,
    config: &CollisionConfig,
) -> Result<bool, PhysicsError> {
    let Some(contact) = polygon_polygon_contact(a, b)? else {
        return Ok(false);
    };
    let normal = contact.normal;

    let inv_mass_a = a.physics.inverse_mass();
    let inv_mass_b = b.physics.inverse_mass();
    let inv_mass_sum = inv_mass_a + inv_mass_b;
    if inv_mass_sum == 0.0 {
        warn!("polygon-polygon contact between two immovable bodies");
        return Ok(true);
    }

    let correction = normal * (contact.penetration * config.percent / inv_mass_sum);
    a.transform.position -= correction * inv_mass_a;
    b.transform.position += correction * inv_mass_b;

    // Normal points from A to B, so a positive value means B is pulling away
    let relative_velocity = b.physics.linear_velocity - a.physics.linear_velocity;
    let vel_along_normal = relative_velocity.dot(normal);
    if vel_along_normal >= 0.0 {
        debug!("polygon-polygon contact separating, no impulse");
        return Ok(true);
    }

    let j = -(1.0 + config.restitution) * vel_along_normal / inv_mass_sum;
    let impulse = normal * j;
    a.physics.linear_velocity -= impulse * inv_mass_a;
    b.physics.linear_velocity += impulse * inv_mass_b;

    let midpoint = (a.transform.position + b.transform.position) * 0.5;
    for body in [a, b] {
        if body.physics.is_immovable() {
            continue;
        }
        let offset = body.transform.position - midpoint;
        body.physics.angular_velocity += offset.cross(normal) * config.angular_factor;
    }

    debug!(
        "polygon-polygon impulse {:.3} along ({:.3}, {:.3})",
        j,
        normal.x(),
        normal.y()
    );
    Ok(true)
}
