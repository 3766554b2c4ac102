use super::geometry::{apply_transform, generate_polygon, Aabb};
use super::PhysicsError;
use crate::core::math::Vector2;

/// Default drag: bodies lose almost all of their velocity within a second
pub const DEFAULT_DRAG: f64 = 0.999;

/// Hitpoints granted per polygon vertex
pub const HITPOINTS_PER_VERTEX: f64 = 25.0;

/// Position, rotation and scale of a body.
///
/// `rotation` is in degrees and unbounded. `scale` is a circle's radius and a
/// polygon's size multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector2,
    pub rotation: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector2::ZERO,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

/// Kinematic state integrated every step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsState {
    pub linear_velocity: Vector2,
    /// Degrees per second
    pub angular_velocity: f64,
    /// `f64::INFINITY` marks an immovable body
    pub mass: f64,
    /// Fraction of velocity lost per second, in [0, 1)
    pub drag: f64,
}

impl Default for PhysicsState {
    fn default() -> Self {
        Self {
            linear_velocity: Vector2::ZERO,
            angular_velocity: 0.0,
            mass: 1.0,
            drag: DEFAULT_DRAG,
        }
    }
}

impl PhysicsState {
    /// Inverse mass, 0 for immovable bodies.
    ///
    /// Infinite, zero, negative and NaN masses all map to 0 so they never
    /// produce infinities or NaN in the impulse math.
    pub fn inverse_mass(&self) -> f64 {
        if self.mass > 0.0 && self.mass.is_finite() {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    pub fn is_immovable(&self) -> bool {
        self.inverse_mass() == 0.0
    }
}

/// Regular convex polygon in local space.
///
/// The base vertices are generated once and never mutated; world-space
/// vertices are derived on read.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    base_vertices: Vec<Vector2>,
    size: f64,
}

impl PolygonShape {
    pub fn new(point_count: usize, size: f64) -> Self {
        Self {
            base_vertices: generate_polygon(point_count, size),
            size,
        }
    }

    pub fn base_vertices(&self) -> &[Vector2] {
        &self.base_vertices
    }

    pub fn point_count(&self) -> usize {
        self.base_vertices.len()
    }

    /// Circumradius of the base vertices before scaling
    pub fn size(&self) -> f64 {
        self.size
    }
}

/// Collision shape of a body
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Radius is the transform's scale
    Circle,
    Polygon(PolygonShape),
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Polygon(_) => "polygon",
        }
    }
}

/// A circle or convex polygon with its motion state
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub transform: Transform,
    pub physics: PhysicsState,
    shape: Shape,
    /// Remaining hitpoints, `None` for indestructible bodies
    pub hitpoints: Option<f64>,
    /// Damage dealt to polygons on contact, `None` for harmless bodies
    pub damage: Option<f64>,
}

impl Body {
    pub fn new(transform: Transform, physics: PhysicsState, shape: Shape) -> Self {
        Self {
            transform,
            physics,
            shape,
            hitpoints: None,
            damage: None,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_circle(&self) -> bool {
        matches!(self.shape, Shape::Circle)
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self.shape, Shape::Polygon(_))
    }

    pub fn as_polygon(&self) -> Option<&PolygonShape> {
        match &self.shape {
            Shape::Polygon(polygon) => Some(polygon),
            Shape::Circle => None,
        }
    }

    /// Circle radius, `None` for polygons
    pub fn radius(&self) -> Option<f64> {
        match self.shape {
            Shape::Circle => Some(self.transform.scale),
            Shape::Polygon(_) => None,
        }
    }

    /// World-space vertices in winding order. Empty for circles.
    pub fn world_vertices(&self) -> Vec<Vector2> {
        match &self.shape {
            Shape::Polygon(polygon) => apply_transform(polygon.base_vertices(), &self.transform),
            Shape::Circle => Vec::new(),
        }
    }

    /// World-space bounding box, `None` for a polygon without vertices
    pub fn aabb(&self) -> Option<Aabb> {
        match &self.shape {
            Shape::Circle => Some(Aabb::from_circle(
                self.transform.position,
                self.transform.scale.abs(),
            )),
            Shape::Polygon(_) => Aabb::from_points(&self.world_vertices()),
        }
    }

    pub fn speed(&self) -> f64 {
        self.physics.linear_velocity.length()
    }

    /// Subtract `amount` from the hitpoints and return what is left.
    /// Indestructible bodies are unaffected and return `None`.
    pub fn take_damage(&mut self, amount: f64) -> Option<f64> {
        let hitpoints = self.hitpoints.as_mut()?;
        *hitpoints -= amount;
        Some(*hitpoints)
    }

    pub fn is_destroyed(&self) -> bool {
        self.hitpoints.is_some_and(|hp| hp <= 0.0)
    }
}

/// Builder for creating bodies with validated physical parameters
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    shape: Shape,
    transform: Transform,
    physics: PhysicsState,
    hitpoints: Option<f64>,
    damage: Option<f64>,
}

impl BodyBuilder {
    /// Create a circle of the given radius
    pub fn circle(radius: f64) -> Self {
        Self {
            shape: Shape::Circle,
            transform: Transform {
                scale: radius,
                ..Transform::default()
            },
            physics: PhysicsState::default(),
            hitpoints: None,
            damage: None,
        }
    }

    /// Create a regular polygon with `point_count` vertices on a circle of radius `size`
    pub fn polygon(point_count: usize, size: f64) -> Self {
        Self {
            shape: Shape::Polygon(PolygonShape::new(point_count, size)),
            transform: Transform::default(),
            physics: PhysicsState::default(),
            hitpoints: None,
            damage: None,
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.transform.position = Vector2::new(x, y);
        self
    }

    /// Set the initial rotation (degrees)
    pub fn rotation(mut self, degrees: f64) -> Self {
        self.transform.rotation = degrees;
        self
    }

    /// Set the scale (radius for circles)
    pub fn scale(mut self, scale: f64) -> Self {
        self.transform.scale = scale;
        self
    }

    /// Set the initial linear velocity
    pub fn linvel(mut self, x: f64, y: f64) -> Self {
        self.physics.linear_velocity = Vector2::new(x, y);
        self
    }

    /// Set the initial angular velocity (degrees per second)
    pub fn angvel(mut self, angvel: f64) -> Self {
        self.physics.angular_velocity = angvel;
        self
    }

    /// Set mass directly
    pub fn mass(mut self, mass: f64) -> Self {
        self.physics.mass = mass;
        self
    }

    /// Make the body immovable (infinite mass)
    pub fn immovable(mut self) -> Self {
        self.physics.mass = f64::INFINITY;
        self
    }

    /// Set drag (0.0 = none, close to 1.0 = stops almost instantly)
    pub fn drag(mut self, drag: f64) -> Self {
        self.physics.drag = drag;
        self
    }

    pub fn hitpoints(mut self, hitpoints: f64) -> Self {
        self.hitpoints = Some(hitpoints);
        self
    }

    pub fn damage(mut self, damage: f64) -> Self {
        self.damage = Some(damage);
        self
    }

    /// Build the body, rejecting non-physical parameters
    pub fn build(self) -> Result<Body, PhysicsError> {
        let mass = self.physics.mass;
        if mass.is_nan() || mass <= 0.0 {
            return Err(PhysicsError::InvalidMass(mass));
        }

        let drag = self.physics.drag;
        if !(0.0..1.0).contains(&drag) {
            return Err(PhysicsError::InvalidParameter {
                name: "drag",
                value: drag,
            });
        }

        let scale = self.transform.scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PhysicsError::InvalidParameter {
                name: "scale",
                value: scale,
            });
        }

        if let Shape::Polygon(polygon) = &self.shape {
            if polygon.point_count() < 3 {
                return Err(PhysicsError::DegenerateGeometry(format!(
                    "polygon needs at least 3 vertices, got {}",
                    polygon.point_count()
                )));
            }
            if !polygon.size().is_finite() || polygon.size() <= 0.0 {
                return Err(PhysicsError::InvalidParameter {
                    name: "size",
                    value: polygon.size(),
                });
            }
        }

        Ok(Body {
            transform: self.transform,
            physics: self.physics,
            shape: self.shape,
            hitpoints: self.hitpoints,
            damage: self.damage,
        })
    }
}

/// Common body configurations for arena entities
pub mod presets {
    use super::*;

    pub const PLAYER_RADIUS: f64 = 30.0;
    pub const PROJECTILE_RADIUS: f64 = 15.0;
    pub const PROJECTILE_DAMAGE: f64 = 25.0;

    /// Create the player disc
    pub fn player(x: f64, y: f64) -> Result<Body, PhysicsError> {
        BodyBuilder::circle(PLAYER_RADIUS).position(x, y).build()
    }

    /// Create a projectile fired from `origin` along `direction`
    pub fn projectile(
        origin: Vector2,
        direction: Vector2,
        speed: f64,
        damage: f64,
    ) -> Result<Body, PhysicsError> {
        let velocity = direction.normalized() * speed;
        BodyBuilder::circle(PROJECTILE_RADIUS)
            .position(origin.x(), origin.y())
            .linvel(velocity.x(), velocity.y())
            .damage(damage)
            .build()
    }

    /// Create a breakable regular polygon; hitpoints scale with the vertex count
    pub fn breakable_polygon(
        x: f64,
        y: f64,
        point_count: usize,
        size: f64,
    ) -> Result<Body, PhysicsError> {
        BodyBuilder::polygon(point_count, size)
            .position(x, y)
            .hitpoints(point_count as f64 * HITPOINTS_PER_VERTEX)
            .build()
    }

    /// Create an immovable polygon obstacle
    pub fn wall(x: f64, y: f64, point_count: usize, size: f64) -> Result<Body, PhysicsError> {
        BodyBuilder::polygon(point_count, size)
            .position(x, y)
            .immovable()
            .build()
    }
}
