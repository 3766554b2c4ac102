// Physics system: circle and convex-polygon bodies, pairwise contacts

pub mod body;
mod collision;
mod geometry;
mod motion;
mod response;
mod world;

pub use body::{presets, Body, BodyBuilder, PhysicsState, PolygonShape, Shape, Transform};
pub use collision::{
    circle_polygon_contact, circles_overlap, closest_point_on_segment, polygon_polygon_contact,
    Contact,
};
pub use geometry::{apply_transform, generate_polygon, Aabb};
pub use motion::{integrate, VELOCITY_EPSILON};
pub use response::{
    resolve_circle_polygon, resolve_polygon_polygon, respond_circle_polygon, CircleResponse,
    CollisionConfig, DEFAULT_COLLISION_CONFIG,
};
pub use world::{BodyHandle, CollisionEvent, PhysicsWorld, WorldConfig, DEFAULT_WORLD_CONFIG};

/// Physics errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Invalid mass: {0} (must be positive)")]
    InvalidMass(f64),

    #[error("Invalid time step: {0} (must be finite and non-negative)")]
    InvalidTimeStep(f64),

    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Unknown body: {0:?}")]
    UnknownBody(BodyHandle),
}
