//! 2D collision detection and impulse response for circles and convex polygons.
//!
//! The driver owns the cadence: advance every body with
//! [`engine::physics::integrate`], then resolve candidate pairs with
//! [`engine::physics::resolve_circle_polygon`] and
//! [`engine::physics::resolve_polygon_polygon`], or let
//! [`engine::physics::PhysicsWorld`] do both in the required order.

pub mod core;
pub mod engine;

pub use crate::core::math::Vector2;
pub use crate::engine::physics::{
    Body, BodyBuilder, BodyHandle, CollisionConfig, PhysicsError, PhysicsWorld, Shape,
};
