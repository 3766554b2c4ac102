use super::body::{PhysicsState, Transform};
use super::PhysicsError;
use crate::core::math::Vector2;

/// Velocities below this magnitude snap to zero
pub const VELOCITY_EPSILON: f64 = 1e-3;

/// Advance one body by `dt` seconds.
///
/// Position and rotation move by the current velocities, then both
/// velocities decay exponentially: `v *= (1 - drag)^dt`. A negative or
/// non-finite `dt` is rejected and leaves the body untouched.
pub fn integrate(
    transform: &mut Transform,
    physics: &mut PhysicsState,
    dt: f64,
) -> Result<(), PhysicsError> {
    if !dt.is_finite() || dt < 0.0 {
        return Err(PhysicsError::InvalidTimeStep(dt));
    }

    let damping = (1.0 - physics.drag).powf(dt);

    if physics.linear_velocity.length() > 0.0 {
        transform.position += physics.linear_velocity * dt;
        physics.linear_velocity *= damping;

        if physics.linear_velocity.length() < VELOCITY_EPSILON {
            physics.linear_velocity = Vector2::ZERO;
        }
    }

    if physics.angular_velocity.abs() > 0.0 {
        // Degrees, no wraparound
        transform.rotation += physics.angular_velocity * dt;
        physics.angular_velocity *= damping;

        if physics.angular_velocity.abs() < VELOCITY_EPSILON {
            physics.angular_velocity = 0.0;
        }
    }

    Ok(())
}
