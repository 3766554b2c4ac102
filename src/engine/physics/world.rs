use log::debug;

use super::body::Body;
use super::motion::integrate;
use super::response::{
    resolve_polygon_polygon, respond_circle_polygon, CircleResponse, CollisionConfig,
    DEFAULT_COLLISION_CONFIG,
};
use super::PhysicsError;
use crate::core::math::Vector2;

/// Stable identity of a body inside a [`PhysicsWorld`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(u64);

impl BodyHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// World-level tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    pub collision: CollisionConfig,

    /// Damaging circles slower than this stop dealing damage
    pub projectile_min_speed: f64,
}

pub const DEFAULT_WORLD_CONFIG: WorldConfig = WorldConfig {
    collision: DEFAULT_COLLISION_CONFIG,
    projectile_min_speed: 2.0,
};

impl Default for WorldConfig {
    fn default() -> Self {
        DEFAULT_WORLD_CONFIG
    }
}

/// Something that happened during the last step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionEvent {
    /// A circle overlapped a polygon
    CirclePolygon {
        circle: BodyHandle,
        polygon: BodyHandle,
    },

    /// Two polygons overlapped
    PolygonPolygon { a: BodyHandle, b: BodyHandle },

    /// A projectile took hitpoints off a polygon
    Damaged {
        polygon: BodyHandle,
        projectile: BodyHandle,
        remaining: f64,
    },

    /// A polygon's hitpoints reached zero
    Destroyed { polygon: BodyHandle },

    /// A projectile hit something or slowed down and no longer deals damage
    ProjectileSpent { projectile: BodyHandle },
}

/// Ordered set of bodies stepped with a fixed resolution order.
///
/// Each step integrates every body, then resolves circle-polygon pairs and
/// finally polygon-polygon pairs, always in insertion order. Pairs are
/// resolved immediately, so an earlier pair can change what a later pair
/// sees within the same step. Removing bodies is left to the caller.
pub struct PhysicsWorld {
    /// Collision and damage tuning
    config: WorldConfig,

    /// Bodies in resolution order
    bodies: Vec<(BodyHandle, Body)>,

    /// Next handle id; never reused
    next_handle: u64,

    /// Events produced by the last step
    events: Vec<CollisionEvent>,

    /// Completed steps
    step_count: u64,
}

impl PhysicsWorld {
    /// Create an empty world with default settings
    pub fn new() -> Self {
        Self {
            config: DEFAULT_WORLD_CONFIG,
            bodies: Vec::new(),
            next_handle: 0,
            events: Vec::with_capacity(32),
            step_count: 0,
        }
    }

    /// Create an empty world with custom settings
    pub fn with_config(config: WorldConfig) -> Result<Self, PhysicsError> {
        let mut world = Self::new();
        world.set_config(config)?;
        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: WorldConfig) -> Result<(), PhysicsError> {
        config.collision.validate()?;
        if config.projectile_min_speed.is_nan() || config.projectile_min_speed < 0.0 {
            return Err(PhysicsError::InvalidParameter {
                name: "projectile_min_speed",
                value: config.projectile_min_speed,
            });
        }
        self.config = config;
        Ok(())
    }

    /// Add a body to the end of the resolution order
    pub fn insert(&mut self, body: Body) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        debug!("Inserted {} {:?}", body.shape().name(), handle);
        self.bodies.push((handle, body));
        handle
    }

    /// Remove a body, keeping the order of the others
    pub fn remove(&mut self, handle: BodyHandle) -> Result<Body, PhysicsError> {
        let index = self.index_of(handle)?;
        let (_, body) = self.bodies.remove(index);
        debug!("Removed {:?}", handle);
        Ok(body)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, body)| body)
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, body)| body)
    }

    /// Bodies in resolution order
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.iter().map(|(handle, body)| (*handle, body))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Polygons whose hitpoints are used up
    pub fn destroyed(&self) -> Vec<BodyHandle> {
        self.iter()
            .filter(|(_, body)| body.is_destroyed())
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Remove every body whose center is further than `half_extents` from
    /// `center` on either axis. Returns the removed handles.
    pub fn retain_within(&mut self, center: Vector2, half_extents: Vector2) -> Vec<BodyHandle> {
        let mut removed = Vec::new();
        self.bodies.retain(|(handle, body)| {
            let offset = body.transform.position - center;
            let inside =
                offset.x().abs() <= half_extents.x() && offset.y().abs() <= half_extents.y();
            if !inside {
                removed.push(*handle);
            }
            inside
        });
        if !removed.is_empty() {
            debug!("Removed {} bodies outside the active region", removed.len());
        }
        removed
    }

    /// Events produced by the last step
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Advance the world by `dt` seconds.
    ///
    /// A negative or non-finite `dt` is rejected before any body moves.
    pub fn step(&mut self, dt: f64) -> Result<&[CollisionEvent], PhysicsError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PhysicsError::InvalidTimeStep(dt));
        }
        self.events.clear();

        for (_, body) in &mut self.bodies {
            integrate(&mut body.transform, &mut body.physics, dt)?;
        }

        self.resolve_circles()?;
        self.resolve_polygons()?;

        self.step_count += 1;
        if !self.events.is_empty() {
            debug!(
                "Step {}: {} collision events",
                self.step_count,
                self.events.len()
            );
        }
        Ok(&self.events)
    }

    fn resolve_circles(&mut self) -> Result<(), PhysicsError> {
        let config = self.config;
        let n = self.bodies.len();

        for i in 0..n {
            if !self.bodies[i].1.is_circle() {
                continue;
            }

            for j in 0..n {
                if !self.bodies[j].1.is_polygon() {
                    continue;
                }
                let ((circle_handle, circle), (polygon_handle, polygon)) =
                    pair_mut(&mut self.bodies, i, j);

                let response = respond_circle_polygon(polygon, circle, &config.collision)?;
                if !response.is_contact() {
                    continue;
                }
                self.events.push(CollisionEvent::CirclePolygon {
                    circle: *circle_handle,
                    polygon: *polygon_handle,
                });
                // Only a projectile moving into the polygon counts as a hit
                if response != CircleResponse::Approaching {
                    continue;
                }

                let Some(damage) = circle.damage.take() else {
                    continue;
                };
                let was_alive = !polygon.is_destroyed();
                if let Some(remaining) = polygon.take_damage(damage) {
                    self.events.push(CollisionEvent::Damaged {
                        polygon: *polygon_handle,
                        projectile: *circle_handle,
                        remaining,
                    });
                    if was_alive && polygon.is_destroyed() {
                        debug!("{:?} destroyed by {:?}", polygon_handle, circle_handle);
                        self.events.push(CollisionEvent::Destroyed {
                            polygon: *polygon_handle,
                        });
                    }
                }
                self.events.push(CollisionEvent::ProjectileSpent {
                    projectile: *circle_handle,
                });
                // A projectile hits at most one polygon
                break;
            }

            let (handle, circle) = &mut self.bodies[i];
            if circle.damage.is_some() && circle.speed() < config.projectile_min_speed {
                circle.damage = None;
                self.events
                    .push(CollisionEvent::ProjectileSpent { projectile: *handle });
            }
        }
        Ok(())
    }

    fn resolve_polygons(&mut self) -> Result<(), PhysicsError> {
        let config = self.config.collision;
        let n = self.bodies.len();

        for i in 0..n {
            if !self.bodies[i].1.is_polygon() {
                continue;
            }
            for j in (i + 1)..n {
                if !self.bodies[j].1.is_polygon() {
                    continue;
                }
                let ((handle_a, a), (handle_b, b)) = pair_mut(&mut self.bodies, i, j);
                if resolve_polygon_polygon(a, b, &config)? {
                    self.events.push(CollisionEvent::PolygonPolygon {
                        a: *handle_a,
                        b: *handle_b,
                    });
                }
            }
        }
        Ok(())
    }

    fn index_of(&self, handle: BodyHandle) -> Result<usize, PhysicsError> {
        self.bodies
            .iter()
            .position(|(h, _)| *h == handle)
            .ok_or(PhysicsError::UnknownBody(handle))
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Two distinct elements of a slice, mutably
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(i, j);
    if i < j {
        let (left, right) = items.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::body::{presets, BodyBuilder};
    use approx::assert_relative_eq;
    use std::f64::consts::SQRT_2;

    const DT: f64 = 1.0 / 60.0;

    fn square(x: f64, y: f64) -> BodyBuilder {
        BodyBuilder::polygon(4, 5.0 * SQRT_2)
            .rotation(45.0)
            .position(x, y)
    }

    #[test]
    fn test_world_creation() {
        let world = PhysicsWorld::new();
        assert!(world.is_empty());
        assert_eq!(world.step_count(), 0);
        assert_eq!(world.config(), &DEFAULT_WORLD_CONFIG);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = WorldConfig {
            collision: CollisionConfig::default().restitution(2.0),
            ..WorldConfig::default()
        };
        assert!(PhysicsWorld::with_config(config).is_err());

        let config = WorldConfig {
            projectile_min_speed: -1.0,
            ..WorldConfig::default()
        };
        assert!(PhysicsWorld::with_config(config).is_err());
    }

    #[test]
    fn test_handles_are_unique_and_stable() {
        let mut world = PhysicsWorld::new();
        let a = world.insert(square(0.0, 0.0).build().unwrap());
        let b = world.insert(square(100.0, 0.0).build().unwrap());
        world.remove(a).unwrap();
        let c = world.insert(square(200.0, 0.0).build().unwrap());

        assert_ne!(a, c);
        assert_ne!(b, c);
        assert!(world.get(a).is_none());
        assert_eq!(
            world.get(b).unwrap().transform.position,
            Vector2::new(100.0, 0.0)
        );
        assert_eq!(world.remove(a), Err(PhysicsError::UnknownBody(a)));

        // Order is insertion order with removed entries skipped
        let order: Vec<_> = world.iter().map(|(handle, _)| handle).collect();
        assert_eq!(order, vec![b, c]);
    }

    #[test]
    fn test_step_integrates_all_bodies() {
        let mut world = PhysicsWorld::new();
        let handle = world.insert(
            BodyBuilder::circle(1.0)
                .linvel(60.0, 0.0)
                .drag(0.0)
                .build()
                .unwrap(),
        );

        world.step(DT).unwrap();

        assert_relative_eq!(
            world.get(handle).unwrap().transform.position.x(),
            1.0,
            epsilon = 1e-12
        );
        assert_eq!(world.step_count(), 1);
    }

    #[test]
    fn test_negative_step_rejected_without_moving() {
        let mut world = PhysicsWorld::new();
        let handle = world.insert(BodyBuilder::circle(1.0).linvel(5.0, 0.0).build().unwrap());

        assert_eq!(world.step(-DT), Err(PhysicsError::InvalidTimeStep(-DT)));
        assert_eq!(
            world.get(handle).unwrap().transform.position,
            Vector2::ZERO
        );
        assert_eq!(world.step_count(), 0);
    }

    #[test]
    fn test_polygon_pairs_resolved() {
        let mut world = PhysicsWorld::new();
        let a = world.insert(square(0.0, 0.0).build().unwrap());
        let b = world.insert(square(5.0, 0.0).build().unwrap());
        let far = world.insert(square(500.0, 0.0).build().unwrap());

        let events = world.step(DT).unwrap().to_vec();

        assert_eq!(events, vec![CollisionEvent::PolygonPolygon { a, b }]);
        let gap = world.get(b).unwrap().transform.position.x()
            - world.get(a).unwrap().transform.position.x();
        assert_relative_eq!(gap, 10.0, epsilon = 1e-9);
        assert_eq!(
            world.get(far).unwrap().transform.position,
            Vector2::new(500.0, 0.0)
        );
    }

    #[test]
    fn test_pairs_resolved_sequentially_in_order() {
        // Three overlapping squares in a row: resolving (0,1) first pushes
        // the middle one into the third before (1,2) is checked
        let mut world = PhysicsWorld::new();
        let a = world.insert(square(0.0, 0.0).build().unwrap());
        let b = world.insert(square(8.0, 0.0).build().unwrap());
        let c = world.insert(square(16.0, 0.0).build().unwrap());

        let events = world.step(DT).unwrap().to_vec();

        assert_eq!(
            events,
            vec![
                CollisionEvent::PolygonPolygon { a, b },
                CollisionEvent::PolygonPolygon { a: b, b: c },
            ]
        );
        let x = |h| world.get(h).unwrap().transform.position.x();
        assert_relative_eq!(x(a), -1.0, epsilon = 1e-9);
        // (1,2) now overlaps by 3 instead of 2
        assert_relative_eq!(x(b), 7.5, epsilon = 1e-9);
        assert_relative_eq!(x(c), 17.5, epsilon = 1e-9);
    }

    #[test]
    fn test_player_pushed_by_polygon() {
        let mut world = PhysicsWorld::new();
        let shape = world.insert(presets::breakable_polygon(0.0, 0.0, 5, 50.0).unwrap());
        let player = world.insert(presets::player(70.0, 0.0).unwrap());

        let events = world.step(DT).unwrap().to_vec();

        assert_eq!(
            events,
            vec![CollisionEvent::CirclePolygon {
                circle: player,
                polygon: shape
            }]
        );
        assert!(world.get(player).unwrap().transform.position.x() > 70.0);
        // The player deals no damage
        assert_eq!(world.get(shape).unwrap().hitpoints, Some(125.0));
    }

    #[test]
    fn test_projectile_damages_and_destroys() {
        let mut world = PhysicsWorld::new();
        let shape = world.insert(presets::breakable_polygon(0.0, 0.0, 3, 40.0).unwrap());
        let bullet = world.insert(
            presets::projectile(Vector2::new(-40.0, 0.0), Vector2::new(1.0, 0.0), 600.0, 80.0)
                .unwrap(),
        );

        let events = world.step(DT).unwrap().to_vec();

        assert_eq!(
            events,
            vec![
                CollisionEvent::CirclePolygon {
                    circle: bullet,
                    polygon: shape
                },
                CollisionEvent::Damaged {
                    polygon: shape,
                    projectile: bullet,
                    remaining: -5.0
                },
                CollisionEvent::Destroyed { polygon: shape },
                CollisionEvent::ProjectileSpent { projectile: bullet },
            ]
        );
        assert_eq!(world.destroyed(), vec![shape]);
        assert_eq!(world.get(bullet).unwrap().damage, None);

        // A spent projectile deals no more damage
        world.step(DT).unwrap();
        assert_eq!(world.get(shape).unwrap().hitpoints, Some(-5.0));
    }

    #[test]
    fn test_projectile_hits_only_first_polygon() {
        let mut world = PhysicsWorld::new();
        let first = world.insert(presets::breakable_polygon(0.0, 0.0, 4, 20.0).unwrap());
        let second = world.insert(presets::breakable_polygon(0.0, 5.0, 4, 20.0).unwrap());
        world.insert(
            presets::projectile(Vector2::new(0.0, 0.0), Vector2::new(0.0, 1.0), 0.0, 25.0)
                .unwrap(),
        );

        world.step(0.0).unwrap();

        assert_eq!(world.get(first).unwrap().hitpoints, Some(75.0));
        assert_eq!(world.get(second).unwrap().hitpoints, Some(100.0));
    }

    #[test]
    fn test_receding_projectile_deals_no_damage() {
        let mut world = PhysicsWorld::new();
        let shape = world.insert(presets::breakable_polygon(0.0, 0.0, 4, 20.0).unwrap());
        let bullet = world.insert(
            presets::projectile(Vector2::new(30.0, 0.0), Vector2::new(1.0, 0.0), 600.0, 25.0)
                .unwrap(),
        );

        let events = world.step(0.0).unwrap().to_vec();

        assert_eq!(
            events,
            vec![CollisionEvent::CirclePolygon {
                circle: bullet,
                polygon: shape
            }]
        );
        assert_eq!(world.get(shape).unwrap().hitpoints, Some(100.0));
        assert_eq!(world.get(bullet).unwrap().damage, Some(25.0));
    }

    #[test]
    fn test_slow_projectile_is_spent() {
        let mut world = PhysicsWorld::new();
        let bullet = world.insert(
            presets::projectile(Vector2::ZERO, Vector2::new(1.0, 0.0), 1.0, 25.0).unwrap(),
        );

        let events = world.step(DT).unwrap().to_vec();

        assert_eq!(
            events,
            vec![CollisionEvent::ProjectileSpent { projectile: bullet }]
        );
        assert_eq!(world.get(bullet).unwrap().damage, None);
    }

    #[test]
    fn test_removing_spent_projectiles() {
        let mut world = PhysicsWorld::new();
        let shape = world.insert(presets::breakable_polygon(0.0, 0.0, 3, 40.0).unwrap());
        world.insert(
            presets::projectile(Vector2::new(-40.0, 0.0), Vector2::new(1.0, 0.0), 600.0, 25.0)
                .unwrap(),
        );

        let events = world.step(DT).unwrap().to_vec();
        for event in events {
            if let CollisionEvent::ProjectileSpent { projectile } = event {
                world.remove(projectile).unwrap();
            }
        }

        let order: Vec<_> = world.iter().map(|(handle, _)| handle).collect();
        assert_eq!(order, vec![shape]);

        // Nothing left to push the polygon around
        let velocity = world.get(shape).unwrap().physics.linear_velocity;
        world.step(0.0).unwrap();
        assert!(world.events().is_empty());
        assert_eq!(world.get(shape).unwrap().physics.linear_velocity, velocity);
    }

    #[test]
    fn test_retain_within_active_region() {
        let mut world = PhysicsWorld::new();
        let near = world.insert(square(100.0, -50.0).build().unwrap());
        let far_x = world.insert(square(2000.0, 0.0).build().unwrap());
        let far_y = world.insert(BodyBuilder::circle(5.0).position(0.0, -900.0).build().unwrap());

        let removed = world.retain_within(Vector2::ZERO, Vector2::new(1000.0, 800.0));

        assert_eq!(removed, vec![far_x, far_y]);
        assert_eq!(world.len(), 1);
        assert!(world.get(near).is_some());
    }

    #[test]
    fn test_pair_mut() {
        let mut items = [1, 2, 3, 4];
        let (a, b) = pair_mut(&mut items, 3, 1);
        std::mem::swap(a, b);
        assert_eq!(items, [1, 4, 3, 2]);
    }
}
