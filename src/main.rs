use anyhow::Result;
use log::info;

use polyclash::engine::physics::{presets, CollisionEvent, PhysicsWorld};
use polyclash::{BodyHandle, Vector2};

/// Fixed timestep of the headless demo (60 updates per second)
const FIXED_TIMESTEP: f64 = 1.0 / 60.0;

/// Number of steps simulated
const DEMO_STEPS: u64 = 240;

/// Bodies further than this from the player are dropped
const ACTIVE_REGION: Vector2 = Vector2::new(1000.0, 800.0);

const PROJECTILE_SPEED: f64 = 1500.0;
const FIRE_INTERVAL_STEPS: u64 = 30;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Starting polyclash demo...");

    let mut world = PhysicsWorld::new();
    let player = world.insert(presets::player(0.0, 0.0)?);

    // A ring of breakable shapes drifting toward the player
    for (i, point_count) in (3..=8).enumerate() {
        let angle = (i as f64 * 60.0).to_radians();
        let position = Vector2::new(angle.cos() * 250.0, angle.sin() * 250.0);
        let mut shape = presets::breakable_polygon(
            position.x(),
            position.y(),
            point_count,
            25.0 + i as f64 * 10.0,
        )?;
        shape.physics.linear_velocity = -position.normalized() * 400.0;
        shape.physics.angular_velocity = 30.0 * (i as f64 - 2.5);
        world.insert(shape);
    }
    info!("Spawned {} bodies", world.len());

    let mut destroyed = 0;
    for step in 0..DEMO_STEPS {
        if step % FIRE_INTERVAL_STEPS == 0 {
            fire_at_nearest(&mut world, player)?;
        }

        let events = world.step(FIXED_TIMESTEP)?.to_vec();
        for event in events {
            match event {
                CollisionEvent::Destroyed { polygon } => {
                    world.remove(polygon)?;
                    destroyed += 1;
                    info!("Step {}: shape {} destroyed", step, polygon.id());
                }
                CollisionEvent::ProjectileSpent { projectile } => {
                    world.remove(projectile)?;
                }
                _ => {}
            }
        }

        if let Some(center) = world.get(player).map(|p| p.transform.position) {
            world.retain_within(center, ACTIVE_REGION);
        }
    }

    if let Some(body) = world.get(player) {
        let (x, y) = body.transform.position.as_tuple();
        info!("Player finished at ({:.2}, {:.2})", x, y);
    }
    info!(
        "Simulated {} steps: {} shapes destroyed, {} bodies remaining",
        world.step_count(),
        destroyed,
        world.len()
    );

    Ok(())
}

/// Spawn a projectile from the player toward the closest polygon
fn fire_at_nearest(world: &mut PhysicsWorld, player: BodyHandle) -> Result<()> {
    let Some(origin) = world.get(player).map(|p| p.transform.position) else {
        return Ok(());
    };

    let target = world
        .iter()
        .filter(|(_, body)| body.is_polygon() && !body.is_destroyed())
        .map(|(_, body)| body.transform.position)
        .min_by(|a, b| {
            (*a - origin)
                .length_squared()
                .total_cmp(&(*b - origin).length_squared())
        });

    if let Some(target) = target {
        let projectile = presets::projectile(
            origin,
            target - origin,
            PROJECTILE_SPEED,
            presets::PROJECTILE_DAMAGE,
        )?;
        world.insert(projectile);
    }
    Ok(())
}
