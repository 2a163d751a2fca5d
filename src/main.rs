//! Sisyphus headless driver
//!
//! Runs the simulation with a scripted player that keeps walking into the
//! boulder for a fixed stretch of game time and logs what happens. Usage: `sisyphus [tuning.json] [seed]`.

use glam::Vec2;

use sisyphus::{Tuning, normalize_angle};
use sisyphus::sim::scene::camera_ray;
use sisyphus::sim::{FrameClock, GameEvent, Keys, TickInput, World, start, tick};
use sisyphus::uniforms::{SceneUniforms, UniformTable, declare_uniforms, write_uniforms};

/// Simulated seconds
const RUN_SECONDS: f64 = 30.0;
const FRAME_RATE: f64 = 60.0;
/// Fraction of the aiming error the script turns away per frame
const STEER: f32 = 0.2;

fn main() {
    env_logger::init();
    log::info!("Sisyphus (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    });

    let mut world = World::new(seed, tuning);
    log::info!("World created with seed: {}", seed);
    start(&mut world);

    let mut uniforms = UniformTable::new();
    declare_uniforms(&mut uniforms);

    let mut clock = FrameClock::new();
    let frames = (RUN_SECONDS * FRAME_RATE) as u32;
    for i in 0..frames {
        let frame = clock.advance(i as f64 / FRAME_RATE);
        let input = scripted_input(&world);
        tick(&mut world, &input, frame);
        write_uniforms(&world, &mut uniforms);

        for event in world.drain_events() {
            match event {
                GameEvent::Failure(failure) => log::warn!("{failure}"),
                GameEvent::Message { text, .. } => log::info!("{text}"),
                GameEvent::Victory => log::info!("Summit reached"),
            }
        }
        if i % FRAME_RATE as u32 == 0 {
            log::info!("t={:.1}s {}", frame.time, world.progress());
        }
    }

    // One centre-screen ray from the final camera
    let scene = world.scene();
    let march = scene.raymarch(world.player.camera, camera_ray(Vec2::ZERO, world.player.look));
    let object = march.hit.then(|| scene.object_at(march.position)).flatten();
    log::info!(
        "Centre ray: {:?} after {:.1} units ({} steps)",
        object,
        march.travelled,
        march.steps
    );
    log::debug!("Uniform block: {} bytes", SceneUniforms::from_world(&world).as_bytes().len());

    println!("{}", world.progress());
}

/// Walk uphill behind the boulder, turning the view onto it a little each frame
fn scripted_input(world: &World) -> TickInput {
    let player = &world.player;
    let to_boulder = world.boulder.position - player.position;
    let target = to_boulder.x.atan2(to_boulder.z);
    let error = normalize_angle(target - player.look.x);
    TickInput {
        held: Keys {
            forward: true,
            ..Default::default()
        },
        look: Vec2::new(error * STEER * player.tuning.look_sensitivity, 0.0),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_script_turns_toward_the_boulder() {
        let mut world = World::new(1, Tuning::default());
        start(&mut world);

        world.boulder.position = world.player.position + Vec3::new(3.0, 0.0, 3.0);
        let right = scripted_input(&world);
        assert!(right.look.x > 0.0);
        assert!(right.held.forward);

        world.boulder.position = world.player.position + Vec3::new(-3.0, 0.0, 3.0);
        assert!(scripted_input(&world).look.x < 0.0);

        world.boulder.position = world.player.position + Vec3::new(0.0, 0.0, 3.0);
        assert_eq!(scripted_input(&world).look.x, 0.0);
    }
}
