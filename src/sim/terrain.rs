//! Mountain height field
//!
//! The ground surface, every obstacle anchor, and every "on ground" physics
//! test read this one function.

use crate::consts::{SLOPE, TERRAIN_FLOOR};
use crate::math::smoothstep;

/// A strip of the slope with small sinusoidal bumps
struct BumpZone {
    /// Where the zone starts/ends (fade happens over the first/last 2 units)
    z_start: f32,
    z_end: f32,
    x_freq: f32,
    x_phase: f32,
    z_freq: f32,
    amplitude: f32,
}

/// Bumps only apply within this lateral distance of the path centre
const BUMP_HALF_WIDTH: f32 = 5.0;
const BUMP_FADE: f32 = 2.0;

const BUMP_ZONES: [BumpZone; 3] = [
    BumpZone { z_start: 18.0, z_end: 30.0, x_freq: 3.0, x_phase: 0.0, z_freq: 3.0, amplitude: 0.15 },
    BumpZone { z_start: 48.0, z_end: 60.0, x_freq: 4.0, x_phase: 1.0, z_freq: 4.0, amplitude: 0.2 },
    BumpZone { z_start: 93.0, z_end: 105.0, x_freq: 5.0, x_phase: 2.0, z_freq: 5.0, amplitude: 0.18 },
];

/// Height perturbation from the bump zones at (x, z)
pub fn bump_height(x: f32, z: f32) -> f32 {
    if x.abs() >= BUMP_HALF_WIDTH {
        return 0.0;
    }
    BUMP_ZONES
        .iter()
        .filter(|zone| z > zone.z_start && z < zone.z_end)
        .map(|zone| {
            let fade = smoothstep(zone.z_start, zone.z_start + BUMP_FADE, z)
                * smoothstep(zone.z_end, zone.z_end - BUMP_FADE, z);
            (x * zone.x_freq + zone.x_phase).sin() * (z * zone.z_freq).sin() * zone.amplitude * fade
        })
        .sum()
}

/// Ground height at (x, z)
///
/// Linear slope plus two sine undulations and the bump zones, never below
/// [`TERRAIN_FLOOR`].
pub fn terrain_height(x: f32, z: f32) -> f32 {
    let base = z * SLOPE;
    let wave = (x * 0.1).sin() * 2.0 + (z * 0.05).sin() * 3.0;
    (base + wave + bump_height(x, z)).max(TERRAIN_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_terrain_rises_with_z() {
        assert!(terrain_height(0.0, 100.0) > terrain_height(0.0, 10.0));
    }

    #[test]
    fn test_terrain_floor_clamp() {
        assert_eq!(terrain_height(0.0, -100.0), TERRAIN_FLOOR);
    }

    #[test]
    fn test_bumps_only_inside_zones() {
        assert_eq!(bump_height(0.3, 10.0), 0.0);
        assert_eq!(bump_height(6.0, 24.0), 0.0);
        // Edges of a zone are faded to nothing
        assert!(bump_height(1.0, 18.1).abs() < 1e-3);
        let inside = (0..100).map(|i| bump_height(0.5, 21.0 + i as f32 * 0.05).abs()).fold(0.0, f32::max);
        assert!(inside > 0.05);
    }

    #[test]
    fn test_bump_zone_amplitude_bound() {
        for i in 0..2000 {
            let z = i as f32 * 0.06;
            assert!(bump_height(0.7, z).abs() <= 0.2 + 1e-6);
        }
    }

    #[test]
    fn test_physics_and_shading_share_the_ground() {
        use crate::sim::animation::frames;
        use crate::sim::course::{PITS, bars_distance, beams_distance, boxes_distance, ground_distance};
        use crate::sim::scene::{BoulderPose, PlayerPose, Scene, SceneObject};
        use glam::{Mat3, Vec3};
        use rand::{Rng, SeedableRng};
        use rand_pcg::Pcg32;

        let parked = Vec3::new(0.0, 1000.0, 0.0);
        let mut scene = Scene {
            time: 0.0,
            boulder: BoulderPose { position: parked, rotation: Mat3::IDENTITY },
            player: PlayerPose { position: parked, facing: 0.0, lean: 0.0, pushing: false, pose: frames::IDLE },
        };

        let mut rng = Pcg32::seed_from_u64(42);
        let mut checked = 0;
        for i in 0..10_000 {
            let x = rng.random_range(-5.5f32..5.5);
            let z = rng.random_range(-20.0f32..150.0);
            scene.time = i as f32 * 0.01;
            let p = Vec3::new(x, terrain_height(x, z), z);

            // Stay clear of pit mouths and obstacles, where the ground is not the nearest surface
            let near_pit = PITS.iter().any(|pit| pit.horizontal_distance(x, z) < pit.radius + 1.0);
            let near_obstacle = boxes_distance(p).min(beams_distance(p)).min(bars_distance(p, scene.time)) < 0.5;
            if near_pit || near_obstacle {
                continue;
            }

            assert!(ground_distance(p).abs() < 1e-4, "ground off the terrain at ({x}, {z})");
            assert!(scene.distance(p).abs() < 1e-4, "scene off the terrain at ({x}, {z})");
            assert_eq!(scene.object_at(p), Some(SceneObject::Ground));
            checked += 1;
        }
        assert!(checked > 7_000, "only {checked} samples were clear of obstacles");
    }

    proptest! {
        #[test]
        fn terrain_is_deterministic(x in -20.0f32..20.0, z in -20.0f32..200.0) {
            prop_assert_eq!(terrain_height(x, z).to_bits(), terrain_height(x, z).to_bits());
            prop_assert!(terrain_height(x, z) >= TERRAIN_FLOOR);
        }
    }
}
