//! Collision queries shared by the boulder and the player
//!
//! Bodies never ask the combined scene field about their own collisions, only
//! the obstacle family they are resolving against. Everything here reads the
//! tables in [`super::course`], the same ones the shading field uses.

use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

use super::course::{BARS, PITS, Pit};
use super::sdf::check_sdf_collision;
use crate::math::rot_y;

/// Arm distance under which a bar knocks a body away (wider than the arm itself)
pub const BAR_HIT_RADIUS: f32 = 1.0;
/// Knockback magnitude per unit of bar angular speed
pub const BAR_KNOCKBACK_SCALE: f32 = 15.0;
/// Vertical component of every knockback
pub const BAR_KNOCKBACK_LIFT: f32 = 10.0;

/// Knockback from the first bar whose arm is within [`BAR_HIT_RADIUS`] of `p`
///
/// The horizontal part is tangent to the sweep, scaled by the bar's speed (so
/// its sign follows the spin direction).
pub fn bar_knockback(p: Vec3, time: f32) -> Option<Vec3> {
    BARS.iter()
        .find(|bar| bar.arm_distance(p, time) < BAR_HIT_RADIUS)
        .map(|bar| {
            let tangent = rot_y(Vec3::Z, bar.angle(time) + FRAC_PI_2);
            let mut force = tangent * bar.speed * BAR_KNOCKBACK_SCALE;
            force.y = BAR_KNOCKBACK_LIFT;
            force
        })
}

/// Whether (x, z) lies over the mouth of any pit
pub fn over_pit(x: f32, z: f32) -> bool {
    PITS.iter().any(|pit| pit.horizontal_distance(x, z) < pit.radius)
}

/// First pit close enough to pull a body at (x, z) toward its axis
pub fn pit_capturing(x: f32, z: f32) -> Option<&'static Pit> {
    PITS.iter().find(|pit| pit.horizontal_distance(x, z) < pit.radius * 1.5)
}

/// Result of pushing a sphere out of a distance field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushOut {
    /// Corrected centre
    pub position: Vec3,
    /// Surface normal at the original centre
    pub normal: Vec3,
}

/// Push a sphere of `radius` at `pos` out of `field` along its gradient
///
/// Moves by the overlap plus `margin`. Returns `None` when there is no overlap.
pub fn push_out<F>(pos: Vec3, radius: f32, eps: f32, margin: f32, field: F) -> Option<PushOut>
where
    F: Fn(Vec3) -> f32,
{
    let hit = check_sdf_collision(pos, radius, eps, field);
    if !hit.hit {
        return None;
    }
    Some(PushOut {
        position: pos + hit.normal * (hit.penetration + margin),
        normal: hit.normal,
    })
}

/// Remove the part of `vel` heading into a surface, scaled by `restitution`
///
/// `restitution` 1.0 stops the body against the surface, larger values bounce.
#[inline]
pub fn cancel_inward(vel: Vec3, normal: Vec3, restitution: f32) -> Vec3 {
    let into = vel.dot(normal);
    if into < 0.0 {
        vel + normal * (-into * restitution)
    } else {
        vel
    }
}

/// Keep a sphere at `pos` at least `min_dist` from `center`
///
/// Inward velocity is cancelled. Coincident centres (closer than 0.01) are left
/// alone since there is no usable direction.
pub fn separate_spheres(pos: Vec3, vel: Vec3, center: Vec3, min_dist: f32) -> Option<(Vec3, Vec3)> {
    let offset = pos - center;
    let dist = offset.length();
    if dist >= min_dist || dist <= 0.01 {
        return None;
    }
    let dir = offset / dist;
    Some((pos + dir * (min_dist - dist), cancel_inward(vel, dir, 1.0)))
}

/// Soft side boundary of the path: clamp x and reflect vx with `bounce`
pub fn clamp_lateral(pos: &mut Vec3, vel: &mut Vec3, half_width: f32, bounce: f32) -> bool {
    if pos.x.abs() <= half_width {
        return false;
    }
    pos.x = pos.x.signum() * half_width;
    vel.x *= bounce;
    true
}
