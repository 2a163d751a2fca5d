//! Combined scene distance field
//!
//! The static course plus the two bodies, evaluated for one explicit frame
//! time. This is what the shading stage marches; physics only uses it to keep
//! the camera out of geometry.

use glam::{Mat3, Vec2, Vec3};

use super::animation::{Joint, LEGS, Pose};
use super::course::{
    bars_distance, beams_distance, boxes_distance, ground_distance, static_distance,
};
use super::sdf::{
    RENDER_NORMAL_EPS, gradient, sd_capsule, sd_round_cone, sd_sphere, sd_torus, smooth_min,
    twist,
};
use crate::consts::RENDER_EPS;
use crate::math::{rot_x, rot_y};

/// Ray march stops when the field drops below this
pub const MIN_DIST: f32 = 0.002;
pub const MAX_ITERATIONS: u32 = 120;
/// Ray march gives up past this distance
pub const RANGE: f32 = 500.0;

/// Camera field of view factors (x is scaled by the aspect ratio first)
pub const FOV: Vec2 = Vec2::new(0.4, 0.4);
const FOCAL: f32 = 0.6;

pub const BOULDER_RADIUS: f32 = 2.5;
/// Beyond this distance the grooves are ignored
const BOULDER_DETAIL_RANGE: f32 = 4.0;
const GROOVE_RADIUS: f32 = 2.0;
const GROOVE_THICKNESS: f32 = 0.2;
const GROOVE_TWIST: f32 = 0.2;

/// Beyond this distance the character is a plain sphere
const PLAYER_DETAIL_RANGE: f32 = 1.5;
const PLAYER_BOUND_RADIUS: f32 = 1.0;

/// Boulder placement for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoulderPose {
    pub position: Vec3,
    /// World to boulder-local rotation
    pub rotation: Mat3,
}

/// Character placement for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPose {
    pub position: Vec3,
    /// Body yaw
    pub facing: f32,
    /// Torso pitch
    pub lean: f32,
    pub pushing: bool,
    pub pose: Pose,
}

/// What a surface point belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneObject {
    Ground,
    Bar,
    Box,
    Beam,
    Boulder,
    Player,
}

/// Outcome of marching one ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayMarch {
    pub hit: bool,
    /// Last sample position
    pub position: Vec3,
    /// Distance travelled along the ray
    pub travelled: f32,
    pub steps: u32,
    /// Closest approach to the boulder's bounding sphere (drives its glow)
    pub boulder_glow: f32,
}

/// Boulder shape: a sphere with three twisted grooves cut into it
pub fn boulder_distance(p: Vec3, boulder: &BoulderPose) -> f32 {
    let offset = p - boulder.position;
    if offset.length() > BOULDER_DETAIL_RANGE {
        return sd_sphere(offset, BOULDER_RADIUS);
    }
    let q = boulder.rotation * offset;
    sd_sphere(q, BOULDER_RADIUS).max(-boulder_grooves(q))
}

fn boulder_grooves(q: Vec3) -> f32 {
    let ring = |p: Vec3| sd_torus(twist(p, GROOVE_TWIST), GROOVE_RADIUS, GROOVE_THICKNESS);
    ring(q)
        .min(ring(rot_y(q, 1.047)))
        .min(ring(rot_y(q, 2.094)))
}

fn player_head(p: Vec3, pose: &Pose) -> f32 {
    let p = p - pose.joint(Joint::Head);
    let head = sd_sphere(p - Vec3::new(0.0, 0.4, 0.0), 0.2);
    let nose = sd_sphere(p - Vec3::new(0.0, 0.37, 0.18), 0.08);
    let beard = sd_round_cone(p, Vec3::new(0.0, 0.25, 0.1), Vec3::new(0.0, 0.1, 0.05), 0.12, 0.08);
    smooth_min(smooth_min(head, nose, 0.1), beard, 0.08)
}

fn player_body(p: Vec3, pose: &Pose, pushing: bool) -> f32 {
    let chest = p + pose.joint(Joint::Chest);
    let torso = sd_round_cone(chest, Vec3::new(0.0, 0.15, 0.0), Vec3::new(0.0, -0.15, -0.1), 0.2, 0.12);

    // Arms reach forward and down while pushing
    let reach = if pushing { 0.15 } else { 0.0 };
    let arm = |side: f32| {
        sd_capsule(
            chest,
            Vec3::new(0.2 * side, 0.1, 0.0),
            Vec3::new(0.15 * side, 0.1 - reach, 0.2 + reach),
            0.05,
        )
    };
    torso.min(arm(1.0)).min(arm(-1.0))
}

fn player_legs(p: Vec3, pose: &Pose) -> f32 {
    const RADII: [f32; 3] = [0.04, 0.035, 0.03];
    LEGS.iter()
        .flat_map(|chain| {
            chain
                .windows(2)
                .zip(RADII)
                .map(|(bone, r)| sd_capsule(p, pose.joint(bone[0]), pose.joint(bone[1]), r))
        })
        .fold(f32::INFINITY, f32::min)
}

/// Character silhouette
///
/// Legs stay upright in the facing frame; head and body are pitched by the lean.
pub fn player_distance(p: Vec3, player: &PlayerPose) -> f32 {
    let q = p - player.position;
    if q.length() > PLAYER_DETAIL_RANGE {
        return sd_sphere(q, PLAYER_BOUND_RADIUS);
    }
    let q = rot_y(q, -player.facing);
    let body_p = rot_x(q, player.lean);

    player_head(body_p, &player.pose)
        .min(player_body(body_p, &player.pose, player.pushing))
        .min(player_legs(q, &player.pose))
}

/// View direction for a screen position
///
/// `screen` is in [-1, 1] on both axes with x already scaled by the aspect
/// ratio; `look` is (yaw, pitch).
pub fn camera_ray(screen: Vec2, look: Vec2) -> Vec3 {
    let dir = Vec3::new(screen.x * FOV.x, screen.y * FOV.y, FOCAL).normalize();
    rot_y(rot_x(dir, -look.y), look.x)
}

/// The full scene at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    pub time: f32,
    pub boulder: BoulderPose,
    pub player: PlayerPose,
}

impl Scene {
    pub fn distance(&self, p: Vec3) -> f32 {
        static_distance(p, self.time)
            .min(boulder_distance(p, &self.boulder))
            .min(player_distance(p, &self.player))
    }

    /// Shading normal
    pub fn normal(&self, p: Vec3) -> Vec3 {
        gradient(p, RENDER_NORMAL_EPS, |q| self.distance(q))
    }

    /// Ambient occlusion from five probes along the normal; 1 is fully open
    pub fn ambient_occlusion(&self, p: Vec3, normal: Vec3) -> f32 {
        let mut occlusion = 0.0;
        let mut scale = 1.0;
        for i in 0..5 {
            let h = 0.01 + 0.12 * i as f32 / 4.0;
            let d = self.distance(p + normal * h);
            occlusion += (h - d) * scale;
            scale *= 0.95;
        }
        (1.0 - 3.0 * occlusion).clamp(0.0, 1.0)
    }

    /// Sphere-trace from `origin` along unit `dir`
    pub fn raymarch(&self, origin: Vec3, dir: Vec3) -> RayMarch {
        let mut p = origin;
        let mut dist = self.distance(p);
        let mut travelled = dist;
        let mut glow = sd_sphere(p - self.boulder.position, BOULDER_RADIUS);
        let mut steps = 0;

        while steps < MAX_ITERATIONS && dist >= MIN_DIST && travelled <= RANGE {
            p += dir * dist;
            dist = self.distance(p);
            glow = glow.min(sd_sphere(p - self.boulder.position, BOULDER_RADIUS));
            travelled += dist;
            steps += 1;
        }

        RayMarch {
            hit: dist < MIN_DIST,
            position: p,
            travelled,
            steps,
            boulder_glow: glow,
        }
    }

    /// Classify a surface point, checked in shading order
    pub fn object_at(&self, p: Vec3) -> Option<SceneObject> {
        let time = self.time;
        let checks: [(SceneObject, &dyn Fn() -> f32); 6] = [
            (SceneObject::Ground, &|| ground_distance(p)),
            (SceneObject::Bar, &|| bars_distance(p, time)),
            (SceneObject::Box, &|| boxes_distance(p)),
            (SceneObject::Beam, &|| beams_distance(p)),
            (SceneObject::Boulder, &|| boulder_distance(p, &self.boulder)),
            (SceneObject::Player, &|| player_distance(p, &self.player)),
        ];
        checks
            .iter()
            .find(|(_, distance)| distance() < RENDER_EPS)
            .map(|(object, _)| *object)
    }
}
