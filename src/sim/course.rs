//! Obstacle tables and per-family distance fields
//!
//! One table per obstacle family. The shading field and the collision queries
//! both read these tables through the functions below, so what you see is
//! exactly what you collide with.

use glam::{Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use super::sdf::{sd_box, sd_capsule, sd_cylinder, subtract};
use super::terrain::terrain_height;
use crate::consts::SLOPE_ANGLE;
use crate::math::{rot_x, rot_y};

/// Crate-like box resting on the slope, tilted to match it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltedBox {
    pub x: f32,
    pub z: f32,
    pub half_extents: Vec3,
}

impl TiltedBox {
    /// Centre sits one half-height above the terrain
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.x, terrain_height(self.x, self.z) + self.half_extents.y, self.z)
    }

    pub fn distance(&self, p: Vec3) -> f32 {
        sd_box(rot_x(p - self.center(), SLOPE_ANGLE), self.half_extents)
    }
}

/// Low beam lying across the path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorBeam {
    pub x: f32,
    pub z: f32,
    pub half_width: f32,
}

impl FloorBeam {
    pub const HALF_HEIGHT: f32 = 0.15;
    pub const HALF_DEPTH: f32 = 0.3;

    pub fn center(&self) -> Vec3 {
        Vec3::new(self.x, terrain_height(self.x, self.z) + Self::HALF_HEIGHT, self.z)
    }

    pub fn distance(&self, p: Vec3) -> f32 {
        let half = Vec3::new(self.half_width, Self::HALF_HEIGHT, Self::HALF_DEPTH);
        sd_box(rot_x(p - self.center(), SLOPE_ANGLE), half)
    }
}

/// Bar sweeping around a central pole
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinningBar {
    pub z: f32,
    /// Angular speed (rad/s, sign gives direction)
    pub speed: f32,
    /// Angle at time zero
    pub phase: f32,
}

impl SpinningBar {
    /// Height of the bar above the terrain at its anchor
    pub const LIFT: f32 = 1.5;
    pub const HALF_LENGTH: f32 = 4.0;
    pub const ARM_RADIUS: f32 = 0.3;
    pub const POLE_HALF_HEIGHT: f32 = 3.0;
    pub const POLE_RADIUS: f32 = 0.2;

    pub fn anchor(&self) -> Vec3 {
        Vec3::new(0.0, terrain_height(0.0, self.z) + Self::LIFT, self.z)
    }

    /// Rotation about +Y at simulation time `time`
    #[inline]
    pub fn angle(&self, time: f32) -> f32 {
        time * self.speed + self.phase
    }

    /// Point in the bar's rotating frame
    fn local(&self, p: Vec3, time: f32) -> Vec3 {
        rot_y(p - self.anchor(), self.angle(time))
    }

    /// Distance to the sweeping arm only
    pub fn arm_distance(&self, p: Vec3, time: f32) -> f32 {
        let q = self.local(p, time);
        sd_capsule(
            q,
            Vec3::new(-Self::HALF_LENGTH, 0.0, 0.0),
            Vec3::new(Self::HALF_LENGTH, 0.0, 0.0),
            Self::ARM_RADIUS,
        )
    }

    /// Distance to arm and pole
    pub fn distance(&self, p: Vec3, time: f32) -> f32 {
        let q = self.local(p, time);
        let arm = sd_capsule(
            q,
            Vec3::new(-Self::HALF_LENGTH, 0.0, 0.0),
            Vec3::new(Self::HALF_LENGTH, 0.0, 0.0),
            Self::ARM_RADIUS,
        );
        arm.min(sd_cylinder(q, Self::POLE_HALF_HEIGHT, Self::POLE_RADIUS))
    }
}

/// Round hole in the ground
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pit {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
}

impl Pit {
    pub const DEPTH: f32 = 5.0;

    pub fn floor_y(&self) -> f32 {
        terrain_height(self.x, self.z) - Self::DEPTH
    }

    /// Horizontal distance from the pit axis
    #[inline]
    pub fn horizontal_distance(&self, x: f32, z: f32) -> f32 {
        Vec2::new(x - self.x, z - self.z).length()
    }

    /// Distance to the pit volume; +inf above the rim band
    pub fn distance(&self, p: Vec3) -> f32 {
        let floor = self.floor_y();
        if p.y >= floor + Self::DEPTH {
            return f32::INFINITY;
        }
        (self.horizontal_distance(p.x, p.z) - self.radius).max(-(p.y - floor))
    }
}

pub static BOXES: [TiltedBox; 10] = [
    TiltedBox { x: -3.0, z: 15.0, half_extents: Vec3::new(1.0, 1.0, 1.0) },
    TiltedBox { x: 2.5, z: 25.0, half_extents: Vec3::new(0.75, 0.75, 0.75) },
    TiltedBox { x: -1.5, z: 40.0, half_extents: Vec3::new(1.2, 1.2, 0.8) },
    TiltedBox { x: 3.5, z: 55.0, half_extents: Vec3::new(0.9, 0.9, 1.1) },
    TiltedBox { x: -4.0, z: 70.0, half_extents: Vec3::new(1.5, 1.5, 1.0) },
    TiltedBox { x: 1.0, z: 85.0, half_extents: Vec3::new(0.8, 0.8, 0.8) },
    TiltedBox { x: -2.5, z: 100.0, half_extents: Vec3::new(1.1, 1.1, 0.9) },
    TiltedBox { x: 4.0, z: 115.0, half_extents: Vec3::new(1.3, 1.0, 1.2) },
    TiltedBox { x: 0.5, z: 130.0, half_extents: Vec3::new(0.7, 0.7, 0.7) },
    TiltedBox { x: -3.5, z: 140.0, half_extents: Vec3::new(1.0, 1.0, 1.0) },
];

pub static BEAMS: [FloorBeam; 8] = [
    FloorBeam { x: 0.0, z: 10.0, half_width: 4.0 },
    FloorBeam { x: -1.0, z: 35.0, half_width: 3.5 },
    FloorBeam { x: 1.5, z: 52.0, half_width: 3.0 },
    FloorBeam { x: 0.0, z: 68.0, half_width: 4.5 },
    FloorBeam { x: -0.5, z: 82.0, half_width: 3.5 },
    FloorBeam { x: 0.5, z: 98.0, half_width: 4.0 },
    FloorBeam { x: -1.0, z: 112.0, half_width: 3.0 },
    FloorBeam { x: 0.0, z: 125.0, half_width: 5.0 },
];

pub static BARS: [SpinningBar; 4] = [
    SpinningBar { z: 30.0, speed: 1.5, phase: 0.0 },
    SpinningBar { z: 60.0, speed: -2.0, phase: 0.0 },
    SpinningBar { z: 90.0, speed: 1.2, phase: FRAC_PI_2 },
    SpinningBar { z: 120.0, speed: -1.8, phase: FRAC_PI_4 },
];

pub static PITS: [Pit; 3] = [
    Pit { x: 2.5, z: 45.0, radius: 3.0 },
    Pit { x: -2.0, z: 75.0, radius: 2.5 },
    Pit { x: 1.5, z: 105.0, radius: 2.0 },
];

pub fn boxes_distance(p: Vec3) -> f32 {
    BOXES.iter().map(|b| b.distance(p)).fold(f32::INFINITY, f32::min)
}

pub fn beams_distance(p: Vec3) -> f32 {
    BEAMS.iter().map(|b| b.distance(p)).fold(f32::INFINITY, f32::min)
}

/// Arms and poles of every bar at simulation time `time`
pub fn bars_distance(p: Vec3, time: f32) -> f32 {
    BARS.iter().map(|b| b.distance(p, time)).fold(f32::INFINITY, f32::min)
}

pub fn pits_distance(p: Vec3) -> f32 {
    PITS.iter().map(|pit| pit.distance(p)).fold(f32::INFINITY, f32::min)
}

/// Height-field ground with the pits carved out
pub fn ground_distance(p: Vec3) -> f32 {
    subtract(p.y - terrain_height(p.x, p.z), pits_distance(p))
}

/// Everything that does not move on its own: ground, bars, boxes, beams
pub fn static_distance(p: Vec3, time: f32) -> f32 {
    ground_distance(p)
        .min(bars_distance(p, time))
        .min(boxes_distance(p))
        .min(beams_distance(p))
}
