//! Sisyphus - push the boulder up the mountain
//!
//! Core modules:
//! - `sim`: Distance-field scene and physics (terrain, obstacles, bodies, game rules)
//! - `math`: Rotation and interpolation helpers on top of glam
//! - `tuning`: Data-driven physics constants per body
//! - `uniforms`: Render-facing uniform output

pub mod math;
pub mod sim;
pub mod tuning;
pub mod uniforms;

pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the simulation accepts (seconds)
    pub const MAX_FRAME_DT: f32 = 1.0 / 20.0;
    /// Delta used for the very first frame
    pub const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    /// Mountain slope (rise per unit of z)
    pub const SLOPE: f32 = 0.3;
    /// atan(SLOPE), the tilt applied to boxes and beams
    pub const SLOPE_ANGLE: f32 = 0.291_456_8;
    /// Lowest the terrain ever goes
    pub const TERRAIN_FLOOR: f32 = -5.0;

    /// Where the player spawns on start/reset
    pub const PLAYER_START_Z: f32 = -10.0;
    /// Where the boulder is put back after a failure
    pub const BOULDER_RESTART_Z: f32 = -5.0;
    /// Boulder z at which the run is won (inclusive)
    pub const VICTORY_Z: f32 = 150.0;
    /// Seconds the victory is shown before everything rolls back
    pub const VICTORY_HOLD: f32 = 4.0;

    /// Surface threshold for render-side hit classification
    pub const RENDER_EPS: f32 = 0.01;
}

/// Normalize angle to (-π, π]
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    PI - (PI - angle).rem_euclid(TAU)
}

/// Interpolate between two angles along the shortest arc
///
/// The difference is wrapped into (-π, π] first, so `lerp_angle(0.1, TAU - 0.1, 0.5)`
/// passes through zero instead of sweeping past π.
#[inline]
pub fn lerp_angle(a: f32, b: f32, w: f32) -> f32 {
    a + normalize_angle(b - a) * w
}
