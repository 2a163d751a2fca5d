//! Rotation and interpolation helpers
//!
//! Rotations follow the right-handed convention used by the shading stage so
//! a point rotated here lands where the renderer expects it.

use glam::{Mat3, Vec3};

/// Rotate a point about the X axis
#[inline]
pub fn rot_x(v: Vec3, a: f32) -> Vec3 {
    let (s, c) = a.sin_cos();
    Vec3::new(v.x, v.y * c - v.z * s, v.y * s + v.z * c)
}

/// Rotate a point about the Y axis
#[inline]
pub fn rot_y(v: Vec3, a: f32) -> Vec3 {
    let (s, c) = a.sin_cos();
    Vec3::new(v.x * c + v.z * s, v.y, -v.x * s + v.z * c)
}

/// Rotate a point about the Z axis
#[inline]
pub fn rot_z(v: Vec3, a: f32) -> Vec3 {
    let (s, c) = a.sin_cos();
    Vec3::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z)
}

/// Rotation matrix for `angle` radians about unit `axis`
pub fn rot_axis_mat(angle: f32, axis: Vec3) -> Mat3 {
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    let u = axis;
    // Rows written out, then transposed into glam's column layout
    Mat3::from_cols(
        Vec3::new(c + u.x * u.x * t, u.y * u.x * t + u.z * s, u.z * u.x * t - u.y * s),
        Vec3::new(u.x * u.y * t - u.z * s, c + u.y * u.y * t, u.z * u.y * t + u.x * s),
        Vec3::new(u.x * u.z * t + u.y * s, u.y * u.z * t - u.x * s, c + u.z * u.z * t),
    )
}

/// Look direction for a yaw/pitch pair (yaw 0, pitch 0 looks down +Z)
#[inline]
pub fn dir_from_angle(yaw: f32, pitch: f32) -> Vec3 {
    rot_y(rot_x(Vec3::Z, -pitch), yaw)
}

#[inline]
pub fn lerp(a: f32, b: f32, w: f32) -> f32 {
    a + (b - a) * w
}

/// Sine-shaped ease from 0 to 1
#[inline]
pub fn sin_ease(w: f32) -> f32 {
    (std::f32::consts::PI * (w - 0.5)).sin() / 2.0 + 0.5
}

/// Linear interpolation with a sine-eased weight
#[inline]
pub fn sin_lerp(a: Vec3, b: Vec3, w: f32) -> Vec3 {
    a.lerp(b, sin_ease(w))
}

/// Hermite smoothstep; `edge0 > edge1` gives the falling edge
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Sign that returns 0 for 0 (f32::signum does not)
#[inline]
pub fn glsl_sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
