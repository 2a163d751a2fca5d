//! Signed distance primitives and the gradient estimator
//!
//! Every primitive here is an exact Euclidean SDF (negative inside, zero on the
//! surface) so both the raymarcher and the collision probes can trust the
//! magnitude, not just the sign.

use glam::{Vec2, Vec3};

use crate::math::glsl_sign;

/// Probe epsilon for render-side normals
pub const RENDER_NORMAL_EPS: f32 = 0.01;

/// Signed distance to a sphere centred at the origin
#[inline]
pub fn sd_sphere(p: Vec3, radius: f32) -> f32 {
    p.length() - radius
}

/// Signed distance to an axis-aligned box with half extents `b`
#[inline]
pub fn sd_box(p: Vec3, b: Vec3) -> f32 {
    let q = p.abs() - b;
    q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
}

/// Signed distance to a capsule from `a` to `b`
pub fn sd_capsule(p: Vec3, a: Vec3, b: Vec3, radius: f32) -> f32 {
    let pa = p - a;
    let ba = b - a;
    let len_sq = ba.length_squared();
    let h = if len_sq > 1e-12 {
        (pa.dot(ba) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (pa - ba * h).length() - radius
}

/// Signed distance to a vertical cylinder (half height `h`, radius `r`)
pub fn sd_cylinder(p: Vec3, h: f32, r: f32) -> f32 {
    let d = Vec2::new(Vec2::new(p.x, p.z).length(), p.y).abs() - Vec2::new(r, h);
    d.x.max(d.y).min(0.0) + d.max(Vec2::ZERO).length()
}

/// Signed distance to a torus lying in the XZ plane
#[inline]
pub fn sd_torus(p: Vec3, major: f32, minor: f32) -> f32 {
    let q = Vec2::new(Vec2::new(p.x, p.z).length() - major, p.y);
    q.length() - minor
}

/// Signed distance to a cone between spheres of radius `r1` at `a` and `r2` at `b`
pub fn sd_round_cone(p: Vec3, a: Vec3, b: Vec3, r1: f32, r2: f32) -> f32 {
    let ba = b - a;
    let l2 = ba.dot(ba);
    let rr = r1 - r2;
    let a2 = l2 - rr * rr;
    let il2 = 1.0 / l2;

    let pa = p - a;
    let y = pa.dot(ba);
    let z = y - l2;
    let x2 = (pa * l2 - ba * y).length_squared();
    let y2 = y * y * l2;
    let z2 = z * z * l2;

    let k = glsl_sign(rr) * rr * rr * x2;
    if glsl_sign(z) * a2 * z2 > k {
        return (x2 + z2).sqrt() * il2 - r2;
    }
    if glsl_sign(y) * a2 * y2 < k {
        return (x2 + y2).sqrt() * il2 - r1;
    }
    ((x2 * a2 * il2).sqrt() + y * rr) * il2 - r1
}

/// Rounded union of two distances with blend radius `k` (quadratic kernel)
///
/// Only for organic shapes; collision families use a hard `min`.
#[inline]
pub fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.min(b) - h * h * k * 0.25
}

/// Carve `b` out of `a`
#[inline]
pub fn subtract(a: f32, b: f32) -> f32 {
    a.max(-b)
}

/// Twist space around the Y axis; the rotated XZ pair lands in x/y and y moves to z
#[inline]
pub fn twist(p: Vec3, k: f32) -> Vec3 {
    let (s, c) = (k * p.y).sin_cos();
    Vec3::new(c * p.x + s * p.z, -s * p.x + c * p.z, p.y)
}

/// Bend space in the XY plane as x grows
#[inline]
pub fn bend(p: Vec3, k: f32) -> Vec3 {
    let (s, c) = (k * p.x).sin_cos();
    Vec3::new(c * p.x + s * p.y, -s * p.x + c * p.y, p.z)
}

/// Compute SDF gradient (surface normal) using central differences
///
/// Falls back to +Y when the field is flat or not finite around `p`, so callers
/// never see NaN.
pub fn gradient<F>(p: Vec3, eps: f32, sdf: F) -> Vec3
where
    F: Fn(Vec3) -> f32,
{
    let dx = sdf(p + Vec3::new(eps, 0.0, 0.0)) - sdf(p - Vec3::new(eps, 0.0, 0.0));
    let dy = sdf(p + Vec3::new(0.0, eps, 0.0)) - sdf(p - Vec3::new(0.0, eps, 0.0));
    let dz = sdf(p + Vec3::new(0.0, 0.0, eps)) - sdf(p - Vec3::new(0.0, 0.0, eps));
    let g = Vec3::new(dx, dy, dz);
    if !g.is_finite() {
        return Vec3::Y;
    }
    let n = g.normalize_or_zero();
    if n == Vec3::ZERO { Vec3::Y } else { n }
}

/// Result of SDF collision check
#[derive(Debug, Clone)]
pub struct SdfCollision {
    pub hit: bool,
    pub distance: f32,
    pub normal: Vec3,
    pub penetration: f32,
}

impl SdfCollision {
    pub fn miss() -> Self {
        Self {
            hit: false,
            distance: f32::MAX,
            normal: Vec3::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between a sphere at `pos` and an SDF shape
pub fn check_sdf_collision<F>(pos: Vec3, radius: f32, eps: f32, sdf: F) -> SdfCollision
where
    F: Fn(Vec3) -> f32,
{
    let dist = sdf(pos);

    if dist < radius {
        let normal = gradient(pos, eps, &sdf);
        SdfCollision {
            hit: true,
            distance: dist,
            normal,
            penetration: radius - dist,
        }
    } else {
        SdfCollision::miss()
    }
}
