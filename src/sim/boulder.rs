//! The boulder
//!
//! Rolls down the slope unless pushed. Grounded iff its centre is within
//! `ground_tolerance` of resting height; pushed iff the accumulated push force
//! exceeds `push_threshold`.

use glam::{Mat3, Vec2, Vec3};
use rand::Rng;

use super::collision::{bar_knockback, cancel_inward, clamp_lateral, push_out};
use super::course::{PITS, beams_distance, boxes_distance};
use super::scene::BoulderPose;
use super::state::{EventSink, Failure, FrameContext};
use super::terrain::terrain_height;
use crate::consts::SLOPE;
use crate::math::rot_axis_mat;
use crate::tuning::BoulderTuning;

#[derive(Debug, Clone)]
pub struct Boulder {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Accumulated rolling rotation
    pub rotation: Mat3,
    pub spin_axis: Vec3,
    /// Angular speed about `spin_axis` (rad/s)
    pub spin_speed: f32,
    pub push_force: Vec3,
    /// Furthest z reached since the last reset
    pub max_z: f32,
    pub tuning: BoulderTuning,
}

impl Boulder {
    pub fn new(tuning: BoulderTuning) -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 0.0),
            velocity: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
            spin_axis: Vec3::Z,
            spin_speed: 0.0,
            push_force: Vec3::ZERO,
            max_z: 0.0,
            tuning,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.tuning.radius
    }

    pub fn is_pushed(&self) -> bool {
        self.push_force.length() > self.tuning.push_threshold
    }

    /// Resting centre height at the current (x, z)
    fn ground_y(&self) -> f32 {
        terrain_height(self.position.x, self.position.z) + self.tuning.radius
    }

    pub fn is_grounded(&self) -> bool {
        self.position.y <= self.ground_y() + self.tuning.ground_tolerance
    }

    pub fn pose(&self) -> BoulderPose {
        BoulderPose {
            position: self.position,
            rotation: self.rotation,
        }
    }

    /// Accumulate push force; it decays once applied
    pub fn apply_push(&mut self, force: Vec3) {
        self.push_force += force;
    }

    /// Put the boulder just above the slope at `z` (plus a short run-up)
    pub fn reset(&mut self, z: f32) {
        self.position = Vec3::new(0.0, terrain_height(0.0, z) + self.tuning.radius + 1.0, z + 3.0);
        self.velocity = Vec3::ZERO;
        self.rotation = Mat3::IDENTITY;
        self.spin_speed = 0.0;
        self.max_z = z;
        self.push_force = Vec3::ZERO;
    }

    /// Advance one frame
    pub fn update<R, S>(&mut self, frame: &FrameContext, rng: &mut R, events: &mut S)
    where
        R: Rng,
        S: EventSink + ?Sized,
    {
        let dt = frame.dt;
        let pushed = self.is_pushed();

        if pushed {
            self.velocity += self.push_force * dt;
            self.push_force *= self.tuning.push_decay;
        }

        self.apply_bars(frame.time);
        self.apply_pits(dt, events);
        self.resolve_ground(dt, pushed, rng);

        self.velocity *= self.tuning.air_friction;
        self.position += self.velocity * dt;

        self.resolve_boxes();
        self.resolve_beams();

        let (half_width, bounce) = (self.tuning.path_half_width, self.tuning.wall_bounce);
        clamp_lateral(&mut self.position, &mut self.velocity, half_width, bounce);

        if self.position.z < self.tuning.min_z {
            self.position.z = self.tuning.min_z;
            self.velocity.z = 0.0;
        }

        if self.spin_axis != Vec3::ZERO {
            self.rotation = rot_axis_mat(self.spin_speed * dt, self.spin_axis) * self.rotation;
        }

        self.max_z = self.max_z.max(self.position.z);
        if self.position.z < self.max_z - self.tuning.escape_drop && self.max_z > self.tuning.escape_after {
            events.report_failure(Failure::BoulderEscaped);
        }
    }

    fn apply_bars(&mut self, time: f32) {
        if let Some(force) = bar_knockback(self.position, time) {
            self.velocity += force * self.tuning.knockback_scale;
            self.velocity.y += self.tuning.knockback_lift;
        }
    }

    /// Pull toward nearby pit centres; falling past half the radius is fatal
    fn apply_pits<S: EventSink + ?Sized>(&mut self, dt: f32, events: &mut S) {
        let size = self.tuning.radius;
        for pit in &PITS {
            let offset = Vec2::new(self.position.x - pit.x, self.position.z - pit.z);
            let dist = offset.length();
            if dist >= pit.radius + size * 0.5 {
                continue;
            }

            if dist > f32::EPSILON {
                let pull = self.tuning.pit_pull * (1.0 - dist / (pit.radius + size));
                let dir = offset / dist;
                self.velocity.x -= dir.x * pull * dt;
                self.velocity.z -= dir.y * pull * dt;
            }

            if dist < pit.radius * 0.5 {
                events.report_failure(Failure::BoulderInPit);
                return;
            }
        }
    }

    fn resolve_ground<R: Rng>(&mut self, dt: f32, pushed: bool, rng: &mut R) {
        if !self.is_grounded() {
            self.velocity.y -= self.tuning.gravity * dt;
            return;
        }

        self.position.y = self.ground_y();
        if self.velocity.y < self.tuning.bounce_threshold {
            self.velocity.y *= self.tuning.bounce;
        } else {
            self.velocity.y = 0.0;
        }

        self.velocity.x *= self.tuning.ground_friction;
        self.velocity.z *= self.tuning.ground_friction;

        // Left alone past the start line, the slope takes it back
        if !pushed && self.position.z > 0.0 {
            self.velocity.z -= self.tuning.slope_gravity * SLOPE * dt;
            self.velocity.x += (rng.random::<f32>() - 0.5) * self.tuning.wobble * dt;
        }

        let ground_velocity = Vec3::new(self.velocity.x, 0.0, self.velocity.z);
        let ground_speed = ground_velocity.length();
        if ground_speed > 0.1 {
            self.spin_speed = ground_speed / self.tuning.radius;
            self.spin_axis = ground_velocity.cross(Vec3::Y).normalize_or_zero();
        }
    }

    fn resolve_boxes(&mut self) {
        let t = &self.tuning;
        if let Some(out) = push_out(self.position, t.radius, t.probe_eps, t.box_margin, boxes_distance) {
            self.position = out.position;
            self.velocity = cancel_inward(self.velocity, out.normal, t.box_bounce);
        }
    }

    /// Beams bump the boulder up and slow it a little
    fn resolve_beams(&mut self) {
        let t = &self.tuning;
        if let Some(out) = push_out(self.position, t.radius, t.probe_eps, t.beam_margin, beams_distance) {
            self.position = out.position;
            self.velocity.y += t.beam_hop;
            self.velocity.z *= t.beam_drag;
        }
    }
}
