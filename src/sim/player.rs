//! The player
//!
//! Physics only distinguishes grounded from airborne (with a short coyote
//! window after leaving the ground). The finer states (idle, walking, rising,
//! falling) only pick the animation.

use glam::{Vec2, Vec3};

use super::animation::{AnimState, Animator, Joint};
use super::boulder::Boulder;
use super::collision::{
    bar_knockback, cancel_inward, clamp_lateral, over_pit, pit_capturing, push_out,
    separate_spheres,
};
use super::course::{bars_distance, beams_distance, boxes_distance, static_distance};
use super::scene::{BoulderPose, PlayerPose, boulder_distance};
use super::state::{EventSink, Failure, FrameContext, Keys, TickInput};
use super::terrain::terrain_height;
use crate::math::{dir_from_angle, rot_x, rot_y};
use crate::tuning::PlayerTuning;
use crate::{lerp_angle, normalize_angle};

#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Look angles (yaw, pitch)
    pub look: Vec2,
    /// Body yaw, eased toward the walking direction
    pub facing: f32,
    /// Counts down after leaving the ground; a jump needs it positive
    pub coyote: f32,
    pub pushing: bool,
    pub push_cooldown: f32,
    /// Camera position from the last update
    pub camera: Vec3,
    pub animator: Animator,
    pub tuning: PlayerTuning,
}

impl Player {
    pub fn new(tuning: PlayerTuning) -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, -10.0),
            velocity: Vec3::ZERO,
            look: Vec2::ZERO,
            facing: 0.0,
            coyote: 0.0,
            pushing: false,
            push_cooldown: 0.0,
            camera: Vec3::ZERO,
            animator: Animator::sisyphus_legs(),
            tuning,
        }
    }

    /// Stand the player on the slope at `z`
    pub fn reset(&mut self, z: f32) {
        self.position = Vec3::new(0.0, terrain_height(0.0, z) + 2.0, z);
        self.velocity = Vec3::ZERO;
        self.pushing = false;
    }

    /// Mouse-look by `dx`, `dy` counts; pitch is clamped
    pub fn look(&mut self, dx: f32, dy: f32) {
        let t = &self.tuning;
        self.look.x += dx / t.look_sensitivity;
        self.look.y = (self.look.y - dy / t.look_sensitivity).clamp(-t.pitch_limit, t.pitch_limit);
    }

    pub fn on_ground(&self) -> bool {
        let p = self.position;
        if over_pit(p.x, p.z) {
            return false;
        }
        p.y <= terrain_height(p.x, p.z) + self.tuning.half_height + self.tuning.ground_tolerance
    }

    /// Torso pitch: leaning into the boulder while pushing, otherwise the pose's own
    pub fn lean(&self) -> f32 {
        if self.pushing {
            self.tuning.push_lean
        } else {
            self.animator.current_pose().joint(Joint::BodyAngle).y
        }
    }

    pub fn pose(&self) -> PlayerPose {
        let lean = self.lean();
        let mut pose = self.animator.current_pose();
        pose.joints[Joint::BodyAngle as usize] = Vec3::new(0.0, lean, 0.0);
        PlayerPose {
            position: self.position,
            facing: self.facing,
            lean,
            pushing: self.pushing,
            pose,
        }
    }

    /// Advance one frame: bars, movement and collisions, then pushing
    pub fn update<S>(&mut self, frame: &FrameContext, input: &TickInput, boulder: &mut Boulder, events: &mut S)
    where
        S: EventSink + ?Sized,
    {
        self.apply_bars(frame.time, events);
        self.step(frame, input, boulder, events);
        self.push(frame.dt, &input.held, boulder);
        self.animator.advance(frame.dt);
        self.place_camera(frame.time, &boulder.pose());
    }

    fn apply_bars<S: EventSink + ?Sized>(&mut self, time: f32, events: &mut S) {
        if let Some(force) = bar_knockback(self.position, time) {
            self.velocity += force;
            self.push_cooldown = self.tuning.knockback_cooldown;
            events.show_message("Knocked off!", self.tuning.knockback_message_secs);
        }
    }

    /// Walking direction from the held keys, relative to look yaw
    fn wish_dir(&self, held: &Keys) -> Vec3 {
        let (sa, ca) = self.look.x.sin_cos();
        let mut dir = Vec3::ZERO;
        if held.forward {
            dir += Vec3::new(sa, 0.0, ca);
        }
        if held.back {
            dir -= Vec3::new(sa, 0.0, ca);
        }
        if held.left {
            dir += Vec3::new(-ca, 0.0, sa);
        }
        if held.right {
            dir += Vec3::new(ca, 0.0, -sa);
        }
        dir
    }

    fn select_animation(&mut self, moving: bool) {
        let t = &self.tuning;
        let (state, blend) = if !self.on_ground() {
            if self.velocity.y > t.rising_speed {
                (AnimState::JumpRise, t.blend_rise)
            } else {
                (AnimState::JumpFall, t.blend_fall)
            }
        } else if moving {
            (AnimState::Walk, t.blend_walk)
        } else {
            (AnimState::Idle, t.blend_idle)
        };
        self.animator.set_state(state, blend);
    }

    fn step<S: EventSink + ?Sized>(
        &mut self,
        frame: &FrameContext,
        input: &TickInput,
        boulder: &Boulder,
        events: &mut S,
    ) {
        let dt = frame.dt;
        let dir = self.wish_dir(&input.held);
        let moving = dir.length() > 0.0;

        if moving {
            let target = dir.x.atan2(dir.z);
            self.facing = normalize_angle(lerp_angle(self.facing, target, self.tuning.turn_rate));
        }
        self.select_animation(moving);

        let speed = if self.pushing { self.tuning.push_speed } else { self.tuning.speed };
        let walk = dir.normalize_or_zero() * speed * dt;

        self.coyote -= dt;
        if self.on_ground() {
            self.coyote = self.tuning.coyote_window;
            self.velocity.x *= self.tuning.ground_damping;
            self.velocity.z *= self.tuning.ground_damping;
        }
        if input.pressed.jump && self.coyote > 0.0 {
            self.velocity.y = self.tuning.jump_speed;
            // Spent until the next landing
            self.coyote = -1.0;
        }

        self.velocity.y -= self.tuning.gravity * dt;
        self.position += self.velocity * dt + walk;

        let terrain = terrain_height(self.position.x, self.position.z);
        self.resolve_ground(terrain, dt);
        self.resolve_obstacles(frame.time);
        self.resolve_boulder(boulder);

        let (half_width, bounce) = (self.tuning.path_half_width, self.tuning.wall_bounce);
        clamp_lateral(&mut self.position, &mut self.velocity, half_width, bounce);

        if self.position.y < terrain - self.tuning.abyss_depth {
            events.report_failure(Failure::PlayerInAbyss);
        }
    }

    /// Stand on the terrain, unless over a pit, where the pit pulls instead
    fn resolve_ground(&mut self, terrain: f32, dt: f32) {
        let p = self.position;
        if over_pit(p.x, p.z) {
            if let Some(pit) = pit_capturing(p.x, p.z) {
                self.velocity.x += (pit.x - p.x) * self.tuning.pit_pull * dt;
                self.velocity.z += (pit.z - p.z) * self.tuning.pit_pull * dt;
            }
            return;
        }

        let ground = terrain + self.tuning.half_height;
        if p.y < ground {
            self.position.y = ground;
            self.velocity.y = self.velocity.y.max(0.0);
        }
    }

    fn resolve_obstacles(&mut self, time: f32) {
        let t = &self.tuning;
        let r = t.half_height;

        // Bars only shove, they do not stop the player
        if let Some(out) = push_out(self.position, r, t.probe_eps, 0.0, |p| bars_distance(p, time)) {
            self.position = out.position;
        }

        if let Some(out) = push_out(self.position, r, t.probe_eps, 0.0, boxes_distance) {
            self.position = out.position;
            self.velocity = cancel_inward(self.velocity, out.normal, 1.0);
        }

        // Beams are stepped over
        if beams_distance(self.position) < r {
            let step = terrain_height(self.position.x, self.position.z) + t.beam_step + r;
            self.position.y = self.position.y.max(step);
        }
    }

    fn resolve_boulder(&mut self, boulder: &Boulder) {
        let min_dist = self.tuning.half_height + boulder.radius();
        if let Some((position, velocity)) =
            separate_spheres(self.position, self.velocity, boulder.position, min_dist)
        {
            self.position = position;
            self.velocity = velocity;
        }
    }

    /// Push the boulder when close, facing it, walking forward, grounded and off cooldown
    fn push(&mut self, dt: f32, held: &Keys, boulder: &mut Boulder) {
        let t = &self.tuning;
        self.push_cooldown -= dt;

        let to_boulder = boulder.position - self.position;
        let dist = to_boulder.length();
        let facing = dir_from_angle(self.look.x, 0.0);
        let aligned = to_boulder.normalize_or_zero().dot(facing) > t.push_alignment;

        let can_push = dist > t.push_min_dist
            && dist < t.push_max_dist
            && aligned
            && held.forward
            && self.on_ground();

        self.pushing = can_push && self.push_cooldown <= 0.0;
        if self.pushing {
            let flat = Vec3::new(to_boulder.x, 0.0, to_boulder.z).normalize_or_zero();
            boulder.apply_push(flat * self.tuning.push_force);
        }
    }

    /// Camera behind the player, pulled in until it clears the scenery
    fn place_camera(&mut self, time: f32, boulder: &BoulderPose) {
        let t = &self.tuning;
        let offset = rot_y(rot_x(Vec3::new(0.0, 0.0, -t.camera_distance), -self.look.y), self.look.x);
        let back = offset.normalize_or_zero() * t.camera_step;
        let clearance = |p: Vec3| static_distance(p, time).min(boulder_distance(p, boulder));

        let mut camera = self.position + Vec3::Y * t.camera_height + offset;
        for _ in 0..t.camera_max_steps {
            if clearance(camera) >= t.camera_clearance {
                break;
            }
            camera -= back;
        }
        self.camera = camera;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::course::PITS;
    use crate::sim::state::GameEvent;
    use crate::tuning::BoulderTuning;

    const DT: f32 = 1.0 / 60.0;

    fn setup(z: f32) -> (Player, Boulder) {
        let mut player = Player::new(PlayerTuning::default());
        player.position = Vec3::new(0.0, terrain_height(0.0, z) + 0.5, z);
        let mut boulder = Boulder::new(BoulderTuning::default());
        boulder.reset(50.0);
        (player, boulder)
    }

    fn forward() -> TickInput {
        TickInput {
            held: Keys {
                forward: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn jump() -> TickInput {
        TickInput {
            pressed: Keys {
                jump: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_walk_forward_half_second() {
        let (mut player, mut boulder) = setup(-8.0);
        let mut events: Vec<GameEvent> = Vec::new();
        let start = player.position;
        for i in 0..30 {
            let frame = FrameContext::new(i as f32 * DT, DT);
            player.update(&frame, &forward(), &mut boulder, &mut events);
        }
        let moved = player.position.z - start.z;
        assert!((moved - 2.5).abs() < 0.05, "moved {moved}");
        assert!(player.position.x.abs() < 1e-4);
        assert_eq!(player.animator.state(), Some(AnimState::Walk));
        assert!(player.on_ground());
        assert!(events.is_empty());
    }

    #[test]
    fn test_idle_when_standing() {
        let (mut player, mut boulder) = setup(-8.0);
        let mut events: Vec<GameEvent> = Vec::new();
        player.update(&FrameContext::new(0.0, DT), &TickInput::default(), &mut boulder, &mut events);
        assert_eq!(player.animator.state(), Some(AnimState::Idle));
    }

    #[test]
    fn test_facing_turns_the_short_way() {
        let (mut player, mut boulder) = setup(-8.0);
        let mut events: Vec<GameEvent> = Vec::new();
        player.facing = 3.0;
        // Walking toward yaw -3.0 is a short hop across ±π
        player.look.x = -3.0;
        player.update(&FrameContext::new(0.0, DT), &forward(), &mut boulder, &mut events);
        assert!(player.facing > 3.0 || player.facing < -3.0);
    }

    #[test]
    fn test_pit_pulls_player_in() {
        let pit = PITS[0];
        let (mut player, mut boulder) = setup(0.0);
        let x = pit.x + pit.radius * 0.4;
        player.position = Vec3::new(x, terrain_height(x, pit.z) + 0.5, pit.z);
        let mut events: Vec<GameEvent> = Vec::new();
        for i in 0..3 {
            let before = player.velocity.x;
            player.update(&FrameContext::new(i as f32 * DT, DT), &TickInput::default(), &mut boulder, &mut events);
            assert!(!player.on_ground());
            assert!(player.velocity.x < before);
        }
        assert!(player.position.y < terrain_height(x, pit.z) + 0.5);
    }

    #[test]
    fn test_jump_within_coyote_window() {
        let (mut player, mut boulder) = setup(-8.0);
        let mut events: Vec<GameEvent> = Vec::new();
        player.update(&FrameContext::new(0.0, DT), &TickInput::default(), &mut boulder, &mut events);
        assert!(player.on_ground());

        // Walk off a ledge: now airborne
        player.position.y += 5.0;
        let frame = FrameContext::new(DT, 0.016);
        player.update(&frame, &jump(), &mut boulder, &mut events);
        assert!(player.velocity.y > 0.0);
    }

    /// Vertical speed after jumping on the `airborne`-th frame since leaving the ground
    fn coyote_jump_on_frame(airborne: u32) -> f32 {
        // Binary-exact step and window so the boundary frame lands on zero
        const STEP: f32 = 1.0 / 32.0;
        let (mut player, mut boulder) = setup(-8.0);
        player.tuning.coyote_window = 4.0 * STEP;
        let mut events: Vec<GameEvent> = Vec::new();
        player.update(&FrameContext::new(0.0, STEP), &TickInput::default(), &mut boulder, &mut events);
        assert!(player.on_ground());

        player.position.y += 20.0;
        for i in 1..=airborne {
            let input = if i == airborne { jump() } else { TickInput::default() };
            player.update(&FrameContext::new(i as f32 * STEP, STEP), &input, &mut boulder, &mut events);
            assert!(!player.on_ground());
        }
        player.velocity.y
    }

    #[test]
    fn test_coyote_window_boundary() {
        // Last frame inside the window still jumps
        assert!(coyote_jump_on_frame(3) > 0.0);
        // One frame later the window has closed
        assert!(coyote_jump_on_frame(4) < 0.0);
    }

    #[test]
    fn test_held_jump_alone_does_not_jump() {
        let (mut player, mut boulder) = setup(-8.0);
        let mut events: Vec<GameEvent> = Vec::new();
        let input = TickInput {
            held: Keys {
                jump: true,
                ..Default::default()
            },
            ..Default::default()
        };
        player.update(&FrameContext::new(0.0, DT), &input, &mut boulder, &mut events);
        assert_eq!(player.velocity.y, 0.0);
        assert!(player.on_ground());
    }

    #[test]
    fn test_no_double_jump() {
        let (mut player, mut boulder) = setup(-8.0);
        let mut events: Vec<GameEvent> = Vec::new();
        player.update(&FrameContext::new(0.0, DT), &jump(), &mut boulder, &mut events);
        let after_first = player.velocity.y;
        assert!(after_first > 0.0);
        player.update(&FrameContext::new(DT, DT), &jump(), &mut boulder, &mut events);
        assert!(player.velocity.y < after_first);
    }

    #[test]
    fn test_push_boulder() {
        let (mut player, mut boulder) = setup(-8.0);
        boulder.position = Vec3::new(0.0, terrain_height(0.0, -5.5) + 2.5, -5.5);
        let mut events: Vec<GameEvent> = Vec::new();
        player.update(&FrameContext::new(0.0, DT), &forward(), &mut boulder, &mut events);
        assert!(player.pushing);
        assert!((boulder.push_force - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-4);
        assert_eq!(player.lean(), player.tuning.push_lean);
        assert_eq!(player.pose().pose.joint(Joint::BodyAngle).y, player.tuning.push_lean);
    }

    #[test]
    fn test_no_push_on_cooldown_or_without_forward() {
        let (mut player, mut boulder) = setup(-8.0);
        boulder.position = Vec3::new(0.0, terrain_height(0.0, -5.5) + 2.5, -5.5);
        let mut events: Vec<GameEvent> = Vec::new();

        player.update(&FrameContext::new(0.0, DT), &TickInput::default(), &mut boulder, &mut events);
        assert!(!player.pushing);

        player.push_cooldown = 0.5;
        player.update(&FrameContext::new(DT, DT), &forward(), &mut boulder, &mut events);
        assert!(!player.pushing);
        assert_eq!(boulder.push_force, Vec3::ZERO);
    }

    #[test]
    fn test_boulder_is_solid() {
        let (mut player, mut boulder) = setup(-8.0);
        boulder.position = player.position + Vec3::new(0.0, 0.0, 1.0);
        player.velocity = Vec3::new(0.0, 0.0, 4.0);
        player.resolve_boulder(&boulder);
        assert!((player.position - boulder.position).length() >= 3.0 - 1e-4);
        assert!(player.velocity.z <= 0.0);
    }

    #[test]
    fn test_bar_knocks_player() {
        let bar = crate::sim::course::BARS[0];
        let (mut player, _) = setup(0.0);
        player.position = bar.anchor() + Vec3::new(2.0, 0.6, 0.0);
        let mut events: Vec<GameEvent> = Vec::new();
        player.apply_bars(0.0, &mut events);
        assert!(player.velocity.y > 0.0);
        assert_eq!(player.push_cooldown, player.tuning.knockback_cooldown);
        assert!(matches!(&events[0], GameEvent::Message { text, .. } if text == "Knocked off!"));
    }

    #[test]
    fn test_abyss() {
        let pit = PITS[0];
        let (mut player, mut boulder) = setup(0.0);
        // Over a pit there is no ground to catch the fall
        player.position = Vec3::new(pit.x, terrain_height(pit.x, pit.z) - 9.0, pit.z);
        let mut events: Vec<GameEvent> = Vec::new();
        player.update(&FrameContext::new(0.0, DT), &TickInput::default(), &mut boulder, &mut events);
        assert!(events.contains(&GameEvent::Failure(Failure::PlayerInAbyss)));
    }

    #[test]
    fn test_look_clamps_pitch() {
        let mut player = Player::new(PlayerTuning::default());
        player.look(700.0, -100_000.0);
        assert!((player.look.x - 1.0).abs() < 1e-6);
        assert_eq!(player.look.y, player.tuning.pitch_limit);
    }

    #[test]
    fn test_camera_pulls_in_out_of_the_slope() {
        let (mut player, mut boulder) = setup(-8.0);
        let mut events: Vec<GameEvent> = Vec::new();
        player.update(&FrameContext::new(0.0, DT), &TickInput::default(), &mut boulder, &mut events);
        // Level look down the slope: open air behind the player
        let expected = player.position + Vec3::new(0.0, 1.5, -6.0);
        assert!((player.camera - expected).length() < 1e-4);

        // Looking up swings the camera below the terrain, so it steps in
        player.look.y = player.tuning.pitch_limit;
        player.update(&FrameContext::new(DT, DT), &TickInput::default(), &mut boulder, &mut events);
        let behind = player.camera - (player.position + Vec3::Y * 1.5);
        assert!(behind.length() < 6.0 - 0.05);
    }
}
