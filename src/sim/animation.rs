//! Keyframed pose blending for the player's legs and torso
//!
//! Each [`AnimState`] owns a clip of time-ordered keyframes. Steady playback
//! loops the clip and interpolates linearly; switching state captures the pose
//! on screen and eases from it to the new clip's first keyframe, so there is
//! never a pop.

use glam::Vec3;

use crate::math::sin_ease;

/// Number of joint vectors in a pose
pub const JOINT_COUNT: usize = 11;

/// Uniform name for each joint, in pose order
pub const JOINT_UNIFORMS: [&str; JOINT_COUNT] = [
    "uhip1", "ujr1", "ujr2", "ujr3", "uhip2", "ujl1", "ujl2", "ujl3", "uHeadPos", "uChestPos",
    "uBodyAngle",
];
pub const LIFT_UNIFORM: &str = "uLift";

/// Joint slots of a [`Pose`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joint {
    RightHip = 0,
    RightKnee,
    RightAnkle,
    RightToe,
    LeftHip,
    LeftKnee,
    LeftAnkle,
    LeftToe,
    /// Offset of the head from its rest position
    Head,
    /// Offset of the chest from its rest position
    Chest,
    /// Torso lean (the y component is the pitch)
    BodyAngle,
}

/// Right and left leg chains as (hip, knee, ankle, toe)
pub const LEGS: [[Joint; 4]; 2] = [
    [Joint::RightHip, Joint::RightKnee, Joint::RightAnkle, Joint::RightToe],
    [Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle, Joint::LeftToe],
];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub joints: [Vec3; JOINT_COUNT],
    pub lift: f32,
}

impl Pose {
    #[inline]
    pub fn joint(&self, joint: Joint) -> Vec3 {
        self.joints[joint as usize]
    }

    pub fn lerp(&self, other: &Pose, w: f32) -> Pose {
        Pose {
            joints: std::array::from_fn(|i| self.joints[i].lerp(other.joints[i], w)),
            lift: self.lift + (other.lift - self.lift) * w,
        }
    }

    /// Interpolate with a sine-eased weight
    pub fn sin_lerp(&self, other: &Pose, w: f32) -> Pose {
        self.lerp(other, sin_ease(w))
    }

    pub fn is_finite(&self) -> bool {
        self.lift.is_finite() && self.joints.iter().all(|j| j.is_finite())
    }
}

/// Animation state of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimState {
    Walk = 0,
    Idle,
    JumpRise,
    JumpFall,
}

impl AnimState {
    pub const ALL: [AnimState; 4] = [Self::Walk, Self::Idle, Self::JumpRise, Self::JumpFall];

    pub fn name(&self) -> &'static str {
        match self {
            AnimState::Walk => "walk",
            AnimState::Idle => "idle",
            AnimState::JumpRise => "jump-rise",
            AnimState::JumpFall => "jump-fall",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Keyframe {
    time: f32,
    pose: Pose,
}

#[derive(Debug, Clone, Default)]
struct Clip {
    keyframes: Vec<Keyframe>,
}

impl Clip {
    fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Pose at local time `time` (already wrapped into the clip)
    fn sample(&self, time: f32) -> Pose {
        match self.keyframes.as_slice() {
            [] => Pose::default(),
            [only] => only.pose,
            frames => {
                let n = frames.len();
                let index = frames
                    .partition_point(|k| k.time <= time)
                    .saturating_sub(1)
                    .min(n - 2);
                let (a, b) = (&frames[index], &frames[index + 1]);
                let span = b.time - a.time;
                if span <= 0.0 {
                    // Duplicate times: zero-width segment
                    return a.pose;
                }
                let w = ((time - a.time) / span).clamp(0.0, 1.0);
                a.pose.lerp(&b.pose, w)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: Pose,
    to: Pose,
    remaining: f32,
    total: f32,
}

impl Transition {
    fn weight(&self) -> f32 {
        if self.total <= 0.0 {
            return 1.0;
        }
        (1.0 - self.remaining / self.total).clamp(0.0, 1.0)
    }
}

/// Pose blender with one clip per [`AnimState`]
#[derive(Debug, Clone, Default)]
pub struct Animator {
    clips: [Clip; 4],
    state: Option<AnimState>,
    /// Local time within the current clip
    time: f32,
    transition: Option<Transition>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyframe to `state`'s clip, keeping times non-decreasing
    ///
    /// A keyframe with the same time as existing ones goes after them.
    pub fn add_keyframe(&mut self, state: AnimState, time: f32, pose: Pose) {
        let frames = &mut self.clips[state as usize].keyframes;
        let at = frames.partition_point(|k| k.time <= time);
        frames.insert(at, Keyframe { time, pose });
    }

    pub fn state(&self) -> Option<AnimState> {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Switch to `state`, blending over `blend` seconds
    ///
    /// No-op when already in `state`. States without keyframes are refused.
    pub fn set_state(&mut self, state: AnimState, blend: f32) {
        if self.state == Some(state) {
            return;
        }
        let clip = &self.clips[state as usize];
        let Some(first) = clip.keyframes.first() else {
            log::warn!("Animation state {} has no keyframes", state.name());
            return;
        };
        let to = first.pose;
        let from = self.current_pose();

        log::debug!("Animation -> {} (blend {blend:.2}s)", state.name());
        self.state = Some(state);
        self.time = 0.0;
        self.transition = (blend > 0.0).then_some(Transition {
            from,
            to,
            remaining: blend,
            total: blend,
        });
    }

    /// Move time forward by `dt`
    pub fn advance(&mut self, dt: f32) {
        if let Some(transition) = &mut self.transition {
            transition.remaining -= dt;
            if transition.remaining <= 0.0 {
                self.transition = None;
            }
            // The clip starts once the blend is done
            self.time = 0.0;
            return;
        }

        self.time += dt;
        let duration = self.state.map_or(0.0, |s| self.clips[s as usize].duration());
        if duration > 0.0 {
            self.time = self.time.rem_euclid(duration);
        }
    }

    /// Pose for the current time; does not advance anything
    pub fn current_pose(&self) -> Pose {
        if let Some(transition) = &self.transition {
            return transition.from.sin_lerp(&transition.to, transition.weight());
        }
        match self.state {
            Some(state) => self.clips[state as usize].sample(self.time),
            None => Pose::default(),
        }
    }

    /// Steady-state pose of `state` at local time zero
    pub fn rest_pose(&self, state: AnimState) -> Pose {
        self.clips[state as usize].sample(0.0)
    }

    /// The player's rig: four states, starting idle
    pub fn sisyphus_legs() -> Self {
        const STEP_TIME: f32 = 0.3;

        let mut animator = Self::new();
        animator.add_keyframe(AnimState::Walk, 0.0, frames::WALK_1);
        animator.add_keyframe(AnimState::Walk, STEP_TIME / 2.0, frames::WALK_2);
        animator.add_keyframe(AnimState::Walk, STEP_TIME, frames::WALK_1);
        animator.add_keyframe(AnimState::Idle, 0.0, frames::IDLE);
        animator.add_keyframe(AnimState::JumpRise, 0.0, frames::JUMP);
        animator.add_keyframe(AnimState::JumpFall, 0.0, frames::FALL);
        animator.set_state(AnimState::Idle, 0.0);
        animator
    }
}

/// Stock poses for the player rig
pub mod frames {
    use super::Pose;
    use glam::Vec3;

    const LIFT: f32 = 1.2;
    const RIGHT_HIP: Vec3 = Vec3::new(0.1, -0.1, -0.12);
    const LEFT_HIP: Vec3 = Vec3::new(-0.1, -0.1, -0.12);

    /// Pose with the given knee/ankle/toe chains and torso pitch
    const fn pose(right: [Vec3; 3], left: [Vec3; 3], lean: f32) -> Pose {
        Pose {
            joints: [
                RIGHT_HIP,
                right[0],
                right[1],
                right[2],
                LEFT_HIP,
                left[0],
                left[1],
                left[2],
                Vec3::ZERO,
                Vec3::ZERO,
                Vec3::new(0.0, lean, 0.0),
            ],
            lift: LIFT,
        }
    }

    /// Same chain on both sides, mirrored across x
    const fn symmetric(knee: Vec3, ankle: Vec3, toe: Vec3, lean: f32) -> Pose {
        pose(
            [knee, ankle, toe],
            [
                Vec3::new(-knee.x, knee.y, knee.z),
                Vec3::new(-ankle.x, ankle.y, ankle.z),
                Vec3::new(-toe.x, toe.y, toe.z),
            ],
            lean,
        )
    }

    const STRIDE_FORWARD: [Vec3; 3] =
        [Vec3::new(0.15, -0.2, 0.15), Vec3::new(0.13, -0.35, 0.0), Vec3::new(0.13, -0.46, 0.15)];
    const STRIDE_BACK: [Vec3; 3] =
        [Vec3::new(0.15, -0.28, -0.05), Vec3::new(0.13, -0.3, -0.2), Vec3::new(0.13, -0.46, -0.15)];

    const fn mirror(chain: [Vec3; 3]) -> [Vec3; 3] {
        [
            Vec3::new(-chain[0].x, chain[0].y, chain[0].z),
            Vec3::new(-chain[1].x, chain[1].y, chain[1].z),
            Vec3::new(-chain[2].x, chain[2].y, chain[2].z),
        ]
    }

    pub const WALK_1: Pose = pose(STRIDE_FORWARD, mirror(STRIDE_BACK), -0.3);
    pub const WALK_2: Pose = pose(STRIDE_BACK, mirror(STRIDE_FORWARD), -0.3);
    pub const IDLE: Pose = symmetric(
        Vec3::new(0.15, -0.26, 0.05),
        Vec3::new(0.13, -0.35, -0.15),
        Vec3::new(0.13, -0.46, 0.0),
        0.0,
    );
    pub const JUMP: Pose = symmetric(
        Vec3::new(0.15, -0.18, 0.05),
        Vec3::new(0.13, -0.25, -0.15),
        Vec3::new(0.13, -0.35, 0.0),
        -0.2,
    );
    pub const FALL: Pose = symmetric(
        Vec3::new(0.15, -0.13, 0.05),
        Vec3::new(0.13, -0.2, -0.15),
        Vec3::new(0.13, -0.3, 0.0),
        -0.2,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Pose, b: &Pose) -> bool {
        (a.lift - b.lift).abs() < 1e-5
            && a.joints.iter().zip(&b.joints).all(|(x, y)| (*x - *y).length() < 1e-5)
    }

    fn walking() -> Animator {
        let mut animator = Animator::sisyphus_legs();
        animator.set_state(AnimState::Walk, 0.0);
        animator
    }

    #[test]
    fn test_starts_idle() {
        let animator = Animator::sisyphus_legs();
        assert_eq!(animator.state(), Some(AnimState::Idle));
        assert!(close(&animator.current_pose(), &frames::IDLE));
    }

    #[test]
    fn test_walk_frames_mirror_each_other() {
        let w1 = frames::WALK_1;
        let w2 = frames::WALK_2;
        // Right knee of one frame is the left knee of the other, mirrored
        let r = w1.joint(Joint::RightKnee);
        let l = w2.joint(Joint::LeftKnee);
        assert_eq!(r, Vec3::new(-l.x, l.y, l.z));
    }

    #[test]
    fn test_steady_state_is_linear() {
        let mut animator = walking();
        animator.advance(0.075);
        let expected = frames::WALK_1.lerp(&frames::WALK_2, 0.5);
        assert!(close(&animator.current_pose(), &expected));
    }

    #[test]
    fn test_walk_loops() {
        let mut a = walking();
        let mut b = walking();
        a.advance(0.1);
        b.advance(0.3);
        b.advance(0.1);
        let (pa, pb) = (a.current_pose(), b.current_pose());
        assert!(pa.joints.iter().zip(&pb.joints).all(|(x, y)| (*x - *y).length() < 1e-3));
    }

    #[test]
    fn test_switch_is_continuous() {
        let mut animator = walking();
        animator.advance(0.07);
        let before = animator.current_pose();

        animator.set_state(AnimState::Idle, 0.2);
        assert!(animator.is_transitioning());
        assert!(close(&animator.current_pose(), &before));

        animator.advance(0.1);
        let mid = animator.current_pose();
        let expected = before.lerp(&frames::IDLE, 0.5);
        assert!(mid.joints.iter().zip(&expected.joints).all(|(x, y)| (*x - *y).length() < 1e-3));

        animator.advance(0.15);
        assert!(!animator.is_transitioning());
        assert!(close(&animator.current_pose(), &animator.rest_pose(AnimState::Idle)));
    }

    #[test]
    fn test_full_blend_lands_on_first_keyframe() {
        let mut animator = Animator::sisyphus_legs();
        animator.set_state(AnimState::Walk, 0.1);
        animator.advance(0.1);
        assert!(close(&animator.current_pose(), &frames::WALK_1));
    }

    #[test]
    fn test_same_state_is_noop() {
        let mut animator = walking();
        animator.advance(0.05);
        let before = animator.current_pose();
        animator.set_state(AnimState::Walk, 0.5);
        assert!(!animator.is_transitioning());
        assert!(close(&animator.current_pose(), &before));
    }

    #[test]
    fn test_empty_state_is_refused() {
        let mut animator = Animator::new();
        animator.set_state(AnimState::Walk, 0.1);
        assert_eq!(animator.state(), None);
        assert_eq!(animator.current_pose(), Pose::default());
    }

    #[test]
    fn test_keyframes_stay_sorted() {
        let mut animator = Animator::new();
        let a = frames::IDLE;
        let b = frames::JUMP;
        let c = frames::FALL;
        animator.add_keyframe(AnimState::Walk, 0.3, c);
        animator.add_keyframe(AnimState::Walk, 0.0, a);
        animator.add_keyframe(AnimState::Walk, 0.15, b);
        animator.set_state(AnimState::Walk, 0.0);
        assert!(close(&animator.current_pose(), &a));
        animator.advance(0.15);
        assert!(close(&animator.current_pose(), &b));
    }

    #[test]
    fn test_duplicate_times_give_start_pose() {
        let mut animator = Animator::new();
        animator.add_keyframe(AnimState::Idle, 0.0, frames::IDLE);
        animator.add_keyframe(AnimState::Idle, 0.0, frames::JUMP);
        animator.set_state(AnimState::Idle, 0.0);
        animator.advance(0.4);
        let pose = animator.current_pose();
        assert!(pose.is_finite());
        assert!(close(&pose, &frames::IDLE));
    }
}
