//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Explicit frame time only (no wall clock)
//! - Seeded RNG only
//! - One set of obstacle tables shared by physics and the shading field
//! - No rendering or platform dependencies

pub mod animation;
pub mod boulder;
pub mod collision;
pub mod course;
pub mod player;
pub mod scene;
pub mod sdf;
pub mod state;
pub mod terrain;
pub mod tick;

pub use animation::{AnimState, Animator, Joint, Pose};
pub use boulder::Boulder;
pub use player::Player;
pub use scene::{BoulderPose, PlayerPose, RayMarch, Scene, SceneObject};
pub use sdf::{check_sdf_collision, gradient, smooth_min};
pub use state::{
    EventSink, Failure, FrameClock, FrameContext, GameEvent, GamePhase, Keys, Progress, TickInput,
    World,
};
pub use terrain::terrain_height;
pub use tick::{full_reset, start, tick};
