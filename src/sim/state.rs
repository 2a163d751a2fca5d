//! Game state and per-frame context
//!
//! Everything the frame driver hands to the simulation (time, input) and
//! everything the simulation hands back (events, phase, progress).

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::boulder::Boulder;
use super::player::Player;
use super::scene::Scene;
use crate::Tuning;
use crate::consts::*;

/// Explicit time for one frame
///
/// Obstacle phase is a pure function of `time`; nothing in the simulation
/// reads a wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameContext {
    /// Simulation time in seconds
    pub time: f32,
    /// Seconds since the previous frame, already clamped
    pub dt: f32,
}

impl FrameContext {
    pub fn new(time: f32, dt: f32) -> Self {
        Self { time, dt }
    }
}

/// Turns wall-clock samples into clamped frame steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
    time: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step to wall-clock `now` (seconds)
    ///
    /// The first frame uses [`FIRST_FRAME_DT`]; later frames are clamped to
    /// `[0, MAX_FRAME_DT]` so a stall never tunnels bodies through obstacles.
    pub fn advance(&mut self, now: f64) -> FrameContext {
        let dt = match self.last {
            None => FIRST_FRAME_DT,
            Some(last) => ((now - last) as f32).clamp(0.0, MAX_FRAME_DT),
        };
        self.last = Some(now);
        self.time += dt;
        FrameContext::new(self.time, dt)
    }
}

/// Logical keys the simulation reads
///
/// Movement keys are read from the held set; `jump` and `reset` only act on
/// the edge in the pressed set, so holding them does nothing further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Keys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub reset: bool,
}

/// Input for a single frame (read-only to the simulation)
///
/// Serializable so a run can be recorded and replayed frame for frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Keys currently down (movement)
    pub held: Keys,
    /// Keys that went down since the previous frame (jump, reset)
    pub pressed: Keys,
    /// Mouse-look movement in counts (x right, y down)
    pub look: Vec2,
}

/// Non-fatal gameplay failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Failure {
    BoulderInPit,
    BoulderEscaped,
    PlayerInAbyss,
}

impl Failure {
    pub fn reason(&self) -> &'static str {
        match self {
            Failure::BoulderInPit => "The boulder fell into a pit!",
            Failure::BoulderEscaped => "The boulder escaped!",
            Failure::PlayerInAbyss => "Fell into the abyss!",
        }
    }

    /// Failures of the player body also put the player back at the start
    pub fn resets_player(&self) -> bool {
        matches!(self, Failure::PlayerInAbyss)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Something the outer UI should know about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Failure(Failure),
    /// Transient on-screen text
    Message { text: String, duration: f32 },
    Victory,
}

/// Where bodies report what happened to them
pub trait EventSink {
    fn report_failure(&mut self, failure: Failure);
    fn show_message(&mut self, text: &str, duration: f32);
}

impl EventSink for Vec<GameEvent> {
    fn report_failure(&mut self, failure: Failure) {
        self.push(GameEvent::Failure(failure));
    }

    fn show_message(&mut self, text: &str, duration: f32) {
        self.push(GameEvent::Message {
            text: text.to_owned(),
            duration,
        });
    }
}

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start
    Title,
    Playing,
    /// A failure happened; walking back to the bottom restarts
    RestartPending,
    /// Summit reached; everything rolls back when `remaining` runs out
    Victory { remaining: f32 },
}

/// Message currently on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub text: String,
    pub remaining: f32,
}

/// Height readout (metres climbed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub height: u32,
    pub best: u32,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Height: {}m (Best: {}m)", self.height, self.best)
    }
}

/// Metres for a z position along the slope
fn metres(z: f32) -> u32 {
    (z * SLOPE).floor().max(0.0) as u32
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub player: Player,
    pub boulder: Boulder,
    /// Drives the boulder's wobble
    pub rng: Pcg32,
    /// Last frame the world was ticked with
    pub frame: FrameContext,
    pub banner: Option<Banner>,
    /// Events since the last drain
    events: Vec<GameEvent>,
}

impl World {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut player = Player::new(tuning.player.clone());
        let mut boulder = Boulder::new(tuning.boulder.clone());
        player.reset(PLAYER_START_Z);
        boulder.reset(PLAYER_START_Z);

        Self {
            seed,
            tuning,
            phase: GamePhase::Title,
            player,
            boulder,
            rng: Pcg32::seed_from_u64(seed),
            frame: FrameContext::default(),
            banner: None,
            events: Vec::new(),
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            height: metres(self.boulder.position.z),
            best: metres(self.boulder.max_z),
        }
    }

    /// Everything the shading field needs for the current frame
    pub fn scene(&self) -> Scene {
        Scene {
            time: self.frame.time,
            boulder: self.boulder.pose(),
            player: self.player.pose(),
        }
    }

    /// Take the events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn record(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            if let GameEvent::Message { text, duration } = &event {
                self.banner = Some(Banner {
                    text: text.clone(),
                    remaining: *duration,
                });
            }
            self.events.push(event);
        }
    }
}

impl EventSink for World {
    fn report_failure(&mut self, failure: Failure) {
        self.record([GameEvent::Failure(failure)]);
    }

    fn show_message(&mut self, text: &str, duration: f32) {
        self.record([GameEvent::Message {
            text: text.to_owned(),
            duration,
        }]);
    }
}
