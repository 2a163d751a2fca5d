//! Physics tuning per body
//!
//! Every constant the bodies integrate with lives here, grouped per body so a
//! re-tune is a single edit (or a JSON file) away. Obstacle geometry is not
//! tunable; it lives in `sim::course`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consts::VICTORY_HOLD;

/// Boulder constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoulderTuning {
    pub radius: f32,

    // === Integration ===
    pub gravity: f32,
    /// Per-frame velocity damping, always applied
    pub air_friction: f32,
    /// Per-frame horizontal damping while grounded
    pub ground_friction: f32,
    /// Down-slope pull (multiplied by the slope) when nobody is pushing
    pub slope_gravity: f32,
    /// Lateral jitter amplitude while rolling back
    pub wobble: f32,
    /// Extra height above the ground that still counts as grounded
    pub ground_tolerance: f32,
    /// Falling faster than this bounces instead of stopping
    pub bounce_threshold: f32,
    pub bounce: f32,

    // === Push ===
    /// Per-frame decay of accumulated push force
    pub push_decay: f32,
    /// Push force magnitude below which the boulder counts as free
    pub push_threshold: f32,

    // === Obstacles ===
    pub knockback_scale: f32,
    pub knockback_lift: f32,
    pub pit_pull: f32,
    pub probe_eps: f32,
    pub box_margin: f32,
    pub box_bounce: f32,
    pub beam_margin: f32,
    pub beam_hop: f32,
    pub beam_drag: f32,

    // === Bounds ===
    pub path_half_width: f32,
    pub wall_bounce: f32,
    pub min_z: f32,
    /// How far below its best z the boulder may roll before it has escaped
    pub escape_drop: f32,
    /// Best z that must be reached before escaping is possible
    pub escape_after: f32,
}

impl Default for BoulderTuning {
    fn default() -> Self {
        Self {
            radius: 2.5,

            gravity: 25.0,
            air_friction: 0.98,
            ground_friction: 0.995,
            slope_gravity: 12.0,
            wobble: 0.5,
            ground_tolerance: 0.1,
            bounce_threshold: -5.0,
            bounce: -0.3,

            push_decay: 0.9,
            push_threshold: 0.1,

            knockback_scale: 0.5,
            knockback_lift: 5.0,
            pit_pull: 5.0,
            probe_eps: 0.1,
            box_margin: 0.1,
            box_bounce: 1.5,
            beam_margin: 0.05,
            beam_hop: 2.0,
            beam_drag: 0.9,

            path_half_width: 5.5,
            wall_bounce: -0.5,
            min_z: -5.0,
            escape_drop: 30.0,
            escape_after: 10.0,
        }
    }
}

/// Player constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Distance from the body centre to the feet
    pub half_height: f32,

    // === Movement ===
    pub gravity: f32,
    pub jump_speed: f32,
    pub speed: f32,
    /// Walking speed while pushing the boulder
    pub push_speed: f32,
    /// Grace period after leaving the ground in which a jump is still honored
    pub coyote_window: f32,
    pub ground_damping: f32,
    /// Fraction of the facing error closed per frame
    pub turn_rate: f32,
    /// Vertical speed above which an airborne player counts as rising
    pub rising_speed: f32,
    pub ground_tolerance: f32,

    // === Obstacles ===
    pub pit_pull: f32,
    pub probe_eps: f32,
    /// Height above the terrain a beam lifts the feet to
    pub beam_step: f32,
    pub path_half_width: f32,
    pub wall_bounce: f32,
    /// How far below the terrain the player may fall before it counts as lost
    pub abyss_depth: f32,
    /// Push cooldown started by a bar hit
    pub knockback_cooldown: f32,
    pub knockback_message_secs: f32,

    // === Pushing ===
    pub push_min_dist: f32,
    pub push_max_dist: f32,
    /// Minimum cosine between facing and the direction to the boulder
    pub push_alignment: f32,
    pub push_force: f32,
    pub push_lean: f32,

    // === Camera ===
    /// Mouse counts per radian
    pub look_sensitivity: f32,
    pub pitch_limit: f32,
    pub camera_distance: f32,
    pub camera_height: f32,
    pub camera_clearance: f32,
    pub camera_step: f32,
    pub camera_max_steps: u32,

    // === Animation blend times (seconds) ===
    pub blend_walk: f32,
    pub blend_idle: f32,
    pub blend_rise: f32,
    pub blend_fall: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            half_height: 0.5,

            gravity: 40.0,
            jump_speed: 12.0,
            speed: 5.0,
            push_speed: 3.0,
            coyote_window: 0.15,
            ground_damping: 0.9,
            turn_rate: 0.1,
            rising_speed: 5.0,
            ground_tolerance: 0.1,

            pit_pull: 3.0,
            probe_eps: 0.05,
            beam_step: 0.3,
            path_half_width: 6.5,
            wall_bounce: -0.5,
            abyss_depth: 8.0,
            knockback_cooldown: 0.5,
            knockback_message_secs: 1.5,

            push_min_dist: 2.0,
            push_max_dist: 4.5,
            push_alignment: 0.5,
            push_force: 3.0,
            push_lean: 0.3,

            look_sensitivity: 700.0,
            pitch_limit: std::f32::consts::PI / 2.5,
            camera_distance: 6.0,
            camera_height: 1.5,
            camera_clearance: 0.8,
            camera_step: 0.1,
            camera_max_steps: 50,

            blend_walk: 0.1,
            blend_idle: 0.2,
            blend_rise: 0.1,
            blend_fall: 1.0,
        }
    }
}

/// Message timings for the game rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    pub failure_message_secs: f32,
    pub begin_again_message_secs: f32,
    pub reset_message_secs: f32,
    /// Time between reaching the summit and everything rolling back
    pub victory_hold: f32,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            failure_message_secs: 5.0,
            begin_again_message_secs: 2.0,
            reset_message_secs: 1.5,
            victory_hold: VICTORY_HOLD,
        }
    }
}

/// All tuning, one section per body plus the game rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub boulder: BoulderTuning,
    pub player: PlayerTuning,
    pub game: GameTuning,
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load tuning from a JSON file, falling back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("No tuning at {} ({e}), using defaults", path.display());
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Bad tuning file {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }
}
