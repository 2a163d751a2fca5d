//! Per-frame simulation tick
//!
//! Advances both bodies, then applies the game rules: failures send the
//! boulder back and wait for the player to walk down, reaching the summit
//! holds a victory for a few seconds before everything rolls back.

use super::state::{EventSink, Failure, FrameContext, GameEvent, GamePhase, TickInput, World};
use crate::consts::*;

/// Leave the title screen and put both bodies at the bottom
pub fn start(world: &mut World) {
    world.player.reset(PLAYER_START_Z);
    world.boulder.reset(PLAYER_START_Z);
    world.phase = GamePhase::Playing;
    log::info!("Game started (seed {})", world.seed);
}

/// Reset key: everything back to the bottom, best height forgotten
pub fn full_reset(world: &mut World) {
    world.player.reset(PLAYER_START_Z);
    world.boulder.reset(PLAYER_START_Z);
    world.boulder.max_z = 0.0;
    world.phase = GamePhase::Playing;
    let secs = world.tuning.game.reset_message_secs;
    world.show_message("Reset!", secs);
    log::info!("Full reset");
}

/// Advance the world by one frame
pub fn tick(world: &mut World, input: &TickInput, frame: FrameContext) {
    world.frame = frame;
    if world.phase == GamePhase::Title {
        return;
    }

    if input.pressed.reset {
        full_reset(world);
    }

    world.player.look(input.look.x, input.look.y);

    let mut events: Vec<GameEvent> = Vec::new();
    world.player.update(&frame, input, &mut world.boulder, &mut events);
    world.boulder.update(&frame, &mut world.rng, &mut events);

    // Walking back only counts once the failure is at least a frame old
    check_restart(world);

    let failures: Vec<Failure> = events
        .iter()
        .filter_map(|event| match event {
            GameEvent::Failure(failure) => Some(*failure),
            _ => None,
        })
        .collect();
    world.record(events);
    for failure in failures {
        trigger_restart(world, failure);
    }

    check_victory(world, frame.dt);

    if let Some(banner) = &mut world.banner {
        banner.remaining -= frame.dt;
        if banner.remaining <= 0.0 {
            world.banner = None;
        }
    }
}

fn trigger_restart(world: &mut World, failure: Failure) {
    if world.phase != GamePhase::Playing {
        return;
    }
    log::info!("Failure: {failure}");

    world.phase = GamePhase::RestartPending;
    let secs = world.tuning.game.failure_message_secs;
    world.show_message(&format!("{failure} Walk back to the bottom to restart."), secs);
    world.boulder.reset(BOULDER_RESTART_Z);
    if failure.resets_player() {
        world.player.reset(PLAYER_START_Z);
    }
}

fn check_restart(world: &mut World) {
    if world.phase != GamePhase::RestartPending || world.player.position.z >= 0.0 {
        return;
    }
    log::info!("Restarting");

    world.phase = GamePhase::Playing;
    let secs = world.tuning.game.begin_again_message_secs;
    world.show_message("Begin again...", secs);
    world.boulder.reset(BOULDER_RESTART_Z);
    world.boulder.max_z = 0.0;
}

fn check_victory(world: &mut World, dt: f32) {
    match world.phase {
        GamePhase::Playing if world.boulder.position.z >= VICTORY_Z => {
            let hold = world.tuning.game.victory_hold;
            log::info!("Victory! Best z {:.1}", world.boulder.max_z);
            world.phase = GamePhase::Victory { remaining: hold };
            world.show_message("Victory! But the boulder rolls back...", hold);
            world.record([GameEvent::Victory]);
        }
        GamePhase::Victory { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                world.phase = GamePhase::Victory { remaining };
                return;
            }
            log::info!("Rolling back to the bottom");
            world.boulder.reset(BOULDER_RESTART_Z);
            world.player.reset(PLAYER_START_Z);
            world.boulder.max_z = 0.0;
            world.phase = GamePhase::Playing;
        }
        _ => {}
    }
}
