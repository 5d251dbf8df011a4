//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;
use rand::Rng;

use super::combat;
use super::geom::Body;
use super::motion;
use super::progression;
use super::scoring;
use super::spawn;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent; clamped to unit length by the simulation
    pub movement: Vec2,
    pub fire: bool,
    pub boost: bool,
    /// Eagle strike / bomb
    pub special: bool,
    /// Demo mode - the simulation flies the player
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep, returning what happened
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    dt: f32,
    rng: &mut impl Rng,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Playing {
        return events;
    }
    state.time_ticks += 1;

    let input = if input.autopilot {
        autopilot(state)
    } else {
        input.clone()
    };

    // Player
    motion::move_player(&mut state.player, input.movement, input.boost, dt);
    motion::tick_player_timers(&mut state.player, dt);
    if input.special {
        combat::use_special(state, rng, &mut events);
    }
    combat::fire_player_weapons(state, input.fire, &mut events);

    // World
    spawn::run(state, rng, &mut events);
    motion::advance(state, rng);
    combat::enemy_fire(state);

    // Collisions
    combat::resolve_player_attacks(state, rng, &mut events);
    combat::collect_powerups(state, &mut events);
    combat::resolve_player_hits(state, rng, &mut events);

    // Bookkeeping
    scoring::tick_combo(state, &mut events);
    scoring::evaluate_achievements(state, &mut events);
    scoring::tick_notifications(state);
    progression::update(state, rng, &mut events);

    events
}

/// Lowest threat on screen, if any
fn lowest_threat(state: &GameState) -> Option<Vec2> {
    state
        .enemies
        .iter()
        .map(|e| e.center())
        .chain(state.asteroids.iter().map(|a| a.center()))
        .chain(state.mini_bosses.iter().map(|m| m.center()))
        .chain(state.boss.iter().map(|b| b.center()))
        .filter(|pos| pos.y > 0.0)
        .max_by(|a, b| a.y.total_cmp(&b.y))
}

/// Simple AI: dodge close hazards, otherwise line up under the lowest threat
fn autopilot(state: &GameState) -> TickInput {
    const DODGE_RANGE: f32 = 160.0;
    const DEADZONE: f32 = 8.0;

    let me = state.player.rect.center();
    let incoming = state
        .hazards
        .iter()
        .map(|h| h.center())
        .filter(|h| h.y < me.y && me.y - h.y < DODGE_RANGE && (h.x - me.x).abs() < PLAYER_WIDTH)
        .min_by(|a, b| (me.y - a.y).total_cmp(&(me.y - b.y)));

    let mut movement = Vec2::ZERO;
    let mut boost = false;
    if let Some(hazard) = incoming {
        let away = if hazard.x > me.x { -1.0 } else { 1.0 };
        // Dodge toward the roomier side when pinned against a wall
        let away = if me.x < PLAYER_WIDTH {
            1.0
        } else if me.x > SCREEN_WIDTH - PLAYER_WIDTH {
            -1.0
        } else {
            away
        };
        movement.x = away;
        boost = true;
    } else if let Some(target) = lowest_threat(state) {
        let dx = target.x - me.x;
        if dx.abs() > DEADZONE {
            movement.x = dx.signum();
        }
    }

    // Drift back toward the home row
    let dy = PLAYER_START_Y - me.y;
    if dy.abs() > DEADZONE {
        movement.y = dy.signum() * 0.5;
    }

    TickInput {
        movement,
        fire: true,
        boost,
        special: state.player.eagle_meter >= MAX_EAGLE && !state.enemies.is_empty(),
        autopilot: true,
    }
}
