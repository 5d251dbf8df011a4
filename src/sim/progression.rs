//! Stage, world event and boss/mini-boss progression
//!
//! Evaluated once per tick after combat. Stage index follows score
//! milestones, world events run on a timer, and heavy units step through
//! their health-gated phases here.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::geom::{Body, Rect};
use super::spawn;
use super::state::{
    Boss, GameEvent, GameState, MINI_BOSS_TEMPLATES, MiniBoss, WorldEvent,
};
use crate::consts::*;

const BOSS_FIRE_TICKS: u32 = 60;
const BOSS_ENRAGED_FIRE_TICKS: u32 = 40;
const BOSS_OFFSETS: [f32; 4] = [-60.0, -20.0, 20.0, 60.0];
const BOSS_ENRAGED_OFFSETS: [f32; 6] = [-80.0, -50.0, -20.0, 20.0, 50.0, 80.0];
const BOSS_PHASE_SPEEDUP: f32 = 1.5;

/// Variant 0: extra volley period
const VOLLEY_TICKS: u32 = 90;
/// Variant 1: shield cycle and window
const SHIELD_CYCLE_TICKS: u32 = 240;
const SHIELD_WINDOW_TICKS: u32 = 60;
/// Variant 2: reinforcement period
const REINFORCE_TICKS: u32 = 360;

const MINI_PHASE_SPEEDUP: f32 = 1.5;
const MINI_PHASE_FIRE_SCALE: f32 = 0.8;
/// Enraged mini-bosses fire at this fraction of their stored threshold
const MINI_ENRAGED_FIRE_RUSH: f32 = 0.7;

/// Reset range for the world event check timer
const EVENT_CHECK_RESET_MIN: i64 = -2400;

/// Run every progression rule for one tick
pub fn update(state: &mut GameState, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    advance_stage(state, events);
    update_world_event(state, rng, events);
    update_boss(state, rng, events);
    deploy_mini_bosses(state, rng, events);
    update_mini_bosses(state, events);
    state.mini_warning_ticks = state.mini_warning_ticks.saturating_sub(1);
}

/// Step the stage index toward the score milestone, one stage per transition
pub fn advance_stage(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.stage_transition_ticks > 0 {
        state.stage_transition_ticks -= 1;
        return;
    }

    let target = state.score / state.tuning.stage_milestone.max(1);
    if target <= state.stage as u64 {
        return;
    }

    state.stage += 1;
    state.stage_transition_ticks = STAGE_TRANSITION_TICKS;
    state.music_track = (state.music_track + 1) % MUSIC_TRACKS;
    events.push(GameEvent::StageAdvanced { stage: state.stage });
    events.push(GameEvent::MusicAdvanced {
        track: state.music_track,
    });
    log::info!(
        "Stage {} reached at score {} ({:?})",
        state.stage,
        state.score,
        state.faction()
    );
}

/// Count down the running event, or roll for a new one
pub fn update_world_event(
    state: &mut GameState,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    if let Some(event) = state.event {
        state.event_ticks = state.event_ticks.saturating_sub(1);
        if state.event_ticks == 0 {
            state.event = None;
            events.push(GameEvent::WorldEventEnded { event });
            log::info!("World event {event:?} ended");
        }
        return;
    }

    if state.boss.is_some() || !state.mini_bosses.is_empty() {
        return;
    }

    state.event_check_ticks += 1;
    let step = state.tuning.event_score_step.max(1);
    let milestone = state.score / step * step;
    let crossed = milestone > state.last_event_score;
    if !crossed && state.event_check_ticks <= state.tuning.event_idle_ticks as i64 {
        return;
    }

    // One roll per evaluation no matter how many milestones were crossed
    state.last_event_score = state.last_event_score.max(milestone);
    state.event_check_ticks = rng.random_range(EVENT_CHECK_RESET_MIN..=0);
    if rng.random::<f32>() >= state.tuning.event_chance {
        return;
    }
    let Some(&event) = WorldEvent::ALL.choose(rng) else {
        return;
    };
    state.event = Some(event);
    state.event_ticks = state.tuning.event_duration_ticks.max(1);
    events.push(GameEvent::WorldEventStarted { event });
    log::info!("World event {event:?} started at score {}", state.score);
}

/// Warning, phase, fire and special handling for the live boss
pub fn update_boss(state: &mut GameState, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    let Some(boss) = state.boss.as_mut() else {
        state.boss_cooldown_ticks = state.boss_cooldown_ticks.saturating_sub(1);
        return;
    };

    if state.boss_warning_ticks > 0 {
        state.boss_warning_ticks -= 1;
        return;
    }

    if let Some(phase) = boss_phase_change(boss) {
        events.push(GameEvent::BossPhase { phase });
        log::info!("Boss entered phase {phase}");
    }

    let mut muzzles = Vec::new();
    boss.fire_timer += 1;
    let (threshold, offsets): (u32, &[f32]) = if boss.phase >= 2 {
        (BOSS_ENRAGED_FIRE_TICKS, &BOSS_ENRAGED_OFFSETS)
    } else {
        (BOSS_FIRE_TICKS, &BOSS_OFFSETS)
    };
    if boss.fire_timer > threshold {
        boss.fire_timer = 0;
        muzzles.extend(volley(&boss.rect, offsets));
    }

    if boss.invulnerable_ticks > 0 {
        boss.invulnerable_ticks -= 1;
        boss.invulnerable = boss.invulnerable_ticks > 0;
    }

    let mut reinforce = None;
    if boss.phase >= 3 {
        boss.special_timer += 1;
        match boss.variant {
            0 if boss.special_timer >= VOLLEY_TICKS => {
                boss.special_timer = 0;
                muzzles.extend(volley(&boss.rect, &BOSS_ENRAGED_OFFSETS));
            }
            1 if boss.special_timer >= SHIELD_CYCLE_TICKS => {
                boss.special_timer = 0;
                boss.invulnerable = true;
                boss.invulnerable_ticks = SHIELD_WINDOW_TICKS;
                log::debug!("Boss shield up");
            }
            2 if boss.special_timer >= REINFORCE_TICKS => {
                boss.special_timer = 0;
                reinforce = Some(boss.center().x);
            }
            _ => {}
        }
    }

    for pos in muzzles {
        state.push_hazard(pos);
    }
    if let Some(x) = reinforce {
        if spawn::dropship_allowed(state) {
            spawn::spawn_dropship(state, x, rng, events);
        } else {
            log::debug!("Boss reinforcement held back");
        }
    }
}

/// Apply a health-gated phase change; returns the new phase if it changed
fn boss_phase_change(boss: &mut Boss) -> Option<u8> {
    let fraction = boss.health_fraction();
    let target = if fraction <= 0.25 {
        3
    } else if fraction <= 0.5 {
        2
    } else {
        1
    };
    if target <= boss.phase {
        return None;
    }
    if boss.phase < 2 {
        boss.speed *= BOSS_PHASE_SPEEDUP;
    }
    boss.phase = target;
    boss.special_timer = 0;
    Some(target)
}

/// Muzzle points along the bottom edge of a firing unit
fn volley(rect: &Rect, offsets: &[f32]) -> Vec<Vec2> {
    let origin = Vec2::new(rect.center().x, rect.bottom());
    offsets.iter().map(|&dx| origin + Vec2::new(dx, 0.0)).collect()
}

/// Convert dropships that have descended far enough into mini-bosses
pub fn deploy_mini_bosses(
    state: &mut GameState,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let (arrived, inbound): (Vec<_>, Vec<_>) = std::mem::take(&mut state.dropships)
        .into_iter()
        .partition(|d| d.rect.top() > DROPSHIP_DEPLOY_DEPTH);
    state.dropships = inbound;

    for dropship in arrived {
        if state.mini_bosses.len() >= state.tuning.mini_boss_cap {
            log::debug!("Dropship {} recalled, mini-boss cap reached", dropship.id);
            continue;
        }
        let payload = dropship.payload.min(MINI_BOSS_TEMPLATES.len() - 1);
        let template = MINI_BOSS_TEMPLATES[payload];
        let t = &state.tuning;
        let steps = spawn::score_steps(state.score, t.mini_health_score_step);
        let health = template
            .health_base
            .saturating_add(steps.saturating_mul(t.mini_health_per_step))
            .max(1);
        let pos = dropship.center();
        let id = state.next_entity_id();
        let mut rect = Rect::centered(pos, template.width, template.height);
        rect.clamp_within(&Rect::new(
            SPAWN_MARGIN,
            rect.y,
            SCREEN_WIDTH - 2.0 * SPAWN_MARGIN,
            rect.h,
        ));
        state.mini_bosses.push(MiniBoss {
            id,
            template: payload,
            rect,
            health,
            max_health: health,
            phase: 1,
            direction: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            speed: template.speed,
            fire_timer: rng.random_range(0.0..template.fire_threshold),
            fire_threshold: template.fire_threshold,
        });
        events.push(GameEvent::MiniBossDeployed { pos });
        log::info!("Mini-boss {id} deployed with {health} health");
    }
}

/// Phase changes and firing for active mini-bosses
pub fn update_mini_bosses(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let mut muzzles = Vec::new();
    for mini in &mut state.mini_bosses {
        if mini.phase < 2 && mini.health_fraction() <= 0.5 {
            mini.phase = 2;
            mini.speed *= MINI_PHASE_SPEEDUP;
            mini.fire_threshold *= MINI_PHASE_FIRE_SCALE;
            events.push(GameEvent::MiniBossPhase { phase: 2 });
        }

        mini.fire_timer += 1.0;
        let threshold = if mini.phase >= 2 {
            mini.fire_threshold * MINI_ENRAGED_FIRE_RUSH
        } else {
            mini.fire_threshold
        };
        if mini.fire_timer > threshold {
            mini.fire_timer = 0.0;
            muzzles.extend(volley(&mini.rect, mini.offsets()));
        }
    }
    for pos in muzzles {
        state.push_hazard(pos);
    }
}
