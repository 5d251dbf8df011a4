//! Score, combo and achievement rules

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::geom::Rect;
use super::state::{GameEvent, GameState, PowerUp, PowerUpKind, WorldEvent};
use crate::achievements::{self, Notification};
use crate::consts::POWERUP_SIZE;

/// Award `base` points scaled by the combo multiplier; returns points added
pub fn add_score(state: &mut GameState, base: u64, events: &mut Vec<GameEvent>) -> u64 {
    let multiplier = state.tuning.combo_multiplier(state.combo.count);
    let points = (base as f64 * multiplier as f64).floor() as u64;
    add_flat_score(state, points, events);
    points
}

/// Award points without the combo multiplier (boss bonuses)
pub fn add_flat_score(state: &mut GameState, points: u64, events: &mut Vec<GameEvent>) {
    state.score += points;
    state.high_score = state.high_score.max(state.score);
    events.push(GameEvent::ScoreAwarded { points });
}

/// Extend the streak and restart its countdown
pub fn trigger_combo(state: &mut GameState) {
    state.combo.count += 1;
    state.combo.timer = state.tuning.combo_window_ticks;
}

pub fn reset_combo(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.combo.count > 0 {
        events.push(GameEvent::ComboLost);
    }
    state.combo.count = 0;
    state.combo.timer = 0;
}

/// Per-tick combo decay
pub fn tick_combo(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.combo.timer > 0 {
        state.combo.timer -= 1;
        if state.combo.timer == 0 {
            reset_combo(state, events);
        }
    }
}

/// Score, combo and counter bookkeeping for one destroyed enemy or asteroid
pub fn credit_kill(state: &mut GameState, base: u64, events: &mut Vec<GameEvent>) {
    add_score(state, base, events);
    trigger_combo(state);
    state.kills.total += 1;
}

/// Unlock any newly met achievements and queue their notifications
pub fn evaluate_achievements(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let progress = state.progress();
    for id in state.achievements.evaluate(&progress) {
        if let Some(achievement) = achievements::find(id) {
            log::info!("Achievement unlocked: {}", achievement.title);
            state.notifications.push_back(Notification::new(achievement));
        }
        events.push(GameEvent::AchievementUnlocked { id });
    }
}

/// Advance the front notification, dropping it when it expires
pub fn tick_notifications(state: &mut GameState) {
    if let Some(front) = state.notifications.front_mut() {
        front.ticks_remaining = front.ticks_remaining.saturating_sub(1);
        if front.ticks_remaining == 0 {
            state.notifications.pop_front();
        }
    }
}

/// Probability that a kill drops a power-up
pub fn drop_chance(state: &GameState) -> f32 {
    let t = &state.tuning;
    let mut chance = t.drop_base_chance + state.combo.count as f32 * t.drop_combo_step;
    chance += match state.event {
        Some(WorldEvent::Supply) => t.drop_supply_bonus,
        Some(_) => t.drop_event_bonus,
        None => 0.0,
    };
    if state.stage >= t.drop_stage_bonus_from {
        chance += t.drop_stage_bonus;
    }
    chance.clamp(0.0, 1.0)
}

/// Roll once for a drop at `pos`; returns true if a power-up spawned
pub fn roll_powerup(
    state: &mut GameState,
    pos: Vec2,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> bool {
    let chance = drop_chance(state);
    if rng.random::<f32>() < chance {
        spawn_powerup(state, pos, rng, events);
        true
    } else {
        false
    }
}

/// Unconditionally spawn a random power-up
pub fn spawn_powerup(
    state: &mut GameState,
    pos: Vec2,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let kind = *PowerUpKind::ALL.choose(rng).unwrap_or(&PowerUpKind::Rapid);
    let id = state.next_entity_id();
    state.powerups.push(PowerUp {
        id,
        kind,
        rect: Rect::centered(pos, POWERUP_SIZE, POWERUP_SIZE),
        phase: rng.random::<f32>() * std::f32::consts::TAU,
    });
    events.push(GameEvent::PowerUpDropped { kind, pos });
}

/// Guaranteed drops scattered over a defeated unit's body
pub fn scatter_powerups(
    state: &mut GameState,
    area: Rect,
    count: u32,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    for _ in 0..count {
        let pos = area.lerp_point(rng.random::<f32>(), rng.random::<f32>());
        spawn_powerup(state, pos, rng, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::AchievementBook;
    use crate::tuning::Tuning;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn state() -> GameState {
        GameState::new(Tuning::default(), 0, AchievementBook::new())
    }

    #[test]
    fn add_score_uses_multiplier() {
        let mut state = state();
        let mut events = Vec::new();
        assert_eq!(add_score(&mut state, 100, &mut events), 100);

        state.combo.count = 12;
        assert_eq!(add_score(&mut state, 100, &mut events), 400);
        assert_eq!(state.score, 500);
        assert_eq!(state.high_score, 500);
    }

    #[test]
    fn add_score_floors_fractions() {
        let mut state = state();
        state.combo.count = 1;
        // 50 * 1.25 = 62.5
        assert_eq!(add_score(&mut state, 50, &mut Vec::new()), 62);
    }

    #[test]
    fn combo_lapses_after_window() {
        let mut state = state();
        let mut events = Vec::new();
        trigger_combo(&mut state);
        trigger_combo(&mut state);
        assert_eq!(state.combo.count, 2);

        for _ in 0..state.tuning.combo_window_ticks - 1 {
            tick_combo(&mut state, &mut events);
        }
        assert_eq!(state.combo.count, 2);
        tick_combo(&mut state, &mut events);
        assert_eq!(state.combo.count, 0);
        assert_eq!(events, vec![GameEvent::ComboLost]);
    }

    #[test]
    fn drop_chance_scales_and_clamps() {
        let mut state = state();
        assert!((drop_chance(&state) - 0.20).abs() < 1e-6);
        state.combo.count = 4;
        assert!((drop_chance(&state) - 0.40).abs() < 1e-6);
        state.event = Some(WorldEvent::Supply);
        assert!((drop_chance(&state) - 0.70).abs() < 1e-6);
        state.combo.count = 100;
        assert_eq!(drop_chance(&state), 1.0);
    }

    #[test]
    fn achievements_queue_notifications() {
        let mut state = state();
        let mut events = Vec::new();
        state.kills.total = 1;
        evaluate_achievements(&mut state, &mut events);
        assert_eq!(events, vec![GameEvent::AchievementUnlocked { id: "first_blood" }]);
        assert_eq!(state.notifications.len(), 1);

        evaluate_achievements(&mut state, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn certain_drop_spawns() {
        let mut state = state();
        state.combo.count = 100;
        let mut rng = Pcg32::seed_from_u64(7);
        assert!(roll_powerup(&mut state, Vec2::new(100.0, 100.0), &mut rng, &mut Vec::new()));
        assert_eq!(state.powerups.len(), 1);
    }

    proptest! {
        #[test]
        fn multiplier_matches_formula(combo in 0u32..1000) {
            let tuning = Tuning::default();
            let expected = (1.0 + 0.25 * combo as f32).min(4.0);
            prop_assert!((tuning.combo_multiplier(combo) - expected).abs() < 1e-6);
        }
    }
}
