//! Spawn director
//!
//! Timers and probability rules that introduce new entities: solo enemies,
//! formations, asteroids, dropships (which later become mini-bosses) and
//! bosses. All spawn positions keep the entity horizontally inside the
//! play area.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::geom::Rect;
use super::state::{
    Asteroid, Boss, Dropship, Enemy, EnemyKind, Faction, GameEvent, GameState, MINI_BOSS_TEMPLATES,
    WorldEvent,
};
use crate::consts::*;

/// Geometric enemy groupings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formation {
    Line,
    Arrow,
    Walls,
    Diamond,
    Cross,
}

impl Formation {
    pub const ALL: [Formation; 5] = [
        Formation::Line,
        Formation::Arrow,
        Formation::Walls,
        Formation::Diamond,
        Formation::Cross,
    ];

    /// Member offsets in spacing units; negative y trails above the leader
    pub fn offsets(self) -> &'static [(f32, f32)] {
        match self {
            Formation::Line => &[(-2.0, 0.0), (-1.0, 0.0), (0.0, 0.0), (1.0, 0.0), (2.0, 0.0)],
            Formation::Arrow => &[(0.0, 0.0), (-1.0, -1.0), (1.0, -1.0), (-2.0, -2.0), (2.0, -2.0)],
            Formation::Walls => &[
                (-3.0, 0.0),
                (-3.0, -1.0),
                (-3.0, -2.0),
                (3.0, 0.0),
                (3.0, -1.0),
                (3.0, -2.0),
            ],
            Formation::Diamond => &[(0.0, 0.0), (-1.0, -1.0), (1.0, -1.0), (0.0, -2.0)],
            Formation::Cross => &[(0.0, 0.0), (0.0, -1.0), (0.0, -2.0), (-1.0, -1.0), (1.0, -1.0)],
        }
    }

    /// Widest horizontal reach in spacing units
    fn half_span(self) -> f32 {
        self.offsets()
            .iter()
            .fold(0.0f32, |acc, &(dx, _)| acc.max(dx.abs()))
    }
}

const FORMATION_SPEED: f32 = 2.2;
const PATROL_FIRE_STAGGER: u32 = 15;
const DROPSHIP_SPAWN_Y: f32 = -150.0;
const MINI_WARNING_TICKS: u32 = 150;

/// Run every spawn rule for one tick
pub fn run(state: &mut GameState, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    spawn_boss_if_due(state, events);

    // Stage transitions hold back new arrivals briefly
    if state.stage_transition_ticks > 0 {
        return;
    }

    if !state.boss_alive() {
        spawn_enemies(state, rng);
        spawn_formations(state, rng);
        spawn_asteroids(state, rng);
    }
    spawn_dropships(state, rng, events);
}

/// Horizontal center range that keeps an entity of `width` inside the margins
fn spawn_x(rng: &mut impl Rng, width: f32) -> f32 {
    let lo = SPAWN_MARGIN.max(width / 2.0);
    let hi = SCREEN_WIDTH - lo;
    if hi <= lo {
        return SCREEN_WIDTH / 2.0;
    }
    rng.random_range(lo..=hi)
}

/// Ticks between enemy spawns for the current stage and event
pub fn enemy_spawn_threshold(state: &GameState) -> u32 {
    let t = &state.tuning;
    let base = t
        .enemy_spawn_base
        .saturating_sub(state.stage.saturating_mul(t.enemy_spawn_stage_factor))
        .max(t.enemy_spawn_min);
    let multiplier = state.event.map_or(1.0, WorldEvent::spawn_multiplier);
    (base as f32 / multiplier).floor() as u32
}

fn spawn_enemies(state: &mut GameState, rng: &mut impl Rng) {
    state.timers.enemy += 1;
    if state.timers.enemy <= enemy_spawn_threshold(state) {
        return;
    }
    state.timers.enemy = 0;

    if state.event == Some(WorldEvent::Patrol) {
        let count = rng.random_range(5..=8);
        spawn_patrol_line(state, count, rng);
    } else {
        spawn_solo_enemy(state, rng);
    }
}

/// Choose a kind using the faction's weighting
fn roll_kind(faction: Faction, rng: &mut impl Rng) -> EnemyKind {
    match faction {
        Faction::Swarm => {
            if rng.random::<f32>() < 0.7 {
                EnemyKind::Grunt
            } else {
                EnemyKind::Fast
            }
        }
        Faction::Machine => {
            if rng.random::<f32>() < 0.7 {
                EnemyKind::Shooter
            } else if rng.random_bool(0.5) {
                EnemyKind::Grunt
            } else {
                EnemyKind::Fast
            }
        }
        Faction::Lights => *[EnemyKind::Grunt, EnemyKind::Fast, EnemyKind::Shooter]
            .choose(rng)
            .unwrap_or(&EnemyKind::Grunt),
    }
}

fn roll_speed(kind: EnemyKind, faction: Faction, rng: &mut impl Rng) -> f32 {
    let base = match kind {
        EnemyKind::Grunt => rng.random_range(2.0..3.5),
        EnemyKind::Fast => rng.random_range(4.0..6.0),
        EnemyKind::Shooter => rng.random_range(2.5..4.0),
    };
    if faction == Faction::Lights { base * 1.1 } else { base }
}

fn roll_wiggle(state: &GameState, rng: &mut impl Rng) -> f32 {
    let range = match state.faction() {
        Faction::Swarm if state.event == Some(WorldEvent::Breach) => 2.0,
        Faction::Swarm => 1.5,
        Faction::Machine => 0.8,
        Faction::Lights => 1.2,
    };
    rng.random_range(-range..=range)
}

pub fn spawn_solo_enemy(state: &mut GameState, rng: &mut impl Rng) {
    let faction = state.faction();
    let kind = roll_kind(faction, rng);
    let speed = roll_speed(kind, faction, rng);
    let wiggle = roll_wiggle(state, rng);
    let x = spawn_x(rng, ENEMY_WIDTH);
    let skin = rng.random_range(0..faction.skin_count());
    let id = state.next_entity_id();
    state.enemies.push(Enemy {
        id,
        kind,
        rect: Rect::centered(Vec2::new(x, ENEMY_SPAWN_Y), ENEMY_WIDTH, ENEMY_HEIGHT),
        speed,
        wiggle,
        fire_timer: 0,
        in_formation: false,
        skin,
        hp: 1,
    });
    log::debug!("Spawned {kind:?} at x={x:.0}");
}

/// Row of shooters with staggered fire timers
fn spawn_patrol_line(state: &mut GameState, count: u32, rng: &mut impl Rng) {
    let skins = Faction::Machine.skin_count();
    let row_width = count as f32 * FORMATION_SPACING;
    let start = SCREEN_WIDTH / 2.0 - row_width / 2.0 + FORMATION_SPACING / 2.0;
    for i in 0..count {
        let skin = rng.random_range(0..skins);
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            kind: EnemyKind::Shooter,
            rect: Rect::centered(
                Vec2::new(start + i as f32 * FORMATION_SPACING, ENEMY_SPAWN_Y),
                ENEMY_WIDTH,
                ENEMY_HEIGHT,
            ),
            speed: FORMATION_SPEED,
            wiggle: 0.0,
            fire_timer: i * PATROL_FIRE_STAGGER,
            in_formation: true,
            skin,
            hp: 1,
        });
    }
}

fn spawn_formations(state: &mut GameState, rng: &mut impl Rng) {
    state.timers.formation += 1;
    if state.timers.formation <= state.tuning.formation_interval_ticks {
        return;
    }
    state.timers.formation = 0;
    let formation = *Formation::ALL.choose(rng).unwrap_or(&Formation::Line);
    spawn_formation(state, formation, rng);
}

/// Emit every member of a formation around a random anchor
pub fn spawn_formation(state: &mut GameState, formation: Formation, rng: &mut impl Rng) {
    let faction = state.faction();
    let kind = roll_kind(faction, rng);
    let reach = formation.half_span() * FORMATION_SPACING * 2.0 + ENEMY_WIDTH;
    let anchor_x = spawn_x(rng, reach);
    for &(dx, dy) in formation.offsets() {
        let center = Vec2::new(
            anchor_x + dx * FORMATION_SPACING,
            ENEMY_SPAWN_Y + dy * FORMATION_SPACING,
        );
        let skin = rng.random_range(0..faction.skin_count());
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            kind,
            rect: Rect::centered(center, ENEMY_WIDTH, ENEMY_HEIGHT),
            speed: FORMATION_SPEED,
            wiggle: 0.0,
            fire_timer: 0,
            in_formation: true,
            skin,
            hp: 1,
        });
    }
    log::debug!("Spawned {formation:?} formation of {kind:?}");
}

fn spawn_asteroids(state: &mut GameState, rng: &mut impl Rng) {
    if state.event.is_some_and(WorldEvent::suppresses_asteroids) {
        return;
    }
    state.timers.asteroid += 1;
    if state.timers.asteroid <= state.tuning.asteroid_interval_ticks {
        return;
    }
    state.timers.asteroid = 0;

    let x = spawn_x(rng, ASTEROID_SIZE);
    let id = state.next_entity_id();
    state.asteroids.push(Asteroid {
        id,
        rect: Rect::centered(Vec2::new(x, ASTEROID_SPAWN_Y), ASTEROID_SIZE, ASTEROID_SIZE),
        speed: rng.random_range(1.8..4.0),
        rotation: 0.0,
        rot_speed: rng.random_range(-6.0..6.0),
    });
}

/// A new dropship may launch: none in flight, below the mini-boss cap and
/// any live boss under half health
pub fn dropship_allowed(state: &GameState) -> bool {
    state.dropships.is_empty()
        && state.mini_bosses.len() < state.tuning.mini_boss_cap
        && state
            .boss
            .as_ref()
            .is_none_or(|boss| boss.health_fraction() < 0.5)
}

fn spawn_dropships(state: &mut GameState, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    state.timers.mini += 1;
    if state.timers.mini <= state.tuning.mini_spawn_cooldown_ticks || !dropship_allowed(state) {
        return;
    }
    if rng.random::<f32>() < state.tuning.dropship_chance {
        let x = spawn_x(rng, DROPSHIP_WIDTH);
        spawn_dropship(state, x, rng, events);
        state.timers.mini = 0;
    }
}

/// Launch a dropship carrying a random mini-boss variant
pub fn spawn_dropship(
    state: &mut GameState,
    x: f32,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let payload = rng.random_range(0..MINI_BOSS_TEMPLATES.len());
    let id = state.next_entity_id();
    let pos = Vec2::new(x, DROPSHIP_SPAWN_Y);
    state.dropships.push(Dropship {
        id,
        rect: Rect::centered(pos, DROPSHIP_WIDTH, DROPSHIP_HEIGHT),
        frame: 0,
        frame_timer: 0,
        payload,
    });
    state.mini_warning_ticks = MINI_WARNING_TICKS;
    events.push(GameEvent::DropshipIncoming { pos });
    log::info!("Dropship inbound with mini-boss variant {payload}");
}

/// Whole health steps earned by `score`, saturating at `i32::MAX`
pub fn score_steps(score: u64, step: u64) -> i32 {
    i32::try_from(score / step.max(1)).unwrap_or(i32::MAX)
}

/// Boss health for the current score and variant
pub fn boss_health(state: &GameState, variant: u32) -> i32 {
    let t = &state.tuning;
    let steps = score_steps(state.score, t.boss_health_score_step);
    let base = t
        .boss_base_health
        .saturating_add(steps.saturating_mul(t.boss_health_per_step));
    let multiplier = t
        .boss_variant_health
        .get(variant as usize)
        .copied()
        .unwrap_or(1.0);
    ((base as f32 * multiplier) as i32).max(1)
}

/// Spawn the next boss once its score threshold is reached
pub fn spawn_boss_if_due(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.boss_alive()
        || state.boss_cooldown_ticks > 0
        || state.score < state.next_boss_threshold
    {
        return;
    }

    let variant = (state.kills.bosses % BOSS_VARIANTS as u64) as u32;
    let health = boss_health(state, variant);
    let id = state.next_entity_id();
    state.boss = Some(Boss {
        id,
        variant,
        rect: Rect::centered(
            Vec2::new(SCREEN_WIDTH / 2.0, BOSS_ANCHOR_Y),
            BOSS_WIDTH,
            BOSS_HEIGHT,
        ),
        anchor_y: BOSS_ANCHOR_Y - BOSS_HEIGHT / 2.0,
        health,
        max_health: health,
        phase: 1,
        direction: 1.0,
        speed: BOSS_SPEED,
        fire_timer: 0,
        osc_phase: 0.0,
        special_timer: 0,
        invulnerable: false,
        invulnerable_ticks: 0,
    });
    state.boss_warning_ticks = BOSS_WARNING_TICKS;
    events.push(GameEvent::BossWarning { variant });
    log::info!("Boss variant {variant} incoming with {health} health (score {})", state.score);
}
