//! Collision and combat resolution
//!
//! Player missiles test targets in a fixed priority order (enemies,
//! asteroids, boss, mini-bosses) and are consumed by the first hit. Hazards
//! test the player in their own fixed order and at most one applies per tick.
//! Removals happen by index on the target collections while missiles are
//! held outside the state, so no collection is mutated mid-iteration.

use glam::Vec2;
use rand::Rng;

use super::geom::{Body, Rect};
use super::scoring::{
    add_flat_score, add_score, credit_kill, reset_combo, roll_powerup, scatter_powerups,
    trigger_combo,
};
use super::state::{
    Enemy, EnemyKind, GameEvent, GamePhase, GameState, Missile, PowerUpKind, WorldEvent,
};
use crate::consts::*;

/// Eagle strike / bomb damage against heavy units
const EAGLE_MINI_DAMAGE: i32 = 600;
const EAGLE_BOSS_DAMAGE: i32 = 500;
const BOMB_MINI_DAMAGE: i32 = 400;
const BOMB_BOSS_DAMAGE: i32 = 300;

/// Spawn missiles if the trigger is held and the weapon is ready
pub fn fire_player_weapons(state: &mut GameState, fire: bool, events: &mut Vec<GameEvent>) {
    let player = &mut state.player;
    if !fire || player.fire_cooldown > 0.0 {
        return;
    }
    player.fire_cooldown = if player.rapid_timer > 0.0 {
        FIRE_COOLDOWN / 2.0
    } else {
        FIRE_COOLDOWN
    };

    let shots: u32 = if player.triple_timer > 0.0 { 3 } else { 1 };
    let origin = Vec2::new(player.rect.center().x, player.rect.top());
    for i in 0..shots {
        let offset = (i as f32 - (shots / 2) as f32) * TRIPLE_SPREAD;
        let id = state.next_entity_id();
        state.missiles.push(Missile {
            id,
            rect: Rect::centered(origin + Vec2::new(offset, 0.0), MISSILE_WIDTH, MISSILE_HEIGHT),
            vel: Vec2::new(0.0, -MISSILE_SPEED),
        });
    }
    events.push(GameEvent::MissilesFired { count: shots });
}

/// Eagle strike when the meter is full, otherwise a bomb if one is ready
pub fn use_special(state: &mut GameState, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    if state.player.eagle_meter >= MAX_EAGLE {
        let base = state.tuning.eagle_kill_score;
        destroy_all_enemies(state, base, events);
        for mini in &mut state.mini_bosses {
            mini.damage(EAGLE_MINI_DAMAGE);
        }
        if let Some(boss) = state.boss.as_mut() {
            boss.damage(EAGLE_BOSS_DAMAGE);
        }
        state.player.eagle_meter = 0.0;
        events.push(GameEvent::EagleStrike);
        log::debug!("Eagle strike");
    } else if state.player.bomb_charges > 0 && state.player.bomb_cooldown <= 0.0 {
        state.player.bomb_charges -= 1;
        state.player.bomb_cooldown = BOMB_COOLDOWN;
        let base = state.tuning.bomb_kill_score;
        destroy_all_enemies(state, base, events);
        state.asteroids.clear();
        state.hazards.clear();
        for mini in &mut state.mini_bosses {
            mini.damage(BOMB_MINI_DAMAGE);
        }
        if let Some(boss) = state.boss.as_mut() {
            boss.damage(BOMB_BOSS_DAMAGE);
        }
        events.push(GameEvent::BombDetonated);
        log::debug!("Bomb detonated, {} charges left", state.player.bomb_charges);
    }
    resolve_defeats(state, rng, events);
}

fn destroy_all_enemies(state: &mut GameState, base: u64, events: &mut Vec<GameEvent>) {
    for enemy in std::mem::take(&mut state.enemies) {
        credit_kill(state, base, events);
        events.push(GameEvent::EnemyKilled {
            kind: enemy.kind,
            pos: enemy.center(),
        });
    }
}

/// Kill credit for one enemy, including its drop roll
fn destroy_enemy(
    state: &mut GameState,
    enemy: &Enemy,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let pos = enemy.center();
    let base = state.tuning.enemy_score;
    credit_kill(state, base, events);
    events.push(GameEvent::EnemyKilled {
        kind: enemy.kind,
        pos,
    });
    roll_powerup(state, pos, rng, events);
}

/// Resolve every player missile against the targets it overlaps
pub fn resolve_player_attacks(
    state: &mut GameState,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) {
    let missiles = std::mem::take(&mut state.missiles);
    let mut survivors = Vec::with_capacity(missiles.len());
    for missile in missiles {
        if !strike(state, &missile.rect, rng, events) {
            survivors.push(missile);
        }
    }
    state.missiles = survivors;
    resolve_defeats(state, rng, events);
}

/// Apply one missile; returns true if it hit something
fn strike(
    state: &mut GameState,
    rect: &Rect,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> bool {
    if let Some(i) = state.enemies.iter().position(|e| e.hits(rect)) {
        state.enemies[i].hp -= 1;
        if state.enemies[i].hp <= 0 {
            let enemy = state.enemies.remove(i);
            destroy_enemy(state, &enemy, rng, events);
        }
        return true;
    }

    if let Some(i) = state.asteroids.iter().position(|a| a.hits(rect)) {
        let asteroid = state.asteroids.remove(i);
        let pos = asteroid.center();
        let base = state.tuning.asteroid_score;
        credit_kill(state, base, events);
        events.push(GameEvent::AsteroidDestroyed { pos });
        roll_powerup(state, pos, rng, events);
        return true;
    }

    let impact = rect.center();
    if let Some(boss) = state.boss.as_mut().filter(|b| b.hits(rect)) {
        boss.damage(MISSILE_DAMAGE_BOSS);
        splash(state, impact, rng, events);
        return true;
    }

    if let Some(mini) = state.mini_bosses.iter_mut().find(|m| m.hits(rect)) {
        mini.damage(MISSILE_DAMAGE_MINI);
        splash(state, impact, rng, events);
        return true;
    }

    false
}

/// Destroy every enemy whose center lies within the splash radius
fn splash(state: &mut GameState, impact: Vec2, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    let radius = state.tuning.splash_radius;
    let (caught, spared): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(|e| e.center().distance(impact) <= radius);
    state.enemies = spared;
    for enemy in &caught {
        destroy_enemy(state, enemy, rng, events);
    }
}

/// Remove defeated mini-bosses and boss, paying out their rewards
pub fn resolve_defeats(state: &mut GameState, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
    let (defeated, alive): (Vec<_>, Vec<_>) = std::mem::take(&mut state.mini_bosses)
        .into_iter()
        .partition(|m| m.is_dead());
    state.mini_bosses = alive;
    for mini in defeated {
        let bonus = state.tuning.mini_boss_bonus;
        add_flat_score(state, bonus, events);
        trigger_combo(state);
        state.kills.total += 1;
        state.kills.mini_bosses += 1;
        state.timers.mini = 0;
        let drops = state.tuning.mini_boss_drops;
        scatter_powerups(state, mini.rect, drops, rng, events);
        events.push(GameEvent::MiniBossDefeated { pos: mini.center() });
        log::info!("Mini-boss {} defeated", mini.id);
    }

    if !state.boss.as_ref().is_some_and(|b| b.is_dead()) {
        return;
    }
    let Some(boss) = state.boss.take() else {
        return;
    };
    let bonus = state.tuning.boss_bonus;
    add_flat_score(state, bonus, events);
    trigger_combo(state);
    state.kills.total += 1;
    state.kills.bosses += 1;
    state.next_boss_threshold = state.score + state.tuning.boss_threshold_step.max(1);
    state.boss_cooldown_ticks = state.tuning.boss_cooldown_ticks;
    state.boss_warning_ticks = 0;
    let drops = state.tuning.boss_drops;
    scatter_powerups(state, boss.rect, drops, rng, events);
    events.push(GameEvent::BossDefeated {
        variant: boss.variant,
        pos: boss.center(),
    });
    log::info!(
        "Boss variant {} defeated; next boss at {}",
        boss.variant,
        state.next_boss_threshold
    );
}

/// Shooters release a hazard when their fire timer elapses
pub fn enemy_fire(state: &mut GameState) {
    let threshold = if state.event == Some(WorldEvent::Patrol) {
        (SHOOTER_FIRE_TICKS as f32 / 1.5) as u32
    } else {
        SHOOTER_FIRE_TICKS
    };
    let mut muzzles = Vec::new();
    for enemy in state.enemies.iter_mut().filter(|e| e.kind == EnemyKind::Shooter) {
        enemy.fire_timer += 1;
        if enemy.fire_timer > threshold {
            enemy.fire_timer = 0;
            muzzles.push(enemy.center());
        }
    }
    for pos in muzzles {
        state.push_hazard(pos);
    }
}

/// Pick up every power-up the player overlaps
pub fn collect_powerups(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let player_rect = state.player.rect;
    let (taken, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut state.powerups)
        .into_iter()
        .partition(|p| p.hits(&player_rect));
    state.powerups = remaining;

    for powerup in taken {
        let points = state.tuning.pickup_score;
        add_score(state, points, events);
        let player = &mut state.player;
        match powerup.kind {
            PowerUpKind::Rapid => player.rapid_timer = player.rapid_timer.max(RAPID_DURATION),
            PowerUpKind::Triple => player.triple_timer = player.triple_timer.max(TRIPLE_DURATION),
            PowerUpKind::Shield => player.shield_active = true,
            PowerUpKind::Bomb => {
                player.bomb_charges = (player.bomb_charges + 1).min(MAX_BOMB_CHARGES)
            }
            PowerUpKind::Life => player.lives = (player.lives + 1).min(MAX_LIVES),
        }
        events.push(GameEvent::PowerUpCollected {
            kind: powerup.kind,
        });
    }
}

/// Source of a hit on the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSource {
    Hazard,
    Enemy,
    Asteroid,
    Boss,
    MiniBoss,
}

/// Test hazards against the player in priority order; first match applies
pub fn resolve_player_hits(
    state: &mut GameState,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> Option<HitSource> {
    if state.player.is_invincible() || state.phase != GamePhase::Playing {
        return None;
    }
    let player_rect = state.player.rect;

    let source = if let Some(i) = state.hazards.iter().position(|h| h.hits(&player_rect)) {
        state.hazards.remove(i);
        HitSource::Hazard
    } else if let Some(i) = state.enemies.iter().position(|e| e.hits(&player_rect)) {
        let enemy = state.enemies.remove(i);
        roll_powerup(state, enemy.center(), rng, events);
        HitSource::Enemy
    } else if let Some(i) = state.asteroids.iter().position(|a| a.hits(&player_rect)) {
        let asteroid = state.asteroids.remove(i);
        roll_powerup(state, asteroid.center(), rng, events);
        HitSource::Asteroid
    } else if state.boss.as_ref().is_some_and(|b| b.hits(&player_rect)) {
        HitSource::Boss
    } else if state.mini_bosses.iter().any(|m| m.hits(&player_rect)) {
        HitSource::MiniBoss
    } else {
        return None;
    };

    damage_player(state, events);
    Some(source)
}

/// Apply one hit: shield absorbs it, otherwise a life is lost
pub fn damage_player(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.player.shield_active {
        state.player.shield_active = false;
        state.player.invincible_ticks = state.tuning.shield_grace_ticks;
        events.push(GameEvent::PlayerHit {
            shield_absorbed: true,
            lives: state.player.lives,
        });
        return;
    }

    state.player.lives = state.player.lives.saturating_sub(1);
    state.player.invincible_ticks = state.tuning.invincibility_ticks;
    state.player.recenter();
    reset_combo(state, events);
    events.push(GameEvent::PlayerHit {
        shield_absorbed: false,
        lives: state.player.lives,
    });

    if state.player.lives == 0 {
        state.phase = GamePhase::GameOver;
        events.push(GameEvent::PlayerDestroyed { score: state.score });
        log::info!("Player destroyed with score {}", state.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::AchievementBook;
    use crate::sim::state::{Asteroid, Boss, Hazard, MiniBoss, PowerUp};
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn state() -> GameState {
        GameState::new(Tuning::default(), 0, AchievementBook::new())
    }

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(99)
    }

    fn enemy_at(state: &mut GameState, center: Vec2) {
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            kind: EnemyKind::Grunt,
            rect: Rect::centered(center, ENEMY_WIDTH, ENEMY_HEIGHT),
            speed: 2.0,
            wiggle: 0.0,
            fire_timer: 0,
            in_formation: false,
            skin: 0,
            hp: 1,
        });
    }

    fn missile_at(state: &mut GameState, center: Vec2) {
        let id = state.next_entity_id();
        state.missiles.push(Missile {
            id,
            rect: Rect::centered(center, MISSILE_WIDTH, MISSILE_HEIGHT),
            vel: Vec2::new(0.0, -MISSILE_SPEED),
        });
    }

    fn boss_at(state: &mut GameState, center: Vec2, health: i32) {
        let id = state.next_entity_id();
        state.boss = Some(Boss {
            id,
            variant: 0,
            rect: Rect::centered(center, BOSS_WIDTH, BOSS_HEIGHT),
            anchor_y: center.y - BOSS_HEIGHT / 2.0,
            health,
            max_health: 2000,
            phase: 1,
            direction: 1.0,
            speed: BOSS_SPEED,
            fire_timer: 0,
            osc_phase: 0.0,
            special_timer: 0,
            invulnerable: false,
            invulnerable_ticks: 0,
        });
    }

    fn mini_at(state: &mut GameState, center: Vec2, health: i32) {
        let id = state.next_entity_id();
        state.mini_bosses.push(MiniBoss {
            id,
            template: 0,
            rect: Rect::centered(center, 80.0, 120.0),
            health,
            max_health: 600,
            phase: 1,
            direction: 1.0,
            speed: 3.2,
            fire_timer: 0.0,
            fire_threshold: 80.0,
        });
    }

    #[test]
    fn missile_kills_enemy_and_scores() {
        let mut state = state();
        let mut events = Vec::new();
        enemy_at(&mut state, Vec2::new(200.0, 300.0));
        missile_at(&mut state, Vec2::new(200.0, 310.0));
        // Guarantee the single drop roll succeeds
        state.tuning.drop_base_chance = 1.0;

        resolve_player_attacks(&mut state, &mut rng(), &mut events);

        assert!(state.enemies.is_empty());
        assert!(state.missiles.is_empty());
        assert_eq!(state.score, 100);
        assert_eq!(state.combo.count, 1);
        assert_eq!(state.kills.total, 1);
        assert_eq!(state.powerups.len(), 1);
    }

    #[test]
    fn failed_drop_roll_spawns_nothing() {
        let mut state = state();
        enemy_at(&mut state, Vec2::new(200.0, 300.0));
        missile_at(&mut state, Vec2::new(200.0, 310.0));
        state.tuning.drop_base_chance = 0.0;
        state.tuning.drop_combo_step = 0.0;
        resolve_player_attacks(&mut state, &mut rng(), &mut Vec::new());
        assert!(state.powerups.is_empty());
    }

    #[test]
    fn enemy_takes_priority_over_asteroid() {
        let mut state = state();
        let center = Vec2::new(300.0, 300.0);
        enemy_at(&mut state, center);
        let id = state.next_entity_id();
        state.asteroids.push(Asteroid {
            id,
            rect: Rect::centered(center, ASTEROID_SIZE, ASTEROID_SIZE),
            speed: 2.0,
            rotation: 0.0,
            rot_speed: 0.0,
        });
        missile_at(&mut state, center);
        resolve_player_attacks(&mut state, &mut rng(), &mut Vec::new());
        assert!(state.enemies.is_empty());
        assert_eq!(state.asteroids.len(), 1);
    }

    #[test]
    fn boss_hit_splashes_nearby_enemies() {
        let mut state = state();
        let mut events = Vec::new();
        boss_at(&mut state, Vec2::new(400.0, 150.0), 2000);
        // Impact point sits at the missile center (400, 290)
        enemy_at(&mut state, Vec2::new(470.0, 290.0));
        enemy_at(&mut state, Vec2::new(50.0, 700.0));
        missile_at(&mut state, Vec2::new(400.0, 290.0));

        resolve_player_attacks(&mut state, &mut rng(), &mut events);

        assert_eq!(state.boss.as_ref().unwrap().health, 2000 - MISSILE_DAMAGE_BOSS);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.kills.total, 1);
    }

    #[test]
    fn invulnerable_boss_consumes_missile_without_damage() {
        let mut state = state();
        boss_at(&mut state, Vec2::new(400.0, 150.0), 2000);
        if let Some(boss) = state.boss.as_mut() {
            boss.invulnerable = true;
        }
        missile_at(&mut state, Vec2::new(400.0, 200.0));
        resolve_player_attacks(&mut state, &mut rng(), &mut Vec::new());
        assert!(state.missiles.is_empty());
        assert_eq!(state.boss.as_ref().unwrap().health, 2000);
    }

    #[test]
    fn boss_defeat_pays_out_once() {
        let mut state = state();
        let mut events = Vec::new();
        state.score = 5400;
        boss_at(&mut state, Vec2::new(400.0, 150.0), 10);
        missile_at(&mut state, Vec2::new(400.0, 200.0));

        resolve_player_attacks(&mut state, &mut rng(), &mut events);

        assert!(state.boss.is_none());
        assert_eq!(state.score, 5400 + state.tuning.boss_bonus);
        assert!(state.next_boss_threshold > state.score);
        assert_eq!(state.kills.bosses, 1);
        assert_eq!(state.powerups.len(), state.tuning.boss_drops as usize);
        assert!(state.boss_cooldown_ticks > 0);

        resolve_defeats(&mut state, &mut rng(), &mut events);
        assert_eq!(state.kills.bosses, 1);
    }

    #[test]
    fn mini_boss_defeat_forces_drops() {
        let mut state = state();
        mini_at(&mut state, Vec2::new(400.0, 300.0), MISSILE_DAMAGE_MINI);
        missile_at(&mut state, Vec2::new(400.0, 300.0));
        resolve_player_attacks(&mut state, &mut rng(), &mut Vec::new());
        assert!(state.mini_bosses.is_empty());
        assert_eq!(state.kills.mini_bosses, 1);
        assert_eq!(state.score, state.tuning.mini_boss_bonus);
        assert_eq!(state.powerups.len(), state.tuning.mini_boss_drops as usize);
    }

    #[test]
    fn shield_absorbs_hit() {
        let mut state = state();
        let mut events = Vec::new();
        state.player.shield_active = true;
        state.combo.count = 5;
        damage_player(&mut state, &mut events);
        assert_eq!(state.player.lives, 3);
        assert!(!state.player.shield_active);
        assert_eq!(state.combo.count, 5);
    }

    #[test]
    fn unshielded_hit_costs_one_life_and_combo() {
        let mut state = state();
        let mut events = Vec::new();
        state.combo.count = 5;
        state.player.rect.x = 10.0;
        damage_player(&mut state, &mut events);
        assert_eq!(state.player.lives, 2);
        assert_eq!(state.combo.count, 0);
        assert!(state.player.is_invincible());
        assert_eq!(state.player.rect.center().x, SCREEN_WIDTH / 2.0);
    }

    #[test]
    fn only_first_hazard_applies() {
        let mut state = state();
        let center = state.player.rect.center();
        state.push_hazard(center);
        enemy_at(&mut state, center);
        let hit = resolve_player_hits(&mut state, &mut rng(), &mut Vec::new());
        assert_eq!(hit, Some(HitSource::Hazard));
        assert!(state.hazards.is_empty());
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.player.lives, 2);

        // Invincibility suppresses the enemy contact on the next tick
        assert_eq!(resolve_player_hits(&mut state, &mut rng(), &mut Vec::new()), None);
        assert_eq!(state.player.lives, 2);
    }

    #[test]
    fn last_life_ends_the_run() {
        let mut state = state();
        state.player.lives = 1;
        let center = state.player.rect.center();
        state.hazards.push_back(Hazard {
            id: 1,
            rect: Rect::centered(center, HAZARD_WIDTH, HAZARD_HEIGHT),
            speed: HAZARD_SPEED,
        });
        resolve_player_hits(&mut state, &mut rng(), &mut Vec::new());
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn pickups_apply_effects() {
        let mut state = state();
        let center = state.player.rect.center();
        let kinds = [
            PowerUpKind::Shield,
            PowerUpKind::Bomb,
            PowerUpKind::Life,
            PowerUpKind::Rapid,
        ];
        for kind in kinds {
            let id = state.next_entity_id();
            state.powerups.push(PowerUp {
                id,
                kind,
                rect: Rect::centered(center, POWERUP_SIZE, POWERUP_SIZE),
                phase: 0.0,
            });
        }
        collect_powerups(&mut state, &mut Vec::new());
        assert!(state.powerups.is_empty());
        assert!(state.player.shield_active);
        assert_eq!(state.player.bomb_charges, 1);
        assert_eq!(state.player.lives, 4);
        assert_eq!(state.player.rapid_timer, RAPID_DURATION);
        assert_eq!(state.score, 4 * state.tuning.pickup_score);
    }

    #[test]
    fn eagle_strike_clears_enemies() {
        let mut state = state();
        let mut events = Vec::new();
        enemy_at(&mut state, Vec2::new(100.0, 100.0));
        enemy_at(&mut state, Vec2::new(500.0, 100.0));
        mini_at(&mut state, Vec2::new(400.0, 300.0), 500);
        use_special(&mut state, &mut rng(), &mut events);
        assert!(state.enemies.is_empty());
        assert!(state.mini_bosses.is_empty());
        assert_eq!(state.player.eagle_meter, 0.0);
        assert!(events.contains(&GameEvent::EagleStrike));
    }

    #[test]
    fn bomb_needs_charge_and_cooldown() {
        let mut state = state();
        state.player.eagle_meter = 0.0;
        state.push_hazard(Vec2::new(100.0, 100.0));
        use_special(&mut state, &mut rng(), &mut Vec::new());
        assert_eq!(state.hazards.len(), 1);

        state.player.bomb_charges = 2;
        use_special(&mut state, &mut rng(), &mut Vec::new());
        assert!(state.hazards.is_empty());
        assert_eq!(state.player.bomb_charges, 1);

        use_special(&mut state, &mut rng(), &mut Vec::new());
        assert_eq!(state.player.bomb_charges, 1);
    }

    #[test]
    fn triple_fires_three_and_respects_cooldown() {
        let mut state = state();
        let mut events = Vec::new();
        state.player.triple_timer = 5.0;
        fire_player_weapons(&mut state, true, &mut events);
        assert_eq!(state.missiles.len(), 3);
        fire_player_weapons(&mut state, true, &mut events);
        assert_eq!(state.missiles.len(), 3);
    }

    #[test]
    fn patrol_speeds_up_shooters() {
        let mut state = state();
        enemy_at(&mut state, Vec2::new(100.0, 100.0));
        state.enemies[0].kind = EnemyKind::Shooter;
        state.event = Some(WorldEvent::Patrol);
        for _ in 0..=80 {
            enemy_fire(&mut state);
        }
        assert_eq!(state.hazards.len(), 1);
    }
}
