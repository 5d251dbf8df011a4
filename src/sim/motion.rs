//! Per-tick motion and lifecycle
//!
//! Advances every entity class by its speed, applies drift/oscillation, keeps
//! heavy units inside the horizontal play bounds and culls anything that has
//! fully left the screen in its direction of travel.

use glam::Vec2;
use rand::Rng;

use super::geom::{Body, Rect};
use super::state::{GameState, Player};
use crate::consts::*;

/// Deepest the boss anchor may step down to
const BOSS_MAX_ANCHOR_Y: f32 = 300.0;
const FORMATION_BREAK_WIGGLE: f32 = 1.2;

/// Clamp a raw intent vector to unit length (diagonals never outrun axes)
pub fn normalize_intent(raw: Vec2) -> Vec2 {
    if !raw.is_finite() {
        return Vec2::ZERO;
    }
    let len = raw.length();
    if len > 1.0 { raw / len } else { raw }
}

/// Move the player and update the boost meter
pub fn move_player(player: &mut Player, intent: Vec2, boost_held: bool, dt: f32) {
    let intent = normalize_intent(intent);

    player.boosting = boost_held && player.boost_meter > 0.0;
    if player.boosting {
        player.boost_meter = (player.boost_meter - BOOST_DRAIN_RATE * dt).max(0.0);
    }
    if !boost_held {
        player.boost_meter = (player.boost_meter + BOOST_RECHARGE_RATE * dt).min(MAX_BOOST);
    }

    let speed = PLAYER_SPEED * if player.boosting { BOOST_MULTIPLIER } else { 1.0 };
    player.rect.translate(intent * speed);
    player.rect.clamp_within(&Rect::screen());
}

/// Count down player timers and recharge the eagle meter
pub fn tick_player_timers(player: &mut Player, dt: f32) {
    player.invincible_ticks = player.invincible_ticks.saturating_sub(1);
    player.rapid_timer = (player.rapid_timer - dt).max(0.0);
    player.triple_timer = (player.triple_timer - dt).max(0.0);
    player.fire_cooldown = (player.fire_cooldown - dt).max(0.0);
    player.bomb_cooldown = (player.bomb_cooldown - dt).max(0.0);
    player.eagle_meter = (player.eagle_meter + EAGLE_RECHARGE_RATE * dt).min(MAX_EAGLE);
}

/// Advance every non-player entity and cull the ones that left the screen
pub fn advance(state: &mut GameState, rng: &mut impl Rng) {
    for missile in &mut state.missiles {
        missile.rect.translate(missile.vel);
    }
    state.missiles.retain(|m| {
        !m.above_screen() && m.rect.right() >= 0.0 && m.rect.left() <= SCREEN_WIDTH
    });

    for hazard in &mut state.hazards {
        hazard.rect.y += hazard.speed;
    }
    state.hazards.retain(|h| !h.below_screen());

    advance_enemies(state, rng);

    for asteroid in &mut state.asteroids {
        asteroid.rect.y += asteroid.speed;
        asteroid.rotation = (asteroid.rotation + asteroid.rot_speed) % 360.0;
    }
    state.asteroids.retain(|a| !a.below_screen());

    let t = state.time_ticks as f32;
    for powerup in &mut state.powerups {
        powerup.rect.y += POWERUP_FALL_SPEED;
        powerup.rect.x += (t / POWERUP_DRIFT_PERIOD + powerup.phase).sin() * POWERUP_DRIFT;
    }
    state.powerups.retain(|p| {
        !p.below_screen()
            && p.rect.right() >= -POWERUP_SIDE_SLACK
            && p.rect.left() <= SCREEN_WIDTH + POWERUP_SIDE_SLACK
    });

    for dropship in &mut state.dropships {
        dropship.rect.y += DROPSHIP_SPEED;
        dropship.frame_timer += 1;
        if dropship.frame_timer >= DROPSHIP_FRAME_TICKS {
            dropship.frame_timer = 0;
            dropship.frame = (dropship.frame + 1) % DROPSHIP_FRAMES;
        }
    }

    advance_mini_bosses(state);
    advance_boss(state);
}

fn advance_enemies(state: &mut GameState, rng: &mut impl Rng) {
    for enemy in &mut state.enemies {
        if enemy.in_formation && enemy.rect.y > FORMATION_BREAK_DEPTH {
            enemy.in_formation = false;
            enemy.wiggle = rng.random_range(-FORMATION_BREAK_WIGGLE..=FORMATION_BREAK_WIGGLE);
        }
        enemy.rect.y += enemy.speed;
        enemy.rect.x += enemy.wiggle * WIGGLE_SCALE;
        if enemy.rect.left() < 0.0 || enemy.rect.right() > SCREEN_WIDTH {
            enemy.wiggle = -enemy.wiggle;
            enemy.rect.x = enemy.rect.x.clamp(0.0, SCREEN_WIDTH - enemy.rect.w);
        }
    }
    state.enemies.retain(|e| !e.below_screen());
}

/// Reverse direction at the side margins; returns true on reversal
fn bounce_horizontal(rect: &mut Rect, direction: &mut f32, speed: f32) -> bool {
    rect.x += *direction * speed;
    let lo = SPAWN_MARGIN;
    let hi = SCREEN_WIDTH - SPAWN_MARGIN;
    if rect.left() <= lo || rect.right() >= hi {
        *direction = -*direction;
        rect.x = rect.x.clamp(lo, (hi - rect.w).max(lo));
        true
    } else {
        false
    }
}

fn advance_mini_bosses(state: &mut GameState) {
    for mini in &mut state.mini_bosses {
        if bounce_horizontal(&mut mini.rect, &mut mini.direction, mini.speed) {
            mini.rect.y += MINI_STEP_DOWN;
        }
    }
    state.mini_bosses.retain(|m| {
        let gone = m.below_screen();
        if gone {
            log::info!("Mini-boss {} drifted off-screen", m.id);
        }
        !gone
    });
}

fn advance_boss(state: &mut GameState) {
    if let Some(boss) = state.boss.as_mut() {
        if bounce_horizontal(&mut boss.rect, &mut boss.direction, boss.speed) {
            let step = if boss.phase >= 2 { 20.0 } else { 30.0 };
            boss.anchor_y = (boss.anchor_y + step).min(BOSS_MAX_ANCHOR_Y);
        }
        boss.osc_phase += BOSS_OSCILLATION_RATE;
        boss.rect.y = boss.anchor_y + boss.osc_phase.sin() * BOSS_OSCILLATION;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::AchievementBook;
    use crate::sim::spawn;
    use crate::sim::state::{
        Enemy, EnemyKind, MINI_BOSS_TEMPLATES, MiniBoss, Missile, PowerUp, PowerUpKind,
    };
    use crate::tuning::Tuning;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn state() -> GameState {
        GameState::new(Tuning::default(), 0, AchievementBook::new())
    }

    #[test]
    fn diagonal_is_not_faster() {
        let mut straight = Player::new(3);
        let mut diagonal = Player::new(3);
        let start = straight.rect.center();
        move_player(&mut straight, Vec2::new(1.0, 0.0), false, SIM_DT);
        move_player(&mut diagonal, Vec2::new(1.0, -1.0), false, SIM_DT);
        let d1 = straight.rect.center().distance(start);
        let d2 = diagonal.rect.center().distance(start);
        assert!((d1 - d2).abs() < 1e-4);
        assert!((d1 - PLAYER_SPEED).abs() < 1e-4);
    }

    #[test]
    fn boost_drains_and_recharges() {
        let mut player = Player::new(3);
        move_player(&mut player, Vec2::X, true, 1.0);
        assert!(player.boosting);
        assert_eq!(player.boost_meter, MAX_BOOST - BOOST_DRAIN_RATE);

        for _ in 0..10 {
            move_player(&mut player, Vec2::X, true, 1.0);
        }
        assert_eq!(player.boost_meter, 0.0);
        move_player(&mut player, Vec2::X, true, 1.0);
        assert!(!player.boosting);

        for _ in 0..10 {
            move_player(&mut player, Vec2::ZERO, false, 1.0);
        }
        assert_eq!(player.boost_meter, MAX_BOOST);
    }

    #[test]
    fn enemies_culled_below_screen() {
        let mut state = state();
        let mut rng = Pcg32::seed_from_u64(1);
        state.enemies.push(Enemy {
            id: 1,
            kind: EnemyKind::Grunt,
            rect: Rect::new(100.0, SCREEN_HEIGHT - 1.0, ENEMY_WIDTH, ENEMY_HEIGHT),
            speed: 3.0,
            wiggle: 0.0,
            fire_timer: 0,
            in_formation: false,
            skin: 0,
            hp: 1,
        });
        advance(&mut state, &mut rng);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn partially_visible_entities_survive() {
        let mut state = state();
        let mut rng = Pcg32::seed_from_u64(1);
        state.powerups.push(PowerUp {
            id: 1,
            kind: PowerUpKind::Life,
            rect: Rect::new(400.0, SCREEN_HEIGHT - 10.0, POWERUP_SIZE, POWERUP_SIZE),
            phase: 0.0,
        });
        advance(&mut state, &mut rng);
        assert_eq!(state.powerups.len(), 1);
    }

    #[test]
    fn enemies_bounce_off_sides() {
        let mut state = state();
        let mut rng = Pcg32::seed_from_u64(1);
        state.enemies.push(Enemy {
            id: 1,
            kind: EnemyKind::Fast,
            rect: Rect::new(SCREEN_WIDTH - ENEMY_WIDTH - 1.0, 100.0, ENEMY_WIDTH, ENEMY_HEIGHT),
            speed: 1.0,
            wiggle: 2.0,
            fire_timer: 0,
            in_formation: false,
            skin: 0,
            hp: 1,
        });
        advance(&mut state, &mut rng);
        let enemy = &state.enemies[0];
        assert!(enemy.wiggle < 0.0);
        assert!(enemy.rect.right() <= SCREEN_WIDTH);
    }

    fn mini_boss(x: f32, y: f32, direction: f32) -> MiniBoss {
        let template = MINI_BOSS_TEMPLATES[0];
        MiniBoss {
            id: 7,
            template: 0,
            rect: Rect::new(x, y, template.width, template.height),
            health: template.health_base,
            max_health: template.health_base,
            phase: 1,
            direction,
            speed: template.speed,
            fire_timer: 0.0,
            fire_threshold: template.fire_threshold,
        }
    }

    fn state_with_boss() -> GameState {
        let mut state = state();
        state.score = state.tuning.first_boss_threshold;
        spawn::spawn_boss_if_due(&mut state, &mut Vec::new());
        state
    }

    #[test]
    fn missiles_culled_above_screen() {
        let mut state = state();
        let mut rng = Pcg32::seed_from_u64(1);
        for (id, y) in [(1, 1.0 - MISSILE_HEIGHT), (2, 100.0)] {
            state.missiles.push(Missile {
                id,
                rect: Rect::new(400.0, y, MISSILE_WIDTH, MISSILE_HEIGHT),
                vel: Vec2::new(0.0, -MISSILE_SPEED),
            });
        }
        advance(&mut state, &mut rng);
        assert_eq!(state.missiles.len(), 1);
        assert_eq!(state.missiles[0].id, 2);
    }

    #[test]
    fn formation_breaks_up_past_depth() {
        let mut state = state();
        let mut rng = Pcg32::seed_from_u64(5);
        for (id, y) in [(1, FORMATION_BREAK_DEPTH + 1.0), (2, 50.0)] {
            state.enemies.push(Enemy {
                id,
                kind: EnemyKind::Grunt,
                rect: Rect::new(300.0, y, ENEMY_WIDTH, ENEMY_HEIGHT),
                speed: 2.2,
                wiggle: 0.0,
                fire_timer: 0,
                in_formation: true,
                skin: 0,
                hp: 1,
            });
        }
        advance(&mut state, &mut rng);

        let broken = &state.enemies[0];
        assert!(!broken.in_formation);
        assert!(broken.wiggle != 0.0);
        assert!(broken.wiggle.abs() <= FORMATION_BREAK_WIGGLE);

        let held = &state.enemies[1];
        assert!(held.in_formation);
        assert_eq!(held.wiggle, 0.0);
        assert_eq!(held.rect.x, 300.0);
    }

    #[test]
    fn mini_boss_reverses_and_steps_down_at_margins() {
        let mut state = state();
        let mut rng = Pcg32::seed_from_u64(1);
        let w = MINI_BOSS_TEMPLATES[0].width;
        state.mini_bosses.push(mini_boss(SCREEN_WIDTH - SPAWN_MARGIN - w - 1.0, 100.0, 1.0));
        state.mini_bosses.push(mini_boss(SPAWN_MARGIN + 1.0, 100.0, -1.0));
        state.mini_bosses.push(mini_boss(400.0, 100.0, 1.0));
        advance(&mut state, &mut rng);

        let [right, left, middle] = &state.mini_bosses[..] else {
            panic!("mini-bosses culled");
        };
        assert_eq!(right.direction, -1.0);
        assert!(right.rect.right() <= SCREEN_WIDTH - SPAWN_MARGIN);
        assert_eq!(right.rect.y, 100.0 + MINI_STEP_DOWN);
        assert_eq!(left.direction, 1.0);
        assert!(left.rect.left() >= SPAWN_MARGIN);
        assert_eq!(left.rect.y, 100.0 + MINI_STEP_DOWN);
        assert_eq!(middle.direction, 1.0);
        assert_eq!(middle.rect.y, 100.0);
    }

    #[test]
    fn mini_boss_removed_once_off_screen() {
        let mut state = state();
        let mut rng = Pcg32::seed_from_u64(1);
        state.mini_bosses.push(mini_boss(SPAWN_MARGIN + 1.0, SCREEN_HEIGHT - 5.0, -1.0));
        advance(&mut state, &mut rng);
        assert!(state.mini_bosses.is_empty());
    }

    #[test]
    fn boss_steps_down_on_reversal_and_caps_anchor() {
        let mut state = state_with_boss();
        let mut rng = Pcg32::seed_from_u64(1);
        if let Some(boss) = state.boss.as_mut() {
            boss.rect.x = SPAWN_MARGIN + 1.0;
            boss.direction = -1.0;
            boss.anchor_y = 100.0;
        }
        advance(&mut state, &mut rng);
        let boss = state.boss.as_mut().unwrap();
        assert_eq!(boss.direction, 1.0);
        assert!(boss.rect.left() >= SPAWN_MARGIN);
        assert_eq!(boss.anchor_y, 130.0);

        // Enraged bosses step down less
        boss.phase = 2;
        boss.rect.x = SCREEN_WIDTH - SPAWN_MARGIN - boss.rect.w - 1.0;
        advance(&mut state, &mut rng);
        let boss = state.boss.as_mut().unwrap();
        assert_eq!(boss.direction, -1.0);
        assert!(boss.rect.right() <= SCREEN_WIDTH - SPAWN_MARGIN);
        assert_eq!(boss.anchor_y, 150.0);

        boss.anchor_y = BOSS_MAX_ANCHOR_Y - 5.0;
        boss.rect.x = SPAWN_MARGIN + 1.0;
        advance(&mut state, &mut rng);
        assert_eq!(state.boss.as_ref().unwrap().anchor_y, BOSS_MAX_ANCHOR_Y);
    }

    #[test]
    fn boss_oscillates_around_anchor() {
        let mut state = state_with_boss();
        let mut rng = Pcg32::seed_from_u64(1);
        let anchor = if let Some(boss) = state.boss.as_mut() {
            boss.speed = 0.0;
            boss.rect.x = SCREEN_WIDTH / 2.0 - boss.rect.w / 2.0;
            boss.anchor_y
        } else {
            panic!("boss did not spawn");
        };

        let (mut lowest, mut highest) = (f32::MAX, f32::MIN);
        for _ in 0..200 {
            advance(&mut state, &mut rng);
            let boss = state.boss.as_ref().unwrap();
            assert_eq!(boss.anchor_y, anchor);
            let expected = anchor + boss.osc_phase.sin() * BOSS_OSCILLATION;
            assert!((boss.rect.y - expected).abs() < 1e-3);
            lowest = lowest.min(boss.rect.y);
            highest = highest.max(boss.rect.y);
        }
        assert!(highest - lowest > BOSS_OSCILLATION * 1.9);
        assert!(highest - lowest <= BOSS_OSCILLATION * 2.0 + 1e-3);
    }

    proptest! {
        #[test]
        fn player_stays_in_bounds(
            moves in proptest::collection::vec((-1e6f32..1e6, -1e6f32..1e6, any::<bool>()), 1..200)
        ) {
            let mut player = Player::new(3);
            for (x, y, boost) in moves {
                move_player(&mut player, Vec2::new(x, y), boost, SIM_DT);
                prop_assert!(player.rect.is_within(&Rect::screen()));
                prop_assert!((0.0..=MAX_BOOST).contains(&player.boost_meter));
            }
        }
    }
}
