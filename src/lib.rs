//! Eagle Strike - simulation core for a vertical arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, combat, scoring, progression)
//! - `session`: Top-level mode state machine driven by session commands
//! - `persistence`: Storage collaborator for leaderboard, achievements and settings
//! - `tuning`: Data-driven game balance

pub mod achievements;
pub mod cues;
pub mod highscores;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use achievements::{AchievementBook, AchievementId};
pub use highscores::{HighScores, Initials};
pub use session::{Mode, Session, SessionCommand};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Play area (screen space, y grows downward)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 900.0;
    /// Inward margin for spawn positions and boss/mini-boss reversal
    pub const SPAWN_MARGIN: f32 = 50.0;

    /// Player craft
    pub const PLAYER_WIDTH: f32 = 60.0;
    pub const PLAYER_HEIGHT: f32 = 90.0;
    pub const PLAYER_START_Y: f32 = SCREEN_HEIGHT - 100.0;
    /// Units per tick
    pub const PLAYER_SPEED: f32 = 5.5;
    pub const BOOST_MULTIPLIER: f32 = 1.9;
    pub const MAX_LIVES: u8 = 5;

    /// Meters (units per second)
    pub const MAX_BOOST: f32 = 100.0;
    pub const BOOST_DRAIN_RATE: f32 = 25.0;
    pub const BOOST_RECHARGE_RATE: f32 = 20.0;
    pub const MAX_EAGLE: f32 = 100.0;
    pub const EAGLE_RECHARGE_RATE: f32 = 8.0;
    pub const MAX_BOMB_CHARGES: u8 = 3;
    /// Seconds
    pub const BOMB_COOLDOWN: f32 = 0.5;

    /// Player weapons
    pub const FIRE_COOLDOWN: f32 = 0.085;
    pub const MISSILE_WIDTH: f32 = 10.0;
    pub const MISSILE_HEIGHT: f32 = 30.0;
    pub const MISSILE_SPEED: f32 = 12.0;
    pub const TRIPLE_SPREAD: f32 = 20.0;
    pub const MISSILE_DAMAGE_BOSS: i32 = 20;
    pub const MISSILE_DAMAGE_MINI: i32 = 30;

    /// Power-up durations (seconds)
    pub const RAPID_DURATION: f32 = 12.0;
    pub const TRIPLE_DURATION: f32 = 15.0;

    /// Hazard projectiles
    pub const HAZARD_WIDTH: f32 = 15.0;
    pub const HAZARD_HEIGHT: f32 = 40.0;
    pub const HAZARD_SPEED: f32 = 6.0;

    /// Enemies
    pub const ENEMY_WIDTH: f32 = 50.0;
    pub const ENEMY_HEIGHT: f32 = 70.0;
    pub const ENEMY_SPAWN_Y: f32 = -50.0;
    pub const WIGGLE_SCALE: f32 = 3.0;
    pub const SHOOTER_FIRE_TICKS: u32 = 120;
    pub const FORMATION_BREAK_DEPTH: f32 = 200.0;
    pub const FORMATION_SPACING: f32 = 60.0;

    /// Asteroids
    pub const ASTEROID_SIZE: f32 = 70.0;
    pub const ASTEROID_SPAWN_Y: f32 = -80.0;

    /// Power-ups
    pub const POWERUP_SIZE: f32 = 30.0;
    pub const POWERUP_FALL_SPEED: f32 = 2.5;
    pub const POWERUP_DRIFT: f32 = 3.0;
    /// Ticks per radian of drift phase
    pub const POWERUP_DRIFT_PERIOD: f32 = 12.0;
    pub const POWERUP_SIDE_SLACK: f32 = 100.0;

    /// Dropships and mini-bosses
    pub const DROPSHIP_WIDTH: f32 = 120.0;
    pub const DROPSHIP_HEIGHT: f32 = 180.0;
    pub const DROPSHIP_SPEED: f32 = 5.0;
    pub const DROPSHIP_DEPLOY_DEPTH: f32 = 200.0;
    pub const DROPSHIP_FRAMES: u8 = 3;
    pub const DROPSHIP_FRAME_TICKS: u32 = 10;
    pub const MINI_STEP_DOWN: f32 = 20.0;

    /// Boss
    pub const BOSS_WIDTH: f32 = 200.0;
    pub const BOSS_HEIGHT: f32 = 300.0;
    pub const BOSS_ANCHOR_Y: f32 = 100.0;
    pub const BOSS_SPEED: f32 = 2.5;
    pub const BOSS_OSCILLATION: f32 = 12.0;
    pub const BOSS_OSCILLATION_RATE: f32 = 0.05;
    pub const BOSS_WARNING_TICKS: u32 = 180;
    pub const BOSS_VARIANTS: u32 = 3;

    /// Stage transition flash (ticks)
    pub const STAGE_TRANSITION_TICKS: u32 = 120;
    pub const MUSIC_TRACKS: u32 = 10;

    /// Achievement notification (ticks)
    pub const NOTIFICATION_TICKS: u32 = 180;
    pub const NOTIFICATION_FADE_TICKS: u32 = 30;
}
