//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected, seedable RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or storage dependencies

pub mod combat;
pub mod geom;
pub mod motion;
pub mod progression;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;

pub use geom::{Body, Rect};
pub use spawn::Formation;
pub use state::{
    Asteroid, Boss, BossStage, Combo, Dropship, Enemy, EnemyKind, Faction, GameEvent, GamePhase,
    GameState, Hazard, KillCounters, MINI_BOSS_TEMPLATES, MiniBoss, MiniBossTemplate, Missile,
    Player, PowerUp, PowerUpKind, WorldEvent,
};
pub use tick::{TickInput, tick};
