//! Game state and core simulation types
//!
//! One explicit aggregate owns every entity collection, counter and timer of
//! a session. Subsystems receive it by mutable reference.

use std::collections::VecDeque;

use glam::Vec2;
use serde::Serialize;

use super::geom::{Body, Rect};
use crate::achievements::{AchievementBook, Notification, Progress};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Lives exhausted; the session decides between initials entry and game over
    GameOver,
}

/// The player's craft
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub rect: Rect,
    pub lives: u8,
    pub invincible_ticks: u32,
    pub boost_meter: f32,
    pub boosting: bool,
    pub eagle_meter: f32,
    /// Seconds remaining
    pub rapid_timer: f32,
    pub triple_timer: f32,
    pub shield_active: bool,
    pub bomb_charges: u8,
    /// Seconds until the next shot / bomb is allowed
    pub fire_cooldown: f32,
    pub bomb_cooldown: f32,
}

impl Player {
    pub fn new(lives: u8) -> Self {
        Self {
            rect: Rect::centered(
                Vec2::new(SCREEN_WIDTH / 2.0, PLAYER_START_Y),
                PLAYER_WIDTH,
                PLAYER_HEIGHT,
            ),
            lives: lives.min(MAX_LIVES),
            invincible_ticks: 0,
            boost_meter: MAX_BOOST,
            boosting: false,
            eagle_meter: MAX_EAGLE,
            rapid_timer: 0.0,
            triple_timer: 0.0,
            shield_active: false,
            bomb_charges: 0,
            fire_cooldown: 0.0,
            bomb_cooldown: 0.0,
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_ticks > 0
    }

    pub fn recenter(&mut self) {
        self.rect.set_center_x(SCREEN_WIDTH / 2.0);
    }
}

/// Player missile
#[derive(Debug, Clone, Serialize)]
pub struct Missile {
    pub id: u32,
    pub rect: Rect,
    pub vel: Vec2,
}

/// Enemy projectile (hazard to the player)
#[derive(Debug, Clone, Serialize)]
pub struct Hazard {
    pub id: u32,
    pub rect: Rect,
    pub speed: f32,
}

/// Enemy behaviour class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnemyKind {
    Grunt,
    Fast,
    Shooter,
}

/// Regular enemy craft
#[derive(Debug, Clone, Serialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub rect: Rect,
    pub speed: f32,
    pub wiggle: f32,
    pub fire_timer: u32,
    /// Still descending in lock-step with its formation
    pub in_formation: bool,
    /// Index into the faction's image pool
    pub skin: u8,
    pub hp: i32,
}

/// Drifting rock; contact damage only
#[derive(Debug, Clone, Serialize)]
pub struct Asteroid {
    pub id: u32,
    pub rect: Rect,
    pub speed: f32,
    pub rotation: f32,
    pub rot_speed: f32,
}

/// Carrier that deploys a mini-boss once deep enough
#[derive(Debug, Clone, Serialize)]
pub struct Dropship {
    pub id: u32,
    pub rect: Rect,
    pub frame: u8,
    pub frame_timer: u32,
    /// Index into [`MINI_BOSS_TEMPLATES`]
    pub payload: usize,
}

/// Fixed parameters of a mini-boss variant
#[derive(Debug, Clone, Copy)]
pub struct MiniBossTemplate {
    pub width: f32,
    pub height: f32,
    pub health_base: i32,
    pub speed: f32,
    pub fire_threshold: f32,
    pub offsets: &'static [f32],
}

pub const MINI_BOSS_TEMPLATES: [MiniBossTemplate; 3] = [
    MiniBossTemplate {
        width: 80.0,
        height: 120.0,
        health_base: 600,
        speed: 3.2,
        fire_threshold: 80.0,
        offsets: &[-20.0, 0.0, 20.0],
    },
    MiniBossTemplate {
        width: 85.0,
        height: 125.0,
        health_base: 750,
        speed: 2.8,
        fire_threshold: 60.0,
        offsets: &[-40.0, -20.0, 0.0, 20.0, 40.0],
    },
    MiniBossTemplate {
        width: 75.0,
        height: 110.0,
        health_base: 650,
        speed: 3.6,
        fire_threshold: 70.0,
        offsets: &[-25.0, -10.0, 10.0, 25.0],
    },
];

/// Mid-stage heavy unit
#[derive(Debug, Clone, Serialize)]
pub struct MiniBoss {
    pub id: u32,
    pub template: usize,
    pub rect: Rect,
    pub health: i32,
    pub max_health: i32,
    pub phase: u8,
    pub direction: f32,
    pub speed: f32,
    pub fire_timer: f32,
    pub fire_threshold: f32,
}

impl MiniBoss {
    pub fn offsets(&self) -> &'static [f32] {
        MINI_BOSS_TEMPLATES[self.template].offsets
    }

    pub fn health_fraction(&self) -> f32 {
        (self.health.max(0) as f32 / self.max_health.max(1) as f32).clamp(0.0, 1.0)
    }

    /// Subtract damage, clamping at zero
    pub fn damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// Stage boss
#[derive(Debug, Clone, Serialize)]
pub struct Boss {
    pub id: u32,
    pub variant: u32,
    pub rect: Rect,
    /// Vertical position before oscillation is applied
    pub anchor_y: f32,
    pub health: i32,
    pub max_health: i32,
    pub phase: u8,
    pub direction: f32,
    pub speed: f32,
    pub fire_timer: u32,
    pub osc_phase: f32,
    pub special_timer: u32,
    pub invulnerable: bool,
    pub invulnerable_ticks: u32,
}

impl Boss {
    pub fn health_fraction(&self) -> f32 {
        (self.health.max(0) as f32 / self.max_health.max(1) as f32).clamp(0.0, 1.0)
    }

    /// Subtract damage unless shielded, clamping at zero
    pub fn damage(&mut self, amount: i32) -> bool {
        if self.invulnerable {
            return false;
        }
        self.health = (self.health - amount).max(0);
        true
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PowerUpKind {
    Rapid,
    Shield,
    Triple,
    Bomb,
    Life,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Rapid,
        PowerUpKind::Shield,
        PowerUpKind::Triple,
        PowerUpKind::Bomb,
        PowerUpKind::Life,
    ];
}

/// A falling pickup
#[derive(Debug, Clone, Serialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub rect: Rect,
    /// Drift phase offset (radians)
    pub phase: f32,
}

/// Timed global modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorldEvent {
    /// Enemy flood; asteroids suppressed
    Breach,
    /// Shooter lines, faster enemy fire
    Patrol,
    /// Supply run; asteroids suppressed, richer drops
    Supply,
}

impl WorldEvent {
    pub const ALL: [WorldEvent; 3] = [WorldEvent::Breach, WorldEvent::Patrol, WorldEvent::Supply];

    /// Divisor applied to the enemy spawn threshold
    pub fn spawn_multiplier(self) -> f32 {
        match self {
            WorldEvent::Breach => 3.0,
            WorldEvent::Supply => 1.25,
            WorldEvent::Patrol => 1.0,
        }
    }

    pub fn suppresses_asteroids(self) -> bool {
        matches!(self, WorldEvent::Breach | WorldEvent::Supply)
    }
}

/// Enemy roster for a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Faction {
    Swarm,
    Machine,
    Lights,
}

impl Faction {
    pub fn for_stage(stage: u32) -> Self {
        match stage % 3 {
            0 => Faction::Swarm,
            1 => Faction::Machine,
            _ => Faction::Lights,
        }
    }

    /// Number of distinct enemy images in the faction's pool
    pub fn skin_count(self) -> u8 {
        match self {
            Faction::Swarm => 6,
            Faction::Machine | Faction::Lights => 3,
        }
    }
}

/// Kill streak
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Combo {
    pub count: u32,
    pub timer: u32,
}

/// Spawn cadence counters (ticks)
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SpawnTimers {
    pub enemy: u32,
    pub formation: u32,
    pub asteroid: u32,
    pub mini: u32,
}

/// Kill tallies used by achievements
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct KillCounters {
    pub total: u64,
    pub mini_bosses: u64,
    pub bosses: u64,
}

/// Observable boss lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BossStage {
    Absent,
    Warning,
    Active { phase: u8 },
    Cooldown,
}

/// Something that happened during a tick, for render/audio collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    MissilesFired { count: u32 },
    EnemyKilled { kind: EnemyKind, pos: Vec2 },
    AsteroidDestroyed { pos: Vec2 },
    ScoreAwarded { points: u64 },
    ComboLost,
    PowerUpDropped { kind: PowerUpKind, pos: Vec2 },
    PowerUpCollected { kind: PowerUpKind },
    PlayerHit { shield_absorbed: bool, lives: u8 },
    EagleStrike,
    BombDetonated,
    DropshipIncoming { pos: Vec2 },
    MiniBossDeployed { pos: Vec2 },
    MiniBossPhase { phase: u8 },
    MiniBossDefeated { pos: Vec2 },
    BossWarning { variant: u32 },
    BossPhase { phase: u8 },
    BossDefeated { variant: u32, pos: Vec2 },
    StageAdvanced { stage: u32 },
    MusicAdvanced { track: u32 },
    WorldEventStarted { event: WorldEvent },
    WorldEventEnded { event: WorldEvent },
    AchievementUnlocked { id: &'static str },
    PlayerDestroyed { score: u64 },
}

/// Complete game state (deterministic given the injected RNG)
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Balance values for this session
    #[serde(skip)]
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,

    pub player: Player,
    pub missiles: Vec<Missile>,
    /// Oldest first; bounded by `tuning.hazard_cap`
    pub hazards: VecDeque<Hazard>,
    pub enemies: Vec<Enemy>,
    pub asteroids: Vec<Asteroid>,
    pub dropships: Vec<Dropship>,
    pub mini_bosses: Vec<MiniBoss>,
    pub boss: Option<Boss>,
    pub powerups: Vec<PowerUp>,

    pub score: u64,
    pub high_score: u64,
    pub combo: Combo,
    pub kills: KillCounters,
    pub achievements: AchievementBook,
    pub notifications: VecDeque<Notification>,

    pub stage: u32,
    pub stage_transition_ticks: u32,
    pub music_track: u32,

    pub event: Option<WorldEvent>,
    pub event_ticks: u32,
    pub event_check_ticks: i64,
    pub last_event_score: u64,

    pub next_boss_threshold: u64,
    pub boss_warning_ticks: u32,
    pub boss_cooldown_ticks: u32,
    pub mini_warning_ticks: u32,

    pub timers: SpawnTimers,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Fresh session state
    pub fn new(tuning: Tuning, high_score: u64, achievements: AchievementBook) -> Self {
        Self {
            player: Player::new(tuning.start_lives),
            next_boss_threshold: tuning.first_boss_threshold,
            tuning,
            phase: GamePhase::Playing,
            time_ticks: 0,
            missiles: Vec::new(),
            hazards: VecDeque::new(),
            enemies: Vec::new(),
            asteroids: Vec::new(),
            dropships: Vec::new(),
            mini_bosses: Vec::new(),
            boss: None,
            powerups: Vec::new(),
            score: 0,
            high_score,
            combo: Combo::default(),
            kills: KillCounters::default(),
            achievements,
            notifications: VecDeque::new(),
            stage: 0,
            stage_transition_ticks: 0,
            music_track: 0,
            event: None,
            event_ticks: 0,
            event_check_ticks: 0,
            last_event_score: 0,
            boss_warning_ticks: 0,
            boss_cooldown_ticks: 0,
            mini_warning_ticks: 0,
            timers: SpawnTimers::default(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a hazard projectile, evicting the oldest past the cap
    pub fn push_hazard(&mut self, center: Vec2) {
        let id = self.next_entity_id();
        let cap = self.tuning.hazard_cap.max(1);
        while self.hazards.len() >= cap {
            self.hazards.pop_front();
        }
        self.hazards.push_back(Hazard {
            id,
            rect: Rect::centered(center, HAZARD_WIDTH, HAZARD_HEIGHT),
            speed: HAZARD_SPEED,
        });
    }

    pub fn faction(&self) -> Faction {
        Faction::for_stage(self.stage)
    }

    pub fn boss_alive(&self) -> bool {
        self.boss.is_some()
    }

    pub fn boss_stage(&self) -> BossStage {
        match &self.boss {
            Some(_) if self.boss_warning_ticks > 0 => BossStage::Warning,
            Some(boss) => BossStage::Active { phase: boss.phase },
            None if self.boss_cooldown_ticks > 0 => BossStage::Cooldown,
            None => BossStage::Absent,
        }
    }

    /// Counter snapshot for achievement rules
    pub fn progress(&self) -> Progress {
        Progress {
            total_kills: self.kills.total,
            mini_boss_kills: self.kills.mini_bosses,
            boss_kills: self.kills.bosses,
            combo: self.combo.count as u64,
            stage: self.stage as u64,
        }
    }

    /// Every live entity rectangle, for invariant checks
    pub fn entity_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.missiles
            .iter()
            .map(|m| m.rect)
            .chain(self.hazards.iter().map(|h| h.rect))
            .chain(self.enemies.iter().map(|e| e.rect))
            .chain(self.asteroids.iter().map(|a| a.rect))
            .chain(self.powerups.iter().map(|p| p.rect))
    }
}

macro_rules! impl_body {
    ($($ty:ty),*) => {
        $(impl Body for $ty {
            fn rect(&self) -> Rect {
                self.rect
            }
        })*
    };
}

impl_body!(Player, Missile, Hazard, Enemy, Asteroid, Dropship, MiniBoss, Boss, PowerUp);
