//! Data-driven game balance
//!
//! Every value here has a compiled-in default. A JSON document stored under
//! [`Tuning::STORAGE_KEY`] may override any subset of fields; missing keys
//! keep their defaults.

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;

const MAX_SPAWN_FACTOR: u32 = 1000;
const MAX_HEALTH_STEP: i32 = 100_000;
const MAX_BASE_HEALTH: i32 = 1_000_000;
const MAX_VARIANT_SCALE: f32 = 10.0;

/// Balance values consumed by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub start_lives: u8,
    pub invincibility_ticks: u32,
    /// Grace window after a shield absorbs a hit
    pub shield_grace_ticks: u32,

    // === Combo & scoring ===
    pub combo_window_ticks: u32,
    pub combo_step: f32,
    pub combo_cap: f32,
    pub enemy_score: u64,
    pub asteroid_score: u64,
    pub pickup_score: u64,
    pub eagle_kill_score: u64,
    pub bomb_kill_score: u64,
    pub mini_boss_bonus: u64,
    pub boss_bonus: u64,

    // === Power-up drops ===
    pub drop_base_chance: f32,
    pub drop_combo_step: f32,
    pub drop_event_bonus: f32,
    pub drop_supply_bonus: f32,
    pub drop_stage_bonus: f32,
    pub drop_stage_bonus_from: u32,
    pub mini_boss_drops: u32,
    pub boss_drops: u32,

    // === Spawning ===
    pub enemy_spawn_base: u32,
    pub enemy_spawn_stage_factor: u32,
    pub enemy_spawn_min: u32,
    pub formation_interval_ticks: u32,
    pub asteroid_interval_ticks: u32,
    pub hazard_cap: usize,

    // === Mini-bosses ===
    pub mini_boss_cap: usize,
    pub mini_spawn_cooldown_ticks: u32,
    pub dropship_chance: f32,
    pub mini_health_per_step: i32,
    pub mini_health_score_step: u64,

    // === Bosses ===
    pub first_boss_threshold: u64,
    pub boss_threshold_step: u64,
    pub boss_cooldown_ticks: u32,
    pub boss_base_health: i32,
    pub boss_health_per_step: i32,
    pub boss_health_score_step: u64,
    pub boss_variant_health: [f32; 3],
    pub splash_radius: f32,

    // === Progression ===
    pub stage_milestone: u64,
    pub event_duration_ticks: u32,
    pub event_chance: f32,
    pub event_score_step: u64,
    pub event_idle_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_lives: 3,
            invincibility_ticks: 120,
            shield_grace_ticks: 30,

            combo_window_ticks: 180,
            combo_step: 0.25,
            combo_cap: 4.0,
            enemy_score: 100,
            asteroid_score: 50,
            pickup_score: 100,
            eagle_kill_score: 200,
            bomb_kill_score: 100,
            mini_boss_bonus: 1200,
            boss_bonus: 2000,

            drop_base_chance: 0.20,
            drop_combo_step: 0.05,
            drop_event_bonus: 0.15,
            drop_supply_bonus: 0.30,
            drop_stage_bonus: 0.10,
            drop_stage_bonus_from: 2,
            mini_boss_drops: 4,
            boss_drops: 5,

            enemy_spawn_base: 140,
            enemy_spawn_stage_factor: 15,
            enemy_spawn_min: 30,
            formation_interval_ticks: 480,
            asteroid_interval_ticks: 100,
            hazard_cap: 50,

            mini_boss_cap: 2,
            mini_spawn_cooldown_ticks: 600,
            dropship_chance: 0.01,
            mini_health_per_step: 200,
            mini_health_score_step: 5000,

            first_boss_threshold: 5000,
            boss_threshold_step: 10_000,
            boss_cooldown_ticks: 600,
            boss_base_health: 2000,
            boss_health_per_step: 500,
            boss_health_score_step: 10_000,
            boss_variant_health: [1.0, 1.25, 1.5],
            splash_radius: 90.0,

            stage_milestone: 15_000,
            event_duration_ticks: 1800,
            event_chance: 0.7,
            event_score_step: 10_000,
            event_idle_ticks: 5400,
        }
    }
}

impl Tuning {
    /// Storage key for balance overrides
    pub const STORAGE_KEY: &'static str = "tuning";

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pull hand-edited values back into ranges the simulation can run with
    fn sanitized(mut self) -> Self {
        let d = Self::default();
        let chance = |v: f32, fallback: f32| {
            if v.is_finite() { v.clamp(0.0, 1.0) } else { fallback }
        };
        let positive = |v: f32, fallback: f32| {
            if v.is_finite() && v > 0.0 { v } else { fallback }
        };

        self.start_lives = self.start_lives.clamp(1, crate::consts::MAX_LIVES);
        self.combo_step = positive(self.combo_step, d.combo_step);
        self.combo_cap = positive(self.combo_cap, d.combo_cap).max(1.0);

        self.drop_base_chance = chance(self.drop_base_chance, d.drop_base_chance);
        self.drop_combo_step = chance(self.drop_combo_step, d.drop_combo_step);
        self.drop_event_bonus = chance(self.drop_event_bonus, d.drop_event_bonus);
        self.drop_supply_bonus = chance(self.drop_supply_bonus, d.drop_supply_bonus);
        self.drop_stage_bonus = chance(self.drop_stage_bonus, d.drop_stage_bonus);
        self.dropship_chance = chance(self.dropship_chance, d.dropship_chance);
        self.event_chance = chance(self.event_chance, d.event_chance);

        self.enemy_spawn_stage_factor = self.enemy_spawn_stage_factor.min(MAX_SPAWN_FACTOR);
        self.enemy_spawn_min = self.enemy_spawn_min.max(1);
        self.hazard_cap = self.hazard_cap.max(1);

        self.mini_health_per_step = self.mini_health_per_step.clamp(0, MAX_HEALTH_STEP);
        self.boss_base_health = self.boss_base_health.clamp(1, MAX_BASE_HEALTH);
        self.boss_health_per_step = self.boss_health_per_step.clamp(0, MAX_HEALTH_STEP);
        for (scale, fallback) in self.boss_variant_health.iter_mut().zip(d.boss_variant_health) {
            *scale = positive(*scale, fallback).min(MAX_VARIANT_SCALE);
        }
        self.splash_radius = if self.splash_radius.is_finite() {
            self.splash_radius.max(0.0)
        } else {
            d.splash_radius
        };
        self
    }

    /// Load overrides from storage, falling back to defaults on any problem
    pub fn load(storage: &impl Storage) -> Self {
        match storage.read(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning overrides");
                    tuning.sanitized()
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable tuning data: {e}");
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                log::error!("Failed to read tuning: {e}");
                Self::default()
            }
        }
    }

    /// Score multiplier for a combo count
    pub fn combo_multiplier(&self, combo: u32) -> f32 {
        (1.0 + combo as f32 * self.combo_step).min(self.combo_cap)
    }
}
