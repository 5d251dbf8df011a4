//! Achievement catalogue and persisted unlock set
//!
//! Rules are declarative thresholds over session counters. The unlock set
//! only ever grows; it is written through the storage collaborator each time
//! a new id is added.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::consts::{NOTIFICATION_FADE_TICKS, NOTIFICATION_TICKS};
use crate::persistence::Storage;

/// Stable identifier stored in the unlock set
pub type AchievementId = &'static str;

/// Counter an achievement rule is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    TotalKills,
    MiniBossKills,
    BossKills,
    Combo,
    Stage,
}

/// A threshold rule
#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: AchievementId,
    pub title: &'static str,
    pub metric: Metric,
    pub threshold: u64,
}

const fn rule(
    id: AchievementId,
    title: &'static str,
    metric: Metric,
    threshold: u64,
) -> Achievement {
    Achievement {
        id,
        title,
        metric,
        threshold,
    }
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    rule("first_blood", "First Blood", Metric::TotalKills, 1),
    rule("exterminator", "Exterminator", Metric::TotalKills, 100),
    rule("annihilator", "Annihilator", Metric::TotalKills, 500),
    rule("giant_killer", "Giant Killer", Metric::MiniBossKills, 1),
    rule("boss_slayer", "Boss Slayer", Metric::BossKills, 1),
    rule("boss_hunter", "Boss Hunter", Metric::BossKills, 5),
    rule("combo_10", "Combo x10", Metric::Combo, 10),
    rule("combo_25", "Combo x25", Metric::Combo, 25),
    rule("combo_50", "Unstoppable", Metric::Combo, 50),
    rule("deep_space", "Deep Space", Metric::Stage, 3),
];

/// Look up a rule by id
pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Snapshot of the counters rules are evaluated against
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress {
    pub total_kills: u64,
    pub mini_boss_kills: u64,
    pub boss_kills: u64,
    pub combo: u64,
    pub stage: u64,
}

impl Progress {
    fn value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::TotalKills => self.total_kills,
            Metric::MiniBossKills => self.mini_boss_kills,
            Metric::BossKills => self.boss_kills,
            Metric::Combo => self.combo,
            Metric::Stage => self.stage,
        }
    }
}

/// Set of unlocked achievement ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementBook {
    unlocked: BTreeSet<String>,
}

impl AchievementBook {
    /// Storage key for the unlock set
    pub const STORAGE_KEY: &'static str = "achievements";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.unlocked.iter().map(String::as_str)
    }

    /// Insert an id; returns true the first time it is seen
    pub fn unlock(&mut self, id: &str) -> bool {
        self.unlocked.insert(id.to_string())
    }

    /// Merge another book in (never removes anything)
    pub fn absorb(&mut self, other: &AchievementBook) {
        self.unlocked.extend(other.unlocked.iter().cloned());
    }

    /// Unlock every rule whose threshold is met, returning the new ids in
    /// catalogue order
    pub fn evaluate(&mut self, progress: &Progress) -> Vec<AchievementId> {
        ACHIEVEMENTS
            .iter()
            .filter(|a| progress.value(a.metric) >= a.threshold)
            .filter(|a| self.unlock(a.id))
            .map(|a| a.id)
            .collect()
    }

    pub fn load(storage: &impl Storage) -> Self {
        match storage.read_json::<AchievementBook>(Self::STORAGE_KEY) {
            Ok(Some(book)) => {
                log::info!("Loaded {} unlocked achievements", book.len());
                book
            }
            Ok(None) => Self::new(),
            Err(e) => {
                log::error!("Failed to load achievements: {e}");
                Self::new()
            }
        }
    }

    pub fn save(&self, storage: &mut impl Storage) {
        match storage.write_json(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Achievements saved ({} unlocked)", self.len()),
            Err(e) => log::error!("Failed to save achievements: {e}"),
        }
    }
}

/// On-screen unlock banner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: AchievementId,
    pub title: &'static str,
    pub ticks_remaining: u32,
}

impl Notification {
    pub fn new(achievement: &Achievement) -> Self {
        Self {
            id: achievement.id,
            title: achievement.title,
            ticks_remaining: NOTIFICATION_TICKS,
        }
    }

    /// Opacity with fade-in and fade-out
    pub fn alpha(&self) -> f32 {
        let elapsed = NOTIFICATION_TICKS.saturating_sub(self.ticks_remaining);
        let fade = NOTIFICATION_FADE_TICKS as f32;
        if elapsed < NOTIFICATION_FADE_TICKS {
            elapsed as f32 / fade
        } else if self.ticks_remaining < NOTIFICATION_FADE_TICKS {
            self.ticks_remaining as f32 / fade
        } else {
            1.0
        }
    }
}
