//! Sound cues for the audio collaborator
//!
//! The simulation reports what happened as [`GameEvent`]s; this maps them to
//! the fixed set of sound effects the game plays, so playback code needs no
//! game logic.

use crate::sim::{EnemyKind, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Player missile launched
    Shoot,
    /// Regular enemy destroyed
    Explosion,
    /// Shooter-class enemy destroyed
    HeavyExplosion,
    /// Asteroid shattered
    RockBreak,
    /// Power-up collected
    PowerUp,
    /// Shield soaked a hit
    ShieldHit,
    /// Player lost a life
    PlayerHit,
    /// Eagle strike or bomb
    Special,
    /// Boss or dropship approaching
    Warning,
    /// Boss or mini-boss destroyed
    BigExplosion,
    /// Achievement unlocked
    Achievement,
    /// Player out of lives
    GameOver,
}

/// Sound to play for a frame event, if any
pub fn sound_for(event: &GameEvent) -> Option<SoundEffect> {
    let effect = match event {
        GameEvent::MissilesFired { .. } => SoundEffect::Shoot,
        GameEvent::EnemyKilled {
            kind: EnemyKind::Shooter,
            ..
        } => SoundEffect::HeavyExplosion,
        GameEvent::EnemyKilled { .. } => SoundEffect::Explosion,
        GameEvent::AsteroidDestroyed { .. } => SoundEffect::RockBreak,
        GameEvent::PowerUpCollected { .. } => SoundEffect::PowerUp,
        GameEvent::PlayerHit {
            shield_absorbed: true,
            ..
        } => SoundEffect::ShieldHit,
        GameEvent::PlayerHit { .. } => SoundEffect::PlayerHit,
        GameEvent::EagleStrike | GameEvent::BombDetonated => SoundEffect::Special,
        GameEvent::BossWarning { .. } | GameEvent::DropshipIncoming { .. } => SoundEffect::Warning,
        GameEvent::MiniBossDefeated { .. } | GameEvent::BossDefeated { .. } => {
            SoundEffect::BigExplosion
        }
        GameEvent::AchievementUnlocked { .. } => SoundEffect::Achievement,
        GameEvent::PlayerDestroyed { .. } => SoundEffect::GameOver,
        GameEvent::ScoreAwarded { .. }
        | GameEvent::ComboLost
        | GameEvent::PowerUpDropped { .. }
        | GameEvent::MiniBossDeployed { .. }
        | GameEvent::MiniBossPhase { .. }
        | GameEvent::BossPhase { .. }
        | GameEvent::StageAdvanced { .. }
        | GameEvent::MusicAdvanced { .. }
        | GameEvent::WorldEventStarted { .. }
        | GameEvent::WorldEventEnded { .. } => return None,
    };
    Some(effect)
}

/// Sounds for a whole frame, at most one of each kind, in first-seen order
pub fn sounds_for_frame(events: &[GameEvent]) -> Vec<SoundEffect> {
    let mut sounds = Vec::new();
    for effect in events.iter().filter_map(sound_for) {
        if !sounds.contains(&effect) {
            sounds.push(effect);
        }
    }
    sounds
}
