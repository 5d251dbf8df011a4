//! Game session state machine
//!
//! Owns everything that outlives a single run (leaderboard, achievement
//! unlocks, settings, the RNG) and decides which subsystems run each frame.
//! The menu layer drives it with [`SessionCommand`]s; the frame loop calls
//! [`Session::tick`].

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::achievements::AchievementBook;
use crate::consts::SIM_DT;
use crate::highscores::{HighScores, Initials};
use crate::persistence::Storage;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Top-level session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Menu,
    Playing,
    /// Simulation frozen; resumes exactly where it stopped
    Paused,
    GameOver,
    /// Qualifying score waiting for three initials
    EnterInitials,
    Leaderboard,
    Settings,
}

/// Commands issued by the menu layer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    StartNewGame,
    Pause,
    Resume,
    ReturnToMenu,
    OpenLeaderboard,
    CloseLeaderboard,
    OpenSettings,
    CloseSettings,
    SubmitInitials(String),
    SkipInitials,
    AdjustMusicVolume(f32),
    AdjustSfxVolume(f32),
}

/// One player's session across any number of runs
pub struct Session<S: Storage> {
    storage: S,
    rng: Pcg32,
    tuning: Tuning,
    leaderboard: HighScores,
    achievements: AchievementBook,
    settings: Settings,
    state: Option<GameState>,
    mode: Mode,
    /// Where the leaderboard/settings overlays return to
    return_mode: Mode,
}

impl<S: Storage> Session<S> {
    /// Load persisted records and start at the menu
    pub fn new(storage: S, seed: u64) -> Self {
        let tuning = Tuning::load(&storage);
        let leaderboard = HighScores::load(&storage);
        let achievements = AchievementBook::load(&storage);
        let settings = Settings::load(&storage);
        Self {
            storage,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            leaderboard,
            achievements,
            settings,
            state: None,
            mode: Mode::Menu,
            return_mode: Mode::Menu,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current run, if one exists (playing, paused, or finished)
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut GameState> {
        self.state.as_mut()
    }

    pub fn leaderboard(&self) -> &HighScores {
        &self.leaderboard
    }

    pub fn achievements(&self) -> &AchievementBook {
        &self.achievements
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Leaderboard position the finished run will take once initials are in
    pub fn pending_rank(&self) -> Option<usize> {
        if self.mode != Mode::EnterInitials {
            return None;
        }
        let score = self.state.as_ref()?.score;
        self.leaderboard.potential_rank(score)
    }

    /// Apply a menu command; returns false if it does not apply in this mode
    pub fn apply(&mut self, command: SessionCommand) -> bool {
        use SessionCommand as C;

        match (command, self.mode) {
            (C::StartNewGame, Mode::Menu | Mode::GameOver | Mode::Paused) => {
                self.start_new_game();
            }
            (C::Pause, Mode::Playing) => {
                self.mode = Mode::Paused;
                log::info!("Paused");
            }
            (C::Resume, Mode::Paused) => {
                self.mode = Mode::Playing;
                log::info!("Resumed");
            }
            (C::ReturnToMenu, Mode::Paused | Mode::GameOver | Mode::EnterInitials) => {
                self.state = None;
                self.mode = Mode::Menu;
            }
            (C::OpenLeaderboard, Mode::Menu | Mode::Paused | Mode::GameOver) => {
                self.return_mode = self.mode;
                self.mode = Mode::Leaderboard;
            }
            (C::OpenSettings, Mode::Menu | Mode::Paused) => {
                self.return_mode = self.mode;
                self.mode = Mode::Settings;
            }
            (C::CloseLeaderboard, Mode::Leaderboard) | (C::CloseSettings, Mode::Settings) => {
                self.mode = self.return_mode;
            }
            (C::SubmitInitials(text), Mode::EnterInitials) => {
                return self.submit_initials(&text);
            }
            (C::SkipInitials, Mode::EnterInitials) => {
                self.mode = Mode::GameOver;
            }
            (C::AdjustMusicVolume(delta), _) => {
                self.settings.adjust_music(delta);
                self.settings.save(&mut self.storage);
            }
            (C::AdjustSfxVolume(delta), _) => {
                self.settings.adjust_sfx(delta);
                self.settings.save(&mut self.storage);
            }
            (command, mode) => {
                log::debug!("Ignoring {command:?} in {mode:?}");
                return false;
            }
        }
        true
    }

    fn start_new_game(&mut self) {
        let high_score = self.leaderboard.top_score().unwrap_or(0);
        self.state = Some(GameState::new(
            self.tuning.clone(),
            high_score,
            self.achievements.clone(),
        ));
        self.mode = Mode::Playing;
        log::info!("New game started");
    }

    fn submit_initials(&mut self, text: &str) -> bool {
        let Some(initials) = Initials::parse(text) else {
            log::warn!("Rejected initials {text:?}");
            return false;
        };
        let score = self.state.as_ref().map_or(0, |s| s.score);
        if let Some(rank) = self.leaderboard.add_score(initials, score) {
            log::info!("{initials} entered the leaderboard at #{rank} with {score}");
            self.leaderboard.save(&mut self.storage);
        }
        self.return_mode = Mode::GameOver;
        self.mode = Mode::Leaderboard;
        true
    }

    /// Advance one frame; a no-op unless a run is in progress
    pub fn tick(&mut self, input: &TickInput) -> Vec<GameEvent> {
        if self.mode != Mode::Playing {
            return Vec::new();
        }
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };

        let events = tick(state, input, SIM_DT, &mut self.rng);

        if events
            .iter()
            .any(|e| matches!(e, GameEvent::AchievementUnlocked { .. }))
        {
            self.achievements.absorb(&state.achievements);
            self.achievements.save(&mut self.storage);
        }

        if state.phase == GamePhase::GameOver {
            let score = state.score;
            self.mode = if self.leaderboard.qualifies(score) {
                Mode::EnterInitials
            } else {
                Mode::GameOver
            };
            log::info!("Game over with {score} points, now {:?}", self.mode);
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStorage, StorageError};
    use glam::Vec2;

    fn session() -> Session<MemoryStorage> {
        Session::new(MemoryStorage::default(), 7)
    }

    fn lose_last_life<S: Storage>(session: &mut Session<S>, score: u64) {
        let state = session.state_mut().unwrap();
        state.score = score;
        state.player.lives = 1;
        let center = state.player.rect.center();
        state.push_hazard(center - Vec2::new(0.0, 10.0));
        session.tick(&TickInput::default());
    }

    #[test]
    fn start_pause_resume() {
        let mut session = session();
        assert_eq!(session.mode(), Mode::Menu);
        assert!(!session.apply(SessionCommand::Pause));

        assert!(session.apply(SessionCommand::StartNewGame));
        session.tick(&TickInput::default());
        assert_eq!(session.state().unwrap().time_ticks, 1);

        assert!(session.apply(SessionCommand::Pause));
        for _ in 0..10 {
            assert!(session.tick(&TickInput::default()).is_empty());
        }
        assert_eq!(session.state().unwrap().time_ticks, 1);

        assert!(session.apply(SessionCommand::Resume));
        session.tick(&TickInput::default());
        assert_eq!(session.state().unwrap().time_ticks, 2);
    }

    #[test]
    fn return_to_menu_tears_down() {
        let mut session = session();
        session.apply(SessionCommand::StartNewGame);
        session.apply(SessionCommand::Pause);
        assert!(session.apply(SessionCommand::ReturnToMenu));
        assert!(session.state().is_none());
        assert_eq!(session.mode(), Mode::Menu);
    }

    #[test]
    fn qualifying_score_asks_for_initials() {
        let mut session = session();
        session.apply(SessionCommand::StartNewGame);
        lose_last_life(&mut session, 4200);
        assert_eq!(session.mode(), Mode::EnterInitials);

        assert_eq!(session.pending_rank(), Some(1));
        assert!(!session.apply(SessionCommand::SubmitInitials("a1".into())));
        assert_eq!(session.mode(), Mode::EnterInitials);

        assert!(session.apply(SessionCommand::SubmitInitials("abc".into())));
        assert_eq!(session.mode(), Mode::Leaderboard);
        assert_eq!(session.leaderboard().entries[0].name.as_str(), "ABC");
        assert_eq!(session.leaderboard().top_score(), Some(4200));
        assert!(session.storage().get(HighScores::STORAGE_KEY).is_some());

        session.apply(SessionCommand::CloseLeaderboard);
        assert_eq!(session.mode(), Mode::GameOver);
    }

    #[test]
    fn low_score_on_full_board_goes_to_game_over() {
        let mut storage = MemoryStorage::default();
        let mut board = HighScores::new();
        for i in 0..10 {
            board.add_score(Initials::parse("ZZZ").unwrap(), 10_000 + i);
        }
        board.save(&mut storage);

        let mut session = Session::new(storage, 7);
        session.apply(SessionCommand::StartNewGame);
        assert_eq!(session.state().unwrap().high_score, 10_009);
        lose_last_life(&mut session, 10_000);
        assert_eq!(session.mode(), Mode::GameOver);
        assert_eq!(session.pending_rank(), None);
    }

    #[test]
    fn achievements_persist_on_unlock() {
        let mut session = session();
        session.apply(SessionCommand::StartNewGame);
        session.state_mut().unwrap().kills.total = 1;
        let events = session.tick(&TickInput::default());
        assert!(events.contains(&GameEvent::AchievementUnlocked { id: "first_blood" }));
        assert!(session.achievements().is_unlocked("first_blood"));
        let stored = session.storage().get(AchievementBook::STORAGE_KEY).unwrap();
        assert!(stored.contains("first_blood"));

        // A later run starts with the unlock already recorded
        session.apply(SessionCommand::Pause);
        session.apply(SessionCommand::StartNewGame);
        assert!(session.state().unwrap().achievements.is_unlocked("first_blood"));
    }

    #[test]
    fn overlays_return_to_previous_mode() {
        let mut session = session();
        session.apply(SessionCommand::StartNewGame);
        session.apply(SessionCommand::Pause);
        assert!(session.apply(SessionCommand::OpenSettings));
        assert!(session.apply(SessionCommand::AdjustMusicVolume(0.1)));
        assert!(session.apply(SessionCommand::CloseSettings));
        assert_eq!(session.mode(), Mode::Paused);
        assert!((session.settings().music_volume - 0.6).abs() < 1e-5);
        assert!(session.storage().get(Settings::STORAGE_KEY).is_some());

        assert!(!session.apply(SessionCommand::CloseLeaderboard));
    }

    struct BrokenDisk;

    impl Storage for BrokenDisk {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk on fire"),
            })
        }

        fn write(&mut self, key: &str, _contents: &str) -> Result<(), StorageError> {
            self.read(key).map(|_| ())
        }
    }

    #[test]
    fn storage_failures_do_not_stop_play() {
        let mut session = Session::new(BrokenDisk, 3);
        assert!(session.leaderboard().is_empty());
        session.apply(SessionCommand::StartNewGame);
        session.state_mut().unwrap().kills.total = 1;
        session.tick(&TickInput::default());
        assert!(session.achievements().is_unlocked("first_blood"));

        lose_last_life(&mut session, 900);
        assert_eq!(session.mode(), Mode::EnterInitials);
        assert!(session.apply(SessionCommand::SubmitInitials("XYZ".into())));
        assert_eq!(session.leaderboard().len(), 1);
    }
}
