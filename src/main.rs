//! Eagle Strike headless runner
//!
//! Flies the autopilot through one or more runs against the real storage
//! backend. Useful for smoke-testing balance changes and persistence.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;

    use eagle_strike::consts::TICKS_PER_SECOND;
    use eagle_strike::achievements;
    use eagle_strike::cues;
    use eagle_strike::persistence::FileStorage;
    use eagle_strike::sim::TickInput;
    use eagle_strike::{Mode, Session, SessionCommand};

    /// Run the simulation core without rendering
    #[derive(Parser)]
    #[command(name = "eagle-strike")]
    #[command(about = "Headless autopilot runs of the Eagle Strike simulation")]
    struct Cli {
        /// RNG seed
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Tick limit per run (60 ticks per second)
        #[arg(long, default_value_t = 60 * 60 * 5)]
        ticks: u64,

        /// Number of consecutive runs
        #[arg(long, default_value_t = 1)]
        runs: u32,

        /// Directory for leaderboard, achievements, settings and tuning
        #[arg(long, default_value = "eagle-strike-data")]
        data: PathBuf,

        /// Initials entered for qualifying scores
        #[arg(long, default_value = "CPU")]
        initials: String,
    }

    pub fn run() {
        let cli = Cli::parse();

        let mut session = Session::new(FileStorage::new(cli.data), cli.seed);
        log::info!(
            "Eagle Strike headless: seed {}, {} run(s), data in {}",
            cli.seed,
            cli.runs,
            session.storage().dir().display()
        );
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        for run in 1..=cli.runs {
            session.apply(SessionCommand::StartNewGame);
            let mut sounds = 0usize;
            let mut ticks = 0u64;
            while session.mode() == Mode::Playing && ticks < cli.ticks {
                let events = session.tick(&input);
                sounds += cues::sounds_for_frame(&events).len();
                ticks += 1;
            }

            let Some(state) = session.state() else {
                continue;
            };
            let seconds = ticks as f32 / TICKS_PER_SECOND as f32;
            println!(
                "run {run}: score {} | stage {} | kills {} ({} mini, {} boss)",
                state.score,
                state.stage,
                state.kills.total,
                state.kills.mini_bosses,
                state.kills.bosses,
            );
            println!(
                "        lives {} | {seconds:.1}s | {sounds} cues",
                state.player.lives
            );

            if let Some(rank) = session.pending_rank() {
                println!("        new high score, rank #{rank}");
            }
            if session.mode() == Mode::EnterInitials
                && !session.apply(SessionCommand::SubmitInitials(cli.initials.clone()))
            {
                log::warn!("Initials {:?} rejected, skipping entry", cli.initials);
                session.apply(SessionCommand::SkipInitials);
            }
            match session.mode() {
                Mode::Leaderboard => {
                    session.apply(SessionCommand::CloseLeaderboard);
                }
                // Cut off by the tick limit
                Mode::Playing => {
                    session.apply(SessionCommand::Pause);
                }
                _ => {}
            }
            session.apply(SessionCommand::ReturnToMenu);
        }

        println!("leaderboard:");
        for (rank, entry) in session.leaderboard().entries.iter().enumerate() {
            println!("  {:>2}. {} {:>8}", rank + 1, entry.name, entry.score);
        }
        println!("achievements unlocked: {}", session.achievements().len());
        for id in session.achievements().iter() {
            let title = achievements::find(id).map_or(id, |a| a.title);
            println!("  {title}");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host page; there is no wasm entry point here
}
