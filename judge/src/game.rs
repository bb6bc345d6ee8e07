use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use collapsi::{
    BotPlayer, BotWorker, Completion, Difficulty, GameEvent, GameHost, GameSummary, PlannedTurn,
    PlayerKind, TracingObserver,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::config::MatchConfig;
use crate::recording::{GameRecording, Recorder};

// Far more turns than a game on the largest board can last.
const MAX_TURNS: usize = 1_000;

/// A bot taking part in one game.
pub enum Seat {
    /// Searches on the judge's thread.
    Inline(BotPlayer),
    /// Searches on its own thread.
    Background(BotWorker),
}

impl Seat {
    pub fn new(config: &MatchConfig, difficulty: Difficulty, seed: u64) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        let bot = BotPlayer::with_policy(config.tier_policy(difficulty), rng);
        if config.background_search {
            Seat::Background(BotWorker::spawn(bot))
        } else {
            Seat::Inline(bot)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub searched_turns: usize,
    pub timed_out: usize,
    pub exact: usize,
}

impl SearchStats {
    pub fn merge(&mut self, other: &SearchStats) {
        self.searched_turns += other.searched_turns;
        self.timed_out += other.timed_out;
        self.exact += other.exact;
    }

    fn count(&mut self, plan: &PlannedTurn) {
        if let Some(report) = &plan.report {
            self.searched_turns += 1;
            match report.completion {
                Completion::Exact => self.exact += 1,
                Completion::TimedOut => self.timed_out += 1,
                Completion::DepthLimited => {}
            }
        }
    }
}

pub struct GameOutcome {
    pub summary: GameSummary,
    pub turns: usize,
    /// Per seat.
    pub stats: Vec<SearchStats>,
}

/// Plays one game between bots of the given difficulties, seated in order.
///
/// Any rule violation by a bot is returned as an error, since bots only
/// play moves the rules engine produced for them.
pub fn play_game(
    config: &MatchConfig,
    seating: &[Difficulty],
    rng: &mut StdRng,
    recorder: &mut Option<Recorder>,
) -> anyhow::Result<GameOutcome> {
    let seed: u64 = rng.gen();
    let mut game_rng = StdRng::seed_from_u64(seed);
    let kinds: Vec<PlayerKind> = seating
        .iter()
        .map(|&difficulty| PlayerKind::Bot { difficulty })
        .collect();
    let mut seats: Vec<Seat> = seating
        .iter()
        .map(|&difficulty| Seat::new(config, difficulty, game_rng.gen()))
        .collect();

    let events = Arc::new(Mutex::new(Vec::new()));
    let mut host = GameHost::new();
    host.add_observer(TracingObserver);
    if recorder.is_some() {
        let sink = Arc::clone(&events);
        host.add_observer(move |event: &GameEvent| {
            if let Ok(mut events) = sink.lock() {
                events.push(event.clone());
            }
        });
    }

    host.start_new_game(&kinds, config.board_size, config.setup_policy(), &mut game_rng)?;
    let layout = host.state()?.board().layout();
    let step_delay = Duration::from_millis(config.step_delay_ms);
    host.session_mut()?.set_step_delay(step_delay);
    trace!(board = %collapsi::visualize_board(host.state()?), "Dealt");

    let mut stats = vec![SearchStats::default(); seating.len()];
    let mut turns = 0;
    while let Ok(state) = host.state() {
        turns += 1;
        if turns > MAX_TURNS {
            anyhow::bail!("Game did not end after {} turns", MAX_TURNS);
        }
        let idx = state.current_index();
        match &mut seats[idx] {
            Seat::Inline(bot) => {
                let plan = host.plan_bot_turn(bot, None)?;
                stats[idx].count(&plan);
                while bot.has_pending_steps() {
                    host.make_bot_move(bot)?;
                    pause(step_delay);
                }
            }
            Seat::Background(worker) => {
                let plan = worker.plan(state, None)?;
                stats[idx].count(&plan);
                for &step in &plan.steps {
                    host.move_to(step)?;
                    pause(step_delay);
                }
            }
        }
        if let Ok(state) = host.state() {
            trace!(board = %collapsi::visualize_board(state), "After turn {}", turns);
        }
    }

    let summary = host
        .summary()
        .cloned()
        .context("The game ended without a summary")?;
    debug!(winner = ?summary.winner, turns, "Game over");

    if let Some(rec) = recorder {
        let events = events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default();
        rec.write_game_recording(&GameRecording {
            seed,
            layout,
            seats: seating.to_vec(),
            events,
            summary: summary.clone(),
        })?;
    }

    Ok(GameOutcome {
        summary,
        turns,
        stats,
    })
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
