use std::path::PathBuf;

use clap::Parser;
use collapsi::{Color, Difficulty};
use itertools::Itertools;
use judge::{play_game, MatchConfig, Recorder, SearchStats};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// Path to a JSON match config; the other options override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Board size, 4 to 6
    #[arg(short, long)]
    board_size: Option<u8>,

    /// Difficulty (1-4) of each bot, in seating order
    #[arg(long, value_delimiter = ',')]
    bots: Vec<u8>,

    /// How many games to play
    #[arg(short, long)]
    num_games: Option<usize>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Record each game's layout and events as JSON files into this directory
    #[arg(short, long)]
    record_games_to_directory: Option<PathBuf>,

    /// Allow every board size / player count combination that fills the board
    #[arg(long, default_value_t = false)]
    relaxed_pairing: bool,

    /// Multiply the bots' thinking time by this factor
    #[arg(long)]
    time_scale: Option<f64>,

    /// Let the bots search on worker threads
    #[arg(long, default_value_t = false)]
    background_search: bool,

    /// Pause after every step, in milliseconds
    #[arg(long)]
    step_delay_ms: Option<u64>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

impl Args {
    fn match_config(&self) -> anyhow::Result<MatchConfig> {
        let mut config = match &self.config {
            Some(path) => MatchConfig::load(path)?,
            None => MatchConfig::default(),
        };
        if let Some(board_size) = self.board_size {
            config.board_size = board_size;
        }
        if !self.bots.is_empty() {
            config.bots = self
                .bots
                .iter()
                .map(|&level| Difficulty::try_from(level))
                .collect::<Result<_, _>>()?;
        }
        if let Some(num_games) = self.num_games {
            config.num_games = num_games;
        }
        config.seed = self.seed.or(config.seed);
        config.relaxed_pairing |= self.relaxed_pairing;
        config.background_search |= self.background_search;
        if let Some(time_scale) = self.time_scale {
            config.time_scale = time_scale;
        }
        if let Some(step_delay_ms) = self.step_delay_ms {
            config.step_delay_ms = step_delay_ms;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Results of one bot over the whole series, wherever it was seated.
#[derive(Default)]
struct BotScore {
    wins: usize,
    place_sum: usize,
    stats: SearchStats,
}

fn print_results(config: &MatchConfig, scores: &[BotScore], games: usize) {
    println!(
        "\nResults after {} games on a {}x{} board:\n",
        games, config.board_size, config.board_size
    );
    println!(
        " {:3} | {:10} | {:5} | {:6} | {:9} | {:8} | {:9}",
        "bot", "difficulty", "wins", "win %", "avg place", "searches", "timed out"
    );
    println!("-----|------------|-------|--------|-----------|----------|----------");
    for (idx, (difficulty, score)) in config.bots.iter().zip(scores).enumerate() {
        let win_percentage = score.wins as f32 / games as f32 * 100.0;
        let avg_place = score.place_sum as f32 / games as f32 + 1.0;
        println!(
            " {:3} | {:10} | {:5} | {:5.1}% | {:9.2} | {:8} | {:9}",
            idx + 1,
            format!("{:?}", difficulty),
            score.wins,
            win_percentage,
            avg_place,
            score.stats.searched_turns,
            score.stats.timed_out
        );
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let config = args.match_config()?;

    // Get a random seed
    let seed = config.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        board_size = config.board_size,
        bots = %config.bots.iter().map(|d| d.level()).join(","),
        "Starting series"
    );
    let mut rng = StdRng::seed_from_u64(seed);

    let mut recorder = if let Some(dir_path) = args.record_games_to_directory {
        Some(Recorder::new(dir_path)?)
    } else {
        None
    };

    let num_bots = config.bots.len();
    let mut scores: Vec<BotScore> = (0..num_bots).map(|_| BotScore::default()).collect();
    for game_idx in 0..config.num_games {
        // Rotate the seats so that every bot gets to move first equally often
        let order: Vec<usize> = (0..num_bots)
            .map(|seat| (seat + game_idx) % num_bots)
            .collect();
        let seating: Vec<Difficulty> = order.iter().map(|&bot| config.bots[bot]).collect();
        let outcome = play_game(&config, &seating, &mut rng, &mut recorder)?;

        for (seat, &bot) in order.iter().enumerate() {
            let color = Color::ALL[seat];
            scores[bot].stats.merge(&outcome.stats[seat]);
            if let Some(&(_, rank)) = outcome.summary.ranking.iter().find(|(c, _)| *c == color) {
                scores[bot].place_sum += usize::from(rank);
                if rank == 0 {
                    scores[bot].wins += 1;
                }
            }
        }
        debug!(
            game_idx,
            winner = ?outcome.summary.winner,
            turns = outcome.turns,
            "Game finished"
        );
    }

    print_results(&config, &scores, config.num_games);

    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().event_format(format))
        .with(filter)
        .init();
}
