use std::{path::PathBuf, time::Duration};

use blockfall_engine::{
    GameSession, GameStats, InputBatch, InputEvent, InputSource, SessionConfig, ShapeSeed,
    input_batch,
};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{command::ConfigArgs, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    pub(crate) config: ConfigArgs,
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,
    /// Stop a game after this many ticks even if it is not over
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,
    /// Length of one tick in milliseconds
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Chance that the random player presses a key on a given tick
    #[arg(long, default_value_t = 0.2)]
    input_rate: f64,
    /// Output file path (JSON lines); stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Presses a random key now and then.
#[derive(Debug)]
struct RandomInput {
    rng: Pcg32,
    rate: f64,
}

impl RandomInput {
    fn new(seed: ShapeSeed, rate: f64) -> Self {
        Self {
            rng: Pcg32::from_seed(*seed.as_bytes()),
            rate,
        }
    }
}

impl InputSource for RandomInput {
    fn poll(&mut self) -> InputBatch {
        if !self.rng.random_bool(self.rate) {
            return InputBatch::new();
        }
        let event = InputEvent::ALL[self.rng.random_range(0..InputEvent::LEN)];
        input_batch([event])
    }
}

#[derive(Debug, Serialize)]
struct GameSummary {
    game: usize,
    shape_seed: ShapeSeed,
    input_seed: ShapeSeed,
    ticks: u64,
    elapsed_ms: u128,
    game_over: bool,
    stats: GameStats,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        config,
        games,
        max_ticks,
        tick_ms,
        input_rate,
        output,
    } = arg;
    anyhow::ensure!(
        (0.0..=1.0).contains(input_rate),
        "input rate must be between 0 and 1, got {input_rate}"
    );

    let config = config.load()?;
    let mut seeds = match config.seed {
        Some(seed) => Pcg32::from_seed(*seed.as_bytes()),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    let dt = Duration::from_millis(*tick_ms);
    let mut output = Output::from_output_path(output.as_deref())?;

    eprintln!("Simulating {games} games...");
    let mut total_score = 0;
    for game in 0..*games {
        let shape_seed: ShapeSeed = seeds.random();
        let input_seed: ShapeSeed = seeds.random();
        let summary = play_game(
            &config,
            game,
            shape_seed,
            input_seed,
            *input_rate,
            dt,
            *max_ticks,
        )?;
        eprintln!(
            "Game #{game}: score {}, lines {}, pieces {} ({} ticks{})",
            summary.stats.score(),
            summary.stats.cleared_lines(),
            summary.stats.locked_pieces(),
            summary.ticks,
            if summary.game_over { "" } else { ", tick limit" },
        );
        total_score += summary.stats.score();
        output.write_json_line(&summary)?;
    }
    if *games > 0 {
        eprintln!("Average score: {}", total_score / *games as u64);
    }
    eprintln!("Results written to {}", output.display_path());

    Ok(())
}

fn play_game(
    config: &SessionConfig,
    game: usize,
    shape_seed: ShapeSeed,
    input_seed: ShapeSeed,
    input_rate: f64,
    dt: Duration,
    max_ticks: u64,
) -> anyhow::Result<GameSummary> {
    let config = SessionConfig {
        seed: Some(shape_seed),
        ..config.clone()
    };
    let mut session = GameSession::new(config, (), ())?;
    let mut input = RandomInput::new(input_seed, input_rate);

    let mut ticks = 0;
    while ticks < max_ticks && session.state().is_playing() {
        session.tick(dt, &mut input);
        ticks += 1;
    }

    Ok(GameSummary {
        game,
        shape_seed,
        input_seed,
        ticks,
        elapsed_ms: session.elapsed().as_millis(),
        game_over: session.state().is_game_over(),
        stats: session.stats().clone(),
    })
}
