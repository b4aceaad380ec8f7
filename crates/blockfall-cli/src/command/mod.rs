use std::path::PathBuf;

use blockfall_engine::{Randomizer, ScoringMode, SessionConfig, ShapeSeed};
use clap::{Parser, Subcommand};

use crate::util;

use self::{play::PlayArg, simulate::SimulateArg};

mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Run headless games with random input and print their results as JSON
    Simulate(#[clap(flatten)] SimulateArg),
}

/// Session options shared by every mode.
///
/// Values given on the command line take precedence over the config file.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArgs {
    /// Session config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Board width in cells
    #[arg(long)]
    width: Option<i32>,
    /// Board height in cells
    #[arg(long)]
    height: Option<i32>,
    /// Time between gravity steps, in milliseconds
    #[arg(long)]
    fall_interval_ms: Option<u64>,
    /// Time a grounded piece may still move before it locks, in milliseconds
    #[arg(long)]
    lock_delay_ms: Option<u64>,
    /// Move the piece one row down after every successful rotation
    #[arg(long)]
    drop_on_rotate: bool,
    /// Points per cleared row
    #[arg(long)]
    base_score: Option<u64>,
    /// Scoring policy (linear or progressive)
    #[arg(long)]
    scoring: Option<ScoringMode>,
    /// Shape randomizer (uniform or bag)
    #[arg(long)]
    randomizer: Option<Randomizer>,
    /// Shape sequence seed (32 hex digits)
    #[arg(long)]
    seed: Option<ShapeSeed>,
}

impl ConfigArgs {
    pub(crate) fn load(&self) -> anyhow::Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file("session config", path)?,
            None => SessionConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut SessionConfig) {
        let Self {
            config: _,
            width,
            height,
            fall_interval_ms,
            lock_delay_ms,
            drop_on_rotate,
            base_score,
            scoring,
            randomizer,
            seed,
        } = self;
        if let Some(width) = width {
            config.board_width = *width;
        }
        if let Some(height) = height {
            config.board_height = *height;
        }
        if let Some(ms) = fall_interval_ms {
            config.fall_interval_ms = *ms;
        }
        if let Some(ms) = lock_delay_ms {
            config.lock_delay_ms = *ms;
        }
        if *drop_on_rotate {
            config.drop_on_rotate = true;
        }
        if let Some(base_score) = base_score {
            config.base_score = *base_score;
        }
        if let Some(scoring) = scoring {
            config.scoring = *scoring;
        }
        if let Some(randomizer) = randomizer {
            config.randomizer = *randomizer;
        }
        if let Some(seed) = seed {
            config.seed = Some(*seed);
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_args() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = CommandArgs::try_parse_from([
            "blockfall",
            "simulate",
            "--width",
            "12",
            "--scoring",
            "progressive",
            "--randomizer",
            "bag",
            "--seed",
            "000102030405060708090a0b0c0d0e0f",
            "--drop-on-rotate",
        ])
        .unwrap();
        let Some(Mode::Simulate(arg)) = args.mode else {
            panic!("expected simulate mode");
        };
        let config = arg.config.load().unwrap();
        assert_eq!(config.board_width, 12);
        assert_eq!(config.board_height, 20);
        assert_eq!(config.scoring, ScoringMode::Progressive);
        assert_eq!(config.randomizer, Randomizer::Bag);
        assert!(config.drop_on_rotate);
        assert!(config.seed.is_some());
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = ConfigArgs {
            fall_interval_ms: Some(0),
            ..ConfigArgs::default()
        };
        assert!(args.load().is_err());
    }
}
