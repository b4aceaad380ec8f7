use blockfall_engine::{CellCanvas, GameSession};

use crate::{command::ConfigArgs, tui::Runtime};

use self::app::{PlayApp, ScoreBoard};

mod app;

const TICK_RATE: u32 = 60;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    config: ConfigArgs,
    /// Do not show where the falling piece would land
    #[arg(long)]
    no_ghost: bool,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg { config, no_ghost } = arg;

    let config = config.load()?;
    let canvas = CellCanvas::new(config.board_width, config.board_height);
    let session = GameSession::new(config, canvas, ScoreBoard::default())?;
    let mut app = PlayApp::new(session, !*no_ghost);

    Runtime::with_tick_rate(TICK_RATE).run(&mut app)?;

    let board = app.score_board();
    eprintln!(
        "Best score: {} ({} games finished)",
        board.best(),
        board.finished_games()
    );
    Ok(())
}
