use std::time::Duration;

use crate::{
    ActivePiece, ConfigError, Coord, GameStats, Grid, InputEvent, InputSource,
    InvalidPlacementError, LockedPiece, Renderer, RotationDirection, ScorePolicy, ScoreSink,
    SessionConfig, ShapeCatalog, ShapeSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// One game: the grid, the falling piece, its timers and the score.
///
/// Sessions are independent values; any number can run side by side. The host
/// drives a session by calling [`GameSession::tick`] at a fixed step and feeds it
/// input through an [`InputSource`]. Visible changes are pushed to the
/// [`Renderer`] and score changes to the [`ScoreSink`].
///
/// # Rendering
///
/// Whenever the piece moves, the cells it was drawn on are cleared and its new
/// cells are drawn. A lock that clears rows repaints the whole board with
/// [`Renderer::clear_all`] followed by every settled cell. On game over the
/// board is cleared and left blank.
#[derive(Debug)]
pub struct GameSession<V: Renderer = (), S: ScoreSink = ()> {
    config: SessionConfig,
    catalog: ShapeCatalog,
    grid: Grid,
    piece: ActivePiece,
    shapes: Box<dyn ShapeSource>,
    score_policy: Box<dyn ScorePolicy>,
    stats: GameStats,
    session_state: SessionState,
    elapsed: Duration,
    drawn: Option<[Coord; 4]>,
    renderer: V,
    score_sink: S,
}

impl<V: Renderer, S: ScoreSink> GameSession<V, S> {
    /// Starts a session with the shape source described by `config`.
    pub fn new(config: SessionConfig, renderer: V, score_sink: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let shapes = config.shape_source();
        Self::with_shape_source(config, shapes, renderer, score_sink)
    }

    /// Starts a session that draws its shapes from `shapes`.
    ///
    /// `config.randomizer` and `config.seed` are ignored.
    pub fn with_shape_source(
        config: SessionConfig,
        shapes: Box<dyn ShapeSource>,
        renderer: V,
        score_sink: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut session = Self {
            catalog: ShapeCatalog::new(),
            grid: Grid::new(config.board_width, config.board_height),
            piece: ActivePiece::new(config.piece_settings()),
            shapes,
            score_policy: config.score_policy(),
            stats: GameStats::new(),
            session_state: SessionState::Playing,
            elapsed: Duration::ZERO,
            drawn: None,
            renderer,
            score_sink,
            config,
        };
        session.renderer.clear_all();
        session.spawn();
        Ok(session)
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn piece(&self) -> &ActivePiece {
        &self.piece
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.stats.score()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session_state
    }

    /// Game time accumulated by ticks while playing.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn renderer(&self) -> &V {
        &self.renderer
    }

    #[must_use]
    pub fn score_sink(&self) -> &S {
        &self.score_sink
    }

    /// Where the falling piece would come to rest if dropped now.
    ///
    /// `None` once the game is over.
    #[must_use]
    pub fn ghost_cells(&self) -> Option<[Coord; 4]> {
        self.piece
            .is_live()
            .then(|| self.piece.ghost_cells(&self.grid))
    }

    pub fn toggle_pause(&mut self) {
        self.session_state = match self.session_state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            SessionState::GameOver => SessionState::GameOver,
        };
    }

    /// Advances the game by `dt`, then applies the input polled for this tick.
    ///
    /// Gravity and the lock delay run first. Each polled event is then applied
    /// on its own, in order; a rejected event does not affect the others.
    /// Nothing happens unless the session is playing.
    pub fn tick(&mut self, dt: Duration, input: &mut impl InputSource) {
        if !self.session_state.is_playing() {
            return;
        }
        self.elapsed += dt;

        if self.piece.advance(dt, &self.grid).is_lock_due() {
            let locked = self.piece.lock(&mut self.grid);
            self.finish_lock(&locked);
        } else {
            self.sync_piece();
        }

        for event in input.poll() {
            let _ = self.handle_input(event);
        }
    }

    /// Applies one player command immediately.
    ///
    /// Returns the placement error of a move or rotation that did not fit.
    /// Input is ignored while paused or after game over.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<(), InvalidPlacementError> {
        if !self.session_state.is_playing() {
            return Ok(());
        }
        let result = match event {
            InputEvent::MoveLeft => self.piece.move_by(Coord::LEFT, &self.grid),
            InputEvent::MoveRight => self.piece.move_by(Coord::RIGHT, &self.grid),
            InputEvent::SoftDrop => self.piece.soft_drop(&self.grid),
            InputEvent::RotateCw => self.piece.rotate(RotationDirection::Clockwise, &self.grid),
            InputEvent::RotateCcw => self
                .piece
                .rotate(RotationDirection::CounterClockwise, &self.grid),
            InputEvent::HardDrop => {
                let locked = self.piece.hard_drop(&mut self.grid);
                self.finish_lock(&locked);
                return Ok(());
            }
        };
        self.sync_piece();
        result
    }

    /// Starts over with an empty board and zeroed statistics.
    ///
    /// The shape source carries on from where it was.
    pub fn reset(&mut self) {
        let had_score = self.stats.score() != 0;
        self.grid.clear();
        self.piece = ActivePiece::new(self.config.piece_settings());
        self.stats = GameStats::new();
        self.session_state = SessionState::Playing;
        self.elapsed = Duration::ZERO;
        self.drawn = None;
        self.renderer.clear_all();
        if had_score {
            self.score_sink.on_score_changed(0);
        }
        self.spawn();
    }

    fn finish_lock(&mut self, locked: &LockedPiece) {
        let delta = self.score_policy.score_delta(locked.cleared_rows);
        self.stats.record_lock(locked.cleared_rows, delta);
        if delta != 0 {
            self.score_sink.on_score_changed(self.stats.score());
        }

        if locked.cleared_rows > 0 {
            self.drawn = None;
            self.repaint();
        } else {
            if let Some(previous) = self.drawn.take() {
                self.renderer.clear_cells(&previous);
            }
            self.renderer
                .draw_cells(&locked.cells.map(|cell| (cell, locked.kind)));
        }

        self.spawn();
    }

    fn spawn(&mut self) {
        let kind = self.shapes.next_shape();
        let definition = self.catalog.definition(kind);
        if self
            .piece
            .initialize(definition, self.config.spawn, &self.grid)
            .is_err()
        {
            self.game_over();
            return;
        }
        self.sync_piece();
    }

    fn game_over(&mut self) {
        self.session_state = SessionState::GameOver;
        self.drawn = None;
        self.renderer.clear_all();
        self.score_sink.on_game_over();
    }

    fn repaint(&mut self) {
        self.renderer.clear_all();
        let settled: Vec<_> = self.grid.occupied_cells().collect();
        if !settled.is_empty() {
            self.renderer.draw_cells(&settled);
        }
    }

    /// Moves the drawn piece to where the piece is now.
    fn sync_piece(&mut self) {
        let current = if self.piece.is_live() {
            self.piece.cells()
        } else {
            None
        };
        if current == self.drawn {
            return;
        }
        if let Some(previous) = self.drawn.take() {
            self.renderer.clear_cells(&previous);
        }
        if let (Some(cells), Some(kind)) = (current, self.piece.kind()) {
            self.renderer.draw_cells(&cells.map(|cell| (cell, kind)));
        }
        self.drawn = current;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{CellCanvas, CycleShapes, PieceState, ScriptedInput, ScoringMode, ShapeKind};

    const FRAME: Duration = Duration::from_millis(100);

    #[derive(Debug, Default)]
    struct RecordingSink {
        totals: Vec<u64>,
        game_overs: usize,
    }

    impl ScoreSink for RecordingSink {
        fn on_score_changed(&mut self, total: u64) {
            self.totals.push(total);
        }

        fn on_game_over(&mut self) {
            self.game_overs += 1;
        }
    }

    type TestSession = GameSession<CellCanvas, RecordingSink>;

    fn session_with(config: SessionConfig, shapes: &[ShapeKind]) -> TestSession {
        let canvas = CellCanvas::new(config.board_width, config.board_height);
        GameSession::with_shape_source(
            config,
            Box::new(CycleShapes::new(shapes.iter().copied())),
            canvas,
            RecordingSink::default(),
        )
        .unwrap()
    }

    fn session(shapes: &[ShapeKind]) -> TestSession {
        session_with(SessionConfig::default(), shapes)
    }

    /// What the renderer shows must be exactly the settled cells plus the live piece.
    fn assert_canvas_mirrors_board(session: &TestSession) {
        let mut expected: BTreeSet<_> = session.grid().occupied_cells().collect();
        if session.piece().is_live() {
            let kind = session.piece().kind().unwrap();
            for cell in session.piece().cells().unwrap() {
                expected.insert((cell, kind));
            }
        }
        let drawn: BTreeSet<_> = session.renderer().drawn_cells().collect();
        assert_eq!(drawn, expected);
    }

    fn fill_row_except(session: &mut TestSession, row: i32, except: &[i32]) {
        for x in 0..session.grid.width() {
            if !except.contains(&x) {
                session.grid.set_cell(Coord::new(x, row), Some(ShapeKind::T));
            }
        }
        session.repaint();
        session.drawn = None;
        session.sync_piece();
    }

    #[test]
    fn test_new_spawns_first_piece() {
        let session = session(&[ShapeKind::T]);
        assert!(session.state().is_playing());
        assert_eq!(session.piece().kind(), Some(ShapeKind::T));
        assert_eq!(session.piece().position(), Some(Coord::new(4, 18)));
        assert_eq!(session.score(), 0);
        assert_canvas_mirrors_board(&session);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SessionConfig {
            board_width: 0,
            ..SessionConfig::default()
        };
        let result = GameSession::new(config, (), ());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidBoardSize { width: 0, .. })
        ));
    }

    #[test]
    fn test_gravity_moves_piece_once_per_interval() {
        let mut session = session(&[ShapeKind::O]);
        for _ in 0..10 {
            session.tick(FRAME, &mut ());
        }
        // exactly one interval has elapsed, the step happens on the next tick
        assert_eq!(session.piece().position(), Some(Coord::new(4, 18)));
        session.tick(FRAME, &mut ());
        assert_eq!(session.piece().position(), Some(Coord::new(4, 17)));
        assert_eq!(session.elapsed(), FRAME * 11);
        assert_canvas_mirrors_board(&session);
    }

    #[test]
    fn test_lock_after_delay_spawns_next_piece() {
        let config = SessionConfig {
            fall_interval_ms: 100,
            lock_delay_ms: 300,
            ..SessionConfig::default()
        };
        let mut session = session_with(config, &[ShapeKind::O, ShapeKind::T]);

        let mut ticks = 0;
        while session.stats().locked_pieces() == 0 {
            session.tick(FRAME, &mut ());
            assert_canvas_mirrors_board(&session);
            ticks += 1;
            assert!(ticks < 100, "piece never locked");
        }

        assert_eq!(session.piece().kind(), Some(ShapeKind::T));
        assert_eq!(session.piece().state(), PieceState::Falling);
        for x in [4, 5] {
            for y in [0, 1] {
                assert_eq!(session.grid().cell(Coord::new(x, y)), Some(ShapeKind::O));
            }
        }
    }

    #[test]
    fn test_input_is_applied_after_gravity() {
        let mut session = session(&[ShapeKind::T]);
        let mut input = ScriptedInput::new()
            .then([InputEvent::MoveLeft, InputEvent::MoveLeft])
            .then([InputEvent::RotateCw])
            .then([InputEvent::SoftDrop]);

        session.tick(FRAME, &mut input);
        // repeated events within a tick collapse into one
        assert_eq!(session.piece().position(), Some(Coord::new(3, 18)));
        session.tick(FRAME, &mut input);
        assert_eq!(session.piece().rotation().map(|r| r.index()), Some(1));
        session.tick(FRAME, &mut input);
        assert_eq!(session.piece().position(), Some(Coord::new(3, 17)));
        assert_canvas_mirrors_board(&session);
    }

    #[test]
    fn test_rejected_input_reports_error() {
        let mut session = session(&[ShapeKind::O]);
        while session.handle_input(InputEvent::MoveLeft).is_ok() {}
        assert_eq!(session.piece().position(), Some(Coord::new(0, 18)));
        assert_eq!(
            session.handle_input(InputEvent::MoveLeft),
            Err(InvalidPlacementError)
        );
        assert_canvas_mirrors_board(&session);
    }

    #[test]
    fn test_hard_drop_locks_immediately() {
        let mut session = session(&[ShapeKind::I, ShapeKind::O]);
        session.handle_input(InputEvent::HardDrop).unwrap();

        assert_eq!(session.stats().locked_pieces(), 1);
        for x in 3..7 {
            assert_eq!(session.grid().cell(Coord::new(x, 0)), Some(ShapeKind::I));
        }
        assert_eq!(session.piece().kind(), Some(ShapeKind::O));
        assert_eq!(session.score(), 0);
        assert!(session.score_sink().totals.is_empty());
        assert_canvas_mirrors_board(&session);
    }

    #[test]
    fn test_line_clear_scores_and_repaints() {
        let mut session = session(&[ShapeKind::I]);
        fill_row_except(&mut session, 0, &[3, 4, 5, 6]);
        fill_row_except(&mut session, 1, &[3, 4, 5, 6, 7, 8, 9]);

        session.handle_input(InputEvent::HardDrop).unwrap();

        assert_eq!(session.stats().cleared_lines(), 1);
        assert_eq!(session.score(), 100);
        assert_eq!(session.score_sink().totals, [100]);
        // the partial row above moved down into row 0
        assert_eq!(session.grid().cell(Coord::new(0, 0)), Some(ShapeKind::T));
        assert_eq!(session.grid().cell(Coord::new(3, 0)), None);
        assert_eq!(session.grid().occupied_cells().count(), 3);
        assert_canvas_mirrors_board(&session);
    }

    #[test]
    fn test_progressive_scoring_rewards_multi_row_clears() {
        let config = SessionConfig {
            scoring: ScoringMode::Progressive,
            ..SessionConfig::default()
        };
        let mut session = session_with(config, &[ShapeKind::I]);
        for row in 0..4 {
            fill_row_except(&mut session, row, &[9]);
        }
        session.handle_input(InputEvent::RotateCw).unwrap();
        while session.handle_input(InputEvent::MoveRight).is_ok() {}
        session.handle_input(InputEvent::HardDrop).unwrap();

        assert_eq!(session.stats().cleared_lines(), 4);
        assert_eq!(session.stats().line_cleared_counter()[4], 1);
        assert_eq!(session.score(), 1000);
        assert_eq!(session.grid().occupied_cells().count(), 0);
        assert_canvas_mirrors_board(&session);
    }

    #[test]
    fn test_game_over_when_spawn_is_blocked() {
        let mut session = session(&[ShapeKind::O]);
        let mut drops = 0;
        while session.state().is_playing() {
            session.handle_input(InputEvent::HardDrop).unwrap();
            drops += 1;
            assert!(drops < 20, "game never ended");
        }

        assert!(session.state().is_game_over());
        assert_eq!(session.score_sink().game_overs, 1);
        assert_eq!(session.renderer().drawn_cells().count(), 0);
        assert_eq!(session.ghost_cells(), None);

        // terminal: ticks and input are ignored
        let grid = session.grid().clone();
        session.tick(FRAME, &mut ScriptedInput::new().then([InputEvent::HardDrop]));
        assert_eq!(session.handle_input(InputEvent::MoveLeft), Ok(()));
        assert_eq!(session.grid(), &grid);
        assert_eq!(session.score_sink().game_overs, 1);
        session.toggle_pause();
        assert!(session.state().is_game_over());
    }

    #[test]
    fn test_pause_stops_time_and_input() {
        let mut session = session(&[ShapeKind::T]);
        session.toggle_pause();
        assert!(session.state().is_paused());

        for _ in 0..30 {
            session.tick(FRAME, &mut ScriptedInput::new().then([InputEvent::MoveLeft]));
        }
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert_eq!(session.piece().position(), Some(Coord::new(4, 18)));

        session.toggle_pause();
        session.tick(FRAME, &mut ScriptedInput::new().then([InputEvent::MoveLeft]));
        assert_eq!(session.piece().position(), Some(Coord::new(3, 18)));
    }

    #[test]
    fn test_reset_starts_over() {
        let mut session = session(&[ShapeKind::I, ShapeKind::O]);
        fill_row_except(&mut session, 0, &[3, 4, 5, 6]);
        session.handle_input(InputEvent::HardDrop).unwrap();
        session.handle_input(InputEvent::HardDrop).unwrap();
        assert_eq!(session.score(), 100);

        session.reset();

        assert!(session.state().is_playing());
        assert_eq!(session.stats(), &GameStats::new());
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert_eq!(session.grid().occupied_cells().count(), 0);
        assert!(session.piece().is_live());
        assert_eq!(session.score_sink().totals, [100, 0]);
        assert_canvas_mirrors_board(&session);
    }

    #[test]
    fn test_ghost_follows_piece() {
        let mut session = session(&[ShapeKind::O]);
        let ghost = session.ghost_cells().unwrap();
        assert!(ghost.iter().all(|c| c.y <= 1));
        assert!(ghost.contains(&Coord::new(4, 0)));

        session.handle_input(InputEvent::MoveRight).unwrap();
        let ghost = session.ghost_cells().unwrap();
        assert!(ghost.contains(&Coord::new(6, 1)));
        // the ghost is a projection only
        assert_eq!(session.piece().position(), Some(Coord::new(5, 18)));
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = session(&[ShapeKind::O]);
        let b = session(&[ShapeKind::O]);
        a.handle_input(InputEvent::HardDrop).unwrap();
        assert_eq!(a.stats().locked_pieces(), 1);
        assert_eq!(b.stats().locked_pieces(), 0);
        assert_eq!(b.grid().occupied_cells().count(), 0);
    }

    #[test]
    fn test_seeded_sessions_replay_identically() {
        let config = SessionConfig {
            seed: Some("0123456789abcdef0123456789abcdef".parse().unwrap()),
            ..SessionConfig::default()
        };
        let mut a = GameSession::new(config.clone(), (), ()).unwrap();
        let mut b = GameSession::new(config, (), ()).unwrap();
        for _ in 0..30 {
            a.handle_input(InputEvent::HardDrop).unwrap();
            b.handle_input(InputEvent::HardDrop).unwrap();
            assert_eq!(a.piece().kind(), b.piece().kind());
        }
        assert_eq!(a.grid(), b.grid());
    }
}
