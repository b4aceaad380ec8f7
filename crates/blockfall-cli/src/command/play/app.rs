use std::time::Duration;

use blockfall_engine::{
    CellCanvas, GameSession, InputBatch, InputEvent, InputSource, ScoreSink, SessionState,
    input_batch,
};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::{
    tui::App,
    view::widgets::{KeyBinding, KeyBindingDisplay, SessionDisplay},
};

/// Keeps the best score seen across restarts.
#[derive(Debug, Default)]
pub(crate) struct ScoreBoard {
    best: u64,
    finished_games: usize,
}

impl ScoreBoard {
    pub(crate) fn best(&self) -> u64 {
        self.best
    }

    pub(crate) fn finished_games(&self) -> usize {
        self.finished_games
    }
}

impl ScoreSink for ScoreBoard {
    fn on_score_changed(&mut self, total: u64) {
        self.best = self.best.max(total);
    }

    fn on_game_over(&mut self) {
        self.finished_games += 1;
    }
}

/// Key presses collected between two ticks.
#[derive(Debug, Default)]
struct KeyboardInput {
    pending: Vec<InputEvent>,
}

impl KeyboardInput {
    fn press(&mut self, event: InputEvent) {
        self.pending.push(event);
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) -> InputBatch {
        input_batch(self.pending.drain(..))
    }
}

const PLAYING_KEYS: &[KeyBinding] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft Drop"),
    (&["↑", "Space"], "Hard Drop"),
    (&["Z", "X"], "Rotate"),
    (&["P"], "Pause"),
    (&["R"], "Restart"),
    (&["Q"], "Quit"),
];
const PAUSED_KEYS: &[KeyBinding] = &[(&["P"], "Resume"), (&["R"], "Restart"), (&["Q"], "Quit")];
const GAME_OVER_KEYS: &[KeyBinding] = &[(&["R"], "Restart"), (&["Q"], "Quit")];

#[derive(Debug)]
pub(crate) struct PlayApp {
    session: GameSession<CellCanvas, ScoreBoard>,
    keyboard: KeyboardInput,
    show_ghost: bool,
    is_exiting: bool,
}

impl PlayApp {
    pub(crate) fn new(session: GameSession<CellCanvas, ScoreBoard>, show_ghost: bool) -> Self {
        Self {
            session,
            keyboard: KeyboardInput::default(),
            show_ghost,
            is_exiting: false,
        }
    }

    pub(crate) fn score_board(&self) -> &ScoreBoard {
        self.session.score_sink()
    }
}

impl App for PlayApp {
    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, event: &Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }
        let command = match key.code {
            KeyCode::Left => InputEvent::MoveLeft,
            KeyCode::Right => InputEvent::MoveRight,
            KeyCode::Down => InputEvent::SoftDrop,
            KeyCode::Up | KeyCode::Char(' ') => InputEvent::HardDrop,
            KeyCode::Char('z') => InputEvent::RotateCcw,
            KeyCode::Char('x') => InputEvent::RotateCw,
            KeyCode::Char('p') => {
                self.session.toggle_pause();
                return;
            }
            KeyCode::Char('r') => {
                self.keyboard.pending.clear();
                self.session.reset();
                return;
            }
            KeyCode::Char('q') => {
                self.is_exiting = true;
                return;
            }
            _ => return,
        };
        if self.session.state().is_playing() {
            self.keyboard.press(command);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let session_display = SessionDisplay::new(&self.session, self.show_ghost);
        let bindings = match self.session.state() {
            SessionState::Playing => PLAYING_KEYS,
            SessionState::Paused => PAUSED_KEYS,
            SessionState::GameOver => GAME_OVER_KEYS,
        };

        let [main_area, help_area] = Layout::vertical([
            Constraint::Length(session_display.height()),
            Constraint::Length(1),
        ])
        .areas(frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(KeyBindingDisplay::new(bindings), help_area);
    }

    fn update(&mut self, dt: Duration) {
        self.session.tick(dt, &mut self.keyboard);
    }
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{SessionConfig, ShapeSeed};
    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    fn app() -> PlayApp {
        let config = SessionConfig {
            seed: Some(ShapeSeed::from_bytes([1; 16])),
            ..SessionConfig::default()
        };
        let canvas = CellCanvas::new(config.board_width, config.board_height);
        let session = GameSession::new(config, canvas, ScoreBoard::default()).unwrap();
        PlayApp::new(session, true)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_keys_are_applied_on_next_tick() {
        let mut app = app();
        let start = app.session.piece().position();
        app.handle_event(&key(KeyCode::Left));
        assert_eq!(app.session.piece().position(), start);

        app.update(Duration::from_millis(16));
        let moved = app.session.piece().position().unwrap();
        assert_eq!(Some(moved.x + 1), start.map(|p| p.x));
    }

    #[test]
    fn test_hard_drop_key() {
        let mut app = app();
        app.handle_event(&key(KeyCode::Char(' ')));
        app.update(Duration::from_millis(16));
        assert_eq!(app.session.stats().locked_pieces(), 1);
    }

    #[test]
    fn test_pause_and_quit() {
        let mut app = app();
        app.handle_event(&key(KeyCode::Char('p')));
        assert!(app.session.state().is_paused());
        app.handle_event(&key(KeyCode::Left));
        assert!(app.keyboard.pending.is_empty());
        assert!(!app.should_exit());
        app.handle_event(&key(KeyCode::Char('q')));
        assert!(app.should_exit());
    }

    #[test]
    fn test_score_board_keeps_best() {
        let mut board = ScoreBoard::default();
        board.on_score_changed(300);
        board.on_game_over();
        board.on_score_changed(0);
        board.on_score_changed(100);
        assert_eq!(board.best(), 300);
        assert_eq!(board.finished_games(), 1);
    }
}
