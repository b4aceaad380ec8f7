//! Minimal fixed-step terminal runtime.
//!
//! [`Runtime::run`] owns the terminal and drives an [`App`]: game logic is
//! updated on a fixed tick, the screen is redrawn whenever something changed,
//! and terminal events are forwarded as they arrive.

use std::{io, time::Duration};

use crossterm::event::Event;
use ratatui::Frame;

use self::{event::TuiEvent, event_loop::EventLoop};

mod event;
mod event_loop;

/// An application driven by [`Runtime::run`].
pub trait App {
    /// Returns whether the application should exit.
    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, resize, etc.).
    fn handle_event(&mut self, event: &Event);

    /// Draws the screen.
    fn draw(&self, frame: &mut Frame);

    /// Advances game logic by one tick of length `dt`.
    fn update(&mut self, dt: Duration);
}

#[derive(Debug)]
pub struct Runtime {
    events: EventLoop,
}

impl Runtime {
    /// Creates a runtime ticking `rate` times per second.
    pub fn with_tick_rate(rate: u32) -> Self {
        Self {
            events: EventLoop::new(Duration::from_secs(1) / rate),
        }
    }

    /// Runs `app` until it asks to exit.
    pub fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        let tick_interval = self.events.tick_interval();
        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Tick => app.update(tick_interval),
                    TuiEvent::Render => {
                        terminal.draw(|f| app.draw(f))?;
                    }
                    TuiEvent::Crossterm(event) => app.handle_event(&event),
                }
            }
            Ok(())
        })
    }
}
