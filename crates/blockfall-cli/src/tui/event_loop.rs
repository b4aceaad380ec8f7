use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

use super::event::TuiEvent;

/// Produces ticks at a fixed interval, renders when dirty, and reads terminal
/// events in between.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Duration,
    next_tick: Instant,
    dirty: bool,
}

impl EventLoop {
    pub(super) fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            next_tick: Instant::now() + tick_interval,
            // the first frame must be drawn before any event arrives
            dirty: true,
        }
    }

    pub(super) fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Blocks until the next tick is due or a terminal event arrives.
    ///
    /// Ticks are scheduled on a fixed grid, so a late tick is followed by the
    /// ones it missed rather than by a longer step.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if now >= self.next_tick {
                self.next_tick += self.tick_interval;
                self.dirty = true;
                return Ok(TuiEvent::Tick);
            }

            if self.dirty {
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if !event::poll(self.next_tick.saturating_duration_since(now))? {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }
}
