//! Terminal User Interface management
//!
//! Handles terminal setup, teardown, and event polling.
//! Wraps ratatui's Terminal for a cleaner interface.

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, Stdout},
    ops::{Deref, DerefMut},
    time::{Duration, Instant},
};

/// Terminal wrapper for managing the TUI lifecycle
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Host tick period
    pub tick_rate: Duration,
    last_tick: Instant,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            tick_rate: Duration::from_millis(100),
            last_tick: Instant::now(),
        })
    }

    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Enter the alternate screen and enable raw mode
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        self.terminal.clear()?;
        self.last_tick = Instant::now();
        Ok(())
    }

    /// Exit the alternate screen and disable raw mode
    ///
    /// Also called automatically on Drop.
    pub fn exit(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        crossterm::execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
        Ok(())
    }

    /// Poll for the next event until the next tick is due
    ///
    /// Returns `None` once a tick period has passed. Key presses do not
    /// delay ticks, so host time keeps pace with the wall clock.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        let timeout = poll_timeout(self.tick_rate, self.last_tick.elapsed());
        if !timeout.is_zero() && event::poll(timeout)? {
            let event = event::read()?;

            // Filter out key release events (Windows compatibility)
            if let Event::Key(key) = &event {
                if key.kind != KeyEventKind::Press {
                    return Ok(None);
                }
            }
            return Ok(Some(event));
        }

        self.last_tick = Instant::now();
        Ok(None)
    }

    /// Draw to the terminal using the provided closure
    pub fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

/// Time left in the current tick period
fn poll_timeout(tick_rate: Duration, since_last_tick: Duration) -> Duration {
    tick_rate.saturating_sub(since_last_tick)
}

impl Deref for Tui {
    type Target = Terminal<CrosstermBackend<Stdout>>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // Best effort cleanup on drop
        let _ = self.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_timeout_counts_down_to_the_next_tick() {
        let tick = Duration::from_millis(100);
        assert_eq!(poll_timeout(tick, Duration::ZERO), tick);
        assert_eq!(
            poll_timeout(tick, Duration::from_millis(30)),
            Duration::from_millis(70)
        );
    }

    #[test]
    fn test_overdue_tick_does_not_wait() {
        let tick = Duration::from_millis(100);
        assert!(poll_timeout(tick, Duration::from_millis(250)).is_zero());
    }
}
