//! # TUI Events
//!
//! Terminal input mapped to the events screens react to.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Input delivered to a [`TuiApp`](super::TuiApp).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    Key(KeyEvent),
    /// Bracketed paste
    Paste(String),
    Resize(u16, u16),
}

/// Blocking reader of terminal events.
#[derive(Debug, Clone, Copy)]
pub struct EventHandler {
    tick: Duration,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
        }
    }
}

impl EventHandler {
    /// Waits for the next event a screen cares about.
    ///
    /// Key releases and mouse/focus events are skipped so each key press is
    /// seen once on every platform.
    pub fn next(&self) -> Result<TuiEvent> {
        loop {
            if !event::poll(self.tick)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    return Ok(TuiEvent::Key(key));
                }
                Event::Paste(text) => return Ok(TuiEvent::Paste(text)),
                Event::Resize(width, height) => return Ok(TuiEvent::Resize(width, height)),
                _ => {}
            }
        }
    }
}
