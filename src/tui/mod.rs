//! # Terminal User Interface
//!
//! Full-screen interactive forms built on ratatui. Currently hosts the
//! configuration editor behind `ztl config`.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

pub mod event;
pub mod screens;
pub mod terminal;
pub mod widgets;

use anyhow::Result;
use ratatui::Frame;

use crate::tui::{
    event::{EventHandler, TuiEvent},
    terminal::TerminalGuard,
};

/// How a screen finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppResult<T> {
    Done(T),
    Cancelled,
}

/// An interactive screen.
pub trait TuiApp {
    /// Value produced when the screen completes.
    type Output;

    /// Reacts to one event. Returning `Some` ends the session.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<AppResult<Self::Output>>;

    fn render(&mut self, frame: &mut Frame);
}

/// Runs `app` until it completes (`Some`) or is cancelled (`None`).
pub fn run<A: TuiApp>(mut app: A) -> Result<Option<A::Output>> {
    let mut terminal = TerminalGuard::new()?;
    let events = EventHandler::default();

    loop {
        terminal.terminal().draw(|frame| app.render(frame))?;

        if let Some(result) = app.handle_event(&events.next()?) {
            return Ok(match result {
                AppResult::Done(output) => Some(output),
                AppResult::Cancelled => None,
            });
        }
    }
}
