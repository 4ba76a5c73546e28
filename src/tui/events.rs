//! Custom event types for TUI application.

use crossterm::event::KeyEvent;
use tokio::sync::mpsc::UnboundedSender;

use crate::execution::{BusySurface, Mode, OutputSurface, Outcome};

/// Events that can occur in the TUI application
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Bracketed paste content
    Paste(String),
    /// Output surface write from a request task
    Output { text: String, is_error: bool },
    /// Busy surface toggle from a request task
    ControlsEnabled(bool),
    /// A request task finished
    Settled { mode: Mode, outcome: Outcome },
}

/// Surfaces handed to a spawned request task. Writes become events so the
/// event loop stays the only owner of `App`.
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    tx: UnboundedSender<TuiEvent>,
}

impl ChannelSurface {
    pub fn new(tx: UnboundedSender<TuiEvent>) -> Self {
        Self { tx }
    }
}

impl OutputSurface for ChannelSurface {
    fn show_output(&mut self, text: &str, is_error: bool) {
        // Channel closed means the UI is gone; nothing left to render to.
        let _ = self.tx.send(TuiEvent::Output { text: text.to_string(), is_error });
    }
}

impl BusySurface for ChannelSurface {
    fn set_controls_enabled(&mut self, enabled: bool) {
        let _ = self.tx.send(TuiEvent::ControlsEnabled(enabled));
    }
}
