//! Terminal printer used as the output surface for one-shot runs.

use std::io::{self, Write};

use owo_colors::OwoColorize;

use crate::execution::{BusySurface, OutputSurface};

pub struct TextPrinter<O: Write, E: Write> {
    pub color: Option<String>,
    /// Colorize output; off when stdout is not a terminal.
    pub styled: bool,
    /// The first message after controls are disabled is the transient status.
    status_pending: bool,
    out: O,
    err: E,
}

impl TextPrinter<io::Stdout, io::Stderr> {
    pub fn stdio(color: Option<String>, styled: bool) -> Self {
        Self::new(color, styled, io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> TextPrinter<O, E> {
    pub fn new(color: Option<String>, styled: bool, out: O, err: E) -> Self {
        Self { color, styled, status_pending: false, out, err }
    }

    fn print_output(&mut self, text: &str) -> io::Result<()> {
        if !self.styled {
            return writeln!(self.out, "{}", text);
        }
        match self.color.as_deref() {
            Some("green") => writeln!(self.out, "{}", text.green()),
            Some("cyan") => writeln!(self.out, "{}", text.cyan()),
            Some("magenta") => writeln!(self.out, "{}", text.magenta()),
            Some("yellow") => writeln!(self.out, "{}", text.yellow()),
            _ => writeln!(self.out, "{}", text),
        }
    }

    fn print_error(&mut self, text: &str) -> io::Result<()> {
        if self.styled {
            writeln!(self.err, "{}", text.red())
        } else {
            writeln!(self.err, "{}", text)
        }
    }

    fn print_status(&mut self, text: &str) -> io::Result<()> {
        if self.styled {
            writeln!(self.err, "{}", text.dimmed())
        } else {
            writeln!(self.err, "{}", text)
        }
    }
}

impl<O: Write + Send, E: Write + Send> OutputSurface for TextPrinter<O, E> {
    fn show_output(&mut self, text: &str, is_error: bool) {
        // Stdout carries only results so it can be piped.
        let status = std::mem::take(&mut self.status_pending);
        let written = if is_error {
            self.print_error(text)
        } else if status {
            self.print_status(text)
        } else {
            self.print_output(text)
        };
        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write output");
        }
    }
}

impl<O: Write + Send, E: Write + Send> BusySurface for TextPrinter<O, E> {
    fn set_controls_enabled(&mut self, enabled: bool) {
        self.status_pending = !enabled;
        tracing::debug!(enabled, "controls toggled");
    }
}
