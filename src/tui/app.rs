//! TUI application state management.

use std::time::{Duration, Instant};

use crate::execution::{BusySurface, Mode, OutputSurface};

pub const INITIAL_OUTPUT: &str =
    "Enter your code above and press F5 (Run) or F6 (Debug) to see the results here.";

const DOUBLE_CTRL_C_TIMEOUT: Duration = Duration::from_millis(500);

/// What has keyboard focus
#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    /// Typing into the code editor
    Editing,
    /// Typing a path to load into the editor
    FilePath,
}

/// Where a run/debug request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The Run/Debug controls (F5/F6); inert while disabled
    Control,
    /// Keyboard shortcut; not gated by the controls
    Shortcut,
}

/// Application state for the TUI
#[derive(Debug)]
pub struct App {
    /// Code being edited
    pub editor: String,
    /// Cursor position in the editor (byte index, always on a char boundary)
    pub cursor: usize,
    /// Current input focus
    pub input_mode: InputMode,
    /// Path typed while in `InputMode::FilePath`
    pub path_input: String,
    /// Last text shown on the output surface
    pub output: String,
    /// Whether `output` is rendered as an error
    pub output_is_error: bool,
    /// Lines scrolled down in the output pane
    pub output_scroll: u16,
    /// Run/Debug controls enabled (false while a request is in flight)
    pub controls_enabled: bool,
    pub dark_mode: bool,
    pub show_help: bool,
    /// Status message to display
    pub status_message: String,
    /// Endpoint shown in the title bar
    pub backend_url: String,
    /// Timestamp of last Ctrl+C press for double Ctrl+C detection
    pub last_ctrl_c_time: Option<Instant>,
}

impl App {
    pub fn new(backend_url: String, dark_mode: bool, initial_code: Option<String>) -> Self {
        let editor = initial_code.unwrap_or_default();
        let cursor = editor.len();
        Self {
            editor,
            cursor,
            input_mode: InputMode::Editing,
            path_input: String::new(),
            output: INITIAL_OUTPUT.to_string(),
            output_is_error: false,
            output_scroll: 0,
            controls_enabled: true,
            dark_mode,
            show_help: false,
            status_message: default_status().to_string(),
            backend_url,
            last_ctrl_c_time: None,
        }
    }

    /// Mode to execute, or `None` when a disabled control was pressed.
    pub fn trigger(&mut self, mode: Mode, source: Trigger) -> Option<Mode> {
        if source == Trigger::Control && !self.controls_enabled {
            self.status_message = format!("Busy: {} is disabled until the current request settles", mode);
            return None;
        }
        Some(mode)
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn scroll_output_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    pub fn scroll_output_down(&mut self) {
        self.output_scroll = self.output_scroll.saturating_add(1);
    }

    // ----- File prompt -----
    pub fn begin_file_prompt(&mut self) {
        self.input_mode = InputMode::FilePath;
        self.path_input.clear();
        self.status_message = "Load file: type a path, Enter to load, Esc to cancel".into();
    }

    /// Leave the prompt and return what was typed.
    pub fn finish_file_prompt(&mut self) -> String {
        self.input_mode = InputMode::Editing;
        self.status_message = default_status().to_string();
        std::mem::take(&mut self.path_input)
    }

    /// Replace the editor contents, e.g. after loading a file.
    pub fn replace_editor(&mut self, text: String) {
        self.editor = text;
        self.cursor = self.editor.len();
    }

    // ----- Editor helpers -----
    pub fn insert_char(&mut self, c: char) {
        self.editor.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        // Terminals send pasted newlines as \r
        let normalized = s.replace("\r\n", "\n").replace('\r', "\n");
        self.editor.insert_str(self.cursor, &normalized);
        self.cursor += normalized.len();
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.editor[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.editor.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.editor.len() {
            self.editor.remove(self.cursor);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(c) = self.editor[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(c) = self.editor[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    pub fn move_cursor_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            return;
        }
        let column = self.editor[start..self.cursor].chars().count();
        let prev_start = self.line_start(start - 1);
        self.cursor = self.advance(prev_start, start - 1, column);
    }

    pub fn move_cursor_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.editor.len() {
            return;
        }
        let column = self.editor[self.line_start(self.cursor)..self.cursor].chars().count();
        let next_start = end + 1;
        let next_end = self.line_end(next_start);
        self.cursor = self.advance(next_start, next_end, column);
    }

    /// Zero-based (row, text before the cursor on that row).
    pub fn cursor_row_prefix(&self) -> (usize, &str) {
        let start = self.line_start(self.cursor);
        let row = self.editor[..start].matches('\n').count();
        (row, &self.editor[start..self.cursor])
    }

    fn line_start(&self, pos: usize) -> usize {
        self.editor[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.editor[pos..].find('\n').map(|i| pos + i).unwrap_or(self.editor.len())
    }

    /// Move `columns` chars right of `from` without passing `limit`.
    fn advance(&self, from: usize, limit: usize, columns: usize) -> usize {
        self.editor[from..limit]
            .char_indices()
            .nth(columns)
            .map(|(i, _)| from + i)
            .unwrap_or(limit)
    }

    /// Handle Ctrl+C press and detect double press for quit
    /// Returns true if should quit (double Ctrl+C), false otherwise
    pub fn handle_ctrl_c(&mut self) -> bool {
        let now = Instant::now();

        if let Some(last_time) = self.last_ctrl_c_time {
            if now.duration_since(last_time) <= DOUBLE_CTRL_C_TIMEOUT {
                self.last_ctrl_c_time = None;
                return true;
            }
        }

        // Single Ctrl+C - clear editor and record timestamp
        self.editor.clear();
        self.cursor = 0;
        self.status_message = "Editor cleared (press Ctrl+C again to quit)".into();
        self.last_ctrl_c_time = Some(now);

        false
    }
}

fn default_status() -> &'static str {
    "F5/Ctrl+Enter run | F6 debug | Ctrl+O load file | F2 theme | F1 help | Ctrl+Q quit"
}

impl OutputSurface for App {
    fn show_output(&mut self, text: &str, is_error: bool) {
        self.output = text.to_string();
        self.output_is_error = is_error;
        self.output_scroll = 0;
    }
}

impl BusySurface for App {
    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
    }
}
