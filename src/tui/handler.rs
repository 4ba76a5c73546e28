//! Async event handler for the TUI editor.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use super::{
    app::{App, InputMode, Trigger},
    events::{ChannelSurface, TuiEvent},
    ui::render_ui,
};
use crate::{
    execution::{Backend, BusySurface, ExecutionController, Mode, OutputSurface},
    input,
    prefs::Prefs,
};

/// What the event loop should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    Execute(Mode),
    ToggleTheme,
    LoadFile(String),
}

/// Run the TUI editor until the user quits.
pub async fn run_tui<B>(
    controller: Arc<ExecutionController<B>>,
    mut prefs: Prefs,
    backend_url: String,
    initial_code: Option<String>,
) -> Result<()>
where
    B: Backend + 'static,
{
    // Check if we're in a proper terminal environment
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        return Err(anyhow::anyhow!("TUI mode requires a proper terminal environment"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(backend_url, prefs.dark_mode, initial_code);
    let (event_tx, event_rx) = mpsc::unbounded_channel::<TuiEvent>();

    let result = run_app(&mut terminal, &mut app, &mut prefs, controller, event_tx, event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
async fn run_app<B>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    prefs: &mut Prefs,
    controller: Arc<ExecutionController<B>>,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
    mut event_rx: mpsc::UnboundedReceiver<TuiEvent>,
) -> Result<()>
where
    B: Backend + 'static,
{
    // Spawn input handler
    let input_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || loop {
        if event::poll(Duration::from_millis(100)).unwrap_or(false) {
            let forwarded = match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => input_tx.send(TuiEvent::Key(key)),
                Ok(Event::Paste(text)) => input_tx.send(TuiEvent::Paste(text)),
                _ => Ok(()),
            };
            if forwarded.is_err() {
                break; // Channel closed
            }
        } else if input_tx.is_closed() {
            break;
        }
    });

    loop {
        terminal.draw(|frame| render_ui(frame, app))?;

        while let Ok(tui_event) = event_rx.try_recv() {
            match tui_event {
                TuiEvent::Key(key) => match handle_key_event(app, key) {
                    KeyAction::None => {}
                    KeyAction::Quit => return Ok(()),
                    KeyAction::Execute(mode) => {
                        spawn_execution(&controller, mode, app.editor.clone(), event_tx.clone());
                    }
                    KeyAction::ToggleTheme => match prefs.toggle_dark_mode() {
                        Ok(dark) => app.dark_mode = dark,
                        Err(e) => {
                            tracing::warn!(error = %e, "could not persist theme");
                            app.dark_mode = !app.dark_mode;
                            app.set_status(format!("Theme not saved: {e}"));
                        }
                    },
                    KeyAction::LoadFile(path) => load_file_into(app, &path),
                },
                TuiEvent::Paste(text) => match app.input_mode {
                    InputMode::Editing => app.insert_str(&text),
                    InputMode::FilePath => app.path_input.push_str(text.trim()),
                },
                TuiEvent::Output { text, is_error } => app.show_output(&text, is_error),
                TuiEvent::ControlsEnabled(enabled) => app.set_controls_enabled(enabled),
                TuiEvent::Settled { mode, outcome } => {
                    tracing::debug!(%mode, ?outcome, "request task finished");
                }
            }
        }

        // Small delay to prevent busy waiting
        tokio::time::sleep(Duration::from_millis(16)).await; // ~60 FPS
    }
}

fn spawn_execution<B>(
    controller: &Arc<ExecutionController<B>>,
    mode: Mode,
    code: String,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
) where
    B: Backend + 'static,
{
    let controller = Arc::clone(controller);
    tokio::spawn(async move {
        let mut surface = ChannelSurface::new(event_tx.clone());
        let outcome = controller.execute(mode, &code, &mut surface).await;
        let _ = event_tx.send(TuiEvent::Settled { mode, outcome });
    });
}

fn load_file_into(app: &mut App, path: &str) {
    if path.trim().is_empty() {
        return;
    }
    match input::load_text_file(path.trim()) {
        Ok(text) => {
            app.replace_editor(text);
            app.set_status(format!("Loaded {}", path.trim()));
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "file load rejected");
            app.show_output(&e.to_string(), true);
        }
    }
}

/// Handle keyboard events
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> KeyAction {
    // Help overlay swallows the next key
    if app.show_help {
        app.show_help = false;
        return KeyAction::None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if app.input_mode == InputMode::FilePath {
        return match key.code {
            KeyCode::Enter => KeyAction::LoadFile(app.finish_file_prompt()),
            KeyCode::Esc => {
                app.finish_file_prompt();
                KeyAction::None
            }
            KeyCode::Backspace => {
                app.path_input.pop();
                KeyAction::None
            }
            KeyCode::Char(c) if !ctrl => {
                app.path_input.push(c);
                KeyAction::None
            }
            _ => KeyAction::None,
        };
    }

    let requested = match key.code {
        KeyCode::F(5) => Some((Mode::Run, Trigger::Control)),
        KeyCode::F(6) => Some((Mode::Compile, Trigger::Control)),
        KeyCode::Enter if ctrl => Some((Mode::Run, Trigger::Shortcut)),
        KeyCode::Char('r') if ctrl => Some((Mode::Run, Trigger::Shortcut)),
        KeyCode::Char('d') if ctrl => Some((Mode::Compile, Trigger::Shortcut)),
        _ => None,
    };
    if let Some((mode, source)) = requested {
        return match app.trigger(mode, source) {
            Some(mode) => KeyAction::Execute(mode),
            None => KeyAction::None,
        };
    }

    match key.code {
        KeyCode::Char('q') if ctrl => return KeyAction::Quit,
        KeyCode::Char('c') if ctrl => {
            if app.handle_ctrl_c() {
                return KeyAction::Quit;
            }
        }
        KeyCode::Char('o') if ctrl => app.begin_file_prompt(),
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::F(2) => return KeyAction::ToggleTheme,
        KeyCode::PageUp => app.scroll_output_up(),
        KeyCode::PageDown => app.scroll_output_down(),
        KeyCode::Up => app.move_cursor_up(),
        KeyCode::Down => app.move_cursor_down(),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_home(),
        KeyCode::End => app.move_cursor_end(),
        KeyCode::Enter => app.insert_char('\n'),
        KeyCode::Tab => app.insert_str("    "),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Char(c) if !ctrl => app.insert_char(c),
        _ => {}
    }

    KeyAction::None
}
