//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::{App, InputMode};

/// Colors for the current theme
struct Palette {
    base: Style,
    accent: Color,
    error: Color,
    disabled: Color,
}

fn palette(dark_mode: bool) -> Palette {
    if dark_mode {
        Palette {
            base: Style::default().bg(Color::Black).fg(Color::Gray),
            accent: Color::Cyan,
            error: Color::LightRed,
            disabled: Color::DarkGray,
        }
    } else {
        Palette {
            base: Style::default().bg(Color::White).fg(Color::Black),
            accent: Color::Blue,
            error: Color::Red,
            disabled: Color::Gray,
        }
    }
}

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let colors = palette(app.dark_mode);
    frame.render_widget(Block::default().style(colors.base), frame.area());

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55), // Editor
            Constraint::Length(1),      // Controls
            Constraint::Min(3),         // Output
            Constraint::Length(1),      // Status bar
        ])
        .split(frame.area());

    render_editor(frame, app, &colors, main_layout[0]);
    render_controls(frame, app, &colors, main_layout[1]);
    render_output(frame, app, &colors, main_layout[2]);
    render_status_bar(frame, app, main_layout[3]);

    if app.input_mode == InputMode::FilePath {
        render_file_prompt(frame, app, &colors);
    }

    if app.show_help {
        render_help_overlay(frame, &colors);
    }
}

fn render_editor(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let title = format!("Code | {}", app.backend_url);
    let inner_height = area.height.saturating_sub(2) as usize;
    let (row, prefix) = app.cursor_row_prefix();

    // Keep the cursor row in view
    let scroll = row.saturating_sub(inner_height.saturating_sub(1));

    // `Paragraph::scroll` takes a u16 row, so start the text at the first visible row
    let visible_from = match scroll {
        0 => 0,
        n => app.editor.match_indices('\n').nth(n - 1).map_or(app.editor.len(), |(i, _)| i + 1),
    };

    let editor = Paragraph::new(&app.editor[visible_from..])
        .style(colors.base)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(colors.accent)),
        );
    frame.render_widget(editor, area);

    if app.input_mode == InputMode::Editing && !app.show_help {
        let x = inner_offset(area.x, prefix.width());
        let y = inner_offset(area.y, row - scroll);
        if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

/// Terminal coordinate `delta` cells past the inside edge of a bordered block.
/// Saturates at `u16::MAX`, which always fails the caller's bounds check.
fn inner_offset(origin: u16, delta: usize) -> u16 {
    u16::try_from(usize::from(origin).saturating_add(1).saturating_add(delta)).unwrap_or(u16::MAX)
}

fn render_controls(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let style = if app.controls_enabled {
        Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.disabled).add_modifier(Modifier::DIM)
    };

    let mut spans = vec![
        Span::styled(" [F5 Run Code] ", style),
        Span::raw(" "),
        Span::styled("[F6 Run Debug] ", style),
    ];
    if !app.controls_enabled {
        spans.push(Span::styled(" running...", Style::default().fg(colors.disabled)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(colors.base), area);
}

fn render_output(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let style = if app.output_is_error {
        colors.base.fg(colors.error)
    } else {
        colors.base
    };

    let output = Paragraph::new(app.output.as_str())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Output"))
        .wrap(Wrap { trim: false })
        .scroll((app.output_scroll, 0));
    frame.render_widget(output, area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = if app.dark_mode { "dark" } else { "light" };
    let status_text = format!("{} | theme: {}", app.status_message, theme);
    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_paragraph, area);
}

fn render_file_prompt(frame: &mut Frame, app: &App, colors: &Palette) {
    let area = centered_rect(70, 20, frame.area());
    let popup_area = Rect { height: area.height.min(3), ..area };

    frame.render_widget(Clear, popup_area);
    let prompt = Paragraph::new(app.path_input.as_str())
        .style(colors.base)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Load text file")
                .title_style(Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)),
        );
    frame.render_widget(prompt, popup_area);

    let x = inner_offset(popup_area.x, app.path_input.width());
    if x < popup_area.right().saturating_sub(1) {
        frame.set_cursor_position(Position::new(x, popup_area.y + 1));
    }
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, colors: &Palette) {
    let popup_area = centered_rect(70, 70, frame.area());

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("Running code:"),
        Line::from("  F5 / Ctrl+Enter - Run code"),
        Line::from("  Ctrl+R          - Run code"),
        Line::from("  F6 / Ctrl+D     - Run in debug (compile) mode"),
        Line::from(""),
        Line::from("Editing:"),
        Line::from("  Arrows/Home/End - Move cursor"),
        Line::from("  Ctrl+O          - Load a plain-text file"),
        Line::from("  Ctrl+C          - Clear editor (twice to quit)"),
        Line::from(""),
        Line::from("View:"),
        Line::from("  PgUp/PgDn       - Scroll output"),
        Line::from("  F2              - Toggle dark mode"),
        Line::from("  F1              - Toggle this help"),
        Line::from("  Ctrl+Q          - Quit"),
        Line::from(""),
        Line::from("Press any key to close"),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .style(colors.base)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help_paragraph, popup_area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
