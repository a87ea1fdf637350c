// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI shell.
//!
//! Provides the terminal lifecycle wrapper, the tab bar, the status
//! line, and the per-screen render dispatch. Screen content lives in
//! `screens` and `viewer_screen`.

mod screens;
mod viewer_screen;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};

use crate::app::{App, Screen};

/// Accent color, matching the original app's green-on-dark scheme.
pub const ACCENT: Color = Color::Green;

/// Top-level tabs, mirroring the original bottom tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Search,
    Setlists,
    Songs,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Search, Tab::Setlists, Tab::Songs];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Search => "Search",
            Tab::Setlists => "Setlists",
            Tab::Songs => "Songs",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Search => 0,
            Tab::Setlists => 1,
            Tab::Songs => 2,
        }
    }
}

/// Ephemeral status message shown in the bottom bar.
#[derive(Debug, Default)]
pub struct StatusLine {
    message: Option<String>,
    time: Option<Instant>,
}

impl StatusLine {
    /// Set a message that will be displayed temporarily.
    pub fn set(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.time = Some(Instant::now());
    }

    /// Clear the message once it has been visible long enough.
    pub fn clear_expired(&mut self) {
        if let Some(time) = self.time {
            if time.elapsed() > Duration::from_secs(3) {
                self.message = None;
                self.time = None;
            }
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Terminal lifecycle wrapper: raw mode + alternate screen + mouse
/// capture, restored on drop.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, app: &App) -> io::Result<()> {
        self.terminal.draw(|frame| render(frame, app))?;
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Top-level render: content, optional tab bar, status bar, overlays.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let tab_bar_rows = if app.tab_bar_visible { 2 } else { 0 };
    let status_rows = if app.chrome_visible { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(tab_bar_rows),
            Constraint::Length(status_rows),
        ])
        .split(area);

    match app.current_screen() {
        Screen::Search => screens::render_search(frame, chunks[0], app),
        Screen::Setlists => screens::render_setlists(frame, chunks[0], app),
        Screen::Songs => screens::render_songs(frame, chunks[0], app),
        Screen::SetlistSongs { .. } => screens::render_setlist_songs(frame, chunks[0], app),
        Screen::Viewer => viewer_screen::render_viewer(frame, chunks[0], app),
    }

    if app.tab_bar_visible {
        render_tab_bar(frame, chunks[1], app);
    }
    if app.chrome_visible {
        render_status_bar(frame, chunks[2], app);
    } else if let Some(msg) = app.status.current() {
        // Fullscreen hides the status bar, but notices (e.g. the blocked
        // swipe-exit) still need to surface; draw them as a one-row toast.
        if area.height > 0 {
            let row = Rect::new(area.x, area.bottom() - 1, area.width, 1);
            frame.render_widget(
                Paragraph::new(Span::styled(
                    msg.to_string(),
                    Style::default().fg(Color::Yellow),
                )),
                row,
            );
        }
    }

    screens::render_modal(frame, area, app);

    if app.show_help {
        screens::render_help_overlay(frame, area);
    }
}

fn render_tab_bar(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<&str> = Tab::ALL.iter().map(|t| t.title()).collect();
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .divider("|");
    frame.render_widget(tabs, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let text = if let Some(msg) = app.status.current() {
        Span::styled(msg.to_string(), Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " 1-3: Tabs | Enter: Open | h: Help | q: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(text), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_set_and_read() {
        let mut status = StatusLine::default();
        assert!(status.current().is_none());

        status.set("Saved");
        assert_eq!(status.current(), Some("Saved"));

        // Not expired yet.
        status.clear_expired();
        assert_eq!(status.current(), Some("Saved"));
    }

    #[test]
    fn test_tab_titles_and_order() {
        assert_eq!(Tab::ALL.len(), 3);
        assert_eq!(Tab::Search.index(), 0);
        assert_eq!(Tab::Songs.title(), "Songs");
    }
}
