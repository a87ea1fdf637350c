// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Rendering for the lyrics viewer screen.
//!
//! Font size maps onto the terminal as line spacing: every lyric line
//! occupies `rows_per_line` rows, so growing the font visibly spreads
//! the text out and shrinks how much fits on screen. The scroll offset
//! kept by the viewer is in abstract units where one line is
//! `font_size * 1.5` units tall.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::ACCENT;
use crate::app::App;

/// Rows of terminal text used per lyric line at the given font size.
fn rows_per_line(font_size: u16) -> u16 {
    (font_size / 12).max(1)
}

/// Terminal row corresponding to a scroll offset in viewer units.
fn top_row(view_top: f32, font_size: u16) -> u16 {
    let line_height = font_size as f32 * 1.5;
    let line = view_top / line_height;
    (line * rows_per_line(font_size) as f32) as u16
}

pub fn render_viewer(frame: &mut Frame, area: Rect, app: &App) {
    let Some(screen) = app.viewer.as_ref() else {
        return;
    };
    let viewer = &screen.viewer;

    if viewer.is_fullscreen() {
        render_lyrics(frame, area, app, false);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let mut title = viewer.title().to_string();
    if let Some((index, total)) = viewer.position() {
        title = format!("{}  [{}/{}]", title, index + 1, total);
    }
    let header = Paragraph::new(title)
        .alignment(Alignment::Center)
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    frame.render_widget(header, chunks[0]);

    render_lyrics(frame, chunks[1], app, true);
    render_control_bar(frame, chunks[2], app);
}

fn render_lyrics(frame: &mut Frame, area: Rect, app: &App, bordered: bool) {
    let Some(screen) = app.viewer.as_ref() else {
        return;
    };
    let viewer = &screen.viewer;

    if viewer.is_loading() {
        let busy = Paragraph::new("Loading lyrics...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(busy, area);
        return;
    }

    let font_size = app.settings.font_size();
    let spacing = rows_per_line(font_size);
    let mut lines: Vec<Line> = Vec::new();
    for text_line in viewer.text().lines() {
        lines.push(Line::from(text_line.to_string()));
        for _ in 1..spacing {
            lines.push(Line::from(""));
        }
    }

    let scroll = top_row(screen.view_top, font_size);
    let mut paragraph = Paragraph::new(lines).scroll((scroll, 0));
    if bordered {
        paragraph = paragraph.block(Block::default().borders(Borders::ALL));
    }
    frame.render_widget(paragraph, area);
}

fn render_control_bar(frame: &mut Frame, area: Rect, app: &App) {
    let Some(screen) = app.viewer.as_ref() else {
        return;
    };
    let viewer = &screen.viewer;

    let play = if viewer.is_scrolling() { "pause" } else { "scroll" };
    let dim = Style::default().fg(Color::DarkGray);
    let spans = vec![
        Span::styled(format!(" Space:{}  ", play), dim),
        Span::styled(format!(",/. speed {:.1}x  ", app.settings.scroll_speed()), dim),
        Span::styled(format!("-/+ font {}  ", app.settings.font_size()), dim),
        Span::styled("f:fullscreen  Esc:back", dim),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_per_line_grows_with_font() {
        assert_eq!(rows_per_line(12), 1);
        assert_eq!(rows_per_line(16), 1);
        assert_eq!(rows_per_line(24), 2);
        assert_eq!(rows_per_line(40), 3);
    }

    #[test]
    fn test_top_row_scales_offset_by_line_height() {
        // At font 16 one line is 24 units tall and occupies one row.
        assert_eq!(top_row(0.0, 16), 0);
        assert_eq!(top_row(24.0, 16), 1);
        assert_eq!(top_row(48.0, 16), 2);
        // At font 24 one line is 36 units tall but spans two rows.
        assert_eq!(top_row(36.0, 24), 2);
    }
}
