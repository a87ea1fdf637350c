// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Screen and overlay rendering for the three tabs.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::ACCENT;
use crate::app::{App, Modal, Screen};

/// Render the search tab: query input, result list, hit actions.
pub fn render_search(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let input_style = if app.search.editing {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(Color::White)
    };
    let input_title = if app.search.editing {
        " Search (Enter: run, Esc: done) "
    } else {
        " Search (e: edit query) "
    };
    let input = Paragraph::new(app.search.input.as_str())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(input_title));
    frame.render_widget(input, chunks[0]);

    if app.search.searching {
        let busy = Paragraph::new("Searching...")
            .style(Style::default().fg(ACCENT))
            .block(Block::default().borders(Borders::ALL).title(" Results "));
        frame.render_widget(busy, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = app
        .search
        .hits
        .iter()
        .map(|hit| ListItem::new(hit.display_name()))
        .collect();
    let hint = if items.is_empty() {
        " Results "
    } else {
        " Results (Enter: view, d: download) "
    };
    render_selectable_list(frame, chunks[1], hint, items, app.search.selected);
}

/// Render the songs tab: saved lyric files.
pub fn render_songs(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .song_names
        .iter()
        .map(|name| ListItem::new(name.as_str()))
        .collect();
    if items.is_empty() {
        let empty = Paragraph::new("No saved songs. Download some from the Search tab.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Saved Songs "));
        frame.render_widget(empty, area);
        return;
    }
    render_selectable_list(
        frame,
        area,
        " Saved Songs (Enter: open, x: delete) ",
        items,
        app.songs_selected,
    );
}

/// Render the setlists tab: the collection overview.
pub fn render_setlists(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .book
        .setlists
        .iter()
        .map(|s| ListItem::new(format!("{}  ({} songs)", s.name, s.songs.len())))
        .collect();
    if items.is_empty() {
        let empty = Paragraph::new("No setlists yet. Press n to create one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Setlists "));
        frame.render_widget(empty, area);
        return;
    }
    render_selectable_list(
        frame,
        area,
        " Setlists (Enter: open, n: new, x: delete) ",
        items,
        app.setlists_selected,
    );
}

/// Render one setlist's ordered songs.
pub fn render_setlist_songs(frame: &mut Frame, area: Rect, app: &App) {
    let Screen::SetlistSongs { setlist_id, selected } = app.current_screen() else {
        return;
    };
    let Some(setlist) = app.book.get(setlist_id) else {
        return;
    };

    let title = format!(" Setlist - {} (Enter: play, a: add, x: remove, Esc: back) ", setlist.name);
    let items: Vec<ListItem> = setlist
        .songs
        .iter()
        .enumerate()
        .map(|(i, song)| ListItem::new(format!("{:2}. {}", i + 1, song.name)))
        .collect();
    if items.is_empty() {
        let empty = Paragraph::new("Empty setlist. Press a to add songs.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }
    render_selectable_list(frame, area, &title, items, *selected);
}

fn render_selectable_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: Vec<ListItem>,
    selected: usize,
) {
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render whatever modal is active over the current screen.
pub fn render_modal(frame: &mut Frame, area: Rect, app: &App) {
    match &app.modal {
        Modal::None => {}
        Modal::NewSetlist { input } => {
            let popup = centered_rect(area, 44, 5);
            clear_popup(frame, popup);
            let widget = Paragraph::new(input.as_str()).style(Style::default().fg(ACCENT)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" New Setlist (Enter: save, Esc: cancel) "),
            );
            frame.render_widget(widget, popup);
        }
        Modal::SongPicker {
            options,
            checked,
            cursor,
            ..
        } => {
            let popup = centered_rect(area, 50, picker_height(options.len(), area.height));
            clear_popup(frame, popup);
            if options.is_empty() {
                let widget = Paragraph::new("No saved songs to add.")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(Block::default().borders(Borders::ALL).title(" Add Songs "));
                frame.render_widget(widget, popup);
                return;
            }
            let items: Vec<ListItem> = options
                .iter()
                .zip(checked)
                .map(|(name, on)| {
                    let mark = if *on { "[x]" } else { "[ ]" };
                    ListItem::new(format!("{} {}", mark, name))
                })
                .collect();
            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Add Songs (Space: toggle, Enter: save, Esc: cancel) "),
                )
                .highlight_style(Style::default().fg(Color::Black).bg(ACCENT));
            let mut state = ListState::default();
            state.select(Some(*cursor));
            frame.render_stateful_widget(list, popup, &mut state);
        }
        Modal::Confirm { prompt, .. } => {
            let popup = centered_rect(area, 50, 5);
            clear_popup(frame, popup);
            let widget = Paragraph::new(vec![
                Line::from(prompt.as_str()),
                Line::from(Span::styled(
                    "y: confirm   n: cancel",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .block(Block::default().borders(Borders::ALL).title(" Confirm "));
            frame.render_widget(widget, popup);
        }
    }
}

/// Render the keybinding help overlay.
pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 52.min(area.width.saturating_sub(4));
    let height = 18.min(area.height.saturating_sub(2));
    let help_area = centered_rect(area, width, height);
    clear_popup(frame, help_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("Global", bold)),
        Line::from("  1/2/3       Switch tab"),
        Line::from("  h/?         Toggle help"),
        Line::from("  q/Ctrl+c    Quit"),
        Line::from(""),
        Line::from(Span::styled("Lists", bold)),
        Line::from("  Up/Down     Move selection"),
        Line::from("  Enter       Open / play"),
        Line::from(""),
        Line::from(Span::styled("Viewer", bold)),
        Line::from("  Space       Auto-scroll on/off"),
        Line::from("  ,/.         Scroll speed -/+"),
        Line::from("  -/+         Font size -/+"),
        Line::from("  Left/Right  Previous/next song"),
        Line::from("  f           Fullscreen"),
        Line::from("  Esc         Back"),
        Line::from("  Mouse drag  Swipe between songs"),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}

/// Popup height for the song picker: the options plus the border rows,
/// at least four rows, but never more than the terminal allows.
fn picker_height(options: usize, area_height: u16) -> u16 {
    let max = area_height.saturating_sub(2);
    (options.min(u16::MAX as usize - 2) as u16 + 2).clamp(4.min(max), max)
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

fn clear_popup(frame: &mut Frame, area: Rect) {
    frame.render_widget(Block::default().style(Style::default().bg(Color::Black)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 80, 24);
        let popup = centered_rect(area, 40, 10);
        assert_eq!(popup.width, 40);
        assert_eq!(popup.height, 10);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
    }

    #[test]
    fn test_picker_height_on_short_terminal() {
        // On a 5-row terminal the usual 4-row minimum no longer fits;
        // the bounds must shrink together instead of inverting.
        assert_eq!(picker_height(10, 5), 3);
        assert_eq!(picker_height(0, 5), 3);
        assert_eq!(picker_height(10, 0), 0);
        assert_eq!(picker_height(10, 1), 0);
    }

    #[test]
    fn test_picker_height_on_normal_terminal() {
        assert_eq!(picker_height(1, 24), 4);
        assert_eq!(picker_height(10, 24), 12);
        assert_eq!(picker_height(100, 24), 22);
    }

    #[test]
    fn test_centered_rect_clamps_to_small_area() {
        let area = Rect::new(0, 0, 20, 6);
        let popup = centered_rect(area, 50, 10);
        assert_eq!(popup.width, 20);
        assert_eq!(popup.height, 6);
    }
}
