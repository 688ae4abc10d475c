// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! UI rendering logic for the active playlist.
//!
//! A header line with the channel and playlist sizes, then a table of the
//! active tracks with the current one highlighted.

use std::fmt::Write;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Table},
};

use crate::{
    App,
    render::icons::{FAVOURITE, ICON_PLAY},
};

pub(crate) fn draw_playlist(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    let header_block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(app.theme.border_colour))
        .padding(Padding::horizontal(1));

    let controller = &app.controller;
    let playlist = controller.active_playlist();

    let mut header_text = match controller.channel() {
        Some(channel) => format!("Channel {channel}"),
        None => "No channel".to_string(),
    };
    let _ = write!(header_text, " | {} tracks", playlist.len());
    if let Some(pending) = controller.pending_playlist() {
        let _ = write!(header_text, " | {} up next", pending.len());
    }

    f.render_widget(Paragraph::new(header_text).block(header_block), chunks[0]);

    let theme = &app.theme;
    let current = playlist.current_index();

    let rows = playlist.tracks().iter().enumerate().map(|(idx, track)| {
        let playing = if current == Some(idx) { ICON_PLAY } else { "" };
        let liked = if track.liked() { FAVOURITE } else { "" };

        Row::new(vec![
            Cell::from(Line::from(playing).style(Style::default().fg(theme.accent_colour))),
            Cell::from(Line::from(liked).style(Style::default().fg(theme.favourite_colour))),
            Cell::from(Line::from(track.artist.as_str()).style(Style::default().fg(theme.table_artist_fg))),
            Cell::from(Line::from(track.album.as_str()).style(Style::default().fg(theme.table_album_fg))),
            Cell::from(Line::from(track.public_time.as_str()).style(Style::default().fg(theme.table_year_fg)).alignment(Alignment::Right)),
            Cell::from(""),
            Cell::from(Line::from(track.title.as_str()).style(Style::default().fg(theme.table_track_fg))),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Percentage(50),
        ],
    )
    .header(
        Row::new(vec![
            Cell::from(""),
            Cell::from(""),
            Cell::from("Artist"),
            Cell::from("Album"),
            Cell::from(Line::from("Year").alignment(Alignment::Right)),
            Cell::from(""),
            Cell::from("Title"),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD).fg(theme.accent_colour))
        .bottom_margin(1),
    )
    .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
    .block(Block::default().padding(Padding::horizontal(1)));

    app.playlist_state.select(current);
    f.render_stateful_widget(table, chunks[1], &mut app.playlist_state);
}
