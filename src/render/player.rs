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

//! Render the radio player panel.
//!
//! This module renders the current track, elapsed time, channel and control
//! lock status, and the volume and position gauges.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Padding, Paragraph},
};

use crate::{
    App,
    player::PlayerState,
    render::icons::{FAVOURITE, ICON_LOCKED, ICON_PAUSE, ICON_PLAY, ICON_STOP},
    util,
};

const MAX_VOLUME: f64 = 100.0;

/// Renders the main player widget including track info and gauges.
pub(crate) fn draw_player(f: &mut Frame, area: Rect, app: &App) {
    let controller = &app.controller;
    let theme = &app.theme;

    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border_colour))
        .padding(Padding::horizontal(1));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner_area);

    let info_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(30)])
        .split(chunks[0]);

    let bold = Style::default().add_modifier(Modifier::BOLD);

    if let Some(track) = controller.current_song() {
        let icon = match controller.state() {
            PlayerState::Playing => ICON_PLAY,
            PlayerState::Paused => ICON_PAUSE,
            PlayerState::Stopped => ICON_STOP,
        };

        let mut spans = vec![
            Span::styled(format!(" {} ", icon), bold).fg(Color::White),
            Span::styled(&track.title, bold).fg(theme.accent_colour),
            Span::raw(" from "),
            Span::styled(&track.album, bold).fg(theme.accent_colour),
            Span::raw(" by "),
            Span::styled(&track.artist, bold).fg(theme.accent_colour),
        ];
        if track.liked() {
            spans.push(Span::styled(format!(" {}", FAVOURITE), bold).fg(theme.favourite_colour));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), info_chunks[0]);

        let duration = controller.duration();
        let time = controller.position().max(0.0) as u64;
        let remaining = duration.saturating_sub(time);

        let time_line = Line::from(vec![
            Span::styled(util::format::format_time(time), bold).fg(theme.accent_colour),
            Span::styled(" / ", bold).fg(Color::White),
            Span::styled(util::format::format_time(duration), bold).fg(theme.accent_colour),
            Span::styled(" (-", bold).fg(Color::White),
            Span::styled(util::format::format_time(remaining), bold).fg(theme.accent_colour),
            Span::styled(")", bold).fg(Color::White),
        ]);

        f.render_widget(Paragraph::new(time_line).alignment(Alignment::Right), info_chunks[1]);
    }

    let control_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(26)])
        .split(chunks[2]);

    let mut station = vec![Span::styled(
        match controller.channel() {
            Some(channel) => format!("Channel {channel}"),
            None => "No channel".to_string(),
        },
        bold,
    )
    .fg(theme.accent_colour)];
    if !controller.can_control() {
        station.push(Span::styled(format!("  {} waiting", ICON_LOCKED), bold).fg(Color::White));
    }
    f.render_widget(Paragraph::new(Line::from(station)), control_chunks[0]);

    let vol_ratio = (controller.volume() as f64 / MAX_VOLUME).clamp(0.0, 1.0);

    let volume_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(control_chunks[1]);

    let volume_gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.accent_colour).bg(theme.gauge_track_colour))
        .ratio(vol_ratio)
        .label("")
        .use_unicode(true);
    f.render_widget(volume_gauge, volume_layout[0]);

    let volume_label = Paragraph::new(format!(" {}%", controller.volume()))
        .alignment(Alignment::Right)
        .fg(Color::White);
    f.render_widget(volume_label, volume_layout[1]);

    let position = match controller.duration() {
        0 => 0.0,
        duration => (controller.position() / duration as f64).clamp(0.0, 1.0),
    };

    let position_gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.accent_colour).bg(theme.gauge_track_colour))
        .ratio(position)
        .label("")
        .use_unicode(true);

    f.render_widget(position_gauge, chunks[4]);
}
