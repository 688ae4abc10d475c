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

//! Application event handling.
//!
//! Every worker thread (key reader, tick, audio engine, radio service) feeds
//! [`AppEvent`]s into one channel, and [`process_events`] drains it on the
//! main thread. That makes the main thread the only one that ever touches
//! the playback controller.

mod handlers;
use handlers::*;

use std::{io::Stdout, sync::mpsc::Sender, time::Instant};

use anyhow::{Result, anyhow};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, prelude::CrosstermBackend};
use tracing::error;

use crate::{
    App,
    controller::{PlaybackEvent, PlaybackListener},
    player::EngineEvent,
    remote::RemoteReply,
    render::draw,
};

const FINE_VOLUME_DELTA: i32 = 1;
const VOLUME_DELTA: i32 = 5;

#[derive(Debug)]
pub(crate) enum AppEvent {
    Key(KeyEvent),

    Engine(EngineEvent),
    Remote(RemoteReply),
    Playback(PlaybackEvent),

    Tick,

    ExitApplication,

    Error(String),
    FatalError(String),
}

impl PlaybackListener for Sender<AppEvent> {
    fn on_playback_event(&self, event: PlaybackEvent) {
        let _ = self.send(AppEvent::Playback(event));
    }
}

/// Runs the main application loop, handling events and rendering the UI in the
/// terminal.
///
/// This function loops until a 'quit' event is received or the event channel
/// is closed.
pub(crate) fn process_events(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    terminal.draw(|f| draw(f, app))?;

    while let Ok(event) = app.event_rx.recv() {
        match event {
            AppEvent::Key(key) => process_key_event(app, key)?,
            AppEvent::Engine(event) => app.controller.handle_engine_event(event)?,
            AppEvent::Remote(reply) => app.controller.handle_remote_reply(reply)?,
            AppEvent::Playback(event) => handle_playback_event(app, event),
            AppEvent::Tick => app.controller.tick(Instant::now())?,
            AppEvent::Error(message) => handle_error(app, message),
            AppEvent::FatalError(message) => {
                error!(%message, "Fatal error");
                return Err(anyhow!(message));
            }
            AppEvent::ExitApplication => break,
        }

        terminal.draw(|f| draw(f, app))?;
    }

    Ok(())
}

fn process_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') => {
            app.event_tx.send(AppEvent::ExitApplication)?;
            Ok(())
        }

        KeyCode::Char(' ') => handle_toggle_pause(app),
        KeyCode::Char('s') => handle_stop(app),
        KeyCode::Char('n') => handle_next(app),
        KeyCode::Char('l') => handle_toggle_like(app),
        KeyCode::Char('t') => handle_trash(app),

        KeyCode::Char('-') => handle_adjust_volume(app, -FINE_VOLUME_DELTA),
        KeyCode::Char('=') => handle_adjust_volume(app, FINE_VOLUME_DELTA),
        KeyCode::Char('_') => handle_adjust_volume(app, -VOLUME_DELTA),
        KeyCode::Char('+') => handle_adjust_volume(app, VOLUME_DELTA),

        KeyCode::Char('[') => handle_step_channel(app, -1),
        KeyCode::Char(']') => handle_step_channel(app, 1),

        _ => Ok(()),
    }
}
