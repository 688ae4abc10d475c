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

use anyhow::Result;
use tracing::{debug, warn};

use crate::{
    App,
    controller::{PlaybackError, PlaybackEvent},
    model::Channel,
};

const MAX_VOLUME: i32 = 100;

/// Turns a rejected user action into a status message.
///
/// Only a failure to reach a worker thread is treated as an error.
fn report(app: &mut App, result: Result<(), PlaybackError>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(PlaybackError::Dispatch(e)) => Err(e),
        Err(e) => {
            debug!(error = %e, "User action rejected");
            app.status = Some(capitalise(&e.to_string()));
            Ok(())
        }
    }
}

pub(super) fn handle_toggle_pause(app: &mut App) -> Result<()> {
    let result = if app.controller.is_playing() {
        app.controller.pause()
    } else {
        app.controller.play()
    };
    report(app, result)
}

pub(super) fn handle_stop(app: &mut App) -> Result<()> {
    let result = app.controller.stop();
    report(app, result)
}

pub(super) fn handle_next(app: &mut App) -> Result<()> {
    let result = app.controller.next();
    report(app, result)
}

pub(super) fn handle_toggle_like(app: &mut App) -> Result<()> {
    let liked = app.controller.current_song().is_some_and(|track| track.liked());
    let result = if liked {
        app.controller.unrate_current_song()
    } else {
        app.controller.rate_current_song()
    };
    report(app, result)
}

pub(super) fn handle_trash(app: &mut App) -> Result<()> {
    let result = app.controller.trash_current_song();
    report(app, result)
}

pub(super) fn handle_adjust_volume(app: &mut App, delta: i32) -> Result<()> {
    let volume = (app.controller.target_volume() as i32 + delta).clamp(0, MAX_VOLUME);
    let result = app.controller.set_volume(volume as u32);
    report(app, result)
}

pub(super) fn handle_step_channel(app: &mut App, delta: Channel) -> Result<()> {
    let current = app.controller.channel().unwrap_or(app.config.channel);
    let result = app.controller.set_channel(step_channel(current, delta));
    report(app, result)
}

/// Channel ids are never negative.
fn step_channel(current: Channel, delta: Channel) -> Channel {
    current.saturating_add(delta).max(0)
}

pub(super) fn handle_playback_event(app: &mut App, event: PlaybackEvent) {
    match event {
        PlaybackEvent::ControlLockChanged(false) => {
            app.status = Some("Waiting for the radio service...".to_string());
        }
        PlaybackEvent::ControlLockChanged(true) => app.status = None,
        PlaybackEvent::ChannelChanged(channel) => {
            app.config.channel = channel;
        }
        PlaybackEvent::CurrentTrackChanged(_) => {
            if app.status.is_some() && app.controller.can_control() {
                app.status = None;
            }
        }
        PlaybackEvent::SkipOutcome(false) => {
            app.status = Some("The radio service did not acknowledge the skip".to_string());
        }
        PlaybackEvent::RateOutcome { liked, success } => {
            app.status = Some(
                match (liked, success) {
                    (true, true) => "Added to favourites",
                    (false, true) => "Removed from favourites",
                    (_, false) => "Could not rate the track",
                }
                .to_string(),
            );
        }
        PlaybackEvent::TrashOutcome(success) => {
            app.status = Some(
                if success {
                    "The track will not be played again"
                } else {
                    "Could not trash the track"
                }
                .to_string(),
            );
        }
        PlaybackEvent::PlaylistFailed(message) => {
            app.status = Some(format!("Playlist request failed: {message}"));
        }
        _ => {}
    }
}

pub(super) fn handle_error(app: &mut App, message: String) {
    warn!(%message, "Application error");
    app.status = Some(message);
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
