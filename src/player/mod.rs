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

//! Audio playback control and state management.
//!
//! This module provides the [`MediaEngine`] seam the playback controller drives
//! and its MPV-backed implementation, [`AudioPlayer`]. The player manages a
//! background worker thread that interfaces with the underlying audio library,
//! ensuring that heavy audio operations do not block the main application
//! thread.
//!
//! Everything the engine knows (playlist position, transport state, time,
//! volume) flows back to the main loop as [`EngineEvent`]s.

mod commands;

use std::sync::mpsc;

use anyhow::Result;

use crate::{events::AppEvent, player::commands::AudioPlayerCommand};

/// Represents the current playback status of the audio engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PlayerState {
    Playing,
    Paused,
    Stopped,
}

/// Notifications raised by the audio engine.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineEvent {
    /// The playlist position moved; `None` means playback ran off the end.
    ///
    /// The generation is the one the playlist was loaded with.
    IndexChanged {
        generation: u64,
        index: Option<usize>,
    },
    StateChanged(PlayerState),
    TimeChanged(f64),
    DurationChanged(u64),
    VolumeChanged(u32),
}

/// Transport primitives consumed by the playback controller.
///
/// Every call only dispatches the request, results arrive later as
/// [`EngineEvent`]s.
pub(crate) trait MediaEngine {
    /// Replaces the engine playlist and starts playing its first entry.
    fn load_playlist(&self, generation: u64, urls: Vec<String>) -> Result<()>;

    fn play(&self) -> Result<()>;

    fn pause(&self) -> Result<()>;

    fn stop(&self) -> Result<()>;

    /// Moves to the next entry, or past the end of the playlist.
    fn next(&self) -> Result<()>;

    fn set_volume(&self, volume: u32) -> Result<()>;
}

/// A handle to the audio playback engine.
///
/// This struct acts as a command proxy; it does not perform audio processing
/// itself but instead sends instructions to a background worker thread.
pub(crate) struct AudioPlayer {
    /// Channel for sending commands to the background worker thread.
    command_tx: mpsc::Sender<AudioPlayerCommand>,
}

impl AudioPlayer {
    /// Spawns the audio worker thread and returns a new player handle.
    ///
    /// # Arguments
    ///
    /// * `event_tx` - A channel to send engine events (like position updates
    ///   or errors) back to the main event loop.
    pub(crate) fn new(event_tx: mpsc::Sender<AppEvent>) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel::<AudioPlayerCommand>();

        commands::spawn_player_worker(command_rx, event_tx);

        Ok(Self { command_tx })
    }

    // Maps internal audio backend flags to a simplified [`PlayerState`].
    fn player_state(is_paused: bool, is_idle: bool) -> PlayerState {
        if is_idle {
            PlayerState::Stopped
        } else if is_paused {
            PlayerState::Paused
        } else {
            PlayerState::Playing
        }
    }

    fn send(&self, command: AudioPlayerCommand) -> Result<()> {
        self.command_tx.send(command)?;
        Ok(())
    }
}

impl MediaEngine for AudioPlayer {
    fn load_playlist(&self, generation: u64, urls: Vec<String>) -> Result<()> {
        self.send(AudioPlayerCommand::LoadPlaylist { generation, urls })
    }

    fn play(&self) -> Result<()> {
        self.send(AudioPlayerCommand::Play)
    }

    fn pause(&self) -> Result<()> {
        self.send(AudioPlayerCommand::Pause)
    }

    fn stop(&self) -> Result<()> {
        self.send(AudioPlayerCommand::Stop)
    }

    fn next(&self) -> Result<()> {
        self.send(AudioPlayerCommand::Next)
    }

    fn set_volume(&self, volume: u32) -> Result<()> {
        self.send(AudioPlayerCommand::SetVolume(volume))
    }
}
