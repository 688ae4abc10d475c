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

//! MPV-backed audio playback engine and event processing.
//!
//! This module provides the core audio playback logic, leveraging `libmpv` for
//! network streaming, decoding and playback control. It manages a background
//! worker thread that bridges the gap between the application's command-based
//! interface and the low-level MPV property observation system.
//!
//! # Architecture
//!
//! The engine operates using a dual-channel communication pattern:
//! 1. **Command Channel**: Receives [`AudioPlayerCommand`]s from the playback
//!    controller (load playlist, play, pause, next and so on).
//! 2. **Event Channel**: Broadcasts [`EngineEvent`]s wrapped in [`AppEvent`]s
//!    to notify the controller of playlist position, state, time and volume
//!    changes.
//!
//! Every playlist is loaded with a generation number supplied by the
//! controller, and position reports are tagged with the generation that was
//! current when they were observed.

use anyhow::{Context, Result};
use mpv::Format;
use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
};
use tracing::{debug, warn};

use crate::{
    events::AppEvent,
    player::{AudioPlayer, EngineEvent, PlayerState},
};

#[derive(Debug)]
pub(crate) enum AudioPlayerCommand {
    LoadPlaylist { generation: u64, urls: Vec<String> },
    Play,
    Pause,
    Stop,
    Next,
    SetVolume(u32),
}

/// Mutable bookkeeping owned by the worker loop.
struct WorkerState {
    generation: u64,
    // Set while a new playlist replaces the old one, MPV reports a transient
    // "no entry" position during the swap which must not reach the controller.
    loading: bool,
    is_paused: bool,
    is_idle: bool,
    player_state: PlayerState,
}

impl Default for WorkerState {
    fn default() -> Self {
        Self {
            generation: 0,
            loading: false,
            is_paused: false,
            is_idle: true,
            player_state: PlayerState::Stopped,
        }
    }
}

/// Spawns the audio worker thread to process playback commands.
///
/// This function takes ownership of the command receiver and the event sender,
/// moving them into a dedicated background thread.
///
/// If the internal worker returns an error, it is caught here and broadcast as
/// a fatal application event.
///
/// # Arguments
///
/// * `command_rx` - The receiving end of the player command channel.
/// * `event_tx` - The channel used to broadcast playback updates and errors.
pub(crate) fn spawn_player_worker(
    command_rx: Receiver<AudioPlayerCommand>,
    event_tx: Sender<AppEvent>,
) {
    let error_tx = event_tx.clone();

    thread::spawn(move || {
        if let Err(e) = audio_player_worker(command_rx, event_tx) {
            let _ = error_tx.send(AppEvent::FatalError(format!("MPV worker failure: {:?}", e)));
        }
    });
}

/// The primary execution loop for the audio player backend.
///
/// This function initializes a local `libmpv` context and alternates between
/// draining incoming commands and polling outgoing events.
///
/// # Errors
///
/// Returns an error if the MPV context fails to initialize or if the internal
/// command/event loops encounter an unrecoverable failure.
fn audio_player_worker(
    command_rx: Receiver<AudioPlayerCommand>,
    event_tx: Sender<AppEvent>,
) -> Result<()> {
    let mut handler = (|| {
        let mut builder = mpv::MpvHandlerBuilder::new().context("Failed to create MPV builder")?;
        builder
            .set_option("vo", "null")
            .context("Failed to set no video output")?;
        builder
            .set_option("idle", "yes")
            .context("Failed to enable idle mode")?;
        builder.build().context("Failed to build MPV handler")
    })()?;

    handler
        .observe_property::<i64>("playlist-pos", 0)
        .context("Failed to observe playlist-pos")?;
    handler
        .observe_property::<f64>("duration", 0)
        .context("Failed to observe duration")?;
    handler
        .observe_property::<bool>("pause", 0)
        .context("Failed to observe pause")?;
    handler
        .observe_property::<f64>("time-pos", 0)
        .context("Failed to observe time-pos")?;
    handler
        .observe_property::<f64>("volume", 0)
        .context("Failed to observe volume")?;
    handler
        .observe_property::<bool>("idle-active", 0)
        .context("Failed to observe idle-active")?;

    let mut state = WorkerState::default();

    loop {
        process_commands(&mut handler, &command_rx, &mut state, &event_tx)?;
        process_mpv_events(&mut handler, &mut state, &event_tx)?;
    }
}

/// Drains and executes all pending commands from the controller.
///
/// A command MPV rejects is reported to the main loop as a recoverable error,
/// only a closed event channel ends the worker.
fn process_commands(
    handler: &mut mpv::MpvHandler,
    command_rx: &mpsc::Receiver<AudioPlayerCommand>,
    state: &mut WorkerState,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<()> {
    while let Ok(command) = command_rx.try_recv() {
        if let Err(e) = run_command(handler, state, command) {
            let message = format!("{e:#}");
            warn!(%message, "MPV command failed");
            event_tx
                .send(AppEvent::Error(message))
                .context("Failed to send player error event")?;
        }
    }

    Ok(())
}

fn run_command(
    handler: &mut mpv::MpvHandler,
    state: &mut WorkerState,
    command: AudioPlayerCommand,
) -> Result<()> {
    match command {
        AudioPlayerCommand::LoadPlaylist { generation, urls } => {
            load_playlist(handler, state, generation, &urls)?;
        }
        AudioPlayerCommand::Play => {
            handler
                .set_property("pause", false)
                .context("Failed to resume playback")?;
        }
        AudioPlayerCommand::Pause => {
            handler
                .set_property("pause", true)
                .context("Failed to pause playback")?;
        }
        AudioPlayerCommand::Stop => {
            handler.command(&["stop"]).context("Failed to stop")?;
        }
        AudioPlayerCommand::Next => {
            // "force" lets the last entry advance into the idle state
            handler
                .command(&["playlist-next", "force"])
                .context("Failed to advance playlist")?;
        }
        AudioPlayerCommand::SetVolume(volume) => {
            handler
                .command(&["set", "volume", &volume.to_string()])
                .context("Failed to set volume")?;
        }
    }

    Ok(())
}

fn load_playlist(
    handler: &mut mpv::MpvHandler,
    state: &mut WorkerState,
    generation: u64,
    urls: &[String],
) -> Result<()> {
    state.generation = generation;

    let Some((first, rest)) = urls.split_first() else {
        warn!(generation, "Loading an empty playlist, stopping playback");
        state.loading = false;
        return handler.command(&["stop"]).context("Failed to stop");
    };

    state.loading = true;

    handler
        .command(&["loadfile", first.as_str(), "replace"])
        .context(format!("Failed to load stream: {}", first))?;
    for url in rest {
        handler
            .command(&["loadfile", url.as_str(), "append"])
            .context(format!("Failed to queue stream: {}", url))?;
    }
    handler
        .set_property("pause", false)
        .context("Failed to start playback")?;

    debug!(generation, entries = urls.len(), "Loaded playlist into MPV");

    Ok(())
}

/// Polls for MPV events and synchronizes the application state.
///
/// This function waits for up to 50ms for an event from the MPV context.
/// If an event occurs, it updates internal flags and broadcasts any necessary
/// [`EngineEvent`]s to the main loop.
fn process_mpv_events(
    handler: &mut mpv::MpvHandler,
    state: &mut WorkerState,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<()> {
    if let Some(mpv_event) = handler.wait_event(0.05) {
        let engine_event = match mpv_event {
            mpv::Event::PropertyChange { name, change, .. } => match (name, change) {
                ("playlist-pos", Format::Int(pos)) => {
                    let index = usize::try_from(pos).ok();
                    if index.is_none() && state.loading {
                        None
                    } else {
                        Some(EngineEvent::IndexChanged {
                            generation: state.generation,
                            index,
                        })
                    }
                }
                ("duration", Format::Double(duration)) => {
                    Some(EngineEvent::DurationChanged(duration as u64))
                }
                ("pause", Format::Flag(pause)) => {
                    state.is_paused = pause;
                    None
                }
                ("time-pos", Format::Double(seconds)) if seconds >= 0.0 => {
                    Some(EngineEvent::TimeChanged(seconds))
                }
                ("volume", Format::Double(volume)) => {
                    Some(EngineEvent::VolumeChanged(volume.round() as u32))
                }
                ("idle-active", Format::Flag(idle_active)) => {
                    state.is_idle = idle_active;
                    None
                }
                _ => None,
            },
            mpv::Event::StartFile => {
                state.loading = false;
                None
            }
            _ => None,
        };

        let new_player_state = AudioPlayer::player_state(state.is_paused, state.is_idle);

        if new_player_state != state.player_state {
            state.player_state = new_player_state;
            event_tx
                .send(AppEvent::Engine(EngineEvent::StateChanged(new_player_state)))
                .context("Failed to send player state event")?;
        }

        if let Some(event) = engine_event {
            event_tx
                .send(AppEvent::Engine(event))
                .context("Failed to send engine event")?;
        }
    }

    Ok(())
}
