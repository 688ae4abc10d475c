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

//! Asynchronous radio service requests.
//!
//! This module implements the task pattern used to offload blocking HTTP
//! calls from the main thread. The [`RemoteService`] trait is what the
//! playback controller is given; [`RadioService`] implements it by queueing
//! [`RadioTask`]s for a dedicated worker thread, which performs the request
//! and delivers the outcome back to the application as a [`RemoteReply`].
//!
//! Requests are never cancelled and never retried here.

mod client;

use client::RadioClient;

use anyhow::Result;
use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    config::ApiConfig,
    events::AppEvent,
    model::{Channel, Track},
};

/// Failures of a playlist fetch.
#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("service error: {0}")]
    Api(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Completion of a previously dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RemoteReply {
    NewPlaylist(Result<Vec<Track>, RemoteError>),
    /// Carries the channel it was requested for, the user may have switched
    /// station since.
    Continuation {
        channel: Channel,
        result: Result<Vec<Track>, RemoteError>,
    },
    Skipped { sid: String, success: bool },
    Rated { sid: String, liked: bool, success: bool },
    Banned { sid: String, success: bool },
}

/// The radio service operations used by the playback controller.
///
/// Each call returns as soon as the request is dispatched, the outcome is
/// delivered later as a [`RemoteReply`].
pub(crate) trait RemoteService {
    fn new_playlist(&self, channel: Channel) -> Result<()>;

    fn continuation_playlist(&self, channel: Channel, last_sid: &str) -> Result<()>;

    fn skip(&self, sid: &str, channel: Channel) -> Result<()>;

    fn rate(&self, sid: &str, channel: Channel, liked: bool) -> Result<()>;

    fn ban(&self, sid: &str, channel: Channel) -> Result<()>;
}

#[derive(Debug)]
pub(crate) enum RadioTask {
    NewPlaylist(Channel),
    Continuation(Channel, String),
    Skip(String, Channel),
    Rate(String, Channel, bool),
    Ban(String, Channel),
}

/// Handle to the radio worker thread.
pub(crate) struct RadioService {
    task_tx: Sender<RadioTask>,
}

impl RadioService {
    /// Spawns the worker thread and returns a handle to it.
    ///
    /// # Arguments
    ///
    /// * `api` - Endpoint and credentials for the HTTP client.
    /// * `event_tx` - The channel replies are delivered on.
    pub(crate) fn new(api: &ApiConfig, event_tx: Sender<AppEvent>) -> Self {
        let (task_tx, task_rx) = mpsc::channel();

        spawn_task_worker(RadioClient::new(api), task_rx, event_tx);

        Self { task_tx }
    }

    fn send(&self, task: RadioTask) -> Result<()> {
        self.task_tx.send(task)?;
        Ok(())
    }
}

impl RemoteService for RadioService {
    fn new_playlist(&self, channel: Channel) -> Result<()> {
        self.send(RadioTask::NewPlaylist(channel))
    }

    fn continuation_playlist(&self, channel: Channel, last_sid: &str) -> Result<()> {
        self.send(RadioTask::Continuation(channel, last_sid.to_string()))
    }

    fn skip(&self, sid: &str, channel: Channel) -> Result<()> {
        self.send(RadioTask::Skip(sid.to_string(), channel))
    }

    fn rate(&self, sid: &str, channel: Channel, liked: bool) -> Result<()> {
        self.send(RadioTask::Rate(sid.to_string(), channel, liked))
    }

    fn ban(&self, sid: &str, channel: Channel) -> Result<()> {
        self.send(RadioTask::Ban(sid.to_string(), channel))
    }
}

/// Spawns a background thread to process radio tasks.
///
/// The worker owns the HTTP client and enters a blocking loop, listening for
/// incoming [`RadioTask`]s until every handle has been dropped.
fn spawn_task_worker(client: RadioClient, task_rx: Receiver<RadioTask>, event_tx: Sender<AppEvent>) {
    thread::spawn(move || {
        while let Ok(task) = task_rx.recv() {
            debug!(?task, "Processing radio task");

            let reply = handle_task(&client, task);

            if event_tx.send(AppEvent::Remote(reply)).is_err() {
                break;
            }
        }
    });
}

/// Executes a single task and maps its outcome to a reply.
fn handle_task(client: &RadioClient, task: RadioTask) -> RemoteReply {
    match task {
        RadioTask::NewPlaylist(channel) => RemoteReply::NewPlaylist(client.new_playlist(channel)),
        RadioTask::Continuation(channel, sid) => {
            RemoteReply::Continuation {
                channel,
                result: client.playing_playlist(channel, &sid),
            }
        }
        RadioTask::Skip(sid, channel) => {
            let success = outcome("skip", client.skip(channel, &sid));
            RemoteReply::Skipped { sid, success }
        }
        RadioTask::Rate(sid, channel, liked) => {
            let success = outcome("rate", client.rate(channel, &sid, liked));
            RemoteReply::Rated { sid, liked, success }
        }
        RadioTask::Ban(sid, channel) => {
            let success = outcome("ban", client.ban(channel, &sid));
            RemoteReply::Banned { sid, success }
        }
    }
}

// Boolean calls only report success, the reason is kept in the log.
fn outcome(action: &str, result: Result<(), RemoteError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(action, error = %e, "Radio request failed");
            false
        }
    }
}
