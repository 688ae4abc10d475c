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

//! Radio playback control.
//!
//! The [`PlaybackController`] owns the active playlist and an optional
//! prefetched continuation, and mediates between the audio engine and the
//! radio service.
//!
//! # Prefetch and swap
//!
//! Whenever the engine reports a new playlist position the controller decides
//! what to do from that position alone:
//!
//! * **Past the end** with nothing prefetched: request a brand new playlist
//!   and lock the controls until it arrives.
//! * **Past the end** with a prefetched playlist: promote it.
//! * **On the last track**: request a continuation seeded with that track, so
//!   it is usually ready before the active playlist runs out.
//! * **Anywhere else** with a prefetched playlist waiting: promote it.
//!
//! Each playlist handed to the engine is tagged with a generation number.
//! Promotion bumps the generation, so late position reports about a replaced
//! playlist are recognised and dropped.
//!
//! # Control lock
//!
//! Rating, banning and channel switches lock the controls until the radio
//! service answers, successful or not. While locked, user actions are
//! rejected with [`PlaybackError::ControlLocked`].

mod fade;
mod lock;
#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    controller::{
        fade::{FadeAction, VolumeFade},
        lock::{ControlLock, LockHolder},
    },
    model::{Channel, Track, playlist::Playlist},
    player::{EngineEvent, MediaEngine, PlayerState},
    remote::{RemoteReply, RemoteService},
};

const MAX_VOLUME: u32 = 100;

/// Notifications published by the controller.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlaybackEvent {
    CurrentTrackChanged(Track),
    ControlLockChanged(bool),
    ChannelChanged(Channel),
    Playing,
    Paused,
    Stopped,
    StateChanged(PlayerState),
    PositionChanged(f64),
    DurationChanged(u64),
    VolumeChanged(u32),
    SkipOutcome(bool),
    RateOutcome { liked: bool, success: bool },
    TrashOutcome(bool),
    PlaylistFailed(String),
}

/// Receiver of [`PlaybackEvent`]s.
pub(crate) trait PlaybackListener {
    fn on_playback_event(&self, event: PlaybackEvent);
}

#[derive(Debug, Error)]
pub(crate) enum PlaybackError {
    #[error("controls are locked until the radio service answers")]
    ControlLocked,

    #[error("no track is playing")]
    NoActiveTrack,

    #[error("no channel selected")]
    NoChannel,

    #[error(transparent)]
    Dispatch(#[from] anyhow::Error),
}

/// Timing parameters for the controller.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlaybackSettings {
    pub(crate) volume: u32,
    pub(crate) fade_duration: Duration,
    pub(crate) stale_after: Duration,
}

impl From<&AppConfig> for PlaybackSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            volume: cfg.volume.min(MAX_VOLUME),
            fade_duration: cfg.fade_duration(),
            stale_after: cfg.stale_after(),
        }
    }
}

pub(crate) struct PlaybackController<E, R, L> {
    engine: E,
    remote: R,
    listener: L,

    channel: Option<Channel>,

    active: Playlist,
    pending: Option<Playlist>,
    generation: u64,

    lock: ControlLock,

    state: PlayerState,
    position: f64,
    duration: u64,

    // Last level sent to, or reported by, the engine.
    volume: u32,
    // Level chosen by the user, restored by fade-ins.
    target_volume: u32,
    fade: Option<VolumeFade>,
    fade_duration: Duration,

    stale_after: Duration,
    last_transition: Option<Instant>,
}

impl<E, R, L> PlaybackController<E, R, L>
where
    E: MediaEngine,
    R: RemoteService,
    L: PlaybackListener,
{
    pub(crate) fn new(engine: E, remote: R, listener: L, settings: PlaybackSettings) -> Self {
        Self {
            engine,
            remote,
            listener,
            channel: None,
            active: Playlist::new(),
            pending: None,
            generation: 0,
            lock: ControlLock::default(),
            state: PlayerState::Stopped,
            position: 0.0,
            duration: 0,
            volume: settings.volume,
            target_volume: settings.volume,
            fade: None,
            fade_duration: settings.fade_duration,
            stale_after: settings.stale_after,
            last_transition: None,
        }
    }

    pub(crate) fn channel(&self) -> Option<Channel> {
        self.channel
    }

    pub(crate) fn volume(&self) -> u32 {
        self.volume
    }

    pub(crate) fn target_volume(&self) -> u32 {
        self.target_volume
    }

    pub(crate) fn duration(&self) -> u64 {
        self.duration
    }

    pub(crate) fn position(&self) -> f64 {
        self.position
    }

    pub(crate) fn state(&self) -> PlayerState {
        self.state
    }

    pub(crate) fn can_control(&self) -> bool {
        self.lock.can_control()
    }

    pub(crate) fn current_song(&self) -> Option<&Track> {
        self.active.current()
    }

    pub(crate) fn active_playlist(&self) -> &Playlist {
        &self.active
    }

    pub(crate) fn pending_playlist(&self) -> Option<&Playlist> {
        self.pending.as_ref()
    }

    /// Whether playback is running and not on its way to a pause.
    pub(crate) fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing && !self.fade.as_ref().is_some_and(VolumeFade::is_fade_out)
    }

    // ---- engine notifications ----

    pub(crate) fn handle_engine_event(&mut self, event: EngineEvent) -> anyhow::Result<()> {
        match event {
            EngineEvent::IndexChanged { generation, index } => {
                return self.on_index_changed(generation, index);
            }
            EngineEvent::StateChanged(state) => {
                self.state = state;
                self.emit(PlaybackEvent::StateChanged(state));
            }
            EngineEvent::TimeChanged(seconds) => {
                self.position = seconds;
                self.emit(PlaybackEvent::PositionChanged(seconds));
            }
            EngineEvent::DurationChanged(duration) => {
                self.duration = duration;
                self.emit(PlaybackEvent::DurationChanged(duration));
            }
            EngineEvent::VolumeChanged(volume) => {
                self.volume = volume;
                self.emit(PlaybackEvent::VolumeChanged(volume));
            }
        }

        Ok(())
    }

    fn on_index_changed(&mut self, generation: u64, index: Option<usize>) -> anyhow::Result<()> {
        if generation != self.generation {
            debug!(generation, active = self.generation, "Dropping position report for a replaced playlist");
            return Ok(());
        }

        // Reaching the last track must only request one continuation.
        if index == self.active.current_index() {
            return Ok(());
        }

        if !self.active.set_current_index(index) {
            warn!(?index, len = self.active.len(), "Dropping out of range position report");
            return Ok(());
        }

        debug!(generation, ?index, "Playlist position changed");

        self.evaluate_position()
    }

    /// Applies the prefetch and swap rules to the active cursor.
    fn evaluate_position(&mut self) -> anyhow::Result<()> {
        let Some(index) = self.active.current_index() else {
            return match self.pending.take() {
                Some(pending) => self.promote(pending),
                None => self.request_new_playlist(true),
            };
        };

        if self.active.is_last(index) {
            if let Some(last) = self.active.last() {
                let sid = last.sid.clone();
                self.request_continuation(&sid)?;
            }
        } else if let Some(pending) = self.pending.take() {
            return self.promote(pending);
        }

        if let Some(track) = self.active.get(index) {
            debug!(
                sid = %track.sid,
                artist = %track.artist,
                title = %track.title,
                album = %track.album,
                public_time = %track.public_time,
                company = %track.company,
                kbps = %track.kbps,
                subtype = %track.subtype,
                liked = track.liked(),
                "Now playing"
            );
            self.emit(PlaybackEvent::CurrentTrackChanged(track.clone()));
        }

        Ok(())
    }

    fn promote(&mut self, pending: Playlist) -> anyhow::Result<()> {
        info!(tracks = pending.len(), "Promoting prefetched playlist");
        self.install(pending)
    }

    /// Makes `playlist` the active playlist and starts it from its first track.
    ///
    /// The previous playlist is discarded in full.
    fn install(&mut self, playlist: Playlist) -> anyhow::Result<()> {
        self.generation += 1;
        self.ensure_playing()?;

        if playlist.is_empty() {
            warn!(generation = self.generation, "Installed an empty playlist");
            self.active.clear();
            self.engine.load_playlist(self.generation, Vec::new())?;
            return Ok(());
        }

        self.active = playlist;
        self.engine.load_playlist(self.generation, self.active.urls())?;
        self.active.advance();
        self.evaluate_position()
    }

    fn ensure_playing(&mut self) -> anyhow::Result<()> {
        if self.state == PlayerState::Playing && self.fade.is_none() {
            return Ok(());
        }

        // A fade-out in progress would otherwise pause the new playlist.
        self.fade = None;
        if self.volume != self.target_volume {
            self.engine.set_volume(self.target_volume)?;
            self.volume = self.target_volume;
        }
        self.engine.play()?;

        Ok(())
    }

    fn request_new_playlist(&mut self, lock: bool) -> anyhow::Result<()> {
        let Some(channel) = self.channel else {
            debug!("No channel selected, not requesting a playlist");
            return Ok(());
        };

        info!(channel, "Requesting new playlist");
        self.remote.new_playlist(channel)?;

        if lock {
            self.lock_controls(LockHolder::NewPlaylist);
        }

        Ok(())
    }

    fn request_continuation(&mut self, last_sid: &str) -> anyhow::Result<()> {
        let Some(channel) = self.channel else {
            return Ok(());
        };

        debug!(channel, last_sid, "Requesting continuation playlist");
        self.remote.continuation_playlist(channel, last_sid)
    }

    // ---- radio service replies ----

    pub(crate) fn handle_remote_reply(&mut self, reply: RemoteReply) -> anyhow::Result<()> {
        match reply {
            RemoteReply::NewPlaylist(Ok(tracks)) => {
                info!(tracks = tracks.len(), "Received new playlist");
                let result = self.install(Playlist::from_tracks(tracks));
                self.unlock_controls(LockHolder::NewPlaylist);
                result?;
            }
            RemoteReply::NewPlaylist(Err(e)) => {
                warn!(error = %e, "New playlist request failed");
                self.unlock_controls(LockHolder::NewPlaylist);
                self.emit(PlaybackEvent::PlaylistFailed(e.to_string()));
            }
            RemoteReply::Continuation { channel, .. } if self.channel != Some(channel) => {
                debug!(channel, "Discarding continuation for a previous channel");
            }
            RemoteReply::Continuation { result: Ok(tracks), .. } => {
                if tracks.is_empty() {
                    debug!("Discarding empty continuation playlist");
                } else {
                    info!(tracks = tracks.len(), "Received continuation playlist");
                    self.pending = Some(Playlist::from_tracks(tracks));
                }
            }
            RemoteReply::Continuation { result: Err(e), .. } => {
                warn!(error = %e, "Continuation request failed");
                self.emit(PlaybackEvent::PlaylistFailed(e.to_string()));
            }
            RemoteReply::Skipped { success, .. } => {
                self.emit(PlaybackEvent::SkipOutcome(success));
            }
            RemoteReply::Rated { sid, liked, success } => {
                if success {
                    self.apply_rating(&sid, liked);
                }
                self.unlock_controls(LockHolder::Rate);
                self.emit(PlaybackEvent::RateOutcome { liked, success });
            }
            RemoteReply::Banned { success, .. } => {
                self.unlock_controls(LockHolder::Ban);
                self.emit(PlaybackEvent::TrashOutcome(success));
            }
        }

        Ok(())
    }

    // Matched by identity, the user may have moved on since the request.
    fn apply_rating(&mut self, sid: &str, liked: bool) {
        let track = match self.active.find_by_id_mut(sid) {
            Some(track) => Some(track),
            None => self
                .pending
                .as_mut()
                .and_then(|pending| pending.find_by_id_mut(sid)),
        };

        match track {
            Some(track) => track.set_liked(liked),
            None => debug!(sid, "Rated track is no longer queued"),
        }
    }

    // ---- user actions ----

    pub(crate) fn play(&mut self) -> Result<(), PlaybackError> {
        self.play_at(Instant::now())
    }

    pub(crate) fn play_at(&mut self, now: Instant) -> Result<(), PlaybackError> {
        self.engine.play()?;
        self.start_fade(now, self.target_volume, FadeAction::None)?;
        self.emit(PlaybackEvent::Playing);

        let stale = self
            .last_transition
            .is_some_and(|last| now.saturating_duration_since(last) > self.stale_after);
        if stale {
            if let Some(sid) = self.current_song().map(|track| track.sid.clone()) {
                info!("Resuming a stale session, requesting a fresh continuation");
                self.request_continuation(&sid)?;
            }
        }
        self.last_transition = Some(now);

        Ok(())
    }

    pub(crate) fn pause(&mut self) -> Result<(), PlaybackError> {
        self.pause_at(Instant::now())
    }

    /// Fades out and pauses the engine once the fade completes.
    ///
    /// The pause time is recorded immediately.
    pub(crate) fn pause_at(&mut self, now: Instant) -> Result<(), PlaybackError> {
        self.emit(PlaybackEvent::Paused);
        self.last_transition = Some(now);
        self.start_fade(now, 0, FadeAction::Pause)?;

        Ok(())
    }

    pub(crate) fn stop(&mut self) -> Result<(), PlaybackError> {
        self.fade = None;
        self.engine.stop()?;
        self.emit(PlaybackEvent::Stopped);

        Ok(())
    }

    pub(crate) fn set_volume(&mut self, volume: u32) -> Result<(), PlaybackError> {
        let volume = volume.min(MAX_VOLUME);
        self.target_volume = volume;

        match self.fade.as_mut() {
            Some(fade) if fade.is_fade_out() => {}
            Some(fade) => fade.retarget(volume),
            None => {
                self.engine.set_volume(volume)?;
                self.volume = volume;
            }
        }

        Ok(())
    }

    /// Skips the current track, or fetches a playlist if nothing is playing.
    ///
    /// The engine advances straight away, without waiting for the service.
    pub(crate) fn next(&mut self) -> Result<(), PlaybackError> {
        self.ensure_control()?;

        let Some(sid) = self.current_song().map(|track| track.sid.clone()) else {
            if self.channel.is_none() {
                return Err(PlaybackError::NoChannel);
            }
            self.request_new_playlist(false)?;
            return Ok(());
        };
        let channel = self.channel.ok_or(PlaybackError::NoChannel)?;

        self.remote.skip(&sid, channel)?;
        self.engine.next()?;

        Ok(())
    }

    pub(crate) fn rate_current_song(&mut self) -> Result<(), PlaybackError> {
        self.rate(true)
    }

    pub(crate) fn unrate_current_song(&mut self) -> Result<(), PlaybackError> {
        self.rate(false)
    }

    fn rate(&mut self, liked: bool) -> Result<(), PlaybackError> {
        let (sid, channel) = self.current_target()?;

        self.remote.rate(&sid, channel, liked)?;
        self.lock_controls(LockHolder::Rate);

        Ok(())
    }

    pub(crate) fn trash_current_song(&mut self) -> Result<(), PlaybackError> {
        let (sid, channel) = self.current_target()?;

        self.remote.ban(&sid, channel)?;
        self.lock_controls(LockHolder::Ban);

        Ok(())
    }

    /// Switches station, dropping anything prefetched for the old one.
    pub(crate) fn set_channel(&mut self, channel: Channel) -> Result<(), PlaybackError> {
        if self.channel == Some(channel) {
            return Ok(());
        }
        self.ensure_control()?;

        info!(channel, "Switching channel");
        self.remote.new_playlist(channel)?;

        self.channel = Some(channel);
        self.pending = None;
        self.lock_controls(LockHolder::NewPlaylist);
        self.emit(PlaybackEvent::ChannelChanged(channel));

        Ok(())
    }

    // ---- time ----

    /// Advances any running volume fade.
    pub(crate) fn tick(&mut self, now: Instant) -> anyhow::Result<()> {
        let Some(fade) = self.fade.as_ref() else {
            return Ok(());
        };

        let level = fade.level_at(now);
        let finished = fade.is_finished(now);
        let then = fade.then();

        if level != self.volume {
            self.engine.set_volume(level)?;
            self.volume = level;
        }

        if finished {
            self.fade = None;
            if then == FadeAction::Pause {
                self.engine.pause()?;
            }
        }

        Ok(())
    }

    /// Replaces any running fade with a new one from the current volume.
    fn start_fade(&mut self, now: Instant, to: u32, then: FadeAction) -> anyhow::Result<()> {
        self.fade = Some(VolumeFade::new(self.volume, to, now, self.fade_duration, then));
        self.tick(now)
    }

    // ---- helpers ----

    fn ensure_control(&self) -> Result<(), PlaybackError> {
        if self.lock.can_control() {
            Ok(())
        } else {
            Err(PlaybackError::ControlLocked)
        }
    }

    fn current_target(&self) -> Result<(String, Channel), PlaybackError> {
        self.ensure_control()?;

        let sid = self
            .current_song()
            .map(|track| track.sid.clone())
            .ok_or(PlaybackError::NoActiveTrack)?;
        let channel = self.channel.ok_or(PlaybackError::NoChannel)?;

        Ok((sid, channel))
    }

    fn lock_controls(&mut self, holder: LockHolder) {
        if self.lock.acquire(holder) {
            self.emit(PlaybackEvent::ControlLockChanged(false));
        }
    }

    fn unlock_controls(&mut self, holder: LockHolder) {
        if self.lock.release(holder) {
            self.emit(PlaybackEvent::ControlLockChanged(true));
        } else if let Some(current) = self.lock.holder() {
            debug!(?holder, ?current, "Controls stay locked by a later request");
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        self.listener.on_playback_event(event);
    }
}
