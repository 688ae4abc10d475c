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

use std::{
    cell::RefCell,
    rc::Rc,
    sync::mpsc::{self, Receiver, Sender},
    time::{Duration, Instant},
};

use anyhow::Result;

use super::*;
use crate::remote::RemoteError;

const CHANNEL: Channel = 7;

#[derive(Debug, Clone, PartialEq)]
enum EngineCall {
    Load(u64, Vec<String>),
    Play,
    Pause,
    Stop,
    Next,
    Volume(u32),
}

#[derive(Default)]
struct FakeEngine {
    calls: Rc<RefCell<Vec<EngineCall>>>,
}

impl MediaEngine for FakeEngine {
    fn load_playlist(&self, generation: u64, urls: Vec<String>) -> Result<()> {
        self.calls.borrow_mut().push(EngineCall::Load(generation, urls));
        Ok(())
    }

    fn play(&self) -> Result<()> {
        self.calls.borrow_mut().push(EngineCall::Play);
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.calls.borrow_mut().push(EngineCall::Pause);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.calls.borrow_mut().push(EngineCall::Stop);
        Ok(())
    }

    fn next(&self) -> Result<()> {
        self.calls.borrow_mut().push(EngineCall::Next);
        Ok(())
    }

    fn set_volume(&self, volume: u32) -> Result<()> {
        self.calls.borrow_mut().push(EngineCall::Volume(volume));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum RemoteCall {
    New(Channel),
    Continuation(Channel, String),
    Skip(String, Channel),
    Rate(String, Channel, bool),
    Ban(String, Channel),
}

#[derive(Default)]
struct FakeRemote {
    calls: Rc<RefCell<Vec<RemoteCall>>>,
}

impl RemoteService for FakeRemote {
    fn new_playlist(&self, channel: Channel) -> Result<()> {
        self.calls.borrow_mut().push(RemoteCall::New(channel));
        Ok(())
    }

    fn continuation_playlist(&self, channel: Channel, last_sid: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(RemoteCall::Continuation(channel, last_sid.to_string()));
        Ok(())
    }

    fn skip(&self, sid: &str, channel: Channel) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(RemoteCall::Skip(sid.to_string(), channel));
        Ok(())
    }

    fn rate(&self, sid: &str, channel: Channel, liked: bool) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(RemoteCall::Rate(sid.to_string(), channel, liked));
        Ok(())
    }

    fn ban(&self, sid: &str, channel: Channel) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(RemoteCall::Ban(sid.to_string(), channel));
        Ok(())
    }
}

impl PlaybackListener for Sender<PlaybackEvent> {
    fn on_playback_event(&self, event: PlaybackEvent) {
        let _ = self.send(event);
    }
}

type TestController = PlaybackController<FakeEngine, FakeRemote, Sender<PlaybackEvent>>;

struct Harness {
    controller: TestController,
    engine: Rc<RefCell<Vec<EngineCall>>>,
    remote: Rc<RefCell<Vec<RemoteCall>>>,
    events: Receiver<PlaybackEvent>,
}

impl Harness {
    fn new() -> Self {
        let engine = FakeEngine::default();
        let remote = FakeRemote::default();
        let engine_calls = Rc::clone(&engine.calls);
        let remote_calls = Rc::clone(&remote.calls);
        let (event_tx, event_rx) = mpsc::channel();

        let settings = PlaybackSettings {
            volume: 80,
            fade_duration: Duration::from_millis(1000),
            stale_after: Duration::from_secs(30 * 60),
        };

        Self {
            controller: PlaybackController::new(engine, remote, event_tx, settings),
            engine: engine_calls,
            remote: remote_calls,
            events: event_rx,
        }
    }

    /// A controller on [`CHANNEL`] playing the first of `ids`.
    fn with_playlist(ids: &[&str]) -> Self {
        let mut h = Self::new();
        h.controller.set_channel(CHANNEL).unwrap();
        h.reply(RemoteReply::NewPlaylist(Ok(tracks(ids))));
        h.engine_event(EngineEvent::StateChanged(PlayerState::Playing));
        h.drain();
        h
    }

    fn reply(&mut self, reply: RemoteReply) {
        self.controller.handle_remote_reply(reply).unwrap();
    }

    fn engine_event(&mut self, event: EngineEvent) {
        self.controller.handle_engine_event(event).unwrap();
    }

    /// Reports a position for the active generation.
    fn report(&mut self, index: Option<usize>) {
        let generation = self.controller.generation;
        self.engine_event(EngineEvent::IndexChanged { generation, index });
    }

    fn engine_calls(&self) -> Vec<EngineCall> {
        self.engine.borrow_mut().drain(..).collect()
    }

    fn remote_calls(&self) -> Vec<RemoteCall> {
        self.remote.borrow_mut().drain(..).collect()
    }

    fn events(&self) -> Vec<PlaybackEvent> {
        self.events.try_iter().collect()
    }

    fn drain(&self) {
        self.engine_calls();
        self.remote_calls();
        self.events();
    }

    fn active_ids(&self) -> Vec<String> {
        ids(self.controller.active_playlist())
    }

    fn assert_cursor_valid(&self) {
        let playlist = self.controller.active_playlist();
        if let Some(index) = playlist.current_index() {
            assert!(index < playlist.len(), "cursor {index} outside {} tracks", playlist.len());
        }
    }
}

fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| Track::with_id(id)).collect()
}

fn urls(ids: &[&str]) -> Vec<String> {
    tracks(ids).into_iter().map(|track| track.url).collect()
}

fn ids(playlist: &Playlist) -> Vec<String> {
    playlist.tracks().iter().map(|track| track.sid.clone()).collect()
}

fn continuation(result: Result<Vec<Track>, RemoteError>) -> RemoteReply {
    RemoteReply::Continuation {
        channel: CHANNEL,
        result,
    }
}

fn track_changed(id: &str) -> PlaybackEvent {
    PlaybackEvent::CurrentTrackChanged(Track::with_id(id))
}

#[test]
fn new_playlist_reply_replaces_active_and_unlocks() {
    let mut h = Harness::new();

    h.controller.set_channel(CHANNEL).unwrap();
    assert!(!h.controller.can_control());
    assert_eq!(h.remote_calls(), vec![RemoteCall::New(CHANNEL)]);

    h.reply(RemoteReply::NewPlaylist(Ok(tracks(&["a", "b", "c"]))));

    assert_eq!(h.active_ids(), vec!["a", "b", "c"]);
    assert_eq!(h.controller.active_playlist().current_index(), Some(0));
    assert!(h.controller.can_control());
    assert_eq!(
        h.engine_calls(),
        vec![EngineCall::Play, EngineCall::Load(1, urls(&["a", "b", "c"]))]
    );
    assert_eq!(
        h.events(),
        vec![
            PlaybackEvent::ControlLockChanged(false),
            PlaybackEvent::ChannelChanged(CHANNEL),
            track_changed("a"),
            PlaybackEvent::ControlLockChanged(true),
        ]
    );
}

#[test]
fn continuation_is_prefetched_on_last_track_and_promoted_when_exhausted() {
    let mut h = Harness::with_playlist(&["a", "b", "c"]);

    h.report(Some(1));
    assert_eq!(h.events(), vec![track_changed("b")]);
    assert!(h.remote_calls().is_empty());

    h.report(Some(2));
    assert_eq!(
        h.remote_calls(),
        vec![RemoteCall::Continuation(CHANNEL, "c".to_string())]
    );
    assert_eq!(h.events(), vec![track_changed("c")]);
    assert!(h.controller.can_control());
    assert_eq!(h.active_ids(), vec!["a", "b", "c"]);

    h.reply(continuation(Ok(tracks(&["d", "e"]))));
    assert_eq!(ids(h.controller.pending_playlist().unwrap()), vec!["d", "e"]);
    assert!(h.events().is_empty());

    h.report(None);

    assert_eq!(h.active_ids(), vec!["d", "e"]);
    assert!(h.controller.pending_playlist().is_none());
    assert_eq!(h.controller.active_playlist().current_index(), Some(0));
    assert_eq!(h.controller.current_song().unwrap().sid, "d");
    assert_eq!(h.engine_calls(), vec![EngineCall::Load(2, urls(&["d", "e"]))]);
    assert_eq!(h.events(), vec![track_changed("d")]);
    assert!(h.remote_calls().is_empty());
}

#[test]
fn repeated_last_index_report_requests_one_continuation() {
    let mut h = Harness::with_playlist(&["a", "b"]);

    h.report(Some(1));
    h.report(Some(1));

    assert_eq!(
        h.remote_calls(),
        vec![RemoteCall::Continuation(CHANNEL, "b".to_string())]
    );
}

#[test]
fn reports_for_replaced_playlists_are_ignored() {
    let mut h = Harness::with_playlist(&["a", "b"]);
    h.report(Some(1));
    h.reply(continuation(Ok(tracks(&["c", "d"]))));
    h.report(None);
    h.drain();

    h.engine_event(EngineEvent::IndexChanged {
        generation: 1,
        index: None,
    });

    assert_eq!(h.active_ids(), vec!["c", "d"]);
    assert_eq!(h.controller.active_playlist().current_index(), Some(0));
    assert!(h.remote_calls().is_empty());
    assert!(h.events().is_empty());
}

#[test]
fn exhausted_playlist_without_prefetch_fetches_and_locks() {
    let mut h = Harness::with_playlist(&["a", "b"]);
    h.report(Some(1));
    h.drain();

    h.report(None);

    assert_eq!(h.remote_calls(), vec![RemoteCall::New(CHANNEL)]);
    assert!(!h.controller.can_control());
    assert_eq!(h.events(), vec![PlaybackEvent::ControlLockChanged(false)]);

    h.reply(RemoteReply::NewPlaylist(Ok(tracks(&["x"]))));

    assert!(h.controller.can_control());
    assert_eq!(h.active_ids(), vec!["x"]);
    // a single track list is already on its last track
    assert_eq!(
        h.remote_calls(),
        vec![RemoteCall::Continuation(CHANNEL, "x".to_string())]
    );
    assert_eq!(
        h.events(),
        vec![track_changed("x"), PlaybackEvent::ControlLockChanged(true)]
    );
}

#[test]
fn prefetched_playlist_is_promoted_before_the_end() {
    let mut h = Harness::with_playlist(&["a", "b", "c"]);
    h.reply(continuation(Ok(tracks(&["d", "e"]))));

    h.report(Some(1));

    assert_eq!(h.active_ids(), vec!["d", "e"]);
    assert!(h.controller.pending_playlist().is_none());
    assert_eq!(h.events(), vec![track_changed("d")]);
}

#[test]
fn empty_continuation_is_discarded() {
    let mut h = Harness::with_playlist(&["a", "b"]);

    h.reply(continuation(Ok(vec![])));

    assert!(h.controller.pending_playlist().is_none());
}

#[test]
fn out_of_range_report_is_dropped() {
    let mut h = Harness::with_playlist(&["a", "b"]);

    h.report(Some(5));

    assert_eq!(h.controller.active_playlist().current_index(), Some(0));
    assert!(h.events().is_empty());
}

#[test]
fn cursor_stays_valid_across_swaps() {
    let mut h = Harness::with_playlist(&["a", "b", "c"]);
    let script = [Some(1), Some(2), Some(9), None, Some(1), Some(0), None];
    let mut fetched = 0;

    for index in script {
        h.report(index);
        h.assert_cursor_valid();

        for call in h.remote_calls() {
            fetched += 1;
            let names: Vec<String> = (0..2).map(|n| format!("g{fetched}t{n}")).collect();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let reply = match call {
                RemoteCall::New(_) => RemoteReply::NewPlaylist(Ok(tracks(&names))),
                RemoteCall::Continuation(..) => continuation(Ok(tracks(&names))),
                other => panic!("unexpected call {other:?}"),
            };
            h.reply(reply);
            h.assert_cursor_valid();
        }
    }

    assert!(h.controller.can_control());
}

#[test]
fn next_skips_current_track_and_advances_without_locking() {
    let mut h = Harness::with_playlist(&["a", "b", "c"]);
    h.report(Some(1));
    h.drain();

    h.controller.next().unwrap();

    assert_eq!(
        h.remote_calls(),
        vec![RemoteCall::Skip("b".to_string(), CHANNEL)]
    );
    assert_eq!(h.engine_calls(), vec![EngineCall::Next]);
    assert!(h.controller.can_control());
    assert!(h.events().is_empty());

    h.reply(RemoteReply::Skipped {
        sid: "b".to_string(),
        success: true,
    });
    assert_eq!(h.events(), vec![PlaybackEvent::SkipOutcome(true)]);
}

#[test]
fn next_without_a_track_requests_a_new_playlist() {
    let mut h = Harness::new();
    h.controller.set_channel(CHANNEL).unwrap();
    h.reply(RemoteReply::NewPlaylist(Ok(vec![])));
    h.drain();

    h.controller.next().unwrap();

    assert_eq!(h.remote_calls(), vec![RemoteCall::New(CHANNEL)]);
    assert!(h.engine_calls().is_empty());
    assert!(h.controller.can_control());
}

#[test]
fn next_without_a_channel_is_rejected() {
    let mut h = Harness::new();

    let result = h.controller.next();

    assert!(matches!(result, Err(PlaybackError::NoChannel)));
    assert!(h.remote_calls().is_empty());
    assert!(h.engine_calls().is_empty());
    assert!(h.controller.can_control());
}

#[test]
fn continuation_for_previous_channel_is_ignored() {
    let mut h = Harness::with_playlist(&["a", "b"]);
    h.report(Some(1));
    assert_eq!(
        h.remote_calls(),
        vec![RemoteCall::Continuation(CHANNEL, "b".to_string())]
    );

    h.controller.set_channel(8).unwrap();
    h.reply(continuation(Ok(tracks(&["old7x", "old7y"]))));

    assert!(h.controller.pending_playlist().is_none());

    h.reply(RemoteReply::NewPlaylist(Ok(tracks(&["new8a", "new8b", "new8c"]))));

    assert_eq!(h.active_ids(), vec!["new8a", "new8b", "new8c"]);
    assert_eq!(h.controller.current_song().unwrap().sid, "new8a");
    assert!(h.controller.pending_playlist().is_none());
    h.assert_cursor_valid();
}

#[test]
fn empty_new_playlist_clears_active_tracks() {
    let mut h = Harness::with_playlist(&["a", "b"]);
    h.controller.set_channel(8).unwrap();
    h.engine_calls();

    h.reply(RemoteReply::NewPlaylist(Ok(vec![])));

    assert!(h.controller.active_playlist().is_empty());
    assert_eq!(h.controller.active_playlist().current_index(), None);
    assert!(h.controller.current_song().is_none());
    assert!(h.controller.can_control());
    let generation = h.controller.generation;
    assert!(
        h.engine_calls()
            .contains(&EngineCall::Load(generation, Vec::new()))
    );
}

#[test]
fn set_channel_to_current_channel_is_a_no_op() {
    let mut h = Harness::with_playlist(&["a"]);

    h.controller.set_channel(CHANNEL).unwrap();

    assert!(h.remote_calls().is_empty());
    assert!(h.controller.can_control());
    assert!(h.events().is_empty());
}

#[test]
fn set_channel_discards_prefetched_playlist() {
    let mut h = Harness::with_playlist(&["a", "b"]);
    h.reply(continuation(Ok(tracks(&["c"]))));

    h.controller.set_channel(8).unwrap();

    assert_eq!(h.controller.channel(), Some(8));
    assert!(h.controller.pending_playlist().is_none());
    assert!(!h.controller.can_control());
    assert_eq!(h.remote_calls(), vec![RemoteCall::New(8)]);
    assert_eq!(
        h.events(),
        vec![
            PlaybackEvent::ControlLockChanged(false),
            PlaybackEvent::ChannelChanged(8)
        ]
    );
}

#[test]
fn rate_locks_until_confirmed_and_marks_track() {
    let mut h = Harness::with_playlist(&["a", "b"]);

    h.controller.rate_current_song().unwrap();

    assert!(!h.controller.can_control());
    assert_eq!(
        h.remote_calls(),
        vec![RemoteCall::Rate("a".to_string(), CHANNEL, true)]
    );
    assert_eq!(h.events(), vec![PlaybackEvent::ControlLockChanged(false)]);

    h.reply(RemoteReply::Rated {
        sid: "a".to_string(),
        liked: true,
        success: true,
    });

    assert!(h.controller.can_control());
    assert!(h.controller.current_song().unwrap().liked());
    assert_eq!(
        h.events(),
        vec![
            PlaybackEvent::ControlLockChanged(true),
            PlaybackEvent::RateOutcome {
                liked: true,
                success: true
            }
        ]
    );
}

#[test]
fn unrate_clears_the_liked_flag() {
    let mut h = Harness::with_playlist(&["a"]);
    h.controller.rate_current_song().unwrap();
    h.reply(RemoteReply::Rated {
        sid: "a".to_string(),
        liked: true,
        success: true,
    });

    h.controller.unrate_current_song().unwrap();
    h.reply(RemoteReply::Rated {
        sid: "a".to_string(),
        liked: false,
        success: true,
    });

    assert!(!h.controller.current_song().unwrap().liked());
    assert!(h.controller.can_control());
}

#[test]
fn failed_rate_unlocks_without_marking_track() {
    let mut h = Harness::with_playlist(&["a"]);
    h.controller.rate_current_song().unwrap();
    h.drain();

    h.reply(RemoteReply::Rated {
        sid: "a".to_string(),
        liked: true,
        success: false,
    });

    assert!(h.controller.can_control());
    assert!(!h.controller.current_song().unwrap().liked());
    assert_eq!(
        h.events(),
        vec![
            PlaybackEvent::ControlLockChanged(true),
            PlaybackEvent::RateOutcome {
                liked: true,
                success: false
            }
        ]
    );
}

#[test]
fn rate_confirmation_follows_the_rated_track_not_the_cursor() {
    let mut h = Harness::with_playlist(&["a", "b", "c"]);
    h.controller.rate_current_song().unwrap();

    h.report(Some(1));
    h.reply(RemoteReply::Rated {
        sid: "a".to_string(),
        liked: true,
        success: true,
    });

    let playlist = h.controller.active_playlist();
    assert!(playlist.get(0).unwrap().liked());
    assert!(!playlist.get(1).unwrap().liked());
}

#[test]
fn user_actions_are_rejected_while_locked() {
    let mut h = Harness::with_playlist(&["a", "b"]);
    h.controller.trash_current_song().unwrap();
    h.drain();

    assert!(matches!(h.controller.next(), Err(PlaybackError::ControlLocked)));
    assert!(matches!(
        h.controller.rate_current_song(),
        Err(PlaybackError::ControlLocked)
    ));
    assert!(matches!(
        h.controller.trash_current_song(),
        Err(PlaybackError::ControlLocked)
    ));
    assert!(matches!(
        h.controller.set_channel(9),
        Err(PlaybackError::ControlLocked)
    ));
    assert!(h.remote_calls().is_empty());
    assert!(h.engine_calls().is_empty());
}

#[test]
fn trash_unlocks_on_failure_and_reports_outcome() {
    let mut h = Harness::with_playlist(&["a", "b"]);
    h.controller.trash_current_song().unwrap();
    assert_eq!(
        h.remote_calls(),
        vec![RemoteCall::Ban("a".to_string(), CHANNEL)]
    );
    h.drain();

    h.reply(RemoteReply::Banned {
        sid: "a".to_string(),
        success: false,
    });

    assert!(h.controller.can_control());
    assert_eq!(
        h.events(),
        vec![
            PlaybackEvent::ControlLockChanged(true),
            PlaybackEvent::TrashOutcome(false)
        ]
    );
}

#[test]
fn per_track_actions_need_a_current_track() {
    let mut h = Harness::new();
    h.controller.set_channel(CHANNEL).unwrap();
    h.reply(RemoteReply::NewPlaylist(Ok(vec![])));
    h.drain();

    assert!(matches!(
        h.controller.rate_current_song(),
        Err(PlaybackError::NoActiveTrack)
    ));
    assert!(matches!(
        h.controller.trash_current_song(),
        Err(PlaybackError::NoActiveTrack)
    ));
    assert!(h.controller.can_control());
    assert!(h.remote_calls().is_empty());
}

#[test]
fn unrelated_replies_do_not_release_the_lock() {
    let mut h = Harness::with_playlist(&["a", "b"]);
    h.controller.rate_current_song().unwrap();

    h.reply(continuation(Ok(tracks(&["c"]))));
    h.reply(RemoteReply::Skipped {
        sid: "a".to_string(),
        success: true,
    });

    assert!(!h.controller.can_control());
}

#[test]
fn failed_new_playlist_unlocks_and_reports() {
    let mut h = Harness::new();
    h.controller.set_channel(CHANNEL).unwrap();
    h.drain();

    h.reply(RemoteReply::NewPlaylist(Err(RemoteError::Transport(
        "timed out".to_string(),
    ))));

    assert!(h.controller.can_control());
    assert_eq!(
        h.events(),
        vec![
            PlaybackEvent::ControlLockChanged(true),
            PlaybackEvent::PlaylistFailed("request failed: timed out".to_string())
        ]
    );
    assert!(h.engine_calls().is_empty());
}

#[test]
fn pause_fades_out_before_pausing() {
    let mut h = Harness::with_playlist(&["a"]);
    let t0 = Instant::now();

    h.controller.pause_at(t0).unwrap();

    assert_eq!(h.events(), vec![PlaybackEvent::Paused]);
    assert!(h.engine_calls().is_empty());
    assert!(!h.controller.is_playing());

    h.controller.tick(t0 + Duration::from_millis(500)).unwrap();
    assert_eq!(h.engine_calls(), vec![EngineCall::Volume(40)]);

    h.controller.tick(t0 + Duration::from_millis(1000)).unwrap();
    assert_eq!(
        h.engine_calls(),
        vec![EngineCall::Volume(0), EngineCall::Pause]
    );

    h.controller.tick(t0 + Duration::from_millis(1500)).unwrap();
    assert!(h.engine_calls().is_empty());
}

#[test]
fn play_resumes_immediately_and_fades_in() {
    let mut h = Harness::with_playlist(&["a"]);
    let t0 = Instant::now();
    h.controller.pause_at(t0).unwrap();
    h.controller.tick(t0 + Duration::from_secs(1)).unwrap();
    h.drain();

    let t1 = t0 + Duration::from_secs(60);
    h.controller.play_at(t1).unwrap();

    assert_eq!(h.engine_calls(), vec![EngineCall::Play]);
    assert_eq!(h.events(), vec![PlaybackEvent::Playing]);
    assert!(h.remote_calls().is_empty());

    h.controller.tick(t1 + Duration::from_secs(1)).unwrap();
    assert_eq!(h.engine_calls(), vec![EngineCall::Volume(80)]);
    assert_eq!(h.controller.volume(), 80);
}

#[test]
fn play_after_a_long_pause_prefetches_from_current_track() {
    let mut h = Harness::with_playlist(&["a", "b"]);
    let t0 = Instant::now();
    h.controller.pause_at(t0).unwrap();
    h.drain();

    h.controller
        .play_at(t0 + Duration::from_secs(31 * 60))
        .unwrap();

    assert_eq!(
        h.remote_calls(),
        vec![RemoteCall::Continuation(CHANNEL, "a".to_string())]
    );
    assert!(h.controller.can_control());
    assert_eq!(h.events(), vec![PlaybackEvent::Playing]);
}

#[test]
fn first_play_does_not_prefetch() {
    let mut h = Harness::with_playlist(&["a", "b"]);

    h.controller.play_at(Instant::now()).unwrap();

    assert!(h.remote_calls().is_empty());
}

#[test]
fn play_during_fade_out_cancels_the_pause() {
    let mut h = Harness::with_playlist(&["a"]);
    let t0 = Instant::now();
    h.controller.pause_at(t0).unwrap();
    h.controller.tick(t0 + Duration::from_millis(500)).unwrap();
    h.drain();

    let t1 = t0 + Duration::from_millis(600);
    h.controller.play_at(t1).unwrap();
    h.controller.tick(t1 + Duration::from_secs(2)).unwrap();

    assert_eq!(
        h.engine_calls(),
        vec![EngineCall::Play, EngineCall::Volume(80)]
    );
    assert!(h.controller.is_playing());
}

#[test]
fn set_volume_retargets_a_running_fade_in() {
    let mut h = Harness::with_playlist(&["a"]);
    let t0 = Instant::now();
    h.controller.pause_at(t0).unwrap();
    h.controller.tick(t0 + Duration::from_secs(1)).unwrap();
    h.controller.play_at(t0 + Duration::from_secs(2)).unwrap();
    h.drain();

    h.controller.set_volume(50).unwrap();
    assert!(h.engine_calls().is_empty());

    h.controller.tick(t0 + Duration::from_secs(3)).unwrap();
    assert_eq!(h.engine_calls(), vec![EngineCall::Volume(50)]);
    assert_eq!(h.controller.target_volume(), 50);
}

#[test]
fn set_volume_applies_immediately_and_clamps() {
    let mut h = Harness::with_playlist(&["a"]);

    h.controller.set_volume(150).unwrap();

    assert_eq!(h.engine_calls(), vec![EngineCall::Volume(100)]);
    assert_eq!(h.controller.volume(), 100);
}

#[test]
fn new_playlist_after_pause_restores_volume() {
    let mut h = Harness::with_playlist(&["a"]);
    let t0 = Instant::now();
    h.controller.pause_at(t0).unwrap();
    h.controller.tick(t0 + Duration::from_secs(1)).unwrap();
    h.engine_event(EngineEvent::StateChanged(PlayerState::Paused));
    h.drain();

    h.controller.set_channel(3).unwrap();
    h.reply(RemoteReply::NewPlaylist(Ok(tracks(&["z", "y"]))));

    assert_eq!(
        h.engine_calls(),
        vec![
            EngineCall::Volume(80),
            EngineCall::Play,
            EngineCall::Load(2, urls(&["z", "y"]))
        ]
    );
}

#[test]
fn stop_cancels_fade_and_reports() {
    let mut h = Harness::with_playlist(&["a"]);
    let t0 = Instant::now();
    h.controller.pause_at(t0).unwrap();
    h.drain();

    h.controller.stop().unwrap();
    h.controller.tick(t0 + Duration::from_secs(1)).unwrap();

    assert_eq!(h.engine_calls(), vec![EngineCall::Stop]);
    assert_eq!(h.events(), vec![PlaybackEvent::Stopped]);
}

#[test]
fn engine_reports_update_read_only_state() {
    let mut h = Harness::with_playlist(&["a"]);

    h.engine_event(EngineEvent::TimeChanged(12.5));
    h.engine_event(EngineEvent::DurationChanged(240));
    h.engine_event(EngineEvent::VolumeChanged(64));
    h.engine_event(EngineEvent::StateChanged(PlayerState::Paused));

    assert_eq!(h.controller.position(), 12.5);
    assert_eq!(h.controller.duration(), 240);
    assert_eq!(h.controller.volume(), 64);
    assert_eq!(h.controller.state(), PlayerState::Paused);
    assert_eq!(
        h.events(),
        vec![
            PlaybackEvent::PositionChanged(12.5),
            PlaybackEvent::DurationChanged(240),
            PlaybackEvent::VolumeChanged(64),
            PlaybackEvent::StateChanged(PlayerState::Paused),
        ]
    );
}
