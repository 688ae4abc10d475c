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

//! Radio playlist management.
//!
//! This module provides state for a single fetched playlist, an ordered list
//! of tracks plus a cursor identifying the track being played.

use crate::model::Track;

/// Ordered tracks with an optional cursor.
///
/// The cursor is either `None` or a valid index into the tracks.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Playlist {
    tracks: Vec<Track>,
    cursor: Option<usize>,
}

impl Playlist {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Builds a playlist from a received track list, keeping its order.
    ///
    /// No track is active until the cursor is advanced.
    pub(crate) fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut playlist = Self::new();
        for track in tracks {
            playlist.append(track);
        }
        playlist
    }

    /// Adds a track to the end, the cursor is left where it was.
    pub(crate) fn append(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Removes every track, leaving no track active.
    pub(crate) fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
    }

    pub(crate) fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Moves the cursor, refusing indices outside the playlist.
    pub(crate) fn set_current_index(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(idx) if idx >= self.tracks.len() => false,
            _ => {
                self.cursor = index;
                true
            }
        }
    }

    /// Advances to the next track, or past the end to no track at all.
    pub(crate) fn advance(&mut self) -> Option<usize> {
        let next = match self.cursor {
            None => 0,
            Some(idx) => idx + 1,
        };

        self.cursor = if next < self.tracks.len() {
            Some(next)
        } else {
            None
        };

        self.cursor
    }

    pub(crate) fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|idx| self.tracks.get(idx))
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub(crate) fn last(&self) -> Option<&Track> {
        self.tracks.last()
    }

    pub(crate) fn last_index(&self) -> Option<usize> {
        self.tracks.len().checked_sub(1)
    }

    pub(crate) fn is_last(&self, index: usize) -> bool {
        self.last_index() == Some(index)
    }

    pub(crate) fn find_by_id_mut(&mut self, sid: &str) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|track| track.sid == sid)
    }

    pub(crate) fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.tracks.iter().map(|track| track.url.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.tracks.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(ids: &[&str]) -> Playlist {
        Playlist::from_tracks(ids.iter().map(|id| Track::with_id(id)).collect())
    }

    #[test]
    fn from_tracks_preserves_order_without_cursor() {
        let list = playlist(&["a", "b", "c"]);

        let ids: Vec<&str> = list.tracks().iter().map(|t| t.sid.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(list.current_index(), None);
        assert!(list.current().is_none());
    }

    #[test]
    fn advance_runs_off_the_end() {
        let mut list = playlist(&["a", "b"]);

        assert_eq!(list.advance(), Some(0));
        assert_eq!(list.advance(), Some(1));
        assert!(list.is_last(1));
        assert_eq!(list.advance(), None);
        assert!(list.current().is_none());
    }

    #[test]
    fn append_keeps_cursor() {
        let mut list = playlist(&["a"]);
        list.advance();

        list.append(Track::with_id("b"));

        assert_eq!(list.len(), 2);
        assert_eq!(list.current_index(), Some(0));
        assert_eq!(list.current().unwrap().sid, "a");
        assert!(list.is_last(1));
        assert_eq!(list.advance(), Some(1));
    }

    #[test]
    fn clear_drops_tracks_and_cursor() {
        let mut list = playlist(&["a", "b"]);
        list.advance();
        list.advance();

        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.current_index(), None);
        assert!(list.current().is_none());
        assert!(!list.set_current_index(Some(0)));
        assert_eq!(list.advance(), None);
    }

    #[test]
    fn set_current_index_rejects_out_of_range() {
        let mut list = playlist(&["a", "b"]);

        assert!(list.set_current_index(Some(1)));
        assert!(!list.set_current_index(Some(2)));
        assert_eq!(list.current_index(), Some(1));
        assert!(list.set_current_index(None));
        assert_eq!(list.current_index(), None);
    }

    #[test]
    fn empty_playlist_has_no_last_track() {
        let mut list = Playlist::new();

        assert!(list.is_empty());
        assert_eq!(list.last_index(), None);
        assert!(!list.is_last(0));
        assert_eq!(list.advance(), None);
        assert!(list.urls().is_empty());
    }

    #[test]
    fn find_by_id_mut_matches_identity() {
        let mut list = playlist(&["a", "b"]);

        list.find_by_id_mut("b").unwrap().set_liked(true);

        assert!(!list.get(0).unwrap().liked());
        assert!(list.get(1).unwrap().liked());
        assert!(list.find_by_id_mut("z").is_none());
    }
}
