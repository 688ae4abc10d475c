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

//! Domain models and core data structures.
//!
//! This module defines the central entities of the application, the remotely
//! resolved [`Track`] and the ordered [`playlist::Playlist`] that the playback
//! controller plays from.

pub(crate) mod playlist;

use serde::{Deserialize, Deserializer, de};

/// Opaque station identifier.
pub(crate) type Channel = i32;

/// One streamable song as delivered by the radio service.
///
/// Everything except the liked flag is fixed once received.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct Track {
    #[serde(deserialize_with = "string_or_number")]
    pub(crate) sid: String,
    #[serde(default)]
    pub(crate) url: String,
    #[serde(default)]
    pub(crate) artist: String,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default, rename = "albumtitle")]
    pub(crate) album: String,
    #[serde(default)]
    pub(crate) public_time: String,
    #[serde(default)]
    pub(crate) company: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub(crate) kbps: String,
    #[serde(default)]
    pub(crate) subtype: String,
    #[serde(default, rename = "like", deserialize_with = "flag")]
    liked: bool,
}

impl Track {
    pub(crate) fn liked(&self) -> bool {
        self.liked
    }

    pub(crate) fn set_liked(&mut self, liked: bool) {
        self.liked = liked;
    }

    #[cfg(test)]
    pub(crate) fn with_id(sid: &str) -> Self {
        Self {
            sid: sid.to_string(),
            url: format!("https://radio.example/{sid}.mp3"),
            title: format!("Song {sid}"),
            ..Self::default()
        }
    }
}

// The service is inconsistent about quoting ids and bitrates.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

// Accepts `0`/`1`, `true`/`false` and their quoted forms.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
        serde_json::Value::String(s) => Ok(matches!(s.as_str(), "1" | "true")),
        serde_json::Value::Null => Ok(false),
        other => Err(de::Error::custom(format!("expected flag, found {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_accepts_numeric_ids_and_flags() {
        let json = r#"{
            "sid": 1394471,
            "url": "https://mr3.example/p1394471.mp3",
            "artist": "Faye Wong",
            "title": "Red Bean",
            "albumtitle": "Scenery",
            "public_time": "1998",
            "company": "EMI",
            "kbps": 64,
            "subtype": "",
            "like": 1
        }"#;

        let track: Track = serde_json::from_str(json).unwrap();

        assert_eq!(track.sid, "1394471");
        assert_eq!(track.kbps, "64");
        assert_eq!(track.album, "Scenery");
        assert!(track.liked());
    }

    #[test]
    fn track_defaults_missing_metadata() {
        let track: Track = serde_json::from_str(r#"{"sid": "42", "like": "0"}"#).unwrap();

        assert_eq!(track.sid, "42");
        assert!(track.url.is_empty());
        assert!(!track.liked());
    }
}
