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

//! Blocking HTTP client for the radio playlist endpoint.
//!
//! Every operation is a GET against the same endpoint, distinguished by the
//! `type` query parameter. The service answers with a status code `r` and,
//! for most request types, a fresh list of songs.

use std::time::Duration;

use serde::Deserialize;

use crate::{
    config::ApiConfig,
    model::{Channel, Track},
    remote::RemoteError,
};

/// Request kinds understood by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
enum RequestType {
    New,
    Playing,
    Skip,
    Rate,
    Unrate,
    Bye,
}

impl RequestType {
    fn code(self) -> &'static str {
        match self {
            RequestType::New => "n",
            RequestType::Playing => "p",
            RequestType::Skip => "s",
            RequestType::Rate => "r",
            RequestType::Unrate => "u",
            RequestType::Bye => "b",
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlaylistResponse {
    #[serde(default)]
    r: i64,
    #[serde(default)]
    err: Option<String>,
    #[serde(default)]
    song: Vec<Track>,
}

/// Radio client backed by `ureq`.
pub(crate) struct RadioClient {
    http_client: ureq::Agent,
    api: ApiConfig,
}

impl RadioClient {
    pub(crate) fn new(api: &ApiConfig) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .build();
        Self {
            http_client,
            api: api.clone(),
        }
    }

    pub(crate) fn new_playlist(&self, channel: Channel) -> Result<Vec<Track>, RemoteError> {
        self.request(RequestType::New, channel, None)
    }

    pub(crate) fn playing_playlist(
        &self,
        channel: Channel,
        last_sid: &str,
    ) -> Result<Vec<Track>, RemoteError> {
        self.request(RequestType::Playing, channel, Some(last_sid))
    }

    pub(crate) fn skip(&self, channel: Channel, sid: &str) -> Result<(), RemoteError> {
        self.request(RequestType::Skip, channel, Some(sid)).map(|_| ())
    }

    pub(crate) fn rate(&self, channel: Channel, sid: &str, liked: bool) -> Result<(), RemoteError> {
        let kind = if liked {
            RequestType::Rate
        } else {
            RequestType::Unrate
        };
        self.request(kind, channel, Some(sid)).map(|_| ())
    }

    pub(crate) fn ban(&self, channel: Channel, sid: &str) -> Result<(), RemoteError> {
        self.request(RequestType::Bye, channel, Some(sid)).map(|_| ())
    }

    fn request(
        &self,
        kind: RequestType,
        channel: Channel,
        sid: Option<&str>,
    ) -> Result<Vec<Track>, RemoteError> {
        let url = self.request_url(kind, channel, sid);
        let body = self
            .http_client
            .get(&url)
            .call()
            .map_err(|err| RemoteError::Transport(format!("{} request: {err}", kind.code())))?
            .into_string()
            .map_err(|err| RemoteError::Transport(format!("{} response: {err}", kind.code())))?;

        parse_playlist(&body)
    }

    fn request_url(&self, kind: RequestType, channel: Channel, sid: Option<&str>) -> String {
        let mut params = vec![
            ("app_name", self.api.app_name.clone()),
            ("version", self.api.app_version.clone()),
            ("type", kind.code().to_string()),
            ("channel", channel.to_string()),
        ];
        if let Some(sid) = sid {
            params.push(("sid", sid.to_string()));
        }
        if let Some(auth) = &self.api.auth {
            params.push(("user_id", auth.user_id.clone()));
            params.push(("expire", auth.expire.clone()));
            params.push(("token", auth.token.clone()));
        }

        let query: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect();

        format!(
            "{}?{}",
            self.api.endpoint.trim().trim_end_matches('/'),
            query.join("&")
        )
    }
}

/// Decodes a playlist response body.
///
/// Songs without a stream URL cannot be played and are dropped.
fn parse_playlist(body: &str) -> Result<Vec<Track>, RemoteError> {
    let response: PlaylistResponse =
        serde_json::from_str(body).map_err(|err| RemoteError::Decode(err.to_string()))?;

    if response.r != 0 {
        let message = response
            .err
            .unwrap_or_else(|| format!("status {}", response.r));
        return Err(RemoteError::Api(message));
    }

    Ok(response
        .song
        .into_iter()
        .filter(|track| !track.url.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiAuth;

    fn api() -> ApiConfig {
        ApiConfig {
            endpoint: "https://radio.example/j/app/radio/people/".to_string(),
            app_name: "radio_desktop_win".to_string(),
            app_version: "100".to_string(),
            auth: None,
        }
    }

    #[test]
    fn request_url_encodes_parameters() {
        let client = RadioClient::new(&api());

        let url = client.request_url(RequestType::Playing, -3, Some("12 34"));

        assert_eq!(
            url,
            "https://radio.example/j/app/radio/people?app_name=radio_desktop_win\
             &version=100&type=p&channel=-3&sid=12%2034"
        );
    }

    #[test]
    fn request_url_carries_credentials() {
        let mut api = api();
        api.auth = Some(ApiAuth {
            user_id: "u1".to_string(),
            expire: "1700000000".to_string(),
            token: "abc".to_string(),
        });
        let client = RadioClient::new(&api);

        let url = client.request_url(RequestType::Unrate, 1, Some("9"));

        assert!(url.contains("type=u"));
        assert!(url.ends_with("&user_id=u1&expire=1700000000&token=abc"));
    }

    #[test]
    fn parse_playlist_keeps_order_and_drops_unplayable() {
        let body = r#"{"r":0,"song":[
            {"sid":"1","url":"https://a.example/1.mp3","title":"One"},
            {"sid":"2","url":"","title":"Advert","subtype":"T"},
            {"sid":"3","url":"https://a.example/3.mp3","title":"Three"}
        ]}"#;

        let tracks = parse_playlist(body).unwrap();

        let ids: Vec<&str> = tracks.iter().map(|t| t.sid.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn parse_playlist_reports_service_errors() {
        let result = parse_playlist(r#"{"r":1,"err":"invalid_token"}"#);

        assert_eq!(result, Err(RemoteError::Api("invalid_token".to_string())));
    }

    #[test]
    fn parse_playlist_rejects_garbage() {
        assert!(matches!(parse_playlist("<html>"), Err(RemoteError::Decode(_))));
    }

    #[test]
    fn boolean_responses_without_songs_succeed() {
        assert_eq!(parse_playlist(r#"{"r":0}"#), Ok(vec![]));
    }
}
