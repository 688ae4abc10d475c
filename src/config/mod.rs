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

//! Application configuration.
//!
//! This module manages the application configuration file.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::model::Channel;

const CONFIG_NAME: &str = "stationui";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    pub channel: Channel,
    pub volume: u32,
    pub fade_millis: u64,
    pub stale_minutes: u64,
    pub log_file: String,
    pub api: ApiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub app_name: String,
    pub app_version: String,
    pub auth: Option<ApiAuth>,
}

/// Session credentials, required by the service for rating and banning.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ApiAuth {
    pub user_id: String,
    pub expire: String,
    pub token: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            channel: 1,
            volume: 80,
            fade_millis: 1000,
            stale_minutes: 30,
            log_file: "stationui.log".to_string(),
            api: ApiConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.douban.com/j/app/radio/people".to_string(),
            app_name: "radio_desktop_win".to_string(),
            app_version: "100".to_string(),
            auth: None,
        }
    }
}

impl AppConfig {
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_millis)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_minutes * 60)
    }
}

/// Resolves the log file, relative paths are taken from the configuration
/// directory.
pub fn log_path(cfg: &AppConfig) -> Result<PathBuf, confy::ConfyError> {
    let path = PathBuf::from(&cfg.log_file);
    if path.is_absolute() {
        return Ok(path);
    }

    let config_file = confy::get_configuration_file_path(CONFIG_NAME, None)?;
    Ok(match config_file.parent() {
        Some(dir) => dir.join(path),
        None => path,
    })
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_default()
}

pub fn save_config(cfg: &AppConfig) -> Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, None, cfg)
}
