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

//! # Internet Radio TUI.
//!
//! A terminal-based player for a personalised internet radio service.
//!
//! This application coordinates a TUI frontend built with `ratatui`, an MPV
//! audio engine and an HTTP client for the radio service.
//!
//! It uses an event-driven architecture where:
//!
//! * The **Main Thread** manages the terminal lifecycle, UI rendering and the
//!   playback controller.
//! * **Background Workers** drive MPV and perform blocking radio service
//!   requests.
//! * **Event Loops** capture user input and system ticks to drive volume fades
//!   and the UI state.
//!
//! ## Architecture
//!
//! The application follows a strict setup-run-teardown pattern to ensure the
//! terminal state is preserved even in the event of a crash. Communication
//! between the main thread and background workers is handled via
//! `std::sync::mpsc` channels.

mod config;
mod controller;
mod events;
mod logging;
mod model;
mod player;
mod remote;
mod render;
mod theme;
mod util;

use anyhow::{Context, Result};
use crossterm::{
    event::{self},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, widgets::TableState};
use std::{
    io::{self},
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Duration,
};
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    controller::{PlaybackController, PlaybackSettings},
    events::{AppEvent, process_events},
    player::AudioPlayer,
    remote::RadioService,
    theme::Theme,
};

// Fades are sampled on every tick, so this also bounds their smoothness.
const TICK_INTERVAL: Duration = Duration::from_millis(50);

type Controller = PlaybackController<AudioPlayer, RadioService, Sender<AppEvent>>;

/// Application state.
struct App {
    pub config: AppConfig,

    pub theme: Theme,

    pub event_tx: Sender<AppEvent>,
    pub event_rx: Receiver<AppEvent>,

    pub controller: Controller,

    pub status: Option<String>,
    pub playlist_state: TableState,
}

impl App {
    /// Create a new instance of application state.
    pub fn new(config: AppConfig) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel();

        let audio_player = AudioPlayer::new(event_tx.clone())?;
        let radio_service = RadioService::new(&config.api, event_tx.clone());
        let settings = PlaybackSettings::from(&config);

        Ok(Self {
            controller: PlaybackController::new(
                audio_player,
                radio_service,
                event_tx.clone(),
                settings,
            ),
            config,
            theme: Theme::default(),
            event_tx,
            event_rx,
            status: None,
            playlist_state: TableState::default(),
        })
    }
}

/// The entry point of the application.
///
/// Sets up logging and the communication channels, initializes the
/// application state, manages the terminal lifecycle, and returns an error if
/// any part of the execution fails.
fn main() -> Result<()> {
    let config = config::load_config();

    let log_path = config::log_path(&config).context("Failed to locate log file")?;
    logging::init(&log_path)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting");

    let mut app = App::new(config).context("Failed to initalise application")?;

    let mut terminal = setup_terminal(&app)?;
    let res = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal);

    app.config.volume = app.controller.target_volume();
    if let Err(e) = config::save_config(&app.config) {
        warn!(error = %e, "Failed to save configuration");
    }

    res.context("Application error occurred")
}

/// Prepares the terminal for the TUI application.
///
/// This function performs the following side effects:
/// * Sets the terminal background color based on the provided theme.
/// * Enables raw mode to capture all keyboard input.
/// * Switches the terminal to the alternate screen buffer.
///
/// # Errors
///
/// Returns an error if raw mode cannot be enabled or if the alternate screen
/// cannot be entered.
fn setup_terminal(app: &App) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Set the background of the entire terminal window, without this we'd get
    // a thin black outline
    util::term::set_terminal_bg(app.theme.background_colour).ok();

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// Best-effort, errors are ignored.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    util::term::reset_terminal_bg().ok();
    terminal.show_cursor().ok();
}

/// Starts the input and tick threads, tunes in and enters the main event
/// loop.
///
/// The MPV and radio service workers were already spawned by [`App::new`].
///
/// # Errors
///
/// Returns an error if the event processing loop encounters an unrecoverable
/// application error.
fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Spawn a thread to translate raw key events to application events.
    let tx_keys = app.event_tx.clone();
    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(event::Event::Key(key)) => {
                    if tx_keys.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let _ = tx_keys.send(AppEvent::FatalError(format!("Terminal input failed: {e}")));
                    break;
                }
            }
        }
    });

    // Spawn a thread to send a periodic tick application event, this drives
    // volume fades and is the minimum "frame rate" for rendering.
    let tx_tick = app.event_tx.clone();
    thread::spawn(move || {
        while tx_tick.send(AppEvent::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    // Tune in to the last channel, this fetches the first playlist
    let channel = app.config.channel;
    app.controller
        .set_channel(channel)
        .context("Failed to request the first playlist")?;

    // Application event loop, process events until the user quits
    process_events(terminal, app)
}
