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

//! Terminal background colour control.
//!
//! Uses the OSC 11 and OSC 111 escape sequences, which most modern terminal
//! emulators (XTerm, iTerm2, Alacritty, Kitty) understand. Terminals that do
//! not simply ignore them.

use std::io::{self, Write};

use ratatui::style::Color;

use crate::theme::Theme;

/// Paints the whole terminal window with `colour`.
///
/// Non-RGB colours are ignored.
pub(crate) fn set_terminal_bg(colour: Color) -> io::Result<()> {
    match Theme::to_hex(colour) {
        Some(hex) => write_background(&mut io::stdout(), &hex),
        None => Ok(()),
    }
}

/// Reverts the background to the user's own terminal configuration.
pub(crate) fn reset_terminal_bg() -> io::Result<()> {
    write_reset(&mut io::stdout())
}

fn write_background(out: &mut impl Write, hex: &str) -> io::Result<()> {
    write!(out, "\x1b]11;{}\x07", hex)?;
    out.flush()
}

fn write_reset(out: &mut impl Write) -> io::Result<()> {
    write!(out, "\x1b]111\x07")?;
    out.flush()
}
