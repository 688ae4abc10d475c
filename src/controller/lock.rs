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

//! The user control gate.
//!
//! While a mutating radio request is in flight the lock remembers which kind
//! of request holds it, and only that request's completion opens it again.

/// Requests that close the control gate until they complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LockHolder {
    NewPlaylist,
    Rate,
    Ban,
}

#[derive(Debug, Default)]
pub(crate) struct ControlLock {
    holder: Option<LockHolder>,
}

impl ControlLock {
    pub(crate) fn can_control(&self) -> bool {
        self.holder.is_none()
    }

    pub(crate) fn holder(&self) -> Option<LockHolder> {
        self.holder
    }

    /// Closes the gate for `holder`, returning whether `can_control` changed.
    ///
    /// A later locking request takes the gate over from an earlier one.
    pub(crate) fn acquire(&mut self, holder: LockHolder) -> bool {
        let was_open = self.can_control();
        self.holder = Some(holder);
        was_open
    }

    /// Opens the gate if `holder` is the request holding it, returning
    /// whether `can_control` changed.
    pub(crate) fn release(&mut self, holder: LockHolder) -> bool {
        if self.holder == Some(holder) {
            self.holder = None;
            true
        } else {
            false
        }
    }
}
