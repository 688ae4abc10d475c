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

//! Time-bounded volume ramps.
//!
//! A fade is plain data; the controller samples it on every tick and pushes
//! the level to the engine.

use std::time::{Duration, Instant};

/// What to do with the engine once a fade completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FadeAction {
    None,
    Pause,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VolumeFade {
    from: u32,
    to: u32,
    started: Instant,
    duration: Duration,
    then: FadeAction,
}

impl VolumeFade {
    pub(crate) fn new(
        from: u32,
        to: u32,
        started: Instant,
        duration: Duration,
        then: FadeAction,
    ) -> Self {
        Self {
            from,
            to,
            started,
            duration,
            then,
        }
    }

    /// Linearly interpolated volume at `now`.
    pub(crate) fn level_at(&self, now: Instant) -> u32 {
        if self.duration.is_zero() {
            return self.to;
        }

        let elapsed = now.saturating_duration_since(self.started);
        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        let level = self.from as f64 + (self.to as f64 - self.from as f64) * t;

        level.round() as u32
    }

    pub(crate) fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }

    pub(crate) fn then(&self) -> FadeAction {
        self.then
    }

    pub(crate) fn is_fade_out(&self) -> bool {
        self.then == FadeAction::Pause
    }

    /// Changes the end level of a running fade.
    pub(crate) fn retarget(&mut self, to: u32) {
        self.to = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_interpolates_and_clamps() {
        let start = Instant::now();
        let fade = VolumeFade::new(0, 80, start, Duration::from_millis(1000), FadeAction::None);

        assert_eq!(fade.level_at(start), 0);
        assert_eq!(fade.level_at(start + Duration::from_millis(250)), 20);
        assert_eq!(fade.level_at(start + Duration::from_millis(500)), 40);
        assert_eq!(fade.level_at(start + Duration::from_secs(5)), 80);
        assert!(!fade.is_finished(start + Duration::from_millis(999)));
        assert!(fade.is_finished(start + Duration::from_millis(1000)));
    }

    #[test]
    fn fade_out_descends() {
        let start = Instant::now();
        let fade = VolumeFade::new(60, 0, start, Duration::from_millis(600), FadeAction::Pause);

        assert_eq!(fade.level_at(start + Duration::from_millis(300)), 30);
        assert!(fade.is_fade_out());
        assert_eq!(fade.then(), FadeAction::Pause);
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let start = Instant::now();
        let fade = VolumeFade::new(10, 70, start, Duration::ZERO, FadeAction::None);

        assert_eq!(fade.level_at(start), 70);
        assert!(fade.is_finished(start));
    }
}
