//! Timer records and the accounting rules that keep `remaining_ms` current.
//!
//! Nothing here ticks on its own. Elapsed time is folded into a timer only
//! when somebody asks: on start/pause, on a display refresh, or on a periodic
//! flush. Every entry point takes the current epoch-millisecond time so the
//! rules can be driven by a fake clock.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Error;
use crate::models::short_id;

static MMSS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)\s*:\s*([0-5]\d)\s*$").expect("static mm:ss pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerMode {
    #[default]
    Countdown,
    Countup,
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Countdown => "countdown",
            TimerMode::Countup => "countup",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "countdown" | "down" => Ok(TimerMode::Countdown),
            "countup" | "up" => Ok(TimerMode::Countup),
            other => Err(Error::Parse(format!("unknown timer mode '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    /// Stable identifier; survives reordering of the timer list.
    pub id: String,
    pub label: String,
    pub mode: TimerMode,
    pub running: bool,
    pub initial_ms: i64,
    /// Counts down to 0 in countdown mode, grows without bound in countup.
    /// Negative means "never initialized".
    pub remaining_ms: i64,
    /// Epoch ms of the last accounting checkpoint, 0 when stopped/reset.
    pub last_tick_ms: i64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new("", TimerMode::Countdown, 0)
    }
}

impl Timer {
    pub fn new(label: &str, mode: TimerMode, initial_ms: i64) -> Self {
        Self {
            id: short_id(),
            label: label.to_string(),
            mode,
            running: false,
            initial_ms,
            remaining_ms: initial_ms.max(0),
            last_tick_ms: 0,
        }
    }

    /// The timer every scoreboard starts with in slot 0.
    pub fn main_default() -> Self {
        Self::new("First Half", TimerMode::Countdown, 0)
    }

    /// Folds the time since the last checkpoint into `remaining_ms`.
    ///
    /// Countdown timers clamp at zero and stop themselves when they get there.
    pub fn account_elapsed(&mut self, now_ms: i64) {
        if !self.running {
            return;
        }
        let elapsed = now_ms.saturating_sub(self.last_tick_ms).max(0);
        match self.mode {
            TimerMode::Countdown => {
                self.remaining_ms = self.remaining_ms.saturating_sub(elapsed).max(0);
                if self.remaining_ms == 0 {
                    self.running = false;
                }
            }
            TimerMode::Countup => {
                self.remaining_ms = self.remaining_ms.saturating_add(elapsed);
            }
        }
        self.last_tick_ms = now_ms;
    }

    pub fn start(&mut self, now_ms: i64) {
        if self.running {
            return;
        }
        if self.remaining_ms < 0 {
            self.remaining_ms = match self.mode {
                TimerMode::Countdown => self.initial_ms.max(0),
                TimerMode::Countup => 0,
            };
        }
        self.last_tick_ms = now_ms;
        self.running = true;
    }

    pub fn pause(&mut self, now_ms: i64) {
        if !self.running {
            return;
        }
        self.account_elapsed(now_ms);
        self.running = false;
    }

    pub fn toggle(&mut self, now_ms: i64) {
        if self.running {
            self.pause(now_ms);
        } else {
            self.start(now_ms);
        }
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.last_tick_ms = 0;
        self.remaining_ms = self.initial_ms.max(0);
    }

    /// Applies a manually typed `mm:ss` value to a stopped timer.
    ///
    /// Leaves the timer untouched on any error.
    pub fn set_display_time(&mut self, text: &str, index: usize) -> Result<(), Error> {
        if self.running {
            return Err(Error::TimerRunning(index));
        }
        let ms = parse_mmss(text)?;
        self.initial_ms = ms;
        self.remaining_ms = ms;
        Ok(())
    }

    /// Switches mode on a stopped timer. Running timers are flushed first so
    /// the time already counted stays attributed to the old mode.
    pub fn set_mode(&mut self, mode: TimerMode, now_ms: i64) {
        if self.mode == mode {
            return;
        }
        self.account_elapsed(now_ms);
        self.mode = mode;
        if self.running {
            self.last_tick_ms = now_ms;
        }
    }

    /// Live value for display, without moving the checkpoint.
    pub fn display_ms(&self, now_ms: i64) -> i64 {
        let base = self.remaining_ms.max(0);
        if !self.running || self.last_tick_ms == 0 {
            return base;
        }
        let elapsed = now_ms.saturating_sub(self.last_tick_ms).max(0);
        match self.mode {
            TimerMode::Countdown => base.saturating_sub(elapsed).max(0),
            TimerMode::Countup => base.saturating_add(elapsed),
        }
    }
}

/// Parses `mm:ss` (minutes unbounded, seconds 00-59) into milliseconds.
pub fn parse_mmss(text: &str) -> Result<i64, Error> {
    let caps = MMSS_RE
        .captures(text)
        .ok_or_else(|| Error::InvalidFormat(text.to_string()))?;
    let minutes: i64 = caps[1]
        .parse()
        .map_err(|_| Error::InvalidFormat(text.to_string()))?;
    let seconds: i64 = caps[2]
        .parse()
        .map_err(|_| Error::InvalidFormat(text.to_string()))?;
    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .and_then(|s| s.checked_mul(1000))
        .ok_or_else(|| Error::InvalidFormat(text.to_string()))
}

pub fn format_mmss(ms: i64) -> String {
    let total = ms.max(0) / 1000;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countdown(initial_ms: i64) -> Timer {
        Timer::new("t", TimerMode::Countdown, initial_ms)
    }

    #[test]
    fn countdown_clamps_at_zero_and_stops() {
        for (remaining, elapsed) in [(1_000, 1_000), (1_000, 5_000), (0, 1), (250, i64::MAX / 2)] {
            let mut t = countdown(remaining);
            t.start(1_000);
            t.account_elapsed(1_000 + elapsed);
            assert_eq!(t.remaining_ms, 0, "R={remaining} E={elapsed}");
            assert!(!t.running);
        }
    }

    #[test]
    fn countup_never_decreases() {
        let mut t = Timer::new("up", TimerMode::Countup, 0);
        t.start(10_000);
        let mut last = t.remaining_ms;
        for now in [10_000, 10_500, 10_500, 12_000, 60_000] {
            t.account_elapsed(now);
            assert!(t.remaining_ms >= last);
            last = t.remaining_ms;
        }
        assert_eq!(t.remaining_ms, 50_000);
        assert!(t.running);
    }

    #[test]
    fn clock_going_backwards_counts_as_zero_elapsed() {
        let mut t = countdown(10_000);
        t.start(5_000);
        t.account_elapsed(4_000);
        assert_eq!(t.remaining_ms, 10_000);
        assert_eq!(t.last_tick_ms, 4_000);
    }

    #[test]
    fn start_then_pause_after_five_seconds() {
        let mut t = countdown(10_000);
        t.start(100_000);
        t.pause(105_000);
        assert_eq!(t.remaining_ms, 5_000);
        assert!(!t.running);
    }

    #[test]
    fn start_initializes_negative_remaining() {
        let mut down = countdown(30_000);
        down.remaining_ms = -1;
        down.start(1);
        assert_eq!(down.remaining_ms, 30_000);

        let mut up = Timer::new("up", TimerMode::Countup, 30_000);
        up.remaining_ms = -5;
        up.start(1);
        assert_eq!(up.remaining_ms, 0);
    }

    #[test]
    fn start_while_running_keeps_checkpoint() {
        let mut t = countdown(10_000);
        t.start(1_000);
        t.start(3_000);
        assert_eq!(t.last_tick_ms, 1_000);
    }

    #[test]
    fn reset_restores_initial() {
        let mut t = countdown(60_000);
        t.start(0);
        t.account_elapsed(20_000);
        t.reset();
        assert_eq!(t.remaining_ms, 60_000);
        assert_eq!(t.last_tick_ms, 0);
        assert!(!t.running);
    }

    #[test]
    fn invalid_seconds_leave_timer_unchanged() {
        let mut t = countdown(90_000);
        let before = t.clone();
        let err = t.set_display_time("12:75", 0).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
        assert_eq!(t, before);
    }

    #[test]
    fn display_time_rejected_while_running() {
        let mut t = countdown(90_000);
        t.start(0);
        let before = t.clone();
        assert!(matches!(t.set_display_time("01:00", 3), Err(Error::TimerRunning(3))));
        assert_eq!(t, before);
    }

    #[test]
    fn display_time_sets_initial_and_remaining() {
        let mut t = countdown(0);
        t.set_display_time(" 45 : 07 ", 0).unwrap();
        assert_eq!(t.initial_ms, (45 * 60 + 7) * 1000);
        assert_eq!(t.remaining_ms, t.initial_ms);
    }

    #[test]
    fn mmss_parsing() {
        assert_eq!(parse_mmss("0:00").unwrap(), 0);
        assert_eq!(parse_mmss("120:59").unwrap(), (120 * 60 + 59) * 1000);
        for bad in ["", "5", "5:7", "5:60", "-1:00", "aa:bb", "1:2:3"] {
            assert!(parse_mmss(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn display_ms_does_not_mutate() {
        let mut t = countdown(10_000);
        t.start(1_000);
        assert_eq!(t.display_ms(4_000), 7_000);
        assert_eq!(t.display_ms(50_000), 0);
        assert_eq!(t.remaining_ms, 10_000);
        assert_eq!(format_mmss(t.display_ms(4_000)), "0:07");
        assert_eq!(format_mmss(-5), "0:00");
        assert_eq!(format_mmss(3_723_000), "62:03");
    }

    #[test]
    fn mode_switch_flushes_running_time() {
        let mut t = countdown(10_000);
        t.start(0);
        t.set_mode(TimerMode::Countup, 4_000);
        assert_eq!(t.remaining_ms, 6_000);
        assert!(t.running);
        t.account_elapsed(5_000);
        assert_eq!(t.remaining_ms, 7_000);
    }
}
