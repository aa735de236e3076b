// ================================================================
// File: flyscore-core/src/services/scoreboard_service.rs
// ================================================================
//
// The one gate every writer goes through. Dock buttons, hotkeys, console
// commands and the periodic timer flush all mutate the document here, under
// a single lock, and the save happens before the lock is released. Two
// writers in the same process therefore can never interleave their file
// writes.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use flyscore_common::error::Error;
use flyscore_common::models::scoreboard::is_reserved_field;
use flyscore_common::models::{CustomField, ScoreboardState, Side, Team, Timer, TimerMode};
use flyscore_common::traits::repository_traits::ScoreboardRepository;

use crate::clock::Clock;

pub struct ScoreboardService {
    state: Mutex<ScoreboardState>,
    repo: Arc<dyn ScoreboardRepository>,
    clock: Arc<dyn Clock>,
}

impl ScoreboardService {
    /// Loads the stored document, substituting defaults when it is missing
    /// or unreadable.
    pub fn new(repo: Arc<dyn ScoreboardRepository>, clock: Arc<dyn Clock>) -> Self {
        let state = Self::load_or_default(repo.as_ref());
        Self {
            state: Mutex::new(state),
            repo,
            clock,
        }
    }

    pub fn load_or_default(repo: &dyn ScoreboardRepository) -> ScoreboardState {
        match repo.load() {
            Ok(Some(st)) => st,
            Ok(None) => {
                info!("No scoreboard document yet; starting from defaults");
                ScoreboardState::make_defaults()
            }
            Err(e) => {
                warn!("Scoreboard document unreadable ({}); starting from defaults", e);
                ScoreboardState::make_defaults()
            }
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn snapshot(&self) -> ScoreboardState {
        self.state.lock().clone()
    }

    /// Replaces the in-memory copy with what is on disk.
    pub fn reload(&self) {
        let fresh = Self::load_or_default(self.repo.as_ref());
        *self.state.lock() = fresh;
    }

    /// Runs `f` against the document and saves the result.
    ///
    /// `f` receives the current time. If it returns an error it must not have
    /// changed anything; nothing is saved in that case. A failed save is
    /// logged and the in-memory state stays authoritative.
    pub fn update<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut ScoreboardState, i64) -> Result<T, Error>,
    {
        let now = self.clock.now_ms();
        let mut guard = self.state.lock();
        let out = f(&mut guard, now)?;
        self.persist(&guard);
        Ok(out)
    }

    fn persist(&self, st: &ScoreboardState) -> bool {
        match self.repo.save(st) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save scoreboard document: {}", e);
                false
            }
        }
    }

    /// Saves the current state and reports the outcome.
    pub fn save_now(&self) -> Result<(), Error> {
        let guard = self.state.lock();
        self.repo.save(&guard)
    }

    /// Flushes elapsed time into every running timer. Saves only when a
    /// timer actually moved.
    pub fn tick(&self) -> bool {
        let now = self.clock.now_ms();
        let mut guard = self.state.lock();
        if guard.account_timers(now) {
            self.persist(&guard);
            return true;
        }
        false
    }

    /// Rewrites the stored document with defaults and returns the state
    /// that was replaced, so the caller can clean up its logo files.
    pub fn reset_defaults(&self) -> ScoreboardState {
        let mut guard = self.state.lock();
        let fresh = match self.repo.reset_defaults() {
            Ok(st) => st,
            Err(e) => {
                warn!("Failed to reset scoreboard document: {}", e);
                ScoreboardState::make_defaults()
            }
        };
        info!("Scoreboard reset to defaults");
        std::mem::replace(&mut *guard, fresh)
    }

    // ---------------------------------------------------------------------
    // Teams and flags
    // ---------------------------------------------------------------------

    pub fn edit_team<F>(&self, side: Side, f: F) -> Result<Team, Error>
    where
        F: FnOnce(&mut Team),
    {
        self.update(|st, _| {
            let team = st.team_mut(side);
            f(team);
            team.color &= 0xFF_FFFF;
            debug!("Team {} updated", side);
            Ok(team.clone())
        })
    }

    pub fn set_swap_sides(&self, swap: bool) -> Result<(), Error> {
        self.update(|st, _| {
            st.swap_sides = swap;
            Ok(())
        })
    }

    pub fn toggle_swap(&self) -> Result<bool, Error> {
        self.update(|st, _| {
            st.swap_sides = !st.swap_sides;
            Ok(st.swap_sides)
        })
    }

    pub fn set_show_scoreboard(&self, show: bool) -> Result<(), Error> {
        self.update(|st, _| {
            st.show_scoreboard = show;
            Ok(())
        })
    }

    pub fn toggle_show(&self) -> Result<bool, Error> {
        self.update(|st, _| {
            st.show_scoreboard = !st.show_scoreboard;
            Ok(st.show_scoreboard)
        })
    }

    pub fn set_server_port(&self, port: u16) -> Result<(), Error> {
        self.update(|st, _| {
            st.server_port = port;
            Ok(())
        })
    }

    // ---------------------------------------------------------------------
    // Custom fields
    // ---------------------------------------------------------------------

    pub fn add_field(&self, label: &str) -> Result<String, Error> {
        self.update(|st, _| {
            let cf = CustomField::new(label);
            let id = cf.id.clone();
            st.custom_fields.push(cf);
            Ok(id)
        })
    }

    /// Removes a field; later rows shift down. The invariant pass only
    /// pads the list back to two rows, so removing a reserved row can hand
    /// its slot to the next one. Front ends refuse that (see
    /// `is_reserved_field`).
    pub fn remove_field(&self, index: usize) -> Result<CustomField, Error> {
        self.update(|st, _| {
            st.field_mut(index)?;
            if is_reserved_field(index) {
                warn!("Removing reserved custom field {}", index);
            }
            let removed = st.custom_fields.remove(index);
            st.ensure_invariants();
            Ok(removed)
        })
    }

    pub fn rename_field(&self, index: usize, label: &str) -> Result<(), Error> {
        self.update(|st, _| {
            st.field_mut(index)?.label = label.to_string();
            Ok(())
        })
    }

    pub fn set_field_visible(&self, index: usize, visible: bool) -> Result<(), Error> {
        self.update(|st, _| {
            st.field_mut(index)?.visible = visible;
            Ok(())
        })
    }

    pub fn bump_field(&self, index: usize, side: Side, delta: i64) -> Result<u32, Error> {
        self.update(|st, _| Ok(st.field_mut(index)?.bump(side, delta)))
    }

    pub fn set_field_value(&self, index: usize, side: Side, value: u32) -> Result<(), Error> {
        self.update(|st, _| {
            *st.field_mut(index)?.value_mut(side) = value;
            Ok(())
        })
    }

    pub fn field_index(&self, id: &str) -> Option<usize> {
        self.state.lock().field_index(id)
    }

    // ---------------------------------------------------------------------
    // Timers
    // ---------------------------------------------------------------------

    pub fn add_timer(&self, label: &str, mode: TimerMode, initial_ms: i64) -> Result<String, Error> {
        self.update(|st, _| {
            let t = Timer::new(label, mode, initial_ms);
            let id = t.id.clone();
            st.timers.push(t);
            Ok(id)
        })
    }

    /// Removes a timer; removing the last one leaves a fresh main timer.
    pub fn remove_timer(&self, index: usize) -> Result<Timer, Error> {
        self.update(|st, _| {
            st.timer_mut(index)?;
            let removed = st.timers.remove(index);
            st.ensure_invariants();
            Ok(removed)
        })
    }

    pub fn set_timer_label(&self, index: usize, label: &str) -> Result<(), Error> {
        self.update(|st, _| {
            st.timer_mut(index)?.label = label.to_string();
            Ok(())
        })
    }

    pub fn set_timer_mode(&self, index: usize, mode: TimerMode) -> Result<(), Error> {
        self.update(|st, now| {
            st.timer_mut(index)?.set_mode(mode, now);
            Ok(())
        })
    }

    pub fn start_timer(&self, index: usize) -> Result<(), Error> {
        self.update(|st, now| {
            st.timer_mut(index)?.start(now);
            Ok(())
        })
    }

    pub fn pause_timer(&self, index: usize) -> Result<(), Error> {
        self.update(|st, now| {
            st.timer_mut(index)?.pause(now);
            Ok(())
        })
    }

    /// Returns whether the timer is running afterwards.
    pub fn toggle_timer(&self, index: usize) -> Result<bool, Error> {
        self.update(|st, now| {
            let t = st.timer_mut(index)?;
            t.toggle(now);
            Ok(t.running)
        })
    }

    pub fn reset_timer(&self, index: usize) -> Result<(), Error> {
        self.update(|st, _| {
            st.timer_mut(index)?.reset();
            Ok(())
        })
    }

    /// Sets a stopped timer from `mm:ss` text.
    pub fn set_timer_display_time(&self, index: usize, text: &str) -> Result<(), Error> {
        self.update(|st, _| st.timer_mut(index)?.set_display_time(text, index))
    }

    /// Live `(label, ms)` for every timer, without touching the document.
    pub fn timer_readout(&self) -> Vec<(String, i64)> {
        let now = self.clock.now_ms();
        self.state
            .lock()
            .timers
            .iter()
            .map(|t| (t.label.clone(), t.display_ms(now)))
            .collect()
    }

    pub fn timer_index(&self, id: &str) -> Option<usize> {
        self.state.lock().timer_index(id)
    }
}
