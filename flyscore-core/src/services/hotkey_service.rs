// ================================================================
// File: flyscore-core/src/services/hotkey_service.rs
// ================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use flyscore_common::error::Error;
use flyscore_common::models::{
    HotkeyAction, HotkeyBinding, ScoreboardState, Side, Target, TimerVerb,
};
use flyscore_common::traits::repository_traits::HotkeyRepository;

use crate::services::scoreboard_service::ScoreboardService;

/// Every action the current scoreboard offers, in stable-id form, with
/// empty key sequences.
pub fn default_bindings(state: &ScoreboardState) -> Vec<HotkeyBinding> {
    let mut out = vec![
        binding(HotkeyAction::ToggleSwap, "Swap Home/Guests"),
        binding(HotkeyAction::ToggleShow, "Show/Hide Scoreboard"),
    ];
    for cf in &state.custom_fields {
        for (side, side_label) in [(Side::Home, "Home"), (Side::Away, "Guests")] {
            for (delta, step) in [(1, "+1"), (-1, "-1")] {
                out.push(binding(
                    HotkeyAction::Field { target: Target::Id(cf.id.clone()), side, delta },
                    &format!("{}: {} {}", cf.label, side_label, step),
                ));
            }
        }
    }
    for t in &state.timers {
        for (verb, verb_label) in [
            (TimerVerb::Toggle, "Start/Pause"),
            (TimerVerb::Reset, "Reset"),
        ] {
            out.push(binding(
                HotkeyAction::Timer { target: Target::Id(t.id.clone()), verb },
                &format!("{}: {}", t.label, verb_label),
            ));
        }
    }
    out
}

fn binding(action: HotkeyAction, label: &str) -> HotkeyBinding {
    HotkeyBinding {
        action_id: action.to_string(),
        label: label.to_string(),
        sequence: String::new(),
    }
}

/// Rewrites positional bindings (`field_2_home_inc`) to stable ids using
/// the rows currently at those positions. Returns how many were rewritten.
/// Bindings pointing past the end are left alone.
pub fn repair_bindings(bindings: &mut [HotkeyBinding], state: &ScoreboardState) -> usize {
    let mut repaired = 0;
    for b in bindings.iter_mut() {
        let Ok(action) = b.action_id.parse::<HotkeyAction>() else {
            continue;
        };
        let stable = match action {
            HotkeyAction::Field { target: Target::Index(i), side, delta } => state
                .custom_fields
                .get(i)
                .map(|cf| HotkeyAction::Field { target: Target::Id(cf.id.clone()), side, delta }),
            HotkeyAction::Timer { target: Target::Index(i), verb } => state
                .timers
                .get(i)
                .map(|t| HotkeyAction::Timer { target: Target::Id(t.id.clone()), verb }),
            _ => continue,
        };
        match stable {
            Some(a) => {
                debug!("Hotkey '{}' now bound to '{}'", b.action_id, a);
                b.action_id = a.to_string();
                repaired += 1;
            }
            None => warn!("Hotkey '{}' points at a row that no longer exists", b.action_id),
        }
    }
    repaired
}

fn resolve(target: &Target, kind: &'static str, len: usize, by_id: Option<usize>) -> Result<usize, Error> {
    match target {
        Target::Index(i) if *i < len => Ok(*i),
        Target::Index(i) => Err(Error::IndexOutOfRange { kind, index: *i, len }),
        Target::Id(id) => by_id.ok_or_else(|| Error::NotFound(format!("{kind} '{id}'"))),
    }
}

/// Applies `action` to the scoreboard inside its write gate.
pub fn apply_action(scoreboard: &ScoreboardService, action: &HotkeyAction) -> Result<(), Error> {
    scoreboard.update(|st, now| {
        match action {
            HotkeyAction::ToggleSwap => st.swap_sides = !st.swap_sides,
            HotkeyAction::ToggleShow => st.show_scoreboard = !st.show_scoreboard,
            HotkeyAction::Field { target, side, delta } => {
                let by_id = match target {
                    Target::Id(id) => st.field_index(id),
                    Target::Index(_) => None,
                };
                let idx = resolve(target, "custom field", st.custom_fields.len(), by_id)?;
                st.custom_fields[idx].bump(*side, *delta);
            }
            HotkeyAction::Timer { target, verb } => {
                let by_id = match target {
                    Target::Id(id) => st.timer_index(id),
                    Target::Index(_) => None,
                };
                let idx = resolve(target, "timer", st.timers.len(), by_id)?;
                let t = &mut st.timers[idx];
                match verb {
                    TimerVerb::Toggle => t.toggle(now),
                    TimerVerb::Start => t.start(now),
                    TimerVerb::Pause => t.pause(now),
                    TimerVerb::Reset => t.reset(),
                }
            }
        }
        Ok(())
    })
}

/// Key bindings persisted in `hotkeys.json`, dispatched into the scoreboard.
pub struct HotkeyService {
    repo: Arc<dyn HotkeyRepository>,
    scoreboard: Arc<ScoreboardService>,
    bindings: Mutex<Vec<HotkeyBinding>>,
}

impl HotkeyService {
    /// Loads bindings and migrates positional ones to stable ids.
    pub fn new(repo: Arc<dyn HotkeyRepository>, scoreboard: Arc<ScoreboardService>) -> Self {
        let mut bindings = match repo.load_bindings() {
            Ok(b) => b,
            Err(e) => {
                warn!("Ignoring unreadable hotkey bindings: {}", e);
                Vec::new()
            }
        };
        let repaired = repair_bindings(&mut bindings, &scoreboard.snapshot());
        if repaired > 0 {
            info!("Migrated {} index-based hotkey bindings to stable ids", repaired);
            if let Err(e) = repo.save_bindings(&bindings) {
                warn!("Failed to save migrated hotkey bindings: {}", e);
            }
        }
        Self {
            repo,
            scoreboard,
            bindings: Mutex::new(bindings),
        }
    }

    pub fn bindings(&self) -> Vec<HotkeyBinding> {
        self.bindings.lock().clone()
    }

    /// Assigns `sequence` to `action_id`, replacing any previous binding of
    /// that action. An empty sequence clears it.
    pub fn set_binding(&self, action_id: &str, sequence: &str) -> Result<(), Error> {
        let action: HotkeyAction = action_id.parse()?;
        let mut canonical = action.to_string();
        let mut label = String::new();
        if action.is_positional() {
            let st = self.scoreboard.snapshot();
            let mut one = [binding(action, "")];
            repair_bindings(&mut one, &st);
            canonical = one[0].action_id.clone();
        }
        if let Some(b) = default_bindings(&self.scoreboard.snapshot())
            .into_iter()
            .find(|b| b.action_id == canonical)
        {
            label = b.label;
        }

        let mut guard = self.bindings.lock();
        guard.retain(|b| b.action_id != canonical);
        if !sequence.trim().is_empty() {
            guard.push(HotkeyBinding {
                action_id: canonical,
                label,
                sequence: sequence.trim().to_string(),
            });
        }
        self.repo.save_bindings(&guard)
    }

    pub fn dispatch(&self, action_id: &str) -> Result<(), Error> {
        let action: HotkeyAction = action_id.parse()?;
        info!("Hotkey action: {}", action_id);
        apply_action(&self.scoreboard, &action)
    }

    /// Runs the action bound to `sequence`, if any, and returns its id.
    /// Blank presses never match, and neither do unassigned rows.
    pub fn trigger(&self, sequence: &str) -> Result<Option<String>, Error> {
        let sequence = sequence.trim();
        if sequence.is_empty() {
            return Ok(None);
        }
        let found = self
            .bindings
            .lock()
            .iter()
            .find(|b| {
                let bound = b.sequence.trim();
                !bound.is_empty() && bound.eq_ignore_ascii_case(sequence)
            })
            .map(|b| b.action_id.clone());
        match found {
            Some(id) => {
                self.dispatch(&id)?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }
}
