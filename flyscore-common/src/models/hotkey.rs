//! Hotkey action ids and their bindings.
//!
//! Action ids come in two shapes. The positional form
//! (`field_0_home_inc`, `timer_1_toggle`) is what older `hotkeys.json` files
//! contain and silently points at a different row once rows are removed.
//! The stable form (`field:<id>:home_inc`, `timer:<id>:toggle`) follows the
//! row itself. Both are accepted; new bindings are written in stable form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::scoreboard::Side;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyBinding {
    /// Action id, e.g. `toggle_swap` or `field:ab12cd34:home_inc`.
    #[serde(rename = "id")]
    pub action_id: String,
    #[serde(default)]
    pub label: String,
    /// Portable key-sequence text, empty when unassigned.
    #[serde(rename = "seq", default)]
    pub sequence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Index(usize),
    Id(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerVerb {
    Toggle,
    Start,
    Pause,
    Reset,
}

impl TimerVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerVerb::Toggle => "toggle",
            TimerVerb::Start => "start",
            TimerVerb::Pause => "pause",
            TimerVerb::Reset => "reset",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "toggle" => Some(TimerVerb::Toggle),
            "start" => Some(TimerVerb::Start),
            "pause" | "stop" => Some(TimerVerb::Pause),
            "reset" => Some(TimerVerb::Reset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    ToggleSwap,
    ToggleShow,
    Field {
        target: Target,
        side: Side,
        delta: i64,
    },
    Timer {
        target: Target,
        verb: TimerVerb,
    },
}

impl HotkeyAction {
    pub fn is_positional(&self) -> bool {
        matches!(
            self,
            HotkeyAction::Field { target: Target::Index(_), .. }
                | HotkeyAction::Timer { target: Target::Index(_), .. }
        )
    }
}

fn parse_side_step(side: &str, step: &str) -> Option<(Side, i64)> {
    let side = side.parse::<Side>().ok()?;
    let delta = match step {
        "inc" => 1,
        "dec" => -1,
        _ => return None,
    };
    Some((side, delta))
}

fn step_str(delta: i64) -> &'static str {
    if delta < 0 { "dec" } else { "inc" }
}

impl FromStr for HotkeyAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownAction(s.to_string());
        match s {
            "toggle_swap" => return Ok(HotkeyAction::ToggleSwap),
            "toggle_show" => return Ok(HotkeyAction::ToggleShow),
            _ => {}
        }

        // stable form: field:<id>:home_inc / timer:<id>:toggle
        if let Some(rest) = s.strip_prefix("field:") {
            let (id, tail) = rest.split_once(':').ok_or_else(unknown)?;
            let (side, step) = tail.split_once('_').ok_or_else(unknown)?;
            let (side, delta) = parse_side_step(side, step).ok_or_else(unknown)?;
            if id.is_empty() {
                return Err(unknown());
            }
            return Ok(HotkeyAction::Field { target: Target::Id(id.to_string()), side, delta });
        }
        if let Some(rest) = s.strip_prefix("timer:") {
            let (id, verb) = rest.split_once(':').ok_or_else(unknown)?;
            let verb = TimerVerb::parse(verb).ok_or_else(unknown)?;
            if id.is_empty() {
                return Err(unknown());
            }
            return Ok(HotkeyAction::Timer { target: Target::Id(id.to_string()), verb });
        }

        // positional form: field_0_home_inc / timer_1_toggle
        let parts: Vec<&str> = s.split('_').collect();
        match parts.as_slice() {
            ["field", idx, side, step] => {
                let index = idx.parse::<usize>().map_err(|_| unknown())?;
                let (side, delta) = parse_side_step(side, step).ok_or_else(unknown)?;
                Ok(HotkeyAction::Field { target: Target::Index(index), side, delta })
            }
            ["timer", idx, verb] => {
                let index = idx.parse::<usize>().map_err(|_| unknown())?;
                let verb = TimerVerb::parse(verb).ok_or_else(unknown)?;
                Ok(HotkeyAction::Timer { target: Target::Index(index), verb })
            }
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for HotkeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotkeyAction::ToggleSwap => f.write_str("toggle_swap"),
            HotkeyAction::ToggleShow => f.write_str("toggle_show"),
            HotkeyAction::Field { target: Target::Index(i), side, delta } => {
                write!(f, "field_{i}_{side}_{}", step_str(*delta))
            }
            HotkeyAction::Field { target: Target::Id(id), side, delta } => {
                write!(f, "field:{id}:{side}_{}", step_str(*delta))
            }
            HotkeyAction::Timer { target: Target::Index(i), verb } => {
                write!(f, "timer_{i}_{}", verb.as_str())
            }
            HotkeyAction::Timer { target: Target::Id(id), verb } => {
                write!(f, "timer:{id}:{}", verb.as_str())
            }
        }
    }
}
