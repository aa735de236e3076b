use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::models::short_id;
use crate::models::timer::Timer;

pub const DEFAULT_SERVER_PORT: u16 = 8089;

/// Fields at these positions are the canonical "Points" and "Score" rows.
pub const RESERVED_FIELD_LABELS: [&str; 2] = ["Points", "Score"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Side::Home),
            "away" | "guest" | "guests" => Ok(Side::Away),
            other => Err(Error::Parse(format!("unknown side '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Team {
    pub title: String,
    pub subtitle: String,
    /// Path relative to the document root, or a `data:` URI.
    pub logo: String,
    /// 24-bit RGB.
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomField {
    pub id: String,
    pub label: String,
    pub home: u32,
    pub away: u32,
    pub visible: bool,
}

impl CustomField {
    pub fn new(label: &str) -> Self {
        Self {
            id: short_id(),
            label: label.to_string(),
            home: 0,
            away: 0,
            visible: true,
        }
    }

    pub fn value(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    pub fn value_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    /// Adds `delta`, flooring at zero.
    pub fn bump(&mut self, side: Side, delta: i64) -> u32 {
        let slot = self.value_mut(side);
        let next = (*slot as i64).saturating_add(delta).clamp(0, u32::MAX as i64);
        *slot = next as u32;
        *slot
    }
}

/// The whole scoreboard document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardState {
    pub server_port: u16,
    pub home: Team,
    pub away: Team,
    pub swap_sides: bool,
    pub show_scoreboard: bool,
    pub custom_fields: Vec<CustomField>,
    pub timers: Vec<Timer>,
}

impl Default for ScoreboardState {
    fn default() -> Self {
        Self::make_defaults()
    }
}

impl ScoreboardState {
    pub fn make_defaults() -> Self {
        let mut st = Self {
            server_port: DEFAULT_SERVER_PORT,
            home: Team::default(),
            away: Team::default(),
            swap_sides: false,
            show_scoreboard: true,
            custom_fields: Vec::new(),
            timers: Vec::new(),
        };
        st.ensure_invariants();
        st
    }

    /// Restores the structural guarantees: two reserved fields, a main timer,
    /// and an id on every field and timer.
    pub fn ensure_invariants(&mut self) {
        for (idx, label) in RESERVED_FIELD_LABELS.iter().enumerate() {
            if self.custom_fields.len() <= idx {
                self.custom_fields.push(CustomField::new(label));
            }
            let cf = &mut self.custom_fields[idx];
            if cf.label.is_empty() {
                cf.label = label.to_string();
            }
        }
        if self.timers.is_empty() {
            self.timers.push(Timer::main_default());
        }
        for cf in &mut self.custom_fields {
            if cf.id.is_empty() {
                cf.id = short_id();
            }
        }
        for t in &mut self.timers {
            if t.id.is_empty() {
                t.id = short_id();
            }
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    pub fn field_index(&self, id: &str) -> Option<usize> {
        self.custom_fields.iter().position(|f| f.id == id)
    }

    pub fn timer_index(&self, id: &str) -> Option<usize> {
        self.timers.iter().position(|t| t.id == id)
    }

    pub fn field_mut(&mut self, index: usize) -> Result<&mut CustomField, Error> {
        let len = self.custom_fields.len();
        self.custom_fields.get_mut(index).ok_or(Error::IndexOutOfRange {
            kind: "custom field",
            index,
            len,
        })
    }

    pub fn timer_mut(&mut self, index: usize) -> Result<&mut Timer, Error> {
        let len = self.timers.len();
        self.timers.get_mut(index).ok_or(Error::IndexOutOfRange {
            kind: "timer",
            index,
            len,
        })
    }

    /// Accounts every running timer. Returns true when anything moved.
    pub fn account_timers(&mut self, now_ms: i64) -> bool {
        let mut changed = false;
        for t in self.timers.iter_mut().filter(|t| t.running) {
            t.account_elapsed(now_ms);
            changed = true;
        }
        changed
    }
}

pub fn is_reserved_field(index: usize) -> bool {
    index < RESERVED_FIELD_LABELS.len()
}
