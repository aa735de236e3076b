//! `plugin.json` <-> `ScoreboardState`.
//!
//! Reading is deliberately forgiving: every field falls back to its default
//! when missing or of the wrong JSON type, millisecond counters may be
//! strings or numbers, and older single-`timer` documents are upconverted.
//! Writing always produces the current shape with millisecond counters as
//! decimal strings.

use serde_json::{Map, Value, json};

use flyscore_common::error::Error;
use flyscore_common::models::scoreboard::DEFAULT_SERVER_PORT;
use flyscore_common::models::{CustomField, ScoreboardState, Team, Timer, TimerMode};

pub const SCHEMA_VERSION: i64 = 4;

pub fn to_document(state: &ScoreboardState) -> Value {
    let mut st = state.clone();
    st.ensure_invariants();

    json!({
        "version": SCHEMA_VERSION,
        "server": { "port": st.server_port },
        "home": team_to_json(&st.home),
        "away": team_to_json(&st.away),
        "swap_sides": st.swap_sides,
        "show_scoreboard": st.show_scoreboard,
        "custom_fields": st.custom_fields.iter().map(field_to_json).collect::<Vec<_>>(),
        "timers": st.timers.iter().map(timer_to_json).collect::<Vec<_>>(),
    })
}

pub fn from_document(doc: &Value) -> Result<ScoreboardState, Error> {
    let root = doc
        .as_object()
        .ok_or_else(|| Error::Parse("document root is not an object".into()))?;

    let server_port = root
        .get("server")
        .and_then(Value::as_object)
        .map(|srv| lenient_i64(srv.get("port"), DEFAULT_SERVER_PORT as i64))
        .and_then(|p| u16::try_from(p).ok())
        .filter(|p| *p != 0)
        .unwrap_or(DEFAULT_SERVER_PORT);

    let custom_fields = match root.get("custom_fields") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(field_from_json)
            .collect(),
        _ => Vec::new(),
    };

    let mut timers: Vec<Timer> = match root.get("timers") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(timer_from_json)
            .collect(),
        _ => legacy_timer(root).into_iter().collect(),
    };
    if timers.is_empty() {
        timers.push(Timer::main_default());
    }

    let mut st = ScoreboardState {
        server_port,
        home: team_from_json(root.get("home")),
        away: team_from_json(root.get("away")),
        swap_sides: bool_of(root, "swap_sides", false),
        show_scoreboard: bool_of(root, "show_scoreboard", true),
        custom_fields,
        timers,
    };
    st.ensure_invariants();
    Ok(st)
}

/// Older documents carried one `timer` object and a top-level `time_label`.
fn legacy_timer(root: &Map<String, Value>) -> Option<Timer> {
    let obj = root.get("timer").and_then(Value::as_object)?;
    if obj.is_empty() {
        return None;
    }
    let mut t = timer_from_json(obj);
    if t.label.is_empty() {
        t.label = str_of(root, "time_label");
    }
    if t.label.is_empty() {
        t.label = Timer::main_default().label;
    }
    Some(t)
}

fn team_to_json(team: &Team) -> Value {
    json!({
        "title": team.title,
        "subtitle": team.subtitle,
        "logo": team.logo,
        "color": (team.color & 0xFF_FFFF).to_string(),
    })
}

fn team_from_json(v: Option<&Value>) -> Team {
    let Some(o) = v.and_then(Value::as_object) else {
        return Team::default();
    };
    Team {
        title: str_of(o, "title"),
        subtitle: str_of(o, "subtitle"),
        logo: str_of(o, "logo"),
        color: o.get("color").and_then(parse_color).unwrap_or(0),
    }
}

fn field_to_json(cf: &CustomField) -> Value {
    json!({
        "id": cf.id,
        "label": cf.label,
        "home": cf.home,
        "away": cf.away,
        "visible": cf.visible,
    })
}

fn field_from_json(o: &Map<String, Value>) -> CustomField {
    CustomField {
        id: str_of(o, "id"),
        label: str_of(o, "label"),
        home: lenient_count(o.get("home")),
        away: lenient_count(o.get("away")),
        visible: bool_of(o, "visible", true),
    }
}

fn timer_to_json(t: &Timer) -> Value {
    json!({
        "id": t.id,
        "label": t.label,
        "mode": t.mode.as_str(),
        "running": t.running,
        "initial_ms": t.initial_ms.to_string(),
        "remaining_ms": t.remaining_ms.to_string(),
        "last_tick_ms": t.last_tick_ms.to_string(),
    })
}

fn timer_from_json(o: &Map<String, Value>) -> Timer {
    Timer {
        id: str_of(o, "id"),
        label: str_of(o, "label"),
        mode: o
            .get("mode")
            .and_then(Value::as_str)
            .and_then(|m| m.parse::<TimerMode>().ok())
            .unwrap_or_default(),
        running: bool_of(o, "running", false),
        initial_ms: lenient_i64(o.get("initial_ms"), 0),
        remaining_ms: lenient_i64(o.get("remaining_ms"), 0),
        last_tick_ms: lenient_i64(o.get("last_tick_ms"), 0),
    }
}

fn str_of(o: &Map<String, Value>, key: &str) -> String {
    o.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn bool_of(o: &Map<String, Value>, key: &str, default: bool) -> bool {
    o.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Integer from a JSON number or a decimal string.
fn lenient_i64(v: Option<&Value>, default: i64) -> i64 {
    match v {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(default),
        _ => default,
    }
}

fn lenient_count(v: Option<&Value>) -> u32 {
    lenient_i64(v, 0).clamp(0, u32::MAX as i64) as u32
}

/// `"0xRRGGBB"`, `"#RRGGBB"`, a decimal string, or a raw number.
pub fn parse_color(v: &Value) -> Option<u32> {
    let raw = match v {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => {
            let s = s.trim();
            if let Some(hex) = s
                .strip_prefix("0x")
                .or_else(|| s.strip_prefix("0X"))
                .or_else(|| s.strip_prefix('#'))
            {
                u64::from_str_radix(hex, 16).ok()?
            } else {
                s.parse::<u64>().ok()?
            }
        }
        _ => return None,
    };
    Some((raw & 0xFF_FFFF) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_accept_every_spelling() {
        assert_eq!(parse_color(&json!("0xFF8800")), Some(0xFF8800));
        assert_eq!(parse_color(&json!("#00ff00")), Some(0x00FF00));
        assert_eq!(parse_color(&json!("16711680")), Some(0xFF0000));
        assert_eq!(parse_color(&json!(255)), Some(0xFF));
        assert_eq!(parse_color(&json!("teal")), None);
        assert_eq!(parse_color(&json!(true)), None);
    }

    #[test]
    fn wrong_types_fall_back_to_defaults() {
        let doc = json!({
            "server": { "port": "not a port" },
            "home": "nope",
            "swap_sides": "yes",
            "show_scoreboard": 0,
            "custom_fields": [ 7, { "label": "Fouls", "home": "4", "away": -3 } ],
            "timers": [ { "label": "Clock", "mode": "sideways", "remaining_ms": 1500, "initial_ms": "x" } ],
        });
        let st = from_document(&doc).unwrap();
        assert_eq!(st.server_port, DEFAULT_SERVER_PORT);
        assert_eq!(st.home, Team::default());
        assert!(!st.swap_sides);
        assert!(st.show_scoreboard);
        assert_eq!(st.custom_fields[0].label, "Fouls");
        assert_eq!(st.custom_fields[0].home, 4);
        assert_eq!(st.custom_fields[0].away, 0);
        assert_eq!(st.custom_fields[1].label, "Score");
        assert_eq!(st.timers[0].mode, TimerMode::Countdown);
        assert_eq!(st.timers[0].remaining_ms, 1500);
        assert_eq!(st.timers[0].initial_ms, 0);
    }

    #[test]
    fn millisecond_counters_are_strings_on_disk() {
        let mut st = ScoreboardState::make_defaults();
        st.timers[0].last_tick_ms = (1_i64 << 53) + 1;
        let doc = to_document(&st);
        assert_eq!(doc["timers"][0]["last_tick_ms"], json!("9007199254740993"));
        assert_eq!(doc["version"], json!(SCHEMA_VERSION));
        assert_eq!(from_document(&doc).unwrap(), st);
    }

    #[test]
    fn non_object_root_is_a_parse_error() {
        assert!(matches!(from_document(&json!([1, 2])), Err(Error::Parse(_))));
    }
}
