use serde_json::Value;

use flyscore_core::models::Side;
use flyscore_core::repositories::json::document::parse_color;
use flyscore_core::services::logo_service::{delete_logo_if_exists, logo_prefix, normalize_logo_ref};

use crate::TuiContext;

const USAGE: &str = "Usage: team <home|away> <title|subtitle|color|logo> <value|clear>";

pub fn handle_team_command(args: &[&str], ctx: &TuiContext) -> String {
    if args.len() < 2 {
        return USAGE.to_string();
    }
    let side: Side = match args[0].parse() {
        Ok(s) => s,
        Err(e) => return format!("{}\n{}", e, USAGE),
    };
    let value = args[2..].join(" ");
    let clear = value.eq_ignore_ascii_case("clear");

    match args[1] {
        "title" | "subtitle" => {
            let text = if clear { String::new() } else { value };
            let is_title = args[1] == "title";
            match ctx.scoreboard.edit_team(side, |t| {
                if is_title {
                    t.title = text;
                } else {
                    t.subtitle = text;
                }
            }) {
                Ok(t) => format!("{} {}: '{}' / '{}'", side, args[1], t.title, t.subtitle),
                Err(e) => format!("Error: {}", e),
            }
        }
        "color" => {
            let Some(color) = parse_color(&Value::String(value.clone())) else {
                return format!("Invalid color '{}' (use #RRGGBB, 0xRRGGBB or a decimal)", value);
            };
            match ctx.scoreboard.edit_team(side, |t| t.color = color) {
                Ok(t) => format!("{} color: #{:06X}", side, t.color),
                Err(e) => format!("Error: {}", e),
            }
        }
        "logo" => set_logo(ctx, side, &value, clear),
        other => format!("Unknown team property '{}'\n{}", other, USAGE),
    }
}

fn set_logo(ctx: &TuiContext, side: Side, value: &str, clear: bool) -> String {
    let old = ctx.scoreboard.snapshot().team(side).logo.clone();
    let new_ref = if clear {
        String::new()
    } else {
        match normalize_logo_ref(&ctx.doc_root, value, logo_prefix(side)) {
            Ok(r) => r,
            Err(e) => return format!("Error: {}", e),
        }
    };

    if let Err(e) = ctx.scoreboard.edit_team(side, |t| t.logo = new_ref.clone()) {
        return format!("Error: {}", e);
    }
    if !old.is_empty() && old != new_ref {
        delete_logo_if_exists(&ctx.doc_root, &old);
    }
    if new_ref.is_empty() {
        format!("{} logo cleared", side)
    } else {
        format!("{} logo: {}", side, new_ref)
    }
}
