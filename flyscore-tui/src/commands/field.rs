use flyscore_core::models::Side;
use flyscore_core::models::scoreboard::is_reserved_field;

use super::parse_index;
use crate::TuiContext;

const USAGE: &str = "\
Usage:
  field add <label>
  field remove <i>
  field rename <i> <label>
  field show <i> | field hide <i>
  field <i> <home|away> <+n|-n|=n>";

pub fn handle_field_command(args: &[&str], ctx: &TuiContext) -> String {
    let Some(sub) = args.first() else {
        return USAGE.to_string();
    };
    let sb = &ctx.scoreboard;

    match *sub {
        "add" => {
            let label = args[1..].join(" ");
            if label.is_empty() {
                return "Usage: field add <label>".to_string();
            }
            match sb.add_field(&label) {
                Ok(id) => format!("Added field '{}' (id {})", label, id),
                Err(e) => format!("Error: {}", e),
            }
        }
        "remove" => {
            let idx = match parse_index(args.get(1), "field") {
                Ok(i) => i,
                Err(msg) => return msg,
            };
            if is_reserved_field(idx) {
                return format!("Field {} is built in and cannot be removed", idx);
            }
            match sb.remove_field(idx) {
                Ok(f) => format!("Removed field '{}'", f.label),
                Err(e) => format!("Error: {}", e),
            }
        }
        "rename" => {
            let idx = match parse_index(args.get(1), "field") {
                Ok(i) => i,
                Err(msg) => return msg,
            };
            let label = args.get(2..).map(|a| a.join(" ")).unwrap_or_default();
            match sb.rename_field(idx, &label) {
                Ok(()) => format!("Field {} renamed to '{}'", idx, label),
                Err(e) => format!("Error: {}", e),
            }
        }
        "show" | "hide" => {
            let idx = match parse_index(args.get(1), "field") {
                Ok(i) => i,
                Err(msg) => return msg,
            };
            let visible = *sub == "show";
            match sb.set_field_visible(idx, visible) {
                Ok(()) => format!("Field {} {}", idx, if visible { "shown" } else { "hidden" }),
                Err(e) => format!("Error: {}", e),
            }
        }
        _ => adjust_value(args, ctx),
    }
}

/// `field <i> <side> <+n|-n|=n>`
fn adjust_value(args: &[&str], ctx: &TuiContext) -> String {
    if args.len() < 3 {
        return USAGE.to_string();
    }
    let idx = match parse_index(args.first(), "field") {
        Ok(i) => i,
        Err(msg) => return format!("{}\n{}", msg, USAGE),
    };
    let side: Side = match args[1].parse() {
        Ok(s) => s,
        Err(e) => return format!("Error: {}", e),
    };

    let op = args[2];
    let result = if let Some(abs) = op.strip_prefix('=') {
        match abs.parse::<u32>() {
            Ok(v) => ctx.scoreboard.set_field_value(idx, side, v).map(|_| v),
            Err(_) => return format!("Invalid value '{}'", abs),
        }
    } else {
        match op.parse::<i64>() {
            Ok(delta) => ctx.scoreboard.bump_field(idx, side, delta),
            Err(_) => return format!("Invalid step '{}' (use +n, -n or =n)", op),
        }
    };

    match result {
        Ok(v) => format!("Field {} {} = {}", idx, side, v),
        Err(e) => format!("Error: {}", e),
    }
}
