use flyscore_core::models::TimerMode;
use flyscore_core::models::timer::{format_mmss, parse_mmss};

use super::parse_index;
use crate::TuiContext;

const USAGE: &str = "\
Usage:
  timer add <label> [countdown|countup] [mm:ss]
  timer remove <i>
  timer label <i> <text>
  timer mode <i> <countdown|countup>
  timer <start|pause|toggle|reset> <i>
  timer set <i> <mm:ss>";

pub fn handle_timer_command(args: &[&str], ctx: &TuiContext) -> String {
    let Some(sub) = args.first() else {
        return USAGE.to_string();
    };
    if *sub == "add" {
        return add_timer(&args[1..], ctx);
    }

    let idx = match parse_index(args.get(1), "timer") {
        Ok(i) => i,
        Err(msg) => return format!("{}\n{}", msg, USAGE),
    };
    let sb = &ctx.scoreboard;

    let result = match *sub {
        "remove" => sb.remove_timer(idx).map(|t| format!("Removed timer '{}'", t.label)),
        "label" => {
            let label = args.get(2..).map(|a| a.join(" ")).unwrap_or_default();
            sb.set_timer_label(idx, &label)
                .map(|_| format!("Timer {} renamed to '{}'", idx, label))
        }
        "mode" => {
            let Some(raw) = args.get(2) else {
                return "Usage: timer mode <i> <countdown|countup>".to_string();
            };
            match raw.parse::<TimerMode>() {
                Ok(mode) => sb
                    .set_timer_mode(idx, mode)
                    .map(|_| format!("Timer {} mode: {}", idx, mode)),
                Err(e) => Err(e),
            }
        }
        "start" => sb.start_timer(idx).map(|_| format!("Timer {} started", idx)),
        "pause" | "stop" => sb.pause_timer(idx).map(|_| format!("Timer {} paused", idx)),
        "toggle" => sb.toggle_timer(idx).map(|running| {
            format!("Timer {} {}", idx, if running { "started" } else { "paused" })
        }),
        "reset" => sb.reset_timer(idx).map(|_| format!("Timer {} reset", idx)),
        "set" => {
            let Some(text) = args.get(2) else {
                return "Usage: timer set <i> <mm:ss>".to_string();
            };
            sb.set_timer_display_time(idx, text)
                .map(|_| format!("Timer {} set to {}", idx, text))
        }
        other => return format!("Unknown timer subcommand '{}'\n{}", other, USAGE),
    };

    result.unwrap_or_else(|e| format!("Error: {}", e))
}

fn add_timer(args: &[&str], ctx: &TuiContext) -> String {
    let mut mode = TimerMode::Countdown;
    let mut initial_ms = 0;
    let mut label_parts = Vec::new();

    for arg in args {
        if let Ok(m) = arg.parse::<TimerMode>() {
            mode = m;
        } else if let Ok(ms) = parse_mmss(arg) {
            initial_ms = ms;
        } else {
            label_parts.push(*arg);
        }
    }
    let label = label_parts.join(" ");
    if label.is_empty() {
        return "Usage: timer add <label> [countdown|countup] [mm:ss]".to_string();
    }

    match ctx.scoreboard.add_timer(&label, mode, initial_ms) {
        Ok(id) => format!(
            "Added {} timer '{}' at {} (id {})",
            mode,
            label,
            format_mmss(initial_ms),
            id
        ),
        Err(e) => format!("Error: {}", e),
    }
}
