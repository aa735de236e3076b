// File: flyscore-tui/src/commands/mod.rs

use flyscore_common::error::Error;
use flyscore_core::services::logo_service::delete_logo_if_exists;

use crate::TuiContext;

mod field;
mod hotkey;
mod team;
mod timer;
mod view;

pub const HELP_TEXT: &str = "\
Commands:
  help
  show
  team    <home|away> <title|subtitle|color|logo> <value|clear>
  field   <add|remove|rename|show|hide> ...   |  field <i> <home|away> <+n|-n|=n>
  timer   <add|remove|label|mode|start|pause|toggle|reset|set> ...
  swap    [on|off]
  visible [on|off]
  server  [restart [port] | port <n>]
  hotkey  <list|actions|bind|unbind|run|press> ...
  reset
  quit
";

/// Runs one console line. Returns `(quit, output)`.
pub fn dispatch(line: &str, ctx: &TuiContext) -> (bool, Option<String>) {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let cmd = parts.first().map(|c| c.to_lowercase()).unwrap_or_default();
    let args = parts.get(1..).unwrap_or(&[]);

    match cmd.as_str() {
        "" => (false, None),
        "help" => (false, Some(HELP_TEXT.to_string())),
        "show" => (false, Some(view::render_state(ctx))),
        "team" => (false, Some(team::handle_team_command(args, ctx))),
        "field" => (false, Some(field::handle_field_command(args, ctx))),
        "timer" => (false, Some(timer::handle_timer_command(args, ctx))),
        "swap" => (false, Some(handle_flag(args, "Swap sides", |v| match v {
            Some(on) => ctx.scoreboard.set_swap_sides(on).map(|_| on),
            None => ctx.scoreboard.toggle_swap(),
        }))),
        "visible" => (false, Some(handle_flag(args, "Scoreboard visible", |v| match v {
            Some(on) => ctx.scoreboard.set_show_scoreboard(on).map(|_| on),
            None => ctx.scoreboard.toggle_show(),
        }))),
        "server" => (false, Some(view::handle_server_command(args, ctx))),
        "hotkey" => (false, Some(hotkey::handle_hotkey_command(args, ctx))),
        "reset" => (false, Some(handle_reset(ctx))),
        "quit" | "exit" => (true, Some("Shutting down...".to_string())),
        other => (false, Some(format!("Unknown command '{}'. Type 'help' for usage.", other))),
    }
}

fn handle_flag<F>(args: &[&str], what: &str, apply: F) -> String
where
    F: FnOnce(Option<bool>) -> Result<bool, Error>,
{
    let wanted = match args.first().map(|a| a.to_lowercase()) {
        None => None,
        Some(a) => match parse_on_off(&a) {
            Some(v) => Some(v),
            None => return format!("Expected 'on' or 'off', got '{}'", a),
        },
    };
    match apply(wanted) {
        Ok(v) => format!("{}: {}", what, if v { "on" } else { "off" }),
        Err(e) => format!("Error: {}", e),
    }
}

fn handle_reset(ctx: &TuiContext) -> String {
    let previous = ctx.scoreboard.reset_defaults();
    let mut removed = 0;
    for logo in [&previous.home.logo, &previous.away.logo] {
        if delete_logo_if_exists(&ctx.doc_root, logo) {
            removed += 1;
        }
    }
    format!("Scoreboard reset to defaults ({} logo file(s) removed).", removed)
}

pub(crate) fn parse_on_off(s: &str) -> Option<bool> {
    match s {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub(crate) fn parse_index(arg: Option<&&str>, what: &str) -> Result<usize, String> {
    let Some(raw) = arg else {
        return Err(format!("Missing {} index", what));
    };
    raw.parse::<usize>()
        .map_err(|_| format!("Invalid {} index '{}'", what, raw))
}
