use flyscore_core::services::hotkey_service::default_bindings;

use crate::TuiContext;

const USAGE: &str = "\
Usage:
  hotkey list                    bound keys
  hotkey actions                 every action id available right now
  hotkey bind <action> <keys>    e.g. hotkey bind field_0_home_inc Ctrl+Up
  hotkey unbind <action>
  hotkey run <action>
  hotkey press <keys>";

pub fn handle_hotkey_command(args: &[&str], ctx: &TuiContext) -> String {
    let Some(sub) = args.first() else {
        return USAGE.to_string();
    };
    let hk = &ctx.hotkeys;

    match *sub {
        "list" => {
            let bindings = hk.bindings();
            if bindings.is_empty() {
                return "No hotkeys bound.".to_string();
            }
            let mut out = String::from("Bound hotkeys:\n");
            for b in bindings {
                out.push_str(&format!("  {:<16} {:<34} {}\n", b.sequence, b.action_id, b.label));
            }
            out
        }
        "actions" => {
            let mut out = String::from("Available actions:\n");
            for b in default_bindings(&ctx.scoreboard.snapshot()) {
                out.push_str(&format!("  {:<34} {}\n", b.action_id, b.label));
            }
            out
        }
        "bind" => {
            if args.len() < 3 {
                return "Usage: hotkey bind <action> <keys>".to_string();
            }
            let keys = args[2..].join(" ");
            match hk.set_binding(args[1], &keys) {
                Ok(()) => format!("Bound '{}' to {}", keys, args[1]),
                Err(e) => format!("Error: {}", e),
            }
        }
        "unbind" => {
            let Some(action) = args.get(1) else {
                return "Usage: hotkey unbind <action>".to_string();
            };
            match hk.set_binding(action, "") {
                Ok(()) => format!("Unbound {}", action),
                Err(e) => format!("Error: {}", e),
            }
        }
        "run" => {
            let Some(action) = args.get(1) else {
                return "Usage: hotkey run <action>".to_string();
            };
            match hk.dispatch(action) {
                Ok(()) => format!("Ran {}", action),
                Err(e) => format!("Error: {}", e),
            }
        }
        "press" => {
            let keys = args[1..].join(" ");
            match hk.trigger(&keys) {
                Ok(Some(action)) => format!("{} -> {}", keys, action),
                Ok(None) => format!("Nothing bound to '{}'", keys),
                Err(e) => format!("Error: {}", e),
            }
        }
        other => format!("Unknown hotkey subcommand '{}'\n{}", other, USAGE),
    }
}
