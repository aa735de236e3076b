use std::fmt::Write as _;

use flyscore_core::models::Side;
use flyscore_core::models::timer::format_mmss;

use crate::TuiContext;

pub fn render_state(ctx: &TuiContext) -> String {
    let st = ctx.scoreboard.snapshot();
    let now = ctx.scoreboard.now_ms();
    let mut out = String::new();

    for side in [Side::Home, Side::Away] {
        let t = st.team(side);
        let _ = writeln!(
            out,
            "{:<5} {:<24} {:<16} #{:06X} {}",
            side,
            t.title,
            t.subtitle,
            t.color,
            if t.logo.is_empty() { "-" } else { t.logo.as_str() }
        );
    }
    let _ = writeln!(
        out,
        "swap_sides={} show_scoreboard={}",
        st.swap_sides, st.show_scoreboard
    );

    out.push_str("Fields:\n");
    for (i, f) in st.custom_fields.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{}] {:<8} {:<16} {:>4} : {:<4}{}",
            i,
            f.id,
            f.label,
            f.home,
            f.away,
            if f.visible { "" } else { " (hidden)" }
        );
    }

    out.push_str("Timers:\n");
    for (i, t) in st.timers.iter().enumerate() {
        let _ = writeln!(
            out,
            "  [{}] {:<8} {:<16} {:<9} {:>7} {}",
            i,
            t.id,
            t.label,
            t.mode,
            format_mmss(t.display_ms(now)),
            if t.running { "running" } else { "stopped" }
        );
    }
    out
}

pub fn handle_server_command(args: &[&str], ctx: &TuiContext) -> String {
    let stored = ctx.scoreboard.snapshot().server_port;
    match args {
        [] => {
            let port = ctx.server.port();
            if port == 0 {
                format!(
                    "Document server is not running (root {}, preferred port {}). Try 'server restart'.",
                    ctx.doc_root.display(),
                    stored
                )
            } else {
                format!(
                    "Serving {} on http://127.0.0.1:{}/overlay/ (preferred port {}, health: {})",
                    ctx.doc_root.display(),
                    port,
                    stored,
                    if ctx.server.is_healthy() { "ok" } else { "unreachable" }
                )
            }
        }
        ["restart"] => restart_server(ctx, stored),
        ["restart", raw] => match parse_port(raw) {
            Some(p) => restart_server(ctx, p),
            None => format!("Invalid port '{}'", raw),
        },
        ["port", raw] => match parse_port(raw) {
            Some(p) => match ctx.scoreboard.set_server_port(p) {
                Ok(()) => format!("Preferred port set to {} (used on next restart)", p),
                Err(e) => format!("Error: {}", e),
            },
            None => format!("Invalid port '{}'", raw),
        },
        _ => "Usage: server [restart [port] | port <n>]".to_string(),
    }
}

fn restart_server(ctx: &TuiContext, preferred: u16) -> String {
    let bound = ctx.server.restart(preferred);
    if bound == 0 {
        return format!(
            "Document server could not bind a port from {}; it is stopped",
            preferred
        );
    }
    if let Err(e) = ctx.scoreboard.set_server_port(bound) {
        return format!("Restarted on port {} but could not store it: {}", bound, e);
    }
    if bound == preferred {
        format!("Document server restarted on port {}", bound)
    } else {
        format!(
            "Document server restarted on port {} ({} was busy)",
            bound, preferred
        )
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.parse::<u16>().ok().filter(|p| *p != 0)
}
