//! Terminal rendering of engine events.

use pomodesk_core::{Event, Theme};
use std::io::Write;

/// Writes events either as JSON lines or as a single self-updating status
/// line colored with the active theme.
pub struct Renderer {
    json: bool,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn render(&self, event: &Event, theme: &Theme) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        if self.json {
            let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
            writeln!(out, "{line}")?;
            return out.flush();
        }

        match event {
            Event::StateSnapshot(snap) => {
                let status = if snap.running {
                    "running"
                } else if snap.paused {
                    "paused"
                } else {
                    "idle"
                };
                let time = paint(&snap.display, theme.time_color(snap.mode, snap.paused));
                write!(out, "\r\x1b[2K{time}  {}  [{status}]", snap.label)?;
            }
            Event::ModeSwitched { to, notify, .. } => {
                if *notify {
                    write!(out, "\x07")?;
                }
                writeln!(out, "\r\x1b[2K-> {to}")?;
            }
            Event::SessionLogged { record } => {
                writeln!(
                    out,
                    "\r\x1b[2Klogged {} session: {}:{:02}",
                    record.interval_type,
                    record.duration_seconds / 60,
                    record.duration_seconds % 60
                )?;
            }
            _ => {}
        }
        out.flush()
    }
}

/// Wrap `text` in a 24-bit foreground color escape, or leave it plain when
/// the color is not a `#rgb` / `#rrggbb` hex string.
fn paint(text: &str, color: &str) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
        None => text.to_string(),
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}
