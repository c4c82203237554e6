/// Plain-text rendering of a board view for the terminal

use crate::board::BoardView;

pub const NOTHING_SCHEDULED: &str = "Nothing scheduled";

pub fn render(view: &BoardView) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(current) = view.selection.current_show() {
        lines.push("Now Playing".to_string());
        lines.push(format!("  {}", current.name));
        if !current.hosts.is_empty() {
            lines.push(format!("  with {}", current.hosts));
        }
        if let Some(text) = &view.current_countdown {
            lines.push(format!("  {}", text));
        }
        if !current.poster.is_empty() {
            lines.push(format!("  poster: {}", current.poster));
        }
    }

    if let Some(next) = view.selection.next_show() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Up next".to_string());
        lines.push(format!("  {}", next.name));
        if let Some(text) = &view.next_countdown {
            lines.push(format!("  {}", text));
        }
        // The next show's poster only takes the stage when nothing is on
        if view.selection.current.is_none() && !next.poster.is_empty() {
            lines.push(format!("  poster: {}", next.poster));
        }
    }

    if lines.is_empty() {
        return NOTHING_SCHEDULED.to_string();
    }
    lines.join("\n")
}
