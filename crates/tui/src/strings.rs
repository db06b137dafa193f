// Centralized UI strings and labels. ASCII-friendly by default.

use unicode_width::UnicodeWidthStr;

// Role prefixes for the transcript
pub const PREFIX_USER: &str = "| ";
pub const PREFIX_ASSISTANT: &str = "> ";
pub const PREFIX_INFO: &str = "* ";
pub const PREFIX_ERROR: &str = "! ";

pub const INPUT_HINT: &str = "Ask a follow-up, Enter to send / Ctrl+G to generate a routine";

// UI block titles (keep surrounding spaces for visual padding)
pub const TITLE_CATALOG: &str = " Products ";
pub const TITLE_CHAT: &str = " Routine Chat ";
pub const TITLE_INPUT: &str = " Input ";
pub const TITLE_CATEGORY: &str = " Category ";
pub const TITLE_HELP: &str = " Help / Shortcuts ";

pub const WELCOME: &str =
    "Welcome to glow. Pick products on the left, then Ctrl+G for an AM/PM routine.";

pub const LOADING_MESSAGE: &str = "Thinking...";

pub const ADVISORY_EMPTY_SELECTION: &str =
    "Select at least one product before generating a routine.";

pub const ERROR_EXCHANGE: &str = "The assistant could not be reached. Please try again.";

pub const ERROR_NOT_CONFIGURED: &str =
    "Assistant endpoint not configured. Set GLOW_ENDPOINT or add one to config.toml.";

pub fn catalog_error_line(detail: &str) -> String {
    format!("Could not load the product catalog ({}). Browsing an empty catalog.", detail)
}

pub const CATEGORY_ALL: &str = "All categories";

pub fn category_label(category: Option<&str>) -> String {
    match category {
        Some(c) => c.to_string(),
        None => "All".to_string(),
    }
}

// Build the status bar line with width-aware compaction: state segments
// first, then hints in order of importance while space allows.
pub fn build_status_line(
    busy: bool,
    focus: &str,
    dir: &str,
    category: Option<&str>,
    matches: usize,
    total: usize,
    selected: usize,
    max_width: u16,
) -> String {
    let mut segments: Vec<String> = Vec::new();
    segments.push(format!(
        "[{}][{}][{}]",
        if busy { "Busy" } else { "Idle" },
        focus,
        dir
    ));
    segments.push(format!("Cat:{}", category_label(category)));
    segments.push(format!("Match:{}/{}", matches, total));
    segments.push(format!("Sel:{}", selected));
    let hints: [&str; 6] = [
        "Ctrl+G: routine",
        "Enter: select/send",
        "Tab: focus",
        "F3: category",
        "F4: mirror",
        "F1: help",
    ];
    for h in hints {
        segments.push(h.to_string());
    }

    let sep = "  |  ";
    let mut out = String::new();
    let mut used = 0usize;
    for (i, seg) in segments.iter().enumerate() {
        let segw = UnicodeWidthStr::width(seg.as_str());
        let addw = segw
            + if i == 0 {
                0
            } else {
                UnicodeWidthStr::width(sep)
            };
        if used + addw > max_width as usize {
            break;
        }
        if i > 0 {
            out.push_str(sep);
            used += UnicodeWidthStr::width(sep);
        }
        out.push_str(seg);
        used += segw;
    }
    out
}

// ASCII help lines content; UI maps to styled lines.
pub fn help_lines_ascii() -> &'static [&'static str] {
    &[
        "Basic",
        "  Tab: Cycle focus    Esc/Ctrl-C: Quit    F1: This panel",
        "Products pane",
        "  Type: Live search    Backspace: Edit search    Up/Down: Move",
        "  Enter: Select/deselect    Right: Show/hide details    F3: Category picker",
        "  Mouse click: Select/deselect row",
        "Selected pane",
        "  Up/Down: Move    Delete or X: Remove from selection",
        "Chat",
        "  Ctrl+G: Generate AM/PM routine from selection",
        "  Input focus + Enter: Send follow-up    PgUp/PgDn: Scroll transcript",
        "Layout",
        "  F4: Mirror panes left<->right (resets on restart)",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_respects_the_width_budget() {
        let full = build_status_line(true, "Input", "LTR", Some("serum"), 3, 12, 2, 200);
        assert!(full.starts_with("[Busy][Input][LTR]"));
        assert!(full.contains("Cat:serum"));
        assert!(full.contains("Match:3/12"));

        let narrow = build_status_line(false, "Products", "RTL", None, 0, 0, 0, 24);
        assert!(UnicodeWidthStr::width(narrow.as_str()) <= 24);
        assert!(narrow.starts_with("[Idle]"));
    }
}
