//! Terminal rendering for per-frame results.
//! Used by the stdout sink and `talkify replay`.

use crate::session::{PredictionResult, Status};

const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Shown in place of an emitted space so it is visible on the terminal.
const SPACE_MARK: char = '␣';

/// Clear the current terminal line.
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Return the ANSI color code for a classifier confidence.
fn confidence_color(confidence: f32) -> &'static str {
    if confidence >= 0.9 {
        GREEN
    } else if confidence >= 0.7 {
        "" // default terminal color
    } else if confidence >= 0.5 {
        YELLOW
    } else {
        RED
    }
}

fn status_color(status: &Status) -> &'static str {
    match status {
        Status::Searching(_) | Status::Buffering { .. } | Status::CoolingDown(_) => DIM,
        Status::ModelNotLoaded => RED,
        Status::WrongRole { .. } | Status::LowConfidence(_) => YELLOW,
        Status::Analyzing(c) => confidence_color(*c),
        Status::Stable(_) => GREEN,
    }
}

fn visible_text(text: &str) -> String {
    text.chars()
        .map(|c| if c == ' ' { SPACE_MARK } else { c })
        .collect()
}

/// Render one result as a single colored line.
///
/// Emitted text leads in bold; the status follows.
pub fn render_result(result: &PredictionResult) -> String {
    let color = status_color(&result.status);
    let status = if color.is_empty() {
        result.status.to_string()
    } else {
        format!("{color}{}{RESET}", result.status)
    };

    if result.has_text() {
        format!("{BOLD}{}{RESET}  {status}", visible_text(&result.text))
    } else {
        status
    }
}

/// Render the final transcript after a replay.
pub fn render_transcript(transcript: Option<&str>) -> String {
    match transcript {
        Some(text) => format!("{GREEN}{text}{RESET}"),
        None => format!("{DIM}(no text){RESET}"),
    }
}
