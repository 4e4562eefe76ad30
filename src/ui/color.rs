//! Color, emoji, and formatting utilities for terminal output

use crate::core::constants::display;

pub struct Colors;

impl Colors {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const DIM: &'static str = "\x1b[2m";

    pub const RED: &'static str = "\x1b[31m";
    pub const GREEN: &'static str = "\x1b[32m";
    pub const YELLOW: &'static str = "\x1b[33m";
    pub const CYAN: &'static str = "\x1b[36m";

    pub const BRIGHT_GREEN: &'static str = "\x1b[92m";
    pub const BRIGHT_YELLOW: &'static str = "\x1b[93m";
    pub const BRIGHT_CYAN: &'static str = "\x1b[96m";
    pub const BRIGHT_WHITE: &'static str = "\x1b[97m";
}

/// Apply color to text if terminal supports it
pub fn colorize(text: &str, color: &str) -> String {
    if supports_formatting() {
        format!("{}{}{}", color, text, Colors::RESET)
    } else {
        text.to_string()
    }
}

/// Terminal capability detection
pub fn supports_formatting() -> bool {
    use std::env;
    use std::io::IsTerminal;

    if env::var("NO_COLOR").is_ok() || env::var("FORCE_COLOR").as_deref() == Ok("0") {
        return false;
    }

    if env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    // Disable formatting when running tests
    if cfg!(test) || env::var("RUST_TEST_TIME_UNIT").is_ok() {
        return false;
    }

    if !std::io::stdout().is_terminal() {
        return false;
    }

    match env::var("TERM") {
        Ok(term) if term == "dumb" || term.is_empty() => false,
        Ok(_) => true,
        // Windows consoles usually leave TERM unset
        Err(_) => cfg!(windows),
    }
}

/// Emoji when formatting is available, a plain marker otherwise
pub fn icon<'a>(emoji: &'a str, plain: &'a str) -> &'a str {
    if supports_formatting() { emoji } else { plain }
}

pub fn success(text: &str) -> String {
    format!(
        "{} {}",
        icon(display::SUCCESS_EMOJI, "[ok]"),
        colorize(text, Colors::GREEN)
    )
}

pub fn warning(text: &str) -> String {
    format!(
        "{} {}",
        icon(display::WARNING_EMOJI, "[warn]"),
        colorize(text, Colors::YELLOW)
    )
}

pub fn failure(text: &str) -> String {
    format!(
        "{} {}",
        icon(display::ERROR_EMOJI, "[error]"),
        colorize(text, Colors::RED)
    )
}

/// Header line for a numbered pipeline stage
pub fn stage_header(number: usize, title: &str) -> String {
    let label = format!("STEP {number}: {}", title.to_uppercase());
    format!(
        "{} {}",
        icon(display::STAGE_EMOJI, ">>"),
        colorize(&label, &format!("{}{}", Colors::BOLD, Colors::BRIGHT_CYAN))
    )
}

/// Full-width separator used around banners
pub fn rule() -> String {
    colorize(&"=".repeat(display::BANNER_WIDTH), Colors::DIM)
}
