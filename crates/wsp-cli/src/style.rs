//! Visual styling utilities for the CLI.
//!
//! This module provides consistent styling across all CLI output including:
//! - Progress bars for history walks and dumps
//! - Color thresholds for weather values
//! - Table formatting

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::cli::StyleMode;

// ============================================================================
// Progress Indicators
// ============================================================================

/// Standard spinner tick interval
const SPINNER_TICK_MS: u64 = 80;

/// Standard progress bar characters
const PROGRESS_CHARS: &str = "###";

/// Get the standard progress bar style.
pub fn progress_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS)
}

/// Create a progress bar for reading `total` history records.
pub fn history_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(progress_bar_style());
    pb.set_message("Reading history...");
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

/// Create a progress bar for dumping `total` bytes.
pub fn dump_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars(PROGRESS_CHARS),
    );
    pb.set_message("Dumping memory...");
    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    pb
}

// ============================================================================
// Color Thresholds
// ============================================================================

/// Humidity thresholds (percentage) for comfort.
pub mod humidity {
    pub const LOW: u8 = 30; // Yellow: < 30% (too dry)
    pub const HIGH: u8 = 70; // Yellow: > 70% (too humid)
}

/// Temperature thresholds (Celsius).
pub mod temperature {
    pub const FREEZING: f32 = 0.0; // Blue: below freezing
    pub const WARM: f32 = 26.0; // Orange: > 26°C
}

// ============================================================================
// Colored Value Formatting
// ============================================================================

/// Format humidity percentage with appropriate color.
pub fn format_humidity_colored(percent: u8, no_color: bool) -> String {
    if no_color {
        return format!("{}%", percent);
    }

    if !(humidity::LOW..=humidity::HIGH).contains(&percent) {
        format!("{}%", percent.yellow())
    } else {
        format!("{}%", percent.green())
    }
}

/// Format temperature with appropriate color.
pub fn format_temp_colored(celsius: f32, no_color: bool) -> String {
    let formatted = format!("{:.1} C", celsius);
    if no_color {
        return formatted;
    }

    if celsius < temperature::FREEZING {
        format!("{}", formatted.cyan())
    } else if celsius > temperature::WARM {
        // Orange color (RGB: 255, 165, 0)
        format!("{}", formatted.truecolor(255, 165, 0))
    } else {
        format!("{}", formatted.green())
    }
}

/// Format an alarm state.
pub fn format_enabled(enabled: bool, no_color: bool) -> String {
    let label = if enabled { "Enabled" } else { "Disabled" };
    if no_color {
        label.to_string()
    } else if enabled {
        format!("{}", label.green())
    } else {
        format!("{}", label.dimmed())
    }
}

/// Format a warning message.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[!!] {}", message)
    } else {
        format!("{} {}", "[!!]".yellow(), message)
    }
}

/// Format a success message.
pub fn format_success(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[OK] {}", message)
    } else {
        format!("{} {}", "[OK]".green(), message)
    }
}

// ============================================================================
// Section Headers
// ============================================================================

/// Format a section header.
pub fn format_section(title: &str, no_color: bool) -> String {
    if no_color {
        format!("{}:", title)
    } else {
        format!("{}:", title.bold())
    }
}

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    if no_color {
        format!("{}\n{}", title, "━".repeat(title.chars().count()))
    } else {
        format!(
            "{}\n{}",
            title.bold(),
            "━".repeat(title.chars().count()).dimmed()
        )
    }
}

/// Get terminal width, defaulting to 80 if detection fails.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Apply table style based on StyleMode.
pub fn apply_table_style(table: &mut tabled::Table, style: StyleMode) {
    use tabled::settings::Style;
    match style {
        StyleMode::Rich => {
            table.with(Style::rounded());
        }
        StyleMode::Minimal => {
            table.with(Style::psql());
        }
        StyleMode::Plain => {
            table.with(Style::blank());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humidity_no_color() {
        assert_eq!(format_humidity_colored(55, true), "55%");
    }

    #[test]
    fn test_temp_no_color() {
        assert_eq!(format_temp_colored(-3.4, true), "-3.4 C");
        assert_eq!(format_temp_colored(21.0, true), "21.0 C");
    }

    #[test]
    fn test_temp_colored_keeps_value() {
        assert!(format_temp_colored(30.0, false).contains("30.0 C"));
    }

    #[test]
    fn test_enabled_no_color() {
        assert_eq!(format_enabled(true, true), "Enabled");
        assert_eq!(format_enabled(false, true), "Disabled");
    }

    #[test]
    fn test_title_underline_matches_length() {
        let title = format_title("Station", true);
        assert_eq!(title, "Station\n━━━━━━━");
    }
}
