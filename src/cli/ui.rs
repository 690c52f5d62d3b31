use crate::core::fortune::{FortuneLevel, MAX_SCORE};
use crate::core::history::HistoryTrend;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Highlight,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Highlight => style(text).magenta().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders a 1..=5 score as filled and empty stars, rounding to the nearest star.
pub fn stars(score: f64) -> String {
    let max = MAX_SCORE as usize;
    let filled = (score.round().max(0.0) as usize).min(max);
    format!("{}{}", "★".repeat(filled), "☆".repeat(max - filled))
}

fn level_color(level: FortuneLevel) -> Color {
    match level {
        FortuneLevel::Excellent | FortuneLevel::Good => Color::Green,
        FortuneLevel::Average => Color::Yellow,
        FortuneLevel::Poor | FortuneLevel::Bad => Color::Red,
    }
}

fn score_color(score: f64) -> Color {
    level_color(FortuneLevel::from_score(score))
}

/// Creates a right-aligned score cell colored by its fortune level.
pub fn score_cell(score: f64) -> Cell {
    Cell::new(format!("{score:.1}"))
        .fg(score_color(score))
        .set_alignment(CellAlignment::Right)
}

pub fn stars_cell(score: f64) -> Cell {
    Cell::new(stars(score)).fg(score_color(score))
}

pub fn level_cell(level: FortuneLevel) -> Cell {
    Cell::new(level.to_string()).fg(level_color(level))
}

/// Creates a cell for a history trend with an arrow and color coding.
pub fn trend_cell(trend: HistoryTrend) -> Cell {
    let (text, color) = match trend {
        HistoryTrend::Rising => ("↑ rising", Color::Green),
        HistoryTrend::Stable => ("→ stable", Color::Yellow),
        HistoryTrend::Falling => ("↓ falling", Color::Red),
        HistoryTrend::InsufficientData => ("not enough data", Color::DarkGrey),
    };
    Cell::new(text).fg(color)
}

/// Creates a spinner shown while waiting on a remote call.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.magenta} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}
