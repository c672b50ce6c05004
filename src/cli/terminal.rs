//! Terminal capability detection and output helpers

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use insure::view::Table;
use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Bold, for table headers
    fn header(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn header(&self) -> String {
        if supports_color() {
            self.bold().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn header(&self) -> String {
        self.as_str().header()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}

/// Runs `f` while a spinner shows that a request is in flight.
///
/// The spinner draws to stderr and stays hidden when stderr is not a
/// terminal.
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner().with_message(message.to_string());
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = f();
    spinner.finish_and_clear();
    result
}

/// Lays out a table with padded columns, clipping lines to the terminal
/// width.
pub fn render_table(table: &Table) -> String {
    render_table_with_width(table, terminal_width().map(usize::from))
}

fn render_table_with_width(table: &Table, max_width: Option<usize>) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let layout = |cells: Vec<&str>| -> String {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        let line = line.trim_end();
        match max_width {
            Some(max) if line.chars().count() > max => line.chars().take(max).collect(),
            _ => line.to_string(),
        }
    };

    let mut lines = vec![layout(table.headers.to_vec()).header()];
    lines.extend(
        table
            .rows
            .iter()
            .map(|row| layout(row.iter().map(String::as_str).collect())),
    );
    lines.join("\n")
}
