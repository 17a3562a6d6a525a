//! Terminal output. Logs go to stderr via `tracing`; results go to stdout.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fmt::Display;

pub fn line(text: impl Display) {
    println!("{text}");
}

pub fn heading(text: impl Display) {
    println!();
    println!("== {text} ==");
}

/// Indented detail line, skipped when `value` is `None`.
pub fn field(label: &str, value: Option<&str>) {
    if let Some(value) = value {
        println!("   {label}: {value}");
    }
}

pub fn error(text: &str) {
    eprintln!("error: {text}");
}

/// Explicit empty-state message for a listing with no matches.
pub fn empty(what: &str) {
    println!("No {what} match your filters.");
}
