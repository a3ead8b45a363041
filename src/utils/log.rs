// src/utils/log.rs

//! Console output for the CLI.
//!
//! Diagnostics go through the `log` facade; this module prints the
//! user-facing lines (headers, result summaries, monitor ticks).

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};

/// Suppresses all console output (e.g. when printing JSON)
static QUIET: AtomicBool = AtomicBool::new(false);

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn enabled() -> bool {
    !QUIET.load(Ordering::Relaxed)
}

/// Prefix a message with a `[HH:MM:SS]` stamp.
pub fn stamped(at: DateTime<Local>, message: &str) -> String {
    format!("[{}] {}", at.format("%H:%M:%S"), message)
}

/// Print a plain line
pub fn line(message: &str) {
    if enabled() {
        println!("{}", message);
    }
}

/// Print a timestamped line
pub fn event(at: DateTime<Local>, message: &str) {
    if enabled() {
        println!("{}", stamped(at, message));
    }
}

/// Print a success line
pub fn success(message: &str) {
    if enabled() {
        println!("✓ {}", message);
    }
}

/// Print a warning line to stderr
pub fn warn(message: &str) {
    if enabled() {
        eprintln!("⚠ {}", message);
    }
}

/// Print a separator line
pub fn separator() {
    if enabled() {
        println!("{}", "─".repeat(60));
    }
}

/// Print a header
pub fn header(title: &str) {
    if enabled() {
        println!();
        println!("{}", "═".repeat(60));
        println!("  {}", title);
        println!("{}", "═".repeat(60));
    }
}

/// Print a sub-item (indented)
pub fn sub_item(message: &str) {
    if enabled() {
        println!("    {}", message);
    }
}

/// Print a key/value summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    if enabled() {
        println!();
        println!("[SUMMARY] {}", title);
        for (key, value) in items {
            println!("    {}: {}", key, value);
        }
    }
}
