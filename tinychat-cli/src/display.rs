// SPDX-FileCopyrightText: 2026 TinyChat Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Display Helpers
//!
//! Styled terminal output.

use console::style;

/// Prints a success line.
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Prints an informational line.
pub fn info(message: &str) {
    println!("{} {}", style("ℹ").cyan(), message);
}

/// Prints a warning line.
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Prints an error line to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Prints a chat message.
pub fn chat_message(text: &str, client_time: i64) {
    println!("{} {}", style(format!("[{}]", client_time)).dim(), text);
}
