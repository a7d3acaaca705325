//! Terminal output helpers shared by the commands.

use crossterm::style::Stylize;
use std::fmt::Display;

/// Width of the label column in `status`-style key/value output.
pub const LABEL_WIDTH: usize = 12;

/// Print a successful per-item result to stdout.
pub fn ok(subject: impl Display, detail: impl Display) {
    println!("  {} {}  {}", "✓".green(), subject, detail.to_string().dark_grey());
}

/// Print a failed per-item result to stderr.
pub fn failed(subject: impl Display, err: impl Display) {
    eprintln!("  {} {}  {}", "✗".red(), subject, err.to_string().red());
}

/// Print an aligned `label value` line.
pub fn field(label: &str, value: impl Display) {
    println!("{label:<LABEL_WIDTH$}{value}");
}

/// Print a dimmed section title followed by a blank line.
pub fn section(title: &str) {
    println!();
    println!("{}", title.dark_grey());
    println!();
}

/// Summary line for batch commands: `N done, M failed`.
pub fn summary(verb: &str, done: usize, failed: usize) -> String {
    if failed == 0 {
        format!("{done} {verb}")
    } else {
        format!("{done} {verb}, {failed} failed")
    }
}
