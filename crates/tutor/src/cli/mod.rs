//! Command implementations for the `tutor` binary.

pub mod ask;
pub mod chat;
pub mod config;

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
pub(crate) fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Stderr spinner shown while a service call is pending.
pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prompt theme: yellow `›` prompts, filled/hollow dots for selections.
pub(crate) fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("›".to_string()).for_stderr().yellow().bold(),
        active_item_prefix: style("●".to_string()).for_stderr().yellow(),
        inactive_item_prefix: style("○".to_string()).for_stderr().dim(),
        active_item_style: Style::new().for_stderr().bold(),
        values_style: Style::new().for_stderr().yellow(),
        ..ColorfulTheme::default()
    }
}

/// One-line heading with an underline rule, written to stderr.
pub(crate) fn print_header(title: &str) {
    let heading = header_text(title);
    let rule = "─".repeat(heading.chars().count());
    eprintln!();
    eprintln!("{}", style(&heading).for_stderr().bold());
    eprintln!("{}", style(rule).for_stderr().dim());
}

fn header_text(title: &str) -> String {
    format!("tutor {} · {title}", tutor_core::VERSION)
}
