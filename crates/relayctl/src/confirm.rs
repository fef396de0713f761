//! Interactive confirmation prompts.
//!
//! Uninstall demands a typed phrase; the port-conflict preflight uses a
//! lighter y/N prompt.

use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Phrase that must be typed before uninstall proceeds.
pub const UNINSTALL_CONFIRMATION: &str = "I CONFIRM (uninstall)";

pub fn is_affirmative(input: &str) -> bool {
    input.trim() == UNINSTALL_CONFIRMATION
}

pub fn is_yes(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("y")
}

/// Typed confirmation before irreversible removal.
pub fn prompt_typed_confirmation() -> Result<bool> {
    print!("Type {} to confirm: ", UNINSTALL_CONFIRMATION.red().bold());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(is_affirmative(&input))
}

/// Advisory y/N prompt, defaulting to no.
pub fn prompt_yes_no(question: &str) -> Result<bool> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(is_yes(&input))
}
