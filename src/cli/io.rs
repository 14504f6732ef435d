use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::cli::core::CommandError;
use crate::cli::shell_context::CliMode;

/// In script mode, answers every confirmation with `yes` or `no` when set.
pub const CONFIRM_ENV: &str = "BASKET_BUDGET_CLI_CONFIRM";

/// Scripted answer taken from [`CONFIRM_ENV`], if it holds a recognised value.
pub fn scripted_answer() -> Option<bool> {
    let raw = std::env::var(CONFIRM_ENV).ok()?;
    parse_answer(&raw)
}

pub(crate) fn parse_answer(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Asks a yes/no question. Script mode never blocks: it uses the scripted answer or `default`.
pub fn confirm_action(
    mode: CliMode,
    theme: &ColorfulTheme,
    prompt: &str,
    default: bool,
) -> Result<bool, CommandError> {
    if mode == CliMode::Script {
        let answer = scripted_answer().unwrap_or(default);
        tracing::debug!(prompt, answer, "scripted confirmation");
        return Ok(answer);
    }
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(CommandError::from)
}
