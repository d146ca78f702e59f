//! Interactive prompt utilities.

use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};

/// Get the default colorful theme.
fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

/// Prompt for text input.
pub fn input(prompt: &str) -> Result<String, dialoguer::Error> {
    Input::with_theme(&theme())
        .with_prompt(prompt)
        .interact_text()
}

/// Prompt for text input with a default value.
pub fn input_with_default(prompt: &str, default: &str) -> Result<String, dialoguer::Error> {
    Input::with_theme(&theme())
        .with_prompt(prompt)
        .default(default.to_string())
        .allow_empty(true)
        .interact_text()
}

/// Prompt for optional text input. Empty input yields an empty string.
pub fn input_optional(prompt: &str) -> Result<String, dialoguer::Error> {
    Input::with_theme(&theme())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
}

/// Prompt for a password (hidden input).
pub fn password(prompt: &str) -> Result<String, dialoguer::Error> {
    Password::with_theme(&theme())
        .with_prompt(prompt)
        .interact()
}

/// Prompt for confirmation (yes/no).
pub fn confirm(prompt: &str) -> Result<bool, dialoguer::Error> {
    Confirm::with_theme(&theme())
        .with_prompt(prompt)
        .default(false)
        .interact()
}

/// Use `value` when given, otherwise ask.
pub fn or_input(value: Option<String>, prompt: &str) -> Result<String, dialoguer::Error> {
    match value {
        Some(v) => Ok(v),
        None => input(prompt),
    }
}

/// Use `value` when given, otherwise ask and allow an empty answer.
pub fn or_optional(value: Option<String>, prompt: &str) -> Result<String, dialoguer::Error> {
    match value {
        Some(v) => Ok(v),
        None => input_optional(prompt),
    }
}
