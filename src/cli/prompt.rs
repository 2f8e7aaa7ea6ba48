//! Interactive prompts.
//!
//! Every prompt that can be abandoned returns `Ok(None)` when the user
//! cancels it: Esc or `q` in a menu, or an empty answer to a text prompt.
//! Cancelling returns control to the enclosing menu; it never reaches the
//! core.

use std::fmt::Display;

use dialoguer::{Confirm, Input, MultiSelect, Password, Select, theme::ColorfulTheme};

/// Pick one item from a menu. `None` if the menu is empty or cancelled.
pub fn select<T: Display>(prompt: &str, items: &[T]) -> anyhow::Result<Option<usize>> {
    if items.is_empty() {
        return Ok(None);
    }
    let theme = ColorfulTheme::default();
    Ok(Select::with_theme(&theme)
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact_opt()?)
}

/// Pick any number of items. `None` if cancelled.
pub fn multi_select<T: Display>(prompt: &str, items: &[T]) -> anyhow::Result<Option<Vec<usize>>> {
    if items.is_empty() {
        return Ok(Some(Vec::new()));
    }
    let theme = ColorfulTheme::default();
    Ok(MultiSelect::with_theme(&theme)
        .with_prompt(prompt)
        .items(items)
        .interact_opt()?)
}

/// Read a line of text. `None` if left blank.
pub fn text(prompt: &str) -> anyhow::Result<Option<String>> {
    let theme = ColorfulTheme::default();
    let value: String = Input::<String>::with_theme(&theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// Read a secret without echoing it.
pub fn password(prompt: &str) -> anyhow::Result<String> {
    let theme = ColorfulTheme::default();
    Ok(Password::with_theme(&theme)
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()?)
}

/// Ask a yes/no question.
pub fn confirm(prompt: &str, default: bool) -> anyhow::Result<bool> {
    let theme = ColorfulTheme::default();
    Ok(Confirm::with_theme(&theme)
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
