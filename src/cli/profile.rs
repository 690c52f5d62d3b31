use super::ui;
use crate::core::manager::ProfileManager;
use crate::core::profile::Preferences;
use crate::core::storage::ProfileStore;
use anyhow::{Context, Result};
use comfy_table::Cell;
use serde_json::Value;

/// Prints the export snapshot as pretty JSON.
pub fn export<S: ProfileStore>(manager: &ProfileManager<S>) -> Result<()> {
    let json = serde_json::to_string_pretty(&manager.export())
        .context("Failed to serialize profile export")?;
    println!("{json}");
    Ok(())
}

pub fn reset<S: ProfileStore>(manager: &mut ProfileManager<S>) -> Result<()> {
    manager.reset()?;
    println!("Profile reset. History, statistics and achievements were cleared.");
    Ok(())
}

/// Parses `KEY=VALUE`. The value is read as JSON when possible, so `true`,
/// `3` and `{"a":1}` keep their types; anything else is stored as a string.
pub fn parse_preference(assignment: &str) -> Result<(String, Value)> {
    let (key, raw) = assignment
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got: {assignment}"))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Preference key is empty in: {assignment}");
    }
    let raw = raw.trim();
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Merges `assignments` into the stored preferences, then prints them.
pub fn prefs<S: ProfileStore>(manager: &mut ProfileManager<S>, assignments: &[String]) -> Result<()> {
    if !assignments.is_empty() {
        let updates = assignments
            .iter()
            .map(|a| parse_preference(a))
            .collect::<Result<Preferences>>()?;
        manager.update_preferences(updates)?;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Preference"), ui::header_cell("Value")]);
    for (key, value) in &manager.profile().preferences {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        table.add_row(vec![Cell::new(key), Cell::new(text)]);
    }
    println!("{table}");
    Ok(())
}
