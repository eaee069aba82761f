//! Settings command implementation.

use crate::cli::{SettingsAction, SettingsArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use tabnap_domain::traits::SettingsProvider;
use tabnap_domain::{SettingKey, SettingValue, SettingValues, Settings};
use tabnap_store::SqliteSettingsStore;

/// Execute the settings command.
pub async fn execute_settings(
    args: SettingsArgs,
    store: &SqliteSettingsStore,
    formatter: &Formatter,
) -> Result<()> {
    store.ready().await?;

    let message = match &args.action {
        SettingsAction::Show => None,
        SettingsAction::Set { .. } => Some("Settings updated"),
        SettingsAction::Reset => Some("Settings reset to defaults"),
    };

    let settings = apply_action(args.action, store).await?;
    if let Some(message) = message {
        println!("{}", formatter.success(message));
    }
    println!("{}", formatter.format_settings(&settings)?);
    Ok(())
}

/// Apply the action and return the resulting settings.
async fn apply_action(action: SettingsAction, store: &SqliteSettingsStore) -> Result<Settings> {
    match action {
        SettingsAction::Show => {}
        SettingsAction::Set {
            timeout,
            tick,
            pinned,
            active,
        } => {
            let values = changed_values(timeout, tick, pinned, active)?;
            store.set(values).await?;
        }
        SettingsAction::Reset => {
            store.set(store.defaults().to_values()).await?;
        }
    }

    Ok(store.load()?)
}

fn changed_values(
    timeout: Option<u64>,
    tick: Option<u64>,
    pinned: Option<bool>,
    active: Option<bool>,
) -> Result<SettingValues> {
    let mut values = SettingValues::new();
    if let Some(timeout) = timeout {
        values.insert(SettingKey::Timeout, SettingValue::Seconds(timeout));
    }
    if let Some(tick) = tick {
        values.insert(SettingKey::Tick, SettingValue::Seconds(tick));
    }
    if let Some(pinned) = pinned {
        values.insert(SettingKey::Pinned, SettingValue::Flag(pinned));
    }
    if let Some(active) = active {
        values.insert(SettingKey::Active, SettingValue::Flag(active));
    }

    if values.is_empty() {
        return Err(CliError::InvalidInput(
            "Nothing to set. Use --timeout, --tick, --pinned or --active.".to_string(),
        ));
    }
    Ok(values)
}
