//! Settings module - the persisted values that drive the engine
//!
//! Storage is key/value: each [`SettingKey`] maps to a [`SettingValue`].
//! The engine never works with the raw map; it reads one [`Settings`]
//! snapshot per sweep or transition and passes it down explicitly.

use crate::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Raw key/value view of settings, as exchanged with a settings provider
pub type SettingValues = BTreeMap<SettingKey, SettingValue>;

/// Recognized setting keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKey {
    /// Master switch (bool)
    Active,

    /// Idle threshold in seconds
    Timeout,

    /// Sweep interval in seconds
    Tick,

    /// Whether pinned tabs are exempt (bool)
    Pinned,
}

impl SettingKey {
    /// Every recognized key, in storage order
    pub const ALL: [SettingKey; 4] = [
        SettingKey::Active,
        SettingKey::Timeout,
        SettingKey::Tick,
        SettingKey::Pinned,
    ];

    /// Storage name of the key
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Active => "active",
            SettingKey::Timeout => "timeout",
            SettingKey::Tick => "tick",
            SettingKey::Pinned => "pinned",
        }
    }

    /// Parse a key from its storage name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(SettingKey::Active),
            "timeout" => Some(SettingKey::Timeout),
            "tick" => Some(SettingKey::Tick),
            "pinned" => Some(SettingKey::Pinned),
            _ => None,
        }
    }

    /// Whether the key holds a boolean (as opposed to a number of seconds)
    pub fn is_flag(&self) -> bool {
        matches!(self, SettingKey::Active | SettingKey::Pinned)
    }

    /// Parse user input into a value of the right shape for this key
    ///
    /// # Examples
    ///
    /// ```
    /// use tabnap_domain::{SettingKey, SettingValue};
    ///
    /// assert_eq!(SettingKey::Tick.parse_value("30").unwrap(), SettingValue::Seconds(30));
    /// assert_eq!(SettingKey::Pinned.parse_value("off").unwrap(), SettingValue::Flag(false));
    /// assert!(SettingKey::Timeout.parse_value("soon").is_err());
    /// ```
    pub fn parse_value(&self, input: &str) -> Result<SettingValue, SettingsError> {
        let input = input.trim();
        if self.is_flag() {
            match input.to_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(SettingValue::Flag(true)),
                "false" | "off" | "no" | "0" => Ok(SettingValue::Flag(false)),
                _ => Err(SettingsError::InvalidValue {
                    key: self.as_str().to_string(),
                    reason: format!("expected a boolean, got '{}'", input),
                }),
            }
        } else {
            input
                .parse::<u64>()
                .map(SettingValue::Seconds)
                .map_err(|e| SettingsError::InvalidValue {
                    key: self.as_str().to_string(),
                    reason: format!("expected seconds, got '{}' ({})", input, e),
                })
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// A stored setting value
///
/// Serialized untagged, so JSON storage reads as `true` or `900`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean flag
    Flag(bool),

    /// Duration in whole seconds
    Seconds(u64),
}

impl SettingValue {
    fn as_flag(&self, key: SettingKey) -> Result<bool, SettingsError> {
        match self {
            SettingValue::Flag(b) => Ok(*b),
            SettingValue::Seconds(_) => Err(SettingsError::InvalidValue {
                key: key.as_str().to_string(),
                reason: "expected a boolean".to_string(),
            }),
        }
    }

    fn as_seconds(&self, key: SettingKey) -> Result<u64, SettingsError> {
        match self {
            SettingValue::Seconds(s) => Ok(*s),
            SettingValue::Flag(_) => Err(SettingsError::InvalidValue {
                key: key.as_str().to_string(),
                reason: "expected seconds".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Flag(b) => write!(f, "{}", b),
            SettingValue::Seconds(s) => write!(f, "{}s", s),
        }
    }
}

/// Snapshot of all four settings
///
/// # Examples
///
/// ```
/// use tabnap_domain::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.active);
/// assert_eq!(settings.timeout_secs, 15 * 60);
/// assert_eq!(settings.tick_secs, 60);
/// assert!(settings.skip_pinned);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master switch
    pub active: bool,

    /// Idle threshold in seconds
    pub timeout_secs: u64,

    /// Sweep interval in seconds
    pub tick_secs: u64,

    /// Exempt pinned tabs from idle accrual
    pub skip_pinned: bool,
}

impl Default for Settings {
    /// active=true, timeout=15 minutes, tick=1 minute, pinned tabs exempt
    fn default() -> Self {
        Self {
            active: true,
            timeout_secs: 15 * 60,
            tick_secs: 60,
            skip_pinned: true,
        }
    }
}

impl Settings {
    /// Build a snapshot from raw values, taking missing keys from `defaults`
    pub fn from_values(values: &SettingValues, defaults: &Settings) -> Result<Self, SettingsError> {
        let mut settings = *defaults;
        for (key, value) in values {
            settings.apply(*key, *value)?;
        }
        Ok(settings)
    }

    /// Set one key, checking the value has the right shape
    pub fn apply(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingsError> {
        match key {
            SettingKey::Active => self.active = value.as_flag(key)?,
            SettingKey::Timeout => self.timeout_secs = value.as_seconds(key)?,
            SettingKey::Tick => self.tick_secs = value.as_seconds(key)?,
            SettingKey::Pinned => self.skip_pinned = value.as_flag(key)?,
        }
        Ok(())
    }

    /// Value stored under `key`
    pub fn value_of(&self, key: SettingKey) -> SettingValue {
        match key {
            SettingKey::Active => SettingValue::Flag(self.active),
            SettingKey::Timeout => SettingValue::Seconds(self.timeout_secs),
            SettingKey::Tick => SettingValue::Seconds(self.tick_secs),
            SettingKey::Pinned => SettingValue::Flag(self.skip_pinned),
        }
    }

    /// All four values as a raw map
    pub fn to_values(&self) -> SettingValues {
        SettingKey::ALL.iter().map(|k| (*k, self.value_of(*k))).collect()
    }

    /// Sweep interval as Duration
    ///
    /// Never shorter than one second, so a stored `tick = 0` cannot spin the timer.
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs.max(1))
    }
}
