//! Indicator module - the two-state UI affordance driven by the master switch

use serde::{Deserialize, Serialize};

/// Display state of the indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorState {
    /// The engine is running
    Active,

    /// The engine is switched off
    Inactive,
}

impl IndicatorState {
    /// State matching the master switch position
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            IndicatorState::Active
        } else {
            IndicatorState::Inactive
        }
    }

    /// Short name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorState::Active => "active",
            IndicatorState::Inactive => "inactive",
        }
    }

    /// Icon asset for the state
    pub fn icon_path(&self) -> &'static str {
        match self {
            IndicatorState::Active => "img/icon19.png",
            IndicatorState::Inactive => "img/icon19_off.png",
        }
    }

    /// Message key of the localized title for the state
    pub fn title_key(&self) -> &'static str {
        match self {
            IndicatorState::Active => "browserActionActive",
            IndicatorState::Inactive => "browserActionInactive",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_enabled() {
        assert_eq!(IndicatorState::from_enabled(true), IndicatorState::Active);
        assert_eq!(IndicatorState::from_enabled(false), IndicatorState::Inactive);
    }

    #[test]
    fn test_assets_differ_per_state() {
        assert_ne!(IndicatorState::Active.icon_path(), IndicatorState::Inactive.icon_path());
        assert_eq!(IndicatorState::Inactive.title_key(), "browserActionInactive");
    }
}
