//! Console rendition of the toolbar indicator.

use crate::output::Formatter;
use std::sync::Mutex;
use tabnap_domain::traits::Indicator;
use tabnap_domain::IndicatorState;

/// English text for an indicator title key.
pub fn title(key: &str) -> &str {
    match key {
        "browserActionActive" => "Idle tabs are being unloaded. Click to pause.",
        "browserActionInactive" => "Paused. Click to unload idle tabs again.",
        other => other,
    }
}

/// Prints each indicator change on its own line
pub struct ConsoleIndicator {
    formatter: Formatter,
    last: Mutex<Option<IndicatorState>>,
}

impl ConsoleIndicator {
    /// Create an indicator printing through `formatter`
    pub fn new(formatter: Formatter) -> Self {
        Self {
            formatter,
            last: Mutex::new(None),
        }
    }

    /// Most recently shown state
    pub fn state(&self) -> Option<IndicatorState> {
        self.last.lock().ok().and_then(|last| *last)
    }
}

impl Indicator for ConsoleIndicator {
    fn show(&self, state: IndicatorState) {
        if let Ok(mut last) = self.last.lock() {
            *last = Some(state);
        }
        println!("{}", self.formatter.indicator(state, title(state.title_key())));
    }
}
