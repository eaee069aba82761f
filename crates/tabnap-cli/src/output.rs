//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use tabnap_domain::{IndicatorState, SettingKey, Settings, TabInfo};
use tabnap_reclaimer::{IdleEntry, ReclaimerStatus};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

/// One row of the tab listing.
#[derive(Debug, Serialize)]
struct TabRow {
    #[serde(flatten)]
    tab: TabInfo,
    idle_secs: Option<u64>,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format browser tabs, with the idle time of those being tracked.
    pub fn format_tabs(&self, tabs: &[TabInfo], entries: &[IdleEntry]) -> Result<String> {
        let rows: Vec<TabRow> = tabs
            .iter()
            .map(|tab| TabRow {
                tab: tab.clone(),
                idle_secs: entries.iter().find(|e| e.id == tab.id).map(|e| e.idle_secs),
            })
            .collect();

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
            OutputFormat::Quiet => Ok(rows
                .iter()
                .map(|r| r.tab.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => Ok(self.format_tabs_table(&rows)),
        }
    }

    fn format_tabs_table(&self, rows: &[TabRow]) -> String {
        if rows.is_empty() {
            return self.colorize("No open tabs.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "State", "Focused", "Pinned", "Idle"]);

        for row in rows {
            let state = if row.tab.discarded { "discarded" } else { "loaded" };
            let idle = row
                .idle_secs
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "-".to_string());
            builder.push_record([
                row.tab.id.to_string(),
                state.to_string(),
                yes_no(row.tab.active).to_string(),
                yes_no(row.tab.pinned).to_string(),
                idle,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a settings snapshot.
    pub fn format_settings(&self, settings: &Settings) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(settings)?),
            OutputFormat::Quiet => Ok(SettingKey::ALL
                .iter()
                .map(|k| format!("{}={}", k, settings.value_of(*k)))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Setting", "Value"]);
                for key in SettingKey::ALL {
                    builder.push_record([key.to_string(), settings.value_of(key).to_string()]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format the engine status.
    pub fn format_status(&self, status: &ReclaimerStatus) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(status)?),
            OutputFormat::Quiet => Ok(if status.enabled { "on" } else { "off" }.to_string()),
            OutputFormat::Table => {
                let switch = if status.enabled {
                    self.colorize("on", "green")
                } else {
                    self.colorize("off", "yellow")
                };
                let mut lines = vec![
                    format!("Reclaimer: {}", switch),
                    format!("Tracked tabs: {}", status.entries.len()),
                ];
                for entry in &status.entries {
                    lines.push(format!("  {} idle {}s", entry.id, entry.idle_secs));
                }
                lines.push(String::new());
                lines.push(status.metrics.summary());
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format an indicator change.
    pub fn indicator(&self, state: IndicatorState, title: &str) -> String {
        if self.format == OutputFormat::Quiet {
            return state.as_str().to_string();
        }

        let text = format!("[{}] {}", state.icon_path(), title);
        match state {
            IndicatorState::Active => self.colorize(&text, "green"),
            IndicatorState::Inactive => self.colorize(&text, "magenta"),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabnap_domain::TabId;
    use tabnap_reclaimer::ReclaimerMetrics;

    fn tabs() -> Vec<TabInfo> {
        vec![
            TabInfo::new(TabId::new(1)).with_active(true),
            TabInfo::new(TabId::new(2)).with_pinned(true),
        ]
    }

    #[test]
    fn test_tabs_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let entries = [IdleEntry {
            id: TabId::new(2),
            idle_secs: 120,
        }];
        let output = formatter.format_tabs(&tabs(), &entries).unwrap();
        assert!(output.contains("Pinned"));
        assert!(output.contains("120s"));
    }

    #[test]
    fn test_tabs_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_tabs(&tabs(), &[]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["id"], 1);
        assert_eq!(parsed[1]["pinned"], true);
        assert!(parsed[1]["idle_secs"].is_null());
    }

    #[test]
    fn test_tabs_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_tabs(&tabs(), &[]).unwrap(), "1\n2");
    }

    #[test]
    fn test_empty_tabs() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_tabs(&[], &[]).unwrap();
        assert!(output.contains("No open tabs"));
    }

    #[test]
    fn test_settings_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_settings(&Settings::default()).unwrap();
        assert_eq!(output, "active=true\ntimeout=900s\ntick=60s\npinned=true");
    }

    #[test]
    fn test_status_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let status = ReclaimerStatus {
            enabled: false,
            entries: Vec::new(),
            metrics: ReclaimerMetrics::default(),
        };
        let output = formatter.format_status(&status).unwrap();
        assert!(output.contains("Reclaimer: off"));
        assert!(output.contains("Tracked tabs: 0"));
    }

    #[test]
    fn test_indicator_line() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let line = formatter.indicator(IndicatorState::Inactive, "Paused");
        assert_eq!(line, "[img/icon19_off.png] Paused");

        let quiet = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(quiet.indicator(IndicatorState::Active, "ignored"), "active");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let msg = formatter.success("test");
        assert_eq!(msg, "✓ test");
    }
}
