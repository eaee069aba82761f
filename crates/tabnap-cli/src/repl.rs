//! Interactive REPL (Read-Eval-Print Loop) mode.
//!
//! Runs the engine against a [`SimulatedBrowser`]: every command that changes
//! the browser forwards the matching lifecycle signal, and the engine's
//! discards show up in the `tabs` listing.

use crate::browser::SimulatedBrowser;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::indicator::ConsoleIndicator;
use crate::output::Formatter;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use std::sync::Arc;
use tabnap_domain::traits::{Indicator, SettingsProvider};
use tabnap_domain::{SettingKey, SettingValue, SettingValues, TabId};
use tabnap_reclaimer::{ReclaimerHandle, ReclaimerWorker};
use tokio::task::JoinHandle;

/// Run the interactive REPL.
pub async fn run_repl(
    store: Arc<dyn SettingsProvider>,
    indicator: Arc<ConsoleIndicator>,
    formatter: &Formatter,
) -> Result<()> {
    println!("{}", formatter.info("tabnap REPL - Type 'help' for commands, 'exit' to quit"));
    println!();

    // Initialize readline editor
    let mut editor = DefaultEditor::new().map_err(|e| {
        CliError::Io(std::io::Error::other(format!("Failed to initialize editor: {}", e)))
    })?;

    // Load history
    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let session = Session::start(store, indicator);

    loop {
        match editor.readline("tabnap> ") {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => {
                        println!("{}", help_text());
                    }
                    Ok(cmd) => match session.execute(cmd, formatter).await {
                        Ok(output) if output.is_empty() => {}
                        Ok(output) => println!("{}", output),
                        Err(e) => eprintln!("{}", formatter.error(&e.to_string())),
                    },
                    Err(e) => {
                        eprintln!("{}", formatter.error(&e.to_string()));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    // Save history
    editor.save_history(&history_path).ok();

    session.close().await
}

/// REPL command type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Leave the REPL
    Exit,
    /// Print the command list
    Help,
    /// Open a background tab
    Open {
        /// Open it pinned
        pinned: bool,
    },
    /// Close a tab
    Close(TabId),
    /// Focus a tab
    Focus(TabId),
    /// Pin a tab
    Pin(TabId),
    /// Unpin a tab
    Unpin(TabId),
    /// List the browser's tabs
    Tabs,
    /// Show the engine status
    Status,
    /// Flip the master switch
    Toggle,
    /// Change one setting
    Set(SettingKey, SettingValue),
}

/// Parse a REPL command line.
pub fn parse_repl_command(line: &str) -> Result<ReplCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let Some((&command, args)) = parts.split_first() else {
        return Err(CliError::InvalidInput("Empty command".to_string()));
    };

    match command {
        "exit" | "quit" | "q" => Ok(ReplCommand::Exit),
        "help" | "?" => Ok(ReplCommand::Help),
        "open" => match args {
            [] => Ok(ReplCommand::Open { pinned: false }),
            ["pinned"] => Ok(ReplCommand::Open { pinned: true }),
            _ => Err(CliError::InvalidInput("Usage: open [pinned]".to_string())),
        },
        "close" => parse_tab_id(command, args).map(ReplCommand::Close),
        "focus" => parse_tab_id(command, args).map(ReplCommand::Focus),
        "pin" => parse_tab_id(command, args).map(ReplCommand::Pin),
        "unpin" => parse_tab_id(command, args).map(ReplCommand::Unpin),
        "tabs" | "ls" => Ok(ReplCommand::Tabs),
        "status" => Ok(ReplCommand::Status),
        "toggle" => Ok(ReplCommand::Toggle),
        "set" => parse_set_command(args),
        _ => Err(CliError::InvalidInput(format!(
            "Unknown command: {}. Type 'help' for available commands.",
            command
        ))),
    }
}

fn parse_tab_id(command: &str, args: &[&str]) -> Result<TabId> {
    match args {
        [id] => id.parse().map_err(CliError::InvalidInput),
        _ => Err(CliError::InvalidInput(format!("Usage: {} <tab-id>", command))),
    }
}

fn parse_set_command(args: &[&str]) -> Result<ReplCommand> {
    let [key, value] = args else {
        return Err(CliError::InvalidInput(
            "Usage: set <active|timeout|tick|pinned> <value>".to_string(),
        ));
    };

    let key: SettingKey = key.parse()?;
    let value = key.parse_value(value)?;
    Ok(ReplCommand::Set(key, value))
}

/// A running engine wired to a simulated browser
pub struct Session {
    browser: Arc<SimulatedBrowser>,
    store: Arc<dyn SettingsProvider>,
    handle: ReclaimerHandle,
    join: JoinHandle<()>,
}

impl Session {
    /// Spawn the engine over a fresh browser
    pub fn start(store: Arc<dyn SettingsProvider>, indicator: Arc<dyn Indicator>) -> Self {
        let browser = Arc::new(SimulatedBrowser::new());
        let (handle, join) = ReclaimerWorker::spawn(store.clone(), browser.clone(), indicator);
        Self {
            browser,
            store,
            handle,
            join,
        }
    }

    /// The browser the engine is watching
    pub fn browser(&self) -> &SimulatedBrowser {
        &self.browser
    }

    /// Execute one command, returning the text to print
    pub async fn execute(&self, cmd: ReplCommand, formatter: &Formatter) -> Result<String> {
        match cmd {
            ReplCommand::Exit => Ok(String::new()),
            ReplCommand::Help => Ok(help_text()),
            ReplCommand::Open { pinned } => {
                let tab = self.browser.open(pinned)?;
                self.handle.tab_created(tab.id)?;
                Ok(formatter.success(&format!("Opened tab {}", tab.id)))
            }
            ReplCommand::Close(id) => {
                self.browser.close(id)?;
                self.handle.tab_removed(id)?;
                Ok(formatter.success(&format!("Closed tab {}", id)))
            }
            ReplCommand::Focus(id) => {
                self.browser.focus(id)?;
                self.handle.tab_activated(id)?;
                Ok(formatter.success(&format!("Focused tab {}", id)))
            }
            ReplCommand::Pin(id) => {
                self.browser.set_pinned(id, true)?;
                Ok(formatter.success(&format!("Pinned tab {}", id)))
            }
            ReplCommand::Unpin(id) => {
                self.browser.set_pinned(id, false)?;
                Ok(formatter.success(&format!("Unpinned tab {}", id)))
            }
            ReplCommand::Tabs => {
                let status = self.handle.status().await?;
                formatter.format_tabs(&self.browser.tabs()?, &status.entries)
            }
            ReplCommand::Status => {
                let status = self.handle.status().await?;
                formatter.format_status(&status)
            }
            ReplCommand::Toggle => {
                let enabled = self.handle.toggle().await?;
                Ok(formatter.info(if enabled { "Reclaimer on" } else { "Reclaimer off" }))
            }
            // Re-enabling a running engine zeroes every idle time
            ReplCommand::Set(SettingKey::Active, SettingValue::Flag(enabled)) => {
                self.handle.set_enabled(enabled).await?;
                Ok(formatter.success(&format!("active = {}", enabled)))
            }
            ReplCommand::Set(key, value) => {
                let mut values = SettingValues::new();
                values.insert(key, value);
                self.store.set(values).await?;
                Ok(formatter.success(&format!("{} = {}", key, value)))
            }
        }
    }

    /// Stop the engine and wait for it to finish
    pub async fn close(self) -> Result<()> {
        self.handle.shutdown().await?;
        self.join.await.map_err(tabnap_reclaimer::ReclaimerError::from)?;
        Ok(())
    }
}

fn get_history_path() -> Result<PathBuf> {
    let dir = Config::dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn help_text() -> String {
    [
        "Available commands:",
        "",
        "  open [pinned]               - Open a background tab",
        "  close <id>                  - Close a tab",
        "  focus <id>                  - Focus a tab (reloads it if discarded)",
        "  pin <id> / unpin <id>       - Change a tab's pinned state",
        "  tabs, ls                    - List tabs with their idle time",
        "  status                      - Show the engine status and metrics",
        "  toggle                      - Switch idle-tab unloading on or off",
        "  set <key> <value>           - Change a setting",
        "    keys: active (bool), timeout (seconds), tick (seconds), pinned (bool)",
        "    set active true while already on restarts idle tracking from zero",
        "  help, ?                     - Show this help",
        "  exit, quit, q               - Exit REPL",
    ]
    .join("\n")
}
