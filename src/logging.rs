//! # Structured Logging Module
//!
//! Two layers:
//!
//! - [`init_structured_logging`] installs the process-wide `tracing` subscriber,
//!   with the level chosen from the environment name.
//! - [`LogEntry`] is the hierarchical progress log handed to plugin handlers.
//!   Each entry mirrors itself into `tracing` so the tree is visible in plain
//!   log output as well.

use crate::config::EngineConfig;
use crate::constants::{DEFAULT_ENVIRONMENT, ENVIRONMENT_VARIABLES};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing_subscriber::{fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Safe to call more than once; only the first call installs a subscriber and an
/// already-installed global subscriber is left in place.
pub fn init_structured_logging(config: &EngineConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let log_level = config
            .log_level
            .clone()
            .unwrap_or_else(|| get_log_level(&config.environment).to_string());

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

        let json_layer = config.json_logs.then(|| {
            tracing_fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
        });
        let console_layer = (!config.json_logs).then(|| {
            tracing_fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
        });

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .with(console_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %config.environment,
            project = %config.project_name,
            log_level = %log_level,
            json = config.json_logs,
            "Structured logging initialized"
        );
    });
}

/// Detect the environment name from the process environment.
pub fn detect_environment() -> String {
    ENVIRONMENT_VARIABLES
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|value| !value.is_empty()))
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// Default log level for an environment name.
pub fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "test" | "development" | "local" => "debug",
        "production" => "info",
        _ => "debug",
    }
}

/// Verbosity of a log entry, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Verbose,
    Debug,
    Silly,
}

/// Progress state of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Active,
    Done,
    Error,
    Success,
    Warn,
}

/// Message, section and status for creating or updating an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryOptions {
    pub msg: Option<String>,
    pub section: Option<String>,
    pub status: Option<EntryStatus>,
}

impl EntryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    #[must_use]
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: EntryStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl From<&str> for EntryOptions {
    fn from(msg: &str) -> Self {
        EntryOptions::new().msg(msg)
    }
}

impl From<String> for EntryOptions {
    fn from(msg: String) -> Self {
        EntryOptions::new().msg(msg)
    }
}

#[derive(Debug, Default)]
struct EntryState {
    msg: Option<String>,
    section: Option<String>,
    status: Option<EntryStatus>,
}

struct EntryNode {
    id: Uuid,
    level: LogLevel,
    depth: usize,
    created_at: DateTime<Utc>,
    state: Mutex<EntryState>,
    children: Mutex<Vec<LogEntry>>,
}

/// A node in the hierarchical progress log.
///
/// Cloning is cheap and clones refer to the same node, so an entry can be
/// shared by concurrent fan-out branches.
#[derive(Clone)]
pub struct LogEntry {
    node: Arc<EntryNode>,
}

impl LogEntry {
    /// Create a detached root entry.
    pub fn root() -> Self {
        Self::create(LogLevel::Info, 0, EntryOptions::default())
    }

    fn create(level: LogLevel, depth: usize, opts: EntryOptions) -> Self {
        let status = if level == LogLevel::Error {
            Some(EntryStatus::Error)
        } else {
            opts.status
        };

        Self {
            node: Arc::new(EntryNode {
                id: Uuid::new_v4(),
                level,
                depth,
                created_at: Utc::now(),
                state: Mutex::new(EntryState {
                    msg: opts.msg,
                    section: opts.section,
                    status,
                }),
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    fn append(&self, level: LogLevel, opts: impl Into<EntryOptions>) -> LogEntry {
        let child = Self::create(level, self.node.depth + 1, opts.into());
        self.node.children.lock().push(child.clone());
        child.emit(level);
        child
    }

    pub fn error(&self, opts: impl Into<EntryOptions>) -> LogEntry {
        self.append(LogLevel::Error, opts)
    }

    pub fn warn(&self, opts: impl Into<EntryOptions>) -> LogEntry {
        self.append(LogLevel::Warn, opts)
    }

    pub fn info(&self, opts: impl Into<EntryOptions>) -> LogEntry {
        self.append(LogLevel::Info, opts)
    }

    pub fn verbose(&self, opts: impl Into<EntryOptions>) -> LogEntry {
        self.append(LogLevel::Verbose, opts)
    }

    pub fn debug(&self, opts: impl Into<EntryOptions>) -> LogEntry {
        self.append(LogLevel::Debug, opts)
    }

    pub fn silly(&self, opts: impl Into<EntryOptions>) -> LogEntry {
        self.append(LogLevel::Silly, opts)
    }

    /// Update message or section, keeping the current status.
    pub fn set_state(&self, opts: impl Into<EntryOptions>) -> &Self {
        let mut opts = opts.into();
        opts.status = self.status();
        self.deep_set_state(opts);
        self
    }

    pub fn set_done(&self) -> &Self {
        self.deep_set_state(EntryOptions::new().status(EntryStatus::Done));
        self
    }

    pub fn set_success(&self) -> &Self {
        self.set_success_with(EntryOptions::new())
    }

    pub fn set_success_with(&self, opts: impl Into<EntryOptions>) -> &Self {
        let opts: EntryOptions = opts.into();
        self.deep_set_state(opts.status(EntryStatus::Success));
        self.emit(LogLevel::Verbose);
        self
    }

    pub fn set_error(&self, opts: impl Into<EntryOptions>) -> &Self {
        let opts: EntryOptions = opts.into();
        self.deep_set_state(opts.status(EntryStatus::Error));
        self.emit(LogLevel::Error);
        self
    }

    pub fn set_warn(&self, opts: impl Into<EntryOptions>) -> &Self {
        let opts: EntryOptions = opts.into();
        self.deep_set_state(opts.status(EntryStatus::Warn));
        self.emit(LogLevel::Warn);
        self
    }

    fn set_own_state(&self, opts: EntryOptions) {
        let mut state = self.node.state.lock();
        if let Some(msg) = opts.msg {
            state.msg = Some(msg);
        }
        if let Some(section) = opts.section {
            state.section = Some(section);
        }
        state.status = opts.status;
    }

    // Active descendants stop when their ancestor stops being active.
    fn deep_set_state(&self, opts: EntryOptions) {
        let was_active = self.status() == Some(EntryStatus::Active);
        self.set_own_state(opts);

        if was_active && self.status() != Some(EntryStatus::Active) {
            for entry in self.descendants() {
                if entry.status() == Some(EntryStatus::Active) {
                    entry.node.state.lock().status = Some(EntryStatus::Done);
                }
            }
        }
    }

    fn emit(&self, level: LogLevel) {
        let state = self.node.state.lock();
        let id = self.node.id;
        let depth = self.node.depth;
        let section = state.section.as_deref().unwrap_or("");
        let msg = state.msg.as_deref().unwrap_or("");
        let status = state.status.map(|status| format!("{status:?}").to_lowercase());
        let status = status.as_deref().unwrap_or("");

        match level {
            LogLevel::Error => tracing::error!(entry_id = %id, depth, section, status, "{msg}"),
            LogLevel::Warn => tracing::warn!(entry_id = %id, depth, section, status, "{msg}"),
            LogLevel::Info => tracing::info!(entry_id = %id, depth, section, status, "{msg}"),
            LogLevel::Verbose | LogLevel::Debug => {
                tracing::debug!(entry_id = %id, depth, section, status, "{msg}")
            }
            LogLevel::Silly => tracing::trace!(entry_id = %id, depth, section, status, "{msg}"),
        }
    }

    pub fn id(&self) -> Uuid {
        self.node.id
    }

    pub fn level(&self) -> LogLevel {
        self.node.level
    }

    pub fn depth(&self) -> usize {
        self.node.depth
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.node.created_at
    }

    pub fn msg(&self) -> Option<String> {
        self.node.state.lock().msg.clone()
    }

    pub fn section(&self) -> Option<String> {
        self.node.state.lock().section.clone()
    }

    pub fn status(&self) -> Option<EntryStatus> {
        self.node.state.lock().status
    }

    pub fn is_error(&self) -> bool {
        self.status() == Some(EntryStatus::Error)
    }

    /// Direct children in creation order.
    pub fn children(&self) -> Vec<LogEntry> {
        self.node.children.lock().clone()
    }

    /// All entries below this one, depth first.
    pub fn descendants(&self) -> Vec<LogEntry> {
        let mut entries = Vec::new();
        for child in self.children() {
            entries.push(child.clone());
            entries.extend(child.descendants());
        }
        entries
    }

    /// Messages of this entry's descendants, depth first.
    pub fn messages(&self) -> Vec<String> {
        self.descendants()
            .into_iter()
            .filter_map(|entry| entry.msg())
            .collect()
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.node.state.lock();
        f.debug_struct("LogEntry")
            .field("id", &self.node.id)
            .field("level", &self.node.level)
            .field("depth", &self.node.depth)
            .field("section", &state.section)
            .field("msg", &state.msg)
            .field("status", &state.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("local"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_children_are_recorded_in_order() {
        let root = LogEntry::root();
        root.info("first");
        let second = root.verbose(EntryOptions::new().msg("second").section("api"));
        second.debug("nested");

        assert_eq!(root.children().len(), 2);
        assert_eq!(second.section().as_deref(), Some("api"));
        assert_eq!(second.depth(), 1);
        assert_eq!(root.messages(), vec!["first", "second", "nested"]);
    }

    #[test]
    fn test_error_level_entries_start_in_error_state() {
        let root = LogEntry::root();
        let entry = root.error("boom");
        assert!(entry.is_error());
    }

    #[test]
    fn test_stopping_an_active_entry_stops_active_children() {
        let root = LogEntry::root();
        let parent = root.info(EntryOptions::new().msg("Deleting services...").status(EntryStatus::Active));
        let child = parent.info(EntryOptions::new().msg("Deleting...").status(EntryStatus::Active));
        let finished = parent.info(EntryOptions::new().msg("done").status(EntryStatus::Success));

        parent.set_success();

        assert_eq!(parent.status(), Some(EntryStatus::Success));
        assert_eq!(child.status(), Some(EntryStatus::Done));
        assert_eq!(finished.status(), Some(EntryStatus::Success));
    }

    #[test]
    fn test_set_state_preserves_status() {
        let root = LogEntry::root();
        let entry = root.info(EntryOptions::new().msg("working").status(EntryStatus::Active));
        entry.set_state("still working");
        assert_eq!(entry.status(), Some(EntryStatus::Active));
        assert_eq!(entry.msg().as_deref(), Some("still working"));
    }

    #[test]
    fn test_clones_share_state() {
        let root = LogEntry::root();
        let entry = root.info("shared");
        let clone = entry.clone();
        clone.set_error("failed");
        assert!(entry.is_error());
        assert_eq!(entry.id(), clone.id());
    }
}
