//! Transition and single-event logger.

use serde_json::Value;

use crate::core::{Args, LoggerConfig, Snapshot};
use crate::diff::StateDiffer;

/// One action execution to log.
#[derive(Debug, Clone, Copy)]
pub struct Transition<'a> {
    /// Action name.
    pub name: &'a str,
    /// State before the action ran.
    pub before: &'a Snapshot,
    /// State after the action ran; `None` when there is nothing to log.
    pub after: Option<&'a Snapshot>,
    /// Call arguments.
    pub args: &'a Args,
    /// Where the call came from.
    pub source: Option<&'a str>,
    /// Whether the action failed.
    pub failed: bool,
}

impl<'a> Transition<'a> {
    /// Successful transition with no source tag.
    pub fn new(
        name: &'a str,
        before: &'a Snapshot,
        after: Option<&'a Snapshot>,
        args: &'a Args,
    ) -> Self {
        Self {
            name,
            before,
            after,
            args,
            source: None,
            failed: false,
        }
    }

    /// Set the source tag.
    pub fn source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    /// Mark the transition as failed.
    pub fn failed(mut self, failed: bool) -> Self {
        self.failed = failed;
        self
    }
}

/// A labeled group of output.
#[derive(Debug, Clone, PartialEq)]
pub struct LogGroup {
    /// Group label.
    pub label: &'static str,
    /// Group contents.
    pub body: Value,
}

/// Everything emitted for one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionLog {
    /// Identity line: name, source and failed marker.
    pub header: String,
    /// `arguments` (when non-empty), `before`, `after`, `diff`.
    pub groups: Vec<LogGroup>,
}

impl TransitionLog {
    /// Group with the given label.
    pub fn group(&self, label: &str) -> Option<&LogGroup> {
        self.groups.iter().find(|group| group.label == label)
    }
}

/// Everything emitted for a single event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
    /// Event name, with the state label when one was given.
    pub header: String,
    /// Event arguments.
    pub args: Args,
}

/// Logger for action transitions and single events.
#[derive(Debug, Clone)]
pub struct ChangeLogger {
    config: LoggerConfig,
    differ: StateDiffer,
}

impl Default for ChangeLogger {
    fn default() -> Self {
        Self::new(LoggerConfig::default())
    }
}

impl ChangeLogger {
    /// Create a logger.
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            differ: StateDiffer::new(config.mode),
            config,
        }
    }

    /// The logger configuration.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Log a transition with its state diff.
    ///
    /// Does nothing unless the build mode is development and `enabled` is
    /// set, or when the transition has no after-state.
    pub fn log_transition(&self, enabled: bool, transition: &Transition<'_>) -> Option<TransitionLog> {
        if !self.config.mode.is_development() || !enabled {
            return None;
        }
        let after = transition.after?;

        let mut header = format!("action {}", transition.name);
        if let Some(source) = transition.source {
            header.push_str(&format!(" from {source}"));
        }
        if transition.failed {
            header.push_str(" (failed)");
        }

        let mut groups = Vec::with_capacity(4);
        if !transition.args.is_empty() {
            groups.push(LogGroup {
                label: "arguments",
                body: Value::Array(transition.args.clone()),
            });
        }
        groups.push(LogGroup {
            label: "before",
            body: Value::Object(transition.before.clone()),
        });
        groups.push(LogGroup {
            label: "after",
            body: Value::Object(after.clone()),
        });
        groups.push(LogGroup {
            label: "diff",
            body: self.differ.diff(transition.before, after).to_value(),
        });

        let log = TransitionLog { header, groups };
        emit_transition(transition, &log);
        Some(log)
    }

    /// Log a single named event.
    ///
    /// Does nothing unless the build mode is development, `enabled` is set
    /// and single-event logging is configured on.
    pub fn log_single(
        &self,
        name: &str,
        args: &Args,
        enabled: bool,
        label: Option<&str>,
    ) -> Option<EventLog> {
        if !self.config.mode.is_development() || !enabled || !self.config.log_single_events {
            return None;
        }

        let header = match label {
            Some(label) => format!("{name} [{label}]"),
            None => name.to_string(),
        };
        if args.is_empty() {
            tracing::info!("{header}");
        } else {
            let rendered = Value::Array(args.clone());
            tracing::info!(args = %rendered, "{header}");
        }

        Some(EventLog {
            header,
            args: args.clone(),
        })
    }
}

fn emit_transition(transition: &Transition<'_>, log: &TransitionLog) {
    let span = tracing::info_span!(
        "action",
        action = transition.name,
        source = transition.source.unwrap_or("-"),
        failed = transition.failed,
    );
    let _entered = span.enter();

    if transition.failed {
        tracing::warn!("{}", log.header);
    } else {
        tracing::info!("{}", log.header);
    }
    for group in &log.groups {
        tracing::debug!(group = group.label, body = %group.body, "{}", group.label);
    }
}
