//! Static checks on a command tree file, reported without building it.

use std::collections::BTreeSet;

use crate::schema::{CommandConfig, HeraldConfig, ResponseConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Space-separated command path, e.g. `mod warn`; empty for file-level findings.
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// Validate a parsed config.
pub fn validate(config: &HeraldConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    if config.prefix.is_empty() {
        result.push(Severity::Error, "", "prefix must not be empty");
    } else if config.prefix.chars().any(char::is_whitespace) {
        result.push(Severity::Error, "", "prefix must not contain whitespace");
    }
    check_siblings(&config.commands, "", &mut result);
    result
}

fn check_siblings(commands: &[CommandConfig], parent: &str, result: &mut ValidationResult) {
    let mut names = BTreeSet::new();
    for cmd in commands {
        let path = if parent.is_empty() {
            cmd.label.clone()
        } else {
            format!("{parent} {}", cmd.label)
        };

        if cmd.label.is_empty() || cmd.label.chars().any(char::is_whitespace) {
            result.push(Severity::Error, &path, format!("invalid label {:?}", cmd.label));
        }
        if !names.insert(cmd.label.as_str()) {
            result.push(Severity::Error, &path, "label already used by a sibling");
        }
        for alias in &cmd.aliases {
            if alias.is_empty() || alias.chars().any(char::is_whitespace) {
                result.push(Severity::Error, &path, format!("invalid alias {alias:?}"));
            } else if !names.insert(alias.as_str()) {
                result.push(
                    Severity::Error,
                    &path,
                    format!("alias `{alias}` already used by a sibling"),
                );
            }
        }

        check_command(cmd, &path, result);
        check_siblings(&cmd.children, &path, result);
    }
}

fn check_command(cmd: &CommandConfig, path: &str, result: &mut ValidationResult) {
    match &cmd.response {
        Some(ResponseConfig::OneOf(texts)) if texts.is_empty() => {
            result.push(Severity::Error, path, "response list is empty");
        },
        None if cmd.children.is_empty() => {
            result.push(Severity::Warning, path, "command has no response and no subcommands");
        },
        _ => {},
    }

    let req = &cmd.requirements;
    if !req.allowed_actor_ids.is_empty() && !cmd.guild_only {
        result.push(
            Severity::Info,
            path,
            "actor allowlist makes this command unavailable in direct messages",
        );
    }
    if !req.capabilities.is_empty()
        && (!req.allowed_group_ids.is_empty() || !req.allowed_group_names.is_empty())
    {
        result.push(
            Severity::Info,
            path,
            "capabilities and roles are alternatives: either one grants access",
        );
    }
}
