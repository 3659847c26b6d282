//! The seam between the dispatcher and the chat platform.
//!
//! The platform layer computes who is speaking and where; the dispatcher only
//! reads it through [`Actor`] and [`InvocationContext`].

use std::collections::BTreeMap;

use herald_common::ChatType;

/// The identity invoking a command.
pub trait Actor {
    /// Stable platform identifier.
    fn id(&self) -> &str;

    /// Role IDs held by the actor in the current group (empty in DMs).
    fn role_ids(&self) -> &[String];
}

/// Where a command is being invoked, and what the actor may do there.
pub trait InvocationContext {
    fn chat_type(&self) -> ChatType;

    fn is_direct(&self) -> bool {
        self.chat_type().is_direct()
    }

    /// Computed capability flag for the actor in this channel.
    ///
    /// `None` means the platform did not compute the flag.
    fn capability(&self, name: &str) -> Option<bool>;

    /// Display name of a role in the current group.
    fn role_name(&self, role_id: &str) -> Option<&str>;
}

/// Everything a response handler gets to see about the call.
#[derive(Clone, Copy)]
pub struct Invocation<'a> {
    pub actor: &'a dyn Actor,
    pub context: &'a dyn InvocationContext,
    /// Canonical labels from the root to the executing command.
    pub path: &'a [&'a str],
}

impl Invocation<'_> {
    /// Label of the executing command, empty for the root.
    #[must_use]
    pub fn command(&self) -> &str {
        self.path.last().copied().unwrap_or_default()
    }

    /// Space-joined path, e.g. `admin alias`.
    #[must_use]
    pub fn command_path(&self) -> String {
        self.path.join(" ")
    }
}

impl std::fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("actor", &self.actor.id())
            .field("chat_type", &self.context.chat_type())
            .field("path", &self.path)
            .finish()
    }
}

/// In-memory actor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticActor {
    pub id: String,
    pub role_ids: Vec<String>,
}

impl StaticActor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_role(mut self, role_id: impl Into<String>) -> Self {
        self.role_ids.push(role_id.into());
        self
    }
}

impl Actor for StaticActor {
    fn id(&self) -> &str {
        &self.id
    }

    fn role_ids(&self) -> &[String] {
        &self.role_ids
    }
}

/// In-memory invocation context with precomputed capabilities and role names.
#[derive(Debug, Clone, Default)]
pub struct StaticContext {
    pub chat_type: ChatType,
    pub group_id: Option<String>,
    pub capabilities: BTreeMap<String, bool>,
    pub role_names: BTreeMap<String, String>,
}

impl StaticContext {
    /// A direct, one-to-one conversation.
    pub fn direct() -> Self {
        Self {
            chat_type: ChatType::Dm,
            ..Default::default()
        }
    }

    /// A group conversation.
    pub fn group(group_id: impl Into<String>) -> Self {
        Self {
            chat_type: ChatType::Group,
            group_id: Some(group_id.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_capability(mut self, name: impl Into<String>, value: bool) -> Self {
        self.capabilities.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_role_name(mut self, role_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.role_names.insert(role_id.into(), name.into());
        self
    }
}

impl InvocationContext for StaticContext {
    fn chat_type(&self) -> ChatType {
        self.chat_type
    }

    fn capability(&self, name: &str) -> Option<bool> {
        self.capabilities.get(name).copied()
    }

    fn role_name(&self, role_id: &str) -> Option<&str> {
        self.role_names.get(role_id).map(String::as_str)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_context_lookups() {
        let ctx = StaticContext::group("g1")
            .with_capability("manage_messages", true)
            .with_role_name("r1", "Moderators");
        assert!(!ctx.is_direct());
        assert_eq!(ctx.capability("manage_messages"), Some(true));
        assert_eq!(ctx.capability("administrator"), None);
        assert_eq!(ctx.role_name("r1"), Some("Moderators"));
        assert_eq!(ctx.role_name("r2"), None);
    }

    #[test]
    fn invocation_command_path() {
        let actor = StaticActor::new("u1");
        let ctx = StaticContext::direct();
        let path = ["admin", "alias"];
        let inv = Invocation {
            actor: &actor,
            context: &ctx,
            path: &path,
        };
        assert_eq!(inv.command(), "alias");
        assert_eq!(inv.command_path(), "admin alias");

        let root = Invocation {
            actor: &actor,
            context: &ctx,
            path: &[],
        };
        assert_eq!(root.command(), "");
    }
}
