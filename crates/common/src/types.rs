use serde::{Deserialize, Serialize};

/// Scope in which a message was sent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    /// One-to-one conversation with the bot.
    Dm,
    /// Multi-party group (guild, server, group chat).
    #[default]
    Group,
    /// Broadcast channel inside a group.
    Channel,
}

impl ChatType {
    /// Whether this is a direct (non-grouped) interaction.
    #[must_use]
    pub fn is_direct(self) -> bool {
        matches!(self, Self::Dm)
    }
}

impl std::fmt::Display for ChatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dm => write!(f, "dm"),
            Self::Group => write!(f, "group"),
            Self::Channel => write!(f, "channel"),
        }
    }
}
