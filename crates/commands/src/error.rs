/// Boxed error returned by response handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Crate-wide result type for command tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or dispatching a command tree.
///
/// Everything except [`Error::Handler`] is a setup mistake and is reported
/// synchronously by the registration call that caused it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Label or alias contains whitespace (or is empty).
    #[error("invalid command label: {label:?}")]
    InvalidLabel { label: String },

    /// Label is already taken by a child or an alias under the same parent.
    #[error("command label already registered: {label}")]
    DuplicateLabel { label: String },

    /// Alias is already taken by a child or an alias under the same parent.
    #[error("command alias already registered: {alias}")]
    DuplicateAlias { alias: String },

    /// Alias target is not a registered child.
    #[error("unknown command label: {label}")]
    UnknownLabel { label: String },

    /// Nothing to unregister under this label.
    #[error("no command or alias named {label}")]
    NotFound { label: String },

    /// A weighted response set was registered with no members.
    #[error("command {label} has an empty response set")]
    EmptyResponseSet { label: String },

    /// The response handler of the resolved command failed.
    #[error("command {command} failed: {source}")]
    Handler {
        command: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_label(label: impl Into<String>) -> Self {
        Self::InvalidLabel {
            label: label.into(),
        }
    }

    #[must_use]
    pub fn duplicate_label(label: impl Into<String>) -> Self {
        Self::DuplicateLabel {
            label: label.into(),
        }
    }

    #[must_use]
    pub fn duplicate_alias(alias: impl Into<String>) -> Self {
        Self::DuplicateAlias {
            alias: alias.into(),
        }
    }

    #[must_use]
    pub fn handler(command: impl Into<String>, source: BoxError) -> Self {
        Self::Handler {
            command: command.into(),
            source,
        }
    }
}
