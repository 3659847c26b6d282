use {
    herald_commands::{CommandOptions, Requirements, ResponseGenerator},
    serde::{Deserialize, Serialize},
};

/// Root of a command tree file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeraldConfig {
    /// Message prefix that marks a command (e.g. `!ping`).
    pub prefix: String,
    /// Top-level commands registered under the root.
    pub commands: Vec<CommandConfig>,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            prefix: "!".into(),
            commands: Vec::new(),
        }
    }
}

/// One command and its subcommands.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommandConfig {
    pub label: String,
    pub aliases: Vec<String>,
    /// Omitted for commands that only group subcommands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseConfig>,
    pub case_insensitive: bool,
    pub delete_invoking_message: bool,
    pub guild_only: bool,
    pub requirements: Requirements,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CommandConfig>,
}

/// `response = "text"` or `response = ["a", "b", "c"]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResponseConfig {
    Text(String),
    OneOf(Vec<String>),
}

impl CommandConfig {
    pub fn generator(&self) -> ResponseGenerator {
        match &self.response {
            Some(ResponseConfig::Text(text)) => ResponseGenerator::text(text.as_str()),
            Some(ResponseConfig::OneOf(texts)) => ResponseGenerator::choice_of_texts(texts.clone()),
            None => ResponseGenerator::silent(),
        }
    }

    pub fn options(&self) -> CommandOptions {
        CommandOptions {
            aliases: self.aliases.clone(),
            case_insensitive: self.case_insensitive,
            delete_invoking_message: self.delete_invoking_message,
            guild_only: self.guild_only,
            requirements: self.requirements.clone(),
        }
    }
}
