//! Slash command payloads.

use serde::{Deserialize, Serialize};

/// A slash command invocation (`/weather london`).
///
/// Every field is optional on the wire; missing fields deserialize to empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlashCommand {
    /// The command name, including the leading `/`.
    pub command: String,
    /// Everything typed after the command name.
    pub text: String,
    pub user_id: String,
    pub user_name: String,
    pub channel_id: String,
    pub channel_name: String,
    pub team_id: String,
    pub team_domain: String,
    pub api_app_id: String,
    /// URL for delayed responses.
    pub response_url: String,
    /// Short-lived id used to open a modal in response to this command.
    pub trigger_id: String,
}

impl SlashCommand {
    /// Creates a command with the given name, normalising the leading `/`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: normalize_command(command.into()),
            ..Default::default()
        }
    }

    /// Sets the command text (builder style).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the trigger id (builder style).
    pub fn with_trigger_id(mut self, trigger_id: impl Into<String>) -> Self {
        self.trigger_id = trigger_id.into();
        self
    }
}

/// Prefixes `command` with `/` unless it already starts with one.
pub fn normalize_command(command: String) -> String {
    if command.starts_with('/') {
        command
    } else {
        format!("/{command}")
    }
}
