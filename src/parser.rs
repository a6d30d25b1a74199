// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! JSON parsing for DiscordChatExporter exports.
//!
//! This module handles deserialization of the `Json` format written by
//! DiscordChatExporter. Only the parts needed to build a digest are kept;
//! everything else in the export (guild, date range, attachments, reactions)
//! is ignored.
//!
//! # Format Overview
//!
//! An export contains:
//! - Metadata about the guild and channel
//! - The time the export was taken
//! - A list of messages, each with content, author and timestamp
//!
//! Every message field is optional. A missing or `null` field never fails
//! parsing; it is resolved to a default when the message is displayed.
//!
//! # Example
//!
//! ```
//! use dce2md::parser::parse_conversation;
//!
//! let json = r#"{
//!     "channel": { "id": "42", "name": "general" },
//!     "messages": [{
//!         "timestamp": "2024-01-01T10:00:00.123+00:00",
//!         "content": "Hello",
//!         "author": { "name": "alice", "nickname": "Alice" }
//!     }]
//! }"#;
//!
//! let conversation = parse_conversation(json).unwrap();
//! assert_eq!(conversation.messages.len(), 1);
//! assert_eq!(conversation.messages[0].display_author(), "Alice");
//! ```

use serde::Deserialize;
use snafu::prelude::*;

/// Author name used when a message carries neither a nickname nor a name.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Error type for JSON parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// Failed to parse JSON content.
    #[snafu(display("failed to parse JSON: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },
}

/// The root structure of a DiscordChatExporter export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// The exported channel, if the export describes it.
    #[serde(default)]
    pub channel: Option<Channel>,

    /// When the export was taken, as written by the exporter.
    #[serde(default)]
    pub exported_at: Option<String>,

    /// The exported messages in channel order.
    ///
    /// Exports without a `messages` field (or with `null`) yield an empty list.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: Vec<Message>,
}

/// Channel metadata carried alongside the messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Channel {
    /// Discord snowflake identifier of the channel.
    #[serde(default)]
    pub id: Option<String>,

    /// Channel name without the leading `#`.
    #[serde(default)]
    pub name: Option<String>,
}

/// A single message in the conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Message {
    /// The message text, possibly multi-line or empty.
    #[serde(default)]
    pub content: Option<String>,

    /// Who sent the message.
    #[serde(default)]
    pub author: Option<Author>,

    /// When the message was sent (e.g. `2024-01-01T10:00:00.123+00:00`).
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The author of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Author {
    /// Server-specific display name.
    #[serde(default)]
    pub nickname: Option<String>,

    /// Account name.
    #[serde(default)]
    pub name: Option<String>,
}

impl Message {
    /// Returns the message text, or an empty string if it has none.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Returns the author's nickname, falling back to the account name and
    /// then to [`UNKNOWN_AUTHOR`].
    #[must_use]
    pub fn display_author(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.nickname.as_deref().or(a.name.as_deref()))
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Returns the timestamp in `YYYY-MM-DD HH:MM:SS` form.
    ///
    /// Everything from the first `.` onwards is dropped and each `T` becomes a
    /// space. Malformed values pass through unchanged; a missing timestamp
    /// yields an empty string.
    #[must_use]
    pub fn display_timestamp(&self) -> String {
        let raw = self.timestamp.as_deref().unwrap_or_default();
        let seconds = raw.split_once('.').map_or(raw, |(head, _)| head);
        seconds.replace('T', " ")
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parses a JSON string into a [`Conversation`].
///
/// This is the main entry point for parsing exports.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or a field holds a value of the
/// wrong type (for example a numeric `content`).
///
/// # Example
///
/// ```
/// use dce2md::parser::parse_conversation;
///
/// let conversation = parse_conversation("{}").unwrap();
/// assert!(conversation.messages.is_empty());
/// ```
pub fn parse_conversation(json_str: &str) -> Result<Conversation, ParseError> {
    serde_json::from_str(json_str).context(JsonSnafu)
}
