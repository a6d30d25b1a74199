// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Compression of a parsed conversation into a plain-text digest.
//!
//! Each message with non-blank content becomes one block:
//!
//! ```text
//! - Alice (2024-01-01 10:00:00): single line
//!
//! - Bob (2024-01-01 10:01:00):
//!       first line
//!       second line
//! ```
//!
//! Blocks keep the order of the export and are separated by exactly one
//! blank line. Messages with empty or whitespace-only content are dropped
//! and do not count towards [`Summary::message_count`].
//!
//! # Example
//!
//! ```
//! use dce2md::compressor::compress_conversation;
//! use dce2md::parser::{Author, Conversation, Message};
//!
//! let conversation = Conversation {
//!     messages: vec![Message {
//!         content: Some("hello".into()),
//!         author: Some(Author { nickname: None, name: Some("Alice".into()) }),
//!         timestamp: Some("2024-01-01T10:00:00.123Z".into()),
//!     }],
//!     ..Default::default()
//! };
//!
//! let summary = compress_conversation(&conversation);
//! assert_eq!(summary.text, "- Alice (2024-01-01 10:00:00): hello");
//! assert_eq!(summary.message_count, 1);
//! ```

use crate::parser::{Conversation, Message};
use tracing::info;

/// Indentation applied to every line of a multi-line message.
const CONTINUATION_INDENT: &str = "      ";

/// Separator placed between consecutive message blocks.
const BLOCK_SEPARATOR: &str = "\n\n";

/// The compressed form of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// The formatted blocks joined by blank lines, without any header.
    pub text: String,

    /// Number of messages that produced a block.
    pub message_count: usize,
}

/// Compresses a conversation into a [`Summary`].
///
/// Logs the number of retained messages at `info` level.
#[must_use]
pub fn compress_conversation(conversation: &Conversation) -> Summary {
    let blocks: Vec<String> = conversation
        .messages
        .iter()
        .filter_map(format_message)
        .collect();

    let message_count = blocks.len();
    info!(message_count, "compressed conversation");

    Summary {
        text: blocks.join(BLOCK_SEPARATOR),
        message_count,
    }
}

/// Formats a single message as a digest block.
///
/// Returns `None` when the content is empty or only whitespace. Content is
/// split on `\n` as exported, so a trailing newline produces a final line
/// holding only the indent.
#[must_use]
pub fn format_message(msg: &Message) -> Option<String> {
    let content = msg.text();
    if content.trim().is_empty() {
        return None;
    }

    let author = msg.display_author();
    let timestamp = msg.display_timestamp();

    if content.contains('\n') {
        let separator = format!("\n{CONTINUATION_INDENT}");
        let body = content.split('\n').collect::<Vec<_>>().join(separator.as_str());
        Some(format!(
            "- {author} ({timestamp}):\n{CONTINUATION_INDENT}{body}"
        ))
    } else {
        Some(format!("- {author} ({timestamp}): {content}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Author;

    fn make_conversation(messages: Vec<Message>) -> Conversation {
        Conversation {
            messages,
            ..Default::default()
        }
    }

    fn make_message(content: &str, author: &str) -> Message {
        Message {
            content: Some(content.into()),
            author: Some(Author {
                nickname: None,
                name: Some(author.into()),
            }),
            timestamp: Some("2024-01-01T10:00:00.123Z".into()),
        }
    }

    #[test]
    fn formats_single_line_message() {
        let msg = make_message("hello", "Alice");
        assert_eq!(
            format_message(&msg).as_deref(),
            Some("- Alice (2024-01-01 10:00:00): hello")
        );
    }

    #[test]
    fn formats_multi_line_message_with_indent() {
        let msg = Message {
            content: Some("line1\nline2".into()),
            author: Some(Author {
                nickname: Some("Bob".into()),
                name: None,
            }),
            timestamp: Some("2024-01-01T10:00:00".into()),
        };
        assert_eq!(
            format_message(&msg).as_deref(),
            Some("- Bob (2024-01-01 10:00:00):\n      line1\n      line2")
        );
    }

    #[test]
    fn multi_line_block_has_header_plus_one_line_per_content_line() {
        let msg = make_message("a\nb\n\nc", "Alice");
        let block = format_message(&msg).unwrap();
        let lines: Vec<&str> = block.split('\n').collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with(':'));
        for line in &lines[1..] {
            assert!(line.starts_with(CONTINUATION_INDENT));
        }
        assert_eq!(lines[3], CONTINUATION_INDENT);
    }

    #[test]
    fn trailing_newline_yields_empty_indented_line() {
        let msg = make_message("hi\n", "Alice");
        assert_eq!(
            format_message(&msg).as_deref(),
            Some("- Alice (2024-01-01 10:00:00):\n      hi\n      ")
        );
    }

    #[test]
    fn skips_whitespace_only_content() {
        assert!(format_message(&make_message("   ", "X")).is_none());
        assert!(format_message(&make_message("\n\t\n", "X")).is_none());
        assert!(format_message(&make_message("", "X")).is_none());
    }

    #[test]
    fn skips_missing_content() {
        let msg = Message {
            content: None,
            ..make_message("", "X")
        };
        assert!(format_message(&msg).is_none());
    }

    #[test]
    fn renders_unknown_author_and_empty_timestamp() {
        let msg = Message {
            content: Some("orphan".into()),
            author: None,
            timestamp: None,
        };
        assert_eq!(
            format_message(&msg).as_deref(),
            Some("- Unknown (): orphan")
        );
    }

    #[test]
    fn whitespace_only_conversation_is_empty() {
        let mut msg = make_message("  ", "X");
        msg.timestamp = None;
        let summary = compress_conversation(&make_conversation(vec![msg]));

        assert_eq!(summary.text, "");
        assert_eq!(summary.message_count, 0);
    }

    #[test]
    fn empty_conversation_is_empty() {
        let summary = compress_conversation(&Conversation::default());
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn separates_blocks_with_one_blank_line() {
        let summary = compress_conversation(&make_conversation(vec![
            make_message("first", "Alice"),
            make_message("second", "Bob"),
        ]));

        assert_eq!(
            summary.text,
            "- Alice (2024-01-01 10:00:00): first\n\n- Bob (2024-01-01 10:00:00): second"
        );
        assert_eq!(summary.text.matches("\n\n").count(), 1);
        assert_eq!(summary.message_count, 2);
    }

    #[test]
    fn dropped_messages_do_not_disturb_neighbours() {
        let summary = compress_conversation(&make_conversation(vec![
            make_message("first", "Alice"),
            make_message(" \n ", "Ghost"),
            make_message("one\ntwo", "Bob"),
            make_message("", "Ghost"),
            make_message("last", "Carol"),
        ]));

        assert_eq!(summary.message_count, 3);
        assert_eq!(
            summary.text,
            "- Alice (2024-01-01 10:00:00): first\n\n\
             - Bob (2024-01-01 10:00:00):\n      one\n      two\n\n\
             - Carol (2024-01-01 10:00:00): last"
        );
        assert!(!summary.text.contains("Ghost"));
    }

    #[test]
    fn count_matches_block_count() {
        let summary = compress_conversation(&make_conversation(vec![
            make_message("a", "A"),
            make_message("b\nc", "B"),
            make_message("   ", "C"),
            make_message("d", "D"),
        ]));

        let blocks = summary.text.split(BLOCK_SEPARATOR).count();
        assert_eq!(summary.message_count, blocks);
        assert_eq!(blocks, 3);
    }

    #[test]
    fn compression_is_deterministic() {
        let conversation = make_conversation(vec![
            make_message("a", "A"),
            make_message("b\nc", "B"),
        ]);

        assert_eq!(
            compress_conversation(&conversation),
            compress_conversation(&conversation)
        );
    }

    #[test]
    fn does_not_trim_retained_content() {
        let msg = make_message("  padded  ", "Alice");
        assert_eq!(
            format_message(&msg).as_deref(),
            Some("- Alice (2024-01-01 10:00:00):   padded  ")
        );
    }
}
