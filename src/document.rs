// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Wrapping of a [`Summary`] into a complete Markdown document.
//!
//! The compressor produces bare message blocks. This module adds the title
//! banner and, for channel banners, the time the digest was exported.
//!
//! # Example
//!
//! ```
//! use chrono::{Local, TimeZone};
//! use dce2md::compressor::Summary;
//! use dce2md::document::{render_document, Banner, DocumentOptions};
//!
//! let summary = Summary {
//!     text: "- Alice (2024-01-01 10:00:00): hello".into(),
//!     message_count: 1,
//! };
//! let opts = DocumentOptions { banner: Banner::Plain, ..Default::default() };
//! let exported_at = Local.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
//!
//! let markdown = render_document(&summary, "42", exported_at, &opts);
//! assert_eq!(
//!     markdown,
//!     "# Compressed Conversation Summary\n\n- Alice (2024-01-01 10:00:00): hello"
//! );
//! ```

use crate::compressor::Summary;
use chrono::{DateTime, Local};
use std::str::FromStr;

/// Title convention used at the top of the digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Banner {
    /// `# Discord Channel {id} - Conversation Summary` plus an export line.
    #[default]
    Channel,
    /// `# Compressed Conversation Summary` with nothing else.
    Plain,
}

impl FromStr for Banner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "channel" => Ok(Self::Channel),
            "plain" => Ok(Self::Plain),
            other => Err(format!("unknown banner '{other}' (expected channel or plain)")),
        }
    }
}

/// Configuration options for document rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Which title convention to use.
    pub banner: Banner,

    /// Number of heading levels to shift (0-5).
    ///
    /// A value of 0 produces an H1 title (default).
    pub heading_offset: u8,
}

/// Returns a markdown heading prefix with the given level and offset.
///
/// The heading level is clamped to a maximum of 6 (H6).
fn heading(level: u8, offset: u8) -> String {
    let actual = level.saturating_add(offset).min(6);
    "#".repeat(actual as usize)
}

/// Renders a summary as a Markdown document.
///
/// `exported_at` is only shown with [`Banner::Channel`]. The summary text is
/// appended unchanged, with no trailing newline.
#[must_use]
pub fn render_document(
    summary: &Summary,
    channel_id: &str,
    exported_at: DateTime<Local>,
    opts: &DocumentOptions,
) -> String {
    let prefix = heading(1, opts.heading_offset);
    let mut out = match opts.banner {
        Banner::Channel => format!(
            "{prefix} Discord Channel {channel_id} - Conversation Summary\n\n\
             _Exported on {}_\n\n",
            exported_at.format("%Y-%m-%d %H:%M:%S")
        ),
        Banner::Plain => format!("{prefix} Compressed Conversation Summary\n\n"),
    };

    out.push_str(&summary.text);
    out
}
