// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Export Discord channels and compress them into Markdown digests.
//!
//! This crate drives DiscordChatExporter and turns its JSON output into a
//! compact, readable summary with one short block per message.
//!
//! # Overview
//!
//! 1. Run the exporter in a container to produce a JSON export
//! 2. Parse the export into typed Rust representations
//! 3. Compress the messages into a digest
//! 4. Wrap the digest in a titled Markdown document
//!
//! # Example
//!
//! ```no_run
//! use dce2md::{compressor, document, parser};
//!
//! let json = std::fs::read_to_string("export.json").unwrap();
//! let conversation = parser::parse_conversation(&json).unwrap();
//!
//! let summary = compressor::compress_conversation(&conversation);
//! let markdown = document::render_document(
//!     &summary,
//!     "1332237033673850880",
//!     chrono::Local::now(),
//!     &document::DocumentOptions::default(),
//! );
//! println!("{markdown}");
//! ```
//!
//! # Modules
//!
//! - [`parser`]: JSON parsing and type definitions for exports
//! - [`compressor`]: per-message formatting into a digest
//! - [`document`]: title banner around the digest
//! - [`exporter`]: running the exporter container and finding its output

#![deny(missing_docs)]

pub mod compressor;
pub mod document;
pub mod exporter;
pub mod parser;
