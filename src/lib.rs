// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Forward log entries to a Discord channel as rich embeds.
//!
//! # Overview
//!
//! A [`DiscordTransport`] turns each [`LogEntry`] into an embed (title, optional error
//! description, a level color and a metadata table) and posts it through a Discord webhook or a
//! bot. Delivery is fire-and-forget: it happens on a background thread, and failures are
//! reported to a [`Trap`](logforth_core::Trap) instead of the logging call site.
//!
//! The destination comes from [`DiscordTransportOptions`], falling back to the
//! `DISCORD_LOGGING_WEBHOOK_URL`, `DISCORD_LOGGING_BOT_CHANNEL` and `DISCORD_LOGGING_BOT_TOKEN`
//! environment variables.
//!
//! # Examples
//!
//! Log entries directly:
//!
//! ```
//! use logforth_append_discord::Completion;
//! use logforth_append_discord::DiscordTransport;
//! use logforth_append_discord::DiscordTransportOptions;
//! use logforth_append_discord::LogEntry;
//!
//! let options = DiscordTransportOptions::default()
//!     .webhook("https://discord.com/api/webhooks/1/abc")
//!     .metadata("service", "billing")
//!     .silent(true);
//! let transport = DiscordTransport::new(options).unwrap();
//!
//! let entry = LogEntry::builder()
//!     .level("error")
//!     .message("disk check failed")
//!     .meta("host", "db-1")
//!     .build();
//! transport.log(entry, Completion::new(|| println!("done")));
//! ```
//!
//! Or append the records of a logforth [`Logger`](logforth_core::Logger):
//!
//! ```
//! use logforth_append_discord::DiscordTransport;
//! use logforth_append_discord::DiscordTransportOptions;
//! use logforth_core::kv::Key;
//! use logforth_core::kv::Value;
//! use logforth_core::record::Level;
//! use logforth_core::record::Record;
//!
//! let options = DiscordTransportOptions::default()
//!     .webhook("https://discord.com/api/webhooks/1/abc")
//!     .level("warn")
//!     .silent(true);
//!
//! let logger = logforth_core::builder()
//!     .dispatch(|d| d.append(DiscordTransport::new(options).unwrap()))
//!     .build();
//!
//! let kvs = [(Key::new("host"), Value::from("db-1"))];
//! let record = Record::builder()
//!     .level(Level::Error)
//!     .payload("disk check failed")
//!     .key_values(kvs.as_slice())
//!     .build();
//! logger.log(&record);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod color;
pub mod config;
pub mod embed;
pub mod entry;
pub mod format;
pub mod handler;
pub mod post;

pub use color::ColorPalette;
pub use config::DiscordTransportOptions;
pub use entry::ErrorValue;
pub use entry::Level;
pub use entry::LogEntry;
pub use entry::Metadata;

mod completion;
pub use completion::Completion;

mod transport;
pub use transport::DiscordTransport;
pub use transport::DiscordTransportBuilder;
