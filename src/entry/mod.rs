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

//! Log entries and their parts.

use std::collections::BTreeMap;

mod error_value;
mod level;
mod record;

pub use self::error_value::ErrorValue;
pub use self::level::Level;

/// Key-value pairs attached to a message, either to every message of a transport or to a single
/// entry.
pub type Metadata = BTreeMap<String, String>;

/// An extra positional value passed along with a log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// An error value.
    Error(ErrorValue),
    /// Any other value, in its display form.
    Value(String),
}

impl Argument {
    /// The error carried by this argument, if it is one.
    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Argument::Error(err) => Some(err),
            Argument::Value(_) => None,
        }
    }
}

impl From<ErrorValue> for Argument {
    fn from(err: ErrorValue) -> Self {
        Argument::Error(err)
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Value(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Value(value.to_string())
    }
}

/// A single log entry handed to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    level: Level,
    message: String,
    error: Option<ErrorValue>,
    arguments: Vec<Argument>,
    meta: Metadata,
}

impl LogEntry {
    /// Returns a new builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use logforth_append_discord::ErrorValue;
    /// use logforth_append_discord::Level;
    /// use logforth_append_discord::LogEntry;
    ///
    /// let entry = LogEntry::builder()
    ///     .level(Level::Error)
    ///     .message("disk check failed")
    ///     .error(ErrorValue::new("disk full"))
    ///     .meta("volume", "/dev/sda1")
    ///     .build();
    /// assert_eq!(entry.message(), "disk check failed");
    /// ```
    pub fn builder() -> LogEntryBuilder {
        LogEntryBuilder::default()
    }

    /// The severity of the entry.
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// The message body.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The error attached to the entry.
    pub fn error(&self) -> Option<&ErrorValue> {
        self.error.as_ref()
    }

    /// Extra positional values.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Entry-level metadata.
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    pub(crate) fn set_error(&mut self, error: ErrorValue) {
        self.error = Some(error);
    }
}

/// Builder for [`LogEntry`].
#[derive(Debug, Default)]
pub struct LogEntryBuilder {
    entry: LogEntry,
}

impl LogEntryBuilder {
    /// Set [`level`](LogEntry::level).
    pub fn level(mut self, level: impl Into<Level>) -> Self {
        self.entry.level = level.into();
        self
    }

    /// Set [`message`](LogEntry::message).
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.entry.message = message.into();
        self
    }

    /// Set [`error`](LogEntry::error).
    pub fn error(mut self, error: impl Into<ErrorValue>) -> Self {
        self.entry.error = Some(error.into());
        self
    }

    /// Append an extra positional value.
    pub fn argument(mut self, argument: impl Into<Argument>) -> Self {
        self.entry.arguments.push(argument.into());
        self
    }

    /// Add an entry-level metadata pair, replacing a previous value under the same key.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entry.meta.insert(key.into(), value.into());
        self
    }

    /// Invoke the builder and return a [`LogEntry`].
    pub fn build(self) -> LogEntry {
        self.entry
    }
}
