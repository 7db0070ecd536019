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

use std::fmt;

use logforth_core::record::Level as RecordLevel;
use serde::Deserialize;

/// The severity of a log entry.
///
/// The six named levels follow the npm convention. Any other name is kept as
/// [`Level::Custom`] so that entries with an unknown level can still be formatted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Level {
    /// `error`
    Error,
    /// `warn`
    Warn,
    /// `info`
    #[default]
    Info,
    /// `verbose`
    Verbose,
    /// `debug`
    Debug,
    /// `silly`
    Silly,
    /// A level outside the built-in vocabulary.
    Custom(String),
}

impl Level {
    /// Parse a level name. Never fails: unknown names become [`Level::Custom`].
    ///
    /// # Examples
    ///
    /// ```
    /// use logforth_append_discord::Level;
    ///
    /// assert_eq!(Level::from_name("warn"), Level::Warn);
    /// assert_eq!(Level::from_name("audit"), Level::Custom("audit".to_string()));
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name {
            "error" => Level::Error,
            "warn" => Level::Warn,
            "info" => Level::Info,
            "verbose" => Level::Verbose,
            "debug" => Level::Debug,
            "silly" => Level::Silly,
            custom => Level::Custom(custom.to_string()),
        }
    }

    /// The name of this level.
    pub fn name(&self) -> &str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Verbose => "verbose",
            Level::Debug => "debug",
            Level::Silly => "silly",
            Level::Custom(name) => name,
        }
    }

    /// The numeric severity, lower is more severe. Custom levels have none.
    pub fn severity(&self) -> Option<u8> {
        match self {
            Level::Error => Some(0),
            Level::Warn => Some(1),
            Level::Info => Some(2),
            Level::Verbose => Some(4),
            Level::Debug => Some(5),
            Level::Silly => Some(6),
            Level::Custom(_) => None,
        }
    }

    /// Whether an entry at this level passes a `threshold`.
    ///
    /// Levels without a severity on either side always pass.
    pub fn passes(&self, threshold: &Level) -> bool {
        match (self.severity(), threshold.severity()) {
            (Some(this), Some(threshold)) => this <= threshold,
            _ => true,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Level {
    fn from(name: &str) -> Self {
        Level::from_name(name)
    }
}

impl From<String> for Level {
    fn from(name: String) -> Self {
        match Level::from_name(&name) {
            Level::Custom(_) => Level::Custom(name),
            level => level,
        }
    }
}

impl From<RecordLevel> for Level {
    fn from(level: RecordLevel) -> Self {
        // numbered severities such as `WARN2` fold into their base level
        let name = level.to_string();
        match name.trim().trim_end_matches(|c: char| c.is_ascii_digit()) {
            "FATAL" | "CRIT" | "ERROR" => Level::Error,
            "WARN" => Level::Warn,
            "INFO" => Level::Info,
            "DEBUG" => Level::Debug,
            "TRACE" => Level::Silly,
            other => Level::Custom(other.to_ascii_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_total() {
        for name in ["error", "warn", "info", "verbose", "debug", "silly"] {
            assert_eq!(Level::from_name(name).name(), name);
        }
        assert_eq!(Level::from_name("ERROR"), Level::Custom("ERROR".to_string()));
        assert_eq!(Level::from(String::from("")), Level::Custom(String::new()));
    }

    #[test]
    fn test_passes_threshold() {
        assert!(Level::Error.passes(&Level::Info));
        assert!(Level::Info.passes(&Level::Info));
        assert!(!Level::Verbose.passes(&Level::Info));
        assert!(!Level::Silly.passes(&Level::Debug));
        assert!(Level::Custom("audit".to_string()).passes(&Level::Error));
        assert!(Level::Silly.passes(&Level::Custom("audit".to_string())));
    }

    #[test]
    fn test_from_record_level() {
        assert_eq!(Level::from(RecordLevel::Trace), Level::Silly);
        assert_eq!(Level::from(RecordLevel::Warn), Level::Warn);
        assert_eq!(Level::from(RecordLevel::Error), Level::Error);
    }
}
