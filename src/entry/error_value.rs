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

use std::backtrace::BacktraceStatus;
use std::fmt;
use std::fmt::Write;

/// An error attached to a log entry, captured as text.
///
/// The [`Display`](fmt::Display) form is `"{name}: {message}"`. The optional stack is a longer
/// rendering that starts with that line, followed by the causes and, when one was captured, a
/// backtrace.
///
/// # Examples
///
/// ```
/// use logforth_append_discord::ErrorValue;
///
/// let err = ErrorValue::new("disk full");
/// assert_eq!(err.to_string(), "Error: disk full");
/// assert_eq!(err.render(), "Error: disk full");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    name: String,
    message: String,
    stack: Option<String>,
}

impl ErrorValue {
    /// Create an error value named `Error` with the given message and no stack.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: "Error".to_string(),
            message: message.into(),
            stack: None,
        }
    }

    /// Set the name of the error, e.g. `TypeError`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the stack rendering of the error.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Capture an error and its chain of causes.
    ///
    /// An error without a cause has no stack; otherwise every cause is listed below the first
    /// line.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let value = ErrorValue::new(err.to_string());

        let mut causes = CauseChain::new(&value);
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause);
            source = cause.source();
        }

        match causes.finish() {
            Some(stack) => value.with_stack(stack),
            None => value,
        }
    }

    /// The name of the error.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The message of the error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The stack rendering, if any.
    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    /// The stack if there is one, otherwise the `Display` form.
    pub fn render(&self) -> String {
        match &self.stack {
            Some(stack) => stack.clone(),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

impl From<anyhow::Error> for ErrorValue {
    fn from(err: anyhow::Error) -> Self {
        ErrorValue::from(&err)
    }
}

impl From<&anyhow::Error> for ErrorValue {
    fn from(err: &anyhow::Error) -> Self {
        let value = ErrorValue::new(err.to_string());

        let mut causes = CauseChain::new(&value);
        for cause in err.chain().skip(1) {
            causes.push(cause);
        }

        let backtrace = err.backtrace();
        if backtrace.status() == BacktraceStatus::Captured {
            causes.backtrace(backtrace);
        }

        match causes.finish() {
            Some(stack) => value.with_stack(stack),
            None => value,
        }
    }
}

impl From<std::io::Error> for ErrorValue {
    fn from(err: std::io::Error) -> Self {
        ErrorValue::from_error(&err)
    }
}

struct CauseChain {
    text: String,
    extended: bool,
}

impl CauseChain {
    fn new(head: &ErrorValue) -> Self {
        Self {
            text: head.to_string(),
            extended: false,
        }
    }

    fn push(&mut self, cause: &dyn std::error::Error) {
        // SAFETY: write to a string always succeeds
        write!(&mut self.text, "\n    caused by: {cause}").unwrap();
        self.extended = true;
    }

    fn backtrace(&mut self, backtrace: &std::backtrace::Backtrace) {
        // SAFETY: write to a string always succeeds
        write!(&mut self.text, "\n{backtrace}").unwrap();
        self.extended = true;
    }

    fn finish(self) -> Option<String> {
        self.extended.then_some(self.text)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[derive(Debug)]
    struct Wrapped(io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("disk check failed")
        }
    }

    impl std::error::Error for Wrapped {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(ErrorValue::new("boom").to_string(), "Error: boom");
        assert_eq!(
            ErrorValue::new("bad").with_name("TypeError").to_string(),
            "TypeError: bad"
        );
        assert_eq!(ErrorValue::new("").to_string(), "Error");
    }

    #[test]
    fn test_render_prefers_stack() {
        let err = ErrorValue::new("boom").with_stack("Error: boom\n    at main");
        assert_eq!(err.render(), "Error: boom\n    at main");
        assert_eq!(ErrorValue::new("boom").render(), "Error: boom");
    }

    #[test]
    fn test_from_error_without_cause_has_no_stack() {
        let err = ErrorValue::from(io::Error::other("disk full"));
        assert_eq!(err.message(), "disk full");
        assert_eq!(err.stack(), None);
    }

    #[test]
    fn test_from_error_lists_causes() {
        let err = Wrapped(io::Error::other("disk full"));
        let value = ErrorValue::from_error(&err);
        assert_eq!(
            value.stack(),
            Some("Error: disk check failed\n    caused by: disk full")
        );
    }

    #[test]
    fn test_from_anyhow_lists_context() {
        let err = anyhow::anyhow!("disk full").context("disk check failed");
        let value = ErrorValue::from(&err);
        assert_eq!(value.message(), "disk check failed");
        let stack = value.stack().unwrap();
        assert!(stack.starts_with("Error: disk check failed\n    caused by: disk full"));
    }
}
