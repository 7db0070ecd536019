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

use logforth_core::Diagnostic;
use logforth_core::Error;
use logforth_core::kv::Key;
use logforth_core::kv::Value;
use logforth_core::kv::Visitor;
use logforth_core::record::Record;

use crate::entry::ErrorValue;
use crate::entry::Level;
use crate::entry::LogEntry;
use crate::entry::Metadata;

// keys whose value becomes the entry's own error
const ERROR_KEYS: [&str; 2] = ["error", "err"];

impl LogEntry {
    /// Convert a logforth [`Record`] and the diagnostics of its dispatch into an entry.
    ///
    /// The first key-value named `error` or `err` becomes the entry's error. Every other
    /// key-value, then every diagnostic, is kept as entry metadata in its display form; a record
    /// key-value wins over a diagnostic of the same name.
    pub fn from_record(record: &Record, diags: &[Box<dyn Diagnostic>]) -> Result<Self, Error> {
        let mut kvs = KvCollector::default();
        record.key_values().visit(&mut kvs)?;

        let mut diagnostics = KvCollector::default();
        for d in diags {
            d.visit(&mut diagnostics)?;
        }

        let KvCollector { error, mut meta } = kvs;
        for (key, value) in diagnostics.meta {
            meta.entry(key).or_insert(value);
        }

        Ok(LogEntry {
            level: Level::from(record.level()),
            message: record.payload().to_string(),
            error,
            arguments: vec![],
            meta,
        })
    }
}

#[derive(Default)]
struct KvCollector {
    error: Option<ErrorValue>,
    meta: Metadata,
}

impl Visitor for KvCollector {
    fn visit(&mut self, key: Key, value: Value) -> Result<(), Error> {
        let key = key.to_string();
        let value = value.to_string();

        if self.error.is_none() && ERROR_KEYS.contains(&key.as_str()) {
            self.error = Some(ErrorValue::new(value));
        } else {
            self.meta.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use logforth_core::record::Level as RecordLevel;

    use super::*;

    #[derive(Debug)]
    struct Region;

    impl Diagnostic for Region {
        fn visit(&self, visitor: &mut dyn Visitor) -> Result<(), Error> {
            visitor.visit(Key::new("region"), Value::from("eu-west-1"))?;
            visitor.visit(Key::new("volume"), Value::from("shadowed"))
        }
    }

    #[test]
    fn test_plain_record() {
        let record = Record::builder()
            .level(RecordLevel::Warn)
            .payload("disk at 93%")
            .build();

        let entry = LogEntry::from_record(&record, &[]).unwrap();
        assert_eq!(entry.level(), &Level::Warn);
        assert_eq!(entry.message(), "disk at 93%");
        assert!(entry.error().is_none());
        assert!(entry.arguments().is_empty());
        assert!(entry.meta().is_empty());
    }

    #[test]
    fn test_record_key_values_and_diagnostics() {
        let kvs = [
            (Key::new("volume"), Value::from("/dev/sda1")),
            (Key::new("error"), Value::from("disk full")),
            (Key::new("err"), Value::from("second error")),
        ];
        let record = Record::builder()
            .level(RecordLevel::Error)
            .payload("disk check failed")
            .key_values(kvs.as_slice())
            .build();

        let diags: Vec<Box<dyn Diagnostic>> = vec![Box::new(Region)];
        let entry = LogEntry::from_record(&record, &diags).unwrap();
        assert_eq!(entry.level(), &Level::Error);
        assert_eq!(entry.error().map(|e| e.message()), Some("disk full"));

        let meta: Vec<_> = entry
            .meta()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(
            meta,
            [
                ("err", "second error"),
                ("region", "eu-west-1"),
                ("volume", "/dev/sda1"),
            ]
        );
    }
}
