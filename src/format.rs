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

//! Turning log entries into embeds.
//!
//! Every function here is total: a missing part of the entry is left out of the embed instead of
//! raising an error.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use jiff::Timestamp;
use regex::Regex;

use crate::ColorPalette;
use crate::Level;
use crate::LogEntry;
use crate::Metadata;
use crate::embed::Embed;
use crate::embed::EmbedField;

const TITLE_LIMIT: usize = 256;
const FIELD_VALUE_LIMIT: usize = 1024;
const DESCRIPTION_LIMIT: usize = 4096;
// title, description, field names and field values together
const EMBED_LIMIT: usize = 6000;
const FENCE: &str = "```";
const ELLIPSIS: char = '…';
// stands for a line break inside a metadata value
const LINE_BREAK: &str = "⏎";

static ERROR_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: the pattern is valid
    Regex::new(r"Error: (.+)\n").unwrap()
});

/// Make sure an error passed among the extra arguments is seen as the entry's error.
///
/// An explicitly attached error is kept. Otherwise the first error argument, if any, is
/// promoted.
pub fn populate_error(entry: &mut LogEntry) {
    if entry.error().is_some() {
        return;
    }

    let promoted = entry.arguments().iter().find_map(|arg| arg.as_error()).cloned();
    if let Some(err) = promoted {
        entry.set_error(err);
    }
}

/// The entry's error as display text: the stack if there is one, otherwise the `Display` form.
pub fn format_error(entry: &LogEntry) -> Option<String> {
    entry.error().map(|err| err.render())
}

/// Capitalize the first character of `value`.
pub fn uc_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render `now` as an ISO-8601 instant followed by a Discord relative-time marker.
///
/// # Examples
///
/// ```
/// use logforth_append_discord::format::format_timestamp;
///
/// let now = "2024-08-11T14:44:57.172Z".parse().unwrap();
/// assert_eq!(
///     format_timestamp(now),
///     "2024-08-11T14:44:57.172Z (<t:1723387497:R>)"
/// );
/// ```
pub fn format_timestamp(now: Timestamp) -> String {
    let seconds = (now.as_millisecond() as f64 / 1000.0).round() as i64;
    format!("{now:.3} (<t:{seconds}:R>)")
}

/// Build the two-column metadata block.
///
/// `level`, `host` and `timestamp` are overwritten by global metadata, which is in turn
/// overwritten by entry metadata. Keys are sorted; the first column lists the capitalized keys
/// and the second their values, one line per key.
///
/// Line breaks inside a value are shown as `⏎`. When the columns outgrow Discord's field limit,
/// trailing rows are left out of both columns and a last `…` row marks the cut.
pub fn embed_fields(
    level: &Level,
    global: &Metadata,
    entry: &Metadata,
    host: Option<&str>,
    now: Timestamp,
) -> Vec<EmbedField> {
    let mut kvs: BTreeMap<&str, String> = BTreeMap::new();
    kvs.insert("level", level.name().to_string());
    if let Some(host) = host {
        kvs.insert("host", host.to_string());
    }
    kvs.insert("timestamp", format_timestamp(now));

    for (k, v) in global.iter().chain(entry.iter()) {
        kvs.insert(k, v.clone());
    }

    let rows = kvs
        .into_iter()
        .map(|(k, v)| (cell(uc_first(k)), cell(v)))
        .collect();
    let (names, values) = columns(rows, FIELD_VALUE_LIMIT);

    vec![
        EmbedField {
            name: "Metadata".to_string(),
            value: names,
            inline: true,
        },
        EmbedField {
            name: "\u{200b}".to_string(),
            value: values,
            inline: true,
        },
    ]
}

// one line of a column, short enough to leave room for the cut marker row
fn cell(text: String) -> String {
    let text = text.replace("\r\n", "\n").replace('\n', LINE_BREAK);
    truncate(text, FIELD_VALUE_LIMIT - 2)
}

// join rows into two columns of at most `limit` characters each, dropping whole rows
fn columns(rows: Vec<(String, String)>, limit: usize) -> (String, String) {
    let width = |column: &[String]| -> usize {
        column.iter().map(|s| s.chars().count()).sum::<usize>() + column.len().saturating_sub(1)
    };

    let (mut names, mut values): (Vec<String>, Vec<String>) = rows.into_iter().unzip();
    if width(&names) <= limit && width(&values) <= limit {
        return (names.join("\n"), values.join("\n"));
    }

    // keep rows while both columns leave room for "\n…"
    let budget = limit - 2;
    let mut kept = 0;
    let (mut names_width, mut values_width) = (0, 0);
    for (name, value) in names.iter().zip(&values) {
        let sep = usize::from(kept > 0);
        let next_names = names_width + sep + name.chars().count();
        let next_values = values_width + sep + value.chars().count();
        if next_names > budget || next_values > budget {
            break;
        }
        (names_width, values_width) = (next_names, next_values);
        kept += 1;
    }

    names.truncate(kept);
    values.truncate(kept);
    names.push(ELLIPSIS.to_string());
    values.push(ELLIPSIS.to_string());
    (names.join("\n"), values.join("\n"))
}

/// Remove the error summary from the title, so that `"disk check failed: disk full"` with a
/// `disk full` error is titled `"disk check failed:"`.
///
/// The summary is the text after the first `Error: ` that ends a line of the description. The
/// title is left unchanged when there is no such line or its text does not occur in the title.
pub fn strip_error_summary(title: &str, description: &str) -> String {
    let summary = ERROR_SUMMARY
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    match summary {
        Some(summary) if title.contains(summary) => {
            title.replacen(summary, "", 1).trim().to_string()
        }
        _ => title.to_string(),
    }
}

/// Create the embed of an entry, observed now on this host.
///
/// The entry is normalized in place by [`populate_error`].
pub fn create_embed(entry: &mut LogEntry, global: &Metadata, colors: &ColorPalette) -> Embed {
    let host = hostname();
    create_embed_at(entry, global, colors, host.as_deref(), Timestamp::now())
}

/// Create the embed of an entry, with the host and observation time given explicitly.
///
/// The same inputs always produce the same embed.
pub fn create_embed_at(
    entry: &mut LogEntry,
    global: &Metadata,
    colors: &ColorPalette,
    host: Option<&str>,
    now: Timestamp,
) -> Embed {
    populate_error(entry);

    let level = entry.level();
    let fields = embed_fields(level, global, entry.meta(), host, now);
    let description = format_error(entry);

    let title = match &description {
        Some(description) => strip_error_summary(entry.message(), description),
        None => entry.message().to_string(),
    };

    let title = truncate(title, TITLE_LIMIT);

    // the description gets what the other parts leave of the embed limit
    let used = title.chars().count()
        + fields
            .iter()
            .map(|f| f.name.chars().count() + f.value.chars().count())
            .sum::<usize>();
    let description = match description {
        Some(description) if *level == Level::Error => {
            let limit = DESCRIPTION_LIMIT.min(EMBED_LIMIT.saturating_sub(used));
            let limit = limit.saturating_sub(2 * FENCE.len() + 2);
            Some(format!(
                "{FENCE}\n{}\n{FENCE}",
                truncate(description, limit)
            ))
        }
        _ => None,
    };

    Embed {
        title,
        description,
        color: colors.color(level),
        fields,
    }
}

/// The name of this machine, if it can be read.
pub fn hostname() -> Option<String> {
    hostname::get().ok().and_then(|h| h.into_string().ok())
}

// cut to at most `limit` characters, marking the cut with an ellipsis
fn truncate(mut text: String, limit: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(limit) {
        let keep = text[..idx]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        text.truncate(keep);
        text.push(ELLIPSIS);
    }
    text
}
