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

//! The Discord message payload.
//!
//! Serialized form:
//!
//! ```json
//! {"embeds":[{"title":"disk check failed","description":"```\nError: disk full\n```","color":14362664,"fields":[{"name":"Metadata","value":"Host\nLevel\nService\nTimestamp","inline":true},{"name":"​","value":"web-1\nerror\nsvc1\n2024-08-11T14:44:57.172Z (<t:1723387497:R>)","inline":true}]}]}
//! ```

use serde::Serialize;

/// A rich message built from one log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    /// The entry's message, without a duplicated error summary.
    pub title: String,
    /// The fenced error block, only for error entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The level color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    /// The two-column metadata block.
    pub fields: Vec<EmbedField>,
}

/// A named block of text inside an [`Embed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    /// The field heading.
    pub name: String,
    /// The field body.
    pub value: String,
    /// Whether the field is laid out next to its neighbours.
    pub inline: bool,
}

/// The JSON body posted to Discord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    /// The embeds of the message, always exactly one.
    pub embeds: Vec<Embed>,
    /// The avatar shown for webhook messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl MessagePayload {
    /// Wrap a single embed.
    pub fn new(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            avatar_url: None,
        }
    }

    /// Set the avatar shown for webhook messages.
    pub fn with_avatar_url(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = avatar_url;
        self
    }
}
