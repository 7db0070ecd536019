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

//! Options of the Discord transport.

use serde::Deserialize;

use crate::Level;
use crate::Metadata;
use crate::color::ColorOverrides;

/// Environment variable holding the webhook URL, used when the options have none.
pub const WEBHOOK_URL_ENV: &str = "DISCORD_LOGGING_WEBHOOK_URL";
/// Environment variable holding the bot's channel id, used when the options have none.
pub const BOT_CHANNEL_ENV: &str = "DISCORD_LOGGING_BOT_CHANNEL";
/// Environment variable holding the bot token, used when the options have none.
pub const BOT_TOKEN_ENV: &str = "DISCORD_LOGGING_BOT_TOKEN";

/// Options of a [`DiscordTransport`](crate::DiscordTransport).
///
/// Every section is optional. The options can be built in code or deserialized, field names
/// being camelCase:
///
/// ```
/// use logforth_append_discord::DiscordTransportOptions;
///
/// let options: DiscordTransportOptions = serde_json::from_str(
///     r#"{
///         "discord": { "webhook": { "url": "https://discord.com/api/webhooks/1/abc" } },
///         "colors": { "info": 65280 },
///         "metadata": { "service": "billing" },
///         "level": "warn"
///     }"#,
/// )
/// .unwrap();
///
/// let same = DiscordTransportOptions::default()
///     .webhook("https://discord.com/api/webhooks/1/abc")
///     .color("info", 65280)
///     .metadata("service", "billing")
///     .level("warn");
/// assert_eq!(options, same);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscordTransportOptions {
    /// Where to deliver messages.
    pub discord: DiscordOptions,
    /// Per-level embed color overrides.
    pub colors: ColorOverrides,
    /// Metadata included in every message.
    pub metadata: Metadata,
    /// The least severe level forwarded from logforth records. Default to `info`.
    pub level: Option<Level>,
    /// Accept entries without delivering them.
    pub silent: bool,
}

/// Destination options. A webhook is preferred over a bot when both are configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscordOptions {
    /// Deliver through a bot.
    pub bot: Option<BotOptions>,
    /// Deliver through a webhook.
    pub webhook: Option<WebhookOptions>,
}

/// Options for delivering through a Discord bot.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BotOptions {
    /// The id of the channel to post into.
    pub channel: Option<String>,
    /// The bot token. The bot must be a member of the channel's server.
    pub token: Option<String>,
}

// keep the token out of debug output
impl std::fmt::Debug for BotOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotOptions")
            .field("channel", &self.channel)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Options for delivering through a Discord webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookOptions {
    /// The webhook URL.
    pub url: Option<String>,
    /// The avatar shown next to the messages.
    pub avatar_url: Option<String>,
}

impl DiscordTransportOptions {
    /// Deliver through the webhook at `url`.
    pub fn webhook(mut self, url: impl Into<String>) -> Self {
        self.discord.webhook.get_or_insert_with(Default::default).url = Some(url.into());
        self
    }

    /// Show the avatar at `url` next to webhook messages.
    pub fn avatar_url(mut self, url: impl Into<String>) -> Self {
        self.discord.webhook.get_or_insert_with(Default::default).avatar_url = Some(url.into());
        self
    }

    /// Deliver through a bot posting into `channel`.
    pub fn bot(mut self, channel: impl Into<String>, token: impl Into<String>) -> Self {
        self.discord.bot = Some(BotOptions {
            channel: Some(channel.into()),
            token: Some(token.into()),
        });
        self
    }

    /// Override the embed color of a built-in level.
    pub fn color(mut self, level: impl Into<Level>, color: u32) -> Self {
        self.colors.set(&level.into(), color);
        self
    }

    /// Add a metadata pair included in every message.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the least severe level forwarded from logforth records.
    pub fn level(mut self, level: impl Into<Level>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Accept entries without delivering them.
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }
}
