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

//! Delivery handlers and the choice between them.

use std::fmt;
use std::sync::Arc;

use logforth_core::Error;
use logforth_core::Trap;

use crate::ColorPalette;
use crate::Completion;
use crate::LogEntry;
use crate::Metadata;
use crate::config::BOT_CHANNEL_ENV;
use crate::config::BOT_TOKEN_ENV;
use crate::config::DiscordOptions;
use crate::config::WEBHOOK_URL_ENV;
use crate::post::Post;

mod bot;
mod webhook;

pub use self::bot::BotHandler;
pub use self::bot::DEFAULT_API_BASE;
pub use self::webhook::WebhookHandler;

/// Where messages are delivered, resolved once from options and environment variables.
#[derive(Clone, PartialEq, Eq)]
pub enum Destination {
    /// Post into a channel as a bot.
    Bot {
        /// The channel id.
        channel: String,
        /// The bot token.
        token: String,
    },
    /// Post through a webhook.
    Webhook {
        /// The webhook URL.
        url: String,
        /// The avatar shown next to the messages.
        avatar_url: Option<String>,
    },
}

impl Destination {
    /// Resolve the destination from `options`, falling back to the process environment.
    pub fn from_options(options: &DiscordOptions) -> Result<Destination, Error> {
        Destination::resolve(options, |name| std::env::var(name).ok())
    }

    /// Resolve the destination from `options`, falling back to `env` for missing values.
    ///
    /// A webhook URL wins over a bot configuration. A bot needs both a channel and a token.
    /// Empty values count as missing.
    ///
    /// # Errors
    ///
    /// Return an error if neither a webhook URL nor a complete bot configuration is found.
    ///
    /// # Examples
    ///
    /// ```
    /// use logforth_append_discord::DiscordTransportOptions;
    /// use logforth_append_discord::handler::Destination;
    ///
    /// let options = DiscordTransportOptions::default().bot("1234", "secret");
    /// let destination = Destination::resolve(&options.discord, |_| None).unwrap();
    /// assert!(matches!(destination, Destination::Bot { .. }));
    /// ```
    pub fn resolve<F>(options: &DiscordOptions, env: F) -> Result<Destination, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |explicit: Option<&String>, name: &str| {
            explicit
                .filter(|v| !v.is_empty())
                .cloned()
                .or_else(|| env(name).filter(|v| !v.is_empty()))
        };

        let webhook = options.webhook.as_ref();
        if let Some(url) = lookup(webhook.and_then(|w| w.url.as_ref()), WEBHOOK_URL_ENV) {
            let avatar_url = webhook
                .and_then(|w| w.avatar_url.clone())
                .filter(|v| !v.is_empty());
            return Ok(Destination::Webhook { url, avatar_url });
        }

        let bot = options.bot.as_ref();
        let channel = lookup(bot.and_then(|b| b.channel.as_ref()), BOT_CHANNEL_ENV);
        let token = lookup(bot.and_then(|b| b.token.as_ref()), BOT_TOKEN_ENV);
        if let (Some(channel), Some(token)) = (channel, token) {
            return Ok(Destination::Bot { channel, token });
        }

        Err(Error::new(
            "no webhook or bot configuration found in options or environment variables",
        ))
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Bot { channel, .. } => f
                .debug_struct("Bot")
                .field("channel", channel)
                .finish_non_exhaustive(),
            Destination::Webhook { url, avatar_url } => f
                .debug_struct("Webhook")
                .field("url", &redact_webhook_url(url))
                .field("avatar_url", avatar_url)
                .finish(),
        }
    }
}

/// A delivery handler: formats an entry and sends it through one mechanism.
#[derive(Debug)]
pub enum Handler {
    /// Delivers through the bot REST API.
    Bot(BotHandler),
    /// Delivers through a webhook.
    Webhook(WebhookHandler),
}

impl Handler {
    pub(crate) fn new(
        destination: Destination,
        api_base: &str,
        colors: ColorPalette,
        poster: Arc<dyn Post>,
        trap: Arc<dyn Trap>,
    ) -> Self {
        match destination {
            Destination::Bot { channel, token } => Handler::Bot(
                BotHandler::new(channel, token, poster)
                    .with_api_base(api_base)
                    .with_colors(colors)
                    .with_trap(trap),
            ),
            Destination::Webhook { url, avatar_url } => Handler::Webhook(
                WebhookHandler::new(url, poster)
                    .with_avatar_url(avatar_url)
                    .with_colors(colors)
                    .with_trap(trap),
            ),
        }
    }

    /// `"bot"` or `"webhook"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Bot(_) => "bot",
            Handler::Webhook(_) => "webhook",
        }
    }

    /// Format `entry` with the global `metadata` and send it. Failures are trapped; `done` is
    /// completed once the attempt is over.
    pub async fn log(&self, entry: LogEntry, metadata: &Metadata, done: Completion) {
        match self {
            Handler::Bot(handler) => handler.log(entry, metadata, done).await,
            Handler::Webhook(handler) => handler.log(entry, metadata, done).await,
        }
    }
}

// the last path segment of a webhook URL is its token
fn redact_webhook_url(url: &str) -> String {
    match url.trim_end_matches('/').rsplit_once('/') {
        Some((head, _)) => format!("{head}/<redacted>"),
        None => "<redacted>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::DiscordTransportOptions;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_webhook_from_options() {
        let options = DiscordTransportOptions::default()
            .webhook("https://example.com/api/webhooks/1/token")
            .avatar_url("https://example.com/a.png");
        let destination = Destination::resolve(&options.discord, env(&[])).unwrap();
        assert_eq!(
            destination,
            Destination::Webhook {
                url: "https://example.com/api/webhooks/1/token".to_string(),
                avatar_url: Some("https://example.com/a.png".to_string()),
            }
        );
    }

    #[test]
    fn test_webhook_is_preferred_over_bot() {
        let options = DiscordTransportOptions::default()
            .bot("1234", "secret")
            .webhook("https://example.com/hook");
        let destination = Destination::resolve(&options.discord, env(&[])).unwrap();
        assert!(matches!(destination, Destination::Webhook { .. }));

        // the preference holds when the webhook only comes from the environment
        let options = DiscordTransportOptions::default().bot("1234", "secret");
        let destination = Destination::resolve(
            &options.discord,
            env(&[(WEBHOOK_URL_ENV, "https://example.com/hook")]),
        )
        .unwrap();
        assert!(matches!(destination, Destination::Webhook { .. }));
    }

    #[test]
    fn test_bot_from_environment() {
        let destination = Destination::resolve(
            &DiscordOptions::default(),
            env(&[(BOT_CHANNEL_ENV, "1234"), (BOT_TOKEN_ENV, "secret")]),
        )
        .unwrap();
        assert_eq!(
            destination,
            Destination::Bot {
                channel: "1234".to_string(),
                token: "secret".to_string(),
            }
        );
    }

    #[test]
    fn test_bot_mixes_options_and_environment() {
        let mut options = DiscordTransportOptions::default().bot("1234", "");
        options.discord.bot.as_mut().unwrap().token = None;
        let destination =
            Destination::resolve(&options.discord, env(&[(BOT_TOKEN_ENV, "secret")])).unwrap();
        assert!(matches!(destination, Destination::Bot { ref channel, .. } if channel == "1234"));
    }

    #[test]
    fn test_incomplete_bot_resolves_to_nothing() {
        let options = DiscordTransportOptions::default().bot("1234", "");
        let err = Destination::resolve(&options.discord, env(&[])).unwrap_err();
        assert!(err.to_string().contains("no webhook or bot configuration"));

        let err = Destination::resolve(&DiscordOptions::default(), env(&[(WEBHOOK_URL_ENV, "")]));
        assert!(err.is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let bot = Destination::Bot {
            channel: "1234".to_string(),
            token: "secret".to_string(),
        };
        assert!(!format!("{bot:?}").contains("secret"));

        let webhook = Destination::Webhook {
            url: "https://discord.com/api/webhooks/1/secret".to_string(),
            avatar_url: None,
        };
        let debug = format!("{webhook:?}");
        assert!(debug.contains("https://discord.com/api/webhooks/1/<redacted>"));
        assert!(!debug.contains("secret"));
    }
}
