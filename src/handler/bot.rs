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
use std::sync::Arc;

use logforth_core::Error;
use logforth_core::Trap;
use logforth_core::trap::DefaultTrap;

use crate::ColorPalette;
use crate::Completion;
use crate::LogEntry;
use crate::Metadata;
use crate::embed::MessagePayload;
use crate::format::create_embed;
use crate::post::Post;

/// The Discord REST API the bot handler posts to by default.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Delivers messages into a channel through the bot REST API.
pub struct BotHandler {
    channel: String,
    route: String,
    authorization: String,
    colors: ColorPalette,
    poster: Arc<dyn Post>,
    trap: Arc<dyn Trap>,
}

impl BotHandler {
    /// Create a handler posting into `channel` with the bot `token`.
    pub fn new(channel: impl Into<String>, token: impl AsRef<str>, poster: Arc<dyn Post>) -> Self {
        let channel = channel.into();
        Self {
            route: channel_messages_route(DEFAULT_API_BASE, &channel),
            authorization: format!("Bot {}", token.as_ref()),
            channel,
            colors: ColorPalette::default(),
            poster,
            trap: Arc::new(DefaultTrap::default()),
        }
    }

    /// Post to another API base URL, e.g. a proxy.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.route = channel_messages_route(api_base, &self.channel);
        self
    }

    /// Set the embed colors.
    pub fn with_colors(mut self, colors: ColorPalette) -> Self {
        self.colors = colors;
        self
    }

    /// Set the trap receiving delivery failures.
    pub fn with_trap(mut self, trap: Arc<dyn Trap>) -> Self {
        self.trap = trap;
        self
    }

    /// The channel id.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The URL messages are posted to.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Format `entry` and post it into the channel.
    ///
    /// A failed post is trapped, never returned. `done` is completed after the attempt either
    /// way.
    pub async fn log(&self, mut entry: LogEntry, metadata: &Metadata, done: Completion) {
        let embed = create_embed(&mut entry, metadata, &self.colors);
        let payload = MessagePayload::new(embed);

        let result = self
            .poster
            .post(&self.route, Some(&self.authorization), &payload)
            .await;
        if let Err(err) = result {
            let err = Error::new("failed sending to Discord")
                .with_context("channel", &self.channel)
                .with_source(err);
            self.trap.trap(&err);
        }

        done.complete();
    }
}

impl fmt::Debug for BotHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotHandler")
            .field("channel", &self.channel)
            .field("route", &self.route)
            .field("colors", &self.colors)
            .field("poster", &self.poster)
            .finish_non_exhaustive()
    }
}

fn channel_messages_route(api_base: &str, channel: &str) -> String {
    format!("{}/channels/{channel}/messages", api_base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Debug, Default)]
    struct Recorder(Mutex<Vec<(String, Option<String>)>>);

    #[async_trait]
    impl Post for Recorder {
        async fn post(
            &self,
            url: &str,
            authorization: Option<&str>,
            _: &MessagePayload,
        ) -> Result<(), Error> {
            let mut posts = self.0.lock().unwrap();
            posts.push((url.to_string(), authorization.map(str::to_string)));
            Ok(())
        }
    }

    #[test]
    fn test_route() {
        let poster: Arc<dyn Post> = Arc::new(Recorder::default());
        let handler = BotHandler::new("1234", "secret", poster.clone());
        assert_eq!(
            handler.route(),
            "https://discord.com/api/v10/channels/1234/messages"
        );

        let handler = handler.with_api_base("http://localhost:8080/api/");
        assert_eq!(
            handler.route(),
            "http://localhost:8080/api/channels/1234/messages"
        );
        assert!(!format!("{handler:?}").contains("secret"));
    }

    #[tokio::test]
    async fn test_log_posts_with_authorization() {
        let recorder = Arc::new(Recorder::default());
        let handler = BotHandler::new("1234", "secret", recorder.clone());

        let (tx, rx) = std::sync::mpsc::channel();
        let entry = LogEntry::builder().level("warn").message("slow query").build();
        handler
            .log(entry, &Metadata::new(), Completion::new(move || tx.send(()).unwrap()))
            .await;
        assert!(rx.try_recv().is_ok());

        let posts = recorder.0.lock().unwrap();
        assert_eq!(
            *posts,
            vec![(
                "https://discord.com/api/v10/channels/1234/messages".to_string(),
                Some("Bot secret".to_string())
            )]
        );
    }
}
