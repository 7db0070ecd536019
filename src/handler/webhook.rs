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
use crate::handler::redact_webhook_url;
use crate::post::Post;

/// Delivers messages through a webhook. Needs no bot account.
pub struct WebhookHandler {
    url: String,
    avatar_url: Option<String>,
    colors: ColorPalette,
    poster: Arc<dyn Post>,
    trap: Arc<dyn Trap>,
}

impl WebhookHandler {
    /// Create a handler posting to the webhook at `url`.
    pub fn new(url: impl Into<String>, poster: Arc<dyn Post>) -> Self {
        Self {
            url: url.into(),
            avatar_url: None,
            colors: ColorPalette::default(),
            poster,
            trap: Arc::new(DefaultTrap::default()),
        }
    }

    /// Show the avatar at `avatar_url` next to the messages.
    pub fn with_avatar_url(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = avatar_url;
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

    /// The avatar URL, if any.
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Format `entry` and send it through the webhook.
    ///
    /// A failed send is trapped, never returned. `done` is completed after the attempt either
    /// way.
    pub async fn log(&self, mut entry: LogEntry, metadata: &Metadata, done: Completion) {
        let embed = create_embed(&mut entry, metadata, &self.colors);
        let payload = MessagePayload::new(embed).with_avatar_url(self.avatar_url.clone());

        if let Err(err) = self.poster.post(&self.url, None, &payload).await {
            let err = Error::new("failed sending to Discord")
                .with_context("webhook", redact_webhook_url(&self.url))
                .with_source(err);
            self.trap.trap(&err);
        }

        done.complete();
    }
}

impl fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("url", &redact_webhook_url(&self.url))
            .field("avatar_url", &self.avatar_url)
            .field("colors", &self.colors)
            .field("poster", &self.poster)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Debug)]
    struct Unreachable;

    #[async_trait]
    impl Post for Unreachable {
        async fn post(&self, _: &str, _: Option<&str>, _: &MessagePayload) -> Result<(), Error> {
            Err(Error::new("failed to send request"))
        }
    }

    #[derive(Debug, Default)]
    struct Collect(Mutex<Vec<String>>);

    impl Trap for Collect {
        fn trap(&self, err: &Error) {
            self.0.lock().unwrap().push(err.to_string());
        }
    }

    #[tokio::test]
    async fn test_failure_is_trapped_and_completed() {
        let trap = Arc::new(Collect::default());
        let handler = WebhookHandler::new(
            "https://discord.com/api/webhooks/1/secret",
            Arc::new(Unreachable),
        )
        .with_trap(trap.clone());

        let (tx, rx) = std::sync::mpsc::channel();
        let entry = LogEntry::builder().level("error").message("lost").build();
        handler
            .log(entry, &Metadata::new(), Completion::new(move || tx.send(()).unwrap()))
            .await;
        assert!(rx.try_recv().is_ok());

        let errors = trap.0.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("failed sending to Discord"));
        assert!(errors[0].contains("https://discord.com/api/webhooks/1/<redacted>"));
        assert!(!errors[0].contains("secret"));
    }
}
