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

//! Sending message payloads.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use logforth_core::Error;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;

use crate::embed::MessagePayload;

/// The capability of posting a JSON message to a URL.
///
/// [`HttpPost`] is the implementation used by default. Tests and embedders may provide their
/// own, e.g. to record payloads instead of sending them.
#[async_trait]
pub trait Post: fmt::Debug + Send + Sync + 'static {
    /// Post `payload` as JSON to `url`, with an optional `Authorization` header value.
    ///
    /// Return an error if the request could not be sent or was not accepted.
    async fn post(
        &self,
        url: &str,
        authorization: Option<&str>,
        payload: &MessagePayload,
    ) -> Result<(), Error>;
}

/// Posts payloads over HTTP with [`reqwest`].
#[derive(Debug, Clone)]
pub struct HttpPost {
    client: Client,
}

impl HttpPost {
    /// The default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a poster whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::new("failed to build HTTP client").with_source(err))?;
        Ok(Self { client })
    }

    /// Create a poster on top of an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Post for HttpPost {
    async fn post(
        &self,
        url: &str,
        authorization: Option<&str>,
        payload: &MessagePayload,
    ) -> Result<(), Error> {
        let mut request = self.client.post(url).json(payload);
        if let Some(authorization) = authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request
            .send()
            .await
            .map_err(|err| Error::new("failed to send request").with_source(err))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::new("Discord rejected the message")
            .with_context("status", status)
            .with_context("body", body))
    }
}
