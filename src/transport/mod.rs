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

//! The transport forwarding log entries to Discord.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use logforth_core::Append;
use logforth_core::Diagnostic;
use logforth_core::Error;
use logforth_core::Trap;
use logforth_core::record::Record;
use logforth_core::trap::DefaultTrap;
use tokio::sync::broadcast;

use crate::ColorPalette;
use crate::Completion;
use crate::DiscordTransportOptions;
use crate::Level;
use crate::LogEntry;
use crate::Metadata;
use crate::handler::DEFAULT_API_BASE;
use crate::handler::Destination;
use crate::handler::Handler;
use crate::post::HttpPost;
use crate::post::Post;

mod worker;

use self::worker::Task;
use self::worker::WorkerState;
use self::worker::on_worker_thread;

/// Forwards log entries to a Discord channel, through a bot or a webhook.
///
/// Deliveries run on a background thread; [`log`](DiscordTransport::log) never waits for the
/// network and never fails. Delivery failures are reported to the configured [`Trap`].
///
/// # Examples
///
/// ```
/// use logforth_append_discord::Completion;
/// use logforth_append_discord::DiscordTransport;
/// use logforth_append_discord::DiscordTransportOptions;
/// use logforth_append_discord::LogEntry;
///
/// let options = DiscordTransportOptions::default().silent(true);
/// let transport = DiscordTransport::builder(options)
///     .env(|_| None)
///     .build()
///     .unwrap();
///
/// let entry = LogEntry::builder().level("info").message("hello").build();
/// assert!(!transport.log(entry, Completion::noop()));
/// ```
pub struct DiscordTransport {
    handler: Option<Arc<Handler>>,
    metadata: Arc<Metadata>,
    level: Level,
    silent: bool,
    observers: broadcast::Sender<Arc<LogEntry>>,
    trap: Arc<dyn Trap>,
    worker: Option<WorkerState>,
}

impl DiscordTransport {
    /// Create a transport from `options` with the default settings.
    ///
    /// Missing destination options are read from the `DISCORD_LOGGING_*` environment variables.
    pub fn new(options: DiscordTransportOptions) -> Result<Self, Error> {
        DiscordTransport::builder(options).build()
    }

    /// Start building a transport from `options`.
    pub fn builder(options: DiscordTransportOptions) -> DiscordTransportBuilder {
        DiscordTransportBuilder::new(options)
    }

    /// Forward `entry` to Discord.
    ///
    /// Observers registered with [`subscribe`](DiscordTransport::subscribe) are notified first.
    /// `done` is completed once the delivery attempt is over, immediately when nothing is sent.
    ///
    /// Return `true` if the entry was handed to a delivery handler, `false` in silent mode or
    /// when no destination is configured.
    pub fn log(&self, entry: LogEntry, done: Completion) -> bool {
        if self.observers.receiver_count() > 0 {
            let _ = self.observers.send(Arc::new(entry.clone()));
        }

        if self.silent {
            done.complete();
            return false;
        }

        let (Some(handler), Some(worker)) = (&self.handler, &self.worker) else {
            done.complete();
            return false;
        };

        let task = Task::Deliver {
            handler: handler.clone(),
            entry,
            metadata: self.metadata.clone(),
            done,
        };
        match worker.send_task(task) {
            Ok(()) => true,
            Err(err) => {
                self.trap.trap(&err);
                false
            }
        }
    }

    /// Receive every entry passed to [`log`](DiscordTransport::log) from now on, silent mode
    /// included.
    ///
    /// The receiver lags, dropping the oldest entries, if it falls behind by more than the
    /// configured capacity.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<LogEntry>> {
        self.observers.subscribe()
    }

    /// The delivery handler, if a destination was resolved.
    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_deref()
    }

    /// The metadata included in every message.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The least severe level forwarded from logforth records.
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Whether entries are accepted without being delivered.
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Block until every delivery accepted so far has finished.
    ///
    /// Return immediately when called from a delivery.
    pub fn flush(&self) -> Result<(), Error> {
        let Some(worker) = &self.worker else {
            return Ok(());
        };
        if on_worker_thread() {
            return Ok(());
        }

        let (done, wait) = oneshot::channel();
        worker.send_task(Task::Flush { done })?;
        wait.recv()
            .map_err(|err| Error::new("failed to wait for Discord deliveries").with_source(err))
    }
}

impl fmt::Debug for DiscordTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordTransport")
            .field("handler", &self.handler)
            .field("metadata", &self.metadata)
            .field("level", &self.level)
            .field("silent", &self.silent)
            .finish_non_exhaustive()
    }
}

impl Append for DiscordTransport {
    fn append(&self, record: &Record, diags: &[Box<dyn Diagnostic>]) -> Result<(), Error> {
        if on_worker_thread() {
            return Ok(());
        }

        let entry = LogEntry::from_record(record, diags)?;
        if entry.level().passes(&self.level) {
            self.log(entry, Completion::noop());
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        DiscordTransport::flush(self)
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send>;

/// A builder for configuring a [`DiscordTransport`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use logforth_append_discord::DiscordTransport;
/// use logforth_append_discord::DiscordTransportOptions;
///
/// let options = DiscordTransportOptions::default()
///     .webhook("https://discord.com/api/webhooks/1/abc")
///     .metadata("service", "billing");
/// let transport = DiscordTransport::builder(options)
///     .timeout(Duration::from_secs(5))
///     .thread_name("discord-logging")
///     .build()
///     .unwrap();
/// assert_eq!(transport.handler().unwrap().kind(), "webhook");
/// ```
#[must_use = "call `build` to construct the transport"]
pub struct DiscordTransportBuilder {
    options: DiscordTransportOptions,
    env: EnvLookup,
    trap: Arc<dyn Trap>,
    poster: Option<Arc<dyn Post>>,
    api_base: String,
    timeout: Duration,
    thread_name: String,
    observer_capacity: usize,
}

impl DiscordTransportBuilder {
    fn new(options: DiscordTransportOptions) -> Self {
        Self {
            options,
            env: Box::new(|name| std::env::var(name).ok()),
            trap: Arc::new(DefaultTrap::default()),
            poster: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: HttpPost::DEFAULT_TIMEOUT,
            thread_name: "logforth-discord".to_string(),
            observer_capacity: 1024,
        }
    }

    /// Set the trap receiving resolution and delivery failures.
    ///
    /// Default to [`DefaultTrap`], writing to stderr.
    pub fn trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = Arc::from(trap.into());
        self
    }

    /// Send payloads through `poster` instead of HTTP.
    pub fn poster(mut self, poster: impl Post) -> Self {
        self.poster = Some(Arc::new(poster));
        self
    }

    /// Read missing destination options from `env` instead of the process environment.
    pub fn env<F>(mut self, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + 'static,
    {
        self.env = Box::new(env);
        self
    }

    /// Set the base URL of the Discord REST API used by bots.
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the timeout of each HTTP request. Default to 10 seconds.
    ///
    /// Has no effect with a custom [`poster`](DiscordTransportBuilder::poster).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the name of the delivery thread.
    pub fn thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Set how many entries a slow observer may fall behind before it lags.
    pub fn observer_capacity(mut self, capacity: usize) -> Self {
        self.observer_capacity = capacity.max(1);
        self
    }

    /// Build the transport.
    ///
    /// An unresolvable destination is not an error: it is reported to the trap and the
    /// transport completes every entry without sending it.
    ///
    /// # Errors
    ///
    /// Return an error if the HTTP client or the delivery thread cannot be created.
    pub fn build(self) -> Result<DiscordTransport, Error> {
        let Self {
            options,
            env,
            trap,
            poster,
            api_base,
            timeout,
            thread_name,
            observer_capacity,
        } = self;

        let destination = match Destination::resolve(&options.discord, env) {
            Ok(destination) => Some(destination),
            Err(err) => {
                let err = Error::new("failed to determine Discord transport handler")
                    .with_source(err);
                trap.trap(&err);
                None
            }
        };

        let (handler, worker) = match destination {
            Some(destination) => {
                let poster = match poster {
                    Some(poster) => poster,
                    None => Arc::new(HttpPost::new(timeout)?),
                };
                let colors = ColorPalette::default().with_overrides(&options.colors);
                let handler = Handler::new(destination, &api_base, colors, poster, trap.clone());
                let worker = WorkerState::spawn(thread_name, trap.clone())?;
                (Some(Arc::new(handler)), Some(worker))
            }
            None => (None, None),
        };

        let (observers, _) = broadcast::channel(observer_capacity);

        Ok(DiscordTransport {
            handler,
            metadata: Arc::new(options.metadata),
            level: options.level.unwrap_or_default(),
            silent: options.silent,
            observers,
            trap,
            worker,
        })
    }
}

impl fmt::Debug for DiscordTransportBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordTransportBuilder")
            .field("options", &self.options)
            .field("poster", &self.poster)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("thread_name", &self.thread_name)
            .field("observer_capacity", &self.observer_capacity)
            .finish_non_exhaustive()
    }
}
