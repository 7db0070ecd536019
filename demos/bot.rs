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

//! Post entries into a channel as a bot, waiting for each delivery.
//!
//! Run with `DISCORD_LOGGING_BOT_CHANNEL` and `DISCORD_LOGGING_BOT_TOKEN` set. The bot must be
//! a member of the channel's server.

use std::sync::mpsc;
use std::time::Duration;

use logforth_append_discord::Completion;
use logforth_append_discord::DiscordTransport;
use logforth_append_discord::DiscordTransportOptions;
use logforth_append_discord::ErrorValue;
use logforth_append_discord::LogEntry;

fn main() {
    let options = DiscordTransportOptions::default()
        .color("info", 0x57f287)
        .metadata("service", "bot-demo");
    let transport = DiscordTransport::builder(options)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let mut observed = transport.subscribe();

    let stack = "ReplicationError: connection reset by peer\n    at stream (replica.rs:88)";
    let entries = [
        LogEntry::builder()
            .level("info")
            .message("nightly backup finished")
            .meta("duration", "42s")
            .build(),
        LogEntry::builder()
            .level("error")
            .message("replication stopped")
            .error(
                ErrorValue::new("connection reset by peer")
                    .with_name("ReplicationError")
                    .with_stack(stack),
            )
            .build(),
    ];

    for entry in entries {
        let (tx, rx) = mpsc::channel();
        let sent = transport.log(entry, Completion::new(move || tx.send(()).unwrap()));
        rx.recv().unwrap();

        let entry = observed.try_recv().unwrap();
        println!("{}: {} (sent: {sent})", entry.level(), entry.message());
    }
}
