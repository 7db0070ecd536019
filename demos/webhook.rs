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

//! Forward warnings and errors of a logforth logger through a webhook.
//!
//! Run with `DISCORD_LOGGING_WEBHOOK_URL` set to a webhook of the target channel.

use logforth_append_discord::DiscordTransport;
use logforth_append_discord::DiscordTransportOptions;
use logforth_core::kv::Key;
use logforth_core::kv::Value;
use logforth_core::record::Level;
use logforth_core::record::Record;

fn main() {
    let options = DiscordTransportOptions::default()
        .avatar_url("https://cdn.discordapp.com/embed/avatars/0.png")
        .metadata("service", "webhook-demo")
        .level("warn");
    let transport = DiscordTransport::new(options).unwrap();

    let logger = logforth_core::builder()
        .dispatch(|d| d.append(transport))
        .build();

    let kvs = [
        (Key::new("error"), Value::from("no space left on device")),
        (Key::new("volume"), Value::from("/dev/sda1")),
    ];
    logger.log(
        &Record::builder()
            .level(Level::Error)
            .payload("disk check failed")
            .key_values(kvs.as_slice())
            .build(),
    );

    let kvs = [(Key::new("usage"), Value::from("93%"))];
    logger.log(
        &Record::builder()
            .level(Level::Warn)
            .payload("disk almost full")
            .key_values(kvs.as_slice())
            .build(),
    );

    // below the `warn` threshold
    logger.log(
        &Record::builder()
            .level(Level::Info)
            .payload("not forwarded")
            .build(),
    );

    logger.flush();
}
