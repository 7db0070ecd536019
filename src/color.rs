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

//! Embed colors for different log levels.

use serde::Deserialize;

use crate::Level;

/// Embed colors for the built-in log levels, as `0xRRGGBB` integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    /// Color for error level logs.
    pub error: u32,
    /// Color for warn level logs.
    pub warn: u32,
    /// Color for info level logs.
    pub info: u32,
    /// Color for verbose level logs.
    pub verbose: u32,
    /// Color for debug level logs.
    pub debug: u32,
    /// Color for silly level logs.
    pub silly: u32,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            error: 14362664,
            warn: 16497928,
            info: 2196944,
            verbose: 6559689,
            debug: 2196944,
            silly: 2210373,
        }
    }
}

impl ColorPalette {
    /// Replace the colors of the levels that `overrides` sets, keeping the others.
    ///
    /// # Examples
    ///
    /// ```
    /// use logforth_append_discord::color::ColorOverrides;
    /// use logforth_append_discord::color::ColorPalette;
    ///
    /// let overrides = ColorOverrides {
    ///     info: Some(0x00ff00),
    ///     ..Default::default()
    /// };
    /// let palette = ColorPalette::default().with_overrides(&overrides);
    /// assert_eq!(palette.info, 0x00ff00);
    /// assert_eq!(palette.error, ColorPalette::default().error);
    /// ```
    pub fn with_overrides(mut self, overrides: &ColorOverrides) -> Self {
        let ColorOverrides {
            error,
            warn,
            info,
            verbose,
            debug,
            silly,
        } = *overrides;

        self.error = error.unwrap_or(self.error);
        self.warn = warn.unwrap_or(self.warn);
        self.info = info.unwrap_or(self.info);
        self.verbose = verbose.unwrap_or(self.verbose);
        self.debug = debug.unwrap_or(self.debug);
        self.silly = silly.unwrap_or(self.silly);
        self
    }

    /// The color of a level, `None` for custom levels.
    pub fn color(&self, level: &Level) -> Option<u32> {
        match level {
            Level::Error => Some(self.error),
            Level::Warn => Some(self.warn),
            Level::Info => Some(self.info),
            Level::Verbose => Some(self.verbose),
            Level::Debug => Some(self.debug),
            Level::Silly => Some(self.silly),
            Level::Custom(_) => None,
        }
    }
}

/// Caller-supplied colors, merged over the defaults one level at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorOverrides {
    /// Color for error level logs.
    pub error: Option<u32>,
    /// Color for warn level logs.
    pub warn: Option<u32>,
    /// Color for info level logs.
    pub info: Option<u32>,
    /// Color for verbose level logs.
    pub verbose: Option<u32>,
    /// Color for debug level logs.
    pub debug: Option<u32>,
    /// Color for silly level logs.
    pub silly: Option<u32>,
}

impl ColorOverrides {
    /// Set the color of a built-in level. Custom levels are ignored.
    pub fn set(&mut self, level: &Level, color: u32) {
        let slot = match level {
            Level::Error => &mut self.error,
            Level::Warn => &mut self.warn,
            Level::Info => &mut self.info,
            Level::Verbose => &mut self.verbose,
            Level::Debug => &mut self.debug,
            Level::Silly => &mut self.silly,
            Level::Custom(_) => return,
        };
        *slot = Some(color);
    }
}

/// Resolve the embed color of `level`: the override if one is set, else the built-in default,
/// else `None` for custom levels.
pub fn resolve_color(level: &Level, overrides: &ColorOverrides) -> Option<u32> {
    ColorPalette::default().with_overrides(overrides).color(level)
}
