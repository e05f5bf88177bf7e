// Copyright 2026 BadCompany
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

use crate::engine_core::constants::config as env_names;
use crate::engine_core::constants::limits;
use crate::engine_core::errors::GuardError;
use crate::engine_core::store::EngineConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Enforcement posture of an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Matched categories produce their configured decision
    #[default]
    Enforce,
    /// Matches are reported but always allowed
    Warn,
    /// Same decisions as `Warn`; matches are reported at a quieter log level
    Log,
}

impl Mode {
    /// Lenient parse for environment input. Unknown values enforce.
    pub fn parse_safe(s: &str) -> Self {
        s.parse().unwrap_or(Mode::Enforce)
    }

    pub fn is_enforcing(&self) -> bool {
        matches!(self, Mode::Enforce)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Enforce => "enforce",
            Mode::Warn => "warn",
            Mode::Log => "log",
        }
    }
}

impl FromStr for Mode {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enforce" => Ok(Mode::Enforce),
            "warn" => Ok(Mode::Warn),
            "log" => Ok(Mode::Log),
            other => Err(GuardError::Configuration(format!(
                "unknown mode '{}' (expected enforce, warn or log)",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process configuration, read once at startup by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mode: Mode,
    pub max_input_bytes: usize,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    pub fn from_env() -> Result<Self, GuardError> {
        let max_input_bytes = match env::var(env_names::ENV_MAX_INPUT_BYTES) {
            Ok(raw) => parse_max_input_bytes(&raw)?,
            Err(_) => limits::DEFAULT_MAX_INPUT_BYTES,
        };

        Ok(Self {
            mode: env::var(env_names::ENV_MODE)
                .map(|v| Mode::parse_safe(&v))
                .unwrap_or_default(),
            max_input_bytes,
            log_level: env::var(env_names::ENV_LOG_LEVEL).unwrap_or_else(|_| "warn".to_string()),
            log_format: env::var(env_names::ENV_LOG_FORMAT)
                .unwrap_or_else(|_| "text".to_string()),
        })
    }

    /// Engine configuration seeded from this process configuration (no hook).
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            mode: self.mode,
            max_input_bytes: self.max_input_bytes,
            ..EngineConfig::default()
        }
    }
}

fn parse_max_input_bytes(raw: &str) -> Result<usize, GuardError> {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(GuardError::Configuration(format!(
            "{} must be a positive integer, got '{}'",
            env_names::ENV_MAX_INPUT_BYTES,
            raw
        ))),
        Ok(n) => Ok(n),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Enforce,
            max_input_bytes: limits::DEFAULT_MAX_INPUT_BYTES,
            log_level: "warn".to_string(),
            log_format: "text".to_string(),
        }
    }
}
