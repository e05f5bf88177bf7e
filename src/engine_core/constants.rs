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

//! action-guard Constants - Single source of truth for all configuration values.
//!
//! This module centralizes confidence scores, reason strings, limits and
//! environment variable names so the evaluator, CLI and tests agree on them.

/// Confidence scores attached to each decision path
pub mod confidence {
    /// Any path where a rule pattern matched
    pub const MATCHED: f64 = 0.95;
    /// No pattern matched the normalized input
    pub const NO_MATCH: f64 = 0.7;
    /// Normalization failed and the engine failed open
    pub const PARSE_ERROR: f64 = 0.5;
}

/// Fixed reason strings
pub mod reasons {
    pub const NO_MATCH: &str = "no rule patterns matched";
    pub const PARSE_ERROR: &str = "parsing error";
}

/// Bounds applied to reason strings and evaluated input
pub mod limits {
    /// Maximum characters of pattern source echoed into a reason
    pub const REASON_PATTERN_CHARS: usize = 60;
    /// Maximum characters of matched text echoed into a reason
    pub const REASON_MATCH_CHARS: usize = 40;
    /// Default cap on the normalized input scanned per evaluation (1 MiB)
    pub const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;
}

/// Built-in policy template names, in listing order
pub mod policy {
    pub const RESTRICTIVE: &str = "restrictive";
    pub const MODERATE: &str = "moderate";
    pub const PERMISSIVE: &str = "permissive";
    pub const BUILTIN_NAMES: [&str; 3] = [RESTRICTIVE, MODERATE, PERMISSIVE];
    /// Matches every tool name in allow/block lists
    pub const WILDCARD: &str = "*";
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_MODE: &str = "ACTION_GUARD_MODE";
    pub const ENV_MAX_INPUT_BYTES: &str = "ACTION_GUARD_MAX_INPUT_BYTES";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
}

/// Process exit codes used by the CLI
pub mod exit {
    pub const ALLOW: i32 = 0;
    pub const BLOCK: i32 = 1;
    pub const ESCALATE: i32 = 2;
    /// Argument, input or policy-load failure
    pub const ERROR: i32 = 3;
}
