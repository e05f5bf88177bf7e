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

// Domain error types

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for action-guard
#[derive(Error, Debug)]
pub enum GuardError {
    /// The request could not be flattened into searchable text.
    /// The evaluator converts this into a fail-open decision.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A rule pattern failed to compile
    #[error("Invalid pattern in rule '{category}': {source}")]
    InvalidPattern {
        category: String,
        #[source]
        source: regex::Error,
    },

    /// A rule corpus is structurally wrong (duplicate category, empty set)
    #[error("Rule corpus error: {0}")]
    RuleCorpus(String),

    /// Policy file could not be read
    #[error("Failed to load policy from {}: {source}", path.display())]
    PolicyLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Policy file was read but is not a valid document
    #[error("Failed to parse policy at {}: {reason}", path.display())]
    PolicyParse { path: PathBuf, reason: String },

    /// Policy document parsed but failed validation
    #[error("Invalid policy at {}: {reason}", path.display())]
    PolicyInvalid { path: PathBuf, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl GuardError {
    /// Path of the policy file involved, if this is a policy error.
    pub fn policy_path(&self) -> Option<&std::path::Path> {
        match self {
            GuardError::PolicyLoad { path, .. }
            | GuardError::PolicyParse { path, .. }
            | GuardError::PolicyInvalid { path, .. } => Some(path),
            _ => None,
        }
    }
}
