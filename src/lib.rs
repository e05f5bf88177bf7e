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

//! action-guard: a pre-execution guardrail for autonomous agents.
//!
//! Every proposed tool call is flattened into one searchable string and scanned
//! against a fixed corpus of rule categories. The first matching pattern decides
//! whether the caller may proceed (`ALLOW`), must stop (`BLOCK`) or should hand the
//! action to a human (`ESCALATE`).
//!
//! ```
//! use action_guard::{ActionRequest, Decision, Guard};
//! use serde_json::json;
//!
//! let guard = Guard::new();
//! let request = ActionRequest::for_tool("exec").with_params(json!({"command": "rm -rf /"}));
//! assert_eq!(guard.check_action(&request).decision, Decision::Block);
//! ```

use std::sync::LazyLock;

pub mod config;
pub mod engine;
pub mod engine_core;
pub mod policy;
pub mod utils;

pub use config::{Config, Mode};
pub use engine::evaluator::{Evaluation, Guard};
pub use engine::rules::{RuleBook, RuleSet, RuleSetSpec};
pub use engine_core::errors::GuardError;
pub use engine_core::hooks::ViolationHook;
pub use engine_core::models::{
    ActionRequest, Context, Decision, DecisionRecord, Params, RiskLevel, RuleCategory,
};
pub use engine_core::store::{ConfigUpdate, EngineConfig};
pub use policy::{list_policies, load_policy, PolicyDocument};

static DEFAULT_GUARD: LazyLock<Guard> = LazyLock::new(Guard::new);

/// Evaluates `request` against the process-wide engine.
pub fn check_action(request: &ActionRequest) -> DecisionRecord {
    DEFAULT_GUARD.check_action(request)
}

/// Merges `update` into the process-wide engine configuration.
pub fn configure(update: ConfigUpdate) {
    DEFAULT_GUARD.configure(update);
}

/// The engine behind [`check_action`] and [`configure`].
pub fn default_guard() -> &'static Guard {
    &DEFAULT_GUARD
}
