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

//! Decision evaluator.
//!
//! [`Guard`] normalizes a request, scans the rule corpus first-match-wins, applies
//! the operating mode and notifies the violation hook. [`Guard::evaluate`] is the
//! pure part; [`Guard::check_action`] adds the notification side effect.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Mode;
use crate::engine::normalizer;
use crate::engine::rules::RuleBook;
use crate::engine_core::errors::GuardError;
use crate::engine_core::hooks;
use crate::engine_core::models::{ActionRequest, Decision, DecisionRecord};
use crate::engine_core::store::{ConfigStore, ConfigUpdate, EngineConfig};
use crate::utils::time;

/// Result of the pure evaluation step.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The record returned to the caller (mode already applied)
    pub record: DecisionRecord,
    /// Decision of the matched category before the mode was applied
    pub configured: Decision,
}

impl Evaluation {
    /// The rules detected something that would block or escalate under `enforce`.
    pub fn is_violation(&self) -> bool {
        self.configured != Decision::Allow
    }
}

/// One independently configured decision engine.
pub struct Guard {
    rules: Arc<RuleBook>,
    store: ConfigStore,
}

impl Guard {
    /// Engine with the built-in corpus and default configuration (`enforce`, no hook).
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            rules: RuleBook::builtin(),
            store: ConfigStore::new(config),
        }
    }

    /// Engine with a custom corpus.
    pub fn with_rules(rules: RuleBook, config: EngineConfig) -> Self {
        Self {
            rules: Arc::new(rules),
            store: ConfigStore::new(config),
        }
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Merge a partial configuration; omitted fields keep their values.
    pub fn configure(&self, update: ConfigUpdate) {
        debug!(?update, "Applying engine configuration");
        self.store.update(update);
    }

    pub fn config(&self) -> Arc<EngineConfig> {
        self.store.snapshot()
    }

    /// Compute the decision without notifying anyone.
    pub fn evaluate(&self, request: &ActionRequest) -> Evaluation {
        let start = Instant::now();
        let config = self.store.snapshot();
        let mut evaluation = self.evaluate_with(&config, request);
        evaluation.record = evaluation.record.with_latency(time::elapsed_ms(start));
        evaluation
    }

    /// Primary entry point: decide, notify the violation hook, stamp latency.
    pub fn check_action(&self, request: &ActionRequest) -> DecisionRecord {
        let start = Instant::now();
        let config = self.store.snapshot();
        let evaluation = self.evaluate_with(&config, request);

        if evaluation.is_violation() {
            if let Some(hook) = &config.on_violation {
                let provisional = evaluation.record.clone().with_latency(time::elapsed_ms(start));
                hooks::notify(hook.as_ref(), &provisional, request);
            }
        }

        evaluation.record.with_latency(time::elapsed_ms(start))
    }

    fn evaluate_with(&self, config: &EngineConfig, request: &ActionRequest) -> Evaluation {
        let normalized = match normalizer::normalize(request) {
            Ok(text) => text,
            Err(e) => return fail_open(&e),
        };

        let haystack = normalizer::bound(&normalized, config.max_input_bytes);
        if haystack.len() < normalized.len() {
            debug!(
                scanned = haystack.len(),
                total = normalized.len(),
                "Normalized input exceeds scan limit, truncating"
            );
        }

        let Some(hit) = self.rules.first_match(haystack) else {
            debug!(tool = ?request.tool, "No rule patterns matched");
            return Evaluation {
                record: DecisionRecord::no_match(),
                configured: Decision::Allow,
            };
        };

        let rule_set = hit.rule_set;
        let decision = if config.mode.is_enforcing() {
            rule_set.decision
        } else {
            Decision::Allow
        };

        match config.mode {
            Mode::Enforce => debug!(
                rule = %rule_set.category,
                decision = %decision,
                "Rule matched"
            ),
            Mode::Warn => warn!(
                rule = %rule_set.category,
                would_be = %rule_set.decision,
                "Rule matched (warn mode, allowing)"
            ),
            Mode::Log => info!(
                rule = %rule_set.category,
                would_be = %rule_set.decision,
                "Rule matched (log mode, allowing)"
            ),
        }

        Evaluation {
            record: DecisionRecord::matched(
                decision,
                rule_set.category,
                rule_set.risk_level,
                &rule_set.description,
                hit.pattern.as_str(),
                hit.matched,
            ),
            configured: rule_set.decision,
        }
    }
}

/// Outcome for a request that could not be normalized: allowed, with reduced confidence.
fn fail_open(err: &GuardError) -> Evaluation {
    warn!("Failed to normalize request, allowing (fail-open): {}", err);
    Evaluation {
        record: DecisionRecord::parse_error(),
        configured: Decision::Allow,
    }
}

impl Default for Guard {
    fn default() -> Self {
        Self::new()
    }
}
