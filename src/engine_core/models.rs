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

//! Domain models for action-guard.
//!
//! This module contains pure data structures representing requests, rule
//! categories and decisions. It is designed to be free of I/O side effects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::engine_core::constants::{confidence, limits, reasons};

/// Outcome of a guard evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    /// Proceed
    Allow,
    /// Reject the action
    Block,
    /// Flag the action for human or secondary review
    Escalate,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Block => "BLOCK",
            Decision::Escalate => "ESCALATE",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALLOW" => Ok(Decision::Allow),
            "BLOCK" => Ok(Decision::Block),
            "ESCALATE" => Ok(Decision::Escalate),
            other => Err(format!("unknown decision '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed taxonomy of risky behavior.
///
/// Declaration order is evaluation order: when a request matches patterns in
/// several categories, the earliest one here is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Destructive,
    Ssrf,
    Exfiltration,
    SqlInjection,
    PathTraversal,
    PromptInjection,
    EncodingAttack,
    CredentialLeak,
}

impl RuleCategory {
    /// All categories in evaluation order.
    pub const ALL: [RuleCategory; 8] = [
        RuleCategory::Destructive,
        RuleCategory::Ssrf,
        RuleCategory::Exfiltration,
        RuleCategory::SqlInjection,
        RuleCategory::PathTraversal,
        RuleCategory::PromptInjection,
        RuleCategory::EncodingAttack,
        RuleCategory::CredentialLeak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Destructive => "destructive",
            RuleCategory::Ssrf => "ssrf",
            RuleCategory::Exfiltration => "exfiltration",
            RuleCategory::SqlInjection => "sql_injection",
            RuleCategory::PathTraversal => "path_traversal",
            RuleCategory::PromptInjection => "prompt_injection",
            RuleCategory::EncodingAttack => "encoding_attack",
            RuleCategory::CredentialLeak => "credential_leak",
        }
    }

    /// Position in evaluation order
    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tool parameters: raw text or a structured mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    Text(String),
    Structured(Map<String, Value>),
}

impl From<Value> for Params {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Params::Text(s),
            Value::Object(map) => Params::Structured(map),
            // Anything else is kept as its JSON text so it is still scanned.
            other => Params::Text(other.to_string()),
        }
    }
}

impl From<&str> for Params {
    fn from(s: &str) -> Self {
        Params::Text(s.to_string())
    }
}

impl From<String> for Params {
    fn from(s: String) -> Self {
        Params::Text(s)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Params::Structured(map)
    }
}

/// Recent conversational context: one string or an ordered history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Context {
    Text(String),
    History(Vec<String>),
}

impl From<Value> for Context {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Context::Text(s),
            Value::Array(items) => Context::History(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            other => Context::Text(other.to_string()),
        }
    }
}

impl From<&str> for Context {
    fn from(s: &str) -> Self {
        Context::Text(s.to_string())
    }
}

impl From<String> for Context {
    fn from(s: String) -> Self {
        Context::Text(s)
    }
}

impl From<Vec<String>> for Context {
    fn from(history: Vec<String>) -> Self {
        Context::History(history)
    }
}

impl From<Vec<&str>> for Context {
    fn from(history: Vec<&str>) -> Self {
        Context::History(history.into_iter().map(String::from).collect())
    }
}

/// A single proposed action, as submitted by an agent or framework adapter.
///
/// Every field is optional; an empty request is valid. Deserialization is lenient:
/// wrongly-typed fields never fail, they are dropped or rendered as text (see
/// [`ActionRequest::from_value`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ActionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
}

impl ActionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_tool(tool: impl Into<String>) -> Self {
        Self {
            tool: Some(tool.into()),
            ..Self::default()
        }
    }

    pub fn with_params(mut self, params: impl Into<Params>) -> Self {
        self.params = Some(params.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<Context>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Build a request from arbitrary JSON without ever failing.
    ///
    /// `parameters` is a deprecated spelling of `params` and is only read when
    /// `params` is absent or null.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };

        let mut params = map.remove("params").filter(|v| !v.is_null());
        if params.is_none() {
            if let Some(legacy) = map.remove("parameters").filter(|v| !v.is_null()) {
                debug!("Request uses deprecated 'parameters' field; treating it as 'params'");
                params = Some(legacy);
            }
        }

        Self {
            agent: take_string(&mut map, "agent"),
            tool: take_string(&mut map, "tool"),
            params: params.map(Params::from),
            role: take_string(&mut map, "role"),
            context: map
                .remove("context")
                .filter(|v| !v.is_null())
                .map(Context::from),
        }
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

impl From<Value> for ActionRequest {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// The verdict handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision: Decision,
    /// Triggering category, `None` when nothing matched
    pub rule: Option<RuleCategory>,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub reason: String,
    #[serde(rename = "latencyMs")]
    pub latency_ms: f64,
}

impl DecisionRecord {
    /// Result for a pattern hit. `decision` is the mode-adjusted decision.
    pub fn matched(
        decision: Decision,
        category: RuleCategory,
        risk_level: RiskLevel,
        description: &str,
        pattern: &str,
        matched_text: &str,
    ) -> Self {
        Self {
            decision,
            rule: Some(category),
            confidence: confidence::MATCHED,
            risk_level,
            reason: format!(
                "{} (pattern: {}, matched: \"{}\")",
                description,
                truncate_chars(pattern, limits::REASON_PATTERN_CHARS),
                truncate_chars(matched_text, limits::REASON_MATCH_CHARS)
            ),
            latency_ms: 0.0,
        }
    }

    pub fn no_match() -> Self {
        Self {
            decision: Decision::Allow,
            rule: None,
            confidence: confidence::NO_MATCH,
            risk_level: RiskLevel::Low,
            reason: reasons::NO_MATCH.to_string(),
            latency_ms: 0.0,
        }
    }

    /// Fail-open result used when the request cannot be normalized
    pub fn parse_error() -> Self {
        Self {
            decision: Decision::Allow,
            rule: None,
            confidence: confidence::PARSE_ERROR,
            risk_level: RiskLevel::Medium,
            reason: reasons::PARSE_ERROR.to_string(),
            latency_ms: 0.0,
        }
    }

    pub fn with_latency(self, latency_ms: f64) -> Self {
        Self { latency_ms, ..self }
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_order_matches_ordinal() {
        for (idx, category) in RuleCategory::ALL.iter().enumerate() {
            assert_eq!(category.ordinal(), idx);
        }
    }

    #[test]
    fn test_request_from_value_is_lenient() {
        let req = ActionRequest::from_value(json!({
            "tool": 42,
            "agent": "bot-1",
            "params": [1, 2, 3],
            "context": {"not": "a list"},
            "role": null
        }));

        assert_eq!(req.tool, None);
        assert_eq!(req.agent.as_deref(), Some("bot-1"));
        assert_eq!(req.params, Some(Params::Text("[1,2,3]".to_string())));
        assert_eq!(req.context, Some(Context::Text("{\"not\":\"a list\"}".to_string())));
        assert_eq!(req.role, None);
    }

    #[test]
    fn test_non_object_request_is_empty() {
        assert_eq!(ActionRequest::from_value(json!("rm -rf /")), ActionRequest::default());
        assert_eq!(ActionRequest::from_value(Value::Null), ActionRequest::default());
    }

    #[test]
    fn test_legacy_parameters_alias() {
        let req: ActionRequest =
            serde_json::from_value(json!({"parameters": {"command": "ls"}})).unwrap();
        assert!(matches!(req.params, Some(Params::Structured(_))));

        // `params` wins when both are present
        let req = ActionRequest::from_value(json!({"params": "a", "parameters": "b"}));
        assert_eq!(req.params, Some(Params::Text("a".to_string())));
    }

    #[test]
    fn test_context_history_renders_non_strings() {
        let ctx = Context::from(json!(["hello", 7, true]));
        assert_eq!(
            ctx,
            Context::History(vec!["hello".to_string(), "7".to_string(), "true".to_string()])
        );
    }

    #[test]
    fn test_record_serialization_field_names() {
        let record = DecisionRecord::no_match().with_latency(0.12);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["decision"], "ALLOW");
        assert_eq!(value["rule"], Value::Null);
        assert_eq!(value["risk_level"], "low");
        assert_eq!(value["latencyMs"], 0.12);
    }

    #[test]
    fn test_parse_error_record() {
        let record = DecisionRecord::parse_error();
        assert_eq!(record.decision, Decision::Allow);
        assert_eq!(record.rule, None);
        assert_eq!(record.confidence, 0.5);
        assert_eq!(record.risk_level, RiskLevel::Medium);
        assert_eq!(record.reason, "parsing error");
    }

    #[test]
    fn test_reason_truncation() {
        let pattern = "p".repeat(100);
        let matched = "é".repeat(100);
        let record = DecisionRecord::matched(
            Decision::Block,
            RuleCategory::Destructive,
            RiskLevel::Critical,
            "desc",
            &pattern,
            &matched,
        );
        assert!(record.reason.contains(&"p".repeat(60)));
        assert!(!record.reason.contains(&"p".repeat(61)));
        assert!(record.reason.contains(&"é".repeat(40)));
        assert!(!record.reason.contains(&"é".repeat(41)));
    }

    #[test]
    fn test_decision_parse() {
        assert_eq!("block".parse::<Decision>().unwrap(), Decision::Block);
        assert!("maybe".parse::<Decision>().is_err());
    }
}
