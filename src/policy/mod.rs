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

//! Policy documents.
//!
//! A policy document is a declarative permission specification (allow/block lists,
//! path and network rules). The decision engine does not consult it yet; it is
//! loaded, validated and handed to whoever needs it.

pub mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::engine_core::constants::policy as names;
use crate::engine_core::errors::GuardError;
use crate::utils::policy_validator::PolicyValidator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct PolicyDocument {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub rules: PolicyRules,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyRules {
    /// Tool names the agent may call; `*` allows every tool
    pub allowed_tools: Vec<String>,
    pub blocked_tools: Vec<String>,
    /// Tool name -> literal or regex strings that must not appear in its parameters
    pub blocked_patterns: BTreeMap<String, Vec<String>>,
    pub allowed_paths: Vec<String>,
    pub blocked_paths: Vec<String>,
    /// Dotted parameter key (e.g. `web_fetch.timeout`) -> numeric ceiling
    pub max_params: BTreeMap<String, f64>,
    pub network: NetworkRules,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkRules {
    pub allow_outbound: bool,
    pub blocked_domains: Vec<String>,
}

/// Names of the built-in policies, in listing order.
pub fn list_policies() -> [&'static str; 3] {
    names::BUILTIN_NAMES
}

/// Load a built-in policy by name, or a policy file by path.
///
/// Built-ins are returned as fresh copies. Files ending in `.json` are parsed as
/// JSON, anything else as YAML. File errors name the resolved path.
pub fn load_policy(name_or_path: &str) -> Result<PolicyDocument, GuardError> {
    if let Some(doc) = builtin::builtin_policy(name_or_path) {
        debug!(policy = name_or_path, "Loaded built-in policy");
        return Ok(doc);
    }
    load_policy_file(Path::new(name_or_path))
}

pub fn load_policy_file(path: &Path) -> Result<PolicyDocument, GuardError> {
    let resolved = resolve(path);
    let content = std::fs::read_to_string(&resolved).map_err(|source| GuardError::PolicyLoad {
        path: resolved.clone(),
        source,
    })?;

    let is_json = resolved
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let doc: PolicyDocument = if is_json {
        serde_json::from_str(&content).map_err(|e| GuardError::PolicyParse {
            path: resolved.clone(),
            reason: e.to_string(),
        })?
    } else {
        serde_yaml_ng::from_str(&content).map_err(|e| GuardError::PolicyParse {
            path: resolved.clone(),
            reason: e.to_string(),
        })?
    };

    PolicyValidator::validate_policy(&doc).map_err(|reason| GuardError::PolicyInvalid {
        path: resolved.clone(),
        reason,
    })?;

    info!(policy = %doc.name, path = %resolved.display(), "Loaded policy file");
    Ok(doc)
}

fn resolve(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_policies_order() {
        assert_eq!(list_policies(), ["restrictive", "moderate", "permissive"]);
    }

    #[test]
    fn test_builtins_load_by_name() {
        for name in list_policies() {
            let doc = load_policy(name).unwrap();
            assert_eq!(doc.name, name);
        }
    }

    #[test]
    fn test_builtin_is_a_fresh_copy() {
        let mut first = load_policy("moderate").unwrap();
        first.rules.blocked_tools.push("everything".to_string());
        let second = load_policy("moderate").unwrap();
        assert!(!second.rules.blocked_tools.contains(&"everything".to_string()));
    }

    #[test]
    fn test_missing_file_names_resolved_path() {
        let err = load_policy("/nonexistent").unwrap_err();
        assert!(matches!(err, GuardError::PolicyLoad { .. }));
        assert!(err.to_string().contains("/nonexistent"));
        assert_eq!(err.policy_path(), Some(Path::new("/nonexistent")));
    }

    #[test]
    fn test_relative_path_is_resolved() {
        let err = load_policy("definitely-missing-policy.yaml").unwrap_err();
        let path = err.policy_path().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("definitely-missing-policy.yaml"));
    }

    #[test]
    fn test_rules_round_trip_camel_case() {
        let value = serde_json::to_value(load_policy("restrictive").unwrap()).unwrap();
        assert!(value["rules"]["allowedTools"].is_array());
        assert!(value["rules"]["network"]["allowOutbound"].is_boolean());
        assert!(value["rules"]["maxParams"].is_object());
    }
}
