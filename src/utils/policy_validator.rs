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

// Policy document validation - fail-fast at load time

use crate::policy::{NetworkRules, PolicyDocument, PolicyRules};

use std::collections::HashSet;

/// Validates policy documents for structural correctness and semantic consistency
pub struct PolicyValidator;

impl PolicyValidator {
    /// Validate all policies
    pub fn validate_policies(policies: &[PolicyDocument]) -> Result<(), String> {
        for policy in policies {
            Self::validate_policy(policy)?;
        }
        Ok(())
    }

    /// Validate a single policy document
    pub fn validate_policy(policy: &PolicyDocument) -> Result<(), String> {
        // Policy must have a non-empty name
        if policy.name.trim().is_empty() {
            return Err("policy name cannot be empty".to_string());
        }

        Self::validate_rules(&policy.rules, &policy.name)
    }

    fn validate_rules(rules: &PolicyRules, policy_name: &str) -> Result<(), String> {
        Self::validate_tool_lists(rules, policy_name)?;

        for (tool, patterns) in &rules.blocked_patterns {
            if tool.trim().is_empty() {
                return Err(format!(
                    "Policy '{}': blockedPatterns has an empty tool name",
                    policy_name
                ));
            }
            if patterns.iter().any(|p| p.is_empty()) {
                return Err(format!(
                    "Policy '{}': blockedPatterns for '{}' contains an empty pattern",
                    policy_name, tool
                ));
            }
        }

        for (list_name, paths) in [
            ("allowedPaths", &rules.allowed_paths),
            ("blockedPaths", &rules.blocked_paths),
        ] {
            if paths.iter().any(|p| p.trim().is_empty()) {
                return Err(format!(
                    "Policy '{}': {} contains an empty path",
                    policy_name, list_name
                ));
            }
        }

        Self::validate_max_params(rules, policy_name)?;
        Self::validate_network(&rules.network, policy_name)
    }

    /// Tool names must be non-empty and a tool cannot be both allowed and blocked
    fn validate_tool_lists(rules: &PolicyRules, policy_name: &str) -> Result<(), String> {
        for (list_name, tools) in [
            ("allowedTools", &rules.allowed_tools),
            ("blockedTools", &rules.blocked_tools),
        ] {
            if tools.iter().any(|t| t.trim().is_empty()) {
                return Err(format!(
                    "Policy '{}': {} contains an empty tool name",
                    policy_name, list_name
                ));
            }
        }

        let allowed: HashSet<&str> = rules.allowed_tools.iter().map(String::as_str).collect();
        if let Some(conflict) = rules
            .blocked_tools
            .iter()
            .find(|t| allowed.contains(t.as_str()))
        {
            return Err(format!(
                "Policy '{}': tool '{}' is both allowed and blocked",
                policy_name, conflict
            ));
        }

        Ok(())
    }

    /// Ceilings must be finite, non-negative and keyed as `tool.param`
    fn validate_max_params(rules: &PolicyRules, policy_name: &str) -> Result<(), String> {
        for (key, ceiling) in &rules.max_params {
            let well_formed = key
                .split_once('.')
                .is_some_and(|(tool, param)| !tool.is_empty() && !param.is_empty());
            if !well_formed {
                return Err(format!(
                    "Policy '{}': maxParams key '{}' must be of the form 'tool.param'",
                    policy_name, key
                ));
            }
            if !ceiling.is_finite() || *ceiling < 0.0 {
                return Err(format!(
                    "Policy '{}': maxParams '{}' has invalid ceiling {}",
                    policy_name, key, ceiling
                ));
            }
        }
        Ok(())
    }

    fn validate_network(network: &NetworkRules, policy_name: &str) -> Result<(), String> {
        if network.blocked_domains.iter().any(|d| d.trim().is_empty()) {
            return Err(format!(
                "Policy '{}': network.blockedDomains contains an empty domain",
                policy_name
            ));
        }
        Ok(())
    }
}
