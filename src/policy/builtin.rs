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

//! Built-in policy templates.

use std::collections::BTreeMap;

use super::{NetworkRules, PolicyDocument, PolicyRules};
use crate::engine_core::constants::policy as names;

const POLICY_VERSION: &str = "1.0.0";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn patterns(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(tool, pats)| (tool.to_string(), strings(pats)))
        .collect()
}

fn ceilings(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// A fresh copy of the named built-in, or `None` if `name` is not reserved.
pub fn builtin_policy(name: &str) -> Option<PolicyDocument> {
    match name {
        names::RESTRICTIVE => Some(restrictive()),
        names::MODERATE => Some(moderate()),
        names::PERMISSIVE => Some(permissive()),
        _ => None,
    }
}

pub fn restrictive() -> PolicyDocument {
    PolicyDocument {
        name: names::RESTRICTIVE.to_string(),
        description: "Read-only tools, no shell, no outbound network".to_string(),
        version: POLICY_VERSION.to_string(),
        rules: PolicyRules {
            allowed_tools: strings(&["read_file", "list_directory", "search", "grep"]),
            blocked_tools: strings(&[
                "exec",
                "shell",
                "bash",
                "write_file",
                "delete_file",
                "web_fetch",
                "http_request",
                "send_email",
                "message",
            ]),
            blocked_patterns: patterns(&[
                ("read_file", &[".env", "id_rsa", "credentials", "/etc/shadow"]),
                ("search", &["password", "secret", "api_key"]),
            ]),
            allowed_paths: strings(&["./"]),
            blocked_paths: strings(&[
                "/etc", "/root", "/var", "/proc", "/sys", "~/.ssh", "~/.aws", "~/.config",
            ]),
            max_params: ceilings(&[("read_file.max_bytes", 1_048_576.0), ("search.limit", 50.0)]),
            network: NetworkRules {
                allow_outbound: false,
                blocked_domains: strings(&["*"]),
            },
        },
    }
}

pub fn moderate() -> PolicyDocument {
    PolicyDocument {
        name: names::MODERATE.to_string(),
        description: "Common development tools with guarded shell and network access".to_string(),
        version: POLICY_VERSION.to_string(),
        rules: PolicyRules {
            allowed_tools: strings(&[
                "read_file",
                "write_file",
                "list_directory",
                "search",
                "grep",
                "exec",
                "web_fetch",
            ]),
            blocked_tools: strings(&["delete_file", "send_email", "sudo"]),
            blocked_patterns: patterns(&[
                (
                    "exec",
                    &["rm -rf", "mkfs", "dd if=", "chmod 777", "curl | sh", "wget | sh"],
                ),
                ("write_file", &["/etc/", "~/.ssh/", ".git/config"]),
                ("web_fetch", &["169.254.169.254", "localhost", "127.0.0.1"]),
            ]),
            allowed_paths: strings(&["./", "/tmp"]),
            blocked_paths: strings(&["/etc", "/root", "/proc", "/sys", "~/.ssh", "~/.aws"]),
            max_params: ceilings(&[
                ("exec.timeout", 300.0),
                ("web_fetch.timeout", 30.0),
                ("write_file.max_bytes", 10_485_760.0),
            ]),
            network: NetworkRules {
                allow_outbound: true,
                blocked_domains: strings(&[
                    "169.254.169.254",
                    "metadata.google.internal",
                    "webhook.site",
                    "pastebin.com",
                    "ngrok.io",
                ]),
            },
        },
    }
}

pub fn permissive() -> PolicyDocument {
    PolicyDocument {
        name: names::PERMISSIVE.to_string(),
        description: "All tools allowed; only known-dangerous destinations blocked".to_string(),
        version: POLICY_VERSION.to_string(),
        rules: PolicyRules {
            allowed_tools: strings(&[names::WILDCARD]),
            blocked_tools: Vec::new(),
            blocked_patterns: patterns(&[("exec", &["rm -rf /", ":(){ :|:& };:"])]),
            allowed_paths: strings(&["/"]),
            blocked_paths: strings(&["~/.ssh", "~/.aws"]),
            max_params: BTreeMap::new(),
            network: NetworkRules {
                allow_outbound: true,
                blocked_domains: strings(&["169.254.169.254", "metadata.google.internal"]),
            },
        },
    }
}
