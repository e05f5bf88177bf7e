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

//! Rule corpus.
//!
//! The corpus is a declarative table: category → ordered patterns → decision,
//! risk and description. [`RuleBook`] compiles a table and always orders it by
//! category declaration order, which is also the order the evaluator scans it in.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

use crate::engine_core::errors::GuardError;
use crate::engine_core::models::{Decision, RiskLevel, RuleCategory};

/// Uncompiled rule set, as written in a corpus table or YAML document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSetSpec {
    pub category: RuleCategory,
    pub decision: Decision,
    pub risk_level: RiskLevel,
    pub description: String,
    pub patterns: Vec<String>,
}

/// Compiled rule set for one category
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub category: RuleCategory,
    pub decision: Decision,
    pub risk_level: RiskLevel,
    pub description: String,
    patterns: Vec<Regex>,
}

impl RuleSet {
    fn compile(spec: RuleSetSpec) -> Result<Self, GuardError> {
        if spec.patterns.is_empty() {
            return Err(GuardError::RuleCorpus(format!(
                "rule set '{}' has no patterns",
                spec.category
            )));
        }

        let patterns = spec
            .patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| GuardError::InvalidPattern {
                    category: spec.category.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            category: spec.category,
            decision: spec.decision,
            risk_level: spec.risk_level,
            description: spec.description,
            patterns,
        })
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }
}

/// The first pattern hit in a scan
#[derive(Debug)]
pub struct RuleMatch<'a> {
    pub rule_set: &'a RuleSet,
    pub pattern: &'a Regex,
    pub matched: &'a str,
}

/// An immutable, ordered collection of compiled rule sets.
#[derive(Debug, Clone)]
pub struct RuleBook {
    sets: Vec<RuleSet>,
}

static BUILTIN: LazyLock<Arc<RuleBook>> = LazyLock::new(|| {
    Arc::new(RuleBook::from_specs(builtin_specs()).expect("built-in rule corpus must compile"))
});

impl RuleBook {
    /// The built-in eight-category corpus, compiled once per process.
    pub fn builtin() -> Arc<RuleBook> {
        Arc::clone(&BUILTIN)
    }

    /// Compile a corpus table. Each category may appear at most once; the result is
    /// ordered by category declaration order regardless of input order.
    pub fn from_specs(specs: Vec<RuleSetSpec>) -> Result<Self, GuardError> {
        let mut sets = Vec::with_capacity(specs.len());
        for spec in specs {
            if sets.iter().any(|s: &RuleSet| s.category == spec.category) {
                return Err(GuardError::RuleCorpus(format!(
                    "category '{}' is defined more than once",
                    spec.category
                )));
            }
            sets.push(RuleSet::compile(spec)?);
        }
        sets.sort_by_key(|s| s.category.ordinal());
        Ok(Self { sets })
    }

    /// Compile a corpus from a YAML (or JSON) list of rule sets.
    pub fn from_yaml_str(source: &str) -> Result<Self, GuardError> {
        let specs: Vec<RuleSetSpec> = serde_yaml_ng::from_str(source)
            .map_err(|e| GuardError::RuleCorpus(format!("invalid rule corpus document: {}", e)))?;
        Self::from_specs(specs)
    }

    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.sets
    }

    pub fn get(&self, category: RuleCategory) -> Option<&RuleSet> {
        self.sets.iter().find(|s| s.category == category)
    }

    pub fn pattern_count(&self) -> usize {
        self.sets.iter().map(|s| s.patterns.len()).sum()
    }

    /// Scan categories, then patterns, in order and stop at the first hit.
    pub fn first_match<'a>(&'a self, haystack: &'a str) -> Option<RuleMatch<'a>> {
        for rule_set in &self.sets {
            for pattern in &rule_set.patterns {
                if let Some(m) = pattern.find(haystack) {
                    return Some(RuleMatch {
                        rule_set,
                        pattern,
                        matched: m.as_str(),
                    });
                }
            }
        }
        None
    }
}

type CorpusRow = (RuleCategory, Decision, RiskLevel, &'static str, &'static [&'static str]);

const CORPUS: &[CorpusRow] = &[
    (
        RuleCategory::Destructive,
        Decision::Block,
        RiskLevel::Critical,
        "Destructive system command",
        &[
            r"(?i)\brm\s+(-[a-z]+\s+)*-[a-z]*r[a-z]*\s+(/|~|\$HOME|\*)",
            r"(?i)\bmkfs(\.[a-z0-9]+)?\s",
            r"(?i)\bdd\s+[^\n]*\bof=/dev/(sd|hd|nvme|xvd|disk)",
            r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:",
            r"(?i)\bchmod\s+(-[a-z]+\s+)*0?777\s+/",
            r"(?i)\b(shutdown|reboot|poweroff|halt)\s+(-[a-z]+|now)\b",
            r"(?i)>\s*/dev/(sd[a-z]|hd[a-z]|nvme\d)",
            r"(?i)\b(drop|truncate)\s+(table|database|schema)\b",
            r"(?i)\bgit\s+push\s+[^\n]*(--force\b|-f\b)",
            r"(?i)\b(del|rd|rmdir)\s+/[sq]\b",
            r"(?i)\bformat\s+[a-z]:",
        ],
    ),
    (
        RuleCategory::Ssrf,
        Decision::Block,
        RiskLevel::High,
        "Request to internal network or cloud metadata endpoint",
        &[
            r"169\.254\.169\.254",
            r"(?i)\bmetadata\.google\.internal\b",
            r"(?i)\b(100\.100\.100\.200|fd00:ec2::254)\b",
            r"(?i)\b[a-z][a-z0-9+.-]*://(localhost|127\.\d{1,3}\.\d{1,3}\.\d{1,3}|0\.0\.0\.0|\[::1?\])",
            r"(?i)\b[a-z][a-z0-9+.-]*://(10\.\d{1,3}\.\d{1,3}\.\d{1,3}|192\.168\.\d{1,3}\.\d{1,3}|172\.(1[6-9]|2\d|3[01])\.\d{1,3}\.\d{1,3})",
            r"(?i)\b(file|gopher|dict|ldap)://",
            r#"(?i)\bhttps?://[a-z0-9.-]+\.(internal|local|localdomain)(:\d+)?([/?#"'\s]|$)"#,
        ],
    ),
    (
        RuleCategory::Exfiltration,
        Decision::Block,
        RiskLevel::High,
        "Data exfiltration to an external destination",
        &[
            r"(?i)\bcurl\s+[^\n]*(\s-d\s*@|--data(-binary|-raw|-urlencode)?\s+@|\s-F\s|--form\s|\s-T\s|--upload-file\s)",
            r"(?i)\bwget\s+[^\n]*--post-(data|file)",
            r"(?i)\|\s*(nc|ncat|netcat|socat)\s",
            r"(?i)\b(webhook\.site|requestbin\.(com|net)|pipedream\.net|ngrok(-free)?\.(io|app)|burpcollaborator\.net|interact\.sh|oast\.(pro|fun|site)|pastebin\.com)\b",
            r"(?i)\bscp\s+[^\n]*\s[\w.-]+@[\w.-]+:",
            r"(?i)\b(cat|tar|zip)\s+[^\n|]*\|\s*(curl|wget)\b",
            r"(?i)/dev/tcp/",
        ],
    ),
    (
        RuleCategory::SqlInjection,
        Decision::Block,
        RiskLevel::High,
        "SQL injection attempt",
        &[
            r"(?i)'\s*(or|and)\s+'?\w+'?\s*=\s*'?\w+",
            r"(?i)\bunion\s+(all\s+)?select\b",
            r"(?i);\s*(drop|delete|truncate|alter|insert|update)\s",
            r#"'(--|/\*)(\s|["\\]|$)"#,
            r"(?i)\b(pg_sleep|benchmark)\s*\(\s*\d|\bwaitfor\s+delay\s+'",
            r"(?i)\bxp_cmdshell\b",
        ],
    ),
    (
        RuleCategory::PathTraversal,
        Decision::Block,
        RiskLevel::High,
        "Path traversal or sensitive system file access",
        &[
            r"(\.\.[/\\]+){2,}",
            r"(?i)(%2e%2e(%2f|%5c|/|\\)|\.\.(%2f|%5c))",
            r"(?i)%252e%252e",
            r"(?i)/etc/(passwd|shadow|sudoers|gshadow)\b",
            r"(?i)(~|\$HOME|/root|/home/[^/\s]+)/\.(ssh|aws|gnupg|kube)/",
            r"(?i)\b[a-z]:\\+windows\\+system32\b",
            r"(?i)/proc/self/(environ|cmdline|mem)\b",
        ],
    ),
    (
        RuleCategory::PromptInjection,
        Decision::Escalate,
        RiskLevel::High,
        "Prompt injection attempt",
        &[
            r"(?i)\bignore\s+(all\s+)?(the\s+)?(previous|prior|above|earlier)\s+(instructions|prompts|rules|directions)",
            r"(?i)\bdisregard\s+(all\s+)?(the\s+)?(previous|prior|above|your)\s+(instructions|guidelines|rules|programming)",
            r"(?i)\bforget\s+(everything|all)\s+(you\s+)?(were\s+told|know|above)",
            r"(?i)\byou\s+are\s+now\s+(in\s+)?(dan|developer\s+mode|jailbroken|unrestricted|an?\s+unfiltered)",
            r"(?i)\b(reveal|print|show|repeat|output)\s+(me\s+)?(your|the)\s+(system\s+prompt|hidden\s+instructions|initial\s+instructions)",
            r"(?i)(<\|im_start\|>|<\|im_end\|>|<\|system\|>|\[/?INST\]|<</?SYS>>)",
            r"(?i)\bnew\s+(system\s+)?instructions\s*:",
        ],
    ),
    (
        RuleCategory::EncodingAttack,
        Decision::Escalate,
        RiskLevel::Medium,
        "Encoded or obfuscated payload",
        &[
            r"(?i)\bbase64\s+(-d|--decode)\b",
            r"(?i)\b(atob|b64decode|base64_decode|unescape)\s*\(",
            r"(?i)(\\+x[0-9a-f]{2}){4,}",
            r"(?i)(\\+u[0-9a-f]{4}){4,}",
            r"(?i)(%[0-9a-f]{2}){8,}",
            r"(?i)\b(eval|exec)\s*\(\s*(atob|unescape|compile|__import__|string\.fromcharcode|bytes\.fromhex)",
            r"[A-Za-z0-9+/]{120,}={0,2}",
        ],
    ),
    (
        RuleCategory::CredentialLeak,
        Decision::Escalate,
        RiskLevel::Critical,
        "Credential or secret exposure",
        &[
            r"\bsk-[A-Za-z0-9_-]{20,}",
            r"\b(AKIA|ASIA)[0-9A-Z]{16}\b",
            r"\bgh[pousr]_[A-Za-z0-9]{36,}\b",
            r"\bxox[abprs]-[A-Za-z0-9-]{10,}",
            r"\bAIza[0-9A-Za-z_-]{35}\b",
            r"-----BEGIN\s+([A-Z]+\s+)*PRIVATE\s+KEY-----",
            r#"(?i)\b(password|passwd|secret|api[_-]?key|access[_-]?token|auth[_-]?token)["']?\s*[:=]\s*["']?[^\s"',;]{8,}"#,
        ],
    ),
];

/// The built-in corpus as an editable table.
pub fn builtin_specs() -> Vec<RuleSetSpec> {
    CORPUS
        .iter()
        .map(
            |(category, decision, risk_level, description, patterns)| RuleSetSpec {
                category: *category,
                decision: *decision,
                risk_level: *risk_level,
                description: description.to_string(),
                patterns: patterns.iter().map(|p| p.to_string()).collect(),
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_corpus_compiles_in_declaration_order() {
        let book = RuleBook::builtin();
        let order: Vec<RuleCategory> = book.rule_sets().iter().map(|s| s.category).collect();
        assert_eq!(order, RuleCategory::ALL.to_vec());
        assert!(book.pattern_count() >= 20);
    }

    #[test]
    fn test_builtin_decisions_and_risks() {
        let book = RuleBook::builtin();
        let destructive = book.get(RuleCategory::Destructive).unwrap();
        assert_eq!(destructive.decision, Decision::Block);
        assert_eq!(destructive.risk_level, RiskLevel::Critical);

        let creds = book.get(RuleCategory::CredentialLeak).unwrap();
        assert_eq!(creds.decision, Decision::Escalate);
    }

    #[test]
    fn test_first_match_wins_across_categories() {
        // Both destructive (`drop table`) and SQL injection (`; drop`) patterns apply.
        let book = RuleBook::builtin();
        let hit = book.first_match("x'; DROP TABLE users; --").unwrap();
        assert_eq!(hit.rule_set.category, RuleCategory::Destructive);
        assert_eq!(hit.matched, "DROP TABLE");
    }

    #[test]
    fn test_no_match_on_benign_text() {
        let book = RuleBook::builtin();
        assert!(book.first_match("git log --oneline -10").is_none());
        assert!(book.first_match("").is_none());
    }

    #[test]
    fn test_custom_specs_are_reordered() {
        let specs = vec![
            RuleSetSpec {
                category: RuleCategory::CredentialLeak,
                decision: Decision::Escalate,
                risk_level: RiskLevel::Critical,
                description: "secret".to_string(),
                patterns: vec!["token".to_string()],
            },
            RuleSetSpec {
                category: RuleCategory::Destructive,
                decision: Decision::Block,
                risk_level: RiskLevel::Critical,
                description: "boom".to_string(),
                patterns: vec!["token".to_string()],
            },
        ];
        let book = RuleBook::from_specs(specs).unwrap();
        let hit = book.first_match("token").unwrap();
        assert_eq!(hit.rule_set.category, RuleCategory::Destructive);
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let spec = RuleSetSpec {
            category: RuleCategory::Ssrf,
            decision: Decision::Block,
            risk_level: RiskLevel::High,
            description: "x".to_string(),
            patterns: vec!["a".to_string()],
        };
        let err = RuleBook::from_specs(vec![spec.clone(), spec]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let spec = RuleSetSpec {
            category: RuleCategory::Ssrf,
            decision: Decision::Block,
            risk_level: RiskLevel::High,
            description: "x".to_string(),
            patterns: vec!["(unclosed".to_string()],
        };
        let err = RuleBook::from_specs(vec![spec]).unwrap_err();
        assert!(matches!(err, GuardError::InvalidPattern { .. }));
    }

    #[test]
    fn test_empty_rule_set_rejected() {
        let spec = RuleSetSpec {
            category: RuleCategory::Ssrf,
            decision: Decision::Block,
            risk_level: RiskLevel::High,
            description: "x".to_string(),
            patterns: vec![],
        };
        assert!(RuleBook::from_specs(vec![spec]).is_err());
    }

    #[test]
    fn test_corpus_from_yaml() {
        let yaml = r#"
- category: sql_injection
  decision: BLOCK
  risk_level: high
  description: Tautology
  patterns:
    - "(?i)or\\s+1=1"
"#;
        let book = RuleBook::from_yaml_str(yaml).unwrap();
        assert_eq!(book.rule_sets().len(), 1);
        let hit = book.first_match("' OR 1=1").unwrap();
        assert_eq!(hit.rule_set.category, RuleCategory::SqlInjection);
    }

    #[test]
    fn test_corpus_yaml_errors_are_reported() {
        let err = RuleBook::from_yaml_str("- category: nope").unwrap_err();
        assert!(matches!(err, GuardError::RuleCorpus(_)));
    }
}
