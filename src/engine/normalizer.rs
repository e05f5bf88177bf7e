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

//! Input normalizer.
//!
//! Flattens an [`ActionRequest`] into the single string the rule corpus is scanned
//! against: params, context, tool, agent and role, space-joined in that order.
//! Absent and empty fields both contribute an empty segment.

use crate::engine_core::errors::GuardError;
use crate::engine_core::models::{ActionRequest, Context, Params};

const SEGMENT_SEPARATOR: &str = " ";

pub fn normalize(request: &ActionRequest) -> Result<String, GuardError> {
    let params = match &request.params {
        Some(Params::Text(text)) => text.clone(),
        // serde_json::Map keeps keys sorted, so equal mappings serialize identically.
        Some(Params::Structured(map)) => serde_json::to_string(map)?,
        None => String::new(),
    };

    let context = match &request.context {
        Some(Context::History(history)) => history.join(SEGMENT_SEPARATOR),
        Some(Context::Text(text)) => text.clone(),
        None => String::new(),
    };

    let segments = [
        params.as_str(),
        context.as_str(),
        request.tool.as_deref().unwrap_or_default(),
        request.agent.as_deref().unwrap_or_default(),
        request.role.as_deref().unwrap_or_default(),
    ];
    Ok(segments.join(SEGMENT_SEPARATOR))
}

/// Longest prefix of `text` that fits in `max_bytes` without splitting a character.
pub fn bound(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_request_has_five_empty_segments() {
        assert_eq!(normalize(&ActionRequest::default()).unwrap(), "    ");
    }

    #[test]
    fn test_segment_order() {
        let request = ActionRequest::for_tool("exec")
            .with_params("ls")
            .with_context(vec!["first", "second"])
            .with_agent("agent-7")
            .with_role("admin");
        assert_eq!(
            normalize(&request).unwrap(),
            "ls first second exec agent-7 admin"
        );
    }

    #[test]
    fn test_structured_params_are_canonical_json() {
        let a = ActionRequest::new().with_params(json!({"b": 1, "a": "x"}));
        let b = ActionRequest::new().with_params(json!({"a": "x", "b": 1}));
        let norm = normalize(&a).unwrap();
        assert!(norm.starts_with(r#"{"a":"x","b":1}"#));
        assert_eq!(norm, normalize(&b).unwrap());
    }

    #[test]
    fn test_empty_fields_are_kept_as_segments() {
        let request = ActionRequest::for_tool("").with_params("").with_context("");
        assert_eq!(normalize(&request).unwrap(), "    ");
    }

    #[test]
    fn test_bound_respects_char_boundaries() {
        assert_eq!(bound("hello", 10), "hello");
        assert_eq!(bound("hello", 3), "hel");
        // 'é' is two bytes; cutting at 1 must not split it
        assert_eq!(bound("é", 1), "");
        assert_eq!(bound("aé", 2), "a");
    }
}
