// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use action_guard::{ActionRequest, Guard};
use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use std::sync::LazyLock;

static GUARD: LazyLock<Guard> = LazyLock::new(Guard::new);

#[derive(Debug, Arbitrary)]
struct FuzzRequest {
    agent: Option<String>,
    tool: Option<String>,
    params: Option<String>,
    role: Option<String>,
    history: Vec<String>,
}

fuzz_target!(|data: &[u8]| {
    // Raw bytes as a JSON request: deserialization is lenient and evaluation must not panic.
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let request = ActionRequest::from_value(value);
        let _ = GUARD.check_action(&request);
    }

    let mut unstructured = Unstructured::new(data);
    if let Ok(input) = FuzzRequest::arbitrary(&mut unstructured) {
        let mut request = ActionRequest {
            agent: input.agent,
            tool: input.tool,
            params: input.params.map(Into::into),
            role: input.role,
            context: None,
        };
        if !input.history.is_empty() {
            request = request.with_context(input.history);
        }
        let _ = GUARD.check_action(&request);
    }
});
