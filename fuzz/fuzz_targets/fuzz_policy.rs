// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use action_guard::utils::policy_validator::PolicyValidator;
use action_guard::PolicyDocument;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Policy files arrive as JSON or YAML; neither parser nor validator may panic.
    if let Ok(doc) = serde_json::from_slice::<PolicyDocument>(data) {
        let _ = PolicyValidator::validate_policy(&doc);
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(doc) = serde_yaml_ng::from_str::<PolicyDocument>(text) {
            let _ = PolicyValidator::validate_policy(&doc);
        }
    }
});
