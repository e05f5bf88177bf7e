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

//! Violation Hook Trait.
//!
//! Observers registered on an engine are told about every request whose matched
//! rule would block or escalate, whatever the current mode.

use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

use crate::engine_core::models::{ActionRequest, DecisionRecord};

/// Observer for rule violations.
pub trait ViolationHook: Send + Sync {
    /// Called synchronously on the evaluating thread before the decision is returned.
    fn on_violation(&self, record: &DecisionRecord, request: &ActionRequest)
        -> anyhow::Result<()>;
}

impl<F> ViolationHook for F
where
    F: Fn(&DecisionRecord, &ActionRequest) -> anyhow::Result<()> + Send + Sync,
{
    fn on_violation(
        &self,
        record: &DecisionRecord,
        request: &ActionRequest,
    ) -> anyhow::Result<()> {
        self(record, request)
    }
}

/// Run `hook`, containing any error or panic it raises.
///
/// Returns `false` if the hook failed. The decision already computed is never touched.
pub fn notify(hook: &dyn ViolationHook, record: &DecisionRecord, request: &ActionRequest) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| hook.on_violation(record, request))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(rule = ?record.rule, "Violation hook failed: {:#}", e);
            false
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "Unknown panic".to_string());
            warn!(rule = ?record.rule, "Violation hook panicked: {}", message);
            false
        }
    }
}
