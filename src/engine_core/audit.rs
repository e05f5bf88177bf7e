use serde::Serialize;
use tracing::{info, warn};

use crate::config::Mode;
use crate::engine_core::hooks::ViolationHook;
use crate::engine_core::models::{ActionRequest, DecisionRecord};

#[derive(Serialize)]
struct AuditEntry<'a> {
    timestamp: f64,
    mode: Mode,
    tool: Option<&'a str>,
    agent: Option<&'a str>,
    role: Option<&'a str>,
    record: &'a DecisionRecord,
}

/// Violation hook that writes each violation as a structured `audit` event.
///
/// In `log` mode violations are emitted at info level, otherwise at warn level.
pub struct AuditHook {
    mode: Mode,
}

impl AuditHook {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }
}

impl ViolationHook for AuditHook {
    fn on_violation(
        &self,
        record: &DecisionRecord,
        request: &ActionRequest,
    ) -> anyhow::Result<()> {
        let entry = AuditEntry {
            timestamp: crate::utils::time::now(),
            mode: self.mode,
            tool: request.tool.as_deref(),
            agent: request.agent.as_deref(),
            role: request.role.as_deref(),
            record,
        };
        let payload = serde_json::to_string(&entry)?;

        match self.mode {
            Mode::Log => info!(target: "audit", payload = %payload, "RULE_VIOLATION"),
            Mode::Enforce | Mode::Warn => {
                warn!(target: "audit", payload = %payload, "RULE_VIOLATION")
            }
        }
        Ok(())
    }
}
