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

//! Configuration Store.
//!
//! Each engine owns one store. Readers take a snapshot (`Arc<EngineConfig>`) and
//! updates swap the whole record, so an evaluation never sees a half-applied
//! `configure` call.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::Mode;
use crate::engine_core::constants::limits;
use crate::engine_core::hooks::ViolationHook;
use crate::engine_core::models::{ActionRequest, DecisionRecord};

#[derive(Clone)]
pub struct EngineConfig {
    pub mode: Mode,
    /// Invoked when a matched category's configured decision is not ALLOW
    pub on_violation: Option<Arc<dyn ViolationHook>>,
    /// Normalized input beyond this many bytes is not scanned
    pub max_input_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Enforce,
            on_violation: None,
            max_input_bytes: limits::DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("mode", &self.mode)
            .field("on_violation", &self.on_violation.as_ref().map(|_| "<hook>"))
            .field("max_input_bytes", &self.max_input_bytes)
            .finish()
    }
}

/// A partial configuration. Only the fields that are set overwrite the stored values.
#[derive(Clone, Default)]
pub struct ConfigUpdate {
    mode: Option<Mode>,
    on_violation: Option<Option<Arc<dyn ViolationHook>>>,
    max_input_bytes: Option<usize>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Register a closure as the violation hook.
    pub fn on_violation<F>(self, hook: F) -> Self
    where
        F: Fn(&DecisionRecord, &ActionRequest) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.violation_hook(hook)
    }

    pub fn violation_hook(mut self, hook: impl ViolationHook + 'static) -> Self {
        self.on_violation = Some(Some(Arc::new(hook)));
        self
    }

    pub fn on_violation_shared(mut self, hook: Arc<dyn ViolationHook>) -> Self {
        self.on_violation = Some(Some(hook));
        self
    }

    /// Unregister the violation hook.
    pub fn clear_violation_hook(mut self) -> Self {
        self.on_violation = Some(None);
        self
    }

    pub fn max_input_bytes(mut self, max: usize) -> Self {
        self.max_input_bytes = Some(max);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mode.is_none() && self.on_violation.is_none() && self.max_input_bytes.is_none()
    }

    fn apply_to(self, base: &EngineConfig) -> EngineConfig {
        EngineConfig {
            mode: self.mode.unwrap_or(base.mode),
            on_violation: match self.on_violation {
                Some(hook) => hook,
                None => base.on_violation.clone(),
            },
            max_input_bytes: self.max_input_bytes.unwrap_or(base.max_input_bytes),
        }
    }
}

impl fmt::Debug for ConfigUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hook = match &self.on_violation {
            None => "<unchanged>",
            Some(None) => "<cleared>",
            Some(Some(_)) => "<hook>",
        };
        f.debug_struct("ConfigUpdate")
            .field("mode", &self.mode)
            .field("on_violation", &hook)
            .field("max_input_bytes", &self.max_input_bytes)
            .finish()
    }
}

/// Read-mostly holder for one engine's configuration.
pub struct ConfigStore {
    current: RwLock<Arc<EngineConfig>>,
}

impl ConfigStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// The configuration every evaluation reads.
    pub fn snapshot(&self) -> Arc<EngineConfig> {
        // A panicking writer cannot leave a torn record behind: the swap below is a
        // single assignment, so a poisoned lock still holds a complete snapshot.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merge `update` into the stored configuration.
    pub fn update(&self, update: ConfigUpdate) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let merged = update.apply_to(&guard);
        *guard = Arc::new(merged);
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_hook(_: &DecisionRecord, _: &ActionRequest) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn test_defaults() {
        let store = ConfigStore::default();
        let cfg = store.snapshot();
        assert_eq!(cfg.mode, Mode::Enforce);
        assert!(cfg.on_violation.is_none());
        assert_eq!(cfg.max_input_bytes, limits::DEFAULT_MAX_INPUT_BYTES);
    }

    #[test]
    fn test_partial_merge_keeps_omitted_fields() {
        let store = ConfigStore::default();
        store.update(ConfigUpdate::new().on_violation(noop_hook));
        store.update(ConfigUpdate::new().mode(Mode::Warn));

        let cfg = store.snapshot();
        assert_eq!(cfg.mode, Mode::Warn);
        assert!(cfg.on_violation.is_some(), "hook must survive a mode-only update");

        store.update(ConfigUpdate::new().clear_violation_hook());
        let cfg = store.snapshot();
        assert_eq!(cfg.mode, Mode::Warn);
        assert!(cfg.on_violation.is_none());
    }

    #[test]
    fn test_empty_update_is_noop() {
        let store = ConfigStore::default();
        let before = store.snapshot();
        let update = ConfigUpdate::new();
        assert!(update.is_empty());
        store.update(update);
        let after = store.snapshot();
        assert_eq!(before.mode, after.mode);
        assert_eq!(before.max_input_bytes, after.max_input_bytes);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_updates() {
        let store = ConfigStore::default();
        let old = store.snapshot();
        store.update(ConfigUpdate::new().mode(Mode::Log));
        assert_eq!(old.mode, Mode::Enforce);
        assert_eq!(store.snapshot().mode, Mode::Log);
    }
}
