//! Kill-switch gate
//!
//! Shared enable flag checked before every dispatch. Clones share the same
//! flag; [`Gate::global`] is the process-wide instance used by default.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use contracts::DispatchError;
use tracing::info;

static GLOBAL_GATE: OnceLock<Gate> = OnceLock::new();

/// Message delivered when a dispatch hits a disabled gate
pub const DISABLED_MESSAGE: &str = "event dispatch is disabled";

/// Enable/disable switch shared across clients
#[derive(Debug, Clone)]
pub struct Gate {
    enabled: Arc<AtomicBool>,
}

impl Gate {
    /// Create an isolated gate, enabled
    pub fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// The process-wide gate
    ///
    /// Every client built without an explicit gate shares this one, so a
    /// toggle here affects all of them.
    pub fn global() -> Gate {
        GLOBAL_GATE.get_or_init(Gate::new).clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Toggle the gate
    ///
    /// Calls already past the gate check are not affected.
    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            info!(enabled, "Dispatch gate toggled");
        }
        observability::record_gate_state(enabled);
    }

    pub fn enable(&self) {
        self.set_enabled(true);
    }

    pub fn disable(&self) {
        self.set_enabled(false);
    }

    /// Fail with [`DispatchError::Disabled`] when the gate is off
    pub fn check(&self) -> Result<(), DispatchError> {
        if self.is_enabled() {
            Ok(())
        } else {
            Err(DispatchError::disabled(DISABLED_MESSAGE))
        }
    }

    /// Whether both handles control the same flag
    pub fn shares_state_with(&self, other: &Gate) -> bool {
        Arc::ptr_eq(&self.enabled, &other.enabled)
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the process-wide gate is enabled
pub fn is_enabled() -> bool {
    Gate::global().is_enabled()
}

/// Toggle the process-wide gate
pub fn set_enabled(enabled: bool) {
    Gate::global().set_enabled(enabled);
}
