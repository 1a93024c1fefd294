//! Change notifications

use std::sync::Mutex;

use serde::Serialize;
use tracing::info;

use crate::mask::Mask;
use crate::operator::OperatorId;

/// Emitted on every role or feature mutation, including initialization seeding.
///
/// For feature changes `operator` is the instance's own identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleUpdated {
    pub by: OperatorId,
    pub operator: OperatorId,
    pub requested: Mask,
    pub assigned: Mask,
}

/// Receiver of change notifications. Called after the change has committed.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &RoleUpdated);
}

/// Default sink: one structured log record per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, e: &RoleUpdated) {
        info!(
            by = %e.by,
            operator = %e.operator,
            requested = %e.requested,
            assigned = %e.assigned,
            "role updated"
        );
    }
}

/// In-memory sink keeping every event, in emission order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<RoleUpdated>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<RoleUpdated> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Drain recorded events
    pub fn take(&self) -> Vec<RoleUpdated> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(|p| p.into_inner()))
    }

    pub fn last(&self) -> Option<RoleUpdated> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).last().copied()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &RoleUpdated) {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).push(*event);
    }
}
