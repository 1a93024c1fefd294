//! Permission store: role and feature bitmasks behind the `ACCESS_MANAGER` guard

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::constants::{DEFAULT_INSTANCE_ID, ROLE_ACCESS_MANAGER};
use crate::db::Storage;
use crate::error::{Error, Result};
use crate::event::{EventSink, RoleUpdated, TracingSink};
use crate::init::InitState;
use crate::mask::Mask;
use crate::operator::OperatorId;
use crate::read;
use crate::update::evaluate_by;

/// How role checks treat holders of `ROLE_ACCESS_MANAGER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BypassPolicy {
    /// An `ACCESS_MANAGER` passes every role check, whatever bits are required.
    #[default]
    AccessManager,
    /// Role checks are literal: all required bits must be held.
    Literal,
}

/// Fail with `AccessDenied` unless `condition` holds.
#[inline]
pub fn require_access_condition(condition: bool) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::AccessDenied)
    }
}

/// One access-control instance over its own storage.
///
/// Reads are lock-free LMDB read transactions. Every mutation reads the
/// caller's role, the current value and writes the result inside a
/// single write transaction, and the event is emitted only once that
/// transaction has committed. Commit and emission happen under one
/// per-instance lock, so the sink sees events in commit order.
///
/// A sink must not call back into a mutating method of the same instance.
pub struct AccessControl {
    storage: Storage,
    instance: OperatorId,
    bypass: BypassPolicy,
    sink: Arc<dyn EventSink>,
    writer: Mutex<()>,
}

impl AccessControl {
    /// Attach to `storage` in whatever state it is. Fresh storage is
    /// uninitialized until [`post_construct`](Self::post_construct) runs.
    pub fn new(storage: Storage) -> Self {
        AccessControl {
            storage,
            instance: DEFAULT_INSTANCE_ID,
            bypass: BypassPolicy::default(),
            sink: Arc::new(TracingSink),
            writer: Mutex::new(()),
        }
    }

    /// Open the configured storage and apply the configured identity and policy.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Storage::from_config(config)?)
            .with_instance(config.instance)
            .with_bypass(config.bypass))
    }

    pub fn with_instance(mut self, instance: OperatorId) -> Self {
        self.instance = instance;
        self
    }

    pub fn with_bypass(mut self, bypass: BypassPolicy) -> Self {
        self.bypass = bypass;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The instance's own identifier
    pub fn instance(&self) -> OperatorId {
        self.instance
    }

    pub fn bypass(&self) -> BypassPolicy {
        self.bypass
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub(crate) fn emit(&self, event: &RoleUpdated) {
        self.sink.emit(event);
    }

    /// Held from the start of a write transaction until its events are emitted.
    pub(crate) fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn state(&self) -> Result<InitState> {
        self.storage.read(|d, tx| Ok(read::initialized(d, tx)?.into()))
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Role mask of `operator`; zero if never assigned.
    pub fn get_role(&self, operator: OperatorId) -> Result<Mask> {
        self.storage.read(|d, tx| read::role(d, tx, operator))
    }

    pub fn is_operator_in_role(&self, operator: OperatorId, required: Mask) -> Result<bool> {
        Ok(self.has_role(self.get_role(operator)?, required))
    }

    pub fn is_sender_in_role(&self, sender: OperatorId, required: Mask) -> Result<bool> {
        self.is_operator_in_role(sender, required)
    }

    /// Guard for privileged operations.
    pub fn require_sender_in_role(&self, sender: OperatorId, required: Mask) -> Result<()> {
        require_access_condition(self.is_sender_in_role(sender, required)?)
    }

    /// See [`require_access_condition`].
    #[inline]
    pub fn require_access_condition(condition: bool) -> Result<()> {
        require_access_condition(condition)
    }

    pub fn features(&self) -> Result<Mask> {
        self.storage.read(|d, tx| read::features(d, tx))
    }

    /// True iff every bit of `required` is enabled. No bypass applies.
    pub fn is_feature_enabled(&self, required: Mask) -> Result<bool> {
        Ok(self.features()?.contains(required))
    }

    /// Every operator with a non-zero role, ordered by id.
    pub fn list_roles(&self) -> Result<Vec<(OperatorId, Mask)>> {
        self.storage.read(|d, tx| read::list_roles(d, tx))
    }

    // ------------------------------------------------------------------
    // Guarded writes
    // ------------------------------------------------------------------

    /// Update `operator`'s role. Requires `ROLE_ACCESS_MANAGER`; the
    /// assigned value only differs from the current one in bits `sender`
    /// holds. Returns the assigned mask.
    pub fn update_role(&self, sender: OperatorId, operator: OperatorId, requested: Mask) -> Result<Mask> {
        let _writer = self.lock_writer();
        let assigned = self.storage.transact(|tx| {
            let caller = tx.role(sender)?;
            self.guard(sender, caller)?;
            let assigned = evaluate_by(tx.role(operator)?, caller, requested);
            tx.set_role(operator, assigned)?;
            Ok(assigned)
        })?;
        debug!(by = %sender, operator = %operator, assigned = %assigned, "role update committed");
        self.emit(&RoleUpdated { by: sender, operator, requested, assigned });
        Ok(assigned)
    }

    /// Update the global features under the same rule as [`update_role`](Self::update_role).
    pub fn update_features(&self, sender: OperatorId, requested: Mask) -> Result<Mask> {
        let _writer = self.lock_writer();
        let assigned = self.storage.transact(|tx| {
            let caller = tx.role(sender)?;
            self.guard(sender, caller)?;
            let assigned = evaluate_by(tx.features()?, caller, requested);
            tx.set_features(assigned)?;
            Ok(assigned)
        })?;
        debug!(by = %sender, assigned = %assigned, "features update committed");
        self.emit(&RoleUpdated { by: sender, operator: self.instance, requested, assigned });
        Ok(assigned)
    }

    #[inline]
    pub(crate) fn has_role(&self, actual: Mask, required: Mask) -> bool {
        actual.contains(required)
            || (self.bypass == BypassPolicy::AccessManager && actual.contains(ROLE_ACCESS_MANAGER))
    }

    fn guard(&self, sender: OperatorId, caller: Mask) -> Result<()> {
        let r = require_access_condition(self.has_role(caller, ROLE_ACCESS_MANAGER));
        if r.is_err() {
            warn!(sender = %sender, "update rejected: sender is not an access manager");
        }
        r
    }
}
