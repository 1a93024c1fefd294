//! One-shot initialization

use tracing::info;

use crate::constants::{FULL_PRIVILEGES_MASK, INITIALIZER_VERSION};
use crate::error::{Error, Result};
use crate::event::RoleUpdated;
use crate::mask::Mask;
use crate::operator::OperatorId;
use crate::store::AccessControl;
use crate::tx::Tx;

/// Initialization state. `Initialized` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initialized { version: u64 },
}

impl InitState {
    pub fn is_initialized(&self) -> bool {
        matches!(self, InitState::Initialized { .. })
    }
}

impl From<Option<u64>> for InitState {
    fn from(v: Option<u64>) -> Self {
        match v {
            Some(version) => InitState::Initialized { version },
            None => InitState::Uninitialized,
        }
    }
}

/// Seed owner and features and mark the storage initialized, inside `tx`.
/// Returns the events to emit once `tx` commits.
pub(crate) fn seed_in(
    tx: &mut Tx,
    instance: OperatorId,
    deployer: OperatorId,
    owner: OperatorId,
    features: Mask,
) -> Result<Vec<RoleUpdated>> {
    if tx.initialized()?.is_some() {
        return Err(Error::AlreadyInitialized);
    }
    let mut events = Vec::with_capacity(2);
    if !owner.is_null() {
        tx.set_role(owner, FULL_PRIVILEGES_MASK)?;
        events.push(RoleUpdated {
            by: deployer,
            operator: owner,
            requested: FULL_PRIVILEGES_MASK,
            assigned: FULL_PRIVILEGES_MASK,
        });
    }
    tx.set_features(features)?;
    events.push(RoleUpdated { by: deployer, operator: instance, requested: features, assigned: features });
    tx.set_initialized(INITIALIZER_VERSION)?;
    Ok(events)
}

impl AccessControl {
    /// Direct instantiation: seed `owner` with full privileges (unless
    /// null) and set `features`, then return the initialized instance.
    pub fn construct(self, deployer: OperatorId, owner: OperatorId, features: Mask) -> Result<Self> {
        self.post_construct(deployer, owner, features)?;
        Ok(self)
    }

    /// One-shot initializer for an instance placed behind the proxy.
    /// A second call fails with `AlreadyInitialized` and changes nothing.
    pub fn post_construct(&self, deployer: OperatorId, owner: OperatorId, features: Mask) -> Result<()> {
        let instance = self.instance();
        let _writer = self.lock_writer();
        let events = self
            .storage()
            .transact(|tx| seed_in(tx, instance, deployer, owner, features))?;
        info!(deployer = %deployer, owner = %owner, features = %features, "access control initialized");
        for e in &events {
            self.emit(e);
        }
        Ok(())
    }
}
