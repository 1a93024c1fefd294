//! Upgrade indirection
//!
//! A `Proxy` forwards every call to the current implementation of the
//! kernel. Upgrading only records a new implementation version; the role
//! and feature databases are shared by all versions and carry over as is.

use std::ops::Deref;

use tracing::info;

use crate::constants::ROLE_UPGRADE_MANAGER;
use crate::error::{Error, Result};
use crate::init::seed_in;
use crate::mask::Mask;
use crate::operator::OperatorId;
use crate::read;
use crate::store::{require_access_condition, AccessControl};

pub struct Proxy {
    inner: AccessControl,
}

impl Proxy {
    /// Place `target` behind a proxy pointing at `implementation` and run
    /// its one-shot initializer in the same transaction.
    pub fn deploy(
        target: AccessControl,
        implementation: u64,
        deployer: OperatorId,
        owner: OperatorId,
        features: Mask,
    ) -> Result<Self> {
        let instance = target.instance();
        {
            let _writer = target.lock_writer();
            let events = target.storage().transact(|tx| {
                let events = seed_in(tx, instance, deployer, owner, features)?;
                tx.set_implementation(implementation)?;
                Ok(events)
            })?;
            info!(implementation, deployer = %deployer, owner = %owner, "proxy deployed");
            for e in &events {
                target.emit(e);
            }
        }
        Ok(Proxy { inner: target })
    }

    /// Re-attach to storage a proxy was previously deployed on.
    pub fn attach(target: AccessControl) -> Result<Self> {
        let deployed = target.storage().read(|d, tx| {
            Ok(read::implementation(d, tx)?.is_some() && read::initialized(d, tx)?.is_some())
        })?;
        if !deployed {
            return Err(Error::NotInitialized);
        }
        Ok(Proxy { inner: target })
    }

    /// Current implementation version.
    pub fn implementation(&self) -> Result<u64> {
        self.inner
            .storage()
            .read(|d, tx| read::implementation(d, tx))?
            .ok_or(Error::NotInitialized)
    }

    /// Point the proxy at `implementation`. Requires `ROLE_UPGRADE_MANAGER`.
    pub fn upgrade_to(&self, sender: OperatorId, implementation: u64) -> Result<()> {
        let _writer = self.inner.lock_writer();
        let previous = self.inner.storage().transact(|tx| {
            let caller = tx.role(sender)?;
            require_access_condition(self.inner.has_role(caller, ROLE_UPGRADE_MANAGER))?;
            let previous = tx.implementation()?;
            tx.set_implementation(implementation)?;
            Ok(previous)
        })?;
        info!(by = %sender, from = ?previous, to = implementation, "implementation upgraded");
        Ok(())
    }

    pub fn into_inner(self) -> AccessControl {
        self.inner
    }
}

impl Deref for Proxy {
    type Target = AccessControl;

    fn deref(&self) -> &AccessControl {
        &self.inner
    }
}
