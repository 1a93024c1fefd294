//! Write transaction wrapper

use heed::RwTxn;

use crate::db::{Dbs, FEATURES_KEY, IMPLEMENTATION_KEY, INITIALIZED_KEY};
use crate::error::Result;
use crate::mask::Mask;
use crate::operator::OperatorId;
use crate::read;

/// One LMDB write transaction. LMDB admits a single writer per
/// environment, so everything done through a `Tx` is atomic with respect
/// to every other mutation of the same instance.
pub struct Tx<'e> {
    txn: RwTxn<'e>,
    dbs: &'e Dbs,
}

impl<'e> Tx<'e> {
    #[inline]
    pub(crate) fn new(txn: RwTxn<'e>, dbs: &'e Dbs) -> Self {
        Tx { txn, dbs }
    }

    #[inline]
    pub(crate) fn commit(self) -> Result<()> {
        Ok(self.txn.commit()?)
    }

    #[inline]
    pub fn role(&self, operator: OperatorId) -> Result<Mask> {
        read::role(self.dbs, &self.txn, operator)
    }

    /// Store a role mask. Zero removes the entry; reads of absent entries are zero.
    pub fn set_role(&mut self, operator: OperatorId, mask: Mask) -> Result<()> {
        if mask.is_zero() {
            self.dbs.roles.delete(&mut self.txn, &operator.0)?;
        } else {
            self.dbs.roles.put(&mut self.txn, &operator.0, &mask)?;
        }
        Ok(())
    }

    #[inline]
    pub fn features(&self) -> Result<Mask> {
        read::features(self.dbs, &self.txn)
    }

    pub fn set_features(&mut self, mask: Mask) -> Result<()> {
        Ok(self.dbs.features.put(&mut self.txn, FEATURES_KEY, &mask)?)
    }

    pub fn initialized(&self) -> Result<Option<u64>> {
        read::initialized(self.dbs, &self.txn)
    }

    pub(crate) fn set_initialized(&mut self, version: u64) -> Result<()> {
        Ok(self.dbs.meta.put(&mut self.txn, INITIALIZED_KEY, &version)?)
    }

    pub fn implementation(&self) -> Result<Option<u64>> {
        read::implementation(self.dbs, &self.txn)
    }

    pub(crate) fn set_implementation(&mut self, version: u64) -> Result<()> {
        Ok(self.dbs.meta.put(&mut self.txn, IMPLEMENTATION_KEY, &version)?)
    }

    pub(crate) fn clear(&mut self) -> Result<()> {
        self.dbs.roles.clear(&mut self.txn)?;
        self.dbs.features.clear(&mut self.txn)?;
        Ok(self.dbs.meta.clear(&mut self.txn)?)
    }
}
