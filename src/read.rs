//! Table reads (no permission checks)

use heed::RoTxn;

use crate::db::{Dbs, FEATURES_KEY, IMPLEMENTATION_KEY, INITIALIZED_KEY};
use crate::error::Result;
use crate::mask::Mask;
use crate::operator::OperatorId;

/// Role mask of an operator, zero if never assigned
#[inline]
pub(crate) fn role(d: &Dbs, tx: &RoTxn, operator: OperatorId) -> Result<Mask> {
    Ok(d.roles.get(tx, &operator.0)?.unwrap_or(Mask::ZERO))
}

#[inline]
pub(crate) fn features(d: &Dbs, tx: &RoTxn) -> Result<Mask> {
    Ok(d.features.get(tx, FEATURES_KEY)?.unwrap_or(Mask::ZERO))
}

/// Initializer version, `None` while uninitialized
pub(crate) fn initialized(d: &Dbs, tx: &RoTxn) -> Result<Option<u64>> {
    Ok(d.meta.get(tx, INITIALIZED_KEY)?)
}

/// Implementation version recorded by the proxy
pub(crate) fn implementation(d: &Dbs, tx: &RoTxn) -> Result<Option<u64>> {
    Ok(d.meta.get(tx, IMPLEMENTATION_KEY)?)
}

/// All operators holding a non-zero role
pub(crate) fn list_roles(d: &Dbs, tx: &RoTxn) -> Result<Vec<(OperatorId, Mask)>> {
    let mut r = Vec::new();
    for item in d.roles.iter(tx)? {
        let (k, v) = item?;
        r.push((OperatorId(k), v));
    }
    Ok(r)
}
