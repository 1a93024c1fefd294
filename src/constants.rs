//! Reserved permission bits and instance defaults

use crate::mask::Mask;
use crate::operator::OperatorId;

/// Authorizes `update_role` and `update_features`. Highest bit.
pub const ROLE_ACCESS_MANAGER: Mask = Mask::bit(255);

/// Authorizes `Proxy::upgrade_to`.
pub const ROLE_UPGRADE_MANAGER: Mask = Mask::bit(254);

/// Every bit set; a holder's updates are never narrowed.
pub const FULL_PRIVILEGES_MASK: Mask = Mask::MAX;

/// Identifier recorded as `operator` on feature change events
/// unless the instance is given its own.
pub const DEFAULT_INSTANCE_ID: OperatorId = OperatorId(1);

/// Version written to storage by the one-shot initializer.
pub const INITIALIZER_VERSION: u64 = 1;

/// Default LMDB map size (1 GiB)
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

// Reserved bit name mappings
const NAMED: &[(&str, Mask)] = &[
    ("access_manager", ROLE_ACCESS_MANAGER),
    ("upgrade_manager", ROLE_UPGRADE_MANAGER),
];

/// Names of the reserved bits present in `mask`; `["full"]` for full privileges
pub fn caps_to_names(mask: Mask) -> Vec<&'static str> {
    if mask == FULL_PRIVILEGES_MASK {
        return vec!["full"];
    }
    NAMED.iter()
        .filter(|(_, b)| mask.contains(*b))
        .map(|(n, _)| *n)
        .collect()
}

/// Mask for a list of reserved bit names; unknown names are ignored
pub fn names_to_caps(names: &[&str]) -> Mask {
    names
        .iter()
        .filter_map(|n| match *n {
            "full" => Some(FULL_PRIVILEGES_MASK),
            _ => NAMED.iter().find(|(k, _)| k == n).map(|(_, v)| *v),
        })
        .fold(Mask::ZERO, |a, b| a | b)
}
