//! Intersection-limited bitmask update

use crate::constants::FULL_PRIVILEGES_MASK;
use crate::mask::Mask;

/// Compute the value a caller holding `caller` may assign when asking for
/// `requested` over `current`.
///
/// Bits the caller holds follow `requested`; bits it does not hold keep
/// their `current` value. A full-privileges caller gets `requested` as is.
/// Used for both operator roles and the global feature set.
#[inline]
pub fn evaluate_by(current: Mask, caller: Mask, requested: Mask) -> Mask {
    if caller == FULL_PRIVILEGES_MASK {
        return requested;
    }
    (requested & caller) | (current & !caller)
}
