//! rolebits - upgrade-safe role-based access control kernel
//!
//! Each operator holds a 256-bit role mask and the instance holds one
//! global 256-bit feature mask. The highest role bit, `ROLE_ACCESS_MANAGER`,
//! authorizes changing roles and features, and a caller can only ever flip
//! bits it holds itself.
//!
//! ```no_run
//! use rolebits::*;
//!
//! # fn main() -> rolebits::Result<()> {
//! let (deployer, owner, alice) = (OperatorId(10), OperatorId(11), OperatorId(12));
//! let ac = AccessControl::new(Storage::open("./data/acl")?)
//!     .construct(deployer, owner, Mask::ZERO)?;
//!
//! // owner holds every bit, so alice gets exactly what was asked for
//! ac.update_role(owner, alice, ROLE_ACCESS_MANAGER | Mask::from_u64(0b101))?;
//!
//! // alice can only toggle bits 0 and 2 (and the manager bit) on others
//! let assigned = ac.update_role(alice, OperatorId(13), Mask::from_u64(0b111))?;
//! assert_eq!(assigned, Mask::from_u64(0b101));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod event;
pub mod init;
pub mod mask;
pub mod operator;
pub mod proxy;
pub mod store;
pub mod update;

mod read;
mod tx;

pub use config::Config;
pub use constants::{
    caps_to_names, names_to_caps, DEFAULT_INSTANCE_ID, FULL_PRIVILEGES_MASK, ROLE_ACCESS_MANAGER,
    ROLE_UPGRADE_MANAGER,
};
pub use db::Storage;
pub use error::{Error, Result};
pub use event::{EventLog, EventSink, RoleUpdated, TracingSink};
pub use init::InitState;
pub use mask::Mask;
pub use operator::OperatorId;
pub use proxy::Proxy;
pub use store::{require_access_condition, AccessControl, BypassPolicy};
pub use update::evaluate_by;
