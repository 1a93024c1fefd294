//! One-shot initialization tests
//!
//! Covers the Uninitialized -> Initialized transition for direct
//! construction and for post-construct behind a proxy, and persistence of
//! the seeded state across reopening the storage.

use std::sync::Arc;

use rolebits::*;
use tempfile::TempDir;

const DEPLOYER: OperatorId = OperatorId(7);
const OWNER: OperatorId = OperatorId(8);
const OTHER: OperatorId = OperatorId(9);

fn fresh() -> (TempDir, AccessControl, Arc<EventLog>) {
    let dir = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let ac = AccessControl::new(Storage::open_with(dir.path(), 1 << 24).unwrap()).with_sink(log.clone());
    (dir, ac, log)
}

// ============================================================================
// Uninitialized state
// ============================================================================

/// Nothing is readable or writable before initialization
#[test]
fn uninitialized_instance_is_inert() {
    let (_dir, ac, log) = fresh();
    assert_eq!(ac.state().unwrap(), InitState::Uninitialized);
    assert_eq!(ac.get_role(OWNER).unwrap(), Mask::ZERO);
    assert_eq!(ac.features().unwrap(), Mask::ZERO);
    assert!(matches!(ac.update_role(OWNER, OTHER, Mask::MAX), Err(Error::AccessDenied)));
    assert!(matches!(ac.update_features(OWNER, Mask::MAX), Err(Error::AccessDenied)));
    assert!(log.events().is_empty());
}

// ============================================================================
// postConstruct
// ============================================================================

#[test]
fn post_construct_seeds_owner_and_features() {
    let (_dir, ac, log) = fresh();
    ac.post_construct(DEPLOYER, OWNER, Mask::from_u64(0b11)).unwrap();

    assert_eq!(ac.state().unwrap(), InitState::Initialized { version: 1 });
    assert_eq!(ac.get_role(OWNER).unwrap(), FULL_PRIVILEGES_MASK);
    assert_eq!(ac.get_role(DEPLOYER).unwrap(), Mask::ZERO);
    assert_eq!(ac.features().unwrap(), Mask::from_u64(0b11));
    assert_eq!(log.take(), vec![
        RoleUpdated { by: DEPLOYER, operator: OWNER, requested: FULL_PRIVILEGES_MASK, assigned: FULL_PRIVILEGES_MASK },
        RoleUpdated { by: DEPLOYER, operator: DEFAULT_INSTANCE_ID, requested: Mask::from_u64(0b11), assigned: Mask::from_u64(0b11) },
    ]);
}

/// Second call fails and the first call's seed persists unchanged
#[test]
fn post_construct_twice_fails() {
    let (_dir, ac, log) = fresh();
    ac.post_construct(DEPLOYER, OWNER, Mask::from_u64(1)).unwrap();
    log.take();

    let r = ac.post_construct(OTHER, OTHER, Mask::from_u64(0xff));
    assert!(matches!(r, Err(Error::AlreadyInitialized)));

    assert_eq!(ac.get_role(OWNER).unwrap(), FULL_PRIVILEGES_MASK);
    assert_eq!(ac.get_role(OTHER).unwrap(), Mask::ZERO);
    assert_eq!(ac.features().unwrap(), Mask::from_u64(1));
    assert!(log.events().is_empty(), "no event from a rejected initialization");
}

/// Re-initialization stays impossible even after roles change
#[test]
fn post_construct_fails_after_owner_revoked_itself() {
    let (_dir, ac, _log) = fresh();
    ac.post_construct(DEPLOYER, OWNER, Mask::ZERO).unwrap();
    ac.update_role(OWNER, OWNER, Mask::ZERO).unwrap();
    assert!(matches!(ac.post_construct(DEPLOYER, OWNER, Mask::ZERO), Err(Error::AlreadyInitialized)));
    assert_eq!(ac.get_role(OWNER).unwrap(), Mask::ZERO);
}

// ============================================================================
// construct
// ============================================================================

/// owner = 0, features = 0: nothing seeded, no owner event
#[test]
fn construct_with_null_owner() {
    let (_dir, ac, log) = fresh();
    let ac = ac.construct(DEPLOYER, OperatorId::NULL, Mask::ZERO).unwrap();

    assert_eq!(ac.get_role(OperatorId::NULL).unwrap(), Mask::ZERO);
    assert_eq!(ac.features().unwrap(), Mask::ZERO);
    assert!(ac.state().unwrap().is_initialized());
    let events = log.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operator, DEFAULT_INSTANCE_ID);
    assert!(events.iter().all(|e| e.operator != OperatorId::NULL));
}

/// With a null owner nobody can ever manage the instance
#[test]
fn construct_with_null_owner_is_unmanageable() {
    let (_dir, ac, _log) = fresh();
    let ac = ac.construct(DEPLOYER, OperatorId::NULL, Mask::from_u64(4)).unwrap();
    assert!(matches!(ac.update_features(DEPLOYER, Mask::ZERO), Err(Error::AccessDenied)));
    assert!(ac.is_feature_enabled(Mask::from_u64(4)).unwrap());
}

#[test]
fn construct_on_initialized_storage_fails() {
    let dir = TempDir::new().unwrap();
    {
        let ac = AccessControl::new(Storage::open_with(dir.path(), 1 << 24).unwrap());
        ac.construct(DEPLOYER, OWNER, Mask::ZERO).unwrap();
    }
    let ac = AccessControl::new(Storage::open_with(dir.path(), 1 << 24).unwrap());
    assert!(matches!(ac.construct(DEPLOYER, OTHER, Mask::ZERO), Err(Error::AlreadyInitialized)));
}

// ============================================================================
// Persistence
// ============================================================================

/// State written by one instance is read back by the next without migration
#[test]
fn state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let ac = AccessControl::new(Storage::open_with(dir.path(), 1 << 24).unwrap())
            .construct(DEPLOYER, OWNER, Mask::bit(200))
            .unwrap();
        ac.update_role(OWNER, OTHER, ROLE_ACCESS_MANAGER | Mask::from_u64(5)).unwrap();
    }

    let ac = AccessControl::new(Storage::open_with(dir.path(), 1 << 24).unwrap());
    assert_eq!(ac.state().unwrap(), InitState::Initialized { version: 1 });
    assert_eq!(ac.get_role(OWNER).unwrap(), FULL_PRIVILEGES_MASK);
    assert_eq!(ac.get_role(OTHER).unwrap(), ROLE_ACCESS_MANAGER | Mask::from_u64(5));
    assert_eq!(ac.features().unwrap(), Mask::bit(200));
    assert_eq!(ac.list_roles().unwrap(), vec![
        (OWNER, FULL_PRIVILEGES_MASK),
        (OTHER, ROLE_ACCESS_MANAGER | Mask::from_u64(5)),
    ]);
}

#[test]
fn from_config_applies_instance_and_policy() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        db_path: dir.path().join("acl"),
        map_size: 1 << 24,
        instance: OperatorId(0x5e1f),
        bypass: BypassPolicy::Literal,
        ..Config::default()
    };
    let log = Arc::new(EventLog::new());
    let ac = AccessControl::from_config(&config).unwrap().with_sink(log.clone());
    assert_eq!(ac.instance(), OperatorId(0x5e1f));
    assert_eq!(ac.bypass(), BypassPolicy::Literal);
    assert_eq!(ac.storage().path(), config.db_path.as_path());

    ac.post_construct(DEPLOYER, OWNER, Mask::ZERO).unwrap();
    assert_eq!(log.last().unwrap().operator, OperatorId(0x5e1f));
}

#[test]
fn clear_all_returns_to_uninitialized() {
    let (_dir, ac, _log) = fresh();
    ac.post_construct(DEPLOYER, OWNER, Mask::from_u64(3)).unwrap();
    ac.storage().clear_all().unwrap();

    assert_eq!(ac.state().unwrap(), InitState::Uninitialized);
    assert_eq!(ac.get_role(OWNER).unwrap(), Mask::ZERO);
    assert_eq!(ac.features().unwrap(), Mask::ZERO);
    ac.post_construct(DEPLOYER, OWNER, Mask::ZERO).unwrap();
    assert!(matches!(ac.post_construct(DEPLOYER, OWNER, Mask::ZERO), Err(Error::AlreadyInitialized)));
    assert_eq!(Error::AlreadyInitialized.code(), "already_initialized");
}
