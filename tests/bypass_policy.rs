//! Role check semantics under each bypass policy

use rolebits::*;
use tempfile::TempDir;

const OWNER: OperatorId = OperatorId(1);
const MANAGER: OperatorId = OperatorId(2);
const READER: OperatorId = OperatorId(3);

const READ: Mask = Mask::bit(0);
const WRITE: Mask = Mask::bit(1);

fn setup(policy: BypassPolicy) -> (TempDir, AccessControl) {
    let dir = TempDir::new().unwrap();
    let ac = AccessControl::new(Storage::open_with(dir.path(), 1 << 24).unwrap())
        .with_bypass(policy)
        .construct(OWNER, OWNER, Mask::ZERO)
        .unwrap();
    ac.update_role(OWNER, MANAGER, ROLE_ACCESS_MANAGER).unwrap();
    ac.update_role(OWNER, READER, READ).unwrap();
    (dir, ac)
}

#[test]
fn default_policy_is_access_manager() {
    assert_eq!(BypassPolicy::default(), BypassPolicy::AccessManager);
}

#[test]
fn access_manager_passes_every_role_check() {
    let (_dir, ac) = setup(BypassPolicy::AccessManager);
    assert!(ac.is_operator_in_role(MANAGER, READ | WRITE).unwrap());
    assert!(ac.is_sender_in_role(MANAGER, Mask::MAX).unwrap());
    ac.require_sender_in_role(MANAGER, WRITE).unwrap();
}

#[test]
fn literal_policy_requires_every_bit() {
    let (_dir, ac) = setup(BypassPolicy::Literal);
    assert!(!ac.is_operator_in_role(MANAGER, READ).unwrap());
    assert!(ac.is_operator_in_role(MANAGER, ROLE_ACCESS_MANAGER).unwrap());
    assert!(matches!(ac.require_sender_in_role(MANAGER, WRITE), Err(Error::AccessDenied)));
    // the manager still manages
    ac.update_role(MANAGER, READER, Mask::ZERO).unwrap();
}

/// Ordinary operators are checked literally under both policies
#[test]
fn plain_roles_are_literal() {
    for policy in [BypassPolicy::AccessManager, BypassPolicy::Literal] {
        let (_dir, ac) = setup(policy);
        assert!(ac.is_operator_in_role(READER, READ).unwrap());
        assert!(!ac.is_operator_in_role(READER, READ | WRITE).unwrap());
        assert!(ac.is_operator_in_role(READER, Mask::ZERO).unwrap());
        assert!(!ac.is_operator_in_role(OperatorId(99), READ).unwrap());
    }
}

/// Feature checks never bypass, whoever asks
#[test]
fn features_are_always_literal() {
    let (_dir, ac) = setup(BypassPolicy::AccessManager);
    ac.update_features(OWNER, READ).unwrap();
    assert!(ac.is_feature_enabled(READ).unwrap());
    assert!(!ac.is_feature_enabled(READ | WRITE).unwrap());
    assert!(!ac.is_feature_enabled(ROLE_ACCESS_MANAGER).unwrap());
    assert!(ac.is_feature_enabled(Mask::ZERO).unwrap());
}
