use tessera::{
    SessionState,
    session::{MAX_RECONCILE_STEPS, SessionError},
};

use crate::helpers::{TestSession, already_exists};

#[tokio::test]
async fn test_already_exists_falls_back_to_verify() {
    let mut test = TestSession::empty();
    // the registration lands but the reply says AlreadyExists, as after a retried request
    test.authority.create_then_report(already_exists());

    test.session.create_guest_account(None).await.unwrap();

    assert_eq!(test.session.state(), SessionState::Registered);
    assert_eq!(test.authority.registry().user_count(), 1);
    assert_eq!(test.authority.create_calls(), 1);
    assert_eq!(test.authority.current_user_calls(), 1);
    assert!(test.stored().await.unwrap().registered);
}

#[tokio::test]
async fn test_verify_registers_unknown_identity() {
    let mut test = TestSession::registered().await;
    let principal = test.session.principal().unwrap();
    assert!(test.authority.registry().remove_user(&principal));

    test.session.verify().await.unwrap();

    // same identity, registered again with a fresh default profile
    assert_eq!(test.session.principal(), Some(principal));
    assert!(test.session.is_registered());
    assert_eq!(test.authority.create_calls(), 2);
    let user = test.session.current_user().unwrap();
    assert!(user.username.starts_with("Guest"));
    assert!(user.name.starts_with("User_"));
    assert_eq!(test.authority.registry().user(&principal).as_ref(), Some(user));
}

#[tokio::test]
async fn test_restart_after_remote_loss_self_heals() {
    let first = TestSession::registered().await;
    let principal = first.session.principal().unwrap();
    first.authority.registry().remove_user(&principal);

    let mut second = first.restart();
    second.session.initialize().await.unwrap();

    assert_eq!(second.session.principal(), Some(principal));
    assert!(second.session.is_registered());
    assert_eq!(second.authority.registry().user_count(), 1);
}

#[tokio::test]
async fn test_reconcile_is_bounded() {
    let mut test = TestSession::empty();
    test.authority.fail_create_with(already_exists());
    test.authority.miss_current_user(usize::MAX);

    let err = test.session.create_guest_account(None).await.unwrap_err();

    assert!(matches!(
        err,
        tessera::Error::Session(SessionError::ReconcileLoop { .. })
    ));
    assert_eq!(
        test.authority.create_calls() + test.authority.current_user_calls(),
        MAX_RECONCILE_STEPS
    );
    assert!(test.session.identity().is_none());
    assert!(test.store.is_empty().await);
    assert!(matches!(test.session.state(), SessionState::Failed(_)));
}

#[tokio::test]
async fn test_single_miss_then_already_exists_converges() {
    let mut test = TestSession::registered().await;
    // the authority briefly answers "unknown" for a registered identity
    test.authority.miss_current_user(1);

    test.session.verify().await.unwrap();

    assert!(test.session.is_registered());
    assert_eq!(test.authority.registry().user_count(), 1);
    // verify -> register (AlreadyExists) -> verify
    assert_eq!(test.authority.create_calls(), 2);
}
