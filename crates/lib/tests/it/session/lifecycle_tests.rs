use tessera::{SessionConfig, SessionState};

use crate::helpers::{PHRASE, TestSession, username_taken};

#[tokio::test]
async fn test_startup_provisions_guest_by_default() {
    let mut test = TestSession::with_config(SessionConfig::default());

    test.session.initialize().await.unwrap();

    assert_eq!(test.session.state(), SessionState::Registered);
    assert_eq!(test.authority.create_calls(), 1);
    assert_eq!(test.authority.registry().user_count(), 1);
    assert!(test.stored().await.unwrap().registered);
}

#[tokio::test]
async fn test_guest_persisted_before_registration() {
    let mut test = TestSession::empty();
    test.authority.fail_create_with(username_taken());

    test.session.create_guest_account(None).await.unwrap_err();

    let stored = test.stored().await.unwrap();
    assert!(stored.authenticated);
    assert!(!stored.registered);
    assert!(stored.user.is_none());
    assert_eq!(
        stored.secret_phrase,
        *test.session.secret_phrase().unwrap().expose()
    );
}

#[tokio::test]
async fn test_restart_verifies_restored_identity() {
    let first = TestSession::registered().await;
    let principal = first.session.principal().unwrap();
    let user_id = first.session.current_user().unwrap().id.clone();
    let calls_before = first.authority.current_user_calls();

    let mut second = first.restart();
    second.session.initialize().await.unwrap();

    assert_eq!(second.session.principal(), Some(principal));
    assert_eq!(second.session.current_user().unwrap().id, user_id);
    assert_eq!(second.authority.current_user_calls(), calls_before + 1);
    assert_eq!(second.authority.create_calls(), 1);
}

#[tokio::test]
async fn test_recovery_round_trip() {
    let original = TestSession::registered().await;
    let phrase = original.session.secret_phrase().unwrap().expose();

    // a different machine: same authority, empty local storage
    let mut other = TestSession::sharing(
        original.authority.clone(),
        std::sync::Arc::new(tessera::storage::InMemoryStore::new()),
        original.session.config().clone(),
    );
    other.session.recover_account(&phrase).await.unwrap();

    assert_eq!(other.session.principal(), original.session.principal());
    assert_eq!(other.session.current_user(), original.session.current_user());
    assert_eq!(other.session.state(), SessionState::Registered);
    assert_eq!(original.authority.registry().user_count(), 1);
    assert!(other.stored().await.unwrap().registered);
}

#[tokio::test]
async fn test_recover_unknown_phrase_registers_it() {
    let mut test = TestSession::empty();

    test.session.recover_account(PHRASE).await.unwrap();

    assert!(test.session.is_registered());
    assert_eq!(test.authority.create_calls(), 1);
    let expected = tessera::identity::derive(&tessera::SecretPhrase::parse(PHRASE).unwrap());
    assert_eq!(test.session.principal().as_ref(), Some(expected.principal()));
}

#[tokio::test]
async fn test_recover_replaces_current_identity() {
    let mut test = TestSession::registered().await;
    let guest = test.session.principal().unwrap();

    test.session.recover_account(PHRASE).await.unwrap();

    assert_ne!(test.session.principal(), Some(guest));
    assert_eq!(test.authority.registry().user_count(), 2);
}

#[tokio::test]
async fn test_logout_wipes_and_is_idempotent() {
    let mut test = TestSession::registered().await;
    let status = test.session.subscribe();

    test.session.logout().await.unwrap();

    assert_eq!(test.session.state(), SessionState::Unauthenticated);
    assert!(test.session.identity().is_none());
    assert!(test.session.current_user().is_none());
    assert!(test.store.is_empty().await);
    assert!(!status.borrow().is_authenticated());

    test.session.logout().await.unwrap();
    assert_eq!(test.session.state(), SessionState::Unauthenticated);
    assert!(test.store.is_empty().await);
}

#[tokio::test]
async fn test_logout_after_failure_clears_error() {
    let mut test = TestSession::empty();
    test.session.verify().await.unwrap_err();
    assert!(matches!(test.session.state(), SessionState::Failed(_)));

    test.session.logout().await.unwrap();
    assert_eq!(test.session.state(), SessionState::Unauthenticated);
    assert!(test.session.last_error().is_none());
}

#[tokio::test]
async fn test_status_channel_follows_transitions() {
    let mut test = TestSession::empty();
    let mut status = test.session.subscribe();

    test.session.create_guest_account(None).await.unwrap();

    assert!(status.has_changed().unwrap());
    let current = status.borrow_and_update().clone();
    assert_eq!(current.state, SessionState::Registered);
    assert_eq!(
        current.identity.map(|identity| *identity.principal()),
        test.session.principal()
    );
}
