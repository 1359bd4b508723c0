use std::time::Duration;

use tessera::{
    SessionConfig, SessionState,
    gateway::{AuthorityError, GatewayError},
};

use crate::helpers::{PHRASE, TestSession, transport_error, username_taken};

#[tokio::test]
async fn test_unverifiable_session_is_reset() {
    let first = TestSession::registered().await;
    first.authority.fail_current_user_always(transport_error());

    let mut second = first.restart();
    let err = second.session.initialize().await.unwrap_err();

    assert!(err.is_transport_error());
    assert!(second.session.identity().is_none());
    assert!(second.session.current_user().is_none());
    assert!(!second.session.is_registered());
    assert!(second.store.is_empty().await);
    match second.session.state() {
        SessionState::Failed(reason) => assert!(reason.contains("connection refused")),
        other => panic!("unexpected state {other:?}"),
    }
}

#[tokio::test]
async fn test_verify_rejected_by_authority_is_reset() {
    let mut test = TestSession::registered().await;
    test.authority
        .fail_current_user_always(GatewayError::Authority(AuthorityError::Unauthorized));

    let err = test.session.verify().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!test.session.is_authenticated());
    assert!(test.store.is_empty().await);
}

#[tokio::test]
async fn test_transport_failure_during_guest_creation_resets() {
    let mut test = TestSession::empty();
    test.authority.fail_create_with(transport_error());

    let err = test.session.create_guest_account(None).await.unwrap_err();

    assert!(err.is_transport_error());
    assert!(test.session.identity().is_none());
    assert!(test.store.is_empty().await);
    assert!(matches!(test.session.state(), SessionState::Failed(_)));
}

#[tokio::test]
async fn test_authority_refusal_keeps_guest_identity() {
    let mut test = TestSession::empty();
    test.authority.fail_create_with(username_taken());

    let err = test.session.create_guest_account(None).await.unwrap_err();

    assert!(err.is_invalid_input());
    assert_eq!(test.session.state(), SessionState::Guest);
    assert!(test.session.identity().is_some());
    assert!(test.session.last_error().unwrap().contains("taken"));

    // the identity survives, so a retry registers it
    let principal = test.session.principal();
    test.authority.heal();
    test.session.verify().await.unwrap();
    assert_eq!(test.session.principal(), principal);
    assert_eq!(test.session.state(), SessionState::Registered);
    assert!(test.session.last_error().is_none());
}

#[tokio::test]
async fn test_failed_startup_provisioning_resets() {
    let mut test = TestSession::with_config(SessionConfig::default());
    test.authority.fail_create_with(username_taken());

    // startup is all-or-nothing even for authority refusals
    test.session.initialize().await.unwrap_err();

    assert!(test.session.identity().is_none());
    assert!(test.store.is_empty().await);
}

#[tokio::test]
async fn test_invalid_recovery_phrase_keeps_session() {
    let mut test = TestSession::registered().await;
    let principal = test.session.principal();
    let calls = test.authority.current_user_calls();

    let err = test
        .session
        .recover_account("legal winner thank year")
        .await
        .unwrap_err();

    assert!(err.is_invalid_input());
    assert_eq!(test.session.principal(), principal);
    assert!(test.session.is_registered());
    assert_eq!(test.authority.current_user_calls(), calls);
    assert!(test.session.last_error().is_some());
    assert!(test.stored().await.unwrap().registered);
}

#[tokio::test]
async fn test_recovery_transport_failure_resets() {
    let mut test = TestSession::empty();
    test.authority.fail_current_user_always(transport_error());

    test.session.recover_account(PHRASE).await.unwrap_err();

    assert!(!test.session.is_authenticated());
    assert!(test.store.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_gateway_deadline_expires() {
    let first = TestSession::registered().await;
    first.authority.stall_for(Duration::from_secs(30));

    let mut second = TestSession::sharing(
        first.authority.clone(),
        first.store.clone(),
        SessionConfig::default().with_gateway_timeout(Duration::from_secs(2)),
    );
    let err = second.session.initialize().await.unwrap_err();

    assert!(err.is_timeout());
    assert!(err.is_transport_error());
    assert!(second.session.identity().is_none());
    assert!(second.store.is_empty().await);
}
