use tessera::{SessionState, gateway::ProfileUpdate};

use crate::helpers::{TestSession, transport_error};

#[tokio::test]
async fn test_profile_update_merges_and_persists() {
    let mut test = TestSession::registered().await;
    let before = test.session.current_user().unwrap().clone();

    let updated = test
        .session
        .update_profile(
            ProfileUpdate::default()
                .with_name("Ada Lovelace")
                .with_bio(Some("analyst".to_string()))
                .with_email(None),
        )
        .await
        .unwrap();

    assert_eq!(updated.id, before.id);
    assert_eq!(updated.username, before.username);
    assert_eq!(updated.name, "Ada Lovelace");
    assert_eq!(updated.bio.as_deref(), Some("analyst"));
    assert_eq!(test.session.current_user(), Some(&updated));

    let stored = test.stored().await.unwrap();
    assert_eq!(stored.user.as_ref(), Some(&updated));
}

#[tokio::test]
async fn test_username_update_merges_and_persists() {
    let mut test = TestSession::registered().await;
    let principal = test.session.principal().unwrap();

    test.session.update_username("ada").await.unwrap();

    assert_eq!(test.session.current_user().unwrap().username, "ada");
    assert_eq!(
        test.stored().await.unwrap().user.as_ref().unwrap().username,
        "ada"
    );
    assert_eq!(
        test.authority.registry().user(&principal).unwrap().username,
        "ada"
    );
}

#[tokio::test]
async fn test_update_failure_keeps_session() {
    let mut test = TestSession::registered().await;
    let before = test.session.current_user().unwrap().clone();
    test.authority.fail_updates_with(transport_error());

    let err = test.session.update_username("ada").await.unwrap_err();
    assert!(err.is_transport_error());
    let err = test
        .session
        .update_profile(ProfileUpdate::default().with_name("Ada"))
        .await
        .unwrap_err();
    assert!(err.is_transport_error());

    assert_eq!(test.session.state(), SessionState::Registered);
    assert_eq!(test.session.current_user(), Some(&before));
    assert!(test.session.last_error().is_some());
    assert_eq!(test.stored().await.unwrap().user.as_ref(), Some(&before));
}

#[tokio::test]
async fn test_update_requires_identity() {
    let mut test = TestSession::empty();

    let err = test.session.update_username("ada").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(
        test.authority
            .calls()
            .update_username
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_oversized_username_never_reaches_authority() {
    let mut test = TestSession::registered().await;

    let err = test.session.update_username("thirteenchars").await.unwrap_err();

    assert!(err.is_invalid_input());
    assert_eq!(
        test.authority
            .calls()
            .update_username
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn test_success_clears_previous_error() {
    let mut test = TestSession::registered().await;
    test.session.update_username("").await.unwrap_err();
    assert!(test.session.last_error().is_some());

    test.session.update_username("ada").await.unwrap();
    assert!(test.session.last_error().is_none());
}

#[tokio::test]
async fn test_username_availability() {
    let test = TestSession::registered().await;
    let taken = test.session.current_user().unwrap().username.clone();

    assert!(!test.session.is_username_available(&taken).await.unwrap());
    assert!(test.session.is_username_available("free").await.unwrap());
}
