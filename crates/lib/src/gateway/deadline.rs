//! Per-call deadlines for remote authority calls.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::warn;

use super::{
    GatewayError, NewUserProfile, ProfileUpdate, RemoteAuthority, ThemePreferences, UserProfile,
};
use crate::identity::Identity;

/// Bounds every call of the wrapped authority by `timeout`.
///
/// An expired call is dropped and reported as [`GatewayError::Timeout`].
#[derive(Clone)]
pub struct Deadline {
    inner: Arc<dyn RemoteAuthority>,
    timeout: Duration,
}

impl Deadline {
    pub fn new(inner: Arc<dyn RemoteAuthority>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run<T>(
        &self,
        method: &'static str,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(method, timeout = ?self.timeout, "remote authority call timed out");
                Err(GatewayError::Timeout {
                    after: self.timeout,
                })
            }
        }
    }
}

#[async_trait]
impl RemoteAuthority for Deadline {
    async fn create_user(
        &self,
        caller: &Identity,
        profile: NewUserProfile,
    ) -> Result<UserProfile, GatewayError> {
        self.run("create_user", self.inner.create_user(caller, profile))
            .await
    }

    async fn get_current_user(
        &self,
        caller: &Identity,
    ) -> Result<Option<UserProfile>, GatewayError> {
        self.run("get_current_user", self.inner.get_current_user(caller))
            .await
    }

    async fn update_profile(
        &self,
        caller: &Identity,
        update: ProfileUpdate,
    ) -> Result<UserProfile, GatewayError> {
        self.run("update_profile", self.inner.update_profile(caller, update))
            .await
    }

    async fn update_username(
        &self,
        caller: &Identity,
        username: &str,
    ) -> Result<(), GatewayError> {
        self.run(
            "update_username",
            self.inner.update_username(caller, username),
        )
        .await
    }

    async fn update_theme_preferences(
        &self,
        caller: &Identity,
        preferences: ThemePreferences,
    ) -> Result<(), GatewayError> {
        self.run(
            "update_theme_preferences",
            self.inner.update_theme_preferences(caller, preferences),
        )
        .await
    }

    async fn is_username_available(
        &self,
        caller: &Identity,
        username: &str,
    ) -> Result<bool, GatewayError> {
        self.run(
            "is_username_available",
            self.inner.is_username_available(caller, username),
        )
        .await
    }
}
