//! Signed JSON-over-HTTP adapter for the remote authority.
//!
//! Each call is a `POST {base}/api/v0/{method}` whose body is the JSON array
//! of call arguments. Requests are signed by the caller's identity:
//!
//! | header                 | value                                              |
//! |------------------------|----------------------------------------------------|
//! | `x-tessera-principal`  | textual principal                                  |
//! | `x-tessera-public-key` | base64 of the raw 32-byte Ed25519 key              |
//! | `x-tessera-expiry`     | ingress expiry, nanoseconds since the Unix epoch   |
//! | `x-tessera-signature`  | base64 Ed25519 signature over [`signing_payload`]  |

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use candid::Principal;
use reqwest::{StatusCode, header::CONTENT_TYPE};
use serde_json::{Value, json};
use tracing::{debug, trace};
use url::Url;

use super::{
    AuthorityError, GatewayError, NewUserProfile, ProfileUpdate, RemoteAuthority,
    ThemePreferences, UserProfile,
    wire::{self, WireProfile, WireProfileUpdate, WireResult, WireTheme},
};
use crate::{
    clock::{Clock, SystemClock},
    identity::Identity,
};

pub const PRINCIPAL_HEADER: &str = "x-tessera-principal";
pub const PUBLIC_KEY_HEADER: &str = "x-tessera-public-key";
pub const EXPIRY_HEADER: &str = "x-tessera-expiry";
pub const SIGNATURE_HEADER: &str = "x-tessera-signature";

/// How long a signed request stays valid.
pub const INGRESS_EXPIRY: Duration = Duration::from_secs(5 * 60);

/// The bytes a request signature covers: `method || 0x00 || expiry || 0x00 || body`.
pub fn signing_payload(method: &str, expiry: u64, body: &[u8]) -> Vec<u8> {
    let expiry = expiry.to_string();
    let mut payload = Vec::with_capacity(method.len() + expiry.len() + body.len() + 2);
    payload.extend_from_slice(method.as_bytes());
    payload.push(0);
    payload.extend_from_slice(expiry.as_bytes());
    payload.push(0);
    payload.extend_from_slice(body);
    payload
}

fn transport(method: &str, err: impl std::fmt::Display) -> GatewayError {
    GatewayError::Transport {
        reason: format!("{method}: {err}"),
    }
}

/// Remote authority reached over HTTP.
#[derive(Debug)]
pub struct HttpAuthority {
    client: reqwest::Client,
    base: String,
    clock: Arc<dyn Clock>,
    /// User ids learned from `get_current_user`, keyed by caller.
    user_ids: Mutex<HashMap<Principal, String>>,
}

impl HttpAuthority {
    pub fn new(base: Url) -> Self {
        Self::with_clock(base, Arc::new(SystemClock))
    }

    /// Stamp request expiries from the given clock.
    pub fn with_clock(base: Url, clock: Arc<dyn Clock>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.as_str().trim_end_matches('/').to_string(),
            clock,
            user_ids: Mutex::new(HashMap::new()),
        }
    }

    /// Use a preconfigured client (proxies, TLS roots).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn user_ids(&self) -> MutexGuard<'_, HashMap<Principal, String>> {
        self.user_ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/api/v0/{method}", self.base)
    }

    async fn call(
        &self,
        caller: &Identity,
        method: &'static str,
        args: Value,
    ) -> Result<Vec<u8>, GatewayError> {
        let body = serde_json::to_vec(&args).map_err(|e| GatewayError::Encode {
            reason: format!("{method}: {e}"),
        })?;
        let expiry = self
            .clock
            .now_nanos()
            .saturating_add(INGRESS_EXPIRY.as_nanos() as u64);
        let signature = caller.sign(&signing_payload(method, expiry, &body));

        trace!(method, principal = %caller.principal_text(), "calling remote authority");
        let response = self
            .client
            .post(self.endpoint(method))
            .header(CONTENT_TYPE, "application/json")
            .header(PRINCIPAL_HEADER, caller.principal_text())
            .header(
                PUBLIC_KEY_HEADER,
                Base64::encode_string(caller.public_key().as_bytes()),
            )
            .header(EXPIRY_HEADER, expiry.to_string())
            .header(SIGNATURE_HEADER, Base64::encode_string(&signature))
            .body(body)
            .send()
            .await
            .map_err(|e| transport(method, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!(method, %status, "authority refused the request signature");
            return Err(AuthorityError::Unauthorized.into());
        }
        if !status.is_success() {
            return Err(transport(method, format!("server returned {status}")));
        }

        let bytes = response.bytes().await.map_err(|e| transport(method, e))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_current_user(
        &self,
        caller: &Identity,
    ) -> Result<Option<UserProfile>, GatewayError> {
        let body = self.call(caller, "get_current_user", json!([])).await?;
        let user = wire::decode_user("get_current_user", &body)?;

        let mut ids = self.user_ids();
        match &user {
            Some(user) => {
                ids.insert(*caller.principal(), user.id.clone());
            }
            None => {
                ids.remove(caller.principal());
            }
        }
        Ok(user)
    }

    /// The caller's user id, fetching it once if not yet known.
    async fn user_id(&self, caller: &Identity) -> Result<String, GatewayError> {
        let cached = self.user_ids().get(caller.principal()).cloned();
        if let Some(id) = cached {
            return Ok(id);
        }
        match self.fetch_current_user(caller).await? {
            Some(user) => Ok(user.id),
            None => Err(AuthorityError::Unauthorized.into()),
        }
    }
}

#[async_trait]
impl RemoteAuthority for HttpAuthority {
    async fn create_user(
        &self,
        caller: &Identity,
        profile: NewUserProfile,
    ) -> Result<UserProfile, GatewayError> {
        let body = self
            .call(caller, "create_user", json!([WireProfile::from(&profile)]))
            .await?;
        let id = wire::decode::<WireResult<String>>("create_user", &body)?.into_result()?;
        debug!(principal = %caller.principal_text(), user_id = %id, "registered user");

        self.fetch_current_user(caller)
            .await?
            .ok_or_else(|| GatewayError::Decode {
                reason: format!("create_user: user {id} not visible after registration"),
            })
    }

    async fn get_current_user(
        &self,
        caller: &Identity,
    ) -> Result<Option<UserProfile>, GatewayError> {
        self.fetch_current_user(caller).await
    }

    async fn update_profile(
        &self,
        caller: &Identity,
        update: ProfileUpdate,
    ) -> Result<UserProfile, GatewayError> {
        let id = self.user_id(caller).await?;
        let body = self
            .call(
                caller,
                "update_profile",
                json!([id, WireProfileUpdate::from(&update)]),
            )
            .await?;
        wire::decode::<WireResult<()>>("update_profile", &body)?.into_result()?;

        self.fetch_current_user(caller)
            .await?
            .ok_or_else(|| AuthorityError::UserNotFound.into())
    }

    async fn update_username(
        &self,
        caller: &Identity,
        username: &str,
    ) -> Result<(), GatewayError> {
        let id = self.user_id(caller).await?;
        let body = self
            .call(caller, "update_username", json!([id, username]))
            .await?;
        wire::decode::<WireResult<()>>("update_username", &body)?.into_result()
    }

    async fn update_theme_preferences(
        &self,
        caller: &Identity,
        preferences: ThemePreferences,
    ) -> Result<(), GatewayError> {
        let body = self
            .call(
                caller,
                "update_theme_preferences",
                json!([WireTheme::from(&preferences)]),
            )
            .await?;
        wire::decode::<WireResult<()>>("update_theme_preferences", &body)?.into_result()
    }

    async fn is_username_available(
        &self,
        caller: &Identity,
        username: &str,
    ) -> Result<bool, GatewayError> {
        let body = self
            .call(caller, "is_username_available", json!([username]))
            .await?;
        wire::decode("is_username_available", &body)
    }
}
