//! Session lifecycle
//!
//! [`Session`] owns the current identity and drives it through the
//! lifecycle: restore from storage, provision a guest, recover from a
//! phrase, reconcile with the remote authority, update the profile, log out.
//! Every successful transition is persisted through the [`SessionCodec`]
//! and broadcast as a [`SessionStatus`] on a watch channel.
//!
//! ## Failure policy
//!
//! Operations that establish who the user is (`initialize`, `verify`,
//! `recover_account`) wipe the session entirely when they fail, so a session
//! that cannot be verified is never left half-trusted. Guest creation only
//! wipes on failures outside the authority (network, deadline, storage);
//! when the authority itself refuses, the fresh identity is kept so the
//! user can retry. Profile updates never wipe. Input is validated before any
//! state changes, and an invalid input only records [`Session::last_error`].
//!
//! ## Reconciliation
//!
//! Verification and registration can hand off to each other: an identity
//! the authority does not know gets registered, and a registration that
//! reports `AlreadyExists` gets verified. The hand-off is bounded by
//! [`MAX_RECONCILE_STEPS`].

use std::sync::Arc;

use candid::Principal;
use rand::Rng;
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::{
    Error, Result,
    gateway::{
        Deadline, NewUserProfile, ProfileUpdate, RemoteAuthority, USERNAME_MAX_LEN, UserProfile,
    },
    identity::{self, Identity, SecretPhrase},
    preferences::PreferenceBuffer,
    storage::{SessionCodec, SessionSnapshot, SessionStore},
};

pub mod config;
pub mod errors;
pub mod state;


pub use config::{SessionConfig, StartupPolicy};
pub use errors::SessionError;
pub use state::{SessionState, SessionStatus};

/// Upper bound on verify/register hand-offs in one operation.
pub const MAX_RECONCILE_STEPS: usize = 4;

/// Length of the principal prefix used in default display names.
const DEFAULT_NAME_PREFIX_LEN: usize = 8;

struct Credentials {
    phrase: SecretPhrase,
    identity: Arc<Identity>,
}

enum Step {
    Verify,
    Register(Option<NewUserProfile>),
}

/// Which failures wipe the session.
#[derive(Debug, Clone, Copy)]
enum ResetOn {
    Always,
    /// Failures the authority did not decide: transport, storage, runaway reconcile
    OutsideAuthority,
    Never,
}

impl ResetOn {
    fn applies(self, err: &Error) -> bool {
        match self {
            ResetOn::Always => true,
            ResetOn::Never => false,
            ResetOn::OutsideAuthority => {
                err.is_transport_error()
                    || err.is_storage_error()
                    || matches!(err, Error::Session(e) if e.is_reconcile_loop())
            }
        }
    }
}

/// Default registration profile for an identity.
///
/// The display name is derived from the principal; the username is
/// `Guest` plus four random digits.
pub fn default_profile(identity: &Identity) -> NewUserProfile {
    let principal = identity.principal_text();
    let prefix: String = principal.chars().take(DEFAULT_NAME_PREFIX_LEN).collect();
    let suffix = rand::thread_rng().gen_range(1000..=9999);
    NewUserProfile::new(format!("User_{prefix}"), format!("Guest{suffix}"))
}

fn check_username(username: &str) -> std::result::Result<(), SessionError> {
    if username.trim().is_empty() {
        return Err(SessionError::invalid_input("Username cannot be empty"));
    }
    if username.len() > USERNAME_MAX_LEN {
        return Err(SessionError::invalid_input(format!(
            "Username too long (max {USERNAME_MAX_LEN} characters)"
        )));
    }
    Ok(())
}

fn check_name(name: &str) -> std::result::Result<(), SessionError> {
    if name.trim().is_empty() {
        return Err(SessionError::invalid_input("Name cannot be empty"));
    }
    Ok(())
}

fn check_new_profile(profile: &NewUserProfile) -> std::result::Result<(), SessionError> {
    check_name(&profile.name)?;
    check_username(&profile.username)
}

fn check_update(update: &ProfileUpdate) -> std::result::Result<(), SessionError> {
    if let Some(name) = &update.name {
        check_name(name)?;
    }
    if let Some(username) = &update.username {
        check_username(username)?;
    }
    Ok(())
}

/// The identity and session state machine.
///
/// Mutating operations take `&mut self`; share a session between tasks by
/// wrapping it in a `tokio::sync::Mutex`.
pub struct Session {
    gateway: Arc<dyn RemoteAuthority>,
    codec: SessionCodec,
    config: SessionConfig,
    credentials: Option<Credentials>,
    registered: bool,
    user: Option<UserProfile>,
    loading: bool,
    last_error: Option<String>,
    preferences: Option<Arc<dyn PreferenceBuffer>>,
    status: watch::Sender<SessionStatus>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("principal", &self.principal().map(|p| p.to_text()))
            .field("slot", &self.codec.key())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create an empty, unauthenticated session.
    ///
    /// Nothing is read from storage until [`Session::initialize`]. When the
    /// configuration sets a gateway timeout the gateway is wrapped in a
    /// [`Deadline`].
    pub fn new(
        gateway: Arc<dyn RemoteAuthority>,
        store: Arc<dyn SessionStore>,
        config: SessionConfig,
    ) -> Self {
        let gateway: Arc<dyn RemoteAuthority> = match config.gateway_timeout() {
            Some(timeout) => Arc::new(Deadline::new(gateway, timeout)),
            None => gateway,
        };
        let codec = SessionCodec::new(store, config.storage_key.clone());
        let (status, _) = watch::channel(SessionStatus::unauthenticated());

        Self {
            gateway,
            codec,
            config,
            credentials: None,
            registered: false,
            user: None,
            loading: false,
            last_error: None,
            preferences: None,
            status,
        }
    }

    /// Attach the buffer that receives remote preferences after verification.
    pub fn with_preferences(mut self, buffer: Arc<dyn PreferenceBuffer>) -> Self {
        self.preferences = Some(buffer);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The gateway this session calls, including any deadline wrapper.
    pub fn gateway(&self) -> Arc<dyn RemoteAuthority> {
        Arc::clone(&self.gateway)
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// The phrase backing the current identity.
    pub fn secret_phrase(&self) -> Option<&SecretPhrase> {
        self.credentials.as_ref().map(|c| &c.phrase)
    }

    pub fn identity(&self) -> Option<Arc<Identity>> {
        self.credentials.as_ref().map(|c| Arc::clone(&c.identity))
    }

    pub fn principal(&self) -> Option<Principal> {
        self.credentials.as_ref().map(|c| *c.identity.principal())
    }

    /// Reason the last operation failed, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn state(&self) -> SessionState {
        if self.loading {
            SessionState::Loading
        } else if self.credentials.is_some() {
            if self.registered {
                SessionState::Registered
            } else {
                SessionState::Guest
            }
        } else if let Some(reason) = &self.last_error {
            SessionState::Failed(reason.clone())
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Observe status changes.
    ///
    /// The receiver sees `Unauthenticated` with no identity after logout.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Restore the persisted session, or apply the startup policy.
    ///
    /// A restored identity is verified against the remote authority. Any
    /// failure wipes the session and is recorded in [`Session::last_error`].
    pub async fn initialize(&mut self) -> Result<()> {
        self.begin();
        let result = self.restore().instrument(info_span!("initialize")).await;
        self.settle(result, ResetOn::Always).await
    }

    /// Generate a fresh identity and register it.
    ///
    /// Without a profile the default one from [`default_profile`] is used.
    /// If the authority refuses the registration the guest identity is kept
    /// and the session stays unregistered.
    pub async fn create_guest_account(&mut self, profile: Option<NewUserProfile>) -> Result<()> {
        if let Some(Err(e)) = profile.as_ref().map(check_new_profile) {
            return self.reject(e.into());
        }

        self.begin();
        let result = self
            .provision_guest(profile)
            .instrument(info_span!("create_guest_account"))
            .await;
        self.settle(result, ResetOn::OutsideAuthority).await
    }

    /// Replace the current identity with the one derived from `phrase`, then verify it.
    pub async fn recover_account(&mut self, phrase: &str) -> Result<()> {
        let phrase = match SecretPhrase::parse(phrase) {
            Ok(phrase) => phrase,
            Err(e) => return self.reject(e.into()),
        };

        self.begin();
        let result = async {
            let identity = self.adopt(phrase);
            info!(principal = %identity.principal_text(), "recovering account");
            self.persist().await?;
            self.reconcile(Step::Verify).await
        }
        .instrument(info_span!("recover_account"))
        .await;
        self.settle(result, ResetOn::Always).await
    }

    /// Check the current identity against the remote authority.
    ///
    /// A registered identity has its profile and preferences refreshed. An
    /// unknown identity is registered with the default profile.
    pub async fn verify(&mut self) -> Result<()> {
        self.begin();
        let result = self
            .reconcile(Step::Verify)
            .instrument(info_span!("verify"))
            .await;
        self.settle(result, ResetOn::Always).await
    }

    /// Apply a partial profile update and return the updated profile.
    pub async fn update_profile(&mut self, update: ProfileUpdate) -> Result<UserProfile> {
        if let Err(e) = check_update(&update) {
            return self.reject(e.into());
        }
        let identity = match self.require_identity() {
            Ok(identity) => identity,
            Err(e) => return self.reject(e),
        };

        self.begin();
        let result = async {
            let user = self.gateway.update_profile(&identity, update).await?;
            debug!(user_id = %user.id, "profile updated");
            self.registered = true;
            self.user = Some(user.clone());
            self.persist().await?;
            Ok::<_, Error>(user)
        }
        .instrument(info_span!("update_profile"))
        .await;
        self.settle(result, ResetOn::Never).await
    }

    /// Change the username.
    pub async fn update_username(&mut self, username: &str) -> Result<()> {
        if let Err(e) = check_username(username) {
            return self.reject(e.into());
        }
        let identity = match self.require_identity() {
            Ok(identity) => identity,
            Err(e) => return self.reject(e),
        };

        self.begin();
        let result = async {
            self.gateway.update_username(&identity, username).await?;
            if let Some(user) = &mut self.user {
                user.username = username.to_string();
            }
            debug!(username, "username updated");
            self.persist().await
        }
        .instrument(info_span!("update_username"))
        .await;
        self.settle(result, ResetOn::Never).await
    }

    /// Ask the authority whether `username` is free.
    ///
    /// A pure query: it neither changes the session nor records failures.
    pub async fn is_username_available(&self, username: &str) -> Result<bool> {
        let identity = self.require_identity()?;
        Ok(self
            .gateway
            .is_username_available(&identity, username)
            .await?)
    }

    /// Forget the identity and wipe the persisted session.
    ///
    /// Observers see `Unauthenticated` afterwards. Calling this on an
    /// already empty session does nothing.
    pub async fn logout(&mut self) -> Result<()> {
        if self.credentials.is_none() && self.last_error.is_none() {
            debug!("logout on empty session");
            return Ok(());
        }

        let result = self.reset().await;
        self.last_error = None;
        self.publish();
        info!("logged out");
        result
    }

    async fn restore(&mut self) -> Result<()> {
        let snapshot = self.codec.load().await?;
        match snapshot {
            Some(snapshot) if snapshot.authenticated => {
                let phrase = SecretPhrase::parse(&snapshot.secret_phrase)?;
                let identity = self.adopt(phrase);
                self.registered = snapshot.registered;
                self.user = snapshot.user.clone();
                info!(principal = %identity.principal_text(), "restored session");
                self.reconcile(Step::Verify).await
            }
            _ => match self.config.startup_policy {
                StartupPolicy::ProvisionGuest => {
                    info!("no stored session; provisioning guest");
                    self.provision_guest(None).await
                }
                StartupPolicy::StayUnauthenticated => {
                    debug!("no stored session");
                    Ok(())
                }
            },
        }
    }

    async fn provision_guest(&mut self, profile: Option<NewUserProfile>) -> Result<()> {
        let phrase = identity::generate()?;
        let identity = self.adopt(phrase);
        info!(principal = %identity.principal_text(), "created guest identity");
        self.persist().await?;
        self.reconcile(Step::Register(profile)).await
    }

    /// Drive verification and registration until one of them settles.
    async fn reconcile(&mut self, first: Step) -> Result<()> {
        let identity = self.require_identity()?;
        let mut step = first;

        for _ in 0..MAX_RECONCILE_STEPS {
            step = match step {
                Step::Verify => match self.gateway.get_current_user(&identity).await {
                    Ok(Some(user)) => return self.accept(user).await,
                    Ok(None) => {
                        info!(principal = %identity.principal_text(), "identity not registered; registering");
                        Step::Register(None)
                    }
                    Err(e) => {
                        self.reset_quietly().await;
                        return Err(e.into());
                    }
                },
                Step::Register(profile) => {
                    let profile = profile.unwrap_or_else(|| default_profile(&identity));
                    match self.gateway.create_user(&identity, profile).await {
                        Ok(user) => return self.accept(user).await,
                        Err(e) if e.is_already_exists() => {
                            debug!("identity already registered; verifying");
                            Step::Verify
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            };
        }

        self.reset_quietly().await;
        Err(SessionError::ReconcileLoop {
            steps: MAX_RECONCILE_STEPS,
        }
        .into())
    }

    /// Record a profile confirmed by the authority.
    async fn accept(&mut self, user: UserProfile) -> Result<()> {
        if let (Some(buffer), Some(preferences)) = (&self.preferences, &user.theme_preferences) {
            buffer.apply(preferences);
        }
        info!(user_id = %user.id, username = %user.username, "session registered");
        self.registered = true;
        self.user = Some(user);
        self.persist().await
    }

    fn adopt(&mut self, phrase: SecretPhrase) -> Arc<Identity> {
        let identity = Arc::new(identity::derive(&phrase));
        self.credentials = Some(Credentials {
            phrase,
            identity: Arc::clone(&identity),
        });
        self.registered = false;
        self.user = None;
        self.publish();
        identity
    }

    fn require_identity(&self) -> Result<Arc<Identity>> {
        self.identity()
            .ok_or_else(|| SessionError::NoIdentity.into())
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            authenticated: self.credentials.is_some(),
            registered: self.registered,
            user: self.user.clone(),
            secret_phrase: self
                .credentials
                .as_ref()
                .map(|c| c.phrase.expose().to_string())
                .unwrap_or_default(),
        }
    }

    async fn persist(&self) -> Result<()> {
        self.codec.save(&self.snapshot()).await
    }

    fn publish(&self) {
        self.status.send_replace(SessionStatus {
            state: self.state(),
            identity: self.identity(),
        });
    }

    fn begin(&mut self) {
        self.loading = true;
        self.publish();
    }

    /// Record a failure that happened before any state change.
    fn reject<T>(&mut self, err: Error) -> Result<T> {
        debug!(error = %err, "rejected");
        self.last_error = Some(err.to_string());
        self.publish();
        Err(err)
    }

    async fn settle<T>(&mut self, result: Result<T>, reset_on: ResetOn) -> Result<T> {
        self.loading = false;
        match result {
            Ok(value) => {
                self.last_error = None;
                self.publish();
                Ok(value)
            }
            Err(err) => {
                if reset_on.applies(&err) {
                    error!(error = %err, "session failed; resetting");
                    self.reset_quietly().await;
                } else {
                    warn!(error = %err, "session operation failed");
                }
                self.last_error = Some(err.to_string());
                self.publish();
                Err(err)
            }
        }
    }

    /// Drop everything in memory, then wipe the slot.
    async fn reset(&mut self) -> Result<()> {
        self.credentials = None;
        self.registered = false;
        self.user = None;
        self.loading = false;
        self.publish();
        self.codec.clear().await
    }

    async fn reset_quietly(&mut self) {
        if let Err(e) = self.reset().await {
            error!(error = %e, "failed to wipe session slot");
        }
    }
}
