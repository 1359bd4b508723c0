use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tessera::{
    Identity, Session, SessionConfig,
    gateway::{
        AuthorityError, GatewayError, InMemoryAuthority, NewUserProfile, ProfileUpdate,
        RemoteAuthority, ThemePreferences, UserProfile,
    },
    session::StartupPolicy,
    storage::{DEFAULT_SESSION_KEY, InMemoryStore, SessionCodec, SessionSnapshot},
};

pub const PHRASE: &str =
    "legal winner thank year wave sausage worth useful legal winner thank yellow";

#[derive(Debug, Default)]
struct Script {
    fail_create: Option<GatewayError>,
    create_then_report: Option<GatewayError>,
    miss_current_user: usize,
    fail_current_user: Option<GatewayError>,
    fail_updates: Option<GatewayError>,
    stall: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct Calls {
    pub create_user: AtomicUsize,
    pub get_current_user: AtomicUsize,
    pub update_profile: AtomicUsize,
    pub update_username: AtomicUsize,
    pub update_theme_preferences: AtomicUsize,
    pub is_username_available: AtomicUsize,
}

/// An in-memory authority with scripted failures and call counters.
#[derive(Debug, Default)]
pub struct StubAuthority {
    inner: InMemoryAuthority,
    script: Mutex<Script>,
    calls: Calls,
    theme_pushes: Mutex<Vec<ThemePreferences>>,
}

impl StubAuthority {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The backing registry.
    pub fn registry(&self) -> &InMemoryAuthority {
        &self.inner
    }

    /// Every `create_user` fails with `err` without registering.
    pub fn fail_create_with(&self, err: GatewayError) {
        self.script.lock().unwrap().fail_create = Some(err);
    }

    /// The next `create_user` registers the caller but reports `err`.
    pub fn create_then_report(&self, err: GatewayError) {
        self.script.lock().unwrap().create_then_report = Some(err);
    }

    /// The next `n` calls to `get_current_user` report the caller as unknown.
    pub fn miss_current_user(&self, n: usize) {
        self.script.lock().unwrap().miss_current_user = n;
    }

    /// Every `get_current_user` fails with `err`.
    pub fn fail_current_user_always(&self, err: GatewayError) {
        self.script.lock().unwrap().fail_current_user = Some(err);
    }

    /// Every profile, username and preference update fails with `err`.
    pub fn fail_updates_with(&self, err: GatewayError) {
        self.script.lock().unwrap().fail_updates = Some(err);
    }

    /// Every call sleeps for `delay` before answering.
    pub fn stall_for(&self, delay: Duration) {
        self.script.lock().unwrap().stall = Some(delay);
    }

    /// Drop all scripted behavior.
    pub fn heal(&self) {
        *self.script.lock().unwrap() = Script::default();
    }

    pub fn calls(&self) -> &Calls {
        &self.calls
    }

    pub fn create_calls(&self) -> usize {
        self.calls.create_user.load(Ordering::SeqCst)
    }

    pub fn current_user_calls(&self) -> usize {
        self.calls.get_current_user.load(Ordering::SeqCst)
    }

    pub fn theme_push_calls(&self) -> usize {
        self.calls.update_theme_preferences.load(Ordering::SeqCst)
    }

    /// Preferences received by `update_theme_preferences`, in order.
    pub fn theme_pushes(&self) -> Vec<ThemePreferences> {
        self.theme_pushes.lock().unwrap().clone()
    }

    async fn stall(&self) {
        let delay = self.script.lock().unwrap().stall;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn update_failure(&self) -> Option<GatewayError> {
        self.script.lock().unwrap().fail_updates.clone()
    }
}

#[async_trait]
impl RemoteAuthority for StubAuthority {
    async fn create_user(
        &self,
        caller: &Identity,
        profile: NewUserProfile,
    ) -> Result<UserProfile, GatewayError> {
        self.calls.create_user.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        let (fail, report) = {
            let mut script = self.script.lock().unwrap();
            (script.fail_create.clone(), script.create_then_report.take())
        };
        if let Some(err) = fail {
            return Err(err);
        }
        let user = self.inner.create_user(caller, profile).await?;
        match report {
            Some(err) => Err(err),
            None => Ok(user),
        }
    }

    async fn get_current_user(
        &self,
        caller: &Identity,
    ) -> Result<Option<UserProfile>, GatewayError> {
        self.calls.get_current_user.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        let (fail, miss) = {
            let mut script = self.script.lock().unwrap();
            let miss = script.miss_current_user > 0;
            if miss {
                script.miss_current_user -= 1;
            }
            (script.fail_current_user.clone(), miss)
        };
        if let Some(err) = fail {
            return Err(err);
        }
        if miss {
            return Ok(None);
        }
        self.inner.get_current_user(caller).await
    }

    async fn update_profile(
        &self,
        caller: &Identity,
        update: ProfileUpdate,
    ) -> Result<UserProfile, GatewayError> {
        self.calls.update_profile.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        if let Some(err) = self.update_failure() {
            return Err(err);
        }
        self.inner.update_profile(caller, update).await
    }

    async fn update_username(
        &self,
        caller: &Identity,
        username: &str,
    ) -> Result<(), GatewayError> {
        self.calls.update_username.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        if let Some(err) = self.update_failure() {
            return Err(err);
        }
        self.inner.update_username(caller, username).await
    }

    async fn update_theme_preferences(
        &self,
        caller: &Identity,
        preferences: ThemePreferences,
    ) -> Result<(), GatewayError> {
        self.calls
            .update_theme_preferences
            .fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        self.theme_pushes.lock().unwrap().push(preferences.clone());
        if let Some(err) = self.update_failure() {
            return Err(err);
        }
        self.inner.update_theme_preferences(caller, preferences).await
    }

    async fn is_username_available(
        &self,
        caller: &Identity,
        username: &str,
    ) -> Result<bool, GatewayError> {
        self.calls
            .is_username_available
            .fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        self.inner.is_username_available(caller, username).await
    }
}

// ==========================
// ERROR FACTORIES
// ==========================

pub fn transport_error() -> GatewayError {
    GatewayError::Transport {
        reason: "connection refused".to_string(),
    }
}

pub fn already_exists() -> GatewayError {
    GatewayError::Authority(AuthorityError::AlreadyExists)
}

pub fn username_taken() -> GatewayError {
    GatewayError::Authority(AuthorityError::InvalidInput(
        "Username is already taken".to_string(),
    ))
}

// ==========================
// SESSION FACTORIES
// ==========================

/// A session wired to a stub authority and an in-memory slot.
pub struct TestSession {
    pub authority: Arc<StubAuthority>,
    pub store: Arc<InMemoryStore>,
    pub session: Session,
}

impl TestSession {
    /// Unauthenticated session that does not provision on startup.
    pub fn empty() -> Self {
        Self::with_config(
            SessionConfig::default().with_startup_policy(StartupPolicy::StayUnauthenticated),
        )
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self::sharing(StubAuthority::new(), Arc::new(InMemoryStore::new()), config)
    }

    pub fn sharing(
        authority: Arc<StubAuthority>,
        store: Arc<InMemoryStore>,
        config: SessionConfig,
    ) -> Self {
        let session = Session::new(authority.clone(), store.clone(), config);
        Self {
            authority,
            store,
            session,
        }
    }

    /// Registered guest session.
    pub async fn registered() -> Self {
        let mut test = Self::empty();
        test.session.create_guest_account(None).await.unwrap();
        assert!(test.session.is_registered());
        test
    }

    /// A second session over the same authority and slot, as after a restart.
    pub fn restart(&self) -> Self {
        Self::sharing(
            self.authority.clone(),
            self.store.clone(),
            self.session.config().clone(),
        )
    }

    pub fn codec(&self) -> SessionCodec {
        SessionCodec::new(self.store.clone(), DEFAULT_SESSION_KEY)
    }

    pub async fn stored(&self) -> Option<SessionSnapshot> {
        self.codec().load().await.unwrap()
    }
}
