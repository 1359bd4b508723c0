//! Debounced preference sync
//!
//! Theme preferences change in bursts (a user clicking through colors) and
//! matter little to the remote authority, so pushes are debounced: each
//! [`PreferenceSync::schedule_sync`] restarts a timer, and only when it
//! fires is the current [`PreferenceBuffer`] snapshot sent. Failures are
//! logged and dropped; the user is never blocked on them.
//!
//! The scheduler does not hold an identity of its own. It watches the
//! session's status channel and reads the identity at fire time, so a push
//! that fires after logout is skipped.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{Instrument, debug, info_span, trace, warn};

use crate::{
    gateway::{RemoteAuthority, ThemePreferences},
    session::SessionStatus,
};


/// Delay between the last scheduled change and the push.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(10);

/// The UI-owned buffer of preference edits.
///
/// The scheduler only ever reads it. The session writes remote preferences
/// into it after a successful verification.
pub trait PreferenceBuffer: Send + Sync {
    /// The preferences as they stand right now.
    fn snapshot(&self) -> ThemePreferences;

    /// Replace the buffered preferences with values loaded from the authority.
    fn apply(&self, preferences: &ThemePreferences);
}

/// A [`PreferenceBuffer`] shared behind a lock.
#[derive(Debug, Default)]
pub struct SharedPreferences {
    current: RwLock<ThemePreferences>,
}

impl SharedPreferences {
    pub fn new(preferences: ThemePreferences) -> Self {
        Self {
            current: RwLock::new(preferences),
        }
    }

    pub fn set(&self, preferences: ThemePreferences) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = preferences;
    }

    /// Edit the preferences in place.
    pub fn update(&self, edit: impl FnOnce(&mut ThemePreferences)) {
        edit(&mut self.current.write().unwrap_or_else(PoisonError::into_inner));
    }
}

impl PreferenceBuffer for SharedPreferences {
    fn snapshot(&self) -> ThemePreferences {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn apply(&self, preferences: &ThemePreferences) {
        self.set(preferences.clone());
    }
}

struct SyncInner {
    gateway: Arc<dyn RemoteAuthority>,
    buffer: Arc<dyn PreferenceBuffer>,
    status: watch::Receiver<SessionStatus>,
}

impl SyncInner {
    async fn push(&self) {
        let identity = self.status.borrow().identity.clone();
        let Some(identity) = identity else {
            debug!("no identity; skipping preference push");
            return;
        };

        let preferences = self.buffer.snapshot();
        match self
            .gateway
            .update_theme_preferences(&identity, preferences)
            .await
        {
            Ok(()) => debug!(principal = %identity.principal_text(), "pushed theme preferences"),
            Err(e) => warn!(error = %e, "failed to push theme preferences"),
        }
    }
}

/// Debounced pusher of theme preferences.
pub struct PreferenceSync {
    inner: Arc<SyncInner>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for PreferenceSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceSync")
            .field("debounce", &self.debounce)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl PreferenceSync {
    pub fn new(
        gateway: Arc<dyn RemoteAuthority>,
        buffer: Arc<dyn PreferenceBuffer>,
        status: watch::Receiver<SessionStatus>,
        debounce: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(SyncInner {
                gateway,
                buffer,
                status,
            }),
            debounce,
            pending: Mutex::new(None),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm (or re-arm) the debounce timer.
    ///
    /// Does nothing while the session has no identity. Must be called from
    /// within a tokio runtime.
    pub fn schedule_sync(&self) {
        if !self.inner.status.borrow().is_authenticated() {
            trace!("not authenticated; preference sync not scheduled");
            return;
        }

        let inner = Arc::clone(&self.inner);
        let debounce = self.debounce;
        let timer = tokio::spawn(
            async move {
                tokio::time::sleep(debounce).await;
                inner.push().await;
            }
            .instrument(info_span!("preference_sync")),
        );

        if let Some(previous) = self.pending().replace(timer) {
            previous.abort();
        }
    }

    /// Push now, dropping any armed timer. Completes once the push has.
    pub async fn force_sync(&self) {
        self.cancel();
        self.inner.push().await;
    }

    /// Drop any armed timer without pushing.
    pub fn destroy(&self) {
        self.cancel();
    }

    /// Whether a timer is armed and its push has not completed.
    pub fn is_pending(&self) -> bool {
        self.pending()
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    fn cancel(&self) {
        if let Some(timer) = self.pending().take() {
            timer.abort();
        }
    }
}

impl Drop for PreferenceSync {
    fn drop(&mut self) {
        self.cancel();
    }
}
