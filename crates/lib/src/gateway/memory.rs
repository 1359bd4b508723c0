//! In-process remote authority for tests and local embedding.
//!
//! Mirrors the authority's registration rules: one user per principal,
//! unique usernames, non-empty names and usernames of at most
//! [`USERNAME_MAX_LEN`] bytes.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use candid::Principal;

use super::{
    AuthorityError, GatewayError, NewUserProfile, ProfileUpdate, RemoteAuthority,
    ThemePreferences, USERNAME_MAX_LEN, UserProfile,
};
use crate::{
    clock::{Clock, SystemClock},
    identity::Identity,
};

#[derive(Debug, Default)]
struct Registry {
    users: HashMap<String, UserProfile>,
    principals: HashMap<Principal, String>,
    next_id: u64,
}

impl Registry {
    fn id_of(&self, principal: &Principal) -> Result<String, AuthorityError> {
        self.principals
            .get(principal)
            .cloned()
            .ok_or(AuthorityError::Unauthorized)
    }

    fn username_taken(&self, username: &str) -> bool {
        self.users.values().any(|user| user.username == username)
    }
}

fn check_username(username: &str) -> Result<(), AuthorityError> {
    if username.trim().is_empty() {
        return Err(AuthorityError::InvalidInput(
            "Username cannot be empty".to_string(),
        ));
    }
    if username.len() > USERNAME_MAX_LEN {
        return Err(AuthorityError::InvalidInput(format!(
            "Username too long (max {USERNAME_MAX_LEN} characters)"
        )));
    }
    Ok(())
}

/// A remote authority that keeps its registry in memory.
#[derive(Debug, Clone)]
pub struct InMemoryAuthority {
    registry: Arc<Mutex<Registry>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthority {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Stamp `created_at`/`updated_at` from the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            clock,
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.registry().users.len()
    }

    /// The profile registered for `principal`, if any.
    pub fn user(&self, principal: &Principal) -> Option<UserProfile> {
        let registry = self.registry();
        let id = registry.principals.get(principal)?;
        registry.users.get(id).cloned()
    }

    /// Forget a registration, as if the authority lost it.
    pub fn remove_user(&self, principal: &Principal) -> bool {
        let mut registry = self.registry();
        match registry.principals.remove(principal) {
            Some(id) => registry.users.remove(&id).is_some(),
            None => false,
        }
    }

    /// Modify a stored profile in place.
    pub fn edit_user(&self, principal: &Principal, edit: impl FnOnce(&mut UserProfile)) -> bool {
        let mut registry = self.registry();
        let Some(id) = registry.principals.get(principal).cloned() else {
            return false;
        };
        match registry.users.get_mut(&id) {
            Some(user) => {
                edit(user);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl RemoteAuthority for InMemoryAuthority {
    async fn create_user(
        &self,
        caller: &Identity,
        profile: NewUserProfile,
    ) -> Result<UserProfile, GatewayError> {
        let now = self.clock.now_nanos();
        let mut registry = self.registry();

        if registry.principals.contains_key(caller.principal()) {
            return Err(AuthorityError::AlreadyExists.into());
        }
        if profile.name.trim().is_empty() {
            return Err(AuthorityError::InvalidInput("Name cannot be empty".to_string()).into());
        }
        check_username(&profile.username)?;
        if registry.username_taken(&profile.username) {
            return Err(
                AuthorityError::InvalidInput("Username is already taken".to_string()).into(),
            );
        }

        registry.next_id += 1;
        let id = format!("user-{}", registry.next_id);
        let user = UserProfile {
            id: id.clone(),
            username: profile.username,
            name: profile.name,
            email: profile.email,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
            theme_preferences: None,
            created_at: now,
            updated_at: now,
        };
        registry.users.insert(id.clone(), user.clone());
        registry.principals.insert(*caller.principal(), id);
        Ok(user)
    }

    async fn get_current_user(
        &self,
        caller: &Identity,
    ) -> Result<Option<UserProfile>, GatewayError> {
        Ok(self.user(caller.principal()))
    }

    async fn update_profile(
        &self,
        caller: &Identity,
        update: ProfileUpdate,
    ) -> Result<UserProfile, GatewayError> {
        let now = self.clock.now_nanos();
        let mut registry = self.registry();
        let id = registry.id_of(caller.principal())?;
        let user = registry
            .users
            .get_mut(&id)
            .ok_or(AuthorityError::UserNotFound)?;
        user.apply(&update);
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn update_username(
        &self,
        caller: &Identity,
        username: &str,
    ) -> Result<(), GatewayError> {
        let now = self.clock.now_nanos();
        let mut registry = self.registry();
        let id = registry.id_of(caller.principal())?;
        check_username(username)?;
        let user = registry
            .users
            .get_mut(&id)
            .ok_or(AuthorityError::UserNotFound)?;
        user.username = username.to_string();
        user.updated_at = now;
        Ok(())
    }

    async fn update_theme_preferences(
        &self,
        caller: &Identity,
        preferences: ThemePreferences,
    ) -> Result<(), GatewayError> {
        let now = self.clock.now_nanos();
        let mut registry = self.registry();
        let id = registry.id_of(caller.principal())?;
        let user = registry
            .users
            .get_mut(&id)
            .ok_or(AuthorityError::UserNotFound)?;
        user.theme_preferences = Some(preferences);
        user.updated_at = now;
        Ok(())
    }

    async fn is_username_available(
        &self,
        _caller: &Identity,
        username: &str,
    ) -> Result<bool, GatewayError> {
        Ok(!self.registry().username_taken(username))
    }
}
