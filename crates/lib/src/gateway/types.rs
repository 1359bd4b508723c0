//! Records exchanged with the remote authority.
//!
//! These are the domain-side shapes: plain `Option`s and `u64`s. The wire
//! encoding (variant-tagged results, optionals as sequences) is translated in
//! [`super::wire`] and never leaks past the adapter.

use serde::{Deserialize, Serialize};

/// Theme preferences synced to the remote authority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePreferences {
    /// Color scheme name
    pub color: String,
    /// true for dark, false for light
    pub dark_mode: bool,
}

impl Default for ThemePreferences {
    fn default() -> Self {
        Self {
            color: "neutral".to_string(),
            dark_mode: false,
        }
    }
}

/// A registered user as reported by the remote authority.
///
/// The session copies this verbatim into its snapshot. Timestamps are
/// nanoseconds since the Unix epoch and routinely exceed 2^53, so they are
/// encoded as strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Opaque user id assigned by the authority
    pub id: String,
    pub username: String,
    /// Display name
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_preferences: Option<ThemePreferences>,
    #[serde(default, with = "crate::storage::int_text")]
    pub created_at: u64,
    #[serde(default, with = "crate::storage::int_text")]
    pub updated_at: u64,
}

impl UserProfile {
    /// Merge a partial update into this profile.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(username) = &update.username {
            self.username = username.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(bio) = &update.bio {
            self.bio = bio.clone();
        }
        if let Some(avatar_url) = &update.avatar_url {
            self.avatar_url = avatar_url.clone();
        }
        if let Some(theme_preferences) = &update.theme_preferences {
            self.theme_preferences = theme_preferences.clone();
        }
    }
}

/// Profile submitted when registering an identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserProfile {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl NewUserProfile {
    /// Profile with just the required fields.
    pub fn new(name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            ..Self::default()
        }
    }
}

/// Partial profile update.
///
/// Outer `None` leaves a field unchanged. For optional fields the inner
/// `None` clears the value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
    pub theme_preferences: Option<Option<ThemePreferences>>,
}

impl ProfileUpdate {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = Some(email);
        self
    }

    pub fn with_bio(mut self, bio: Option<String>) -> Self {
        self.bio = Some(bio);
        self
    }

    pub fn with_avatar_url(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = Some(avatar_url);
        self
    }

    pub fn with_theme_preferences(mut self, preferences: Option<ThemePreferences>) -> Self {
        self.theme_preferences = Some(preferences);
        self
    }

    /// Check whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
