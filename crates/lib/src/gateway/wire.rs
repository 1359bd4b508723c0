//! The remote authority's JSON wire format.
//!
//! The authority speaks a variant-tagged dialect: results are
//! `{"Ok": v}` / `{"Err": {"Kind": payload}}`, optionals are zero- or
//! one-element arrays, records use snake_case field names and a registered
//! user nests its profile fields one level down. Everything here is
//! translated into the domain types of [`super::types`] exactly once.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    errors::{AuthorityError, GatewayError},
    types::{NewUserProfile, ProfileUpdate, ThemePreferences, UserProfile},
};

/// Serde adapter for optionals encoded as `[]` or `[value]`.
pub mod opt_vec {
    use super::*;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        value.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let mut items = Vec::<T>::deserialize(deserializer)?;
        if items.len() > 1 {
            return Err(serde::de::Error::invalid_length(
                items.len(),
                &"an optional encoded as zero or one elements",
            ));
        }
        Ok(items.pop())
    }
}

/// Serde adapter for "leave unchanged / clear / set" fields.
///
/// `None` is `[]`, `Some(None)` is `[[]]` and `Some(Some(v))` is `[[v]]`.
pub mod opt_opt_vec {
    use super::*;

    struct Inner<'a, T>(&'a Option<T>);

    impl<T: Serialize> Serialize for Inner<'_, T> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            opt_vec::serialize(self.0, serializer)
        }
    }

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        let nested: Vec<Inner<'_, T>> = value.iter().map(Inner).collect();
        nested.serialize(serializer)
    }
}

/// A variant-tagged call result.
#[derive(Debug, Deserialize)]
pub enum WireResult<T> {
    Ok(T),
    Err(AuthorityError),
}

impl<T> WireResult<T> {
    pub fn into_result(self) -> Result<T, GatewayError> {
        match self {
            WireResult::Ok(value) => Ok(value),
            WireResult::Err(err) => Err(GatewayError::Authority(err)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireTheme {
    pub color: String,
    pub dark_mode: bool,
}

impl From<WireTheme> for ThemePreferences {
    fn from(theme: WireTheme) -> Self {
        Self {
            color: theme.color,
            dark_mode: theme.dark_mode,
        }
    }
}

impl From<&ThemePreferences> for WireTheme {
    fn from(theme: &ThemePreferences) -> Self {
        Self {
            color: theme.color.clone(),
            dark_mode: theme.dark_mode,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WireProfile {
    pub name: String,
    pub username: String,
    #[serde(default, with = "opt_vec")]
    pub email: Option<String>,
    #[serde(default, with = "opt_vec")]
    pub avatar_url: Option<String>,
    #[serde(default, with = "opt_vec")]
    pub bio: Option<String>,
    #[serde(default, with = "opt_vec")]
    pub theme_preferences: Option<WireTheme>,
}

impl From<&NewUserProfile> for WireProfile {
    fn from(profile: &NewUserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            username: profile.username.clone(),
            email: profile.email.clone(),
            avatar_url: profile.avatar_url.clone(),
            bio: profile.bio.clone(),
            theme_preferences: None,
        }
    }
}

/// A registered user as the authority reports it.
#[derive(Debug, Deserialize)]
pub struct WireUser {
    pub id: String,
    pub profile: WireProfile,
    #[serde(with = "crate::storage::int_text")]
    pub created_at: u64,
    #[serde(with = "crate::storage::int_text")]
    pub updated_at: u64,
}

impl From<WireUser> for UserProfile {
    fn from(user: WireUser) -> Self {
        Self {
            id: user.id,
            username: user.profile.username,
            name: user.profile.name,
            email: user.profile.email,
            bio: user.profile.bio,
            avatar_url: user.profile.avatar_url,
            theme_preferences: user.profile.theme_preferences.map(Into::into),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WireProfileUpdate {
    #[serde(with = "opt_vec")]
    pub name: Option<String>,
    #[serde(with = "opt_vec")]
    pub username: Option<String>,
    #[serde(with = "opt_opt_vec")]
    pub email: Option<Option<String>>,
    #[serde(with = "opt_opt_vec")]
    pub avatar_url: Option<Option<String>>,
    #[serde(with = "opt_opt_vec")]
    pub bio: Option<Option<String>>,
    #[serde(with = "opt_opt_vec")]
    pub theme_preferences: Option<Option<WireTheme>>,
}

impl From<&ProfileUpdate> for WireProfileUpdate {
    fn from(update: &ProfileUpdate) -> Self {
        Self {
            name: update.name.clone(),
            username: update.username.clone(),
            email: update.email.clone(),
            avatar_url: update.avatar_url.clone(),
            bio: update.bio.clone(),
            theme_preferences: update
                .theme_preferences
                .as_ref()
                .map(|inner| inner.as_ref().map(WireTheme::from)),
        }
    }
}

/// Decode a reply body into `T`.
pub fn decode<'a, T: Deserialize<'a>>(method: &str, body: &'a [u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::Decode {
        reason: format!("{method}: {e}"),
    })
}

/// Decode an optional user reply (`[]` or `[user]`).
pub fn decode_user(method: &str, body: &[u8]) -> Result<Option<UserProfile>, GatewayError> {
    let mut users: Vec<WireUser> = decode(method, body)?;
    if users.len() > 1 {
        return Err(GatewayError::Decode {
            reason: format!("{method}: expected at most one user, got {}", users.len()),
        });
    }
    Ok(users.pop().map(UserProfile::from))
}
