use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier shared between the identity provider and the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Owner,
    Admin,
}

impl Role {
    /// Stored role strings are matched case-insensitively; anything unknown is an owner.
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()) {
            Some(value) if value == "admin" => Self::Admin,
            _ => Self::Owner,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
        }
    }
}

/// Signed-in identity as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: UserId,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(skip)]
    pub token: String,
}

impl Identity {
    /// Name shown on listings: display name, else e-mail.
    pub fn public_name(&self) -> String {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
            .to_string()
    }
}

/// Raw profile document as stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProfileRecord {
    pub fn new(email: &str, display_name: &str, role: Role, created_at: DateTime<Utc>) -> Self {
        Self {
            email: Some(email.to_string()),
            display_name: Some(display_name.to_string()),
            role: Some(role.label().to_string()),
            phone: None,
            created_at: Some(created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Merges the stored record with identity data, applying the documented fallbacks.
    pub fn resolve(identity: &Identity, record: ProfileRecord, loaded_at: DateTime<Utc>) -> Self {
        let display_name = record
            .display_name
            .filter(|name| !name.is_empty())
            .or_else(|| identity.display_name.clone())
            .unwrap_or_default();

        Self {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            display_name,
            role: Role::from_stored(record.role.as_deref()),
            phone: record.phone,
            created_at: record.created_at.unwrap_or(loaded_at),
        }
    }
}
