//! Public Profile Projection
//!
//! The subset of a user record that messaging responses are allowed to
//! carry. Email and other account fields never leave the identity
//! module through this type.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform role of a user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// A game studio account
    Studio,
    /// An independent creator
    Creator,
    /// A player account
    Player,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Player
    }
}

impl UserRole {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Studio => "studio",
            UserRole::Creator => "creator",
            UserRole::Player => "player",
        }
    }

    /// Parse from string (database)
    pub fn from_str(s: &str) -> Self {
        match s {
            "studio" => UserRole::Studio,
            "creator" => UserRole::Creator,
            _ => UserRole::Player,
        }
    }
}

/// Public-facing profile fields of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicProfile {
    /// User ID
    pub id: Uuid,
    /// Unique handle
    pub username: String,
    /// Display name, if the user set one
    pub display_name: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Platform role
    pub role: UserRole,
}

impl PublicProfile {
    /// Name to show in a conversation list: display name when present,
    /// otherwise the handle.
    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}
