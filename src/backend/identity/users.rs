//! User Records
//!
//! Read/write access to the user table owned by the identity provider.
//! The messaging core reads these records to resolve senders and the
//! "other participant" of a conversation; `create_user` exists for
//! seeding and tests.
//!
//! Responses leaving the messaging core only ever carry the
//! `PublicProfile` projection — never email.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::time;
use crate::shared::messaging::{PublicProfile, UserRole};

/// A full user record as stored by the identity provider
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub email: String,
}

impl UserRecord {
    /// Project to the public fields messaging responses may carry
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            role: self.role,
        }
    }
}

/// Create a user record
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    role: UserRole,
) -> Result<UserRecord, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO users (id, username, display_name, avatar_url, role, email, created_at)
         VALUES (?, ?, NULL, NULL, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(username)
    .bind(role.as_str())
    .bind(email)
    .bind(time::now_db())
    .execute(pool)
    .await?;

    Ok(UserRecord {
        id,
        username: username.to_string(),
        display_name: None,
        avatar_url: None,
        role,
        email: email.to_string(),
    })
}

/// Get a user by ID
pub async fn get_user_by_id(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Option<UserRecord>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, username, display_name, avatar_url, role, email
         FROM users
         WHERE id = ?",
    )
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| UserRecord {
        id: Uuid::parse_str(&row.get::<String, _>("id")).unwrap_or_default(),
        username: row.get("username"),
        display_name: row.get("display_name"),
        avatar_url: row.get("avatar_url"),
        role: UserRole::from_str(&row.get::<String, _>("role")),
        email: row.get("email"),
    }))
}

/// Get the public profile of a user
pub async fn get_profile(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Option<PublicProfile>, sqlx::Error> {
    Ok(get_user_by_id(pool, user_id)
        .await?
        .map(|user| user.public_profile()))
}

/// Update display name / avatar (profile settings surface)
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: Uuid,
    display_name: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET display_name = ?, avatar_url = ? WHERE id = ?")
        .bind(display_name)
        .bind(avatar_url)
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}
