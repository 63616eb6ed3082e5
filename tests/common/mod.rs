//! Common test utilities
//!
//! Spins the full router over an in-memory database with seeded users
//! and pre-minted bearer tokens.

use axum_test::TestServer;
use sqlx::SqlitePool;
use uuid::Uuid;

use gamefolio::backend::identity::{sessions, users};
use gamefolio::backend::server::init::build_app;
use gamefolio::backend::server::{connect_database, AppState, ServerConfig};
use gamefolio::shared::messaging::UserRole;

/// A seeded user with a valid bearer token
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

impl TestUser {
    /// Value for the Authorization header
    pub fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// The app under test plus its seeded users
pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
    pub alice: TestUser,
    pub bob: TestUser,
    pub carol: TestUser,
}

/// Seed one user and mint their token
pub async fn seed_user(pool: &SqlitePool, username: &str, role: UserRole) -> TestUser {
    let email = format!("{}@example.com", username);
    let user = users::create_user(pool, username, &email, role)
        .await
        .expect("failed to seed user");
    let token = sessions::create_token(user.id, username).expect("failed to mint token");
    TestUser {
        id: user.id,
        username: username.to_string(),
        token,
    }
}

/// Build the app with an in-memory database and three seeded users
pub async fn spawn_app() -> TestApp {
    let pool = connect_database("sqlite::memory:")
        .await
        .expect("failed to connect test database");

    let alice = seed_user(&pool, "alice", UserRole::Creator).await;
    let bob = seed_user(&pool, "bob", UserRole::Player).await;
    let carol = seed_user(&pool, "carol", UserRole::Studio).await;

    let state = AppState::new(pool.clone(), ServerConfig::default());
    let server = TestServer::new(build_app(state)).expect("failed to start test server");

    TestApp {
        server,
        pool,
        alice,
        bob,
        carol,
    }
}
