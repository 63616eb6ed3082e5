/**
 * Server Configuration
 *
 * Loads server configuration from environment variables (with `.env`
 * support via dotenv in `main.rs`) and initializes the database pool.
 *
 * # Configuration Sources
 *
 * Everything has a local-development default; nothing is required to
 * start the server. Product-tuning constants (typing staleness, email
 * debounce) are configuration, not invariants.
 */

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Tuning and wiring knobs for the messaging server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP listener
    pub port: u16,
    /// sqlx database URL
    pub database_url: String,
    /// A typing entry older than this is treated as stale and ignored
    pub typing_stale_secs: u64,
    /// Quiet window for external (email) notification delivery per
    /// recipient/sender pair; durable records are never debounced
    pub email_debounce_mins: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: "sqlite://gamefolio.db?mode=rwc".to_string(),
            typing_stale_secs: 4,
            email_debounce_mins: 15,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parsed("SERVER_PORT", defaults.port),
            database_url: std::env::var("GAMEFOLIO_DATABASE_URL")
                .unwrap_or(defaults.database_url),
            typing_stale_secs: env_parsed("TYPING_STALE_SECS", defaults.typing_stale_secs),
            email_debounce_mins: env_parsed("EMAIL_DEBOUNCE_MINS", defaults.email_debounce_mins),
        }
    }

    /// Typing staleness window as a chrono duration
    pub fn typing_stale_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.typing_stale_secs as i64)
    }

    /// Email debounce window as a std duration
    pub fn email_debounce_window(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.email_debounce_mins * 60)
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Schema applied at pool creation. `CREATE TABLE IF NOT EXISTS`
/// throughout, so reconnecting to an existing file is a no-op.
const SCHEMA: &str = include_str!("schema.sql");

/// Connect to the database and initialize the schema.
///
/// A single connection keeps the embedded engine's writes serialized,
/// which is the concurrency model the stores assume, and makes
/// `sqlite::memory:` behave as one database rather than one per
/// pooled connection.
pub async fn connect_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        // Never recycle the connection: an in-memory database lives and
        // dies with it
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(database_url)
        .await?;

    sqlx::query("PRAGMA foreign_keys=ON").execute(&pool).await?;
    sqlx::raw_sql(SCHEMA).execute(&pool).await?;

    Ok(pool)
}
