pub mod cookies;
pub mod extractors;
pub mod jwt;
pub mod middleware;
pub mod password;

use shared_types::AppError;

use crate::config::env_value;
use crate::demo::{DEMO_ADMIN_EMAIL, DEMO_ADMIN_PASSWORD};
use crate::storage::RecordStore;

/// Role claim carried by administrator tokens.
pub const ADMIN_ROLE: &str = "admin";

/// Make sure the configured administrator account exists.
///
/// `ADMIN_EMAIL` plus `ADMIN_PASSWORD_HASH` (an argon2 PHC string, see the
/// `hash-password` binary) are upserted on every start so rotating the hash
/// only needs a restart. Demo mode falls back to a well-known account.
pub async fn bootstrap_admin(store: &RecordStore) -> Result<(), AppError> {
    match (env_value("ADMIN_EMAIL"), env_value("ADMIN_PASSWORD_HASH")) {
        (Some(email), Some(hash)) => {
            let account = store.upsert_admin(&email, &hash).await?;
            tracing::info!(admin_id = account.id, email = %account.email, "Administrator account ready");
        }
        _ if store.is_demo() => {
            let hash = password::hash_password(DEMO_ADMIN_PASSWORD)
                .map_err(|e| AppError::internal(format!("Failed to hash demo password: {e}")))?;
            store.upsert_admin(DEMO_ADMIN_EMAIL, &hash).await?;
            tracing::warn!(
                email = DEMO_ADMIN_EMAIL,
                "Demo mode: seeded the built-in administrator account"
            );
        }
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!("ADMIN_EMAIL and ADMIN_PASSWORD_HASH must be set together; skipping admin bootstrap");
        }
        (None, None) => {
            tracing::info!("No ADMIN_EMAIL configured; existing administrator accounts are used as-is");
        }
    }
    Ok(())
}
