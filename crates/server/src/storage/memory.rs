use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use shared_types::{AdminUser, ConfigKey, Record, RecordBody, Role, Status};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repo::admin_user::AdminAccount;

struct StoredRefreshToken {
    admin_id: i64,
    token_hash: String,
    expires_at: DateTime<Utc>,
    revoked: bool,
}

/// In-process backend. Nothing survives a restart.
pub struct MemoryStore {
    records: RwLock<HashMap<Role, Vec<Record>>>,
    config: RwLock<HashMap<ConfigKey, serde_json::Value>>,
    admins: RwLock<Vec<AdminAccount>>,
    refresh_tokens: RwLock<Vec<StoredRefreshToken>>,
    next_admin_id: AtomicI64,
    demo: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            config: RwLock::new(HashMap::new()),
            admins: RwLock::new(Vec::new()),
            refresh_tokens: RwLock::new(Vec::new()),
            next_admin_id: AtomicI64::new(1),
            demo: false,
        }
    }

    /// Demo store preloaded with `records`.
    pub fn demo(records: Vec<Record>) -> Self {
        let mut by_role: HashMap<Role, Vec<Record>> = HashMap::new();
        for record in records {
            by_role.entry(record.role()).or_default().push(record);
        }
        Self {
            records: RwLock::new(by_role),
            demo: true,
            ..Self::new()
        }
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    pub async fn create(&self, body: RecordBody) -> Record {
        let record = Record {
            id: Uuid::new_v4(),
            status: Status::Awaiting,
            created_at: Some(Utc::now()),
            body,
        };
        self.records
            .write()
            .await
            .entry(record.role())
            .or_default()
            .push(record.clone());
        record
    }

    pub async fn list_recent(&self, role: Role, limit: usize) -> Vec<Record> {
        let records = self.records.read().await;
        let mut rows = records.get(&role).cloned().unwrap_or_default();
        // Newest first; records without a timestamp sink to the bottom.
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        rows
    }

    pub async fn find(&self, role: Role, id: Uuid) -> Option<Record> {
        self.records
            .read()
            .await
            .get(&role)
            .and_then(|rows| rows.iter().find(|r| r.id == id).cloned())
    }

    pub async fn update_status(&self, role: Role, id: Uuid, status: Status) -> Option<Record> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&role)?.iter_mut().find(|r| r.id == id)?;
        record.status = status;
        Some(record.clone())
    }

    pub async fn delete(&self, role: Role, id: Uuid) -> bool {
        let mut records = self.records.write().await;
        let Some(rows) = records.get_mut(&role) else {
            return false;
        };
        let before = rows.len();
        rows.retain(|r| r.id != id);
        rows.len() != before
    }

    pub async fn config(&self, key: ConfigKey) -> Option<serde_json::Value> {
        self.config.read().await.get(&key).cloned()
    }

    pub async fn put_config(&self, key: ConfigKey, value: serde_json::Value) {
        self.config.write().await.insert(key, value);
    }

    pub async fn find_admin_by_email(&self, email: &str) -> Option<AdminAccount> {
        let email = email.trim().to_lowercase();
        self.admins
            .read()
            .await
            .iter()
            .find(|a| a.email == email)
            .cloned()
    }

    pub async fn find_admin(&self, id: i64) -> Option<AdminUser> {
        self.admins
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .map(AdminAccount::to_user)
    }

    pub async fn upsert_admin(&self, email: &str, password_hash: &str) -> AdminAccount {
        let email = email.trim().to_lowercase();
        let mut admins = self.admins.write().await;
        if let Some(existing) = admins.iter_mut().find(|a| a.email == email) {
            existing.password_hash = password_hash.to_string();
            return existing.clone();
        }
        let account = AdminAccount {
            id: self.next_admin_id.fetch_add(1, Ordering::SeqCst),
            email,
            password_hash: password_hash.to_string(),
        };
        admins.push(account.clone());
        account
    }

    pub async fn store_refresh_token(
        &self,
        admin_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) {
        let now = Utc::now();
        let mut tokens = self.refresh_tokens.write().await;
        tokens.retain(|t| !t.revoked && t.expires_at > now);
        tokens.push(StoredRefreshToken {
            admin_id,
            token_hash: token_hash.to_string(),
            expires_at,
            revoked: false,
        });
    }

    pub async fn consume_refresh_token(&self, admin_id: i64, token_hash: &str) -> bool {
        let now = Utc::now();
        let mut tokens = self.refresh_tokens.write().await;
        match tokens.iter_mut().find(|t| {
            t.token_hash == token_hash && t.admin_id == admin_id && !t.revoked && t.expires_at > now
        }) {
            Some(token) => {
                token.revoked = true;
                true
            }
            None => false,
        }
    }

    pub async fn revoke_refresh_tokens(&self, admin_id: i64) {
        for token in self
            .refresh_tokens
            .write()
            .await
            .iter_mut()
            .filter(|t| t.admin_id == admin_id)
        {
            token.revoked = true;
        }
    }
}
