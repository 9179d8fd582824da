use serde::{Deserialize, Serialize};

/// Access code used when no teacher access configuration can be read.
pub const DEFAULT_TEACHER_ACCESS_CODE: &str = "2580";

/// Keys of the singleton documents in the config collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Notifications,
    TeacherAuth,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Notifications => "notifications",
            ConfigKey::TeacherAuth => "teacher_auth",
        }
    }
}

/// Outbound webhook settings for new-submission alerts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl NotificationConfig {
    /// Enabled and pointing somewhere.
    pub fn is_active(&self) -> bool {
        self.is_enabled && !self.webhook_url.trim().is_empty()
    }
}

/// Shared code that unlocks the teacher referral form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TeacherAuthConfig {
    pub password: String,
}

impl Default for TeacherAuthConfig {
    fn default() -> Self {
        Self {
            password: DEFAULT_TEACHER_ACCESS_CODE.to_string(),
        }
    }
}

impl TeacherAuthConfig {
    /// Exact string comparison; no trimming or case folding.
    pub fn accepts(&self, code: &str) -> bool {
        self.password == code
    }
}
