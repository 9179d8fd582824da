use serde::{Deserialize, Serialize};

/// Feature flags controlling which optional server integrations are active.
///
/// Loaded from `config.toml` at server startup. Every field defaults to
/// `false` so that a missing or incomplete config file disables all
/// optional features.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FeatureFlags {
    /// Export request spans over OTLP.
    #[serde(default)]
    pub telemetry: bool,
    /// Serve the interactive API reference at `/docs`.
    #[serde(default)]
    pub api_docs: bool,
}

/// Top-level config file structure matching `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub features: FeatureFlags,
}
