use shared_types::{AppConfig, FeatureFlags};
use std::sync::OnceLock;

static FLAGS: OnceLock<FeatureFlags> = OnceLock::new();

/// Path to the config file, relative to the project root.
const CONFIG_PATH: &str = "config.toml";

/// Read an environment variable, treating unset, blank, and the literal
/// `undefined` (left behind by some deploy templates) as absent.
pub fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "undefined")
}

/// Parse an environment variable, falling back to `default` when absent or invalid.
pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_value(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Read `config.toml`, parse feature flags, and store them in the global
/// `OnceLock`. Only the first call has effect.
///
/// If the file is missing or unparseable, all flags default to `false`.
pub fn load_feature_flags() {
    FLAGS.get_or_init(|| read_feature_flags(CONFIG_PATH));
}

fn read_feature_flags(path: &str) -> FeatureFlags {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let config: AppConfig = toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path, error = %e, "Failed to parse config, defaulting all flags off");
                AppConfig::default()
            });
            tracing::info!(flags = ?config.features, "Feature flags loaded");
            config.features
        }
        Err(e) => {
            tracing::info!(path, error = %e, "Config file not found, defaulting all flags off");
            FeatureFlags::default()
        }
    }
}

/// Get the loaded feature flags. Returns all-false defaults if
/// `load_feature_flags()` hasn't been called yet.
pub fn feature_flags() -> &'static FeatureFlags {
    static DEFAULT: FeatureFlags = FeatureFlags {
        telemetry: false,
        api_docs: false,
    };
    FLAGS.get().unwrap_or(&DEFAULT)
}
