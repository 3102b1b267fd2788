//! Analysis API key resolution
//!
//! Two-tier resolution with environment over config file. Both tiers being
//! set is worth a warning: it usually means a stale key is still sitting in
//! the TOML file.

use rosterlink_common::config::GatewayConfig;
use tracing::{info, warn};

/// Environment variable carrying the analysis API key (highest priority)
pub const ANALYSIS_API_KEY_ENV: &str = "ROSTERLINK_ANALYSIS_API_KEY";

/// Resolve the analysis API key: environment variable first, then the
/// `analysis.api_key` TOML field. Placeholder values count as unset.
pub fn resolve_analysis_api_key(config: &GatewayConfig) -> Option<String> {
    let env_key = std::env::var(ANALYSIS_API_KEY_ENV)
        .ok()
        .filter(|key| is_valid_key(key));
    let toml_key = config
        .analysis
        .api_key
        .clone()
        .filter(|key| is_valid_key(key));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "Analysis API key found in both {} and the config file; using the environment value",
            ANALYSIS_API_KEY_ENV
        );
    }

    if let Some(key) = env_key {
        info!("Analysis API key loaded from environment variable");
        return Some(key);
    }
    if let Some(key) = toml_key {
        info!("Analysis API key loaded from config file");
        return Some(key);
    }

    info!("Analysis API key not configured; ranking requests will report an error payload");
    None
}

fn is_valid_key(key: &str) -> bool {
    let trimmed = key.trim();
    !trimmed.is_empty() && trimmed != "your-api-key-here"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_keys_count_as_unset() {
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
        assert!(!is_valid_key("your-api-key-here"));
        assert!(is_valid_key("sk-real-key"));
    }
}
