use crate::app_config::AppConfig;
use crate::error::ConfigError;

/// Load configuration from environment variables, reading `.env` first.
///
/// # Errors
///
/// Returns `ConfigError` if an env var is present but unparseable, or the
/// delay range is inverted.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load configuration from env vars already in the process (no `.env` read).
///
/// # Errors
///
/// Returns `ConfigError` if an env var is present but unparseable, or the
/// delay range is inverted.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup, decoupled from the
/// real environment so tests can pass a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let log_level = or_default("IDEAPROBE_LOG_LEVEL", "info");
    let user_agent = or_default("IDEAPROBE_USER_AGENT", "ideaprobe/0.1 (idea-validation)");
    let max_concurrent_sources = parse_usize("IDEAPROBE_MAX_CONCURRENT_SOURCES", "5")?;
    let total_timeout_secs = parse_u64("IDEAPROBE_TOTAL_TIMEOUT_SECS", "300")?;
    let request_timeout_secs = parse_u64("IDEAPROBE_REQUEST_TIMEOUT_SECS", "30")?;
    let inter_query_delay_min_ms = parse_u64("IDEAPROBE_DELAY_MIN_MS", "1000")?;
    let inter_query_delay_max_ms = parse_u64("IDEAPROBE_DELAY_MAX_MS", "3000")?;
    let detail_fetch_pause_ms = parse_u64("IDEAPROBE_DETAIL_FETCH_PAUSE_MS", "500")?;
    let max_retries = parse_u32("IDEAPROBE_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("IDEAPROBE_RETRY_BACKOFF_BASE_SECS", "1")?;
    let max_keywords = parse_usize("IDEAPROBE_MAX_KEYWORDS", "10")?;

    if max_concurrent_sources == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "IDEAPROBE_MAX_CONCURRENT_SOURCES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if inter_query_delay_max_ms < inter_query_delay_min_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "IDEAPROBE_DELAY_MAX_MS".to_string(),
            reason: "must be >= IDEAPROBE_DELAY_MIN_MS".to_string(),
        });
    }

    Ok(AppConfig {
        log_level,
        user_agent,
        max_concurrent_sources,
        total_timeout_secs,
        request_timeout_secs,
        inter_query_delay_min_ms,
        inter_query_delay_max_ms,
        detail_fetch_pause_ms,
        max_retries,
        retry_backoff_base_secs,
        max_keywords,
    })
}
