//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CanopyConfig;
use crate::config::secret::secret_string;
use crate::domain::errors::CanopyError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CanopyConfig
/// 4. Applies environment variable overrides (CANOPY_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use canopy::config::loader::load_config;
///
/// let config = load_config("canopy.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CanopyConfig> {
    let path = path.as_ref();

    // Check if file exists
    if !path.exists() {
        return Err(CanopyError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    // Read file contents
    let contents = fs::read_to_string(path).map_err(|e| {
        CanopyError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    // Perform environment variable substitution
    let contents = substitute_env_vars(&contents)?;

    // Parse TOML
    let mut config: CanopyConfig = toml::from_str(&contents)
        .map_err(|e| CanopyError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    // Apply environment variable overrides
    apply_env_overrides(&mut config)?;

    // Validate configuration
    config.validate().map_err(|e| {
        CanopyError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Arguments
///
/// * `input` - String containing ${VAR} placeholders
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        // Process non-comment lines for env var substitution
        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CanopyError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using CANOPY_* prefix
///
/// Environment variables follow the pattern: CANOPY_<SECTION>_<KEY>
/// For example: CANOPY_FREIDATA_BASE_URL, CANOPY_PUBLISH_WORK_DIR
///
/// # Arguments
///
/// * `config` - Mutable reference to the configuration to update
fn apply_env_overrides(config: &mut CanopyConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("CANOPY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // FreiData overrides
    if let Ok(val) = std::env::var("CANOPY_FREIDATA_BASE_URL") {
        config.freidata.base_url = val;
    }
    if let Ok(val) = std::env::var("CANOPY_FREIDATA_TOKEN") {
        config.freidata.token = secret_string(val);
    }
    if let Ok(val) = std::env::var("CANOPY_FREIDATA_TLS_VERIFY") {
        config.freidata.tls_verify = val.parse().unwrap_or(true);
    }

    // Bundler overrides (only if the bundler is configured)
    if let Some(ref mut bundler) = config.bundler {
        if let Ok(val) = std::env::var("CANOPY_BUNDLER_BASE_URL") {
            bundler.base_url = val;
        }
        if let Ok(val) = std::env::var("CANOPY_BUNDLER_POLL_INTERVAL_SECONDS") {
            if let Ok(interval) = val.parse() {
                bundler.poll_interval_seconds = interval;
            }
        }
        if let Ok(val) = std::env::var("CANOPY_BUNDLER_POLL_DEADLINE_SECONDS") {
            if let Ok(deadline) = val.parse() {
                bundler.poll_deadline_seconds = deadline;
            }
        }
    }

    // Database overrides
    if let Ok(val) = std::env::var("CANOPY_DATABASE_CONNECTION_STRING") {
        config.database.connection_string = secret_string(val);
    }
    if let Ok(val) = std::env::var("CANOPY_DATABASE_MAX_CONNECTIONS") {
        if let Ok(max) = val.parse() {
            config.database.max_connections = max;
        }
    }

    // Publish overrides
    if let Ok(val) = std::env::var("CANOPY_PUBLISH_WORK_DIR") {
        config.publish.work_dir = val;
    }
    if let Ok(val) = std::env::var("CANOPY_PUBLISH_OVERWRITE_REMOTE_FILES") {
        config.publish.overwrite_remote_files = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("CANOPY_PUBLISH_CLEAN_ARCHIVES") {
        config.publish.clean_archives = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("CANOPY_PUBLISH_COMMUNITY") {
        config.publish.community = Some(val);
    }
    if let Ok(val) = std::env::var("CANOPY_PUBLISH_SUBMIT_REVIEW") {
        config.publish.submit_review = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("CANOPY_PUBLISH_PUBLISH_RECORD") {
        config.publish.publish_record = val.parse().unwrap_or(false);
    }

    // Zulip overrides (only if Zulip is configured)
    if let Some(ref mut zulip) = config.zulip {
        if let Ok(val) = std::env::var("CANOPY_ZULIP_BASE_URL") {
            zulip.base_url = val;
        }
        if let Ok(val) = std::env::var("CANOPY_ZULIP_EMAIL") {
            zulip.email = val;
        }
        if let Ok(val) = std::env::var("CANOPY_ZULIP_API_KEY") {
            zulip.api_key = secret_string(val);
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CANOPY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("CANOPY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
