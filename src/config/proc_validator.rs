//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks endpoints, schedule, signing secret, server and logging invariants

use tracing::{error, info};

use crate::auth::key::MIN_SECRET_BYTES;
use crate::config::service::{AuthConfig, AuthorityConfig, IdentityConfig, ServiceConfig, SyncConfig};
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let errors = collect_errors(cfg);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

pub fn collect_errors(cfg: &ServiceConfig) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_identity(&cfg.identity, &mut errors);
    validate_authority(&cfg.authority, &mut errors);
    validate_sync(&cfg.sync, &mut errors);
    validate_auth(&cfg.auth, &mut errors);

    errors
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_identity(identity: &IdentityConfig, errors: &mut Vec<String>) {
    validate_http_url("identity.login_url", &identity.login_url, errors);
    if identity.username.trim().is_empty() {
        errors.push("identity.username must not be empty".to_string());
    }
    if identity.password.is_empty() {
        errors.push("identity.password must not be empty".to_string());
    }
}

fn validate_authority(authority: &AuthorityConfig, errors: &mut Vec<String>) {
    validate_http_url("authority.base_url", &authority.base_url, errors);
    if authority.snapshot_path.trim().is_empty() {
        errors.push("authority.snapshot_path must not be empty".to_string());
    }
    if authority.timeout_ms == Some(0) {
        errors.push("authority.timeout_ms must be > 0 when set".to_string());
    }
}

fn validate_sync(sync: &SyncConfig, errors: &mut Vec<String>) {
    if sync.rate_ms == 0 {
        errors.push("sync.rate_ms must be > 0".to_string());
    }
}

fn validate_auth(auth: &AuthConfig, errors: &mut Vec<String>) {
    if auth.jwt_secret.len() < MIN_SECRET_BYTES {
        errors.push(format!(
            "auth.jwt_secret must be at least {} bytes, got {}",
            MIN_SECRET_BYTES,
            auth.jwt_secret.len()
        ));
    }
    if auth.token_ttl_seconds == 0 {
        errors.push("auth.token_ttl_seconds must be > 0".to_string());
    }
}

fn validate_http_url(path: &str, url: &str, errors: &mut Vec<String>) {
    match reqwest::Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
        Ok(parsed) => errors.push(format!(
            "{} '{}' must use http or https, got '{}'",
            path,
            url,
            parsed.scheme()
        )),
        Err(e) => errors.push(format!("{} '{}' is not a valid URL: {}", path, url, e)),
    }
}
