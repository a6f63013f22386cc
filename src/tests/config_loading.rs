#[cfg(test)]
mod tests {

    use std::io::Write;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use crate::auth::issuer::IssuedClaims;
    use crate::config::proc_loader::{expand_env_vars, file_to_config, parse_config};
    use crate::config::service::{SNAPSHOT_PATH_DEFAULT, SYNC_INITIAL_DELAY_MS_DEFAULT, SYNC_RATE_MS_DEFAULT};
    use crate::config::settings::LogFormat;
    use crate::utils::logging::{resolve_logging_config, LogLevel};

    const VALID_YAML: &str = r#"
settings:
  server:
    host: "127.0.0.1"
    port: "8082"
  metrics:
    is_enabled: true
identity:
  login_url: "http://user-service/api/auth/login"
  username: "${CATALOG_SYNC_USERNAME:catalog-sync-agent}"
  password: "${CATALOG_SYNC_PASSWORD}"
authority:
  base_url: "http://admin-service/"
auth:
  jwt_secret: "${JWT_SECRET}"
"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp config");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[tokio::test]
    #[serial]
    async fn loads_file_with_env_expansion_and_defaults() {
        std::env::set_var("CATALOG_SYNC_PASSWORD", "machine-pass");
        std::env::set_var("JWT_SECRET", "a-signing-secret-that-is-long-enough!");
        std::env::remove_var("CATALOG_SYNC_USERNAME");

        let file = write_config(VALID_YAML);
        let config = file_to_config(file.path()).await.expect("config loads");

        assert_eq!(config.identity.username, "catalog-sync-agent");
        assert_eq!(config.identity.password, "machine-pass");
        assert_eq!(config.authority.base_url, "http://admin-service");
        assert_eq!(config.authority.snapshot_path, SNAPSHOT_PATH_DEFAULT);
        assert_eq!(
            config.authority.snapshot_url(),
            format!("http://admin-service{}", SNAPSHOT_PATH_DEFAULT)
        );
        assert_eq!(config.sync.rate_ms, SYNC_RATE_MS_DEFAULT);
        assert_eq!(config.sync.initial_delay_ms, SYNC_INITIAL_DELAY_MS_DEFAULT);
        assert_eq!(config.settings.metrics.path, "/metrics");
        assert_eq!(config.settings.server.bind_addr(), "127.0.0.1:8082");

        let logging = config.settings.logging.clone().expect("logging defaulted");
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Compact);

        std::env::remove_var("CATALOG_SYNC_PASSWORD");
        std::env::remove_var("JWT_SECRET");
    }

    #[tokio::test]
    #[serial]
    async fn cli_log_level_overrides_file() {
        std::env::set_var("CATALOG_SYNC_PASSWORD", "machine-pass");
        std::env::set_var("JWT_SECRET", "a-signing-secret-that-is-long-enough!");

        let config = parse_config(expand_env_vars(VALID_YAML).unwrap()).await.unwrap();
        assert_eq!(resolve_logging_config(&config, Some(LogLevel::DEBUG)).level, "debug");
        assert_eq!(resolve_logging_config(&config, None).level, "info");

        std::env::remove_var("CATALOG_SYNC_PASSWORD");
        std::env::remove_var("JWT_SECRET");
    }

    #[tokio::test]
    #[serial]
    async fn invalid_config_reports_all_errors() {
        let invalid_yaml = r#"
settings:
  server:
    host: ""
    port: "not-a-port"
  metrics:
    path: "metrics"
  logging:
    level: loud
    format: json
identity:
  login_url: "ftp://user-service/login"
  username: ""
  password: ""
authority:
  base_url: "admin-service"
  timeout_ms: 0
sync:
  rate_ms: 0
auth:
  jwt_secret: "short"
  token_ttl_seconds: 0
"#;

        let err = parse_config(invalid_yaml.to_owned()).await.unwrap_err().to_string();

        assert!(err.contains("config is not valid, total errors: 12"), "{}", err);
        for needle in [
            "settings.server.host",
            "settings.server.port",
            "settings.metrics.path",
            "settings.logging.level",
            "identity.login_url",
            "identity.username",
            "identity.password",
            "authority.base_url",
            "authority.timeout_ms",
            "sync.rate_ms",
            "auth.jwt_secret",
            "auth.token_ttl_seconds",
        ] {
            assert!(err.contains(needle), "missing '{}' in:\n{}", needle, err);
        }
    }

    #[tokio::test]
    #[serial]
    async fn configured_ttl_drives_issued_token_lifetime() {
        std::env::set_var("CATALOG_SYNC_PASSWORD", "machine-pass");
        std::env::set_var("JWT_SECRET", "a-signing-secret-that-is-long-enough!");
        let yaml = format!("{}  token_ttl_seconds: 600\n", VALID_YAML);

        let config = parse_config(expand_env_vars(&yaml).unwrap()).await.unwrap();
        assert_eq!(config.auth.token_ttl_seconds, 600);

        let token = config.auth.token_issuer().unwrap().issue("alice", &["ROLE_USER".to_owned()]).unwrap();
        let claims = jsonwebtoken::decode::<IssuedClaims>(
            &token,
            &config.auth.signing_key().unwrap().decoding_key(),
            &jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256),
        )
        .unwrap()
        .claims;
        assert_eq!(claims.exp - claims.iat, 600);

        std::env::remove_var("CATALOG_SYNC_PASSWORD");
        std::env::remove_var("JWT_SECRET");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let missing = std::path::Path::new("/definitely/not/here/catalog-replicator.yaml");
        assert!(file_to_config(missing).await.is_err());
    }

    #[test]
    #[serial]
    fn env_placeholders_use_defaults_when_unset() {
        std::env::remove_var("CATALOG_REPLICATOR_UNSET_VAR");
        std::env::set_var("CATALOG_REPLICATOR_SET_VAR", "from-env");

        let expanded = expand_env_vars(
            "a: ${CATALOG_REPLICATOR_UNSET_VAR:fallback}\nb: ${CATALOG_REPLICATOR_SET_VAR:ignored}\nc: ${CATALOG_REPLICATOR_UNSET_VAR}",
        )
        .unwrap();

        assert_eq!(expanded, "a: fallback\nb: from-env\nc: ");
        std::env::remove_var("CATALOG_REPLICATOR_SET_VAR");
    }
}
