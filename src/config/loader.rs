//! Configuration loading from process arguments.

use thiserror::Error;

use crate::config::schema::{BridgeConfig, Cli, DebugSettings, ListenerConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not parse debug settings '{raw}': {source}")]
    DebugSettings {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build and validate the configuration from parsed arguments.
pub fn load_config(cli: Cli) -> Result<BridgeConfig, ConfigError> {
    let debug = match cli.debug_settings.as_deref() {
        None | Some("") => DebugSettings::default(),
        Some(raw) => serde_json::from_str(raw).map_err(|source| ConfigError::DebugSettings {
            raw: raw.to_string(),
            source,
        })?,
    };

    let config = BridgeConfig {
        project_id: cli.project_id,
        gitlab_url: cli.gitlab_url,
        auth_token: cli.auth_token,
        debug,
        log_path: cli.log_path,
        listener: ListenerConfig {
            port: cli.port,
            ..ListenerConfig::default()
        },
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("gitlab-bridge").chain(args.iter().copied()))
    }

    #[test]
    fn test_positional_order() {
        let cli = parse(&[
            "group/project",
            "https://gitlab.com",
            "21036",
            "glpat-123",
            r#"{"request": true, "response": false}"#,
            "/tmp/bridge.log",
        ])
        .unwrap();
        let config = load_config(cli).unwrap();

        assert_eq!(config.project_id, "group/project");
        assert_eq!(config.gitlab_url, "https://gitlab.com");
        assert_eq!(config.listener.port, 21036);
        assert_eq!(config.auth_token, "glpat-123");
        assert_eq!(config.debug, DebugSettings { request: true, response: false });
        assert_eq!(config.log_path.as_deref(), Some(std::path::Path::new("/tmp/bridge.log")));
    }

    #[test]
    fn test_editor_debug_settings_keys() {
        let cli = parse(&[
            "1",
            "https://gitlab.com",
            "0",
            "token",
            r#"{"go_request": true, "go_response": true}"#,
        ])
        .unwrap();
        let config = load_config(cli).unwrap();
        assert_eq!(config.debug, DebugSettings { request: true, response: true });
    }

    #[test]
    fn test_optional_trailing_arguments() {
        let cli = parse(&["1", "https://gitlab.com", "0", "token"]).unwrap();
        let config = load_config(cli).unwrap();
        assert_eq!(config.debug, DebugSettings::default());
        assert!(config.log_path.is_none());
    }

    #[test]
    fn test_missing_token_is_fatal() {
        assert!(parse(&["1", "https://gitlab.com", "0"]).is_err());
    }

    #[test]
    fn test_empty_values_rejected() {
        let cli = parse(&["", "https://gitlab.com", "0", ""]).unwrap();
        match load_config(cli) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(
                    errors,
                    vec![ValidationError::EmptyProjectId, ValidationError::EmptyAuthToken]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_debug_settings() {
        let cli = parse(&["1", "https://gitlab.com", "0", "token", "{not json"]).unwrap();
        assert!(matches!(load_config(cli), Err(ConfigError::DebugSettings { .. })));
    }
}
