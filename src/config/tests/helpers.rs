//! Shared fixtures and helper functions for config tests.

use std::sync::Arc;

use ortho_config::MergeComposer;
use rstest::fixture;

use crate::config::AppConfig;

/// Fixture providing an `AppConfig` parsed from a full TOML example.
#[fixture]
pub fn app_config_from_full_toml() -> AppConfig {
    let toml = r#"
        engine_socket = "unix:///run/docker.sock"

        [network]
        name = "edge"

        [sites]
        base_dir = "/srv/sites"
        seed_default_content = false

        [proxy]
        entrypoint = "https"
        cert_resolver = "staging"

        [timeouts]
        provision_secs = 60
        action_secs = 15
        inventory_secs = 3

        [log]
        level = "debug"
        json = true
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Fixture providing an `AppConfig` parsed from a minimal TOML example.
#[fixture]
pub fn app_config_from_partial_toml() -> AppConfig {
    let toml = r#"
        engine_socket = "unix:///tmp/docker.sock"

        [timeouts]
        action_secs = 20
    "#;

    toml::from_str(toml).expect("TOML parsing should succeed")
}

/// Helper: Creates a `MergeComposer` with defaults layer already pushed.
pub fn create_composer_with_defaults() -> Result<MergeComposer, serde_json::Error> {
    let mut composer = MergeComposer::new();
    let defaults = ortho_config::serde_json::to_value(AppConfig::default())?;
    composer.push_defaults(defaults);
    Ok(composer)
}

/// Helper: Merges layers from a composer into `AppConfig`.
pub fn merge_config(composer: MergeComposer) -> Result<AppConfig, Arc<ortho_config::OrthoError>> {
    AppConfig::merge_from_layers(composer.layers())
}

/// Helper: Asserts that a config has all default values.
pub fn assert_config_has_defaults(config: &AppConfig) {
    assert!(
        config.engine_socket.is_none(),
        "engine_socket should be None"
    );
    assert_eq!(config.network.name, "docklite_network");
    assert_eq!(config.sites.base_dir.as_str(), "/var/www/sites");
    assert!(config.sites.seed_default_content);
    assert_eq!(config.proxy.entrypoint, "websecure");
    assert_eq!(config.proxy.cert_resolver, "letsencrypt");
    assert_eq!(config.timeouts.provision_secs, 30);
    assert_eq!(config.timeouts.action_secs, 10);
    assert_eq!(config.timeouts.inventory_secs, 5);
    assert_eq!(config.log.level, "info");
    assert!(!config.log.json);
}

/// Helper: Creates a `MergeComposer` with defaults, file, and env layers.
pub fn create_composer_with_file_and_env() -> Result<MergeComposer, serde_json::Error> {
    use ortho_config::serde_json::json;

    let mut composer = create_composer_with_defaults()?;

    composer.push_file(
        json!({
            "engine_socket": "unix:///from/file.sock",
            "network": { "name": "file_network" }
        }),
        None,
    );

    composer.push_environment(json!({
        "engine_socket": "unix:///from/env.sock"
    }));

    Ok(composer)
}
