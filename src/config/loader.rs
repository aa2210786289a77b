//! Configuration loading with layered precedence.
//!
//! Precedence, lowest to highest: application defaults, configuration file,
//! environment variables, command-line arguments.
//!
//! Layers are pushed onto a `MergeComposer` here instead of going through a
//! derived loader, since `Cli` also carries the subcommand. Typed variables
//! fail loudly: `DOCKLITE_LOG_JSON=maybe` is an error.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};

use crate::config::{AppConfig, Cli};
use crate::error::{ConfigError, Result};

/// How the raw text of an environment variable is decoded.
#[derive(Clone, Copy)]
enum EnvKind {
    Text,
    Flag,
    Seconds,
}

impl EnvKind {
    /// Decode `raw` for the variable `name`.
    fn decode(self, name: &str, raw: String) -> Result<Value> {
        let decoded = match self {
            Self::Text => return Ok(Value::String(raw)),
            Self::Flag => raw.parse::<bool>().ok().map(Value::Bool),
            Self::Seconds => raw.parse::<u64>().ok().map(|secs| Value::Number(secs.into())),
        };
        decoded.ok_or_else(|| {
            let expected = match self {
                Self::Flag => "bool (true/false)",
                Self::Seconds | Self::Text => "unsigned integer",
            };
            ConfigError::InvalidValue {
                field: String::from(name),
                reason: format!("expected {expected}, got '{raw}'"),
            }
            .into()
        })
    }
}

/// `DOCKLITE_*` variables, the config path each one sets, and its kind.
const ENV_TABLE: &[(&str, &[&str], EnvKind)] = &[
    ("DOCKLITE_ENGINE_SOCKET", &["engine_socket"], EnvKind::Text),
    ("DOCKLITE_NETWORK_NAME", &["network", "name"], EnvKind::Text),
    ("DOCKLITE_SITES_BASE_DIR", &["sites", "base_dir"], EnvKind::Text),
    (
        "DOCKLITE_SITES_SEED_DEFAULT_CONTENT",
        &["sites", "seed_default_content"],
        EnvKind::Flag,
    ),
    ("DOCKLITE_PROXY_ENTRYPOINT", &["proxy", "entrypoint"], EnvKind::Text),
    (
        "DOCKLITE_PROXY_CERT_RESOLVER",
        &["proxy", "cert_resolver"],
        EnvKind::Text,
    ),
    (
        "DOCKLITE_TIMEOUTS_PROVISION_SECS",
        &["timeouts", "provision_secs"],
        EnvKind::Seconds,
    ),
    (
        "DOCKLITE_TIMEOUTS_ACTION_SECS",
        &["timeouts", "action_secs"],
        EnvKind::Seconds,
    ),
    (
        "DOCKLITE_TIMEOUTS_INVENTORY_SECS",
        &["timeouts", "inventory_secs"],
        EnvKind::Seconds,
    ),
    ("DOCKLITE_LOG_LEVEL", &["log", "level"], EnvKind::Text),
    ("DOCKLITE_LOG_JSON", &["log", "json"], EnvKind::Flag),
];

/// Names of every environment variable the loader reads.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_TABLE.iter().map(|(name, _, _)| *name).collect()
}

/// Read `path` through a capability on its parent directory and push it as
/// the file layer.
fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path.parent().unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;

    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;

    let value =
        toml::from_str::<serde_json::Value>(&content).map_err(|e| ConfigError::ParseError {
            message: format!("failed to parse {path}: {e}"),
        })?;

    composer.push_file(value, Some(path.clone()));
    Ok(())
}

/// The file named by `--config` when it exists, otherwise the first
/// discovered candidate (`DOCKLITE_CONFIG_PATH`, XDG `docklite/config.toml`,
/// `.docklite.toml`).
fn locate_config_file(cli: &Cli) -> Option<Utf8PathBuf> {
    if let Some(explicit) = cli.config.as_ref().filter(|path| path.exists()) {
        return Some(explicit.clone());
    }
    ConfigDiscovery::builder("docklite")
        .env_var("DOCKLITE_CONFIG_PATH")
        .config_file_name("config.toml")
        .dotfile_name(".docklite.toml")
        .build()
        .candidates()
        .into_iter()
        .filter(|candidate| candidate.exists())
        .find_map(|candidate| Utf8PathBuf::try_from(candidate).ok())
}

/// Load the effective configuration for `cli`.
///
/// Defaults, then the configuration file, then `DOCKLITE_*` variables, then
/// command-line flags; each layer overrides the ones before it.
///
/// # Errors
///
/// `ConfigError` for an unreadable or malformed file, a typed variable that
/// does not parse, or a merged result that fails validation.
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(path) = locate_config_file(cli) {
        load_config_file(&path, &mut composer)?;
    }

    let env_layer = collect_env_vars()?;
    if !env_layer.is_empty() {
        composer.push_environment(Value::Object(env_layer));
    }

    if let Some(socket) = &cli.engine_socket {
        composer.push_cli(serde_json::json!({ "engine_socket": socket }));
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    config.validate()?;
    Ok(config)
}

/// Decode every set variable in [`ENV_TABLE`] into a nested JSON object.
fn collect_env_vars() -> Result<Map<String, Value>> {
    let mut root = Map::new();
    for &(name, path, kind) in ENV_TABLE {
        if let Ok(raw) = std::env::var(name) {
            insert_at_path(&mut root, path, kind.decode(name, raw)?);
        }
    }
    Ok(root)
}

/// Set `path` in `root` to `value`, creating objects along the way.
fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(String::from(segment))
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }

    current.insert(String::from(field), value);
}
