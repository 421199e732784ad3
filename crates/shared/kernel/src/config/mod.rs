use config::{Config, Environment, File, Map};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "LYCEUM";
/// File used when the caller does not name one (any extension `config` understands).
pub const DEFAULT_CONFIG_FILE: &str = "lyceum";

/// Configuration loading failures.
#[lyceum_derive::lyceum_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a configuration file overlaid with `LYCEUM__*` environment variables.
///
/// Nested keys use a double underscore: `LYCEUM__DATABASE__URL` overrides `database.url`.
/// Without a path the `lyceum` file in the working directory is used.
///
/// # Errors
/// Returns [`ConfigError::Config`] when the file is missing or unreadable, or when the
/// merged settings do not deserialize into `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_with_environment(path, None)
}

/// Loads `T` with `vars` standing in for the process environment when given.
fn load_with_environment<T>(
    path: Option<impl AsRef<Path>>,
    vars: Option<Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    info!(path = %path.display(), "Loading configuration");

    Config::builder()
        .add_source(File::from(path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("superadmins")
                .source(vars),
        )
        .build()
        .context(format!("Reading {}", path.display()))?
        .try_deserialize::<T>()
        .context("Deserializing configuration")
}
