// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::config::model::{ConfigFile, RunnerOptions};
use crate::config::validate::validate_config;
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `ConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// typed [`RunnerOptions`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: ConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<RunnerOptions> {
    let config = load_from_path(&path)?;
    validate_config(&config)
}

/// Load `path` if given; otherwise load the default config file if it
/// exists, falling back to built-in defaults.
///
/// An explicitly requested path that does not exist is an error.
pub fn load_or_default(path: Option<&Path>) -> Result<RunnerOptions> {
    match path {
        Some(p) => load_and_validate(p),
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                load_and_validate(&default_path)
            } else {
                debug!(path = ?default_path, "no config file found; using built-in defaults");
                validate_config(&ConfigFile::default())
            }
        }
    }
}

/// `Vcsrun.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Vcsrun.toml")
}
