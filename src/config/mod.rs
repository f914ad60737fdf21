// src/config/mod.rs

//! Configuration loading and validation for vcsrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate durations and tool names, producing typed `RunnerOptions`
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, InteractiveSection, MAX_DURATION, RunnerOptions, RunnerSection, parse_duration,
};
pub use validate::validate_config;
