//! Pairchat configuration system.
//!
//! Provides TOML-based configuration for the relay server with full
//! validation. All config sections use sensible defaults so partial
//! configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pairchat_config::load_config;
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("listening on {}", config.server.listen_addr());
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    BrokerConfig, LoggingConfig, NicknameConfig, PairchatConfig, PolicyConfig, ServerConfig,
};

use pairchat_common::ConfigError;
use std::path::Path;

/// Load config from `path`, or from the platform default path when `None`.
///
/// Unlike [`toml_loader::load_from_path`], a config that fails validation
/// is a hard error here: the server must not start on bad limits.
pub fn load_config(path: Option<&Path>) -> Result<PairchatConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };

    validation::validate(&config)?;
    Ok(config)
}
