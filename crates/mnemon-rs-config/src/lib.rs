//! Configuration models and file loading for Mnemon.
//!
//! This crate owns the Mnemon config schema and the JSON5 loader used by
//! the server binary and SDK consumers.

mod error;
mod model;

/// Public error type returned by config loading APIs.
pub use error::ConfigError;
/// Configuration schema models.
pub use model::*;

use directories::UserDirs;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config directory under the user's home.
pub const DEFAULT_CONFIG_DIR: &str = ".mnemon";
/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.json5";

/// Load a config file from disk.
pub fn load_config(path: &Path) -> Result<MnemonConfig, ConfigError> {
    debug!("loading config (path={})", path.display());
    let contents = fs::read_to_string(path)?;
    let config: MnemonConfig = json5::from_str(&contents)?;
    Ok(config)
}

/// Load config from an explicit path, or the default user config when it
/// exists, or built-in defaults otherwise.
pub fn load_config_or_default(path: Option<&Path>) -> Result<MnemonConfig, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }
    if let Some(path) = default_user_config_path()
        && path.exists()
    {
        return load_config(&path);
    }
    debug!("no config file found, using defaults");
    Ok(MnemonConfig::default())
}

/// Default user config path under the home directory.
pub fn default_user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}

#[cfg(test)]
mod tests {
    use super::{MnemonConfig, load_config, load_config_or_default};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn defaults_select_offline_providers() {
        let config = MnemonConfig::default();
        assert_eq!(config.embedder.provider, "hash");
        assert_eq!(config.embedder.dimensions, 384);
        assert_eq!(config.vector_store.provider, "memory");
        assert_eq!(config.graph_store.provider, "noop");
        assert_eq!(config.memory.search_limit, 10);
        assert_eq!(config.memory.query_window, 6);
    }

    #[test]
    fn builder_overrides_sections() {
        let config = MnemonConfig::builder()
            .memory(super::MemorySettings {
                search_limit: 3,
                ..super::MemorySettings::default()
            })
            .build();
        assert_eq!(config.memory.search_limit, 3);
        assert_eq!(config.memory.query_window, 6);
    }

    #[test]
    fn load_config_parses_json5() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.json5");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(
            file,
            "{{ embedder: {{ provider: 'hash', dimensions: 8 }}, server: {{ port: 9000 }} }}"
        )
        .expect("write");

        let config = load_config(&path).expect("load");
        assert_eq!(config.embedder.dimensions, 8);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("absent.json5");
        assert!(load_config_or_default(Some(&path)).is_err());
    }
}
