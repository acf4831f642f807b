use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::Result;

pub const HOME_ENV_VAR: &str = "CONSCIENCE_HOME";
const DEFAULT_DIR_NAME: &str = ".conscience";
const STATE_DIR: &str = "state";
const CONFIG_FILE: &str = "config.json";

/// Resolves every on-disk location relative to one application directory.
pub struct PathResolver;

impl PathResolver {
    /// Application data directory, defaulting to `~/.conscience`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV_VAR) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
        root.unwrap_or_else(Self::base_dir)
    }

    pub fn state_dir_in(base: &Path) -> PathBuf {
        base.join(STATE_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
