use dirs::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};

pub const HOME_ENV: &str = "BASKET_BUDGET_HOME";

const DEFAULT_DIR_NAME: &str = ".basket_budget";
const SESSION_FILE: &str = "session.json";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const RECEIPTS_DIR: &str = "receipts";

/// Resolves every on-disk location relative to one application directory.
pub struct PathResolver;

impl PathResolver {
    /// `BASKET_BUDGET_HOME` when set, otherwise `~/.basket_budget`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
        root.unwrap_or_else(Self::base_dir)
    }

    pub fn session_file_in(base: &Path) -> PathBuf {
        base.join(SESSION_FILE)
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }

    pub fn receipts_dir_in(base: &Path) -> PathBuf {
        base.join(RECEIPTS_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_hangs_off_the_base_dir() {
        let base = PathBuf::from("/tmp/basket");
        assert_eq!(
            PathResolver::session_file_in(&base),
            PathBuf::from("/tmp/basket/session.json")
        );
        assert_eq!(
            PathResolver::config_file_in(&base),
            PathBuf::from("/tmp/basket/config/config.json")
        );
        assert_eq!(
            PathResolver::receipts_dir_in(&base),
            PathBuf::from("/tmp/basket/receipts")
        );
        assert_eq!(
            PathResolver::resolve_base(Some(base.clone())),
            base
        );
    }
}
