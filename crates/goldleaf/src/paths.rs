//! Resolves where goldleaf looks for its show configuration.
//!
//! `--config` wins, then `$GOLDLEAF_CONFIG_DIR/goldleaf.toml`, then the
//! platform config directory from `directories-next`.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "GOLDLEAF_CONFIG_DIR";
pub const CONFIG_FILE_NAME: &str = "goldleaf.toml";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "goldleaf";
const APPLICATION: &str = "goldleaf";

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn discover() -> Result<Self> {
        if let Some(config_dir) = env_override(ENV_CONFIG_DIR) {
            return Ok(Self { config_dir });
        }
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
            .ok_or_else(|| anyhow!("failed to determine user directories"))?;
        Ok(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// The file to load: an explicit path if given, the discovered one
    /// otherwise.
    pub fn resolve_config(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => self.config_file(),
        }
    }
}

fn env_override(name: &str) -> Option<PathBuf> {
    match env::var_os(name) {
        Some(value) if !value.as_os_str().is_empty() => Some(PathBuf::from(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn env_lock() -> &'static Mutex<()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    struct EnvGuard {
        key: &'static str,
        previous: Option<OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &Path) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, value);
            Self { key, previous }
        }

        fn set_empty(key: &'static str) -> Self {
            let previous = env::var_os(key);
            env::set_var(key, "");
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = self.previous.take() {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    #[test]
    fn env_override_takes_precedence() {
        let _lock = env_lock().lock().unwrap();
        let root = TempDir::new().unwrap();
        let _guard = EnvGuard::set(ENV_CONFIG_DIR, root.path());

        let paths = AppPaths::discover().unwrap();
        assert_eq!(paths.config_dir(), root.path());
        assert_eq!(paths.config_file(), root.path().join("goldleaf.toml"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let _lock = env_lock().lock().unwrap();
        let _guard = EnvGuard::set_empty(ENV_CONFIG_DIR);

        if let Ok(paths) = AppPaths::discover() {
            assert!(!paths.config_dir().as_os_str().is_empty());
        }
    }

    #[test]
    fn explicit_config_wins() {
        let paths = AppPaths {
            config_dir: PathBuf::from("/etc/goldleaf"),
        };
        assert_eq!(
            paths.resolve_config(Some(Path::new("show.toml"))),
            PathBuf::from("show.toml")
        );
        assert_eq!(
            paths.resolve_config(None),
            PathBuf::from("/etc/goldleaf/goldleaf.toml")
        );
    }
}
