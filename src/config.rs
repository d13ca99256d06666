//! Configuration files shipped with the application.
//!
//! Both files live under `<install dir>/Config/`. The main file names the catalog
//! database; the external-service file is handed to the UI untouched.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Overrides the installation directory, used by tests and portable installs.
pub const HOME_ENV: &str = "OURLIBRARY_HOME";
pub const CONFIG_DIR: &str = "Config";
pub const MAIN_CONFIG_FILE: &str = "ourlibrary_config.json";
pub const EXTERNAL_CONFIG_FILE: &str = "ourlibrary_google_config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} does not name a local database", path.display())]
    EmptyDatabasePath { path: PathBuf },
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    pub local_database_path: PathBuf,
    /// Grants the UI the raw `query` operation.
    #[serde(default = "default_allow_raw_query")]
    pub allow_raw_query: bool,
}

fn default_allow_raw_query() -> bool {
    true
}

/// Locations derived from the installation directory.
///
/// Config files are always read from `<install dir>/Config/`. A relative catalog
/// path is anchored at the writable data directory when there is one, otherwise
/// at the installation directory.
#[derive(Debug, Clone)]
pub struct AppPaths {
    install_dir: PathBuf,
    data_dir: Option<PathBuf>,
}

impl AppPaths {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            data_dir: None,
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(data_dir.into());
        self
    }

    /// `OURLIBRARY_HOME` when set, otherwise the directory holding the executable.
    /// Used by the command-line tools, which run from an unpacked install.
    pub fn resolve() -> std::io::Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV) {
            return Ok(Self::new(home));
        }
        let exe = std::env::current_exe()?;
        let dir = exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::new(dir))
    }

    /// Paths for the windowed app: config from the bundle's resource directory,
    /// catalog under the per-user data directory. `OURLIBRARY_HOME` still wins.
    pub fn for_bundle(resource_dir: PathBuf, app_data_dir: Option<PathBuf>) -> Self {
        Self::bundled(std::env::var_os(HOME_ENV), resource_dir, app_data_dir)
    }

    fn bundled(
        home: Option<OsString>,
        resource_dir: PathBuf,
        app_data_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(home) = home {
            return Self::new(home);
        }
        let paths = Self::new(resource_dir);
        match app_data_dir {
            Some(dir) => paths.with_data_dir(dir),
            None => paths,
        }
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    pub fn main_config(&self) -> PathBuf {
        self.install_dir.join(CONFIG_DIR).join(MAIN_CONFIG_FILE)
    }

    pub fn external_config(&self) -> PathBuf {
        self.install_dir.join(CONFIG_DIR).join(EXTERNAL_CONFIG_FILE)
    }

    pub fn database_path(&self, config: &LibraryConfig) -> PathBuf {
        if config.local_database_path.is_absolute() {
            return config.local_database_path.clone();
        }
        self.data_dir
            .as_deref()
            .unwrap_or(&self.install_dir)
            .join(&config.local_database_path)
    }

    /// Creates the catalog's parent directory inside the data directory.
    ///
    /// Installs without a data directory are left untouched; a missing catalog
    /// directory there means the catalog is unavailable.
    pub fn prepare_database_dir(&self, config: &LibraryConfig) -> std::io::Result<()> {
        if self.data_dir.is_none() || config.local_database_path.is_absolute() {
            return Ok(());
        }
        match self.database_path(config).parent() {
            Some(parent) => fs::create_dir_all(parent),
            None => Ok(()),
        }
    }
}

fn read_json(path: &Path) -> Result<Value, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_library_config(paths: &AppPaths) -> Result<LibraryConfig, ConfigError> {
    let path = paths.main_config();
    let value = read_json(&path)?;
    let config: LibraryConfig =
        serde_json::from_value(value).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
    if config.local_database_path.as_os_str().is_empty() {
        return Err(ConfigError::EmptyDatabasePath { path });
    }
    Ok(config)
}

/// Reads the external-service configuration verbatim.
pub fn load_external_config(paths: &AppPaths) -> Result<Value, ConfigError> {
    read_json(&paths.external_config())
}
