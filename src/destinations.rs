//! Per-platform destination folders and SDK root discovery.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

/// Environment variable naming the SDK installation root.
pub const SDKS_ENV_VAR: &str = "BURGER_SDKS";

/// One target installation folder: `<sdk root>/<platform>/<subdir>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Platform tag (e.g. `"windows"`, `"mac"`).
    pub platform: String,
    /// Absolute folder the artifacts are deployed into.
    pub folder: PathBuf,
}

impl Destination {
    /// Build the destination for `platform` under `sdk_root`.
    #[must_use]
    pub fn new(sdk_root: &Path, platform: &str, subdir: &str) -> Self {
        Self {
            platform: platform.to_string(),
            folder: sdk_root.join(platform).join(subdir),
        }
    }

    /// Where a file named `filename` lives inside this destination.
    #[must_use]
    pub fn file(&self, filename: &Path) -> PathBuf {
        self.folder.join(filename)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.platform, self.folder.display())
    }
}

/// Build the ordered destination list for `platforms`.
///
/// Order follows `platforms` exactly; it is the order writes are attempted.
#[must_use]
pub fn destinations_for(sdk_root: &Path, platforms: &[String], subdir: &str) -> Vec<Destination> {
    platforms
        .iter()
        .map(|p| Destination::new(sdk_root, p, subdir))
        .collect()
}

/// Finds the SDK installation root all destinations hang off.
pub trait InstallRootLocator: fmt::Debug {
    /// Locate the installation root.
    ///
    /// # Errors
    ///
    /// Returns an error if no root is configured or it is not a directory.
    fn locate(&self) -> Result<PathBuf, SyncError>;
}

/// Resolves the root from an explicit path, else from [`SDKS_ENV_VAR`].
#[derive(Debug, Clone, Default)]
pub struct EnvInstallRoot {
    explicit: Option<PathBuf>,
    env_value: Option<String>,
}

impl EnvInstallRoot {
    /// Capture the explicit override and the current environment.
    #[must_use]
    pub fn from_env(explicit: Option<PathBuf>) -> Self {
        Self::new(explicit, std::env::var(SDKS_ENV_VAR).ok())
    }

    /// Build from already-known values.
    #[must_use]
    pub const fn new(explicit: Option<PathBuf>, env_value: Option<String>) -> Self {
        Self {
            explicit,
            env_value,
        }
    }
}

impl InstallRootLocator for EnvInstallRoot {
    fn locate(&self) -> Result<PathBuf, SyncError> {
        let root = self
            .explicit
            .clone()
            .or_else(|| {
                self.env_value
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .map(PathBuf::from)
            })
            .ok_or_else(|| {
                SyncError::fs(
                    "locate SDK root",
                    format!("${SDKS_ENV_VAR}"),
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("use --sdks or set {SDKS_ENV_VAR}"),
                    ),
                )
            })?;
        if !root.is_dir() {
            return Err(SyncError::fs(
                "locate SDK root",
                root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }
        dunce::canonicalize(&root).map_err(|e| SyncError::fs("resolve SDK root", root, e))
    }
}
