//! Distribution layout: which artifacts exist and where they are deployed.
//!
//! The layout is read from an optional `sdkdist.toml` in the working
//! directory.  Every key is optional; anything left out falls back to the
//! built-in defaults in [`Layout::default`].
pub mod validation;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the optional layout file looked up in the working directory.
pub const CONFIG_FILE: &str = "sdkdist.toml";

/// Platform tags every shared artifact is fanned out to, in write order.
pub const DEFAULT_PLATFORMS: &[&str] = &[
    "windows", "dos", "mac", "macosx", "linux", "beos", "ps2", "ps3", "ps4", "gamecube", "wii",
    "dsi", "xbox", "xbox360", "xboxone", "ios", "android", "shield", "ouya",
];

/// Headers copied verbatim from `source/` to every platform.
pub const DEFAULT_SPECIAL_HEADERS: &[&str] = &[
    "brstartup.h",
    "brgl.h",
    "brglext.h",
    "brglut.h",
    "brglxext.h",
];

/// Which source-control backend handles tracked files and revision data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    /// Git when the working directory is in a repository, else Perforce.
    #[default]
    Auto,
    /// Always use git.
    Git,
    /// Always use Perforce.
    Perforce,
}

/// Where the aggregated super header comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuperHeader {
    /// Template fed to the expansion tool (relative to the working dir).
    pub template: PathBuf,
    /// Output written by the expansion tool (relative to the working dir).
    pub output: PathBuf,
    /// Template-expansion program.
    pub tool: String,
}

impl Default for SuperHeader {
    fn default() -> Self {
        Self {
            template: PathBuf::from("source/templateburgerbase.h"),
            output: PathBuf::from("bin/burger.h"),
            tool: "makeheader".to_string(),
        }
    }
}

/// Platform resource files deployed to a single platform only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Resources {
    /// Folder scanned for resource files (relative to the working dir).
    pub folder: PathBuf,
    /// The one platform tag that receives them.
    pub platform: String,
    /// File extension (without the dot), matched case-insensitively.
    pub extension: String,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("source/mac"),
            platform: "mac".to_string(),
            extension: "r".to_string(),
        }
    }
}

/// Complete distribution layout for one run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Platform tags, in the order destinations are written.
    pub platforms: Vec<String>,
    /// Folder under `<sdk root>/<platform>/` that receives the artifacts.
    pub sdk_subdir: String,
    /// Generated version header (relative to the working dir).
    pub version_header: PathBuf,
    /// Super header settings.
    pub super_header: SuperHeader,
    /// Header filenames under `source/` shared with every platform.
    pub special_headers: Vec<String>,
    /// Folder holding the special headers (relative to the working dir).
    pub special_header_folder: PathBuf,
    /// Single-platform resource settings.
    pub resources: Resources,
    /// Source-control backend.
    pub vcs: VcsKind,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            platforms: DEFAULT_PLATFORMS.iter().map(ToString::to_string).collect(),
            sdk_subdir: "burgerlib".to_string(),
            version_header: PathBuf::from("source/version.h"),
            super_header: SuperHeader::default(),
            special_headers: DEFAULT_SPECIAL_HEADERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            special_header_folder: PathBuf::from("source"),
            resources: Resources::default(),
            vcs: VcsKind::Auto,
        }
    }
}

impl Layout {
    /// Load the layout from `path`, or the defaults if `path` does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Parse a layout from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TOML or unknown keys.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from an explicit file, else `<working_dir>/sdkdist.toml`.
    ///
    /// An explicit file must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or any file fails to parse.
    pub fn resolve(working_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                anyhow::ensure!(
                    path.is_file(),
                    "config file not found: {}",
                    path.display()
                );
                Self::load(path)
            }
            None => Self::load(&working_dir.join(CONFIG_FILE)),
        }
    }
}
