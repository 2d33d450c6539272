//! Subcommand handlers and the setup they share.
pub mod sync;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Layout;
use crate::destinations::{EnvInstallRoot, InstallRootLocator};
use crate::logging::Logger;

/// Shared state produced by the common command setup sequence.
///
/// Resolves the working directory, loads and validates the layout, and
/// locates the SDK root so a command can start running stages.
#[derive(Debug)]
pub struct CommandSetup {
    /// Canonical working directory holding `source/` and `bin/`.
    pub working_dir: PathBuf,
    /// Loaded distribution layout.
    pub layout: Layout,
    /// Canonical SDK installation root.
    pub sdk_root: PathBuf,
}

impl CommandSetup {
    /// Resolve paths and load the layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory or SDK root cannot be
    /// resolved, or the layout file fails to load.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        Self::init_with(global, &EnvInstallRoot::from_env(global.sdks.clone()), log)
    }

    /// [`init`](Self::init) with an explicit install-root locator.
    ///
    /// # Errors
    ///
    /// Same as [`init`](Self::init).
    pub fn init_with(
        global: &GlobalOpts,
        locator: &dyn InstallRootLocator,
        log: &Logger,
    ) -> Result<Self> {
        let working_dir = resolve_root(global)?;
        log.info(&format!("working directory: {}", working_dir.display()));

        log.stage("Loading layout");
        let layout = Layout::resolve(&working_dir, global.config.as_deref())?;
        log.info(&format!(
            "{} platforms, {} special headers",
            layout.platforms.len(),
            layout.special_headers.len()
        ));

        let warnings = layout.validate();
        if !warnings.is_empty() {
            log.warn(&format!("found {} layout warning(s):", warnings.len()));
            for warning in &warnings {
                log.warn(&format!("  [{}]: {}", warning.item, warning.message));
            }
        }

        let sdk_root = locator.locate()?;
        log.info(&format!("SDK root: {}", sdk_root.display()));

        Ok(Self {
            working_dir,
            layout,
            sdk_root,
        })
    }
}

/// Resolve the working directory from `--root`, else the current directory.
///
/// # Errors
///
/// Returns an error if the directory does not exist or cannot be resolved.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let root = match &global.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    anyhow::ensure!(root.is_dir(), "working directory not found: {}", root.display());
    dunce::canonicalize(&root)
        .with_context(|| format!("cannot resolve working directory: {}", root.display()))
}
