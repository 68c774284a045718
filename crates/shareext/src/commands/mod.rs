//! Command implementations

pub mod apply;
pub mod identity;
pub mod version;

use crate::cli::ProjectArgs;
use anyhow::{Context, Result};
use shareext_core::{resolve_request, AppConfigFile, ModRequest};

/// Load the app configuration and resolve the generation request
pub(crate) fn load_project(args: &ProjectArgs) -> Result<(AppConfigFile, ModRequest)> {
    let file = AppConfigFile::load(args.app_config.as_deref())
        .context("Failed to load app configuration")?;

    let platform_root = args
        .platform_root
        .clone()
        .unwrap_or_else(|| file.default_platform_root());
    let request = resolve_request(&platform_root, args.project_name.as_deref())
        .with_context(|| format!("Failed to locate the Xcode project in {}", platform_root))?;

    Ok((file, request))
}
