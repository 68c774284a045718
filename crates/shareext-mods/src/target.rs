//! Share extension target materialization
//!
//! Copies the host app's supporting sources into the extension directory,
//! registers the extension target with its build phases and group, and
//! patches the target's build settings.
//!
//! Re-running against a project that already has the target keeps the
//! existing target, phases and group. Files are copied again and build
//! settings are re-applied.

use crate::error::Result;
use crate::fs::{copy_dir_recursive, copy_file, ensure_dir, relative_to};
use crate::pipeline::ConfigMod;
use crate::scripts;
use shareext_core::{AppConfig, ExportedConfig, ExtensionIdentity};
use shareext_xcode::{BuildPhase, ObjectId, ProjectDescriptor, ShellScript, TargetKind};
use tracing::{debug, info, warn};

/// Launch screen storyboard copied from the host
pub const SPLASH_SCREEN: &str = "SplashScreen.storyboard";

/// App delegate header, registered in the group but not compiled
pub const APP_DELEGATE_HEADER: &str = "AppDelegate.h";

pub const APP_DELEGATE_IMPL: &str = "AppDelegate.mm";

pub const MAIN_IMPL: &str = "main.m";

/// Asset catalog copied recursively from the host
pub const ASSET_CATALOG: &str = "Images.xcassets";

/// Supporting plist registered in the extension group
pub const SUPPORTING_EXPO_PLIST: &str = "Supporting/Expo.plist";

/// Files copied one by one from the host app directory
pub const SUPPORTING_FILES: &[&str] = &[
    SPLASH_SCREEN,
    APP_DELEGATE_HEADER,
    APP_DELEGATE_IMPL,
    MAIN_IMPL,
];

/// Swift version set on the extension target
const SWIFT_VERSION: &str = "5.0";

/// iPhone and iPad
const TARGETED_DEVICE_FAMILY: &str = "1,2";

/// Creates the extension target in the project
#[derive(Debug, Default, Clone, Copy)]
pub struct ShareExtensionTarget;

impl ConfigMod for ShareExtensionTarget {
    fn name(&self) -> &'static str {
        "share-extension-target"
    }

    fn apply(
        &self,
        config: ExportedConfig,
        project: &mut dyn ProjectDescriptor,
    ) -> Result<ExportedConfig> {
        let identity = ExtensionIdentity::derive(&config)?;

        copy_supporting_files(&config, &identity)?;

        match project.find_target(&identity.name) {
            Some(existing) => {
                info!(
                    "Target {} already exists ({}), keeping its build phases and group",
                    identity.name, existing
                );
            }
            None => {
                let target =
                    project.add_target(&identity.name, TargetKind::AppExtension, &identity.name)?;
                add_build_phases(project, &target)?;
                info!("Registered target {} ({})", identity.name, target);
            }
        }

        register_group(project, &identity)?;

        let patched = apply_build_settings(project, &identity, &config.config);
        if patched == 0 {
            warn!(
                "No build configuration has PRODUCT_NAME {}; build settings were not applied",
                identity.name
            );
        }

        Ok(config)
    }
}

/// Copy host sources and the asset catalog into the extension directory
fn copy_supporting_files(config: &ExportedConfig, identity: &ExtensionIdentity) -> Result<()> {
    ensure_dir(&identity.target_path)?;

    let host_dir = config.request.host_app_dir();
    for file in SUPPORTING_FILES {
        copy_file(&host_dir.join(file), &identity.target_path)?;
    }
    copy_dir_recursive(&host_dir.join(ASSET_CATALOG), &identity.target_path)?;

    debug!("Copied host sources from {} to {}", host_dir, identity.target_path);
    Ok(())
}

/// Append the extension's build phases; the packager must start before bundling
fn add_build_phases(project: &mut dyn ProjectDescriptor, target: &ObjectId) -> Result<()> {
    project.add_build_phase(
        target,
        &BuildPhase::ShellScript(ShellScript::sh(scripts::START_PACKAGER)),
        "Start Packager",
        &[],
    )?;
    project.add_build_phase(target, &BuildPhase::Frameworks, "Frameworks", &[])?;
    project.add_build_phase(
        target,
        &BuildPhase::ShellScript(ShellScript::sh(scripts::BUNDLE_REACT_NATIVE)),
        "Bundle React Native code and images",
        &[],
    )?;
    project.add_build_phase(
        target,
        &BuildPhase::Sources,
        "Sources",
        &[APP_DELEGATE_IMPL, MAIN_IMPL],
    )?;
    project.add_build_phase(
        target,
        &BuildPhase::Resources,
        "Resources",
        &[SPLASH_SCREEN, ASSET_CATALOG],
    )?;
    Ok(())
}

/// Group the extension's non-compiled files in the project navigator
fn register_group(project: &mut dyn ProjectDescriptor, identity: &ExtensionIdentity) -> Result<()> {
    let group = match project.find_group(&identity.name) {
        Some(group) => group,
        None => project.create_group(&identity.name, &identity.name)?,
    };

    let target_path = &identity.target_path;
    let files = [
        relative_to(&identity.info_plist_file_path, target_path),
        SUPPORTING_EXPO_PLIST.to_string(),
        relative_to(&identity.entitlements_file_path, target_path),
        APP_DELEGATE_HEADER.to_string(),
    ];
    for file in &files {
        if project.add_file(file, &group)?.is_some() {
            debug!("Added {} to group {}", file, identity.name);
        }
    }
    Ok(())
}

/// Patch every build configuration whose PRODUCT_NAME is the extension name
///
/// Returns the number of configurations patched.
pub fn apply_build_settings(
    project: &mut dyn ProjectDescriptor,
    identity: &ExtensionIdentity,
    app: &AppConfig,
) -> usize {
    let mut patched = 0;

    for mut configuration in project.build_configurations_mut() {
        if configuration.settings.get("PRODUCT_NAME") != Some(identity.name.as_str()) {
            continue;
        }

        let settings = &mut configuration.settings;
        settings.set("CLANG_ENABLE_MODULES", "YES");
        settings.set("INFOPLIST_FILE", identity.info_plist_file_path.as_str());
        settings.set("CODE_SIGN_ENTITLEMENTS", identity.entitlements_file_path.as_str());
        settings.set("CODE_SIGN_STYLE", "Automatic");
        settings.set("CURRENT_PROJECT_VERSION", app.build_number());
        settings.set("GENERATE_INFOPLIST_FILE", "YES");
        settings.set("MARKETING_VERSION", app.marketing_version());
        settings.set("PRODUCT_BUNDLE_IDENTIFIER", identity.bundle_identifier.as_str());
        settings.set("SWIFT_EMIT_LOC_STRINGS", "YES");
        settings.set("SWIFT_VERSION", SWIFT_VERSION);
        settings.set("TARGETED_DEVICE_FAMILY", TARGETED_DEVICE_FAMILY);

        debug!(
            "Patched build configuration {} ({})",
            configuration.name.as_deref().unwrap_or("unnamed"),
            configuration.id
        );
        patched += 1;
    }

    patched
}
