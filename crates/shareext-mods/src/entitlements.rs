//! Share extension entitlements
//!
//! Writes `<ExtensionName>.entitlements` granting the extension its app
//! group. The file is rewritten from scratch on every run.

use crate::error::{Error, Result};
use crate::fs::ensure_dir;
use crate::pipeline::ConfigMod;
use camino::Utf8Path;
use shareext_core::{ExportedConfig, ExtensionIdentity, APP_GROUPS_ENTITLEMENT};
use shareext_xcode::ProjectDescriptor;
use std::collections::BTreeMap;
use tracing::info;

/// Entitlements document for a set of app groups
pub fn share_extension_entitlements(app_groups: Vec<String>) -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([(APP_GROUPS_ENTITLEMENT.to_string(), app_groups)])
}

/// Write an entitlements document, creating parent directories
pub fn write_entitlements(
    path: &Utf8Path,
    entitlements: &BTreeMap<String, Vec<String>>,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    plist::to_file_xml(path, entitlements).map_err(|e| Error::plist(path, e))
}

/// Read an entitlements document written by [`write_entitlements`]
pub fn read_entitlements(path: &Utf8Path) -> Result<BTreeMap<String, Vec<String>>> {
    plist::from_file(path).map_err(|e| Error::plist(path, e))
}

/// Writes the extension's entitlements file
#[derive(Debug, Default, Clone, Copy)]
pub struct ShareExtensionEntitlements;

impl ConfigMod for ShareExtensionEntitlements {
    fn name(&self) -> &'static str {
        "share-extension-entitlements"
    }

    fn apply(
        &self,
        config: ExportedConfig,
        _project: &mut dyn ProjectDescriptor,
    ) -> Result<ExportedConfig> {
        let identity = ExtensionIdentity::derive(&config)?;
        let entitlements = share_extension_entitlements(identity.app_groups());

        write_entitlements(&identity.entitlements_file_path, &entitlements)?;
        info!(
            "Wrote {} with app group {}",
            identity.entitlements_file_path, identity.app_group_id
        );

        Ok(config)
    }
}
