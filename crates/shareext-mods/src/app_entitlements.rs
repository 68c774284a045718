//! Host app entitlements
//!
//! Grants the host app the extension's app group so both can reach the same
//! shared container. Other entitlements in the host file are left alone.

use crate::error::{Error, Result};
use crate::fs::ensure_dir;
use crate::pipeline::ConfigMod;
use camino::Utf8Path;
use plist::{Dictionary, Value};
use shareext_core::{ExportedConfig, ExtensionIdentity, APP_GROUPS_ENTITLEMENT};
use shareext_xcode::ProjectDescriptor;
use tracing::{debug, info};

/// Add `groups` to the app group entitlement, keeping existing entries
///
/// Returns true when the dictionary changed.
pub fn merge_app_groups(entitlements: &mut Dictionary, groups: &[String]) -> Result<bool> {
    if !entitlements.contains_key(APP_GROUPS_ENTITLEMENT) {
        entitlements.insert(APP_GROUPS_ENTITLEMENT.to_string(), Value::Array(Vec::new()));
    }
    let existing = entitlements
        .get_mut(APP_GROUPS_ENTITLEMENT)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| {
            Error::Configuration(shareext_core::Error::invalid_config(format!(
                "{} in host entitlements is not an array",
                APP_GROUPS_ENTITLEMENT
            )))
        })?;

    let mut changed = false;
    for group in groups {
        if !existing.iter().any(|v| v.as_string() == Some(group.as_str())) {
            existing.push(Value::String(group.clone()));
            changed = true;
        }
    }
    Ok(changed)
}

fn read_dictionary(path: &Utf8Path) -> Result<Dictionary> {
    if !path.is_file() {
        debug!("{} does not exist yet", path);
        return Ok(Dictionary::new());
    }
    Value::from_file(path)
        .map_err(|e| Error::plist(path, e))?
        .into_dictionary()
        .ok_or_else(|| {
            Error::Configuration(shareext_core::Error::invalid_config(format!(
                "{} is not a dictionary",
                path
            )))
        })
}

/// Adds the extension's app group to the host app entitlements file
#[derive(Debug, Default, Clone, Copy)]
pub struct AppEntitlements;

impl ConfigMod for AppEntitlements {
    fn name(&self) -> &'static str {
        "app-entitlements"
    }

    fn apply(
        &self,
        config: ExportedConfig,
        _project: &mut dyn ProjectDescriptor,
    ) -> Result<ExportedConfig> {
        let identity = ExtensionIdentity::derive(&config)?;
        let path = config.request.host_entitlements_path();

        let mut entitlements = read_dictionary(&path)?;
        if merge_app_groups(&mut entitlements, &identity.app_groups())? {
            if let Some(parent) = path.parent() {
                ensure_dir(parent)?;
            }
            Value::Dictionary(entitlements)
                .to_file_xml(&path)
                .map_err(|e| Error::plist(&path, e))?;
            info!("Granted {} to host app in {}", identity.app_group_id, path);
        } else {
            debug!("Host app already has {}", identity.app_group_id);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use shareext_core::{AppConfig, ModRequest};
    use shareext_xcode::PbxProject;
    use tempfile::TempDir;

    fn groups(dict: &Dictionary) -> Vec<String> {
        dict.get(APP_GROUPS_ENTITLEMENT)
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_string).map(str::to_owned).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_merge_into_empty() {
        let mut dict = Dictionary::new();
        assert!(merge_app_groups(&mut dict, &["group.a".to_string()]).unwrap());
        assert_eq!(groups(&dict), vec!["group.a"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut dict = Dictionary::new();
        merge_app_groups(&mut dict, &["group.a".to_string()]).unwrap();
        assert!(!merge_app_groups(&mut dict, &["group.a".to_string()]).unwrap());
        assert_eq!(groups(&dict), vec!["group.a"]);
    }

    #[test]
    fn test_merge_rejects_non_array() {
        let mut dict = Dictionary::new();
        dict.insert(APP_GROUPS_ENTITLEMENT.into(), Value::String("group.a".into()));
        assert!(merge_app_groups(&mut dict, &["group.b".to_string()]).is_err());
    }

    #[test]
    fn test_apply_keeps_other_host_entitlements() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let request = ModRequest::new(&root, "MyApp");
        let path = request.host_entitlements_path();

        let mut host = Dictionary::new();
        host.insert("aps-environment".into(), Value::String("development".into()));
        host.insert(
            APP_GROUPS_ENTITLEMENT.into(),
            Value::Array(vec![Value::String("group.existing".into())]),
        );
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        Value::Dictionary(host).to_file_xml(&path).unwrap();

        let config = ExportedConfig::new(
            AppConfig::new("MyApp").with_bundle_identifier("com.acme.myapp"),
            request,
        );
        let mut project = PbxProject::scaffold("MyApp").unwrap();
        let config = AppEntitlements.apply(config, &mut project).unwrap();
        AppEntitlements.apply(config, &mut project).unwrap();

        let written = read_dictionary(&path).unwrap();
        assert_eq!(
            written.get("aps-environment").and_then(Value::as_string),
            Some("development")
        );
        assert_eq!(
            groups(&written),
            vec!["group.existing", "group.com.acme.myapp.ShareExtension"]
        );
    }
}
