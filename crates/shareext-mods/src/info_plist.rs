//! Share extension Info.plist and supporting Expo.plist

use crate::error::{Error, Result};
use crate::fs::{copy_file, ensure_dir};
use crate::pipeline::ConfigMod;
use crate::target::SUPPORTING_EXPO_PLIST;
use camino::Utf8Path;
use plist::{Dictionary, Value};
use shareext_core::{AppConfig, ExportedConfig, ExtensionIdentity};
use shareext_xcode::ProjectDescriptor;
use tracing::{debug, info};

/// Extension point for share sheet extensions
pub const SHARE_SERVICES_EXTENSION_POINT: &str = "com.apple.share-services";

/// Principal class of the extension
const PRINCIPAL_CLASS: &str = "$(PRODUCT_MODULE_NAME).ShareViewController";

fn string(value: impl Into<String>) -> Value {
    Value::String(value.into())
}

/// What the share sheet offers the extension for
fn activation_rule() -> Dictionary {
    let mut rule = Dictionary::new();
    rule.insert("NSExtensionActivationSupportsText".into(), Value::Boolean(true));
    rule.insert(
        "NSExtensionActivationSupportsWebURLWithMaxCount".into(),
        Value::Integer(1i64.into()),
    );
    rule.insert(
        "NSExtensionActivationSupportsImageWithMaxCount".into(),
        Value::Integer(1i64.into()),
    );
    rule
}

/// Info.plist contents for the extension
pub fn share_extension_info_plist(app: &AppConfig, identity: &ExtensionIdentity) -> Dictionary {
    let mut attributes = Dictionary::new();
    attributes.insert(
        "NSExtensionActivationRule".into(),
        Value::Dictionary(activation_rule()),
    );

    let mut extension = Dictionary::new();
    extension.insert("NSExtensionAttributes".into(), Value::Dictionary(attributes));
    extension.insert("NSExtensionPointIdentifier".into(), string(SHARE_SERVICES_EXTENSION_POINT));
    extension.insert("NSExtensionPrincipalClass".into(), string(PRINCIPAL_CLASS));

    let mut info = Dictionary::new();
    info.insert("AppGroup".into(), string(identity.app_group_id.as_str()));
    info.insert("CFBundleDevelopmentRegion".into(), string("$(DEVELOPMENT_LANGUAGE)"));
    info.insert("CFBundleDisplayName".into(), string(app.name.as_str()));
    info.insert("CFBundleExecutable".into(), string("$(EXECUTABLE_NAME)"));
    info.insert("CFBundleIdentifier".into(), string("$(PRODUCT_BUNDLE_IDENTIFIER)"));
    info.insert("CFBundleInfoDictionaryVersion".into(), string("6.0"));
    info.insert("CFBundleName".into(), string("$(PRODUCT_NAME)"));
    info.insert("CFBundlePackageType".into(), string("XPC!"));
    info.insert("CFBundleShortVersionString".into(), string(app.marketing_version()));
    info.insert("CFBundleVersion".into(), string(app.build_number()));
    info.insert("NSExtension".into(), Value::Dictionary(extension));
    info
}

fn write_plist(path: &Utf8Path, dict: Dictionary) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Value::Dictionary(dict)
        .to_file_xml(path)
        .map_err(|e| Error::plist(path, e))
}

/// Writes Info.plist and Supporting/Expo.plist for the extension
#[derive(Debug, Default, Clone, Copy)]
pub struct ShareExtensionInfoPlist;

impl ConfigMod for ShareExtensionInfoPlist {
    fn name(&self) -> &'static str {
        "share-extension-info-plist"
    }

    fn apply(
        &self,
        config: ExportedConfig,
        _project: &mut dyn ProjectDescriptor,
    ) -> Result<ExportedConfig> {
        let identity = ExtensionIdentity::derive(&config)?;

        write_plist(
            &identity.info_plist_file_path,
            share_extension_info_plist(&config.config, &identity),
        )?;
        info!("Wrote {}", identity.info_plist_file_path);

        let expo_plist = identity.target_path.join(SUPPORTING_EXPO_PLIST);
        let host_expo_plist = config.request.host_app_dir().join(SUPPORTING_EXPO_PLIST);
        if host_expo_plist.is_file() {
            if let Some(parent) = expo_plist.parent() {
                ensure_dir(parent)?;
            }
            copy_file(&host_expo_plist, &expo_plist)?;
        } else {
            debug!("{} not found, writing an empty Expo.plist", host_expo_plist);
            write_plist(&expo_plist, Dictionary::new())?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use shareext_core::ModRequest;
    use shareext_xcode::PbxProject;
    use tempfile::TempDir;

    fn exported(root: &Utf8Path) -> ExportedConfig {
        ExportedConfig::new(
            AppConfig::new("My App")
                .with_bundle_identifier("com.acme.myapp")
                .with_version("1.2.3"),
            ModRequest::new(root, "MyApp"),
        )
    }

    #[test]
    fn test_info_plist_contents() {
        let config = exported(Utf8Path::new("/work/ios"));
        let identity = ExtensionIdentity::derive(&config).unwrap();
        let info = share_extension_info_plist(&config.config, &identity);

        assert_eq!(
            info.get("AppGroup").and_then(Value::as_string),
            Some("group.com.acme.myapp.ShareExtension")
        );
        assert_eq!(
            info.get("CFBundleShortVersionString").and_then(Value::as_string),
            Some("1.2.3")
        );
        assert_eq!(info.get("CFBundleVersion").and_then(Value::as_string), Some("1"));
        let extension = info.get("NSExtension").and_then(Value::as_dictionary).unwrap();
        assert_eq!(
            extension.get("NSExtensionPointIdentifier").and_then(Value::as_string),
            Some(SHARE_SERVICES_EXTENSION_POINT)
        );
    }

    #[test]
    fn test_writes_info_and_empty_expo_plist() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let mut project = PbxProject::scaffold("MyApp").unwrap();

        ShareExtensionInfoPlist
            .apply(exported(&root), &mut project)
            .unwrap();

        let info = Value::from_file(root.join("MyAppShareExtension/Info.plist")).unwrap();
        assert_eq!(
            info.as_dictionary()
                .and_then(|d| d.get("CFBundleDisplayName"))
                .and_then(Value::as_string),
            Some("My App")
        );
        let expo =
            Value::from_file(root.join("MyAppShareExtension/Supporting/Expo.plist")).unwrap();
        assert_eq!(expo.as_dictionary().map(Dictionary::len), Some(0));
    }

    #[test]
    fn test_copies_host_expo_plist() {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let mut host = Dictionary::new();
        host.insert("EXUpdatesEnabled".into(), Value::Boolean(false));
        write_plist(&root.join("MyApp/Supporting/Expo.plist"), host).unwrap();
        let mut project = PbxProject::scaffold("MyApp").unwrap();

        ShareExtensionInfoPlist
            .apply(exported(&root), &mut project)
            .unwrap();

        let expo =
            Value::from_file(root.join("MyAppShareExtension/Supporting/Expo.plist")).unwrap();
        assert_eq!(
            expo.as_dictionary()
                .and_then(|d| d.get("EXUpdatesEnabled"))
                .and_then(Value::as_boolean),
            Some(false)
        );
    }
}
