//! Share extension identity derivation
//!
//! Every value here is a pure function of the app configuration and the
//! generation request. Steps re-derive what they need instead of caching it,
//! so the formulas must live in exactly one place: the `get_*` functions
//! below, composed by [`ExtensionIdentity::derive`].

use crate::error::{Error, Result};
use crate::types::{AppConfig, ExportedConfig};
use camino::Utf8PathBuf;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Suffix appended to the sanitized app name and the host bundle id
pub const SHARE_EXTENSION_SUFFIX: &str = "ShareExtension";

/// Entitlement key granting app group access
pub const APP_GROUPS_ENTITLEMENT: &str = "com.apple.security.application-groups";

/// Name of the extension's Info.plist
pub const INFO_PLIST_FILE_NAME: &str = "Info.plist";

/// Name used when sanitizing removes every character
const FALLBACK_NAME: &str = "app";

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("name sanitizer regex is valid"));

/// Strip characters Xcode does not accept in target names
fn project_file_safe_name(name: &str) -> String {
    UNSAFE_NAME_CHARS.replace_all(name, "").into_owned()
}

/// Sanitize an app name for use as an Xcode target name
///
/// When nothing survives, the name is transliterated to ASCII and sanitized
/// again, then `app` is used.
pub fn sanitized_name(name: &str) -> String {
    let safe = project_file_safe_name(name);
    if !safe.is_empty() {
        return safe;
    }

    let transliterated = project_file_safe_name(&slug::slugify(name));
    if !transliterated.is_empty() {
        return transliterated;
    }

    FALLBACK_NAME.to_string()
}

/// App groups granted to a bundle identifier
pub fn get_app_groups(identifier: &str) -> Vec<String> {
    vec![format!("group.{}", identifier)]
}

/// `<host bundle id>.ShareExtension`
pub fn get_share_extension_bundle_identifier(config: &AppConfig) -> Result<String> {
    let bundle_identifier = config
        .bundle_identifier()
        .ok_or_else(|| Error::missing_field("ios.bundleIdentifier (no bundle identifier)"))?;
    Ok(format!("{}.{}", bundle_identifier, SHARE_EXTENSION_SUFFIX))
}

/// `<sanitized app name>ShareExtension`
pub fn get_share_extension_name(config: &AppConfig) -> String {
    format!("{}{}", sanitized_name(&config.name), SHARE_EXTENSION_SUFFIX)
}

pub fn get_share_extension_entitlements_file_name(config: &AppConfig) -> String {
    format!("{}.entitlements", get_share_extension_name(config))
}

/// Extension directory: `<platformProjectRoot>/<name>`
pub fn get_share_extension_target_path(config: &ExportedConfig) -> Utf8PathBuf {
    config
        .request
        .platform_project_root
        .join(get_share_extension_name(&config.config))
}

pub fn get_share_extension_entitlements_file_path(config: &ExportedConfig) -> Utf8PathBuf {
    get_share_extension_target_path(config)
        .join(get_share_extension_entitlements_file_name(&config.config))
}

pub fn get_info_plist_file_path(config: &ExportedConfig) -> Utf8PathBuf {
    get_share_extension_target_path(config).join(INFO_PLIST_FILE_NAME)
}

/// All derived identity values for one configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionIdentity {
    pub name: String,
    pub bundle_identifier: String,
    pub app_group_id: String,
    pub entitlements_file_name: String,
    pub target_path: Utf8PathBuf,
    pub entitlements_file_path: Utf8PathBuf,
    pub info_plist_file_path: Utf8PathBuf,
}

impl ExtensionIdentity {
    /// Derive the identity, failing when the host bundle identifier is missing
    pub fn derive(config: &ExportedConfig) -> Result<Self> {
        let bundle_identifier = get_share_extension_bundle_identifier(&config.config)?;
        let app_group_id = get_app_groups(&bundle_identifier)
            .into_iter()
            .next()
            .unwrap_or_default();

        Ok(Self {
            name: get_share_extension_name(&config.config),
            app_group_id,
            bundle_identifier,
            entitlements_file_name: get_share_extension_entitlements_file_name(&config.config),
            target_path: get_share_extension_target_path(config),
            entitlements_file_path: get_share_extension_entitlements_file_path(config),
            info_plist_file_path: get_info_plist_file_path(config),
        })
    }

    /// App groups granted to the extension
    pub fn app_groups(&self) -> Vec<String> {
        get_app_groups(&self.bundle_identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModRequest;

    fn exported(name: &str, bundle_id: Option<&str>) -> ExportedConfig {
        let mut config = AppConfig::new(name).with_version("1.0.0");
        if let Some(id) = bundle_id {
            config = config.with_bundle_identifier(id);
        }
        ExportedConfig::new(config, ModRequest::new("/work/ios", "MyApp"))
    }

    #[test]
    fn test_sanitized_name_strips_invalid_characters() {
        assert_eq!(sanitized_name("My App"), "MyApp");
        assert_eq!(sanitized_name("my_app-2!"), "myapp2");
        assert_eq!(sanitized_name("Café Ölé"), "Cafl");
    }

    #[test]
    fn test_sanitized_name_transliterates_when_nothing_survives() {
        assert_eq!(sanitized_name("Ωμέγα"), "omega");
        let euro = sanitized_name("€€€");
        assert_ne!(euro, "app");
        assert!(euro.contains("eur"), "got {euro:?}");
    }

    #[test]
    fn test_sanitized_name_falls_back_to_app() {
        assert_eq!(sanitized_name(""), "app");
        assert_eq!(sanitized_name("!!! ---"), "app");
    }

    #[test]
    fn test_slug_does_not_affect_name() {
        let mut config = AppConfig::new("Ωμέγα");
        config.slug = Some("nihon-go".to_string());
        assert_eq!(get_share_extension_name(&config), "omegaShareExtension");
    }

    #[test]
    fn test_app_groups() {
        assert_eq!(get_app_groups("com.acme"), vec!["group.com.acme".to_string()]);
    }

    #[test]
    fn test_bundle_identifier_suffix() {
        let config = exported("MyApp", Some("com.acme.myapp"));
        assert_eq!(
            get_share_extension_bundle_identifier(&config.config).unwrap(),
            "com.acme.myapp.ShareExtension"
        );
    }

    #[test]
    fn test_missing_bundle_identifier_is_configuration_error() {
        let config = exported("MyApp", None);
        let err = ExtensionIdentity::derive(&config).unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("ios.bundleIdentifier"));
    }

    #[test]
    fn test_derive_end_to_end() {
        let identity =
            ExtensionIdentity::derive(&exported("MyApp", Some("com.acme.myapp"))).unwrap();
        assert_eq!(identity.name, "MyAppShareExtension");
        assert_eq!(identity.bundle_identifier, "com.acme.myapp.ShareExtension");
        assert_eq!(identity.app_group_id, "group.com.acme.myapp.ShareExtension");
        assert_eq!(identity.entitlements_file_name, "MyAppShareExtension.entitlements");
        assert_eq!(
            identity.entitlements_file_path,
            Utf8PathBuf::from("/work/ios/MyAppShareExtension/MyAppShareExtension.entitlements")
        );
        assert_eq!(
            identity.info_plist_file_path,
            Utf8PathBuf::from("/work/ios/MyAppShareExtension/Info.plist")
        );
    }

    #[test]
    fn test_derive_is_deterministic() {
        let config = exported("My Fancy App", Some("io.example.fancy"));
        let first = ExtensionIdentity::derive(&config).unwrap();
        let second = ExtensionIdentity::derive(&config.clone()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.entitlements_file_path,
            get_share_extension_entitlements_file_path(&config)
        );
    }
}
