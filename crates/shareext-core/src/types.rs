//! Configuration types for the host app and the generation request

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Build number used when `ios.buildNumber` is not set
pub const DEFAULT_BUILD_NUMBER: &str = "1";

/// Marketing version used when `version` is not set
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Host application configuration (the `expo` section of app.json)
///
/// Only the fields the generator reads are typed. Everything else is kept in
/// `other` so saving the file does not drop unrelated settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Display name of the app
    pub name: String,

    /// URL-friendly app name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Marketing version (e.g. "1.0.0")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// iOS specific configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios: Option<IosConfig>,

    /// Free-form extra configuration
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// iOS section of the app configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IosConfig {
    /// Bundle identifier of the host app (e.g. "com.acme.myapp")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_identifier: Option<String>,

    /// Build number (CFBundleVersion)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl AppConfig {
    /// Create a minimal configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the iOS bundle identifier
    pub fn with_bundle_identifier(mut self, bundle_identifier: impl Into<String>) -> Self {
        self.ios
            .get_or_insert_with(IosConfig::default)
            .bundle_identifier = Some(bundle_identifier.into());
        self
    }

    /// Set the marketing version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the iOS build number
    pub fn with_build_number(mut self, build_number: impl Into<String>) -> Self {
        self.ios.get_or_insert_with(IosConfig::default).build_number = Some(build_number.into());
        self
    }

    /// Host bundle identifier, if configured and non-empty
    pub fn bundle_identifier(&self) -> Option<&str> {
        self.ios
            .as_ref()
            .and_then(|ios| ios.bundle_identifier.as_deref())
            .filter(|id| !id.trim().is_empty())
    }

    /// Build number, defaulting to "1"
    pub fn build_number(&self) -> &str {
        self.ios
            .as_ref()
            .and_then(|ios| ios.build_number.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_BUILD_NUMBER)
    }

    /// Marketing version, defaulting to "1.0.0"
    pub fn marketing_version(&self) -> &str {
        self.version
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_VERSION)
    }
}

/// Where the generation happens: the native platform root and the host project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModRequest {
    /// Native platform directory (usually `<project>/ios`)
    pub platform_project_root: Utf8PathBuf,

    /// Host native project name (the `<name>.xcodeproj` stem)
    pub project_name: String,
}

impl ModRequest {
    pub fn new(
        platform_project_root: impl Into<Utf8PathBuf>,
        project_name: impl Into<String>,
    ) -> Self {
        Self {
            platform_project_root: platform_project_root.into(),
            project_name: project_name.into(),
        }
    }

    /// Host app source directory (`<root>/<projectName>`)
    pub fn host_app_dir(&self) -> Utf8PathBuf {
        self.platform_project_root.join(&self.project_name)
    }

    /// Path to the host `project.pbxproj`
    pub fn pbxproj_path(&self) -> Utf8PathBuf {
        self.platform_project_root
            .join(format!("{}.xcodeproj", self.project_name))
            .join("project.pbxproj")
    }

    /// Path to the host app's entitlements file
    pub fn host_entitlements_path(&self) -> Utf8PathBuf {
        self.host_app_dir()
            .join(format!("{}.entitlements", self.project_name))
    }

    /// Rebase the request onto a different platform root, keeping the project name
    pub fn rebased(&self, root: &Utf8Path) -> Self {
        Self {
            platform_project_root: root.to_owned(),
            project_name: self.project_name.clone(),
        }
    }
}

/// App configuration plus generation request, threaded through every step
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedConfig {
    pub config: AppConfig,
    pub request: ModRequest,
}

impl ExportedConfig {
    pub fn new(config: AppConfig, request: ModRequest) -> Self {
        Self { config, request }
    }
}
