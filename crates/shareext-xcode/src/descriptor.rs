//! Project descriptor interface
//!
//! The generation steps only talk to the build project through
//! [`ProjectDescriptor`]. [`crate::PbxProject`] is the implementation backed by
//! an Xcode `project.pbxproj` object graph.

use crate::error::Result;
use plist::{Dictionary, Value};
use std::fmt;

/// 24 hex digit object identifier used as a key in the project object table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Kind of native target to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Application,
    AppExtension,
}

impl TargetKind {
    /// Xcode product type identifier
    pub fn product_type(&self) -> &'static str {
        match self {
            TargetKind::Application => "com.apple.product-type.application",
            TargetKind::AppExtension => "com.apple.product-type.app-extension",
        }
    }

    /// File type of the built product reference
    pub fn product_file_type(&self) -> &'static str {
        match self {
            TargetKind::Application => "wrapper.application",
            TargetKind::AppExtension => "wrapper.app-extension",
        }
    }

    /// Extension of the built product
    pub fn product_extension(&self) -> &'static str {
        match self {
            TargetKind::Application => "app",
            TargetKind::AppExtension => "appex",
        }
    }
}

/// Shell script build phase options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellScript {
    pub shell_path: String,
    pub script: String,
}

impl ShellScript {
    /// `/bin/sh` script
    pub fn sh(script: impl Into<String>) -> Self {
        Self {
            shell_path: "/bin/sh".to_string(),
            script: script.into(),
        }
    }
}

/// Build phase kinds a target can carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPhase {
    Sources,
    Resources,
    Frameworks,
    ShellScript(ShellScript),
}

impl BuildPhase {
    /// `isa` of the phase object
    pub fn isa(&self) -> &'static str {
        match self {
            BuildPhase::Sources => "PBXSourcesBuildPhase",
            BuildPhase::Resources => "PBXResourcesBuildPhase",
            BuildPhase::Frameworks => "PBXFrameworksBuildPhase",
            BuildPhase::ShellScript(_) => "PBXShellScriptBuildPhase",
        }
    }
}

/// Mutable view over one `XCBuildConfiguration`
#[derive(Debug)]
pub struct BuildConfiguration<'a> {
    pub id: &'a str,
    pub name: Option<String>,
    pub settings: BuildSettings<'a>,
}

/// Build settings table of a configuration
#[derive(Debug)]
pub struct BuildSettings<'a>(&'a mut Dictionary);

impl<'a> BuildSettings<'a> {
    pub fn new(settings: &'a mut Dictionary) -> Self {
        Self(settings)
    }

    /// String value of a setting, with surrounding quotes removed
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_string).map(unquote)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), Value::String(value.into()));
    }
}

/// Strip one pair of surrounding double quotes
pub fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Mutation interface over a native build project
pub trait ProjectDescriptor {
    /// Find a native target by name
    fn find_target(&self, name: &str) -> Option<ObjectId>;

    /// Register a new native target and its configuration list
    fn add_target(&mut self, name: &str, kind: TargetKind, subfolder: &str) -> Result<ObjectId>;

    /// Append a build phase to a target, creating build files for `files`
    fn add_build_phase(
        &mut self,
        target: &ObjectId,
        phase: &BuildPhase,
        name: &str,
        files: &[&str],
    ) -> Result<ObjectId>;

    /// Find a group by name
    fn find_group(&self, name: &str) -> Option<ObjectId>;

    /// Create a group under the main group
    fn create_group(&mut self, name: &str, path: &str) -> Result<ObjectId>;

    /// Add a file reference to a group; `None` when the group already has it
    fn add_file(&mut self, path: &str, group: &ObjectId) -> Result<Option<ObjectId>>;

    /// Every build configuration in the project
    fn build_configurations_mut(
        &mut self,
    ) -> Box<dyn Iterator<Item = BuildConfiguration<'_>> + '_>;
}
