//! Builders for pbxproj objects

use crate::descriptor::{BuildPhase, ObjectId, TargetKind};
use plist::{Dictionary, Value};

/// Mask Xcode writes on every build phase
const BUILD_ACTION_MASK: &str = "2147483647";

/// `dstSubfolderSpec` of the "Embed App Extensions" copy phase (PlugIns)
pub(crate) const PLUGINS_SUBFOLDER_SPEC: &str = "13";

pub(crate) const GROUP_SOURCE_TREE: &str = "<group>";

pub(crate) fn string(value: impl Into<String>) -> Value {
    Value::String(value.into())
}

pub(crate) fn id_value(id: &ObjectId) -> Value {
    string(id.as_str())
}

pub(crate) fn id_array(ids: &[ObjectId]) -> Value {
    Value::Array(ids.iter().map(id_value).collect())
}

fn strings(values: &[&str]) -> Value {
    Value::Array(values.iter().map(|v| string(*v)).collect())
}

fn object(isa: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.insert("isa".into(), string(isa));
    dict
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Xcode file type for a path, by extension
pub(crate) fn last_known_file_type(path: &str) -> &'static str {
    let extension = file_name(path).rsplit_once('.').map(|(_, ext)| ext);
    match extension {
        Some("h") => "sourcecode.c.h",
        Some("m") => "sourcecode.c.objc",
        Some("mm") => "sourcecode.cpp.objcpp",
        Some("c") => "sourcecode.c.c",
        Some("swift") => "sourcecode.swift",
        Some("storyboard") => "file.storyboard",
        Some("xib") => "file.xib",
        Some("xcassets") => "folder.assetcatalog",
        Some("plist") => "text.plist.xml",
        Some("entitlements") => "text.plist.entitlements",
        Some("json") => "text.json",
        Some("framework") => "wrapper.framework",
        Some("appex") => "wrapper.app-extension",
        _ => "file",
    }
}

pub(crate) fn file_reference(path: &str) -> Dictionary {
    let mut dict = object("PBXFileReference");
    dict.insert("lastKnownFileType".into(), string(last_known_file_type(path)));
    dict.insert("name".into(), string(file_name(path)));
    dict.insert("path".into(), string(path));
    dict.insert("sourceTree".into(), string(GROUP_SOURCE_TREE));
    dict
}

pub(crate) fn product_reference(name: &str, kind: TargetKind) -> Dictionary {
    let mut dict = object("PBXFileReference");
    dict.insert("explicitFileType".into(), string(kind.product_file_type()));
    dict.insert("includeInIndex".into(), string("0"));
    dict.insert(
        "path".into(),
        string(format!("{}.{}", name, kind.product_extension())),
    );
    dict.insert("sourceTree".into(), string("BUILT_PRODUCTS_DIR"));
    dict
}

pub(crate) fn build_file(file_ref: &ObjectId, settings: Option<Dictionary>) -> Dictionary {
    let mut dict = object("PBXBuildFile");
    dict.insert("fileRef".into(), id_value(file_ref));
    if let Some(settings) = settings {
        dict.insert("settings".into(), Value::Dictionary(settings));
    }
    dict
}

/// Settings Xcode gives a freshly created target
pub(crate) fn target_build_settings(
    name: &str,
    kind: TargetKind,
    subfolder: &str,
    debug: bool,
) -> Dictionary {
    let mut settings = Dictionary::new();
    if debug {
        settings.insert(
            "GCC_PREPROCESSOR_DEFINITIONS".into(),
            strings(&["DEBUG=1", "$(inherited)"]),
        );
    }
    settings.insert(
        "INFOPLIST_FILE".into(),
        string(format!("{}/{}-Info.plist", subfolder, subfolder)),
    );
    let runpath = match kind {
        TargetKind::AppExtension => {
            "$(inherited) @executable_path/Frameworks @executable_path/../../Frameworks"
        }
        TargetKind::Application => "$(inherited) @executable_path/Frameworks",
    };
    settings.insert("LD_RUNPATH_SEARCH_PATHS".into(), string(runpath));
    settings.insert("PRODUCT_NAME".into(), string(name));
    if kind == TargetKind::AppExtension {
        settings.insert("SKIP_INSTALL".into(), string("YES"));
    }
    settings
}

pub(crate) fn build_configuration(name: &str, settings: Dictionary) -> Dictionary {
    let mut dict = object("XCBuildConfiguration");
    dict.insert("buildSettings".into(), Value::Dictionary(settings));
    dict.insert("name".into(), string(name));
    dict
}

pub(crate) fn configuration_list(configurations: &[ObjectId], default: &str) -> Dictionary {
    let mut dict = object("XCConfigurationList");
    dict.insert("buildConfigurations".into(), id_array(configurations));
    dict.insert("defaultConfigurationIsVisible".into(), string("0"));
    dict.insert("defaultConfigurationName".into(), string(default));
    dict
}

pub(crate) fn native_target(
    name: &str,
    kind: TargetKind,
    configuration_list: &ObjectId,
    product: &ObjectId,
) -> Dictionary {
    let mut dict = object("PBXNativeTarget");
    dict.insert("buildConfigurationList".into(), id_value(configuration_list));
    dict.insert("buildPhases".into(), Value::Array(Vec::new()));
    dict.insert("buildRules".into(), Value::Array(Vec::new()));
    dict.insert("dependencies".into(), Value::Array(Vec::new()));
    dict.insert("name".into(), string(name));
    dict.insert("productName".into(), string(name));
    dict.insert("productReference".into(), id_value(product));
    dict.insert("productType".into(), string(kind.product_type()));
    dict
}

pub(crate) fn build_phase(phase: &BuildPhase, name: &str, files: &[ObjectId]) -> Dictionary {
    let mut dict = object(phase.isa());
    dict.insert("buildActionMask".into(), string(BUILD_ACTION_MASK));
    dict.insert("files".into(), id_array(files));
    if let BuildPhase::ShellScript(script) = phase {
        dict.insert("inputPaths".into(), Value::Array(Vec::new()));
        dict.insert("name".into(), string(name));
        dict.insert("outputPaths".into(), Value::Array(Vec::new()));
        dict.insert("shellPath".into(), string(script.shell_path.as_str()));
        dict.insert("shellScript".into(), string(script.script.as_str()));
    }
    dict.insert("runOnlyForDeploymentPostprocessing".into(), string("0"));
    dict
}

pub(crate) fn embed_extensions_phase() -> Dictionary {
    let mut dict = object("PBXCopyFilesBuildPhase");
    dict.insert("buildActionMask".into(), string(BUILD_ACTION_MASK));
    dict.insert("dstPath".into(), string(""));
    dict.insert("dstSubfolderSpec".into(), string(PLUGINS_SUBFOLDER_SPEC));
    dict.insert("files".into(), Value::Array(Vec::new()));
    dict.insert("name".into(), string("Embed App Extensions"));
    dict.insert("runOnlyForDeploymentPostprocessing".into(), string("0"));
    dict
}

/// Build file settings for an embedded extension product
pub(crate) fn remove_headers_on_copy() -> Dictionary {
    let mut settings = Dictionary::new();
    settings.insert("ATTRIBUTES".into(), strings(&["RemoveHeadersOnCopy"]));
    settings
}

pub(crate) fn container_item_proxy(root: &ObjectId, target: &ObjectId, name: &str) -> Dictionary {
    let mut dict = object("PBXContainerItemProxy");
    dict.insert("containerPortal".into(), id_value(root));
    dict.insert("proxyType".into(), string("1"));
    dict.insert("remoteGlobalIDString".into(), id_value(target));
    dict.insert("remoteInfo".into(), string(name));
    dict
}

pub(crate) fn target_dependency(target: &ObjectId, proxy: &ObjectId) -> Dictionary {
    let mut dict = object("PBXTargetDependency");
    dict.insert("target".into(), id_value(target));
    dict.insert("targetProxy".into(), id_value(proxy));
    dict
}

pub(crate) fn group(name: Option<&str>, path: Option<&str>, children: &[ObjectId]) -> Dictionary {
    let mut dict = object("PBXGroup");
    dict.insert("children".into(), id_array(children));
    if let Some(name) = name {
        dict.insert("name".into(), string(name));
    }
    if let Some(path) = path {
        dict.insert("path".into(), string(path));
    }
    dict.insert("sourceTree".into(), string(GROUP_SOURCE_TREE));
    dict
}

pub(crate) fn project(
    configuration_list: &ObjectId,
    main_group: &ObjectId,
    products_group: &ObjectId,
) -> Dictionary {
    let mut attributes = Dictionary::new();
    attributes.insert("LastUpgradeCheck".into(), string("1130"));

    let mut dict = object("PBXProject");
    dict.insert("attributes".into(), Value::Dictionary(attributes));
    dict.insert("buildConfigurationList".into(), id_value(configuration_list));
    dict.insert("compatibilityVersion".into(), string("Xcode 12.0"));
    dict.insert("developmentRegion".into(), string("en"));
    dict.insert("hasScannedForEncodings".into(), string("0"));
    dict.insert("knownRegions".into(), strings(&["en", "Base"]));
    dict.insert("mainGroup".into(), id_value(main_group));
    dict.insert("productRefGroup".into(), id_value(products_group));
    dict.insert("projectDirPath".into(), string(""));
    dict.insert("projectRoot".into(), string(""));
    dict.insert("targets".into(), Value::Array(Vec::new()));
    dict
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_known_file_type() {
        assert_eq!(last_known_file_type("AppDelegate.mm"), "sourcecode.cpp.objcpp");
        assert_eq!(last_known_file_type("Images.xcassets"), "folder.assetcatalog");
        assert_eq!(last_known_file_type("Supporting/Expo.plist"), "text.plist.xml");
        assert_eq!(last_known_file_type("Ext.entitlements"), "text.plist.entitlements");
        assert_eq!(last_known_file_type("README"), "file");
    }

    #[test]
    fn test_file_reference_uses_base_name() {
        let dict = file_reference("Supporting/Expo.plist");
        assert_eq!(dict.get("name").and_then(Value::as_string), Some("Expo.plist"));
        assert_eq!(
            dict.get("path").and_then(Value::as_string),
            Some("Supporting/Expo.plist")
        );
    }

    #[test]
    fn test_shell_phase_carries_script() {
        let phase = BuildPhase::ShellScript(crate::ShellScript::sh("echo hi\n"));
        let dict = build_phase(&phase, "Say hi", &[]);
        assert_eq!(
            dict.get("isa").and_then(Value::as_string),
            Some("PBXShellScriptBuildPhase")
        );
        assert_eq!(dict.get("shellScript").and_then(Value::as_string), Some("echo hi\n"));
        assert_eq!(dict.get("name").and_then(Value::as_string), Some("Say hi"));
    }

    #[test]
    fn test_extension_settings_skip_install() {
        let settings = target_build_settings("Ext", TargetKind::AppExtension, "Ext", false);
        assert_eq!(settings.get("SKIP_INSTALL").and_then(Value::as_string), Some("YES"));
        assert!(settings.get("GCC_PREPROCESSOR_DEFINITIONS").is_none());
        assert_eq!(
            settings.get("INFOPLIST_FILE").and_then(Value::as_string),
            Some("Ext/Ext-Info.plist")
        );
    }
}
