//! Identity derivation from loaded configuration files

use camino::Utf8PathBuf;
use shareext_core::identity::sanitized_name;
use shareext_core::{resolve_request, AppConfigFile, Error, ExportedConfig, ExtensionIdentity};
use std::fs;
use tempfile::TempDir;

fn workspace() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
    (dir, root)
}

#[test]
fn test_identity_from_app_json() {
    let (_dir, root) = workspace();
    fs::write(
        root.join("app.json"),
        r#"{"expo":{"name":"Pet Finder!","slug":"pet-finder","ios":{"bundleIdentifier":"com.acme.pets"}}}"#,
    )
    .unwrap();
    fs::create_dir_all(root.join("ios/PetFinder.xcodeproj")).unwrap();
    fs::create_dir_all(root.join("ios/Pods.xcodeproj")).unwrap();

    let file = AppConfigFile::load(Some(&root.join("app.json"))).unwrap();
    let request = resolve_request(&file.default_platform_root(), None).unwrap();
    assert_eq!(request.project_name, "PetFinder");

    let identity = ExtensionIdentity::derive(&ExportedConfig::new(file.config, request)).unwrap();
    assert_eq!(identity.name, "PetFinderShareExtension");
    assert_eq!(identity.bundle_identifier, "com.acme.pets.ShareExtension");
    assert_eq!(identity.app_group_id, "group.com.acme.pets.ShareExtension");
    assert_eq!(
        identity.target_path,
        root.join("ios/PetFinderShareExtension")
    );
    assert_eq!(
        identity.entitlements_file_path,
        root.join("ios/PetFinderShareExtension/PetFinderShareExtension.entitlements")
    );
    assert_eq!(
        identity.info_plist_file_path,
        root.join("ios/PetFinderShareExtension/Info.plist")
    );
}

#[test]
fn test_identity_from_app_yaml() {
    let (_dir, root) = workspace();
    fs::write(
        root.join("app.yaml"),
        "name: Notes\nios:\n  bundleIdentifier: io.notes\n",
    )
    .unwrap();

    let file = AppConfigFile::load(Some(&root.join("app.yaml"))).unwrap();
    let request = resolve_request(&root.join("ios"), Some("Notes")).unwrap();
    let identity = ExtensionIdentity::derive(&ExportedConfig::new(file.config, request)).unwrap();

    assert_eq!(identity.name, "NotesShareExtension");
    assert_eq!(identity.entitlements_file_name, "NotesShareExtension.entitlements");
}

#[test]
fn test_sanitized_names_are_alphanumeric() {
    for name in ["My App", "my-app_2", "Ünïcödé", "a.b.c", "  spaced  ", "émoji 🎉 app"] {
        let sanitized = sanitized_name(name);
        assert!(!sanitized.is_empty(), "{name:?} produced an empty name");
        assert!(
            sanitized.chars().all(|c| c.is_ascii_alphanumeric()),
            "{name:?} produced {sanitized:?}"
        );
    }
}

#[test]
fn test_ambiguous_project_is_reported() {
    let (_dir, root) = workspace();
    fs::create_dir_all(root.join("One.xcodeproj")).unwrap();
    fs::create_dir_all(root.join("Two.xcodeproj")).unwrap();

    let err = resolve_request(&root, None).unwrap_err();
    assert!(matches!(err, Error::AmbiguousProject { .. }));
    assert!(err.to_string().contains("One"));
}

#[test]
fn test_missing_name_is_rejected() {
    let (_dir, root) = workspace();
    fs::write(root.join("app.json"), r#"{"expo":{"slug":"x"}}"#).unwrap();

    let err = AppConfigFile::load(Some(&root.join("app.json"))).unwrap_err();
    assert!(err.is_configuration_error());
}
