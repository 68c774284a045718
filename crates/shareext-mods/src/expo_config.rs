//! Extension record in the app configuration
//!
//! Build services that sign app extensions read them from
//! `extra.eas.build.experimental.ios.appExtensions`. The share extension is
//! upserted there keyed by its target name.

use crate::error::Result;
use crate::pipeline::ConfigMod;
use serde_json::{json, Map, Value};
use shareext_core::{ExportedConfig, ExtensionIdentity, APP_GROUPS_ENTITLEMENT};
use shareext_xcode::ProjectDescriptor;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Path below `extra` holding the extension list
const APP_EXTENSIONS_PATH: &[&str] = &["eas", "build", "experimental", "ios", "appExtensions"];

/// One entry of the app extension list
#[derive(Debug, Clone, PartialEq)]
pub struct AppExtensionRecord {
    pub target_name: String,
    pub bundle_identifier: String,
    pub entitlements: BTreeMap<String, Vec<String>>,
}

impl AppExtensionRecord {
    /// Record describing the share extension
    pub fn for_identity(identity: &ExtensionIdentity) -> Self {
        Self {
            target_name: identity.name.clone(),
            bundle_identifier: identity.bundle_identifier.clone(),
            entitlements: BTreeMap::from([(
                APP_GROUPS_ENTITLEMENT.to_string(),
                identity.app_groups(),
            )]),
        }
    }

    /// JSON form stored in the app configuration
    pub fn to_value(&self) -> Value {
        json!({
            "targetName": self.target_name,
            "bundleIdentifier": self.bundle_identifier,
            "entitlements": self.entitlements,
        })
    }
}

/// Walk `path` below `map`, replacing anything that is not an object
fn object_at<'a>(map: &'a mut Map<String, Value>, path: &[&str]) -> &'a mut Map<String, Value> {
    let mut current = map;
    for key in path {
        let slot = current
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            debug!("Replacing non-object value at extra.{}", key);
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(inner) => inner,
            _ => unreachable!("slot was just made an object"),
        };
    }
    current
}

/// Insert or replace the record with the same target name
///
/// Returns true when `extra` changed.
pub fn upsert_app_extension(extra: &mut Map<String, Value>, record: &AppExtensionRecord) -> bool {
    let (parent, last) = APP_EXTENSIONS_PATH.split_at(APP_EXTENSIONS_PATH.len() - 1);
    let container = object_at(extra, parent);
    let list = container
        .entry(last[0].to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !list.is_array() {
        *list = Value::Array(Vec::new());
    }
    let Value::Array(entries) = list else {
        unreachable!("list was just made an array");
    };

    let value = record.to_value();
    let position = entries.iter().position(|entry| {
        entry.get("targetName").and_then(Value::as_str) == Some(record.target_name.as_str())
    });

    match position {
        Some(index) if entries[index] == value => false,
        Some(index) => {
            entries[index] = value;
            true
        }
        None => {
            entries.push(value);
            true
        }
    }
}

/// Registers the extension in `extra.eas.build.experimental.ios.appExtensions`
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtensionConfig;

impl ConfigMod for ExtensionConfig {
    fn name(&self) -> &'static str {
        "extension-config"
    }

    fn apply(
        &self,
        mut config: ExportedConfig,
        _project: &mut dyn ProjectDescriptor,
    ) -> Result<ExportedConfig> {
        let identity = ExtensionIdentity::derive(&config)?;
        let record = AppExtensionRecord::for_identity(&identity);

        if upsert_app_extension(&mut config.config.extra, &record) {
            info!("Registered {} in app extension list", identity.name);
        } else {
            debug!("{} already registered in app extension list", identity.name);
        }

        Ok(config)
    }
}
