//! # shareext-core
//!
//! Core library for shareext providing:
//! - App configuration parsing (app.json / app.yaml)
//! - Generation request resolution (platform root and host project)
//! - Share extension identity derivation

pub mod config;
pub mod error;
pub mod identity;
pub mod types;

pub use config::{resolve_request, AppConfigFile};
pub use error::{Error, Result};
pub use identity::{get_app_groups, ExtensionIdentity, APP_GROUPS_ENTITLEMENT};
pub use types::{AppConfig, ExportedConfig, IosConfig, ModRequest};
