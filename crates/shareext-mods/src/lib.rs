//! # shareext-mods
//!
//! Generation steps that turn a host app into one with a share extension:
//! - [`ExtensionConfig`] - records the extension in the app configuration
//! - [`ShareExtensionEntitlements`] - writes the extension entitlements
//! - [`ShareExtensionTarget`] - copies sources and registers the target
//! - [`ShareExtensionInfoPlist`] - writes Info.plist and Expo.plist
//! - [`AppEntitlements`] - grants the host app the shared app group
//!
//! [`ModPipeline::share_extension`] chains them in the order they must run.

pub mod app_entitlements;
pub mod entitlements;
pub mod error;
pub mod expo_config;
pub mod fs;
pub mod info_plist;
pub mod pipeline;
pub mod scripts;
pub mod target;

pub use app_entitlements::AppEntitlements;
pub use entitlements::ShareExtensionEntitlements;
pub use error::{Error, Result};
pub use expo_config::{AppExtensionRecord, ExtensionConfig};
pub use info_plist::ShareExtensionInfoPlist;
pub use pipeline::{ConfigMod, ModPipeline};
pub use target::ShareExtensionTarget;
