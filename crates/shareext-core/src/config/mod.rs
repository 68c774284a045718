//! App configuration loading and generation request resolution

mod loader;

pub use loader::{resolve_request, AppConfigFile, ConfigFormat};
