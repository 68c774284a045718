//! Error types for shareext-core

use thiserror::Error;

/// Result type alias using shareext-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for shareext
#[derive(Error, Debug)]
pub enum Error {
    /// App configuration file not found
    #[error("App configuration not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid app configuration: {message}")]
    InvalidConfig { message: String },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Native project could not be located
    #[error("Xcode project not found in {path}")]
    ProjectNotFound { path: String },

    /// More than one native project in the platform root
    #[error("Multiple Xcode projects found in {path}: {candidates}. Pass --project-name explicitly")]
    AmbiguousProject { path: String, candidates: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Glob pattern error
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a project not found error
    pub fn project_not_found(path: impl Into<String>) -> Self {
        Self::ProjectNotFound { path: path.into() }
    }

    /// Create an ambiguous project error
    pub fn ambiguous_project(path: impl Into<String>, candidates: &[String]) -> Self {
        Self::AmbiguousProject {
            path: path.into(),
            candidates: candidates.join(", "),
        }
    }

    /// True when the error is a configuration problem (missing or malformed input)
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::InvalidConfig { .. }
                | Self::MissingField { .. }
                | Self::YamlParse(_)
                | Self::JsonParse(_)
        )
    }
}
