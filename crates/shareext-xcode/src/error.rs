//! Error types for shareext-xcode

use thiserror::Error;

/// Result type alias using shareext-xcode's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Project descriptor error types
#[derive(Error, Debug)]
pub enum Error {
    /// A target with this name already exists
    #[error("Target already exists: {name}")]
    DuplicateTarget { name: String },

    /// Target not found
    #[error("Target not found: {name}")]
    TargetNotFound { name: String },

    /// Object id does not resolve in the object table
    #[error("Object {id} not found in project")]
    ObjectNotFound { id: String },

    /// Object has an unexpected shape
    #[error("Malformed project: {message}")]
    MalformedProject { message: String },

    /// Project file could not be read or written
    #[error("Failed to access project file {path}: {source}")]
    ProjectFile {
        path: String,
        #[source]
        source: plist::Error,
    },
}

impl Error {
    /// Create a duplicate target error
    pub fn duplicate_target(name: impl Into<String>) -> Self {
        Self::DuplicateTarget { name: name.into() }
    }

    /// Create a target not found error
    pub fn target_not_found(name: impl Into<String>) -> Self {
        Self::TargetNotFound { name: name.into() }
    }

    /// Create an object not found error
    pub fn object_not_found(id: impl Into<String>) -> Self {
        Self::ObjectNotFound { id: id.into() }
    }

    /// Create a malformed project error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedProject {
            message: message.into(),
        }
    }

    /// Create a project file error
    pub fn project_file(path: impl Into<String>, source: plist::Error) -> Self {
        Self::ProjectFile {
            path: path.into(),
            source,
        }
    }
}
