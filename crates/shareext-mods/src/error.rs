//! Error types for shareext-mods

use camino::Utf8PathBuf;
use thiserror::Error;

/// Result type alias using shareext-mods's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Generation step error types
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid app configuration
    #[error(transparent)]
    Configuration(#[from] shareext_core::Error),

    /// Filesystem operation failed
    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The project descriptor rejected a mutation
    #[error("Project mutation failed: {0}")]
    Descriptor(#[from] shareext_xcode::Error),

    /// Property list could not be read or written
    #[error("Property list error at {path}: {source}")]
    Plist {
        path: Utf8PathBuf,
        #[source]
        source: plist::Error,
    },

    /// A path outside UTF-8 was encountered while copying
    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path { path: String },

    /// A step failed, naming the step
    #[error("{step} failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a filesystem error naming the failed path
    pub fn filesystem(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Create a plist error naming the file
    pub fn plist(path: impl Into<Utf8PathBuf>, source: plist::Error) -> Self {
        Self::Plist {
            path: path.into(),
            source,
        }
    }

    /// Wrap an error with the name of the step that produced it
    pub fn in_step(step: &'static str, source: Error) -> Self {
        Self::Step {
            step,
            source: Box::new(source),
        }
    }

    /// Innermost error, skipping step wrappers
    pub fn root(&self) -> &Error {
        match self {
            Self::Step { source, .. } => source.root(),
            other => other,
        }
    }
}
