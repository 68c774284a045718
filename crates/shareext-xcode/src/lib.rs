//! # shareext-xcode
//!
//! Xcode project descriptor used by the share extension generator:
//! - [`ProjectDescriptor`] - the mutation interface the generation steps use
//! - [`PbxProject`] - implementation over a `project.pbxproj` object graph
//!
//! Reading and writing the file itself is delegated to the `plist` crate,
//! which reads the OpenStep text format Xcode writes as well as XML and
//! binary. Projects are always saved as XML.

pub mod descriptor;
pub mod error;
pub mod pbx;

pub use descriptor::{
    unquote, BuildConfiguration, BuildPhase, BuildSettings, ObjectId, ProjectDescriptor,
    ShellScript, TargetKind,
};
pub use error::{Error, Result};
pub use pbx::PbxProject;
