//! Module installation.
//!
//! [`ModuleInstaller`] holds the decision logic; the version marker store and
//! the build hooks are the single-purpose stages it sequences.

mod binary;
mod build;
mod hooks;
mod library;
mod marker;
mod module;

pub use binary::BinaryLinker;
pub use build::{BuildCommand, BuildTool};
pub use hooks::{BuildHooks, BuildStep, HookContext, HookRunner};
pub use library::LibraryLinker;
pub use marker::VersionMarker;
pub use module::{InstallOutcome, ModuleInstaller, Resolution};
