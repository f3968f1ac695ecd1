//! Post-extraction build hooks.
//!
//! Every freshly extracted module goes through the same three steps, in
//! order: link its binaries, build it, alias its library. The first failing
//! step aborts the rest.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::package::ModuleRequest;
use crate::{NdistrbError, Result};

use super::binary::BinaryLinker;
use super::build::BuildCommand;
use super::library::LibraryLinker;

/// Everything a build step needs to know about the module being installed
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Project root
    pub root: PathBuf,
    /// Module name
    pub module: String,
    /// `<root>/modules/<module>`
    pub destination: PathBuf,
    /// Name the library is aliased under
    pub link_name: String,
}

impl HookContext {
    pub fn new(root: &Path, destination: &Path, request: &ModuleRequest) -> Self {
        Self {
            root: root.to_path_buf(),
            module: request.name.clone(),
            destination: destination.to_path_buf(),
            link_name: request.link_name().to_string(),
        }
    }
}

/// Runs the post-install hooks of a module.
#[async_trait]
pub trait BuildHooks: Send + Sync {
    async fn run(&self, ctx: &HookContext) -> Result<()>;
}

/// A single post-install step
#[async_trait]
pub trait BuildStep: Send + Sync {
    /// Short name used in error messages and logs
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &HookContext) -> Result<()>;
}

/// Runs build steps strictly in sequence
pub struct HookRunner {
    steps: Vec<Box<dyn BuildStep>>,
}

impl HookRunner {
    /// The standard sequence: bin, build, lib
    pub fn new() -> Self {
        let steps: Vec<Box<dyn BuildStep>> = vec![
            Box::new(BinaryLinker),
            Box::new(BuildCommand),
            Box::new(LibraryLinker),
        ];
        Self::with_steps(steps)
    }

    /// Runner over an explicit step list
    pub fn with_steps(steps: Vec<Box<dyn BuildStep>>) -> Self {
        Self { steps }
    }
}

impl Default for HookRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuildHooks for HookRunner {
    async fn run(&self, ctx: &HookContext) -> Result<()> {
        for step in &self.steps {
            log::info!("Running {} step for {}", step.name(), ctx.module);

            step.run(ctx).await.map_err(|e| match e {
                NdistrbError::HookFailed { .. } => e,
                other => NdistrbError::HookFailed {
                    step: step.name(),
                    module: ctx.module.clone(),
                    reason: other.to_string(),
                },
            })?;
        }
        Ok(())
    }
}
