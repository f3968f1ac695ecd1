//! Build step - runs the module's own build tooling.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::{NdistrbError, Result};

use super::hooks::{BuildStep, HookContext};

/// Build tool invocation detected for a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTool {
    pub program: String,
    pub args: Vec<String>,
}

impl BuildTool {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Pick the build tool from the files present in `module_dir`:
    /// a `Makefile` means `make`, a `wscript` means `node-waf configure build`.
    pub fn detect(module_dir: &Path) -> Option<Self> {
        if module_dir.join("Makefile").is_file() {
            Some(Self::new("make", &[]))
        } else if module_dir.join("wscript").is_file() {
            Some(Self::new("node-waf", &["configure", "build"]))
        } else {
            None
        }
    }

    fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs the detected build tool inside the module directory
pub struct BuildCommand;

impl BuildCommand {
    /// Run `tool` in `dir`, failing on spawn errors and non-zero exits
    pub async fn run_tool(&self, tool: &BuildTool, dir: &Path, module: &str) -> Result<()> {
        log::debug!("Running `{}` in {}", tool.display(), dir.display());

        let output = Command::new(&tool.program)
            .args(&tool.args)
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| NdistrbError::HookFailed {
                step: "build",
                module: module.to_string(),
                reason: format!("failed to run `{}`: {}", tool.display(), e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{}", stdout.trim_end());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NdistrbError::HookFailed {
                step: "build",
                module: module.to_string(),
                reason: format!("`{}` exited with {}: {}", tool.display(), output.status, stderr.trim()),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl BuildStep for BuildCommand {
    fn name(&self) -> &'static str {
        "build"
    }

    async fn run(&self, ctx: &HookContext) -> Result<()> {
        match BuildTool::detect(&ctx.destination) {
            Some(tool) => self.run_tool(&tool, &ctx.destination, &ctx.module).await,
            None => {
                log::debug!("Nothing to build for {}", ctx.module);
                Ok(())
            }
        }
    }
}
