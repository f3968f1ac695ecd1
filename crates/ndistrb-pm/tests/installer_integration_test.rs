/// Integration tests for the module installer
///
/// These drive `ModuleInstaller` end to end against a temporary project
/// root, with the network replaced by an in-memory tarball server and the
/// operator output captured.

use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use ndistrb_pm::downloader::ArchiveFetcher;
use ndistrb_pm::installer::{
    BinaryLinker, BuildHooks, BuildStep, HookContext, HookRunner, InstallOutcome, LibraryLinker,
    ModuleInstaller, Resolution,
};
use ndistrb_pm::{ModuleRequest, NdistrbError, Reporter, Result};

/// Serves one tarball for every URL and remembers what was asked for
struct TarballServer {
    body: Vec<u8>,
    requests: Mutex<Vec<String>>,
}

impl TarballServer {
    fn new(body: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            body,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArchiveFetcher for TarballServer {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        Ok(self.body.clone())
    }
}

struct Unreachable;

#[async_trait]
impl ArchiveFetcher for Unreachable {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Err(NdistrbError::DownloadFailed {
            url: url.to_string(),
            reason: "HTTP 404".to_string(),
        })
    }
}

#[derive(Default)]
struct CapturedOutput {
    messages: Mutex<Vec<String>>,
}

impl CapturedOutput {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Reporter for CapturedOutput {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn fail(&self, message: &str, code: u8) -> ExitCode {
        self.messages.lock().unwrap().push(format!("FAIL({}) {}", code, message));
        ExitCode::from(code)
    }
}

/// Hook double that counts runs
#[derive(Default)]
struct CountingHooks {
    runs: AtomicUsize,
}

#[async_trait]
impl BuildHooks for CountingHooks {
    async fn run(&self, _ctx: &HookContext) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Build step that always fails, standing in for a broken `make`
struct FailingBuild;

#[async_trait]
impl BuildStep for FailingBuild {
    fn name(&self) -> &'static str {
        "build"
    }

    async fn run(&self, ctx: &HookContext) -> Result<()> {
        Err(NdistrbError::HookFailed {
            step: "build",
            module: ctx.module.clone(),
            reason: "make exited with 2".to_string(),
        })
    }
}

fn tarball(entries: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, contents) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, contents.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn widget_tarball() -> Vec<u8> {
    tarball(&[
        ("acme-widget-5f3e2a1/package.json", "{\"name\":\"widget\"}"),
        ("acme-widget-5f3e2a1/lib/widget.js", "exports.ok = true;"),
        ("acme-widget-5f3e2a1/bin/widget", "#!/bin/sh\necho widget\n"),
    ])
}

fn request(version: Option<&str>) -> ModuleRequest {
    ModuleRequest::new("acme", "widget", version.map(String::from), None).unwrap()
}

fn snapshot(dir: &Path) -> Vec<(String, String)> {
    let mut files: Vec<(String, String)> = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let contents = std::fs::read_to_string(&path).unwrap_or_default();
                files.push((path.strip_prefix(dir).unwrap().display().to_string(), contents));
            }
        }
    }
    files.sort();
    files
}

fn module_dir_entries(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(root.join("modules"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_fresh_install_records_master() {
    let root = TempDir::new().unwrap();
    let server = TarballServer::new(widget_tarball());
    let hooks = Arc::new(CountingHooks::default());
    let output = Arc::new(CapturedOutput::default());
    let installer = ModuleInstaller::new(root.path(), "github.com", server.clone(), hooks.clone(), output.clone());

    let outcome = installer.install(&request(None)).await.unwrap();

    let dest = root.path().join("modules/widget");
    assert_eq!(
        outcome,
        InstallOutcome::Installed {
            version: "master".to_string(),
            path: dest.clone(),
        }
    );
    assert_eq!(server.requests(), vec!["https://github.com/acme/widget/tarball/master"]);
    assert_eq!(hooks.runs.load(Ordering::SeqCst), 1);
    assert_eq!(std::fs::read_to_string(dest.join(".version_marker")).unwrap(), "master");
    assert_eq!(std::fs::read_to_string(dest.join("lib/widget.js")).unwrap(), "exports.ok = true;");
    assert!(!dest.join("acme-widget-5f3e2a1").exists());
    assert_eq!(module_dir_entries(root.path()), vec!["widget".to_string()]);
    assert_eq!(output.messages(), vec!["installing widget master", "installed widget master"]);
}

#[tokio::test]
async fn test_reinstall_same_version_is_noop() {
    let root = TempDir::new().unwrap();
    let server = TarballServer::new(widget_tarball());
    let output = Arc::new(CapturedOutput::default());
    let installer = ModuleInstaller::new(
        root.path(),
        "github.com",
        server.clone(),
        Arc::new(CountingHooks::default()),
        output.clone(),
    );

    installer.install(&request(Some("1.0.0"))).await.unwrap();
    let before = snapshot(root.path());

    let outcome = installer.install(&request(Some("1.0.0"))).await.unwrap();

    assert_eq!(outcome, InstallOutcome::AlreadyInstalled { version: "1.0.0".to_string() });
    assert_eq!(server.requests().len(), 1);
    assert_eq!(snapshot(root.path()), before);
    assert_eq!(output.messages().last().unwrap(), "already installed widget 1.0.0");
}

#[tokio::test]
async fn test_different_version_reports_outdated() {
    let root = TempDir::new().unwrap();
    let server = TarballServer::new(widget_tarball());
    let output = Arc::new(CapturedOutput::default());
    let installer = ModuleInstaller::new(
        root.path(),
        "github.com",
        server.clone(),
        Arc::new(CountingHooks::default()),
        output.clone(),
    );

    installer.install(&request(Some("1.0.0"))).await.unwrap();
    let before = snapshot(root.path());

    let outcome = installer.install(&request(Some("2.0.0"))).await.unwrap();

    assert_eq!(
        outcome,
        InstallOutcome::Outdated {
            installed: "1.0.0".to_string(),
            requested: "2.0.0".to_string(),
        }
    );
    assert_eq!(server.requests().len(), 1);
    assert_eq!(snapshot(root.path()), before);

    let messages = output.messages();
    assert!(messages.contains(&"outdated module widget 1.0.0 (requested 2.0.0)".to_string()));
    assert_eq!(
        messages.last().unwrap(),
        "update with $ rm -fr modules/widget && ndistrb acme widget 2.0.0"
    );
}

#[tokio::test]
async fn test_directory_without_marker_is_version_unknown() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("modules/widget/lib")).unwrap();
    std::fs::write(root.path().join("modules/widget/lib/widget.js"), "legacy").unwrap();
    let before = snapshot(root.path());

    let server = TarballServer::new(widget_tarball());
    let output = Arc::new(CapturedOutput::default());
    let installer = ModuleInstaller::new(
        root.path(),
        "github.com",
        server.clone(),
        Arc::new(CountingHooks::default()),
        output.clone(),
    );

    for version in [Some("0.3.0"), None] {
        let outcome = installer.install(&request(version)).await.unwrap();
        assert!(matches!(outcome, InstallOutcome::VersionUnknown { .. }));
    }

    assert!(server.requests().is_empty());
    assert_eq!(snapshot(root.path()), before);
    assert_eq!(output.messages()[0], "already installed widget, but version is unknown");
}

#[tokio::test]
async fn test_build_failure_leaves_unmarked_install() {
    let root = TempDir::new().unwrap();
    let server = TarballServer::new(widget_tarball());
    let output = Arc::new(CapturedOutput::default());
    let steps: Vec<Box<dyn BuildStep>> = vec![
        Box::new(BinaryLinker),
        Box::new(FailingBuild),
        Box::new(LibraryLinker),
    ];
    let hooks = Arc::new(HookRunner::with_steps(steps));
    let installer = ModuleInstaller::new(root.path(), "github.com", server.clone(), hooks, output.clone());

    let result = installer.install(&request(Some("1.0.0"))).await;

    match result {
        Err(NdistrbError::HookFailed { step, module, .. }) => {
            assert_eq!(step, "build");
            assert_eq!(module, "widget");
        }
        other => panic!("expected HookFailed, got {:?}", other),
    }

    let dest = root.path().join("modules/widget");
    assert!(dest.join("package.json").exists());
    assert!(!dest.join(".version_marker").exists());
    // bin ran before the failure, lib never did
    assert!(root.path().join("bin/widget").exists());
    assert!(!root.path().join("lib/widget").exists());

    // A second run does not retry the install
    assert_eq!(
        installer.resolve(&request(Some("1.0.0"))).unwrap(),
        Resolution::VersionUnknown { requested: "1.0.0".to_string() }
    );
    let outcome = installer.install(&request(Some("1.0.0"))).await.unwrap();
    assert!(matches!(outcome, InstallOutcome::VersionUnknown { .. }));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_truncated_archive_can_be_retried() {
    let root = TempDir::new().unwrap();
    let body = widget_tarball();
    let server = TarballServer::new(body[..body.len() / 2].to_vec());
    let hooks = Arc::new(CountingHooks::default());
    let installer = ModuleInstaller::new(
        root.path(),
        "github.com",
        server.clone(),
        hooks.clone(),
        Arc::new(CapturedOutput::default()),
    );

    let result = installer.install(&request(None)).await;

    assert!(matches!(result, Err(NdistrbError::Extraction { .. })));
    assert_eq!(hooks.runs.load(Ordering::SeqCst), 0);
    assert!(module_dir_entries(root.path()).is_empty());
    assert_eq!(installer.resolve(&request(None)).unwrap(), Resolution::Install);
}

#[tokio::test]
async fn test_fetch_failure_writes_nothing() {
    let root = TempDir::new().unwrap();
    let installer = ModuleInstaller::new(
        root.path(),
        "github.com",
        Arc::new(Unreachable),
        Arc::new(CountingHooks::default()),
        Arc::new(CapturedOutput::default()),
    );

    let result = installer.install(&request(Some("9.9.9"))).await;

    match result {
        Err(NdistrbError::DownloadFailed { url, .. }) => {
            assert_eq!(url, "https://github.com/acme/widget/tarball/9.9.9");
        }
        other => panic!("expected DownloadFailed, got {:?}", other),
    }
    assert!(!root.path().join("modules/widget").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_standard_hooks_link_bin_and_lib() {
    let root = TempDir::new().unwrap();
    let server = TarballServer::new(widget_tarball());
    let installer = ModuleInstaller::new(
        root.path(),
        "github.com",
        server,
        Arc::new(HookRunner::new()),
        Arc::new(CapturedOutput::default()),
    );
    let request = ModuleRequest::new("acme", "widget", None, Some("w".to_string())).unwrap();

    let outcome = installer.install(&request).await.unwrap();

    assert!(matches!(outcome, InstallOutcome::Installed { .. }));
    let dest = root.path().join("modules/widget");
    assert_eq!(
        std::fs::read_link(root.path().join("bin/widget")).unwrap(),
        dest.join("bin/widget")
    );
    assert_eq!(
        std::fs::read_link(root.path().join("lib/w")).unwrap(),
        dest.join("lib")
    );
    assert_eq!(std::fs::read_to_string(dest.join(".version_marker")).unwrap(), "master");
}
