use std::fmt;
use std::path::{Path, PathBuf};

use imgship_core::ImageRef;

use crate::docker::DockerError;
use crate::executor::{DockerExecutor, RealExecutor};

/// Container engine operations, parameterized over the executor for testability.
pub struct DockerClient<E: DockerExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new(program: &str) -> Self {
        Self {
            executor: RealExecutor::new(program),
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self {
            executor: RealExecutor::default(),
        }
    }
}

impl<E: DockerExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Build ──

    /// Build `context` with the recipe at `recipe`, tagging the result `image`.
    /// Toolchain output is streamed to the terminal.
    pub async fn build(
        &self,
        context: &Path,
        recipe: &Path,
        image: &ImageRef,
    ) -> Result<(), BuildError> {
        let context_str = path_str(context)?;
        let recipe_str = path_str(recipe)?;
        let image = image.to_string();

        tracing::debug!(%image, context = %context.display(), "building image");
        self.executor
            .exec_streaming(&args([
                "build", "--file", recipe_str, "--tag", &image, context_str,
            ]))
            .await
            .map_err(|e| BuildError::Build { source: e })
    }

    // ── Tag ──

    /// Add `target` as an alias of the existing local image `source`.
    pub async fn tag(&self, source: &ImageRef, target: &ImageRef) -> Result<(), TagError> {
        let source = source.to_string();
        let target = target.to_string();

        tracing::debug!(%source, %target, "tagging image");
        self.executor
            .exec(&args(["tag", &source, &target]))
            .await
            .map(|_| ())
            .map_err(|e| TagError::Tag { source: e })
    }

    // ── Push ──

    pub async fn push(&self, image: &ImageRef) -> Result<(), PushError> {
        let image = image.to_string();

        tracing::debug!(%image, "pushing image");
        self.executor
            .exec_streaming(&args(["push", &image]))
            .await
            .map_err(|e| PushError::Push { source: e })
    }

    // ── Local images ──

    pub async fn image_exists(&self, image: &ImageRef) -> bool {
        self.executor
            .exec(&args([
                "image",
                "inspect",
                "--format",
                "{{.Id}}",
                &image.to_string(),
            ]))
            .await
            .is_ok()
    }

    pub async fn remove_image(&self, image: &ImageRef) -> Result<(), DockerError> {
        self.executor
            .exec(&args(["image", "rm", &image.to_string()]))
            .await
            .map(|_| ())
    }

    // ── Doctor ──

    /// Check the CLI and the engine it talks to, without early return.
    pub async fn doctor(&self) -> DoctorReport {
        let mut report = DoctorReport::default();

        match self
            .executor
            .exec(&args(["version", "--format", "{{.Client.Version}}"]))
            .await
        {
            Ok(v) if !v.trim().is_empty() => report.cli = CheckResult::ok(v.trim()),
            Ok(_) => report.cli = CheckResult::ok("installed"),
            Err(e @ DockerError::NotFound { .. }) => {
                report.cli = CheckResult::fail(&e.to_string());
                report.engine = CheckResult::fail("skipped: CLI not available");
                return report;
            }
            // `docker version` exits non-zero when the daemon is down but the CLI works
            Err(e) => {
                tracing::debug!(error = %e, "version query failed; CLI present");
                report.cli = CheckResult::ok("installed");
            }
        }

        match self
            .executor
            .exec(&args(["info", "--format", "{{.ServerVersion}}"]))
            .await
        {
            Ok(v) if !v.trim().is_empty() => report.engine = CheckResult::ok(v.trim()),
            _ => report.engine = CheckResult::fail("engine not reachable; is the daemon running?"),
        }

        report
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

fn path_str(path: &Path) -> Result<&str, BuildError> {
    path.to_str()
        .ok_or_else(|| BuildError::InvalidPath(path.to_path_buf()))
}

// ── Doctor types ──

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub cli: CheckResult,
    pub engine: CheckResult,
    pub config_file: CheckResult,
    pub manifest: CheckResult,
    pub recipe: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.checks().iter().all(|(_, c)| c.passed)
    }

    fn checks(&self) -> [(&'static str, &CheckResult); 5] {
        [
            ("Container CLI", &self.cli),
            ("Container engine", &self.engine),
            ("Config file", &self.config_file),
            ("Dependency manifest", &self.manifest),
            ("Recipe", &self.recipe),
        ]
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, check) in self.checks() {
            writeln!(f, "[{}] {label:<20} {}", check.icon(), check.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),

    #[error("image build failed")]
    Build { source: DockerError },
}

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("image tag failed")]
    Tag { source: DockerError },
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("image push failed")]
    Push { source: DockerError },
}
