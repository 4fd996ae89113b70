use std::process::Stdio;

use crate::docker::DockerError;

/// Abstraction over container CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait DockerExecutor: Send + Sync {
    /// Execute a command and capture stdout.
    async fn exec(&self, args: &[String]) -> Result<String, DockerError>;

    /// Execute a command, streaming output to the terminal.
    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;
}

/// Runs a real docker-compatible CLI.
pub struct RealExecutor {
    program: String,
}

impl RealExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn not_found(&self, source: std::io::Error) -> DockerError {
        DockerError::NotFound {
            program: self.program.clone(),
            source,
        }
    }
}

impl Default for RealExecutor {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl DockerExecutor for RealExecutor {
    async fn exec(&self, args: &[String]) -> Result<String, DockerError> {
        tracing::debug!(program = %self.program, ?args, "exec");

        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.not_found(e))?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| DockerError::InvalidUtf8 {
                program: self.program.clone(),
                source: e,
            })
        } else {
            Err(DockerError::CommandFailed {
                program: self.program.clone(),
                args: args.to_vec(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }

    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError> {
        tracing::debug!(program = %self.program, ?args, "exec (streaming)");

        let status = tokio::process::Command::new(&self.program)
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| self.not_found(e))?;

        if status.success() {
            Ok(())
        } else {
            // stderr already reached the terminal
            Err(DockerError::CommandFailed {
                program: self.program.clone(),
                args: args.to_vec(),
                code: status.code(),
                stderr: String::new(),
            })
        }
    }
}
