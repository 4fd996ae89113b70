#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("{program} CLI not found; install Docker (https://docs.docker.com/get-docker/) or set [docker].program")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} command failed: {args:?}{}", format_stderr(stderr))]
    CommandFailed {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },
}

impl DockerError {
    /// Process exit status to surface for this failure.
    ///
    /// A failed command reports its own non-zero code; anything else is `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{trimmed}")
    }
}
