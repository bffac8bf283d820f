use thiserror::Error;

#[derive(Debug, Error)]
pub enum P4Error {
    #[error("p4 binary not found: {0}")]
    BinaryNotFound(String),
    #[error("Invalid argument: {0}")]
    Validation(String),
    #[error("{message}: {stderr}")]
    Operation { message: String, stderr: String },
    #[error("{message}. p4 stdout was '{stdout}' (stderr was '{stderr}')")]
    Protocol {
        message: String,
        stdout: String,
        stderr: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl P4Error {
    pub fn operation(message: impl Into<String>, stderr: &str) -> Self {
        Self::Operation {
            message: message.into(),
            stderr: stderr.trim().to_string(),
        }
    }

    pub fn protocol(message: impl Into<String>, stdout: &str, stderr: &str) -> Self {
        Self::Protocol {
            message: message.into(),
            stdout: stdout.to_string(),
            stderr: stderr.trim().to_string(),
        }
    }
}
