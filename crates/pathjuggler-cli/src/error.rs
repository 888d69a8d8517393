use std::fmt;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// CLI usage error (missing args, invalid flags).
    Usage = 1,
    /// Input error (missing file, invalid YAML/JSON glyph data or settings).
    Input = 2,
    /// Processing error (batch aborted, output could not be written).
    Processing = 3,
    /// The batch completed with warnings and `--strict` was given.
    Warnings = 4,
}

impl From<ErrorCode> for ExitCode {
    fn from(code: ErrorCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Usage,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Input,
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Processing,
            message: message.into(),
        }
    }

    pub fn warnings(count: usize) -> Self {
        Self {
            code: ErrorCode::Warnings,
            message: format!("{count} warning(s) reported"),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}
