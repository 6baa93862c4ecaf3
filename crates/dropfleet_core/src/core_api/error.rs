use std::error::Error;
use std::fmt;

/// Failures that abort a run before (or instead of) the tree walk.
///
/// Per-object problems never surface here; they are collected as
/// [`RunNote`](super::RunNote)s in the walk outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Parse,
    MissingObjectStates,
    Config,
}

impl CoreErrorCode {
    pub fn label(&self) -> &'static str {
        match *self {
            Self::Io => "I/O error",
            Self::Parse => "invalid save file",
            Self::MissingObjectStates => "not a TTS save",
            Self::Config => "invalid configuration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::Io, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(CoreErrorCode::Config, message)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(
            CoreErrorCode::Parse,
            format!("save file is not valid JSON: {err}"),
        )
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.label(), self.message)
    }
}

impl Error for CoreError {}
