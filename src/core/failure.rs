use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Io,
    Format,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Io => write!(f, "io"),
            FailureKind::Format => write!(f, "format"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileFailure {
    pub kind: FailureKind,
    pub reason: String,
}

impl FileFailure {
    pub fn io(reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Io,
            reason: reason.into(),
        }
    }

    pub fn format(reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Format,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: String,
    pub kind: FailureKind,
    pub reason: String,
}
