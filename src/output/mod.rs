#[cfg(target_os = "linux")]
pub mod uinput_sink;

use crate::pointer::Report;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create virtual pointer: {0}")]
    CreateFailed(#[source] io::Error),
    #[error("failed to write to virtual pointer: {0}")]
    WriteFailed(#[source] io::Error),
}

impl OutputError {
    pub fn is_permission_denied(&self) -> bool {
        match self {
            OutputError::CreateFailed(e) | OutputError::WriteFailed(e) => {
                e.kind() == io::ErrorKind::PermissionDenied
            }
        }
    }
}

/// Receives reports from the gesture engine. One call is one write: the
/// device never sees another caller's reports interleaved with these.
pub trait CommandSink {
    fn send(&mut self, reports: &[Report]) -> Result<(), OutputError>;
}
