//! The `connect.cmd` side channel read by the editor extension

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{CodeSyncError, Result};

/// Names the component behind the most recent export
///
/// One descriptor is shared by the whole work directory and the latest
/// export overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectDescriptor {
    /// Editor command that opens the transport connection
    pub command: String,
    /// Identifier of the exported component
    pub guid: String,
}

impl ConnectDescriptor {
    /// File name inside the work directory
    pub const FILE_NAME: &'static str = "connect.cmd";

    pub fn new(command_namespace: &str, guid: impl Into<String>) -> Self {
        Self {
            command: format!("{command_namespace}.connect"),
            guid: guid.into(),
        }
    }

    /// Read a descriptor; a missing file is `Ok(None)`
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CodeSyncError::io(path, e)),
        };

        let descriptor: Self = serde_json::from_str(&text)?;
        descriptor.validate()?;
        Ok(Some(descriptor))
    }

    pub fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(CodeSyncError::InvalidDescriptor("command is required".into()));
        }
        if self.guid.trim().is_empty() {
            return Err(CodeSyncError::InvalidDescriptor("guid is required".into()));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Source file this descriptor points at
    pub fn source_path_for(&self, dir: &Path, extension: &str) -> PathBuf {
        dir.join(format!("{}.{}", self.guid, extension))
    }
}
