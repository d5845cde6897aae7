//! JSON envelopes exchanged with the editor extension
//!
//! Every WebSocket text frame carries exactly one envelope tagged by its
//! `type` field.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Messages sent by the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Saved editor contents for one component
    SetScript {
        /// Component identifier; `null` and missing read as empty
        #[serde(default)]
        target: Option<String>,
        /// Wrapped or already cleaned source
        #[serde(default)]
        code: Option<String>,
    },
    /// Liveness probe
    HealthCheck,
}

/// Messages sent back to the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// The component was updated and recomputed
    ScriptUpdated { target: String, status: UpdateStatus },
    /// The request failed
    Error { message: String },
    /// Reply to a liveness probe
    HealthCheck { status: HealthStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
}

impl ServerMessage {
    pub fn script_updated(target: impl Into<String>) -> Self {
        Self::ScriptUpdated {
            target: target.into(),
            status: UpdateStatus::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn health_ok() -> Self {
        Self::HealthCheck {
            status: HealthStatus::Ok,
        }
    }

    /// Serialize for a text frame
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Failure to make sense of an incoming frame
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("message has no \"type\" field")]
    MissingType,
}

/// Parse one incoming frame
///
/// Returns `Ok(None)` for a well-formed envelope of a type this server does
/// not handle; the caller logs and drops it.
pub fn parse_client_message(text: &str) -> Result<Option<ClientMessage>, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingType)?;

    match kind {
        "setScript" | "healthCheck" => Ok(Some(serde_json::from_value(value)?)),
        other => {
            tracing::warn!("Unknown message type: {other}");
            Ok(None)
        }
    }
}
