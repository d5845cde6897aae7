//! Envelope handling for editor connections

use std::sync::Arc;

use codesync_core::SyncCoordinator;
use tracing::{info, warn};

use crate::{
    host::HostHandle,
    protocol::{parse_client_message, ClientMessage, ServerMessage},
};

/// Turns editor envelopes into component updates
#[derive(Clone)]
pub struct MessageHandler {
    coordinator: Arc<SyncCoordinator>,
    host: HostHandle,
}

impl MessageHandler {
    pub fn new(coordinator: Arc<SyncCoordinator>, host: HostHandle) -> Self {
        Self { coordinator, host }
    }

    /// Handle one text frame, returning the reply to send, if any
    pub async fn handle_text(&self, text: &str) -> Option<ServerMessage> {
        match parse_client_message(text) {
            Ok(Some(message)) => Some(self.handle(message).await),
            Ok(None) => None,
            Err(e) => {
                warn!("Error handling message: {e}");
                Some(ServerMessage::error(format!("Failed to process message: {e}")))
            }
        }
    }

    pub async fn handle(&self, message: ClientMessage) -> ServerMessage {
        match message {
            ClientMessage::HealthCheck => ServerMessage::health_ok(),
            ClientMessage::SetScript { target, code } => {
                self.set_script(target.unwrap_or_default(), code.unwrap_or_default())
                    .await
            }
        }
    }

    async fn set_script(&self, target: String, code: String) -> ServerMessage {
        if code.is_empty() {
            warn!("Received empty code for component '{target}'");
            return ServerMessage::error("Code content is empty");
        }

        let cleaned = self.coordinator.import_from_editing(&target, &code);

        match self.host.apply(target.as_str(), cleaned).await {
            Ok(true) => {
                info!("Script updated for component '{target}'");
                ServerMessage::script_updated(target)
            }
            Ok(false) => {
                warn!("No matching script component found for '{target}'");
                ServerMessage::error("No matching script component found")
            }
            Err(e) => {
                warn!("Failed to update component '{target}': {e}");
                ServerMessage::error(e.to_string())
            }
        }
    }
}
