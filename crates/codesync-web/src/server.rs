//! Web server implementation for CodeSync
//!
//! Serves the editor WebSocket and a small HTTP API on the loopback
//! interface.

use std::{future::Future, net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use codesync_core::{ComponentApplier, ComponentId, SyncCoordinator, WorkspaceGuard};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Serialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::{
    handler::MessageHandler,
    host::{HostError, HostExecutor, HostHandle},
};

/// Web server configuration
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SyncCoordinator>,
    pub host: HostHandle,
    pub handler: MessageHandler,
}

impl AppState {
    pub fn new(coordinator: Arc<SyncCoordinator>, host: HostHandle) -> Self {
        let handler = MessageHandler::new(coordinator.clone(), host.clone());
        Self {
            coordinator,
            host,
            handler,
        }
    }
}

/// Paths written by an export request
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub target: String,
    pub source_path: String,
    pub descriptor_path: String,
    pub build_descriptor_path: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Web server bridging the editor and the host
pub struct WebServer {
    /// Server configuration
    config: WebServerConfig,
    /// Application state
    state: AppState,
}

impl WebServer {
    pub fn new(config: WebServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/", get(websocket_handler))
            .route("/ws", get(websocket_handler))
            .route("/api/health", get(health_handler))
            .route("/api/export/:id", post(export_handler))
            .with_state(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(ServiceBuilder::new().layer(CorsLayer::permissive()));
        }

        router
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn start(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse::<SocketAddr>()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let app = self.router();
        info!("CodeSync server listening on ws://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("CodeSync server stopped");
        Ok(())
    }
}

/// Run a complete sync session until Ctrl-C
///
/// Activates the work directory, starts the host executor around
/// `applier`, serves editor connections, and on shutdown drains the host
/// queue before the work directory is removed.
pub async fn run_session<A>(
    config: WebServerConfig,
    coordinator: Arc<SyncCoordinator>,
    applier: A,
) -> Result<()>
where
    A: ComponentApplier + 'static,
{
    let guard = WorkspaceGuard::activate(coordinator.clone())?;
    let executor = HostExecutor::spawn(applier)?;
    let state = AppState::new(coordinator, executor.handle());

    let outcome = WebServer::new(config, state)
        .start(shutdown_signal())
        .await;

    executor.shutdown().await;
    drop(guard);
    outcome
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
    }
}

/// WebSocket connection handler
async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

/// Handle one editor connection
///
/// Frames are processed one at a time so saves from the same editor reach
/// the host in the order they were sent.
async fn handle_websocket(socket: WebSocket, state: AppState) {
    info!("Editor connected");
    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!("WebSocket error: {e}");
                break;
            }
        };

        let Some(reply) = state.handler.handle_text(&text).await else {
            continue;
        };
        let json = match reply.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to encode reply: {e}");
                continue;
            }
        };
        if sender.send(Message::Text(json)).await.is_err() {
            break;
        }
    }

    info!("Editor disconnected");
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}

/// Export a component's current source for editing
async fn export_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExportResponse>, ApiError> {
    let component_id =
        ComponentId::new(id).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let source = match state.host.read_source(component_id.as_str()).await {
        Ok(Some(source)) => source,
        Ok(None) => {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                "No matching script component found",
            ))
        }
        Err(HostError::Stopped) => {
            return Err(api_error(StatusCode::SERVICE_UNAVAILABLE, "Host is not running"))
        }
        Err(e) => return Err(api_error(StatusCode::CONFLICT, e.to_string())),
    };

    let coordinator = state.coordinator.clone();
    let target = component_id.clone();
    let files = tokio::task::spawn_blocking(move || coordinator.export_for_editing(&target, &source))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(ExportResponse {
        target: component_id.to_string(),
        source_path: files.source_path.display().to_string(),
        descriptor_path: files.descriptor_path.display().to_string(),
        build_descriptor_path: files.build_descriptor_path.display().to_string(),
    }))
}
