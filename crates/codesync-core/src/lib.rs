//! # CodeSync Core
//!
//! Core implementation of the Grasshopper ⇄ external editor bridge:
//! - Source transforms that wrap a script component for the editor and
//!   strip the wrapping again on the way back
//! - Component identifiers and the namespaces derived from them
//! - Export files (wrapped source, connect descriptor, build descriptor)
//! - The component applier seam onto the host document model
//!
//! The transport and the command-line front end live in `codesync-web` and
//! `codesync-cli`; this crate performs no networking.

#![warn(clippy::all)]

pub mod applier;
pub mod build_descriptor;
pub mod component_id;
pub mod coordinator;
pub mod descriptor;
pub mod transform;

// Re-export commonly used types
pub use applier::{
    ComponentApplier, DocumentApplier, HostDocument, InMemoryDocument, ScriptComponent,
    ScriptObject,
};
pub use build_descriptor::{BuildDescriptor, PackageReference, ReferenceDirective};
pub use component_id::{derive_namespace, ComponentId, NAMESPACE_PREFIX};
pub use coordinator::{CleanupOutcome, ExportedFiles, SyncCoordinator, WorkspaceGuard, OWNER_MARKER};
pub use descriptor::ConnectDescriptor;
pub use transform::{unwrap, wrap};

/// CodeSync version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for CodeSync components
///
/// Honours `RUST_LOG`; falls back to `info` for the CodeSync crates. Calling
/// this more than once is harmless.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("codesync_core=info,codesync_web=info,codesync=info")
    });

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// How an empty target identifier is resolved by the applier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyTargetPolicy {
    /// An empty target updates nothing
    #[default]
    MatchNone,
    /// An empty target updates every script object in the document
    MatchAll,
}

/// Core CodeSync configuration
#[derive(Debug, Clone)]
pub struct CodeSyncConfig {
    /// Working directory shared by every export
    pub work_dir: std::path::PathBuf,
    /// Extension of exported source files
    pub source_extension: String,
    /// Prefix of the editor command named in the connect descriptor
    pub command_namespace: String,
    /// Attempts made when reading a file the editor may still hold locked
    pub io_retries: u32,
    /// Delay between read attempts
    pub io_retry_delay: std::time::Duration,
    /// Write the static usage guide next to the exported source
    pub write_usage_guide: bool,
    /// Resolution of an empty target identifier
    pub empty_target: EmptyTargetPolicy,
}

impl Default for CodeSyncConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("gh-codesync"),
            source_extension: "cs".to_string(),
            command_namespace: "GHCodeSync".to_string(),
            io_retries: 3,
            io_retry_delay: std::time::Duration::from_millis(100),
            write_usage_guide: true,
            empty_target: EmptyTargetPolicy::MatchNone,
        }
    }
}

/// Error types for CodeSync core operations
#[derive(thiserror::Error, Debug)]
pub enum CodeSyncError {
    /// File-system error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Identifier cannot name a component file
    #[error("Invalid component identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Connect descriptor is missing a required field
    #[error("Invalid connect descriptor: {0}")]
    InvalidDescriptor(String),

    /// More than one script object carries the target identifier
    #[error("Ambiguous target: {count} script components match {id}")]
    AmbiguousTarget { id: String, count: usize },

    /// No host document is available
    #[error("No active document")]
    NoActiveDocument,

    /// A host component refused an update
    #[error("Failed to update component {id}: {message}")]
    Component { id: String, message: String },
}

impl CodeSyncError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for CodeSync core operations
pub type Result<T> = std::result::Result<T, CodeSyncError>;
