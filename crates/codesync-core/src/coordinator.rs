//! Export and import of component sources through the work directory
//!
//! Export wraps a component's source and writes it, together with the
//! connect descriptor, the build descriptor and the usage guide, into the
//! shared work directory. Import strips the wrapping again and hands the
//! result back; applying it to the host is the caller's job.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, error, info, warn};

use crate::{
    build_descriptor::BuildDescriptor, descriptor::ConnectDescriptor, transform, CodeSyncConfig,
    CodeSyncError, ComponentId, Result,
};

const USAGE_GUIDE: &str = include_str!("../assets/USAGE.md");

/// File marking a work directory this crate created and may delete
pub const OWNER_MARKER: &str = ".gh-codesync";

/// Result of [`SyncCoordinator::cleanup_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The work directory was deleted
    Removed,
    /// There was nothing to delete
    Absent,
    /// The directory existed before any export and was left alone
    NotOwned,
    /// Deletion failed; the error was logged
    Failed,
}

/// Paths written by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    /// Wrapped source, `<id>.<ext>`
    pub source_path: PathBuf,
    /// Shared `connect.cmd`
    pub descriptor_path: PathBuf,
    /// Shared project file
    pub build_descriptor_path: PathBuf,
}

/// Stateless export/import service over one work directory
#[derive(Debug, Clone)]
pub struct SyncCoordinator {
    config: CodeSyncConfig,
}

impl SyncCoordinator {
    pub fn new(config: CodeSyncConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodeSyncConfig {
        &self.config
    }

    pub fn work_dir(&self) -> &Path {
        &self.config.work_dir
    }

    /// Path the wrapped source of a component is written to
    pub fn source_path(&self, component_id: &ComponentId) -> PathBuf {
        self.work_dir()
            .join(component_id.source_file_name(&self.config.source_extension))
    }

    /// Wrap a component's source and write the export files
    pub fn export_for_editing(
        &self,
        component_id: &ComponentId,
        raw_code: &str,
    ) -> Result<ExportedFiles> {
        self.write_export(component_id, raw_code)
            .inspect(|files| {
                info!(
                    "Exported component {component_id} to {}",
                    files.source_path.display()
                )
            })
            .inspect_err(|e| error!("Error preparing files for component {component_id}: {e}"))
    }

    fn write_export(&self, component_id: &ComponentId, raw_code: &str) -> Result<ExportedFiles> {
        let dir = self.work_dir();
        self.prepare()?;

        let source_path = self.source_path(component_id);
        let wrapped = transform::wrap(raw_code, component_id.as_str());
        self.write_file(&source_path, &wrapped)?;

        let build_descriptor_path = dir.join(BuildDescriptor::FILE_NAME);
        let build = BuildDescriptor::for_source(raw_code, &self.config.source_extension);
        self.write_file(&build_descriptor_path, &build.to_string())?;

        if self.config.write_usage_guide {
            self.write_file(&dir.join("README.md"), USAGE_GUIDE)?;
        }

        // Written last: the editor opens the source as soon as this changes.
        let descriptor_path = dir.join(ConnectDescriptor::FILE_NAME);
        let descriptor = ConnectDescriptor::new(&self.config.command_namespace, component_id.as_str());
        self.write_file(&descriptor_path, &descriptor.to_json()?)?;

        Ok(ExportedFiles {
            source_path,
            descriptor_path,
            build_descriptor_path,
        })
    }

    /// Strip the editor wrapping from code received for a component
    pub fn import_from_editing(&self, component_id: &str, ide_code: &str) -> String {
        let cleaned = transform::unwrap(ide_code);
        debug!(
            "Imported {} bytes for component {component_id:?} ({} after cleanup)",
            ide_code.len(),
            cleaned.len()
        );
        cleaned
    }

    /// Read a saved document from disk and strip its wrapping
    pub fn import_from_file(&self, component_id: &str, path: &Path) -> Result<String> {
        let ide_code = self
            .read_file(path)
            .inspect_err(|e| error!("Error reading edited source for {component_id:?}: {e}"))?;
        Ok(self.import_from_editing(component_id, &ide_code))
    }

    /// Descriptor of the latest export, if one exists
    pub fn current_descriptor(&self) -> Result<Option<ConnectDescriptor>> {
        ConnectDescriptor::load(&self.work_dir().join(ConnectDescriptor::FILE_NAME))
    }

    /// Create the work directory if needed
    ///
    /// A directory created here gets an [`OWNER_MARKER`] file; an existing
    /// directory is used as is and never marked.
    pub fn prepare(&self) -> Result<()> {
        let dir = self.work_dir();
        if dir.is_dir() {
            return Ok(());
        }

        fs::create_dir_all(dir).map_err(|e| CodeSyncError::io(dir, e))?;
        let marker = dir.join(OWNER_MARKER);
        fs::write(&marker, "Created by gh-codesync; deleted on cleanup.\n")
            .map_err(|e| CodeSyncError::io(marker, e))
    }

    /// Whether the work directory was created by [`prepare`](Self::prepare)
    pub fn owns_work_dir(&self) -> bool {
        self.work_dir().join(OWNER_MARKER).is_file()
    }

    /// Delete the work directory and everything in it
    ///
    /// Only a directory carrying the [`OWNER_MARKER`] is deleted. A missing
    /// directory is fine; failures are logged and swallowed.
    pub fn cleanup_all(&self) -> CleanupOutcome {
        let dir = self.work_dir();
        if !dir.exists() {
            debug!("Work directory {} already absent", dir.display());
            return CleanupOutcome::Absent;
        }
        if !self.owns_work_dir() {
            warn!(
                "Work directory {} was not created by gh-codesync; leaving it in place",
                dir.display()
            );
            return CleanupOutcome::NotOwned;
        }

        match fs::remove_dir_all(dir) {
            Ok(()) => {
                info!("Temporary files in {} cleaned up", dir.display());
                CleanupOutcome::Removed
            }
            Err(e) => {
                warn!("Error cleaning up temporary files in {}: {e}", dir.display());
                CleanupOutcome::Failed
            }
        }
    }

    /// Read a file, retrying while the editor may still hold it
    pub fn read_file(&self, path: &Path) -> Result<String> {
        self.with_retry(path, || fs::read_to_string(path))
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        self.with_retry(path, || fs::write(path, contents))
    }

    fn with_retry<T>(
        &self,
        path: &Path,
        mut operation: impl FnMut() -> std::io::Result<T>,
    ) -> Result<T> {
        let attempts = self.config.io_retries.max(1);
        let mut attempt = 1;

        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(e) if e.kind() != ErrorKind::NotFound && attempt < attempts => {
                    warn!(
                        "Attempt {attempt}/{attempts} on {} failed: {e}; retrying",
                        path.display()
                    );
                    std::thread::sleep(self.config.io_retry_delay);
                    attempt += 1;
                }
                Err(e) => return Err(CodeSyncError::io(path, e)),
            }
        }
    }
}

/// Owns the work directory for the lifetime of a sync session
///
/// Creating the guard creates the directory; dropping it removes the
/// directory with everything exported into it, unless the directory
/// already existed before activation.
pub struct WorkspaceGuard {
    coordinator: Arc<SyncCoordinator>,
}

impl WorkspaceGuard {
    pub fn activate(coordinator: Arc<SyncCoordinator>) -> Result<Self> {
        coordinator.prepare()?;
        Ok(Self { coordinator })
    }

    pub fn coordinator(&self) -> &Arc<SyncCoordinator> {
        &self.coordinator
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        let _ = self.coordinator.cleanup_all();
    }
}
