//! Applying edited source to live host components
//!
//! The host's object model is reached only through [`HostDocument`] and
//! [`ScriptObject`]. A host binding adapts its own objects to these traits;
//! [`DocumentApplier`] holds the lookup and update policy on top of them.
//! [`InMemoryDocument`] is a self-contained host used by tests and by the
//! headless server.

use std::path::Path;

use tracing::{debug, info};

use crate::{CodeSyncError, ComponentId, EmptyTargetPolicy, Result};

/// A script component in the host document
pub trait ScriptObject: Send {
    /// Host identifier of the component
    fn id(&self) -> &str;

    /// Current source text
    fn source(&self) -> &str;

    /// Replace the source text
    fn set_source(&mut self, code: &str) -> Result<()>;

    /// Expire the component so the host recomputes it
    fn refresh(&mut self) -> Result<()>;
}

/// The script components of one host document
pub trait HostDocument: Send {
    /// Whether the document can currently be read and mutated
    fn is_active(&self) -> bool {
        true
    }

    fn script_count(&self) -> usize;

    fn script_at(&self, index: usize) -> Option<&dyn ScriptObject>;

    fn script_at_mut(&mut self, index: usize) -> Option<&mut dyn ScriptObject>;
}

/// Applies cleaned source to the component with a given identifier
pub trait ComponentApplier: Send {
    /// Set the source of the matching component and trigger recomputation
    ///
    /// Returns `Ok(false)` when no component matched.
    fn apply_source(&mut self, component_id: &str, cleaned_code: &str) -> Result<bool>;

    /// Source of the component with this identifier, if any
    fn read_source(&self, component_id: &str) -> Result<Option<String>>;
}

/// [`ComponentApplier`] over any [`HostDocument`]
pub struct DocumentApplier<D> {
    document: D,
    empty_target: EmptyTargetPolicy,
}

impl<D: HostDocument> DocumentApplier<D> {
    pub fn new(document: D, empty_target: EmptyTargetPolicy) -> Self {
        Self {
            document,
            empty_target,
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    fn matching_indices(&self, component_id: &str) -> Vec<usize> {
        (0..self.document.script_count())
            .filter(|&index| {
                self.document
                    .script_at(index)
                    .is_some_and(|script| script.id() == component_id)
            })
            .collect()
    }
}

impl<D: HostDocument> ComponentApplier for DocumentApplier<D> {
    fn apply_source(&mut self, component_id: &str, cleaned_code: &str) -> Result<bool> {
        if !self.document.is_active() {
            return Err(CodeSyncError::NoActiveDocument);
        }

        let targets: Vec<usize> = if component_id.is_empty() {
            match self.empty_target {
                EmptyTargetPolicy::MatchNone => {
                    debug!("Empty target identifier; nothing updated");
                    return Ok(false);
                }
                EmptyTargetPolicy::MatchAll => (0..self.document.script_count()).collect(),
            }
        } else {
            let matches = self.matching_indices(component_id);
            if matches.len() > 1 {
                return Err(CodeSyncError::AmbiguousTarget {
                    id: component_id.to_string(),
                    count: matches.len(),
                });
            }
            matches
        };

        let mut updated = 0;
        for index in targets {
            let Some(script) = self.document.script_at_mut(index) else {
                continue;
            };
            script.set_source(cleaned_code)?;
            script.refresh()?;
            info!("Updated script component {}", script.id());
            updated += 1;
        }

        Ok(updated > 0)
    }

    fn read_source(&self, component_id: &str) -> Result<Option<String>> {
        if !self.document.is_active() {
            return Err(CodeSyncError::NoActiveDocument);
        }

        Ok(self
            .matching_indices(component_id)
            .first()
            .and_then(|&index| self.document.script_at(index))
            .map(|script| script.source().to_string()))
    }
}

/// Script component held by [`InMemoryDocument`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptComponent {
    id: String,
    source: String,
    expired: bool,
    solutions: usize,
}

impl ScriptComponent {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            expired: false,
            solutions: 0,
        }
    }

    /// Whether the component was expired since it was created
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Number of recomputations requested
    pub fn solutions(&self) -> usize {
        self.solutions
    }
}

impl ScriptObject for ScriptComponent {
    fn id(&self) -> &str {
        &self.id
    }

    fn source(&self) -> &str {
        &self.source
    }

    fn set_source(&mut self, code: &str) -> Result<()> {
        self.source = code.to_string();
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.expired = true;
        self.solutions += 1;
        Ok(())
    }
}

/// Host document kept entirely in memory
#[derive(Debug, Clone)]
pub struct InMemoryDocument {
    components: Vec<ScriptComponent>,
    active: bool,
}

impl Default for InMemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
            active: true,
        }
    }

    /// Add a component under a fresh identifier
    pub fn add_script(&mut self, source: impl Into<String>) -> ComponentId {
        let id = ComponentId::generate();
        self.components
            .push(ScriptComponent::new(id.as_str(), source));
        id
    }

    pub fn push(&mut self, component: ScriptComponent) {
        self.components.push(component);
    }

    pub fn with_component(mut self, component: ScriptComponent) -> Self {
        self.push(component);
        self
    }

    pub fn get(&self, id: &str) -> Option<&ScriptComponent> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn components(&self) -> &[ScriptComponent] {
        &self.components
    }

    /// Simulate the document being closed
    pub fn close(&mut self) {
        self.active = false;
    }

    /// Load every `<id>.<extension>` file in a directory as a component
    pub fn load_dir(dir: &Path, extension: &str) -> Result<Self> {
        let mut document = Self::new();
        let entries = std::fs::read_dir(dir).map_err(|e| CodeSyncError::io(dir, e))?;

        for entry in entries {
            let path = entry.map_err(|e| CodeSyncError::io(dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let id = ComponentId::new(stem)?;
            let source = std::fs::read_to_string(&path).map_err(|e| CodeSyncError::io(&path, e))?;
            debug!("Loaded script component {id} from {}", path.display());
            document.push(ScriptComponent::new(id.as_str(), source));
        }

        document.components.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(document)
    }
}

impl HostDocument for InMemoryDocument {
    fn is_active(&self) -> bool {
        self.active
    }

    fn script_count(&self) -> usize {
        self.components.len()
    }

    fn script_at(&self, index: usize) -> Option<&dyn ScriptObject> {
        self.components
            .get(index)
            .map(|c| c as &dyn ScriptObject)
    }

    fn script_at_mut(&mut self, index: usize) -> Option<&mut dyn ScriptObject> {
        self.components
            .get_mut(index)
            .map(|c| c as &mut dyn ScriptObject)
    }
}
