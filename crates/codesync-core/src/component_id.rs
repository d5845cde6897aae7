//! Component identifiers and the namespaces derived from them

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CodeSyncError, Result};

/// Prefix of every namespace injected into an exported document
pub const NAMESPACE_PREFIX: &str = "GH_Scripts_";

/// Characters no file name may contain on Windows
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Stable identifier of a host script component
///
/// Doubles as the exported file stem, so it must be usable as one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Validate an identifier received from the host or the editor
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let unsafe_stem = id.is_empty()
            || id == "."
            || id.contains("..")
            || id.chars().any(|c| RESERVED_CHARS.contains(&c) || c.is_control());

        if unsafe_stem {
            return Err(CodeSyncError::InvalidIdentifier(id));
        }
        Ok(Self(id))
    }

    /// Fresh identifier in the host's GUID format
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace injected into this component's exported document
    pub fn namespace(&self) -> String {
        derive_namespace(&self.0)
    }

    /// `<id>.<ext>`
    pub fn source_file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.0, extension)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the namespace name for an identifier
///
/// GUID-shaped ids (ASCII alphanumerics and `-`, not starting with `-`) map
/// to the prefix plus the id with `-` replaced by `_`. Anything else maps to
/// the prefix, a leading `_`, and the id with every character outside
/// `[A-Za-z0-9]` escaped as `_<hex>_`. The two forms never overlap, which
/// keeps distinct ids on distinct namespaces.
pub fn derive_namespace(id: &str) -> String {
    let guid_shaped = !id.is_empty()
        && !id.starts_with('-')
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    let mut name = String::with_capacity(NAMESPACE_PREFIX.len() + id.len() + 1);
    name.push_str(NAMESPACE_PREFIX);

    if guid_shaped {
        name.extend(id.chars().map(|c| if c == '-' { '_' } else { c }));
        return name;
    }

    name.push('_');
    for c in id.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c);
        } else {
            name.push_str(&format!("_{:x}_", c as u32));
        }
    }
    name
}
