//! Editor-side wrapping of script component source
//!
//! [`wrap`] prepares a component's raw source for an external editor:
//! reference directives are commented out, a namespace derived from the
//! component id is declared after the `using` block, and a region of dummy
//! members is placed inside the script class so the editor can resolve the
//! globals the host injects at run time. [`unwrap`] undoes the three steps
//! in reverse order.
//!
//! For source that does not itself contain the injected markers,
//! `unwrap(&wrap(code, id)) == code` holds exactly, line endings included.
//! Neither direction fails: a step whose marker is absent is skipped.

pub mod directives;
pub mod namespace;
pub mod scaffold;

pub use directives::{comment_out_directives, restore_directives};
pub use namespace::{inject_namespace, remove_namespace};
pub use scaffold::{inject_dummy_members, remove_dummy_members, CLASS_MARKER};

use crate::component_id::derive_namespace;

/// Wrap raw component source for editing under the namespace of `id`
pub fn wrap(raw_code: &str, id: &str) -> String {
    let code = comment_out_directives(raw_code);
    let code = inject_namespace(&code, &derive_namespace(id));
    inject_dummy_members(&code)
}

/// Strip everything [`wrap`] added, recovering the component source
pub fn unwrap(ide_code: &str) -> String {
    let code = remove_dummy_members(ide_code);
    let code = remove_namespace(&code);
    restore_directives(&code)
}

/// Line terminator used for injected lines
///
/// Documents that already use CRLF get CRLF so the editor does not see
/// mixed endings.
pub(crate) fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}
