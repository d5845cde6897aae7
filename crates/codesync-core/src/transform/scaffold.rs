//! Dummy member region for the script class
//!
//! The host compiles `Script_Instance` against members it provides itself
//! (document handles, `Print`, `Reflect`, the `InvokeRunScript` override).
//! An editor has no such context, so the exported document declares stubs
//! for them inside a region the user is told not to touch.

use std::borrow::Cow;

use super::line_ending;

/// Marks the class that receives the dummy members
pub const CLASS_MARKER: &str = "public class Script_Instance";

/// First line of the injected region
pub const REGION_START: &str = "#region DummyMembers";

/// Last line of the injected region
pub const REGION_END: &str = "#endregion";

const DUMMY_MEMBERS: &[&str] = &[
    "    #region DummyMembers",
    "    // Dummy implementation for editor IntelliSense (do not touch this region)",
    "    RhinoDoc RhinoDocument;",
    "    GH_Document GrasshopperDocument;",
    "    IGH_Component Component;",
    "    int Iteration;",
    "    public override void InvokeRunScript(IGH_Component owner,",
    "                                        object rhinoDocument,",
    "                                        int iteration,",
    "                                        List<object> inputs,",
    "                                        IGH_DataAccess DA)",
    "    {",
    "        throw new NotImplementedException();",
    "    }",
    "    private void Print(string text) { throw new NotImplementedException(); }",
    "    private void Print(string format, params object[] args) { throw new NotImplementedException(); }",
    "    private void Reflect(object obj) { throw new NotImplementedException(); }",
    "    private void Reflect(object obj, string method_name) { throw new NotImplementedException(); }",
    "    #endregion",
];

/// Insert the dummy member region right after the script class's `{`
///
/// The region starts on a new line and ends without one, so whatever
/// followed the brace continues after `#endregion`. Code without the class
/// marker, or without a brace after it, is returned as is.
pub fn inject_dummy_members(code: &str) -> String {
    let Some(marker) = code.find(CLASS_MARKER) else {
        return code.to_string();
    };
    let Some(offset) = code[marker..].find('{') else {
        return code.to_string();
    };
    let after_brace = marker + offset + 1;

    let newline = line_ending(code);
    let region = DUMMY_MEMBERS.join(newline);

    let mut out = String::with_capacity(code.len() + newline.len() + region.len());
    out.push_str(&code[..after_brace]);
    out.push_str(newline);
    out.push_str(&region);
    out.push_str(&code[after_brace..]);
    out
}

/// Remove the dummy member region
///
/// Text after `#endregion` on its closing line is joined back onto the line
/// before the region, which undoes [`inject_dummy_members`] exactly. A region
/// that is never closed is left alone rather than swallowing the rest of
/// the file.
pub fn remove_dummy_members(code: &str) -> String {
    let mut out: Vec<Cow<'_, str>> = Vec::new();
    let mut in_region = false;

    for line in code.split('\n') {
        let trimmed = line.trim_start();

        if !in_region {
            if trimmed.starts_with(REGION_START) {
                in_region = true;
            } else {
                out.push(Cow::Borrowed(line));
            }
            continue;
        }

        if let Some(tail) = trimmed.strip_prefix(REGION_END) {
            in_region = false;
            rejoin(&mut out, tail);
        }
    }

    if in_region {
        tracing::warn!("{REGION_START} region is not closed; leaving it in place");
        return code.to_string();
    }

    out.join("\n")
}

/// Join the rest of the `#endregion` line onto the line holding the brace.
/// That line ends in the `\r` of the injected CRLF, if any, which goes too.
fn rejoin(out: &mut Vec<Cow<'_, str>>, tail: &str) {
    match out.pop() {
        Some(previous) => {
            let mut joined = previous.into_owned();
            if joined.ends_with('\r') {
                joined.pop();
            }
            joined.push_str(tail);
            out.push(Cow::Owned(joined));
        }
        None if !tail.is_empty() => out.push(Cow::Owned(tail.to_string())),
        None => {}
    }
}
