use codesync_core::{derive_namespace, transform, unwrap, wrap};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const COMPONENT: &str = r#"// Grasshopper Script Instance
#region Usings
#r "nuget: Newtonsoft.Json, 13.0.1"
  #r "nuget: MathNet.Numerics"
using System;
using System.Collections.Generic;
using System.Drawing;

using Rhino;
using Rhino.Geometry;

using Grasshopper;
using Grasshopper.Kernel;
#endregion

public class Script_Instance : GH_ScriptInstance
{
    #region Notes
    /* Members inherited from the host */
    #endregion

    private void RunScript(object x, object y, ref object a)
    {
        using (var writer = new System.IO.StringWriter())
        {
            writer.Write(Newtonsoft.Json.JsonConvert.SerializeObject(x));
            Print(writer.ToString());
        }
        a = y;
    }
}
"#;

#[test]
fn test_component_round_trip() {
    let id = "5d1b0c3e-8a7f-4f2e-9c61-0d2e4b6a8f10";
    let wrapped = wrap(COMPONENT, id);

    assert!(wrapped.contains("//#r \"nuget: Newtonsoft.Json, 13.0.1\""));
    assert!(wrapped.contains("//  #r \"nuget: MathNet.Numerics\""));
    assert!(wrapped.contains(&format!("using Grasshopper.Kernel;\nnamespace {};\n\n#endregion", derive_namespace(id))));
    assert!(wrapped.contains("{\n    #region DummyMembers\n"));
    assert_eq!(unwrap(&wrapped), COMPONENT);
}

#[test]
fn test_reference_directive_round_trip() {
    let raw = "#r \"nuget: Newtonsoft.Json, 13.0.1\"\nusing System;\n";
    let wrapped = wrap(raw, "abcd-ef01");

    assert_eq!(wrapped.lines().next(), Some("//#r \"nuget: Newtonsoft.Json, 13.0.1\""));
    assert_eq!(unwrap(&wrapped), raw);
}

#[test]
fn test_unwrap_survives_missing_scaffold() {
    let wrapped = wrap(COMPONENT, "abcd-ef01");

    // User deleted the whole region and the namespace line.
    let start = wrapped.find("    #region DummyMembers").unwrap();
    let end = wrapped.find("    #endregion\n    #region Notes").unwrap() + "    #endregion".len();
    let edited = format!("{}{}", &wrapped[..start - 1], &wrapped[end..])
        .replace("namespace GH_Scripts_abcd_ef01;\n", "");

    let cleaned = unwrap(&edited);
    assert!(cleaned.contains("private void RunScript(object x, object y, ref object a)"));
    assert!(cleaned.contains("#r \"nuget: Newtonsoft.Json, 13.0.1\""));
    assert!(!cleaned.contains("DummyMembers"));
}

#[test]
fn test_unwrap_only_on_removal_markers() {
    let untouched = "namespace Mine;\n\nclass C\n{\n#region Other\n#endregion\n}\n";
    assert_eq!(unwrap(untouched), untouched);
    assert_eq!(transform::remove_dummy_members(untouched), untouched);
    assert_eq!(transform::remove_namespace(untouched), untouched);
    assert_eq!(transform::restore_directives(untouched), untouched);
}

fn source_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("using System;".to_string()),
        Just("using System.Linq;".to_string()),
        Just("  using static System.Math;".to_string()),
        Just("#r \"nuget: Newtonsoft.Json, 13.0.1\"".to_string()),
        Just("    #r \"System.Xml.dll\"".to_string()),
        Just("public class Script_Instance : GH_ScriptInstance".to_string()),
        Just("public class Script_Instance : GH_ScriptInstance {".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just("".to_string()),
        Just("    ".to_string()),
        Just("  #region Helpers".to_string()),
        Just("  #endregion".to_string()),
        Just("    using (var s = new MemoryStream()) { }".to_string()),
        "[ -~]{0,40}",
    ]
    .prop_filter("line collides with an injected marker", |line| {
        let trimmed = line.trim_start();
        let commented = trimmed
            .strip_prefix("//")
            .is_some_and(|rest| rest.trim_start().starts_with("#r") && rest.trim_start()[2..].starts_with(char::is_whitespace));
        !commented
            && !trimmed.starts_with("namespace GH_Scripts_")
            && !trimmed.starts_with("#region DummyMembers")
    })
}

fn source() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(source_line(), 0..24),
        prop::bool::ANY,
        prop::bool::ANY,
    )
        .prop_map(|(lines, crlf, trailing_newline)| {
            let newline = if crlf { "\r\n" } else { "\n" };
            let mut text = lines.join(newline);
            if trailing_newline && !lines.is_empty() {
                text.push_str(newline);
            }
            text
        })
}

fn component_id() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
        "[A-Za-z0-9_.-]{1,16}",
    ]
}

proptest! {
    #[test]
    fn prop_unwrap_inverts_wrap(code in source(), id in component_id()) {
        let wrapped = wrap(&code, &id);
        prop_assert_eq!(unwrap(&wrapped), code);
    }

    #[test]
    fn prop_unwrap_is_idempotent(code in source(), id in component_id()) {
        let once = unwrap(&wrap(&code, &id));
        prop_assert_eq!(unwrap(&once), once.clone());
    }

    #[test]
    fn prop_wrap_only_adds_lines(code in source(), id in component_id()) {
        let wrapped = wrap(&code, &id);
        let namespace = derive_namespace(&id);
        let declaration = format!("namespace {namespace};");
        prop_assert!(wrapped.lines().any(|line| line == declaration));
        prop_assert!(wrapped.len() > code.len());
    }

    #[test]
    fn prop_namespace_is_deterministic(a in component_id(), b in component_id()) {
        prop_assert_eq!(derive_namespace(&a), derive_namespace(&a));
        if a != b {
            prop_assert_ne!(derive_namespace(&a), derive_namespace(&b));
        }
    }
}
