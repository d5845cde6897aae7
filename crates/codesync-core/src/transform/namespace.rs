//! File-scoped namespace injection

use super::line_ending;

/// Start of every injected namespace declaration
pub const NAMESPACE_DECLARATION: &str = "namespace GH_Scripts_";

/// Whether a line is a `using` directive (as opposed to a `using` statement)
pub fn is_using_directive(line: &str) -> bool {
    let Some(rest) = line.trim_start().strip_prefix("using ") else {
        return false;
    };
    let rest = rest.trim_start();
    !rest.starts_with('(') && !rest.starts_with("var ")
}

/// Insert `namespace <name>;` and a blank line after the last `using` directive
///
/// Without any directive the declaration goes on the first line. No other
/// line is touched.
pub fn inject_namespace(code: &str, namespace: &str) -> String {
    let cr = if line_ending(code) == "\r\n" { "\r" } else { "" };
    let lines: Vec<&str> = code.split('\n').collect();
    let insert_at = lines
        .iter()
        .rposition(|line| is_using_directive(line))
        .map_or(0, |last| last + 1);

    let declaration = format!("namespace {namespace};{cr}");

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 2);
    out.extend_from_slice(&lines[..insert_at]);
    out.push(&declaration);
    out.push(cr);
    out.extend_from_slice(&lines[insert_at..]);
    out.join("\n")
}

/// Drop injected namespace declarations and the blank line following each
pub fn remove_namespace(code: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut after_declaration = false;

    for line in code.split('\n') {
        if std::mem::take(&mut after_declaration) && line.trim().is_empty() {
            continue;
        }
        if line.trim_start().starts_with(NAMESPACE_DECLARATION) {
            after_declaration = true;
            continue;
        }
        out.push(line);
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::component_id::NAMESPACE_PREFIX;

    #[test]
    fn test_declaration_matches_prefix() {
        assert_eq!(NAMESPACE_DECLARATION, format!("namespace {NAMESPACE_PREFIX}"));
    }

    #[test]
    fn test_using_statements_are_not_directives() {
        assert!(is_using_directive("using System;"));
        assert!(is_using_directive("  using static System.Math;"));
        assert!(is_using_directive("using Col = System.Collections;"));
        assert!(!is_using_directive("    using (var s = File.OpenRead(p))"));
        assert!(!is_using_directive("    using var s = File.OpenRead(p);"));
        assert!(!is_using_directive("// using System;"));
    }

    #[test]
    fn test_inserts_after_last_directive() {
        let code = "using A;\nusing B;\n\nclass C {}\n";
        let out = inject_namespace(code, "GH_Scripts_x");

        assert_eq!(out, "using A;\nusing B;\nnamespace GH_Scripts_x;\n\n\nclass C {}\n");
        assert_eq!(remove_namespace(&out), code);
    }

    #[test]
    fn test_inserts_at_top_without_directives() {
        let out = inject_namespace("class C {}", "GH_Scripts_x");
        assert_eq!(out, "namespace GH_Scripts_x;\n\nclass C {}");
    }

    #[test]
    fn test_body_using_statement_does_not_move_namespace() {
        let code = "using System.IO;\nvoid Run()\n{\n    using (var s = File.OpenRead(p)) { }\n}";
        let out = inject_namespace(code, "GH_Scripts_x");

        assert!(out.starts_with("using System.IO;\nnamespace GH_Scripts_x;\n\nvoid Run()"));
        assert_eq!(remove_namespace(&out), code);
    }

    #[test]
    fn test_removes_only_one_blank_line() {
        let code = "using A;\nnamespace GH_Scripts_x;\n\n\n\nclass C {}";
        assert_eq!(remove_namespace(code), "using A;\n\n\nclass C {}");
    }

    #[test]
    fn test_remove_without_declaration_is_noop() {
        let code = "namespace Other;\n\nclass C {}\r\n";
        assert_eq!(remove_namespace(code), code);
    }

    #[test]
    fn test_remove_when_user_deleted_blank_line() {
        let code = "using A;\nnamespace GH_Scripts_x;\nclass C {}";
        assert_eq!(remove_namespace(code), "using A;\nclass C {}");
    }
}
