//! Neutralising `#r` reference directives
//!
//! The host resolves `#r "nuget: ..."` itself; an editor's C# compiler
//! rejects the directive outside of a script file, so exported documents
//! carry it commented out.

use std::sync::LazyLock;

use regex::Regex;

/// Token that starts a reference directive
pub const DIRECTIVE_TOKEN: &str = "#r ";

static COMMENTED_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)//(\s*#r\s)").expect("commented directive pattern"));

/// Whether a line is a reference directive
pub fn is_directive(line: &str) -> bool {
    line.trim_start().starts_with(DIRECTIVE_TOKEN)
}

/// Prefix every directive line with `//`
pub fn comment_out_directives(code: &str) -> String {
    code.split('\n')
        .map(|line| {
            if is_directive(line) {
                format!("//{line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip the `//` in front of commented-out directives
///
/// Whitespace on either side of the comment marker is kept, so a line
/// produced by [`comment_out_directives`] comes back byte for byte.
pub fn restore_directives(code: &str) -> String {
    code.split('\n')
        .map(|line| COMMENTED_DIRECTIVE.replacen(line, 1, "${1}${2}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_comment_out() {
        let code = "#r \"nuget: Newtonsoft.Json, 13.0.1\"\n  #r \"System.Xml\"\nusing System;";
        assert_eq!(
            comment_out_directives(code),
            "//#r \"nuget: Newtonsoft.Json, 13.0.1\"\n//  #r \"System.Xml\"\nusing System;"
        );
    }

    #[test]
    fn test_restore_is_exact() {
        let code = "#r \"nuget: Newtonsoft.Json, 13.0.1\"\n  #r \"System.Xml\"\r\nusing System;";
        assert_eq!(restore_directives(&comment_out_directives(code)), code);
    }

    #[test]
    fn test_restore_tolerates_spacing() {
        assert_eq!(restore_directives("  //  #r \"x\""), "    #r \"x\"");
        assert_eq!(restore_directives("// #r \"x\""), " #r \"x\"");
    }

    #[test]
    fn test_other_lines_untouched() {
        let code = "// regular comment\n#region x\n//#region y\nint r = 1; // #r";
        assert_eq!(comment_out_directives(code), code);
        assert_eq!(restore_directives(code), code);
    }
}
