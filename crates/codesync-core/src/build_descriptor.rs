//! Project file generated next to exported sources
//!
//! The editor's C# tooling needs an SDK-style project to resolve RhinoCommon
//! and Grasshopper types. Packages the script pulls in through
//! `#r "nuget: ..."` directives are added as package references so that
//! commenting the directives out does not cost the editor their types.

use std::{
    collections::HashSet,
    fmt,
    sync::LazyLock,
};

use regex::Regex;

static NUGET_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*#r\s+"nuget:\s*([^,"\s]+)\s*(?:,\s*([^"\s]+)\s*)?""#)
        .expect("nuget directive pattern")
});

/// Version shared by the default RhinoCommon and Grasshopper references
pub const HOST_SDK_VERSION: &str = "8.18.25100.11001";

/// A `#r "nuget: <package>[, <version>]"` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDirective {
    pub package: String,
    pub version: Option<String>,
}

impl ReferenceDirective {
    /// Parse one line; anything other than a nuget directive yields `None`
    pub fn parse(line: &str) -> Option<Self> {
        let captures = NUGET_DIRECTIVE.captures(line)?;
        Some(Self {
            package: captures.get(1)?.as_str().to_string(),
            version: captures.get(2).map(|v| v.as_str().to_string()),
        })
    }

    /// Every nuget directive in a script, in source order
    pub fn extract_all(code: &str) -> Vec<Self> {
        code.lines().filter_map(Self::parse).collect()
    }
}

/// `<PackageReference Include=".." Version=".." />`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    pub include: String,
    pub version: Option<String>,
}

impl PackageReference {
    pub fn new(include: impl Into<String>, version: Option<&str>) -> Self {
        Self {
            include: include.into(),
            version: version.map(str::to_string),
        }
    }
}

/// Contents of `gh_component.csproj`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDescriptor {
    pub target_framework: String,
    pub lang_version: String,
    pub allow_unsafe_blocks: bool,
    pub packages: Vec<PackageReference>,
    /// Extension of the sources compiled by the project
    pub source_extension: String,
}

impl BuildDescriptor {
    /// File name the descriptor is written under
    pub const FILE_NAME: &'static str = "gh_component.csproj";

    pub fn default_packages() -> Vec<PackageReference> {
        vec![
            PackageReference::new("RhinoCommon", Some(HOST_SDK_VERSION)),
            PackageReference::new("Grasshopper", Some(HOST_SDK_VERSION)),
        ]
    }

    /// Descriptor for a script, merging its nuget directives into the defaults
    pub fn for_source(raw_code: &str, source_extension: &str) -> Self {
        let mut descriptor = Self {
            source_extension: source_extension.to_string(),
            ..Self::default()
        };
        descriptor.merge_directives(ReferenceDirective::extract_all(raw_code));
        descriptor
    }

    /// Add directive packages
    ///
    /// A directive naming a default package replaces its version when it
    /// gives one. Repeated directives for the same package keep the first.
    pub fn merge_directives(&mut self, directives: impl IntoIterator<Item = ReferenceDirective>) {
        let mut seen = HashSet::new();

        for directive in directives {
            if !seen.insert(directive.package.to_ascii_lowercase()) {
                continue;
            }

            let existing = self
                .packages
                .iter_mut()
                .find(|p| p.include.eq_ignore_ascii_case(&directive.package));

            match existing {
                Some(package) => {
                    if directive.version.is_some() {
                        package.version = directive.version;
                    }
                }
                None => self.packages.push(PackageReference {
                    include: directive.package,
                    version: directive.version,
                }),
            }
        }
    }
}

impl Default for BuildDescriptor {
    fn default() -> Self {
        Self {
            target_framework: "net48".to_string(),
            lang_version: "latest".to_string(),
            allow_unsafe_blocks: true,
            packages: Self::default_packages(),
            source_extension: "cs".to_string(),
        }
    }
}

impl fmt::Display for BuildDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<Project Sdk="Microsoft.NET.Sdk">"#)?;
        writeln!(f, "  <PropertyGroup>")?;
        writeln!(
            f,
            "    <TargetFramework>{}</TargetFramework>",
            escape_xml(&self.target_framework)
        )?;
        writeln!(f, "    <LangVersion>{}</LangVersion>", escape_xml(&self.lang_version))?;
        writeln!(f, "    <AllowUnsafeBlocks>{}</AllowUnsafeBlocks>", self.allow_unsafe_blocks)?;
        writeln!(f, "  </PropertyGroup>")?;

        writeln!(f, "  <ItemGroup>")?;
        for package in &self.packages {
            write!(f, r#"    <PackageReference Include="{}""#, escape_xml(&package.include))?;
            if let Some(version) = &package.version {
                write!(f, r#" Version="{}""#, escape_xml(version))?;
            }
            writeln!(f, " />")?;
        }
        writeln!(f, "  </ItemGroup>")?;

        writeln!(f, "  <ItemGroup>")?;
        writeln!(
            f,
            r#"    <Compile Include="*.{}" />"#,
            escape_xml(&self.source_extension)
        )?;
        writeln!(f, "  </ItemGroup>")?;
        writeln!(f, "</Project>")
    }
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_directive() {
        assert_eq!(
            ReferenceDirective::parse(r#"#r "nuget: Newtonsoft.Json, 13.0.1""#),
            Some(ReferenceDirective {
                package: "Newtonsoft.Json".into(),
                version: Some("13.0.1".into()),
            })
        );
        assert_eq!(
            ReferenceDirective::parse(r#"  #r "nuget:MathNet.Numerics""#),
            Some(ReferenceDirective {
                package: "MathNet.Numerics".into(),
                version: None,
            })
        );
        assert_eq!(ReferenceDirective::parse(r#"#r "System.Xml.dll""#), None);
        assert_eq!(ReferenceDirective::parse(r#"//#r "nuget: X, 1.0""#), None);
    }

    #[test]
    fn test_merge_with_defaults() {
        let code = concat!(
            "#r \"nuget: Newtonsoft.Json, 13.0.1\"\n",
            "#r \"nuget: grasshopper, 8.20.0\"\n",
            "#r \"nuget: Newtonsoft.Json, 12.0.0\"\n",
            "using System;\n",
        );
        let descriptor = BuildDescriptor::for_source(code, "cs");

        assert_eq!(
            descriptor.packages,
            vec![
                PackageReference::new("RhinoCommon", Some(HOST_SDK_VERSION)),
                PackageReference::new("Grasshopper", Some("8.20.0")),
                PackageReference::new("Newtonsoft.Json", Some("13.0.1")),
            ]
        );
    }

    #[test]
    fn test_render() {
        let mut descriptor = BuildDescriptor::default();
        descriptor.merge_directives([ReferenceDirective {
            package: "Odd&Name".into(),
            version: None,
        }]);

        let xml = descriptor.to_string();
        assert!(xml.starts_with("<Project Sdk=\"Microsoft.NET.Sdk\">\n"));
        assert!(xml.contains("    <TargetFramework>net48</TargetFramework>\n"));
        assert!(xml.contains("    <AllowUnsafeBlocks>true</AllowUnsafeBlocks>\n"));
        assert!(xml.contains(
            "    <PackageReference Include=\"RhinoCommon\" Version=\"8.18.25100.11001\" />\n"
        ));
        assert!(xml.contains("    <PackageReference Include=\"Odd&amp;Name\" />\n"));
        assert!(xml.contains("    <Compile Include=\"*.cs\" />\n"));
        assert!(xml.ends_with("</Project>\n"));
    }
}
