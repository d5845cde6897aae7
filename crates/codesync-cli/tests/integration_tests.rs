use std::fs;

use codesync_cli::{Cli, CliCommand};
use codesync_core::CodeSyncConfig;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SOURCE: &str = "#r \"nuget: Newtonsoft.Json, 13.0.1\"\r\nusing System;\r\n\r\npublic class Script_Instance : GH_ScriptInstance\r\n{\r\n  private void RunScript(ref object a) { a = 1; }\r\n}\r\n";

fn cli(temp_dir: &TempDir) -> Cli {
    Cli::new(CodeSyncConfig {
        work_dir: temp_dir.path().join("work"),
        ..Default::default()
    })
}

#[test]
fn test_export_then_import() {
    let temp_dir = TempDir::new().unwrap();
    let cli = cli(&temp_dir);
    let raw = temp_dir.path().join("script.cs");
    fs::write(&raw, SOURCE).unwrap();

    let output = cli
        .handle_command(CliCommand::Export {
            id: "abcd-ef01".to_string(),
            file: raw,
        })
        .unwrap();
    assert!(output.contains("Exported abcd-ef01"));

    let exported = temp_dir.path().join("work/abcd-ef01.cs");
    let wrapped = fs::read_to_string(&exported).unwrap();
    assert!(wrapped.contains("namespace GH_Scripts_abcd_ef01;\r\n"));

    let cleaned = cli
        .handle_command(CliCommand::Import {
            id: "abcd-ef01".to_string(),
            file: exported,
            out: None,
        })
        .unwrap();
    assert_eq!(cleaned, SOURCE);
}

#[test]
fn test_import_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let cli = cli(&temp_dir);
    let edited = temp_dir.path().join("edited.cs");
    fs::write(&edited, "//#r \"System.Xml.dll\"\nnamespace GH_Scripts_abcd_ef01;\n\nint x;\n").unwrap();
    let out = temp_dir.path().join("out/clean.cs");

    let output = cli
        .handle_command(CliCommand::Import {
            id: "abcd-ef01".to_string(),
            file: edited,
            out: Some(out.clone()),
        })
        .unwrap();

    assert!(output.contains("Wrote cleaned source"));
    assert_eq!(fs::read_to_string(out).unwrap(), "#r \"System.Xml.dll\"\nint x;\n");
}

#[test]
fn test_descriptor_and_cleanup() {
    let temp_dir = TempDir::new().unwrap();
    let cli = cli(&temp_dir);

    let output = cli.handle_command(CliCommand::Descriptor).unwrap();
    assert!(output.starts_with("No component exported"));
    let output = cli.handle_command(CliCommand::Cleanup).unwrap();
    assert!(output.starts_with("Nothing to remove"));

    let raw = temp_dir.path().join("script.cs");
    fs::write(&raw, "int x;").unwrap();
    cli.handle_command(CliCommand::Export {
        id: "abcd-ef01".to_string(),
        file: raw,
    })
    .unwrap();

    let output = cli.handle_command(CliCommand::Descriptor).unwrap();
    let descriptor: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(descriptor["command"], "GHCodeSync.connect");
    assert_eq!(descriptor["guid"], "abcd-ef01");

    let output = cli.handle_command(CliCommand::Cleanup).unwrap();
    assert!(output.starts_with("Removed"));
    assert!(!cli.coordinator().work_dir().exists());
}

#[test]
fn test_cleanup_leaves_existing_directory() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "mine").unwrap();
    let cli = Cli::new(CodeSyncConfig {
        work_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    });

    let output = cli.handle_command(CliCommand::Cleanup).unwrap();
    assert!(output.starts_with("Left"));
    assert!(temp_dir.path().join("notes.txt").is_file());
}

#[test]
fn test_invalid_id_and_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let cli = cli(&temp_dir);

    assert!(cli
        .handle_command(CliCommand::Export {
            id: "../escape".to_string(),
            file: temp_dir.path().join("script.cs"),
        })
        .is_err());

    assert!(cli
        .handle_command(CliCommand::Import {
            id: "abcd-ef01".to_string(),
            file: temp_dir.path().join("missing.cs"),
            out: None,
        })
        .is_err());
}
