//! Offline commands operating on the work directory

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use codesync_core::{CleanupOutcome, CodeSyncConfig, ComponentId, SyncCoordinator};

/// Commands understood by [`Cli::handle_command`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Wrap a raw script file and write the export files
    Export { id: String, file: PathBuf },
    /// Strip the wrapping from an edited file
    Import {
        id: String,
        file: PathBuf,
        out: Option<PathBuf>,
    },
    /// Remove the work directory
    Cleanup,
    /// Show the connect descriptor of the latest export
    Descriptor,
}

/// Command-line front end over a [`SyncCoordinator`]
pub struct Cli {
    coordinator: SyncCoordinator,
}

impl Cli {
    pub fn new(config: CodeSyncConfig) -> Self {
        Self {
            coordinator: SyncCoordinator::new(config),
        }
    }

    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    /// Run a command and return the text to print
    pub fn handle_command(&self, command: CliCommand) -> Result<String> {
        match command {
            CliCommand::Export { id, file } => {
                let id = ComponentId::new(id)?;
                let raw = fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let files = self.coordinator.export_for_editing(&id, &raw)?;
                Ok(format!(
                    "Exported {id}\n  source:     {}\n  descriptor: {}\n  project:    {}",
                    files.source_path.display(),
                    files.descriptor_path.display(),
                    files.build_descriptor_path.display()
                ))
            }
            CliCommand::Import { id, file, out } => {
                let cleaned = self.coordinator.import_from_file(&id, &file)?;
                match out {
                    Some(out) => {
                        write_output(&out, &cleaned)?;
                        Ok(format!("Wrote cleaned source for {id} to {}", out.display()))
                    }
                    None => Ok(cleaned),
                }
            }
            CliCommand::Cleanup => {
                let dir = self.coordinator.work_dir().display();
                match self.coordinator.cleanup_all() {
                    CleanupOutcome::Removed => Ok(format!("Removed {dir}")),
                    CleanupOutcome::Absent => Ok(format!("Nothing to remove at {dir}")),
                    CleanupOutcome::NotOwned => Ok(format!(
                        "Left {dir} in place: it was not created by codesync"
                    )),
                    CleanupOutcome::Failed => bail!("Failed to remove {dir}"),
                }
            }
            CliCommand::Descriptor => match self.coordinator.current_descriptor()? {
                Some(descriptor) => Ok(descriptor.to_json()?),
                None => Ok(format!(
                    "No component exported to {}",
                    self.coordinator.work_dir().display()
                )),
            },
        }
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .value_name("ID")
        .help("Component identifier")
        .required(true)
}

fn file_arg(help: &'static str) -> Arg {
    Arg::new("file")
        .value_name("FILE")
        .help(help)
        .required(true)
        .index(1)
        .value_parser(value_parser!(PathBuf))
}

/// Build the `codesync` command line
pub fn build_cli() -> Command {
    Command::new("codesync")
        .version(codesync_core::VERSION)
        .about("Edit Grasshopper C# script components in an external editor")
        .subcommand_required(true)
        .arg(
            Arg::new("work-dir")
                .long("work-dir")
                .value_name("DIR")
                .help("Directory receiving exported files")
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .subcommand(
            Command::new("export")
                .about("Wrap a script for the editor and write the export files")
                .arg(id_arg())
                .arg(file_arg("Raw script source")),
        )
        .subcommand(
            Command::new("import")
                .about("Strip the editor wrapping from a saved file")
                .arg(id_arg())
                .arg(file_arg("Edited source"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_name("FILE")
                        .help("Write the cleaned source here instead of stdout")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(Command::new("cleanup").about("Remove the work directory"))
        .subcommand(Command::new("descriptor").about("Show the latest connect descriptor"))
}

/// Configuration implied by the global flags
pub fn config_from_matches(matches: &ArgMatches) -> CodeSyncConfig {
    let mut config = CodeSyncConfig::default();
    if let Some(dir) = matches.get_one::<PathBuf>("work-dir") {
        config.work_dir = dir.clone();
    }
    config
}

/// Map an offline subcommand onto a [`CliCommand`]
///
/// Returns `None` for subcommands handled elsewhere, such as `serve`.
pub fn parse_command(name: &str, matches: &ArgMatches) -> Option<CliCommand> {
    let id = || matches.get_one::<String>("id").cloned().unwrap_or_default();
    let file = || matches.get_one::<PathBuf>("file").cloned().unwrap_or_default();

    match name {
        "export" => Some(CliCommand::Export {
            id: id(),
            file: file(),
        }),
        "import" => Some(CliCommand::Import {
            id: id(),
            file: file(),
            out: matches.get_one::<PathBuf>("out").cloned(),
        }),
        "cleanup" => Some(CliCommand::Cleanup),
        "descriptor" => Some(CliCommand::Descriptor),
        _ => None,
    }
}
