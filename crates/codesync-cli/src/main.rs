use anyhow::Result;
use clap::ArgMatches;
#[cfg(feature = "web-integration")]
use clap::{Arg, Command};
use codesync_cli::{build_cli, config_from_matches, parse_command, Cli};
use codesync_core::{init_tracing, CodeSyncConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_tracing();

    let cli = build_cli();

    #[cfg(feature = "web-integration")]
    let cli = cli.subcommand(
        Command::new("serve")
            .about("Serve a headless script document to the editor extension")
            .arg(
                Arg::new("port")
                    .long("port")
                    .value_name("PORT")
                    .help("WebSocket port")
                    .value_parser(clap::value_parser!(u16))
                    .default_value("51234"),
            )
            .arg(
                Arg::new("seed")
                    .long("seed")
                    .value_name("DIR")
                    .help("Directory of <component id>.cs files to load as components")
                    .value_parser(clap::value_parser!(std::path::PathBuf)),
            ),
    );

    let matches = cli.get_matches();
    let config = config_from_matches(&matches);

    let Some((name, sub)) = matches.subcommand() else {
        return Ok(());
    };

    tracing::debug!("Running {name} with work directory {}", config.work_dir.display());

    if let Some(command) = parse_command(name, sub) {
        let output = Cli::new(config).handle_command(command)?;
        println!("{output}");
        return Ok(());
    }

    run_extra(name, sub, config).await
}

#[cfg(feature = "web-integration")]
async fn run_extra(name: &str, matches: &ArgMatches, config: CodeSyncConfig) -> Result<()> {
    use std::{path::PathBuf, sync::Arc};

    use codesync_core::{DocumentApplier, InMemoryDocument, SyncCoordinator};
    use codesync_web::{run_session, WebServerConfig};

    if name != "serve" {
        anyhow::bail!("Unknown command: {name}");
    }

    let document = match matches.get_one::<PathBuf>("seed") {
        Some(dir) => InMemoryDocument::load_dir(dir, &config.source_extension)?,
        None => InMemoryDocument::new(),
    };
    let web_config = WebServerConfig {
        port: matches.get_one::<u16>("port").copied().unwrap_or(51234),
        ..Default::default()
    };

    println!("CodeSync v{}", codesync_core::VERSION);
    println!("Work directory: {}", config.work_dir.display());
    println!("Components: {}", document.components().len());

    let applier = DocumentApplier::new(document, config.empty_target);
    run_session(web_config, Arc::new(SyncCoordinator::new(config)), applier).await
}

#[cfg(not(feature = "web-integration"))]
async fn run_extra(name: &str, _matches: &ArgMatches, _config: CodeSyncConfig) -> Result<()> {
    anyhow::bail!("Unknown command: {name}")
}
