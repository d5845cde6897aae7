//! Headless CodeSync server for editor extension development
//!
//! Stands in for Grasshopper with an in-memory document seeded from a
//! directory of `<component id>.cs` files.

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{value_parser, Arg, Command};
use codesync_core::{
    CodeSyncConfig, DocumentApplier, InMemoryDocument, ScriptObject, SyncCoordinator,
};
use codesync_web::{run_session, WebServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    codesync_core::init_tracing();

    let matches = Command::new("codesync-server")
        .version(codesync_web::VERSION)
        .about("Serve an in-memory script document to the editor extension")
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("DIR")
                .help("Directory of <component id>.cs files to load as components")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .value_name("PORT")
                .help("WebSocket port")
                .value_parser(value_parser!(u16))
                .default_value("51234"),
        )
        .arg(
            Arg::new("work-dir")
                .long("work-dir")
                .value_name("DIR")
                .help("Directory receiving exported files")
                .value_parser(value_parser!(PathBuf)),
        )
        .get_matches();

    let mut config = CodeSyncConfig::default();
    if let Some(dir) = matches.get_one::<PathBuf>("work-dir") {
        config.work_dir = dir.clone();
    }

    let document = match matches.get_one::<PathBuf>("seed") {
        Some(dir) => InMemoryDocument::load_dir(dir, &config.source_extension)?,
        None => InMemoryDocument::new(),
    };

    println!("CodeSync Server v{}", codesync_web::VERSION);
    println!("Components: {}", document.components().len());
    for component in document.components() {
        println!("  {}", component.id());
    }

    let web_config = WebServerConfig {
        port: matches.get_one::<u16>("port").copied().unwrap_or(51234),
        ..Default::default()
    };

    let applier = DocumentApplier::new(document, config.empty_target);
    run_session(web_config, Arc::new(SyncCoordinator::new(config)), applier).await
}
