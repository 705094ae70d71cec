use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Arg, Command};
use portage_core::{
    init_tracing, ConversionOrchestrator, ConversionPhase, ConvertConfig, Converter,
    GroqDelegate, StatusStore,
};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let matches = Command::new("portage")
        .version(portage_core::VERSION)
        .about("Convert a PHP project to a Node.js/TypeScript project")
        .arg(
            Arg::new("project")
                .value_name("PROJECT_ID")
                .help("Project directory name under the uploads directory")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("uploads")
                .long("uploads")
                .value_name("PATH")
                .help("Uploads directory containing project subdirectories")
                .default_value("./uploads"),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .value_name("N")
                .help("Files converted concurrently per batch")
                .default_value("5"),
        )
        .arg(
            Arg::new("retries")
                .long("retries")
                .value_name("N")
                .help("Maximum conversion attempts per file")
                .default_value("3"),
        )
        .arg(
            Arg::new("no-ai")
                .long("no-ai")
                .help("Skip the AI delegate and use only the local transform")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let project_id = matches.get_one::<String>("project").unwrap().clone();
    let uploads = matches.get_one::<String>("uploads").unwrap().clone();
    let chunk_size = matches.get_one::<String>("chunk-size").unwrap().parse()?;
    let max_retries = matches.get_one::<String>("retries").unwrap().parse()?;
    let no_ai = matches.get_flag("no-ai");

    let config = ConvertConfig {
        upload_dir: uploads.into(),
        use_ai: !no_ai,
        chunk_size,
        max_retries,
    };

    // Without a usable delegate the conversion silently runs local-only
    let delegate = if config.use_ai {
        match GroqDelegate::from_env() {
            Ok(delegate) => Some(Arc::new(delegate) as Arc<dyn portage_core::Delegate>),
            Err(e) => {
                warn!("delegate unavailable ({e}), using local transform only");
                None
            }
        }
    } else {
        None
    };

    let converter = Converter::new(delegate);
    let statuses = Arc::new(StatusStore::new());
    let orchestrator = Arc::new(ConversionOrchestrator::new(
        config,
        converter,
        Arc::clone(&statuses),
    ));

    println!("Portage v{}", portage_core::VERSION);
    println!("Converting project: {project_id}");

    let total = orchestrator.start_conversion(&project_id).await?;
    println!("Found {total} PHP files");

    // Poll the status store until the conversion reaches a terminal phase
    let mut last_progress = None;
    loop {
        let status = statuses.get(&project_id);
        if last_progress != Some(status.progress) {
            println!(
                "[{:>3}%] {} ({}/{} files)",
                status.progress, status.current_step, status.completed_files, status.total_files
            );
            last_progress = Some(status.progress);
        }

        match status.status {
            ConversionPhase::Completed => {
                println!("Conversion completed");
                return Ok(());
            }
            ConversionPhase::Error | ConversionPhase::Stopped => {
                let message = status
                    .error
                    .unwrap_or_else(|| "conversion did not complete".to_string());
                anyhow::bail!("Conversion failed: {message}");
            }
            ConversionPhase::InProgress => {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        }
    }
}
