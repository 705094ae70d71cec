//! Standalone conversion server binary

use std::sync::Arc;

use anyhow::Result;
use portage_core::{ConversionOrchestrator, ConvertConfig, Converter, GroqDelegate, StatusStore};
use portage_server::{ConvertServer, ConvertServerConfig};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    portage_core::init_tracing();

    println!("Portage Server v{}", portage_server::VERSION);

    let config = ConvertConfig::default();

    // Without a usable delegate the conversion silently runs local-only
    let delegate = match GroqDelegate::from_env() {
        Ok(delegate) => Some(Arc::new(delegate) as Arc<dyn portage_core::Delegate>),
        Err(e) => {
            warn!("delegate unavailable ({e}), using local transform only");
            None
        }
    };

    let converter = Converter::new(delegate);
    let statuses = Arc::new(StatusStore::new());
    let orchestrator = Arc::new(ConversionOrchestrator::new(config, converter, statuses));

    let server = ConvertServer::new(ConvertServerConfig::default(), orchestrator);
    server.start().await?;

    Ok(())
}
