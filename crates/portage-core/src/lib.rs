//! # Portage Core
//!
//! Core implementation of the PHP to Node.js conversion pipeline, including:
//! - Source (PHP) and target (JavaScript) syntax tree definitions
//! - A PHP subset parser for the deterministic conversion path
//! - The AST-to-AST transformer and operator mapping tables
//! - A JavaScript code printer
//! - File role classification and target project layout
//! - Deterministic project structure analysis
//! - The two-tier conversion strategy (delegate with local fallback)
//! - The batch orchestrator with chunked concurrency and retry
//!
//! This crate provides the foundational components that can be used to build
//! various conversion interfaces (CLI, web service, embedded pipeline, etc.)

#![warn(clippy::all)]

pub mod analyze;
pub mod ast;
pub mod convert;
pub mod orchestrator;
pub mod parser;
pub mod printer;
pub mod structure;
pub mod transform;

// Re-export commonly used types
pub use analyze::{analyze_source, FileStructure, ProjectAnalysis, ProjectAnalyzer};
pub use ast::{JsNode, PhpNode};
pub use convert::{
    delegate::{Delegate, DelegateError, GroqDelegate},
    ConversionResult, Converter,
};
pub use orchestrator::{
    ConversionOrchestrator, ConversionPhase, ConversionStatus, StatusStore,
};
pub use parser::{create_parser, ParseError, PhpParser};
pub use printer::print_js;
pub use structure::{classify, FileMapping, Role, StructureGenerator};
pub use transform::transform;

/// Portage version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for Portage core components
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portage_core=info".parse().unwrap()),
        )
        .init();
}

/// Core conversion configuration
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Root directory holding uploaded projects (one subdirectory per project id)
    pub upload_dir: std::path::PathBuf,
    /// Use the delegate (AI) conversion path before falling back locally
    pub use_ai: bool,
    /// Number of files converted concurrently within one batch
    pub chunk_size: usize,
    /// Maximum conversion attempts per file
    pub max_retries: u32,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            upload_dir: "./uploads".into(),
            use_ai: true,
            chunk_size: 5,
            max_retries: 3,
        }
    }
}

/// Error types for core conversion operations
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    /// Source file could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] parser::ParseError),

    /// Delegate conversion service failed
    #[error("Delegate error: {0}")]
    Delegate(#[from] convert::delegate::DelegateError),

    /// Filesystem error while reading sources or writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Project-level failure that aborts the whole conversion
    #[error("Project error: {0}")]
    Project(String),
}
