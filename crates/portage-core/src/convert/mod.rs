//! Two-tier conversion strategy: delegate first, deterministic local
//! transform as the fallback.
//!
//! Any delegate failure or empty response routes the file through
//! parse -> transform -> print instead. The plausibility check on results is
//! advisory: it logs a warning but never blocks a write.

pub mod delegate;


use std::sync::Arc;

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::{parser, printer, transform, ConvertError};

use delegate::Delegate;

/// Outcome of converting one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub file: String,
    pub success: bool,
    pub result: String,
}

/// Per-file conversion strategy selector
pub struct Converter {
    delegate: Option<Arc<dyn Delegate>>,
}

impl Converter {
    pub fn new(delegate: Option<Arc<dyn Delegate>>) -> Self {
        Self { delegate }
    }

    /// Converter that only uses the deterministic local path
    pub fn local_only() -> Self {
        Self { delegate: None }
    }

    /// Convert PHP source text to Node.js source text
    pub async fn convert_source(&self, php_code: &str) -> Result<String, ConvertError> {
        if let Some(delegate) = &self.delegate {
            match delegate.complete(&build_prompt(php_code)).await {
                Ok(response) if !response.trim().is_empty() => {
                    debug!("delegate conversion response received");
                    let code = extract_code(&response);
                    if !looks_like_code(&code) {
                        warn!(
                            "converted content may not be valid code: {}...",
                            code.chars().take(200).collect::<String>()
                        );
                    }
                    return Ok(code);
                }
                Ok(_) => {
                    warn!("empty response from delegate, falling back to AST transformation");
                }
                Err(e) => {
                    warn!("delegate conversion failed ({e}), falling back to AST transformation");
                }
            }
        }
        self.transform_source(php_code)
    }

    /// Deterministic local path: parse, transform, print
    pub fn transform_source(&self, php_code: &str) -> Result<String, ConvertError> {
        let ast = parser::create_parser().parse(php_code)?;
        let js = transform::transform(&ast);
        let code = printer::print_js(&js);
        if !looks_like_code(&code) {
            warn!("locally transformed content may not be valid code");
        }
        Ok(code)
    }

    /// Convert one file's content, capturing failure as a result rather
    /// than an error
    pub async fn convert_file_content(&self, php_code: &str, file_name: &str) -> ConversionResult {
        match self.convert_source(php_code).await {
            Ok(result) => ConversionResult {
                file: file_name.to_string(),
                success: true,
                result,
            },
            Err(e) => ConversionResult {
                file: file_name.to_string(),
                success: false,
                result: format!("Failed to convert PHP file: {e}"),
            },
        }
    }
}

/// The natural-language instruction sent to the delegate, embedding the raw
/// source
pub fn build_prompt(php_code: &str) -> String {
    format!(
        "Convert the following PHP code to idiomatic Node.js/Express.js code.\n\
         Include proper error handling, async/await patterns, and modern JavaScript practices.\n\
         \n\
         PHP code:\n{php_code}"
    )
}

/// Code-fence language tags tried in order when extracting code from a
/// delegate response
const FENCE_TAGS: [&str; 5] = ["typescript", "javascript", "ts", "js", ""];

/// Strip delimiting code fences from a delegate response. Tags are tried in
/// order; a response without fences is returned trimmed, as-is.
pub fn extract_code(response: &str) -> String {
    for tag in FENCE_TAGS {
        let open = format!("```{tag}\n");
        if let Some(start) = response.find(&open) {
            let after = &response[start + open.len()..];
            if let Some(end) = after.find("\n```") {
                return after[..end].trim().to_string();
            }
        }
    }
    response.trim().to_string()
}

fn code_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"function\s+\w+\s*\(",
            r"const\s+\w+\s*=",
            r"let\s+\w+\s*=",
            r"var\s+\w+\s*=",
            r"import\s+",
            r"export\s+",
            r"class\s+\w+",
            r"interface\s+\w+",
            r"console\.log",
            r"return\s+",
            r"if\s*\(",
            r"for\s*\(",
            r"while\s*\(",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("code pattern must compile"))
        .collect()
    })
}

/// Advisory plausibility check: does the text show any common JS/TS surface
/// pattern?
pub fn looks_like_code(content: &str) -> bool {
    let trimmed = content.trim();
    if trimmed.len() < 10 {
        return false;
    }
    code_patterns().iter().any(|re| re.is_match(trimmed))
}
