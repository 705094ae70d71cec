//! Deterministic project structure analysis.
//!
//! Walks every parsed PHP tree in a project and aggregates the declared
//! function names; class names are read from the source text (class bodies
//! sit outside the parsed subset) and bucketed by the same name-contains
//! convention the classifier uses: "controller" and "model".


use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    ast::PhpNode,
    orchestrator::enumerate_php_files,
    parser::{self, ParseError},
    ConvertError,
};

/// Structure extracted from one PHP source file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStructure {
    pub controllers: Vec<String>,
    pub models: Vec<String>,
    pub functions: Vec<String>,
}

/// Aggregated structure for a whole project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysis {
    pub controllers: Vec<String>,
    pub models: Vec<String>,
    pub functions: Vec<String>,
    pub files_analyzed: usize,
    pub summary: String,
}

fn class_name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"class\s+(\w+)").expect("class pattern must compile"))
}

/// Extract the declared structure of one file: function names from the
/// parsed tree, class names from the text
pub fn analyze_source(content: &str) -> Result<FileStructure, ParseError> {
    let ast = parser::create_parser().parse(content)?;
    let mut out = FileStructure::default();
    collect_functions(&ast, &mut out.functions);

    for caps in class_name_pattern().captures_iter(content) {
        let name = caps[1].to_string();
        let lower = name.to_lowercase();
        if lower.contains("controller") {
            out.controllers.push(name);
        } else if lower.contains("model") {
            out.models.push(name);
        }
    }
    Ok(out)
}

fn collect_functions(node: &PhpNode, out: &mut Vec<String>) {
    match node {
        PhpNode::Program(children) => {
            for child in children {
                collect_functions(child, out);
            }
        }
        PhpNode::Function { name, body, .. } => {
            out.push(name.clone());
            for child in body {
                collect_functions(child, out);
            }
        }
        PhpNode::Echo { expressions } => {
            for expr in expressions {
                collect_functions(expr, out);
            }
        }
        PhpNode::Assign { left, right } | PhpNode::Bin { left, right, .. } => {
            collect_functions(left, out);
            collect_functions(right, out);
        }
        PhpNode::If {
            test,
            body,
            alternate,
        } => {
            collect_functions(test, out);
            for child in body {
                collect_functions(child, out);
            }
            if let Some(stmts) = alternate {
                for child in stmts {
                    collect_functions(child, out);
                }
            }
        }
        PhpNode::While { test, body } => {
            collect_functions(test, out);
            for child in body {
                collect_functions(child, out);
            }
        }
        PhpNode::For {
            init,
            test,
            update,
            body,
        } => {
            collect_functions(init, out);
            collect_functions(test, out);
            collect_functions(update, out);
            for child in body {
                collect_functions(child, out);
            }
        }
        PhpNode::Foreach { source, body, .. } => {
            collect_functions(source, out);
            for child in body {
                collect_functions(child, out);
            }
        }
        PhpNode::Array { items } => {
            for item in items {
                collect_functions(item, out);
            }
        }
        PhpNode::Call { what, arguments } => {
            collect_functions(what, out);
            for arg in arguments {
                collect_functions(arg, out);
            }
        }
        PhpNode::MethodCall { what, .. } | PhpNode::PropertyLookup { what, .. } => {
            collect_functions(what, out);
        }
        _ => {}
    }
}

/// Project-wide structure analysis over an uploads directory
pub struct ProjectAnalyzer {
    upload_dir: PathBuf,
}

impl ProjectAnalyzer {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Analyze every PHP file in a project. Unparseable files are skipped
    /// with a warning and do not fail the analysis.
    pub async fn analyze_project(&self, project_id: &str) -> Result<ProjectAnalysis, ConvertError> {
        let project_dir = self.upload_dir.join(project_id);
        if !project_dir.is_dir() {
            return Err(ConvertError::Project(format!(
                "Project directory does not exist: {}",
                project_dir.display()
            )));
        }

        let files = enumerate_php_files(project_dir).await?;
        let mut analysis = ProjectAnalysis {
            summary: "Basic structure extracted from AST".to_string(),
            ..Default::default()
        };
        for file in files {
            let content = tokio::fs::read_to_string(&file).await?;
            match analyze_source(&content) {
                Ok(structure) => {
                    analysis.controllers.extend(structure.controllers);
                    analysis.models.extend(structure.models);
                    analysis.functions.extend(structure.functions);
                    analysis.files_analyzed += 1;
                }
                Err(e) => {
                    warn!("skipping unparseable file {}: {e}", file.display());
                }
            }
        }

        info!(
            "analyzed project {project_id}: {} files, {} functions",
            analysis.files_analyzed,
            analysis.functions.len()
        );
        Ok(analysis)
    }
}
