//! Target project layout: role classification for converted files and the
//! Node.js folder skeleton.
//!
//! Classification is an ordered battery of per-role predicates. Predicates
//! are not mutually exclusive, so the priority order is load-bearing: the
//! first matching role wins, and a file matching nothing lands in `utils/`.

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ConvertError;

/// Semantic role a source file is classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Controller,
    Model,
    Route,
    Middleware,
    Config,
    Util,
    View,
}

impl Role {
    /// Output subdirectory for this role
    pub fn folder(self) -> &'static str {
        match self {
            Role::Controller => "controllers",
            Role::Model => "models",
            Role::Route => "routes",
            Role::Middleware => "middlewares",
            Role::Config => "config",
            Role::Util => "utils",
            Role::View => "views",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Controller => "controller",
            Role::Model => "model",
            Role::Route => "route",
            Role::Middleware => "middleware",
            Role::Config => "config",
            Role::Util => "util",
            Role::View => "view",
        }
    }
}

/// Where one converted file lands in the target project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMapping {
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    pub role: Role,
}

/// Classification priority, highest first. A file that looks like both a
/// controller and a config file is a controller.
pub const CLASSIFIER_PRIORITY: [Role; 5] = [
    Role::Controller,
    Role::Model,
    Role::Route,
    Role::Middleware,
    Role::Config,
];

struct ClassifierRule {
    role: Role,
    signatures: Vec<Regex>,
    keyword: &'static str,
}

fn classifier_rules() -> &'static [ClassifierRule] {
    static RULES: OnceLock<Vec<ClassifierRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        let rule = |role: Role, patterns: &[&str], keyword: &'static str| ClassifierRule {
            role,
            signatures: patterns
                .iter()
                .map(|p| Regex::new(p).expect("classifier signature must compile"))
                .collect(),
            keyword,
        };
        vec![
            rule(
                Role::Controller,
                &[
                    r"class.*Controller",
                    r"extends.*Controller",
                    r"public function.*\(",
                    r"return.*view\(",
                    r"return.*json\(",
                ],
                "controller",
            ),
            rule(
                Role::Model,
                &[
                    r"class.*Model",
                    r"extends.*Model",
                    r"protected \$table",
                    r"protected \$fillable",
                    r"public static function",
                ],
                "model",
            ),
            rule(
                Role::Route,
                &[r"Route::", r"router->", r"get\(", r"post\(", r"put\(", r"delete\("],
                "route",
            ),
            rule(
                Role::Middleware,
                &[r"middleware", r"auth", r"validate", r"handle\(", r"next\("],
                "middleware",
            ),
            rule(
                Role::Config,
                &[r"config", r"database", r"connection", r"env", r"define\("],
                "config",
            ),
        ]
    })
}

/// Classify a source file into a role from its content and file name.
/// Deterministic: the same inputs always yield the same role.
pub fn classify(content: &str, file_name: &str) -> Role {
    let lower_name = file_name.to_lowercase();
    for rule in classifier_rules() {
        let signature_hit = rule.signatures.iter().any(|re| re.is_match(content));
        if signature_hit || lower_name.contains(rule.keyword) {
            return rule.role;
        }
    }
    Role::Util
}

/// Map a PHP file to its location in the converted Node.js tree
pub fn map_php_to_node_structure(php_path: &Path, content: &str) -> FileMapping {
    let file_name = php_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let role = classify(content, &file_name);
    let base = match role {
        Role::Route => to_kebab_case(&file_name),
        _ => to_camel_case(&file_name),
    };
    let new_path = PathBuf::from(role.folder()).join(format!("{base}.ts"));

    debug!(
        "mapped {} -> {} ({})",
        php_path.display(),
        new_path.display(),
        role.as_str()
    );

    FileMapping {
        original_path: php_path.to_path_buf(),
        new_path,
        role,
    }
}

/// Collapse `-`, `_` and whitespace runs, uppercasing the following character
pub fn to_camel_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = false;
    for c in input.chars() {
        if c == '-' || c == '_' || c.is_whitespace() {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Insert `-` at lower-to-upper boundaries, then lowercase everything
pub fn to_kebab_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev_lower = false;
    for c in input.chars() {
        if c.is_uppercase() && prev_lower {
            out.push('-');
        }
        prev_lower = c.is_lowercase();
        out.extend(c.to_lowercase());
    }
    out
}

/// Subdirectories materialised under `<project>/converted/`
const PROJECT_FOLDERS: [&str; 8] = [
    "controllers",
    "models",
    "routes",
    "middlewares",
    "config",
    "utils",
    "types",
    "services",
];

/// Creates the converted project's folder skeleton and scaffold files
pub struct StructureGenerator {
    upload_dir: PathBuf,
}

impl StructureGenerator {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Directory the converted output for a project is written to
    pub fn converted_dir(&self, project_id: &str) -> PathBuf {
        self.upload_dir.join(project_id).join("converted")
    }

    /// Materialize the target project skeleton. Idempotent: re-running over
    /// an existing skeleton rewrites the same files.
    pub async fn create_project_structure(&self, project_id: &str) -> Result<(), ConvertError> {
        let project_dir = self.upload_dir.join(project_id);
        if !project_dir.is_dir() {
            return Err(ConvertError::Project(format!(
                "Project directory does not exist: {}",
                project_dir.display()
            )));
        }

        let converted_dir = self.converted_dir(project_id);
        for folder in PROJECT_FOLDERS {
            tokio::fs::create_dir_all(converted_dir.join(folder)).await?;
        }

        tokio::fs::write(converted_dir.join("index.ts"), main_index()).await?;
        tokio::fs::write(
            converted_dir.join("config/database.ts"),
            database_config(),
        )
        .await?;
        tokio::fs::write(converted_dir.join("package.json"), package_json()).await?;
        tokio::fs::write(converted_dir.join("tsconfig.json"), ts_config()).await?;
        tokio::fs::write(converted_dir.join("README.md"), readme()).await?;
        tokio::fs::write(converted_dir.join(".env.example"), env_example()).await?;

        info!("project structure created for {project_id}");
        Ok(())
    }
}

fn main_index() -> &'static str {
    r#"import express from 'express';
import cors from 'cors';
import dotenv from 'dotenv';

dotenv.config();

const app = express();
const PORT = process.env.PORT || 3000;

app.use(cors());
app.use(express.json());
app.use(express.urlencoded({ extended: true }));

app.get('/health', (req, res) => {
  res.json({ status: 'OK', timestamp: new Date().toISOString() });
});

app.listen(PORT, () => {
  console.log(`Server running on port ${PORT}`);
});
"#
}

fn database_config() -> &'static str {
    r#"import mongoose from 'mongoose';
import dotenv from 'dotenv';

dotenv.config();

const MONGODB_URI = process.env.MONGODB_URI || 'mongodb://localhost:27017/converted_app';

export const connectDB = async (): Promise<void> => {
  try {
    await mongoose.connect(MONGODB_URI);
    console.log('MongoDB connected successfully');
  } catch (error) {
    console.error('MongoDB connection error:', error);
    process.exit(1);
  }
};

export const disconnectDB = async (): Promise<void> => {
  try {
    await mongoose.disconnect();
    console.log('MongoDB disconnected');
  } catch (error) {
    console.error('MongoDB disconnection error:', error);
  }
};
"#
}

fn package_json() -> String {
    let manifest = serde_json::json!({
        "name": "converted-nodejs-app",
        "version": "1.0.0",
        "description": "PHP to Node.js converted application",
        "main": "index.ts",
        "scripts": {
            "start": "node dist/index.js",
            "dev": "ts-node index.ts",
            "build": "tsc",
        },
        "dependencies": {
            "express": "^4.18.2",
            "cors": "^2.8.5",
            "dotenv": "^16.3.1",
            "mongoose": "^8.0.0",
        },
        "devDependencies": {
            "@types/express": "^4.17.21",
            "@types/cors": "^2.8.17",
            "@types/node": "^20.10.0",
            "typescript": "^5.3.0",
            "ts-node": "^10.9.1",
        }
    });
    serde_json::to_string_pretty(&manifest).expect("static manifest serializes")
}

fn ts_config() -> String {
    let config = serde_json::json!({
        "compilerOptions": {
            "target": "ES2020",
            "module": "commonjs",
            "outDir": "./dist",
            "rootDir": "./",
            "strict": true,
            "esModuleInterop": true,
            "skipLibCheck": true,
        },
        "include": ["**/*"],
        "exclude": ["node_modules", "dist"]
    });
    serde_json::to_string_pretty(&config).expect("static config serializes")
}

fn readme() -> &'static str {
    r#"# PHP -> Node.js Converted Project

This project was automatically converted from PHP to Node.js.

## Quick start

```bash
npm install
cp .env.example .env
npm run dev
```

## Project structure

- `controllers/` - Business logic and request handlers
- `models/` - Database schemas and models
- `routes/` - API route definitions
- `middlewares/` - Authentication and validation middleware
- `config/` - Database and application configuration
- `utils/` - Helper functions and utilities
- `types/` - TypeScript type definitions
- `services/` - Business service layer

## Notes

- Review and test all functionality before production use
- Some manual adjustments may be needed for complex logic
"#
}

fn env_example() -> &'static str {
    r#"# Application Configuration
PORT=3000
NODE_ENV=development

# Database Configuration
MONGODB_URI=mongodb://localhost:27017/your_database

# CORS Configuration
CORS_ORIGIN=http://localhost:3000

# Logging
LOG_LEVEL=info
"#
}
