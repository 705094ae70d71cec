//! Batch conversion driver.
//!
//! Converts every PHP file under a project directory: files are enumerated
//! once, partitioned into fixed-size chunks, and each chunk's files are
//! converted concurrently while chunks run sequentially. A failing file is
//! retried with linearly increasing delay and, once retries are exhausted,
//! recorded without aborting the rest of the project. Progress is published
//! through an injected [`StatusStore`] that callers can poll at any time.


use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::{
    convert::Converter,
    structure::{map_php_to_node_structure, StructureGenerator},
    ConvertConfig, ConvertError,
};

/// Top-level state of one project's conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPhase {
    InProgress,
    Completed,
    Error,
    Stopped,
}

impl ConversionPhase {
    /// Terminal phases are entered exactly once and never left
    pub fn is_terminal(self) -> bool {
        !matches!(self, ConversionPhase::InProgress)
    }
}

/// Pollable status record for one project's conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStatus {
    pub status: ConversionPhase,
    /// 0-100; non-decreasing, exactly 100 only once completed
    pub progress: u8,
    pub current_step: String,
    pub completed_files: usize,
    pub total_files: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionStatus {
    fn initializing() -> Self {
        Self {
            status: ConversionPhase::InProgress,
            progress: 0,
            current_step: "initializing".to_string(),
            completed_files: 0,
            total_files: 0,
            error: None,
        }
    }
}

/// Process-wide table of conversion statuses, keyed by project id.
/// Owned by the orchestrator's creator and injected, not a global.
#[derive(Default)]
pub struct StatusStore {
    statuses: DashMap<String, ConversionStatus>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking status lookup. Unknown projects read as a fresh
    /// `initializing` record rather than failing.
    pub fn get(&self, project_id: &str) -> ConversionStatus {
        self.statuses
            .get(project_id)
            .map(|entry| entry.clone())
            .unwrap_or_else(ConversionStatus::initializing)
    }

    /// Reset a project to a fresh in-progress record
    fn begin(&self, project_id: &str) {
        self.statuses
            .insert(project_id.to_string(), ConversionStatus::initializing());
    }

    /// Apply an update under the entry lock. Terminal records are read-only;
    /// progress is clamped so it never decreases.
    fn update(&self, project_id: &str, apply: impl FnOnce(&mut ConversionStatus)) {
        if let Some(mut entry) = self.statuses.get_mut(project_id) {
            if entry.status.is_terminal() {
                return;
            }
            let previous_progress = entry.progress;
            apply(&mut entry);
            if entry.progress < previous_progress {
                entry.progress = previous_progress;
            }
        }
    }

    /// Advisory stop: force the record terminal. In-flight conversions may
    /// still finish, but their completions no longer change the record.
    pub fn request_stop(&self, project_id: &str, message: &str) {
        let mut entry = self
            .statuses
            .entry(project_id.to_string())
            .or_insert_with(ConversionStatus::initializing);
        if entry.status.is_terminal() {
            return;
        }
        entry.status = ConversionPhase::Stopped;
        entry.current_step = "stopped".to_string();
        entry.error = Some(message.to_string());
    }

    /// Drop a project's record entirely
    pub fn clear(&self, project_id: &str) {
        self.statuses.remove(project_id);
    }
}

/// Delay before retry number `attempt` (1-based): linear backoff
pub fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * u64::from(attempt))
}

/// Drives whole-project conversions
pub struct ConversionOrchestrator {
    config: ConvertConfig,
    converter: Converter,
    structure: StructureGenerator,
    statuses: Arc<StatusStore>,
}

impl ConversionOrchestrator {
    pub fn new(config: ConvertConfig, converter: Converter, statuses: Arc<StatusStore>) -> Self {
        let structure = StructureGenerator::new(config.upload_dir.clone());
        Self {
            config,
            converter,
            structure,
            statuses,
        }
    }

    pub fn status_store(&self) -> Arc<StatusStore> {
        Arc::clone(&self.statuses)
    }

    /// Non-blocking status poll
    pub fn get_status(&self, project_id: &str) -> ConversionStatus {
        self.statuses.get(project_id)
    }

    /// Request an advisory stop of a running conversion
    pub fn stop(&self, project_id: &str) {
        warn!("stop requested for project {project_id}");
        self.statuses
            .request_stop(project_id, "Conversion stopped by request");
    }

    /// Validate the project, then run the conversion in the background.
    /// Returns the number of files that will be converted.
    pub async fn start_conversion(
        self: &Arc<Self>,
        project_id: &str,
    ) -> Result<usize, ConvertError> {
        let project_dir = self.config.upload_dir.join(project_id);
        if !project_dir.is_dir() {
            return Err(ConvertError::Project(format!(
                "Project directory does not exist: {}",
                project_dir.display()
            )));
        }
        let files = enumerate_php_files(project_dir).await?;
        if files.is_empty() {
            return Err(ConvertError::Project(
                "No PHP files found in project directory".to_string(),
            ));
        }

        let orchestrator = Arc::clone(self);
        let id = project_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = orchestrator.convert_all(&id).await {
                error!("conversion failed for project {id}: {e}");
            }
        });
        Ok(files.len())
    }

    /// Convert every PHP file in the project. Project-level failures set the
    /// status to `error` and propagate; file-level failures are recorded and
    /// skipped.
    pub async fn convert_all(&self, project_id: &str) -> Result<(), ConvertError> {
        info!("starting conversion for project {project_id}");
        self.statuses.begin(project_id);

        match self.run(project_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.statuses.update(project_id, |status| {
                    status.status = ConversionPhase::Error;
                    status.error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    async fn run(&self, project_id: &str) -> Result<(), ConvertError> {
        let project_dir = self.config.upload_dir.join(project_id);
        if !project_dir.is_dir() {
            return Err(ConvertError::Project(format!(
                "Project directory does not exist: {}",
                project_dir.display()
            )));
        }

        self.structure.create_project_structure(project_id).await?;

        let files = enumerate_php_files(project_dir).await?;
        info!("found {} PHP files to convert", files.len());
        if files.is_empty() {
            return Err(ConvertError::Project(
                "No PHP files found in project directory".to_string(),
            ));
        }

        let total = files.len();
        self.statuses.update(project_id, |status| {
            status.total_files = total;
            status.current_step = "converting".to_string();
        });

        let chunk_size = self.config.chunk_size.max(1);
        let chunk_count = files.len().div_ceil(chunk_size);
        for (index, chunk) in files.chunks(chunk_size).enumerate() {
            // Honor an advisory stop between chunks; in-flight work is never
            // interrupted
            if self.statuses.get(project_id).status.is_terminal() {
                warn!("conversion of project {project_id} halted before chunk {}", index + 1);
                return Ok(());
            }

            info!("processing chunk {} of {chunk_count}", index + 1);
            join_all(
                chunk
                    .iter()
                    .map(|file| self.convert_file_with_retry(file, project_id, total)),
            )
            .await;
        }

        self.statuses.update(project_id, |status| {
            status.status = ConversionPhase::Completed;
            status.current_step = "completed".to_string();
            status.progress = 100;
        });
        info!("conversion completed for project {project_id}");
        Ok(())
    }

    /// Convert one file, retrying with linear backoff. The file's resolution
    /// (success or exhausted retries) always advances the progress counter.
    async fn convert_file_with_retry(&self, file: &Path, project_id: &str, total: usize) {
        let max_retries = self.config.max_retries.max(1);
        for attempt in 1..=max_retries {
            match self.convert_file(file, project_id).await {
                Ok(()) => break,
                Err(e) => {
                    error!("attempt {attempt} failed for {}: {e}", file.display());
                    if attempt == max_retries {
                        warn!(
                            "giving up on {} after {max_retries} attempts",
                            file.display()
                        );
                        break;
                    }
                    sleep(retry_delay(attempt)).await;
                }
            }
        }

        self.statuses.update(project_id, |status| {
            status.completed_files += 1;
            // Cap below 100 while converting; only the completed transition
            // publishes 100
            let percent = (status.completed_files * 100 / total.max(1)) as u8;
            status.progress = percent.min(99);
        });
    }

    async fn convert_file(&self, file: &Path, project_id: &str) -> Result<(), ConvertError> {
        let content = tokio::fs::read_to_string(file).await?;
        let converted = self.converter.convert_source(&content).await?;

        let mapping = map_php_to_node_structure(file, &content);
        let output_path = self
            .structure
            .converted_dir(project_id)
            .join(&mapping.new_path);
        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&output_path, converted).await?;

        info!(
            "converted {} to {} ({})",
            file.display(),
            output_path.display(),
            mapping.role.as_str()
        );
        Ok(())
    }
}

/// Run the blocking directory walk off the async runtime
pub(crate) async fn enumerate_php_files(dir: PathBuf) -> Result<Vec<PathBuf>, ConvertError> {
    tokio::task::spawn_blocking(move || find_php_files(&dir))
        .await
        .map_err(|e| ConvertError::Project(format!("file enumeration task failed: {e}")))?
}

/// Recursively enumerate `.php` files under `dir`, sorted so dispatch order
/// is deterministic
pub fn find_php_files(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "php") {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
