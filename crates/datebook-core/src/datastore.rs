use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::store::TaskStore;
use crate::task::ExchangeTask;

const TASKS_FILE: &str = "tasks.data";

/// Data directory holding the task list as JSON Lines of exchange records.
#[derive(Debug)]
pub struct DataStore {
    pub data_dir: PathBuf,
    pub tasks_path: PathBuf,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let tasks_path = data_dir.join(TASKS_FILE);
        if !tasks_path.exists() {
            fs::write(&tasks_path, "")
                .with_context(|| format!("failed to create {}", tasks_path.display()))?;
        }

        info!(
            data_dir = %data_dir.display(),
            tasks = %tasks_path.display(),
            "opened datastore"
        );

        Ok(Self {
            data_dir,
            tasks_path,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn load(&self) -> anyhow::Result<TaskStore> {
        let records = load_jsonl(&self.tasks_path).context("failed to load tasks.data")?;
        let mut store = TaskStore::new();
        let report = store.import_tasks(records);
        if report.skipped > 0 {
            warn!(skipped = report.skipped, "tasks.data held records that could not be loaded");
        }
        Ok(store)
    }

    #[tracing::instrument(skip(self, store), fields(count = store.len()))]
    pub fn save(&self, store: &TaskStore) -> anyhow::Result<()> {
        save_jsonl_atomic(&self.tasks_path, &store.export_tasks()).context("failed to save tasks.data")
    }
}

#[tracing::instrument(skip(path))]
fn load_jsonl(path: &Path) -> anyhow::Result<Vec<ExchangeTask>> {
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record: ExchangeTask = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(record);
    }

    debug!(count = out.len(), "loaded records from jsonl");
    Ok(out)
}

#[tracing::instrument(skip(path, records))]
fn save_jsonl_atomic(path: &Path, records: &[ExchangeTask]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = records.len(), "saving jsonl atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    for record in records {
        let serialized = serde_json::to_string(record)?;
        writeln!(temp, "{serialized}")?;
    }
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::DataStore;

    #[test]
    fn open_creates_empty_task_file() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path().join("nested");
        let store = DataStore::open(&dir).expect("open datastore");
        assert!(store.tasks_path.exists());
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn corrupt_line_reports_its_position() {
        let temp = tempdir().expect("tempdir");
        let store = DataStore::open(temp.path()).expect("open datastore");
        fs::write(
            &store.tasks_path,
            "{\"id\":1,\"title\":\"ok\",\"date\":\"2025-01-01\"}\n{oops\n",
        )
        .expect("write data");

        let err = store.load().expect_err("corrupt data");
        assert!(format!("{err:#}").contains("line 2"));
    }
}
