use tracing::{debug, info, warn};

use crate::date::CalendarDate;
use crate::error::StoreError;
use crate::task::{ExchangeTask, NewTask, Task, TaskId, TaskUpdate};

/// Authoritative in-memory task collection, kept in insertion order.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    next_id: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    /// Records whose id was missing or already taken and got a fresh one.
    pub reassigned: usize,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// `u64::MAX` is never handed out; the counter stops one short of it.
    fn mint_id(&mut self) -> Result<TaskId, StoreError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| StoreError::InvalidInput("task ids exhausted".to_string()))?;
        Ok(TaskId(id))
    }

    #[tracing::instrument(skip(self, new), fields(date = ?new.date))]
    pub fn add(&mut self, new: NewTask) -> Result<Task, StoreError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(StoreError::InvalidInput("title must not be empty".to_string()));
        }
        let date = new
            .date
            .ok_or_else(|| StoreError::InvalidInput("date is required".to_string()))?;

        let task = Task {
            id: self.mint_id()?,
            title: title.to_string(),
            description: new.description,
            date,
            is_completed: false,
        };
        self.tasks.push(task.clone());

        info!(id = %task.id, date = %task.date, "added task");
        Ok(task)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            debug!("remove of unknown id ignored");
            return None;
        };
        let task = self.tasks.remove(idx);
        info!("removed task");
        Some(task)
    }

    /// Returns the new completion flag, or `None` when the id is unknown.
    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn toggle_complete(&mut self, id: TaskId) -> Option<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!("toggle of unknown id ignored");
            return None;
        };
        task.is_completed = !task.is_completed;
        info!(is_completed = task.is_completed, "toggled task");
        Some(task.is_completed)
    }

    /// `Ok(false)` when the id is unknown.
    #[tracing::instrument(skip(self, update), fields(id = %update.id))]
    pub fn update(&mut self, update: TaskUpdate) -> Result<bool, StoreError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == update.id) else {
            debug!("update of unknown id ignored");
            return Ok(false);
        };
        let title = update.title.trim();
        if title.is_empty() {
            return Err(StoreError::InvalidInput("title must not be empty".to_string()));
        }
        task.title = title.to_string();
        task.description = update.description;
        info!("updated task");
        Ok(true)
    }

    pub fn tasks_on_date(&self, date: CalendarDate) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.date == date).collect()
    }

    /// Inclusive on both ends.
    pub fn tasks_between(&self, start: CalendarDate, end: CalendarDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.date >= start && t.date <= end)
            .collect()
    }

    /// Best-effort: records with an unparseable date or an empty title are
    /// skipped. Ids are kept when free and below `u64::MAX`, otherwise a fresh
    /// one is minted; a record that cannot get any id is skipped.
    #[tracing::instrument(skip_all)]
    pub fn import_tasks<I>(&mut self, records: I) -> ImportReport
    where
        I: IntoIterator<Item = ExchangeTask>,
    {
        let mut report = ImportReport::default();

        for (idx, record) in records.into_iter().enumerate() {
            let date = match CalendarDate::parse(&record.date) {
                Ok(date) => date,
                Err(err) => {
                    warn!(record = idx, error = %err, "skipping import record");
                    report.skipped += 1;
                    continue;
                }
            };
            let title = record.title.trim();
            if title.is_empty() {
                warn!(record = idx, "skipping import record with empty title");
                report.skipped += 1;
                continue;
            }

            let id = match record.id.map(TaskId) {
                Some(id) if id.0 < u64::MAX && self.get(id).is_none() => {
                    self.next_id = self.next_id.max(id.0 + 1);
                    id
                }
                other => {
                    if other.is_some() {
                        debug!(record = idx, id = ?other, "import id taken or out of range; minting");
                    }
                    match self.mint_id() {
                        Ok(id) => {
                            report.reassigned += 1;
                            id
                        }
                        Err(err) => {
                            warn!(record = idx, error = %err, "skipping import record");
                            report.skipped += 1;
                            continue;
                        }
                    }
                }
            };

            self.tasks.push(Task {
                id,
                title: title.to_string(),
                description: record.description,
                date,
                is_completed: record.is_completed,
            });
            report.imported += 1;
        }

        info!(
            imported = report.imported,
            skipped = report.skipped,
            reassigned = report.reassigned,
            "imported tasks"
        );
        report
    }

    pub fn export_tasks(&self) -> Vec<ExchangeTask> {
        debug!(count = self.tasks.len(), "exporting tasks");
        self.tasks.iter().map(Task::to_exchange).collect()
    }
}
