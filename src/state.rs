//! Application state shared by the TUI and the CLI.
//!
//! Network work is split in two halves: a `begin_*` call validates input,
//! claims the single in-flight slot and hands back the [`Request`] to send;
//! [`AppState::complete`] folds the resulting [`Outcome`] into the state and
//! releases the slot. While the slot is held every other `begin_*` call is
//! rejected.

use tracing::{info, warn};

use crate::error::ApiError;
use crate::models::{parse_due_date, AdminBlock, NewTask, Priority, Status, Task, DEFAULT_CATEGORY};
use crate::stats::{filter_tasks, BlockFilter, Stats, StatusFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing has been fetched yet.
    Loading,
    Ready,
    /// The most recent list call failed.
    Errored,
}

/// The operation occupying the in-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Reload,
    Create,
    Toggle(u64),
    Delete(u64),
}

/// A call the controller wants made against the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    List,
    Create(NewTask),
    SetStatus { id: u64, status: Status },
    Delete(u64),
}

/// Result of a [`Request`], tagged with the row it concerned.
#[derive(Debug)]
pub enum Outcome {
    Listed(Result<Vec<Task>, ApiError>),
    Created(Result<Task, ApiError>),
    Updated(u64, Result<Task, ApiError>),
    Deleted(u64, Result<(), ApiError>),
}

/// Fields of the add-task form.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub name: String,
    pub priority: Priority,
    pub category: String,
    pub admin_block: AdminBlock,
    /// Raw due date text; empty means none.
    pub due_date: String,
    pub notes: String,
}

impl Default for Draft {
    fn default() -> Self {
        Draft {
            name: String::new(),
            priority: Priority::default(),
            category: DEFAULT_CATEGORY.to_string(),
            admin_block: AdminBlock::default(),
            due_date: String::new(),
            notes: String::new(),
        }
    }
}

impl Draft {
    /// Builds the insert payload.
    ///
    /// `Ok(None)` when the trimmed name is empty, `Err` when the due date
    /// cannot be parsed.
    pub fn to_new_task(&self) -> Result<Option<NewTask>, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let due_date = match self.due_date.trim() {
            "" => None,
            raw => Some(parse_due_date(raw).ok_or_else(|| {
                format!("invalid due date '{}'. Use YYYY-MM-DD or YYYY-MM-DD HH:MM.", raw)
            })?),
        };
        let category = match self.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            c => c.to_string(),
        };
        Ok(Some(NewTask {
            task_name: name.to_string(),
            status: Status::Todo,
            priority: self.priority,
            category,
            admin_block: self.admin_block,
            due_date,
            notes: if self.notes.is_empty() { None } else { Some(self.notes.clone()) },
        }))
    }
}

#[derive(Debug)]
pub struct AppState {
    tasks: Vec<Task>,
    pub draft: Draft,
    pub status_filter: StatusFilter,
    pub block_filter: BlockFilter,
    error: Option<String>,
    phase: LoadPhase,
    in_flight: Option<Operation>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> AppState {
        AppState {
            tasks: Vec::new(),
            draft: Draft::default(),
            status_filter: StatusFilter::All,
            block_filter: BlockFilter::All,
            error: None,
            phase: LoadPhase::Loading,
            in_flight: None,
        }
    }

    /// Cached rows, newest insertions first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    /// True while a request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn stats(&self) -> Stats {
        Stats::from_tasks(&self.tasks)
    }

    /// Tasks passing both filters.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter_tasks(&self.tasks, self.status_filter, self.block_filter)
    }

    pub fn task(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn claim(&mut self, op: Operation) -> bool {
        if let Some(current) = self.in_flight {
            warn!(?current, requested = ?op, "request rejected while another is in flight");
            return false;
        }
        self.in_flight = Some(op);
        true
    }

    /// Starts a full reload of the list.
    pub fn begin_reload(&mut self) -> Option<Request> {
        self.claim(Operation::Reload).then_some(Request::List)
    }

    /// Starts inserting the current draft. Returns `None` without a call
    /// when the name is blank, the due date is invalid or the slot is taken.
    pub fn begin_create(&mut self) -> Option<Request> {
        let new_task = match self.draft.to_new_task() {
            Ok(Some(t)) => t,
            Ok(None) => return None,
            Err(msg) => {
                self.error = Some(format!("Error adding task: {}", msg));
                return None;
            }
        };
        self.claim(Operation::Create).then_some(Request::Create(new_task))
    }

    /// Starts flipping the status of task `id`. Unknown ids are ignored.
    pub fn begin_toggle(&mut self, id: u64) -> Option<Request> {
        let status = self.task(id)?.status.toggled();
        self.claim(Operation::Toggle(id))
            .then_some(Request::SetStatus { id, status })
    }

    pub fn begin_delete(&mut self, id: u64) -> Option<Request> {
        self.claim(Operation::Delete(id)).then_some(Request::Delete(id))
    }

    /// Folds a finished request back into the state and frees the slot.
    pub fn complete(&mut self, outcome: Outcome) {
        self.in_flight = None;
        match outcome {
            Outcome::Listed(Ok(tasks)) => {
                info!(count = tasks.len(), "task list loaded");
                self.tasks = tasks;
                self.error = None;
                self.phase = LoadPhase::Ready;
            }
            Outcome::Listed(Err(e)) => {
                warn!(error = %e, "loading tasks failed");
                self.error = Some(e.user_message("loading tasks"));
                self.phase = LoadPhase::Errored;
            }
            Outcome::Created(Ok(task)) => {
                info!(id = task.id, "task created");
                self.tasks.insert(0, task);
                self.draft = Draft::default();
            }
            Outcome::Created(Err(e)) => {
                warn!(error = %e, "adding task failed");
                self.error = Some(e.user_message("adding task"));
            }
            Outcome::Updated(id, Ok(task)) => {
                info!(id, status = %task.status, "task updated");
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) {
                    *slot = task;
                }
            }
            Outcome::Updated(id, Err(e)) => {
                warn!(id, error = %e, "updating task failed");
                self.error = Some(e.user_message("updating task"));
            }
            Outcome::Deleted(id, Ok(())) => {
                info!(id, "task deleted");
                self.tasks.retain(|t| t.id != id);
            }
            Outcome::Deleted(id, Err(e)) => {
                warn!(id, error = %e, "deleting task failed");
                self.error = Some(e.user_message("deleting task"));
            }
        }
    }
}
