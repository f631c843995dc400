//! TaskMaster task model.
//!
//! # Responsibility
//! - Define the task record shown in task lists.
//! - Define create/patch inputs and their validation rules.
//!
//! # Invariants
//! - A speculative task always carries a temporary id.
//! - `title` is non-blank after validation.

use crate::model::entity::{Draft, Entity, EntityId, Patch};
use crate::validation::{check_text, ValidationErrors, Validator};
use serde::{Deserialize, Serialize};

pub const TASK_TITLE_MAX_CHARS: usize = 200;
pub const TASK_DESCRIPTION_MAX_CHARS: usize = 2_000;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// Owning project, when the task is filed under one.
    pub project_id: Option<EntityId>,
    /// Never sent over the wire.
    #[serde(skip)]
    pub is_speculative: bool,
}

impl Task {
    /// Builds a server-confirmed task with default status.
    pub fn new(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            project_id: None,
            is_speculative: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

impl Entity for Task {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn is_speculative(&self) -> bool {
        self.is_speculative
    }

    fn set_speculative(&mut self, speculative: bool) {
        self.is_speculative = speculative;
    }
}

/// Create input for a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub project_id: Option<EntityId>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Draft<Task> for NewTask {
    fn speculate(&self, temporary_id: EntityId) -> Task {
        Task {
            id: temporary_id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: TaskStatus::Todo,
            project_id: self.project_id.clone(),
            is_speculative: true,
        }
    }
}

/// Partial task change. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl Patch<Task> for TaskPatch {
    fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

/// Default rules for [`NewTask`]: trimmed title, bounded text fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskValidator;

impl Validator<NewTask> for TaskValidator {
    fn validate(&self, input: NewTask) -> Result<NewTask, ValidationErrors> {
        let mut issues = Vec::new();
        check_text(&mut issues, "title", &input.title, true, TASK_TITLE_MAX_CHARS);
        if let Some(description) = &input.description {
            check_text(
                &mut issues,
                "description",
                description,
                false,
                TASK_DESCRIPTION_MAX_CHARS,
            );
        }
        if let Some(errors) = ValidationErrors::from_issues(issues) {
            return Err(errors);
        }

        Ok(NewTask {
            title: input.title.trim().to_string(),
            description: input
                .description
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            project_id: input.project_id,
        })
    }
}
