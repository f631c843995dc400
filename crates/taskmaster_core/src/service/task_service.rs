//! Task use-case service.
//!
//! # Responsibility
//! - Provide the TaskMaster task list operations used by UI layers.
//! - Delegate every store change to the task mutator.
//!
//! # Invariants
//! - Renames are validated with the same title rules as creates.
//! - Service APIs never bypass the mutator's rollback contract.

use crate::config::MutatorConfig;
use crate::model::entity::EntityId;
use crate::model::task::{
    NewTask, Task, TaskPatch, TaskStatus, TaskValidator, TASK_TITLE_MAX_CHARS,
};
use crate::mutator::{MutationError, MutationResult, OptimisticMutator};
use crate::remote::RemoteSource;
use crate::service::log_outcome;
use crate::store::StoreReader;
use crate::validation::{check_text, ValidationErrors};
use std::sync::Arc;

const MODULE: &str = "task_service";

pub type TaskMutator = OptimisticMutator<Task, NewTask, TaskPatch>;
pub type TaskRemote = dyn RemoteSource<Task, NewTask, TaskPatch>;

/// List filter for tasks. The default shows everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub project_id: Option<EntityId>,
    pub include_speculative: bool,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            status: None,
            project_id: None,
            include_speculative: true,
        }
    }
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.status == status)
            && self
                .project_id
                .as_ref()
                .map_or(true, |project_id| task.project_id.as_ref() == Some(project_id))
            && (self.include_speculative || !task.is_speculative)
    }
}

pub struct TaskService {
    mutator: TaskMutator,
}

impl TaskService {
    pub fn new(remote: Arc<TaskRemote>) -> Self {
        Self::with_config(remote, MutatorConfig::default())
    }

    pub fn with_config(remote: Arc<TaskRemote>, config: MutatorConfig) -> Self {
        Self {
            mutator: TaskMutator::with_config(remote, Arc::new(TaskValidator), config),
        }
    }

    pub fn mutator(&self) -> &TaskMutator {
        &self.mutator
    }

    /// Read-only view for rendering layers.
    pub fn tasks(&self) -> StoreReader<Task> {
        self.mutator.reader()
    }

    pub fn list_tasks(&self, filter: &TaskFilter) -> Vec<Task> {
        self.mutator
            .snapshot()
            .into_iter()
            .filter(|task| filter.matches(task))
            .collect()
    }

    pub async fn create_task(&self, input: NewTask) -> MutationResult<Task> {
        let result = self.mutator.create(input).await;
        log_outcome(
            "task_create",
            MODULE,
            result.as_ref().ok().map(|task| &task.id),
            &result,
        );
        result
    }

    pub async fn rename_task(
        &self,
        id: &EntityId,
        title: impl Into<String>,
    ) -> MutationResult<Task> {
        let title = title.into();
        let mut issues = Vec::new();
        check_text(&mut issues, "title", &title, true, TASK_TITLE_MAX_CHARS);
        let result = match ValidationErrors::from_issues(issues) {
            Some(errors) => Err(MutationError::InvalidInput(errors)),
            None => {
                self.mutator
                    .update(id, TaskPatch::title(title.trim()))
                    .await
            }
        };
        log_outcome("task_rename", MODULE, Some(id), &result);
        result
    }

    pub async fn set_task_status(&self, id: &EntityId, status: TaskStatus) -> MutationResult<Task> {
        let result = self.mutator.update(id, TaskPatch::status(status)).await;
        log_outcome("task_set_status", MODULE, Some(id), &result);
        result
    }

    pub async fn complete_task(&self, id: &EntityId) -> MutationResult<Task> {
        self.set_task_status(id, TaskStatus::Done).await
    }

    pub async fn delete_task(&self, id: &EntityId) -> MutationResult<()> {
        let result = self.mutator.delete(id).await;
        log_outcome("task_delete", MODULE, Some(id), &result);
        result
    }

    pub async fn refresh(&self) -> MutationResult<Vec<Task>> {
        let result = self.mutator.refresh().await;
        log_outcome("task_refresh", MODULE, None, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::TaskFilter;
    use crate::model::entity::EntityId;
    use crate::model::task::{Task, TaskStatus};

    #[test]
    fn default_filter_matches_everything() {
        let mut task = Task::new("tmp-1", "pending");
        task.is_speculative = true;
        assert!(TaskFilter::default().matches(&task));
    }

    #[test]
    fn filter_combines_status_project_and_speculative_flag() {
        let mut task = Task::new("task-1", "filed");
        task.status = TaskStatus::Done;
        task.project_id = Some(EntityId::from("project-1"));

        let filter = TaskFilter {
            status: Some(TaskStatus::Done),
            project_id: Some(EntityId::from("project-1")),
            include_speculative: false,
        };
        assert!(filter.matches(&task));

        task.is_speculative = true;
        assert!(!filter.matches(&task));

        let other_project = TaskFilter {
            project_id: Some(EntityId::from("project-2")),
            ..TaskFilter::default()
        };
        assert!(!other_project.matches(&Task::new("task-2", "unfiled")));
    }
}
