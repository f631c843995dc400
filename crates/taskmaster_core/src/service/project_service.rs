//! Project use-case service.

use crate::config::MutatorConfig;
use crate::model::entity::EntityId;
use crate::model::project::{
    NewProject, Project, ProjectPatch, ProjectValidator, PROJECT_NAME_MAX_CHARS,
};
use crate::mutator::{MutationError, MutationResult, OptimisticMutator};
use crate::remote::RemoteSource;
use crate::service::log_outcome;
use crate::store::StoreReader;
use crate::validation::{check_text, ValidationErrors};
use std::sync::Arc;

const MODULE: &str = "project_service";

pub type ProjectMutator = OptimisticMutator<Project, NewProject, ProjectPatch>;
pub type ProjectRemote = dyn RemoteSource<Project, NewProject, ProjectPatch>;

pub struct ProjectService {
    mutator: ProjectMutator,
}

impl ProjectService {
    pub fn new(remote: Arc<ProjectRemote>) -> Self {
        Self::with_config(remote, MutatorConfig::default())
    }

    pub fn with_config(remote: Arc<ProjectRemote>, config: MutatorConfig) -> Self {
        Self {
            mutator: ProjectMutator::with_config(remote, Arc::new(ProjectValidator), config),
        }
    }

    pub fn projects(&self) -> StoreReader<Project> {
        self.mutator.reader()
    }

    pub fn list_projects(&self) -> Vec<Project> {
        self.mutator.snapshot()
    }

    pub async fn create_project(&self, name: impl Into<String>) -> MutationResult<Project> {
        let result = self.mutator.create(NewProject { name: name.into() }).await;
        log_outcome(
            "project_create",
            MODULE,
            result.as_ref().ok().map(|project| &project.id),
            &result,
        );
        result
    }

    pub async fn rename_project(
        &self,
        id: &EntityId,
        name: impl Into<String>,
    ) -> MutationResult<Project> {
        let name = name.into();
        let mut issues = Vec::new();
        check_text(&mut issues, "name", &name, true, PROJECT_NAME_MAX_CHARS);
        let result = match ValidationErrors::from_issues(issues) {
            Some(errors) => Err(MutationError::InvalidInput(errors)),
            None => {
                let patch = ProjectPatch {
                    name: Some(name.trim().to_string()),
                };
                self.mutator.update(id, patch).await
            }
        };
        log_outcome("project_rename", MODULE, Some(id), &result);
        result
    }

    pub async fn delete_project(&self, id: &EntityId) -> MutationResult<()> {
        let result = self.mutator.delete(id).await;
        log_outcome("project_delete", MODULE, Some(id), &result);
        result
    }

    pub async fn refresh(&self) -> MutationResult<Vec<Project>> {
        let result = self.mutator.refresh().await;
        log_outcome("project_refresh", MODULE, None, &result);
        result
    }
}
