//! TaskMaster project model.

use crate::model::entity::{Draft, Entity, EntityId, Patch};
use crate::validation::{check_text, ValidationErrors, Validator};
use serde::{Deserialize, Serialize};

pub const PROJECT_NAME_MAX_CHARS: usize = 100;

/// A named group of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    #[serde(skip)]
    pub is_speculative: bool,
}

impl Project {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_speculative: false,
        }
    }
}

impl Entity for Project {
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

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
}

impl Draft<Project> for NewProject {
    fn speculate(&self, temporary_id: EntityId) -> Project {
        Project {
            id: temporary_id,
            name: self.name.clone(),
            is_speculative: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
}

impl Patch<Project> for ProjectPatch {
    fn apply_to(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectValidator;

impl Validator<NewProject> for ProjectValidator {
    fn validate(&self, input: NewProject) -> Result<NewProject, ValidationErrors> {
        let mut issues = Vec::new();
        check_text(&mut issues, "name", &input.name, true, PROJECT_NAME_MAX_CHARS);
        match ValidationErrors::from_issues(issues) {
            Some(errors) => Err(errors),
            None => Ok(NewProject {
                name: input.name.trim().to_string(),
            }),
        }
    }
}
