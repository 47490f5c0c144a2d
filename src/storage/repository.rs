use super::store::DatasetStore;
use crate::error::{Result, SiftError};
use crate::model::{
    ClassificationType, DatasetContent, DeferOutcome, Draft, Goal, ItemDetail, Project,
    ProjectItem, ProjectRef, ReorderDirection, SOMEDAY_PROJECT, generate_id,
};
use crate::validation;
use std::collections::BTreeMap;

/// Where a draft's item will land, decided before any mutation.
enum TargetPlan {
    Existing(u32),
    Create(String),
}

/// Owner of the canonical in-memory aggregate for one named dataset.
///
/// All session state (current dataset, dirty flag) lives here rather
/// than in process-wide globals, so parallel test runs and multiple
/// datasets never share state. Every public mutation either fully
/// succeeds or leaves the observable state exactly as it was.
pub struct Repository {
    store: DatasetStore,
    name: String,
    data: DatasetContent,
    dirty: bool,
}

impl Repository {
    /// Open an existing dataset.
    pub fn open(store: DatasetStore, name: &str) -> Result<Self> {
        let data = store.load(name)?;
        Ok(Self {
            store,
            name: name.to_string(),
            data,
            dirty: false,
        })
    }

    /// Open the named dataset, creating an empty one on disk if absent.
    pub fn open_or_create(store: DatasetStore, name: &str) -> Result<Self> {
        if !store.exists(name) {
            store.save(name, &DatasetContent::default())?;
        }
        Self::open(store, name)
    }

    pub fn current_name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &DatasetContent {
        &self.data
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn list_datasets(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    // --- inbox -----------------------------------------------------------

    /// Quick capture: append raw text at the tail of the inbox. Always
    /// permitted, independent of any in-flight draft.
    pub fn capture(&mut self, text: &str) -> Result<()> {
        validation::validate_entry_text(text)?;
        self.data.inbox.enqueue(text.trim().to_string());
        self.dirty = true;
        tracing::info!(dataset = %self.name, "Captured inbox entry");
        Ok(())
    }

    /// Move the inbox head to the tail ("skip for now").
    pub fn defer_head(&mut self) -> DeferOutcome {
        let outcome = self.data.inbox.defer_head();
        if outcome == DeferOutcome::Deferred {
            self.dirty = true;
        }
        outcome
    }

    /// Permanently drop the inbox head. User-only; the classifier can
    /// never request this.
    pub fn trash_head(&mut self) -> Result<String> {
        let text = self.data.inbox.dequeue_head()?;
        self.dirty = true;
        tracing::info!(dataset = %self.name, "Trashed inbox entry");
        Ok(text)
    }

    // --- draft application ----------------------------------------------

    /// Apply a resolved-to-be draft: create the item it describes, place
    /// it, dequeue the originating text, and mark the dataset dirty.
    ///
    /// Validation runs up front; the mutation sequence afterwards cannot
    /// fail, so a rejected draft leaves the dataset untouched.
    pub fn apply_draft(&mut self, draft: &mut Draft) -> Result<String> {
        if draft.is_resolved() {
            return Err(SiftError::StaleDraft);
        }

        if self.data.inbox.peek_head() != Some(draft.source_text()) {
            return Err(SiftError::Validation(
                "Inbox head changed since this draft was proposed".to_string(),
            ));
        }

        let plan = self.plan_target(draft)?;

        // Point of no return: from here on every step succeeds
        draft.mark_resolved()?;

        let project_id = match plan {
            TargetPlan::Existing(id) => id,
            TargetPlan::Create(name) => self.data.ensure_project(&name)?,
        };

        let detail = match draft.classification() {
            ClassificationType::Task
            | ClassificationType::NewProject
            | ClassificationType::Incubate => {
                ItemDetail::task(draft.duration_estimate().map(str::to_string))
            }
            ClassificationType::Resource => ItemDetail::resource(),
            ClassificationType::Reference => {
                ItemDetail::reference(draft.source_text().to_string())
            }
        };

        let item = ProjectItem::new(
            generate_id("itm-"),
            draft.source_text().to_string(),
            detail,
        )
        .with_tags(draft.tags().iter());
        let item_id = item.id.clone();

        let project = self
            .data
            .find_project_mut(project_id)
            .expect("target planned against current dataset");
        project.append_item(item);

        self.data
            .inbox
            .dequeue_head()
            .expect("head presence checked above");
        self.dirty = true;

        tracing::info!(
            dataset = %self.name,
            project = project_id,
            item = %item_id,
            kind = %draft.classification(),
            "Applied draft"
        );
        Ok(item_id)
    }

    fn plan_target(&self, draft: &Draft) -> Result<TargetPlan> {
        match draft.classification() {
            ClassificationType::Incubate => Ok(match self.data.find_project_by_name(SOMEDAY_PROJECT)
            {
                Some(p) => TargetPlan::Existing(p.id),
                None => TargetPlan::Create(SOMEDAY_PROJECT.to_string()),
            }),
            ClassificationType::NewProject => match draft.target() {
                ProjectRef::New(name) => {
                    validation::validate_name(name)?;
                    Ok(TargetPlan::Create(name.clone()))
                }
                ProjectRef::Existing(_) | ProjectRef::Unmatched => Err(SiftError::Validation(
                    "A new-project draft needs a project name".to_string(),
                )),
            },
            ClassificationType::Task
            | ClassificationType::Resource
            | ClassificationType::Reference => match draft.target() {
                ProjectRef::Existing(id) => {
                    if self.data.find_project(*id).is_none() {
                        return Err(SiftError::Validation(format!(
                            "Target project {} does not exist",
                            id
                        )));
                    }
                    Ok(TargetPlan::Existing(*id))
                }
                ProjectRef::New(name) => {
                    validation::validate_name(name)?;
                    Ok(TargetPlan::Create(name.clone()))
                }
                ProjectRef::Unmatched => Err(SiftError::Validation(
                    "No target project selected. Pick one or propose a new name.".to_string(),
                )),
            },
        }
    }

    // --- manual mutations ------------------------------------------------

    /// Manual-add path: place an item directly, bypassing classification.
    pub fn add_item(&mut self, project_id: u32, item: ProjectItem) -> Result<String> {
        validation::validate_name(&item.name)?;
        for tag in &item.tags {
            validation::validate_tag(tag)?;
        }
        let item_id = item.id.clone();
        let project = self
            .data
            .find_project_mut(project_id)
            .ok_or_else(|| SiftError::NotFound(format!("project {}", project_id)))?;
        project.append_item(item);
        self.dirty = true;
        tracing::info!(dataset = %self.name, project = project_id, item = %item_id, "Added item");
        Ok(item_id)
    }

    pub fn create_project(&mut self, name: &str) -> Result<u32> {
        validation::validate_name(name)?;
        if self.data.find_project_by_name(name).is_some() {
            return Err(SiftError::Validation(format!(
                "Project '{}' already exists",
                name
            )));
        }
        let id = self.data.ensure_project(name)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn create_goal(&mut self, name: &str) -> Result<String> {
        validation::validate_name(name)?;
        let goal = Goal::new(name.to_string());
        let id = goal.id.clone();
        self.data.goals.push(goal);
        self.dirty = true;
        Ok(id)
    }

    pub fn assign_project_to_goal(&mut self, project_id: u32, goal_id: &str) -> Result<()> {
        if self.data.find_goal(goal_id).is_none() {
            return Err(SiftError::NotFound(format!("goal {}", goal_id)));
        }
        let project = self
            .data
            .find_project_mut(project_id)
            .ok_or_else(|| SiftError::NotFound(format!("project {}", project_id)))?;
        project.goal_id = Some(goal_id.to_string());
        self.dirty = true;
        Ok(())
    }

    pub fn set_item_completed(
        &mut self,
        project_id: u32,
        item_id: &str,
        completed: bool,
    ) -> Result<()> {
        let project = self
            .data
            .find_project_mut(project_id)
            .ok_or_else(|| SiftError::NotFound(format!("project {}", project_id)))?;
        let item = project
            .find_item_mut(item_id)
            .ok_or_else(|| SiftError::NotFound(format!("item {}", item_id)))?;
        item.set_completed(completed)?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_item_acquired(
        &mut self,
        project_id: u32,
        item_id: &str,
        acquired: bool,
    ) -> Result<()> {
        let project = self
            .data
            .find_project_mut(project_id)
            .ok_or_else(|| SiftError::NotFound(format!("project {}", project_id)))?;
        let item = project
            .find_item_mut(item_id)
            .ok_or_else(|| SiftError::NotFound(format!("item {}", item_id)))?;
        item.set_acquired(acquired)?;
        self.dirty = true;
        Ok(())
    }

    pub fn reorder_project(&mut self, project_id: u32, direction: ReorderDirection) -> Result<()> {
        self.data.reorder_project(project_id, direction)?;
        self.dirty = true;
        Ok(())
    }

    // --- queries ---------------------------------------------------------

    /// Incomplete tasks of active projects, optionally filtered by tag.
    pub fn next_actions(&self, tag_filter: Option<&str>) -> Vec<(&Project, &ProjectItem)> {
        let mut actions = Vec::new();
        for project in self.data.projects_sorted() {
            if project.status != crate::model::ProjectStatus::Active {
                continue;
            }
            for item in &project.items {
                let open_task = matches!(
                    &item.detail,
                    ItemDetail::Task { is_completed, .. } if !is_completed
                );
                if !open_task {
                    continue;
                }
                if let Some(tag) = tag_filter {
                    if !item.tags.iter().any(|t| t == tag) {
                        continue;
                    }
                }
                actions.push((project, item));
            }
        }
        actions
    }

    /// Unacquired resources of non-completed projects, grouped by store.
    pub fn shopping_list(&self) -> BTreeMap<String, Vec<(&ProjectItem, &str)>> {
        let mut trips: BTreeMap<String, Vec<(&ProjectItem, &str)>> = BTreeMap::new();
        for project in self.data.projects_sorted() {
            if project.status == crate::model::ProjectStatus::Completed {
                continue;
            }
            for item in &project.items {
                if let ItemDetail::Resource {
                    is_acquired, store, ..
                } = &item.detail
                {
                    if *is_acquired {
                        continue;
                    }
                    let store_name = if store.is_empty() {
                        "General".to_string()
                    } else {
                        store.clone()
                    };
                    trips
                        .entry(store_name)
                        .or_default()
                        .push((item, project.name.as_str()));
                }
            }
        }
        trips
    }

    // --- persistence -----------------------------------------------------

    /// Serialize the whole aggregate; clear the dirty flag only on
    /// success. On failure the in-memory state and the flag survive, so
    /// nothing is lost.
    pub fn save(&mut self) -> Result<()> {
        self.store.save(&self.name, &self.data)?;
        self.dirty = false;
        tracing::info!(dataset = %self.name, "Saved dataset");
        Ok(())
    }

    /// Fully replace the in-memory aggregate with the named dataset.
    /// On failure the currently loaded dataset is untouched.
    pub fn load(&mut self, name: &str) -> Result<()> {
        let data = self.store.load(name)?;
        self.name = name.to_string();
        self.data = data;
        self.dirty = false;
        tracing::info!(dataset = %self.name, "Loaded dataset");
        Ok(())
    }

    /// Guarded dataset switch. Refuses while unsaved changes exist;
    /// datasets are never merged.
    pub fn switch(&mut self, name: &str) -> Result<()> {
        if self.dirty {
            return Err(SiftError::DirtyState(self.name.clone()));
        }
        self.load(name)
    }

    /// Throw away unsaved changes by reloading the current dataset.
    pub fn discard(&mut self) -> Result<()> {
        let name = self.name.clone();
        self.load(&name)
    }
}
