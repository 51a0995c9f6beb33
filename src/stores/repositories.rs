use serde_json::Value;
use tracing::info;

use crate::gateway::BackendApi;
use crate::models::{BackendType, CheckResult, PruneResult, Repository};
use crate::observable::{derived2, Derived, Observable, ReadOnly};

use super::ActionStatus;

/// Known repositories and the currently selected one.
#[derive(Clone)]
pub struct RepositoryStore {
    api: BackendApi,
    repositories: Observable<Vec<Repository>>,
    active_repository_id: Observable<Option<String>>,
    status: ActionStatus,
}

impl RepositoryStore {
    pub fn new(api: BackendApi) -> Self {
        Self {
            api,
            repositories: Observable::new(Vec::new()),
            active_repository_id: Observable::new(None),
            status: ActionStatus::new(),
        }
    }

    pub fn repositories(&self) -> ReadOnly<Vec<Repository>> {
        self.repositories.read_only()
    }

    pub fn active_repository_id(&self) -> ReadOnly<Option<String>> {
        self.active_repository_id.read_only()
    }

    pub fn loading(&self) -> ReadOnly<bool> {
        self.status.loading()
    }

    pub fn error(&self) -> ReadOnly<Option<String>> {
        self.status.error()
    }

    /// The selected repository, or `None` when nothing is selected or the
    /// selected id is not in the collection.
    pub fn active_repository(&self) -> Derived<Option<Repository>> {
        derived2(
            &self.repositories,
            &self.active_repository_id,
            |repositories: &Vec<Repository>, active: &Option<String>| {
                let active = active.as_deref()?;
                repositories.iter().find(|repo| repo.id == active).cloned()
            },
        )
    }

    pub fn set_repositories(&self, list: Vec<Repository>) {
        self.repositories.set(list);
    }

    /// Membership is not checked; a dangling id reads as no active repository.
    pub fn set_active_repository(&self, id: Option<String>) {
        self.active_repository_id.set(id);
    }

    pub async fn load_repositories(&self) {
        self.status.begin();
        match self.api.list_repositories().await {
            Ok(list) => self.repositories.set(list),
            Err(err) => self
                .status
                .fail("load_repositories", &err, "Failed to load repositories"),
        }
        self.status.finish();
    }

    /// Unlock `id` on the backend and make it the active repository.
    pub async fn switch_active_repository(&self, id: &str, password: &str) -> Option<Repository> {
        self.status.begin();
        let result = match self.api.switch_repository(id, password).await {
            Ok(repository) => {
                self.replace(&repository);
                self.active_repository_id.set(Some(id.to_string()));
                info!(repository = %repository.id, "Switched active repository");
                Some(repository)
            }
            Err(err) => {
                self.status
                    .fail("switch_repository", &err, "Failed to switch repository");
                None
            }
        };
        self.status.finish();
        result
    }

    pub async fn init_repository(
        &self,
        path: &str,
        password: &str,
        backend_type: BackendType,
        backend_options: Option<&Value>,
    ) -> Option<Repository> {
        self.status.begin();
        let result = match self
            .api
            .init_repository(path, password, backend_type, backend_options)
            .await
        {
            Ok(repository) => {
                self.upsert(repository.clone());
                Some(repository)
            }
            Err(err) => {
                self.status
                    .fail("init_repository", &err, "Failed to create repository");
                None
            }
        };
        self.status.finish();
        result
    }

    /// Open an existing repository and add it to the collection, replacing
    /// an entry with the same id.
    pub async fn open_repository(&self, path: &str, password: &str) -> Option<Repository> {
        self.status.begin();
        let result = match self.api.open_repository(path, password).await {
            Ok(repository) => {
                self.upsert(repository.clone());
                Some(repository)
            }
            Err(err) => {
                self.status
                    .fail("open_repository", &err, "Failed to open repository");
                None
            }
        };
        self.status.finish();
        result
    }

    pub async fn delete_repository(&self, id: &str, delete_data: bool) -> bool {
        self.status.begin();
        let deleted = match self.api.delete_repository(id, delete_data).await {
            Ok(()) => {
                self.forget(id);
                true
            }
            Err(err) => {
                self.status
                    .fail("delete_repository", &err, "Failed to delete repository");
                false
            }
        };
        self.status.finish();
        deleted
    }

    /// Drop the repository from the configuration without touching its data.
    pub async fn remove_from_config(&self, id: &str) -> bool {
        self.status.begin();
        let removed = match self.api.remove_repository_from_config(id).await {
            Ok(()) => {
                self.forget(id);
                true
            }
            Err(err) => {
                self.status.fail(
                    "remove_repository_from_config",
                    &err,
                    "Failed to remove repository",
                );
                false
            }
        };
        self.status.finish();
        removed
    }

    pub async fn check_repository(
        &self,
        id: &str,
        trust_cache: bool,
        read_data: bool,
    ) -> Option<CheckResult> {
        self.status.begin();
        let result = match self.api.check_repository(id, trust_cache, read_data).await {
            Ok(result) => Some(result),
            Err(err) => {
                self.status
                    .fail("check_repository", &err, "Repository check failed");
                None
            }
        };
        self.status.finish();
        result
    }

    pub async fn prune_repository(&self, id: &str, dry_run: bool) -> Option<PruneResult> {
        self.status.begin();
        let result = match self.api.prune_repository(id, dry_run).await {
            Ok(result) => Some(result),
            Err(err) => {
                self.status
                    .fail("prune_repository", &err, "Failed to prune repository");
                None
            }
        };
        self.status.finish();
        result
    }

    pub fn reset(&self) {
        self.repositories.set(Vec::new());
        self.active_repository_id.set(None);
        self.status.reset();
    }

    fn replace(&self, repository: &Repository) {
        self.repositories.update(|list| {
            for entry in list.iter_mut().filter(|entry| entry.id == repository.id) {
                *entry = repository.clone();
            }
        });
    }

    fn upsert(&self, repository: Repository) {
        self.repositories.update(|list| {
            match list.iter_mut().find(|entry| entry.id == repository.id) {
                Some(entry) => *entry = repository,
                None => list.push(repository),
            }
        });
    }

    fn forget(&self, id: &str) {
        self.repositories.update(|list| list.retain(|entry| entry.id != id));
        if self.active_repository_id.with(|active| active.as_deref() == Some(id)) {
            self.active_repository_id.set(None);
        }
    }
}
