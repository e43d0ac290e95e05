/// Repository reads with the owner joined in
///
/// Owners are resolved with one lookup per distinct researcher id. A
/// dangling owner reference populates as `null`.

use super::crud::CrudService;
use super::ServiceResult;
use crate::models::repository::{Repository, RepositoryFilter};
use crate::models::researcher::Researcher;
use crate::store::{Backend, Record};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// A repository with its owner's profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedRepository {
    #[serde(flatten)]
    pub repository: Record<Repository>,

    pub owner_profile: Option<Record<Researcher>>,
}

#[derive(Clone)]
pub struct RepositoryService {
    repositories: CrudService<Repository>,
    researchers: CrudService<Researcher>,
}

impl RepositoryService {
    pub fn new(repositories: CrudService<Repository>, researchers: CrudService<Researcher>) -> Self {
        Self {
            repositories,
            researchers,
        }
    }

    pub fn from_backend(backend: &Backend) -> Self {
        Self::new(
            CrudService::from_backend(backend),
            CrudService::from_backend(backend),
        )
    }

    /// The plain CRUD service for writes and search
    pub fn crud(&self) -> &CrudService<Repository> {
        &self.repositories
    }

    async fn populate(
        &self,
        records: Vec<Record<Repository>>,
    ) -> ServiceResult<Vec<PopulatedRepository>> {
        let mut owners: HashMap<Uuid, Option<Record<Researcher>>> = HashMap::new();

        for owner in records.iter().filter_map(|r| r.data.owner) {
            if !owners.contains_key(&owner) {
                let profile = self.researchers.get_by_id(owner).await?;
                owners.insert(owner, profile);
            }
        }

        Ok(records
            .into_iter()
            .map(|repository| {
                let owner_profile = repository
                    .data
                    .owner
                    .and_then(|owner| owners.get(&owner).cloned().flatten());
                PopulatedRepository {
                    repository,
                    owner_profile,
                }
            })
            .collect())
    }

    pub async fn get_all(
        &self,
        filter: &RepositoryFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ServiceResult<Vec<PopulatedRepository>> {
        let records = self.repositories.get_all(filter, limit, offset).await?;
        self.populate(records).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<Option<PopulatedRepository>> {
        match self.repositories.get_by_id(id).await? {
            Some(record) => Ok(self.populate(vec![record]).await?.pop()),
            None => Ok(None),
        }
    }

    pub async fn by_owner(&self, researcher_id: Uuid) -> ServiceResult<Vec<PopulatedRepository>> {
        let filter = RepositoryFilter {
            owner: Some(researcher_id),
            is_public: None,
        };
        self.get_all(&filter, None, None).await
    }

    pub async fn set_visibility(
        &self,
        id: Uuid,
        is_public: bool,
    ) -> ServiceResult<Option<PopulatedRepository>> {
        let Some(mut record) = self.repositories.get_by_id(id).await? else {
            return Ok(None);
        };

        record.data.is_public = is_public;
        let Some(saved) = self.repositories.save(id, record.data).await? else {
            return Ok(None);
        };

        info!(repository_id = %id, is_public, "Changed repository visibility");
        Ok(self.populate(vec![saved]).await?.pop())
    }
}
