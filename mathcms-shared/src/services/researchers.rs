/// Researcher rankings and avatar updates

use super::crud::CrudService;
use super::ServiceResult;
use crate::models::researcher::{Researcher, ResearcherFilter, ResearcherRole};
use crate::stats::{dashboard_rating, leaderboard_rating};
use crate::store::Record;
use serde::Serialize;
use uuid::Uuid;

/// One row of the public leaderboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub id: Uuid,
    pub name: String,
    pub affiliation: Option<String>,
    pub role: ResearcherRole,
    pub avatar: Option<String>,
    pub contributions: u32,
    pub rating: f64,
}

/// A researcher in the dashboard's top-contributors panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopResearcher {
    pub id: Uuid,
    pub name: String,
    pub affiliation: Option<String>,
    pub role: ResearcherRole,
    pub avatar: Option<String>,
    pub contributions: u32,
    pub rating: f64,
}

impl CrudService<Researcher> {
    /// All researchers by contributions descending, ties by name
    async fn ranked(&self) -> ServiceResult<Vec<Record<Researcher>>> {
        let mut researchers = self.get_all(&ResearcherFilter::default(), None, None).await?;
        researchers.sort_by(|a, b| {
            b.data
                .contributions
                .cmp(&a.data.contributions)
                .then_with(|| a.data.name.cmp(&b.data.name))
        });
        Ok(researchers)
    }

    pub async fn leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>> {
        let ranked = self.ranked().await?;

        Ok(ranked
            .into_iter()
            .enumerate()
            .map(|(index, record)| LeaderboardEntry {
                rank: index + 1,
                id: record.id,
                rating: leaderboard_rating(record.data.contributions),
                contributions: record.data.contributions,
                name: record.data.name,
                affiliation: record.data.affiliation,
                role: record.data.role,
                avatar: record.data.avatar,
            })
            .collect())
    }

    pub async fn top_contributors(&self, count: usize) -> ServiceResult<Vec<TopResearcher>> {
        let ranked = self.ranked().await?;

        Ok(ranked
            .into_iter()
            .take(count)
            .map(|record| TopResearcher {
                id: record.id,
                rating: dashboard_rating(record.data.contributions),
                contributions: record.data.contributions,
                name: record.data.name,
                affiliation: record.data.affiliation,
                role: record.data.role,
                avatar: record.data.avatar,
            })
            .collect())
    }

    /// Points the profile at a newly uploaded image
    pub async fn set_avatar(
        &self,
        id: Uuid,
        avatar: String,
    ) -> ServiceResult<Option<Record<Researcher>>> {
        let Some(mut record) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        record.data.avatar = Some(avatar);
        self.save(id, record.data).await
    }
}
