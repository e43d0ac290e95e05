/// Admin dashboard statistics
///
/// Growth compares what was created in the last 30 days with the 30 days
/// before that. Counts per collection run concurrently.

use super::crud::CrudService;
use super::researchers::TopResearcher;
use super::ServiceResult;
use crate::models::category::Category;
use crate::models::document::{Document, DocumentFilter};
use crate::models::event::{Event, EventFilter, EventStatus};
use crate::models::news::{News, NewsFilter};
use crate::models::repository::Repository;
use crate::models::researcher::Researcher;
use crate::models::time_entry::TimeEntry;
use crate::models::Resource;
use crate::stats::{growth_percentage, relative_time};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

const GROWTH_WINDOW_DAYS: i64 = 30;
const ACTIVITY_LIMIT: usize = 10;
const TOP_RESEARCHERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub news: i64,
    pub events: i64,
    pub documents: i64,
    pub researchers: i64,
    pub repositories: i64,
    pub categories: i64,
    pub time_entries: i64,
}

/// Percentage change per collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Growth {
    pub news: f64,
    pub events: f64,
    pub documents: f64,
    pub researchers: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub totals: Totals,
    pub growth: Growth,
    pub upcoming_events: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    News,
    Event,
    Document,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub time_ago: String,
}

#[derive(Clone)]
pub struct DashboardService {
    news: CrudService<News>,
    events: CrudService<Event>,
    documents: CrudService<Document>,
    researchers: CrudService<Researcher>,
    repositories: CrudService<Repository>,
    categories: CrudService<Category>,
    time_entries: CrudService<TimeEntry>,
}

async fn growth_of<T: Resource>(service: &CrudService<T>, now: DateTime<Utc>) -> ServiceResult<f64> {
    let window = Duration::days(GROWTH_WINDOW_DAYS);
    let current = service.count_created(Some(now - window), None).await?;
    let previous = service
        .count_created(Some(now - window - window), Some(now - window))
        .await?;
    Ok(growth_percentage(current, previous))
}

impl DashboardService {
    pub fn new(
        news: CrudService<News>,
        events: CrudService<Event>,
        documents: CrudService<Document>,
        researchers: CrudService<Researcher>,
        repositories: CrudService<Repository>,
        categories: CrudService<Category>,
        time_entries: CrudService<TimeEntry>,
    ) -> Self {
        Self {
            news,
            events,
            documents,
            researchers,
            repositories,
            categories,
            time_entries,
        }
    }

    pub async fn stats(&self, now: DateTime<Utc>) -> ServiceResult<DashboardStats> {
        let (news, events, documents, researchers, repositories, categories, time_entries) = futures::try_join!(
            self.news.count(),
            self.events.count(),
            self.documents.count(),
            self.researchers.count(),
            self.repositories.count(),
            self.categories.count(),
            self.time_entries.count(),
        )?;

        let (news_growth, events_growth, documents_growth, researchers_growth) = futures::try_join!(
            growth_of(&self.news, now),
            growth_of(&self.events, now),
            growth_of(&self.documents, now),
            growth_of(&self.researchers, now),
        )?;

        let upcoming = EventFilter {
            status: Some(EventStatus::Upcoming),
            location: None,
        };
        let upcoming_events = self
            .events
            .get_all(&upcoming, None, None)
            .await?
            .iter()
            .filter(|e| e.data.start_date > now)
            .count() as i64;

        Ok(DashboardStats {
            totals: Totals {
                news,
                events,
                documents,
                researchers,
                repositories,
                categories,
                time_entries,
            },
            growth: Growth {
                news: news_growth,
                events: events_growth,
                documents: documents_growth,
                researchers: researchers_growth,
            },
            upcoming_events,
        })
    }

    /// Most recent news, events and documents, newest first
    pub async fn recent_activity(&self, now: DateTime<Utc>) -> ServiceResult<Vec<ActivityItem>> {
        let limit = Some(ACTIVITY_LIMIT as i64);
        let news_filter = NewsFilter::default();
        let event_filter = EventFilter::default();
        let document_filter = DocumentFilter::default();

        let (news, events, documents) = futures::try_join!(
            self.news.get_all(&news_filter, limit, None),
            self.events.get_all(&event_filter, limit, None),
            self.documents.get_all(&document_filter, limit, None),
        )?;

        let item = |kind, id, title: String, created_at: DateTime<Utc>| ActivityItem {
            kind,
            id,
            title,
            created_at,
            time_ago: relative_time(created_at, now),
        };

        let mut items: Vec<ActivityItem> = news
            .into_iter()
            .map(|r| item(ActivityKind::News, r.id, r.data.title.en, r.created_at))
            .chain(
                events
                    .into_iter()
                    .map(|r| item(ActivityKind::Event, r.id, r.data.title, r.created_at)),
            )
            .chain(
                documents
                    .into_iter()
                    .map(|r| item(ActivityKind::Document, r.id, r.data.title, r.created_at)),
            )
            .collect();

        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(ACTIVITY_LIMIT);
        Ok(items)
    }

    pub async fn top_researchers(&self) -> ServiceResult<Vec<TopResearcher>> {
        self.researchers.top_contributors(TOP_RESEARCHERS).await
    }
}
