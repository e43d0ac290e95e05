/// Admin dashboard (admin role only)
///
/// - `GET /admin/dashboard`: totals, 30-day growth, upcoming events
/// - `GET /admin/dashboard/activity`: the 10 latest news, events and documents
/// - `GET /admin/dashboard/researchers`: top 5 contributors

use crate::{error::ApiResult, response::Envelope};
use axum::extract::State;
use chrono::Utc;
use mathcms_shared::services::{
    dashboard::{ActivityItem, DashboardService, DashboardStats},
    researchers::TopResearcher,
};

pub async fn stats(
    State(dashboard): State<DashboardService>,
) -> ApiResult<Envelope<DashboardStats>> {
    Ok(Envelope::ok(dashboard.stats(Utc::now()).await?))
}

pub async fn activity(
    State(dashboard): State<DashboardService>,
) -> ApiResult<Envelope<Vec<ActivityItem>>> {
    Ok(Envelope::list(dashboard.recent_activity(Utc::now()).await?))
}

pub async fn researchers(
    State(dashboard): State<DashboardService>,
) -> ApiResult<Envelope<Vec<TopResearcher>>> {
    Ok(Envelope::list(dashboard.top_researchers().await?))
}
