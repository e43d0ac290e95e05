/// Time-tracking entries
///
/// `durationMinutes` is recomputed from the start and end times whenever
/// both are known; open entries keep whatever duration was supplied.

use super::{clean_opt, Resource};
use crate::store::Entity;
use crate::validation::{collect_errors, require_text, required, FieldError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub description: String,

    /// Category id
    #[serde(default)]
    pub category: Option<Uuid>,

    pub start_time: DateTime<Utc>,

    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub duration_minutes: Option<i64>,
}

impl TimeEntry {
    fn derive_duration(&mut self) {
        if let Some(end) = self.end_time {
            self.duration_minutes = Some((end - self.start_time).num_minutes());
        }
    }
}

impl Entity for TimeEntry {
    const COLLECTION: &'static str = "time_entries";
    const SEARCH_FIELDS: &'static [&'static str] = &["description"];
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTimeEntry {
    #[validate(length(min = 1, max = 500, message = "Description must be 1-500 characters"))]
    pub description: String,

    pub category: Option<Uuid>,

    #[validate(required(message = "Start time is required"))]
    pub start_time: Option<DateTime<Utc>>,

    pub end_time: Option<DateTime<Utc>>,

    #[validate(range(min = 0, message = "Duration must not be negative"))]
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateTimeEntry {
    #[validate(length(min = 1, max = 500, message = "Description must be 1-500 characters"))]
    pub description: Option<String>,

    pub category: Option<Uuid>,

    pub start_time: Option<DateTime<Utc>>,

    pub end_time: Option<DateTime<Utc>>,

    #[validate(range(min = 0, message = "Duration must not be negative"))]
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TimeEntryFilter {
    pub category: Option<Uuid>,
}

impl Resource for TimeEntry {
    const LABEL: &'static str = "Time entry";

    type Create = CreateTimeEntry;
    type Update = UpdateTimeEntry;
    type Filter = TimeEntryFilter;

    fn from_create(input: CreateTimeEntry) -> Result<Self, Vec<FieldError>> {
        let mut entry = Self {
            description: input.description.trim().to_string(),
            category: input.category,
            start_time: required(input.start_time, "startTime")?,
            end_time: input.end_time,
            duration_minutes: input.duration_minutes,
        };
        entry.derive_duration();
        Ok(entry)
    }

    fn apply_update(&mut self, input: UpdateTimeEntry) {
        if let Some(description) = clean_opt(input.description) {
            self.description = description;
        }
        if input.category.is_some() {
            self.category = input.category;
        }
        if let Some(start) = input.start_time {
            self.start_time = start;
        }
        if input.end_time.is_some() {
            self.end_time = input.end_time;
        }
        if input.duration_minutes.is_some() {
            self.duration_minutes = input.duration_minutes;
        }
        self.derive_duration();
    }

    fn check(&self) -> Result<(), Vec<FieldError>> {
        collect_errors([
            require_text("description", &self.description, 1, "Description must be 1-500 characters"),
            match self.end_time {
                Some(end) if end <= self.start_time => {
                    Some(FieldError::new("endTime", "End time must be after start time"))
                }
                _ => None,
            },
        ])
    }
}
