/// Event model
///
/// Seminars, colloquia and workshops. An event must end strictly after it
/// starts; the rule is re-checked after partial updates so moving only one
/// of the two dates cannot break it.

use super::{clean_list, clean_opt, Resource};
use crate::store::Entity;
use crate::validation::{collect_errors, require_text, required, FieldError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where an event takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLocation {
    MainHall,
    SeminarRoom,
    LectureHall,
    Library,
    Online,
    External,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    pub start_date: DateTime<Utc>,

    pub end_date: DateTime<Utc>,

    pub location: EventLocation,

    #[serde(default)]
    pub speakers: Vec<String>,

    pub status: EventStatus,

    #[serde(default)]
    pub registration_url: Option<String>,
}

impl Entity for Event {
    const COLLECTION: &'static str = "events";
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "description", "speakers"];
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(required(message = "Start date is required"))]
    pub start_date: Option<DateTime<Utc>>,

    #[validate(required(message = "End date is required"))]
    pub end_date: Option<DateTime<Utc>>,

    #[validate(required(message = "Location is required"))]
    pub location: Option<EventLocation>,

    pub speakers: Vec<String>,

    pub status: EventStatus,

    #[validate(url(message = "Registration URL must be a valid URL"))]
    pub registration_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateEvent {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,

    pub location: Option<EventLocation>,

    pub speakers: Option<Vec<String>>,

    pub status: Option<EventStatus>,

    #[validate(url(message = "Registration URL must be a valid URL"))]
    pub registration_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub location: Option<EventLocation>,
}

impl Resource for Event {
    const LABEL: &'static str = "Event";

    type Create = CreateEvent;
    type Update = UpdateEvent;
    type Filter = EventFilter;

    fn from_create(input: CreateEvent) -> Result<Self, Vec<FieldError>> {
        Ok(Self {
            title: input.title.trim().to_string(),
            description: clean_opt(input.description),
            start_date: required(input.start_date, "startDate")?,
            end_date: required(input.end_date, "endDate")?,
            location: required(input.location, "location")?,
            speakers: clean_list(input.speakers),
            status: input.status,
            registration_url: clean_opt(input.registration_url),
        })
    }

    fn apply_update(&mut self, input: UpdateEvent) {
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if input.description.is_some() {
            self.description = clean_opt(input.description);
        }
        if let Some(start) = input.start_date {
            self.start_date = start;
        }
        if let Some(end) = input.end_date {
            self.end_date = end;
        }
        if let Some(location) = input.location {
            self.location = location;
        }
        if let Some(speakers) = input.speakers {
            self.speakers = clean_list(speakers);
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if input.registration_url.is_some() {
            self.registration_url = clean_opt(input.registration_url);
        }
    }

    fn check(&self) -> Result<(), Vec<FieldError>> {
        collect_errors([
            require_text("title", &self.title, 1, "Title must be 1-200 characters"),
            (self.end_date <= self.start_date)
                .then(|| FieldError::new("endDate", "End date must be after start date")),
        ])
    }
}
