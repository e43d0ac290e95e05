/// Researcher profiles
///
/// Emails are stored lowercase and are unique across researchers (enforced
/// by the store). Repositories refer to researchers through their id; the
/// reference is not enforced and survives deletion.

use super::{clean_list, clean_opt, Resource};
use crate::store::Entity;
use crate::validation::{require_text, validate_no_blank_entries, FieldError};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearcherRole {
    Professor,
    AssociateProfessor,
    AssistantProfessor,
    Postdoc,
    PhdStudent,
    #[default]
    Researcher,
    Visiting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Researcher {
    pub name: String,

    pub email: String,

    #[serde(default)]
    pub affiliation: Option<String>,

    pub role: ResearcherRole,

    /// Number of recorded contributions (papers, talks, reviews)
    #[serde(default)]
    pub contributions: u32,

    #[serde(default)]
    pub bio: Option<String>,

    /// Avatar image path or URL
    #[serde(default)]
    pub avatar: Option<String>,

    #[serde(default)]
    pub research_areas: Vec<String>,
}

impl Entity for Researcher {
    const COLLECTION: &'static str = "researchers";
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "email", "affiliation", "researchAreas"];
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateResearcher {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,

    #[validate(email(message = "A valid email is required"))]
    pub email: String,

    #[validate(length(max = 200, message = "Affiliation must be at most 200 characters"))]
    pub affiliation: Option<String>,

    pub role: ResearcherRole,

    pub contributions: u32,

    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,

    #[validate(length(max = 512, message = "Avatar path must be at most 512 characters"))]
    pub avatar: Option<String>,

    #[validate(custom(function = "validate_no_blank_entries"))]
    pub research_areas: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateResearcher {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,

    #[validate(length(max = 200, message = "Affiliation must be at most 200 characters"))]
    pub affiliation: Option<String>,

    pub role: Option<ResearcherRole>,

    pub contributions: Option<u32>,

    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,

    #[validate(length(max = 512, message = "Avatar path must be at most 512 characters"))]
    pub avatar: Option<String>,

    #[validate(custom(function = "validate_no_blank_entries"))]
    pub research_areas: Option<Vec<String>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ResearcherFilter {
    pub role: Option<ResearcherRole>,
}

impl Resource for Researcher {
    const LABEL: &'static str = "Researcher";

    type Create = CreateResearcher;
    type Update = UpdateResearcher;
    type Filter = ResearcherFilter;

    fn from_create(input: CreateResearcher) -> Result<Self, Vec<FieldError>> {
        Ok(Self {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            affiliation: clean_opt(input.affiliation),
            role: input.role,
            contributions: input.contributions,
            bio: clean_opt(input.bio),
            avatar: clean_opt(input.avatar),
            research_areas: clean_list(input.research_areas),
        })
    }

    fn apply_update(&mut self, input: UpdateResearcher) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = input.email {
            self.email = email.trim().to_lowercase();
        }
        if input.affiliation.is_some() {
            self.affiliation = clean_opt(input.affiliation);
        }
        if let Some(role) = input.role {
            self.role = role;
        }
        if let Some(contributions) = input.contributions {
            self.contributions = contributions;
        }
        if input.bio.is_some() {
            self.bio = clean_opt(input.bio);
        }
        if input.avatar.is_some() {
            self.avatar = clean_opt(input.avatar);
        }
        if let Some(areas) = input.research_areas {
            self.research_areas = clean_list(areas);
        }
    }

    fn check(&self) -> Result<(), Vec<FieldError>> {
        match require_text("name", &self.name, 2, "Name must be 2-100 characters") {
            Some(error) => Err(vec![error]),
            None => Ok(()),
        }
    }
}
