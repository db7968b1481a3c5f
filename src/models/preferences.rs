use serde::{Deserialize, Serialize};

use super::{CatalogFilter, Genre, Language};
use crate::error::{AppError, AppResult};

/// Bounds of the movie length slider, in minutes
pub const LENGTH_BOUNDS: BoundedRange = BoundedRange { min: 80, max: 180 };

/// Bounds of the release year slider
pub const RELEASE_YEAR_BOUNDS: BoundedRange = BoundedRange {
    min: 1980,
    max: 2025,
};

/// Preferred mood of the movie
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mood {
    #[default]
    Any,
    #[serde(rename = "Light-hearted")]
    LightHearted,
    Intense,
    Inspirational,
    Dark,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Any,
        Mood::LightHearted,
        Mood::Intense,
        Mood::Inspirational,
        Mood::Dark,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mood::Any => "Any",
            Mood::LightHearted => "Light-hearted",
            Mood::Intense => "Intense",
            Mood::Inspirational => "Inspirational",
            Mood::Dark => "Dark",
        }
    }
}

/// Content considerations
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContentRating {
    #[default]
    #[serde(rename = "No Preference")]
    NoPreference,
    #[serde(rename = "Family-friendly")]
    FamilyFriendly,
    Mature,
}

impl ContentRating {
    pub const ALL: [ContentRating; 3] = [
        ContentRating::NoPreference,
        ContentRating::FamilyFriendly,
        ContentRating::Mature,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContentRating::NoPreference => "No Preference",
            ContentRating::FamilyFriendly => "Family-friendly",
            ContentRating::Mature => "Mature",
        }
    }
}

/// Inclusive range picked on a two-handle slider
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundedRange {
    pub min: u16,
    pub max: u16,
}

impl BoundedRange {
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Checks the range is ordered and sits inside `bounds`
    fn check_within(&self, bounds: BoundedRange, field: &str) -> AppResult<()> {
        if self.min > self.max {
            return Err(AppError::InvalidInput(format!(
                "{} range is reversed: {} > {}",
                field, self.min, self.max
            )));
        }
        if self.min < bounds.min || self.max > bounds.max {
            return Err(AppError::InvalidInput(format!(
                "{} range {}-{} is outside {}-{}",
                field, self.min, self.max, bounds.min, bounds.max
            )));
        }
        Ok(())
    }
}

fn default_length() -> BoundedRange {
    BoundedRange::new(90, 120)
}

fn default_release_year() -> BoundedRange {
    BoundedRange::new(2000, 2025)
}

/// Everything the user picked on the preferences form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceForm {
    pub genre: Genre,
    pub language: Language,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default = "default_length")]
    pub length: BoundedRange,
    #[serde(default = "default_release_year")]
    pub release_year: BoundedRange,
    #[serde(default)]
    pub content: ContentRating,
}

impl PreferenceForm {
    /// Creates a form with defaults for everything but genre and language
    pub fn new(genre: Genre, language: Language) -> Self {
        Self {
            genre,
            language,
            mood: Mood::default(),
            length: default_length(),
            release_year: default_release_year(),
            content: ContentRating::default(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        self.length.check_within(LENGTH_BOUNDS, "length")?;
        self.release_year
            .check_within(RELEASE_YEAR_BOUNDS, "release_year")?;
        Ok(())
    }

    /// Catalog filter for the candidate pool
    ///
    /// Only genre and language narrow the catalog; the remaining fields
    /// influence ranking through [`PreferenceForm::query_text`].
    pub fn catalog_filter(&self) -> CatalogFilter {
        CatalogFilter {
            genre: Some(self.genre),
            language: Some(self.language),
            trending: false,
        }
    }

    /// Free-text phrase compared against movie synopses
    pub fn query_text(&self) -> String {
        format!(
            "{} {} {} {} {} {} {} {}",
            self.genre.name(),
            self.language.name(),
            self.mood.name(),
            self.length.min,
            self.length.max,
            self.release_year.min,
            self.release_year.max,
            self.content.name(),
        )
    }
}
