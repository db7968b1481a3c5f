use serde::{Deserialize, Serialize};

/// TMDB movie genres offered by the preference form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Family,
    Fantasy,
    History,
    Horror,
    Music,
    Mystery,
    Romance,
    #[serde(rename = "Science Fiction")]
    ScienceFiction,
    Thriller,
    War,
    Western,
}

impl Genre {
    pub const ALL: [Genre; 18] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Family,
        Genre::Fantasy,
        Genre::History,
        Genre::Horror,
        Genre::Music,
        Genre::Mystery,
        Genre::Romance,
        Genre::ScienceFiction,
        Genre::Thriller,
        Genre::War,
        Genre::Western,
    ];

    /// TMDB genre id used by `with_genres`
    pub fn tmdb_id(self) -> u32 {
        match self {
            Genre::Action => 28,
            Genre::Adventure => 12,
            Genre::Animation => 16,
            Genre::Comedy => 35,
            Genre::Crime => 80,
            Genre::Documentary => 99,
            Genre::Drama => 18,
            Genre::Family => 10751,
            Genre::Fantasy => 14,
            Genre::History => 36,
            Genre::Horror => 27,
            Genre::Music => 10402,
            Genre::Mystery => 9648,
            Genre::Romance => 10749,
            Genre::ScienceFiction => 878,
            Genre::Thriller => 53,
            Genre::War => 10752,
            Genre::Western => 37,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Family => "Family",
            Genre::Fantasy => "Fantasy",
            Genre::History => "History",
            Genre::Horror => "Horror",
            Genre::Music => "Music",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::ScienceFiction => "Science Fiction",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }
}

/// Original languages offered by the preference form, keyed by display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    #[serde(rename = "Español")]
    Spanish,
    French,
    #[serde(rename = "Deutsch")]
    German,
    #[serde(rename = "Simplified Chinese")]
    SimplifiedChinese,
    Japanese,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::SimplifiedChinese,
        Language::Japanese,
        Language::Hindi,
    ];

    /// ISO 639-1 code used by `with_original_language`
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::SimplifiedChinese => "zh",
            Language::Japanese => "ja",
            Language::Hindi => "hi",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Español",
            Language::French => "French",
            Language::German => "Deutsch",
            Language::SimplifiedChinese => "Simplified Chinese",
            Language::Japanese => "Japanese",
            Language::Hindi => "Hindi",
        }
    }
}

/// What to ask the catalog for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub genre: Option<Genre>,
    pub language: Option<Language>,
    /// Popular movies; genre and language are ignored when set
    #[serde(default)]
    pub trending: bool,
}

impl CatalogFilter {
    pub fn trending() -> Self {
        Self {
            trending: true,
            ..Self::default()
        }
    }

    pub fn by_genre(genre: Genre) -> Self {
        Self {
            genre: Some(genre),
            ..Self::default()
        }
    }
}
