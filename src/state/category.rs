use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed set of categories a curated URL can be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Business,
    Education,
    Entertainment,
    Health,
    Science,
    Art,
    Sports,
    News,
    Programming,
    Design,
    Marketing,
    Finance,
    Productivity,
    Transportation,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::Business => "Business",
            Self::Education => "Education",
            Self::Entertainment => "Entertainment",
            Self::Health => "Health",
            Self::Science => "Science",
            Self::Art => "Art",
            Self::Sports => "Sports",
            Self::News => "News",
            Self::Programming => "Programming",
            Self::Design => "Design",
            Self::Marketing => "Marketing",
            Self::Finance => "Finance",
            Self::Productivity => "Productivity",
            Self::Transportation => "Transportation",
            Self::Other => "Other",
        }
    }

    pub fn all() -> [Self; 16] {
        [
            Self::Technology,
            Self::Business,
            Self::Education,
            Self::Entertainment,
            Self::Health,
            Self::Science,
            Self::Art,
            Self::Sports,
            Self::News,
            Self::Programming,
            Self::Design,
            Self::Marketing,
            Self::Finance,
            Self::Productivity,
            Self::Transportation,
            Self::Other,
        ]
    }

    /// Parses a category name as a generator might write it
    ///
    /// Matching is case-insensitive and accepts a few common aliases,
    /// including the Spanish names; anything unrecognized is `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        let name = s.trim().trim_matches(|c: char| c == '"' || c == '.').to_lowercase();

        if let Some(category) = Self::all().into_iter().find(|c| c.as_str().to_lowercase() == name) {
            return category;
        }

        match name.as_str() {
            "tech" | "tecnología" | "tecnologia" => Self::Technology,
            "negocios" => Self::Business,
            "educación" | "educacion" => Self::Education,
            "entretenimiento" => Self::Entertainment,
            "salud" => Self::Health,
            "ciencia" => Self::Science,
            "arte" => Self::Art,
            "sport" | "deportes" => Self::Sports,
            "noticias" => Self::News,
            "programación" | "programacion" | "software development" => Self::Programming,
            "diseño" | "diseno" => Self::Design,
            "finanzas" => Self::Finance,
            "productividad" => Self::Productivity,
            "transport" | "transporte" => Self::Transportation,
            _ => Self::Other,
        }
    }

    /// Comma-separated list of every category name, for prompts
    pub fn prompt_list() -> String {
        Self::all()
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
