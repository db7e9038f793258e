use serde::{Deserialize, Serialize};

use crate::entities::{categories, genres};

/// Seed rows: `(name, arabic name)`.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Arabic", "عربي"),
    ("Foreign", "أجنبي"),
    ("Hindi", "هندي"),
    ("Turkish", "تركي"),
    ("Korean", "كوري"),
];

pub const DEFAULT_GENRES: &[(&str, &str)] = &[
    ("Action", "أكشن"),
    ("Comedy", "كوميديا"),
    ("Drama", "دراما"),
    ("Horror", "رعب"),
    ("Romance", "رومانسي"),
    ("Thriller", "إثارة"),
    ("Sci-Fi", "خيال علمي"),
    ("Documentary", "وثائقي"),
];

/// Categories and genres share one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyTerm {
    pub id: i32,
    pub name: String,
    pub name_arabic: String,
    pub description: Option<String>,
}

impl From<categories::Model> for TaxonomyTerm {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            name_arabic: model.name_arabic,
            description: model.description,
        }
    }
}

impl From<genres::Model> for TaxonomyTerm {
    fn from(model: genres::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            name_arabic: model.name_arabic,
            description: model.description,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTerm {
    pub name: String,
    pub name_arabic: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewTerm {
    #[must_use]
    pub fn seed(name: &str, name_arabic: &str) -> Self {
        Self {
            name: name.to_string(),
            name_arabic: name_arabic.to_string(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TaxonomyKind {
    Category,
    Genre,
}

impl TaxonomyKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Genre => "Genre",
        }
    }
}
