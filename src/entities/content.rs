use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[sea_orm(string_value = "movie")]
    Movie,
    #[sea_orm(string_value = "series")]
    Series,
    #[sea_orm(string_value = "tv")]
    Tv,
    #[sea_orm(string_value = "misc")]
    Misc,
    #[sea_orm(string_value = "game")]
    Game,
}

impl ContentType {
    pub const ALL: [Self; 5] = [Self::Movie, Self::Series, Self::Tv, Self::Misc, Self::Game];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Tv => "tv",
            Self::Misc => "misc",
            Self::Game => "game",
        }
    }

    /// Accepts the canonical value plus the plural and long forms used in
    /// public URLs (`movies`, `television`, `miscellaneous`, ...).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Some(Self::Movie),
            "series" => Some(Self::Series),
            "tv" | "television" => Some(Self::Tv),
            "misc" | "miscellaneous" => Some(Self::Misc),
            "game" | "games" => Some(Self::Game),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub title_arabic: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description_arabic: Option<String>,
    #[sea_orm(column_name = "type")]
    pub kind: ContentType,
    pub category_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub year: i32,
    pub language: String,
    pub quality: String,
    pub resolution: String,
    pub rating: f64,
    /// Minutes
    pub duration: Option<i32>,
    pub episodes: Option<i32>,
    pub poster_url: Option<String>,
    #[sea_orm(default_value = 0)]
    pub view_count: i32,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Categories,
    #[sea_orm(
        belongs_to = "super::genres::Entity",
        from = "Column::GenreId",
        to = "super::genres::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Genres,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::genres::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Genres.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
