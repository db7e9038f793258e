use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Closed set of reasons a visitor can pick when reporting a problem.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "kebab-case")]
pub enum ReportReason {
    #[sea_orm(string_value = "download-link")]
    DownloadLink,
    #[sea_orm(string_value = "watch-link")]
    WatchLink,
    #[sea_orm(string_value = "subtitle")]
    Subtitle,
    #[sea_orm(string_value = "audio-video")]
    AudioVideo,
    #[sea_orm(string_value = "content-error")]
    ContentError,
    #[sea_orm(string_value = "quality-update")]
    QualityUpdate,
    #[sea_orm(string_value = "broken-links")]
    BrokenLinks,
    #[sea_orm(string_value = "wrong-content")]
    WrongContent,
    #[sea_orm(string_value = "missing-episodes")]
    MissingEpisodes,
    #[sea_orm(string_value = "other")]
    Other,
}

impl ReportReason {
    pub const ALL: [Self; 10] = [
        Self::DownloadLink,
        Self::WatchLink,
        Self::Subtitle,
        Self::AudioVideo,
        Self::ContentError,
        Self::QualityUpdate,
        Self::BrokenLinks,
        Self::WrongContent,
        Self::MissingEpisodes,
        Self::Other,
    ];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DownloadLink => "download-link",
            Self::WatchLink => "watch-link",
            Self::Subtitle => "subtitle",
            Self::AudioVideo => "audio-video",
            Self::ContentError => "content-error",
            Self::QualityUpdate => "quality-update",
            Self::BrokenLinks => "broken-links",
            Self::WrongContent => "wrong-content",
            Self::MissingEpisodes => "missing-episodes",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn label_arabic(self) -> &'static str {
        match self {
            Self::DownloadLink => "مشكلة في رابط التحميل المباشر",
            Self::WatchLink => "مشكلة في رابط المشاهدة المباشرة",
            Self::Subtitle => "مشكلة عدم توافق الترجمة",
            Self::AudioVideo => "مشكلة تقنية في الصوت أو الصورة",
            Self::ContentError => "مشكلة تحريرية في الموضوع أو الصور",
            Self::QualityUpdate => "طلب تحديث جودة",
            Self::BrokenLinks => "روابط معطلة أو لا تعمل",
            Self::WrongContent => "محتوى خاطئ أو مختلف",
            Self::MissingEpisodes => "حلقات مفقودة أو ناقصة",
            Self::Other => "مشكلة أخرى",
        }
    }

    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code.trim())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ReportStatus {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "pending" => Some(Self::Pending),
            "in_progress" | "in-progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Not a foreign key: reports may outlive or predate the content row.
    pub content_id: i32,

    pub content_title: String,

    pub reporter_email: Option<String>,

    pub reason: ReportReason,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub page_url: String,

    pub status: ReportStatus,

    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
