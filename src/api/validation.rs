use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use super::{ApiError, FieldError};
use crate::constants::{limits, messages};
use crate::entities::content::ContentType;
use crate::entities::reports::ReportReason;
use crate::models::content::{ContentPatch, MAX_PAGE, NewContent};
use crate::models::report::NewReport;
use crate::models::taxonomy::NewTerm;

const MIN_YEAR: i32 = 1888;
const MAX_YEAR: i32 = 2100;
const MAX_RATING: f64 = 10.0;

/// Report payload as sent by the client. Everything is optional so that a
/// missing field becomes a field error instead of a body rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRequest {
    pub content_id: Option<serde_json::Value>,
    pub content_title: Option<String>,
    #[serde(alias = "reporterEmail")]
    pub email: Option<String>,
    pub reason: Option<String>,
    pub description: Option<String>,
    pub page_url: Option<String>,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Absolute `http`/`https` URL with a host.
#[must_use]
pub fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
}

pub fn validate_content_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::bad_request(messages::CONTENT_ID_INVALID));
    }
    Ok(id)
}

/// Pages past [`MAX_PAGE`] are refused rather than silently capped.
pub fn validate_page(page: Option<u64>) -> Result<(), FieldError> {
    match page {
        Some(page) if page > MAX_PAGE => {
            Err(FieldError::new("page", messages::PAGE_OUT_OF_RANGE))
        }
        _ => Ok(()),
    }
}

pub fn parse_content_type(value: &str) -> Result<ContentType, ApiError> {
    ContentType::parse(value)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown content type: {value}")))
}

/// Accepts a JSON number or a numeric string.
fn positive_id(value: &serde_json::Value) -> Option<i32> {
    let id = match value {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    i32::try_from(id).ok().filter(|id| *id > 0)
}

/// Collects every field problem before rejecting, so the client can show
/// them all at once.
pub fn validate_report(request: ReportRequest) -> Result<NewReport, ApiError> {
    let mut errors = Vec::new();

    let content_id = request.content_id.as_ref().and_then(positive_id);
    if content_id.is_none() {
        errors.push(FieldError::new("contentId", messages::CONTENT_ID_INVALID));
    }

    let reason = match request.reason.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(FieldError::new("reason", messages::REASON_REQUIRED));
            None
        }
        Some(code) => {
            let parsed = ReportReason::parse(code);
            if parsed.is_none() {
                errors.push(FieldError::new("reason", messages::REASON_UNKNOWN));
            }
            parsed
        }
    };

    let description = request.description.unwrap_or_default().trim().to_string();
    if description.chars().count() < limits::MIN_REPORT_DESCRIPTION_CHARS {
        errors.push(FieldError::new(
            "description",
            messages::DESCRIPTION_TOO_SHORT,
        ));
    }

    let email = request
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    if let Some(email) = &email
        && !is_valid_email(email)
    {
        errors.push(FieldError::new("email", messages::EMAIL_INVALID));
    }

    let page_url = request.page_url.unwrap_or_default().trim().to_string();
    if !is_http_url(&page_url) {
        errors.push(FieldError::new("pageUrl", messages::URL_INVALID));
    }

    match (content_id, reason) {
        (Some(content_id), Some(reason)) if errors.is_empty() => Ok(NewReport {
            content_id,
            content_title: request.content_title.unwrap_or_default().trim().to_string(),
            reporter_email: email,
            reason,
            description,
            page_url,
        }),
        _ => Err(ApiError::validation(errors)),
    }
}

fn rating_to_one_decimal(rating: f64) -> f64 {
    (rating * 10.0).round() / 10.0
}

fn check_rating(rating: f64, errors: &mut Vec<FieldError>) {
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
        errors.push(FieldError::new("rating", "Rating must be between 0 and 10"));
    }
}

fn check_year(year: i32, errors: &mut Vec<FieldError>) {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        errors.push(FieldError::new(
            "year",
            format!("Year must be between {MIN_YEAR} and {MAX_YEAR}"),
        ));
    }
}

fn check_required(field: &str, value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{field} is required")));
    }
}

fn check_optional_counts(
    duration: Option<i32>,
    episodes: Option<i32>,
    poster_url: Option<&str>,
    errors: &mut Vec<FieldError>,
) {
    if duration.is_some_and(|d| d <= 0) {
        errors.push(FieldError::new("duration", "Duration must be positive"));
    }
    if episodes.is_some_and(|e| e < 0) {
        errors.push(FieldError::new("episodes", "Episodes cannot be negative"));
    }
    if let Some(url) = poster_url
        && !url.is_empty()
        && !is_http_url(url)
    {
        errors.push(FieldError::new("posterUrl", messages::URL_INVALID));
    }
}

/// Checks a new catalog entry and normalizes it: titles trimmed, rating
/// rounded to one decimal.
pub fn validate_new_content(mut input: NewContent) -> Result<NewContent, ApiError> {
    let mut errors = Vec::new();

    check_required("title", &input.title, &mut errors);
    check_required("titleArabic", &input.title_arabic, &mut errors);
    check_required("language", &input.language, &mut errors);
    check_required("quality", &input.quality, &mut errors);
    check_required("resolution", &input.resolution, &mut errors);
    check_year(input.year, &mut errors);
    check_rating(input.rating, &mut errors);
    check_optional_counts(
        input.duration,
        input.episodes,
        input.poster_url.as_deref(),
        &mut errors,
    );

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    input.title = input.title.trim().to_string();
    input.title_arabic = input.title_arabic.trim().to_string();
    input.rating = rating_to_one_decimal(input.rating);
    Ok(input)
}

pub fn validate_content_patch(mut patch: ContentPatch) -> Result<ContentPatch, ApiError> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("title", &patch.title),
        ("titleArabic", &patch.title_arabic),
        ("language", &patch.language),
        ("quality", &patch.quality),
        ("resolution", &patch.resolution),
    ] {
        if let Some(value) = value {
            check_required(field, value, &mut errors);
        }
    }
    if let Some(year) = patch.year {
        check_year(year, &mut errors);
    }
    if let Some(rating) = patch.rating {
        check_rating(rating, &mut errors);
    }
    check_optional_counts(
        patch.duration,
        patch.episodes,
        patch.poster_url.as_deref(),
        &mut errors,
    );

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    patch.title = patch.title.map(|t| t.trim().to_string());
    patch.title_arabic = patch.title_arabic.map(|t| t.trim().to_string());
    patch.rating = patch.rating.map(rating_to_one_decimal);
    Ok(patch)
}

pub fn validate_term(mut term: NewTerm) -> Result<NewTerm, ApiError> {
    let mut errors = Vec::new();
    check_required("name", &term.name, &mut errors);
    check_required("nameArabic", &term.name_arabic, &mut errors);

    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    term.name = term.name.trim().to_string();
    term.name_arabic = term.name_arabic.trim().to_string();
    Ok(term)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_request() -> ReportRequest {
        ReportRequest {
            content_id: Some(json!(42)),
            content_title: Some("The Message".to_string()),
            email: None,
            reason: Some("watch-link".to_string()),
            description: Some("The stream stops after ten minutes".to_string()),
            page_url: Some("https://example.com/content/42".to_string()),
        }
    }

    fn fields(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_valid_report_passes() {
        let report = validate_report(valid_request()).unwrap();
        assert_eq!(report.content_id, 42);
        assert_eq!(report.reason, ReportReason::WatchLink);
        assert_eq!(report.reporter_email, None);
    }

    #[test]
    fn test_missing_reason_is_rejected() {
        let request = ReportRequest {
            reason: None,
            ..valid_request()
        };
        assert_eq!(fields(validate_report(request).unwrap_err()), ["reason"]);

        let request = ReportRequest {
            reason: Some("spam".to_string()),
            ..valid_request()
        };
        assert_eq!(fields(validate_report(request).unwrap_err()), ["reason"]);
    }

    #[test]
    fn test_description_counts_characters_not_bytes() {
        // Nine Arabic letters take 18 bytes but are still too short.
        let request = ReportRequest {
            description: Some("  مشكلةكبير  ".to_string()),
            ..valid_request()
        };
        assert_eq!(
            fields(validate_report(request).unwrap_err()),
            ["description"]
        );

        let request = ReportRequest {
            description: Some("الرابط معطل".to_string()),
            ..valid_request()
        };
        assert!(validate_report(request).is_ok());
    }

    #[test]
    fn test_all_field_errors_are_reported() {
        let request = ReportRequest {
            content_id: Some(json!(-3)),
            email: Some("not-an-email".to_string()),
            page_url: Some("ftp://example.com/file".to_string()),
            ..valid_request()
        };
        assert_eq!(
            fields(validate_report(request).unwrap_err()),
            ["contentId", "email", "pageUrl"]
        );
    }

    #[test]
    fn test_content_id_accepts_numeric_string() {
        let request = ReportRequest {
            content_id: Some(json!("17")),
            ..valid_request()
        };
        assert_eq!(validate_report(request).unwrap().content_id, 17);
    }

    #[test]
    fn test_empty_email_is_ignored() {
        let request = ReportRequest {
            email: Some("   ".to_string()),
            ..valid_request()
        };
        assert_eq!(validate_report(request).unwrap().reporter_email, None);
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("http://localhost:5000/content/1"));
        assert!(is_http_url("https://example.com"));
        assert!(!is_http_url("/content/1"));
        assert!(!is_http_url("javascript:alert(1)"));
    }

    #[test]
    fn test_validate_content_id() {
        assert!(validate_content_id(1).is_ok());
        assert!(validate_content_id(0).is_err());
        assert!(validate_content_id(-1).is_err());
    }

    #[test]
    fn test_new_content_rating_is_rounded() {
        let input = NewContent {
            title: " Wadjda ".to_string(),
            title_arabic: "وجدة".to_string(),
            description: None,
            description_arabic: None,
            kind: ContentType::Movie,
            category_id: None,
            genre_id: None,
            year: 2012,
            language: "ar".to_string(),
            quality: "HD".to_string(),
            resolution: "1080p".to_string(),
            rating: 7.46,
            duration: Some(98),
            episodes: None,
            poster_url: None,
        };
        let checked = validate_new_content(input.clone()).unwrap();
        assert_eq!(checked.title, "Wadjda");
        assert!((checked.rating - 7.5).abs() < f64::EPSILON);

        let bad = NewContent {
            rating: 11.0,
            year: 1700,
            ..input
        };
        assert_eq!(fields(validate_new_content(bad).unwrap_err()), ["year", "rating"]);
    }

    #[test]
    fn test_patch_rejects_blank_title() {
        let patch = ContentPatch {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(fields(validate_content_patch(patch).unwrap_err()), ["title"]);
    }

    #[test]
    fn test_validate_page() {
        assert!(validate_page(None).is_ok());
        assert!(validate_page(Some(1)).is_ok());
        assert!(validate_page(Some(MAX_PAGE)).is_ok());
        assert_eq!(validate_page(Some(MAX_PAGE + 1)).unwrap_err().field, "page");
        assert!(validate_page(Some(u64::MAX)).is_err());
    }
}
