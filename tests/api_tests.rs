//! Integration tests for the HTTP API.
//!
//! Each test drives the full router over a fresh temp-file SQLite database.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use cinema_catalog::api::AppState;
use cinema_catalog::config::Config;
use cinema_catalog::entities::content::ContentType;
use cinema_catalog::models::content::NewContent;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const ADMIN_PASSWORD: &str = "correct-horse-battery";
const SERVER_ERROR: &str = "حدث خطأ في الخادم. يرجى المحاولة مرة أخرى.";

fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("cinema-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.database.url = format!("sqlite:{}", db_path.display());
    config.security.admin_password = Some(ADMIN_PASSWORD.to_string());
    config.server.static_dir = std::env::temp_dir().display().to_string();
    config
}

fn item(title: &str, kind: ContentType, rating: f64, year: i32) -> NewContent {
    NewContent {
        title: title.to_string(),
        title_arabic: format!("{title} بالعربية"),
        description: None,
        description_arabic: None,
        kind,
        category_id: None,
        genre_id: None,
        year,
        language: "ar".to_string(),
        quality: "HD".to_string(),
        resolution: "1080p".to_string(),
        rating,
        duration: None,
        episodes: None,
        poster_url: None,
    }
}

async fn spawn_app() -> (Router, Arc<AppState>) {
    spawn_app_with(test_config()).await
}

async fn spawn_app_with(config: Config) -> (Router, Arc<AppState>) {
    let state = cinema_catalog::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    let catalog = state.catalog_service();
    for content in [
        item("Wadjda", ContentType::Movie, 7.5, 2012),
        item("Theeb", ContentType::Movie, 7.0, 2014),
        item("Barakah", ContentType::Movie, 6.4, 2016),
        item("Bab Al-Hara", ContentType::Series, 8.1, 2006),
        item("Planet Earth", ContentType::Tv, 9.4, 2006),
        item("Chess Night", ContentType::Game, 5.0, 2020),
    ] {
        catalog.create_content(content).await.unwrap();
    }

    (cinema_catalog::api::router(state.clone()).await, state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json, cookie)
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let (status, json, _) = send(app, builder.body(Body::empty()).unwrap()).await;
    (status, json)
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: &Value,
    cookie: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let (status, json, _) = send(app, builder.body(Body::from(body.to_string())).unwrap()).await;
    (status, json)
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Option<String>) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": username, "password": password }).to_string(),
        ))
        .unwrap();
    let (status, _, cookie) = send(app, request).await;
    (status, cookie)
}

async fn admin_cookie(app: &Router) -> String {
    let (status, cookie) = login(app, "admin", ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    cookie.expect("login should set a session cookie")
}

fn valid_report() -> Value {
    json!({
        "contentId": 1,
        "contentTitle": "Wadjda",
        "email": "viewer@example.com",
        "reason": "download-link",
        "description": "The download link returns a 404 page",
        "pageUrl": "http://localhost:5000/content/1"
    })
}

#[tokio::test]
async fn test_filter_by_type_and_rating() {
    let (app, _) = spawn_app().await;

    let (status, body) = get(&app, "/api/content?type=movie&rating=7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let items = body["data"]["content"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(body["data"]["total"], 2);
    for item in items {
        assert_eq!(item["type"], "movie");
        assert!(item["rating"].as_f64().unwrap() >= 7.0);
    }
}

#[tokio::test]
async fn test_unfiltered_listing_and_pagination() {
    let (app, _) = spawn_app().await;

    let (_, all) = get(&app, "/api/content", None).await;
    assert_eq!(all["data"]["total"], 6);

    let (_, page) = get(&app, "/api/content?limit=4&page=2", None).await;
    assert_eq!(page["data"]["total"], 6);
    assert_eq!(page["data"]["totalPages"], 2);
    assert_eq!(page["data"]["content"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_type_route_accepts_aliases() {
    let (app, _) = spawn_app().await;

    let (status, body) = get(&app, "/api/content/movies", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);

    let (status, body) = get(&app, "/api/content/television", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = get(&app, "/api/content/podcasts", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_search_matches_either_title() {
    let (app, _) = spawn_app().await;

    let (_, body) = get(&app, "/api/search?q=Theeb", None).await;
    assert_eq!(body["data"]["total"], 1);

    let uri = format!("/api/search?q={}", urlencode("بالعربية"));
    let (_, body) = get(&app, &uri, None).await;
    assert_eq!(body["data"]["total"], 6);

    let (_, body) = get(&app, "/api/search?q=b&yearFrom=2010&yearTo=2016", None).await;
    assert_eq!(body["data"]["total"], 2);
}

fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[tokio::test]
async fn test_content_stats() {
    let (app, _) = spawn_app().await;

    let (status, body) = get(&app, "/api/content/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 6);

    let counts = body["data"]["content"].as_array().unwrap();
    let movies = counts.iter().find(|c| c["type"] == "movie").unwrap();
    assert_eq!(movies["count"], 3);
    let misc = counts.iter().find(|c| c["type"] == "misc").unwrap();
    assert_eq!(misc["count"], 0);
}

#[tokio::test]
async fn test_missing_item_is_404_with_arabic_message() {
    let (app, _) = spawn_app().await;

    let (status, body) = get(&app, "/api/content/item/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "المحتوى غير موجود");

    let (status, body) = get(&app, "/api/content/item/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Wadjda");
}

#[tokio::test]
async fn test_invalid_report_is_rejected_and_not_stored() {
    let (app, state) = spawn_app().await;

    let mut report = valid_report();
    report["reason"] = json!("");
    report["description"] = json!("short");

    let (status, body) = send_json(&app, "POST", "/api/reports", &report, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, ["reason", "description"]);

    assert_eq!(state.store().count_reports().await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_report_body_is_400() {
    let (app, _) = spawn_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/reports")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_report_submission_and_admin_review() {
    let (app, _) = spawn_app().await;

    let (status, body) = send_json(&app, "POST", "/api/reports", &valid_report(), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "تم إرسال التبليغ بنجاح. شكراً لك على مساعدتنا في تحسين الخدمة."
    );
    let report_id = body["data"]["reportId"].as_i64().unwrap();

    let (status, _) = get(&app, "/api/reports", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let cookie = admin_cookie(&app).await;
    let (status, body) = get(&app, "/api/reports?status=pending", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["reports"][0]["reason"], "download-link");
    assert_eq!(
        body["data"]["reports"][0]["reasonLabel"],
        "مشكلة في رابط التحميل المباشر"
    );

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/admin/reports/{report_id}/status"),
        &json!({ "status": "resolved", "adminNotes": "Link replaced" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "resolved");
    assert_eq!(body["data"]["adminNotes"], "Link replaced");

    let (_, body) = get(&app, "/api/reports?status=pending", Some(&cookie)).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn test_report_reasons_are_listed() {
    let (app, _) = spawn_app().await;

    let (status, body) = get(&app, "/api/reports/reasons", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_auth_user_requires_session() {
    let (app, _) = spawn_app().await;

    let (status, body) = get(&app, "/api/auth/user", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = login(&app, "admin", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let cookie = admin_cookie(&app).await;
    let (status, body) = get(&app, "/api/auth/user", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "admin");
    assert_eq!(body["data"]["isAdmin"], true);
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (app, _) = spawn_app().await;
    let cookie = admin_cookie(&app).await;

    let (status, _) = send_json(&app, "POST", "/api/auth/logout", &json!({}), Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, "/api/auth/user", Some(&cookie)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_anonymous_requests() {
    let (app, _) = spawn_app().await;

    for uri in ["/api/admin/stats", "/api/admin/cache", "/api/admin/metrics"] {
        let (status, _) = get(&app, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let (status, _) = send_json(&app, "POST", "/api/admin/clear-cache", &json!({}), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_admin_user_is_forbidden() {
    let (app, state) = spawn_app().await;

    state
        .store()
        .create_user(
            "editor",
            "editor@example.com",
            "editor-password",
            false,
            &state.config().security,
        )
        .await
        .unwrap();

    let (status, cookie) = login(&app, "editor", "editor-password").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/api/admin/stats", cookie.as_deref()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let (app, _) = spawn_app().await;
    let cookie = admin_cookie(&app).await;

    send_json(&app, "POST", "/api/reports", &valid_report(), None).await;

    let (status, body) = get(&app, "/api/admin/stats", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalContent"], 6);
    assert_eq!(body["data"]["totalUsers"], 1);
    assert_eq!(body["data"]["pendingReports"], 1);
    assert_eq!(body["data"]["topRatedContent"][0]["title"], "Planet Earth");
    assert_eq!(body["data"]["totalViews"], 0);
}

#[tokio::test]
async fn test_clear_cache_reports_count() {
    let (app, _) = spawn_app().await;
    let cookie = admin_cookie(&app).await;

    get(&app, "/api/content", None).await;
    get(&app, "/api/content?type=movie", None).await;
    get(&app, "/api/content/stats", None).await;

    let (_, stats) = get(&app, "/api/admin/cache", Some(&cookie)).await;
    assert_eq!(stats["data"]["size"], 3);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/admin/clear-cache",
        &json!({ "pattern": "content:list" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cleared"], 2);
    assert_eq!(body["message"], "تم مسح الذاكرة المؤقتة بنجاح");

    let (_, body) = send_json(&app, "POST", "/api/admin/clear-cache", &json!({}), Some(&cookie)).await;
    assert_eq!(body["data"]["cleared"], 1);
}

#[tokio::test]
async fn test_admin_content_lifecycle_invalidates_cache() {
    let (app, _) = spawn_app().await;
    let cookie = admin_cookie(&app).await;

    let (_, before) = get(&app, "/api/content?type=series", None).await;
    assert_eq!(before["data"]["total"], 1);

    let (status, created) = send_json(
        &app,
        "POST",
        "/api/admin/content",
        &json!({
            "title": "Al Zeer Salem",
            "titleArabic": "الزير سالم",
            "type": "series",
            "year": 2000,
            "language": "ar",
            "quality": "SD",
            "resolution": "480p",
            "rating": 8.94,
            "episodes": 40
        }),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["rating"], 8.9);
    let id = created["data"]["id"].as_i64().unwrap();

    let (_, after) = get(&app, "/api/content?type=series", None).await;
    assert_eq!(after["data"]["total"], 2);

    let (status, updated) = send_json(
        &app,
        "PUT",
        &format!("/api/admin/content/{id}"),
        &json!({ "quality": "HD" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["quality"], "HD");
    assert_eq!(updated["data"]["title"], "Al Zeer Salem");

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/admin/content/{id}"))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, &format!("/api/content/item/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, after_delete) = get(&app, "/api/content?type=series", None).await;
    assert_eq!(after_delete["data"]["total"], 1);
}

#[tokio::test]
async fn test_content_with_missing_category_is_404() {
    let (app, _) = spawn_app().await;
    let cookie = admin_cookie(&app).await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/admin/content",
        &json!({
            "title": "Orphan",
            "titleArabic": "يتيم",
            "type": "movie",
            "categoryId": 4242,
            "year": 2001,
            "language": "ar",
            "quality": "HD",
            "resolution": "720p"
        }),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_category_is_409() {
    let (app, _) = spawn_app().await;
    let cookie = admin_cookie(&app).await;
    let category = json!({ "name": "Egyptian", "nameArabic": "مصري" });

    let (status, _) =
        send_json(&app, "POST", "/api/admin/categories", &category, Some(&cookie)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) =
        send_json(&app, "POST", "/api/admin/categories", &category, Some(&cookie)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (_, list) = get(&app, "/api/categories", None).await;
    let names: Vec<&str> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names.iter().filter(|n| **n == "Egyptian").count(), 1);
}

#[tokio::test]
async fn test_password_change_requires_current_password() {
    let (app, _) = spawn_app().await;
    let cookie = admin_cookie(&app).await;

    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/auth/password",
        &json!({ "currentPassword": "nope", "newPassword": "a-new-password" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/auth/password",
        &json!({ "currentPassword": ADMIN_PASSWORD, "newPassword": "short" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/auth/password",
        &json!({ "currentPassword": ADMIN_PASSWORD, "newPassword": "a-new-password" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = login(&app, "admin", ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "admin", "a-new-password").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_api_route_is_json_404() {
    let (app, _) = spawn_app().await;

    let (status, body) = get(&app, "/api/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_ne!(body["message"], SERVER_ERROR);
}

#[tokio::test]
async fn test_health_reports_database() {
    let (app, _) = spawn_app().await;

    let (status, body) = get(&app, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_page_beyond_limit_is_rejected() {
    let (app, _) = spawn_app().await;

    for uri in [
        "/api/content?page=18446744073709551615",
        "/api/content?page=1000001",
        "/api/search?q=a&page=18446744073709551615",
    ] {
        let (status, body) = get(&app, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false);
        assert_ne!(body["message"], SERVER_ERROR);
    }

    let (status, body) = get(&app, "/api/content?page=1000000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"].as_array().unwrap().len(), 0);

    let cookie = admin_cookie(&app).await;
    let (status, _) = get(&app, "/api/reports?page=18446744073709551615", Some(&cookie)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_wildcards_match_literally() {
    let (app, _) = spawn_app().await;

    for query in ["%25", "_", "%25%25", "%5C"] {
        let (status, body) = get(&app, &format!("/api/search?q={query}"), None).await;
        assert_eq!(status, StatusCode::OK, "{query}");
        assert_eq!(body["data"]["total"], 0, "{query}");
    }

    let (_, body) = get(&app, "/api/search?q=Bab%20Al-Hara", None).await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn test_report_title_comes_from_catalog() {
    let (app, _) = spawn_app().await;

    let mut report = valid_report();
    report["contentTitle"] = json!("Wrong Title");
    let (status, _) = send_json(&app, "POST", "/api/reports", &report, None).await;
    assert_eq!(status, StatusCode::CREATED);

    let cookie = admin_cookie(&app).await;
    let (_, body) = get(&app, "/api/reports", Some(&cookie)).await;
    assert_eq!(body["data"]["reports"][0]["contentId"], 1);
    assert_eq!(body["data"]["reports"][0]["contentTitle"], "Wadjda");
}

#[tokio::test]
async fn test_sort_parameters_and_rating_alias() {
    let (app, _) = spawn_app().await;

    let (status, body) = get(&app, "/api/content?sortBy=title&sortOrder=asc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"][0]["title"], "Bab Al-Hara");
    assert_eq!(body["data"]["content"][5]["title"], "Wadjda");

    let (_, body) = get(&app, "/api/content?sortBy=year&sortOrder=asc&type=movie", None).await;
    assert_eq!(body["data"]["content"][0]["title"], "Wadjda");

    let (_, body) = get(&app, "/api/search?q=a&ratingMin=7.5", None).await;
    let titles: Vec<&str> = body["data"]["content"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["title"].as_str())
        .collect();
    assert_eq!(titles.len(), 3);
    assert!(titles.contains(&"Wadjda"));
    assert!(!titles.contains(&"Theeb"));

    let (status, _) = get(&app, "/api/content?sortBy=popularity", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_finite_rating_is_rejected() {
    let (app, _) = spawn_app().await;

    for value in ["NaN", "inf", "-inf"] {
        let (status, body) = get(&app, &format!("/api/content?rating={value}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{value}");
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn test_featured_and_recent_lists() {
    let (app, _) = spawn_app().await;

    let (status, body) = get(&app, "/api/content/featured", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "Planet Earth");
    assert_eq!(body["data"][1]["title"], "Bab Al-Hara");
    assert_eq!(body["data"].as_array().unwrap().len(), 6);

    let (status, body) = get(&app, "/api/content/recent?sortBy=title&sortOrder=asc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"][0]["title"], "Chess Night");
    assert_eq!(body["data"]["total"], 6);
}

#[tokio::test]
async fn test_view_counting_feeds_trending_and_dashboard() {
    let (app, _) = spawn_app().await;

    let (_, body) = get(&app, "/api/content/trending", None).await;
    assert_eq!(body["data"][0]["viewCount"], 0);

    for _ in 0..2 {
        let (status, _) = send_json(&app, "POST", "/api/content/2/view", &json!({}), None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = send_json(&app, "POST", "/api/content/3/view", &json!({}), None).await;
    assert_eq!(body["data"], json!({ "id": 3, "viewCount": 1 }));

    let (_, body) = get(&app, "/api/content/item/2", None).await;
    assert_eq!(body["data"]["viewCount"], 2);

    let (_, body) = get(&app, "/api/content/trending", None).await;
    assert_eq!(body["data"][0]["title"], "Theeb");
    assert_eq!(body["data"][1]["title"], "Barakah");

    let (status, body) = send_json(&app, "POST", "/api/content/999/view", &json!({}), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "المحتوى غير موجود");

    let cookie = admin_cookie(&app).await;
    let (_, body) = get(&app, "/api/admin/stats", Some(&cookie)).await;
    assert_eq!(body["data"]["totalViews"], 3);
    assert_eq!(body["data"]["mostViewedContent"][0]["title"], "Theeb");
}

#[tokio::test]
async fn test_repeated_failed_logins_lock_out_client() {
    let (app, _) = spawn_app().await;

    for _ in 0..5 {
        let (status, _) = login(&app, "admin", "wrong-password").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": "admin", "password": ADMIN_PASSWORD }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));
}

#[tokio::test]
async fn test_successful_login_resets_failures() {
    let (app, _) = spawn_app().await;

    for _ in 0..4 {
        login(&app, "admin", "wrong-password").await;
    }
    admin_cookie(&app).await;

    for _ in 0..4 {
        let (status, _) = login(&app, "admin", "wrong-password").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    admin_cookie(&app).await;
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let (app, _) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let headers = response.headers();

    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    assert!(
        headers["content-security-policy"]
            .to_str()
            .unwrap()
            .contains("frame-ancestors 'none'")
    );
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_slow_request_is_logged() {
    let mut config = test_config();
    config.monitor.slow_request_ms = 0;
    let (app, _) = spawn_app_with(config).await;

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (status, _) = get(&app, "/api/content", None).await;
    assert_eq!(status, StatusCode::OK);

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("slow_request"), "{output}");
    assert!(output.contains("threshold_ms=0"), "{output}");
}
