//! Seed command handler

use crate::config::Config;
use crate::entities::content::ContentType;
use crate::models::content::NewContent;
use crate::models::taxonomy::TaxonomyTerm;
use crate::state::SharedState;

struct DemoItem {
    title: &'static str,
    title_arabic: &'static str,
    kind: ContentType,
    category: &'static str,
    genre: &'static str,
    year: i32,
    language: &'static str,
    rating: f64,
    duration: Option<i32>,
    episodes: Option<i32>,
}

const DEMO_CONTENT: &[DemoItem] = &[
    DemoItem {
        title: "The Message",
        title_arabic: "الرسالة",
        kind: ContentType::Movie,
        category: "Arabic",
        genre: "Drama",
        year: 1976,
        language: "ar",
        rating: 8.3,
        duration: Some(207),
        episodes: None,
    },
    DemoItem {
        title: "Wadjda",
        title_arabic: "وجدة",
        kind: ContentType::Movie,
        category: "Arabic",
        genre: "Drama",
        year: 2012,
        language: "ar",
        rating: 7.5,
        duration: Some(98),
        episodes: None,
    },
    DemoItem {
        title: "Inception",
        title_arabic: "استهلال",
        kind: ContentType::Movie,
        category: "Foreign",
        genre: "Sci-Fi",
        year: 2010,
        language: "en",
        rating: 8.8,
        duration: Some(148),
        episodes: None,
    },
    DemoItem {
        title: "Crash Landing on You",
        title_arabic: "الهبوط الاضطراري للحب",
        kind: ContentType::Series,
        category: "Korean",
        genre: "Romance",
        year: 2019,
        language: "ko",
        rating: 8.7,
        duration: None,
        episodes: Some(16),
    },
    DemoItem {
        title: "Resurrection: Ertugrul",
        title_arabic: "قيامة أرطغرل",
        kind: ContentType::Series,
        category: "Turkish",
        genre: "Action",
        year: 2014,
        language: "tr",
        rating: 8.0,
        duration: None,
        episodes: Some(150),
    },
    DemoItem {
        title: "Planet Earth",
        title_arabic: "كوكب الأرض",
        kind: ContentType::Tv,
        category: "Foreign",
        genre: "Documentary",
        year: 2006,
        language: "en",
        rating: 9.4,
        duration: None,
        episodes: Some(11),
    },
];

fn term_id(terms: &[TaxonomyTerm], name: &str) -> Option<i32> {
    terms.iter().find(|t| t.name == name).map(|t| t.id)
}

pub async fn cmd_seed(config: Config, demo: bool) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let catalog = &state.catalog_service;

    let summary = catalog.seed_taxonomy().await?;
    println!(
        "✅ Categories added: {}, genres added: {}",
        summary.categories_added, summary.genres_added
    );

    if !demo {
        return Ok(());
    }

    if state.store.count_active_content().await? > 0 {
        println!("Catalog already has content, skipping demo items");
        return Ok(());
    }

    let categories = catalog.list_categories().await?;
    let genres = catalog.list_genres().await?;

    for item in DEMO_CONTENT {
        let input = NewContent {
            title: item.title.to_string(),
            title_arabic: item.title_arabic.to_string(),
            description: None,
            description_arabic: None,
            kind: item.kind,
            category_id: term_id(&categories, item.category),
            genre_id: term_id(&genres, item.genre),
            year: item.year,
            language: item.language.to_string(),
            quality: "HD".to_string(),
            resolution: "1080p".to_string(),
            rating: item.rating,
            duration: item.duration,
            episodes: item.episodes,
            poster_url: None,
        };
        let created = catalog.create_content(input).await?;
        println!("  + {} ({})", created.title, created.kind);
    }

    println!("✅ Added {} demo items", DEMO_CONTENT.len());
    Ok(())
}
