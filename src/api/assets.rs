use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Serves the built SPA. Unknown paths get `index.html` so client-side
/// routes survive a reload.
pub fn spa_service(static_dir: &str) -> ServeDir<ServeFile> {
    let index = Path::new(static_dir).join("index.html");
    ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(index))
}
