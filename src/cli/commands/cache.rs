//! Clear-cache command handler
//!
//! Logs in over HTTP with the session cookie, then calls the admin endpoint.

use anyhow::{Context, bail};
use serde_json::{Value, json};

use crate::config::Config;

pub struct ClearCacheArgs {
    pub pattern: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

pub async fn cmd_clear_cache(config: &Config, args: ClearCacheArgs) -> anyhow::Result<()> {
    let base_url = args
        .url
        .unwrap_or_else(|| format!("http://localhost:{}", config.server.port));
    let base_url = base_url.trim_end_matches('/');

    let username = args
        .username
        .unwrap_or_else(|| config.security.admin_username.clone());
    let Some(password) = args.password.or_else(|| config.security.admin_password.clone()) else {
        bail!("No admin password given. Pass --password or set ADMIN_PASSWORD");
    };

    println!("🗑️  جاري مسح الذاكرة المؤقتة...");

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .context("Failed to build HTTP client")?;

    let login = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .with_context(|| format!("Could not reach {base_url}"))?;

    if !login.status().is_success() {
        println!("❌ فشل تسجيل الدخول");
        bail!("Login failed with status {}", login.status());
    }

    let response = client
        .post(format!("{base_url}/api/admin/clear-cache"))
        .json(&json!({ "pattern": args.pattern }))
        .send()
        .await
        .context("Clear-cache request failed")?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        println!("❌ فشل في مسح الذاكرة المؤقتة");
        bail!("Server answered {status}: {body}");
    }

    let cleared = body["data"]["cleared"].as_u64().unwrap_or(0);
    println!("✅ تم مسح الذاكرة المؤقتة بنجاح ({cleared} entries)");

    Ok(())
}
