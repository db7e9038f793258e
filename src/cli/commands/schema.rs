//! Schema check command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_check_schema(config: &Config) -> anyhow::Result<()> {
    let store = Store::open_unmigrated(&config.database).await?;

    println!("🔍 Checking database schema...");
    println!("{:-<40}", "");

    let counts = store.table_counts().await;
    let mut missing = 0;

    for (table, count) in &counts {
        match count {
            Some(rows) => println!("  {table:<12} {rows:>8} rows"),
            None => {
                missing += 1;
                println!("  {table:<12} {:>8}", "missing");
            }
        }
    }

    println!("{:-<40}", "");
    if missing == 0 {
        println!("✅ All {} tables present", counts.len());
        Ok(())
    } else {
        anyhow::bail!("{missing} of {} expected tables are missing", counts.len())
    }
}
