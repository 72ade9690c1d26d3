//! The `recent` command: print the newest stored alerts.

use rxwatch_core::AppConfig;

pub(crate) async fn run_recent(config: &AppConfig, limit: u32) -> anyhow::Result<()> {
    let pool = rxwatch_db::connect_pool(&config.database_url).await?;
    rxwatch_db::run_migrations(&pool).await?;

    let rows = rxwatch_db::list_recent(&pool, limit).await?;
    if rows.is_empty() {
        println!("no stored alerts");
        return Ok(());
    }

    for row in rows {
        let date = row
            .publish_date
            .map_or_else(|| "no date".to_owned(), |d| d.to_string());
        println!(
            "{} | {:10} | {} | {}",
            date,
            row.source_id,
            row.title.as_deref().unwrap_or("(untitled)"),
            row.record_id
        );
    }
    Ok(())
}
