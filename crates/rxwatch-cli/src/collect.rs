//! The `collect` command: run every configured source and upsert the
//! results.
//!
//! Per-source failures are logged and skipped rather than propagated so a
//! single unreachable authority does not abort the full run.

use chrono::NaiveDate;

use rxwatch_core::{AlertRecord, AppConfig, KeywordFilter, SourceKind, SourceSpec};
use rxwatch_scraper::{FdaSource, FetchClient, HealthCanadaSource, NafdacSource, ScraperError};

/// Collects from the selected sources and persists the records.
///
/// With `dry_run` the sources are still fetched and parsed, but nothing is
/// written; the summary reports what would have been stored.
///
/// # Errors
///
/// Returns an error when config or the sources file cannot be loaded, the
/// source filter matches nothing, or the database is unreachable.
/// Per-source scrape failures are logged and skipped, not propagated.
pub(crate) async fn run_collect(
    config: &AppConfig,
    source_filter: Option<&str>,
    since: Option<NaiveDate>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let sources_file = rxwatch_core::load_sources(&config.sources_path)?;
    let sources: Vec<&SourceSpec> = match source_filter {
        Some(id) => {
            let spec = sources_file
                .get(id)
                .ok_or_else(|| anyhow::anyhow!("source '{id}' is not configured"))?;
            vec![spec]
        }
        None => sources_file.sources.iter().collect(),
    };
    let start_date = since.unwrap_or(config.start_date);

    let client = FetchClient::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build fetch client: {e}"))?;

    let pool = if dry_run {
        None
    } else {
        let pool = rxwatch_db::connect_pool(&config.database_url).await?;
        rxwatch_db::run_migrations(&pool).await?;
        Some(pool)
    };

    let mut total_stored: usize = 0;
    let mut failed_sources: usize = 0;

    for spec in &sources {
        tracing::info!(source = %spec.source_id, kind = ?spec.kind, "collecting");
        let records = match collect_source(spec, &client, start_date).await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(source = %spec.source_id, error = %err, "source failed, skipping");
                failed_sources += 1;
                continue;
            }
        };
        tracing::info!(source = %spec.source_id, records = records.len(), "collected");

        match &pool {
            Some(pool) => {
                for record in &records {
                    rxwatch_db::upsert_alert(pool, record).await?;
                }
                total_stored += records.len();
            }
            None => {
                for record in &records {
                    println!(
                        "dry-run: {} [{}] {}",
                        record.source_id,
                        record
                            .publish_date
                            .map_or_else(|| "no date".to_owned(), |d| d.to_string()),
                        record.title.as_deref().unwrap_or("(untitled)")
                    );
                }
                total_stored += records.len();
            }
        }
    }

    println!(
        "{} record(s) {} from {} source(s), {} source(s) failed",
        total_stored,
        if dry_run { "parsed" } else { "stored" },
        sources.len() - failed_sources,
        failed_sources
    );
    Ok(())
}

async fn collect_source(
    spec: &SourceSpec,
    client: &FetchClient,
    start_date: NaiveDate,
) -> Result<Vec<AlertRecord>, ScraperError> {
    let lookup = KeywordFilter::new(&spec.oncology_keywords);
    match spec.kind {
        SourceKind::ListingWithDetailPages => {
            NafdacSource::new(spec, start_date)
                .standardize(client, &lookup)
                .await
        }
        SourceKind::JsonApi => {
            FdaSource::new(spec, start_date)
                .standardize(client, &lookup)
                .await
        }
        SourceKind::JsonFeed => {
            HealthCanadaSource::new(spec, start_date)
                .standardize(client, &lookup)
                .await
        }
    }
}
