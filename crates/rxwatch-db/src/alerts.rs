//! Database operations for the `alerts` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use rxwatch_core::AlertRecord;

use crate::DbError;

/// Separator for the multi-valued columns (`product_names`,
/// `batch_numbers`, `expiry_dates`). Chosen over a bare comma because
/// product names and firm names routinely contain commas.
const MULTI_VALUE_SEPARATOR: &str = "; ";

/// A row from the `alerts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AlertRow {
    pub record_id: String,
    pub source_id: String,
    pub source_org: String,
    pub source_url: String,
    pub source_country: Option<String>,
    pub title: Option<String>,
    /// `"; "`-joined; `NULL` when the record carried no product names.
    pub product_names: Option<String>,
    pub brand_name: Option<String>,
    pub generic_name: Option<String>,
    pub manufacturer: Option<String>,
    pub distributor: Option<String>,
    pub batch_numbers: Option<String>,
    /// `"; "`-joined ISO dates.
    pub expiry_dates: Option<String>,
    pub alert_type: Option<String>,
    pub therapeutic_category: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub more_info: Option<String>,
    pub notes: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl AlertRow {
    /// Rebuilds the in-memory record, splitting the joined multi-value
    /// columns back into lists.
    #[must_use]
    pub fn into_record(self) -> AlertRecord {
        AlertRecord {
            record_id: self.record_id,
            source_id: self.source_id,
            source_org: self.source_org,
            source_url: self.source_url,
            source_country: self.source_country,
            title: self.title,
            product_names: split_multi(self.product_names.as_deref()),
            brand_name: self.brand_name,
            generic_name: self.generic_name,
            manufacturer: self.manufacturer,
            distributor: self.distributor,
            batch_numbers: split_multi(self.batch_numbers.as_deref()),
            expiry_dates: split_multi(self.expiry_dates.as_deref())
                .iter()
                .filter_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                .collect(),
            alert_type: self.alert_type,
            therapeutic_category: self.therapeutic_category,
            publish_date: self.publish_date,
            reason: self.reason,
            more_info: self.more_info,
            notes: self.notes,
            scraped_at: self.scraped_at,
        }
    }
}

fn join_multi(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(MULTI_VALUE_SEPARATOR))
    }
}

fn join_dates(dates: &[NaiveDate]) -> Option<String> {
    if dates.is_empty() {
        None
    } else {
        Some(
            dates
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect::<Vec<_>>()
                .join(MULTI_VALUE_SEPARATOR),
        )
    }
}

fn split_multi(joined: Option<&str>) -> Vec<String> {
    joined
        .map(|s| {
            s.split(MULTI_VALUE_SEPARATOR)
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
}

/// Inserts a record, or reconciles it against the stored row sharing its
/// `record_id`:
///
/// - provenance columns always take the incoming values;
/// - every optional column keeps its stored value unless the incoming value
///   is non-`NULL` (empty multi-value lists arrive as `NULL`);
/// - `scraped_at` keeps whichever timestamp is later.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn upsert_alert(pool: &SqlitePool, record: &AlertRecord) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO alerts \
             (record_id, source_id, source_org, source_url, source_country, title, \
              product_names, brand_name, generic_name, manufacturer, distributor, \
              batch_numbers, expiry_dates, alert_type, therapeutic_category, \
              publish_date, reason, more_info, notes, scraped_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
                 ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20) \
         ON CONFLICT (record_id) DO UPDATE SET \
             source_id            = excluded.source_id, \
             source_org           = excluded.source_org, \
             source_url           = excluded.source_url, \
             source_country       = COALESCE(excluded.source_country, alerts.source_country), \
             title                = COALESCE(excluded.title, alerts.title), \
             product_names        = COALESCE(excluded.product_names, alerts.product_names), \
             brand_name           = COALESCE(excluded.brand_name, alerts.brand_name), \
             generic_name         = COALESCE(excluded.generic_name, alerts.generic_name), \
             manufacturer         = COALESCE(excluded.manufacturer, alerts.manufacturer), \
             distributor          = COALESCE(excluded.distributor, alerts.distributor), \
             batch_numbers        = COALESCE(excluded.batch_numbers, alerts.batch_numbers), \
             expiry_dates         = COALESCE(excluded.expiry_dates, alerts.expiry_dates), \
             alert_type           = COALESCE(excluded.alert_type, alerts.alert_type), \
             therapeutic_category = COALESCE(excluded.therapeutic_category, alerts.therapeutic_category), \
             publish_date         = COALESCE(excluded.publish_date, alerts.publish_date), \
             reason               = COALESCE(excluded.reason, alerts.reason), \
             more_info            = COALESCE(excluded.more_info, alerts.more_info), \
             notes                = COALESCE(excluded.notes, alerts.notes), \
             scraped_at           = MAX(alerts.scraped_at, excluded.scraped_at)",
    )
    .bind(&record.record_id)
    .bind(&record.source_id)
    .bind(&record.source_org)
    .bind(&record.source_url)
    .bind(&record.source_country)
    .bind(&record.title)
    .bind(join_multi(&record.product_names))
    .bind(&record.brand_name)
    .bind(&record.generic_name)
    .bind(&record.manufacturer)
    .bind(&record.distributor)
    .bind(join_multi(&record.batch_numbers))
    .bind(join_dates(&record.expiry_dates))
    .bind(&record.alert_type)
    .bind(&record.therapeutic_category)
    .bind(record.publish_date)
    .bind(&record.reason)
    .bind(&record.more_info)
    .bind(&record.notes)
    .bind(record.scraped_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetches one alert by its record id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] for an unknown id, [`DbError::Sqlx`] on
/// query failure.
pub async fn get_alert(pool: &SqlitePool, record_id: &str) -> Result<AlertRow, DbError> {
    sqlx::query_as::<_, AlertRow>("SELECT * FROM alerts WHERE record_id = ?1")
        .bind(record_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Total number of stored alerts.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_alerts(pool: &SqlitePool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM alerts")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// The most recently published alerts, newest first; rows without a publish
/// date sort last.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent(pool: &SqlitePool, limit: u32) -> Result<Vec<AlertRow>, DbError> {
    let rows = sqlx::query_as::<_, AlertRow>(
        "SELECT * FROM alerts \
         ORDER BY publish_date IS NULL, publish_date DESC, scraped_at DESC \
         LIMIT ?1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
