//! Health Canada recalls-and-safety-alerts adapter.
//!
//! The open-data feed is a JSON array of loosely-shaped objects whose key
//! names have drifted across feed revisions, between capitalized
//! human-readable forms (`"Starting date"`, `"Identification number"`) and
//! snake_case. Every field is read through a key-normalizing accessor
//! instead of a fixed serde struct.

use chrono::{NaiveDate, Utc};
use serde_json::Value;

use rxwatch_core::{AlertRecord, ProductLookup, RecordIdBuilder, SourceSpec};

use crate::client::FetchClient;
use crate::dates::parse_alert_date;
use crate::error::ScraperError;

// Canonical (normalized) key names; the accessor matches "Starting date"
// and "starting_date" alike.
const TITLE_KEYS: &[&str] = &["title", "product", "product_name", "name"];
const CATEGORY_KEYS: &[&str] = &["category"];
const SUBCATEGORY_KEYS: &[&str] = &["subcategory"];
const COMMUNICATION_KEYS: &[&str] = &["type_of_communication", "type"];
const RECALL_SOURCE_KEYS: &[&str] = &["source_of_recall", "source"];
const DATE_KEYS: &[&str] = &[
    "starting_date",
    "recall_date",
    "posting_date",
    "last_updated",
    "date",
    "date_published",
];
const URL_KEYS: &[&str] = &["url", "link", "recall_url"];
const MANUFACTURER_KEYS: &[&str] = &["manufacturer", "company", "companies"];
const DISTRIBUTOR_KEYS: &[&str] = &["distributor"];
const REASON_KEYS: &[&str] = &["reason", "issue", "issue_category"];
const MORE_INFO_KEYS: &[&str] = &[
    "summary",
    "details",
    "what_you_should_do",
    "affected_products",
    "lot_or_serial_number",
    "din_npn_din_him",
];
const IDENT_KEYS: &[&str] = &["identification_number", "recall_id", "id"];

pub struct HealthCanadaSource<'a> {
    spec: &'a SourceSpec,
    start_date: NaiveDate,
}

impl<'a> HealthCanadaSource<'a> {
    #[must_use]
    pub fn new(spec: &'a SourceSpec, start_date: NaiveDate) -> Self {
        Self { spec, start_date }
    }

    /// Fetches the feed once and maps the gated health-product subset to
    /// records. Items outside the date window or the health-product
    /// category are skipped, never errors.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] when the feed cannot be fetched or is not a
    /// JSON array.
    pub async fn standardize(
        &self,
        client: &FetchClient,
        lookup: &dyn ProductLookup,
    ) -> Result<Vec<AlertRecord>, ScraperError> {
        let endpoint = self
            .spec
            .api_endpoint
            .as_deref()
            .unwrap_or(&self.spec.base_url);
        let feed: Value = client.fetch_json(endpoint, &[]).await?;

        let items = feed
            .as_array()
            .or_else(|| feed.get("results").and_then(Value::as_array))
            .ok_or_else(|| ScraperError::FeedShape {
                url: endpoint.to_owned(),
                reason: "expected a JSON array or a `results` array".to_owned(),
            })?;
        tracing::info!(source = %self.spec.source_id, items = items.len(), "feed fetched");

        let mut records = Vec::new();
        for item in items {
            if let Some(record) = self.map_item(item, lookup) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn map_item(&self, item: &Value, lookup: &dyn ProductLookup) -> Option<AlertRecord> {
        if !is_health_product_recall(item) {
            return None;
        }

        let publish_date = DATE_KEYS
            .iter()
            .find_map(|key| lookup_key(item, key).and_then(date_value));
        if publish_date.is_some_and(|d| d < self.start_date) {
            return None;
        }

        let title = first_str(item, TITLE_KEYS)?;
        let product_name = lookup.lookup(title)?;

        let source_url = first_str(item, URL_KEYS);
        // Id seed falls back the way the feed degrades: stable
        // identification number, else the detail URL, else the title.
        let ident = first_str(item, IDENT_KEYS)
            .or(source_url)
            .unwrap_or(title);

        let record_id = RecordIdBuilder::new(&self.spec.source_id)
            .text(Some(&product_name))
            .text(Some(ident))
            .finish();

        let mut record = AlertRecord::new(
            record_id,
            &self.spec.source_id,
            &self.spec.source_org,
            source_url.map_or_else(|| self.spec.base_url.clone(), str::to_owned),
            Utc::now(),
        );
        record.source_country = self.spec.source_country.clone();
        record.title = Some(title.to_owned());
        record.product_names = vec![product_name];
        record.manufacturer = first_str(item, MANUFACTURER_KEYS).map(str::to_owned);
        record.distributor = first_str(item, DISTRIBUTOR_KEYS).map(str::to_owned);
        record.publish_date = publish_date;
        record.reason = first_str(item, REASON_KEYS).map(str::to_owned);
        record.more_info = more_info(item);
        record.alert_type = self.spec.alert_type.clone();
        record.therapeutic_category = self.spec.therapeutic_category.clone();
        Some(record)
    }
}

/// First non-empty string under any of the normalized `keys`, in order.
/// Empty or whitespace-only values fall through to the next key.
fn first_str<'v>(item: &'v Value, keys: &[&str]) -> Option<&'v str> {
    keys.iter().find_map(|key| {
        lookup_key(item, key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}

/// Key lookup tolerant of the feed's casing drift: the exact key first,
/// then any key whose normalized form matches (`"Starting date"` ==
/// `starting_date`, `"DIN, NPN, DIN-HIM"` == `din_npn_din_him`).
fn lookup_key<'v>(item: &'v Value, wanted: &str) -> Option<&'v Value> {
    let obj = item.as_object()?;
    obj.get(wanted).or_else(|| {
        obj.iter()
            .find(|(key, _)| normalize_feed_key(key) == wanted)
            .map(|(_, value)| value)
    })
}

fn normalize_feed_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .replace(',', "")
        .replace([' ', '-'], "_")
}

/// Dates in the feed are strings or epoch-millis numbers depending on the
/// revision.
fn date_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_alert_date(s),
        Value::Number(n) => {
            let millis = n.as_i64()?;
            chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}

/// The feed mixes vehicles, food, and consumer products; health records
/// signal themselves through several fields depending on the revision.
fn is_health_product_recall(item: &Value) -> bool {
    let lower = |keys| first_str(item, keys).map(str::to_lowercase).unwrap_or_default();

    let category = lower(CATEGORY_KEYS);
    let subcategory = lower(SUBCATEGORY_KEYS);
    let communication = lower(COMMUNICATION_KEYS);
    let recall_source = lower(RECALL_SOURCE_KEYS);

    category.contains("health")
        || category.contains("drug")
        || category.contains("medicine")
        || communication.contains("drug")
        || communication.contains("medical device")
        || subcategory.contains("natural health")
        || subcategory.contains("pharmaceutical")
        || recall_source == "health canada"
}

/// Best-effort long-form text: every present summary-ish field,
/// space-joined in a fixed order.
fn more_info(item: &Value) -> Option<String> {
    let parts: Vec<&str> = MORE_INFO_KEYS
        .iter()
        .filter_map(|key| first_str(item, std::slice::from_ref(key)))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

#[cfg(test)]
#[path = "health_canada_test.rs"]
mod tests;
