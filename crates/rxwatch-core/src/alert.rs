//! The canonical alert record produced by every source adapter.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One normalized drug recall / safety alert.
///
/// Provenance fields (`record_id`, `source_id`, `source_org`, `source_url`)
/// and `scraped_at` are always set; everything else is best-effort and may be
/// absent depending on what the source page exposed. Records are immutable
/// after assembly — a later scrape of the same real-world alert produces a
/// fresh record with the same `record_id`, and the store reconciles the two
/// via [`AlertRecord::resolve_conflict`].
///
/// `product_names`, `batch_numbers`, and `expiry_dates` are multi-valued:
/// one alert can recall several lots. Order follows the source table's row
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Content-derived SHA-256 hex digest; primary key in the store.
    pub record_id: String,
    pub source_id: String,
    pub source_org: String,
    pub source_url: String,

    pub source_country: Option<String>,
    pub title: Option<String>,
    pub product_names: Vec<String>,
    pub brand_name: Option<String>,
    pub generic_name: Option<String>,
    pub manufacturer: Option<String>,
    pub distributor: Option<String>,
    pub batch_numbers: Vec<String>,
    pub expiry_dates: Vec<NaiveDate>,
    pub alert_type: Option<String>,
    pub therapeutic_category: Option<String>,

    /// When the issuing authority published the alert.
    pub publish_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub more_info: Option<String>,
    pub notes: Option<String>,

    /// When this run produced the record. Never part of `record_id`.
    pub scraped_at: DateTime<Utc>,
}

impl AlertRecord {
    /// Starts a record with only the required provenance fields filled in.
    #[must_use]
    pub fn new(
        record_id: String,
        source_id: &str,
        source_org: &str,
        source_url: String,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id,
            source_id: source_id.to_owned(),
            source_org: source_org.to_owned(),
            source_url,
            source_country: None,
            title: None,
            product_names: Vec::new(),
            brand_name: None,
            generic_name: None,
            manufacturer: None,
            distributor: None,
            batch_numbers: Vec::new(),
            expiry_dates: Vec::new(),
            alert_type: None,
            therapeutic_category: None,
            publish_date: None,
            reason: None,
            more_info: None,
            notes: None,
            scraped_at,
        }
    }

    /// Reconciles a stored record with an incoming one carrying the same
    /// `record_id`.
    ///
    /// - Provenance (`source_id`, `source_org`, `source_url`) always takes
    ///   the incoming values; the latest scrape is authoritative for where
    ///   the alert lives.
    /// - Every optional field keeps the stored value unless the incoming
    ///   value is present (non-empty for the multi-valued fields).
    /// - `scraped_at` keeps whichever timestamp is later.
    #[must_use]
    pub fn resolve_conflict(existing: Self, incoming: Self) -> Self {
        Self {
            record_id: incoming.record_id,
            source_id: incoming.source_id,
            source_org: incoming.source_org,
            source_url: incoming.source_url,
            source_country: incoming.source_country.or(existing.source_country),
            title: incoming.title.or(existing.title),
            product_names: pick_vec(existing.product_names, incoming.product_names),
            brand_name: incoming.brand_name.or(existing.brand_name),
            generic_name: incoming.generic_name.or(existing.generic_name),
            manufacturer: incoming.manufacturer.or(existing.manufacturer),
            distributor: incoming.distributor.or(existing.distributor),
            batch_numbers: pick_vec(existing.batch_numbers, incoming.batch_numbers),
            expiry_dates: pick_vec(existing.expiry_dates, incoming.expiry_dates),
            alert_type: incoming.alert_type.or(existing.alert_type),
            therapeutic_category: incoming
                .therapeutic_category
                .or(existing.therapeutic_category),
            publish_date: incoming.publish_date.or(existing.publish_date),
            reason: incoming.reason.or(existing.reason),
            more_info: incoming.more_info.or(existing.more_info),
            notes: incoming.notes.or(existing.notes),
            scraped_at: existing.scraped_at.max(incoming.scraped_at),
        }
    }
}

fn pick_vec<T>(existing: Vec<T>, incoming: Vec<T>) -> Vec<T> {
    if incoming.is_empty() {
        existing
    } else {
        incoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(scraped_at: DateTime<Utc>) -> AlertRecord {
        AlertRecord::new(
            "abc123".to_owned(),
            "NAFDAC_NG",
            "National Agency for Food and Drug Administration and Control",
            "https://nafdac.gov.ng/alert/1".to_owned(),
            scraped_at,
        )
    }

    #[test]
    fn conflict_keeps_stored_value_when_incoming_is_absent() {
        let t1 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        let mut stored = record(t1);
        stored.manufacturer = Some("A".to_owned());
        let incoming = record(t2);

        let merged = AlertRecord::resolve_conflict(stored, incoming);
        assert_eq!(merged.manufacturer.as_deref(), Some("A"));
        assert_eq!(merged.scraped_at, t2);
    }

    #[test]
    fn conflict_incoming_non_null_replaces() {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut stored = record(t);
        stored.reason = Some("old reason".to_owned());
        let mut incoming = record(t);
        incoming.reason = Some("corrected reason".to_owned());

        let merged = AlertRecord::resolve_conflict(stored, incoming);
        assert_eq!(merged.reason.as_deref(), Some("corrected reason"));
    }

    #[test]
    fn conflict_keeps_later_scrape_timestamp() {
        let t1 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        // Incoming is *older* than stored; the stored timestamp wins.
        let merged = AlertRecord::resolve_conflict(record(t2), record(t1));
        assert_eq!(merged.scraped_at, t2);
    }

    #[test]
    fn conflict_provenance_always_takes_incoming() {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let stored = record(t);
        let mut incoming = record(t);
        incoming.source_url = "https://nafdac.gov.ng/alert/1?rev=2".to_owned();

        let merged = AlertRecord::resolve_conflict(stored, incoming);
        assert_eq!(merged.source_url, "https://nafdac.gov.ng/alert/1?rev=2");
    }

    #[test]
    fn conflict_empty_batch_list_does_not_clobber_stored() {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut stored = record(t);
        stored.batch_numbers = vec!["A8519".to_owned(), "A8520".to_owned()];
        let incoming = record(t);

        let merged = AlertRecord::resolve_conflict(stored, incoming);
        assert_eq!(merged.batch_numbers, vec!["A8519", "A8520"]);
    }
}
