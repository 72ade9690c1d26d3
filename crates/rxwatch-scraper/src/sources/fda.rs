//! FDA (US) adapter over the openFDA drug enforcement API.
//!
//! No HTML here: enforcement reports come back as structured JSON, so this
//! adapter is mostly field mapping plus two regexes that dig the
//! manufacturer and distributor out of the free-text product description.

use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::Deserialize;

use rxwatch_core::{AlertRecord, ProductLookup, RecordIdBuilder, SourceSpec};

use crate::client::FetchClient;
use crate::dates::parse_alert_date;
use crate::error::ScraperError;

const PAGE_LIMIT: u32 = 1000;

// Descriptions read "..., Manufactured by: Acme Labs, Distributed by: ...".
// The terminator alternation bounds the capture at the next clause.
static MANUFACTURED_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Manufactured\s+by:?\s*(.+?)(?:,\s*Distributed\s+by|,\s*NDC|\.\s|\.$|$)")
        .expect("valid manufacturer regex")
});

static DISTRIBUTED_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Distributed\s+by:?\s*(.+?)(?:,\s*Manufactured\s+by|,\s*NDC|\.\s|\.$|$)")
        .expect("valid distributor regex")
});

#[derive(Debug, Deserialize)]
struct EnforcementResponse {
    #[serde(default)]
    results: Vec<EnforcementReport>,
}

/// One openFDA enforcement report. Every field is optional in the upstream
/// schema, so everything defaults.
#[derive(Debug, Default, Deserialize)]
struct EnforcementReport {
    #[serde(default)]
    product_description: Option<String>,
    #[serde(default)]
    report_date: Option<String>,
    #[serde(default)]
    recall_initiation_date: Option<String>,
    #[serde(default)]
    reason_for_recall: Option<String>,
    #[serde(default)]
    code_info: Option<String>,
    #[serde(default)]
    classification: Option<String>,
    #[serde(default)]
    recalling_firm: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

pub struct FdaSource<'a> {
    spec: &'a SourceSpec,
    start_date: NaiveDate,
}

impl<'a> FdaSource<'a> {
    #[must_use]
    pub fn new(spec: &'a SourceSpec, start_date: NaiveDate) -> Self {
        Self { spec, start_date }
    }

    /// Queries the enforcement endpoint for drug recalls reported between
    /// the start date and today, and maps the gated subset to records.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] when the endpoint cannot be fetched or the
    /// response is not the expected JSON shape. An empty result window is
    /// `Ok(vec![])`, not an error.
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
        let search = format!(
            "report_date:[{} TO {}] AND product_type:\"Drugs\"",
            self.start_date.format("%Y%m%d"),
            Utc::now().date_naive().format("%Y%m%d"),
        );
        let query = [
            ("search", search),
            ("limit", PAGE_LIMIT.to_string()),
        ];

        let response: EnforcementResponse = match client.fetch_json(endpoint, &query).await {
            Ok(response) => response,
            // openFDA answers an empty search window with 404 NOT_FOUND.
            Err(ScraperError::UnexpectedStatus { status: 404, .. }) => {
                tracing::info!(source = %self.spec.source_id, "no enforcement reports in window");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };
        tracing::info!(
            source = %self.spec.source_id,
            reports = response.results.len(),
            "enforcement reports fetched"
        );

        Ok(response
            .results
            .iter()
            .filter_map(|report| self.map_report(report, lookup))
            .collect())
    }

    fn map_report(
        &self,
        report: &EnforcementReport,
        lookup: &dyn ProductLookup,
    ) -> Option<AlertRecord> {
        let description = report.product_description.as_deref()?.trim();
        if description.is_empty() {
            return None;
        }
        let product_name = lookup.lookup(&short_title(description))?;

        let report_date = report
            .report_date
            .as_deref()
            .and_then(parse_alert_date)
            .or_else(|| {
                report
                    .recall_initiation_date
                    .as_deref()
                    .and_then(parse_alert_date)
            });

        let record_id = RecordIdBuilder::new(&self.spec.source_id)
            .text(Some(description))
            .date(report_date)
            .finish();

        let mut record = AlertRecord::new(
            record_id,
            &self.spec.source_id,
            &self.spec.source_org,
            self.spec.base_url.clone(),
            Utc::now(),
        );
        record.source_country = report
            .country
            .clone()
            .or_else(|| self.spec.source_country.clone());
        record.title = Some(short_title(description));
        record.product_names = vec![product_name];
        record.manufacturer = capture(&MANUFACTURED_BY, description)
            .or_else(|| report.recalling_firm.clone());
        record.distributor = capture(&DISTRIBUTED_BY, description);
        record.publish_date = report_date;
        record.reason = report.reason_for_recall.clone();
        record.alert_type = alert_type(report.classification.as_deref())
            .map(str::to_owned)
            .or_else(|| self.spec.alert_type.clone());
        record.therapeutic_category = self.spec.therapeutic_category.clone();
        record.more_info = more_info(description, report.code_info.as_deref());
        record.notes = report.status.clone();
        Some(record)
    }
}

/// Product descriptions open with the product itself, then run into pack
/// size, NDC, and firm clauses. The text before the first comma is the
/// usable short title.
fn short_title(description: &str) -> String {
    description
        .split_once(',')
        .map_or(description, |(head, _)| head)
        .trim()
        .to_owned()
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    let captured = re.captures(text)?.get(1)?.as_str();
    let trimmed = captured.trim().trim_end_matches([',', '.']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Enforcement classes map to severity labels: Class I is the
/// dangerous-product tier.
fn alert_type(classification: Option<&str>) -> Option<&'static str> {
    match classification? {
        "Class I" => Some("Recall - Class I"),
        "Class II" => Some("Recall - Class II"),
        "Class III" => Some("Recall - Class III"),
        _ => None,
    }
}

fn more_info(description: &str, code_info: Option<&str>) -> Option<String> {
    let code_info = code_info.map(str::trim).filter(|c| !c.is_empty());
    match code_info {
        Some(codes) => Some(format!("{description} Codes: {codes}")),
        None => Some(description.to_owned()),
    }
}

#[cfg(test)]
#[path = "fda_test.rs"]
mod tests;
