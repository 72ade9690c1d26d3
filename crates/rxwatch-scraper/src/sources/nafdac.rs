//! NAFDAC (Nigeria) recalls-and-alerts adapter.
//!
//! The listing page is an HTML table, date-descending: column 1 publish
//! date, column 2 title + detail link, column 3 alert type, column 4
//! category, column 5 company. Detail pages carry a heading, free
//! paragraphs, and (usually) a specification table; older alerts have only
//! bolded inline labels, handled by the label-pair fallback.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use scraper::{ElementRef, Html, Selector};

use rxwatch_core::{AlertRecord, FieldKey, ProductLookup, RecordIdBuilder, SourceSpec};

use crate::client::FetchClient;
use crate::dates::parse_alert_date;
use crate::error::ScraperError;
use crate::grid::table_to_grid;
use crate::html::{absolutize, clean_text, element_text, select_text, selector};
use crate::labels::extract_label_pairs;
use crate::tables::first_informative;
use crate::title::decompose_title;

/// One row of the listing table, before the detail page is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub detail_url: String,
    pub title: String,
    pub publish_date_raw: Option<String>,
    pub alert_type: Option<String>,
    pub category: Option<String>,
    pub company: Option<String>,
}

/// Everything extracted from one detail page.
#[derive(Debug)]
pub struct DetailExtract {
    pub title: Option<String>,
    pub brand_name: Option<String>,
    pub generic_name: Option<String>,
    pub country: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub body_text: String,
    pub fields: rxwatch_core::ParsedFields,
}

pub struct NafdacSource<'a> {
    spec: &'a SourceSpec,
    start_date: NaiveDate,
}

impl<'a> NafdacSource<'a> {
    #[must_use]
    pub fn new(spec: &'a SourceSpec, start_date: NaiveDate) -> Self {
        Self { spec, start_date }
    }

    /// Collects alert records from the listing and its detail pages.
    ///
    /// Listing enumeration stops (not fails) at the first item older than
    /// the configured start date. A detail page that fails to fetch aborts
    /// only that item.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] only when the listing page itself cannot be
    /// fetched.
    pub async fn standardize(
        &self,
        client: &FetchClient,
        lookup: &dyn ProductLookup,
    ) -> Result<Vec<AlertRecord>, ScraperError> {
        let listing = client.fetch_html(&self.spec.base_url).await?;
        let items = parse_listing(&listing.body, &listing.final_url);
        tracing::info!(source = %self.spec.source_id, items = items.len(), "listing parsed");

        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::new();

        for item in items {
            let listing_date = item
                .publish_date_raw
                .as_deref()
                .and_then(parse_alert_date);
            // Listing is date-descending; everything after the cutoff is older.
            if let Some(date) = listing_date {
                if date < self.start_date {
                    tracing::debug!(source = %self.spec.source_id, %date, "reached start-date cutoff");
                    break;
                }
            }
            if !seen.insert(item.detail_url.clone()) {
                continue;
            }

            let detail = match client.fetch_html(&item.detail_url).await {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(url = %item.detail_url, error = %err, "detail fetch failed, skipping item");
                    continue;
                }
            };
            let extract = parse_detail(&detail.body);

            let haystack = format!("{} {}", item.title, extract.body_text);
            if !lookup.matches(&haystack) {
                continue;
            }

            records.push(self.assemble(&item, extract, detail.final_url, listing_date));
        }

        Ok(records)
    }

    fn assemble(
        &self,
        item: &ListingItem,
        mut extract: DetailExtract,
        final_url: String,
        listing_date: Option<NaiveDate>,
    ) -> AlertRecord {
        let publish_date = listing_date.or(extract.publish_date);
        let manufacturer = item.company.clone().or_else(|| {
            extract
                .fields
                .first(&FieldKey::StatedManufacturer)
                .map(str::to_owned)
        });

        let record_id = RecordIdBuilder::new(&self.spec.source_id)
            .text(Some(&item.detail_url))
            .date(publish_date)
            .text(Some(&item.title))
            .text(manufacturer.as_deref())
            .finish();

        let mut record = AlertRecord::new(
            record_id,
            &self.spec.source_id,
            &self.spec.source_org,
            final_url,
            Utc::now(),
        );
        record.source_country = extract
            .country
            .or_else(|| self.spec.source_country.clone());
        record.title = extract.title.or_else(|| Some(item.title.clone()));
        record.brand_name = extract.brand_name;
        record.generic_name = extract.generic_name;
        record.manufacturer = manufacturer;
        record.publish_date = publish_date;
        record.alert_type = item
            .alert_type
            .clone()
            .or_else(|| self.spec.alert_type.clone());
        record.therapeutic_category = self.spec.therapeutic_category.clone();
        record.notes = item.category.clone();

        record.product_names = extract.fields.take(&FieldKey::ProductName);
        record.batch_numbers = extract.fields.take(&FieldKey::BatchNumber);
        record.expiry_dates = extract
            .fields
            .take(&FieldKey::ExpiryDate)
            .iter()
            .filter_map(|raw| {
                let parsed = parse_alert_date(raw);
                if parsed.is_none() {
                    tracing::debug!(value = %raw, "unparseable expiry date dropped");
                }
                parsed
            })
            .collect();
        record
    }
}

/// Parses the listing table into items, resolving detail links against the
/// listing URL. Rows without a drug-ish category or without a link are
/// skipped.
#[must_use]
pub fn parse_listing(html: &str, listing_url: &str) -> Vec<ListingItem> {
    let doc = Html::parse_document(html);
    let row_selector = selector("table tbody tr");
    let link_selector = selector("td:nth-child(2) a");
    let date_selector = selector("td:nth-child(1)");
    let type_selector = selector("td:nth-child(3)");
    let category_selector = selector("td:nth-child(4)");
    let company_selector = selector("td:nth-child(5)");

    let mut items = Vec::new();
    for row in doc.select(&row_selector) {
        let category = select_text(row, &category_selector);
        // The listing mixes food, cosmetics, and devices; only drug rows
        // carry the fields this pipeline understands.
        if !category
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains("drug"))
        {
            continue;
        }

        let Some(link) = row.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(detail_url) = absolutize(listing_url, href) else {
            continue;
        };
        let title = element_text(link);
        if title.is_empty() {
            continue;
        }

        items.push(ListingItem {
            detail_url,
            title,
            publish_date_raw: select_text(row, &date_selector),
            alert_type: select_text(row, &type_selector),
            category,
            company: select_text(row, &company_selector),
        });
    }
    items
}

/// Runs the full extraction pipeline over one detail page: title
/// decomposition, body text, and the specification table (label-pair
/// fallback when no table yields fields). Total — parse misses leave
/// fields empty.
#[must_use]
pub fn parse_detail(html: &str) -> DetailExtract {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let heading = select_text(root, &selector("h1.entry-title"))
        .or_else(|| select_text(root, &selector("h1")));
    let (title, brand_name, generic_name, country) = match heading {
        Some(h) => {
            let parts = decompose_title(&h);
            (
                Some(parts.title),
                parts.brand_name,
                parts.generic_name,
                parts.country,
            )
        }
        None => (None, None, None, None),
    };

    let publish_date = select_text(root, &selector("time.entry-date"))
        .as_deref()
        .and_then(parse_alert_date);

    let body_text = body_paragraphs(root, &selector("p"));

    let mut fields =
        first_informative(root.select(&selector("table")).map(table_to_grid));
    if fields.is_empty() {
        let content = root
            .select(&selector("div.entry-content"))
            .next()
            .unwrap_or(root);
        fields = extract_label_pairs(content);
    }

    DetailExtract {
        title,
        brand_name,
        generic_name,
        country,
        publish_date,
        body_text,
        fields,
    }
}

fn body_paragraphs(root: ElementRef<'_>, p_selector: &Selector) -> String {
    let joined = root
        .select(p_selector)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    clean_text(&joined).unwrap_or_default()
}

#[cfg(test)]
#[path = "nafdac_test.rs"]
mod tests;
