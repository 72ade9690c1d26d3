use super::*;
use rxwatch_core::{KeywordFilter, SourceKind};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn spec(endpoint: String) -> SourceSpec {
    SourceSpec {
        source_id: "HC_CA".to_owned(),
        source_org: "Health Canada".to_owned(),
        source_country: Some("Canada".to_owned()),
        kind: SourceKind::JsonFeed,
        base_url: "https://recalls-rappels.canada.ca".to_owned(),
        api_endpoint: Some(endpoint),
        oncology_keywords: vec!["tamoxifen".to_owned(), "imatinib".to_owned()],
        therapeutic_category: Some("Oncology".to_owned()),
        alert_type: Some("Recall".to_owned()),
    }
}

fn source_with(start: NaiveDate, spec: &SourceSpec) -> HealthCanadaSource<'_> {
    HealthCanadaSource::new(spec, start)
}

#[test]
fn first_str_walks_keys_in_order_and_skips_empties() {
    let item = json!({ "title": "  ", "product_name": "Tamoxifen 20 mg", "name": "ignored" });
    assert_eq!(first_str(&item, TITLE_KEYS), Some("Tamoxifen 20 mg"));
    assert_eq!(first_str(&item, &["missing"]), None);
}

#[test]
fn lookup_key_matches_capitalized_and_spaced_forms() {
    let item = json!({
        "Starting date": "2026-04-10",
        "Identification number": "RA-2026-1234",
        "DIN, NPN, DIN-HIM": "DIN 02345678"
    });
    assert_eq!(first_str(&item, &["starting_date"]), Some("2026-04-10"));
    assert_eq!(first_str(&item, IDENT_KEYS), Some("RA-2026-1234"));
    assert_eq!(first_str(&item, &["din_npn_din_him"]), Some("DIN 02345678"));
}

#[test]
fn date_value_reads_strings_and_epoch_millis() {
    assert_eq!(
        date_value(&json!("2026-03-02")),
        NaiveDate::from_ymd_opt(2026, 3, 2)
    );
    // 2026-03-02T00:00:00Z in millis.
    assert_eq!(
        date_value(&json!(1_772_409_600_000_i64)),
        NaiveDate::from_ymd_opt(2026, 3, 2)
    );
    assert_eq!(date_value(&json!(null)), None);
}

#[test]
fn health_product_gate_reads_all_signal_fields() {
    assert!(is_health_product_recall(&json!({ "category": "Health products - Drugs" })));
    assert!(is_health_product_recall(&json!({ "Category": "Health products" })));
    assert!(is_health_product_recall(
        &json!({ "Type of communication": "Drug recall" })
    ));
    assert!(is_health_product_recall(
        &json!({ "Subcategory": "Natural health products" })
    ));
    assert!(is_health_product_recall(
        &json!({ "Source of recall": "Health Canada" })
    ));
    assert!(!is_health_product_recall(&json!({ "category": "Vehicles" })));
    assert!(!is_health_product_recall(&json!({ "Category": "Food" })));
}

#[test]
fn more_info_joins_present_fields_in_order() {
    let item = json!({
        "Summary": "One lot recalled.",
        "What you should do": "Stop using the product.",
        "Lot or serial number": "A1201"
    });
    assert_eq!(
        more_info(&item).as_deref(),
        Some("One lot recalled. Stop using the product. A1201")
    );
    assert_eq!(more_info(&json!({ "title": "x" })), None);
}

#[tokio::test]
async fn standardize_maps_filtered_feed_items() {
    let server = MockServer::start().await;
    let body = json!([
        {
            "title": "Tamoxifen 20 mg tablets recalled due to impurity",
            "category": "Health products - Drugs",
            "date_published": "2026-04-10",
            "recall_id": "RA-2026-1234",
            "url": "https://recalls-rappels.canada.ca/en/alert-recall/ra-2026-1234",
            "issue": "Nitrosamine impurity above the acceptable limit",
            "summary": "One lot of Tamoxifen 20 mg tablets is being recalled.",
            "company": "Maple Pharma Inc.",
            "distributor": "Northern Distribution Ltd."
        },
        {
            "title": "Child car seat harness defect",
            "category": "Vehicles",
            "date_published": "2026-04-09"
        },
        {
            "title": "Imatinib 400 mg labelling error",
            "category": "Health products",
            "date_published": "2019-01-01",
            "recall_id": "RA-2019-0001"
        }
    ]);
    Mock::given(method("GET"))
        .and(path("/api/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let spec = spec(format!("{}/api/recent", server.uri()));
    let lookup = KeywordFilter::new(&spec.oncology_keywords);
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");
    let client = FetchClient::new(5, "rxwatch-test", 0, 0).expect("client");

    let records = source_with(start, &spec)
        .standardize(&client, &lookup)
        .await
        .expect("standardize");

    // Vehicles fail the category gate; the 2019 item is before the window.
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.source_id, "HC_CA");
    assert_eq!(
        record.title.as_deref(),
        Some("Tamoxifen 20 mg tablets recalled due to impurity")
    );
    assert_eq!(
        record.source_url,
        "https://recalls-rappels.canada.ca/en/alert-recall/ra-2026-1234"
    );
    assert_eq!(
        record.publish_date,
        NaiveDate::from_ymd_opt(2026, 4, 10)
    );
    assert_eq!(
        record.reason.as_deref(),
        Some("Nitrosamine impurity above the acceptable limit")
    );
    assert_eq!(record.manufacturer.as_deref(), Some("Maple Pharma Inc."));
    assert_eq!(
        record.distributor.as_deref(),
        Some("Northern Distribution Ltd.")
    );
    assert_eq!(
        record.more_info.as_deref(),
        Some("One lot of Tamoxifen 20 mg tablets is being recalled.")
    );
    assert_eq!(record.source_country.as_deref(), Some("Canada"));
    assert_eq!(record.record_id.len(), 64);
}

#[tokio::test]
async fn capitalized_feed_revision_yields_the_same_records() {
    let server = MockServer::start().await;
    // The same alert in both key shapes the feed has shipped.
    let body = json!([
        {
            "Title": "Imatinib 100 mg capsules recall",
            "Category": "Health products - Drugs",
            "Starting date": "2026-05-01",
            "Identification number": "RA-2026-2000",
            "Manufacturer": "Maple Pharma Inc."
        },
        {
            "title": "Imatinib 100 mg capsules recall",
            "category": "Health products - Drugs",
            "starting_date": "2026-05-01",
            "identification_number": "RA-2026-2000",
            "manufacturer": "Maple Pharma Inc."
        }
    ]);
    Mock::given(method("GET"))
        .and(path("/api/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let spec = spec(format!("{}/api/recent", server.uri()));
    let lookup = KeywordFilter::new(&spec.oncology_keywords);
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");
    let client = FetchClient::new(5, "rxwatch-test", 0, 0).expect("client");

    let records = source_with(start, &spec)
        .standardize(&client, &lookup)
        .await
        .expect("standardize");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].record_id, records[1].record_id);
    assert_eq!(records[0].manufacturer.as_deref(), Some("Maple Pharma Inc."));
    assert_eq!(
        records[0].publish_date,
        NaiveDate::from_ymd_opt(2026, 5, 1)
    );
}

#[tokio::test]
async fn record_id_is_seeded_by_the_canonical_product_name() {
    use rxwatch_core::ProductLookup;

    // A dictionary-style lookup mapping spelling variants to one canonical
    // name; records for either spelling must share an id.
    struct Dictionary;
    impl ProductLookup for Dictionary {
        fn lookup(&self, candidate: &str) -> Option<String> {
            candidate
                .to_lowercase()
                .contains("imatinib")
                .then(|| "Imatinib Mesylate".to_owned())
        }
    }

    let server = MockServer::start().await;
    let body = json!([
        {
            "title": "IMATINIB 100 mg capsules recall",
            "category": "Health products - Drugs",
            "date_published": "2026-05-01",
            "recall_id": "RA-2026-2000"
        },
        {
            "title": "Imatinib 100mg Capsules Recall",
            "category": "Health products - Drugs",
            "date_published": "2026-05-01",
            "recall_id": "RA-2026-2000"
        }
    ]);
    Mock::given(method("GET"))
        .and(path("/api/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let spec = spec(format!("{}/api/recent", server.uri()));
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");
    let client = FetchClient::new(5, "rxwatch-test", 0, 0).expect("client");

    let records = source_with(start, &spec)
        .standardize(&client, &Dictionary)
        .await
        .expect("standardize");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].record_id, records[1].record_id);
    assert_eq!(records[0].product_names, ["Imatinib Mesylate"]);
}

#[tokio::test]
async fn standardize_accepts_results_wrapper_object() {
    let server = MockServer::start().await;
    let body = json!({
        "results": [
            {
                "title": "Imatinib 100 mg capsules recall",
                "category": "Health products - Drugs",
                "date_published": "2026-05-01",
                "recall_id": "RA-2026-2000"
            }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/api/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let spec = spec(format!("{}/api/recent", server.uri()));
    let lookup = KeywordFilter::new(&spec.oncology_keywords);
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");
    let client = FetchClient::new(5, "rxwatch-test", 0, 0).expect("client");

    let records = source_with(start, &spec)
        .standardize(&client, &lookup)
        .await
        .expect("standardize");
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn standardize_rejects_non_array_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "maintenance"})))
        .mount(&server)
        .await;

    let spec = spec(format!("{}/api/recent", server.uri()));
    let lookup = KeywordFilter::new(&[]);
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");
    let client = FetchClient::new(5, "rxwatch-test", 0, 0).expect("client");

    let err = source_with(start, &spec)
        .standardize(&client, &lookup)
        .await
        .expect_err("feed shape error");
    assert!(matches!(err, ScraperError::FeedShape { .. }));
}
