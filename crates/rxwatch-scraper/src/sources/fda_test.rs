use super::*;
use rxwatch_core::{KeywordFilter, SourceKind};
use serde_json::json;
use wiremock::matchers::{method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn spec(endpoint: String) -> SourceSpec {
    SourceSpec {
        source_id: "FDA_US".to_owned(),
        source_org: "U.S. Food and Drug Administration".to_owned(),
        source_country: Some("United States".to_owned()),
        kind: SourceKind::JsonApi,
        base_url: "https://www.fda.gov/safety/recalls".to_owned(),
        api_endpoint: Some(endpoint),
        oncology_keywords: vec!["methotrexate".to_owned(), "daratumumab".to_owned()],
        therapeutic_category: Some("Oncology".to_owned()),
        alert_type: None,
    }
}

const DESCRIPTION: &str = "Methotrexate Injection, USP, 250 mg/10 mL, 10 mL vial, \
     Manufactured by: Acme Laboratories Inc, Distributed by: Beta Pharma LLC, NDC 12345-678-90.";

#[test]
fn manufacturer_capture_stops_at_distributor_clause() {
    assert_eq!(
        capture(&MANUFACTURED_BY, DESCRIPTION).as_deref(),
        Some("Acme Laboratories Inc")
    );
}

#[test]
fn distributor_capture_stops_at_ndc_clause() {
    assert_eq!(
        capture(&DISTRIBUTED_BY, DESCRIPTION).as_deref(),
        Some("Beta Pharma LLC")
    );
}

#[test]
fn capture_is_case_insensitive_and_tolerates_missing_colon() {
    let text = "manufactured BY Gamma Biologics. Ships refrigerated.";
    assert_eq!(
        capture(&MANUFACTURED_BY, text).as_deref(),
        Some("Gamma Biologics")
    );
    assert_eq!(capture(&DISTRIBUTED_BY, text), None);
}

#[test]
fn capture_runs_to_end_of_text_without_terminator() {
    let text = "Manufactured by: Delta Pharma GmbH";
    assert_eq!(
        capture(&MANUFACTURED_BY, text).as_deref(),
        Some("Delta Pharma GmbH")
    );
}

#[test]
fn short_title_is_text_before_first_comma() {
    assert_eq!(short_title(DESCRIPTION), "Methotrexate Injection");
    assert_eq!(short_title("No commas here"), "No commas here");
}

#[test]
fn classification_maps_to_severity_label() {
    assert_eq!(alert_type(Some("Class I")), Some("Recall - Class I"));
    assert_eq!(alert_type(Some("Class III")), Some("Recall - Class III"));
    assert_eq!(alert_type(Some("Not Yet Classified")), None);
    assert_eq!(alert_type(None), None);
}

#[tokio::test]
async fn standardize_maps_and_gates_reports() {
    let server = MockServer::start().await;
    let body = json!({
        "results": [
            {
                "product_description": DESCRIPTION,
                "report_date": "20260812",
                "reason_for_recall": "Presence of particulate matter",
                "code_info": "Lot A1201, Exp 11/2026",
                "classification": "Class II",
                "recalling_firm": "Acme Laboratories Inc",
                "country": "United States",
                "status": "Ongoing"
            },
            {
                "product_description": "Ibuprofen Tablets, 200 mg, 100 count bottle",
                "report_date": "20260810",
                "classification": "Class III"
            }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/drug/enforcement.json"))
        .and(query_param_contains("search", "product_type:\"Drugs\""))
        .and(query_param_contains("search", "report_date:[20260101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let spec = spec(format!("{}/drug/enforcement.json", server.uri()));
    let lookup = KeywordFilter::new(&spec.oncology_keywords);
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");
    let client = FetchClient::new(5, "rxwatch-test", 0, 0).expect("client");

    let records = FdaSource::new(&spec, start)
        .standardize(&client, &lookup)
        .await
        .expect("standardize");

    // The ibuprofen report fails the oncology gate.
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.source_id, "FDA_US");
    assert_eq!(record.title.as_deref(), Some("Methotrexate Injection"));
    assert_eq!(record.product_names, ["Methotrexate Injection"]);
    assert_eq!(
        record.manufacturer.as_deref(),
        Some("Acme Laboratories Inc")
    );
    assert_eq!(record.distributor.as_deref(), Some("Beta Pharma LLC"));
    assert_eq!(
        record.publish_date,
        NaiveDate::from_ymd_opt(2026, 8, 12)
    );
    assert_eq!(
        record.reason.as_deref(),
        Some("Presence of particulate matter")
    );
    assert_eq!(record.alert_type.as_deref(), Some("Recall - Class II"));
    assert!(record
        .more_info
        .as_deref()
        .is_some_and(|m| m.contains("Codes: Lot A1201")));
    assert_eq!(record.record_id.len(), 64);
}

#[tokio::test]
async fn standardize_treats_404_as_empty_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drug/enforcement.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let spec = spec(format!("{}/drug/enforcement.json", server.uri()));
    let lookup = KeywordFilter::new(&[]);
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");
    let client = FetchClient::new(5, "rxwatch-test", 0, 0).expect("client");

    let records = FdaSource::new(&spec, start)
        .standardize(&client, &lookup)
        .await
        .expect("standardize");
    assert!(records.is_empty());
}

#[tokio::test]
async fn standardize_same_report_yields_stable_record_id() {
    let server = MockServer::start().await;
    let body = json!({
        "results": [
            { "product_description": "Daratumumab Injection, 1800 mg", "report_date": "20260801" }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/drug/enforcement.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let spec = spec(format!("{}/drug/enforcement.json", server.uri()));
    let lookup = KeywordFilter::new(&spec.oncology_keywords);
    let start = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");
    let client = FetchClient::new(5, "rxwatch-test", 0, 0).expect("client");

    let source = FdaSource::new(&spec, start);
    let first = source.standardize(&client, &lookup).await.expect("first run");
    let second = source
        .standardize(&client, &lookup)
        .await
        .expect("second run");

    assert_eq!(first[0].record_id, second[0].record_id);
}
