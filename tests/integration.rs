//! Integration tests for the PIA engine HTTP API.
//!
//! This test suite covers:
//! - Retirement computation with an early-retirement reduction
//! - Family benefits under the family maximum
//! - Survivor cases
//! - Batch computation with per-worker failures
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use pia_engine::api::{AppState, create_router};
use pia_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/law").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn decimal_at(value: &Value) -> Decimal {
    decimal(value.as_str().expect("decimal serialized as string"))
}

async fn post_json(router: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_calculate(router: Router, body: Value) -> (StatusCode, Value) {
    post_json(router, "/calculate", body.to_string()).await
}

/// Earnings of `amount` for every year in `first..=last`.
fn earnings(first: i32, last: i32, amount: &str) -> Value {
    let map: serde_json::Map<String, Value> = (first..=last)
        .map(|year| (year.to_string(), json!(amount)))
        .collect();
    Value::Object(map)
}

/// Born April 1958, $30,000 a year 1985-2023, entitled April 2024.
fn retiree(id: &str) -> Value {
    json!({
        "id": id,
        "birth_date": "1958-04-10",
        "benefit_type": "old_age",
        "entitlement_date": "2024-04",
        "earnings": earnings(1985, 2023, "30000")
    })
}

fn survivor_case(id: &str, family: Value) -> Value {
    json!({
        "id": id,
        "birth_date": "1970-04-10",
        "benefit_type": "survivor",
        "entitlement_date": "2015-09",
        "death_date": "2015-08-02",
        "earnings": earnings(1992, 2015, "45000"),
        "family": family
    })
}

fn assert_has_audit_step(result: &Value, rule_id: &str) {
    let steps = result["audit_trace"]["steps"].as_array().unwrap();
    assert!(
        steps.iter().any(|s| s["rule_id"] == rule_id),
        "Expected an audit step with rule_id '{}'",
        rule_id
    );
}

// =============================================================================
// Retirement
// =============================================================================

#[tokio::test]
async fn test_retirement_wage_indexed_pia() {
    let (status, result) = post_calculate(create_router_for_test(), json!({ "worker": retiree("w-001") })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["worker_id"], "w-001");
    assert_eq!(result["insured_status"], "permanent");
    assert_eq!(result["governing_method"], "wage_indexed");
    assert_eq!(result["selection_rule"], "no_special_minimum_drc");

    // AIME 4346 on 2018 bend points 960/5785: 1947.50 at eligibility,
    // then 1.3%, 5.9%, 8.7% and 3.2% increases
    assert_eq!(decimal_at(&result["governing_pia"]), decimal("2343.4"));
    assert_eq!(decimal_at(&result["governing_mfb"]), decimal("4279.8"));

    let wage_indexed = result["methods"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["method"] == "wage_indexed")
        .unwrap();
    assert_eq!(decimal_at(&wage_indexed["provenance"]["average_earnings"]), decimal("4346"));
    assert_eq!(decimal_at(&wage_indexed["pia_at_eligibility"]), decimal("1947.5"));
}

#[tokio::test]
async fn test_retirement_early_reduction() {
    let (status, result) = post_calculate(create_router_for_test(), json!({ "worker": retiree("w-001") })).await;

    assert_eq!(status, StatusCode::OK);
    let benefit = &result["worker_benefit"];
    // eight months before age 66 and 8 months
    assert_eq!(benefit["adjustment_months"], -8);
    assert_eq!(decimal_at(&benefit["monthly_benefit"]), decimal("2239.2"));
    assert_eq!(decimal_at(&benefit["payable"]), decimal("2239"));
}

#[tokio::test]
async fn test_retirement_audit_trace() {
    let (_, result) = post_calculate(create_router_for_test(), json!({ "worker": retiree("w-001") })).await;

    for rule_id in [
        "freeze_years",
        "insured_status",
        "wage_indexed",
        "special_minimum",
        "method_selection",
    ] {
        assert_has_audit_step(&result, rule_id);
    }
    assert!(result["audit_trace"]["warnings"].as_array().unwrap().is_empty());
    assert!(result["calculation_id"].is_string());
    assert_eq!(result["benefit_date"], "2024-04");
}

#[tokio::test]
async fn test_currently_insured_retiree_is_not_paid() {
    let mut worker = retiree("w-008");
    worker["earnings"] = earnings(2021, 2023, "40000");
    let (status, result) = post_calculate(create_router_for_test(), json!({ "worker": worker })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["insured_status"], "currently");
    assert_eq!(result["pia_data"]["insured"]["currently_insured"], true);
    assert!(result.get("worker_benefit").is_none());
    assert_eq!(result["audit_trace"]["warnings"][0]["code"], "WORKER_NOT_FULLY_INSURED");
}

// =============================================================================
// Family benefits
// =============================================================================

#[tokio::test]
async fn test_family_maximum_with_spouse_and_child() {
    let mut worker = retiree("w-002");
    worker["family"] = json!([
        { "id": "spouse", "beneficiary": "spouse", "birth_date": "1960-06-15", "entitlement_date": "2024-04" },
        { "id": "child", "beneficiary": "child", "birth_date": "2010-01-05", "entitlement_date": "2024-04" }
    ]);
    let (status, result) = post_calculate(create_router_for_test(), json!({ "worker": worker })).await;

    assert_eq!(status, StatusCode::OK);
    let family = result["family"].as_array().unwrap();
    assert_eq!(family.len(), 2);

    // 4279.80 - 2343.40 leaves 1936.40 for 2 x 1171.70
    for chain in family {
        assert_eq!(decimal_at(&chain["full"]), decimal("1171.7"));
        assert_eq!(decimal_at(&chain["family_max_reduced"]), decimal("968.2"));
    }

    let spouse = &family[0];
    assert_eq!(spouse["reduction_months"], 38);
    assert_eq!(decimal_at(&spouse["actuarially_reduced"]), decimal("718.0"));
    assert_eq!(decimal_at(&spouse["rounded"]), decimal("718"));

    let child = &family[1];
    assert_eq!(child["reduction_months"], 0);
    assert_eq!(decimal_at(&child["rounded"]), decimal("968"));
    assert_has_audit_step(&result, "family_maximum");
}

#[tokio::test]
async fn test_divorced_spouse_is_outside_family_maximum() {
    let mut worker = retiree("w-003");
    worker["family"] = json!([
        { "id": "ex", "beneficiary": "divorced_spouse", "birth_date": "1958-01-15", "entitlement_date": "2024-04" },
        { "id": "child", "beneficiary": "child", "birth_date": "2010-01-05", "entitlement_date": "2024-04" }
    ]);
    let (status, result) = post_calculate(create_router_for_test(), json!({ "worker": worker })).await;

    assert_eq!(status, StatusCode::OK);
    let family = result["family"].as_array().unwrap();
    // a single child fits under the maximum, and the divorced spouse is never scaled
    assert_eq!(decimal_at(&family[0]["family_max_reduced"]), decimal("1171.7"));
    assert_eq!(decimal_at(&family[1]["family_max_reduced"]), decimal("1171.7"));
}

#[tokio::test]
async fn test_survivor_case_pays_family_only() {
    let family = json!([
        { "id": "child", "beneficiary": "child", "birth_date": "2005-06-06", "entitlement_date": "2015-09" },
        { "id": "parent", "beneficiary": "mother_father", "birth_date": "1972-06-06", "entitlement_date": "2015-09" }
    ]);
    let (status, result) =
        post_calculate(create_router_for_test(), json!({ "worker": survivor_case("w-004", family) })).await;

    assert_eq!(status, StatusCode::OK);
    assert!(result.get("worker_benefit").is_none());

    let mfb = decimal_at(&result["governing_mfb"]);
    let shares: Decimal = result["family"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| decimal_at(&c["family_max_reduced"]))
        .sum();
    assert!(shares <= mfb);
    for chain in result["family"].as_array().unwrap() {
        assert_eq!(chain["pia_factor"], "0.75");
    }
}

// =============================================================================
// Batch
// =============================================================================

#[tokio::test]
async fn test_batch_reports_each_worker() {
    let mut bad = retiree("bad");
    bad["entitlement_date"] = json!("1939-06");
    let body = json!({ "workers": [retiree("a"), bad, retiree("c")] });

    let (status, result) = post_json(create_router_for_test(), "/calculate/batch", body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["succeeded"], 2);
    assert_eq!(result["failed"], 1);

    let results = result["results"].as_array().unwrap();
    assert_eq!(results[0]["worker_id"], "a");
    assert_eq!(results[1]["worker_id"], "bad");
    assert_eq!(results[1]["error"]["code"], "OUT_OF_RANGE");
    assert_eq!(
        decimal_at(&results[2]["result"]["governing_pia"]),
        decimal("2343.4")
    );
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_entitlement_before_1940_is_rejected() {
    let mut worker = retiree("w-005");
    worker["entitlement_date"] = json!("1939-06");
    let (status, result) = post_calculate(create_router_for_test(), json!({ "worker": worker })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(result["code"], "OUT_OF_RANGE");
    assert_eq!(result["error_code"], 102);
}

#[tokio::test]
async fn test_spouse_in_survivor_case_is_rejected() {
    let family = json!([
        { "id": "spouse", "beneficiary": "spouse", "birth_date": "1971-06-06", "entitlement_date": "2015-09" }
    ]);
    let (status, result) =
        post_calculate(create_router_for_test(), json!({ "worker": survivor_case("w-006", family) })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(result["code"], "SEQUENCING_ERROR");
    assert_eq!(result["error_code"], 210);
}

#[tokio::test]
async fn test_malformed_json() {
    let (status, result) =
        post_json(create_router_for_test(), "/calculate", "{ not json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_missing_worker_field() {
    let (status, result) = post_calculate(create_router_for_test(), json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_invalid_month_is_malformed() {
    let mut worker = retiree("w-007");
    worker["entitlement_date"] = json!("2024-13");
    let (status, result) = post_calculate(create_router_for_test(), json!({ "worker": worker })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "MALFORMED_JSON");
}
