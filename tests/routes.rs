use std::path::Path;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

use signage_pricing::pricing::{PolicyRegistry, PolicySet};
use signage_pricing::{app, AppState};

fn test_app() -> Router {
    let registry = PolicyRegistry::new(PolicySet::builtin().unwrap());
    app(AppState::new(registry), Path::new("static"))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn post_quote(json: &str) -> (StatusCode, serde_json::Value) {
    let response = test_app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/pricing/quote")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = body_string(response).await;
    (status, serde_json::from_str(&body).unwrap())
}

async fn get(uri: &str) -> (StatusCode, String) {
    let response = test_app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_string(response).await)
}

#[tokio::test]
async fn quote_bracket_policy() {
    let (status, json) = post_quote(
        r#"{ "duration": 20, "tier": "6-10", "term_months": 12, "add_ons": ["peak_time"] }"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["policy"], "community");
    assert_eq!(json["location_count"], 8);
    assert_eq!(json["display"]["final_price"]["amount"], "1296");
    assert_eq!(json["display"]["total_savings"]["amount"], "304");
    assert_eq!(json["display"]["annual_savings"]["amount"], "3648");
    assert_eq!(json["exact"]["final_price"]["currency"], "USD");
}

#[tokio::test]
async fn quote_volume_policy() {
    let (status, json) = post_quote(
        r#"{ "policy": "volume", "locations": 5, "add_ons": ["screen_takeover"] }"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["exact"]["base_price"]["amount"], "250");
    assert_eq!(json["exact"]["final_price"]["amount"], "275");
    assert_eq!(json["billed_units"], 1);
}

#[tokio::test]
async fn quote_rejects_invalid_option() {
    let (status, json) = post_quote(r#"{ "duration": 45, "tier": "1" }"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_option");
}

#[tokio::test]
async fn quote_bracket_policy_rejects_raw_count() {
    let (status, json) = post_quote(r#"{ "duration": 20, "locations": 100 }"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_option");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("prices by location tier, not by count"));
}

#[tokio::test]
async fn quote_unknown_policy() {
    let (status, json) = post_quote(r#"{ "policy": "gold", "locations": 2 }"#).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_type"], "unknown_policy");
}

#[tokio::test]
async fn list_policies_marks_default() {
    let (status, body) = get("/api/pricing/policies").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    let policies = json.as_array().unwrap();
    assert_eq!(policies.len(), 3);
    assert_eq!(policies[0]["name"], "community");
    assert_eq!(policies[0]["is_default"], true);
}

#[tokio::test]
async fn get_single_policy() {
    let (status, body) = get("/api/pricing/policies/threshold").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["location_rule"], "thresholds");
    assert_eq!(json["is_default"], false);

    let (status, _) = get("/api/pricing/policies/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn calculator_page_defaults() {
    let (status, body) = get("/pricing").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Your Monthly Investment"));
    assert!(body.contains("$150"));
    assert!(body.contains("Most Popular"));
}

#[tokio::test]
async fn calculator_page_with_selection() {
    let (status, body) = get(
        "/pricing?policy=community&duration=20&tier=6-10&term=12&add_ons=peak_time",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("$1296"));
    assert!(body.contains("Monthly Savings: $304"));
    assert!(body.contains("$3648"));
    assert!(body.contains("Multi-location discount"));
}

#[tokio::test]
async fn calculator_page_shows_invalid_input() {
    let (status, body) = get("/pricing?policy=threshold&duration=45&locations=3").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("45s is not offered"));
}

#[tokio::test]
async fn calculator_page_keeps_term_and_add_ons_with_defaults() {
    let (status, body) = get("/pricing?term=12&add_ons=peak_time").await;

    assert_eq!(status, StatusCode::OK);
    // 20s spot, single location, peak time: (150 + 50) less 10%
    assert!(body.contains("$180"));
    assert!(body.contains(r#"value="peak_time" checked"#));
}

#[tokio::test]
async fn calculator_page_rejects_count_for_tiered_policy() {
    let (status, body) = get("/pricing?policy=community&duration=20&locations=4").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("prices by location tier, not by count"));
}

#[tokio::test]
async fn calculator_page_unknown_policy() {
    let (status, _) = get("/pricing?policy=gold").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn root_redirects_to_calculator() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/pricing");
}

#[tokio::test]
async fn unknown_path_renders_not_found_page() {
    let (status, body) = get("/no-such-page").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page not found"));
}
