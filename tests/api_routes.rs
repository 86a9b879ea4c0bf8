//! In-process route tests. The router is driven through `tower::ServiceExt::oneshot`
//! against a ledger in a temporary directory.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use gpf_planner::api::{AppState, build_router};
use gpf_planner::ledger::TransactionLedger;

fn make_router(dir: &tempfile::TempDir) -> Router {
    let ledger = TransactionLedger::new(dir.path().join("transactions.jsonl"));
    build_router(AppState::new(ledger))
}

async fn call(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    assert_eq!(
        resp.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
        Some(&b"no-store"[..])
    );
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    let json = serde_json::from_slice(&body).expect("body is not valid JSON");
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn sample_holdings() -> Value {
    json!({
        "holdings": [
            {"fundCode": "GPF-EQ", "fundName": "Thai Equity", "value": 200000, "units": 20000},
            {"fundCode": "GPF-FI", "fundName": "Government Bonds", "value": 800000}
        ]
    })
}

fn buy(fund_id: &str, amount: f64) -> Value {
    json!({
        "fundId": fund_id,
        "fundName": fund_id,
        "assetClass": "equity",
        "currentAllocation": 10.0,
        "targetAllocation": 20.0,
        "action": "buy",
        "amount": amount,
        "reason": "underweight"
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, json) = call(&make_router(&dir), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn unknown_route_is_a_json_404() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, json) = call(&make_router(&dir), get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not found");
}

#[tokio::test]
async fn target_allocation_reads_profile_from_query() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = make_router(&dir);

    let (status, json) = call(
        &router,
        get("/api/allocation/target?currentAge=25&riskTolerance=aggressive"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["equity"], 80.0);
    assert_eq!(json["property"], 5.0);

    let (status, json) = call(&router, get("/api/allocation/target")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["equity"], 65.0);
    assert_eq!(json["fixedIncome"], 25.0);
}

#[tokio::test]
async fn rebalance_orders_trades_by_amount() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, json) = call(
        &make_router(&dir),
        post("/api/rebalance", sample_holdings()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalValue"], 1_000_000.0);
    assert_eq!(json["currentAllocation"]["equity"], 20.0);
    assert_eq!(json["targetAllocation"]["equity"], 65.0);

    let recs = json["recommendations"].as_array().expect("array");
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0]["fundId"], "GPF-FI");
    assert_eq!(recs[0]["action"], "sell");
    assert_eq!(recs[1]["action"], "buy");
    let first = recs[0]["amount"].as_f64().expect("amount");
    let second = recs[1]["amount"].as_f64().expect("amount");
    assert!(first >= second);

    let total = json["impact"]["totalAdjustment"].as_f64().expect("total");
    assert!((total - (first + second)).abs() < 1e-6);
}

#[tokio::test]
async fn rebalance_without_positions_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, json) = call(&make_router(&dir), post("/api/rebalance", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().expect("message").contains("required"));
}

#[tokio::test]
async fn retirement_projection_over_query_and_body() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = make_router(&dir);

    let (status, json) = call(
        &router,
        get("/api/retirement?currentAge=30&retirementAge=40&riskLevel=low"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["plan"]["projection"].as_array().expect("array").len(), 11);
    assert_eq!(json["scenarios"]["volatility"], 0.03);
    assert_eq!(json["scenarios"]["points"][10]["age"], 40);

    let (status, json) = call(
        &router,
        post(
            "/api/retirement",
            json!({
                "currentAge": 35,
                "retirementAge": 60,
                "currentSavings": 0,
                "monthlyContribution": 1000,
                "expectedReturn": 0
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["plan"]["finalValue"], 300_000.0);
    assert_eq!(json["plan"]["targetRetirementFund"], 9_000_000.0);
    assert_eq!(json["plan"]["readinessScore"], 3);
}

#[tokio::test]
async fn retirement_rejects_inverted_ages() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, json) = call(
        &make_router(&dir),
        get("/api/retirement?currentAge=60&retirementAge=50"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        json["error"]
            .as_str()
            .expect("message")
            .contains("--retirement-age")
    );
}

#[tokio::test]
async fn plan_catalogue_and_simulation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = make_router(&dir);

    let (status, json) = call(&router, get("/api/plans")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().expect("array").len(), 6);

    let (status, json) = call(&router, get("/api/plans/simulate?plans=gold&years=3")).await;
    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().expect("array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["planId"], "gold");
    assert_eq!(results[0]["forward"].as_array().expect("array").len(), 4);
    assert_eq!(results[0]["backtest"].as_array().expect("array").len(), 6);

    let (status, _) = call(
        &router,
        post("/api/plans/simulate", json!({"plans": "bitcoin"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn executed_rebalances_are_listed_newest_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = make_router(&dir);

    let (status, json) = call(&router, get("/api/transactions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));

    let (_, rebalance) = call(&router, post("/api/rebalance", sample_holdings())).await;
    let recommendations = rebalance["recommendations"].clone();

    let (status, first) = call(
        &router,
        post(
            "/api/transactions",
            json!({ "recommendations": recommendations }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "completed");
    assert_eq!(first["actions"].as_array().expect("array").len(), 2);
    let total = first["totalAmount"].as_f64().expect("total");
    assert!((total - 1_000_000.0).abs() < 1e-6);

    let (status, second) = call(
        &router,
        post(
            "/api/transactions",
            json!({ "recommendations": [recommendations[1].clone()] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(first["id"], second["id"]);

    let (status, history) = call(&router, get("/api/transactions")).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().expect("array");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["id"], second["id"]);
    assert_eq!(history[1]["id"], first["id"]);
}

#[tokio::test]
async fn transaction_with_only_holds_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let hold = json!({
        "fundId": "gold",
        "fundName": "Gold",
        "assetClass": "alternative",
        "currentAllocation": 5.0,
        "targetAllocation": 5.0,
        "action": "hold",
        "amount": 0.0,
        "reason": "on target"
    });
    let (status, json) = call(
        &make_router(&dir),
        post("/api/transactions", json!({ "recommendations": [hold] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().expect("message").contains("no buy or sell"));
}

#[tokio::test]
async fn rejected_amounts_leave_history_readable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = make_router(&dir);

    let (status, json) = call(
        &router,
        post(
            "/api/transactions",
            json!({ "recommendations": [buy("eq", -500.0)] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().expect("message").contains(">= 0"));

    let (status, json) = call(
        &router,
        post(
            "/api/transactions",
            json!({ "recommendations": [buy("eq1", 1.7e308), buy("eq2", 1.7e308)] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().expect("message").contains("finite"));

    let (status, created) = call(
        &router,
        post(
            "/api/transactions",
            json!({ "recommendations": [buy("eq", 250.0)] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, history) = call(&router, get("/api/transactions")).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().expect("array");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], created["id"]);
    assert_eq!(history[0]["totalAmount"], 250.0);
}
