//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Datelike, Utc};
use http_body_util::BodyExt;
use tally_core::models::{BudgetUpsert, Category, NewTransaction};
use tempfile::TempDir;
use tower::ServiceExt;

fn setup_test_app() -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    let app = create_router(db.clone(), None, ServerConfig::default());
    (app, db)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn delete(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

fn seed_transaction(db: &Database, user: &str, amount: f64, category: Category) -> i64 {
    db.insert_transaction(&NewTransaction {
        amount,
        date: Utc::now().date_naive(),
        description: format!("{} spend", category),
        category,
        user_id: UserId::new(user).unwrap(),
    })
    .unwrap()
    .id
}

// ========== Envelope & Routing Tests ==========

#[tokio::test]
async fn test_health() {
    let (app, _db) = setup_test_app();

    let response = get(&app, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "ok");
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn test_unknown_api_route_uses_envelope() {
    let (app, _db) = setup_test_app();

    let response = get(&app, "/api/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_security_headers() {
    let (app, _db) = setup_test_app();

    let response = get(&app, "/api/health").await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_serves_static_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>tally</h1>").unwrap();

    let db = Database::in_memory().unwrap();
    let app = create_router(
        db,
        Some(dir.path().to_str().unwrap()),
        ServerConfig::default(),
    );

    let response = get(&app, "/index.html").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<h1>tally</h1>");

    // API routes still win over the static fallback
    let response = get(&app, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ========== Transaction API Tests ==========

#[tokio::test]
async fn test_create_transaction() {
    let (app, _db) = setup_test_app();

    let body = serde_json::json!({
        "amount": 12.5,
        "date": "2024-03-05",
        "description": "  Coffee beans ",
        "category": "Food"
    });
    let response = send_json(&app, "POST", "/api/transactions", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Transaction created successfully");
    assert_eq!(json["data"]["amount"], 12.5);
    assert_eq!(json["data"]["date"], "2024-03-05");
    assert_eq!(json["data"]["description"], "Coffee beans");
    assert_eq!(json["data"]["category"], "Food");
    assert_eq!(json["data"]["userId"], "default-user");
    assert!(json["data"]["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_transaction_accepts_string_amount() {
    let (app, _db) = setup_test_app();

    let body = serde_json::json!({
        "amount": "19.99",
        "date": "2024-03-05",
        "description": "Movie",
        "category": "entertainment",
        "userId": "alice"
    });
    let response = send_json(&app, "POST", "/api/transactions", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["data"]["amount"], 19.99);
    assert_eq!(json["data"]["category"], "Entertainment");
    assert_eq!(json["data"]["userId"], "alice");
}

#[tokio::test]
async fn test_create_transaction_validation() {
    let (app, db) = setup_test_app();

    let cases = [
        (
            serde_json::json!({"amount": 0, "date": "2024-03-05", "description": "x", "category": "Food"}),
            "amount",
        ),
        (
            serde_json::json!({"date": "2024-03-05", "description": "x", "category": "Food"}),
            "amount",
        ),
        (
            serde_json::json!({"amount": 5, "date": "2024-03-05", "description": "x", "category": "Travel"}),
            "category",
        ),
        (
            serde_json::json!({"amount": 5, "date": "not-a-date", "description": "x", "category": "Food"}),
            "date",
        ),
        (
            serde_json::json!({"amount": 5, "date": "+12345-06-01", "description": "x", "category": "Food"}),
            "date",
        ),
        (
            serde_json::json!({"amount": 5, "date": "-0001-06-01", "description": "x", "category": "Food"}),
            "date",
        ),
        (
            serde_json::json!({"amount": 5, "date": "2024-03-05", "description": "   ", "category": "Food"}),
            "description",
        ),
    ];

    for (body, field) in cases {
        let response = send_json(&app, "POST", "/api/transactions", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = get_body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["field"], field);
    }

    let filter = tally_core::TransactionFilter::for_user(UserId::default());
    assert_eq!(db.count_transactions(&filter).unwrap(), 0);
}

#[tokio::test]
async fn test_create_transaction_malformed_json() {
    let (app, _db) = setup_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/transactions")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Invalid JSON");
}

#[tokio::test]
async fn test_list_transactions_pagination() {
    let (app, db) = setup_test_app();
    for i in 0..5 {
        seed_transaction(&db, "default-user", 10.0 + i as f64, Category::Food);
    }
    seed_transaction(&db, "someone-else", 99.0, Category::Food);

    let response = get(&app, "/api/transactions?limit=2&page=2").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["pagination"]["page"], 2);
    assert_eq!(json["pagination"]["limit"], 2);
    assert_eq!(json["pagination"]["total"], 5);
    assert_eq!(json["pagination"]["pages"], 3);
}

#[tokio::test]
async fn test_list_transactions_filters() {
    let (app, db) = setup_test_app();
    seed_transaction(&db, "alice", 10.0, Category::Food);
    seed_transaction(&db, "alice", 20.0, Category::Transport);

    let response = get(&app, "/api/transactions?userId=alice&category=transport").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["category"], "Transport");
}

#[tokio::test]
async fn test_list_transactions_rejects_bad_params() {
    let (app, _db) = setup_test_app();

    for uri in [
        "/api/transactions?limit=abc",
        "/api/transactions?category=Travel",
        "/api/transactions?startDate=2024-02-01&endDate=2024-01-01",
        "/api/transactions?startDate=yesterday",
        "/api/transactions?endDate=%2B12345-01-01",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let json = get_body_json(response).await;
        assert_eq!(json["success"], false);
    }
}

#[tokio::test]
async fn test_list_transactions_clamps_limit() {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        max_page_limit: 3,
        ..Default::default()
    };
    let app = create_router(db, None, config);

    let response = get(&app, "/api/transactions?limit=500").await;
    let json = get_body_json(response).await;
    assert_eq!(json["pagination"]["limit"], 3);
}

#[tokio::test]
async fn test_transaction_get_update_delete() {
    let (app, db) = setup_test_app();
    let id = seed_transaction(&db, "default-user", 40.0, Category::Food);

    let response = get(&app, &format!("/api/transactions/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["id"], id);

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/transactions/{}", id),
        serde_json::json!({"amount": 55.5, "category": "Shopping"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Transaction updated successfully");
    assert_eq!(json["data"]["amount"], 55.5);
    assert_eq!(json["data"]["category"], "Shopping");

    let response = delete(&app, &format!("/api/transactions/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Transaction deleted successfully");

    let response = get(&app, &format!("/api/transactions/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transaction_invalid_and_missing_ids() {
    let (app, _db) = setup_test_app();

    let response = get(&app, "/api/transactions/not-an-id").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete(&app, "/api/transactions/0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete(&app, "/api/transactions/4242").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);

    let response = send_json(
        &app,
        "PUT",
        "/api/transactions/4242",
        serde_json::json!({"amount": 1}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_transaction_rejects_bad_amount() {
    let (app, db) = setup_test_app();
    let id = seed_transaction(&db, "default-user", 40.0, Category::Food);

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/transactions/{}", id),
        serde_json::json!({"amount": -3}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(db.get_transaction(id).unwrap().amount, 40.0);
}

// ========== Budget API Tests ==========

#[tokio::test]
async fn test_save_budget_defaults_to_current_month() {
    let (app, _db) = setup_test_app();
    let today = Utc::now().date_naive();

    let response = send_json(
        &app,
        "POST",
        "/api/budgets",
        serde_json::json!({"category": "Food", "amount": 300}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Budget saved successfully");
    assert_eq!(json["data"]["month"], today.month());
    assert_eq!(json["data"]["year"], today.year());
    assert_eq!(json["data"]["amount"], 300.0);
}

#[tokio::test]
async fn test_save_budget_twice_upserts() {
    let (app, db) = setup_test_app();
    let body = |amount: f64| {
        serde_json::json!({"category": "Food", "amount": amount, "month": 3, "year": 2024})
    };

    let first = get_body_json(send_json(&app, "POST", "/api/budgets", body(100.0)).await).await;
    let second = get_body_json(send_json(&app, "POST", "/api/budgets", body(250.0)).await).await;
    assert_eq!(first["data"]["id"], second["data"]["id"]);

    let budgets = db.list_budgets(&UserId::default(), 3, 2024).unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].amount, 250.0);

    let response = get(&app, "/api/budgets?month=3&year=2024").await;
    let json = get_body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_save_budget_validation() {
    let (app, _db) = setup_test_app();

    for (body, field) in [
        (serde_json::json!({"category": "Food", "amount": -1}), "amount"),
        (serde_json::json!({"category": "Pets", "amount": 10}), "category"),
        (serde_json::json!({"amount": 10}), "category"),
        (
            serde_json::json!({"category": "Food", "amount": 10, "month": 13}),
            "month",
        ),
        (
            serde_json::json!({"category": "Food", "amount": 10, "year": 2019}),
            "year",
        ),
    ] {
        let response = send_json(&app, "POST", "/api/budgets", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = get_body_json(response).await;
        assert_eq!(json["field"], field);
    }
}

#[tokio::test]
async fn test_list_budgets_sorted_by_category() {
    let (app, db) = setup_test_app();
    for category in [Category::Utilities, Category::Food, Category::Entertainment] {
        db.upsert_budget(&BudgetUpsert {
            user_id: UserId::default(),
            category,
            month: 5,
            year: 2024,
            amount: 50.0,
        })
        .unwrap();
    }

    let response = get(&app, "/api/budgets?month=5&year=2024").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let categories: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["Entertainment", "Food", "Utilities"]);

    let response = get(&app, "/api/budgets?month=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_delete_budget() {
    let (app, db) = setup_test_app();
    let budget = db
        .upsert_budget(&BudgetUpsert {
            user_id: UserId::default(),
            category: Category::Housing,
            month: 5,
            year: 2024,
            amount: 1000.0,
        })
        .unwrap();

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/budgets/{}", budget.id),
        serde_json::json!({"amount": 1100}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["amount"], 1100.0);

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/budgets/{}", budget.id),
        serde_json::json!({"amount": -5}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete(&app, &format!("/api/budgets/{}", budget.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Budget deleted successfully");

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/budgets/{}", budget.id),
        serde_json::json!({"amount": 10}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(&app, "/api/budgets/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Analytics API Tests ==========

#[tokio::test]
async fn test_category_breakdown() {
    let (app, db) = setup_test_app();
    seed_transaction(&db, "default-user", 100.0, Category::Food);
    seed_transaction(&db, "default-user", 50.0, Category::Food);
    seed_transaction(&db, "default-user", 30.0, Category::Transport);

    let response = get(&app, "/api/analytics/category-breakdown").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["total"], 180.0);

    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["category"], "Food");
    assert_eq!(data[0]["totalAmount"], 150.0);
    assert_eq!(data[0]["transactionCount"], 2);
    assert_eq!(data[0]["avgAmount"], 75.0);
    assert_eq!(data[0]["percentage"], 83.33);
    assert_eq!(data[1]["percentage"], 16.67);
}

#[tokio::test]
async fn test_category_breakdown_rejects_inverted_range() {
    let (app, _db) = setup_test_app();

    let response = get(
        &app,
        "/api/analytics/category-breakdown?startDate=2024-05-01&endDate=2024-04-01",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_monthly_expenses() {
    let (app, db) = setup_test_app();
    seed_transaction(&db, "default-user", 25.0, Category::Food);

    let response = get(&app, "/api/analytics/monthly-expenses?months=2").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["totalExpenses"], 25.0);
    assert_eq!(data[0]["transactionCount"], 1);
    assert!(data[0]["monthName"].is_string());

    let response = get(&app, "/api/analytics/monthly-expenses?months=zero").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard() {
    let (app, db) = setup_test_app();
    let today = Utc::now().date_naive();
    seed_transaction(&db, "default-user", 80.0, Category::Housing);
    seed_transaction(&db, "default-user", 20.0, Category::Food);
    db.upsert_budget(&BudgetUpsert {
        user_id: UserId::default(),
        category: Category::Food,
        month: today.month(),
        year: today.year(),
        amount: 200.0,
    })
    .unwrap();

    let response = get(&app, "/api/analytics/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["totalExpenses"], 100.0);
    assert_eq!(data["transactionCount"], 2);
    assert_eq!(data["totalBudget"], 200.0);
    assert_eq!(data["topCategory"]["category"], "Housing");
    assert_eq!(data["recentTransactions"].as_array().unwrap().len(), 2);
    assert_eq!(data["month"], today.month());
}

#[tokio::test]
async fn test_insights() {
    let (app, db) = setup_test_app();
    let today = Utc::now().date_naive();
    seed_transaction(&db, "default-user", 130.0, Category::Food);
    db.upsert_budget(&BudgetUpsert {
        user_id: UserId::default(),
        category: Category::Food,
        month: today.month(),
        year: today.year(),
        amount: 100.0,
    })
    .unwrap();

    let response = get(&app, "/api/analytics/insights").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["category"], "Food");
    assert_eq!(data[0]["difference"], 30.0);
    assert_eq!(data[0]["status"], "over");
}

#[tokio::test]
async fn test_configured_default_user() {
    let db = Database::in_memory().unwrap();
    seed_transaction(&db, "household", 10.0, Category::Utilities);
    let config = ServerConfig {
        default_user: UserId::new("household").unwrap(),
        ..Default::default()
    };
    let app = create_router(db, None, config);

    let response = get(&app, "/api/transactions").await;
    let json = get_body_json(response).await;
    assert_eq!(json["pagination"]["total"], 1);
}

// ========== Unit Tests ==========

#[test]
fn test_pagination_pages() {
    assert_eq!(Pagination::new(1, 100, 0).pages, 0);
    assert_eq!(Pagination::new(1, 100, 100).pages, 1);
    assert_eq!(Pagination::new(1, 100, 101).pages, 2);
}

#[test]
fn test_parse_origins() {
    assert_eq!(
        parse_origins(" http://localhost:5173, ,https://tally.example "),
        vec!["http://localhost:5173", "https://tally.example"]
    );
    assert!(parse_origins("").is_empty());
}
