//! Integration tests for tally-core
//!
//! These tests exercise the full validate → store → report workflow through
//! the public API only.

use chrono::NaiveDate;
use tally_core::{
    db::Database,
    models::{Category, InsightStatus, UserId},
    validation::{
        BudgetInput, NewTransactionInput, NumericInput, TransactionListParams,
        TransactionUpdateInput, DEFAULT_MAX_PAGE_LIMIT,
    },
    Error,
};

fn default_user() -> UserId {
    UserId::new("default-user").unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tx_input(amount: f64, day: &str, description: &str, category: &str) -> NewTransactionInput {
    NewTransactionInput {
        amount: Some(NumericInput::Number(amount)),
        date: Some(day.to_string()),
        description: Some(description.to_string()),
        category: Some(category.to_string()),
        user_id: None,
    }
}

/// A month of spending for the default user
fn seed_june(db: &Database) {
    let rows = [
        (1200.0, "2024-06-01", "Rent", "Housing"),
        (54.20, "2024-06-03", "Groceries", "food"),
        (12.80, "2024-06-04", "Lunch", "Food"),
        (45.00, "2024-06-07", "Train pass", "transport"),
        (89.99, "2024-06-12", "Headphones", "Shopping"),
        (60.00, "2024-06-15", "Electric bill", "Utilities"),
        (23.50, "2024-06-21", "Cinema", "Entertainment"),
        (300.00, "2024-05-28", "Dentist", "Healthcare"),
    ];
    for (amount, day, description, category) in rows {
        let tx = tx_input(amount, day, description, category)
            .validate(&default_user())
            .expect("valid input");
        db.insert_transaction(&tx).expect("insert");
    }
}

// =============================================================================
// Workflow Tests
// =============================================================================

#[test]
fn test_full_tracking_workflow() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    seed_june(&db);

    let today = date(2024, 6, 25);
    for (category, amount) in [("Food", 100.0), ("Housing", 1200.0), ("Shopping", 200.0)] {
        let input = BudgetInput {
            category: Some(category.to_string()),
            amount: Some(NumericInput::Number(amount)),
            ..Default::default()
        };
        db.upsert_budget(&input.validate(&default_user(), today).unwrap())
            .unwrap();
    }

    // List: June only, newest first
    let params = TransactionListParams {
        start_date: Some("2024-06-01".into()),
        end_date: Some("2024-06-30".into()),
        ..Default::default()
    };
    let query = params.validate(&default_user(), DEFAULT_MAX_PAGE_LIMIT).unwrap();
    let (rows, total) = db
        .query_transactions(&query.filter, query.limit, query.offset())
        .unwrap();
    assert_eq!(total, 7);
    assert_eq!(rows[0].description, "Cinema");

    // Dashboard
    let summary = db.dashboard_summary_on(&default_user(), today).unwrap();
    assert!((summary.total_expenses - 1485.49).abs() < 1e-9);
    assert_eq!(summary.transaction_count, 7);
    assert_eq!(summary.total_budget, 1500.0);
    assert_eq!(summary.top_category.unwrap().category, Category::Housing);

    // Insights, in category order
    let insights = db.budget_insights_on(&default_user(), today).unwrap();
    let statuses: Vec<(Category, InsightStatus)> =
        insights.iter().map(|i| (i.category, i.status)).collect();
    assert_eq!(
        statuses,
        vec![
            (Category::Food, InsightStatus::Under),
            (Category::Housing, InsightStatus::Good),
            (Category::Shopping, InsightStatus::Under),
        ]
    );

    // Trend covers May and June
    let months = db.monthly_expenses_on(&default_user(), 6, today).unwrap();
    let names: Vec<&str> = months.iter().map(|m| m.month_name.as_str()).collect();
    assert_eq!(names, vec!["May", "Jun"]);
}

#[test]
fn test_edit_moves_spending_between_categories() {
    let db = Database::in_memory().unwrap();
    let created = db
        .insert_transaction(
            &tx_input(40.0, "2024-06-10", "Taxi", "Food")
                .validate(&default_user())
                .unwrap(),
        )
        .unwrap();

    let update = TransactionUpdateInput {
        category: Some("Transport".into()),
        ..Default::default()
    };
    db.update_transaction(created.id, &update.validate().unwrap())
        .unwrap();

    let report = db
        .category_breakdown(&default_user(), Default::default())
        .unwrap();
    assert_eq!(report.categories.len(), 1);
    assert_eq!(report.categories[0].category, Category::Transport);
    assert_eq!(report.categories[0].percentage, 100.0);
}

#[test]
fn test_users_are_isolated() {
    let db = Database::in_memory().unwrap();
    seed_june(&db);

    let mut other = tx_input(5.0, "2024-06-10", "Coffee", "Food");
    other.user_id = Some("someone-else".into());
    db.insert_transaction(&other.validate(&default_user()).unwrap())
        .unwrap();

    let someone = UserId::new("someone-else").unwrap();
    let summary = db.dashboard_summary_on(&someone, date(2024, 6, 25)).unwrap();
    assert_eq!(summary.transaction_count, 1);
    assert_eq!(summary.total_expenses, 5.0);
    assert_eq!(summary.total_budget, 0.0);
}

#[test]
fn test_invalid_input_never_reaches_store() {
    let db = Database::in_memory().unwrap();

    let err = tx_input(10.0, "2024-06-10", "Book", "Education")
        .validate(&default_user())
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert!(err.is_client_error());

    let report = db
        .category_breakdown(&default_user(), Default::default())
        .unwrap();
    assert!(report.categories.is_empty());
}
