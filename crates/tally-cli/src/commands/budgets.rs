//! Budget command implementations

use anyhow::Result;
use chrono::{Datelike, Utc};
use tally_core::db::Database;
use tally_core::models::{Budget, BudgetUpsert};
use tally_core::{analytics, validation};

use super::{money, parse_user};

/// Month and year, each defaulting to the current one
fn resolve_period(month: Option<u32>, year: Option<i32>) -> Result<(u32, i32)> {
    let today = Utc::now().date_naive();
    let month = month.unwrap_or_else(|| today.month());
    let year = year.unwrap_or_else(|| today.year());
    validation::ensure_month(month)?;
    validation::ensure_year(year)?;
    Ok((month, year))
}

pub fn cmd_budgets_list(
    db: &Database,
    month: Option<u32>,
    year: Option<i32>,
    user: &str,
) -> Result<()> {
    let (month, year) = resolve_period(month, year)?;
    let user_id = parse_user(user)?;
    let budgets = db.list_budgets(&user_id, month, year)?;

    if budgets.is_empty() {
        println!(
            "No budgets for {} {}. Set one with:",
            analytics::month_name(month),
            year
        );
        println!("  tally budgets set Food 400");
        return Ok(());
    }

    println!();
    println!("💰 Budgets for {} {}", analytics::month_name(month), year);
    println!("   ─────────────────────────────────────");

    for budget in &budgets {
        println!(
            "   [{}] {:<13} │ {:>10}",
            budget.id,
            budget.category.as_str(),
            money(budget.amount)
        );
    }

    let total: f64 = budgets.iter().map(|b| b.amount).sum();
    println!("   ─────────────────────────────────────");
    println!("   {:<18} │ {:>10}", "Total", money(total));

    Ok(())
}

pub fn cmd_budgets_set(
    db: &Database,
    category: &str,
    amount: f64,
    month: Option<u32>,
    year: Option<i32>,
    user: &str,
) -> Result<Budget> {
    let (month, year) = resolve_period(month, year)?;

    let budget = db.upsert_budget(&BudgetUpsert {
        user_id: parse_user(user)?,
        category: validation::parse_category(category)?,
        month,
        year,
        amount,
    })?;

    println!(
        "✅ {} budget for {} {} set to {}",
        budget.category,
        analytics::month_name(budget.month),
        budget.year,
        money(budget.amount)
    );

    Ok(budget)
}

pub fn cmd_budgets_delete(db: &Database, id: i64) -> Result<()> {
    let budget = db.get_budget(id)?;
    db.delete_budget(id)?;

    println!(
        "🗑️  Deleted {} budget for {} {}",
        budget.category,
        analytics::month_name(budget.month),
        budget.year
    );

    Ok(())
}
