//! Report command implementations

use anyhow::{Context, Result};
use serde::Serialize;
use tally_core::db::Database;
use tally_core::models::InsightStatus;
use tally_core::{analytics, validation};

use super::{money, parse_user, truncate};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

/// Simple text bar scaled to `width` characters at 100%
fn bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    "█".repeat(filled)
}

pub fn cmd_report_dashboard(db: &Database, user: &str, json: bool) -> Result<()> {
    let summary = db.dashboard_summary(&parse_user(user)?)?;

    if json {
        return print_json(&summary);
    }

    println!();
    println!(
        "📊 Tally Dashboard: {} {}",
        analytics::month_name(summary.month),
        summary.year
    );
    println!("   ─────────────────────────────");
    println!("   Spent:        {}", money(summary.total_expenses));
    println!("   Budgeted:     {}", money(summary.total_budget));
    println!("   Transactions: {}", summary.transaction_count);
    if let Some(top) = &summary.top_category {
        println!("   Top category: {} ({})", top.category, money(top.amount));
    }

    if !summary.recent_transactions.is_empty() {
        println!();
        println!("   Recent:");
        for tx in &summary.recent_transactions {
            println!(
                "   {} │ {:>10} │ {}",
                tx.date,
                money(tx.amount),
                truncate(&tx.description, 40)
            );
        }
    }

    Ok(())
}

pub fn cmd_report_monthly(db: &Database, months: u32, user: &str, json: bool) -> Result<()> {
    validation::ensure_months_back(months)?;
    let expenses = db.monthly_expenses(&parse_user(user)?, months)?;

    if json {
        return print_json(&expenses);
    }

    if expenses.is_empty() {
        println!("No spending in the last {} months.", months);
        return Ok(());
    }

    let peak = expenses
        .iter()
        .map(|m| m.total_expenses)
        .fold(0.0_f64, f64::max);

    println!();
    println!("📈 Monthly Spending (last {} months)", months);
    println!("   ─────────────────────────────────────────────");
    for month in &expenses {
        let share = if peak > 0.0 {
            month.total_expenses / peak * 100.0
        } else {
            0.0
        };
        println!(
            "   {} {} │ {:>10} │ {:>4} tx │ {}",
            month.month_name,
            month.year,
            money(month.total_expenses),
            month.transaction_count,
            bar(share, 20)
        );
    }

    Ok(())
}

pub fn cmd_report_categories(
    db: &Database,
    from: Option<&str>,
    to: Option<&str>,
    user: &str,
    json: bool,
) -> Result<()> {
    let range = validation::parse_date_range(from, to)?;
    let report = db.category_breakdown(&parse_user(user)?, range)?;

    if json {
        return print_json(&report);
    }

    if report.categories.is_empty() {
        println!("No spending in this period.");
        return Ok(());
    }

    println!();
    println!("🗂️  Spending by Category");
    println!("   ─────────────────────────────────────────────────────────");
    for c in &report.categories {
        println!(
            "   {:<13} │ {:>10} │ {:>6.2}% │ {:>4} tx │ avg {}",
            c.category.as_str(),
            money(c.total_amount),
            c.percentage,
            c.transaction_count,
            money(c.avg_amount)
        );
    }
    println!("   ─────────────────────────────────────────────────────────");
    println!("   {:<13} │ {:>10}", "Total", money(report.total));

    Ok(())
}

pub fn cmd_report_insights(db: &Database, user: &str, json: bool) -> Result<()> {
    let insights = db.budget_insights(&parse_user(user)?)?;

    if json {
        return print_json(&insights);
    }

    if insights.is_empty() {
        println!("No budgets set for this month. Set one with:");
        println!("  tally budgets set Food 400");
        return Ok(());
    }

    println!();
    println!("🎯 Budget Insights");
    println!("   ─────────────────────────────────────────────────────────");
    for insight in &insights {
        let icon = match insight.status {
            InsightStatus::Over => "🔴",
            InsightStatus::Under => "🟢",
            InsightStatus::Good => "🟡",
        };
        println!(
            "   {} {:<13} │ {:>10} of {:>10} │ {:>6.1}% │ {}",
            icon,
            insight.category.as_str(),
            money(insight.actual),
            money(insight.budget),
            insight.percentage,
            insight.status
        );
    }

    Ok(())
}
