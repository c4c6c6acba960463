//! Transaction command implementations

use anyhow::Result;
use chrono::Utc;
use tally_core::db::{Database, TransactionFilter};
use tally_core::models::{NewTransaction, Transaction};
use tally_core::validation;

use super::{money, parse_user, truncate};

/// Record a transaction; `date` defaults to today
pub fn cmd_add(
    db: &Database,
    amount: f64,
    date: Option<&str>,
    description: &str,
    category: &str,
    user: &str,
) -> Result<Transaction> {
    let date = match date {
        Some(d) => validation::parse_date(d, "date")?,
        None => Utc::now().date_naive(),
    };

    let tx = db.insert_transaction(&NewTransaction {
        amount,
        date,
        description: description.to_string(),
        category: validation::parse_category(category)?,
        user_id: parse_user(user)?,
    })?;

    println!(
        "✅ Recorded [{}] {} │ {} │ {} │ {}",
        tx.id,
        tx.date,
        money(tx.amount),
        tx.category,
        tx.description
    );

    Ok(tx)
}

pub fn cmd_transactions_list(
    db: &Database,
    limit: i64,
    category: Option<&str>,
    user: &str,
) -> Result<()> {
    let category = category.map(validation::parse_category).transpose()?;
    let filter = TransactionFilter::for_user(parse_user(user)?).category(category);
    let (transactions, total) = db.query_transactions(&filter, limit.max(1), 0)?;

    if transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!("  tally add --amount 12.50 --description Lunch --category Food");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions ({} of {})", transactions.len(), total);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        println!(
            "   [{}] {} │ {:>10} │ {:<13} │ {}",
            tx.id,
            tx.date,
            money(tx.amount),
            tx.category.as_str(),
            truncate(&tx.description, 35)
        );
    }

    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, id: i64) -> Result<()> {
    let tx = db.get_transaction(id)?;
    db.delete_transaction(id)?;

    println!(
        "🗑️  Deleted transaction {}: {} {}",
        id,
        money(tx.amount),
        truncate(&tx.description, 40)
    );

    Ok(())
}
