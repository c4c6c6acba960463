//! Budget operations

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{column_category, column_datetime, Database, NOW_SQL};
use crate::error::{Error, Result};
use crate::models::{Budget, BudgetUpsert, UserId};
use crate::validation;

/// Columns read by `row_to_budget`, in order
const BUDGET_COLUMNS: &str = "id, user_id, category, amount, month, year, created_at, updated_at";

impl Database {
    /// Create the budget for (user, category, month, year) or replace its amount
    ///
    /// Runs as one `INSERT ... ON CONFLICT DO UPDATE` statement, so concurrent
    /// upserts of the same tuple leave a single row holding the last amount.
    pub fn upsert_budget(&self, budget: &BudgetUpsert) -> Result<Budget> {
        validation::ensure_budget_amount(budget.amount)?;
        validation::ensure_month(budget.month)?;
        validation::ensure_year(budget.year)?;

        let conn = self.conn()?;
        let sql = format!(
            r#"
            INSERT INTO budgets (user_id, category, month, year, amount)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id, category, month, year)
            DO UPDATE SET amount = excluded.amount, updated_at = {}
            RETURNING {}
            "#,
            NOW_SQL, BUDGET_COLUMNS
        );

        let stored = conn.query_row(
            &sql,
            params![
                budget.user_id.as_str(),
                budget.category.as_str(),
                budget.month,
                budget.year,
                budget.amount,
            ],
            Self::row_to_budget,
        )?;

        debug!(
            id = stored.id,
            user = %budget.user_id,
            category = %budget.category,
            month = budget.month,
            year = budget.year,
            "Saved budget"
        );
        Ok(stored)
    }

    /// Get a single budget by ID
    pub fn get_budget(&self, id: i64) -> Result<Budget> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM budgets WHERE id = ?", BUDGET_COLUMNS);

        conn.query_row(&sql, params![id], Self::row_to_budget)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Budget {}", id)))
    }

    /// Replace the amount of an existing budget
    pub fn update_budget_amount(&self, id: i64, amount: f64) -> Result<Budget> {
        validation::ensure_budget_amount(amount)?;

        let conn = self.conn()?;
        let sql = format!(
            "UPDATE budgets SET amount = ?1, updated_at = {} WHERE id = ?2 RETURNING {}",
            NOW_SQL, BUDGET_COLUMNS
        );

        let budget = conn
            .query_row(&sql, params![amount, id], Self::row_to_budget)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Budget {}", id)))?;

        debug!(id, amount, "Updated budget amount");
        Ok(budget)
    }

    /// Permanently delete a budget
    pub fn delete_budget(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM budgets WHERE id = ?", params![id])?;
        if affected == 0 {
            return Err(Error::NotFound(format!("Budget {}", id)));
        }

        debug!(id, "Deleted budget");
        Ok(())
    }

    /// Budgets for one month, sorted by category name
    pub fn list_budgets(&self, user_id: &UserId, month: u32, year: i32) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM budgets
            WHERE user_id = ?1 AND month = ?2 AND year = ?3
            ORDER BY category ASC
            "#,
            BUDGET_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let budgets = stmt
            .query_map(params![user_id.as_str(), month, year], Self::row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    /// Sum of all budget amounts for one month
    pub fn total_budget(&self, user_id: &UserId, month: u32, year: i32) -> Result<f64> {
        let conn = self.conn()?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM budgets WHERE user_id = ?1 AND month = ?2 AND year = ?3",
            params![user_id.as_str(), month, year],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    pub(crate) fn row_to_budget(row: &rusqlite::Row) -> rusqlite::Result<Budget> {
        let user_id: String = row.get(1)?;
        Ok(Budget {
            id: row.get(0)?,
            user_id: UserId::new(&user_id).ok_or(rusqlite::Error::InvalidColumnType(
                1,
                "user_id".to_string(),
                rusqlite::types::Type::Text,
            ))?,
            category: column_category(row, 2)?,
            amount: row.get(3)?,
            month: row.get(4)?,
            year: row.get(5)?,
            created_at: column_datetime(row, 6)?,
            updated_at: column_datetime(row, 7)?,
        })
    }
}
