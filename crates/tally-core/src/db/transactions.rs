//! Transaction operations

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::transaction_filter::TransactionFilter;
use super::{column_category, column_date, column_datetime, Database, DbConn, NOW_SQL};
use crate::error::{Error, Result};
use crate::models::{
    CategoryTotalRow, MonthTotalRow, NewTransaction, Transaction, TransactionUpdate, UserId,
};
use crate::validation;

/// Columns read by `row_to_transaction`, in order
const TRANSACTION_COLUMNS: &str =
    "id, user_id, amount, date, description, category, created_at, updated_at";

/// Newest first; creation time then id break ties between same-day entries
const DEFAULT_ORDER: &str = "ORDER BY t.date DESC, t.created_at DESC, t.id DESC";

impl Database {
    /// Insert a transaction and return the stored row
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        validation::ensure_transaction_amount(tx.amount)?;
        validation::ensure_date(tx.date, "date")?;
        let description = validation::normalize_description(&tx.description)?;

        let conn = self.conn()?;
        let sql = format!(
            r#"
            INSERT INTO transactions (user_id, amount, date, description, category)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        );

        let transaction = conn.query_row(
            &sql,
            params![
                tx.user_id.as_str(),
                tx.amount,
                tx.date.to_string(),
                description,
                tx.category.as_str(),
            ],
            Self::row_to_transaction,
        )?;

        debug!(id = transaction.id, user = %tx.user_id, "Inserted transaction");
        Ok(transaction)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Transaction> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions t WHERE t.id = ?",
            TRANSACTION_COLUMNS
        );

        conn.query_row(&sql, params![id], Self::row_to_transaction)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))
    }

    /// Apply a partial edit; fields left as `None` keep their stored value
    pub fn update_transaction(&self, id: i64, update: &TransactionUpdate) -> Result<Transaction> {
        if let Some(amount) = update.amount {
            validation::ensure_transaction_amount(amount)?;
        }
        if let Some(date) = update.date {
            validation::ensure_date(date, "date")?;
        }
        let description = update
            .description
            .as_deref()
            .map(validation::normalize_description)
            .transpose()?;

        let conn = self.conn()?;
        let sql = format!(
            r#"
            UPDATE transactions SET
                amount = COALESCE(?1, amount),
                date = COALESCE(?2, date),
                description = COALESCE(?3, description),
                category = COALESCE(?4, category),
                updated_at = {}
            WHERE id = ?5
            RETURNING {}
            "#,
            NOW_SQL, TRANSACTION_COLUMNS
        );

        let transaction = conn
            .query_row(
                &sql,
                params![
                    update.amount,
                    update.date.map(|d| d.to_string()),
                    description,
                    update.category.map(|c| c.as_str()),
                    id,
                ],
                Self::row_to_transaction,
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))?;

        debug!(id, "Updated transaction");
        Ok(transaction)
    }

    /// Permanently delete a transaction
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        if affected == 0 {
            return Err(Error::NotFound(format!("Transaction {}", id)));
        }

        debug!(id, "Deleted transaction");
        Ok(())
    }

    /// Page through transactions matching `filter`, newest first
    ///
    /// Returns the page together with the total number of matching rows.
    pub fn query_transactions(
        &self,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Transaction>, i64)> {
        let conn = self.conn()?;
        let transactions = Self::select_transactions(&conn, filter, limit, offset)?;
        let total = Self::count_with_conn(&conn, filter)?;
        Ok((transactions, total))
    }

    /// Count transactions matching `filter`
    pub fn count_transactions(&self, filter: &TransactionFilter) -> Result<i64> {
        let conn = self.conn()?;
        Self::count_with_conn(&conn, filter)
    }

    /// Latest transactions for a user regardless of date range
    pub fn recent_transactions(&self, user_id: &UserId, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let filter = TransactionFilter::for_user(user_id.clone());
        Self::select_transactions(&conn, &filter, limit, 0)
    }

    /// Sum and count per category, largest total first
    ///
    /// Rows with equal totals come back in SQLite's iteration order.
    pub fn aggregate_by_category(&self, filter: &TransactionFilter) -> Result<Vec<CategoryTotalRow>> {
        let conn = self.conn()?;
        let built = filter.build();
        let sql = format!(
            r#"
            SELECT t.category, SUM(t.amount) AS total, COUNT(*) AS tx_count
            FROM transactions t
            {}
            GROUP BY t.category
            ORDER BY total DESC
            "#,
            built.where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(built.params_refs().as_slice(), |row| {
                Ok(CategoryTotalRow {
                    category: column_category(row, 0)?,
                    total: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Sum and count per calendar month, oldest first
    pub fn aggregate_by_month(&self, filter: &TransactionFilter) -> Result<Vec<MonthTotalRow>> {
        let conn = self.conn()?;
        let built = filter.build();
        let sql = format!(
            r#"
            SELECT
                CAST(strftime('%Y', t.date) AS INTEGER) AS year,
                CAST(strftime('%m', t.date) AS INTEGER) AS month,
                SUM(t.amount) AS total,
                COUNT(*) AS tx_count
            FROM transactions t
            {}
            GROUP BY year, month
            ORDER BY year ASC, month ASC
            "#,
            built.where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(built.params_refs().as_slice(), |row| {
                Ok(MonthTotalRow {
                    year: row.get(0)?,
                    month: row.get(1)?,
                    total: row.get(2)?,
                    count: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn select_transactions(
        conn: &DbConn,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let built = filter.build();
        let sql = format!(
            r#"
            SELECT {}
            FROM transactions t
            {}
            {}
            LIMIT ? OFFSET ?
            "#,
            TRANSACTION_COLUMNS, built.where_clause, DEFAULT_ORDER
        );

        // Add pagination params
        let mut params = built.into_params();
        params.push(Box::new(limit));
        params.push(Box::new(offset));
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(params_refs.as_slice(), Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    fn count_with_conn(conn: &DbConn, filter: &TransactionFilter) -> Result<i64> {
        let built = filter.build();
        let count: i64 = conn.query_row(
            &built.build_count_query(),
            built.params_refs().as_slice(),
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let user_id: String = row.get(1)?;
        Ok(Transaction {
            id: row.get(0)?,
            amount: row.get(2)?,
            date: column_date(row, 3)?,
            description: row.get(4)?,
            category: column_category(row, 5)?,
            user_id: UserId::new(&user_id).ok_or(rusqlite::Error::InvalidColumnType(
                1,
                "user_id".to_string(),
                rusqlite::types::Type::Text,
            ))?,
            created_at: column_datetime(row, 6)?,
            updated_at: column_datetime(row, 7)?,
        })
    }
}
