//! Query functions for listing and searching expenses.

use rusqlite::Connection;

use crate::{Error, user::UserID};

use super::{
    core::{Expense, map_expense_row},
    range::DateRange,
};

/// Get the expenses owned by the user `user_id`, most recent first.
///
/// When `date_range` is given, only expenses dated within the range
/// (inclusive of both ends) are returned. The query is always scoped to the
/// owning user, so rows belonging to other users are never returned.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an unexpected SQL error.
pub fn get_expenses(
    user_id: UserID,
    date_range: Option<DateRange>,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    // Sort by date, and then ID to keep the expense order stable.
    match date_range {
        Some(range) => connection
            .prepare(
                "SELECT id, dt, amount, description, category, user_id FROM expenses
                WHERE user_id = ?1 AND dt BETWEEN ?2 AND ?3
                ORDER BY dt DESC, id ASC",
            )?
            .query_map(
                (
                    user_id.as_i64(),
                    range.start().to_string(),
                    range.end().to_string(),
                ),
                map_expense_row,
            )?
            .map(|expense_result| expense_result.map_err(Error::SqlError))
            .collect(),
        None => connection
            .prepare(
                "SELECT id, dt, amount, description, category, user_id FROM expenses
                WHERE user_id = ?1
                ORDER BY dt DESC, id ASC",
            )?
            .query_map([user_id.as_i64()], map_expense_row)?
            .map(|expense_result| expense_result.map_err(Error::SqlError))
            .collect(),
    }
}

/// Filter an already fetched expense listing by a search string.
///
/// Keeps the expenses whose description or category contains `query`,
/// ignoring case. An empty query keeps everything. The input order is
/// preserved.
pub fn search_expenses(expenses: &[Expense], query: &str) -> Vec<Expense> {
    let needle = query.to_lowercase();

    expenses
        .iter()
        .filter(|expense| {
            expense.description.to_lowercase().contains(&needle)
                || expense.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
