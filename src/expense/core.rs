//! Defines the expense record model and its core database functions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::DatabaseId, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// A single dated expense owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: DatabaseId,
    /// The day the money was spent.
    pub date: Date,
    /// The amount of money spent. Always greater than zero.
    pub amount: f64,
    /// A text description of what the money was spent on. May be empty.
    pub description: String,
    /// The category label the expense is grouped under.
    pub category: String,
    /// The ID of the user that owns the expense.
    pub user_id: UserID,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new expense in the database.
///
/// Dates are stored as ISO-8601 text (`YYYY-MM-DD`) so that date windows can
/// be expressed as plain `BETWEEN` clauses.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if `amount` is zero, negative or not a finite number,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_expense(
    date: Date,
    amount: f64,
    description: &str,
    category: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::NonPositiveAmount(amount));
    }

    let expense = connection
        .prepare(
            "INSERT INTO expenses (dt, amount, description, category, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, dt, amount, description, category, user_id",
        )?
        .query_row(
            (date, amount, description, category, user_id.as_i64()),
            map_expense_row,
        )?;

    Ok(expense)
}

/// Get the number of expenses owned by the user `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an unexpected SQL error.
pub fn count_expenses(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM expenses WHERE user_id = :user_id;",
            &[(":user_id", &user_id.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the expenses table in the database.
///
/// The base table matches the shape used before expenses were scoped per
/// user, and the `user_id` column is then added by an additive migration, so
/// fresh databases and pre-existing ones end up with the same schema.
///
/// # Errors
/// Returns an error if the table or index cannot be created.
pub fn create_expenses_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                dt TEXT NOT NULL,
                amount REAL NOT NULL,
                description TEXT,
                category TEXT
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('expenses', 0)",
        (),
    )?;

    add_user_id_column_if_missing(connection)?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_user_dt ON expenses(user_id, dt);",
        (),
    )?;

    Ok(())
}

/// Add the `user_id` column to the expenses table if it does not exist yet.
///
/// Databases created before expenses were scoped per user lack the column.
/// It is added as a nullable column so that existing rows are kept as-is.
fn add_user_id_column_if_missing(connection: &Connection) -> Result<(), rusqlite::Error> {
    let has_user_id = connection
        .prepare("PRAGMA table_info(expenses)")?
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<String>, rusqlite::Error>>()?
        .iter()
        .any(|column_name| column_name == "user_id");

    if !has_user_id {
        tracing::info!("adding the user_id column to the expenses table");
        connection.execute("ALTER TABLE expenses ADD COLUMN user_id INTEGER", ())?;
    }

    Ok(())
}

/// Convert a database row into an [Expense].
///
/// # Errors
/// Returns an error if a column is missing or contains an invalid value.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let date = row.get(1)?;
    let amount = row.get(2)?;
    let description: Option<String> = row.get(3)?;
    let category: Option<String> = row.get(4)?;
    let raw_user_id: i64 = row.get(5)?;

    Ok(Expense {
        id,
        date,
        amount,
        description: description.unwrap_or_default(),
        category: category.unwrap_or_default(),
        user_id: UserID::new(raw_user_id),
    })
}

// ============================================================================
// TESTS
// ============================================================================
