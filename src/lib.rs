//! Outlay is a personal expense tracker.
//!
//! This library provides the core used by the `outlay` command line tool:
//! a credential store, a keyword categorizer, a user-scoped expense
//! repository over SQLite, CSV import/export, and summary aggregations.

#![warn(missing_docs)]

use time::Date;

mod category;
mod database_id;
mod db;
mod expense;
mod export;
mod import;
mod password;
mod summary;
mod user;

pub use category::{DEFAULT_CATEGORIES, categorize};
pub use database_id::DatabaseId;
pub use db::initialize as initialize_db;
pub use expense::{
    DateRange, Expense, count_expenses, create_expense, delete_all_expenses,
    delete_expenses_in_range, get_expenses, search_expenses,
};
pub use export::export_csv;
pub use import::{ImportSummary, import_expenses};
pub use password::PasswordHash;
pub use summary::{group_by_category, group_by_day, monthly_total, total};
pub use user::{
    User, UserID, Username, authenticate_user, create_user, get_user_by_name, register_user,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of username and password.
    ///
    /// Unknown usernames and wrong passwords both map to this variant so that
    /// the caller-facing layer cannot distinguish the two cases.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// An empty string was used to create a username.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// The username chosen during registration already belongs to a user.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging; it is not meant
    /// for end users.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A zero or negative amount was used to create an expense.
    ///
    /// Expenses record money spent, so amounts must be greater than zero.
    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(f64),

    /// A date range was given whose start date comes after its end date.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// The start of the rejected range.
        start: Date,
        /// The end of the rejected range.
        end: Date,
    },

    /// The CSV had issues that prevented it from being parsed.
    #[error("Could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
