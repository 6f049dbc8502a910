//! Expense record management.
//!
//! This module contains everything related to expense records:
//! - The `Expense` model and the database functions for storing it
//! - User-scoped queries with optional date windows and text search
//! - Bulk and range-scoped deletion

mod core;
mod delete;
mod query;
mod range;

pub use core::{Expense, count_expenses, create_expense, create_expenses_table};
pub use delete::{delete_all_expenses, delete_expenses_in_range};
pub use query::{get_expenses, search_expenses};
pub use range::DateRange;
