//! Summary statistics over expense listings.
//!
//! These functions operate on already fetched record sets and never touch
//! the database, so they compose with any combination of date windows and
//! search filters applied at query time.

use std::collections::{BTreeMap, HashMap};

use time::Date;

use crate::expense::Expense;

/// The sum of all expense amounts, zero for an empty listing.
pub fn total(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|expense| expense.amount).sum()
}

/// The sum of the amounts dated in the same calendar month as
/// `reference_date`.
pub fn monthly_total(expenses: &[Expense], reference_date: Date) -> f64 {
    expenses
        .iter()
        .filter(|expense| {
            expense.date.year() == reference_date.year()
                && expense.date.month() == reference_date.month()
        })
        .map(|expense| expense.amount)
        .sum()
}

/// Group expense amounts by category, largest total first.
///
/// Ties are broken by category name so the output order is deterministic.
pub fn group_by_category(expenses: &[Expense]) -> Vec<(String, f64)> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for expense in expenses {
        *totals.entry(expense.category.as_str()).or_insert(0.0) += expense.amount;
    }

    let mut pairs: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(category, sum)| (category.to_string(), sum))
        .collect();

    pairs.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    pairs
}

/// Group expense amounts by day, in chronological order.
pub fn group_by_day(expenses: &[Expense]) -> BTreeMap<Date, f64> {
    let mut totals = BTreeMap::new();

    for expense in expenses {
        *totals.entry(expense.date).or_insert(0.0) += expense.amount;
    }

    totals
}
