//! Bulk import of expenses from CSV text.
//!
//! The importer is lenient at the row level: rows that cannot be parsed are
//! counted and skipped so one bad line does not abort a whole bank export.
//! Structural problems, such as a missing required column, fail the import
//! as a whole.

use rusqlite::Connection;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, category::categorize, user::UserID};

/// The date formats accepted in the `dt` column.
///
/// Slashed dates with a four digit year at the end are read day-first.
const DATE_FORMATS: [&[BorrowedFormatItem<'static>]; 4] = [
    format_description!("[year]-[month]-[day]"),
    format_description!("[year]/[month]/[day]"),
    format_description!("[day]/[month]/[year]"),
    format_description!("[day] [month repr:short] [year]"),
];

/// The outcome of a bulk CSV import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// How many rows were inserted as expenses.
    pub inserted: usize,
    /// How many rows were skipped because they could not be parsed.
    pub skipped: usize,
}

/// The position of each recognised column in the CSV header.
struct ImportColumns {
    date: usize,
    amount: usize,
    description: usize,
    category: Option<usize>,
}

/// A row that parsed cleanly and is ready to insert.
struct ImportRow {
    date: Date,
    amount: f64,
    description: String,
    category: String,
}

/// Import the expenses in `csv_text` for the user `user_id`.
///
/// The header must contain `dt`, `amount` and `description` columns, matched
/// ignoring case. A `category` column is optional; rows without a category
/// get one derived from their description. All inserts happen in a single
/// transaction, so either every parseable row lands or none do.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCSV] if the header is malformed or a required column is missing,
/// - [Error::SqlError] if there is an unexpected SQL error.
pub fn import_expenses(
    csv_text: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<ImportSummary, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| Error::InvalidCSV(error.to_string()))?;
    let columns = resolve_columns(headers)?;

    let mut rows = Vec::new();
    let mut skipped = 0;

    for (index, record_result) in reader.records().enumerate() {
        // The header occupies line one, so the first record is line two.
        let line_number = index + 2;

        let record = match record_result {
            Ok(record) => record,
            Err(error) => {
                tracing::debug!("skipping line {line_number}: {error}");
                skipped += 1;
                continue;
            }
        };

        match parse_row(&record, &columns) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                tracing::debug!("skipping line {line_number}: {reason}");
                skipped += 1;
            }
        }
    }

    let transaction = connection.unchecked_transaction()?;
    let inserted = {
        let mut statement = transaction.prepare(
            "INSERT INTO expenses (dt, amount, description, category, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;

        let mut inserted = 0;
        for row in &rows {
            statement.execute((
                row.date,
                row.amount,
                &row.description,
                &row.category,
                user_id.as_i64(),
            ))?;
            inserted += 1;
        }

        inserted
    };
    transaction.commit()?;

    tracing::debug!("imported {inserted} expenses for user {user_id}, skipped {skipped} rows");

    Ok(ImportSummary { inserted, skipped })
}

/// Locate the required and optional columns in the CSV header, ignoring case.
fn resolve_columns(headers: &csv::StringRecord) -> Result<ImportColumns, Error> {
    let mut date = None;
    let mut amount = None;
    let mut description = None;
    let mut category = None;

    for (index, header) in headers.iter().enumerate() {
        match header.trim().to_lowercase().as_str() {
            "dt" => date = Some(index),
            "amount" => amount = Some(index),
            "description" => description = Some(index),
            "category" => category = Some(index),
            _ => {}
        }
    }

    match (date, amount, description) {
        (Some(date), Some(amount), Some(description)) => Ok(ImportColumns {
            date,
            amount,
            description,
            category,
        }),
        _ => Err(Error::InvalidCSV(
            "the header must contain the columns dt, amount and description".to_string(),
        )),
    }
}

/// Parse a single record into an insertable row.
///
/// The error string names what was wrong with the row so it can be logged.
fn parse_row(record: &csv::StringRecord, columns: &ImportColumns) -> Result<ImportRow, String> {
    let date_text = record.get(columns.date).ok_or("missing dt field")?.trim();
    let date =
        parse_date(date_text).ok_or_else(|| format!("unrecognised date \"{date_text}\""))?;

    let amount_text = record
        .get(columns.amount)
        .ok_or("missing amount field")?
        .trim();
    let amount = parse_amount(amount_text)
        .ok_or_else(|| format!("could not parse amount \"{amount_text}\""))?;
    if amount <= 0.0 {
        return Err(format!("amount must be greater than zero, got {amount}"));
    }

    let description = record
        .get(columns.description)
        .ok_or("missing description field")?
        .trim()
        .to_string();

    let category = match columns.category.and_then(|index| record.get(index)) {
        Some(label) if !label.trim().is_empty() => label.trim().to_string(),
        _ => categorize(&description).to_string(),
    };

    Ok(ImportRow {
        date,
        amount,
        description,
        category,
    })
}

/// Parse a date in any of the accepted formats.
fn parse_date(text: &str) -> Option<Date> {
    DATE_FORMATS
        .iter()
        .find_map(|format| Date::parse(text, format).ok())
}

/// Parse an amount, tolerating a leading currency symbol and thousands
/// separators, e.g. `"$1,234.56"`.
fn parse_amount(text: &str) -> Option<f64> {
    let cleaned = text.trim_start_matches('$').replace(',', "");

    match cleaned.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Some(amount),
        _ => None,
    }
}
