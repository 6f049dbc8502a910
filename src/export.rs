//! CSV serialization of expense listings.

use crate::{Error, expense::Expense};

/// Serialize `expenses` to CSV with an `id,dt,amount,description,category`
/// header row.
///
/// The records are written in the order given, so callers control sorting
/// and filtering through the query that produced the listing. Dates are
/// written as ISO-8601 (`YYYY-MM-DD`), which means an exported file can be
/// fed straight back into the importer.
///
/// # Errors
/// This function will return a [Error::InvalidCSV] if a record cannot be serialized.
pub fn export_csv(expenses: &[Expense]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["id", "dt", "amount", "description", "category"])
        .map_err(|error| Error::InvalidCSV(error.to_string()))?;

    for expense in expenses {
        writer
            .write_record([
                expense.id.to_string(),
                expense.date.to_string(),
                expense.amount.to_string(),
                expense.description.clone(),
                expense.category.clone(),
            ])
            .map_err(|error| Error::InvalidCSV(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::InvalidCSV(error.to_string()))
}

#[cfg(test)]
mod export_tests {
    use time::macros::date;

    use crate::{expense::Expense, user::UserID};

    use super::export_csv;

    fn create_test_expense(id: i64, description: &str) -> Expense {
        Expense {
            id,
            date: date!(2025 - 08 - 14),
            amount: 12.5,
            description: description.to_string(),
            category: "Food".to_string(),
            user_id: UserID::new(1),
        }
    }

    #[test]
    fn export_writes_the_header_and_one_line_per_expense() {
        let expenses = [
            create_test_expense(1, "Morning coffee"),
            create_test_expense(2, "Lunch"),
        ];

        let bytes = export_csv(&expenses).expect("Could not export expenses");
        let text = String::from_utf8(bytes).expect("Export was not valid UTF-8");

        assert_eq!(
            text,
            "id,dt,amount,description,category\n\
            1,2025-08-14,12.5,Morning coffee,Food\n\
            2,2025-08-14,12.5,Lunch,Food\n"
        );
    }

    #[test]
    fn export_of_an_empty_listing_is_just_the_header() {
        let bytes = export_csv(&[]).expect("Could not export expenses");
        let text = String::from_utf8(bytes).expect("Export was not valid UTF-8");

        assert_eq!(text, "id,dt,amount,description,category\n");
    }

    #[test]
    fn export_quotes_fields_containing_commas() {
        let expenses = [create_test_expense(1, "Dinner, with drinks")];

        let bytes = export_csv(&expenses).expect("Could not export expenses");
        let text = String::from_utf8(bytes).expect("Export was not valid UTF-8");

        assert_eq!(
            text,
            "id,dt,amount,description,category\n\
            1,2025-08-14,12.5,\"Dinner, with drinks\",Food\n"
        );
    }
}
