//! Database initialization.

use rusqlite::Connection;

use crate::{Error, expense::create_expenses_table, user::create_users_table};

/// Initialize the application database.
///
/// Creates the users and expenses tables if they do not exist yet and applies
/// the additive `user_id` migration to expense tables created by older
/// versions of the application. Everything runs in a single transaction.
///
/// # Errors
/// This function will return a [Error::SqlError] if table creation or migration fails.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    create_users_table(&transaction)?;
    create_expenses_table(&transaction)?;

    transaction.commit()?;

    tracing::debug!("database initialized");

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        PasswordHash,
        expense::{create_expense, get_expenses},
        user::{Username, create_user},
    };

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");

        initialize(&connection).expect("Could not initialize database");
        initialize(&connection).expect("Could not initialize database twice");
    }

    #[test]
    fn fresh_database_accepts_scoped_expenses() {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database");

        let user = create_user(
            Username::new_unchecked("alice"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create user");
        let expense = create_expense(
            date!(2025 - 08 - 14),
            12.5,
            "Morning coffee",
            "Food",
            user.id,
            &connection,
        )
        .expect("Could not create expense");

        assert_eq!(
            get_expenses(user.id, None, &connection),
            Ok(vec![expense])
        );
    }

    #[test]
    fn legacy_expenses_table_gains_the_user_id_column() {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        connection
            .execute(
                "CREATE TABLE expenses (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    dt TEXT NOT NULL,
                    amount REAL NOT NULL,
                    description TEXT,
                    category TEXT
                    )",
                (),
            )
            .expect("Could not create legacy table");
        connection
            .execute(
                "INSERT INTO expenses (dt, amount, description, category)
                VALUES ('2024-12-31', 9.99, 'Last year''s lunch', 'Food')",
                (),
            )
            .expect("Could not insert legacy row");

        initialize(&connection).expect("Could not initialize database");

        let column_names: Vec<String> = connection
            .prepare("PRAGMA table_info(expenses)")
            .expect("Could not inspect table")
            .query_map([], |row| row.get(1))
            .expect("Could not read columns")
            .collect::<Result<_, _>>()
            .expect("Could not read columns");
        assert!(column_names.iter().any(|name| name == "user_id"));

        let legacy_rows: i64 = connection
            .query_row(
                "SELECT COUNT(id) FROM expenses WHERE user_id IS NULL",
                (),
                |row| row.get(0),
            )
            .expect("Could not count legacy rows");
        assert_eq!(legacy_rows, 1);
    }
}
