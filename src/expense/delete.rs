//! Bulk and range-scoped deletion of a user's expenses.

use rusqlite::Connection;

use crate::{Error, user::UserID};

use super::range::DateRange;

/// Delete every expense owned by the user `user_id`.
///
/// Returns how many expenses were deleted. Deleting for a user with no
/// expenses is not an error, the count is simply zero.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an unexpected SQL error.
pub fn delete_all_expenses(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expenses WHERE user_id = ?1",
        [user_id.as_i64()],
    )?;

    Ok(rows_affected)
}

/// Delete the expenses owned by the user `user_id` dated within `date_range`,
/// inclusive of both ends.
///
/// Returns how many expenses were deleted. Ranges with a start after their
/// end cannot be constructed, so an invalid window never reaches the
/// database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an unexpected SQL error.
pub fn delete_expenses_in_range(
    user_id: UserID,
    date_range: DateRange,
    connection: &Connection,
) -> Result<usize, Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expenses WHERE user_id = ?1 AND dt BETWEEN ?2 AND ?3",
        (
            user_id.as_i64(),
            date_range.start().to_string(),
            date_range.end().to_string(),
        ),
    )?;

    Ok(rows_affected)
}

#[cfg(test)]
mod delete_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        db::initialize,
        expense::{DateRange, count_expenses, create_expense, get_expenses},
        user::{User, Username, create_user},
    };

    use super::{delete_all_expenses, delete_expenses_in_range};

    fn get_test_connection() -> Connection {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&connection).expect("Could not initialize database.");

        connection
    }

    fn create_test_user(username: &str, connection: &Connection) -> User {
        create_user(
            Username::new_unchecked(username),
            PasswordHash::new_unchecked("hunter2"),
            connection,
        )
        .expect("Could not create test user")
    }

    #[test]
    fn delete_all_removes_only_the_users_expenses() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);

        for day in 1..=3 {
            create_expense(
                date!(2025 - 08 - 01).replace_day(day).unwrap(),
                10.0,
                "Lunch",
                "Food",
                alice.id,
                &connection,
            )
            .expect("Could not create expense");
        }
        create_expense(date!(2025 - 08 - 04), 15.0, "Taxi", "Transport", bob.id, &connection)
            .expect("Could not create expense");

        let deleted = delete_all_expenses(alice.id, &connection).expect("Could not delete");

        assert_eq!(deleted, 3);
        assert_eq!(count_expenses(alice.id, &connection), Ok(0));
        assert_eq!(count_expenses(bob.id, &connection), Ok(1));
    }

    #[test]
    fn delete_all_returns_zero_when_there_is_nothing_to_delete() {
        let connection = get_test_connection();
        let user = create_test_user("alice", &connection);

        let deleted = delete_all_expenses(user.id, &connection).expect("Could not delete");

        assert_eq!(deleted, 0);
    }

    #[test]
    fn delete_range_removes_only_expenses_within_the_window() {
        let connection = get_test_connection();
        let user = create_test_user("alice", &connection);

        let before =
            create_expense(date!(2025 - 07 - 31), 10.0, "Rent", "Rent", user.id, &connection)
                .expect("Could not create expense");
        create_expense(date!(2025 - 08 - 01), 5.0, "Coffee", "Food", user.id, &connection)
            .expect("Could not create expense");
        create_expense(date!(2025 - 08 - 31), 20.0, "Dinner", "Food", user.id, &connection)
            .expect("Could not create expense");
        let after =
            create_expense(date!(2025 - 09 - 01), 8.0, "Bus", "Transport", user.id, &connection)
                .expect("Could not create expense");

        let range = DateRange::new(date!(2025 - 08 - 01), date!(2025 - 08 - 31))
            .expect("Could not create date range");
        let deleted =
            delete_expenses_in_range(user.id, range, &connection).expect("Could not delete");

        assert_eq!(deleted, 2);
        let remaining = get_expenses(user.id, None, &connection).expect("Could not get expenses");
        assert_eq!(remaining, vec![after, before]);
    }

    #[test]
    fn delete_range_does_not_touch_other_users() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);

        create_expense(date!(2025 - 08 - 14), 10.0, "Lunch", "Food", alice.id, &connection)
            .expect("Could not create expense");
        create_expense(date!(2025 - 08 - 14), 10.0, "Lunch", "Food", bob.id, &connection)
            .expect("Could not create expense");

        let range = DateRange::new(date!(2025 - 08 - 01), date!(2025 - 08 - 31))
            .expect("Could not create date range");
        let deleted =
            delete_expenses_in_range(alice.id, range, &connection).expect("Could not delete");

        assert_eq!(deleted, 1);
        assert_eq!(count_expenses(bob.id, &connection), Ok(1));
    }

    #[test]
    fn an_inverted_window_is_rejected_before_any_deletion() {
        let connection = get_test_connection();
        let user = create_test_user("alice", &connection);

        create_expense(date!(2025 - 08 - 14), 10.0, "Lunch", "Food", user.id, &connection)
            .expect("Could not create expense");

        let start = date!(2025 - 08 - 31);
        let end = date!(2025 - 08 - 01);

        assert_eq!(
            DateRange::new(start, end),
            Err(Error::InvalidDateRange { start, end })
        );
        assert_eq!(count_expenses(user.id, &connection), Ok(1));
    }
}
