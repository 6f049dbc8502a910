use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    process::exit,
    sync::{Arc, OnceLock},
};

use clap::{Parser, Subcommand};
use numfmt::{Formatter, Precision};
use rusqlite::Connection;
use time::{
    Date, OffsetDateTime,
    format_description::BorrowedFormatItem,
    macros::{date, format_description},
};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use outlay::{
    DEFAULT_CATEGORIES, DateRange, User, Username, authenticate_user, categorize, create_expense,
    delete_all_expenses, delete_expenses_in_range, export_csv, get_expenses, group_by_category,
    group_by_day, import_expenses, initialize_db, monthly_total, register_user, search_expenses,
    total,
};

const CLI_DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

const EARLIEST_DATE: Date = date!(0001 - 01 - 01);
const LATEST_DATE: Date = date!(9999 - 12 - 31);

/// A personal expense tracker for the command line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The file path to the SQLite database. Created if it does not exist.
    #[arg(long, default_value = "expenses.db", global = true)]
    db_path: PathBuf,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new user.
    Register {
        /// The name to register.
        #[arg(long)]
        username: Username,
    },
    /// Record a single expense.
    Add {
        /// The name of the user recording the expense.
        #[arg(long)]
        username: Username,
        /// The day of the expense, e.g. 2025-08-14.
        #[arg(long, value_parser = parse_cli_date)]
        date: Date,
        /// The amount spent. Must be greater than zero.
        #[arg(long)]
        amount: f64,
        /// What the money was spent on.
        #[arg(long)]
        description: String,
        /// The category label. Derived from the description when omitted.
        #[arg(long)]
        category: Option<String>,
    },
    /// List expenses, most recent first.
    List {
        /// The name of the user whose expenses to list.
        #[arg(long)]
        username: Username,
        /// Only include expenses on or after this date.
        #[arg(long, value_parser = parse_cli_date)]
        from: Option<Date>,
        /// Only include expenses on or before this date.
        #[arg(long, value_parser = parse_cli_date)]
        to: Option<Date>,
        /// Only include expenses whose description or category contains this text.
        #[arg(long)]
        search: Option<String>,
    },
    /// Bulk import expenses from a CSV file.
    Import {
        /// The name of the user to import expenses for.
        #[arg(long)]
        username: Username,
        /// A CSV file with dt, amount, description and optional category columns.
        #[arg(long)]
        file: PathBuf,
    },
    /// Export expenses as CSV.
    Export {
        /// The name of the user whose expenses to export.
        #[arg(long)]
        username: Username,
        /// Only include expenses on or after this date.
        #[arg(long, value_parser = parse_cli_date)]
        from: Option<Date>,
        /// Only include expenses on or before this date.
        #[arg(long, value_parser = parse_cli_date)]
        to: Option<Date>,
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the overall, monthly, per-category and per-day totals.
    Summary {
        /// The name of the user whose expenses to summarise.
        #[arg(long)]
        username: Username,
    },
    /// Delete expenses in bulk or by date range.
    Delete {
        /// The name of the user whose expenses to delete.
        #[arg(long)]
        username: Username,
        /// Delete every expense.
        #[arg(long, conflicts_with_all = ["from", "to"])]
        all: bool,
        /// The first day of the range to delete.
        #[arg(long, value_parser = parse_cli_date, requires = "to")]
        from: Option<Date>,
        /// The last day of the range to delete.
        #[arg(long, value_parser = parse_cli_date, requires = "from")]
        to: Option<Date>,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbose);

    if let Err(error) = run(args) {
        print_error(&error.to_string());
        exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let connection = Connection::open(&args.db_path)?;
    initialize_db(&connection)?;

    match args.command {
        Command::Register { username } => register(username, &connection),
        Command::Add {
            username,
            date,
            amount,
            description,
            category,
        } => add(&username, date, amount, &description, category, &connection),
        Command::List {
            username,
            from,
            to,
            search,
        } => list(&username, from, to, search, &connection),
        Command::Import { username, file } => import(&username, &file, &connection),
        Command::Export {
            username,
            from,
            to,
            output,
        } => export(&username, from, to, output, &connection),
        Command::Summary { username } => summarise(&username, &connection),
        Command::Delete {
            username,
            all,
            from,
            to,
            yes,
        } => delete(&username, all, from, to, yes, &connection),
    }
}

/// Log warnings and errors to stderr, and everything to `debug.log`.
///
/// Passing `--verbose` lowers the stderr threshold to debug. The `RUST_LOG`
/// environment variable overrides the threshold entirely.
fn setup_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(io::stderr)
        .with_filter(env_filter);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file))
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stderr_log.and_then(debug_log))
        .init();
}

fn register(username: Username, connection: &Connection) -> Result<(), Box<dyn Error>> {
    let Some(password) = prompt_new_password() else {
        return Ok(());
    };

    let user = register_user(username, &password, connection)?;
    println!("Registered {} with user ID {}", user.username, user.id);

    Ok(())
}

fn add(
    username: &Username,
    date: Date,
    amount: f64,
    description: &str,
    category: Option<String>,
    connection: &Connection,
) -> Result<(), Box<dyn Error>> {
    let user = authenticate(username, connection)?;
    let category = category.unwrap_or_else(|| categorize(description).to_string());
    if !DEFAULT_CATEGORIES.contains(&category.as_str()) {
        tracing::debug!("\"{category}\" is not one of the default categories");
    }

    let expense = create_expense(date, amount, description, &category, user.id, connection)?;
    println!(
        "Recorded expense #{} on {}: {} ({})",
        expense.id,
        expense.date,
        currency(expense.amount),
        expense.category
    );

    Ok(())
}

fn list(
    username: &Username,
    from: Option<Date>,
    to: Option<Date>,
    search: Option<String>,
    connection: &Connection,
) -> Result<(), Box<dyn Error>> {
    let user = authenticate(username, connection)?;
    let date_range = resolve_date_range(from, to)?;

    let expenses = get_expenses(user.id, date_range, connection)?;
    let expenses = match search {
        Some(query) => search_expenses(&expenses, &query),
        None => expenses,
    };

    if expenses.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    for expense in &expenses {
        println!(
            "{:>6}  {}  {:>12}  {:<14}  {}",
            expense.id,
            expense.date,
            currency(expense.amount),
            expense.category,
            expense.description
        );
    }
    println!(
        "{} expenses, {} in total",
        expenses.len(),
        currency(total(&expenses))
    );

    Ok(())
}

fn import(username: &Username, file: &Path, connection: &Connection) -> Result<(), Box<dyn Error>> {
    let user = authenticate(username, connection)?;
    let csv_text = fs::read_to_string(file)?;

    let summary = import_expenses(&csv_text, user.id, connection)?;
    println!(
        "Imported {} expenses ({} rows skipped)",
        summary.inserted, summary.skipped
    );

    Ok(())
}

fn export(
    username: &Username,
    from: Option<Date>,
    to: Option<Date>,
    output: Option<PathBuf>,
    connection: &Connection,
) -> Result<(), Box<dyn Error>> {
    let user = authenticate(username, connection)?;
    let date_range = resolve_date_range(from, to)?;

    let expenses = get_expenses(user.id, date_range, connection)?;
    let csv_bytes = export_csv(&expenses)?;

    match output {
        Some(path) => {
            fs::write(&path, &csv_bytes)?;
            println!("Wrote {} expenses to {}", expenses.len(), path.display());
        }
        None => io::stdout().write_all(&csv_bytes)?,
    }

    Ok(())
}

fn summarise(username: &Username, connection: &Connection) -> Result<(), Box<dyn Error>> {
    let user = authenticate(username, connection)?;
    let expenses = get_expenses(user.id, None, connection)?;

    if expenses.is_empty() {
        println!("No expenses recorded.");
        return Ok(());
    }

    let today = OffsetDateTime::now_local()
        .map(|now| now.date())
        .unwrap_or_else(|_| OffsetDateTime::now_utc().date());

    println!("Total spent: {}", currency(total(&expenses)));
    println!("This month:  {}", currency(monthly_total(&expenses, today)));

    println!("\nBy category:");
    for (category, sum) in group_by_category(&expenses) {
        println!("  {category:<14} {:>12}", currency(sum));
    }

    println!("\nBy day:");
    for (date, sum) in group_by_day(&expenses) {
        println!("  {date}      {:>12}", currency(sum));
    }

    Ok(())
}

fn delete(
    username: &Username,
    all: bool,
    from: Option<Date>,
    to: Option<Date>,
    yes: bool,
    connection: &Connection,
) -> Result<(), Box<dyn Error>> {
    let user = authenticate(username, connection)?;

    if all {
        if !yes && !confirm(&format!("Delete ALL expenses for {username}?"))? {
            println!("Aborted.");
            return Ok(());
        }

        let deleted = delete_all_expenses(user.id, connection)?;
        println!("Deleted {deleted} expenses");
        return Ok(());
    }

    let (Some(start), Some(end)) = (from, to) else {
        print_error("Pass either --all or both --from and --to.");
        exit(1);
    };

    let date_range = DateRange::new(start, end)?;
    if !yes && !confirm(&format!("Delete expenses for {username} from {date_range}?"))? {
        println!("Aborted.");
        return Ok(());
    }

    let deleted = delete_expenses_in_range(user.id, date_range, connection)?;
    println!("Deleted {deleted} expenses");

    Ok(())
}

/// Prompt for the user's password and check it against the stored hash.
fn authenticate(username: &Username, connection: &Connection) -> Result<User, Box<dyn Error>> {
    let password = rpassword::prompt_password(format!("Password for {username}: "))?;
    let user = authenticate_user(username.as_ref(), &password, connection)?;

    Ok(user)
}

/// Prompt for a new password twice, returning it once both entries match.
///
/// Returns [None] if the input stream is closed, e.g. by pressing Ctrl+D.
fn prompt_new_password() -> Option<String> {
    loop {
        let password = match rpassword::prompt_password("New password: ") {
            Ok(password) => password,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => return None,
            Err(error) => {
                print_error(&format!("Could not read password: {error}"));
                continue;
            }
        };

        if password.is_empty() {
            print_error("Password cannot be empty, try again.");
            continue;
        }

        let confirmation = match rpassword::prompt_password("Confirm password: ") {
            Ok(confirmation) => confirmation,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => return None,
            Err(error) => {
                print_error(&format!("Could not read password: {error}"));
                continue;
            }
        };

        if password == confirmation {
            return Some(password);
        }

        print_error("Passwords do not match, try again.");
    }
}

/// Ask a yes/no question, defaulting to no.
fn confirm(prompt: &str) -> Result<bool, io::Error> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let answer = answer.trim();

    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

/// Turn `--from`/`--to` arguments into an inclusive window, open ends filled
/// with sentinel dates.
fn resolve_date_range(
    from: Option<Date>,
    to: Option<Date>,
) -> Result<Option<DateRange>, outlay::Error> {
    let date_range = match (from, to) {
        (None, None) => return Ok(None),
        (Some(start), Some(end)) => DateRange::new(start, end)?,
        (Some(start), None) => DateRange::new(start, LATEST_DATE)?,
        (None, Some(end)) => DateRange::new(EARLIEST_DATE, end)?,
    };

    Ok(Some(date_range))
}

fn parse_cli_date(text: &str) -> Result<Date, String> {
    Date::parse(text.trim(), CLI_DATE_FORMAT)
        .map_err(|_| format!("\"{text}\" is not a date in the form 2025-08-14"))
}

/// Format `amount` as a dollar amount, e.g. `"$1,234.50"`.
fn currency(amount: f64) -> String {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    // Zero is rendered as just "0", so the full string is spelled out instead.
    if amount == 0.0 {
        return "$0.00".to_owned();
    }

    let formatter = FORMATTER.get_or_init(|| {
        Formatter::currency("$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    let mut formatted_string = formatter.fmt_string(amount);

    // numfmt omits the last digit if it is a trailing zero, e.g. "$12.30" is
    // rendered as "$12.3", so it is added back here.
    if formatted_string.as_bytes()[formatted_string.len() - 3] != b'.' {
        formatted_string = format!("{formatted_string}0");
    }

    formatted_string
}

/// Print `message` to stderr with red text.
fn print_error(message: &str) {
    eprintln!("\x1b[31;1m{}\x1b[0m", capitalise_first_char(message));
}

/// From https://crates.io/crates/capitalize
fn capitalise_first_char(text: &str) -> String {
    let mut chars = text.chars();

    let Some(first_char) = chars.next() else {
        return String::new();
    };

    first_char.to_uppercase().chain(chars).collect()
}

#[cfg(test)]
mod cli_tests {
    use time::macros::date;

    use super::{capitalise_first_char, currency, parse_cli_date, resolve_date_range};

    #[test]
    fn parse_cli_date_accepts_iso_dates() {
        assert_eq!(parse_cli_date("2025-08-14"), Ok(date!(2025 - 08 - 14)));
    }

    #[test]
    fn parse_cli_date_rejects_other_formats() {
        assert!(parse_cli_date("14/08/2025").is_err());
        assert!(parse_cli_date("yesterday").is_err());
    }

    #[test]
    fn resolve_date_range_is_none_when_no_bounds_are_given() {
        assert_eq!(resolve_date_range(None, None), Ok(None));
    }

    #[test]
    fn resolve_date_range_fills_open_ends() {
        let from = date!(2025 - 08 - 01);
        let range = resolve_date_range(Some(from), None)
            .expect("Could not resolve date range")
            .expect("Expected a date range");

        assert_eq!(range.start(), from);
        assert!(range.end() > from);
    }

    #[test]
    fn currency_renders_two_decimal_places() {
        assert_eq!(currency(0.0), "$0.00");
        assert_eq!(currency(0.5), "$0.50");
        assert_eq!(currency(12.3), "$12.30");
        assert_eq!(currency(1234.56), "$1,234.56");
    }

    #[test]
    fn capitalise_first_char_handles_empty_strings() {
        assert_eq!(capitalise_first_char(""), "");
        assert_eq!(capitalise_first_char("invalid username"), "Invalid username");
    }
}
