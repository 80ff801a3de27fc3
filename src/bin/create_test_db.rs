use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, OffsetDateTime};

use kakeibo_rs::{
    Transaction, TransactionKind, create_transaction, create_user, get_all_categories,
    initialize_db,
};

/// A utility for creating a test database for the REST API server of kakeibo_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The name of the user that owns the sample transactions.
    #[arg(long, short, default_value = "test")]
    username: String,
}

/// Sample expenses as (category name, description, amount, how many days apart they recur).
const SAMPLE_EXPENSES: [(&str, &str, u32, i64); 6] = [
    ("食費", "スーパー", 2_480, 3),
    ("交通", "電車", 420, 2),
    ("日用品", "ドラッグストア", 1_150, 9),
    ("教養娯楽", "映画", 1_900, 14),
    ("光熱費", "電気代", 8_300, 30),
    ("住居", "家賃", 85_000, 30),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {:?}...", args.username);
    let user = create_user(&args.username, &conn)?;

    println!("Creating sample transactions...");
    let categories = get_all_categories(&conn)?;
    let category_id = |name: &str| {
        categories
            .iter()
            .find(|category| category.name == name)
            .map(|category| category.id)
    };

    let today = OffsetDateTime::now_utc().date();
    let start = today - Duration::days(90);
    let mut count = 0;

    for (category, description, amount, interval) in SAMPLE_EXPENSES {
        for date in recurring_dates(start, today, interval) {
            create_transaction(
                user.id,
                Transaction::build(amount, TransactionKind::Expense, date, description)
                    .category_id(category_id(category)),
                &conn,
            )?;
            count += 1;
        }
    }

    for date in recurring_dates(start, today, 30) {
        create_transaction(
            user.id,
            Transaction::build(280_000, TransactionKind::Income, date, "給料")
                .category_id(category_id("給与")),
            &conn,
        )?;
        count += 1;
    }

    // A few expenses without a category.
    for date in recurring_dates(start, today, 20) {
        create_transaction(
            user.id,
            Transaction::build(600, TransactionKind::Expense, date, "雑費"),
            &conn,
        )?;
        count += 1;
    }

    println!("Created {count} transactions for user {}.", user.id);
    println!("Success!");

    Ok(())
}

/// Every `interval` days from `start` up to and including `end`.
fn recurring_dates(start: Date, end: Date, interval: i64) -> Vec<Date> {
    let mut dates = Vec::new();
    let mut date = start;

    while date <= end {
        dates.push(date);
        date += Duration::days(interval);
    }

    dates
}
