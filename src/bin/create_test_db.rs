use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, PrimitiveDateTime};

use consumption_tracker::{
    Channel, ConsumptionData, LookupKind, LookupName, MainType, ReceiveStatus, SubType,
    create_consumption, create_entry, initialize_db, local_now, prepare_new_consumption,
};

/// A utility for creating a demo database for the consumption tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The canonical timezone used for purchase times, e.g. "Asia/Shanghai".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating lookup entries...");
    create_entries::<Channel>(&["Supermarket", "Online", "Market"], &conn)?;
    create_entries::<MainType>(&["Food", "Household", "Transport"], &conn)?;
    create_entries::<SubType>(&["Snacks", "Fruit", "Cleaning", "Bus"], &conn)?;

    println!("Creating consumption records...");
    let now = local_now(&args.timezone)?;
    let records = [
        demo_record("Apples", "Market", "Food", "Fruit", "2", "8.4", now - Duration::days(1)),
        demo_record("Crisps", "Supermarket", "Food", "Snacks", "3", "10.5", now - Duration::days(3)),
        demo_record("Bus pass", "Online", "Transport", "Bus", "1", "60", now - Duration::days(10)),
        ConsumptionData {
            unit_coefficient: Some(Decimal::from(500)),
            start_use_time: Some(format_date(now - Duration::days(20))),
            end_use_time: Some(format_date(now - Duration::days(5))),
            tag: Some("repurchase".to_owned()),
            ..demo_record(
                "Dish soap",
                "Supermarket",
                "Household",
                "Cleaning",
                "1",
                "15",
                now - Duration::days(20),
            )
        },
        ConsumptionData {
            receive_status: Some(ReceiveStatus::Pending),
            pickup_code: Some("8-2-1034".to_owned()),
            ..demo_record("Mop", "Online", "Household", "Cleaning", "1", "39.9", now)
        },
    ];

    for data in &records {
        let new_consumption = prepare_new_consumption(data, now)?;
        create_consumption(&new_consumption, &conn)?;
    }

    println!("Success!");

    Ok(())
}

fn create_entries<K: LookupKind>(
    names: &[&str],
    conn: &Connection,
) -> Result<(), consumption_tracker::Error> {
    for name in names {
        create_entry::<K>(LookupName::new(name)?, conn)?;
    }

    Ok(())
}

fn demo_record(
    content: &str,
    channel: &str,
    main_type: &str,
    sub_type: &str,
    quantity: &str,
    total_price: &str,
    bought_at: PrimitiveDateTime,
) -> ConsumptionData {
    ConsumptionData {
        content: Some(content.to_owned()),
        channel: Some(channel.to_owned()),
        main_type: Some(main_type.to_owned()),
        sub_type: Some(sub_type.to_owned()),
        quantity: quantity.parse().ok(),
        total_price: total_price.parse().ok(),
        purchase_time: Some(format!(
            "{} {:02}:{:02}",
            bought_at.date(),
            bought_at.hour(),
            bought_at.minute()
        )),
        ..Default::default()
    }
}

fn format_date(date_time: PrimitiveDateTime) -> String {
    date_time.date().to_string()
}
