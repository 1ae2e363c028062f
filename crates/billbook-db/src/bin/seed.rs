//! # Seed Data Generator
//!
//! Populates a database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./billbook_dev.db
//! cargo run -p billbook-db --bin seed
//!
//! # Specify database path
//! cargo run -p billbook-db --bin seed -- --db ./data/billbook.db
//! ```
//!
//! ## Generated Data
//! - Sheet products for common paper grades, priced per square meter
//! - Bag products, priced per piece
//! - A handful of customers
//! - Two salespersons (one percentage, one fixed-rate commission)
//! - One bank account and the business profile

use billbook_core::{
    BankAccount, BusinessSettings, Commission, Customer, Product, ProductType, Salesperson,
};
use billbook_db::{Database, DbConfig};
use std::env;

/// (gsm label, price per square meter)
const SHEET_GRADES: &[(&str, f64)] = &[
    ("70", 18.0),
    ("80", 21.5),
    ("100", 27.0),
    ("120", 32.5),
    ("150", 41.0),
    ("200", 55.0),
    ("250", 68.0),
    ("300", 82.0),
];

/// (gsm label, price per bag)
const BAG_GRADES: &[(&str, f64)] = &[("60", 2.5), ("80", 3.25), ("100", 4.0), ("120", 5.5)];

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Rahman Traders", "12 Mill Road", "555-0101"),
    ("Karim Printing House", "4 Station Street", "555-0102"),
    ("Blue Leaf Packaging", "88 Harbour Lane", "555-0103"),
    ("City Stationers", "1 Market Square", "555-0104"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./billbook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Billbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./billbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Billbook Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating catalog...");

    let grades = SHEET_GRADES
        .iter()
        .map(|(gsm, price)| (*gsm, ProductType::Sheet, *price))
        .chain(
            BAG_GRADES
                .iter()
                .map(|(gsm, price)| (*gsm, ProductType::Bag, *price)),
        );

    let mut generated = 0;
    for (gsm, product_type, unit_price) in grades {
        let product = Product {
            id: String::new(),
            gsm: gsm.to_string(),
            product_type,
            unit_price,
        };
        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {} {}: {}", product_type, gsm, e);
            continue;
        }
        generated += 1;
    }
    println!("  {} products", generated);

    for (name, address, phone) in CUSTOMERS {
        db.customers()
            .insert(&Customer {
                id: String::new(),
                name: name.to_string(),
                address: address.to_string(),
                phone: phone.to_string(),
                email: String::new(),
            })
            .await?;
    }
    println!("  {} customers", CUSTOMERS.len());

    db.salespersons()
        .insert(&Salesperson {
            id: String::new(),
            name: "Nadia Islam".to_string(),
            commission: Some(Commission::percentage(5.0)?),
        })
        .await?;
    db.salespersons()
        .insert(&Salesperson {
            id: String::new(),
            name: "Omar Faruk".to_string(),
            commission: Some(Commission::fixed(Some(2.0), Some(0.5))?),
        })
        .await?;
    println!("  2 salespersons");

    let account = db
        .bank_accounts()
        .insert(&BankAccount {
            id: String::new(),
            bank_name: "City Bank".to_string(),
            bank_branch: "Main Branch".to_string(),
            account_name: "Paper Works Ltd".to_string(),
            account_number: "0012345678".to_string(),
            routing_number: "225261732".to_string(),
        })
        .await?;

    db.settings()
        .save(&BusinessSettings {
            name: "Paper Works Ltd".to_string(),
            office_address: "22 Commerce Avenue".to_string(),
            factory_address: "Plot 7, Industrial Estate".to_string(),
            phone: "555-0100".to_string(),
            email: "sales@paperworks.test".to_string(),
            logo_url: String::new(),
            tax_rate: 5.0,
            default_bank_account_id: Some(account.id),
        })
        .await?;
    println!("  bank account and business profile");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
