//! # Seed Data Generator
//!
//! Populates a database with demo catalog data for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p vendra-db --bin seed
//! cargo run -p vendra-db --bin seed -- --db ./data/vendra.db
//! ```

use chrono::Utc;
use std::env;
use uuid::Uuid;
use vendra_core::{Coupon, Product};
use vendra_db::{Database, DbConfig};

const PRODUCTS: &[(&str, i64, i64)] = &[
    ("Canvas Tote Bag", 1999, 120),
    ("Stainless Water Bottle", 2499, 80),
    ("Wireless Earbuds", 5999, 45),
    ("Desk Lamp", 3499, 60),
    ("Ceramic Mug", 1299, 200),
    ("Notebook A5", 899, 150),
    ("Phone Stand", 1599, 90),
    ("Laptop Sleeve 13\"", 2899, 70),
];

const COUPONS: &[(&str, i64)] = &[("SAVE10", 10), ("SAVE25", 25), ("WELCOME5", 5)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "./vendra.db".to_string());
    println!("Seeding database at {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let now = Utc::now();

    for (name, price_cents, stock) in PRODUCTS {
        db.products()
            .insert(&Product {
                id: Uuid::new_v4().to_string(),
                name: (*name).to_string(),
                price_cents: *price_cents,
                stock_quantity: *stock,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    println!("Inserted {} products", PRODUCTS.len());

    for (name, percent) in COUPONS {
        db.coupons()
            .insert(&Coupon {
                name: (*name).to_string(),
                discount_percent: *percent,
                created_at: now,
            })
            .await?;
    }
    println!("Inserted {} coupons", COUPONS.len());

    db.close().await;
    Ok(())
}

/// Parses `--db <path>` from argv.
fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}
