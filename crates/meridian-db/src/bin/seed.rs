//! # Seed Data Generator
//!
//! Populates the database with demo partners, products, prices, and
//! orders for development.
//!
//! ## Usage
//! ```bash
//! # Seed into ./meridian.db (default)
//! cargo run -p meridian-db --bin seed
//!
//! # Specify database path
//! cargo run -p meridian-db --bin seed -- --db ./data/meridian.db
//! ```
//!
//! Seeding is additive but id-stable: rerunning against the same file
//! fails on primary keys, so start from a fresh database.

use chrono::{Duration, Utc};
use std::env;
use std::error::Error;

use meridian_db::{Database, DbConfig};

const PARTNERS: &[(i64, &str, i64, i64)] = &[
    // (id, name, credit_limit_cents, credit_used_cents)
    (1, "Acme Retail", 500_000, 120_000),
    (2, "Globex Wholesale", 2_500_000, 800_000), // special: limit > 10,000.00
    (3, "Initech Services", 0, 0),               // no credit check
    (4, "Umbrella Labs", 1_200_000, 0),          // special
];

const PRODUCTS: &[(i64, &str, i64, i64)] = &[
    // (id, name, category_id, list_price_cents)
    (10, "Steel Widget", 7, 999),
    (11, "Brass Gadget", 7, 2499),
    (12, "Carbon Sprocket", 8, 5000),
    (13, "Copper Coupling", 8, 1250),
    (14, "Nylon Grommet", 9, 199),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "./meridian.db".to_string());
    println!("Seeding demo data into {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let pool = db.pool();
    let now = Utc::now();

    for (id, name, limit, used) in PARTNERS {
        sqlx::query(
            "INSERT INTO partners (id, name, is_active, is_customer, credit_limit_cents, credit_used_cents) \
             VALUES (?, ?, 1, 1, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(limit)
        .bind(used)
        .execute(pool)
        .await?;
    }

    sqlx::query("INSERT INTO taxes (id, rate_bps) VALUES (1, 825)")
        .execute(pool)
        .await?;
    sqlx::query("INSERT INTO price_list_versions (id, valid_from) VALUES (100, ?)")
        .bind(now - Duration::days(30))
        .execute(pool)
        .await?;

    for (id, name, category_id, list_cents) in PRODUCTS {
        sqlx::query("INSERT INTO products (id, name, category_id, is_active, is_sellable) VALUES (?, ?, ?, 1, 1)")
            .bind(id)
            .bind(name)
            .bind(category_id)
            .execute(pool)
            .await?;

        // standard at 90% of list, limit at 80%
        sqlx::query("INSERT INTO product_prices VALUES (?, 100, ?, ?, ?, ?)")
            .bind(id)
            .bind(list_cents)
            .bind(list_cents * 9 / 10)
            .bind(list_cents * 8 / 10)
            .bind(now)
            .execute(pool)
            .await?;
    }

    // One warehouse with two locators, generously stocked
    sqlx::query("INSERT INTO locators (id, warehouse_id) VALUES (201, 1), (202, 1)")
        .execute(pool)
        .await?;
    for (id, _, _, _) in PRODUCTS {
        sqlx::query("INSERT INTO storage VALUES (?, 201, 40), (?, 202, 60)")
            .bind(id)
            .bind(id)
            .execute(pool)
            .await?;
    }

    // A few processed orders for the sales summary
    let orders: &[(i64, i64, i64, i64)] = &[
        // (id, partner_id, grand_total_cents, days_ago)
        (300, 1, 45_000, 20),
        (301, 2, 180_000, 12),
        (302, 2, 95_000, 5),
        (303, 4, 30_000, 2),
    ];
    for (id, partner_id, total, days_ago) in orders {
        sqlx::query("INSERT INTO orders VALUES (?, ?, 1, ?, ?, 1)")
            .bind(id)
            .bind(partner_id)
            .bind(total)
            .bind(now - Duration::days(*days_ago))
            .execute(pool)
            .await?;
        sqlx::query("INSERT INTO order_lines VALUES (?, ?, 10, 3, 999, 1)")
            .bind(id + 100)
            .bind(id)
            .execute(pool)
            .await?;
    }

    println!(
        "Seeded {} partners, {} products, {} orders",
        PARTNERS.len(),
        PRODUCTS.len(),
        orders.len()
    );
    db.close().await;
    Ok(())
}

/// Parses `--db <path>` from the command line.
fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1).cloned())
}
