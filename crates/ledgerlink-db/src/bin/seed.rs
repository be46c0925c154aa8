//! # Demo Storefront Seeder
//!
//! Populates the storefront mirror so the daemon has something to export.
//!
//! ## Usage
//! ```bash
//! # 200 products, 25 customers, 40 orders (defaults)
//! cargo run -p ledgerlink-db --bin seed
//!
//! # Custom sizes and database path
//! cargo run -p ledgerlink-db --bin seed -- --products 1000 --customers 50 --db ./data/ledgerlink.db
//! ```
//!
//! ## Generated Data
//! - Simple products with SKU `{FAMILY}-{NNNN}`
//! - Customers with billing meta; every fifth one opts out of price lists
//! - Orders alternating completed/processing, paid by card or cash on delivery

use chrono::{Duration, Utc};
use ledgerlink_core::{
    Address, CatalogProduct, Money, Order, OrderLine, OrderStatus, ProductKind, ShippingMethod,
    StockStatus, NO_PRICE_LIST_SENTINEL, PRICE_LIST_META_KEY,
};
use ledgerlink_db::{Database, DbConfig, NewUser};
use std::collections::BTreeMap;
use std::env;

/// Product families for realistic test data
const FAMILIES: &[(&str, &[&str])] = &[
    ("TSH", &["Basic Tee", "V-Neck Tee", "Pocket Tee", "Long Sleeve Tee"]),
    ("HOD", &["Zip Hoodie", "Pullover Hoodie", "Fleece Hoodie"]),
    ("CAP", &["Baseball Cap", "Bucket Hat", "Beanie"]),
    ("BAG", &["Tote Bag", "Backpack", "Duffel Bag", "Crossbody Bag"]),
    ("MUG", &["Ceramic Mug", "Travel Mug", "Espresso Cup"]),
];

const CITIES: &[(&str, &str)] = &[
    ("Tel Aviv", "IL"),
    ("Haifa", "IL"),
    ("Jerusalem", "IL"),
    ("Berlin", "DE"),
    ("New York", "US"),
];

const FIRST_NAMES: &[&str] = &["Dana", "Noa", "Yossi", "Avi", "Maya", "Lior", "Tamar"];
const LAST_NAMES: &[&str] = &["Levi", "Cohen", "Mizrahi", "Peretz", "Biton", "Friedman"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut products: usize = 200;
    let mut customers: usize = 25;
    let mut orders: usize = 40;
    let mut db_path = String::from("./ledgerlink_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--products" | "-p" if i + 1 < args.len() => {
                products = args[i + 1].parse().unwrap_or(products);
                i += 1;
            }
            "--customers" | "-c" if i + 1 < args.len() => {
                customers = args[i + 1].parse().unwrap_or(customers);
                i += 1;
            }
            "--orders" | "-o" if i + 1 < args.len() => {
                orders = args[i + 1].parse().unwrap_or(orders);
                i += 1;
            }
            "--db" | "-d" if i + 1 < args.len() => {
                db_path = args[i + 1].clone();
                i += 1;
            }
            "--help" | "-h" => {
                println!("LedgerLink Demo Storefront Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --products <N>   Products to generate (default: 200)");
                println!("  -c, --customers <N>  Customers to generate (default: 25)");
                println!("  -o, --orders <N>     Orders to generate (default: 40)");
                println!("  -d, --db <PATH>      Database file path (default: ./ledgerlink_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 LedgerLink Demo Storefront Seeder");
    println!("====================================");
    println!("Database:  {}", db_path);
    println!("Products:  {}", products);
    println!("Customers: {}", customers);
    println!("Orders:    {}", orders);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Products
    println!();
    println!("Generating products...");
    let mut skus = Vec::with_capacity(products);
    for seed in 0..products {
        let product = generate_product(seed);
        match db.catalog().insert_product(&product).await {
            Ok(_) => skus.push(product.sku),
            Err(e) => eprintln!("Failed to insert {}: {}", product.sku, e),
        }
    }
    println!("  ✓ {} products", skus.len());

    // Customers
    println!("Generating customers...");
    let mut customer_ids = Vec::with_capacity(customers);
    for seed in 0..customers {
        match db.users().insert(&generate_customer(seed)).await {
            Ok(id) => customer_ids.push(id),
            Err(e) => eprintln!("Failed to insert customer {}: {}", seed, e),
        }
    }
    println!("  ✓ {} customers", customer_ids.len());

    // Orders
    println!("Generating orders...");
    let mut generated = 0;
    if !skus.is_empty() {
        for seed in 0..orders {
            let order = generate_order(seed, &skus, &customer_ids);
            if let Err(e) = db.orders().insert(&order).await {
                eprintln!("Failed to insert order {}: {}", order.id, e);
                continue;
            }
            generated += 1;
        }
    }
    println!("  ✓ {} orders", generated);

    println!();
    println!("✓ Seed complete in {:?}", start.elapsed());

    Ok(())
}

/// Generates a simple product with deterministic data.
fn generate_product(seed: usize) -> CatalogProduct {
    let (family, names) = FAMILIES[seed % FAMILIES.len()];
    let name = names[(seed / FAMILIES.len()) % names.len()];

    // 29.90 - 129.90
    let price = Money::from_cents(2990 + ((seed * 37) % 100) as i64 * 100);
    let quantity = (seed % 13) as i64;

    CatalogProduct {
        id: 0,
        parent_id: None,
        kind: ProductKind::Simple,
        sku: format!("{}-{:04}", family, seed),
        title: format!("{} #{}", name, seed),
        regular_price: price,
        price,
        manage_stock: seed % 3 != 0,
        stock_quantity: Some(quantity),
        stock_status: StockStatus::from_quantity(quantity),
        cross_sell_ids: Vec::new(),
    }
}

/// Generates a customer with billing meta.
fn generate_customer(seed: usize) -> NewUser {
    let first = FIRST_NAMES[seed % FIRST_NAMES.len()];
    let last = LAST_NAMES[seed % LAST_NAMES.len()];
    let (city, country) = CITIES[seed % CITIES.len()];

    let mut meta = BTreeMap::new();
    meta.insert("first_name".to_string(), first.to_string());
    meta.insert("last_name".to_string(), last.to_string());
    meta.insert("billing_first_name".to_string(), first.to_string());
    meta.insert("billing_last_name".to_string(), last.to_string());
    meta.insert("billing_address_1".to_string(), format!("{} Herzl St", seed + 1));
    meta.insert("billing_city".to_string(), city.to_string());
    meta.insert("billing_postcode".to_string(), format!("{:05}", 61000 + seed));
    meta.insert("billing_country".to_string(), country.to_string());
    meta.insert("billing_phone".to_string(), format!("05{:08}", seed * 7919));
    if seed % 5 == 4 {
        meta.insert(PRICE_LIST_META_KEY.to_string(), NO_PRICE_LIST_SENTINEL.to_string());
    }

    NewUser {
        id: None,
        email: format!("{}.{}{}@example.com", first, last, seed).to_lowercase(),
        roles: vec!["customer".to_string()],
        meta,
    }
}

/// Generates an order over existing SKUs; every seventh one is a guest order.
fn generate_order(seed: usize, skus: &[String], customer_ids: &[i64]) -> Order {
    let id = 1000 + seed as i64;
    let customer_id = if seed % 7 == 6 || customer_ids.is_empty() {
        0
    } else {
        customer_ids[seed % customer_ids.len()]
    };

    let first = FIRST_NAMES[seed % FIRST_NAMES.len()];
    let last = LAST_NAMES[(seed + 1) % LAST_NAMES.len()];
    let (city, country) = CITIES[seed % CITIES.len()];
    let billing = Address {
        first_name: first.to_string(),
        last_name: last.to_string(),
        address_1: format!("{} Rothschild Blvd", seed + 1),
        address_2: String::new(),
        city: city.to_string(),
        postcode: format!("{:05}", 65000 + seed),
        country: country.to_string(),
        phone: format!("05{:08}", seed * 104729),
    };

    let lines: Vec<OrderLine> = (0..=(seed % 3))
        .map(|n| {
            let quantity = (n + 1) as i64;
            OrderLine {
                id: id * 10 + n as i64,
                sku: Some(skus[(seed * 3 + n) % skus.len()].clone()),
                quantity,
                total: Money::from_cents(4990) * quantity,
                meta: BTreeMap::new(),
            }
        })
        .collect();

    let shipping_total = Money::from_cents(2500);
    let total = lines.iter().map(|l| l.total).sum::<Money>() + shipping_total;

    let mut meta = BTreeMap::new();
    let payment_method = if seed % 4 == 0 {
        "cod".to_string()
    } else {
        meta.insert("_ccnumber".to_string(), format!("{:04}", 1000 + seed));
        meta.insert("_creditguard_token".to_string(), format!("tok_{:06}", seed));
        meta.insert("_creditguard_expiration".to_string(), "1228".to_string());
        meta.insert("_creditguard_authorization".to_string(), format!("{:07}", seed * 31));
        meta.insert("_payments".to_string(), "1".to_string());
        "creditguard".to_string()
    };

    Order {
        id,
        number: id.to_string(),
        customer_id,
        status: if seed % 2 == 0 {
            OrderStatus::Completed
        } else {
            OrderStatus::Processing
        },
        created_at: Utc::now() - Duration::days((seed % 30) as i64),
        billing: billing.clone(),
        shipping: billing,
        shipping_method: Some(ShippingMethod {
            method_id: "flat_rate:1".to_string(),
            title: "Flat rate".to_string(),
        }),
        shipping_total,
        payment_method,
        total,
        lines,
        meta,
    }
}
