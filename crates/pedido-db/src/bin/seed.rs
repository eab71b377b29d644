//! # Seed Data Generator
//!
//! Populates the database with test customers and products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 20 customers and 200 products (defaults)
//! cargo run -p pedido-db --bin seed
//!
//! # Generate custom amounts
//! cargo run -p pedido-db --bin seed -- --customers 50 --products 1000
//!
//! # Specify database path
//! cargo run -p pedido-db --bin seed -- --db ./data/pedido.db
//! ```
//!
//! ## Generated Data
//! - Customers with checksum-valid, sequential CNPJs
//! - Products across a few catalog families with deterministic prices
//!   (R$1.99 - R$9.99) and stock levels (0-100)

use std::env;

use pedido_core::cnpj::format_cnpj;
use pedido_db::{Database, DbConfig};

/// Company name stems for customer generation.
const COMPANY_STEMS: &[&str] = &[
    "Aurora",
    "Boreal",
    "Cedro",
    "Delta",
    "Estrela",
    "Farol",
    "Granito",
    "Horizonte",
    "Imbuia",
    "Jacaranda",
    "Kairos",
    "Lumen",
    "Mangue",
    "Nevoa",
    "Oceano",
    "Pampa",
    "Quartzo",
    "Riacho",
    "Serrado",
    "Tucano",
];

/// Company suffixes for customer generation.
const COMPANY_SUFFIXES: &[&str] = &["Comercio Ltda", "Distribuidora SA", "Atacado ME"];

/// Product families for catalog generation.
const PRODUCT_FAMILIES: &[(&str, &[&str])] = &[
    (
        "Ferragens",
        &[
            "Parafuso M6",
            "Parafuso M8",
            "Porca Sextavada",
            "Arruela Lisa",
            "Bucha 8mm",
            "Prego 17x21",
            "Abracadeira Nylon",
            "Rebite Pop",
        ],
    ),
    (
        "Eletrica",
        &[
            "Cabo Flexivel 2.5mm",
            "Tomada 10A",
            "Interruptor Simples",
            "Disjuntor 20A",
            "Fita Isolante",
            "Conector Wago",
            "Lampada LED 9W",
            "Eletroduto 3/4",
        ],
    ),
    (
        "Hidraulica",
        &[
            "Tubo PVC 25mm",
            "Joelho 90 25mm",
            "Registro Esfera",
            "Veda Rosca 18mm",
            "Caixa Dagua 500L",
            "Sifao Sanfonado",
            "Adaptador Curto",
            "Luva Simples",
        ],
    ),
];

/// Package sizes appended to product descriptions.
const PACK_SIZES: &[(&str, i64)] = &[
    ("un", 0),
    ("c/10", 150),
    ("c/50", 450),
    ("c/100", 800),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut customer_count: usize = 20;
    let mut product_count: usize = 200;
    let mut db_path = String::from("./pedido_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--customers" | "-c" => {
                if i + 1 < args.len() {
                    customer_count = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--products" | "-p" => {
                if i + 1 < args.len() {
                    product_count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Pedido Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --customers <N>  Number of customers to generate (default: 20)");
                println!("  -p, --products <N>   Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>      Database file path (default: ./pedido_dev.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Pedido Seed Data Generator");
    println!("=============================");
    println!("Database:  {}", db_path);
    println!("Customers: {}", customer_count);
    println!("Products:  {}", product_count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing data
    let existing_customers = db.customers().count().await?;
    let existing_products = db.products().count().await?;
    if existing_customers > 0 || existing_products > 0 {
        println!(
            "⚠ Database already has {} customers and {} products",
            existing_customers, existing_products
        );
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Generate customers
    println!();
    println!("Generating customers...");
    let start = std::time::Instant::now();

    let mut customers = 0;
    for seq in 0..customer_count {
        let stem = COMPANY_STEMS[seq % COMPANY_STEMS.len()];
        let suffix = COMPANY_SUFFIXES[seq % COMPANY_SUFFIXES.len()];
        let legal_name = format!("{} {}", stem, suffix);

        let cnpj = format_cnpj(sequential_cnpj_base(seq));
        let email = format!("contato{}@{}.example", seq, stem.to_lowercase());

        if let Err(e) = db.customers().create(&legal_name, &cnpj, &email).await {
            eprintln!("Failed to insert customer {}: {}", legal_name, e);
            continue;
        }
        customers += 1;
    }
    println!("  Generated {} customers", customers);

    // Generate products
    println!();
    println!("Generating products...");

    let mut products = 0;
    'outer: for (family_idx, (family, names)) in PRODUCT_FAMILIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (pack, price_addon) in PACK_SIZES.iter() {
                if products >= product_count {
                    break 'outer;
                }

                let seed = family_idx * 1000 + name_idx * 10 + products;
                let description = format!("{} {} ({})", name, pack, family);

                // Deterministic price R$1.99 - R$9.99 plus pack addon
                let unit_price_cents = 199 + ((seed * 17) % 800) as i64 + price_addon;
                let stock = (seed % 101) as i64;

                if let Err(e) = db
                    .products()
                    .create(&description, unit_price_cents, stock)
                    .await
                {
                    eprintln!("Failed to insert product {}: {}", description, e);
                    continue;
                }

                products += 1;
                if products % 100 == 0 {
                    println!("  Generated {} products...", products);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Generated {} customers and {} products in {:?}",
        customers, products, elapsed
    );
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds the 12-digit CNPJ base for a sequence number: a fixed prefix, the
/// sequence spread over the middle digits, and branch `0001`.
fn sequential_cnpj_base(seq: usize) -> [u32; 12] {
    let n = seq as u32;
    [
        4,
        5,
        (n / 100_000) % 10,
        (n / 10_000) % 10,
        (n / 1_000) % 10,
        (n / 100) % 10,
        (n / 10) % 10,
        n % 10,
        0,
        0,
        0,
        1,
    ]
}
