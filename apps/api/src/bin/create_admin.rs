//! # Create Admin
//!
//! Admins cannot sign up through the API; this tool creates one directly.
//!
//! ## Usage
//! ```bash
//! cargo run -p bazaar-api --bin create-admin -- --email admin@example.com --password 's3cret!'
//!
//! # Or from the environment
//! BAZAAR_ADMIN_EMAIL=admin@example.com BAZAAR_ADMIN_PASSWORD='s3cret!' \
//!     cargo run -p bazaar-api --bin create-admin
//!
//! # Specify database path (defaults to the server's configured path)
//! cargo run -p bazaar-api --bin create-admin -- --db ./data/bazaar.db --email ...
//! ```
//!
//! The account is created verified. An existing account with the same email
//! is left untouched.

use std::env;

use anyhow::{bail, Context};

use bazaar_api::security::hash_password;
use bazaar_api::ApiConfig;
use bazaar_core::validation::{normalize_email, validate_email, validate_password};
use bazaar_core::{NewUser, UserRole};
use bazaar_db::{Database, DbConfig};

fn print_usage() {
    println!("Bazaar admin account tool");
    println!();
    println!("Usage: create-admin [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -e, --email <EMAIL>        Admin email (or BAZAAR_ADMIN_EMAIL)");
    println!("  -p, --password <PASSWORD>  Admin password (or BAZAAR_ADMIN_PASSWORD)");
    println!("  -d, --db <PATH>            Database file path (default: configured path)");
    println!("  -h, --help                 Show this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load()?;
    bazaar_api::init_tracing("warn");

    let args: Vec<String> = env::args().collect();

    let mut email = env::var("BAZAAR_ADMIN_EMAIL").ok();
    let mut password = env::var("BAZAAR_ADMIN_PASSWORD").ok();
    let mut db_path = config.database_path.clone();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--email" | "-e" => {
                email = args.get(i + 1).cloned();
                i += 1;
            }
            "--password" | "-p" => {
                password = args.get(i + 1).cloned();
                i += 1;
            }
            "--db" | "-d" => {
                if let Some(path) = args.get(i + 1) {
                    db_path = path.clone();
                }
                i += 1;
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other => bail!("Unknown argument: {other}"),
        }
        i += 1;
    }

    let email = email.context("an admin email is required (--email or BAZAAR_ADMIN_EMAIL)")?;
    let password =
        password.context("an admin password is required (--password or BAZAAR_ADMIN_PASSWORD)")?;

    validate_email(&email)?;
    validate_password(&password)?;
    let email = normalize_email(&email);

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("Database: {db_path}");

    if let Some(existing) = db.users().get_by_email(&email).await? {
        println!(
            "An account for {} already exists (role: {}). Nothing to do.",
            existing.email, existing.role
        );
        return Ok(());
    }

    let user = db
        .users()
        .create(&NewUser {
            email,
            password_hash: hash_password(&password)?,
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            phone_number: "0000000000".to_string(),
            address: "Head office".to_string(),
            role: UserRole::Admin,
            is_verified: true,
            seller: None,
        })
        .await?;

    println!("Created admin {} ({})", user.email, user.id);
    Ok(())
}
