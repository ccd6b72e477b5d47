//! Admin management CLI.
//!
//! Usage:
//! ```bash
//! # Create a superuser (prompts for the password twice)
//! cargo run --bin curator-admin -- create-superuser --username admin
//!
//! # Non-interactive
//! cargo run --bin curator-admin -- create-superuser --username admin --password s3cret
//! ```

use clap::{Parser, Subcommand};
use curator_sdk::auth::principal::{user_spec, PrincipalStore};
use curator_sdk::model::registry::ModelRegistry;
use curator_sdk::store::ensure_admin_tables;
use std::io::{BufRead, Write};

#[derive(Parser)]
#[command(name = "curator-admin", about = "Curator admin management")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Database URL override (default: DATABASE_URL env)
    #[arg(long)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a super user with admin access.
    CreateSuperuser {
        /// The username for the admin.
        #[arg(long)]
        username: String,

        /// The password for the admin; prompted and confirmed when omitted.
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("curator_sdk=info")),
        )
        .init();

    let args = Args::parse();
    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or("DATABASE_URL is not set")?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    match args.command {
        Command::CreateSuperuser { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            ensure_admin_tables(&pool).await?;
            let mut registry = ModelRegistry::new();
            registry.register(user_spec())?;
            let user =
                PrincipalStore::create(&pool, &registry, &username, &password, true).await?;
            println!("Superuser {} created!", user.username);
        }
    }
    Ok(())
}

fn prompt_password() -> Result<String, Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    print!("Password: ");
    std::io::stdout().flush()?;
    let first = lines.next().ok_or("no input")??;
    print!("Repeat for confirmation: ");
    std::io::stdout().flush()?;
    let second = lines.next().ok_or("no input")??;
    if first != second {
        return Err("passwords do not match".into());
    }
    if first.is_empty() {
        return Err("password must not be empty".into());
    }
    Ok(first)
}
