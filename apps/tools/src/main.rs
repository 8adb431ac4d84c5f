use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{fixtures, FileSessionStore};
use desktop::config::{load_settings, prepare_database_url};
use shared::domain::{BillId, BillStatus, Session, UserRole};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    session_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert the sample bills.
    Seed,
    /// Store the signed-in user the way the login page does.
    SetSession {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "employee")]
        role: String,
    },
    /// Accept or refuse a pending bill.
    Review {
        bill_id: String,
        #[arg(long)]
        status: String,
        #[arg(long)]
        comment: Option<String>,
    },
}

async fn open_storage(raw_database_url: &str) -> Result<Storage> {
    let database_url = prepare_database_url(raw_database_url)?;
    info!(%database_url, "opening bill store");
    Storage::new(&database_url)
        .await
        .with_context(|| format!("failed to open bill store at '{database_url}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let settings = load_settings().with_overrides(cli.database_url, cli.session_path);

    match cli.command {
        Command::Seed => {
            let storage = open_storage(&settings.database_url).await?;
            let mut total = 0;
            for bill in fixtures::bills() {
                total = storage.import_bill(&bill).await?.len();
            }
            println!("seeded sample bills; store now holds {total}");
        }
        Command::SetSession { email, role } => {
            let role = if role.eq_ignore_ascii_case("admin") {
                UserRole::Admin
            } else {
                UserRole::Employee
            };
            let store = FileSessionStore::new(&settings.session_path);
            store.set_session(&Session {
                role,
                email: Some(email.clone()),
            })?;
            println!(
                "session for {email} written to {}",
                store.path().display()
            );
        }
        Command::Review {
            bill_id,
            status,
            comment,
        } => {
            let status: BillStatus = status.parse().map_err(|e: String| anyhow!(e))?;
            let storage = open_storage(&settings.database_url).await?;
            let bill = storage
                .review_bill(&BillId(bill_id), status, comment.as_deref())
                .await?;
            println!(
                "bill {} is now {}",
                bill.id.map(|id| id.0).unwrap_or_default(),
                bill.status.as_str()
            );
        }
    }

    Ok(())
}
