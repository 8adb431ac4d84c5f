use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    view::MODAL_ID, App, AppContext, Document, FileInput, FileSessionStore, SelectedFile,
    UiAction,
};
use desktop::{
    config::{load_settings, prepare_database_url},
    proof::resolve_proof,
};
use shared::{domain::Page, protocol::NewBillForm};
use storage::Storage;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "billed", about = "Submit and review your expense bills")]
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
    /// Show your bills, newest first.
    Bills,
    /// Open the proof of the bill at `row` (0 is the newest).
    Preview {
        row: usize,
        /// Write the proof document to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Submit a new bill, then show the refreshed list.
    NewBill {
        #[arg(long)]
        file: PathBuf,
        #[arg(long = "type")]
        expense_type: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "")]
        vat: String,
        #[arg(long, default_value = "")]
        pct: String,
        #[arg(long, default_value = "")]
        commentary: String,
    },
}

async fn proof_input(path: &Path) -> Result<FileInput> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read proof file '{}'", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut file = SelectedFile::new(name, content);
    if let Some(mime) = mime_guess::from_path(path).first() {
        file = file.with_mime_type(mime.essence_str());
    }
    Ok(FileInput::with_file(file))
}

async fn actions_for(command: Command) -> Result<Vec<UiAction>> {
    Ok(match command {
        Command::Bills => vec![UiAction::Navigate(Page::Bills)],
        Command::Preview { row, .. } => vec![
            UiAction::Navigate(Page::Bills),
            UiAction::ClickIconEye { row },
        ],
        Command::NewBill {
            file,
            expense_type,
            name,
            date,
            amount,
            vat,
            pct,
            commentary,
        } => vec![
            UiAction::Navigate(Page::NewBill),
            UiAction::ChangeFile(proof_input(&file).await?),
            UiAction::Submit(NewBillForm {
                expense_type,
                name,
                date,
                amount,
                vat,
                pct,
                commentary,
            }),
        ],
    })
}

/// Source of the proof image when the modal is open.
fn modal_proof_src(document: &Document) -> Option<String> {
    let modal = document
        .get_element_by_id(MODAL_ID)
        .filter(|modal| modal.has_class("show"))?;
    let image = modal.find(&|el| el.tag == "img")?;
    Some(image.attr("src").unwrap_or_default().to_string())
}

async fn show_proof(storage: &Storage, src: &str, out: Option<&Path>) -> Result<()> {
    let Some(proof) = resolve_proof(storage, src).await? else {
        println!("proof: {src}");
        return Ok(());
    };
    println!(
        "proof: {} ({}, {} bytes)",
        proof.file_name,
        proof.mime_type.as_deref().unwrap_or("unknown type"),
        proof.size_bytes
    );
    if let Some(out) = out {
        tokio::fs::write(out, &proof.content)
            .await
            .with_context(|| format!("failed to write proof to '{}'", out.display()))?;
        println!("written to {}", out.display());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let settings = load_settings().with_overrides(cli.database_url, cli.session_path);

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Arc::new(
        Storage::new(&database_url)
            .await
            .with_context(|| format!("failed to open bill store at '{database_url}'"))?,
    );
    storage.health_check().await?;
    let app = App::new(AppContext {
        bills: storage.clone(),
        proofs: storage.clone(),
        session: Arc::new(FileSessionStore::new(&settings.session_path)),
    });

    let proof_out = match &cli.command {
        Command::Preview { out, .. } => Some(out.clone()),
        _ => None,
    };
    let actions = actions_for(cli.command).await?;
    let (tx, rx) = mpsc::channel(actions.len().max(1));
    for action in actions {
        tx.send(action).await.context("app loop closed early")?;
    }
    drop(tx);

    let document = app.run(rx).await;
    println!("{}", document.text_content());
    if let Some(out) = proof_out {
        if let Some(src) = modal_proof_src(&document) {
            show_proof(&storage, &src, out.as_deref()).await?;
        }
    }
    Ok(())
}
