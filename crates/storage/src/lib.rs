use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use url::Url;
use uuid::Uuid;

use shared::domain::{Bill, BillId, BillStatus};

/// Base of the URLs handed out for stored proof documents.
pub const PROOF_URL_BASE: &str = "proof://local/";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredProof {
    pub proof_id: String,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub content: Vec<u8>,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

const BILL_COLUMNS: &str = "id, date, amount, vat, pct, expense_type, name, commentary, \
     file_url, file_name, status, comment_admin, email";

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `sqlite::memory:` opens its own empty database.
        let max_connections = if is_memory_url(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Every stored bill in insertion order.
    pub async fn list_bills(&self) -> Result<Vec<Bill>> {
        let rows = sqlx::query(&format!(
            "SELECT {BILL_COLUMNS} FROM bills ORDER BY rowid ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list bills")?;
        rows.iter().map(bill_from_row).collect()
    }

    pub async fn load_bill(&self, bill_id: &BillId) -> Result<Option<Bill>> {
        let row = sqlx::query(&format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = ?"))
            .bind(&bill_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(bill_from_row).transpose()
    }

    /// Stores a newly submitted bill and returns the updated collection.
    /// New bills always start out `pending` with no reviewer comment.
    pub async fn create_bill(&self, bill: &Bill) -> Result<Vec<Bill>> {
        let submitted = Bill {
            status: BillStatus::Pending,
            comment_admin: None,
            ..bill.clone()
        };
        self.insert_bill(&submitted).await?;
        self.list_bills().await
    }

    /// Stores `bill` exactly as given, review outcome included. Used to load
    /// existing records, never for new submissions.
    pub async fn import_bill(&self, bill: &Bill) -> Result<Vec<Bill>> {
        self.insert_bill(bill).await?;
        self.list_bills().await
    }

    async fn insert_bill(&self, bill: &Bill) -> Result<()> {
        let bill_id = bill.id.clone().unwrap_or_else(BillId::generate);
        sqlx::query(
            r#"
            INSERT INTO bills (
                id, date, amount, vat, pct, expense_type, name, commentary,
                file_url, file_name, status, comment_admin, email
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&bill_id.0)
        .bind(&bill.date)
        .bind(bill.amount)
        .bind(bill.vat)
        .bind(bill.pct)
        .bind(&bill.expense_type)
        .bind(&bill.name)
        .bind(bill.commentary.as_deref())
        .bind(bill.file_url.as_ref().map(Url::as_str))
        .bind(bill.file_name.as_deref())
        .bind(bill.status.as_str())
        .bind(bill.comment_admin.as_deref())
        .bind(&bill.email)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to insert bill {bill_id}"))?;
        Ok(())
    }

    /// Records a reviewer decision. Only `pending` bills can be decided.
    pub async fn review_bill(
        &self,
        bill_id: &BillId,
        status: BillStatus,
        comment_admin: Option<&str>,
    ) -> Result<Bill> {
        let current = self
            .load_bill(bill_id)
            .await?
            .ok_or_else(|| anyhow!("bill {bill_id} not found"))?;
        if !current.status.can_transition_to(status) {
            bail!(
                "bill {bill_id} cannot move from {} to {}",
                current.status.as_str(),
                status.as_str()
            );
        }

        sqlx::query("UPDATE bills SET status = ?, comment_admin = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(comment_admin)
            .bind(&bill_id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to review bill {bill_id}"))?;

        Ok(Bill {
            status,
            comment_admin: comment_admin.map(str::to_string),
            ..current
        })
    }

    /// Stores an uploaded proof document and returns the URL it is served under.
    pub async fn store_proof(
        &self,
        file_name: &str,
        mime_type: Option<&str>,
        content: &[u8],
    ) -> Result<Url> {
        let proof_id = Uuid::new_v4().simple().to_string();
        let size_bytes = i64::try_from(content.len()).unwrap_or(i64::MAX);
        sqlx::query(
            "INSERT INTO proofs (id, file_name, mime_type, content, size_bytes) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&proof_id)
        .bind(file_name)
        .bind(mime_type)
        .bind(content)
        .bind(size_bytes)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to store proof '{file_name}'"))?;

        proof_url(&proof_id, file_name)
    }

    pub async fn load_proof(&self, proof_id: &str) -> Result<Option<StoredProof>> {
        let row = sqlx::query(
            "SELECT id, file_name, mime_type, content, size_bytes, created_at FROM proofs WHERE id = ?",
        )
        .bind(proof_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| StoredProof {
            proof_id: r.get::<String, _>(0),
            file_name: r.get::<String, _>(1),
            mime_type: r.get::<Option<String>, _>(2),
            content: r.get::<Vec<u8>, _>(3),
            size_bytes: r.get::<i64, _>(4).max(0) as u64,
            created_at: r.get::<DateTime<Utc>, _>(5),
        }))
    }
}

/// Extracts the proof id from a URL produced by [`Storage::store_proof`].
pub fn proof_id_from_url(url: &Url) -> Option<String> {
    if url.scheme() != "proof" || url.host_str() != Some("local") {
        return None;
    }
    url.path_segments()?
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn proof_url(proof_id: &str, file_name: &str) -> Result<Url> {
    let mut url = Url::parse(PROOF_URL_BASE)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("proof base url cannot carry a path"))?
        .clear()
        .push(proof_id)
        .push(file_name);
    Ok(url)
}

fn bill_from_row(row: &SqliteRow) -> Result<Bill> {
    let id: String = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let status = BillStatus::from_str(&status).map_err(|e| anyhow!("bill {id}: {e}"))?;
    let file_url = row
        .try_get::<Option<String>, _>("file_url")?
        .map(|raw| Url::parse(&raw).with_context(|| format!("bill {id}: bad file url '{raw}'")))
        .transpose()?;

    Ok(Bill {
        date: row.try_get("date")?,
        amount: row.try_get("amount")?,
        vat: row.try_get("vat")?,
        pct: row.try_get("pct")?,
        expense_type: row.try_get("expense_type")?,
        name: row.try_get("name")?,
        commentary: row.try_get("commentary")?,
        file_url,
        file_name: row.try_get("file_name")?,
        status,
        comment_admin: row.try_get("comment_admin")?,
        email: row.try_get("email")?,
        id: Some(BillId(id)),
    })
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
