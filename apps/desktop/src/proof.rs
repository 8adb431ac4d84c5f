use anyhow::{Context, Result};
use storage::{proof_id_from_url, Storage, StoredProof};
use url::Url;

/// Looks up the stored proof behind a modal image source. Sources that
/// are not proof URLs of this store resolve to `None`.
pub async fn resolve_proof(storage: &Storage, src: &str) -> Result<Option<StoredProof>> {
    let Ok(url) = Url::parse(src) else {
        return Ok(None);
    };
    let Some(proof_id) = proof_id_from_url(&url) else {
        return Ok(None);
    };
    storage
        .load_proof(&proof_id)
        .await
        .with_context(|| format!("failed to load proof {proof_id}"))
}

#[cfg(test)]
#[path = "tests/proof_tests.rs"]
mod tests;
