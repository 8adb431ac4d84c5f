//! Store traits backed by the local SQLite document store.

use async_trait::async_trait;
use shared::{domain::Bill, error::ApiException, protocol::BillsResponse};
use storage::Storage;
use tracing::error;
use url::Url;

fn store_failure(operation: &'static str, err: anyhow::Error) -> ApiException {
    let detail = format!("{err:#}");
    error!(operation, error = %detail, "bill store operation failed");
    ApiException::from_status(500)
}

#[async_trait]
impl crate::BillService for Storage {
    async fn list(&self) -> Result<BillsResponse, ApiException> {
        self.list_bills()
            .await
            .map(|data| BillsResponse { data })
            .map_err(|err| store_failure("list", err))
    }

    async fn create(&self, bill: &Bill) -> Result<BillsResponse, ApiException> {
        self.create_bill(bill)
            .await
            .map(|data| BillsResponse { data })
            .map_err(|err| store_failure("create", err))
    }
}

#[async_trait]
impl crate::ProofStore for Storage {
    async fn upload(
        &self,
        file_name: &str,
        mime_type: Option<&str>,
        content: &[u8],
    ) -> Result<Url, ApiException> {
        self.store_proof(file_name, mime_type, content)
            .await
            .map_err(|err| store_failure("upload", err))
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
