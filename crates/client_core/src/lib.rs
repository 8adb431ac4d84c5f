use async_trait::async_trait;
use shared::{
    domain::{Bill, Page},
    error::{ApiException, ErrorCode},
    protocol::BillsResponse,
};
use url::Url;

pub mod app;
mod backend;
pub mod controller;
pub mod fixtures;
pub mod session;
pub mod view;

pub use app::{ActivePage, App, AppContext, ChannelNavigator, UiAction};
pub use controller::{
    bills::{sort_descending, BillsController},
    events::{FileInput, SelectedFile, SubmitEvent, SubmitOutcome, ViewState},
    new_bill::{bill_from_form, is_accepted_proof, NewBillController},
};
pub use session::{read_session, FileSessionStore, MemorySessionStore, SessionError};
pub use view::{Document, Element, SharedDocument};

/// Remote document store holding every submitted bill.
#[async_trait]
pub trait BillService: Send + Sync {
    async fn list(&self) -> Result<BillsResponse, ApiException>;
    /// Persists `bill` and answers with the updated collection.
    async fn create(&self, bill: &Bill) -> Result<BillsResponse, ApiException>;
}

/// Upload target for proof documents.
#[async_trait]
pub trait ProofStore: Send + Sync {
    async fn upload(
        &self,
        file_name: &str,
        mime_type: Option<&str>,
        content: &[u8],
    ) -> Result<Url, ApiException>;
}

/// Persisted key-value store written by the login flow.
pub trait SessionStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, page: Page);
}

/// Stand-in used when no store has been wired up.
pub struct UnavailableBillService;

#[async_trait]
impl BillService for UnavailableBillService {
    async fn list(&self) -> Result<BillsResponse, ApiException> {
        Err(ApiException::new(
            ErrorCode::Unavailable,
            "bill store unavailable",
        ))
    }

    async fn create(&self, _bill: &Bill) -> Result<BillsResponse, ApiException> {
        Err(ApiException::new(
            ErrorCode::Unavailable,
            "bill store unavailable",
        ))
    }
}

#[async_trait]
impl ProofStore for UnavailableBillService {
    async fn upload(
        &self,
        file_name: &str,
        _mime_type: Option<&str>,
        _content: &[u8],
    ) -> Result<Url, ApiException> {
        Err(ApiException::new(
            ErrorCode::Unavailable,
            format!("proof store unavailable for '{file_name}'"),
        ))
    }
}

#[cfg(test)]
mod test_support;
