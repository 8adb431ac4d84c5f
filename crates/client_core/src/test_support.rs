use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::{
    domain::{Bill, BillId, Page, Session},
    error::ApiException,
    protocol::BillsResponse,
};
use url::Url;

use crate::{
    fixtures,
    view::{shared_document, Document, SharedDocument},
    BillService, MemorySessionStore, Navigator, ProofStore,
};

pub struct TestBillService {
    pub bills: Arc<Mutex<Vec<Bill>>>,
    pub list_calls: Arc<Mutex<u32>>,
    pub created: Arc<Mutex<Vec<Bill>>>,
    fail_list: Option<ApiException>,
    fail_create: Option<ApiException>,
}

impl TestBillService {
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            bills: Arc::new(Mutex::new(bills)),
            list_calls: Arc::new(Mutex::new(0)),
            created: Arc::new(Mutex::new(Vec::new())),
            fail_list: None,
            fail_create: None,
        }
    }

    pub fn seeded() -> Self {
        Self::with_bills(fixtures::bills())
    }

    pub fn failing_list(mut self, err: ApiException) -> Self {
        self.fail_list = Some(err);
        self
    }

    pub fn failing_create(mut self, err: ApiException) -> Self {
        self.fail_create = Some(err);
        self
    }

    pub fn list_calls(&self) -> u32 {
        *self.list_calls.lock().expect("list calls")
    }

    pub fn created(&self) -> Vec<Bill> {
        self.created.lock().expect("created").clone()
    }
}

#[async_trait]
impl BillService for TestBillService {
    async fn list(&self) -> Result<BillsResponse, ApiException> {
        *self.list_calls.lock().expect("list calls") += 1;
        if let Some(err) = &self.fail_list {
            return Err(err.clone());
        }
        Ok(BillsResponse {
            data: self.bills.lock().expect("bills").clone(),
        })
    }

    async fn create(&self, bill: &Bill) -> Result<BillsResponse, ApiException> {
        self.created.lock().expect("created").push(bill.clone());
        if let Some(err) = &self.fail_create {
            return Err(err.clone());
        }
        let mut bills = self.bills.lock().expect("bills");
        let mut stored = bill.clone();
        stored.id.get_or_insert_with(BillId::generate);
        bills.push(stored);
        Ok(BillsResponse {
            data: bills.clone(),
        })
    }
}

#[derive(Default)]
pub struct TestProofStore {
    pub uploads: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

#[async_trait]
impl ProofStore for TestProofStore {
    async fn upload(
        &self,
        file_name: &str,
        _mime_type: Option<&str>,
        _content: &[u8],
    ) -> Result<Url, ApiException> {
        if self.fail {
            return Err(ApiException::from_status(500));
        }
        self.uploads
            .lock()
            .expect("uploads")
            .push(file_name.to_string());
        Ok(Url::parse("https://files.example.com/proofs/")
            .and_then(|base| base.join(file_name))
            .expect("proof url"))
    }
}

#[derive(Default, Clone)]
pub struct RecordingNavigator {
    pub pages: Arc<Mutex<Vec<Page>>>,
}

impl RecordingNavigator {
    pub fn pages(&self) -> Vec<Page> {
        self.pages.lock().expect("pages").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, page: Page) {
        self.pages.lock().expect("pages").push(page);
    }
}

pub fn employee_session(email: &str) -> Arc<MemorySessionStore> {
    Arc::new(MemorySessionStore::with_session(&Session::employee(email)).expect("session"))
}

pub fn empty_document() -> SharedDocument {
    shared_document(Document::default())
}
