//! UI inputs delivered to controllers and the state they expose back.

use shared::{
    domain::Bill,
    protocol::{BillRow, BillsPageProps, NewBillForm},
};

/// What the bills page currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Ready(Vec<Bill>),
    Error(String),
}

impl ViewState {
    pub fn props(&self) -> BillsPageProps {
        match self {
            ViewState::Loading => BillsPageProps {
                loading: true,
                ..BillsPageProps::default()
            },
            ViewState::Ready(bills) => BillsPageProps {
                data: Some(bills.iter().map(BillRow::from).collect()),
                ..BillsPageProps::default()
            },
            ViewState::Error(message) => BillsPageProps {
                error: Some(message.clone()),
                ..BillsPageProps::default()
            },
        }
    }

    pub fn bills(&self) -> Option<&[Bill]> {
        match self {
            ViewState::Ready(bills) => Some(bills),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            content: content.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// State of the proof file input after a change event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInput {
    pub value: String,
    pub files: Vec<SelectedFile>,
}

impl FileInput {
    pub fn with_file(file: SelectedFile) -> Self {
        Self {
            value: file.name.clone(),
            files: vec![file],
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.files.clear();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitEvent {
    pub form: NewBillForm,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(form: NewBillForm) -> Self {
        Self {
            form,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The store accepted the bill; `total` is the size of the returned collection.
    Created { total: usize },
    Failed { message: String },
}
