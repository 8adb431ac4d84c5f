use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{Bill, BillId, BillStatus};

/// Envelope returned by both store operations: the full collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillsResponse {
    pub data: Vec<Bill>,
}

/// One rendered row of the bills table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillRow {
    pub id: Option<BillId>,
    pub expense_type: String,
    pub name: String,
    pub date: String,
    pub amount: f64,
    pub status: BillStatus,
    pub file_url: Option<Url>,
}

impl From<&Bill> for BillRow {
    fn from(bill: &Bill) -> Self {
        Self {
            id: bill.id.clone(),
            expense_type: bill.expense_type.clone(),
            name: bill.name.clone(),
            date: bill.date.clone(),
            amount: bill.amount,
            status: bill.status,
            file_url: bill.file_url.clone(),
        }
    }
}

/// Shape handed to the bills page renderer. At most one of the three is meaningful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillsPageProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<BillRow>>,
    #[serde(default)]
    pub loading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Raw values of the create-bill form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBillForm {
    pub expense_type: String,
    pub name: String,
    pub date: String,
    pub amount: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}
