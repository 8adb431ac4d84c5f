use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Opaque document identifier assigned by the bill store on create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(pub String);

impl BillId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

impl std::fmt::Display for BillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_PCT: f64 = 20.0;

pub const EXPENSE_TYPES: [&str; 7] = [
    "Transports",
    "Restaurants et bars",
    "Hôtel et logement",
    "Services en ligne",
    "IT et électronique",
    "Equipement et matériel",
    "Fournitures de bureau",
];

/// Proof file extensions accepted at file selection, compared lowercase.
pub const ACCEPTED_PROOF_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BillStatus::Pending => "En attente",
            BillStatus::Accepted => "Accepté",
            BillStatus::Refused => "Refusé",
        }
    }

    /// Review only moves a bill out of `pending`; decided bills never change again.
    pub fn can_transition_to(self, next: BillStatus) -> bool {
        matches!(
            (self, next),
            (BillStatus::Pending, BillStatus::Accepted) | (BillStatus::Pending, BillStatus::Refused)
        )
    }
}

impl std::str::FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BillStatus::Pending),
            "accepted" => Ok(BillStatus::Accepted),
            "refused" => Ok(BillStatus::Refused),
            other => Err(format!("unknown bill status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BillId>,
    pub date: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pct: Option<f64>,
    #[serde(rename = "type")]
    pub expense_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: BillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_admin: Option<String>,
    pub email: String,
}

impl Bill {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Employee,
    Admin,
    #[serde(other)]
    Other,
}

/// Identity persisted under the `"user"` key by the login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "type")]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Session {
    pub fn employee(email: impl Into<String>) -> Self {
        Self {
            role: UserRole::Employee,
            email: Some(email.into()),
        }
    }
}

pub const SESSION_USER_KEY: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Login,
    Bills,
    NewBill,
    Dashboard,
}

impl Page {
    pub fn path(self) -> &'static str {
        match self {
            Page::Login => "/",
            Page::Bills => "#employee/bills",
            Page::NewBill => "#employee/bill/new",
            Page::Dashboard => "#admin/dashboard",
        }
    }
}
