use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DocStatus {
    Pending,
    Done,
}

impl DocStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocStatus::Pending => "Pending",
            DocStatus::Done => "Done",
        }
    }
}

/// Snapshot of an installation record as fetched from the record store.
/// The pipeline treats this as read-only input; only the document-status
/// columns are ever written back, through `Database::update_status_field`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    pub id: String,
    pub site_id: String,
    pub site_name: String,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
    /// ISO date (`YYYY-MM-DD`) when the install was completed, if recorded.
    pub install_date: Option<String>,
    pub rectifier_type: String,
    pub rectifier_capacity: String,
    pub battery_capacity: String,
    pub atp_status: DocStatus,
    pub bast_status: DocStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SourceRecord {
    /// Fresh pending record with a generated id, for seeding the store.
    pub fn new(site_id: impl Into<String>, site_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            site_id: site_id.into(),
            site_name: site_name.into(),
            address: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            install_date: None,
            rectifier_type: String::new(),
            rectifier_capacity: String::new(),
            battery_capacity: String::new(),
            atp_status: DocStatus::Pending,
            bast_status: DocStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
