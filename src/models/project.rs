use serde::{Deserialize, Serialize};

use super::SourceRecord;

/// Scalar fields collected by the wizard. All values are kept as entered
/// (numbers included) so the form round-trips exactly what the user typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub project_name: String,
    pub site_id: String,
    pub site_name: String,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
    /// ISO date (`YYYY-MM-DD`); rendered as `dd-Mon-yy` in the documents.
    pub install_date: String,
    pub rectifier_type: String,
    pub rectifier_capacity: String,
    pub battery_capacity: String,
    /// Whitespace-delimited module serial numbers.
    pub sn_module: String,
}

impl ProjectInfo {
    /// One-time pre-population from a selected record. Every field stays
    /// overwritable by the user afterwards.
    pub fn from_record(record: &SourceRecord) -> Self {
        Self {
            project_name: String::new(),
            site_id: record.site_id.clone(),
            site_name: record.site_name.clone(),
            address: record.address.clone(),
            latitude: record.latitude.clone(),
            longitude: record.longitude.clone(),
            install_date: record.install_date.clone().unwrap_or_default(),
            rectifier_type: record.rectifier_type.clone(),
            rectifier_capacity: record.rectifier_capacity.clone(),
            battery_capacity: record.battery_capacity.clone(),
            sn_module: String::new(),
        }
    }
}

/// The seven AC/DC readings taken at acceptance, numeric-as-text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoltageMeasurement {
    pub volt_rn: String,
    pub volt_sn: String,
    pub volt_tn: String,
    pub volt_rs: String,
    pub volt_st: String,
    pub volt_tr: String,
    pub volt_gn: String,
}
