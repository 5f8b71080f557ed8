use serde::{Deserialize, Serialize};

/// Every required evidence position in the ATP photo section. The catalog in
/// `photos::catalog` assigns each slot a display group and an embedding
/// coordinate.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "camelCase")]
pub enum PhotoSlot {
    TowerProfile,
    ShelterExterior,
    ShelterInterior,
    RectifierBefore,
    RectifierAfter,
    RectifierModules,
    RectifierSerial,
    BatteryBankA,
    BatteryBankB,
    BatterySerial,
    AcBreaker,
    DcDistribution,
    Grounding,
    MeterReading,
    TeamPhoto,
    SiteSignage,
}

impl PhotoSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoSlot::TowerProfile => "tower_profile",
            PhotoSlot::ShelterExterior => "shelter_exterior",
            PhotoSlot::ShelterInterior => "shelter_interior",
            PhotoSlot::RectifierBefore => "rectifier_before",
            PhotoSlot::RectifierAfter => "rectifier_after",
            PhotoSlot::RectifierModules => "rectifier_modules",
            PhotoSlot::RectifierSerial => "rectifier_serial",
            PhotoSlot::BatteryBankA => "battery_bank_a",
            PhotoSlot::BatteryBankB => "battery_bank_b",
            PhotoSlot::BatterySerial => "battery_serial",
            PhotoSlot::AcBreaker => "ac_breaker",
            PhotoSlot::DcDistribution => "dc_distribution",
            PhotoSlot::Grounding => "grounding",
            PhotoSlot::MeterReading => "meter_reading",
            PhotoSlot::TeamPhoto => "team_photo",
            PhotoSlot::SiteSignage => "site_signage",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PhotoFormat {
    Png,
    Jpeg,
}

impl PhotoFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(PhotoFormat::Png),
            "jpg" | "jpeg" => Some(PhotoFormat::Jpeg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            PhotoFormat::Png => "png",
            PhotoFormat::Jpeg => "jpeg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            PhotoFormat::Png => "image/png",
            PhotoFormat::Jpeg => "image/jpeg",
        }
    }
}

/// One uploaded evidence photo. Replaced wholesale on re-upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoAsset {
    pub slot: PhotoSlot,
    /// Original upload, embedded into the workbook untouched.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Downscaled base64 data URL for the wizard's slot preview.
    pub preview: String,
    pub format: PhotoFormat,
}
