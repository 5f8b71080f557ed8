use serde::{Deserialize, Serialize};

use crate::models::{ProjectInfo, VoltageMeasurement};

/// Typed keys for the eleven ATP scalar fields. Keeping these as an enum
/// ties the required-field list, the wizard setters, and the cell map to the
/// same source of truth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProjectField {
    ProjectName,
    SiteId,
    SiteName,
    Address,
    Latitude,
    Longitude,
    InstallDate,
    RectifierType,
    RectifierCapacity,
    BatteryCapacity,
    SnModule,
}

impl ProjectField {
    pub const REQUIRED: [ProjectField; 11] = [
        ProjectField::ProjectName,
        ProjectField::SiteId,
        ProjectField::SiteName,
        ProjectField::Address,
        ProjectField::Latitude,
        ProjectField::Longitude,
        ProjectField::InstallDate,
        ProjectField::RectifierType,
        ProjectField::RectifierCapacity,
        ProjectField::BatteryCapacity,
        ProjectField::SnModule,
    ];

    pub fn value<'a>(&self, project: &'a ProjectInfo) -> &'a str {
        match self {
            ProjectField::ProjectName => &project.project_name,
            ProjectField::SiteId => &project.site_id,
            ProjectField::SiteName => &project.site_name,
            ProjectField::Address => &project.address,
            ProjectField::Latitude => &project.latitude,
            ProjectField::Longitude => &project.longitude,
            ProjectField::InstallDate => &project.install_date,
            ProjectField::RectifierType => &project.rectifier_type,
            ProjectField::RectifierCapacity => &project.rectifier_capacity,
            ProjectField::BatteryCapacity => &project.battery_capacity,
            ProjectField::SnModule => &project.sn_module,
        }
    }

    pub fn apply(&self, project: &mut ProjectInfo, value: String) {
        match self {
            ProjectField::ProjectName => project.project_name = value,
            ProjectField::SiteId => project.site_id = value,
            ProjectField::SiteName => project.site_name = value,
            ProjectField::Address => project.address = value,
            ProjectField::Latitude => project.latitude = value,
            ProjectField::Longitude => project.longitude = value,
            ProjectField::InstallDate => project.install_date = value,
            ProjectField::RectifierType => project.rectifier_type = value,
            ProjectField::RectifierCapacity => project.rectifier_capacity = value,
            ProjectField::BatteryCapacity => project.battery_capacity = value,
            ProjectField::SnModule => project.sn_module = value,
        }
    }
}

/// One scalar field fanned out to its destination cells on the ATP sheet.
pub struct AtpCellMap {
    pub field: ProjectField,
    pub cells: &'static [&'static str],
    /// Values rendered through the `dd-Mon-yy` date table before writing.
    pub as_date: bool,
}

/// The address table transcribed from the ATP form layout. Several values
/// repeat across the form header, the measurement section and the signature
/// block, hence the fan-out. `SnModule` is absent here: it fans out
/// positionally via `SN_MODULE_*` below.
pub const ATP_CELL_MAP: &[AtpCellMap] = &[
    AtpCellMap {
        field: ProjectField::ProjectName,
        cells: &["C5", "C31", "E59"],
        as_date: false,
    },
    AtpCellMap {
        field: ProjectField::SiteId,
        cells: &["C6", "C32"],
        as_date: false,
    },
    AtpCellMap {
        field: ProjectField::SiteName,
        cells: &["C7", "C33"],
        as_date: false,
    },
    AtpCellMap {
        field: ProjectField::Address,
        cells: &["C8"],
        as_date: false,
    },
    AtpCellMap {
        field: ProjectField::Latitude,
        cells: &["C9"],
        as_date: false,
    },
    AtpCellMap {
        field: ProjectField::Longitude,
        cells: &["D9"],
        as_date: false,
    },
    AtpCellMap {
        field: ProjectField::InstallDate,
        cells: &["C10", "F59"],
        as_date: true,
    },
    AtpCellMap {
        field: ProjectField::RectifierType,
        cells: &["C13"],
        as_date: false,
    },
    AtpCellMap {
        field: ProjectField::RectifierCapacity,
        cells: &["C14"],
        as_date: false,
    },
    AtpCellMap {
        field: ProjectField::BatteryCapacity,
        cells: &["C15"],
        as_date: false,
    },
];

/// Positional fan-out for the whitespace-delimited module serial list: token
/// N lands in `SN_MODULE_COLUMN` at `SN_MODULE_BASE_ROW + N`. Tokens past
/// the cap are dropped without feedback; the printed form has exactly twelve
/// serial rows.
pub const SN_MODULE_COLUMN: &str = "C";
pub const SN_MODULE_BASE_ROW: u32 = 18;
pub const SN_MODULE_MAX: usize = 12;

/// Destination cells `(cell, row)` for each serial token, in order.
pub fn sn_module_cells(sn_module: &str) -> Vec<(String, String)> {
    sn_module
        .split_whitespace()
        .take(SN_MODULE_MAX)
        .enumerate()
        .map(|(i, token)| {
            (
                format!("{}{}", SN_MODULE_COLUMN, SN_MODULE_BASE_ROW + i as u32),
                token.to_string(),
            )
        })
        .collect()
}

/// Typed keys for the seven acceptance readings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VoltageField {
    RToN,
    SToN,
    TToN,
    RToS,
    SToT,
    TToR,
    GToN,
}

impl VoltageField {
    pub const ALL: [VoltageField; 7] = [
        VoltageField::RToN,
        VoltageField::SToN,
        VoltageField::TToN,
        VoltageField::RToS,
        VoltageField::SToT,
        VoltageField::TToR,
        VoltageField::GToN,
    ];

    pub fn value<'a>(&self, readings: &'a VoltageMeasurement) -> &'a str {
        match self {
            VoltageField::RToN => &readings.volt_rn,
            VoltageField::SToN => &readings.volt_sn,
            VoltageField::TToN => &readings.volt_tn,
            VoltageField::RToS => &readings.volt_rs,
            VoltageField::SToT => &readings.volt_st,
            VoltageField::TToR => &readings.volt_tr,
            VoltageField::GToN => &readings.volt_gn,
        }
    }

    pub fn apply(&self, readings: &mut VoltageMeasurement, value: String) {
        match self {
            VoltageField::RToN => readings.volt_rn = value,
            VoltageField::SToN => readings.volt_sn = value,
            VoltageField::TToN => readings.volt_tn = value,
            VoltageField::RToS => readings.volt_rs = value,
            VoltageField::SToT => readings.volt_st = value,
            VoltageField::TToR => readings.volt_tr = value,
            VoltageField::GToN => readings.volt_gn = value,
        }
    }

    pub fn cell(&self) -> &'static str {
        match self {
            VoltageField::RToN => "C36",
            VoltageField::SToN => "C37",
            VoltageField::TToN => "C38",
            VoltageField::RToS => "E36",
            VoltageField::SToT => "E37",
            VoltageField::TToR => "E38",
            VoltageField::GToN => "C39",
        }
    }
}
