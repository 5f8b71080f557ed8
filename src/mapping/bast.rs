use chrono::NaiveDate;

use crate::mapping::atp::ProjectField;
use crate::render::date::format_date_field;
use crate::wizard::WizardSession;

/// The three fields the BAST gate requires; the remaining placeholders are
/// optional and substitute the empty string when absent.
pub const BAST_REQUIRED: [ProjectField; 3] = [
    ProjectField::SiteId,
    ProjectField::SiteName,
    ProjectField::InstallDate,
];

/// Everything the BAST template can reference. Substitution is a single
/// pass; placeholders the template does not contain are simply unused, and
/// placeholders this table does not contain stay literal in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BastField {
    SiteId,
    SiteName,
    InstallDate,
    ProjectName,
    Address,
    Latitude,
    Longitude,
    Counterparty,
    Region,
    HandoverDate,
}

pub struct BastPlaceholder {
    pub field: BastField,
    pub placeholder: &'static str,
}

pub const BAST_PLACEHOLDER_MAP: &[BastPlaceholder] = &[
    BastPlaceholder {
        field: BastField::SiteId,
        placeholder: "site_id",
    },
    BastPlaceholder {
        field: BastField::SiteName,
        placeholder: "site_name",
    },
    BastPlaceholder {
        field: BastField::InstallDate,
        placeholder: "install_date",
    },
    BastPlaceholder {
        field: BastField::ProjectName,
        placeholder: "project_name",
    },
    BastPlaceholder {
        field: BastField::Address,
        placeholder: "site_address",
    },
    BastPlaceholder {
        field: BastField::Latitude,
        placeholder: "latitude",
    },
    BastPlaceholder {
        field: BastField::Longitude,
        placeholder: "longitude",
    },
    BastPlaceholder {
        field: BastField::Counterparty,
        placeholder: "counterparty",
    },
    BastPlaceholder {
        field: BastField::Region,
        placeholder: "region",
    },
    BastPlaceholder {
        field: BastField::HandoverDate,
        placeholder: "handover_date",
    },
];

impl BastField {
    fn value(&self, session: &WizardSession, today: NaiveDate) -> String {
        let project = &session.project;
        match self {
            BastField::SiteId => project.site_id.clone(),
            BastField::SiteName => project.site_name.clone(),
            BastField::InstallDate => format_date_field(&project.install_date),
            BastField::ProjectName => project.project_name.clone(),
            BastField::Address => project.address.clone(),
            BastField::Latitude => project.latitude.clone(),
            BastField::Longitude => project.longitude.clone(),
            BastField::Counterparty => session
                .counterparty
                .map(|cp| cp.label().to_string())
                .unwrap_or_default(),
            BastField::Region => session
                .region
                .map(|region| region.label().to_string())
                .unwrap_or_default(),
            BastField::HandoverDate => crate::render::date::short_date(today),
        }
    }
}

/// Resolved `(placeholder, value)` pairs for one substitution pass. Missing
/// optional values become empty strings, never a literal null marker.
pub fn substitutions(session: &WizardSession, today: NaiveDate) -> Vec<(String, String)> {
    BAST_PLACEHOLDER_MAP
        .iter()
        .map(|entry| {
            (
                entry.placeholder.to_string(),
                entry.field.value(session, today),
            )
        })
        .collect()
}
