use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mapping::{ProjectField, VoltageField};
use crate::models::{PhotoAsset, PhotoSlot, ProjectInfo, SourceRecord, VoltageMeasurement};
use crate::templates::{Counterparty, Region};

use super::gate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DocKind {
    Atp,
    Bast,
}

/// The named wizard steps, in the order a user walks them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    SelectSite,
    ProjectDetails,
    Measurements,
    Photos,
    Review,
}

impl WizardStep {
    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::SelectSite => "select-site",
            WizardStep::ProjectDetails => "project-details",
            WizardStep::Measurements => "measurements",
            WizardStep::Photos => "photos",
            WizardStep::Review => "review",
        }
    }
}

const ATP_STEPS: [WizardStep; 5] = [
    WizardStep::SelectSite,
    WizardStep::ProjectDetails,
    WizardStep::Measurements,
    WizardStep::Photos,
    WizardStep::Review,
];

const BAST_STEPS: [WizardStep; 3] = [
    WizardStep::SelectSite,
    WizardStep::ProjectDetails,
    WizardStep::Review,
];

impl DocKind {
    pub fn steps(&self) -> &'static [WizardStep] {
        match self {
            DocKind::Atp => &ATP_STEPS,
            DocKind::Bast => &BAST_STEPS,
        }
    }
}

/// The aggregate wizard state. A plain value with pure transition methods;
/// all I/O lives in `WizardController`. Not persisted anywhere: navigating
/// away discards the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSession {
    pub kind: DocKind,
    step_index: usize,
    pub record: Option<SourceRecord>,
    pub project: ProjectInfo,
    pub measurements: VoltageMeasurement,
    pub counterparty: Option<Counterparty>,
    pub region: Option<Region>,
    #[serde(skip)]
    pub photos: BTreeMap<PhotoSlot, PhotoAsset>,
    pub generated: bool,
}

impl WizardSession {
    pub fn new(kind: DocKind) -> Self {
        Self {
            kind,
            step_index: 0,
            record: None,
            project: ProjectInfo::default(),
            measurements: VoltageMeasurement::default(),
            counterparty: None,
            region: None,
            photos: BTreeMap::new(),
            generated: false,
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.kind.steps()[self.step_index]
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn is_last_step(&self) -> bool {
        self.step_index + 1 == self.kind.steps().len()
    }

    /// Advance one step iff the current step's gate passes. A blocked
    /// advance is a no-op, mirroring a disabled button.
    pub fn next(&mut self) -> bool {
        if self.is_last_step() || !gate::step_complete(self, self.current_step()) {
            return false;
        }
        self.step_index += 1;
        true
    }

    /// Step back; a no-op on the first step.
    pub fn previous(&mut self) -> bool {
        if self.step_index == 0 {
            return false;
        }
        self.step_index -= 1;
        true
    }

    /// Full value reset back to step 1. Used both for explicit reset and for
    /// starting a fresh document after a successful generation.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind);
    }

    /// Select the source record and pre-populate matching project fields
    /// (one-time; the user may overwrite any of them afterwards).
    pub fn select_record(&mut self, record: SourceRecord) {
        self.project = ProjectInfo::from_record(&record);
        self.record = Some(record);
    }

    pub fn set_project_field(&mut self, field: ProjectField, value: String) {
        field.apply(&mut self.project, value);
    }

    pub fn set_voltage_field(&mut self, field: VoltageField, value: String) {
        field.apply(&mut self.measurements, value);
    }

    pub fn set_counterparty(&mut self, counterparty: Counterparty) {
        self.counterparty = Some(counterparty);
    }

    pub fn set_region(&mut self, region: Region) {
        self.region = Some(region);
    }

    /// Insert or replace the asset for its slot.
    pub fn set_photo(&mut self, asset: PhotoAsset) {
        self.photos.insert(asset.slot, asset);
    }

    pub fn remove_photo(&mut self, slot: PhotoSlot) -> bool {
        self.photos.remove(&slot).is_some()
    }
}
