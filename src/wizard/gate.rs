//! Per-step completeness predicates. Pure functions over the session value:
//! same inputs, same booleans. A step is binary complete/incomplete, no
//! soft-allow.

use crate::mapping::atp::ProjectField;
use crate::mapping::bast::BAST_REQUIRED;
use crate::mapping::VoltageField;
use crate::photos;

use super::state::{DocKind, WizardSession, WizardStep};

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn step_complete(session: &WizardSession, step: WizardStep) -> bool {
    match step {
        WizardStep::SelectSite => match session.kind {
            DocKind::Atp => session.record.is_some(),
            // BAST picks the counterparty alongside the site.
            DocKind::Bast => session.record.is_some() && session.counterparty.is_some(),
        },
        WizardStep::ProjectDetails => match session.kind {
            DocKind::Atp => ProjectField::REQUIRED
                .iter()
                .all(|field| filled(field.value(&session.project))),
            DocKind::Bast => {
                session.region.is_some()
                    && BAST_REQUIRED
                        .iter()
                        .all(|field| filled(field.value(&session.project)))
            }
        },
        WizardStep::Measurements => VoltageField::ALL
            .iter()
            .all(|field| filled(field.value(&session.measurements))),
        WizardStep::Photos => {
            photos::required_slots().all(|slot| session.photos.contains_key(&slot))
        }
        WizardStep::Review => true,
    }
}

/// The aggregate predicate the renderer path relies on: every step of this
/// document kind is complete at once.
pub fn ready_to_generate(session: &WizardSession) -> bool {
    session
        .kind
        .steps()
        .iter()
        .all(|step| step_complete(session, *step))
}

/// First incomplete step, for error reporting.
pub fn first_incomplete(session: &WizardSession) -> Option<WizardStep> {
    session
        .kind
        .steps()
        .iter()
        .copied()
        .find(|step| !step_complete(session, *step))
}
