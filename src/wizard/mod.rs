mod controller;
pub mod gate;
mod state;

pub use controller::{WizardController, ATP_STATUS_FIELD, BAST_STATUS_FIELD};
pub use state::{DocKind, WizardSession, WizardStep};
