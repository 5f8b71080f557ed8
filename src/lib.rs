//! Compliance document pipeline for field-service installations: a gated
//! data-collection wizard over installation records, plus the template-driven
//! rendering of ATP workbooks and BAST handover documents.

pub mod db;
pub mod error;
pub mod mapping;
pub mod mirror;
pub mod models;
pub mod photos;
pub mod render;
pub mod templates;
pub mod utils;
pub mod wizard;

pub use db::Database;
pub use error::{DecodeError, GenerationError, TemplateError};
pub use mirror::{DisabledMirror, MirrorStore};
pub use models::{
    DocStatus, GeneratedDocument, PhotoAsset, PhotoFormat, PhotoSlot, ProjectInfo, SourceRecord,
    VoltageMeasurement,
};
pub use templates::{Counterparty, DirTemplateStore, Region, TemplateRef, TemplateStore};
pub use wizard::{DocKind, WizardController, WizardSession, WizardStep};
