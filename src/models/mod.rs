mod document;
mod photo;
mod project;
mod record;

pub use document::{GeneratedDocument, DOCX_CONTENT_TYPE, XLSX_CONTENT_TYPE};
pub use photo::{PhotoAsset, PhotoFormat, PhotoSlot};
pub use project::{ProjectInfo, VoltageMeasurement};
pub use record::{DocStatus, SourceRecord};
