mod catalog;
mod ingest;

pub use catalog::{coord_for, required_slots, validate_catalog, SlotGroup, SlotSpec, PHOTO_CATALOG};
pub use ingest::ingest_photo;
