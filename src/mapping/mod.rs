pub mod atp;
pub mod bast;
pub mod coords;

pub use atp::{ProjectField, VoltageField};
pub use coords::{Anchor, CoordinateSpec, ImageAnchor, ImagePlacement};
