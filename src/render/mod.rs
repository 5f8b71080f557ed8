//! Terminal rendering step: template bytes in, `GeneratedDocument` out.
//! These functions are pure with respect to the session; every side effect
//! (status update, mirror propagation) stays in the controller.

pub mod date;
mod docx;
mod xlsx;

pub use xlsx::XlsxPatch;

use anyhow::Result;
use chrono::Local;

use crate::error::GenerationError;
use crate::log_info;
use crate::mapping::atp::{sn_module_cells, VoltageField, ATP_CELL_MAP};
use crate::mapping::{bast, coords};
use crate::models::{GeneratedDocument, DOCX_CONTENT_TYPE, XLSX_CONTENT_TYPE};
use crate::photos;
use crate::wizard::WizardSession;

const ENABLE_LOGS: bool = true;

pub fn render_atp(
    session: &WizardSession,
    template: Vec<u8>,
) -> Result<GeneratedDocument, GenerationError> {
    build_atp(session, template).map_err(|err| GenerationError::Render(format!("{err:#}")))
}

fn build_atp(session: &WizardSession, template: Vec<u8>) -> Result<GeneratedDocument> {
    let mut patch = XlsxPatch::new(template);
    let mut cells_written = 0usize;

    for entry in ATP_CELL_MAP {
        let raw = entry.field.value(&session.project);
        let value = if entry.as_date {
            date::format_date_field(raw)
        } else {
            raw.to_string()
        };
        for cell in entry.cells {
            patch.set_cell(cell, &value)?;
            cells_written += 1;
        }
    }

    for field in VoltageField::ALL {
        patch.set_cell(field.cell(), field.value(&session.measurements))?;
        cells_written += 1;
    }

    for (cell, token) in sn_module_cells(&session.project.sn_module) {
        patch.set_cell(&cell, &token)?;
        cells_written += 1;
    }

    // A slot without an uploaded asset is skipped, not an error; the photo
    // gate has already run by the time a real generation reaches this point.
    let mut embedded = 0usize;
    for spec in photos::PHOTO_CATALOG {
        if let Some(asset) = session.photos.get(&spec.slot) {
            patch.add_image(coords::placement(spec.coord, asset));
            embedded += 1;
        }
    }

    let bytes = patch.finish()?;
    let today = Local::now().date_naive();
    let filename = format!(
        "ATP_{}_{}.xlsx",
        session.project.site_id,
        date::short_date(today)
    );

    log_info!(
        "ATP render: {} cells, {} photos, {} bytes -> {}",
        cells_written,
        embedded,
        bytes.len(),
        filename
    );

    Ok(GeneratedDocument {
        filename,
        content_type: XLSX_CONTENT_TYPE,
        bytes,
    })
}

pub fn render_bast(
    session: &WizardSession,
    template: Vec<u8>,
) -> Result<GeneratedDocument, GenerationError> {
    build_bast(session, template).map_err(|err| GenerationError::Render(format!("{err:#}")))
}

fn build_bast(session: &WizardSession, template: Vec<u8>) -> Result<GeneratedDocument> {
    let today = Local::now().date_naive();
    let substitutions = bast::substitutions(session, today);
    let bytes = docx::substitute(&template, &substitutions)?;

    let filename = format!(
        "Form BAST Site {}_{}.docx",
        session.project.site_id, session.project.site_name
    );

    log_info!(
        "BAST render: {} placeholders, {} bytes -> {}",
        substitutions.len(),
        bytes.len(),
        filename
    );

    Ok(GeneratedDocument {
        filename,
        content_type: DOCX_CONTENT_TYPE,
        bytes,
    })
}
