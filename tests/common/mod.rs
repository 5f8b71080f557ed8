//! Shared builders for the pipeline tests: seed records, filled sessions,
//! in-memory template archives and boundary doubles.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::sync::Mutex;

use async_trait::async_trait;
use zip::{write::SimpleFileOptions, ZipArchive, ZipWriter};

use sitedocs::mapping::{ProjectField, VoltageField};
use sitedocs::photos;
use sitedocs::wizard::WizardController;
use sitedocs::{
    DocKind, MirrorStore, PhotoAsset, PhotoFormat, SourceRecord, TemplateError, TemplateRef,
    TemplateStore, WizardSession,
};

pub fn make_record(site_id: &str) -> SourceRecord {
    let mut record = SourceRecord::new(site_id, "Menara Kembar");
    record.address = "Jl. Jend. Sudirman No. 10, Jakarta".to_string();
    record.latitude = "-6.2146".to_string();
    record.longitude = "106.8451".to_string();
    record.install_date = Some("2026-03-15".to_string());
    record.rectifier_type = "NetSure 731".to_string();
    record.rectifier_capacity = "48V/200A".to_string();
    record.battery_capacity = "2x100Ah".to_string();
    record
}

/// A real, decodable PNG for the ingestion path.
pub fn tiny_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([120, 140, 160, 255]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode test png");
    bytes
}

/// A complete ATP session value for renderer-level tests. Photo bytes are
/// arbitrary: the embed path carries them through without decoding.
pub fn complete_atp_session(record: SourceRecord) -> WizardSession {
    let mut session = WizardSession::new(DocKind::Atp);
    session.select_record(record);
    session.set_project_field(ProjectField::ProjectName, "Power Upgrade Phase 2".into());
    session.set_project_field(ProjectField::SnModule, "AB12 CD34 EF56".into());
    for field in VoltageField::ALL {
        session.set_voltage_field(field, "220".into());
    }
    for spec in photos::PHOTO_CATALOG {
        session.set_photo(PhotoAsset {
            slot: spec.slot,
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
            preview: String::new(),
            format: PhotoFormat::Png,
        });
    }
    session
}

/// Drive a controller-backed ATP session to completeness: fill the two
/// fields the record does not pre-populate, all readings, all photo slots.
pub async fn fill_atp_session(controller: &WizardController) {
    controller
        .set_project_field(ProjectField::ProjectName, "Power Upgrade Phase 2".into())
        .await;
    controller
        .set_project_field(ProjectField::SnModule, "AB12 CD34 EF56".into())
        .await;
    for field in VoltageField::ALL {
        controller.set_voltage_field(field, "220".into()).await;
    }
    for slot in photos::required_slots() {
        controller
            .attach_photo(slot, tiny_png(), "png")
            .await
            .expect("attach photo");
    }
}

/// Template store backed by a map keyed on template identifier.
pub struct MemTemplateStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemTemplateStore {
    pub fn new() -> Self {
        Self {
            blobs: HashMap::new(),
        }
    }

    pub fn with(mut self, template_id: &str, bytes: Vec<u8>) -> Self {
        self.blobs.insert(template_id.to_string(), bytes);
        self
    }
}

#[async_trait]
impl TemplateStore for MemTemplateStore {
    async fn load(&self, template: &TemplateRef) -> Result<Vec<u8>, TemplateError> {
        self.blobs
            .get(&template.id())
            .cloned()
            .ok_or(TemplateError::NotFound {
                template_id: template.id(),
            })
    }
}

/// Mirror double that records every propagation call.
#[derive(Default)]
pub struct RecordingMirror {
    pub calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

#[async_trait]
impl MirrorStore for RecordingMirror {
    async fn propagate(
        &self,
        record_id: &str,
        changes: &[(String, String)],
    ) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((record_id.to_string(), changes.to_vec()));
        Ok(())
    }
}

fn write_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).expect("start zip entry");
        writer
            .write_all(content.as_bytes())
            .expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Minimal ATP workbook: one sheet with a few pre-styled cells so both the
/// replace path and the insert path get exercised, and no drawings.
pub fn atp_template() -> Vec<u8> {
    let content_types = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;
    let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;
    let workbook = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="ATP" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
    let workbook_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;
    let sheet = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="5"><c r="B5" t="inlineStr"><is><t>Project Name</t></is></c><c r="C5" s="2"/></row><row r="36"><c r="B36" t="inlineStr"><is><t>R-N</t></is></c><c r="C36" s="4"/></row></sheetData><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/></worksheet>"#;

    write_zip(&[
        ("[Content_Types].xml", content_types),
        ("_rels/.rels", root_rels),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", workbook_rels),
        ("xl/worksheets/sheet1.xml", sheet),
    ])
}

/// Minimal BAST document with three live placeholders and one the mapping
/// table does not know about.
pub fn bast_template() -> Vec<u8> {
    let content_types = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;
    let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;
    let document = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Site {site_id} - {site_name}</w:t></w:r></w:p><w:p><w:r><w:t>Installed {install_date}, witnessed by {left_alone}</w:t></w:r></w:p></w:body></w:document>"#;

    write_zip(&[
        ("[Content_Types].xml", content_types),
        ("_rels/.rels", root_rels),
        ("word/document.xml", document),
    ])
}

pub fn zip_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("readable archive");
    let mut content = String::new();
    archive
        .by_name(name)
        .expect("archive part")
        .read_to_string(&mut content)
        .expect("read archive part");
    content
}

pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).expect("readable archive");
    archive.file_names().map(str::to_string).collect()
}
