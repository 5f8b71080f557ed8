//! Style-preserving patcher for the ATP workbook template. The template
//! archive is copied entry by entry and only the touched parts are
//! rewritten: cell values are merged into the sheet XML as inline strings
//! (keeping each cell's style reference), and evidence photos become a new
//! drawing part wired up through the sheet relationships.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use anyhow::{anyhow, bail, Context, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use zip::{write::SimpleFileOptions, ZipArchive, ZipWriter};

use crate::mapping::coords::{
    CellOffset, ImageAnchor, ImagePlacement, CELL_HEIGHT_PX, CELL_WIDTH_PX, EMU_PER_PIXEL,
};

/// The worksheet carrying both the form fields and the photo section.
const SHEET_PART: &str = "xl/worksheets/sheet1.xml";
const SHEET_RELS_PART: &str = "xl/worksheets/_rels/sheet1.xml.rels";
const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const DRAWING_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing";
const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const XDR_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing";
const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const DRAWING_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.drawing+xml";

/// Accumulates cell writes and image placements against a loaded template,
/// then serializes the patched workbook in one pass.
pub struct XlsxPatch {
    template: Vec<u8>,
    // row -> column index -> (cell reference, value)
    writes: BTreeMap<u32, BTreeMap<u32, (String, String)>>,
    images: Vec<ImagePlacement>,
}

impl XlsxPatch {
    pub fn new(template: Vec<u8>) -> Self {
        Self {
            template,
            writes: BTreeMap::new(),
            images: Vec::new(),
        }
    }

    /// Queue a value for an absolute cell address like `C7`. Later writes to
    /// the same address win.
    pub fn set_cell(&mut self, reference: &str, value: &str) -> Result<()> {
        let (col, row) = parse_cell_ref(reference)?;
        self.writes
            .entry(row)
            .or_default()
            .insert(col, (reference.to_uppercase(), value.to_string()));
        Ok(())
    }

    /// Queue an image embed. Placement order is preserved, which keeps the
    /// generated part names and relationship ids deterministic.
    pub fn add_image(&mut self, placement: ImagePlacement) {
        self.images.push(placement);
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let Self {
            template,
            writes,
            images,
        } = self;

        let mut archive = ZipArchive::new(Cursor::new(template.as_slice()))
            .context("template is not a readable xlsx archive")?;

        let entry_names: Vec<String> = archive.file_names().map(str::to_string).collect();

        let sheet_xml = read_part(&mut archive, SHEET_PART)?;
        let drawing = if images.is_empty() {
            None
        } else {
            Some(DrawingParts::build(&entry_names, &images)?)
        };

        let sheet_rels = match &drawing {
            Some(parts) => Some(attach_drawing_rel(
                read_part_optional(&mut archive, SHEET_RELS_PART)?,
                &parts.drawing_target,
            )?),
            None => None,
        };

        let patched_sheet = rewrite_sheet(
            &sheet_xml,
            writes,
            sheet_rels.as_ref().map(|(_, rid)| rid.as_str()),
        )?;

        let content_types = match &drawing {
            Some(parts) => Some(patch_content_types(
                &read_part(&mut archive, CONTENT_TYPES_PART)?,
                &parts.part_name,
                &parts.media_extensions,
            )?),
            None => None,
        };

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .context("failed to read template archive entry")?;
            let name = entry.name().to_string();
            let replaced = name == SHEET_PART
                || (sheet_rels.is_some() && name == SHEET_RELS_PART)
                || (content_types.is_some() && name == CONTENT_TYPES_PART);
            if replaced {
                continue;
            }
            writer
                .raw_copy_file(entry)
                .context("failed to copy template archive entry")?;
        }

        write_part(&mut writer, options, SHEET_PART, patched_sheet.as_bytes())?;
        if let Some((rels_xml, _)) = &sheet_rels {
            write_part(&mut writer, options, SHEET_RELS_PART, rels_xml.as_bytes())?;
        }
        if let Some(types_xml) = &content_types {
            write_part(&mut writer, options, CONTENT_TYPES_PART, types_xml.as_bytes())?;
        }
        if let Some(parts) = drawing {
            write_part(&mut writer, options, &parts.part_name, parts.drawing_xml.as_bytes())?;
            write_part(&mut writer, options, &parts.rels_name, parts.rels_xml.as_bytes())?;
            for (media_name, bytes) in &parts.media {
                write_part(&mut writer, options, media_name, bytes)?;
            }
        }

        let cursor = writer
            .finish()
            .context("failed to finalize xlsx archive")?;
        Ok(cursor.into_inner())
    }
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<String> {
    let mut content = String::new();
    archive
        .by_name(name)
        .with_context(|| format!("template has no {name} part"))?
        .read_to_string(&mut content)
        .with_context(|| format!("failed to read {name}"))?;
    Ok(content)
}

fn read_part_optional(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut content = String::new();
            entry
                .read_to_string(&mut content)
                .with_context(|| format!("failed to read {name}"))?;
            Ok(Some(content))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("failed to open {name}")),
    }
}

fn write_part<W: Write + std::io::Seek>(
    writer: &mut ZipWriter<W>,
    options: SimpleFileOptions,
    name: &str,
    bytes: &[u8],
) -> Result<()> {
    writer
        .start_file(name, options)
        .with_context(|| format!("failed to start {name}"))?;
    writer
        .write_all(bytes)
        .with_context(|| format!("failed to write {name}"))?;
    Ok(())
}

/// `C7` -> (zero-based column index, 1-based row).
fn parse_cell_ref(reference: &str) -> Result<(u32, u32)> {
    let reference = reference.trim().to_uppercase();
    let letters: String = reference.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let digits = &reference[letters.len()..];

    if letters.is_empty() || digits.is_empty() {
        bail!("invalid cell reference '{reference}'");
    }

    let col = letters
        .chars()
        .fold(0u32, |acc, c| acc * 26 + (c as u32 - 'A' as u32 + 1))
        - 1;
    let row: u32 = digits
        .parse()
        .map_err(|_| anyhow!("invalid cell reference '{reference}'"))?;

    Ok((col, row))
}

fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

type RowWrites = BTreeMap<u32, (String, String)>;

fn write_inline_cell<W: Write>(
    writer: &mut Writer<W>,
    reference: &str,
    style: Option<&str>,
    value: &str,
) -> Result<()> {
    let mut cell = BytesStart::new("c");
    cell.push_attribute(("r", reference));
    if let Some(style) = style {
        cell.push_attribute(("s", style));
    }
    cell.push_attribute(("t", "inlineStr"));
    writer.write_event(Event::Start(cell))?;
    writer.write_event(Event::Start(BytesStart::new("is")))?;
    writer.write_event(Event::Start(BytesStart::new("t")))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("t")))?;
    writer.write_event(Event::End(BytesEnd::new("is")))?;
    writer.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}

fn write_new_row<W: Write>(writer: &mut Writer<W>, row: u32, cells: &RowWrites) -> Result<()> {
    let mut row_el = BytesStart::new("row");
    let row_attr = row.to_string();
    row_el.push_attribute(("r", row_attr.as_str()));
    writer.write_event(Event::Start(row_el))?;
    for (reference, value) in cells.values() {
        write_inline_cell(writer, reference, None, value)?;
    }
    writer.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

/// Stream the sheet XML through, merging queued cell writes. Existing cells
/// keep their `s` style reference; rows and cells the template does not
/// contain are inserted in order. Appends the `<drawing/>` hook when a
/// relationship id is supplied.
fn rewrite_sheet(
    sheet_xml: &str,
    mut writes: BTreeMap<u32, RowWrites>,
    drawing_rid: Option<&str>,
) -> Result<String> {
    let mut reader = Reader::from_reader(sheet_xml.as_bytes());
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    // Writes for the row currently being streamed.
    let mut current_row: Option<u32> = None;
    let mut current_pending: RowWrites = RowWrites::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .context("failed to parse sheet XML")?;
        match event {
            Event::Eof => break,
            Event::Start(e) if e.local_name().as_ref() == b"row" => {
                let row: u32 = get_attr(&e, b"r")
                    .and_then(|value| value.parse().ok())
                    .ok_or_else(|| anyhow!("sheet row without a valid r attribute"))?;
                // Rows the template skips entirely are emitted before the
                // first existing row that follows them.
                let earlier: Vec<u32> =
                    writes.range(..row).map(|(key, _)| *key).collect();
                for key in earlier {
                    if let Some(cells) = writes.remove(&key) {
                        write_new_row(&mut writer, key, &cells)?;
                    }
                }
                current_row = Some(row);
                current_pending = writes.remove(&row).unwrap_or_default();
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) if e.local_name().as_ref() == b"row" => {
                for (reference, value) in std::mem::take(&mut current_pending).values() {
                    write_inline_cell(&mut writer, reference, None, value)?;
                }
                current_row = None;
                writer.write_event(Event::End(e))?;
            }
            Event::Start(e) if e.local_name().as_ref() == b"c" && current_row.is_some() => {
                let reference = get_attr(&e, b"r").unwrap_or_default();
                let replacement = parse_cell_ref(&reference)
                    .ok()
                    .and_then(|(col, _)| current_pending.remove(&col));
                if let Some((_, value)) = replacement {
                    let style = get_attr(&e, b"s");
                    write_inline_cell(&mut writer, &reference, style.as_deref(), &value)?;
                    let end = e.to_end().into_owned();
                    let mut skip = Vec::new();
                    reader
                        .read_to_end_into(end.name(), &mut skip)
                        .context("failed to skip replaced cell content")?;
                } else {
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"c" && current_row.is_some() => {
                let reference = get_attr(&e, b"r").unwrap_or_default();
                let replacement = parse_cell_ref(&reference)
                    .ok()
                    .and_then(|(col, _)| current_pending.remove(&col));
                if let Some((_, value)) = replacement {
                    let style = get_attr(&e, b"s");
                    write_inline_cell(&mut writer, &reference, style.as_deref(), &value)?;
                } else {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"sheetData" => {
                for (row, cells) in std::mem::take(&mut writes) {
                    write_new_row(&mut writer, row, &cells)?;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                writer.write_event(Event::Start(BytesStart::new("sheetData")))?;
                for (row, cells) in std::mem::take(&mut writes) {
                    write_new_row(&mut writer, row, &cells)?;
                }
                writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
            }
            Event::End(e) if e.local_name().as_ref() == b"worksheet" => {
                if let Some(rid) = drawing_rid {
                    let mut drawing = BytesStart::new("drawing");
                    drawing.push_attribute(("r:id", rid));
                    writer.write_event(Event::Empty(drawing))?;
                }
                writer.write_event(Event::End(e))?;
            }
            other => writer.write_event(other)?,
        }
        buf.clear();
    }

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).context("rewritten sheet is not valid UTF-8")
}

/// Insert a drawing relationship into the sheet rels (creating the part when
/// the template has none) and return the new xml plus the relationship id.
fn attach_drawing_rel(
    existing: Option<String>,
    drawing_target: &str,
) -> Result<(String, String)> {
    match existing {
        None => {
            let rid = "rId1".to_string();
            let xml = format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
                 <Relationships xmlns=\"{RELS_NS}\">\
                 <Relationship Id=\"{rid}\" Type=\"{DRAWING_REL_TYPE}\" Target=\"{drawing_target}\"/>\
                 </Relationships>"
            );
            Ok((xml, rid))
        }
        Some(xml) => {
            let rid = format!("rId{}", max_rel_id(&xml) + 1);
            let insert = format!(
                "<Relationship Id=\"{rid}\" Type=\"{DRAWING_REL_TYPE}\" Target=\"{drawing_target}\"/></Relationships>"
            );
            if !xml.contains("</Relationships>") {
                bail!("sheet relationships part is malformed");
            }
            Ok((xml.replace("</Relationships>", &insert), rid))
        }
    }
}

fn max_rel_id(rels_xml: &str) -> u32 {
    rels_xml
        .split("rId")
        .skip(1)
        .filter_map(|rest| {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().ok()
        })
        .max()
        .unwrap_or(0)
}

fn patch_content_types(
    types_xml: &str,
    drawing_part: &str,
    media_extensions: &[&'static str],
) -> Result<String> {
    if !types_xml.contains("</Types>") {
        bail!("content types part is malformed");
    }

    let mut additions = String::new();
    for ext in media_extensions {
        let marker = format!("Extension=\"{ext}\"");
        if !types_xml.contains(&marker) {
            additions.push_str(&format!(
                "<Default Extension=\"{ext}\" ContentType=\"image/{ext}\"/>"
            ));
        }
    }
    additions.push_str(&format!(
        "<Override PartName=\"/{drawing_part}\" ContentType=\"{DRAWING_CONTENT_TYPE}\"/>"
    ));

    Ok(types_xml.replace("</Types>", &format!("{additions}</Types>")))
}

struct DrawingParts {
    part_name: String,
    rels_name: String,
    /// Target of the sheet-side relationship, relative to the sheet part.
    drawing_target: String,
    drawing_xml: String,
    rels_xml: String,
    media: Vec<(String, Vec<u8>)>,
    media_extensions: Vec<&'static str>,
}

impl DrawingParts {
    fn build(existing_names: &[String], images: &[ImagePlacement]) -> Result<Self> {
        let drawing_index = next_numbered(existing_names, "xl/drawings/drawing", ".xml");
        let media_base = next_numbered(existing_names, "xl/media/image", ".") - 1;

        let part_name = format!("xl/drawings/drawing{drawing_index}.xml");
        let rels_name =
            format!("xl/drawings/_rels/drawing{drawing_index}.xml.rels");
        let drawing_target = format!("../drawings/drawing{drawing_index}.xml");

        let mut anchors = String::new();
        let mut rels = String::new();
        let mut media = Vec::new();
        let mut media_extensions: Vec<&'static str> = Vec::new();

        for (offset, image) in images.iter().enumerate() {
            let n = offset + 1;
            let ext = image.format.extension();
            let media_name = format!("xl/media/image{}.{ext}", media_base + n);

            rels.push_str(&format!(
                "<Relationship Id=\"rId{n}\" Type=\"{IMAGE_REL_TYPE}\" Target=\"../media/image{}.{ext}\"/>",
                media_base + n
            ));
            anchors.push_str(&anchor_xml(n, &image.anchor));
            media.push((media_name, image.bytes.clone()));
            if !media_extensions.contains(&ext) {
                media_extensions.push(ext);
            }
        }

        let drawing_xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <xdr:wsDr xmlns:xdr=\"{XDR_NS}\" xmlns:a=\"{A_NS}\" xmlns:r=\"{R_NS}\">{anchors}</xdr:wsDr>"
        );
        let rels_xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <Relationships xmlns=\"{RELS_NS}\">{rels}</Relationships>"
        );

        Ok(Self {
            part_name,
            rels_name,
            drawing_target,
            drawing_xml,
            rels_xml,
            media,
            media_extensions,
        })
    }
}

/// First unused index for parts named `<prefix><n><suffix>`.
fn next_numbered(existing_names: &[String], prefix: &str, suffix: &str) -> usize {
    let mut max = 0usize;
    for name in existing_names {
        if let Some(rest) = name.strip_prefix(prefix) {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(n) = digits.parse::<usize>() {
                if rest[digits.len()..].starts_with(suffix) && n > max {
                    max = n;
                }
            }
        }
    }
    max + 1
}

fn offset_xml(tag_prefix: &str, offset: &CellOffset) -> String {
    format!(
        "<{p}><xdr:col>{}</xdr:col><xdr:colOff>{}</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>{}</xdr:rowOff></{p}>",
        offset.col,
        offset.col_off_emu,
        offset.row,
        offset.row_off_emu,
        p = tag_prefix,
    )
}

fn pic_xml(n: usize, ext_cx: i64, ext_cy: i64) -> String {
    format!(
        "<xdr:pic>\
         <xdr:nvPicPr><xdr:cNvPr id=\"{n}\" name=\"Evidence {n}\"/>\
         <xdr:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></xdr:cNvPicPr></xdr:nvPicPr>\
         <xdr:blipFill><a:blip r:embed=\"rId{n}\"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill>\
         <xdr:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{ext_cx}\" cy=\"{ext_cy}\"/></a:xfrm>\
         <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></xdr:spPr>\
         </xdr:pic>"
    )
}

fn anchor_xml(n: usize, anchor: &ImageAnchor) -> String {
    match anchor {
        ImageAnchor::OneCell {
            from,
            ext_cx_emu,
            ext_cy_emu,
        } => format!(
            "<xdr:oneCellAnchor>{}<xdr:ext cx=\"{ext_cx_emu}\" cy=\"{ext_cy_emu}\"/>{}<xdr:clientData/></xdr:oneCellAnchor>",
            offset_xml("xdr:from", from),
            pic_xml(n, *ext_cx_emu, *ext_cy_emu),
        ),
        ImageAnchor::TwoCell { from, to } => {
            // Nominal extent; with a from/to pair the anchors define the
            // rendered rectangle.
            let ext_cx = (to.col as i64 - from.col as i64)
                * (CELL_WIDTH_PX as i64)
                * EMU_PER_PIXEL
                + (to.col_off_emu - from.col_off_emu);
            let ext_cy = (to.row as i64 - from.row as i64) * (CELL_HEIGHT_PX as i64) * EMU_PER_PIXEL
                + (to.row_off_emu - from.row_off_emu);
            format!(
                "<xdr:twoCellAnchor editAs=\"absolute\">{}{}{}<xdr:clientData/></xdr:twoCellAnchor>",
                offset_xml("xdr:from", from),
                offset_xml("xdr:to", to),
                pic_xml(n, ext_cx.max(0), ext_cy.max(0)),
            )
        }
    }
}
