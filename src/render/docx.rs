//! Placeholder substitution for the BAST word template. The archive is
//! copied entry by entry; only `word/document.xml` is rewritten, so every
//! style, header and image part in the template survives byte-for-byte.

use std::io::{Cursor, Read, Write};

use anyhow::{Context, Result};
use zip::{write::SimpleFileOptions, ZipArchive, ZipWriter};

const DOCUMENT_PART: &str = "word/document.xml";

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Single-pass `{name}` substitution over the document part. Placeholders
/// with no entry in `substitutions` are left as literal text.
pub fn substitute(template: &[u8], substitutions: &[(String, String)]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(template))
        .context("template is not a readable docx archive")?;

    let mut document_xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .with_context(|| format!("template has no {DOCUMENT_PART} part"))?
        .read_to_string(&mut document_xml)
        .with_context(|| format!("failed to read {DOCUMENT_PART}"))?;

    for (placeholder, value) in substitutions {
        let token = format!("{{{placeholder}}}");
        if document_xml.contains(&token) {
            document_xml = document_xml.replace(&token, &xml_escape(value));
        }
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .context("failed to read template archive entry")?;
        if entry.name() == DOCUMENT_PART {
            continue;
        }
        writer
            .raw_copy_file(entry)
            .context("failed to copy template archive entry")?;
    }

    writer
        .start_file(DOCUMENT_PART, options)
        .context("failed to start rewritten document part")?;
    writer
        .write_all(document_xml.as_bytes())
        .context("failed to write rewritten document part")?;

    let cursor = writer
        .finish()
        .context("failed to finalize docx archive")?;
    Ok(cursor.into_inner())
}
