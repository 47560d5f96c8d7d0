//! Spreadsheet export of audit entries
//!
//! Produces a minimal Office Open XML workbook with one sheet. Cells are
//! written as inline strings so no shared-string table is needed. The header
//! row uses style 1 (bold white text on a blue fill, centred).

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use super::models::AuditEntry;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const SHEET_NAME: &str = "Audit Logs";

pub const HEADERS: [&str; 8] = [
    "Timestamp",
    "User",
    "Action",
    "Object Type",
    "Object ID",
    "Object",
    "Changes",
    "IP",
];

const MAX_COLUMN_WIDTH: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write workbook archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Failed to write workbook part: {0}")]
    Io(#[from] std::io::Error),
}

/// `audit_logs_YYYYmmdd_HHMMSS.xlsx`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("audit_logs_{}.xlsx", now.format("%Y%m%d_%H%M%S"))
}

/// Cell values of one exported entry, in `HEADERS` order
pub fn entry_cells(entry: &AuditEntry) -> [String; 8] {
    [
        entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        entry.username.clone().unwrap_or_else(|| "N/A".to_string()),
        entry.action_label(),
        entry.object_type.clone(),
        entry.object_id.map(|id| id.to_string()).unwrap_or_default(),
        entry.object_repr.clone(),
        entry.changes.to_string(),
        entry.ip_address.clone().unwrap_or_default(),
    ]
}

/// Column widths: longest cell plus two, capped at 50
pub fn column_widths(rows: &[[String; 8]]) -> [usize; 8] {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths.map(|w| (w + 2).min(MAX_COLUMN_WIDTH))
}

/// Spreadsheet column letter for a zero-based index (0 -> A, 26 -> AA)
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Drop characters XML 1.0 cannot carry
fn xml_text(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    escape(cleaned.as_str()).into_owned()
}

fn write_row(xml: &mut String, row_number: usize, cells: &[String], style: Option<u8>) {
    xml.push_str(&format!("<row r=\"{}\">", row_number));
    for (col, value) in cells.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        let style_attr = style.map(|s| format!(" s=\"{}\"", s)).unwrap_or_default();
        xml.push_str(&format!(
            "<c r=\"{}{}\" t=\"inlineStr\"{}><is><t xml:space=\"preserve\">{}</t></is></c>",
            column_letter(col),
            row_number,
            style_attr,
            xml_text(value)
        ));
    }
    xml.push_str("</row>");
}

fn sheet_xml(rows: &[[String; 8]]) -> String {
    let widths = column_widths(rows);
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><cols>"#,
    );
    for (i, width) in widths.iter().enumerate() {
        xml.push_str(&format!(
            "<col min=\"{n}\" max=\"{n}\" width=\"{w}\" customWidth=\"1\"/>",
            n = i + 1,
            w = width
        ));
    }
    xml.push_str("</cols><sheetData>");

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    write_row(&mut xml, 1, &header, Some(1));
    for (i, row) in rows.iter().enumerate() {
        write_row(&mut xml, i + 2, row, None);
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><color rgb="FFFFFFFF"/><name val="Calibri"/></font></fonts><fills count="3"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill><fill><patternFill patternType="solid"><fgColor rgb="FF366092"/><bgColor rgb="FF366092"/></patternFill></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1" applyAlignment="1"><alignment horizontal="center"/></xf></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape(SHEET_NAME)
    )
}

/// Render `entries` as an XLSX workbook
pub fn build_workbook(entries: &[AuditEntry]) -> Result<Vec<u8>, ExportError> {
    let rows: Vec<[String; 8]> = entries.iter().map(entry_cells).collect();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, String); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", ROOT_RELS_XML.to_string()),
        ("xl/workbook.xml", workbook_xml()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.to_string()),
        ("xl/styles.xml", STYLES_XML.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(&rows)),
    ];

    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
