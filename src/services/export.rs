use std::fmt::Write as _;
use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use serde::Serialize;
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::model::menu::{Column, MenuRow, SalonInfo};
use crate::services::splitter;

const FALLBACK_FILE_NAME: &str = "Salon_Export.xlsx";

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write workbook: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to package workbook: {0}")]
    Zip(#[from] zip::result::ZipError),
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: String,
    pub file_name: String,
    pub rows: usize,
    pub highlighted_cells: usize,
}

/// Cell formats, indices into `cellXfs` of the generated stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain = 0,
    Header = 1,
    Highlight = 2,
}

struct Sheet {
    name: &'static str,
    rows: Vec<Vec<(String, Style)>>,
}

/// `<english half of the salon name>.xlsx`, letters, digits and spaces only.
pub fn file_name_for(salon_name: &str) -> String {
    let english = splitter::split_str(salon_name).english;

    let clean: String = english
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let clean = clean.trim();
    if clean.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        format!("{clean}.xlsx")
    }
}

/// Writes the INFO and ITEMS sheets into `dir`, replacing any previous export
/// of the same salon.
pub fn export_to_dir(dir: &Path, salon: &SalonInfo, rows: &[MenuRow]) -> Result<ExportSummary, ExportError> {
    let file_name = file_name_for(&salon.name);
    let path = dir.join(&file_name);

    let bytes = workbook_bytes(salon, rows)?;
    write_atomic(&path, &bytes)?;

    let summary = ExportSummary {
        path: path.to_string_lossy().to_string(),
        file_name,
        rows: rows.len(),
        highlighted_cells: rows.iter().map(|r| r.highlights.len()).sum(),
    };

    tracing::info!(
        path = %summary.path,
        rows = summary.rows,
        highlighted = summary.highlighted_cells,
        "workbook written"
    );

    Ok(summary)
}

pub fn workbook_bytes(salon: &SalonInfo, rows: &[MenuRow]) -> Result<Vec<u8>, ExportError> {
    let cursor = write_workbook(Cursor::new(Vec::new()), salon, rows)?;
    Ok(cursor.into_inner())
}

pub fn write_workbook<W: Write + Seek>(
    writer: W,
    salon: &SalonInfo,
    rows: &[MenuRow],
) -> Result<W, ExportError> {
    let sheets = [info_sheet(salon), items_sheet(rows)];

    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types(&sheets).as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(root_rels().as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook_xml(&sheets).as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_rels(&sheets).as_bytes())?;

    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(styles_xml().as_bytes())?;

    for (i, sheet) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip.write_all(sheet_xml(sheet).as_bytes())?;
    }

    Ok(zip.finish()?)
}

fn info_sheet(salon: &SalonInfo) -> Sheet {
    let line = |field: &str, value: &str| {
        vec![
            (field.to_string(), Style::Plain),
            (value.to_string(), Style::Plain),
        ]
    };

    Sheet {
        name: "INFO",
        rows: vec![
            vec![
                ("Field".to_string(), Style::Header),
                ("Value".to_string(), Style::Header),
            ],
            line("Salon Name", salon.name.as_str()),
            line("Address", salon.address.as_deref().unwrap_or("")),
            line("Avatar URL", salon.avatar_url.as_deref().unwrap_or("")),
        ],
    }
}

fn items_sheet(rows: &[MenuRow]) -> Sheet {
    let mut out = Vec::with_capacity(rows.len() + 1);

    out.push(
        Column::ALL
            .iter()
            .map(|c| (c.title().to_string(), Style::Header))
            .collect(),
    );

    for row in rows {
        out.push(
            Column::ALL
                .iter()
                .map(|&c| {
                    let style = if row.is_highlighted(c) {
                        Style::Highlight
                    } else {
                        Style::Plain
                    };
                    (row.cell(c).to_string(), style)
                })
                .collect(),
        );
    }

    Sheet {
        name: "ITEMS",
        rows: out,
    }
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA.
fn column_letters(mut index: usize) -> String {
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

// XML 1.0 forbids most C0 controls even when escaped.
fn xml_text(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect();
    escape(&cleaned).into_owned()
}

fn sheet_xml(sheet: &Sheet) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    let _ = write!(xml, r#"<worksheet xmlns="{NS_MAIN}"><sheetData>"#);

    for (r, cells) in sheet.rows.iter().enumerate() {
        let row_num = r + 1;
        let _ = write!(xml, r#"<row r="{row_num}">"#);

        for (c, (text, style)) in cells.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let _ = write!(
                xml,
                r#"<c r="{}{}" t="inlineStr" s="{}"><is><t xml:space="preserve">{}</t></is></c>"#,
                column_letters(c),
                row_num,
                *style as u8,
                xml_text(text)
            );
        }

        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn content_types(sheets: &[Sheet]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
    for i in 1..=sheets.len() {
        let _ = write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rId1" Type="{NS_REL}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    )
}

fn workbook_xml(sheets: &[Sheet]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    let _ = write!(xml, r#"<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_REL}"><sheets>"#);
    for (i, sheet) in sheets.iter().enumerate() {
        let id = i + 1;
        let _ = write!(
            xml,
            r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#,
            sheet.name
        );
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels(sheets: &[Sheet]) -> String {
    let mut xml = String::new();
    xml.push_str(XML_DECL);
    let _ = write!(xml, r#"<Relationships xmlns="{NS_PKG_REL}">"#);
    for i in 1..=sheets.len() {
        let _ = write!(
            xml,
            r#"<Relationship Id="rId{i}" Type="{NS_REL}/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        );
    }
    let _ = write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{NS_REL}/styles" Target="styles.xml"/>"#,
        sheets.len() + 1
    );
    xml.push_str("</Relationships>");
    xml
}

// cellXfs order must match `Style`.
fn styles_xml() -> String {
    format!(
        concat!(
            "{decl}<styleSheet xmlns=\"{ns}\">",
            "<fonts count=\"2\">",
            "<font><sz val=\"11\"/><name val=\"Calibri\"/></font>",
            "<font><b/><sz val=\"11\"/><name val=\"Calibri\"/></font>",
            "</fonts>",
            "<fills count=\"3\">",
            "<fill><patternFill patternType=\"none\"/></fill>",
            "<fill><patternFill patternType=\"gray125\"/></fill>",
            "<fill><patternFill patternType=\"solid\"><fgColor rgb=\"FFFFFF00\"/><bgColor rgb=\"FFFFFF00\"/></patternFill></fill>",
            "</fills>",
            "<borders count=\"1\"><border><left/><right/><top/><bottom/><diagonal/></border></borders>",
            "<cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>",
            "<cellXfs count=\"3\">",
            "<xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"/>",
            "<xf numFmtId=\"0\" fontId=\"1\" fillId=\"0\" borderId=\"0\" xfId=\"0\" applyFont=\"1\"/>",
            "<xf numFmtId=\"0\" fontId=\"0\" fillId=\"2\" borderId=\"0\" xfId=\"0\" applyFill=\"1\"/>",
            "</cellXfs>",
            "<cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>",
            "</styleSheet>"
        ),
        decl = XML_DECL,
        ns = NS_MAIN
    )
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp, bytes)?;

    // rename replaces an existing file in place; never leave the tmp behind.
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "export".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::io::Read;
    use zip::ZipArchive;

    fn salon() -> SalonInfo {
        SalonInfo {
            name: "Glow & Co | صالون جلو".into(),
            address: Some("Riyadh <Olaya>".into()),
            avatar_url: None,
        }
    }

    fn row() -> MenuRow {
        let mut row = MenuRow::default();
        row.cells[Column::CategoryNameEn.index()] = "Hair".into();
        row.cells[Column::ItemNameEn.index()] = "Haircut".into();
        row.cells[Column::ItemNameAr.index()] = "قص شعر".into();
        row.cells[Column::Price.index()] = "SAR 100".into();
        row.highlights = BTreeSet::from([Column::ItemNameAr]);
        row
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn file_name_uses_english_half() {
        assert_eq!(file_name_for("Glow & Co | صالون جلو"), "Glow  Co.xlsx");
        assert_eq!(file_name_for("Salon 21"), "Salon 21.xlsx");
        assert_eq!(file_name_for("صالون"), "Salon_Export.xlsx");
        assert_eq!(file_name_for(""), "Salon_Export.xlsx");
    }

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(8), "I");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
    }

    #[test]
    fn workbook_has_both_sheets() {
        let bytes = workbook_bytes(&salon(), &[row()]).unwrap();

        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"<sheet name="INFO" sheetId="1" r:id="rId1"/>"#));
        assert!(workbook.contains(r#"<sheet name="ITEMS" sheetId="2" r:id="rId2"/>"#));

        let rels = read_part(&bytes, "xl/_rels/workbook.xml.rels");
        assert!(rels.contains(r#"Target="styles.xml""#));
        assert!(read_part(&bytes, "[Content_Types].xml").contains("/xl/worksheets/sheet2.xml"));
    }

    #[test]
    fn info_sheet_is_escaped() {
        let bytes = workbook_bytes(&salon(), &[]).unwrap();
        let info = read_part(&bytes, "xl/worksheets/sheet1.xml");

        assert!(info.contains(r#"<c r="A1" t="inlineStr" s="1"><is><t xml:space="preserve">Field</t></is></c>"#));
        assert!(info.contains("Glow &amp; Co | صالون جلو"));
        assert!(info.contains("Riyadh &lt;Olaya&gt;"));
        // Avatar URL is absent: label only.
        assert!(info.contains(r#"<row r="4"><c r="A4" t="inlineStr" s="0"><is><t xml:space="preserve">Avatar URL</t></is></c></row>"#));
    }

    #[test]
    fn only_generated_cells_are_filled() {
        let bytes = workbook_bytes(&salon(), &[row()]).unwrap();
        let items = read_part(&bytes, "xl/worksheets/sheet2.xml");

        assert!(items.contains(r#"<c r="I1" t="inlineStr" s="1"><is><t xml:space="preserve">Price</t></is></c>"#));
        assert!(items.contains(r#"<c r="F2" t="inlineStr" s="2"><is><t xml:space="preserve">قص شعر</t></is></c>"#));
        assert!(items.contains(r#"<c r="E2" t="inlineStr" s="0">"#));
        assert!(!items.contains(r#"r="B2""#));
        assert_eq!(items.matches(r#"s="2""#).count(), 1);

        let styles = read_part(&bytes, "xl/styles.xml");
        assert!(styles.contains(r#"<fgColor rgb="FFFFFF00"/>"#));
    }

    #[test]
    fn control_characters_are_dropped() {
        assert_eq!(xml_text("a\u{0}b\u{1}\tc&"), "ab\tc&amp;");
    }

    #[test]
    fn export_writes_and_replaces_file() {
        let dir = tempfile::tempdir().unwrap();

        let first = export_to_dir(dir.path(), &salon(), &[row()]).unwrap();
        let second = export_to_dir(dir.path(), &salon(), &[row(), row()]).unwrap();

        assert_eq!(first.file_name, "Glow  Co.xlsx");
        assert_eq!(second.path, first.path);
        assert_eq!(second.rows, 2);
        assert_eq!(second.highlighted_cells, 2);

        let bytes = fs::read(&second.path).unwrap();
        assert!(read_part(&bytes, "xl/worksheets/sheet2.xml").contains(r#"<row r="3">"#));
        assert!(!dir.path().join("Glow  Co.xlsx.tmp").exists());
    }

    #[test]
    fn failed_rename_cleans_up_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Glow.xlsx");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "x").unwrap();

        assert!(write_atomic(&target, b"bytes").is_err());
        assert!(!dir.path().join("Glow.xlsx.tmp").exists());
        assert!(target.join("keep.txt").exists());
    }
}
