//! Minimal SpreadsheetML (.xlsx) package writer.
//!
//! The package holds one worksheet. Text is stored as inline strings so no
//! shared string table is needed.

use crate::error::Result;
use crate::table::{Cell, Table};
use crate::utils::column_letters;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Name of the single worksheet in written workbooks.
pub const SHEET_NAME: &str = "Sheet1";

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#
);

const WORKBOOK_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    r#"<sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>"#,
    r#"</workbook>"#
);

const WORKBOOK_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#
);

const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
    r#"</styleSheet>"#
);

/// Write a table as a single-sheet XLSX workbook.
///
/// Row 1 holds the column names. Numeric cells are stored as numbers, text
/// cells as inline strings, and missing or non-finite cells are left out.
pub fn write_xlsx(table: &Table) -> Result<Vec<u8>> {
    let sheet = worksheet_xml(table)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("xl/workbook.xml", WORKBOOK_XML.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
        ("xl/styles.xml", STYLES_XML.as_bytes()),
        ("xl/worksheets/sheet1.xml", &sheet),
    ];

    for (path, content) in parts {
        zip.start_file(path, options)?;
        zip.write_all(content)?;
    }

    let bytes = zip.finish()?.into_inner();
    debug!("Wrote XLSX package: {} bytes", bytes.len());
    Ok(bytes)
}

fn worksheet_xml(table: &Table) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Start(
        BytesStart::new("worksheet").with_attributes([("xmlns", SPREADSHEET_NS)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    let header: Vec<Cell> = table.column_names().into_iter().map(Cell::Text).collect();
    write_row(&mut writer, 1, &header)?;
    for (idx, row) in table.rows()?.iter().enumerate() {
        write_row(&mut writer, idx + 2, row)?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner())
}

fn write_row<W: Write>(writer: &mut Writer<W>, row_number: usize, cells: &[Cell]) -> Result<()> {
    let row_ref = row_number.to_string();
    writer.write_event(Event::Start(
        BytesStart::new("row").with_attributes([("r", row_ref.as_str())]),
    ))?;

    for (col_idx, cell) in cells.iter().enumerate() {
        let cell_ref = format!("{}{}", column_letters(col_idx), row_ref);
        match cell {
            Cell::Number(value) if value.is_finite() => {
                writer.write_event(Event::Start(
                    BytesStart::new("c").with_attributes([("r", cell_ref.as_str())]),
                ))?;
                write_text_element(writer, BytesStart::new("v"), &value.to_string())?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
            Cell::Text(text) => {
                writer.write_event(Event::Start(
                    BytesStart::new("c")
                        .with_attributes([("r", cell_ref.as_str()), ("t", "inlineStr")]),
                ))?;
                writer.write_event(Event::Start(BytesStart::new("is")))?;
                write_text_element(
                    writer,
                    BytesStart::new("t").with_attributes([("xml:space", "preserve")]),
                    text,
                )?;
                writer.write_event(Event::End(BytesEnd::new("is")))?;
                writer.write_event(Event::End(BytesEnd::new("c")))?;
            }
            Cell::Number(_) | Cell::Missing => {}
        }
    }

    writer.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<()> {
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_xlsx;
    use crate::table::ColumnKind;
    use polars::df;

    fn sample() -> Table {
        Table::new(
            df![
                "id" => [1i64, 2, 3],
                "score" => [Some(1.5), None, Some(4.0)],
                "label" => [Some("a < b & c"), Some("x, y"), None],
                "blank" => [Option::<&str>::None, None, None],
            ]
            .unwrap(),
        )
    }

    #[test]
    fn test_worksheet_xml_layout() {
        let xml = String::from_utf8(worksheet_xml(&sample()).unwrap()).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(r#"<row r="1"><c r="A1" t="inlineStr"><is><t xml:space="preserve">id</t></is></c>"#));
        assert!(xml.contains(r#"<c r="A2"><v>1</v></c>"#));
        assert!(xml.contains(r#"<c r="B2"><v>1.5</v></c>"#));
        assert!(!xml.contains(r#"r="B3""#));
        assert!(xml.contains("a &lt; b &amp; c"));
        assert!(!xml.contains(r#"r="D2""#));
    }

    #[test]
    fn test_workbook_names_single_sheet() {
        assert!(WORKBOOK_XML.contains(&format!(r#"<sheet name="{SHEET_NAME}""#)));
    }

    #[test]
    fn test_write_xlsx_is_zip() {
        let bytes = write_xlsx(&sample()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_write_xlsx_round_trip() {
        let original = sample();
        let reparsed = read_xlsx(&write_xlsx(&original).unwrap()).unwrap();

        assert_eq!(reparsed.column_names(), original.column_names());
        assert_eq!(
            reparsed.kinds(),
            &[
                ColumnKind::Numeric,
                ColumnKind::Numeric,
                ColumnKind::Text,
                ColumnKind::Empty
            ]
        );
        assert_eq!(reparsed.rows().unwrap(), original.rows().unwrap());
    }

    #[test]
    fn test_non_finite_numbers_are_left_empty() {
        let table = Table::new(df!["x" => [1.0, f64::INFINITY]].unwrap());
        let xml = String::from_utf8(worksheet_xml(&table).unwrap()).unwrap();

        assert!(xml.contains(r#"<c r="A2"><v>1</v></c>"#));
        assert!(!xml.contains(r#"r="A3""#));
    }
}
