//! Minimal multi-sheet XLSX writer.
//!
//! Builds the SpreadsheetML parts by hand and packs them with `zip`. Strings
//! are written inline, so no shared-string table is needed. Row 1 of every
//! sheet is treated as a header and rendered bold.

use anyhow::{Context, Result, bail};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::columns::column_name;
use crate::grid::Cell;

const RELS_DOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

// Style 0 is the default, style 1 the bold header font.
const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="2">"#,
    r#"<font><sz val="11"/><name val="Calibri"/></font>"#,
    r#"<font><b/><sz val="11"/><name val="Calibri"/></font>"#,
    r#"</fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="2">"#,
    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>"#,
    r#"</cellXfs>"#,
    r#"</styleSheet>"#,
);

const MAX_SHEET_NAME_LEN: usize = 31;

/// A named sheet: header row plus data rows.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Default)]
pub struct WorkbookWriter {
    sheets: Vec<Sheet>,
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet. Names must be unique and valid Excel sheet names.
    pub fn add_sheet(&mut self, sheet: Sheet) -> Result<&mut Self> {
        validate_sheet_name(&sheet.name)?;
        if self.sheets.iter().any(|s| s.name.eq_ignore_ascii_case(&sheet.name)) {
            bail!("Sheet '{}' already exists", sheet.name);
        }
        self.sheets.push(sheet);
        Ok(self)
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Writes the workbook to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if self.sheets.is_empty() {
            bail!("Workbook must contain at least one sheet");
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut zip = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let names: Vec<&str> = self.sheets.iter().map(|s| s.name.as_str()).collect();

        let parts = [
            ("[Content_Types].xml".to_string(), content_types_xml(names.len())),
            ("_rels/.rels".to_string(), RELS_DOT_RELS.to_string()),
            ("xl/workbook.xml".to_string(), workbook_xml(&names)),
            ("xl/_rels/workbook.xml.rels".to_string(), workbook_rels_xml(names.len())),
            ("xl/styles.xml".to_string(), STYLES_XML.to_string()),
        ];
        for (name, body) in parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(body.as_bytes())?;
        }

        for (i, sheet) in self.sheets.iter().enumerate() {
            zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
            zip.write_all(sheet_xml(sheet).as_bytes())?;
        }

        zip.finish()?;
        Ok(())
    }
}

fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
        bail!("Sheet name '{name}' must be 1-{MAX_SHEET_NAME_LEN} characters");
    }
    if name.contains(['[', ']', ':', '*', '?', '/', '\\']) {
        bail!("Sheet name '{name}' contains a character Excel does not allow");
    }
    Ok(())
}

fn workbook_xml(names: &[&str]) -> String {
    let mut sheets = String::new();
    for (i, name) in names.iter().enumerate() {
        let id = i + 1;
        let _ = write!(
            sheets,
            r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#,
            xml_escape(name)
        );
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets>{}</sheets>"#,
            r#"</workbook>"#,
        ),
        sheets
    )
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut rels = String::new();
    for i in 1..=sheet_count {
        let _ = write!(
            rels,
            r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        );
    }
    let styles_id = sheet_count + 1;
    let _ = write!(
        rels,
        r#"<Relationship Id="rId{styles_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
    );

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"{}"#,
            r#"</Relationships>"#,
        ),
        rels
    )
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut overrides = String::new();
    for i in 1..=sheet_count {
        let _ = write!(
            overrides,
            r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            r#"{}"#,
            r#"</Types>"#,
        ),
        overrides
    )
}

fn sheet_xml(sheet: &Sheet) -> String {
    let mut xml = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        r#"<sheetData>"#,
    ));

    let header: Vec<Cell> = sheet.headers.iter().map(|h| Cell::text(h.as_str())).collect();
    let rows = std::iter::once((&header, 1)).chain(sheet.rows.iter().map(|r| (r, 0)));

    for (i, (cells, style)) in rows.enumerate() {
        let row = i + 1;
        let _ = write!(xml, r#"<row r="{row}">"#);
        for (col, cell) in cells.iter().enumerate() {
            write_cell(&mut xml, &format!("{}{}", column_name(col), row), cell, style);
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn write_cell(xml: &mut String, cell_ref: &str, cell: &Cell, style: u8) {
    let style_attr = if style == 0 {
        String::new()
    } else {
        format!(r#" s="{style}""#)
    };

    match cell {
        Cell::Number(n) if n.is_finite() => {
            let _ = write!(xml, r#"<c r="{cell_ref}"{style_attr}><v>{n}</v></c>"#);
        }
        Cell::Text(s) => {
            let _ = write!(
                xml,
                r#"<c r="{cell_ref}"{style_attr} t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                xml_escape(s)
            );
        }
        Cell::Number(_) | Cell::Empty => {}
    }
}

pub(crate) fn xml_escape(s: &str) -> String {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
