use crate::error::CutsheetError;
use crate::error::ResultMessage;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::cell::DateSystem;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use zip::read::ZipFile;
use zip::ZipArchive;

const PART_WORKBOOK: &str = "xl/workbook.xml";
const PART_WORKBOOK_RELATIONSHIPS: &str = "xl/_rels/workbook.xml.rels";
const PART_SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const PART_STYLES: &str = "xl/styles.xml";

const TAG_RELATIONSHIP: &[u8] = b"Relationship";
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts");
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");
const TAG_FORMAT_INDEX: QName = QName(b"xf");
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");
const TAG_PHONETIC_TEXT: QName = QName(b"rPh"); // ruby text, not part of the value
const TAG_TEXT: QName = QName(b"t");
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr");
const TAG_SHEET: QName = QName(b"sheet");
const TAG_ROW: QName = QName(b"row");
const TAG_CELL: QName = QName(b"c");
const TAG_INLINE_STRING: QName = QName(b"is");
const TAG_VALUE: QName = QName(b"v");

pub(crate) struct XlsxSpreadsheet<RS: Read + Seek = BufReader<File>> {
    name: String,
    zip: ZipArchive<RS>,
    /// Cell type per style index (`s` attribute of a cell)
    number_formats: Vec<CellType>,
    /// Worksheets as (name, zip path) pairs in workbook order
    sheets: Vec<(String, String)>,
}

impl XlsxSpreadsheet {
    pub(crate) fn open(path: &Path) -> Result<Self, CutsheetError> {
        let file = File::open(path)?;
        Self::from_reader(&path.display().to_string(), BufReader::new(file))
    }
}

impl<RS: Read + Seek> XlsxSpreadsheet<RS> {
    pub(crate) fn from_reader(name: &str, reader: RS) -> Result<Self, CutsheetError> {
        let mut zip = ZipArchive::new(reader)?;
        let (sheets, system) = load_workbook(&mut zip).with_prefix(name)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::NoWorksheets(name.to_owned()))?
        }
        let number_formats = load_number_formats(&mut zip, system).with_prefix(name)?;
        Ok(XlsxSpreadsheet {
            name: name.to_owned(),
            zip,
            number_formats,
            sheets,
        })
    }
}

impl<RS: Read + Seek> Spreadsheet for XlsxSpreadsheet<RS> {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    fn load_shared_strings(&mut self) -> Result<Vec<String>, CutsheetError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader(PART_SHARED_STRINGS)? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
            }
        });
        Ok(shared_strings)
    }

    fn read_sheet(&mut self, criteria: &Criteria) -> Result<Sheet, CutsheetError> {
        let (sheet_name, zip_path) = self
            .sheets
            .iter()
            .find(|(name, _)| criteria.accept(name))
            .cloned()
            .ok_or_else(|| SpreadsheetError::SheetNotFound(self.name.to_owned()))?;

        let mut sheet = Sheet::new(&self.name, &sheet_name);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut reader = self
            .zip
            .xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::MissingPart(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(index) = event.get_attribute_value("r")?.and_then(|r| r.parse::<usize>().ok()) {
                    row_count = index.saturating_sub(1);
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event
                    .get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col + 1;
                value.clear();
                kind = match event.get_attribute_value("t")?.as_deref() {
                    Some("inlineStr") | Some("str") => CellType::InlineString,
                    Some("s") => CellType::SharedString,
                    Some("d") => CellType::IsoDateTime,
                    Some("b") => CellType::Boolean,
                    Some("e") => CellType::Error,
                    _ => CellType::Number,
                };
                if kind == CellType::Number {
                    if let Some(style) = event.get_attribute_value("s")?.filter(|s| !s.is_empty()) {
                        let index = style.parse::<usize>()?;
                        kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                    }
                }
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if kind != CellType::Error && !value.is_empty() {
                    sheet.push(Cell {
                        row,
                        col,
                        kind,
                        value: std::mem::take(&mut value),
                    });
                }
                kind = CellType::default();
            }
        });
        sheet.finish();
        Ok(sheet)
    }
}

/// Worksheet (name, zip path) pairs from `xl/workbook.xml`, plus the date system.
fn load_workbook<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
) -> Result<(Vec<(String, String)>, DateSystem), CutsheetError> {
    let relationships = load_relationships(zip, PART_WORKBOOK_RELATIONSHIPS)?;
    let mut reader = zip
        .xml_reader(PART_WORKBOOK)?
        .ok_or_else(|| SpreadsheetError::MissingPart(PART_WORKBOOK.to_owned()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for attribute in event.attributes() {
                let attribute = attribute?;
                // `r:id` carries a namespace prefix that varies between writers
                match attribute.key.local_name().as_ref() {
                    b"name" => name = Some(attribute.unescape_value()?),
                    b"id" => id = Some(attribute.unescape_value()?),
                    _ => (),
                }
            }
            if let Some(path) = id.and_then(|id| relationships.get(id.as_ref())) {
                if let Some(name) = name {
                    sheets.push((name.into_owned(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event
                .get_attribute_value("date1904")?
                .map(|value| value == "1" || value == "true")
                .unwrap_or(false);
        }
    });
    Ok((sheets, DateSystem::from_flag(is_1904)))
}

/// Worksheet relationship id → zip path.
fn load_relationships<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    path: &str,
) -> Result<HashMap<String, String>, CutsheetError> {
    let mut reader = zip
        .xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::MissingPart(path.to_owned()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map_or(true, |kind| kind.ends_with("/worksheet")) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.into_owned(), to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Style index → cell type, from the `cellXfs` and `numFmts` sections of `xl/styles.xml`.
fn load_number_formats<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    system: DateSystem,
) -> Result<Vec<CellType>, CutsheetError> {
    let mut reader = match zip.xml_reader(PART_STYLES)? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut in_custom_formats = false;
    let mut custom_formats = HashMap::<String, CellType>::new();
    let mut in_format_indexes = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => in_custom_formats = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => in_custom_formats = false,
        Event::Start(event) if in_custom_formats && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id.into_owned(), CellType::from_custom_format(&format, system));
            }
        }
        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => in_format_indexes = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => in_format_indexes = false,
        Event::Start(event) if in_format_indexes && event.name() == TAG_FORMAT_INDEX => {
            format_indexes.push(
                event
                    .get_attribute_value("numFmtId")?
                    .map(Cow::into_owned)
                    .unwrap_or_default(),
            );
        }
    });

    Ok(format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::from_builtin_format_id(id, system))
                .unwrap_or(CellType::Number)
        })
        .collect())
}

/// Normalises a relationship target to its path inside the archive.
fn to_zip_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_owned()
    } else if target.starts_with("xl/") {
        target.to_owned()
    } else {
        format!("xl/{target}")
    }
}

/// Collects the text of a string element up to `end_tag`, skipping phonetic runs.
fn read_string_value<RS: Read + Seek>(
    reader: &mut XmlReader<BufReader<ZipFile<'_, RS>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, CutsheetError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Cutsheet" sheetId="1" r:id="rId1"/><sheet name="Legend" sheetId="2" r:id="rId2"/></sheets>
</workbook>"#;

    const RELATIONSHIPS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/></numFmts>
<cellStyleXfs count="1"><xf numFmtId="0"/></cellStyleXfs>
<cellXfs count="3"><xf numFmtId="0"/><xf numFmtId="164"/><xf numFmtId="2"/></cellXfs>
</styleSheet>"#;

    const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<si><t>Name</t></si>
<si><r><t>Ru</t></r><r><t>n</t></r><rPh><t>ignored</t></rPh></si>
<si><t>spine &amp; leaf</t></si>
</sst>"#;

    const SHEET1: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="inlineStr"><is><t>Installed</t></is></c></row>
<row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2"><v>42</v></c><c r="C2" s="1"><v>45292</v></c></row>
<row r="4"><c r="A4" t="e"><v>#N/A</v></c><c r="B4" s="2"><v>7.0</v></c></row>
</sheetData></worksheet>"#;

    const SHEET2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row><c t="inlineStr"><is><t>legend</t></is></c></row>
</sheetData></worksheet>"#;

    /// Minimal two-sheet workbook as raw bytes.
    pub(crate) fn workbook_bytes(sheet1: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in [
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELATIONSHIPS),
            ("xl/styles.xml", STYLES),
            ("xl/sharedStrings.xml", SHARED_STRINGS),
            ("xl/worksheets/sheet1.xml", sheet1),
            ("xl/worksheets/sheet2.xml", SHEET2),
        ] {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn open() -> XlsxSpreadsheet<Cursor<Vec<u8>>> {
        XlsxSpreadsheet::from_reader("test.xlsx", Cursor::new(workbook_bytes(SHEET1))).unwrap()
    }

    #[test]
    fn lists_worksheets_in_order() {
        assert_eq!(open().sheet_names(), vec!["Cutsheet", "Legend"]);
    }

    #[test]
    fn shared_strings_join_runs_and_skip_phonetics() {
        let shared = open().load_shared_strings().unwrap();
        assert_eq!(shared, vec!["Name", "Run", "spine & leaf"]);
    }

    #[test]
    fn reads_first_sheet_cells() {
        let mut spreadsheet = open();
        let shared = spreadsheet.load_shared_strings().unwrap();
        let sheet = spreadsheet.read_sheet(&Criteria::default()).unwrap();
        assert_eq!(sheet.name, "Cutsheet");

        let texts: Vec<(String, String)> = sheet
            .cells
            .iter()
            .map(|cell| (cell.reference(), cell.to_text(&shared).unwrap()))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("A1".to_owned(), "Name".to_owned()),
                ("B1".to_owned(), "Run".to_owned()),
                ("C1".to_owned(), "Installed".to_owned()),
                ("A2".to_owned(), "spine & leaf".to_owned()),
                ("B2".to_owned(), "42".to_owned()),
                ("C2".to_owned(), "2024-01-01".to_owned()),
                ("B4".to_owned(), "7".to_owned()),
            ]
        );
    }

    #[test]
    fn reads_sheet_by_pattern_without_references() {
        let mut spreadsheet = open();
        let criteria = Criteria {
            sheet_name_pattern: Some(glob::Pattern::new("Leg*").unwrap()),
        };
        let sheet = spreadsheet.read_sheet(&criteria).unwrap();
        assert_eq!(sheet.cells.len(), 1);
        assert_eq!(sheet.cells[0].reference(), "A1");
    }

    #[test]
    fn unknown_sheet_is_an_error() {
        let mut spreadsheet = open();
        let criteria = Criteria {
            sheet_name_pattern: Some(glob::Pattern::new("Missing").unwrap()),
        };
        assert!(spreadsheet.read_sheet(&criteria).is_err());
    }

    #[test]
    fn not_a_zip_is_an_error() {
        let result = XlsxSpreadsheet::from_reader("broken.xlsx", Cursor::new(b"Name,Port\n".to_vec()));
        assert!(result.is_err());
    }

    #[test]
    fn zip_paths_are_normalised() {
        assert_eq!(to_zip_path("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path("/xl/worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path("xl/worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
    }
}
