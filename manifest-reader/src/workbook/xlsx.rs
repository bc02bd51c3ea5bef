//! Minimal read-only XLSX reader
//!
//! Only what the manifests need: sheet names and order from
//! `xl/workbook.xml`, part paths from `xl/_rels/workbook.xml.rels`, the shared
//! strings table, and cell values from each worksheet's `<sheetData>`.
//! Styles, formulas and merged cells are ignored; a formula cell reads as its
//! cached value.

use super::{Sheet, WorkbookSource};
use crate::types::{CellValue, ManifestError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Worksheet limits (XFD1048576)
const MAX_COLUMNS: usize = 16_384;
const MAX_ROWS: usize = 1_048_576;

/// Sheet entry from workbook.xml, resolved to its worksheet part
#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    part: String,
}

/// An opened `.xlsx` workbook
pub struct XlsxWorkbook<R: Read + Seek = BufReader<File>> {
    archive: ZipArchive<R>,
    sheets: Vec<SheetEntry>,
    shared_strings: Vec<String>,
}

impl XlsxWorkbook<BufReader<File>> {
    /// Open a workbook file on disk
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ManifestError::InputNotFound(path.to_path_buf()));
        }
        log::info!("Opening workbook: {:?}", path);
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> XlsxWorkbook<R> {
    /// Read the workbook index from any seekable reader
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let workbook_xml = read_part(&mut archive, WORKBOOK_PART)?.ok_or_else(|| {
            ManifestError::Workbook(format!("Missing {} (not an XLSX file?)", WORKBOOK_PART))
        })?;
        let rels = match read_part(&mut archive, WORKBOOK_RELS_PART)? {
            Some(xml) => parse_relationships(&xml)?,
            None => HashMap::new(),
        };

        let mut sheets = Vec::new();
        for (index, (name, rel_id)) in parse_workbook_sheets(&workbook_xml)?.into_iter().enumerate() {
            let part = match rels.get(&rel_id) {
                Some(target) => resolve_target(target),
                None => {
                    // Fall back to the conventional part name
                    log::warn!("No relationship {:?} for sheet {:?}", rel_id, name);
                    format!("xl/worksheets/sheet{}.xml", index + 1)
                }
            };
            log::debug!("Sheet {:?} -> {}", name, part);
            sheets.push(SheetEntry { name, part });
        }

        let shared_strings = match read_part(&mut archive, SHARED_STRINGS_PART)? {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };

        log::debug!(
            "Workbook index: {} sheets, {} shared strings",
            sheets.len(),
            shared_strings.len()
        );

        Ok(Self {
            archive,
            sheets,
            shared_strings,
        })
    }
}

impl<R: Read + Seek> WorkbookSource for XlsxWorkbook<R> {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet> {
        let entry = self
            .sheets
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| ManifestError::Workbook(format!("No sheet named {:?}", name)))?;

        let xml = read_part(&mut self.archive, &entry.part)?.ok_or_else(|| {
            ManifestError::Workbook(format!("Missing worksheet part {}", entry.part))
        })?;

        parse_worksheet(&entry.name, &xml, &self.shared_strings)
    }
}

/// Read a part as UTF-8 text, `None` if the archive has no such entry
fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Relationship targets are relative to `xl/` unless absolute
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn xml_error(part: &str, e: impl std::fmt::Display) -> ManifestError {
    ManifestError::Xml(format!("{}: {}", part, e))
}

/// Resolve the body of an entity or character reference (`amp`, `#x41`)
fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Append text carried by a text, CDATA or reference event to `buf`
fn push_text(event: &Event<'_>, buf: &mut String) {
    match event {
        Event::Text(t) => buf.push_str(&String::from_utf8_lossy(t)),
        Event::CData(t) => buf.push_str(&String::from_utf8_lossy(t)),
        Event::GeneralRef(r) => {
            let name = String::from_utf8_lossy(r);
            match resolve_reference(&name) {
                Some(c) => buf.push(c),
                None => {
                    buf.push('&');
                    buf.push_str(&name);
                    buf.push(';');
                }
            }
        }
        _ => {}
    }
}

/// Parse `<sheets>` from workbook.xml into (name, relationship id) pairs
fn parse_workbook_sheets(content: &str) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_str(content);
    let mut sheets = Vec::new();
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut rel_id = None;
                for attr in e.attributes().flatten() {
                    let value = attr
                        .decode_and_unescape_value(reader.decoder())
                        .map_err(|e| xml_error(WORKBOOK_PART, e))?
                        .into_owned();
                    match attr.key.local_name().as_ref() {
                        b"name" => name = Some(value),
                        b"id" => rel_id = Some(value),
                        _ => {}
                    }
                }
                if let Some(name) = name {
                    sheets.push((name, rel_id.unwrap_or_default()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(WORKBOOK_PART, e)),
            _ => {}
        }
    }

    Ok(sheets)
}

/// Parse workbook relationships into Id -> Target
fn parse_relationships(content: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(content);
    let mut rels = HashMap::new();
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr
                        .decode_and_unescape_value(reader.decoder())
                        .map_err(|e| xml_error(WORKBOOK_RELS_PART, e))?
                        .into_owned();
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    rels.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(WORKBOOK_RELS_PART, e)),
            _ => {}
        }
    }

    Ok(rels)
}

/// Parse the shared strings table. Rich text runs are concatenated and
/// phonetic hints (`<rPh>`) are dropped.
fn parse_shared_strings(content: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(content);
    let mut strings = Vec::new();
    let mut buf = Vec::with_capacity(1024);

    let mut current = String::new();
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        buf.clear();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml_error(SHARED_STRINGS_PART, e))?;
        match &event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"rPh" => in_phonetic = true,
                b"t" if !in_phonetic => in_text = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"rPh" => in_phonetic = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            other if in_text => push_text(other, &mut current),
            _ => {}
        }
    }

    Ok(strings)
}

/// Zero-based column of a cell reference such as `AB12`, `None` without letters
fn column_index(sheet: &str, reference: &str) -> Result<Option<usize>> {
    let end = reference
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(reference.len());
    let letters = &reference[..end];
    if letters.is_empty() {
        return Ok(None);
    }
    letters
        .bytes()
        .try_fold(0usize, |acc, b| {
            acc.checked_mul(26)?
                .checked_add((b.to_ascii_uppercase() - b'A' + 1) as usize)
        })
        .filter(|&col| col <= MAX_COLUMNS)
        .map(|col| Some(col - 1))
        .ok_or_else(|| out_of_range(sheet, reference))
}

fn out_of_range(sheet: &str, reference: &str) -> ManifestError {
    ManifestError::Workbook(format!(
        "Cell reference {:?} out of range in sheet {:?}",
        reference, sheet
    ))
}

/// Cell being assembled while walking `<c>`
#[derive(Default)]
struct PendingCell {
    col: usize,
    cell_type: Option<String>,
    value: String,
    has_value: bool,
}

impl PendingCell {
    fn finish(self, shared_strings: &[String], sheet: &str) -> Result<CellValue> {
        if !self.has_value {
            return Ok(CellValue::Empty);
        }
        let raw = self.value;
        let value = match self.cell_type.as_deref() {
            Some("s") => {
                let index: usize = raw.trim().parse().map_err(|_| {
                    ManifestError::Workbook(format!(
                        "Invalid shared string index {:?} in sheet {:?}",
                        raw, sheet
                    ))
                })?;
                let text = shared_strings.get(index).ok_or_else(|| {
                    ManifestError::Workbook(format!(
                        "Shared string {} out of range in sheet {:?}",
                        index, sheet
                    ))
                })?;
                CellValue::Text(text.clone())
            }
            Some("str") | Some("inlineStr") => CellValue::Text(raw),
            Some("b") => CellValue::Bool(raw.trim() == "1"),
            Some("e") => CellValue::Error(raw),
            _ => match raw.trim().parse::<f64>() {
                Ok(v) => CellValue::Number(v),
                Err(_) => CellValue::Text(raw),
            },
        };
        // Empty text counts as no value
        match value {
            CellValue::Text(text) if text.is_empty() => Ok(CellValue::Empty),
            other => Ok(other),
        }
    }
}

/// Parse a worksheet part into a `Sheet`
fn parse_worksheet(name: &str, content: &str, shared_strings: &[String]) -> Result<Sheet> {
    let mut reader = Reader::from_str(content);
    let mut sheet = Sheet::new(name);
    let mut buf = Vec::with_capacity(1024);

    // Next row/column when `r` attributes are absent
    let mut next_row = 0usize;
    let mut row = 0usize;
    let mut next_col = 0usize;
    let mut cell: Option<PendingCell> = None;
    let mut capture = false;
    let mut in_phonetic = false;

    loop {
        buf.clear();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml_error(name, e))?;
        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"row" => {
                        row = next_row;
                        for attr in e.attributes().flatten() {
                            if attr.key.local_name().as_ref() == b"r" {
                                let value = std::str::from_utf8(&attr.value).unwrap_or_default();
                                row = match value.trim().parse::<usize>() {
                                    Ok(r) if (1..=MAX_ROWS).contains(&r) => r - 1,
                                    _ => return Err(out_of_range(name, value)),
                                };
                            }
                        }
                        if row >= MAX_ROWS {
                            return Err(out_of_range(name, &(row + 1).to_string()));
                        }
                        next_row = row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        let mut pending = PendingCell {
                            col: next_col,
                            ..Default::default()
                        };
                        for attr in e.attributes().flatten() {
                            let value = std::str::from_utf8(&attr.value).unwrap_or_default();
                            match attr.key.local_name().as_ref() {
                                b"r" => {
                                    if let Some(col) = column_index(name, value)? {
                                        pending.col = col;
                                    }
                                }
                                b"t" => pending.cell_type = Some(value.to_string()),
                                _ => {}
                            }
                        }
                        if pending.col >= MAX_COLUMNS {
                            return Err(ManifestError::Workbook(format!(
                                "Too many cells in row {} of sheet {:?}",
                                row + 1,
                                name
                            )));
                        }
                        next_col = pending.col + 1;
                        if !is_empty {
                            cell = Some(pending);
                        }
                    }
                    b"rPh" if !is_empty => in_phonetic = true,
                    b"v" | b"t" if !is_empty && !in_phonetic => {
                        if let Some(pending) = cell.as_mut() {
                            pending.has_value = true;
                            capture = true;
                        }
                    }
                    b"t" if is_empty => {
                        if let Some(pending) = cell.as_mut() {
                            pending.has_value = true;
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => capture = false,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    if let Some(pending) = cell.take() {
                        let col = pending.col;
                        let value = pending.finish(shared_strings, name)?;
                        sheet.set(row, col, value);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            other if capture => {
                if let Some(pending) = cell.as_mut() {
                    push_text(other, &mut pending.value);
                }
            }
            _ => {}
        }
    }

    log::debug!("Read sheet {:?}: {} rows", name, sheet.row_count());
    Ok(sheet)
}
