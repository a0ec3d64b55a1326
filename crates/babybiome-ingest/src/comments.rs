//! Cell comments ("notes") of an xlsx worksheet.
//!
//! Comments live outside the cell data, in a `commentsN.xml` part linked to
//! the worksheet through relationship parts:
//!
//! `xl/workbook.xml` (sheet name → r:id) → `xl/_rels/workbook.xml.rels`
//! (r:id → worksheet part) → `<sheet dir>/_rels/<sheet>.rels`
//! (comments relationship) → comments part (`<comment ref="C5">`).

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{IngestError, Result};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const COMMENTS_REL_SUFFIX: &str = "/comments";

/// Comment texts of one worksheet keyed by zero-based (row, column).
pub type CellComments = BTreeMap<(usize, usize), String>;

/// Read all cell comments of `sheet`. A sheet without comments yields an
/// empty map.
pub fn read_sheet_comments(path: &Path, sheet: &str) -> Result<CellComments> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| IngestError::Archive {
        path: path.to_path_buf(),
        part: String::new(),
        source,
    })?;

    let workbook = read_part(&mut archive, path, WORKBOOK_PART)?.ok_or_else(|| {
        IngestError::Workbook {
            path: path.to_path_buf(),
            message: format!("missing {WORKBOOK_PART}"),
        }
    })?;
    let sheets = parse_workbook_sheets(&workbook)
        .map_err(|message| xml_error(path, WORKBOOK_PART, message))?;
    let Some(rel_id) = sheets
        .into_iter()
        .find_map(|(name, id)| (name == sheet).then_some(id))
    else {
        return Err(IngestError::SheetNotFound {
            sheet: sheet.to_string(),
            path: path.to_path_buf(),
        });
    };

    let workbook_rels = read_part(&mut archive, path, WORKBOOK_RELS_PART)?.unwrap_or_default();
    let relationships = parse_relationships(&workbook_rels)
        .map_err(|message| xml_error(path, WORKBOOK_RELS_PART, message))?;
    let Some(sheet_part) = relationships
        .iter()
        .find(|rel| rel.id == rel_id)
        .map(|rel| resolve_target("xl", &rel.target))
    else {
        return Err(IngestError::Workbook {
            path: path.to_path_buf(),
            message: format!("no relationship {rel_id} for worksheet '{sheet}'"),
        });
    };

    let (sheet_dir, sheet_file) = split_part(&sheet_part);
    let sheet_rels_part = if sheet_dir.is_empty() {
        format!("_rels/{sheet_file}.rels")
    } else {
        format!("{sheet_dir}/_rels/{sheet_file}.rels")
    };
    let Some(sheet_rels) = read_part(&mut archive, path, &sheet_rels_part)? else {
        debug!(sheet, "worksheet has no relationships, no comments");
        return Ok(CellComments::new());
    };
    let sheet_relationships = parse_relationships(&sheet_rels)
        .map_err(|message| xml_error(path, &sheet_rels_part, message))?;
    let Some(comments_part) = sheet_relationships
        .iter()
        .find(|rel| rel.kind.ends_with(COMMENTS_REL_SUFFIX))
        .map(|rel| resolve_target(sheet_dir, &rel.target))
    else {
        debug!(sheet, "worksheet has no comments part");
        return Ok(CellComments::new());
    };

    let Some(comments_xml) = read_part(&mut archive, path, &comments_part)? else {
        return Ok(CellComments::new());
    };
    let comments = parse_comments(&comments_xml)
        .map_err(|message| xml_error(path, &comments_part, message))?;
    debug!(sheet, part = %comments_part, count = comments.len(), "read cell comments");
    Ok(comments)
}

fn xml_error(path: &Path, part: &str, message: String) -> IngestError {
    IngestError::Xml {
        path: path.to_path_buf(),
        part: part.to_string(),
        message,
    }
}

fn read_part(archive: &mut ZipArchive<File>, path: &Path, part: &str) -> Result<Option<String>> {
    let mut entry = match archive.by_name(part) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(source) => {
            return Err(IngestError::Archive {
                path: path.to_path_buf(),
                part: part.to_string(),
                source,
            });
        }
    };
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|source| IngestError::Io {
            path: path.join(part),
            source,
        })?;
    Ok(Some(content))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Relationship {
    id: String,
    kind: String,
    target: String,
}

fn parse_workbook_sheets(xml: &str) -> std::result::Result<Vec<(String, String)>, String> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();
    loop {
        match reader.read_event().map_err(|err| err.to_string())? {
            Event::Start(element) | Event::Empty(element)
                if element.local_name().as_ref() == b"sheet" =>
            {
                let name = attribute(&element, b"name")?;
                let id = attribute(&element, b"id")?;
                if let (Some(name), Some(id)) = (name, id) {
                    sheets.push((name, id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(sheets)
}

fn parse_relationships(xml: &str) -> std::result::Result<Vec<Relationship>, String> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = Vec::new();
    loop {
        match reader.read_event().map_err(|err| err.to_string())? {
            Event::Start(element) | Event::Empty(element)
                if element.local_name().as_ref() == b"Relationship" =>
            {
                let id = attribute(&element, b"Id")?.unwrap_or_default();
                let kind = attribute(&element, b"Type")?.unwrap_or_default();
                let target = attribute(&element, b"Target")?.unwrap_or_default();
                relationships.push(Relationship { id, kind, target });
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(relationships)
}

fn parse_comments(xml: &str) -> std::result::Result<CellComments, String> {
    let mut reader = Reader::from_str(xml);
    let mut comments = CellComments::new();
    let mut current: Option<((usize, usize), String)> = None;
    let mut in_text = false;
    // Phonetic runs repeat the text in another script.
    let mut in_phonetic = false;
    loop {
        match reader.read_event().map_err(|err| err.to_string())? {
            Event::Start(element) => match element.local_name().as_ref() {
                b"comment" => {
                    let reference = attribute(&element, b"ref")?.unwrap_or_default();
                    current = parse_cell_ref(&reference).map(|cell| (cell, String::new()));
                }
                b"t" => in_text = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::End(element) => match element.local_name().as_ref() {
                b"comment" => {
                    if let Some((cell, text)) = current.take() {
                        comments.insert(cell, text);
                    }
                }
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Text(text) if in_text && !in_phonetic => {
                if let Some((_, buffer)) = current.as_mut() {
                    let raw = std::str::from_utf8(&text).map_err(|err| err.to_string())?;
                    buffer.push_str(&unescape(raw)?);
                }
            }
            Event::GeneralRef(reference) if in_text && !in_phonetic => {
                if let Some((_, buffer)) = current.as_mut() {
                    let name = std::str::from_utf8(&reference).map_err(|err| err.to_string())?;
                    buffer.push_str(&resolve_entity(name)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(comments)
}

fn attribute(element: &BytesStart<'_>, local: &[u8]) -> std::result::Result<Option<String>, String> {
    for attr in element.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        if attr.key.local_name().as_ref() == local {
            let raw = std::str::from_utf8(&attr.value).map_err(|err| err.to_string())?;
            return Ok(Some(unescape(raw)?.into_owned()));
        }
    }
    Ok(None)
}

fn unescape(raw: &str) -> std::result::Result<Cow<'_, str>, String> {
    quick_xml::escape::unescape(raw).map_err(|err| err.to_string())
}

fn resolve_entity(name: &str) -> std::result::Result<String, String> {
    let resolved = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()
            } else {
                None
            };
            return code
                .and_then(char::from_u32)
                .map(String::from)
                .ok_or_else(|| format!("unknown entity &{name};"));
        }
    };
    Ok(resolved.to_string())
}

/// `C5` → (4, 2). Absolute markers (`$C$5`) are accepted.
pub fn parse_cell_ref(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let column = letters
        .chars()
        .try_fold(0usize, |acc, c| {
            let value = (c.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
            acc.checked_mul(26)?.checked_add(value)
        })?
        .checked_sub(1)?;
    let row = digits.parse::<usize>().ok()?.checked_sub(1)?;
    Some((row, column))
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn split_part(part: &str) -> (&str, &str) {
    match part.rfind('/') {
        Some(index) => (&part[..index], &part[index + 1..]),
        None => ("", part),
    }
}
