//! PowerPoint (.pptx) text extraction

use crate::error::{ExamGeneratorError, Result};
use crate::input::text_extractor::TextExtractor;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";
const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Text of every text-bearing shape, slide by slide, one shape per line.
pub struct PowerPointExtractor;

impl PowerPointExtractor {
    /// Slide part names in presentation order.
    fn slide_parts(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<Vec<String>> {
        let ordered = match (
            read_part(archive, PRESENTATION_PART)?,
            read_part(archive, PRESENTATION_RELS_PART)?,
        ) {
            (Some(presentation), Some(rels)) => {
                let targets = parse_relationships(&rels)?;
                parse_slide_ids(&presentation)?
                    .into_iter()
                    .filter_map(|rel_id| targets.get(&rel_id).cloned())
                    .collect::<Vec<_>>()
            }
            _ => Vec::new(),
        };

        if !ordered.is_empty() {
            return Ok(ordered);
        }

        log::debug!("No slide list in presentation.xml, ordering slides by part name");
        let mut slides: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with(SLIDE_PREFIX) && name.ends_with(".xml"))
            .map(|s| s.to_string())
            .collect();
        slides.sort_by_key(|name| slide_number(name));
        Ok(slides)
    }
}

impl TextExtractor for PowerPointExtractor {
    fn extract(&self, data: &[u8]) -> Result<String> {
        log::info!("Extracting text from PowerPoint...");
        let mut archive = ZipArchive::new(Cursor::new(data))?;

        let mut text = String::new();
        for part in Self::slide_parts(&mut archive)? {
            let xml = read_part(&mut archive, &part)?.ok_or_else(|| {
                ExamGeneratorError::PowerPointExtraction(format!("missing slide part {}", part))
            })?;
            let shapes = shape_texts(&xml)?;
            log::debug!("{}: {} text shapes", part, shapes.len());
            for shape in shapes {
                text.push_str(&shape);
                text.push('\n');
            }
        }

        Ok(text)
    }
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

fn xml_error(e: impl std::fmt::Display) -> ExamGeneratorError {
    ExamGeneratorError::PowerPointExtraction(format!("Malformed XML: {}", e))
}

fn slide_number(part: &str) -> u32 {
    part.trim_start_matches(SLIDE_PREFIX)
        .trim_end_matches(".xml")
        .parse::<u32>()
        .unwrap_or(u32::MAX)
}

/// Relationship id -> package part name.
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().map_err(xml_error)?.into_owned();
                    match attr.key.as_ref() {
                        b"Id" => id = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, resolve_target(&target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(targets)
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target),
    }
}

/// Relationship ids of `<p:sldId>` entries, in presentation order.
fn parse_slide_ids(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                if let Some(rel_id) = relationship_id(&e)? {
                    ids.push(rel_id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(ids)
}

/// The namespaced `r:id` attribute, as opposed to the numeric `id`.
fn relationship_id(e: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
            return Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned()));
        }
    }
    Ok(None)
}

/// Text of each top-level shape on a slide that has a text body.
/// Shapes nested in groups are skipped.
fn shape_texts(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut shapes = Vec::new();
    let mut group_depth = 0usize;
    let mut in_shape = false;
    let mut in_body = false;
    let mut in_text = false;
    let mut paragraphs: Vec<String> = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"grpSp" => group_depth += 1,
                b"sp" if group_depth == 0 => {
                    in_shape = true;
                    paragraphs.clear();
                }
                b"txBody" if in_shape => in_body = true,
                b"p" if in_body => paragraphs.push(String::new()),
                b"t" if in_body => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" if in_body => paragraphs.push(String::new()),
                b"br" if in_body => {
                    if let Some(current) = paragraphs.last_mut() {
                        current.push('\n');
                    }
                }
                b"txBody" if in_shape => shapes.push(String::new()),
                _ => {}
            },
            Event::Text(e) if in_text => {
                let text = e.unescape().map_err(xml_error)?;
                if let Some(current) = paragraphs.last_mut() {
                    current.push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"grpSp" => group_depth = group_depth.saturating_sub(1),
                b"sp" if in_shape => in_shape = false,
                b"txBody" if in_body => {
                    in_body = false;
                    shapes.push(paragraphs.join("\n"));
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}
