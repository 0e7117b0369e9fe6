//! PDF text extraction with OCR of embedded raster images

use crate::error::{ExamGeneratorError, Result};
use crate::input::ocr::OcrEngine;
use crate::input::text_extractor::TextExtractor;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashSet;
use std::sync::Arc;

/// Native page text followed by OCR output for each image on the page.
pub struct PdfExtractor {
    ocr: Arc<dyn OcrEngine>,
}

/// Raster image found in a page's resources.
struct EmbeddedImage<'a> {
    id: ObjectId,
    stream: &'a Stream,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorSpace {
    fn components(self) -> usize {
        match self {
            ColorSpace::Gray => 1,
            ColorSpace::Rgb => 3,
            ColorSpace::Cmyk => 4,
        }
    }
}

/// How image samples map to colours.
#[derive(Debug, Clone, PartialEq)]
enum ImageColor {
    Direct(ColorSpace),
    /// Samples are indexes into `palette`, `base.components()` bytes per entry
    Indexed { base: ColorSpace, palette: Vec<u8> },
}

impl PdfExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Image XObjects visible from a page, including those in resources
    /// inherited from ancestor `Pages` nodes. The nearest definition of a
    /// name wins and each image object is returned once.
    fn page_images<'a>(doc: &'a Document, page_id: ObjectId) -> Result<Vec<EmbeddedImage<'a>>> {
        let (own, inherited) = doc.get_page_resources(page_id)?;
        let resources = own
            .into_iter()
            .chain(inherited.into_iter().filter_map(|id| doc.get_dictionary(id).ok()));

        let mut images = Vec::new();
        let mut seen_names: HashSet<Vec<u8>> = HashSet::new();
        let mut seen_ids: HashSet<ObjectId> = HashSet::new();

        for resource in resources {
            let xobjects = match resource.get(b"XObject") {
                Ok(obj) => doc.dereference(obj)?.1.as_dict()?,
                Err(_) => continue,
            };

            for (name, obj) in xobjects.iter() {
                if !seen_names.insert(name.clone()) {
                    continue;
                }
                let (id, resolved) = doc.dereference(obj)?;
                let Ok(stream) = resolved.as_stream() else {
                    continue;
                };
                let is_image = stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|s| s.as_name())
                    .map(|s| s == b"Image")
                    .unwrap_or(false);
                if !is_image {
                    continue;
                }
                if let Some(id) = id {
                    if !seen_ids.insert(id) {
                        continue;
                    }
                }
                log::debug!("Found image XObject /{}", String::from_utf8_lossy(name));
                images.push(EmbeddedImage {
                    id: id.unwrap_or((0, 0)),
                    stream,
                });
            }
        }

        Ok(images)
    }

    fn decode_image(doc: &Document, image: &EmbeddedImage<'_>) -> Result<DynamicImage> {
        let dict = &image.stream.dict;
        let filters = stream_filters(dict);

        if filters.iter().any(|f| f == "DCTDecode") {
            return Ok(image::load_from_memory_with_format(
                &image.stream.content,
                ImageFormat::Jpeg,
            )?);
        }
        if let Some(unsupported) = filters
            .iter()
            .find(|f| matches!(f.as_str(), "JPXDecode" | "JBIG2Decode" | "CCITTFaxDecode"))
        {
            return Err(ExamGeneratorError::ImageDecode(format!(
                "image {:?} uses unsupported filter {}",
                image.id, unsupported
            )));
        }

        let width = dict_u32(dict, b"Width")?;
        let height = dict_u32(dict, b"Height")?;

        // Stencil masks are always one bit of gray
        let is_mask = dict.get(b"ImageMask").and_then(|m| m.as_bool()).unwrap_or(false);
        let (bits, color) = if is_mask {
            (1, ImageColor::Direct(ColorSpace::Gray))
        } else {
            let bits = dict.get(b"BitsPerComponent").and_then(|b| b.as_i64()).unwrap_or(8);
            (bits, resolve_image_color(doc, dict)?)
        };
        let bits = match bits {
            1 | 2 | 4 | 8 | 16 => bits as u8,
            other => {
                return Err(ExamGeneratorError::ImageDecode(format!(
                    "image {:?} has {} bits per component",
                    image.id, other
                )))
            }
        };

        let samples = if filters.is_empty() {
            image.stream.content.clone()
        } else {
            image.stream.decompressed_content()?
        };

        let (space, components, scale) = match &color {
            ImageColor::Direct(space) => (*space, space.components(), true),
            ImageColor::Indexed { base, .. } => (*base, 1, false),
        };
        let short = || {
            ExamGeneratorError::ImageDecode(format!(
                "image {:?} has fewer samples than {}x{} {:?}",
                image.id, width, height, color_label(&color)
            ))
        };

        let mut values = unpack_samples(&samples, width, height, components, bits, scale)
            .ok_or_else(short)?;
        match &color {
            ImageColor::Direct(_) if decode_inverted(dict) => {
                values.iter_mut().for_each(|v| *v = 255 - *v);
            }
            ImageColor::Indexed { base, palette } => {
                values = expand_palette(&values, palette, base.components());
            }
            _ => {}
        }

        let decoded = match space {
            ColorSpace::Gray => GrayImage::from_raw(width, height, values).map(DynamicImage::ImageLuma8),
            ColorSpace::Rgb => RgbImage::from_raw(width, height, values).map(DynamicImage::ImageRgb8),
            ColorSpace::Cmyk => {
                RgbImage::from_raw(width, height, cmyk_to_rgb(&values)).map(DynamicImage::ImageRgb8)
            }
        };

        decoded.ok_or_else(short)
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, data: &[u8]) -> Result<String> {
        log::info!("Extracting text from PDF...");
        let doc = Document::load_mem(data)?;

        let mut text = String::new();
        for (page_number, page_id) in doc.get_pages() {
            let page_text = doc.extract_text(&[page_number])?;
            log::debug!("Page {}: {} characters of native text", page_number, page_text.len());
            append_segment(&mut text, &page_text);

            for image in Self::page_images(&doc, page_id)? {
                let decoded = Self::decode_image(&doc, &image)?;
                let recognized = self.ocr.recognize(&decoded)?;
                log::debug!(
                    "Page {}: OCR produced {} characters for image {:?}",
                    page_number,
                    recognized.len(),
                    image.id
                );
                append_segment(&mut text, &recognized);
            }
        }

        Ok(text)
    }
}

/// Append a chunk, keeping adjacent chunks from running into each other.
fn append_segment(acc: &mut String, segment: &str) {
    if segment.is_empty() {
        return;
    }
    if acc.chars().last().is_some_and(|c| !c.is_whitespace()) {
        acc.push('\n');
    }
    acc.push_str(segment);
}

fn stream_filters(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).into_owned()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok())
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect(),
        _ => Vec::new(),
    }
}

fn dict_u32(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    dict.get(key)
        .and_then(|v| v.as_i64())
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            ExamGeneratorError::ImageDecode(format!(
                "missing or invalid /{}",
                String::from_utf8_lossy(key)
            ))
        })
}

fn resolve_image_color(doc: &Document, dict: &Dictionary) -> Result<ImageColor> {
    match dict.get(b"ColorSpace") {
        Ok(obj) => parse_color_space(doc, obj),
        // JPEGs carry no colour space; treat as gray
        Err(_) => Ok(ImageColor::Direct(ColorSpace::Gray)),
    }
}

fn parse_color_space(doc: &Document, obj: &Object) -> Result<ImageColor> {
    let obj = doc.dereference(obj)?.1;

    let name: &[u8] = match obj {
        Object::Name(name) => name.as_slice(),
        Object::Array(items) => match items.first() {
            Some(Object::Name(family)) if family.as_slice() == b"ICCBased" => {
                let components = items
                    .get(1)
                    .and_then(|r| doc.dereference(r).ok())
                    .and_then(|(_, o)| o.as_stream().ok())
                    .and_then(|s| s.dict.get(b"N").ok())
                    .and_then(|n| n.as_i64().ok());
                return match components {
                    Some(1) => Ok(ImageColor::Direct(ColorSpace::Gray)),
                    Some(3) => Ok(ImageColor::Direct(ColorSpace::Rgb)),
                    Some(4) => Ok(ImageColor::Direct(ColorSpace::Cmyk)),
                    other => Err(ExamGeneratorError::ImageDecode(format!(
                        "ICC profile with {:?} components",
                        other
                    ))),
                };
            }
            Some(Object::Name(family)) if matches!(family.as_slice(), b"Indexed" | b"I") => {
                return parse_indexed(doc, items);
            }
            Some(Object::Name(family)) => family.as_slice(),
            _ => b"",
        },
        _ => b"",
    };

    match name {
        b"DeviceGray" | b"CalGray" | b"G" => Ok(ImageColor::Direct(ColorSpace::Gray)),
        b"DeviceRGB" | b"CalRGB" | b"RGB" => Ok(ImageColor::Direct(ColorSpace::Rgb)),
        b"DeviceCMYK" | b"CMYK" => Ok(ImageColor::Direct(ColorSpace::Cmyk)),
        other => Err(ExamGeneratorError::ImageDecode(format!(
            "unsupported colour space {}",
            String::from_utf8_lossy(other)
        ))),
    }
}

/// `[/Indexed base hival lookup]`
fn parse_indexed(doc: &Document, items: &[Object]) -> Result<ImageColor> {
    let invalid = |what: &str| ExamGeneratorError::ImageDecode(format!("indexed colour space: {}", what));

    let base = match items.get(1).map(|b| parse_color_space(doc, b)).transpose()? {
        Some(ImageColor::Direct(base)) => base,
        Some(ImageColor::Indexed { .. }) => return Err(invalid("nested palette")),
        None => return Err(invalid("missing base")),
    };
    let hival = items
        .get(2)
        .and_then(|h| h.as_i64().ok())
        .filter(|h| (0..=255).contains(h))
        .ok_or_else(|| invalid("bad hival"))? as usize;

    let lookup = items.get(3).ok_or_else(|| invalid("missing lookup"))?;
    let mut palette = match doc.dereference(lookup)?.1 {
        Object::String(bytes, _) => bytes.clone(),
        Object::Stream(stream) if stream_filters(&stream.dict).is_empty() => stream.content.clone(),
        Object::Stream(stream) => stream.decompressed_content()?,
        _ => return Err(invalid("lookup is not a string or stream")),
    };

    let needed = (hival + 1) * base.components();
    if palette.len() < needed {
        return Err(invalid("lookup table too short"));
    }
    palette.truncate(needed);

    Ok(ImageColor::Indexed { base, palette })
}

fn color_label(color: &ImageColor) -> String {
    match color {
        ImageColor::Direct(space) => format!("{:?}", space),
        ImageColor::Indexed { base, .. } => format!("Indexed {:?}", base),
    }
}

/// Unpack byte-aligned rows of `bits`-wide samples into one byte per sample.
/// Direct colour values are scaled to 0..=255; palette indexes are kept as is.
/// Returns `None` when `data` holds fewer rows than the image needs.
fn unpack_samples(
    data: &[u8],
    width: u32,
    height: u32,
    components: usize,
    bits: u8,
    scale: bool,
) -> Option<Vec<u8>> {
    let per_row = width as usize * components;
    let row_bytes = (per_row * bits as usize + 7) / 8;
    let rows = height as usize;
    if data.len() < row_bytes * rows {
        return None;
    }
    if bits == 8 {
        return Some(data[..row_bytes * rows].to_vec());
    }

    let max = (1u32 << bits.min(8)) - 1;
    let mut out = Vec::with_capacity(per_row * rows);
    for row in data.chunks_exact(row_bytes).take(rows) {
        for i in 0..per_row {
            if bits == 16 {
                // High byte only
                out.push(row[i * 2]);
                continue;
            }
            let bit = i * bits as usize;
            let shift = 8 - bits as usize - bit % 8;
            let value = (row[bit / 8] >> shift) as u32 & max;
            out.push(if scale { (value * 255 / max) as u8 } else { value as u8 });
        }
    }
    Some(out)
}

fn expand_palette(indexes: &[u8], palette: &[u8], components: usize) -> Vec<u8> {
    let entries = palette.len() / components;
    indexes
        .iter()
        .flat_map(|&i| {
            // Out-of-range indexes clamp to the last entry
            let start = (i as usize).min(entries - 1) * components;
            palette[start..start + components].iter().copied()
        })
        .collect()
}

/// A `/Decode [1 0 ...]` array swaps dark and light.
fn decode_inverted(dict: &Dictionary) -> bool {
    let Ok(decode) = dict.get(b"Decode").and_then(|d| d.as_array()) else {
        return false;
    };
    match (decode.first().and_then(number), decode.get(1).and_then(number)) {
        (Some(low), Some(high)) => low > high,
        _ => false,
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    cmyk.chunks_exact(4)
        .flat_map(|px| {
            let k = 255 - px[3] as u16;
            [
                ((255 - px[0] as u16) * k / 255) as u8,
                ((255 - px[1] as u16) * k / 255) as u8,
                ((255 - px[2] as u16) * k / 255) as u8,
            ]
        })
        .collect()
}
