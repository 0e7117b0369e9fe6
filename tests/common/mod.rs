//! Fixture builders and fakes shared by the integration tests

#![allow(dead_code)]

use exam_generator::error::Result;
use exam_generator::input::{InputManager, OcrEngine};
use exam_generator::processing::{
    ExamPipeline, KindPolicy, QuestionGenerator, QuestionKind, RuleBasedSentenceModel,
    SentenceSegmenter,
};
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// OCR stand-in that returns fixed text and counts calls
pub struct CountingOcr {
    text: String,
    calls: AtomicUsize,
}

impl CountingOcr {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for CountingOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

pub fn distractors() -> Vec<String> {
    vec!["Example A".into(), "Example B".into(), "Example C".into()]
}

/// Pipeline with the given OCR engine; `kind` pins every question to one kind.
pub fn pipeline(ocr: Arc<dyn OcrEngine>, kind: Option<QuestionKind>) -> ExamPipeline {
    let policy = kind.map(KindPolicy::only).unwrap_or_default();
    ExamPipeline::new(
        InputManager::new(ocr),
        SentenceSegmenter::new(Arc::new(RuleBasedSentenceModel::default())),
        QuestionGenerator::new(policy, distractors()).unwrap(),
    )
}

/// Raster image XObject for PDF fixtures
pub struct PdfImage {
    pub width: u32,
    pub height: u32,
    pub color_space: Object,
    pub bits: i64,
    pub samples: Vec<u8>,
}

impl PdfImage {
    /// 8-bit DeviceGray ramp
    pub fn gray(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            color_space: "DeviceGray".into(),
            bits: 8,
            samples: (0..width * height).map(|i| (i % 256) as u8).collect(),
        }
    }

    /// 1-bit DeviceGray checkerboard, rows padded to whole bytes
    pub fn bilevel(width: u32, height: u32) -> Self {
        let row_bytes = (width as usize + 7) / 8;
        let samples = (0..height)
            .flat_map(|row| {
                let pattern = if row % 2 == 0 { 0b1010_1010 } else { 0b0101_0101 };
                std::iter::repeat(pattern).take(row_bytes)
            })
            .collect();
        Self {
            width,
            height,
            color_space: "DeviceGray".into(),
            bits: 1,
            samples,
        }
    }

    /// 8-bit palette image over a two-entry DeviceRGB lookup
    pub fn indexed_rgb(width: u32, height: u32) -> Self {
        let palette = Object::String(vec![255, 255, 255, 0, 0, 0], StringFormat::Hexadecimal);
        Self {
            width,
            height,
            color_space: vec![
                Object::Name(b"Indexed".to_vec()),
                Object::Name(b"DeviceRGB".to_vec()),
                1.into(),
                palette,
            ]
            .into(),
            bits: 8,
            samples: (0..width * height).map(|i| (i % 2) as u8).collect(),
        }
    }
}

/// Single-page PDF showing `text` in Helvetica, optionally with an image
/// XObject drawn on the same page.
pub fn build_pdf(text: &str, image: Option<PdfImage>) -> Vec<u8> {
    pdf_document(text, image, false)
}

/// Like [`build_pdf`], but the resources sit on the parent `Pages` node and
/// the page inherits them.
pub fn build_pdf_with_inherited_resources(text: &str, image: Option<PdfImage>) -> Vec<u8> {
    pdf_document(text, image, true)
}

fn pdf_document(text: &str, image: Option<PdfImage>, inherited: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 24.into()]),
        Operation::new("Td", vec![100.into(), 700.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ];

    let mut xobjects = Dictionary::new();
    if let Some(image) = image {
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => image.color_space,
                "BitsPerComponent" => image.bits,
            },
            image.samples,
        ));
        xobjects.set("Im1", image_id);
        operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![200.into(), 0.into(), 0.into(), 200.into(), 100.into(), 400.into()],
            ),
            Operation::new("Do", vec!["Im1".into()]),
            Operation::new("Q", vec![]),
        ]);
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => xobjects,
    });
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    };
    let mut pages = dictionary! {
        "Type" => "Pages",
        "Count" => 1,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    if inherited {
        pages.set("Resources", resources_id);
    } else {
        page.set("Resources", resources_id);
    }
    let page_id = doc.add_object(page);
    pages.set("Kids", vec![page_id.into()]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Word document with one paragraph per entry, as packed by docx-rs.
pub fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
    let mut docx = docx_rs::Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(
            docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*text)),
        );
    }
    let mut packed = Cursor::new(Vec::new());
    docx.build().pack(&mut packed).unwrap();
    packed.into_inner()
}

fn slide_xml(shapes: &[&str]) -> String {
    let mut body = String::new();
    for (i, text) in shapes.iter().enumerate() {
        body.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Text {}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            i + 2,
            i + 1,
            text
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>{}</p:spTree></p:cSld></p:sld>"#,
        body
    )
}

/// Presentation whose slides are listed in order but stored in reverse
/// inside the archive.
pub fn build_pptx(slides: &[&[&str]]) -> Vec<u8> {
    let mut slide_ids = String::new();
    let mut rels = String::new();
    for i in 1..=slides.len() {
        slide_ids.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + i, i + 1));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            i + 1,
            i
        ));
    }

    let presentation = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
        slide_ids
    );
    let presentation_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        rels
    );
    let content_types = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/></Types>"#;

    let mut parts = vec![
        ("ppt/presentation.xml".to_string(), presentation.into_bytes()),
        ("[Content_Types].xml".to_string(), content_types.as_bytes().to_vec()),
        ("ppt/_rels/presentation.xml.rels".to_string(), presentation_rels.into_bytes()),
    ];
    for (i, shapes) in slides.iter().enumerate().rev() {
        parts.push((format!("ppt/slides/slide{}.xml", i + 1), slide_xml(shapes).into_bytes()));
    }
    write_zip(&parts)
}

fn write_zip(parts: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in parts {
        writer.start_file(name.as_str(), options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Hand-rolled multipart body with a single file field
pub fn multipart_body(boundary: &str, field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            boundary, field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}
