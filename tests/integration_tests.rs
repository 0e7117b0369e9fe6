//! Integration tests for the exam generator

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    build_docx, build_pdf, build_pdf_with_inherited_resources, build_pptx, multipart_body, pipeline,
    CountingOcr, PdfImage,
};
use exam_generator::error::{ExamGeneratorError, UNSUPPORTED_FORMAT_MESSAGE};
use exam_generator::input::{DocumentType, FileTypeDetector, InputManager, UploadedDocument};
use exam_generator::processing::QuestionKind;
use exam_generator::server::build_router;
use exam_generator::server::state::AppState;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "exam-generator-test-boundary";

#[test]
fn test_fixtures_are_detected() {
    let detector = FileTypeDetector::new();
    assert_eq!(detector.detect(&build_pdf("Hello.", None)), DocumentType::Pdf);
    assert_eq!(detector.detect(&build_docx(&["Hello."])), DocumentType::Word);
    assert_eq!(detector.detect(&build_pptx(&[&["Hello."]])), DocumentType::PowerPoint);
    assert_eq!(detector.detect(b"Hello, plain text."), DocumentType::Unsupported);
}

#[test]
fn test_word_document_single_sentence() {
    let ocr = CountingOcr::new("unused");
    let pipeline = pipeline(ocr.clone(), None);
    let upload = UploadedDocument::new("sky.docx", build_docx(&["The sky is blue."]));
    let mut rng = StdRng::seed_from_u64(17);

    let questions = pipeline.generate_exam(&upload, &mut rng).unwrap();

    assert_eq!(questions.len(), 1);
    assert!(questions[0].prompt().contains("'The sky is blue.'"));
    assert_eq!(ocr.calls(), 0);
}

#[test]
fn test_word_document_rendering_per_kind() {
    let upload = UploadedDocument::new("sky.docx", build_docx(&["The sky is blue."]));

    let rendered = |kind| {
        let pipeline = pipeline(CountingOcr::new(""), Some(kind));
        let mut rng = StdRng::seed_from_u64(3);
        pipeline.generate_exam_strings(&upload, &mut rng).unwrap()
    };

    let mc = rendered(QuestionKind::MultipleChoice);
    let lines: Vec<&str> = mc[0].lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "What does the following mean: 'The sky is blue.'?");
    for (line, label) in lines[1..].iter().zip(["A) ", "B) ", "C) ", "D) "]) {
        assert!(line.starts_with(label));
    }
    assert_eq!(
        lines[1..].iter().filter(|l| l.ends_with(") The sky is blue.")).count(),
        1
    );

    let sa = rendered(QuestionKind::ShortAnswer);
    assert_eq!(sa, vec!["Explain: 'The sky is blue.'\n(Provide your answer here.)"]);

    let tf = rendered(QuestionKind::TrueFalse);
    let lines: Vec<&str> = tf[0].lines().collect();
    assert_eq!(lines[0], "Is the following correct? 'The sky is blue.'");
    assert_eq!(lines[1], "- True / False");
    assert!(lines[2] == "Correct Answer: True" || lines[2] == "Correct Answer: False");
}

#[test]
fn test_pdf_without_images_never_calls_ocr() {
    let ocr = CountingOcr::new("should not appear");
    let manager = InputManager::new(ocr.clone());
    let pdf = build_pdf("Water boils at 100C.", None);
    let upload = UploadedDocument::new("boiling.pdf", pdf.clone());

    let text = manager.extract_text(&upload).unwrap();

    // Exactly the native text layer, nothing appended
    let native = lopdf::Document::load_mem(&pdf).unwrap().extract_text(&[1]).unwrap();
    assert_eq!(text, native);
    assert!(text.contains("Water boils at 100C."));
    assert_eq!(ocr.calls(), 0);
}

#[test]
fn test_pdf_image_text_follows_page_text() {
    let ocr = CountingOcr::new("Scanned caption text.");
    let pipeline = pipeline(ocr.clone(), Some(QuestionKind::ShortAnswer));
    let pdf = build_pdf("Water boils at 100C.", Some(PdfImage::gray(4, 3)));
    let upload = UploadedDocument::new("scan.pdf", pdf);
    let mut rng = StdRng::seed_from_u64(1);

    let strings = pipeline.generate_exam_strings(&upload, &mut rng).unwrap();

    assert_eq!(ocr.calls(), 1);
    assert_eq!(
        strings,
        vec![
            "Explain: 'Water boils at 100C.'\n(Provide your answer here.)",
            "Explain: 'Scanned caption text.'\n(Provide your answer here.)",
        ]
    );
}

/// OCR call count and extracted text for a PDF upload
fn ocr_calls_for(pdf: Vec<u8>) -> (usize, String) {
    let ocr = CountingOcr::new("Scanned caption text.");
    let manager = InputManager::new(ocr.clone());
    let text = manager
        .extract_text(&UploadedDocument::new("scan.pdf", pdf))
        .unwrap();
    (ocr.calls(), text)
}

#[test]
fn test_pdf_palette_image_is_recognized() {
    let pdf = build_pdf("Cells divide.", Some(PdfImage::indexed_rgb(5, 4)));
    let (calls, text) = ocr_calls_for(pdf);
    assert_eq!(calls, 1);
    assert!(text.ends_with("Scanned caption text."));
}

#[test]
fn test_pdf_bilevel_image_is_recognized() {
    let pdf = build_pdf("Cells divide.", Some(PdfImage::bilevel(10, 3)));
    let (calls, text) = ocr_calls_for(pdf);
    assert_eq!(calls, 1);
    assert!(text.ends_with("Scanned caption text."));
}

#[test]
fn test_pdf_inherited_resources_are_searched() {
    let (calls, text) = ocr_calls_for(build_pdf_with_inherited_resources(
        "Cells divide.",
        Some(PdfImage::gray(4, 3)),
    ));
    assert_eq!(calls, 1);
    assert!(text.contains("Cells divide."));
    assert!(text.ends_with("Scanned caption text."));
}

#[test]
fn test_powerpoint_follows_presentation_order() {
    let ocr = CountingOcr::new("");
    let pipeline = pipeline(ocr, Some(QuestionKind::ShortAnswer));
    let upload = UploadedDocument::new(
        "deck.pptx",
        build_pptx(&[&["Photosynthesis", "Plants make sugar."], &["Roots absorb water."]]),
    );
    let mut rng = StdRng::seed_from_u64(1);

    let questions = pipeline.generate_exam(&upload, &mut rng).unwrap();
    let prompts: Vec<&str> = questions.iter().map(|q| q.prompt()).collect();

    assert_eq!(
        prompts,
        vec![
            "Explain: 'Photosynthesis'",
            "Explain: 'Plants make sugar.'",
            "Explain: 'Roots absorb water.'",
        ]
    );
}

#[test]
fn test_unsupported_upload_skips_extraction() {
    let ocr = CountingOcr::new("unused");
    let pipeline = pipeline(ocr.clone(), None);
    let upload = UploadedDocument::new("notes.pdf", b"These are plain text notes.".to_vec());
    let mut rng = StdRng::seed_from_u64(1);

    let err = pipeline.generate_exam(&upload, &mut rng).unwrap_err();

    assert!(matches!(err, ExamGeneratorError::UnsupportedFormat(_)));
    assert_eq!(err.public_message(), UNSUPPORTED_FORMAT_MESSAGE);
    assert_eq!(ocr.calls(), 0);
}

#[test]
fn test_empty_document_gives_empty_exam() {
    let pipeline = pipeline(CountingOcr::new(""), None);
    let upload = UploadedDocument::new("blank.docx", build_docx(&[""]));
    let mut rng = StdRng::seed_from_u64(1);

    assert!(pipeline.generate_exam(&upload, &mut rng).unwrap().is_empty());
}

fn app() -> axum::Router {
    app_with_limit(1024 * 1024)
}

fn app_with_limit(max_upload_bytes: usize) -> axum::Router {
    let state = AppState::new(Arc::new(pipeline(CountingOcr::new(""), None)));
    build_router(state, max_upload_bytes)
}

fn upload_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generate_exam/")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(BOUNDARY, field, filename, content)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_http_generate_exam() {
    let docx = build_docx(&["The sky is blue.", "Grass is green."]);
    let response = app()
        .oneshot(upload_request("file", "notes.docx", &docx))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert!(questions[0].as_str().unwrap().contains("'The sky is blue.'"));
    assert!(questions[1].as_str().unwrap().contains("'Grass is green.'"));
}

#[tokio::test]
async fn test_http_unsupported_file_type() {
    let response = app()
        .oneshot(upload_request("file", "notes.txt", b"Just some text."))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = json_body(response).await;
    assert_eq!(body["error"], UNSUPPORTED_FORMAT_MESSAGE);
}

#[tokio::test]
async fn test_http_missing_file_field() {
    let response = app()
        .oneshot(upload_request("document", "notes.docx", b"irrelevant"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_http_non_multipart_body_is_json_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/generate_exam/")
        .header("content-type", "application/octet-stream")
        .body(Body::from(build_docx(&["The sky is blue."])))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("multipart"));
}

#[tokio::test]
async fn test_http_oversized_upload_is_json_payload_too_large() {
    let response = app_with_limit(1024)
        .oneshot(upload_request("file", "big.pdf", &vec![b'x'; 4096]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_http_corrupt_document_hides_cause() {
    // Valid ZIP header naming a Word part, but no archive behind it
    let mut corrupt = b"PK\x03\x04".to_vec();
    corrupt.extend_from_slice(&[0u8; 22]);
    corrupt.extend_from_slice(&17u16.to_le_bytes());
    corrupt.extend_from_slice(&0u16.to_le_bytes());
    corrupt.extend_from_slice(b"word/document.xml");

    let response = app()
        .oneshot(upload_request("file", "broken.docx", &corrupt))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "An unexpected error occurred.");
}

#[tokio::test]
async fn test_health_check() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}
