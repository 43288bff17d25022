//! Integration tests for pdfmd.
//!
//! Fixture PDFs are generated in-process with lopdf, so most tests run
//! self-contained. Tests that exercise the pdfium text layer are gated
//! behind the `PDFMD_E2E` environment variable because they need a pdfium
//! shared library on the host.
//!
//! Run the gated tests with:
//!   PDFMD_E2E=1 PDFIUM_LIB_PATH=/path/to/libdir cargo test --test extract -- --nocapture

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfmd::pipeline::images::ImageExtractor;
use pdfmd::{extract, extract_to_file, inspect, ExtractConfig, ExtractError};
use std::path::Path;

// ── Fixture builders ─────────────────────────────────────────────────────────

/// A content stream that draws `text` near the top of a US Letter page.
fn text_content(text: &str) -> Vec<u8> {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    content.encode().expect("content must encode")
}

/// Build a PDF whose pages each draw the given text (empty string makes a
/// blank page) and save it to `path`.
fn write_text_pdf(path: &Path, page_texts: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let ops = if text.is_empty() {
            Vec::new()
        } else {
            text_content(text)
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, ops));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("fixture PDF must save");
}

/// Build a one-page PDF carrying a DCT-encoded embedded image and save it
/// to `path`. The JPEG payload is opaque bytes; DCT streams pass through
/// to disk unparsed.
fn write_image_pdf(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46],
    ));
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im1" => image_id },
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("fixture PDF must save");
}

/// Skip pdfium-dependent tests unless PDFMD_E2E is set.
macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("PDFMD_E2E").is_err() {
            println!("SKIP — set PDFMD_E2E=1 (and PDFIUM_LIB_PATH) to run pdfium e2e tests");
            return;
        }
    };
}

// ── Image session tests (lopdf only, always run) ─────────────────────────────

#[test]
fn embedded_image_is_saved_with_deterministic_name() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf_path = tmp.path().join("figures.pdf");
    let image_dir = tmp.path().join("images");
    std::fs::create_dir_all(&image_dir).unwrap();
    write_image_pdf(&pdf_path);

    let extractor = ImageExtractor::open(&pdf_path, &image_dir, "/static/images");
    let results = extractor.extract_page(0, "figures");

    assert_eq!(results.len(), 1);
    let image = results[0].as_ref().expect("image should extract");
    assert_eq!(image.url, "/static/images/figures_page1_img1.jpg");
    assert!(image.file_path.ends_with("figures_page1_img1.jpg"));

    let saved = std::fs::read(&image.file_path).expect("image file must exist");
    assert_eq!(&saved[..2], &[0xFF, 0xD8], "DCT payload is written verbatim");

    assert_eq!(
        image.markdown_link(),
        "\n\n![Page 1 Image 1](/static/images/figures_page1_img1.jpg)\n"
    );
}

#[test]
fn page_without_images_yields_no_links_or_notes() {
    let tmp = tempfile::tempdir().unwrap();
    let pdf_path = tmp.path().join("plain.pdf");
    write_text_pdf(&pdf_path, &["hello"]);

    let extractor = ImageExtractor::open(&pdf_path, tmp.path(), "images");
    assert!(extractor.extract_page(0, "plain").is_empty());
}

// ── Input validation tests (no pdfium needed) ────────────────────────────────

#[tokio::test]
async fn missing_file_fails_without_touching_image_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let image_dir = tmp.path().join("should_not_exist");
    let config = ExtractConfig::builder()
        .image_dir(&image_dir)
        .build()
        .unwrap();

    let err = extract("/definitely/not/a/real/file.pdf", &config)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::FileNotFound { .. }));
    assert!(
        !image_dir.exists(),
        "input validation must precede image-dir creation"
    );
}

#[tokio::test]
async fn non_pdf_file_is_rejected_by_magic_check() {
    let tmp = tempfile::tempdir().unwrap();
    let fake = tmp.path().join("notes.pdf");
    std::fs::write(&fake, b"just some text, not a PDF at all").unwrap();

    let config = ExtractConfig::default();
    let err = extract(fake.to_str().unwrap(), &config).await.unwrap_err();
    assert!(matches!(err, ExtractError::NotAPdf { .. }));
}

// ── Full-pipeline tests (pdfium required, gated) ─────────────────────────────

#[tokio::test]
async fn pages_appear_in_order_with_blank_marker() {
    e2e_skip_unless_enabled!();

    let tmp = tempfile::tempdir().unwrap();
    let pdf_path = tmp.path().join("two_page.pdf");
    write_text_pdf(
        &pdf_path,
        &[
            "This first page carries enough direct text to stay well above the threshold.",
            "",
        ],
    );

    let config = ExtractConfig::builder()
        .image_dir(tmp.path().join("images"))
        .build()
        .unwrap();

    let output = extract(pdf_path.to_str().unwrap(), &config)
        .await
        .expect("extraction should succeed");

    let md = &output.markdown;
    assert!(md.contains("--- Page 1 ---"));
    assert!(md.contains("--- Page 2 --- (Blank or no extractable content)"));
    let p1 = md.find("--- Page 1 ---").unwrap();
    let p2 = md.find("--- Page 2 ---").unwrap();
    assert!(p1 < p2, "page order must match the document");

    assert!(md.contains("enough direct text"));
    assert_eq!(output.stats.total_pages, 2);
    assert_eq!(output.stats.blank_pages, 1);
    // Page 1 has real text, page 2 has no text objects: OCR never fires.
    assert_eq!(output.stats.ocr_pages, 0);
    assert_eq!(output.stats.notes, 0);

    assert_eq!(output.pages.len(), 2);
    assert!(!output.pages[0].ocr_applied);
    assert!(output.pages[1].is_blank());
}

#[tokio::test]
async fn extract_to_file_writes_atomically() {
    e2e_skip_unless_enabled!();

    let tmp = tempfile::tempdir().unwrap();
    let pdf_path = tmp.path().join("doc.pdf");
    write_text_pdf(&pdf_path, &["A single page with plenty of direct text in it."]);

    let out_path = tmp.path().join("out/doc.md");
    let config = ExtractConfig::builder()
        .image_dir(tmp.path().join("images"))
        .build()
        .unwrap();

    let stats = extract_to_file(pdf_path.to_str().unwrap(), &out_path, &config)
        .await
        .expect("extract_to_file should succeed");

    assert_eq!(stats.total_pages, 1);
    let written = std::fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("--- Page 1 ---"));
    assert!(
        !out_path.with_extension("md.tmp").exists(),
        "temp file must be renamed away"
    );
}

#[tokio::test]
async fn inspect_reports_page_count_without_ocr_or_images() {
    e2e_skip_unless_enabled!();

    let tmp = tempfile::tempdir().unwrap();
    let pdf_path = tmp.path().join("three.pdf");
    write_text_pdf(&pdf_path, &["one", "two", "three"]);

    let meta = inspect(pdf_path.to_str().unwrap())
        .await
        .expect("inspect should succeed");
    assert_eq!(meta.page_count, 3);
    assert!(!meta.pdf_version.is_empty());
}

#[tokio::test]
async fn embedded_image_link_appears_in_markdown() {
    e2e_skip_unless_enabled!();

    let tmp = tempfile::tempdir().unwrap();
    let pdf_path = tmp.path().join("figures.pdf");
    write_image_pdf(&pdf_path);

    let config = ExtractConfig::builder()
        .image_dir(tmp.path().join("images"))
        .image_url_prefix("images")
        .build()
        .unwrap();

    let output = extract(pdf_path.to_str().unwrap(), &config)
        .await
        .expect("extraction should succeed");

    assert_eq!(output.stats.images_extracted, 1);
    assert!(output
        .markdown
        .contains("![Page 1 Image 1](images/figures_page1_img1.jpg)"));
    assert_eq!(
        output.image_urls(),
        vec!["images/figures_page1_img1.jpg".to_string()]
    );
}

#[tokio::test]
async fn json_output_round_trips() {
    e2e_skip_unless_enabled!();

    let tmp = tempfile::tempdir().unwrap();
    let pdf_path = tmp.path().join("doc.pdf");
    write_text_pdf(&pdf_path, &["Serialisable output with a decent amount of text."]);

    let config = ExtractConfig::builder()
        .image_dir(tmp.path().join("images"))
        .build()
        .unwrap();

    let output = extract(pdf_path.to_str().unwrap(), &config)
        .await
        .expect("extraction should succeed");

    let json = serde_json::to_string_pretty(&output).expect("must serialise");
    let back: pdfmd::ExtractOutput = serde_json::from_str(&json).expect("must deserialise");
    assert_eq!(back.stats.total_pages, output.stats.total_pages);
    assert_eq!(back.markdown, output.markdown);
}

// ── Progress callback wiring (pdfium required, gated) ────────────────────────

#[tokio::test]
async fn progress_callbacks_fire_in_page_order() {
    e2e_skip_unless_enabled!();

    use pdfmd::ExtractProgressCallback;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        pages: Mutex<Vec<usize>>,
        started: Mutex<Option<usize>>,
        completed: Mutex<Option<usize>>,
    }

    impl ExtractProgressCallback for Recorder {
        fn on_extract_start(&self, total_pages: usize) {
            *self.started.lock().unwrap() = Some(total_pages);
        }
        fn on_page_complete(
            &self,
            page_num: usize,
            _total: usize,
            _text_len: usize,
            _ocr: bool,
            _images: usize,
        ) {
            self.pages.lock().unwrap().push(page_num);
        }
        fn on_extract_complete(&self, total_pages: usize, _ocr: usize, _images: usize) {
            *self.completed.lock().unwrap() = Some(total_pages);
        }
    }

    let tmp = tempfile::tempdir().unwrap();
    let pdf_path = tmp.path().join("doc.pdf");
    write_text_pdf(
        &pdf_path,
        &[
            "Page one carries enough direct text to keep the OCR fallback out of play.",
            "Page two also carries enough direct text to keep the OCR fallback out of play.",
            "",
        ],
    );

    let recorder = Arc::new(Recorder::default());
    let config = ExtractConfig::builder()
        .image_dir(tmp.path().join("images"))
        .progress_callback(Arc::clone(&recorder) as Arc<dyn ExtractProgressCallback>)
        .build()
        .unwrap();

    extract(pdf_path.to_str().unwrap(), &config)
        .await
        .expect("extraction should succeed");

    assert_eq!(*recorder.started.lock().unwrap(), Some(3));
    assert_eq!(*recorder.completed.lock().unwrap(), Some(3));
    assert_eq!(*recorder.pages.lock().unwrap(), vec![1, 2, 3]);
}
