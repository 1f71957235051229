// Shared fixtures: real PDFs built with lopdf, extractors with no OCR tooling
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;

use wellstim::pdf_extraction::{LopdfLoader, SystemPdfRenderer, TesseractOcr};
use wellstim::{ExtractionOptions, ParallelExtractor};

/// Write a PDF with one page per entry; each line becomes its own text block.
/// An empty entry gives a page with no text layer.
pub fn write_pdf(path: &Path, pages: &[Vec<String>]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), Object::Integer(12)]));
            operations.push(Operation::new(
                "Td",
                vec![Object::Integer(72), Object::Integer(720 - 16 * i as i64)],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
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
    doc.save(path).unwrap();
}

pub fn lines(text: &[&str]) -> Vec<String> {
    text.iter().map(|l| l.to_string()).collect()
}

/// Loader whose renderer and OCR binaries don't exist, so scanned pages degrade.
pub fn text_layer_only(workers: usize, max_batch_size: usize) -> ParallelExtractor<LopdfLoader, TesseractOcr> {
    let renderer = SystemPdfRenderer::new("/nonexistent/pdftoppm", 150);
    let ocr = TesseractOcr::new("/nonexistent/tesseract", "eng");
    ParallelExtractor::new(
        LopdfLoader::new(renderer),
        ocr,
        ExtractionOptions {
            workers,
            max_batch_size,
        },
    )
}
