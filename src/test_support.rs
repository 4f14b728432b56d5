//! Shared helpers for unit tests

use crate::db::MemoryPaperStore;
use crate::llm::MockLlm;
use crate::metadata::ExtractionPolicy;
use crate::services::AppState;
use crate::storage::MemoryBlobStore;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::sync::Arc;

/// Build a minimal PDF with one text line per page.
pub fn test_pdf(pages: &[&str]) -> Vec<u8> {
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
    for page in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*page)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
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
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// App state wired to in-memory backends, with handles kept for assertions.
pub struct MemoryFixture {
    pub state: AppState,
    pub llm: Arc<MockLlm>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl MemoryFixture {
    pub fn new() -> Self {
        let llm = Arc::new(MockLlm::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let state = AppState::new(
            Arc::new(MemoryPaperStore::new()),
            blobs.clone(),
            llm.clone(),
            ExtractionPolicy::default(),
        );
        Self { state, llm, blobs }
    }
}
