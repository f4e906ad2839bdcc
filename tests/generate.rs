//! End-to-end generation through the public engine API, with a stub image
//! fetcher standing in for the network.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;

use studio_docs::engine::images::ImageFetcher;
use studio_docs::models::{
    Category, DocumentItem, DocumentKind, DocumentRequest, ImageSection, ItemFields, Modality,
    RenderFlags, ScheduleInput, SectionKind, ServiceType,
};
use studio_docs::DocumentEngine;

struct MapFetcher(HashMap<String, Bytes>);

impl MapFetcher {
    fn new(entries: &[(&str, Bytes)]) -> Self {
        MapFetcher(entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }
}

#[async_trait]
impl ImageFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Option<Bytes> {
        self.0.get(url).cloned()
    }
}

fn png(width: u32, height: u32) -> Bytes {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([150, 120, 90]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .expect("encode png");
    Bytes::from(buf)
}

fn engine() -> DocumentEngine {
    DocumentEngine::new(Arc::new(MapFetcher::new(&[
        ("https://img.test/logo.png", png(6, 3)),
        ("https://img.test/sofa.png", png(4, 3)),
        ("https://img.test/mood.png", png(8, 5)),
    ])))
}

/// One request that is valid for every document kind: items with and without
/// images, a moodboard section, a schedule block and free-form notes.
fn full_request(kind: DocumentKind) -> DocumentRequest {
    DocumentRequest {
        kind,
        client_name: "Estudio del Valle".into(),
        project_name: Some("Casa Roble".into()),
        logo_url: Some("https://img.test/logo.png".into()),
        flags: RenderFlags::default(),
        items: vec![
            DocumentItem::Budget {
                fields: ItemFields {
                    position: 1,
                    name: "Linen sofa".into(),
                    category: Category::Furniture,
                    room: Some("Living Room".into()),
                    unit_price: Some(2400.0),
                    quantity: Some(1.0),
                    supplier: Some("Nordic Oak Co".into()),
                    link: None,
                    image_url: Some("https://img.test/sofa.png".into()),
                },
                notes: None,
            },
            DocumentItem::Budget {
                fields: ItemFields {
                    position: 2,
                    name: "Brass floor lamp".into(),
                    category: Category::Lighting,
                    room: Some("Living Room".into()),
                    unit_price: Some(380.0),
                    quantity: Some(2.0),
                    supplier: None,
                    link: None,
                    image_url: None,
                },
                notes: None,
            },
        ],
        sections: vec![ImageSection {
            kind: SectionKind::Moodboard,
            images: vec!["https://img.test/mood.png".into()],
        }],
        schedule: Some(ScheduleInput {
            service: ServiceType::FullProject,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            modality: Modality::InPerson,
            room_count: 3,
        }),
        notes: Some("Delivery access through the rear courtyard.".into()),
    }
}

const ALL_KINDS: [DocumentKind; 8] = [
    DocumentKind::BudgetDeck,
    DocumentKind::ScheduleDeck,
    DocumentKind::ShoppingList,
    DocumentKind::BudgetWorkbook,
    DocumentKind::Proposal,
    DocumentKind::ScheduleDocument,
    DocumentKind::ProposalDocument,
    DocumentKind::TechnicalSheet,
];

#[tokio::test]
async fn every_kind_generates_its_container() {
    let engine = engine();
    for kind in ALL_KINDS {
        let result = engine.generate(full_request(kind)).await;
        assert!(result.success, "{kind:?}: {:?}", result.error);

        let data = result.data.expect("buffer");
        match kind.extension() {
            "pdf" => assert!(data.starts_with(b"%PDF"), "{kind:?} magic"),
            _ => assert!(data.starts_with(b"PK"), "{kind:?} magic"),
        }

        let filename = result.filename.expect("filename");
        assert!(filename.ends_with(kind.extension()), "{filename}");
        assert!(filename.contains("estudio-del-valle"), "{filename}");
        assert_eq!(result.mime_type.as_deref(), Some(kind.mime_type()));
    }
}

#[tokio::test]
async fn json_payload_drives_generation_end_to_end() {
    // The exact wire casing a caller posts.
    let payload = r#"{
        "kind": "shopping_list",
        "clientName": "Casa Flores",
        "projectName": "Loft Makeover",
        "flags": { "includeFormulas": false },
        "items": [
            { "type": "shopping", "position": 1, "name": "Lounge chair",
              "category": "furniture", "room": "Studio", "unitPrice": 420.0,
              "quantity": 2.0, "supplier": "Nordic Oak Co",
              "link": "https://shop.test/chair" }
        ]
    }"#;

    let request: DocumentRequest = serde_json::from_str(payload).expect("parse payload");
    assert!(!request.flags.include_formulas);

    let result = engine().generate(request).await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.filename.as_deref(), Some("shopping-list-casa-flores.xlsx"));
    assert_eq!(
        result.mime_type.as_deref(),
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    );
}

#[tokio::test]
async fn workbook_reruns_are_byte_identical_without_formulas() {
    let engine = engine();
    let mut request = full_request(DocumentKind::BudgetWorkbook);
    request.flags.include_formulas = false;

    let first = engine.generate(request.clone()).await;
    let second = engine.generate(request).await;
    assert!(first.success && second.success);
    assert_eq!(first.data.unwrap(), second.data.unwrap());
}

#[tokio::test]
async fn deck_embeds_every_resolved_image_once() {
    let engine = engine();
    let result = engine.generate(full_request(DocumentKind::BudgetDeck)).await;
    assert!(result.success, "{:?}", result.error);

    let archive =
        zip::ZipArchive::new(Cursor::new(result.data.expect("deck bytes"))).expect("pptx zip");
    let media = archive.file_names().filter(|n| n.starts_with("ppt/media/")).count();
    // Logo, moodboard image and one item photo.
    assert_eq!(media, 3);
}
