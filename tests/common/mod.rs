//! Fixtures for the integration tests: PDFs, XML and ICC files generated
//! into a temporary directory

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};

pub const INVOICE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rsm:CrossIndustryInvoice xmlns:rsm="urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100">
  <rsm:ExchangedDocument>
    <ram:ID xmlns:ram="urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100">FA-2024-001</ram:ID>
  </rsm:ExchangedDocument>
</rsm:CrossIndustryInvoice>
"#;

/// Build a document with `pages` pages of text; returns it with its catalog ID
pub fn build_document(pages: usize) -> (Document, ObjectId) {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for number in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {}", number))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("Failed to encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    (doc, catalog_id)
}

/// Save a plain document with `pages` pages
pub fn write_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let (mut doc, _) = build_document(pages);
    save(&mut doc, dir, name)
}

pub fn save(doc: &mut Document, dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    doc.save(&path).expect("Failed to save fixture PDF");
    path
}

pub fn write_xml(dir: &Path) -> PathBuf {
    let path = dir.join("invoice.xml");
    std::fs::write(&path, INVOICE_XML).expect("Failed to write fixture XML");
    path
}

/// A profile with a valid RGB header followed by filler tag data
pub fn icc_profile() -> Vec<u8> {
    let mut profile = vec![0u8; 512];
    profile[0..4].copy_from_slice(&512u32.to_be_bytes());
    profile[12..16].copy_from_slice(b"mntr");
    profile[16..20].copy_from_slice(b"RGB ");
    profile[20..24].copy_from_slice(b"XYZ ");
    profile[36..40].copy_from_slice(b"acsp");
    for (i, byte) in profile[128..].iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }
    profile
}

pub fn write_icc(dir: &Path) -> PathBuf {
    let path = dir.join("sRGB.icc");
    std::fs::write(&path, icc_profile()).expect("Failed to write fixture ICC profile");
    path
}

/// Resolve the catalog of a saved document
pub fn load_catalog(path: &Path) -> (Document, lopdf::Dictionary) {
    let doc = Document::load(path).expect("Failed to load output PDF");
    let catalog = doc.catalog().expect("Output has no catalog").clone();
    (doc, catalog)
}
