//! Embedding the XML invoice as a PDF/A-3 associated file
//!
//! The XML is reachable two ways after [`attach_xml`]: through the catalog's
//! `/Names /EmbeddedFiles` name tree, which viewers list in their attachments
//! panel, and through the catalog's `/AF` array, which PDF/A-3 checkers read.

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, FixedOffset};
use lopdf::{dictionary, text_string, Document, Object, ObjectId, Stream};
use crate::date::format_pdf_date;
use crate::error::Result;
use super::catalog::{catalog, catalog_mut, filespec_name, resolve};

/// Logical name of the embedded invoice
pub const FACTURX_FILENAME: &str = "facturx.xml";

/// Default `/Desc` of the file specification
pub const DEFAULT_DESCRIPTION: &str = "Factur-X XML";

/// Media subtype declared on the embedded file stream
pub const XML_MIME_TYPE: &str = "application/xml";

/// PDF/A-3 relationship between an associated file and the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AfRelationship {
    /// Structured data the document is rendered from (the Factur-X value)
    #[default]
    Data,
    Source,
    Alternative,
    Supplement,
    Unspecified,
}

impl AfRelationship {
    /// The PDF name written to `/AFRelationship`
    pub fn as_str(&self) -> &'static str {
        match self {
            AfRelationship::Data => "Data",
            AfRelationship::Source => "Source",
            AfRelationship::Alternative => "Alternative",
            AfRelationship::Supplement => "Supplement",
            AfRelationship::Unspecified => "Unspecified",
        }
    }
}

impl fmt::Display for AfRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AfRelationship {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "data" => Ok(AfRelationship::Data),
            "source" => Ok(AfRelationship::Source),
            "alternative" => Ok(AfRelationship::Alternative),
            "supplement" => Ok(AfRelationship::Supplement),
            "unspecified" => Ok(AfRelationship::Unspecified),
            other => Err(format!(
                "unknown AFRelationship '{}' (expected data, source, alternative, supplement or unspecified)",
                other
            )),
        }
    }
}

/// How the catalog's `/AF` array is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssociatedFiles {
    /// Fresh array holding only the new file specification
    #[default]
    Replace,
    /// Keep existing entries, minus any with the same file name
    Append,
}

/// Everything needed to build the file specification
#[derive(Debug, Clone)]
pub struct AttachmentSpec {
    /// Logical file name (`/F`, `/UF` and the name tree key)
    pub name: String,
    /// Human readable `/Desc`
    pub description: String,
    /// `/AFRelationship` value
    pub relationship: AfRelationship,
    /// `/Params /ModDate` of the embedded stream, omitted when `None`
    pub modified: Option<DateTime<FixedOffset>>,
    /// Treatment of a pre-existing `/AF` array
    pub associated_files: AssociatedFiles,
}

impl Default for AttachmentSpec {
    fn default() -> Self {
        Self {
            name: FACTURX_FILENAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            relationship: AfRelationship::Data,
            modified: None,
            associated_files: AssociatedFiles::Replace,
        }
    }
}

/// Embed `xml` into the document and register it in the catalog
///
/// Any existing `/EmbeddedFiles` tree is replaced by a tree holding only the
/// new file. Sibling name trees in `/Names` (such as `/Dests`) are kept.
/// Returns the object ID of the new file specification.
pub fn attach_xml(doc: &mut Document, xml: &[u8], spec: &AttachmentSpec) -> Result<ObjectId> {
    // 1. Embedded file stream
    let mut params = dictionary! {
        "Size" => Object::Integer(xml.len() as i64),
    };
    if let Some(modified) = &spec.modified {
        params.set("ModDate", Object::string_literal(format_pdf_date(modified)));
    }

    let mut ef_stream = Stream::new(
        dictionary! {
            "Type" => "EmbeddedFile",
            "Subtype" => Object::Name(XML_MIME_TYPE.as_bytes().to_vec()),
            "Params" => params,
        },
        xml.to_vec(),
    );
    ef_stream.compress()?;
    let ef_stream_id = doc.add_object(ef_stream);

    // 2. File specification
    let filespec = dictionary! {
        "Type" => "Filespec",
        "F" => text_string(&spec.name),
        "UF" => text_string(&spec.name),
        "Desc" => text_string(&spec.description),
        "AFRelationship" => Object::Name(spec.relationship.as_str().as_bytes().to_vec()),
        "EF" => dictionary! {
            "F" => Object::Reference(ef_stream_id),
            "UF" => Object::Reference(ef_stream_id),
        },
    };
    let filespec_id = doc.add_object(filespec);
    log::debug!(
        "Embedded {} bytes as stream {} {} R, file specification {} {} R",
        xml.len(),
        ef_stream_id.0,
        ef_stream_id.1,
        filespec_id.0,
        filespec_id.1
    );

    // 3. Fresh embedded files name tree with a single leaf entry
    let ef_tree_id = doc.add_object(dictionary! {
        "Names" => Object::Array(vec![
            text_string(&spec.name),
            Object::Reference(filespec_id),
        ]),
    });
    register_embedded_files(doc, ef_tree_id)?;

    // 4. Associated files
    let af = match spec.associated_files {
        AssociatedFiles::Replace => vec![Object::Reference(filespec_id)],
        AssociatedFiles::Append => {
            let mut kept = existing_associated_files(doc, &spec.name)?;
            kept.push(Object::Reference(filespec_id));
            kept
        }
    };
    let af_len = af.len();
    catalog_mut(doc)?.set("AF", Object::Array(af));

    log::info!(
        "Attached {} ({} bytes, /AFRelationship /{}, {} /AF entries)",
        spec.name,
        xml.len(),
        spec.relationship,
        af_len
    );

    Ok(filespec_id)
}

/// Point the catalog's `/Names /EmbeddedFiles` at `tree_id`, reusing the
/// `/Names` dictionary when one exists
fn register_embedded_files(doc: &mut Document, tree_id: ObjectId) -> Result<()> {
    let names = catalog(doc)?.get(b"Names").ok().cloned();

    match names {
        Some(Object::Reference(names_id)) => {
            if let Ok(names_dict) = doc.get_dictionary_mut(names_id) {
                names_dict.set("EmbeddedFiles", Object::Reference(tree_id));
                return Ok(());
            }
            log::warn!(
                "/Names {} {} R is not a dictionary, replacing it",
                names_id.0,
                names_id.1
            );
        }
        Some(Object::Dictionary(mut names_dict)) => {
            names_dict.set("EmbeddedFiles", Object::Reference(tree_id));
            catalog_mut(doc)?.set("Names", Object::Dictionary(names_dict));
            return Ok(());
        }
        _ => {}
    }

    let names_id = doc.add_object(dictionary! {
        "EmbeddedFiles" => Object::Reference(tree_id),
    });
    catalog_mut(doc)?.set("Names", Object::Reference(names_id));
    Ok(())
}

/// Collect the current `/AF` entries, dropping those whose file
/// specification is named `name`
fn existing_associated_files(doc: &Document, name: &str) -> Result<Vec<Object>> {
    let af = match catalog(doc)?.get(b"AF") {
        Ok(af) => af,
        Err(_) => return Ok(Vec::new()),
    };

    let entries = match resolve(doc, af)?.1 {
        Object::Array(entries) => entries,
        _ => {
            log::warn!("/AF is not an array, starting a new one");
            return Ok(Vec::new());
        }
    };

    let kept = entries
        .iter()
        .filter(|entry| {
            let spec = resolve(doc, entry).ok().and_then(|(_, obj)| obj.as_dict().ok());
            match spec.and_then(filespec_name) {
                Some(existing) if existing == name => {
                    log::debug!("Dropping previous /AF entry for {}", existing);
                    false
                }
                _ => true,
            }
        })
        .cloned()
        .collect();

    Ok(kept)
}
