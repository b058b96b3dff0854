//! Reading back the Factur-X relevant parts of a PDF

use std::path::Path;
use lopdf::{decode_text_string, Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};
use super::attach::XML_MIME_TYPE;
use super::catalog::{catalog, filespec_name, resolve, PAGE_MODE_USE_ATTACHMENTS};
use super::output_intent::output_intent_count;

/// Name trees deeper than this are treated as malformed
const MAX_NAME_TREE_DEPTH: usize = 32;

/// One entry of the `/EmbeddedFiles` name tree
#[derive(Debug, Clone, Default)]
pub struct EmbeddedEntry {
    /// Key in the name tree
    pub name: String,
    /// `/UF` (or `/F`) of the file specification
    pub file_name: Option<String>,
    /// Object ID of the file specification, when stored indirectly
    pub filespec_id: Option<ObjectId>,
    /// `/Subtype` of the embedded stream
    pub mime_type: Option<String>,
    /// `/Params /Size` of the embedded stream
    pub declared_size: Option<i64>,
    /// Length of the decoded stream content
    pub data_len: usize,
    /// `/AFRelationship` of the file specification
    pub relationship: Option<String>,
    /// `/Desc` of the file specification
    pub description: Option<String>,
    /// `/Params /ModDate` of the embedded stream
    pub mod_date: Option<String>,
}

/// Catalog state relevant to a Factur-X document
#[derive(Debug, Clone, Default)]
pub struct FacturxReport {
    /// Page count from the root `/Pages` node
    pub page_count: usize,
    /// Entries of the `/EmbeddedFiles` name tree, in tree order
    pub embedded_files: Vec<EmbeddedEntry>,
    /// File specification IDs referenced from `/AF`
    pub associated_files: Vec<ObjectId>,
    /// Number of `/OutputIntents`
    pub output_intents: usize,
    /// `/PageMode` name
    pub page_mode: Option<String>,
    /// Whether the catalog carries a `/Metadata` stream
    pub has_metadata: bool,
}

impl FacturxReport {
    /// Find the embedded file registered under `name`
    pub fn embedded(&self, name: &str) -> Option<&EmbeddedEntry> {
        self.embedded_files.iter().find(|entry| entry.name == name)
    }

    /// True when the embedded file `name` is also referenced from `/AF`
    pub fn is_associated(&self, name: &str) -> bool {
        self.embedded(name)
            .and_then(|entry| entry.filespec_id)
            .map(|id| self.associated_files.contains(&id))
            .unwrap_or(false)
    }

    /// Check the invariants of a Factur-X hybrid document for attachment `name`
    pub fn verify(&self, name: &str) -> Result<()> {
        let mut problems = Vec::new();

        if self.embedded_files.len() != 1 {
            problems.push(format!(
                "expected exactly one embedded file, found {}",
                self.embedded_files.len()
            ));
        }

        match self.embedded(name) {
            None => problems.push(format!("no embedded file named {}", name)),
            Some(entry) => {
                if entry.declared_size != Some(entry.data_len as i64) {
                    problems.push(format!(
                        "declared size {:?} does not match {} stored bytes",
                        entry.declared_size, entry.data_len
                    ));
                }
                if entry.mime_type.as_deref() != Some(XML_MIME_TYPE) {
                    problems.push(format!("subtype is {:?}, not {}", entry.mime_type, XML_MIME_TYPE));
                }
                if entry.relationship.is_none() {
                    problems.push("file specification has no /AFRelationship".to_string());
                }
                if !self.is_associated(name) {
                    problems.push(format!("{} is not referenced from /AF", name));
                }
            }
        }

        if self.output_intents == 0 {
            problems.push("no output intent".to_string());
        }

        if self.page_mode.as_deref() != Some(PAGE_MODE_USE_ATTACHMENTS) {
            problems.push(format!("page mode is {:?}, not {}", self.page_mode, PAGE_MODE_USE_ATTACHMENTS));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::General(format!("Factur-X check failed: {}", problems.join("; "))))
        }
    }
}

/// Count pages by reading the Count field from the Pages dictionary
fn count_pages_from_catalog(doc: &Document, catalog: &Dictionary) -> usize {
    catalog.get(b"Pages")
        .and_then(|pages| doc.dereference(pages))
        .and_then(|(_, pages)| pages.as_dict())
        .and_then(|pages| pages.get(b"Count"))
        .and_then(|count| count.as_i64())
        .map(|count| count.max(0) as usize)
        .unwrap_or(0)
}

/// Collect `(key, value)` pairs of a name tree, following `/Kids`
fn walk_name_tree<'a>(
    doc: &'a Document,
    node: &'a Object,
    depth: usize,
    out: &mut Vec<(String, &'a Object)>,
) -> Result<()> {
    if depth > MAX_NAME_TREE_DEPTH {
        return Err(Error::General("Name tree is nested too deeply".to_string()));
    }

    let node = match resolve(doc, node)?.1 {
        Object::Dictionary(dict) => dict,
        _ => return Err(Error::General("Name tree node is not a dictionary".to_string())),
    };

    if let Ok(names) = node.get(b"Names").and_then(|names| doc.dereference(names)) {
        if let Object::Array(pairs) = names.1 {
            for pair in pairs.chunks(2) {
                if let [key, value] = pair {
                    let key = decode_text_string(key).unwrap_or_default();
                    out.push((key, value));
                }
            }
        }
    }

    if let Ok(kids) = node.get(b"Kids").and_then(|kids| doc.dereference(kids)) {
        if let Object::Array(kids) = kids.1 {
            for kid in kids {
                walk_name_tree(doc, kid, depth + 1, out)?;
            }
        }
    }

    Ok(())
}

/// Describe one file specification from the embedded files tree
fn read_entry(doc: &Document, name: String, value: &Object) -> Result<EmbeddedEntry> {
    let (filespec_id, spec) = resolve(doc, value)?;
    let spec = spec.as_dict()
        .map_err(|_| Error::General(format!("File specification for {} is not a dictionary", name)))?;

    let mut entry = EmbeddedEntry {
        name,
        file_name: filespec_name(spec),
        filespec_id,
        relationship: spec.get(b"AFRelationship")
            .and_then(|rel| rel.as_name())
            .ok()
            .map(|rel| String::from_utf8_lossy(rel).into_owned()),
        description: spec.get(b"Desc")
            .and_then(decode_text_string)
            .ok(),
        ..EmbeddedEntry::default()
    };

    let stream_ref = spec.get(b"EF")
        .and_then(|ef| doc.dereference(ef))
        .and_then(|(_, ef)| ef.as_dict())
        .and_then(|ef| ef.get(b"UF").or_else(|_| ef.get(b"F")));

    if let Ok(stream_ref) = stream_ref {
        if let Ok(Object::Stream(stream)) = resolve(doc, stream_ref).map(|(_, obj)| obj) {
            entry.mime_type = stream.dict.get(b"Subtype")
                .and_then(|subtype| subtype.as_name())
                .ok()
                .map(|subtype| String::from_utf8_lossy(subtype).into_owned());

            let params = stream.dict.get(b"Params")
                .and_then(|params| doc.dereference(params))
                .and_then(|(_, params)| params.as_dict());
            if let Ok(params) = params {
                entry.declared_size = params.get(b"Size").and_then(|size| size.as_i64()).ok();
                entry.mod_date = params.get(b"ModDate")
                    .and_then(decode_text_string)
                    .ok();
            }

            entry.data_len = match stream.get_plain_content() {
                Ok(data) => data.len(),
                Err(_) => stream.content.len(),
            };
        }
    }

    Ok(entry)
}

/// Inspect an in-memory document
pub fn inspect_document(doc: &Document) -> Result<FacturxReport> {
    let catalog = catalog(doc)?;

    let mut embedded_files = Vec::new();
    let embedded_tree = catalog.get(b"Names")
        .and_then(|names| doc.dereference(names))
        .and_then(|(_, names)| names.as_dict())
        .and_then(|names| names.get(b"EmbeddedFiles"));
    if let Ok(tree) = embedded_tree {
        let mut pairs = Vec::new();
        walk_name_tree(doc, tree, 0, &mut pairs)?;
        for (name, value) in pairs {
            embedded_files.push(read_entry(doc, name, value)?);
        }
    }

    let associated_files = match catalog.get(b"AF") {
        Ok(af) => match resolve(doc, af)?.1 {
            Object::Array(entries) => entries
                .iter()
                .filter_map(|entry| entry.as_reference().ok())
                .collect(),
            _ => Vec::new(),
        },
        Err(_) => Vec::new(),
    };

    Ok(FacturxReport {
        page_count: count_pages_from_catalog(doc, catalog),
        embedded_files,
        associated_files,
        output_intents: output_intent_count(doc)?,
        page_mode: catalog.get(b"PageMode")
            .and_then(|mode| mode.as_name())
            .ok()
            .map(|mode| String::from_utf8_lossy(mode).into_owned()),
        has_metadata: catalog.has(b"Metadata"),
    })
}

/// Load a PDF file and inspect it
pub fn inspect_facturx(path: &Path) -> Result<FacturxReport> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path).map_err(|source| Error::InvalidPdf {
        path: path.to_path_buf(),
        source,
    })?;
    inspect_document(&doc)
}
