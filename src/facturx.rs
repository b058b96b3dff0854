//! The attach pipeline: load, embed, annotate, save

use std::path::{Path, PathBuf};
use lopdf::ObjectId;
use crate::date::{resolve_date, DateExpression};
use crate::error::{Error, Result};
use crate::pdf::attach::DEFAULT_DESCRIPTION;
use crate::pdf::{
    attach_xml, build_xmp, ensure_output_intent, inspect_facturx, load_document, save_document,
    set_page_mode_use_attachments, set_xmp_metadata, sync_info_mod_date, AfRelationship,
    AssociatedFiles, AttachmentSpec, ConformanceLevel, DocumentInfo, FacturxReport,
    FACTURX_FILENAME,
};

/// Options for turning a PDF into a Factur-X document
#[derive(Debug, Clone)]
pub struct AttachOptions {
    /// Existing PDF to read
    pub input_path: PathBuf,
    /// XML invoice to embed
    pub xml_path: PathBuf,
    /// Where the result is written
    pub output_path: PathBuf,
    /// ICC profile used when the PDF has no output intent
    pub icc_path: PathBuf,
    /// Attachment name (defaults to `facturx.xml`)
    pub name: String,
    /// File specification description
    pub description: String,
    /// `/AFRelationship` of the attachment
    pub relationship: AfRelationship,
    /// Treatment of an existing `/AF` array
    pub associated_files: AssociatedFiles,
    /// Source of the embedded file's `/ModDate`
    pub mod_date: DateExpression,
    /// Write Factur-X XMP metadata with this conformance level. The new packet
    /// replaces any existing `/Metadata`; Info dictionary fields are carried over.
    pub xmp: Option<ConformanceLevel>,
}

impl AttachOptions {
    /// Options with the default attachment name, description and relationship
    pub fn new(
        input_path: impl Into<PathBuf>,
        xml_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        icc_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            xml_path: xml_path.into(),
            output_path: output_path.into(),
            icc_path: icc_path.into(),
            name: FACTURX_FILENAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            relationship: AfRelationship::Data,
            associated_files: AssociatedFiles::Replace,
            mod_date: DateExpression::FileModified,
            xmp: None,
        }
    }
}

/// What [`attach_facturx`] did
#[derive(Debug, Clone)]
pub struct AttachSummary {
    /// Object ID of the new file specification in the output
    pub filespec_id: ObjectId,
    /// Size of the embedded XML
    pub xml_len: usize,
    /// Whether an output intent had to be added
    pub output_intent_added: bool,
    /// Whether XMP metadata was written
    pub xmp_written: bool,
    /// Size of the written PDF
    pub output_len: usize,
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(std::fs::read(path)?)
}

/// Attach the XML invoice to the input PDF and write the Factur-X result
///
/// Every input is read before anything is written, so on error no output
/// file is created.
///
/// # Example
///
/// ```no_run
/// use facturx_attach::{attach_facturx, AttachOptions};
/// use facturx_attach::pdf::ConformanceLevel;
///
/// let mut options = AttachOptions::new("in.pdf", "invoice.xml", "out.pdf", "sRGB.icc");
/// options.xmp = Some(ConformanceLevel::En16931);
///
/// let summary = attach_facturx(&options).expect("Failed to attach");
/// println!("embedded {} bytes", summary.xml_len);
/// ```
pub fn attach_facturx(options: &AttachOptions) -> Result<AttachSummary> {
    let mut doc = load_document(&options.input_path)?;

    let xml = read_input(&options.xml_path)?;
    let modified = resolve_date(&options.mod_date, &options.xml_path)?;

    let spec = AttachmentSpec {
        name: options.name.clone(),
        description: options.description.clone(),
        relationship: options.relationship,
        modified,
        associated_files: options.associated_files,
    };
    let filespec_id = attach_xml(&mut doc, &xml, &spec)?;

    let output_intent_added = ensure_output_intent(&mut doc, &options.icc_path)?;

    set_page_mode_use_attachments(&mut doc)?;

    if let Some(level) = options.xmp {
        let info = DocumentInfo::from_document(&doc);
        let xmp = build_xmp(&options.name, level, modified.as_ref(), &info);
        set_xmp_metadata(&mut doc, xmp)?;
        if let Some(modified) = &modified {
            sync_info_mod_date(&mut doc, modified)?;
        }
    }

    let output_len = save_document(&mut doc, &options.output_path)?;

    Ok(AttachSummary {
        filespec_id,
        xml_len: xml.len(),
        output_intent_added,
        xmp_written: options.xmp.is_some(),
        output_len,
    })
}

/// Re-read a written document and check the Factur-X invariants for `name`
///
/// A document that fails the check is deleted so a failed run leaves no
/// output behind.
pub fn verify_output(path: &Path, name: &str) -> Result<FacturxReport> {
    let checked = inspect_facturx(path).and_then(|report| {
        report.verify(name)?;
        Ok(report)
    });

    if checked.is_err() && path.exists() {
        log::warn!("Removing {} after failed check", path.display());
        std::fs::remove_file(path)?;
    }
    checked
}
