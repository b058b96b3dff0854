//! Document catalog access and the page mode hint

use lopdf::{decode_text_string, Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};

/// Page mode that opens the attachments panel in conforming viewers
pub const PAGE_MODE_USE_ATTACHMENTS: &str = "UseAttachments";

/// Find the catalog object ID through the trailer's Root entry
pub fn catalog_id(doc: &Document) -> Result<ObjectId> {
    let catalog_ref = doc.trailer.get(b"Root")
        .map_err(|_| Error::General("No Root in trailer".to_string()))?;

    let catalog_id = match catalog_ref {
        Object::Reference(id) => *id,
        _ => return Err(Error::General("Root is not a reference".to_string())),
    };

    match doc.get_object(catalog_id)? {
        Object::Dictionary(_) => Ok(catalog_id),
        _ => Err(Error::General("Catalog is not a dictionary".to_string())),
    }
}

/// Borrow the catalog dictionary
pub fn catalog(doc: &Document) -> Result<&Dictionary> {
    let id = catalog_id(doc)?;
    Ok(doc.get_dictionary(id)?)
}

/// Borrow the catalog dictionary mutably
pub fn catalog_mut(doc: &mut Document) -> Result<&mut Dictionary> {
    let id = catalog_id(doc)?;
    Ok(doc.get_dictionary_mut(id)?)
}

/// Resolve an entry that may be stored inline or behind a reference.
/// Returns the referenced object ID alongside the resolved object.
pub fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<(Option<ObjectId>, &'a Object)> {
    Ok(doc.dereference(object)?)
}

/// Set the catalog's page mode to `/UseAttachments`
pub fn set_page_mode_use_attachments(doc: &mut Document) -> Result<()> {
    let catalog = catalog_mut(doc)?;
    catalog.set("PageMode", Object::Name(PAGE_MODE_USE_ATTACHMENTS.as_bytes().to_vec()));
    log::info!("Set /PageMode /{}", PAGE_MODE_USE_ATTACHMENTS);
    Ok(())
}

/// Read the logical name of a file specification, preferring `/UF` over `/F`
pub fn filespec_name(spec: &Dictionary) -> Option<String> {
    spec.get(b"UF")
        .or_else(|_| spec.get(b"F"))
        .and_then(decode_text_string)
        .ok()
}
