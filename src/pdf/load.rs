//! Loading the input PDF

use std::path::Path;
use lopdf::Document;
use crate::error::{Error, Result};
use super::catalog::catalog_id;

/// Load a PDF file into a mutable in-memory document
///
/// Fails with [`Error::FileNotFound`] when the path is missing and with
/// [`Error::InvalidPdf`] when the bytes do not parse. A document without a
/// catalog is rejected as well, since every later step edits the catalog.
pub fn load_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path).map_err(|source| Error::InvalidPdf {
        path: path.to_path_buf(),
        source,
    })?;

    let root = catalog_id(&doc)?;
    log::info!(
        "Loaded {} (PDF {}, {} objects, catalog {} {} R)",
        path.display(),
        doc.version,
        doc.objects.len(),
        root.0,
        root.1
    );

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_document(Path::new("nonexistent.pdf"));
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_load_garbage_is_invalid_pdf() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("garbage.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let result = load_document(&path);
        assert!(matches!(result.unwrap_err(), Error::InvalidPdf { .. }));
    }
}
