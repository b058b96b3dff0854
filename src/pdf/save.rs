//! Writing the finished document

use std::path::Path;
use lopdf::Document;
use crate::error::Result;

/// Serialize `doc` and write it to `path`
///
/// The document is rendered into memory first so a serialization failure
/// never leaves a truncated file behind. Streams are written as they are:
/// loaded streams keep their original filters and the streams added by this
/// crate are compressed when they are built.
/// Returns the number of bytes written.
pub fn save_document(doc: &mut Document, path: &Path) -> Result<usize> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    std::fs::write(path, &buffer)?;

    log::info!("Wrote {} bytes to {}", buffer.len(), path.display());
    Ok(buffer.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pdf::test_support::sample_document;
    use tempfile::TempDir;

    #[test]
    fn test_save_round_trips() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("out.pdf");

        let mut doc = sample_document();
        let written = save_document(&mut doc, &path).unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, written);
        let reloaded = Document::load(&path).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }

    #[test]
    fn test_save_to_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("no-such-dir").join("out.pdf");

        let mut doc = sample_document();
        let result = save_document(&mut doc, &path);
        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_save_keeps_unfiltered_streams() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("out.pdf");

        let mut doc = sample_document();
        let raw = "<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>".repeat(20).into_bytes();
        let stream_id = doc.add_object(lopdf::Stream::new(lopdf::Dictionary::new(), raw.clone()));
        save_document(&mut doc, &path).unwrap();

        let reloaded = Document::load(&path).unwrap();
        let stream = reloaded.get_object(stream_id).unwrap().as_stream().unwrap();
        assert!(stream.dict.get(b"Filter").is_err());
        assert_eq!(stream.content, raw);
    }
}
