//! PDF manipulation module

pub mod attach;
pub mod catalog;
pub mod inspect;
pub mod load;
pub mod output_intent;
pub mod save;
pub mod xmp;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used items
pub use attach::{attach_xml, AfRelationship, AssociatedFiles, AttachmentSpec, FACTURX_FILENAME};
pub use catalog::set_page_mode_use_attachments;
pub use inspect::{inspect_document, inspect_facturx, EmbeddedEntry, FacturxReport};
pub use load::load_document;
pub use output_intent::{ensure_output_intent, output_intent_count};
pub use save::save_document;
pub use xmp::{build_xmp, set_xmp_metadata, sync_info_mod_date, ConformanceLevel, DocumentInfo};
