//! Factur-X attachment library
//!
//! Turns an existing PDF into a Factur-X/ZUGFeRD hybrid invoice.
//! This library provides functionality to:
//! - Embed an XML invoice as a PDF/A-3 associated file
//! - Add an sRGB output intent when the document has none
//! - Open the attachments panel by default
//! - Optionally write Factur-X XMP metadata
//! - Inspect the result
//!
//! # Example
//!
//! ```no_run
//! use facturx_attach::{attach_facturx, AttachOptions};
//!
//! let options = AttachOptions::new("invoice.pdf", "facturx.xml", "invoice-fx.pdf", "sRGB.icc");
//!
//! attach_facturx(&options).expect("Failed to attach invoice XML");
//! ```

pub mod error;
pub mod pdf;
pub mod date;
pub mod facturx;

// Re-export commonly used items
pub use error::{Error, Result};
pub use facturx::{attach_facturx, verify_output, AttachOptions, AttachSummary};
