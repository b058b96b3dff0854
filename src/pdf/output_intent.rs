//! PDF/A output intent with an embedded ICC color profile

use std::path::Path;
use lopdf::{dictionary, Document, Object, Stream};
use crate::error::{Error, Result};
use super::catalog::{catalog, catalog_mut, resolve};

/// Identification written to `/Info`, `/OutputCondition` and
/// `/OutputConditionIdentifier`
pub const SRGB_IDENTIFIER: &str = "sRGB IEC61966-2.1";

/// Registry for the characterization named by [`SRGB_IDENTIFIER`]
pub const ICC_REGISTRY: &str = "http://www.color.org";

/// ICC profiles start with a 128 byte header
const ICC_HEADER_LEN: usize = 128;

/// Count the catalog's output intents (a missing entry counts as zero)
pub fn output_intent_count(doc: &Document) -> Result<usize> {
    let intents = match catalog(doc)?.get(b"OutputIntents") {
        Ok(intents) => intents,
        Err(_) => return Ok(0),
    };

    match resolve(doc, intents)?.1 {
        Object::Array(entries) => Ok(entries.len()),
        _ => Err(Error::General("OutputIntents is not an array".to_string())),
    }
}

/// Number of color components of an ICC profile, read from its header
///
/// Rejects data that is too short or lacks the `acsp` signature.
pub fn icc_components(profile: &[u8]) -> Result<i64> {
    if profile.len() < ICC_HEADER_LEN {
        return Err(Error::InvalidIccProfile(format!(
            "profile is {} bytes, shorter than the {} byte header",
            profile.len(),
            ICC_HEADER_LEN
        )));
    }

    if &profile[36..40] != b"acsp" {
        return Err(Error::InvalidIccProfile("missing 'acsp' signature".to_string()));
    }

    let components = match &profile[16..20] {
        b"GRAY" => 1,
        b"RGB " => 3,
        b"CMYK" => 4,
        other => {
            log::warn!(
                "ICC color space '{}' not recognized, assuming 3 components",
                String::from_utf8_lossy(other)
            );
            3
        }
    };

    Ok(components)
}

/// Add an sRGB output intent unless the document already declares one
///
/// The ICC file is only read when an intent is needed. Returns `true` when
/// an intent was added.
pub fn ensure_output_intent(doc: &mut Document, icc_path: &Path) -> Result<bool> {
    let existing = output_intent_count(doc)?;
    if existing > 0 {
        log::info!("Document already has {} output intent(s), leaving them", existing);
        return Ok(false);
    }

    if !icc_path.exists() {
        return Err(Error::FileNotFound(icc_path.to_path_buf()));
    }
    let profile = std::fs::read(icc_path)?;
    let components = icc_components(&profile)?;
    let profile_len = profile.len();

    let mut profile_stream = Stream::new(
        dictionary! {
            "N" => Object::Integer(components),
        },
        profile,
    );
    profile_stream.compress()?;
    let profile_id = doc.add_object(profile_stream);

    let intent_id = doc.add_object(dictionary! {
        "Type" => "OutputIntent",
        "S" => "GTS_PDFA1",
        "Info" => Object::string_literal(SRGB_IDENTIFIER),
        "OutputCondition" => Object::string_literal(SRGB_IDENTIFIER),
        "OutputConditionIdentifier" => Object::string_literal(SRGB_IDENTIFIER),
        "RegistryName" => Object::string_literal(ICC_REGISTRY),
        "DestOutputProfile" => Object::Reference(profile_id),
    });

    catalog_mut(doc)?.set("OutputIntents", Object::Array(vec![Object::Reference(intent_id)]));

    log::info!(
        "Added output intent {} {} R with {} byte ICC profile ({} components)",
        intent_id.0,
        intent_id.1,
        profile_len,
        components
    );

    Ok(true)
}
