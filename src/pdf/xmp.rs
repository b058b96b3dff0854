//! Factur-X XMP metadata for PDF/A-3 identification

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, FixedOffset};
use lopdf::{decode_text_string, dictionary, Document, Object, ObjectId, Stream};
use crate::date::{format_pdf_date, format_xmp_date};
use crate::error::Result;
use super::catalog::catalog_mut;

/// Namespace of the Factur-X PDF/A extension schema
pub const FACTURX_NAMESPACE: &str = "urn:factur-x:pdfa:CrossIndustryDocument:invoice:1p0#";

/// Factur-X conformance level declared in `fx:ConformanceLevel`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConformanceLevel {
    Minimum,
    BasicWl,
    Basic,
    En16931,
    Extended,
}

impl ConformanceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConformanceLevel::Minimum => "MINIMUM",
            ConformanceLevel::BasicWl => "BASIC WL",
            ConformanceLevel::Basic => "BASIC",
            ConformanceLevel::En16931 => "EN 16931",
            ConformanceLevel::Extended => "EXTENDED",
        }
    }
}

impl fmt::Display for ConformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConformanceLevel {
    type Err = String;

    /// Accepts the XMP spelling as well as compact forms such as `en16931`
    /// or `basic-wl`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();
        match compact.as_str() {
            "MINIMUM" => Ok(ConformanceLevel::Minimum),
            "BASICWL" => Ok(ConformanceLevel::BasicWl),
            "BASIC" => Ok(ConformanceLevel::Basic),
            "EN16931" | "COMFORT" => Ok(ConformanceLevel::En16931),
            "EXTENDED" => Ok(ConformanceLevel::Extended),
            _ => Err(format!(
                "unknown conformance level '{}' (expected minimum, basic-wl, basic, en16931 or extended)",
                s
            )),
        }
    }
}

/// Escape text for use inside XML element content
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Document Info fields mirrored into the XMP packet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

impl DocumentInfo {
    /// Read the trailer's `/Info` dictionary; missing entries stay `None`
    pub fn from_document(doc: &Document) -> Self {
        let info = doc.trailer.get(b"Info")
            .and_then(|info| doc.dereference(info))
            .and_then(|(_, info)| info.as_dict());

        let info = match info {
            Ok(info) => info,
            Err(_) => return Self::default(),
        };

        let field = |key: &[u8]| {
            info.get(key)
                .and_then(decode_text_string)
                .ok()
                .filter(|value| !value.is_empty())
        };

        Self {
            title: field(b"Title"),
            author: field(b"Author"),
            subject: field(b"Subject"),
            creator: field(b"Creator"),
            producer: field(b"Producer"),
        }
    }

    fn to_xmp(&self) -> String {
        let mut out = String::new();

        let mut dc = String::new();
        if let Some(title) = &self.title {
            dc.push_str(&alt_property("dc:title", title));
        }
        if let Some(author) = &self.author {
            dc.push_str(&format!(
                "\n      <dc:creator>\n        <rdf:Seq>\n          <rdf:li>{}</rdf:li>\n        </rdf:Seq>\n      </dc:creator>",
                escape_xml(author)
            ));
        }
        if let Some(subject) = &self.subject {
            dc.push_str(&alt_property("dc:description", subject));
        }
        if !dc.is_empty() {
            out.push_str(&format!(
                "\n    <rdf:Description rdf:about=\"\"\n        xmlns:dc=\"http://purl.org/dc/elements/1.1/\">{}\n    </rdf:Description>",
                dc
            ));
        }

        if let Some(producer) = &self.producer {
            out.push_str(&format!(
                "\n    <rdf:Description rdf:about=\"\"\n        xmlns:pdf=\"http://ns.adobe.com/pdf/1.3/\">\n      <pdf:Producer>{}</pdf:Producer>\n    </rdf:Description>",
                escape_xml(producer)
            ));
        }

        out
    }
}

fn alt_property(name: &str, value: &str) -> String {
    format!(
        "\n      <{name}>\n        <rdf:Alt>\n          <rdf:li xml:lang=\"x-default\">{value}</rdf:li>\n        </rdf:Alt>\n      </{name}>",
        name = name,
        value = escape_xml(value)
    )
}

/// Build the XMP packet declaring PDF/A-3B plus the Factur-X properties
///
/// `info` is mirrored into the Dublin Core and PDF schemas so the packet
/// agrees with the document Info dictionary.
pub fn build_xmp(
    file_name: &str,
    level: ConformanceLevel,
    date: Option<&DateTime<FixedOffset>>,
    info: &DocumentInfo,
) -> String {
    let creator_tool = info.creator.as_deref()
        .map(|tool| format!("\n      <xmp:CreatorTool>{}</xmp:CreatorTool>", escape_xml(tool)))
        .unwrap_or_default();

    let dates = match date {
        Some(date) => {
            let stamp = format_xmp_date(date);
            format!(
                r#"
    <rdf:Description rdf:about=""
        xmlns:xmp="http://ns.adobe.com/xap/1.0/">
      <xmp:ModifyDate>{stamp}</xmp:ModifyDate>
      <xmp:MetadataDate>{stamp}</xmp:MetadataDate>{creator_tool}
    </rdf:Description>"#
            )
        }
        None if !creator_tool.is_empty() => format!(
            r#"
    <rdf:Description rdf:about=""
        xmlns:xmp="http://ns.adobe.com/xap/1.0/">{creator_tool}
    </rdf:Description>"#
        ),
        None => String::new(),
    };

    format!(
        r#"<?xpacket begin="{BOM}" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:pdfaid="http://www.aiim.org/pdfa/ns/id/">
      <pdfaid:part>3</pdfaid:part>
      <pdfaid:conformance>B</pdfaid:conformance>
    </rdf:Description>{info}{dates}
    <rdf:Description rdf:about=""
        xmlns:pdfaExtension="http://www.aiim.org/pdfa/ns/extension/"
        xmlns:pdfaSchema="http://www.aiim.org/pdfa/ns/schema#"
        xmlns:pdfaProperty="http://www.aiim.org/pdfa/ns/property#">
      <pdfaExtension:schemas>
        <rdf:Bag>
          <rdf:li rdf:parseType="Resource">
            <pdfaSchema:schema>Factur-X PDFA Extension Schema</pdfaSchema:schema>
            <pdfaSchema:namespaceURI>{NS}</pdfaSchema:namespaceURI>
            <pdfaSchema:prefix>fx</pdfaSchema:prefix>
            <pdfaSchema:property>
              <rdf:Seq>
                <rdf:li rdf:parseType="Resource">
                  <pdfaProperty:name>DocumentFileName</pdfaProperty:name>
                  <pdfaProperty:valueType>Text</pdfaProperty:valueType>
                  <pdfaProperty:category>external</pdfaProperty:category>
                  <pdfaProperty:description>The name of the embedded XML document</pdfaProperty:description>
                </rdf:li>
                <rdf:li rdf:parseType="Resource">
                  <pdfaProperty:name>DocumentType</pdfaProperty:name>
                  <pdfaProperty:valueType>Text</pdfaProperty:valueType>
                  <pdfaProperty:category>external</pdfaProperty:category>
                  <pdfaProperty:description>The type of the hybrid document in capital letters, e.g. INVOICE or ORDER</pdfaProperty:description>
                </rdf:li>
                <rdf:li rdf:parseType="Resource">
                  <pdfaProperty:name>Version</pdfaProperty:name>
                  <pdfaProperty:valueType>Text</pdfaProperty:valueType>
                  <pdfaProperty:category>external</pdfaProperty:category>
                  <pdfaProperty:description>The actual version of the standard applying to the embedded XML document</pdfaProperty:description>
                </rdf:li>
                <rdf:li rdf:parseType="Resource">
                  <pdfaProperty:name>ConformanceLevel</pdfaProperty:name>
                  <pdfaProperty:valueType>Text</pdfaProperty:valueType>
                  <pdfaProperty:category>external</pdfaProperty:category>
                  <pdfaProperty:description>The conformance level of the embedded XML document</pdfaProperty:description>
                </rdf:li>
              </rdf:Seq>
            </pdfaSchema:property>
          </rdf:li>
        </rdf:Bag>
      </pdfaExtension:schemas>
    </rdf:Description>
    <rdf:Description rdf:about=""
        xmlns:fx="{NS}">
      <fx:DocumentType>INVOICE</fx:DocumentType>
      <fx:DocumentFileName>{file_name}</fx:DocumentFileName>
      <fx:Version>1.0</fx:Version>
      <fx:ConformanceLevel>{level}</fx:ConformanceLevel>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#,
        BOM = '\u{FEFF}',
        NS = FACTURX_NAMESPACE,
        info = info.to_xmp(),
        dates = dates,
        file_name = escape_xml(file_name),
        level = level.as_str(),
    )
}

/// Set the Info dictionary's `/ModDate` so it matches `xmp:ModifyDate`
///
/// Documents without an Info dictionary are left alone.
pub fn sync_info_mod_date(doc: &mut Document, date: &DateTime<FixedOffset>) -> Result<()> {
    let stamp = format_pdf_date(date);

    let info = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
        Ok(info_id) => doc.get_dictionary_mut(info_id)?,
        Err(_) => match doc.trailer.get_mut(b"Info").and_then(Object::as_dict_mut) {
            Ok(info) => info,
            Err(_) => return Ok(()),
        },
    };

    info.set("ModDate", Object::string_literal(stamp.as_str()));
    log::debug!("Set Info /ModDate to {}", stamp);
    Ok(())
}

/// Store `xmp` as the catalog's `/Metadata` stream, replacing any previous one
pub fn set_xmp_metadata(doc: &mut Document, xmp: String) -> Result<ObjectId> {
    let len = xmp.len();
    // PDF/A requires the metadata stream to stay unfiltered
    let stream = Stream::new(
        dictionary! {
            "Type" => "Metadata",
            "Subtype" => "XML",
        },
        xmp.into_bytes(),
    )
    .with_compression(false);
    let metadata_id = doc.add_object(stream);

    catalog_mut(doc)?.set("Metadata", Object::Reference(metadata_id));
    log::info!("Wrote {} byte XMP metadata stream", len);

    Ok(metadata_id)
}
