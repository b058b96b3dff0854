//! Factur-X attach CLI tool
//!
//! A command-line tool for turning a PDF into a Factur-X/ZUGFeRD hybrid invoice.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process;

use facturx_attach::date::parse_date_expression;
use facturx_attach::pdf::attach::DEFAULT_DESCRIPTION;
use facturx_attach::pdf::{AfRelationship, AssociatedFiles, ConformanceLevel, FACTURX_FILENAME};
use facturx_attach::{attach_facturx, verify_output, AttachOptions};

/// Factur-X attach - Embed an XML invoice into a PDF/A-3 document
#[derive(Parser)]
#[command(name = "facturx-attach")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Attach an invoice XML, adding an sRGB output intent if needed
    facturx-attach invoice.pdf facturx.xml invoice-fx.pdf sRGB.icc

    # Also write Factur-X XMP metadata and verify the result
    facturx-attach invoice.pdf facturx.xml out.pdf sRGB.icc --xmp en16931 --check

    # Keep other associated files already listed in /AF
    facturx-attach invoice.pdf facturx.xml out.pdf sRGB.icc --append-af")]
struct Cli {
    /// Input PDF file
    input: PathBuf,

    /// XML invoice to embed
    xml: PathBuf,

    /// Output PDF file path
    output: PathBuf,

    /// ICC color profile, used when the PDF has no output intent
    icc: PathBuf,

    /// Attachment file name
    #[arg(long, default_value = FACTURX_FILENAME)]
    name: String,

    /// Description stored on the file specification
    #[arg(long, default_value = DEFAULT_DESCRIPTION)]
    description: String,

    /// AFRelationship: data, source, alternative, supplement or unspecified
    #[arg(long, default_value = "data")]
    relationship: AfRelationship,

    /// Keep existing /AF entries instead of replacing the array
    #[arg(long)]
    append_af: bool,

    /// Modification date of the attachment: file, now, none, YYYY-MM-DD or MM/DD/YYYY
    #[arg(long, default_value = "file")]
    mod_date: String,

    /// Write Factur-X XMP metadata with this conformance level
    /// (minimum, basic-wl, basic, en16931, extended). Replaces any existing
    /// XMP packet; title, author, subject, creator and producer are taken
    /// from the document Info dictionary
    #[arg(long, value_name = "LEVEL")]
    xmp: Option<ConformanceLevel>,

    /// Re-read the output and verify the Factur-X structure
    #[arg(long)]
    check: bool,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version go to stdout and succeed
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mod_date = parse_date_expression(&cli.mod_date)?;

    let options = AttachOptions {
        name: cli.name.clone(),
        description: cli.description,
        relationship: cli.relationship,
        associated_files: if cli.append_af {
            AssociatedFiles::Append
        } else {
            AssociatedFiles::Replace
        },
        mod_date,
        xmp: cli.xmp,
        ..AttachOptions::new(&cli.input, &cli.xml, &cli.output, &cli.icc)
    };

    eprintln!("Attaching {} to {}...", cli.xml.display(), cli.input.display());

    let summary = attach_facturx(&options).with_context(|| {
        format!("failed to attach {} to {}", cli.xml.display(), cli.input.display())
    })?;

    eprintln!("Embedded {} ({} bytes)", cli.name, summary.xml_len);
    if summary.output_intent_added {
        eprintln!("Added sRGB output intent from {}", cli.icc.display());
    }
    if summary.xmp_written {
        eprintln!("Wrote Factur-X XMP metadata");
    }

    if cli.check {
        let report = verify_output(&cli.output, &cli.name)
            .with_context(|| format!("check of {} failed", cli.output.display()))?;
        eprintln!(
            "Check passed: {} pages, {} output intent(s)",
            report.page_count, report.output_intents
        );
    }

    eprintln!("Output: {}", cli.output.display());

    Ok(())
}
