//! Command-line interface for xmljson

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use tracing::{debug, error, warn};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use xmljson::converters::{create_convention, Convention, ConventionType, Parker};
#[cfg(feature = "cli")]
use xmljson::documents::Document;
#[cfg(feature = "cli")]
use xmljson::{Error, Result};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xmljson")]
#[command(author, version, about = "Convert XML documents to JSON", long_about = None)]
struct Cli {
    /// XML file to convert (defaults to stdin)
    #[arg(value_name = "IN_FILE")]
    in_file: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUT_FILE")]
    out_file: Option<PathBuf>,

    /// Convention: abdera, badgerfish, cobra, gdata, parker, yahoo
    #[arg(short = 'c', long = "converter", alias = "convention", default_value = "parker")]
    converter: ConventionType,

    /// Keep the root element (parker only)
    #[arg(long)]
    preserve_root: bool,

    /// Write JSON on a single line instead of indenting it
    #[arg(long)]
    compact: bool,
}

#[cfg(feature = "cli")]
fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> Result<()> {
    // Read the XML input
    let xml = match &cli.in_file {
        Some(path) => fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    debug!(bytes = xml.len(), "read input");

    let doc = Document::parse(&xml)?;
    let root = doc
        .root()
        .ok_or_else(|| Error::Xml("document has no root element".to_string()))?;

    let convention: Box<dyn Convention> = match cli.converter {
        ConventionType::Parker => Box::new(Parker::new().with_preserve_root(cli.preserve_root)),
        other => {
            if cli.preserve_root {
                warn!(convention = %other, "--preserve-root only applies to parker; ignored");
            }
            create_convention(other)
        }
    };

    let data = convention.decode(root)?;

    let mut json = if cli.compact {
        serde_json::to_string(&data)?
    } else {
        serde_json::to_string_pretty(&data)?
    };
    json.push('\n');

    match &cli.out_file {
        Some(path) => fs::write(path, json)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
