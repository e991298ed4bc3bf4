use std::fs;
use std::path::PathBuf;

use clap::Parser;
use prodcat::ArtifactBundle;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(about = "A program to inspect trained artifacts.")]
struct Args {
    /// Input directory of the artifacts
    #[arg(long)]
    model_in: PathBuf,

    /// Output the keyword table contained in the artifacts.
    #[arg(long)]
    dump_keywords: Option<PathBuf>,

    /// Output the binary feature schema contained in the artifacts.
    #[arg(long)]
    dump_schema: Option<PathBuf>,
}

#[derive(Serialize)]
struct KeywordRecord<'a> {
    category: &'a str,
    rank: usize,
    keyword: &'a str,
}

#[derive(Serialize)]
struct SchemaRecord<'a> {
    column: &'a str,
    category: &'a str,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let bundle = ArtifactBundle::read_dir(&args.model_in)?;

    if let Some(path) = args.dump_keywords {
        info!(?path, "saving keyword table");
        let mut wtr = csv::Writer::from_writer(fs::File::create(path)?);
        for entry in bundle.keywords().iter() {
            for (rank, keyword) in entry.keywords().iter().enumerate() {
                wtr.serialize(KeywordRecord {
                    category: entry.category(),
                    rank: rank + 1,
                    keyword,
                })?;
            }
        }
        wtr.flush()?;
    }

    if let Some(path) = args.dump_schema {
        info!(?path, "saving schema");
        let mut wtr = csv::Writer::from_writer(fs::File::create(path)?);
        for column in bundle.schema().columns() {
            wtr.serialize(SchemaRecord {
                column: column.name(),
                category: column.category(),
            })?;
        }
        wtr.flush()?;
    }

    Ok(())
}
