use std::io::{stdin, stdout};
use std::path::PathBuf;

use clap::Parser;
use prodcat::PredictionService;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(about = "A program to predict product categories.")]
struct Args {
    /// The directory of the trained artifacts
    #[arg(long)]
    model: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let interactive = atty::is(atty::Stream::Stdin);
    let mut service = PredictionService::new().interactive(interactive);
    service.load_dir(&args.model)?;
    if interactive {
        println!("Model loaded successfully!");
    }
    service.run(stdin().lock(), stdout().lock())?;

    Ok(())
}
