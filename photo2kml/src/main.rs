use anyhow::Result;
use clap::Parser;
use photo2kml::{export, ExportConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "photo2kml", version)]
#[command(about = "Place geotagged photos on a map as KML camera markers")]
struct Cli {
    /// Wildcard selecting the photos to export (default: *.jpg in the current directory).
    /// Matching ignores case, so *.jpg also picks up IMG_0001.JPG. Dotfiles
    /// match only when the pattern starts with a dot, and ** is a plain *.
    #[arg(value_name = "PATTERN")]
    pattern: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = ExportConfig::default().with_pattern(cli.pattern);

    let summary = export(&config)?;

    println!(
        "💾 Saved {} markers to {}",
        summary.markers(),
        config.output.display()
    );
    Ok(())
}
