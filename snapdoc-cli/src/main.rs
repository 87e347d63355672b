use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use snapdoc::{ExportOptions, Exporter, ImageSurface, PageGeometry, Renderable, SolidSurface};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "snapdoc",
    about = "Export rendered content blocks as a paginated PDF",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export pre-rendered block images as one paginated document
    Export {
        /// Block images (PNG or JPEG) in placement order
        blocks: Vec<PathBuf>,

        /// Title shown on the page-1 header
        #[arg(short, long)]
        title: String,

        /// Subtitle shown under the title
        #[arg(short, long, default_value = "")]
        subtitle: String,

        /// Directory the document is written into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Output file stem; the document is saved as <stem>.pdf
        #[arg(long)]
        stem: String,

        /// Render scale factor applied to every block
        #[arg(long, default_value_t = snapdoc::DEFAULT_SCALE_FACTOR)]
        scale: f64,

        /// Page size (a4, letter)
        #[arg(long, default_value = "a4")]
        page: String,
    },

    /// Generate a sample document from synthetic blocks
    Demo {
        /// Output file path
        #[arg(short, long, default_value = "demo.pdf")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            blocks,
            title,
            subtitle,
            output_dir,
            stem,
            scale,
            page,
        } => {
            let options = ExportOptions {
                scale_factor: scale,
                geometry: parse_page_geometry(&page)?,
            };

            let surfaces: Vec<ImageSurface> =
                blocks.iter().map(ImageSurface::new).collect();
            let blocks: Vec<&dyn Renderable> =
                surfaces.iter().map(|s| s as &dyn Renderable).collect();
            debug!(block_count = blocks.len(), "collected block surfaces");

            let exporter = Exporter::new(options);
            let path = exporter
                .export_as(&blocks, &title, &subtitle, &output_dir, &stem)
                .context("export failed")?;

            println!("Document written to {}", path.display());
        }

        Commands::Demo { output } => {
            // Block heights picked so the document shows both a shared
            // page and a forced break.
            let surfaces = vec![
                SolidSurface::new(1000, 520, [0xD9, 0xE2, 0xF1]),
                SolidSurface::new(1000, 260, [0xE4, 0xE4, 0xE4]),
                SolidSurface::new(1000, 680, [0xF1, 0xE2, 0xD9]),
                SolidSurface::new(1000, 300, [0xE4, 0xE4, 0xE4]),
            ];
            let blocks: Vec<&dyn Renderable> =
                surfaces.iter().map(|s| s as &dyn Renderable).collect();

            let exporter = Exporter::new(ExportOptions::default());
            exporter
                .export_to_path(&blocks, "Demo Report", "Generated by snapdoc", &output)
                .context("demo export failed")?;

            println!("Demo document written to {}", output.display());
        }
    }

    Ok(())
}

fn parse_page_geometry(name: &str) -> Result<PageGeometry> {
    match name.to_ascii_lowercase().as_str() {
        "a4" => Ok(PageGeometry::a4()),
        "letter" => Ok(PageGeometry::letter()),
        other => bail!("unknown page size '{other}' (expected a4 or letter)"),
    }
}
