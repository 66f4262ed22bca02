//! CLI entry point for spacetraveling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spacetraveling::commands::build::BuildOptions;

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version)]
#[command(about = "Static blog pages from a headless CMS, regenerated daily", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the page data into the public folder
    #[command(alias = "b")]
    Build {
        /// Read documents from a JSON file instead of the API
        #[arg(short, long)]
        fixture: Option<PathBuf>,

        /// Generate every post, not only the pre-generated paths
        #[arg(short, long)]
        all: bool,

        /// Mark the generated post pages as previews
        #[arg(long)]
        preview: bool,
    },

    /// Start a local server that regenerates stale pages
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Read documents from a JSON file instead of the API
        #[arg(short, long)]
        fixture: Option<PathBuf>,
    },

    /// List every post
    List {
        /// Read documents from a JSON file instead of the API
        #[arg(short, long)]
        fixture: Option<PathBuf>,
    },

    /// Clean the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,info"
    } else {
        "spacetraveling=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Build {
            fixture,
            all,
            preview,
        } => {
            let site = spacetraveling::Site::new(&base_dir)?;
            let builder = site.builder(site.source(fixture.as_deref())?)?;
            tracing::info!("Building pages...");

            let report =
                spacetraveling::commands::build::run(&site, &builder, &BuildOptions { all, preview })
                    .await?;
            println!("Generated {} post pages", report.posts);
            if !report.skipped.is_empty() {
                println!("Skipped: {}", report.skipped.join(", "));
            }
        }

        Commands::Serve { port, ip, fixture } => {
            let site = spacetraveling::Site::new(&base_dir)?;
            let builder = site.builder(site.source(fixture.as_deref())?)?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            spacetraveling::server::start(&site, builder, &ip, port).await?;
        }

        Commands::List { fixture } => {
            let site = spacetraveling::Site::new(&base_dir)?;
            let builder = site.builder(site.source(fixture.as_deref())?)?;
            spacetraveling::commands::list::run(&builder).await?;
        }

        Commands::Clean => {
            let site = spacetraveling::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
