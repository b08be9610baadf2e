//! CLI entry point for post-manifest

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use post_manifest::commands;
use post_manifest::Ingest;

#[derive(Parser)]
#[command(name = "post-manifest")]
#[command(version)]
#[command(about = "Validate Markdown posts and build a JSON manifest", long_about = None)]
struct Cli {
    /// Config file to use instead of `<CONTENT_DIR>/_ingest.yml`
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every post and write the manifest
    #[command(alias = "i")]
    Ingest {
        /// Directory containing the Markdown posts
        content_dir: PathBuf,

        /// Where to write the manifest
        output: PathBuf,

        /// Write compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,

        /// Rebuild whenever a post changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Validate every post without writing anything
    Check {
        /// Directory containing the Markdown posts
        content_dir: PathBuf,
    },

    /// List posts, tags or drafts
    List {
        /// Directory containing the Markdown posts
        content_dir: PathBuf,

        /// Type of content to list (post, tag, draft)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "post_manifest=debug,info"
    } else {
        "post_manifest=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::ingest::report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Ingest {
            content_dir,
            output,
            compact,
            watch,
        } => {
            let ingest = Ingest::open(&content_dir, config)?;
            tracing::info!("Ingesting {:?} into {:?}", content_dir, output);

            let first = commands::ingest::run(&ingest, &output, !compact).await;
            if !watch {
                first?;
                println!("Wrote {:?}", output);
                return Ok(());
            }

            // Keep watching even if the first run failed
            match first {
                Ok(()) => println!("Wrote {:?}", output),
                Err(e) => commands::ingest::report(&e),
            }
            commands::ingest::watch(&ingest, &output, !compact, config).await?;
        }

        Commands::Check { content_dir } => {
            let ingest = Ingest::open(&content_dir, config)?;
            commands::check::run(&ingest).await?;
        }

        Commands::List {
            content_dir,
            r#type,
        } => {
            let ingest = Ingest::open(&content_dir, config)?;
            commands::list::run(&ingest, &r#type).await?;
        }

        Commands::Version => {
            println!("post-manifest version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
