//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Content aggregation and markdown rendering for a CMS-backed portfolio site", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Content locale (defaults to the configured default locale)
    #[arg(short, long, global = true)]
    locale: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List published articles
    Articles,

    /// Show a single article by slug
    Article {
        /// Article slug
        slug: String,

        /// Render the markdown content to HTML
        #[arg(long)]
        html: bool,
    },

    /// List published projects
    Projects,

    /// Show a single project by slug
    Project {
        /// Project slug
        slug: String,

        /// Include the project's related articles
        #[arg(short, long)]
        related: bool,

        /// Render the markdown content to HTML
        #[arg(long)]
        html: bool,
    },

    /// List links-page entries
    Links,

    /// List the tag catalog
    Tags,

    /// Render a markdown file (or stdin) to sanitized HTML
    Render {
        /// Markdown file; reads stdin when omitted
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir()?,
    };

    let folio = folio::Folio::new(&base_dir)?;
    let locale = cli
        .locale
        .as_deref()
        .unwrap_or(&folio.config.default_locale);
    if !folio.config.supports_locale(locale) {
        tracing::warn!("locale '{}' is not configured for this site", locale);
    }

    match cli.command {
        Commands::Articles => {
            folio::commands::list::articles(&folio, locale, cli.json).await?;
        }

        Commands::Article { slug, html } => {
            folio::commands::show::article(&folio, &slug, locale, html, cli.json).await?;
        }

        Commands::Projects => {
            folio::commands::list::projects(&folio, locale, cli.json).await?;
        }

        Commands::Project {
            slug,
            related,
            html,
        } => {
            folio::commands::show::project(&folio, &slug, locale, related, html, cli.json).await?;
        }

        Commands::Links => {
            folio::commands::list::links(&folio, cli.json).await?;
        }

        Commands::Tags => {
            folio::commands::list::tags(&folio, cli.json).await?;
        }

        Commands::Render { file } => {
            folio::commands::render::run(&folio, file.as_deref())?;
        }
    }

    Ok(())
}
