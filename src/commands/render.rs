//! Standalone markdown rendering command

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use crate::Folio;

/// Render a markdown file (or stdin when no path is given) to sanitized
/// HTML on stdout
pub fn run(folio: &Folio, path: Option<&Path>) -> Result<()> {
    let markdown = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read markdown from stdin")?;
            buffer
        }
    };

    println!("{}", folio.render_markdown(&markdown));
    Ok(())
}
