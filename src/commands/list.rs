//! Listing commands: articles, projects, links, tags

use anyhow::Result;

use crate::Folio;

pub async fn articles(folio: &Folio, locale: &str, json: bool) -> Result<()> {
    let articles = folio.content.list_articles(locale).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&articles)?);
        return Ok(());
    }

    if articles.is_empty() {
        println!("No published articles for locale '{}'.", locale);
        return Ok(());
    }

    for article in &articles {
        let date = article.date_display.as_deref().unwrap_or("(no date)");
        let title = article.title.as_deref().unwrap_or("(untranslated)");
        if article.tag_names.is_empty() {
            println!("{:<18} {:<24} {}", date, article.slug, title);
        } else {
            println!(
                "{:<18} {:<24} {}  [{}]",
                date,
                article.slug,
                title,
                article.tag_names.join(", ")
            );
        }
    }
    println!("\n{} article(s)", articles.len());

    Ok(())
}

pub async fn projects(folio: &Folio, locale: &str, json: bool) -> Result<()> {
    let projects = folio.content.list_projects(locale).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    for project in &projects {
        let title = project.title.as_deref().unwrap_or("(untranslated)");
        let repo = project.link_repo.as_deref().unwrap_or("-");
        println!("{:<24} {:<32} {}", project.slug, title, repo);
    }
    println!("\n{} project(s)", projects.len());

    Ok(())
}

pub async fn links(folio: &Folio, json: bool) -> Result<()> {
    let links = folio.content.list_links().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
        return Ok(());
    }

    for link in &links {
        let featured = if link.featured.unwrap_or(false) { "*" } else { " " };
        println!("{} {:<28} {}", featured, link.title, link.url);
    }

    Ok(())
}

pub async fn tags(folio: &Folio, json: bool) -> Result<()> {
    let tags = folio.content.all_tags().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
        return Ok(());
    }

    for tag in &tags {
        println!("{:<6} {}", tag.id, tag.name);
    }

    Ok(())
}
