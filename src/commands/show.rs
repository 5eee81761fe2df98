//! Single-entity commands: one article or project by slug

use anyhow::Result;

use crate::Folio;

pub async fn article(
    folio: &Folio,
    slug: &str,
    locale: &str,
    html: bool,
    json: bool,
) -> Result<()> {
    let Some(article) = folio.content.article_by_slug(slug, locale).await? else {
        anyhow::bail!("article not found: {}", slug);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&article)?);
        return Ok(());
    }

    println!("{}", article.title.as_deref().unwrap_or(&article.slug));
    if let Some(date) = &article.date_display {
        println!("{}", date);
    }
    if !article.tag_names.is_empty() {
        println!("tags: {}", article.tag_names.join(", "));
    }
    if let Some(summary) = &article.summary {
        println!("\n{}", summary);
    }
    if let Some(content) = &article.content {
        if html {
            println!("\n{}", folio.render_markdown(content));
        } else {
            println!("\n{}", content);
        }
    }

    // Article pages cap related articles at the configured limit
    let related = folio
        .content
        .related_for_article(&article.id, locale, folio.config.related_limit)
        .await?;
    if !related.is_empty() {
        println!("\nRelated articles:");
        for item in &related {
            println!(
                "  {:<24} {}",
                item.slug,
                item.title.as_deref().unwrap_or("(untranslated)")
            );
        }
    }

    Ok(())
}

pub async fn project(
    folio: &Folio,
    slug: &str,
    locale: &str,
    related: bool,
    html: bool,
    json: bool,
) -> Result<()> {
    let Some(project) = folio.content.project_by_slug(slug, locale).await? else {
        anyhow::bail!("project not found: {}", slug);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&project)?);
    } else {
        println!("{}", project.title.as_deref().unwrap_or(&project.slug));
        if let Some(repo) = &project.link_repo {
            println!("repo: {}", repo);
        }
        if let Some(summary) = &project.summary {
            println!("\n{}", summary);
        }
        if let Some(content) = &project.content {
            if html {
                println!("\n{}", folio.render_markdown(content));
            } else {
                println!("\n{}", content);
            }
        }
    }

    if related {
        // Project pages show every related article, uncapped
        let related = folio
            .content
            .related_articles(&project.id, locale, None, None)
            .await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&related)?);
        } else {
            println!("\nRelated articles:");
            for article in &related {
                println!(
                    "  {:<24} {}",
                    article.slug,
                    article.title.as_deref().unwrap_or("(untranslated)")
                );
            }
            if related.is_empty() {
                println!("  (none)");
            }
        }
    }

    Ok(())
}
