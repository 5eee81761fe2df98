//! Content aggregation over the CMS boundary
//!
//! Resolves raw CMS rows into fully denormalized views: translation fields
//! merged by locale, tag ids resolved to names, related-content sets
//! computed from join tables. Everything is a read-only projection scoped
//! to one call; shared lookups (tag catalog, relation tables) are fetched
//! once per operation and reused across all entities.

use std::collections::{HashMap, HashSet};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cms::{CmsBackend, CmsError, ItemsQuery};
use crate::content::model::{
    Article, ArticleTagRelation, ArticleTranslation, Link, Project, ProjectArticleRelation,
    ProjectFileRelation, ProjectTagRelation, ProjectTranslation, Tag,
};
use crate::helpers::date;

const ARTICLE_FIELDS: &[&str] = &["id", "slug", "status", "date_created", "tags"];
const PROJECT_FIELDS: &[&str] = &[
    "id",
    "slug",
    "status",
    "date_created",
    "link_repo",
    "gallery",
    "tags",
];

/// Aggregates CMS collections into resolved entities
pub struct ContentAggregator {
    backend: Box<dyn CmsBackend>,
}

impl ContentAggregator {
    pub fn new(backend: Box<dyn CmsBackend>) -> Self {
        Self { backend }
    }

    async fn fetch_as<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &ItemsQuery,
    ) -> Result<Vec<T>, CmsError> {
        let rows = self.backend.fetch_collection(collection, query).await?;
        rows.into_iter()
            .map(|row: Value| {
                serde_json::from_value(row).map_err(|err| CmsError::Payload {
                    collection: collection.to_string(),
                    reason: err.to_string(),
                })
            })
            .collect()
    }

    /// All published articles for a locale, newest first.
    ///
    /// Articles without a translation for the locale keep their base fields
    /// (display fields stay `None`); missing tags degrade to an empty list.
    pub async fn list_articles(&self, locale: &str) -> Result<Vec<Article>, CmsError> {
        let article_query = ItemsQuery::new()
            .fields(ARTICLE_FIELDS.iter().copied())
            .filter_eq("status", "published")
            .locale(locale);
        let translation_query = ItemsQuery::new().filter_eq("languages_code", locale);
        let catalog_query = ItemsQuery::new();
        let relation_query = ItemsQuery::new();

        // Entity + translation rows and the shared tag lookups have no data
        // dependency on each other, so all four fetches run concurrently.
        let ((mut articles, translations), (tags, relations)) = tokio::try_join!(
            async {
                tokio::try_join!(
                    self.fetch_as::<Article>("articles", &article_query),
                    self.fetch_as::<ArticleTranslation>("articles_translations", &translation_query),
                )
            },
            async {
                tokio::try_join!(
                    self.fetch_as::<Tag>("tags", &catalog_query),
                    self.fetch_as::<ArticleTagRelation>("articles_tags", &relation_query),
                )
            },
        )?;

        merge_article_translations(&mut articles, translations);

        let tags_by_article = group_tag_ids(&relations);
        for article in &mut articles {
            let ids = tags_by_article
                .get(article.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            article.tag_names = tag_names_by_ids(ids, &tags);
            article.date_display = article.date_created.as_deref().and_then(date::display_date);
        }

        sort_newest_first(&mut articles, |a| a.date_created.as_deref());

        tracing::debug!(locale, count = articles.len(), "listed articles");
        Ok(articles)
    }

    /// A single published article by slug, or `None` when no match exists
    pub async fn article_by_slug(
        &self,
        slug: &str,
        locale: &str,
    ) -> Result<Option<Article>, CmsError> {
        let query = ItemsQuery::new()
            .fields(ARTICLE_FIELDS.iter().copied())
            .filter_eq("slug", slug)
            .filter_eq("status", "published")
            .locale(locale)
            .limit(1);

        let articles = self.fetch_as::<Article>("articles", &query).await?;
        let Some(mut article) = articles.into_iter().next() else {
            return Ok(None);
        };

        let translation_query = ItemsQuery::new()
            .filter_eq("articles_id", article.id.as_str())
            .filter_eq("languages_code", locale);
        let (translations, tags) = tokio::try_join!(
            self.fetch_as::<ArticleTranslation>("articles_translations", &translation_query),
            self.tags_for_article(&article.id),
        )?;

        if let Some(translation) = translations.into_iter().next() {
            apply_article_translation(&mut article, translation);
        }
        article.tags = tags.iter().map(|t| t.id).collect();
        article.tag_names = tags.into_iter().map(|t| t.name).collect();
        article.date_display = article.date_created.as_deref().and_then(date::display_date);

        Ok(Some(article))
    }

    /// All published projects for a locale, newest first
    pub async fn list_projects(&self, locale: &str) -> Result<Vec<Project>, CmsError> {
        let project_query = ItemsQuery::new()
            .fields(PROJECT_FIELDS.iter().copied())
            .filter_eq("status", "published")
            .locale(locale);
        let translation_query = ItemsQuery::new().filter_eq("languages_code", locale);
        let catalog_query = ItemsQuery::new();
        let relation_query = ItemsQuery::new();

        let ((mut projects, translations), (tags, relations)) = tokio::try_join!(
            async {
                tokio::try_join!(
                    self.fetch_as::<Project>("projects", &project_query),
                    self.fetch_as::<ProjectTranslation>("projects_translations", &translation_query),
                )
            },
            async {
                tokio::try_join!(
                    self.fetch_as::<Tag>("tags", &catalog_query),
                    self.fetch_as::<ProjectTagRelation>("projects_tags", &relation_query),
                )
            },
        )?;

        merge_project_translations(&mut projects, translations);

        let mut tags_by_project: HashMap<&str, Vec<i64>> = HashMap::new();
        for relation in &relations {
            tags_by_project
                .entry(relation.projects_id.as_str())
                .or_default()
                .push(relation.tags_id);
        }
        for project in &mut projects {
            let ids = tags_by_project
                .get(project.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            project.tag_names = tag_names_by_ids(ids, &tags);
            project.date_display = project.date_created.as_deref().and_then(date::display_date);
        }

        sort_newest_first(&mut projects, |p| p.date_created.as_deref());

        tracing::debug!(locale, count = projects.len(), "listed projects");
        Ok(projects)
    }

    /// A single published project by slug, or `None` when no match exists
    pub async fn project_by_slug(
        &self,
        slug: &str,
        locale: &str,
    ) -> Result<Option<Project>, CmsError> {
        let query = ItemsQuery::new()
            .fields(PROJECT_FIELDS.iter().copied())
            .filter_eq("slug", slug)
            .filter_eq("status", "published")
            .locale(locale)
            .limit(1);

        let projects = self.fetch_as::<Project>("projects", &query).await?;
        let Some(mut project) = projects.into_iter().next() else {
            return Ok(None);
        };

        let translation_query = ItemsQuery::new()
            .filter_eq("projects_id", project.id.as_str())
            .filter_eq("languages_code", locale);
        let translations = self
            .fetch_as::<ProjectTranslation>("projects_translations", &translation_query)
            .await?;

        if let Some(translation) = translations.into_iter().next() {
            apply_project_translation(&mut project, translation);
        }
        project.date_display = project.date_created.as_deref().and_then(date::display_date);

        Ok(Some(project))
    }

    /// Published articles related to a project through the join table.
    ///
    /// `exclude` drops the currently-viewed article; `limit` caps the
    /// result (article pages cap at the configured related limit, project
    /// pages take everything).
    pub async fn related_articles(
        &self,
        project_id: &str,
        locale: &str,
        exclude: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Article>, CmsError> {
        let relation_query = ItemsQuery::new();
        let (relations, articles) = tokio::try_join!(
            self.fetch_as::<ProjectArticleRelation>("projects_articles", &relation_query),
            self.list_articles(locale),
        )?;

        let related: HashSet<&str> = relations_for_project(&relations, project_id)
            .into_iter()
            .map(|r| r.articles_id.as_str())
            .collect();

        let mut matched: Vec<Article> = articles
            .into_iter()
            .filter(|article| related.contains(article.id.as_str()))
            .filter(|article| exclude != Some(article.id.as_str()))
            .collect();
        if let Some(limit) = limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }

    /// Published articles sharing a project with the given article, newest
    /// first, capped at `limit`. The article itself is never included.
    pub async fn related_for_article(
        &self,
        article_id: &str,
        locale: &str,
        limit: usize,
    ) -> Result<Vec<Article>, CmsError> {
        let relation_query = ItemsQuery::new();
        let (relations, articles) = tokio::try_join!(
            self.fetch_as::<ProjectArticleRelation>("projects_articles", &relation_query),
            self.list_articles(locale),
        )?;

        let projects: HashSet<&str> = relations
            .iter()
            .filter(|r| r.articles_id == article_id)
            .map(|r| r.projects_id.as_str())
            .collect();
        let siblings: HashSet<&str> = relations
            .iter()
            .filter(|r| projects.contains(r.projects_id.as_str()) && r.articles_id != article_id)
            .map(|r| r.articles_id.as_str())
            .collect();

        let mut matched: Vec<Article> = articles
            .into_iter()
            .filter(|article| siblings.contains(article.id.as_str()))
            .collect();
        matched.truncate(limit);

        Ok(matched)
    }

    /// Resolve tag ids to names, fetching the catalog when not supplied
    pub async fn resolve_tag_names(
        &self,
        ids: &[i64],
        all_tags: Option<&[Tag]>,
    ) -> Result<Vec<String>, CmsError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        match all_tags {
            Some(tags) => Ok(tag_names_by_ids(ids, tags)),
            None => {
                let tags = self.all_tags().await?;
                Ok(tag_names_by_ids(ids, &tags))
            }
        }
    }

    /// Tags attached to one article, in catalog order
    pub async fn tags_for_article(&self, article_id: &str) -> Result<Vec<Tag>, CmsError> {
        let relation_query = ItemsQuery::new();
        let catalog_query = ItemsQuery::new();
        let (relations, tags) = tokio::try_join!(
            self.fetch_as::<ArticleTagRelation>("articles_tags", &relation_query),
            self.fetch_as::<Tag>("tags", &catalog_query),
        )?;

        let wanted: HashSet<i64> = relations
            .iter()
            .filter(|r| r.articles_id == article_id)
            .map(|r| r.tags_id)
            .collect();

        Ok(tags.into_iter().filter(|t| wanted.contains(&t.id)).collect())
    }

    /// The full tag catalog
    pub async fn all_tags(&self) -> Result<Vec<Tag>, CmsError> {
        self.fetch_as("tags", &ItemsQuery::new()).await
    }

    /// Links-page entries ordered by their numeric position
    pub async fn list_links(&self) -> Result<Vec<Link>, CmsError> {
        let mut links = self.fetch_as::<Link>("links", &ItemsQuery::new()).await?;
        links.sort_by_key(Link::position_key);
        Ok(links)
    }

    /// Gallery image relations for a project, filtered by owning slug
    pub async fn gallery_for_project(
        &self,
        project_slug: &str,
    ) -> Result<Vec<ProjectFileRelation>, CmsError> {
        let relations = self
            .fetch_as::<ProjectFileRelation>("projects_files", &ItemsQuery::new())
            .await?;
        Ok(relations
            .into_iter()
            .filter(|r| r.projects_slug == project_slug)
            .collect())
    }
}

/// Map tag ids to names against a catalog.
///
/// Pure: preserves input order, keeps duplicates, silently drops ids with
/// no catalog entry. The result is never longer than the input.
pub fn tag_names_by_ids(ids: &[i64], tags: &[Tag]) -> Vec<String> {
    let by_id: HashMap<i64, &str> = tags.iter().map(|t| (t.id, t.name.as_str())).collect();
    ids.iter()
        .filter_map(|id| by_id.get(id).map(|name| name.to_string()))
        .collect()
}

/// Join rows owned by one project, by strict id equality
pub fn relations_for_project<'a>(
    relations: &'a [ProjectArticleRelation],
    project_id: &str,
) -> Vec<&'a ProjectArticleRelation> {
    relations
        .iter()
        .filter(|r| r.projects_id == project_id)
        .collect()
}

fn group_tag_ids(relations: &[ArticleTagRelation]) -> HashMap<&str, Vec<i64>> {
    let mut grouped: HashMap<&str, Vec<i64>> = HashMap::new();
    for relation in relations {
        grouped
            .entry(relation.articles_id.as_str())
            .or_default()
            .push(relation.tags_id);
    }
    grouped
}

fn merge_article_translations(articles: &mut [Article], translations: Vec<ArticleTranslation>) {
    let mut by_parent: HashMap<String, ArticleTranslation> = translations
        .into_iter()
        .map(|t| (t.articles_id.clone(), t))
        .collect();
    for article in articles {
        if let Some(translation) = by_parent.remove(&article.id) {
            apply_article_translation(article, translation);
        }
    }
}

fn apply_article_translation(article: &mut Article, translation: ArticleTranslation) {
    article.title = translation.title;
    article.summary = translation.summary;
    article.content = translation.content;
    article.cover_image = translation.cover_image;
    article.languages_code = Some(translation.languages_code);
}

fn merge_project_translations(projects: &mut [Project], translations: Vec<ProjectTranslation>) {
    let mut by_parent: HashMap<String, ProjectTranslation> = translations
        .into_iter()
        .map(|t| (t.projects_id.clone(), t))
        .collect();
    for project in projects {
        if let Some(translation) = by_parent.remove(&project.id) {
            apply_project_translation(project, translation);
        }
    }
}

fn apply_project_translation(project: &mut Project, translation: ProjectTranslation) {
    project.title = translation.title;
    project.summary = translation.summary;
    project.content = translation.content;
    project.cover_image = translation.cover_image;
    project.languages_code = Some(translation.languages_code);
}

/// Stable descending sort by creation date; undated entries sort last and
/// equal timestamps keep their fetch order.
fn sort_newest_first<T>(items: &mut [T], created: impl Fn(&T) -> Option<&str>) {
    items.sort_by(|a, b| {
        let ka = created(a).and_then(date::parse_cms_date);
        let kb = created(b).and_then(date::parse_cms_date);
        kb.cmp(&ka)
    });
}
