//! Content models as served by the CMS
//!
//! Field names follow the Directus schema (`summary`, `cover_image`,
//! `date_created`); the Strapi adapter normalizes its payloads to the same
//! shape before rows reach these types. Everything derives
//! `#[serde(default)]` so sparse rows from a field-projected query never
//! fail to decode.

use serde::{Deserialize, Serialize};

/// A blog article.
///
/// Display fields (`title`, `summary`, `content`, `cover_image`) are `None`
/// until a translation row for the requested locale is merged in; an
/// article with no matching translation keeps its base fields only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: String,
    pub slug: String,
    pub status: String,
    pub date_created: Option<String>,

    // Filled in by the translation merge
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub languages_code: Option<String>,

    /// Tag ids as stored on the row (relation row ids resolved separately)
    pub tags: Vec<i64>,
    /// Denormalized tag names, attached during enrichment
    #[serde(skip_deserializing)]
    pub tag_names: Vec<String>,
    /// Human-readable creation date, attached during enrichment
    #[serde(skip_deserializing)]
    pub date_display: Option<String>,
}

/// A portfolio project. Same translation pattern as [`Article`], plus a
/// repository link and a gallery asset id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub slug: String,
    pub status: String,
    pub date_created: Option<String>,
    pub link_repo: Option<String>,
    pub gallery: Option<String>,

    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub languages_code: Option<String>,

    pub tags: Vec<i64>,
    #[serde(skip_deserializing)]
    pub tag_names: Vec<String>,
    #[serde(skip_deserializing)]
    pub date_display: Option<String>,
}

/// A content tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// One locale's display fields for an article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleTranslation {
    pub id: i64,
    pub articles_id: String,
    pub languages_code: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
}

/// One locale's display fields for a project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectTranslation {
    pub id: i64,
    pub projects_id: String,
    pub languages_code: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
}

/// Article ↔ tag join row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleTagRelation {
    pub id: i64,
    pub articles_id: String,
    pub tags_id: i64,
}

/// Project ↔ tag join row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectTagRelation {
    pub id: i64,
    pub projects_id: String,
    pub tags_id: i64,
}

/// Project ↔ article join row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectArticleRelation {
    pub id: i64,
    pub projects_id: String,
    pub articles_id: String,
}

/// Project ↔ gallery file join row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFileRelation {
    pub id: i64,
    pub projects_slug: String,
    pub directus_files_id: String,
}

/// An entry on the links page, ordered by its numeric-string `position`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub position: Option<String>,
    pub color: Option<String>,
    pub featured: Option<bool>,
    pub description: Option<String>,
}

impl Link {
    /// Numeric sort key; malformed or missing positions sort first
    pub fn position_key(&self) -> i64 {
        self.position
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0)
    }
}
