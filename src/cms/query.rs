//! Backend-neutral query description for "read items from collection" calls

/// Query options for a collection read: field projection, equality filters,
/// sort, pagination, and an optional locale hint.
///
/// A leading `-` on the sort key means descending, mirroring the Directus
/// convention; the Strapi adapter translates it to `field:desc`.
#[derive(Debug, Clone, Default)]
pub struct ItemsQuery {
    pub fields: Vec<String>,
    pub filters: Vec<(String, String)>,
    pub sort: Option<String>,
    pub limit: Option<usize>,
    pub page: Option<usize>,
    pub locale: Option<String>,
}

impl ItemsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the response to the given fields
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Require `field == value`. Multiple filters are ANDed together.
    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Sort key; prefix with `-` for descending
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Locale hint for backends with native localization (Strapi).
    /// Directus ignores it; translations are separate collections there.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_filters() {
        let query = ItemsQuery::new()
            .fields(["slug", "title"])
            .filter_eq("slug", "my-post")
            .filter_eq("status", "published")
            .sort("-date_created")
            .limit(1);

        assert_eq!(query.fields, vec!["slug", "title"]);
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[1], ("status".to_string(), "published".to_string()));
        assert_eq!(query.sort.as_deref(), Some("-date_created"));
        assert_eq!(query.limit, Some(1));
        assert_eq!(query.page, None);
    }
}
