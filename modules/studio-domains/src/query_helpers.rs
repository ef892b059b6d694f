use serde::{Deserialize, Serialize};
use studio_common::content::slugify;
use studio_common::Difficulty;

/// Optional filters for published post listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFilters {
    /// Matches the category table slug or the slugified legacy category.
    pub category_slug: Option<String>,
    /// Posts carrying any of these tags.
    pub tags: Vec<String>,
    pub difficulty: Option<Difficulty>,
    pub featured_only: bool,
    /// Case-insensitive match on title, excerpt and body.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PostFilters {
    /// Parse a comma-separated tag list, e.g. from a query string.
    pub fn with_tag_list(mut self, tags: &str) -> Self {
        self.tags = tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        self
    }
}

pub const MAX_PAGE_SIZE: i64 = 100;

/// Append `AND ...` clauses for every set filter. `alias` is the SQL alias of
/// `blog_posts` and `category_alias` that of the joined `blog_categories`.
pub fn append_post_filters(
    qb: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>,
    filters: &PostFilters,
    alias: &str,
    category_alias: &str,
) {
    if let Some(slug) = filters.category_slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let slug = slugify(slug);
        qb.push(format!(" AND ({category_alias}.slug = "));
        qb.push_bind(slug.clone());
        qb.push(format!(" OR ({alias}.category_id IS NULL AND {alias}.legacy_category = "));
        qb.push_bind(slug);
        qb.push(")) ");
    }

    if !filters.tags.is_empty() {
        qb.push(format!(" AND {alias}.tags && "));
        qb.push_bind(filters.tags.clone());
        qb.push(" ");
    }

    if let Some(difficulty) = filters.difficulty {
        qb.push(format!(" AND {alias}.difficulty = "));
        qb.push_bind(difficulty.as_str());
        qb.push(" ");
    }

    if filters.featured_only {
        qb.push(format!(" AND {alias}.is_featured "));
    }

    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(format!(" AND ({alias}.title ILIKE "));
        qb.push_bind(pattern.clone());
        qb.push(format!(" OR {alias}.excerpt ILIKE "));
        qb.push_bind(pattern.clone());
        qb.push(format!(" OR {alias}.body ILIKE "));
        qb.push_bind(pattern);
        qb.push(") ");
    }
}

/// Append `LIMIT`/`OFFSET`, capping the page size.
pub fn append_pagination(
    qb: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>,
    limit: Option<i64>,
    offset: Option<i64>,
) {
    let limit = limit.unwrap_or(20).clamp(1, MAX_PAGE_SIZE);
    qb.push(" LIMIT ");
    qb.push_bind(limit);
    if let Some(offset) = offset.filter(|o| *o > 0) {
        qb.push(" OFFSET ");
        qb.push_bind(offset);
    }
}

/// Optional filters for resource listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceFilters {
    pub type_slug: Option<String>,
    pub category_slug: Option<String>,
    /// Resources carrying any of these tags.
    pub tags: Vec<String>,
    pub featured_only: bool,
    pub premium: Option<bool>,
    /// Case-insensitive match on title, description and author.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

/// Append `AND ...` clauses for every set resource filter. `alias`,
/// `type_alias` and `category_alias` name the joined tables.
pub fn append_resource_filters(
    qb: &mut sqlx::QueryBuilder<'_, sqlx::Postgres>,
    filters: &ResourceFilters,
    alias: &str,
    type_alias: &str,
    category_alias: &str,
) {
    if let Some(slug) = filters.type_slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(format!(" AND {type_alias}.slug = "));
        qb.push_bind(slugify(slug));
        qb.push(" ");
    }

    if let Some(slug) = filters.category_slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(format!(" AND {category_alias}.slug = "));
        qb.push_bind(slugify(slug));
        qb.push(" ");
    }

    if !filters.tags.is_empty() {
        qb.push(format!(" AND {alias}.tags && "));
        qb.push_bind(filters.tags.clone());
        qb.push(" ");
    }

    if filters.featured_only {
        qb.push(format!(" AND {alias}.is_featured "));
    }

    if let Some(premium) = filters.premium {
        qb.push(format!(" AND {alias}.is_premium = "));
        qb.push_bind(premium);
        qb.push(" ");
    }

    if let Some(term) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(format!(" AND ({alias}.title ILIKE "));
        qb.push_bind(pattern.clone());
        qb.push(format!(" OR {alias}.description ILIKE "));
        qb.push_bind(pattern.clone());
        qb.push(format!(" OR {alias}.author ILIKE "));
        qb.push_bind(pattern);
        qb.push(") ");
    }
}

/// A row count as a SQL `LIMIT` bind. Saturates instead of wrapping negative.
pub fn sql_limit(size: usize) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}
