use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::slugify;

/// A reference to a row in the category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

/// Category of a content item, resolved once when a row is loaded.
///
/// Older posts carry a free-text category string; newer ones reference the
/// category table. Items with neither are `Unset` and never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Category {
    Migrated(CategoryRef),
    /// Slugified legacy category string.
    Legacy(String),
    #[default]
    Unset,
}

impl Category {
    /// Prefer the category reference, fall back to the legacy string.
    pub fn resolve(reference: Option<CategoryRef>, legacy: Option<&str>) -> Self {
        match (reference, legacy) {
            (Some(r), _) => Category::Migrated(r),
            (None, Some(raw)) => Category::legacy(raw),
            (None, None) => Category::Unset,
        }
    }

    pub fn legacy(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Category::Unset
        } else {
            Category::Legacy(slugify(raw))
        }
    }

    /// Comparison key: the reference slug or the slugified legacy value.
    pub fn key(&self) -> Option<&str> {
        match self {
            Category::Migrated(r) => Some(r.slug.as_str()),
            Category::Legacy(slug) => Some(slug.as_str()),
            Category::Unset => None,
        }
    }

    pub fn matches(&self, other: &Category) -> bool {
        match (self.key(), other.key()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            Category::Migrated(r) => Some(r.id),
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Category::Unset)
    }
}
