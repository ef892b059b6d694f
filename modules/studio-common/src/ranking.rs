//! Related-content ranking.
//!
//! Candidates are bucketed into four tiers and filled in tier order:
//!
//! 1. same category and at least one shared tag
//! 2. same category
//! 3. at least one shared tag
//! 4. any other published item
//!
//! Tiers 1-3 order by views then recency. Tier 4 orders by views, likes,
//! then recency. Ties fall back to id so results are stable.

use std::cmp::{Ordering, Reverse};
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::category::Category;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popularity {
    pub views: i64,
    pub likes: i64,
}

/// Anything that can be recommended next to another item of the same kind.
pub trait Rankable {
    fn rank_id(&self) -> Uuid;
    fn category(&self) -> &Category;
    fn tags(&self) -> &[String];
    fn popularity(&self) -> Popularity;
    fn published_at(&self) -> Option<DateTime<Utc>>;
    fn is_published(&self) -> bool;
}

/// Plain ranking record, for callers that already hold projected rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub category: Category,
    pub tags: Vec<String>,
    pub popularity: Popularity,
    pub published_at: Option<DateTime<Utc>>,
    pub published: bool,
}

impl Rankable for ContentItem {
    fn rank_id(&self) -> Uuid {
        self.id
    }
    fn category(&self) -> &Category {
        &self.category
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
    fn popularity(&self) -> Popularity {
        self.popularity
    }
    fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }
    fn is_published(&self) -> bool {
        self.published
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub default_limit: usize,
    /// How many published candidates the persistence layer loads per query.
    pub candidate_pool_size: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_limit: 3,
            candidate_pool_size: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    CategoryAndTags,
    Category,
    Tags,
    Fallback,
}

fn tag_set<T: Rankable + ?Sized>(item: &T) -> HashSet<String> {
    item.tags()
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn classify<T: Rankable + ?Sized>(item: &T, tags: &HashSet<String>, candidate: &T) -> Tier {
    let same_category = item.category().matches(candidate.category());
    let shares_tag = !tags.is_empty()
        && candidate
            .tags()
            .iter()
            .any(|t| tags.contains(&t.trim().to_lowercase()));
    match (same_category, shares_tag) {
        (true, true) => Tier::CategoryAndTags,
        (true, false) => Tier::Category,
        (false, true) => Tier::Tags,
        (false, false) => Tier::Fallback,
    }
}

fn compare<T: Rankable + ?Sized>(tier: Tier, a: &T, b: &T) -> Ordering {
    let (pa, pb) = (a.popularity(), b.popularity());
    let by_views = Reverse(pa.views).cmp(&Reverse(pb.views));
    let by_likes = if tier == Tier::Fallback {
        Reverse(pa.likes).cmp(&Reverse(pb.likes))
    } else {
        Ordering::Equal
    };
    by_views
        .then(by_likes)
        .then_with(|| Reverse(a.published_at()).cmp(&Reverse(b.published_at())))
        .then_with(|| a.rank_id().cmp(&b.rank_id()))
}

/// Up to `limit` items from `pool` related to `item`, best first.
///
/// Never returns `item` itself, unpublished candidates, or the same id twice.
pub fn related<'a, T: Rankable>(item: &T, pool: &'a [T], limit: usize) -> Vec<&'a T> {
    if limit == 0 || pool.is_empty() {
        return Vec::new();
    }

    let tags = tag_set(item);
    let mut seen = HashSet::new();
    seen.insert(item.rank_id());

    let mut ranked: Vec<(Tier, &'a T)> = pool
        .iter()
        .filter(|c| c.is_published())
        .filter(|c| seen.insert(c.rank_id()))
        .map(|c| (classify(item, &tags, c), c))
        .collect();

    ranked.sort_by(|(ta, a), (tb, b)| ta.cmp(tb).then_with(|| compare(*ta, *a, *b)));
    ranked.truncate(limit);

    debug!(
        item = %item.rank_id(),
        limit,
        category_and_tags = ranked.iter().filter(|(t, _)| *t == Tier::CategoryAndTags).count(),
        category = ranked.iter().filter(|(t, _)| *t == Tier::Category).count(),
        tags = ranked.iter().filter(|(t, _)| *t == Tier::Tags).count(),
        fallback = ranked.iter().filter(|(t, _)| *t == Tier::Fallback).count(),
        "related content ranked"
    );

    ranked.into_iter().map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(category: &str, tags: &[&str], views: i64) -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            category: Category::legacy(category),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            popularity: Popularity { views, likes: 0 },
            published_at: Some(Utc::now()),
            published: true,
        }
    }

    #[test]
    fn tiers_fill_in_order() {
        let source = item("django", &["python", "orm"], 0);
        let fallback = item("design", &["figma"], 1000);
        let tags_only = item("devops", &["Python "], 500);
        let category_only = item("django", &["celery"], 100);
        let both = item("django", &["orm"], 1);
        let pool = vec![fallback.clone(), tags_only.clone(), category_only.clone(), both.clone()];

        let ids: Vec<Uuid> = related(&source, &pool, 4).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![both.id, category_only.id, tags_only.id, fallback.id]);
    }

    #[test]
    fn limit_one_prefers_category_and_tag_overlap() {
        let source = item("django", &["orm"], 0);
        let category_only = item("django", &[], 10_000);
        let both = item("django", &["ORM"], 0);
        let pool = vec![category_only, both.clone()];
        let result = related(&source, &pool, 1);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, both.id);
    }

    #[test]
    fn excludes_source_duplicates_and_drafts() {
        let source = item("django", &["orm"], 0);
        let mut draft = item("django", &["orm"], 50);
        draft.published = false;
        let other = item("django", &["orm"], 5);
        let pool = vec![source.clone(), other.clone(), other.clone(), draft];

        let result = related(&source, &pool, 10);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, other.id);
    }

    #[test]
    fn empty_pool_and_zero_limit() {
        let source = item("django", &[], 0);
        assert!(related(&source, &[], 3).is_empty());
        assert!(related(&source, &[item("django", &[], 0)], 0).is_empty());
    }

    #[test]
    fn unset_category_and_no_tags_fall_through_to_popularity() {
        let mut source = item("", &[], 0);
        source.category = Category::Unset;
        let mut older = item("", &[], 10);
        older.category = Category::Unset;
        older.popularity.likes = 1;
        let mut liked = item("", &[], 10);
        liked.category = Category::Unset;
        liked.popularity.likes = 9;
        let quiet = item("ops", &["x"], 1);

        let pool = vec![quiet.clone(), older.clone(), liked.clone()];
        let ids: Vec<Uuid> = related(&source, &pool, 3).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![liked.id, older.id, quiet.id]);
    }

    #[test]
    fn recency_breaks_view_ties() {
        let source = item("django", &[], 0);
        let mut old = item("django", &[], 7);
        old.published_at = Some(Utc::now() - Duration::days(30));
        let new = item("django", &[], 7);
        let pool = vec![old.clone(), new.clone()];
        let ids: Vec<Uuid> = related(&source, &pool, 2).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![new.id, old.id]);
    }
}
