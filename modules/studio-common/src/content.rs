//! Publishable content: slugs, reading time, lifecycle, and the factories that
//! derive those values before a record is ever written.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::Category;
use crate::error::{StudioError, StudioResult};
use crate::types::Difficulty;

/// Average adult reading speed used for reading time estimates.
pub const WORDS_PER_MINUTE: u32 = 200;

static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Lowercase ASCII slug. Runs of anything else collapse to a single `-`.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = NON_SLUG_RE.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug.to_string()
    }
}

pub fn word_count(body: &str) -> u32 {
    body.split_whitespace().count() as u32
}

/// Minutes to read `words` words, rounded, never less than one.
pub fn reading_time_minutes(words: u32) -> u32 {
    let minutes = (words as f64 / WORDS_PER_MINUTE as f64).round() as u32;
    minutes.max(1)
}

/// Trim, drop empties, de-duplicate case-insensitively while keeping first spelling.
pub fn clean_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

choice_enum! {
    pub enum ContentStatus {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
}

/// Result of a validated lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub status: ContentStatus,
    pub published_at: Option<DateTime<Utc>>,
}

impl ContentStatus {
    pub fn can_transition_to(&self, to: ContentStatus) -> bool {
        use ContentStatus::*;
        matches!(
            (self, to),
            (Draft, Published) | (Draft, Archived) | (Published, Archived) | (Archived, Draft)
        )
    }

    /// Validate a transition. Publishing stamps `now` unless the item was
    /// already stamped; other transitions keep the existing stamp.
    pub fn transition(
        &self,
        to: ContentStatus,
        published_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> StudioResult<StatusChange> {
        if !self.can_transition_to(to) {
            return Err(StudioError::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            });
        }
        let published_at = match to {
            ContentStatus::Published => Some(published_at.unwrap_or(now)),
            _ => published_at,
        };
        Ok(StatusChange {
            status: to,
            published_at,
        })
    }
}

/// A blog post ready to insert. Slug, word count and reading time are
/// derived from the title and body at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    title: String,
    slug: String,
    body: String,
    summary: String,
    excerpt: String,
    author_id: Uuid,
    category: Category,
    tags: Vec<String>,
    difficulty: Difficulty,
    is_featured: bool,
    word_count: u32,
    reading_time: u32,
}

impl NewPost {
    pub fn new(title: &str, body: &str, author_id: Uuid) -> StudioResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StudioError::Validation("title is required".to_string()));
        }
        if body.trim().is_empty() {
            return Err(StudioError::Validation("body is required".to_string()));
        }
        let words = word_count(body);
        Ok(Self {
            title: title.to_string(),
            slug: slugify(title),
            body: body.to_string(),
            summary: String::new(),
            excerpt: String::new(),
            author_id,
            category: Category::Unset,
            tags: Vec::new(),
            difficulty: Difficulty::default(),
            is_featured: false,
            word_count: words,
            reading_time: reading_time_minutes(words),
        })
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = clean_tags(tags);
        self
    }

    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = summary.trim().to_string();
        self
    }

    pub fn with_excerpt(mut self, excerpt: &str) -> Self {
        self.excerpt = excerpt.trim().to_string();
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn featured(mut self) -> Self {
        self.is_featured = true;
        self
    }

    /// Replace the derived slug, e.g. to resolve a collision.
    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = slugify(slug);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn slug(&self) -> &str {
        &self.slug
    }
    pub fn body(&self) -> &str {
        &self.body
    }
    pub fn summary(&self) -> &str {
        &self.summary
    }
    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }
    pub fn author_id(&self) -> Uuid {
        self.author_id
    }
    pub fn category(&self) -> &Category {
        &self.category
    }
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
    pub fn is_featured(&self) -> bool {
        self.is_featured
    }
    pub fn word_count(&self) -> u32 {
        self.word_count
    }
    pub fn reading_time(&self) -> u32 {
        self.reading_time
    }
}

/// A portfolio project or case study ready to insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShowcase {
    title: String,
    slug: String,
    summary: String,
    description: String,
    category: Option<String>,
    client: String,
    client_industry: String,
    technologies: Vec<String>,
    tools: Vec<String>,
    is_featured: bool,
    sort_order: i32,
    reading_time: u32,
}

impl NewShowcase {
    /// `summary` is the short pitch; reading time comes from `description`.
    pub fn new(title: &str, summary: &str, description: &str) -> StudioResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StudioError::Validation("title is required".to_string()));
        }
        Ok(Self {
            title: title.to_string(),
            slug: slugify(title),
            summary: summary.trim().to_string(),
            description: description.to_string(),
            category: None,
            client: String::new(),
            client_industry: String::new(),
            technologies: Vec::new(),
            tools: Vec::new(),
            is_featured: false,
            sort_order: 0,
            reading_time: reading_time_minutes(word_count(description)),
        })
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = match Category::legacy(category) {
            Category::Legacy(slug) => Some(slug),
            _ => None,
        };
        self
    }

    pub fn with_client(mut self, client: &str, industry: &str) -> Self {
        self.client = client.trim().to_string();
        self.client_industry = industry.trim().to_string();
        self
    }

    pub fn with_technologies<I, S>(mut self, technologies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.technologies = clean_tags(technologies);
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tools = clean_tags(tools);
        self
    }

    pub fn featured(mut self, sort_order: i32) -> Self {
        self.is_featured = true;
        self.sort_order = sort_order;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn slug(&self) -> &str {
        &self.slug
    }
    pub fn summary(&self) -> &str {
        &self.summary
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
    pub fn client(&self) -> &str {
        &self.client
    }
    pub fn client_industry(&self) -> &str {
        &self.client_industry
    }
    pub fn technologies(&self) -> &[String] {
        &self.technologies
    }
    pub fn tools(&self) -> &[String] {
        &self.tools
    }
    pub fn is_featured(&self) -> bool {
        self.is_featured
    }
    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }
    pub fn reading_time(&self) -> u32 {
        self.reading_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Hello, World!  Rust & Django"), "hello-world-rust-django");
        assert_eq!(slugify("  --  "), "untitled");
        assert_eq!(slugify("Ünïcode Title"), "n-code-title");
    }

    #[test]
    fn reading_time_rounds_and_floors_at_one() {
        assert_eq!(reading_time_minutes(0), 1);
        assert_eq!(reading_time_minutes(99), 1);
        assert_eq!(reading_time_minutes(300), 2);
        assert_eq!(reading_time_minutes(1000), 5);
    }

    #[test]
    fn new_post_derives_slug_and_reading_time() {
        let body = "word ".repeat(450);
        let post = NewPost::new("Scaling Django to a Million Users", &body, Uuid::new_v4())
            .unwrap()
            .with_tags(["django", " Django ", "", "scaling"]);
        assert_eq!(post.slug(), "scaling-django-to-a-million-users");
        assert_eq!(post.word_count(), 450);
        assert_eq!(post.reading_time(), 2);
        assert_eq!(post.tags(), &["django".to_string(), "scaling".to_string()]);
    }

    #[test]
    fn new_post_requires_title_and_body() {
        assert!(NewPost::new("  ", "body", Uuid::new_v4()).is_err());
        assert!(NewPost::new("Title", " ", Uuid::new_v4()).is_err());
    }

    #[test]
    fn publishing_stamps_once() {
        let now = Utc::now();
        let change = ContentStatus::Draft
            .transition(ContentStatus::Published, None, now)
            .unwrap();
        assert_eq!(change.published_at, Some(now));

        let earlier = now - chrono::Duration::days(3);
        let change = ContentStatus::Draft
            .transition(ContentStatus::Published, Some(earlier), now)
            .unwrap();
        assert_eq!(change.published_at, Some(earlier));
    }

    #[test]
    fn archive_keeps_stamp_and_invalid_moves_fail() {
        let now = Utc::now();
        let change = ContentStatus::Published
            .transition(ContentStatus::Archived, Some(now), now)
            .unwrap();
        assert_eq!(change.published_at, Some(now));

        let err = ContentStatus::Archived
            .transition(ContentStatus::Published, None, now)
            .unwrap_err();
        assert!(matches!(err, StudioError::InvalidTransition { .. }));
    }

    #[test]
    fn showcase_category_is_slugified() {
        let item = NewShowcase::new("Shop Rebuild", "pitch", "long text")
            .unwrap()
            .with_category("E-Commerce");
        assert_eq!(item.category(), Some("e-commerce"));
        assert_eq!(item.slug(), "shop-rebuild");
    }
}
