//! Likes, bookmarks, shares and views.
//!
//! Each action writes its join row and adjusts the post counter in one
//! transaction. Duplicate likes and bookmarks are caught by the unique
//! constraint on (post_id, user_id), never by a prior existence check.

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use studio_common::{Actor, SharePlatform};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{duplicate_on_conflict, DomainError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reaction {
    Like,
    Bookmark,
}

impl Reaction {
    fn table(self) -> &'static str {
        match self {
            Reaction::Like => "blog_post_likes",
            Reaction::Bookmark => "blog_post_bookmarks",
        }
    }

    fn counter(self) -> &'static str {
        match self {
            Reaction::Like => "like_count",
            Reaction::Bookmark => "bookmark_count",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Reaction::Like => "liked",
            Reaction::Bookmark => "bookmarked",
        }
    }
}

/// Fail with `NotFound` unless the post exists and is visible now. Locks the row.
async fn lock_published_post(post_id: Uuid, tx: &mut Transaction<'_, Postgres>) -> Result<()> {
    sqlx::query_as::<_, (Uuid,)>(
        r#"
        SELECT id FROM blog_posts
        WHERE id = $1 AND status = 'published' AND published_at <= NOW()
        FOR UPDATE
        "#,
    )
    .bind(post_id)
    .fetch_optional(&mut **tx)
    .await?
    .map(|_| ())
    .ok_or_else(|| DomainError::not_found("post", post_id))
}

async fn bump_counter(
    post_id: Uuid,
    counter: &str,
    delta: i64,
    tx: &mut Transaction<'_, Postgres>,
) -> Result<i64> {
    let (count,) = sqlx::query_as::<_, (i64,)>(&format!(
        "UPDATE blog_posts SET {counter} = GREATEST({counter} + $2, 0) WHERE id = $1 RETURNING {counter}"
    ))
    .bind(post_id)
    .bind(delta)
    .fetch_one(&mut **tx)
    .await?;
    Ok(count)
}

async fn add_reaction(
    reaction: Reaction,
    post_id: Uuid,
    actor: &Actor,
    ip_address: Option<&str>,
    pool: &PgPool,
) -> Result<i64> {
    let user_id = actor.require_user()?;
    let mut tx = pool.begin().await?;
    lock_published_post(post_id, &mut tx).await?;

    let inserted = sqlx::query(&format!(
        "INSERT INTO {} (post_id, user_id, ip_address) VALUES ($1, $2, $3)",
        reaction.table()
    ))
    .bind(post_id)
    .bind(user_id)
    .bind(ip_address)
    .execute(&mut *tx)
    .await
    .map_err(duplicate_on_conflict(&format!("post already {}", reaction.verb())));

    if let Err(DomainError::DuplicateAction(msg)) = &inserted {
        warn!(%post_id, %user_id, "Rejected duplicate action: {msg}");
    }
    inserted?;

    let count = bump_counter(post_id, reaction.counter(), 1, &mut tx).await?;
    tx.commit().await?;

    info!(%post_id, %user_id, count, "Post {}", reaction.verb());
    Ok(count)
}

async fn remove_reaction(reaction: Reaction, post_id: Uuid, actor: &Actor, pool: &PgPool) -> Result<i64> {
    let user_id = actor.require_user()?;
    let mut tx = pool.begin().await?;

    let removed = sqlx::query(&format!(
        "DELETE FROM {} WHERE post_id = $1 AND user_id = $2",
        reaction.table()
    ))
    .bind(post_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if removed.rows_affected() == 0 {
        return Err(DomainError::Validation(format!("post not {}", reaction.verb())));
    }

    let count = bump_counter(post_id, reaction.counter(), -1, &mut tx).await?;
    tx.commit().await?;
    Ok(count)
}

/// Like a post. Returns the new like count.
pub async fn like(post_id: Uuid, actor: &Actor, ip_address: Option<&str>, pool: &PgPool) -> Result<i64> {
    add_reaction(Reaction::Like, post_id, actor, ip_address, pool).await
}

pub async fn unlike(post_id: Uuid, actor: &Actor, pool: &PgPool) -> Result<i64> {
    remove_reaction(Reaction::Like, post_id, actor, pool).await
}

/// Bookmark a post. Returns the new bookmark count.
pub async fn bookmark(
    post_id: Uuid,
    actor: &Actor,
    ip_address: Option<&str>,
    pool: &PgPool,
) -> Result<i64> {
    add_reaction(Reaction::Bookmark, post_id, actor, ip_address, pool).await
}

pub async fn unbookmark(post_id: Uuid, actor: &Actor, pool: &PgPool) -> Result<i64> {
    remove_reaction(Reaction::Bookmark, post_id, actor, pool).await
}

fn anonymous_identity(actor: &Actor) -> (Option<Uuid>, Option<&str>, Option<&str>) {
    match actor {
        Actor::Anonymous { ip, session_key } => (None, ip.as_deref(), session_key.as_deref()),
        other => (other.user_id(), None, None),
    }
}

/// Record a share. Shares are append-only. Returns the new share count.
pub async fn share(post_id: Uuid, actor: &Actor, platform: SharePlatform, pool: &PgPool) -> Result<i64> {
    let (user_id, ip, session_key) = anonymous_identity(actor);
    let mut tx = pool.begin().await?;
    lock_published_post(post_id, &mut tx).await?;

    sqlx::query(
        r#"
        INSERT INTO blog_post_shares (post_id, user_id, ip_address, session_key, platform)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(ip)
    .bind(session_key)
    .bind(platform.as_str())
    .execute(&mut *tx)
    .await?;

    let count = bump_counter(post_id, "share_count", 1, &mut tx).await?;
    tx.commit().await?;

    info!(%post_id, %platform, count, "Post shared");
    Ok(count)
}

/// Record a view. Anonymous viewers need an IP or a session key.
pub async fn record_view(
    post_id: Uuid,
    actor: &Actor,
    user_agent: &str,
    referrer: &str,
    pool: &PgPool,
) -> Result<i64> {
    let (user_id, ip, session_key) = anonymous_identity(actor);
    if user_id.is_none() && ip.is_none() && session_key.is_none() {
        return Err(DomainError::Validation(
            "anonymous views need an ip address or session key".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;
    lock_published_post(post_id, &mut tx).await?;

    sqlx::query(
        r#"
        INSERT INTO blog_post_views (post_id, user_id, ip_address, session_key, user_agent, referrer)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(ip)
    .bind(session_key)
    .bind(user_agent)
    .bind(referrer)
    .execute(&mut *tx)
    .await?;

    let count = bump_counter(post_id, "view_count", 1, &mut tx).await?;
    tx.commit().await?;
    Ok(count)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInteractions {
    pub liked_post_ids: Vec<Uuid>,
    pub bookmarked_post_ids: Vec<Uuid>,
    pub liked_count: usize,
    pub bookmarked_count: usize,
}

pub async fn user_interactions(user_id: Uuid, pool: &PgPool) -> Result<UserInteractions> {
    let liked: Vec<(Uuid,)> =
        sqlx::query_as("SELECT post_id FROM blog_post_likes WHERE user_id = $1 ORDER BY liked_at DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await?;
    let bookmarked: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT post_id FROM blog_post_bookmarks WHERE user_id = $1 ORDER BY bookmarked_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let liked_post_ids: Vec<Uuid> = liked.into_iter().map(|(id,)| id).collect();
    let bookmarked_post_ids: Vec<Uuid> = bookmarked.into_iter().map(|(id,)| id).collect();
    Ok(UserInteractions {
        liked_count: liked_post_ids.len(),
        bookmarked_count: bookmarked_post_ids.len(),
        liked_post_ids,
        bookmarked_post_ids,
    })
}
