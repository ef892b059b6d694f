//! Shared setup for the Postgres integration tests.
//!
//! Fixtures use unique slugs and user ids so tests in one binary can run
//! against the same database without truncating each other's rows.

#![allow(dead_code)]

use sqlx::PgPool;
use studio_common::{Actor, ContentStatus, FileConfig, NewPost};
use studio_domains::blog::BlogPost;
use studio_domains::StudioDeps;
use uuid::Uuid;

/// Connect and migrate, or `None` when no test database is configured.
pub async fn test_deps() -> Option<StudioDeps> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("studio_domains=debug,studio_common=debug")
        .with_test_writer()
        .try_init();

    let url = std::env::var("DATABASE_TEST_URL").ok()?;
    let pool = PgPool::connect(&url).await.ok()?;
    let deps = StudioDeps::from_pool(pool, FileConfig::default()).ok()?;
    deps.migrate().await.ok()?;
    Some(deps)
}

pub fn unique(prefix: &str) -> String {
    format!("{prefix} {}", Uuid::new_v4().simple())
}

pub fn member() -> Actor {
    Actor::Member {
        user_id: Uuid::new_v4(),
    }
}

pub fn staff() -> Actor {
    Actor::Staff {
        user_id: Uuid::new_v4(),
    }
}

/// Insert a post and publish it.
pub async fn published_post(new: NewPost, pool: &PgPool) -> BlogPost {
    let post = BlogPost::create(&new, pool).await.unwrap();
    BlogPost::set_status(post.id, ContentStatus::Published, pool)
        .await
        .unwrap()
}

pub async fn simple_post(pool: &PgPool) -> BlogPost {
    let new = NewPost::new(&unique("Post"), "some words to read", Uuid::new_v4()).unwrap();
    published_post(new, pool).await
}
