//! Integration tests for downloadable resources.
//! Requires a Postgres instance. Set DATABASE_TEST_URL or these tests are skipped.

mod harness;

use chrono::{Duration, Utc};
use harness::{member, staff, test_deps, unique};
use sqlx::PgPool;
use studio_common::{Actor, StarRating};
use studio_domains::query_helpers::ResourceFilters;
use studio_domains::resources::{
    change_rating, rate, record_download, record_view, NewResource, Resource, ResourceCategory,
    ResourceDownload, ResourceRating, ResourceType, ResourceView,
};
use studio_domains::DomainError;

struct Taxonomy {
    kind: ResourceType,
    category: ResourceCategory,
}

async fn taxonomy(pool: &PgPool) -> Taxonomy {
    Taxonomy {
        kind: ResourceType::create(&unique("Checklist"), Some("ListChecks"), 0, pool).await.unwrap(),
        category: ResourceCategory::create(&unique("Engineering"), "", 0, pool).await.unwrap(),
    }
}

fn new_resource(tax: &Taxonomy, title: &str) -> NewResource {
    NewResource {
        title: unique(title),
        description: "A practical guide".to_string(),
        type_id: tax.kind.id,
        category_id: tax.category.id,
        tags: vec!["django".into(), " Django ".into(), "saas".into()],
        ..Default::default()
    }
}

fn stars(n: i64) -> StarRating {
    StarRating::new(n).unwrap()
}

#[tokio::test]
async fn resources_list_featured_first_within_filters() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();
    let tax = taxonomy(pool).await;

    let plain = Resource::create(&new_resource(&tax, "Plain"), pool).await.unwrap();
    let featured = Resource::create(
        &NewResource {
            is_featured: true,
            ..new_resource(&tax, "Featured")
        },
        pool,
    )
    .await
    .unwrap();
    let scheduled = Resource::create(
        &NewResource {
            published_at: Some(Utc::now() + Duration::days(7)),
            ..new_resource(&tax, "Scheduled")
        },
        pool,
    )
    .await
    .unwrap();
    assert_eq!(plain.tags, vec!["django".to_string(), "saas".to_string()]);
    assert_eq!(plain.author, "Studio Team");

    let filters = ResourceFilters {
        category_slug: Some(tax.category.slug.clone()),
        ..Default::default()
    };
    let ids: Vec<_> = Resource::list(&filters, pool).await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![featured.id, plain.id]);
    assert!(!ids.contains(&scheduled.id));

    let err = Resource::create(
        &NewResource {
            title: plain.title.clone(),
            ..new_resource(&tax, "ignored")
        },
        pool,
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn downloads_and_views_are_counted() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();
    let tax = taxonomy(pool).await;
    let resource = Resource::create(&new_resource(&tax, "Guide"), pool).await.unwrap();

    let anonymous = Actor::Anonymous {
        ip: Some("10.0.0.9".into()),
        session_key: None,
    };
    assert_eq!(record_download(resource.id, &anonymous, "curl", "", pool).await.unwrap(), 1);
    assert_eq!(record_download(resource.id, &member(), "firefox", "/resources", pool).await.unwrap(), 2);
    assert_eq!(record_view(resource.id, &member(), "firefox", "", pool).await.unwrap(), 1);

    assert_eq!(ResourceDownload::count_for_resource(resource.id, pool).await.unwrap(), 2);
    assert_eq!(ResourceView::count_for_resource(resource.id, pool).await.unwrap(), 1);

    Resource::set_active(resource.id, false, pool).await.unwrap();
    let err = record_download(resource.id, &member(), "curl", "", pool).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn one_rating_per_user_and_running_average() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();
    let tax = taxonomy(pool).await;
    let resource = Resource::create(&new_resource(&tax, "Rated"), pool).await.unwrap();

    let first = member();
    let summary = rate(resource.id, &first, stars(5), "great", pool).await.unwrap();
    assert_eq!((summary.count, summary.average()), (1, 5.0));

    let err = rate(resource.id, &first, stars(1), "", pool).await.unwrap_err();
    assert!(matches!(err, DomainError::DuplicateAction(_)));

    let summary = rate(resource.id, &member(), stars(4), "", pool).await.unwrap();
    let summary_after = rate(resource.id, &member(), stars(4), "", pool).await.unwrap();
    assert_eq!(summary.count, 2);
    assert_eq!((summary_after.count, summary_after.average()), (3, 4.33));

    let stored = Resource::find_by_id(resource.id, pool).await.unwrap();
    assert_eq!(stored.rating(), summary_after);

    let anonymous = Actor::Anonymous {
        ip: None,
        session_key: Some("s".into()),
    };
    let err = rate(resource.id, &anonymous, stars(3), "", pool).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn only_the_author_or_staff_can_change_a_rating() {
    let Some(deps) = test_deps().await else {
        return;
    };
    let pool = deps.pool();
    let tax = taxonomy(pool).await;
    let resource = Resource::create(&new_resource(&tax, "Changed"), pool).await.unwrap();

    let author = member();
    rate(resource.id, &author, stars(2), "meh", pool).await.unwrap();
    let rating = ResourceRating::for_resource(resource.id, pool).await.unwrap().remove(0);

    let err = change_rating(rating.id, &member(), stars(5), None, pool).await.unwrap_err();
    assert_eq!(err.status_code(), 403);

    let summary = change_rating(rating.id, &author, stars(4), Some("better"), pool).await.unwrap();
    assert_eq!((summary.count, summary.average()), (1, 4.0));

    let summary = change_rating(rating.id, &staff(), stars(3), None, pool).await.unwrap();
    assert_eq!(summary.total, 3);

    let updated = ResourceRating::find_by_id(rating.id, pool).await.unwrap();
    assert_eq!(updated.rating, 3);
    assert_eq!(updated.comment, "better");
}
