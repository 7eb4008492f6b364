//! Integration tests for category creation, attachment, and cascade cleanup.
//!
//! These tests need a running PostgreSQL (see test_fixtures) and are ignored
//! by default.

use til_core::{AcronymRepository, CategoryRepository};
use til_db::test_fixtures::TestDatabase;

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_ensure_is_idempotent_on_name() {
    let test_db = TestDatabase::new().await;

    let first = test_db.db.categories.ensure("Networking").await.unwrap();
    let second = test_db.db.categories.ensure("Networking").await.unwrap();

    assert_eq!(first.id, second.id, "ensure must reuse the existing row");

    let all = test_db.db.categories.list().await.unwrap();
    let matching: Vec<_> = all.iter().filter(|c| c.name == "Networking").collect();
    assert_eq!(matching.len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_ensure_is_case_sensitive() {
    let test_db = TestDatabase::new().await;

    let upper = test_db.db.categories.ensure("Funny").await.unwrap();
    let lower = test_db.db.categories.ensure("funny").await.unwrap();

    assert_ne!(upper.id, lower.id, "names differing in case are distinct");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_attach_is_idempotent() {
    let test_db = TestDatabase::new().await;
    let user = test_db.seed_user("attacher").await;
    let acronym = test_db.seed_acronym("OMG", "Oh My God", user.id).await;
    let category = test_db.seed_category("Funny").await;

    test_db
        .db
        .categories
        .attach(acronym.id, category.id)
        .await
        .unwrap();
    test_db
        .db
        .categories
        .attach(acronym.id, category.id)
        .await
        .unwrap();

    let attached = test_db
        .db
        .categories
        .list_for_acronym(acronym.id)
        .await
        .unwrap();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].name, "Funny");

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_detach_is_noop_when_absent() {
    let test_db = TestDatabase::new().await;
    let user = test_db.seed_user("detacher").await;
    let acronym = test_db.seed_acronym("BRB", "Be Right Back", user.id).await;
    let category = test_db.seed_category("Chat").await;

    // Never attached; detach must not fail.
    test_db
        .db
        .categories
        .detach(acronym.id, category.id)
        .await
        .unwrap();

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_deleting_acronym_cascades_associations() {
    let test_db = TestDatabase::new().await;
    let user = test_db.seed_user("cascade").await;
    let acronym = test_db.seed_acronym("TIL", "Today I Learned", user.id).await;
    let category = test_db.seed_category("Meta").await;

    test_db
        .db
        .categories
        .attach(acronym.id, category.id)
        .await
        .unwrap();
    test_db.db.acronyms.delete(acronym.id).await.unwrap();

    // The category row survives; only the join row is gone.
    let survivors = test_db
        .db
        .categories
        .list_acronyms(category.id)
        .await
        .unwrap();
    assert!(survivors.is_empty());
    assert!(test_db
        .db
        .categories
        .find_by_id(category.id)
        .await
        .unwrap()
        .is_some());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_detaching_leaves_category_row() {
    let test_db = TestDatabase::new().await;
    let user = test_db.seed_user("keeper").await;
    let acronym = test_db.seed_acronym("FYI", "For Your Information", user.id).await;
    let category = test_db.seed_category("Work").await;

    test_db
        .db
        .categories
        .attach(acronym.id, category.id)
        .await
        .unwrap();
    test_db
        .db
        .categories
        .detach(acronym.id, category.id)
        .await
        .unwrap();

    let attached = test_db
        .db
        .categories
        .list_for_acronym(acronym.id)
        .await
        .unwrap();
    assert!(attached.is_empty());
    assert!(test_db
        .db
        .categories
        .find_by_name("Work")
        .await
        .unwrap()
        .is_some());

    test_db.cleanup().await;
}
