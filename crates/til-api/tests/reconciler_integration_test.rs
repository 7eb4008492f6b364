//! End-to-end reconciliation tests against a live database.
//!
//! Run with `cargo test -- --ignored` after starting the test PostgreSQL
//! instance.

use std::collections::BTreeSet;

use til_api::services::CategoryReconciler;
use til_core::CategoryRepository;
use til_db::test_fixtures::TestDatabase;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

async fn attached_names(test_db: &TestDatabase, acronym_id: uuid::Uuid) -> BTreeSet<String> {
    test_db
        .db
        .categories
        .list_for_acronym(acronym_id)
        .await
        .expect("Failed to list categories")
        .into_iter()
        .map(|c| c.name)
        .collect()
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_reconcile_converges_to_desired_set() {
    let test_db = TestDatabase::new().await;
    let user = test_db.seed_user("reconciler").await;
    let acronym = test_db.seed_acronym("FWIW", "For What It's Worth", user.id).await;

    let funny = test_db.seed_category("Funny").await;
    test_db
        .db
        .categories
        .attach(acronym.id, funny.id)
        .await
        .expect("Failed to attach");

    let reconciler = CategoryReconciler::new(test_db.db.clone());
    let outcome = reconciler
        .reconcile(acronym.id, &names(&["Funny", "Tech"]))
        .await
        .expect("Reconcile failed");

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.removed, 0);
    let attached = attached_names(&test_db, acronym.id).await;
    assert_eq!(attached, BTreeSet::from(["Funny".to_string(), "Tech".to_string()]));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_reconcile_detaches_dropped_names_without_deleting_categories() {
    let test_db = TestDatabase::new().await;
    let user = test_db.seed_user("reconciler").await;
    let acronym = test_db.seed_acronym("BRB", "Be Right Back", user.id).await;

    let reconciler = CategoryReconciler::new(test_db.db.clone());
    reconciler
        .reconcile(acronym.id, &names(&["Funny", "Tech"]))
        .await
        .expect("Reconcile failed");

    let outcome = reconciler
        .reconcile(acronym.id, &names(&["Tech"]))
        .await
        .expect("Reconcile failed");

    assert_eq!(outcome.added, 0);
    assert_eq!(outcome.removed, 1);
    let attached = attached_names(&test_db, acronym.id).await;
    assert_eq!(attached, BTreeSet::from(["Tech".to_string()]));

    // The detached category row itself survives for other acronyms.
    let funny = test_db
        .db
        .categories
        .find_by_name("Funny")
        .await
        .expect("Lookup failed");
    assert!(funny.is_some());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_reconcile_is_idempotent() {
    let test_db = TestDatabase::new().await;
    let user = test_db.seed_user("reconciler").await;
    let acronym = test_db.seed_acronym("TIL", "Today I Learned", user.id).await;

    let reconciler = CategoryReconciler::new(test_db.db.clone());
    let desired = names(&["Funny", "Tech"]);

    let first = reconciler
        .reconcile(acronym.id, &desired)
        .await
        .expect("Reconcile failed");
    assert_eq!((first.added, first.removed), (2, 0));

    let second = reconciler
        .reconcile(acronym.id, &desired)
        .await
        .expect("Reconcile failed");
    assert_eq!((second.added, second.removed), (0, 0));

    let attached = attached_names(&test_db, acronym.id).await;
    assert_eq!(attached.len(), 2);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_reconcile_reuses_existing_category_rows() {
    let test_db = TestDatabase::new().await;
    let user = test_db.seed_user("reconciler").await;
    let first = test_db.seed_acronym("AFK", "Away From Keyboard", user.id).await;
    let second = test_db.seed_acronym("GG", "Good Game", user.id).await;

    let reconciler = CategoryReconciler::new(test_db.db.clone());
    reconciler
        .reconcile(first.id, &names(&["Gaming"]))
        .await
        .expect("Reconcile failed");
    reconciler
        .reconcile(second.id, &names(&["Gaming"]))
        .await
        .expect("Reconcile failed");

    // One row serves both acronyms.
    let all = test_db
        .db
        .categories
        .list()
        .await
        .expect("List failed")
        .into_iter()
        .filter(|c| c.name == "Gaming")
        .count();
    assert_eq!(all, 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_reconcile_empty_desired_detaches_everything() {
    let test_db = TestDatabase::new().await;
    let user = test_db.seed_user("reconciler").await;
    let acronym = test_db.seed_acronym("EOD", "End Of Day", user.id).await;

    let reconciler = CategoryReconciler::new(test_db.db.clone());
    reconciler
        .reconcile(acronym.id, &names(&["Work", "Time"]))
        .await
        .expect("Reconcile failed");

    let outcome = reconciler
        .reconcile(acronym.id, &[])
        .await
        .expect("Reconcile failed");

    assert_eq!(outcome.removed, 2);
    assert!(attached_names(&test_db, acronym.id).await.is_empty());

    test_db.cleanup().await;
}
