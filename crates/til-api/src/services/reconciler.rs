//! Category reconciliation for acronym edits.
//!
//! Given an acronym's current category set and a caller-supplied desired set
//! of names, converge the association table to the desired set with minimal
//! writes, creating missing categories on demand.
//!
//! Reconciliation is not atomic: attach and detach operations run
//! concurrently and the first persistence failure propagates without rolling
//! back writes that already landed. A caller observing an error must
//! re-query current state.

use std::collections::BTreeSet;
use std::time::Instant;

use futures::future::{try_join, try_join_all};
use tracing::{debug, info};
use uuid::Uuid;

use til_core::{CategoryRepository, Result};
use til_db::Database;

/// The minimal attach/detach diff between current and desired name sets.
///
/// Both sides are computed as sets: duplicates collapse, order is
/// irrelevant, and comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Names in the desired set but not yet attached.
    pub to_add: Vec<String>,
    /// Names attached but no longer desired.
    pub to_remove: Vec<String>,
}

impl ReconcilePlan {
    /// Compute the diff between `existing` and `desired` names.
    pub fn diff<S: AsRef<str>>(existing: &[S], desired: &[S]) -> Self {
        let existing: BTreeSet<&str> = existing.iter().map(|s| s.as_ref()).collect();
        let desired: BTreeSet<&str> = desired.iter().map(|s| s.as_ref()).collect();

        let to_add = desired
            .difference(&existing)
            .map(|s| s.to_string())
            .collect();
        let to_remove = existing
            .difference(&desired)
            .map(|s| s.to_string())
            .collect();

        Self { to_add, to_remove }
    }

    /// True when the association already matches the desired set.
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Counts of applied writes, for logging and handler responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub added: usize,
    pub removed: usize,
}

/// Applies [`ReconcilePlan`]s against the category repository.
#[derive(Clone)]
pub struct CategoryReconciler {
    db: Database,
}

impl CategoryReconciler {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Converge the acronym's attached categories to `desired`.
    ///
    /// An absent desired list is treated as the empty set by callers. Names
    /// in the add set are ensured (created if missing, reused otherwise) and
    /// attached; names in the remove set are resolved against the
    /// already-loaded existing rows and detached. The two groups are
    /// disjoint, so they run concurrently; the call returns only after every
    /// operation has settled.
    pub async fn reconcile(
        &self,
        acronym_id: Uuid,
        desired: &[String],
    ) -> Result<ReconcileOutcome> {
        let start = Instant::now();

        let existing = self.db.categories.list_for_acronym(acronym_id).await?;
        let existing_names: Vec<String> = existing.iter().map(|c| c.name.clone()).collect();
        let plan = ReconcilePlan::diff(&existing_names, desired);

        if plan.is_noop() {
            debug!(
                subsystem = "api",
                component = "reconciler",
                op = "reconcile",
                acronym_id = %acronym_id,
                "Association already matches desired set"
            );
            return Ok(ReconcileOutcome {
                added: 0,
                removed: 0,
            });
        }

        let adds = plan.to_add.iter().map(|name| {
            let categories = &self.db.categories;
            async move {
                let category = categories.ensure(name).await?;
                categories.attach(acronym_id, category.id).await
            }
        });

        // Removals only ever target rows loaded above; a name without a
        // matching row was already detached by someone else, which is fine.
        let removes = plan
            .to_remove
            .iter()
            .filter_map(|name| existing.iter().find(|c| &c.name == name))
            .map(|category| self.db.categories.detach(acronym_id, category.id));

        try_join(try_join_all(adds), try_join_all(removes)).await?;

        let outcome = ReconcileOutcome {
            added: plan.to_add.len(),
            removed: plan.to_remove.len(),
        };

        info!(
            subsystem = "api",
            component = "reconciler",
            op = "reconcile",
            acronym_id = %acronym_id,
            added_count = outcome.added,
            removed_count = outcome.removed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Reconciled acronym categories"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diff_adds_new_name() {
        let plan = ReconcilePlan::diff(&names(&["Funny"]), &names(&["Funny", "Tech"]));
        assert_eq!(plan.to_add, vec!["Tech"]);
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn test_diff_removes_dropped_name() {
        let plan = ReconcilePlan::diff(&names(&["Funny", "Tech"]), &names(&["Tech"]));
        assert!(plan.to_add.is_empty());
        assert_eq!(plan.to_remove, vec!["Funny"]);
    }

    #[test]
    fn test_diff_identical_sets_is_noop() {
        let plan = ReconcilePlan::diff(&names(&["Tech", "Funny"]), &names(&["Funny", "Tech"]));
        assert!(plan.is_noop());
    }

    #[test]
    fn test_diff_empty_desired_removes_everything() {
        let plan = ReconcilePlan::diff(&names(&["Funny", "Tech"]), &names(&[]));
        assert!(plan.to_add.is_empty());
        assert_eq!(plan.to_remove, vec!["Funny", "Tech"]);
    }

    #[test]
    fn test_diff_empty_existing_adds_everything() {
        let plan = ReconcilePlan::diff(&names(&[]), &names(&["A", "B"]));
        assert_eq!(plan.to_add, vec!["A", "B"]);
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn test_diff_is_case_sensitive() {
        let plan = ReconcilePlan::diff(&names(&["funny"]), &names(&["Funny"]));
        assert_eq!(plan.to_add, vec!["Funny"]);
        assert_eq!(plan.to_remove, vec!["funny"]);
    }

    #[test]
    fn test_diff_collapses_duplicates_in_desired() {
        let plan = ReconcilePlan::diff(&names(&[]), &names(&["Tech", "Tech", "Tech"]));
        assert_eq!(plan.to_add, vec!["Tech"]);
    }

    #[test]
    fn test_diff_add_and_remove_are_disjoint() {
        let plan = ReconcilePlan::diff(
            &names(&["A", "B", "C"]),
            &names(&["B", "C", "D", "E"]),
        );
        for added in &plan.to_add {
            assert!(!plan.to_remove.contains(added));
        }
        assert_eq!(plan.to_add, vec!["D", "E"]);
        assert_eq!(plan.to_remove, vec!["A"]);
    }
}
