//! Service layer for til-api.

pub mod google;
pub mod reconciler;

pub use google::GoogleOAuth;
pub use reconciler::{CategoryReconciler, ReconcileOutcome, ReconcilePlan};
