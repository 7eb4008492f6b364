//! Core traits for TIL abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

/// Repository for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user with an already-hashed password.
    async fn create(&self, req: CreateUserRequest, password_hash: &str) -> Result<User>;

    /// Fetch a user by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Fetch a user by login name.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// List all users.
    async fn list(&self) -> Result<Vec<User>>;
}

/// Repository for acronym CRUD and search.
#[async_trait]
pub trait AcronymRepository: Send + Sync {
    /// Insert a new acronym owned by `user_id`.
    async fn create(&self, req: CreateAcronymRequest, user_id: Uuid) -> Result<Acronym>;

    /// Fetch an acronym by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Acronym>>;

    /// List all acronyms in insertion order.
    async fn list(&self) -> Result<Vec<Acronym>>;

    /// List all acronyms sorted ascending by short form.
    async fn list_sorted(&self) -> Result<Vec<Acronym>>;

    /// Fetch the first acronym, if any.
    async fn first(&self) -> Result<Option<Acronym>>;

    /// Exact-match search on short or long form.
    async fn search(&self, term: &str) -> Result<Vec<Acronym>>;

    /// Full-field overwrite of an existing acronym.
    async fn update(&self, id: Uuid, req: CreateAcronymRequest, user_id: Uuid) -> Result<Acronym>;

    /// Delete by ID. Association rows cascade away in the store.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// List acronyms owned by a user.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Acronym>>;
}

/// Repository for categories and the acronym-category association.
///
/// The reconciler only needs `ensure`, `attach`, `detach`, and
/// `list_for_acronym`; the remaining operations serve the CRUD surface.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a new category. Duplicate names surface as a database error.
    async fn create(&self, name: &str) -> Result<Category>;

    /// Fetch the category with `name`, inserting it first if absent.
    ///
    /// Concurrent callers racing on the same new name all observe the same
    /// single row; the store's unique constraint arbitrates.
    async fn ensure(&self, name: &str) -> Result<Category>;

    /// Fetch a category by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>>;

    /// Case-sensitive exact lookup by name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>>;

    /// List all categories sorted by name.
    async fn list(&self) -> Result<Vec<Category>>;

    /// List the categories attached to an acronym.
    async fn list_for_acronym(&self, acronym_id: Uuid) -> Result<Vec<Category>>;

    /// List the acronyms attached to a category.
    async fn list_acronyms(&self, category_id: Uuid) -> Result<Vec<Acronym>>;

    /// Record one acronym-to-category attachment. Idempotent.
    async fn attach(&self, acronym_id: Uuid, category_id: Uuid) -> Result<()>;

    /// Remove one attachment. A no-op if already detached.
    async fn detach(&self, acronym_id: Uuid, category_id: Uuid) -> Result<()>;
}

/// Repository for opaque bearer tokens.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Mint and persist a fresh token for `user_id`.
    async fn generate(&self, user_id: Uuid) -> Result<Token>;

    /// Resolve a presented token value to its owning user.
    async fn find_user_by_value(&self, value: &str) -> Result<Option<User>>;

    /// Revoke a token by value. A no-op if the value is unknown.
    async fn revoke(&self, value: &str) -> Result<()>;
}
