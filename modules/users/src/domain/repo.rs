use crate::contract::model::User;
use async_trait::async_trait;
use modkit::api::{PageRequest, PagedList};
use uuid::Uuid;

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Insert a fully-formed user under `u.id`; fails if the id is taken.
    async fn insert(&self, u: User) -> anyhow::Result<User>;
    /// Replace the user with primary key `u.id`. Returns false if it does not exist.
    async fn update(&self, u: User) -> anyhow::Result<bool>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// One page of users in a stable order plus the total count.
    async fn get_page(&self, page: PageRequest) -> anyhow::Result<PagedList<User>>;
}
