use std::sync::Arc;

use crate::contract::model::{NewUser, User, UserUpdate};
use crate::domain::error::DomainError;
use crate::domain::repo::UsersRepository;
use crate::domain::validation::validate_login;
use modkit::api::{apply_patch, PageRequest, PagedList, PatchOperation, ValidationErrors};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Domain service implementing the users decision table.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: modkit::api::pagination::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Outcome of a PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Created(User),
    Replaced,
}

impl Service {
    pub fn new(repo: Arc<dyn UsersRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// Clamp raw query values; unparsable values fall back to the defaults.
    pub fn page_request(&self, number: Option<&str>, size: Option<&str>) -> PageRequest {
        PageRequest::from_raw(number, size, self.config.default_page_size)
    }

    #[instrument(name = "users.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        debug!("Getting user by id");
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(id))?;
        debug!("Successfully retrieved user");
        Ok(user)
    }

    #[instrument(
        name = "users.service.list_users",
        skip(self),
        fields(page_number = page.number, page_size = page.size)
    )]
    pub async fn list_users(&self, page: PageRequest) -> Result<PagedList<User>, DomainError> {
        debug!("Listing users");
        let page = self.repo.get_page(page).await?;
        debug!(
            "Listed {} of {} users",
            page.items.len(),
            page.total_count
        );
        Ok(page)
    }

    #[instrument(name = "users.service.create_user", skip(self), fields(login = %new_user.login))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        let mut errors = ValidationErrors::new();
        validate_login(Some(&new_user.login), &mut errors);
        errors.into_result()?;

        let user = self.repo.insert(new_user.into_user(Uuid::new_v4())).await?;
        info!(user_id = %user.id, "Successfully created user");
        Ok(user)
    }

    /// Insert at `id` when absent, otherwise replace the stored user.
    ///
    /// The existence check and the write are two separate repository calls.
    #[instrument(name = "users.service.upsert_user", skip(self, update), fields(user_id = %id))]
    pub async fn upsert_user(&self, id: Uuid, update: UserUpdate) -> Result<Upsert, DomainError> {
        info!("Upserting user");

        let mut errors = ValidationErrors::new();
        validate_login(update.login.as_deref(), &mut errors);
        errors.into_result()?;

        match self.repo.find_by_id(id).await? {
            Some(mut user) => {
                update.clone().apply_to(&mut user);
                if self.repo.update(user).await? {
                    debug!("Replaced existing user");
                    return Ok(Upsert::Replaced);
                }
                warn!("User vanished between lookup and replace; inserting instead");
                let user = self.insert_at(id, update).await?;
                Ok(Upsert::Created(user))
            }
            None => {
                let user = self.insert_at(id, update).await?;
                debug!("Inserted user at client-supplied id");
                Ok(Upsert::Created(user))
            }
        }
    }

    async fn insert_at(&self, id: Uuid, update: UserUpdate) -> Result<User, DomainError> {
        Ok(self.repo.insert(update.into_new_user().into_user(id)).await?)
    }

    /// Apply `ops` to the update-shaped view of the stored user, validate the
    /// result and persist only when both patching and validation succeeded.
    #[instrument(
        name = "users.service.patch_user",
        skip(self, ops),
        fields(user_id = %id, ops = ops.len())
    )]
    pub async fn patch_user(&self, id: Uuid, ops: &[PatchOperation]) -> Result<(), DomainError> {
        info!("Patching user");

        let mut user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(id))?;

        let mut update = UserUpdate::from(&user);
        let mut errors = ValidationErrors::new();
        let failed = apply_patch(&mut update, ops, &mut errors);
        validate_login(update.login.as_deref(), &mut errors);
        if !errors.is_empty() {
            debug!(failed, "Patch rejected");
            return Err(DomainError::Validation(errors));
        }

        update.apply_to(&mut user);
        if !self.repo.update(user).await? {
            return Err(DomainError::not_found(id));
        }
        debug!("Successfully patched user");
        Ok(())
    }

    #[instrument(name = "users.service.delete_user", skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting user");
        if !self.repo.delete(id).await? {
            return Err(DomainError::not_found(id));
        }
        info!("Successfully deleted user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::memory_repo::InMemoryUsersRepository;
    use serde_json::json;

    fn service() -> Service {
        Service::new(
            Arc::new(InMemoryUsersRepository::new()),
            ServiceConfig::default(),
        )
    }

    fn new_user(login: &str) -> NewUser {
        NewUser {
            login: login.into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
        }
    }

    fn ops(doc: serde_json::Value) -> Vec<PatchOperation> {
        serde_json::from_value(doc).unwrap()
    }

    #[tokio::test]
    async fn create_rejects_bad_login_without_inserting() {
        let svc = service();
        let err = svc.create_user(new_user("ab!")).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.contains("login")));

        let page = svc.list_users(PageRequest::default()).await.unwrap();
        assert_eq!(page.total_count, 0);
    }

    #[tokio::test]
    async fn create_assigns_id() {
        let svc = service();
        let user = svc.create_user(new_user("ann")).await.unwrap();
        assert!(!user.id.is_nil());
        assert_eq!(svc.get_user(user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn upsert_inserts_then_replaces() {
        let svc = service();
        let id = Uuid::new_v4();
        let first = UserUpdate {
            login: Some("bob1".into()),
            ..Default::default()
        };
        let created = svc.upsert_user(id, first).await.unwrap();
        assert!(matches!(created, Upsert::Created(ref u) if u.id == id));

        let second = UserUpdate {
            login: Some("bob2".into()),
            first_name: Some("Bob".into()),
            last_name: None,
        };
        assert_eq!(svc.upsert_user(id, second).await.unwrap(), Upsert::Replaced);
        let user = svc.get_user(id).await.unwrap();
        assert_eq!(user.login, "bob2");
        assert_eq!(user.first_name, "Bob");
    }

    #[tokio::test]
    async fn upsert_at_nil_id_keeps_that_id() {
        let svc = service();
        let update = UserUpdate {
            login: Some("bob1".into()),
            ..Default::default()
        };
        let created = svc.upsert_user(Uuid::nil(), update).await.unwrap();
        assert!(matches!(created, Upsert::Created(ref u) if u.id.is_nil()));
        assert_eq!(svc.get_user(Uuid::nil()).await.unwrap().login, "bob1");
    }

    #[tokio::test]
    async fn failed_patch_leaves_user_untouched() {
        let svc = service();
        let user = svc.create_user(new_user("ann")).await.unwrap();

        let err = svc
            .patch_user(
                user.id,
                &ops(json!([
                    { "op": "replace", "path": "/firstName", "value": "Anna" },
                    { "op": "replace", "path": "/login", "value": "a n" }
                ])),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.contains("login")));
        assert_eq!(svc.get_user(user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn patch_and_validation_errors_are_reported_together() {
        let svc = service();
        let user = svc.create_user(new_user("ann")).await.unwrap();

        let err = svc
            .patch_user(
                user.id,
                &ops(json!([
                    { "op": "replace", "path": "/nickname", "value": "x" },
                    { "op": "remove", "path": "/login" }
                ])),
            )
            .await
            .unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("nickname"));
        assert!(errors.contains("login"));
    }

    #[tokio::test]
    async fn patch_missing_user_is_not_found() {
        let svc = service();
        let err = svc
            .patch_user(Uuid::new_v4(), &ops(json!([])))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let svc = service();
        let user = svc.create_user(new_user("ann")).await.unwrap();
        svc.delete_user(user.id).await.unwrap();
        let err = svc.delete_user(user.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
