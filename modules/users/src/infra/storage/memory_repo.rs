//! In-process repository implementation for the domain port.
//!
//! Entries are kept in a `DashMap` keyed by id; each carries an insertion
//! sequence number so paging is stable. Atomicity is per entry only.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::bail;
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use modkit::api::{PageRequest, PagedList};
use uuid::Uuid;

use crate::contract::User;
use crate::domain::repo::UsersRepository;

#[derive(Default)]
pub struct InMemoryUsersRepository {
    users: DashMap<Uuid, (u64, User)>,
    seq: AtomicU64,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.get(&id).map(|e| e.value().1.clone()))
    }

    async fn insert(&self, u: User) -> anyhow::Result<User> {
        match self.users.entry(u.id) {
            Entry::Occupied(_) => bail!("user {} already exists", u.id),
            Entry::Vacant(slot) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                slot.insert((seq, u.clone()));
            }
        }
        Ok(u)
    }

    async fn update(&self, u: User) -> anyhow::Result<bool> {
        match self.users.get_mut(&u.id) {
            Some(mut entry) => {
                entry.value_mut().1 = u;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.users.remove(&id).is_some())
    }

    async fn get_page(&self, page: PageRequest) -> anyhow::Result<PagedList<User>> {
        let mut all: Vec<(u64, User)> = self.users.iter().map(|e| e.value().clone()).collect();
        all.sort_unstable_by_key(|(seq, _)| *seq);

        let total = all.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let items = all
            .into_iter()
            .skip(offset)
            .take(page.size as usize)
            .map(|(_, u)| u)
            .collect();
        Ok(PagedList::new(items, page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(login: &str) -> User {
        User {
            id: Uuid::new_v4(),
            login: login.into(),
            first_name: String::new(),
            last_name: String::new(),
            games_played: 0,
            current_game_id: None,
        }
    }

    #[tokio::test]
    async fn insert_stores_the_given_id_verbatim() {
        let repo = InMemoryUsersRepository::new();
        let nil = repo.insert(User { id: Uuid::nil(), ..user("a") }).await.unwrap();
        assert!(nil.id.is_nil());
        assert!(repo.find_by_id(Uuid::nil()).await.unwrap().is_some());

        let id = Uuid::new_v4();
        let explicit = repo.insert(User { id, ..user("b") }).await.unwrap();
        assert_eq!(explicit.id, id);
        assert!(repo.insert(User { id, ..user("c") }).await.is_err());
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = InMemoryUsersRepository::new();
        assert!(!repo.update(User { id: Uuid::new_v4(), ..user("x") }).await.unwrap());
        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());

        let stored = repo.insert(user("a")).await.unwrap();
        assert!(repo.update(User { login: "b".into(), ..stored.clone() }).await.unwrap());
        assert_eq!(repo.find_by_id(stored.id).await.unwrap().unwrap().login, "b");
        assert!(repo.delete(stored.id).await.unwrap());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn pages_follow_insertion_order() {
        let repo = InMemoryUsersRepository::new();
        for i in 0..5 {
            repo.insert(user(&format!("u{i}"))).await.unwrap();
        }

        let page = repo.get_page(PageRequest::clamp(2, 2)).await.unwrap();
        let logins: Vec<_> = page.items.iter().map(|u| u.login.as_str()).collect();
        assert_eq!(logins, ["u2", "u3"]);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.total_pages(), 3);

        let past_end = repo.get_page(PageRequest::clamp(9, 2)).await.unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.current_page, 9);
    }
}
