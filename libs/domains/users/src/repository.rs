use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{AuditAction, NewUser, Page, PageRequest, SortField, User, UserLog};

/// Read side of the user store plus the entry point for writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Case-insensitive exact match.
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn exists_by_email(&self, email: &str) -> UserResult<bool>;

    /// Ascending by `sort`. The total counts every stored user.
    async fn find_page(&self, request: PageRequest, sort: SortField) -> UserResult<Page<User>>;

    /// Oldest first, optionally restricted to one user.
    async fn find_logs(
        &self,
        request: PageRequest,
        user_id: Option<Uuid>,
    ) -> UserResult<Page<UserLog>>;

    /// Opens a unit of work. Nothing it writes is visible until `commit`.
    async fn begin(&self) -> UserResult<Box<dyn UnitOfWork>>;
}

/// Transactional write scope. Dropping it without `commit` discards every
/// write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnitOfWork: Send {
    /// Stores a new user and assigns its id.
    async fn insert_user(&mut self, user: NewUser) -> UserResult<User>;

    /// Rewrites an existing user together with its phones.
    async fn save_user(&mut self, user: &User) -> UserResult<User>;

    async fn append_log(&mut self, user_id: Uuid, action: AuditAction) -> UserResult<UserLog>;

    async fn commit(&mut self) -> UserResult<()>;
}

#[derive(Debug, Default)]
struct Store {
    users: HashMap<Uuid, User>,
    logs: Vec<UserLog>,
}

/// Email equality as the database's `LOWER(email)` index sees it.
pub(crate) fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl Store {
    fn email_taken(&self, email: &str, except: Uuid) -> bool {
        self.users
            .values()
            .any(|u| u.id != except && same_email(&u.email, email))
    }
}

fn sort_key(a: &User, b: &User, sort: SortField) -> std::cmp::Ordering {
    let ordering = match sort {
        SortField::Created => a.created_at.cmp(&b.created_at),
        SortField::Modified => a.updated_at.cmp(&b.updated_at),
        SortField::LastLogin => a.last_login.cmp(&b.last_login),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Email => a.email.cmp(&b.email),
    };
    ordering.then_with(|| a.id.cmp(&b.id))
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store
            .users
            .values()
            .find(|u| same_email(&u.email, email))
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let store = self.store.read().await;
        Ok(store.email_taken(email, Uuid::nil()))
    }

    async fn find_page(&self, request: PageRequest, sort: SortField) -> UserResult<Page<User>> {
        let store = self.store.read().await;

        let mut users: Vec<&User> = store.users.values().collect();
        users.sort_by(|a, b| sort_key(a, b, sort));

        let total = users.len() as u64;
        let content = users
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.size as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, request, total))
    }

    async fn find_logs(
        &self,
        request: PageRequest,
        user_id: Option<Uuid>,
    ) -> UserResult<Page<UserLog>> {
        let store = self.store.read().await;

        let matching: Vec<&UserLog> = store
            .logs
            .iter()
            .filter(|log| user_id.is_none_or(|id| log.user_id == id))
            .collect();

        let total = matching.len() as u64;
        let content = matching
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.size as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, request, total))
    }

    async fn begin(&self) -> UserResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork {
            store: Arc::clone(&self.store),
            staged: Vec::new(),
            logs: Vec::new(),
        }))
    }
}

/// Buffers writes and applies them under one write lock on commit.
struct InMemoryUnitOfWork {
    store: Arc<RwLock<Store>>,
    staged: Vec<User>,
    logs: Vec<UserLog>,
}

impl InMemoryUnitOfWork {
    fn stage(&mut self, user: User) {
        match self.staged.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => self.staged.push(user),
        }
    }

    fn is_known(&self, store: &Store, id: Uuid) -> bool {
        store.users.contains_key(&id) || self.staged.iter().any(|u| u.id == id)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn insert_user(&mut self, user: NewUser) -> UserResult<User> {
        let store = self.store.read().await;
        let staged_clash = self
            .staged
            .iter()
            .any(|u| same_email(&u.email, &user.email));
        if staged_clash || store.email_taken(&user.email, Uuid::nil()) {
            return Err(UserError::DuplicateEmail(user.email));
        }
        drop(store);

        let user = user.into_user(Uuid::now_v7());
        self.stage(user.clone());
        Ok(user)
    }

    async fn save_user(&mut self, user: &User) -> UserResult<User> {
        let store = self.store.read().await;
        if !self.is_known(&store, user.id) {
            return Err(UserError::not_found_id(user.id));
        }
        drop(store);

        self.stage(user.clone());
        Ok(user.clone())
    }

    async fn append_log(&mut self, user_id: Uuid, action: AuditAction) -> UserResult<UserLog> {
        let store = self.store.read().await;
        if !self.is_known(&store, user_id) {
            return Err(UserError::not_found_id(user_id));
        }
        drop(store);

        let log = UserLog {
            id: Uuid::now_v7(),
            user_id,
            action,
            created_at: Utc::now(),
        };
        self.logs.push(log.clone());
        Ok(log)
    }

    async fn commit(&mut self) -> UserResult<()> {
        let mut store = self.store.write().await;

        // Unique email is enforced here, whatever the callers checked before.
        for user in &self.staged {
            if store.email_taken(&user.email, user.id) {
                return Err(UserError::DuplicateEmail(user.email.clone()));
            }
        }

        for user in self.staged.drain(..) {
            store.users.insert(user.id, user);
        }
        store.logs.append(&mut self.logs);

        Ok(())
    }
}
