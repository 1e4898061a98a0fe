use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    entity::{phones, user_logs, users},
    error::{UserError, UserResult},
    models::{AuditAction, NewUser, Page, PageRequest, SortField, User, UserLog},
    repository::{UnitOfWork, UserRepository},
};

fn db_err(e: DbErr) -> UserError {
    UserError::Internal(format!("Database error: {}", e))
}

/// Maps store-level constraint failures on user writes to domain errors.
fn write_err(e: DbErr, user: &User) -> UserError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            UserError::DuplicateEmail(user.email.clone())
        }
        _ => db_err(e),
    }
}

fn sort_column(sort: SortField) -> users::Column {
    match sort {
        SortField::Created => users::Column::CreatedAt,
        SortField::Modified => users::Column::UpdatedAt,
        SortField::LastLogin => users::Column::LastLogin,
        SortField::Name => users::Column::Name,
        SortField::Email => users::Column::Email,
    }
}

/// Attaches phones to each user row with one extra query.
async fn with_phones<C: ConnectionTrait>(
    db: &C,
    rows: Vec<users::Model>,
) -> UserResult<Vec<User>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let phone_rows = phones::Entity::find()
        .filter(phones::Column::UserId.is_in(ids))
        .order_by_asc(phones::Column::Position)
        .all(db)
        .await
        .map_err(db_err)?;

    let mut by_user: HashMap<Uuid, Vec<phones::Model>> = HashMap::new();
    for phone in phone_rows {
        by_user.entry(phone.user_id).or_default().push(phone);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let phones = by_user.remove(&row.id).unwrap_or_default();
            row.into_user(phones)
        })
        .collect())
}

async fn one_with_phones<C: ConnectionTrait>(
    db: &C,
    row: Option<users::Model>,
) -> UserResult<Option<User>> {
    match row {
        Some(row) => Ok(with_phones(db, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Postgres-backed user store.
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let row = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        one_with_phones(&self.db, row).await
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let row = users::Entity::find()
            .filter(Expr::cust_with_values("LOWER(email) = $1", [email.to_lowercase()]))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        one_with_phones(&self.db, row).await
    }

    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let count = users::Entity::find()
            .filter(Expr::cust_with_values("LOWER(email) = $1", [email.to_lowercase()]))
            .count(&self.db)
            .await
            .map_err(db_err)?;

        Ok(count > 0)
    }

    async fn find_page(&self, request: PageRequest, sort: SortField) -> UserResult<Page<User>> {
        let paginator = users::Entity::find()
            .order_by_asc(sort_column(sort))
            .order_by_asc(users::Column::Id)
            .paginate(&self.db, request.size);

        let total = paginator.num_items().await.map_err(db_err)?;
        let rows = paginator.fetch_page(request.page).await.map_err(db_err)?;
        let content = with_phones(&self.db, rows).await?;

        Ok(Page::new(content, request, total))
    }

    async fn find_logs(
        &self,
        request: PageRequest,
        user_id: Option<Uuid>,
    ) -> UserResult<Page<UserLog>> {
        let mut query = user_logs::Entity::find();
        if let Some(user_id) = user_id {
            query = query.filter(user_logs::Column::UserId.eq(user_id));
        }

        let paginator = query
            .order_by_asc(user_logs::Column::CreatedAt)
            .order_by_asc(user_logs::Column::Id)
            .paginate(&self.db, request.size);

        let total = paginator.num_items().await.map_err(db_err)?;
        let content = paginator
            .fetch_page(request.page)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(UserLog::try_from)
            .collect::<UserResult<Vec<_>>>()?;

        Ok(Page::new(content, request, total))
    }

    async fn begin(&self) -> UserResult<Box<dyn UnitOfWork>> {
        let txn = self.db.begin().await.map_err(db_err)?;
        Ok(Box::new(PgUnitOfWork { txn: Some(txn) }))
    }
}

/// Wraps one database transaction. Dropping it uncommitted rolls back.
pub struct PgUnitOfWork {
    txn: Option<DatabaseTransaction>,
}

impl PgUnitOfWork {
    fn txn(&self) -> UserResult<&DatabaseTransaction> {
        self.txn
            .as_ref()
            .ok_or_else(|| UserError::Internal("Unit of work already committed".to_string()))
    }

    async fn upsert_phones(&self, user: &User) -> UserResult<()> {
        let txn = self.txn()?;

        for (position, phone) in user.phones.iter().enumerate() {
            phones::Entity::insert(phones::ActiveModel::from_phone(phone, position))
                .on_conflict(
                    OnConflict::column(phones::Column::Id)
                        .update_columns([
                            phones::Column::Number,
                            phones::Column::CityCode,
                            phones::Column::CountryCode,
                            phones::Column::Position,
                        ])
                        .to_owned(),
                )
                .exec(txn)
                .await
                .map_err(db_err)?;
        }

        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn insert_user(&mut self, user: NewUser) -> UserResult<User> {
        let user = user.into_user(Uuid::now_v7());

        users::ActiveModel::from(&user)
            .insert(self.txn()?)
            .await
            .map_err(|e| write_err(e, &user))?;
        self.upsert_phones(&user).await?;

        tracing::debug!(user_id = %user.id, "Inserted user row");
        Ok(user)
    }

    async fn save_user(&mut self, user: &User) -> UserResult<User> {
        let result = users::ActiveModel::from(user).update(self.txn()?).await;

        match result {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => return Err(UserError::not_found_id(user.id)),
            Err(e) => return Err(write_err(e, user)),
        }
        self.upsert_phones(user).await?;

        Ok(user.clone())
    }

    async fn append_log(&mut self, user_id: Uuid, action: AuditAction) -> UserResult<UserLog> {
        let model = user_logs::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            action: Set(action.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.txn()?)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => UserError::not_found_id(user_id),
            _ => db_err(e),
        })?;

        UserLog::try_from(model)
    }

    async fn commit(&mut self) -> UserResult<()> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| UserError::Internal("Unit of work already committed".to_string()))?;

        txn.commit().await.map_err(db_err)
    }
}
