//! Sea-ORM entities for the `users`, `phones` and `user_logs` tables.

use std::str::FromStr;

use crate::error::UserError;
use crate::models::{AuditAction, Phone, User, UserLog};

pub mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub password_hash: String,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
        pub last_login: DateTimeWithTimeZone,
        pub is_active: bool,
        #[sea_orm(column_type = "Text", nullable)]
        pub token: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod phones {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "phones")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub user_id: Uuid,
        pub number: String,
        pub city_code: String,
        pub country_code: String,
        pub position: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod user_logs {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "user_logs")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub user_id: Uuid,
        pub action: String,
        pub created_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl users::Model {
    /// Joins a user row with its phone rows, already sorted by position.
    pub fn into_user(self, phones: Vec<phones::Model>) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
            last_login: self.last_login.into(),
            is_active: self.is_active,
            token: self.token,
            phones: phones.into_iter().map(Phone::from).collect(),
        }
    }
}

impl From<phones::Model> for Phone {
    fn from(model: phones::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            number: model.number,
            city_code: model.city_code,
            country_code: model.country_code,
        }
    }
}

impl TryFrom<user_logs::Model> for UserLog {
    type Error = UserError;

    fn try_from(model: user_logs::Model) -> Result<Self, Self::Error> {
        let action = AuditAction::from_str(&model.action).map_err(|_| {
            UserError::Internal(format!("Unknown audit action: {}", model.action))
        })?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            action,
            created_at: model.created_at.into(),
        })
    }
}

// Conversion from domain User to Sea-ORM ActiveModel
impl From<&User> for users::ActiveModel {
    fn from(user: &User) -> Self {
        use sea_orm::ActiveValue::Set;

        Self {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
            last_login: Set(user.last_login.into()),
            is_active: Set(user.is_active),
            token: Set(user.token.clone()),
        }
    }
}

impl phones::ActiveModel {
    pub fn from_phone(phone: &Phone, position: usize) -> Self {
        use sea_orm::ActiveValue::Set;

        Self {
            id: Set(phone.id),
            user_id: Set(phone.user_id),
            number: Set(phone.number.clone()),
            city_code: Set(phone.city_code.clone()),
            country_code: Set(phone.country_code.clone()),
            position: Set(position as i32),
        }
    }
}
