use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::UserRole;

/// Row of `users`. Never serialized directly; the password hash stays server-side.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub utm_source: String,
    pub credits: i32,
    pub role: UserRole,
    pub vip_level: i32,
    pub is_active: bool,
    pub total_consumption: BigDecimal,
    pub usage_count: i32,
    pub registration_date: NaiveDateTime,
    pub last_login_time: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub nickname: Option<String>,
    pub utm_source: String,
    pub credits: i32,
    pub role: UserRole,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::users)]
pub struct UpdateUser {
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub vip_level: Option<i32>,
    pub is_active: Option<bool>,
    pub last_login_time: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}
