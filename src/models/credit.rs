use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::{CreditRecordType, ServiceUnit};

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::credit_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreditRecord {
    pub id: i64,
    pub user_id: String,
    pub record_type: CreditRecordType,
    /// Signed delta; negative for consumption
    pub credits: i32,
    /// Balance after the change
    pub balance: i32,
    pub description: String,
    pub service_code: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::credit_records)]
pub struct NewCreditRecord {
    pub user_id: String,
    pub record_type: CreditRecordType,
    pub credits: i32,
    pub balance: i32,
    pub description: String,
    pub service_code: Option<String>,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::credit_products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreditProduct {
    pub id: i32,
    pub name: String,
    pub credits: i32,
    pub price: BigDecimal,
    pub status: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::credit_service_prices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreditServicePrice {
    pub id: i32,
    pub service_code: String,
    pub name: String,
    /// Credits charged per unit
    pub credits: i32,
    pub unit: ServiceUnit,
    pub description: Option<String>,
    pub status: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
