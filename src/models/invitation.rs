use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::CommissionStatus;

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::invitation_codes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvitationCode {
    pub id: i32,
    pub user_id: String,
    pub code: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::invitation_codes)]
pub struct NewInvitationCode<'a> {
    pub user_id: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Queryable, Selectable, Clone, PartialEq)]
#[diesel(table_name = crate::schema::invitation_relations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvitationRelation {
    pub id: i64,
    pub inviter_id: String,
    pub invitee_id: String,
    pub code_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::invitation_relations)]
pub struct NewInvitationRelation<'a> {
    pub inviter_id: &'a str,
    pub invitee_id: &'a str,
    pub code_id: i32,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::commission_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommissionRecord {
    pub id: i64,
    /// Beneficiary, i.e. the inviter
    pub user_id: String,
    pub relation_id: i64,
    pub order_id: Option<i64>,
    pub amount: BigDecimal,
    pub status: CommissionStatus,
    pub description: String,
    pub issue_time: Option<NaiveDateTime>,
    pub withdrawal_time: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::commission_records)]
pub struct NewCommissionRecord {
    pub user_id: String,
    pub relation_id: i64,
    pub order_id: Option<i64>,
    pub amount: BigDecimal,
    pub status: CommissionStatus,
    pub description: String,
}

#[derive(Debug, AsChangeset, Clone, Default)]
#[diesel(table_name = crate::schema::commission_records)]
pub struct UpdateCommissionRecord {
    pub status: Option<CommissionStatus>,
    pub issue_time: Option<NaiveDateTime>,
    pub withdrawal_time: Option<NaiveDateTime>,
}
