use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::token::{AttendanceToken, DailyToken as DomainDailyToken};
use crate::domain::types::TypeConstraintError;

/// Diesel model representing the `daily_tokens` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::personnel::daily_tokens)]
pub struct DailyToken {
    pub id: i32,
    pub token: String,
    pub issued_on: NaiveDate,
    pub expires_at: NaiveDateTime,
    pub active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::personnel::daily_tokens)]
pub struct NewDailyToken<'a> {
    pub token: &'a str,
    pub issued_on: NaiveDate,
    pub expires_at: NaiveDateTime,
    pub active: bool,
}

impl TryFrom<DailyToken> for DomainDailyToken {
    type Error = TypeConstraintError;

    fn try_from(token: DailyToken) -> Result<Self, Self::Error> {
        Ok(Self {
            token: AttendanceToken::parse(&token.token)?,
            issued_on: token.issued_on,
            expires_at: token.expires_at,
            active: token.active,
        })
    }
}

impl<'a> From<&'a DomainDailyToken> for NewDailyToken<'a> {
    fn from(token: &'a DomainDailyToken) -> Self {
        Self {
            token: token.token.as_str(),
            issued_on: token.issued_on,
            expires_at: token.expires_at,
            active: token.active,
        }
    }
}
