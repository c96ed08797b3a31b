use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::token::DailyToken;
use crate::models::token::{DailyToken as DbDailyToken, NewDailyToken as DbNewDailyToken};
use crate::repository::{
    DieselPersonnelRepository, RepositoryError, RepositoryResult, TokenReader, TokenWriter,
};

impl TokenReader for DieselPersonnelRepository {
    fn find_active_token(&self, date: NaiveDate) -> RepositoryResult<Option<DailyToken>> {
        use crate::schema::personnel::daily_tokens;

        let mut conn = self.conn()?;

        let token = daily_tokens::table
            .filter(daily_tokens::issued_on.eq(date))
            .filter(daily_tokens::active.eq(true))
            .first::<DbDailyToken>(&mut conn)
            .optional()?;

        Ok(token.map(TryInto::try_into).transpose()?)
    }

    fn find_token(&self, token: &str) -> RepositoryResult<Option<DailyToken>> {
        use crate::schema::personnel::daily_tokens;

        let mut conn = self.conn()?;

        let token = daily_tokens::table
            .filter(daily_tokens::token.eq(token))
            .first::<DbDailyToken>(&mut conn)
            .optional()?;

        Ok(token.map(TryInto::try_into).transpose()?)
    }

    fn list_tokens(&self, limit: usize) -> RepositoryResult<Vec<DailyToken>> {
        use crate::schema::personnel::daily_tokens;

        let mut conn = self.conn()?;

        let tokens = daily_tokens::table
            .order((daily_tokens::issued_on.desc(), daily_tokens::id.desc()))
            .limit(limit as i64)
            .load::<DbDailyToken>(&mut conn)?;

        tokens
            .into_iter()
            .map(|token| DailyToken::try_from(token).map_err(RepositoryError::from))
            .collect()
    }
}

impl TokenWriter for DieselPersonnelRepository {
    fn get_or_insert_token(&self, token: &DailyToken) -> RepositoryResult<DailyToken> {
        use crate::schema::personnel::daily_tokens;

        let mut conn = self.conn()?;

        let stored = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let existing = daily_tokens::table
                .filter(daily_tokens::issued_on.eq(token.issued_on))
                .filter(daily_tokens::active.eq(true))
                .first::<DbDailyToken>(conn)
                .optional()?;

            if let Some(existing) = existing {
                return Ok(existing);
            }

            diesel::update(
                daily_tokens::table
                    .filter(daily_tokens::issued_on.lt(token.issued_on))
                    .filter(daily_tokens::active.eq(true)),
            )
            .set(daily_tokens::active.eq(false))
            .execute(conn)?;

            let inserted = diesel::insert_into(daily_tokens::table)
                .values(DbNewDailyToken::from(token))
                .get_result::<DbDailyToken>(conn)?;

            Ok(inserted)
        })?;

        Ok(stored.try_into()?)
    }
}
