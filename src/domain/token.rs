//! Daily attendance tokens (`YYYY-MM-DD_xxxxxxxx`).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::domain::types::TypeConstraintError;

/// Length of the hex digest suffix.
pub const TOKEN_HASH_LEN: usize = 8;
/// Total length of a well-formed token.
pub const TOKEN_LEN: usize = 10 + 1 + TOKEN_HASH_LEN;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A syntactically valid attendance token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct AttendanceToken(String);

impl AttendanceToken {
    /// Parses the wire format: ISO date, underscore, eight lowercase hex digits.
    pub fn parse(value: &str) -> Result<Self, TypeConstraintError> {
        let value = value.trim();
        if !value.is_ascii() || value.len() != TOKEN_LEN {
            return Err(TypeConstraintError::MalformedToken);
        }
        let (date, rest) = value.split_at(10);
        let Some(hash) = rest.strip_prefix('_') else {
            return Err(TypeConstraintError::MalformedToken);
        };
        if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
            return Err(TypeConstraintError::MalformedToken);
        }
        if !hash
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(TypeConstraintError::MalformedToken);
        }
        Ok(Self(value.to_string()))
    }

    /// Builds the canonical token for `date` from a hex digest.
    pub fn compose(date: NaiveDate, digest_hex: &str) -> Result<Self, TypeConstraintError> {
        let hash: String = digest_hex.chars().take(TOKEN_HASH_LEN).collect();
        Self::parse(&format!("{}_{hash}", date.format(DATE_FORMAT)))
    }

    /// The calendar day embedded in the token.
    pub fn embedded_date(&self) -> NaiveDate {
        // Checked in `parse`.
        NaiveDate::parse_from_str(&self.0[..10], DATE_FORMAT).unwrap_or_default()
    }

    pub fn hash(&self) -> &str {
        &self.0[11..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AttendanceToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AttendanceToken {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AttendanceToken> for String {
    fn from(value: AttendanceToken) -> Self {
        value.0
    }
}

/// A token issued by the registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyToken {
    pub token: AttendanceToken,
    pub issued_on: NaiveDate,
    pub expires_at: NaiveDateTime,
    pub active: bool,
}

impl DailyToken {
    pub fn new(token: AttendanceToken, issued_on: NaiveDate) -> Self {
        Self {
            token,
            issued_on,
            expires_at: end_of_day(issued_on),
            active: true,
        }
    }

    pub fn is_valid_at(&self, now: NaiveDateTime) -> bool {
        self.active && self.expires_at > now
    }
}

/// Last representable second of the given local day.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
}
