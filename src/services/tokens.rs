//! Daily token issuance and validation.

use chrono::{NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};

use crate::domain::token::{AttendanceToken, DailyToken};
use crate::dto::qr::DailyQr;
use crate::qr::{attendance_url, render_png_base64};
use crate::repository::{TokenReader, TokenWriter};

use super::{ServiceError, ServiceResult};

/// Lowercase hex SHA-256 over the ISO date, keyed by `secret` when present.
pub fn token_digest(date: NaiveDate, secret: Option<&str>) -> String {
    let date = date.format("%Y-%m-%d").to_string();
    let mut hasher = Sha256::new();
    if let Some(secret) = secret {
        hasher.update(secret.as_bytes());
        hasher.update(b":");
    }
    hasher.update(date.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Canonical token for `date`.
pub fn canonical_token(date: NaiveDate, secret: Option<&str>) -> ServiceResult<AttendanceToken> {
    AttendanceToken::compose(date, &token_digest(date, secret)).map_err(|e| {
        log::error!("Failed to compose token for {date}: {e}");
        ServiceError::Internal
    })
}

/// Returns today's token, issuing it on the first request of the day.
pub fn todays_token<R>(repo: &R, today: NaiveDate, secret: Option<&str>) -> ServiceResult<DailyToken>
where
    R: TokenReader + TokenWriter,
{
    match repo.find_active_token(today) {
        Ok(Some(token)) => return Ok(token),
        Ok(None) => {}
        Err(e) => {
            log::error!("Failed to look up today's token: {e}");
            return Err(e.into());
        }
    }

    let candidate = DailyToken::new(canonical_token(today, secret)?, today);
    match repo.get_or_insert_token(&candidate) {
        Ok(token) => {
            log::info!("Issued attendance token {} for {today}", token.token);
            Ok(token)
        }
        Err(e) => {
            log::error!("Failed to issue today's token: {e}");
            Err(e.into())
        }
    }
}

/// Checks a token presented by a client at `now`.
///
/// A token whose embedded date is today is accepted without a lookup so that
/// hosts sharing no state agree on it; with a secret configured its hash must
/// also match. Any other token must exist in the registry, be active and not
/// yet expired.
pub fn validate_token<R>(
    repo: &R,
    raw: &str,
    now: NaiveDateTime,
    secret: Option<&str>,
) -> ServiceResult<AttendanceToken>
where
    R: TokenReader,
{
    let token = AttendanceToken::parse(raw).map_err(|_| ServiceError::InvalidToken)?;

    if token.embedded_date() == now.date() {
        match secret {
            None => return Ok(token),
            Some(secret) => {
                let digest = token_digest(now.date(), Some(secret));
                if digest.starts_with(token.hash()) {
                    return Ok(token);
                }
            }
        }
    }

    match repo.find_token(token.as_str()) {
        Ok(Some(stored)) if stored.is_valid_at(now) => Ok(token),
        Ok(_) => Err(ServiceError::InvalidToken),
        Err(e) => {
            log::error!("Failed to look up token: {e}");
            Err(e.into())
        }
    }
}

/// Today's token together with its attendance URL rendered as a QR code.
pub fn daily_qr<R>(
    repo: &R,
    today: NaiveDate,
    secret: Option<&str>,
    base_url: &str,
    ip_local: &str,
) -> ServiceResult<DailyQr>
where
    R: TokenReader + TokenWriter,
{
    let token = todays_token(repo, today, secret)?;
    let url = attendance_url(base_url, token.token.as_str());
    let qr_image = render_png_base64(&url).map_err(|e| {
        log::error!("Failed to render QR for {url}: {e}");
        ServiceError::Internal
    })?;

    Ok(DailyQr {
        token: token.token.to_string(),
        url,
        qr_image,
        fecha: today,
        ip_local: ip_local.to_string(),
    })
}

/// Issued tokens, newest first.
pub fn token_history<R>(repo: &R, limit: usize) -> ServiceResult<Vec<DailyToken>>
where
    R: TokenReader,
{
    repo.list_tokens(limit).map_err(|e| {
        log::error!("Failed to list tokens: {e}");
        e.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test::TestRepository;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn digest_is_sha256_of_the_date() {
        assert_eq!(
            token_digest(day(15), None),
            format!("{:x}", Sha256::digest(b"2025-01-15"))
        );
        assert_ne!(token_digest(day(15), None), token_digest(day(15), Some("k")));
    }

    #[test]
    fn issues_one_token_per_day() {
        let repo = TestRepository::personnel();

        let first = todays_token(&repo, day(15), None).unwrap();
        let second = todays_token(&repo, day(15), None).unwrap();

        assert_eq!(first, second);
        assert_eq!(repo.tokens().len(), 1);
        assert!(first.token.as_str().starts_with("2025-01-15_"));
    }

    #[test]
    fn issuing_a_new_day_deactivates_older_tokens() {
        let repo = TestRepository::personnel();

        todays_token(&repo, day(14), None).unwrap();
        todays_token(&repo, day(15), None).unwrap();

        let tokens = repo.tokens();
        assert_eq!(tokens.iter().filter(|t| t.active).count(), 1);
        assert_eq!(token_history(&repo, 10).unwrap()[0].issued_on, day(15));
    }

    #[test]
    fn accepts_any_token_dated_today_without_secret() {
        let repo = TestRepository::personnel();
        let now = day(15).and_hms_opt(8, 0, 0).unwrap();

        assert!(validate_token(&repo, "2025-01-15_a1b2c3d4", now, None).is_ok());
    }

    #[test]
    fn rejects_yesterdays_token() {
        let repo = TestRepository::personnel();
        let yesterday = todays_token(&repo, day(14), None).unwrap();
        let now = day(15).and_hms_opt(8, 0, 0).unwrap();

        assert_eq!(
            validate_token(&repo, yesterday.token.as_str(), now, None),
            Err(ServiceError::InvalidToken)
        );
    }

    #[test]
    fn secret_requires_matching_hash() {
        let repo = TestRepository::personnel();
        let now = day(15).and_hms_opt(8, 0, 0).unwrap();
        let genuine = canonical_token(day(15), Some("s3cret")).unwrap();

        assert!(validate_token(&repo, genuine.as_str(), now, Some("s3cret")).is_ok());
        assert_eq!(
            validate_token(&repo, "2025-01-15_00000000", now, Some("s3cret")),
            Err(ServiceError::InvalidToken)
        );
    }

    #[test]
    fn daily_qr_points_at_the_attendance_page() {
        let repo = TestRepository::personnel();

        let qr = daily_qr(&repo, day(15), None, "http://10.0.0.2:5000", "10.0.0.2").unwrap();

        assert!(qr.url.starts_with("http://10.0.0.2:5000/asistencia?token=2025-01-15_"));
        assert!(qr.url.ends_with(&qr.token));
        assert!(!qr.qr_image.is_empty());
        assert_eq!(qr.fecha, day(15));
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let repo = TestRepository::personnel();
        let now = day(15).and_hms_opt(8, 0, 0).unwrap();

        assert_eq!(
            validate_token(&repo, "not-a-token", now, None),
            Err(ServiceError::InvalidToken)
        );
    }
}
