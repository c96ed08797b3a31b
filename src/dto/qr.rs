use chrono::NaiveDate;
use serde::Serialize;

/// Body of `/qr_diario`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyQr {
    pub token: String,
    pub url: String,
    /// Base64-encoded PNG.
    pub qr_image: String,
    pub fecha: NaiveDate,
    pub ip_local: String,
}
