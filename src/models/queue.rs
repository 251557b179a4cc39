//! Queue model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Queue lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    Waiting,
    Serving,
    Completed,
    Canceled,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Waiting => "WAITING",
            QueueStatus::Serving => "SERVING",
            QueueStatus::Completed => "COMPLETED",
            QueueStatus::Canceled => "CANCELED",
        }
    }

    /// COMPLETED and CANCELED accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueueStatus::Completed | QueueStatus::Canceled)
    }
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QueueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WAITING" => Ok(QueueStatus::Waiting),
            "SERVING" => Ok(QueueStatus::Serving),
            "COMPLETED" => Ok(QueueStatus::Completed),
            "CANCELED" => Ok(QueueStatus::Canceled),
            _ => Err(format!("Invalid queue status: {}", s)),
        }
    }
}

// SQLx conversion for QueueStatus (stored as TEXT)
impl sqlx::Type<Postgres> for QueueStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for QueueStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for QueueStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// How the visitor entered the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueType {
    /// Self-service form behind the QR link
    Online,
    /// Staff-entered guest book submission
    Offline,
}

impl QueueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueType::Online => "ONLINE",
            QueueType::Offline => "OFFLINE",
        }
    }
}

impl std::fmt::Display for QueueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QueueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ONLINE" => Ok(QueueType::Online),
            "OFFLINE" => Ok(QueueType::Offline),
            _ => Err(format!("Invalid queue type: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for QueueType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for QueueType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for QueueType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Visit purpose declared on the submission form. Each purpose maps to a
/// preferred service name; resolution falls back to the earliest-created
/// ACTIVE service when no active service carries that name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitPurpose {
    Perpustakaan,
    KonsultasiStatistik,
    RekomendasiStatistik,
    PstOnline,
    Lainnya,
}

impl VisitPurpose {
    pub fn preferred_service_name(&self) -> Option<&'static str> {
        match self {
            VisitPurpose::Perpustakaan => Some("Perpustakaan"),
            VisitPurpose::KonsultasiStatistik => Some("Konsultasi Statistik"),
            VisitPurpose::RekomendasiStatistik => Some("Rekomendasi Statistik"),
            VisitPurpose::PstOnline => Some("PST Online"),
            VisitPurpose::Lainnya => None,
        }
    }
}

/// Queue row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Queue {
    pub id: i32,
    pub queue_number: i32,
    pub queue_date: NaiveDate,
    pub status: QueueStatus,
    pub queue_type: QueueType,
    pub service_id: i32,
    pub visitor_id: Option<i32>,
    pub guest_id: Option<i32>,
    pub admin_id: Option<i32>,
    pub tracking_link: String,
    pub temp_uuid: Option<uuid::Uuid>,
    pub filled_skd: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Queue with joined display fields for lists and dashboards
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct QueueDetails {
    pub id: i32,
    pub queue_number: i32,
    pub queue_date: NaiveDate,
    pub status: QueueStatus,
    pub queue_type: QueueType,
    pub service_name: String,
    pub visitor_name: Option<String>,
    pub visitor_phone: Option<String>,
    pub visitor_institution: Option<String>,
    pub admin_name: Option<String>,
    pub tracking_link: String,
    pub filled_skd: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Filters for the staff queue list
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct QueueQuery {
    /// Defaults to today when omitted
    pub date: Option<NaiveDate>,
    pub status: Option<QueueStatus>,
    pub service_id: Option<i32>,
    /// Previous content hash for change detection
    pub hash: Option<String>,
}

/// Staff-facing guest book submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GuestSubmission {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(length(min = 8, max = 16, message = "Phone must be 8-16 digits"))]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub institution: Option<String>,
    pub purpose: VisitPurpose,
    /// Explicit service choice; overrides purpose resolution when set
    pub service_id: Option<i32>,
    pub notes: Option<String>,
}

/// Self-service visitor form submission (behind a one-time link)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VisitorSubmission {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(length(min = 8, max = 16, message = "Phone must be 8-16 digits"))]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub institution: Option<String>,
    pub gender: Option<String>,
    pub education: Option<String>,
    pub purpose: VisitPurpose,
    pub notes: Option<String>,
}

/// Result of a successful submission, returned to both entry paths
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmissionResult {
    pub queue_id: i32,
    pub queue_number: i32,
    pub queue_date: NaiveDate,
    pub service_name: String,
    pub tracking_link: String,
}
