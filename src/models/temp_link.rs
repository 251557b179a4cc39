//! One-time self-service link model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One-time-use token gating the self-service visitor form. Issued when the
/// static QR uuid is exchanged for a dynamic one; consumed exactly once on a
/// successful form submission.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TempVisitorLink {
    pub uuid: Uuid,
    pub used: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TempVisitorLink {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link(expires_at: DateTime<Utc>) -> TempVisitorLink {
        TempVisitorLink {
            uuid: Uuid::new_v4(),
            used: false,
            expires_at,
            created_at: expires_at - Duration::minutes(60),
        }
    }

    #[test]
    fn link_expires_at_the_boundary() {
        let now = Utc::now();
        assert!(!link(now + Duration::seconds(1)).is_expired(now));
        assert!(link(now).is_expired(now));
        assert!(link(now - Duration::seconds(1)).is_expired(now));
    }
}
