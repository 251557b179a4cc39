//! Queue lifecycle and submission service
//!
//! Owns the two submission paths (staff guest book, self-service visitor
//! form) and the staff lifecycle transitions. Both submission paths share the
//! same transactional shape: resolve the target service, allocate the daily
//! number, create the contact row and the queue row, commit, then emit
//! notifications best-effort.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use crate::{
    config::QueueConfig,
    error::{AppError, AppResult},
    models::{
        notification::{NotificationEvent, NotificationType},
        queue::{
            GuestSubmission, Queue, QueueDetails, QueueStatus, QueueType, SubmissionResult,
            VisitorSubmission, VisitPurpose,
        },
        service::Service,
        user::UserClaims,
    },
    repository::{queues::is_number_collision, Repository},
};

/// Total attempts for one submission before giving up with a conflict.
/// The per-day counter makes collisions rare; the bound keeps latency sane
/// if the counter and the queues table ever disagree.
const MAX_ALLOCATION_ATTEMPTS: u32 = 3;

const TRACKING_LINK_LEN: usize = 10;

/// Guard: SERVING is reachable from WAITING only
fn ensure_can_serve(id: i32, status: QueueStatus) -> AppResult<()> {
    if status == QueueStatus::Waiting {
        Ok(())
    } else {
        Err(AppError::StateConflict(format!(
            "Queue {} is {}, only a WAITING queue can be served",
            id, status
        )))
    }
}

/// Guard: COMPLETED is reachable from SERVING only
fn ensure_can_complete(id: i32, status: QueueStatus) -> AppResult<()> {
    if status == QueueStatus::Serving {
        Ok(())
    } else {
        Err(AppError::StateConflict(format!(
            "Queue {} is {}, only a SERVING queue can be completed",
            id, status
        )))
    }
}

/// Guard: CANCELED is reachable from WAITING and SERVING
fn ensure_can_cancel(id: i32, status: QueueStatus) -> AppResult<()> {
    if status.is_terminal() {
        Err(AppError::StateConflict(format!(
            "Queue {} is already {}",
            id, status
        )))
    } else {
        Ok(())
    }
}

/// The desk's calendar day for a given instant, truncated to midnight
fn local_date(now: DateTime<Utc>, utc_offset_hours: i32) -> NaiveDate {
    (now + Duration::hours(utc_offset_hours as i64)).date_naive()
}

fn generate_tracking_link() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TRACKING_LINK_LEN)
        .map(char::from)
        .collect()
}

#[derive(Clone)]
pub struct QueuesService {
    repository: Repository,
    config: QueueConfig,
}

impl QueuesService {
    pub fn new(repository: Repository, config: QueueConfig) -> Self {
        Self { repository, config }
    }

    /// Today's queue date in the desk's local time
    pub fn today(&self) -> NaiveDate {
        local_date(Utc::now(), self.config.utc_offset_hours)
    }

    /// Staff guest book submission. Repeated walk-in entries are allowed by
    /// design; there is no idempotency guard on this path.
    pub async fn submit_guest(&self, submission: GuestSubmission) -> AppResult<SubmissionResult> {
        let result = self
            .submit_with_retry(|| self.try_submit_guest(&submission))
            .await?;

        tracing::info!(
            queue_number = result.queue_number,
            service = %result.service_name,
            "Guest queue entry created"
        );
        Ok(result)
    }

    /// Self-service visitor form submission. Consumes the one-time link in
    /// the same transaction, so a retry after a number collision also replays
    /// the consumption check.
    pub async fn submit_visitor(
        &self,
        link_uuid: Uuid,
        submission: VisitorSubmission,
    ) -> AppResult<SubmissionResult> {
        let result = self
            .submit_with_retry(|| self.try_submit_visitor(link_uuid, &submission))
            .await?;

        // Emitted after commit; a failed write never undoes the submission
        self.notify(NotificationEvent {
            notification_type: NotificationType::NewQueue,
            title: format!("New queue #{}", result.queue_number),
            message: format!(
                "{} joined the queue for {} (number {})",
                submission.name, result.service_name, result.queue_number
            ),
            user_id: None,
        })
        .await;

        tracing::info!(
            queue_number = result.queue_number,
            service = %result.service_name,
            "Visitor queue entry created"
        );
        Ok(result)
    }

    /// Bounded optimistic retry around one submission transaction. Only a
    /// (queue_date, queue_number) uniqueness violation is retried; every
    /// other error surfaces immediately.
    async fn submit_with_retry<F, Fut>(&self, attempt: F) -> AppResult<SubmissionResult>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = AppResult<SubmissionResult>>,
    {
        for n in 1..=MAX_ALLOCATION_ATTEMPTS {
            match attempt().await {
                Ok(result) => return Ok(result),
                Err(e) if is_number_collision(&e) && n < MAX_ALLOCATION_ATTEMPTS => {
                    tracing::warn!(attempt = n, "Queue number collision, retrying submission");
                }
                Err(e) if is_number_collision(&e) => {
                    tracing::error!(
                        attempts = MAX_ALLOCATION_ATTEMPTS,
                        "Queue number allocation exhausted retries"
                    );
                    return Err(AppError::NumberAssignment(
                        "Failed to assign a queue number, please try again".to_string(),
                    ));
                }
                Err(e) => return Err(e),
            }
        }
        unreachable!("retry loop returns on every branch")
    }

    async fn try_submit_guest(&self, submission: &GuestSubmission) -> AppResult<SubmissionResult> {
        let queue_date = self.today();
        let mut tx = self.repository.pool.begin().await?;

        let service = self
            .resolve_service(&mut tx, submission.purpose, submission.service_id)
            .await?;
        let number = self
            .repository
            .queues
            .allocate_number(&mut *tx, queue_date)
            .await?;
        let guest_id = self
            .repository
            .visitors
            .create_guest(&mut *tx, submission)
            .await?;
        let queue = self
            .repository
            .queues
            .insert(
                &mut *tx,
                number,
                queue_date,
                QueueType::Offline,
                service.id,
                None,
                Some(guest_id),
                &generate_tracking_link(),
                None,
            )
            .await?;

        tx.commit().await?;

        Ok(SubmissionResult {
            queue_id: queue.id,
            queue_number: queue.queue_number,
            queue_date: queue.queue_date,
            service_name: service.name,
            tracking_link: queue.tracking_link,
        })
    }

    async fn try_submit_visitor(
        &self,
        link_uuid: Uuid,
        submission: &VisitorSubmission,
    ) -> AppResult<SubmissionResult> {
        // Link validity is checked up front for a precise error; the
        // conditional consume inside the transaction remains the actual
        // at-most-once guard.
        let link = self.repository.temp_links.get(link_uuid).await?;
        if link.used {
            return Err(AppError::LinkUsed(
                "This form link has already been used".to_string(),
            ));
        }
        if link.is_expired(Utc::now()) {
            return Err(AppError::LinkExpired(
                "This form link has expired".to_string(),
            ));
        }

        let queue_date = self.today();
        let mut tx = self.repository.pool.begin().await?;

        let service = self
            .resolve_service(&mut tx, submission.purpose, None)
            .await?;
        let number = self
            .repository
            .queues
            .allocate_number(&mut *tx, queue_date)
            .await?;
        let visitor_id = self
            .repository
            .visitors
            .create_visitor(&mut *tx, submission)
            .await?;
        let queue = self
            .repository
            .queues
            .insert(
                &mut *tx,
                number,
                queue_date,
                QueueType::Online,
                service.id,
                Some(visitor_id),
                None,
                &generate_tracking_link(),
                Some(link_uuid),
            )
            .await?;

        if !self.repository.temp_links.consume(&mut *tx, link_uuid).await? {
            return Err(AppError::LinkUsed(
                "This form link has already been used".to_string(),
            ));
        }

        tx.commit().await?;

        Ok(SubmissionResult {
            queue_id: queue.id,
            queue_number: queue.queue_number,
            queue_date: queue.queue_date,
            service_name: service.name,
            tracking_link: queue.tracking_link,
        })
    }

    /// Resolve the target service: explicit choice first, then the purpose's
    /// preferred service, then the earliest-created ACTIVE service. The
    /// fallback silently reassigns; the chosen service is always returned in
    /// the submission result so the front-end can surface it.
    async fn resolve_service(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        purpose: VisitPurpose,
        service_id: Option<i32>,
    ) -> AppResult<Service> {
        if let Some(id) = service_id {
            return self
                .repository
                .services
                .get_active_by_id(&mut **tx, id)
                .await?
                .ok_or_else(|| {
                    AppError::NoActiveService(format!("Service {} is not an active service", id))
                });
        }

        let preferred = purpose
            .preferred_service_name()
            .unwrap_or(&self.config.fallback_service_name);

        if let Some(service) = self
            .repository
            .services
            .get_active_by_name(&mut **tx, preferred)
            .await?
        {
            return Ok(service);
        }

        self.repository
            .services
            .get_earliest_active(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NoActiveService("No active service is available".to_string()))
    }

    /// Staff "serve" action: WAITING → SERVING
    pub async fn serve(&self, queue_id: i32, claims: &UserClaims) -> AppResult<Queue> {
        let queue = self.repository.queues.get_by_id(queue_id).await?;
        ensure_can_serve(queue_id, queue.status)?;

        // The admin row must exist; the queue records who started service
        let admin = self.repository.users.get_by_id(claims.user_id).await?;

        let updated = self
            .repository
            .queues
            .mark_serving(queue_id, admin.id)
            .await?
            .ok_or_else(|| {
                AppError::StateConflict(format!(
                    "Queue {} is no longer WAITING, only a WAITING queue can be served",
                    queue_id
                ))
            })?;

        self.notify(NotificationEvent {
            notification_type: NotificationType::QueueServing,
            title: format!("Queue #{} serving", updated.queue_number),
            message: format!(
                "Queue number {} is now being served by {}",
                updated.queue_number, admin.name
            ),
            user_id: None,
        })
        .await;

        Ok(updated)
    }

    /// Staff "complete" action: SERVING → COMPLETED, owner-guarded
    pub async fn complete(&self, queue_id: i32, claims: &UserClaims) -> AppResult<Queue> {
        let queue = self.repository.queues.get_by_id(queue_id).await?;
        ensure_can_complete(queue_id, queue.status)?;
        claims.require_queue_owner(queue.admin_id)?;

        let updated = self
            .repository
            .queues
            .mark_completed(queue_id)
            .await?
            .ok_or_else(|| {
                AppError::StateConflict(format!(
                    "Queue {} is no longer SERVING, only a SERVING queue can be completed",
                    queue_id
                ))
            })?;

        self.notify(NotificationEvent {
            notification_type: NotificationType::QueueCompleted,
            title: format!("Queue #{} completed", updated.queue_number),
            message: format!("Queue number {} has been completed", updated.queue_number),
            user_id: None,
        })
        .await;

        Ok(updated)
    }

    /// Staff "cancel" action: WAITING/SERVING → CANCELED. Canceling an entry
    /// someone else is serving requires superadmin or ownership.
    pub async fn cancel(&self, queue_id: i32, claims: &UserClaims) -> AppResult<Queue> {
        let queue = self.repository.queues.get_by_id(queue_id).await?;
        ensure_can_cancel(queue_id, queue.status)?;
        if queue.status == QueueStatus::Serving {
            claims.require_queue_owner(queue.admin_id)?;
        }

        // The update only matches the status the guards saw; a queue that
        // moved (e.g. WAITING -> SERVING under another admin) falls through
        // to StateConflict instead of bypassing the ownership check.
        let updated = self
            .repository
            .queues
            .mark_canceled(queue_id, queue.status)
            .await?
            .ok_or_else(|| {
                AppError::StateConflict(format!(
                    "Queue {} changed status, please retry the cancellation",
                    queue_id
                ))
            })?;

        self.notify(NotificationEvent {
            notification_type: NotificationType::QueueCanceled,
            title: format!("Queue #{} canceled", updated.queue_number),
            message: format!("Queue number {} has been canceled", updated.queue_number),
            user_id: None,
        })
        .await;

        Ok(updated)
    }

    pub async fn get(&self, queue_id: i32) -> AppResult<Queue> {
        self.repository.queues.get_by_id(queue_id).await
    }

    /// List a day's queues for the staff dashboard
    pub async fn list(
        &self,
        date: Option<NaiveDate>,
        status: Option<QueueStatus>,
        service_id: Option<i32>,
    ) -> AppResult<Vec<QueueDetails>> {
        let date = date.unwrap_or_else(|| self.today());
        self.repository.queues.list(date, status, service_id).await
    }

    /// Today's board for the public display: waiting and serving entries
    pub async fn display_board(&self) -> AppResult<Vec<QueueDetails>> {
        let mut entries = self.repository.queues.list(self.today(), None, None).await?;
        entries.retain(|q| {
            matches!(q.status, QueueStatus::Waiting | QueueStatus::Serving)
        });
        Ok(entries)
    }

    /// Queue history over a date range, for exports
    pub async fn list_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<QueueDetails>> {
        if from > to {
            return Err(AppError::BadRequest(
                "'from' date must not be after 'to' date".to_string(),
            ));
        }
        self.repository.queues.list_range(from, to).await
    }

    /// Public tracking by opaque code
    pub async fn track(&self, code: &str) -> AppResult<QueueDetails> {
        self.repository.queues.get_by_tracking_link(code).await
    }

    /// Record the SKD survey flag from the tracking page
    pub async fn mark_skd_filled(&self, code: &str) -> AppResult<()> {
        self.repository.queues.set_filled_skd(code).await
    }

    /// Best-effort notification write; failures are logged, never propagated
    async fn notify(&self, event: NotificationEvent) {
        if let Err(e) = self.repository.notifications.create(&event).await {
            tracing::warn!(
                notification_type = %event.notification_type,
                "Failed to write notification: {}",
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serve_allowed_from_waiting_only() {
        assert!(ensure_can_serve(1, QueueStatus::Waiting).is_ok());
        assert!(ensure_can_serve(1, QueueStatus::Serving).is_err());
        assert!(ensure_can_serve(1, QueueStatus::Completed).is_err());
        assert!(ensure_can_serve(1, QueueStatus::Canceled).is_err());
    }

    #[test]
    fn complete_allowed_from_serving_only() {
        assert!(ensure_can_complete(1, QueueStatus::Serving).is_ok());
        assert!(ensure_can_complete(1, QueueStatus::Waiting).is_err());
        assert!(ensure_can_complete(1, QueueStatus::Completed).is_err());
    }

    #[test]
    fn cancel_allowed_from_waiting_and_serving() {
        assert!(ensure_can_cancel(1, QueueStatus::Waiting).is_ok());
        assert!(ensure_can_cancel(1, QueueStatus::Serving).is_ok());
        assert!(ensure_can_cancel(1, QueueStatus::Completed).is_err());
        assert!(ensure_can_cancel(1, QueueStatus::Canceled).is_err());
    }

    #[test]
    fn invalid_transition_reports_state_conflict() {
        let err = ensure_can_serve(3, QueueStatus::Completed).unwrap_err();
        assert!(matches!(err, AppError::StateConflict(_)));
    }

    #[test]
    fn tracking_link_is_short_alphanumeric() {
        let link = generate_tracking_link();
        assert_eq!(link.len(), TRACKING_LINK_LEN);
        assert!(link.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tracking_links_are_not_repeated() {
        let a = generate_tracking_link();
        let b = generate_tracking_link();
        assert_ne!(a, b);
    }

    #[test]
    fn local_date_respects_desk_offset() {
        // 20:00 UTC is already the next day at UTC+7
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 20, 0, 0).unwrap();
        assert_eq!(
            local_date(now, 7),
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
        );
        assert_eq!(
            local_date(now, 0),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
    }
}
