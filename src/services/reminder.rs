//! WhatsApp reminder bot client
//!
//! Talks to the external gateway that actually delivers the messages. The
//! gateway's bearer token is cached in-process and refreshed a little before
//! the gateway would reject it. Sends are attempted twice; the desk treats a
//! failed reminder as degraded service, not an error the visitor sees.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    config::ReminderConfig,
    error::{AppError, AppResult},
    repository::Repository,
};

const SEND_ATTEMPTS: u32 = 2;

#[derive(Debug, Serialize)]
struct GatewayLogin<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayToken {
    token: String,
}

#[derive(Debug, Serialize)]
struct CheckNumber<'a> {
    phone: &'a str,
}

#[derive(Debug, Deserialize)]
struct NumberCheck {
    exists: bool,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    phone: &'a str,
    message: &'a str,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    fetched_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ReminderService {
    repository: Repository,
    config: ReminderConfig,
    http: reqwest::Client,
    token: Arc<RwLock<Option<CachedToken>>>,
}

impl ReminderService {
    pub fn new(repository: Repository, config: ReminderConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            repository,
            config,
            http,
            token: Arc::new(RwLock::new(None)),
        })
    }

    fn enabled(&self) -> bool {
        !self.config.base_url.is_empty()
    }

    /// Remind the visitor attached to a queue entry over WhatsApp
    pub async fn remind_queue(&self, queue_id: i32, message: Option<String>) -> AppResult<()> {
        if !self.enabled() {
            return Err(AppError::ExternalService(
                "Reminder gateway is not configured".to_string(),
            ));
        }

        let queue = self.repository.queues.get_by_id(queue_id).await?;
        let details = self
            .repository
            .queues
            .get_by_tracking_link(&queue.tracking_link)
            .await?;
        let phone = details.visitor_phone.ok_or_else(|| {
            AppError::BadRequest(format!("Queue {} has no phone number on file", queue_id))
        })?;

        let message = message.unwrap_or_else(|| {
            format!(
                "Nomor antrian Anda {} untuk layanan {} akan segera dipanggil. Mohon bersiap.",
                details.queue_number, details.service_name
            )
        });

        self.send(&phone, &message).await?;
        tracing::info!(queue_id, "Reminder sent");
        Ok(())
    }

    /// Check the number exists on WhatsApp, then send. Each step is retried
    /// once on a transport error or gateway 5xx.
    async fn send(&self, phone: &str, message: &str) -> AppResult<()> {
        let exists: NumberCheck = self
            .call_gateway("check-number", &CheckNumber { phone })
            .await?;
        if !exists.exists {
            return Err(AppError::BadRequest(format!(
                "Phone number {} is not registered on WhatsApp",
                phone
            )));
        }

        let _: serde_json::Value = self
            .call_gateway("send-message", &SendMessage { phone, message })
            .await?;
        Ok(())
    }

    async fn call_gateway<B, R>(&self, path: &str, body: &B) -> AppResult<R>
    where
        B: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let mut last_error = None;

        for attempt in 1..=SEND_ATTEMPTS {
            let token = self.bearer_token().await?;
            let response = self
                .http
                .post(&url)
                .bearer_auth(&token)
                .json(body)
                .send()
                .await;

            match response {
                Ok(resp) if resp.status() == reqwest::StatusCode::UNAUTHORIZED => {
                    // Stale token; drop the cache and retry with a fresh one
                    *self.token.write().await = None;
                    last_error = Some(AppError::ExternalService(
                        "Reminder gateway rejected the token".to_string(),
                    ));
                }
                Ok(resp) if resp.status().is_server_error() => {
                    last_error = Some(AppError::ExternalService(format!(
                        "Reminder gateway returned {}",
                        resp.status()
                    )));
                }
                Ok(resp) if !resp.status().is_success() => {
                    return Err(AppError::ExternalService(format!(
                        "Reminder gateway returned {}",
                        resp.status()
                    )));
                }
                Ok(resp) => {
                    return resp.json::<R>().await.map_err(|e| {
                        AppError::ExternalService(format!(
                            "Invalid reminder gateway response: {}",
                            e
                        ))
                    });
                }
                Err(e) => {
                    last_error = Some(AppError::ExternalService(format!(
                        "Reminder gateway unreachable: {}",
                        e
                    )));
                }
            }

            if attempt < SEND_ATTEMPTS {
                tracing::warn!(attempt, path, "Reminder gateway call failed, retrying");
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::ExternalService("Reminder gateway failed".to_string())))
    }

    /// Cached gateway bearer token, refreshed when older than the configured
    /// TTL (the gateway expires tokens at roughly one hour)
    async fn bearer_token(&self) -> AppResult<String> {
        let ttl = Duration::minutes(self.config.token_ttl_minutes);

        if let Some(cached) = self.token.read().await.as_ref() {
            if Utc::now() - cached.fetched_at < ttl {
                return Ok(cached.token.clone());
            }
        }

        let mut guard = self.token.write().await;
        // Another task may have refreshed while we waited for the write lock
        if let Some(cached) = guard.as_ref() {
            if Utc::now() - cached.fetched_at < ttl {
                return Ok(cached.token.clone());
            }
        }

        let username = self.config.api_username.as_deref().unwrap_or_default();
        let password = self.config.api_password.as_deref().unwrap_or_default();
        let url = format!("{}/login", self.config.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .json(&GatewayLogin { username, password })
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("Reminder gateway login failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Reminder gateway login returned {}",
                response.status()
            )));
        }

        let token: GatewayToken = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Invalid reminder gateway login response: {}", e))
        })?;

        *guard = Some(CachedToken {
            token: token.token.clone(),
            fetched_at: Utc::now(),
        });
        Ok(token.token)
    }
}
