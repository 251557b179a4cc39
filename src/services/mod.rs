//! Business logic services

pub mod auth;
pub mod catalog;
pub mod display;
pub mod links;
pub mod notifications;
pub mod queues;
pub mod redis;
pub mod reminder;
pub mod stats;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub queues: queues::QueuesService,
    pub links: links::LinksService,
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub stats: stats::StatsService,
    pub notifications: notifications::NotificationsService,
    pub reminder: reminder::ReminderService,
    pub redis: redis::RedisService,
}

impl Services {
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        redis: redis::RedisService,
    ) -> AppResult<Self> {
        Ok(Self {
            queues: queues::QueuesService::new(repository.clone(), config.queue.clone()),
            links: links::LinksService::new(repository.clone(), config.queue.clone()),
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            notifications: notifications::NotificationsService::new(repository.clone()),
            reminder: reminder::ReminderService::new(repository, config.reminder.clone())?,
            redis,
        })
    }
}
