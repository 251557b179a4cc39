//! Repository layer for database operations

pub mod notifications;
pub mod queues;
pub mod services;
pub mod temp_links;
pub mod users;
pub mod visitors;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub queues: queues::QueuesRepository,
    pub visitors: visitors::VisitorsRepository,
    pub services: services::ServicesRepository,
    pub temp_links: temp_links::TempLinksRepository,
    pub notifications: notifications::NotificationsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            queues: queues::QueuesRepository::new(pool.clone()),
            visitors: visitors::VisitorsRepository::new(),
            services: services::ServicesRepository::new(pool.clone()),
            temp_links: temp_links::TempLinksRepository::new(pool.clone()),
            notifications: notifications::NotificationsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}
