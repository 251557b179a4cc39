//! Domain models

pub mod notification;
pub mod queue;
pub mod service;
pub mod stats;
pub mod temp_link;
pub mod user;
