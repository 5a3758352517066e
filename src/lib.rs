pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::logging::buffer::LogBuffer;
use crate::services::{
    auth_service::AuthService, email_service::EmailService,
    notification_service::NotificationService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub notification_service: NotificationService,
    pub email_service: EmailService,
    pub log_buffer: LogBuffer,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let email_service = EmailService::new(
            config.mail_gateway_url.clone(),
            config.mail_gateway_secret.clone(),
        );
        let auth_service = AuthService::new(
            pool.clone(),
            email_service.clone(),
            config.admin_email.clone(),
            config.jwt_secret.clone(),
        );
        let notification_service = NotificationService::new(pool.clone());
        let log_buffer = LogBuffer::new(config.is_development());

        Self {
            pool,
            auth_service,
            notification_service,
            email_service,
            log_buffer,
        }
    }
}
