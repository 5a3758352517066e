pub mod auth_service;
pub mod email_service;
pub mod notification_service;
