pub mod auth_dto;
pub mod notification_dto;
