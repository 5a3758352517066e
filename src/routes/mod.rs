pub mod admin_routes;
pub mod auth_routes;
pub mod health;
pub mod notification_routes;
