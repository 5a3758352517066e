use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use justjoin_backend::logging::buffer::summarize;
use justjoin_backend::{
    config::{get_config, init_config},
    database::{pool::create_pool, schema::ensure_schema},
    logging,
    middleware::{auth as auth_middleware, cors::permissive_cors, rate_limit},
    routes, AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    logging::init(&config.environment);

    let pool = create_pool().await?;
    ensure_schema(&pool).await?;

    let app_state = AppState::new(pool);

    {
        let state = app_state.clone();
        tokio::spawn(async move {
            loop {
                if let Some(errors) = state.log_buffer.maintain(chrono::Utc::now()) {
                    let summary = summarize(&errors);
                    let admin_email = &get_config().admin_email;
                    if !state
                        .email_service
                        .send_error_alert(admin_email, &summary)
                        .await
                    {
                        tracing::warn!("error alert mail not delivered");
                    }
                }
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });
    }

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route(
            "/api/register-jobseeker",
            post(routes::auth_routes::register_jobseeker),
        )
        .route(
            "/api/register-company",
            post(routes::auth_routes::register_company),
        )
        .route("/api/login", post(routes::auth_routes::login))
        .route(
            "/api/reset-password",
            post(routes::auth_routes::reset_password),
        )
        .route(
            "/api/admin/admins",
            post(routes::admin_routes::create_admin).get(routes::admin_routes::list_admins),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(config.public_rps),
            rate_limit::rps_middleware,
        ));

    let session_api = Router::new()
        .route(
            "/api/profile/:user_id",
            get(routes::auth_routes::get_profile).put(routes::auth_routes::update_profile),
        )
        .route(
            "/api/change-password",
            post(routes::auth_routes::change_password),
        )
        .route(
            "/api/notifications/user/:user_id",
            get(routes::notification_routes::list_user_notifications),
        )
        .route(
            "/api/notifications/unread-count/:user_id",
            get(routes::notification_routes::unread_count),
        )
        .route(
            "/api/notifications/mark-read/:notification_id",
            put(routes::notification_routes::mark_read),
        )
        .route(
            "/api/notifications/mark-all-read/:user_id",
            put(routes::notification_routes::mark_all_read),
        )
        .route(
            "/api/notifications/:notification_id",
            delete(routes::notification_routes::delete_notification),
        )
        .layer(axum::middleware::from_fn(
            auth_middleware::require_bearer_auth,
        ));

    let admin_api = Router::new()
        .route(
            "/api/notifications/admin/all",
            get(routes::notification_routes::list_all_notifications),
        )
        .route(
            "/api/notifications/admin/send-to-user",
            post(routes::notification_routes::send_to_user),
        )
        .route(
            "/api/notifications/admin/send-to-all",
            post(routes::notification_routes::send_to_all),
        )
        .route(
            "/api/notifications/admin/send-spot",
            post(routes::notification_routes::send_spot),
        )
        .route(
            "/api/notifications/admin/workflow",
            post(routes::notification_routes::upsert_workflow),
        )
        .route(
            "/api/notifications/admin/spot-history",
            get(routes::notification_routes::spot_history),
        )
        .route(
            "/api/notifications/admin/workflow-history",
            get(routes::notification_routes::workflow_history),
        )
        .route(
            "/api/notifications/admin/spot/:id",
            put(routes::notification_routes::update_spot)
                .delete(routes::notification_routes::delete_spot),
        )
        .route(
            "/api/admin/companies/:user_id/approve",
            post(routes::admin_routes::approve_company),
        )
        .route(
            "/api/admin/companies/:user_id/reject",
            post(routes::admin_routes::reject_company),
        )
        .route(
            "/api/admin/admins/:id",
            delete(routes::admin_routes::delete_admin),
        )
        .route(
            "/api/admin/admins/:id/reset-password",
            post(routes::admin_routes::reset_admin_password),
        )
        .route("/api/admin/users", delete(routes::admin_routes::delete_user))
        .route("/api/admin/logs", get(routes::admin_routes::get_logs))
        .layer(axum::middleware::from_fn(auth_middleware::require_admin));

    let app = base_routes
        .merge(public_api)
        .merge(session_api)
        .merge(admin_api)
        .with_state(app_state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
