/// authgate - main entry point
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::sqlite::SqlitePoolOptions;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use authgate::{
    config::Config,
    db::revocation_repo,
    handlers,
    middleware::{RateLimitConfig, RateLimitMiddleware},
    security::jwt::TokenIssuer,
    services::AuthService,
    AppState,
};

const LEDGER_CLEANUP_INTERVAL_SECS: u64 = 300;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Missing or weak AUTHGATE_JWT_SECRET fails here, before anything binds.
    let config = Config::from_env().context("failed to load configuration")?;

    tracing::info!(
        "starting authgate on {}:{}",
        config.server_host,
        config.server_port
    );

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to open database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    tracing::info!("database ready");

    let issuer = TokenIssuer::new(&config.jwt_secret, config.token_ttl_secs);
    let state = AppState {
        auth: AuthService::new(pool.clone(), issuer),
    };

    // Housekeeping: drop ledger entries for tokens past their natural expiry.
    let cleanup_pool = pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(LEDGER_CLEANUP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match revocation_repo::cleanup_expired(&cleanup_pool).await {
                Ok(removed) if removed > 0 => {
                    tracing::info!(removed, "cleaned up expired revocation entries");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("revocation cleanup failed: {}", e),
            }
        }
    });

    let limit_config = RateLimitConfig {
        max_requests: config.rate_limit_max_requests,
        window_seconds: config.rate_limit_window_seconds,
    };
    // One limiter per gated route, created outside the factory so all
    // workers share the same counters.
    let signup_limiter = RateLimitMiddleware::new(limit_config.clone());
    let login_limiter = RateLimitMiddleware::new(limit_config);

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(
                web::scope("/auth")
                    .service(
                        web::resource("/signup")
                            .wrap(signup_limiter.clone())
                            .route(web::post().to(handlers::signup)),
                    )
                    .service(
                        web::resource("/login")
                            .wrap(login_limiter.clone())
                            .route(web::post().to(handlers::login)),
                    )
                    .route("/logout", web::post().to(handlers::logout))
                    .route("/change-password", web::post().to(handlers::change_password)),
            )
            .route("/health", web::get().to(handlers::health))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
