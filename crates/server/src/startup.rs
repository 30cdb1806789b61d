use std::{env, net::SocketAddr};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::auth::{AppState, ServerAuthConfig};
use crate::routes;

fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks.
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

fn load_jwt_secret() -> String {
    if let Ok(cfg) = configs::load_default() {
        let mut auth = cfg.auth;
        auth.normalize_from_env();
        if !auth.jwt_secret.trim().is_empty() {
            return auth.jwt_secret;
        }
    }
    env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string())
}

/// Public entry: build the app and run the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    // DB connection + schema
    let db = models::db::connect().await?;
    migration::Migrator::up(&db, None).await?;

    let state = AppState {
        db,
        auth: ServerAuthConfig { jwt_secret: load_jwt_secret() },
    };

    let app: Router = routes::build_router(build_cors(), state);

    let addr = load_bind_addr()?;
    info!(%addr, "starting api server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
