use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};
use rand::Rng;

use naccer::auth::identity::TokenConfig;
use naccer::auth::{password, token};
use naccer::db;
use naccer::handlers;
use naccer::notify::{Dispatcher, LogMailer};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/app.db".to_string());
    if let Some(parent) = std::path::Path::new(&database_path).parent() {
        std::fs::create_dir_all(parent).expect("Failed to create data directory");
    }

    let pool = db::init_pool(&database_path);
    db::run_migrations(&pool);

    // Demo accounts (one per role) for non-production environments.
    if std::env::var("DEMO_SEED").as_deref() == Ok("1") {
        let demo_hash = password::hash_password("changeme123")
            .expect("Failed to hash demo password");
        db::seed_demo(&pool, &demo_hash);
    }

    // Token signing secret. Loaded from JWT_SECRET for tokens that
    // survive restarts.
    let secret = match std::env::var("JWT_SECRET") {
        Ok(val) if val.len() >= 32 => {
            log::info!("Using JWT_SECRET from environment");
            val.into_bytes()
        }
        Ok(val) => {
            log::warn!(
                "JWT_SECRET too short ({} bytes, need 32+) — generating random secret",
                val.len()
            );
            generate_secret()
        }
        Err(_) => {
            log::warn!("No JWT_SECRET set — generating random secret (tokens lost on restart)");
            generate_secret()
        }
    };

    let expires_in_secs = std::env::var("JWT_EXPIRES_IN")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(token::DEFAULT_EXPIRY_SECS);

    let token_config = TokenConfig { secret, expires_in_secs };
    let dispatcher: web::Data<dyn Dispatcher> = web::Data::from(Arc::new(LogMailer) as Arc<dyn Dispatcher>);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());
    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(token_config.clone()))
            .app_data(dispatcher.clone())
            .configure(handlers::api_routes)
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                actix_web::HttpResponse::NotFound().json(serde_json::json!({
                    "success": false,
                    "message": "No such endpoint",
                }))
            }))
    })
    .bind(&bind_addr)?
    .run()
    .await
}

fn generate_secret() -> Vec<u8> {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes).into_bytes()
}
