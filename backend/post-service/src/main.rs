use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use db_pool::create_pool as create_pg_pool;
use post_service::config::LoggingConfig;
use post_service::health::{HealthState, SERVICE_NAME};
use post_service::services::PostService;
use post_service::{db, handlers, health, metrics, Config};
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Probe the local health endpoint; used as the container healthcheck.
async fn run_healthcheck() -> io::Result<()> {
    let port = std::env::var("POST_SERVICE_PORT").unwrap_or_else(|_| "8082".to_string());
    let url = format!("http://127.0.0.1:{}/api/v1/health", port);

    match reqwest::Client::new().get(&url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => {
            eprintln!("healthcheck HTTP status: {}", resp.status());
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"))
        }
        Err(e) => {
            eprintln!("healthcheck HTTP error: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"))
        }
    }
}

/// Post Service
///
/// Serves the posts resource for the Nova blog.
///
/// # Routes
///
/// - `/api/v1/posts/*` - REST resource, chunked scan and reading time report
/// - `/api/v1/health*` - health, readiness and liveness probes
/// - `/metrics` - Prometheus metrics
///
/// Runs on port 8082 (configurable via POST_SERVICE_PORT).
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Some(cmd) = std::env::args().nth(1) {
        if cmd == "healthcheck" || cmd == "healthcheck-http" {
            return run_healthcheck().await;
        }
    }

    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);

    tracing::info!("Starting {} v{}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_cfg = config.database.pool_config(SERVICE_NAME);
    db_cfg.log_config();

    let db_pool = match create_pg_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    if config.database.run_migrations {
        db::run_migrations(&db_pool).await.map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to run database migrations: {e}"),
            )
        })?;
        tracing::info!("Database migrations applied");
    }

    let post_service = web::Data::new(PostService::with_chunk_size(
        db_pool.clone(),
        config.posts.chunk_size,
    ));
    let health_state = web::Data::new(HealthState::new(db_pool.clone()));

    let bind_address = config.app.bind_address();
    tracing::info!(
        chunk_size = config.posts.chunk_size,
        "Starting HTTP server at {}",
        bind_address
    );

    let allowed_origins = config.cors.allowed_origins.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(post_service.clone())
            .app_data(health_state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .service(
                web::scope("/api/v1")
                    .configure(health::configure)
                    .configure(handlers::configure),
            )
    })
    .bind(&bind_address)?
    .workers(config.app.workers)
    .shutdown_timeout(30)
    .run()
    .await?;

    tracing::info!("{} shutting down", SERVICE_NAME);
    Ok(())
}
