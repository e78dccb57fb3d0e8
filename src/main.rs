use std::env;

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use portfolio_contact::{
    background_task::start_sweep_task,
    graceful_shutdown::shutdown_signal,
    middlewares::cors::build_cors,
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let production = env::var("APP_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    if production {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let (app_state, sweep_interval) = match AppState::new(&config)
        .and_then(|state| Ok((state, config.rate_limit.sweep_interval()?)))
    {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!("Failed to build application state: {}", e);
            std::process::exit(1);
        }
    };

    for handler in [&app_state.resend_contact, &app_state.ses_contact] {
        if let Err(e) = handler.provider.ensure_configured() {
            tracing::warn!("Email backend unavailable until configured: {}", e);
        }
    }

    let app_state = web::Data::new(app_state);
    let server_addr = format!("{}:{}", config.host, config.port);
    let cors_origins = config.cors_origins();

    tracing::info!(
        "🚀 Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let limiter = app_state.rate_limiter.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(build_cors(&cors_origins))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::spawn(start_sweep_task(limiter, sweep_interval));

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
