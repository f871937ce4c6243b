// Main entry point for the certificate registry

use certificate_registry::api::{create_router, AppState};
use certificate_registry::auth::audit_logger::AuditLogger;
use certificate_registry::auth::auth_middleware::AuthState;
use certificate_registry::auth::password::PasswordHasher;
use certificate_registry::auth::service::AccountService;
use certificate_registry::auth::token::TokenIssuer;
use certificate_registry::auth::user_store::DbUserStore;
use certificate_registry::certificate::qr::QrEncoder;
use certificate_registry::certificate::service::CertificateService;
use certificate_registry::certificate::student_store::DbStudentStore;
use certificate_registry::certificate::uploads::DiskUploadStore;
use certificate_registry::config::Config;

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load and validate configuration first (before any logging)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // 2. Initialize tracing subscriber with config values
    init_tracing(&config)?;

    info!("Starting certificate registry");
    info!(
        bind_address = %config.bind_address,
        port = config.port,
        upload_dir = %config.upload_dir.display(),
        require_auth_for_create = config.require_auth_for_create,
        "Configuration loaded"
    );

    // 3. Initialize database pool and schema
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to connect to database");
            e
        })?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to apply database migrations");
            e
        })?;

    info!("Database pool initialized");

    // 4. Certificate slice
    let certificates = Arc::new(CertificateService::new(
        Arc::new(DbStudentStore::new(db_pool.clone())),
        Arc::new(DiskUploadStore::new(config.upload_dir.clone())),
        QrEncoder::default(),
        config.verification_base_url.clone(),
    ));

    // 5. Account slice
    let token_issuer = Arc::new(TokenIssuer::new(config.jwt_secret.clone()));
    let audit_logger = Arc::new(AuditLogger::new(Some(Arc::new(db_pool.clone()))));
    let hasher = PasswordHasher::new(config.bcrypt_cost);
    hasher.dummy_hash().await?;
    let accounts = Arc::new(AccountService::new(
        Arc::new(DbUserStore::new(db_pool)),
        hasher,
        token_issuer.clone(),
        audit_logger.clone(),
    ));

    info!(bcrypt_cost = config.bcrypt_cost, "Account service initialized");

    // 6. Create AuthState and AppState
    let auth_state = Arc::new(AuthState {
        token_issuer,
        audit_logger,
    });

    let app_state = AppState {
        certificates,
        accounts,
        config: Arc::new(config.clone()),
    };

    // 7. Create router
    let router = create_router(&app_state, auth_state).with_state(app_state);

    // 8. Start HTTP server
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| {
            error!(error = %e, addr = %addr, "Failed to bind to address");
            e
        })?;

    info!(addr = %addr, "Server listening on {}", addr);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            e
        })?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber based on configuration
fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    // RUST_LOG wins over LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_env_filter(filter);

    let result = if config.log_format == "json" {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    result.map_err(|e| e as Box<dyn std::error::Error>)?;

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            info!("SIGTERM received, starting graceful shutdown");
        },
    }
}
