use studemy_backend::config::Config;
use studemy_backend::db::DatabaseProxy;
use studemy_backend::logging;
use studemy_backend::seed;
use studemy_backend::state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    let _log_guard = logging::init_tracing(&config.log);

    let db_proxy = match DatabaseProxy::connect(config.db.clone()).await {
        Ok(proxy) => proxy,
        Err(err) => {
            tracing::error!(error = %err, "database not initialized");
            std::process::exit(1);
        }
    };

    if config.db.seed_demo_data {
        match seed::seed_demo_data(&db_proxy).await {
            Ok(summary) if summary.new_rows == 0 => {
                tracing::debug!("demo data already exists");
            }
            Ok(summary) => tracing::info!(
                concepts = summary.concepts,
                questions = summary.questions,
                new_rows = summary.new_rows,
                "seeded demo data"
            ),
            Err(err) => tracing::warn!(error = %err, "failed to seed demo data"),
        }
    }

    let state = AppState::new(db_proxy, config.practice.clone());
    let app = studemy_backend::create_app(state);

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "bind listener failed");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "studemy backend listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(err) = server.await {
        tracing::error!(error = %err, "server error");
    }

    tracing::info!("graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
