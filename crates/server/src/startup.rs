use std::future::Future;
use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use service::expense::repo::seaorm::SeaOrmExpenseGateway;
use service::expense::ExpenseGateway;
use service::retry::RetryPolicy;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Router over an arbitrary gateway, with retry limits taken from `cfg.store`.
pub fn build_app(gateway: Arc<dyn ExpenseGateway>, cfg: &AppConfig) -> Router {
    let state = AppState::new(gateway, RetryPolicy::from_config(&cfg.store));
    routes::build_router(state, build_cors())
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        // 无法监听信号时保持运行
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Public entry: connect the store, build the app and run the HTTP server.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::ensure_schema(&db).await?;

    let gateway: Arc<dyn ExpenseGateway> = Arc::new(SeaOrmExpenseGateway::new(db, &cfg.store));
    let app = build_app(gateway, &cfg);

    let addr = cfg.server.bind_addr();
    let listener = TcpListener::bind(addr.as_str()).await?;
    info!(%addr, "expense tracker listening");
    serve(listener, app, ctrl_c()).await
}
