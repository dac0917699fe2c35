use crate::errors::{Error, Result};
use crate::metrics::SensorMetrics;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    metrics: Arc<SensorMetrics>,
    metrics_path: Arc<str>,
}

pub fn create_router(metrics_path: &str, metrics: Arc<SensorMetrics>) -> Router {
    let state = AppState {
        metrics,
        metrics_path: Arc::from(metrics_path),
    };

    let router = Router::new().route(metrics_path, get(metrics_handler));
    let router = if metrics_path == "/" {
        router
    } else {
        router.route("/", get(index))
    };
    router.with_state(state)
}

pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| Error::Bind { addr, source })?;
    info!("HTTP server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Serves scrapes until the listener fails.
pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    axum::serve(listener, router).await?;
    Ok(())
}

async fn metrics_handler(
    State(state): State<AppState>,
) -> std::result::Result<Response, AppError> {
    let body = state.metrics.gather()?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html><head><title>rtl_433 exporter</title></head>\
         <body><h1>rtl_433 exporter</h1><p><a href=\"{0}\">{0}</a></p></body></html>",
        state.metrics_path
    ))
}

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Failed to render metrics: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal server error: {}", self.0),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
