use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use serde::Serialize;

use crate::pipeline::catalog::CatalogEntry;
use crate::pipeline::selection::{SelectionError, SubmitForm};
use crate::pipeline::{AppContext, PipelineError, run_submission};
use crate::report::volcano::PLOTLY_CDN;
use crate::report::{DataTable, DeReport};

const HOME_PAGE: &str = include_str!("../../assets/home.html");
const PLOTLY_SLOT: &str = "__PLOTLY_CDN__";

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(home).post(home))
        .route("/tables", get(catalog_table).post(catalog_table))
        .route("/tables/", get(catalog_table).post(catalog_table))
        .route("/submit", get(submit).post(submit))
        .with_state(ctx)
}

pub async fn serve(ctx: Arc<AppContext>, bind: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn home() -> Html<String> {
    Html(HOME_PAGE.replace(PLOTLY_SLOT, PLOTLY_CDN))
}

async fn catalog_table(State(ctx): State<Arc<AppContext>>) -> Json<DataTable<CatalogEntry>> {
    Json(ctx.catalog.to_table())
}

async fn submit(
    State(ctx): State<Arc<AppContext>>,
    Form(form): Form<SubmitForm>,
) -> Result<Json<DeReport>, ApiError> {
    tracing::info!("got a submission");
    let report = tokio::task::spawn_blocking(move || run_submission(&ctx, &form)).await??;
    Ok(Json(report))
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("submission worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(PipelineError::Selection(SelectionError::OutOfRange(_))) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Pipeline(PipelineError::Selection(SelectionError::Malformed(_))) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Pipeline(PipelineError::Computation(_))
            | ApiError::Pipeline(PipelineError::Render(_))
            | ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "rejected submission");
        } else {
            tracing::error!(status = status.as_u16(), error = %self, "submission failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/server/tests.rs"]
mod tests;
